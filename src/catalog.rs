//! Relation catalogs
//!
//! A catalog is plain data: an ordered list of relations, each with its
//! parent in the taxonomy and the pattern sources that recognise it. The
//! order of entries is the order in which patterns are tried; it only
//! matters when two unrelated relations claim the same dependent.
//!
//! Patterns are written for the `pattern` language and must bind the
//! dependent constituent as `target`. They are matched at the governing
//! phrase.

/// One relation of a catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    /// Parent relation name; `None` means the root
    pub parent: Option<String>,
    pub patterns: Vec<String>,
}

/// An ordered relation catalog for one language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub language: String,
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
            entries: Vec::new(),
        }
    }

    /// Append an entry
    pub fn relation(mut self, name: &str, parent: Option<&str>, patterns: &[&str]) -> Self {
        self.entries.push(CatalogEntry {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Default English catalog over Penn Treebank trees
    pub fn english() -> Self {
        let mut catalog = Catalog::new("en");
        for (name, parent, patterns) in ENGLISH {
            catalog = catalog.relation(name, Some(*parent), patterns);
        }
        catalog
    }
}

#[rustfmt::skip]
const ENGLISH: &[(&str, &str, &[&str])] = &[
    // Abstract relations
    ("arg", "dep", &[]),
    ("subj", "arg", &[]),
    ("comp", "arg", &[]),
    ("obj", "comp", &[]),
    ("mod", "dep", &[]),

    ("punct", "dep", &[r"__ < /^(\.|,|:|``|''|-LRB-|-RRB-)$/=target"]),
    ("mwe", "dep", &["CONJP < __=target"]),
    ("expl", "dep", &["S < (NP=target < EX $++ VP)"]),
    ("nsubj", "subj", &[
        "S < (NP=target $++ VP)",
        "SQ < (NP=target $-- /^(VB|MD)/)",
        "SBAR < (WHNP=target $++ (S !< NP))",
    ]),
    ("csubj", "subj", &["S < (S|SBAR=target $++ VP)"]),
    ("mark", "dep", &["VP < (TO=target $+ VP)", "SBAR < (IN|DT=target $++ S)"]),
    ("aux", "dep", &["VP < (/^(VB|MD|TO)/=target $++ VP)"]),
    ("auxpass", "aux", &[
        r#"VP < (/^VB/&"am|is|are|was|were|be|been|being|get|got|gets|getting|gotten"=target $++ (VP <# VBN))"#,
    ]),
    ("cop", "aux", &[
        r#"VP < (/^VB/&"am|is|are|was|were|be|been|being|'s|'re|'m"=target $++ /^(ADJP|NP|PP|UCP)$/)"#,
    ]),
    ("iobj", "obj", &["VP < (NP=target $+ NP $-- /^VB/)"]),
    ("dobj", "obj", &["VP < (NP=target $-- /^VB/)", "SBAR < (WHNP=target $++ (S < NP))"]),
    ("xcomp", "comp", &["VP < (S=target !< NP)"]),
    ("advcl", "mod", &[
        r#"S|VP < (SBAR=target < (IN&"because|although|while|if|since|when|after|before|unless|though|until"))"#,
    ]),
    ("ccomp", "comp", &["VP < (SBAR=target $-- /^VB/)", "VP < (S=target < NP $-- /^VB/)"]),
    ("rcmod", "mod", &["NP < (NP $++ SBAR=target)"]),
    ("acl", "mod", &["NP < (NP $++ VP=target)"]),
    ("cc", "dep", &["__ < CC|CONJP=target"]),
    ("conj", "dep", &["__ < (CC|CONJP $+ __=target)", "__ < (/^,$/ $+ (__=target $++ CC))"]),
    ("appos", "mod", &["NP < (NP=target $- /^,$/ !$++ CC)"]),
    ("case", "dep", &["PP < (/^(IN|TO|RB)$/=target $++ NP|PP)", "NP < POS=target"]),
    ("nmod", "mod", &["__ < (PP=target < NP|PP)"]),
    ("poss", "mod", &["NP < (NP=target < POS)", "NP < PRP$|WP$=target"]),
    ("det", "mod", &["NP < DT|WDT|PDT=target"]),
    ("amod", "mod", &["NP < JJ|JJR|JJS|CD|QP|ADJP=target"]),
    ("nummod", "amod", &["NP < CD|QP=target"]),
    ("compound", "mod", &["NP < (NN|NNS|NNP|NNPS=target $++ NN|NNS|NNP|NNPS)"]),
    ("neg", "advmod", &[r#"__ < RB&"not|n't|never"=target"#]),
    ("advmod", "mod", &["__ < RB|RBR|RBS|WRB|ADVP=target"]),
    ("prt", "dep", &["VP < PRT|RP=target"]),

    // Introduced by the rewrite passes
    ("nsubjpass", "nsubj", &[]),
    ("csubjpass", "csubj", &[]),
    ("xsubj", "nsubj", &[]),
    ("agent", "arg", &[]),
    ("ref", "dep", &[]),
    ("name", "mod", &[]),
];
