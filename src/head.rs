//! Head finding
//!
//! A `HeadFinder` names the head child of a phrase. The builder only needs
//! the trait; `RuleHeadFinder` is a table-driven implementation for Penn
//! Treebank English that prefers semantic heads: auxiliaries and copulas
//! do not head their VP, and prepositional phrases are headed by their
//! object.

use rustc_hash::FxHashMap;

use crate::tree::{NodeId, Tree, basic_category};

/// Names the head child of a phrase
pub trait HeadFinder: Send + Sync {
    fn determine_head(&self, tree: &Tree, node: NodeId, parent: Option<NodeId>) -> Option<NodeId>;
}

/// Search direction for one head rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// For each category in order, the leftmost child with it
    Left,
    /// For each category in order, the rightmost child with it
    Right,
    /// The leftmost child with any of the categories
    LeftDis,
    /// The rightmost child with any of the categories
    RightDis,
}

/// One step of a head rule chain
#[derive(Debug, Clone)]
pub struct HeadRule {
    pub direction: Direction,
    pub categories: Vec<String>,
}

impl HeadRule {
    fn new(direction: Direction, categories: &[&str]) -> Self {
        Self {
            direction,
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }
}

const AUXILIARIES: &[&str] = &[
    "be", "being", "been", "am", "are", "is", "was", "were", "'m", "'re", "'s", "s", "ai",
    "have", "has", "had", "having", "'ve", "'d", "do", "does", "did", "will", "would", "shall",
    "should", "can", "could", "may", "might", "must", "wo", "ca", "to",
];

const COPULAS: &[&str] = &[
    "be", "being", "been", "am", "are", "is", "was", "were", "'m", "'re", "'s", "s", "ai",
];

/// Table-driven head finder
#[derive(Debug, Clone)]
pub struct RuleHeadFinder {
    rules: FxHashMap<String, Vec<HeadRule>>,
    semantic: bool,
}

impl RuleHeadFinder {
    /// Build a head finder from an explicit rule table
    pub fn new(rules: FxHashMap<String, Vec<HeadRule>>) -> Self {
        Self {
            rules,
            semantic: false,
        }
    }

    /// English rules with semantic VP heads
    pub fn english() -> Self {
        use Direction::*;

        let table: &[(&str, &[(Direction, &[&str])])] = &[
            ("ADJP", &[(Left, &["NNS", "QP", "NN", "$", "ADVP", "JJ", "VBN", "VBG", "ADJP", "JJR", "NP", "JJS", "DT", "FW", "RBR", "RBS", "SBAR", "RB"])]),
            ("ADVP", &[(Right, &["RB", "RBR", "RBS", "FW", "ADVP", "TO", "CD", "JJR", "JJ", "IN", "NP", "JJS", "NN"])]),
            ("CONJP", &[(Left, &["CC", "RB", "IN"])]),
            ("FRAG", &[(Right, &[])]),
            ("INTJ", &[(Left, &[])]),
            ("LST", &[(Right, &["LS", ":"])]),
            ("NAC", &[(Left, &["NN", "NNS", "NNP", "NNPS", "NP", "NAC", "EX", "$", "CD", "QP", "PRP", "VBG", "JJ", "JJS", "JJR", "ADJP", "FW"])]),
            ("NX", &[(Right, &["NP", "NX"])]),
            ("PP", &[(Left, &["NP", "S", "SBAR", "SBARQ", "ADJP", "ADVP", "VP", "PP", "SQ"]), (Right, &["IN", "TO", "VBG", "VBN", "RP", "FW"])]),
            ("PRN", &[(Left, &["VP", "NP", "PP", "S", "SINV", "SBAR", "ADJP", "ADVP", "INTJ", "WHNP", "NAC", "VBP", "JJ", "NN", "NNP"])]),
            ("PRT", &[(Right, &["RP"])]),
            ("QP", &[(Left, &["$", "IN", "NNS", "NN", "JJ", "CD", "PDT", "DT", "RB", "NCD", "QP", "JJR", "JJS"])]),
            ("RRC", &[(Right, &["VP", "NP", "ADVP", "ADJP", "PP"])]),
            ("S", &[(Left, &["TO", "VP", "S", "FRAG", "SBAR", "ADJP", "UCP", "NP"])]),
            ("SBAR", &[(Left, &["S", "SQ", "SINV", "SBAR", "FRAG", "VP", "WHNP", "WHPP", "WHADVP", "WHADJP", "IN", "DT"])]),
            ("SBARQ", &[(Left, &["SQ", "S", "SINV", "SBARQ", "FRAG", "SBAR"])]),
            ("SINV", &[(Left, &["VBZ", "VBD", "VBP", "VB", "MD", "VBN", "VP", "S", "SINV", "ADJP", "JJP", "NP"])]),
            ("SQ", &[(Left, &["VBZ", "VBD", "VBP", "VB", "MD", "AUX", "AUXG", "VP", "SQ"])]),
            ("UCP", &[(Right, &[])]),
            ("VP", &[(Left, &["TO", "VBD", "VBN", "MD", "VBZ", "VB", "VBG", "VBP", "VP", "ADJP", "JJP", "NN", "NNS", "JJ", "NP", "NNP"])]),
            ("WHADJP", &[(Left, &["WRB", "WHADVP", "RB", "JJ", "ADJP", "JJP", "JJR"])]),
            ("WHADVP", &[(Right, &["WRB", "WHADVP"])]),
            ("WHNP", &[(Left, &["WDT", "WP", "WP$", "WHADJP", "WHPP", "WHNP"])]),
            ("WHPP", &[(Right, &["IN", "TO", "FW"])]),
            ("X", &[(Right, &["S", "VP", "ADJP", "JJP", "NP", "SBAR", "PP", "X"])]),
            ("NP", &[
                (RightDis, &["NN", "NNP", "NNPS", "NNS", "NX", "JJR"]),
                (Left, &["NP", "PRP"]),
                (RightDis, &["$", "ADJP", "PRN", "FW"]),
                (Right, &["CD"]),
                (RightDis, &["JJ", "JJS", "RB", "QP", "DT", "WDT", "RBR", "ADVP"]),
            ]),
            ("ROOT", &[(Left, &["S", "SQ", "SINV", "SBARQ", "FRAG", "NP", "VP"])]),
        ];

        let mut rules = FxHashMap::default();
        for (category, chain) in table {
            let chain = chain
                .iter()
                .map(|(direction, cats)| HeadRule::new(*direction, cats))
                .collect();
            rules.insert(category.to_string(), chain);
        }

        Self {
            rules,
            semantic: true,
        }
    }

    fn matches(tree: &Tree, child: NodeId, category: &str) -> bool {
        basic_category(tree.label(child)) == category
    }

    fn apply_rule(tree: &Tree, children: &[NodeId], rule: &HeadRule) -> Option<NodeId> {
        match rule.direction {
            Direction::Left => rule.categories.iter().find_map(|cat| {
                children.iter().copied().find(|&c| Self::matches(tree, c, cat))
            }),
            Direction::Right => rule.categories.iter().find_map(|cat| {
                children.iter().rev().copied().find(|&c| Self::matches(tree, c, cat))
            }),
            Direction::LeftDis => children.iter().copied().find(|&c| {
                rule.categories.iter().any(|cat| Self::matches(tree, c, cat))
            }),
            Direction::RightDis => children.iter().rev().copied().find(|&c| {
                rule.categories.iter().any(|cat| Self::matches(tree, c, cat))
            }),
        }
    }

    /// Auxiliary and copula verbs hand the head to their complement
    fn semantic_vp_head(&self, tree: &Tree, children: &[NodeId]) -> Option<NodeId> {
        let (pos, verb) = children.iter().enumerate().find(|&(_, &c)| {
            let label = tree.label(c);
            tree.is_leaf(c) && (label.starts_with("VB") || label == "MD" || label == "TO")
        })?;
        let form = tree.token(*verb)?.lower();
        let rest = &children[pos + 1..];

        if AUXILIARIES.contains(&form.as_str()) {
            if let Some(&vp) = rest.iter().find(|&&c| Self::matches(tree, c, "VP")) {
                return Some(vp);
            }
        }
        if COPULAS.contains(&form.as_str()) {
            return rest.iter().copied().find(|&c| {
                matches!(basic_category(tree.label(c)), "ADJP" | "NP" | "PP" | "UCP")
            });
        }
        None
    }
}

impl HeadFinder for RuleHeadFinder {
    fn determine_head(&self, tree: &Tree, node: NodeId, _parent: Option<NodeId>) -> Option<NodeId> {
        let children = tree.children(node);
        match children {
            [] => return None,
            [only] => return Some(*only),
            _ => {}
        }

        let category = basic_category(tree.label(node));
        if self.semantic && category == "VP" {
            if let Some(head) = self.semantic_vp_head(tree, children) {
                return Some(head);
            }
        }

        let Some(chain) = self.rules.get(category) else {
            return children.first().copied();
        };
        for rule in chain {
            if let Some(head) = Self::apply_rule(tree, children, rule) {
                return Some(head);
            }
        }

        // Fall back on the outer edge of the first rule's direction
        match chain.first().map(|r| r.direction) {
            Some(Direction::Left | Direction::LeftDis) if category != "NP" => children.first().copied(),
            _ => children.last().copied(),
        }
    }
}
