//! Constituency tree data structures
//!
//! A `Tree` is an arena of category-labelled nodes over the sentence's
//! tokens. Leaves wrap exactly one token (the leaf label is the token's
//! part-of-speech tag); phrases own an ordered list of children. Nodes
//! are addressed by `NodeId`, tokens by their position in `Tree::tokens`.
//!
//! The only mutable state after construction is the head cache filled in
//! by `Tree::percolate_heads`.

use pest::Parser;
use pest_derive::Parser;

use crate::error::TreeError;
use crate::head::HeadFinder;

#[derive(Parser)]
#[grammar = "bracketed.pest"]
struct BracketedParser;

/// Unique identifier for a node
pub type NodeId = usize;

/// A sentence token
///
/// `index` is the 1-based sentence position. Copies of a token (made when
/// a conjoined governor must be duplicated) keep the same index and form
/// but carry a non-zero `copy` number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub index: usize,
    pub form: String,
    pub tag: String,
    pub ner: Option<String>,
    pub copy: u32,
}

impl Token {
    /// Create a new token with the given attributes
    pub fn new(index: usize, form: &str, tag: &str) -> Self {
        Self {
            index,
            form: form.to_string(),
            tag: tag.to_string(),
            ner: None,
            copy: 0,
        }
    }

    pub fn is_copy(&self) -> bool {
        self.copy > 0
    }

    /// Lowercased surface form
    pub fn lower(&self) -> String {
        self.form.to_lowercase()
    }

    /// Punctuation by tag, falling back to the form for unknown tags
    pub fn is_punctuation(&self) -> bool {
        matches!(
            self.tag.as_str(),
            "." | "," | ":" | "``" | "''" | "-LRB-" | "-RRB-" | "HYPH" | "NFP"
        ) || (!self.form.is_empty() && self.form.chars().all(|c| c.is_ascii_punctuation()))
    }
}

/// A node in a constituency tree
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Position in `Tree::tokens` for leaves
    pub token: Option<usize>,
    head_child: Option<NodeId>,
    head_token: Option<usize>,
}

impl Node {
    fn new(id: NodeId, label: &str, token: Option<usize>) -> Self {
        Self {
            id,
            label: label.to_string(),
            parent: None,
            children: Vec::new(),
            token,
            head_child: None,
            head_token: token,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.token.is_some()
    }
}

/// Strip function tags and indices: `NP-SBJ-1` -> `NP`, `-LRB-` stays
pub fn basic_category(label: &str) -> &str {
    if label.starts_with('-') {
        return label;
    }
    match label.find(['-', '=']) {
        Some(0) | None => label,
        Some(pos) => &label[..pos],
    }
}

/// A constituency tree (sentence)
#[derive(Debug, Clone, Default)]
pub struct Tree {
    pub nodes: Vec<Node>,
    pub tokens: Vec<Token>,
    pub root_id: Option<NodeId>,
    percolated: bool,
}

impl Tree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a Penn-style bracketed tree
    ///
    /// Preterminals such as `(NN dog)` become leaves; a missing top label
    /// (`( (S ...))`) becomes `ROOT`.
    pub fn from_bracketed(text: &str) -> Result<Self, TreeError> {
        let mut pairs = BracketedParser::parse(Rule::tree, text).map_err(Box::new)?;
        let Some(top) = pairs.next().and_then(|p| p.into_inner().next()) else {
            return Err(TreeError::Empty);
        };

        let mut tree = Tree::new();
        let root = tree.build_node(top)?;
        tree.root_id = Some(root);
        Ok(tree)
    }

    fn build_node(&mut self, pair: pest::iterators::Pair<Rule>) -> Result<NodeId, TreeError> {
        let mut label = None;
        let mut word = None;
        let mut children = Vec::new();

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::label => label = Some(inner.as_str().to_string()),
                Rule::word => word = Some(inner.as_str().to_string()),
                Rule::node => children.push(inner),
                _ => {}
            }
        }

        if let Some(word) = word {
            let Some(tag) = label else {
                return Err(TreeError::Malformed(format!("word {} has no tag", word)));
            };
            return Ok(self.add_leaf(&word, &tag));
        }

        let id = self.add_phrase(label.as_deref().unwrap_or("ROOT"));
        for child in children {
            let child_id = self.build_node(child)?;
            self.set_parent(child_id, id);
        }
        Ok(id)
    }

    /// Add a phrase node (no parent yet)
    pub fn add_phrase(&mut self, label: &str) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::new(id, label, None));
        self.percolated = false;
        id
    }

    /// Add a leaf for the next token of the sentence
    ///
    /// Leaves must be added in sentence order; the token index is assigned
    /// from the number of tokens seen so far.
    pub fn add_leaf(&mut self, form: &str, tag: &str) -> NodeId {
        let position = self.tokens.len();
        self.tokens.push(Token::new(position + 1, form, tag));
        let id = self.nodes.len();
        self.nodes.push(Node::new(id, tag, Some(position)));
        id
    }

    /// Set the parent of a node, appending it to the parent's children
    pub fn set_parent(&mut self, child_id: NodeId, parent_id: NodeId) {
        if let Some(child) = self.nodes.get_mut(child_id) {
            child.parent = Some(parent_id);
        }
        if let Some(parent) = self.nodes.get_mut(parent_id) {
            parent.children.push(child_id);
        }
        self.percolated = false;
    }

    /// Attach a named-entity tag to the token at a 1-based index
    pub fn set_ner(&mut self, index: usize, ner: &str) {
        if let Some(token) = index.checked_sub(1).and_then(|i| self.tokens.get_mut(i)) {
            token.ner = Some(ner.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn label(&self, id: NodeId) -> &str {
        self.nodes.get(id).map(|n| n.label.as_str()).unwrap_or("")
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(Node::is_leaf)
    }

    /// Token wrapped by a leaf
    pub fn token(&self, id: NodeId) -> Option<&Token> {
        self.nodes
            .get(id)
            .and_then(|n| n.token)
            .and_then(|t| self.tokens.get(t))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Ancestors, nearest first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(p) = current {
            out.push(p);
            current = self.parent(p);
        }
        out
    }

    /// Proper descendants in preorder
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev());
        }
        out
    }

    /// All nodes in preorder from the root
    pub fn preorder(&self) -> Vec<NodeId> {
        match self.root_id {
            Some(root) => {
                let mut out = vec![root];
                out.extend(self.descendants(root));
                out
            }
            None => Vec::new(),
        }
    }

    /// All nodes in postorder from the root
    pub fn postorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let Some(root) = self.root_id else {
            return out;
        };
        let mut stack = vec![(root, false)];
        while let Some((n, expanded)) = stack.pop() {
            if expanded {
                out.push(n);
            } else {
                stack.push((n, true));
                for &c in self.children(n).iter().rev() {
                    stack.push((c, false));
                }
            }
        }
        out
    }

    /// Leaves dominated by a node, left to right
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        if self.is_leaf(id) {
            return vec![id];
        }
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.is_leaf(n))
            .collect()
    }

    /// Tokens dominated by a node, left to right
    pub fn yield_tokens(&self, id: NodeId) -> Vec<&Token> {
        self.leaves(id)
            .into_iter()
            .filter_map(|leaf| self.token(leaf))
            .collect()
    }

    /// Sisters of a node in order, excluding the node itself
    pub fn sisters(&self, id: NodeId) -> (Vec<NodeId>, Vec<NodeId>) {
        let Some(parent) = self.parent(id) else {
            return (Vec::new(), Vec::new());
        };
        let siblings = self.children(parent);
        match siblings.iter().position(|&s| s == id) {
            Some(pos) => (siblings[..pos].to_vec(), siblings[pos + 1..].to_vec()),
            None => (Vec::new(), Vec::new()),
        }
    }

    /// Cached head child of a phrase
    pub fn head_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.head_child)
    }

    /// Position in `tokens` of the lexical head of a node
    pub fn head_token_position(&self, id: NodeId) -> Option<usize> {
        self.nodes.get(id).and_then(|n| n.head_token)
    }

    /// Lexical head token of a node
    pub fn head_token(&self, id: NodeId) -> Option<&Token> {
        self.head_token_position(id).and_then(|t| self.tokens.get(t))
    }

    pub fn is_percolated(&self) -> bool {
        self.percolated
    }

    /// Fill the head cache bottom-up using a head finder
    ///
    /// Returns the phrases for which no head could be determined; their
    /// head token (and that of every ancestor headed through them) stays
    /// unset.
    pub fn percolate_heads(&mut self, finder: &dyn HeadFinder) -> Vec<NodeId> {
        let mut missing = Vec::new();
        for id in self.postorder() {
            if self.nodes[id].is_leaf() {
                continue;
            }
            let parent = self.nodes[id].parent;
            let head = finder.determine_head(self, id, parent);
            let head_token = head.and_then(|h| self.nodes[h].head_token);
            if head.is_none() {
                missing.push(id);
            }
            let node = &mut self.nodes[id];
            node.head_child = head;
            node.head_token = head_token;
        }
        self.percolated = true;
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::head::RuleHeadFinder;

    #[test]
    fn test_tree_creation() {
        let mut tree = Tree::new();
        let s = tree.add_phrase("S");
        let np = tree.add_phrase("NP");
        let dog = tree.add_leaf("dog", "NN");
        let vp = tree.add_phrase("VP");
        let runs = tree.add_leaf("runs", "VBZ");
        tree.set_parent(np, s);
        tree.set_parent(dog, np);
        tree.set_parent(vp, s);
        tree.set_parent(runs, vp);
        tree.root_id = Some(s);

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.parent(dog), Some(np));
        assert_eq!(tree.children(s), &[np, vp]);
        assert_eq!(tree.token(runs).unwrap().index, 2);
    }

    #[test]
    fn test_from_bracketed() {
        let tree = Tree::from_bracketed("(ROOT (S (NP (DT The) (NN dog)) (VP (VBZ runs)) (. .)))")
            .unwrap();
        let forms: Vec<&str> = tree.tokens.iter().map(|t| t.form.as_str()).collect();
        assert_eq!(forms, vec!["The", "dog", "runs", "."]);
        assert_eq!(tree.tokens[1].tag, "NN");
        assert_eq!(tree.tokens[3].index, 4);

        let root = tree.root_id.unwrap();
        assert_eq!(tree.label(root), "ROOT");
        assert_eq!(tree.yield_tokens(root).len(), 4);
    }

    #[test]
    fn test_from_bracketed_unlabelled_root() {
        let tree = Tree::from_bracketed("( (S (NP (PRP it)) (VP (VBD rained))))").unwrap();
        assert_eq!(tree.label(tree.root_id.unwrap()), "ROOT");
    }

    #[test]
    fn test_from_bracketed_errors() {
        assert!(Tree::from_bracketed("(S (NP (NN dog)").is_err());
        assert!(Tree::from_bracketed("").is_err());
    }

    #[test]
    fn test_basic_category() {
        assert_eq!(basic_category("NP-SBJ-1"), "NP");
        assert_eq!(basic_category("NP=2"), "NP");
        assert_eq!(basic_category("-LRB-"), "-LRB-");
        assert_eq!(basic_category("VP"), "VP");
    }

    #[test]
    fn test_traversal_orders() {
        // (S (NP (NN dog)) (VP (VBZ runs)))
        //   ids: S=0 NP=1 dog=2 VP=3 runs=4
        let tree = Tree::from_bracketed("(S (NP (NN dog)) (VP (VBZ runs)))").unwrap();
        assert_eq!(tree.preorder(), vec![0, 1, 2, 3, 4]);
        assert_eq!(tree.postorder(), vec![2, 1, 4, 3, 0]);
        assert_eq!(tree.ancestors(2), vec![1, 0]);
        assert_eq!(tree.leaves(0), vec![2, 4]);
        assert_eq!(tree.sisters(1), (vec![], vec![3]));
        assert_eq!(tree.sisters(3), (vec![1], vec![]));
    }

    #[test]
    fn test_percolate_heads() {
        let mut tree =
            Tree::from_bracketed("(S (NP (DT the) (NN dog)) (VP (VBD barked)))").unwrap();
        assert!(!tree.is_percolated());
        let missing = tree.percolate_heads(&RuleHeadFinder::english());
        assert!(missing.is_empty());
        assert!(tree.is_percolated());

        let root = tree.root_id.unwrap();
        assert_eq!(tree.head_token(root).unwrap().form, "barked");
        // NP is node 1, its head child is the NN leaf (node 3)
        assert_eq!(tree.head_child(1), Some(3));
        assert_eq!(tree.head_token(1).unwrap().form, "dog");
    }

    #[test]
    fn test_set_ner() {
        let mut tree = Tree::from_bracketed("(NP (NNP Barack) (NNP Obama))").unwrap();
        tree.set_ner(1, "PERSON");
        tree.set_ner(9, "PERSON");
        assert_eq!(tree.tokens[0].ner.as_deref(), Some("PERSON"));
        assert_eq!(tree.tokens[1].ner, None);
    }

    #[test]
    fn test_token_punctuation() {
        assert!(Token::new(1, ",", ",").is_punctuation());
        assert!(Token::new(1, "--", ":").is_punctuation());
        assert!(!Token::new(1, "dog", "NN").is_punctuation());
    }
}
