//! Pattern matching against constituency trees
//!
//! `PatternMatcher` is the seam the builder relies on: compile a pattern
//! source once, then ask for every match rooted at a given node.
//! `TreePatternMatcher` is the reference implementation for the
//! `pattern` language. It evaluates by recursive backtracking: clauses
//! are conjunctive, each clause tries every candidate node in tree order,
//! and each surviving binding environment is a separate match.

use rustc_hash::FxHashSet;

use crate::error::PatternError;
use crate::pattern::{Operator, PatternNode, parse_pattern};
use crate::tree::{NodeId, Tree};

/// A successful match: named nodes bound by the pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Match {
    bindings: Vec<(String, NodeId)>,
}

impl Match {
    /// Get the node ID bound to a name
    ///
    /// Returns None if the pattern has no such binding
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.bindings
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }

    /// Iterate over bindings in the order they were made
    pub fn iter_named(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.bindings.iter().map(|(n, id)| (n.as_str(), *id))
    }

    /// Bind a name; false if it is already bound to another node
    fn bind(&mut self, name: &str, node: NodeId) -> bool {
        match self.get(name) {
            Some(existing) => existing == node,
            None => {
                self.bindings.push((name.to_string(), node));
                true
            }
        }
    }
}

/// Evaluates structural patterns against tree nodes
pub trait PatternMatcher: Send + Sync {
    type Compiled: Send + Sync;

    /// Compile a pattern source
    fn compile(&self, source: &str) -> Result<Self::Compiled, PatternError>;

    /// All matches of a compiled pattern rooted at `node`
    fn find(&self, pattern: &Self::Compiled, tree: &Tree, node: NodeId) -> Vec<Match>;
}

/// A parsed pattern ready for matching
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub source: String,
    pub root: PatternNode,
}

/// Backtracking matcher for the `pattern` language
#[derive(Debug, Clone, Copy, Default)]
pub struct TreePatternMatcher;

impl TreePatternMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Nodes standing in `operator` relation to `node`, in tree order
    fn candidates(tree: &Tree, node: NodeId, operator: Operator) -> Vec<NodeId> {
        match operator {
            Operator::Child => tree.children(node).to_vec(),
            Operator::Descendant => tree.descendants(node),
            Operator::Parent => tree.parent(node).into_iter().collect(),
            Operator::Ancestor => tree.ancestors(node),
            Operator::FirstChild => tree.children(node).first().copied().into_iter().collect(),
            Operator::LastChild => tree.children(node).last().copied().into_iter().collect(),
            Operator::HeadChild => tree.head_child(node).into_iter().collect(),
            Operator::HeadDescendant => {
                let mut chain = Vec::new();
                let mut current = tree.head_child(node);
                while let Some(h) = current {
                    chain.push(h);
                    current = tree.head_child(h);
                }
                chain
            }
            Operator::NextSister => tree.sisters(node).1.first().copied().into_iter().collect(),
            Operator::PrevSister => tree.sisters(node).0.last().copied().into_iter().collect(),
            Operator::RightSister => tree.sisters(node).1,
            Operator::LeftSister => tree.sisters(node).0,
            Operator::Sister => {
                let (mut left, right) = tree.sisters(node);
                left.extend(right);
                left
            }
        }
    }

    /// Every binding environment under which `pattern` holds at `node`
    fn match_node(tree: &Tree, pattern: &PatternNode, node: NodeId, env: Match) -> Vec<Match> {
        if !pattern.describes(tree, node) {
            return Vec::new();
        }
        let mut env = env;
        if let Some(name) = &pattern.binding {
            if !env.bind(name, node) {
                return Vec::new();
            }
        }

        let mut envs = vec![env];
        for clause in &pattern.clauses {
            let candidates = Self::candidates(tree, node, clause.operator);
            let mut next = Vec::new();
            for env in envs {
                if clause.negated {
                    // Bindings made inside a negation are discarded
                    let satisfied = candidates.iter().any(|&c| {
                        !Self::match_node(tree, &clause.operand, c, env.clone()).is_empty()
                    });
                    if !satisfied {
                        next.push(env);
                    }
                } else {
                    for &c in &candidates {
                        next.extend(Self::match_node(tree, &clause.operand, c, env.clone()));
                    }
                }
            }
            envs = next;
            if envs.is_empty() {
                break;
            }
        }
        envs
    }
}

impl PatternMatcher for TreePatternMatcher {
    type Compiled = CompiledPattern;

    fn compile(&self, source: &str) -> Result<CompiledPattern, PatternError> {
        Ok(CompiledPattern {
            source: source.to_string(),
            root: parse_pattern(source)?,
        })
    }

    fn find(&self, pattern: &CompiledPattern, tree: &Tree, node: NodeId) -> Vec<Match> {
        let mut seen = FxHashSet::default();
        Self::match_node(tree, &pattern.root, node, Match::default())
            .into_iter()
            .filter(|m| seen.insert(m.clone()))
            .collect()
    }
}
