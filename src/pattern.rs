//! Tree pattern representation and parsing
//!
//! A pattern describes a tree node and, through relational clauses, the
//! nodes around it. Patterns are parsed with a pest grammar into the AST
//! below and evaluated by `matcher::TreePatternMatcher`.

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use regex::Regex;
use std::fmt::Debug;

use crate::error::PatternError;
use crate::tree::{NodeId, Tree, basic_category};

#[derive(Parser)]
#[grammar = "pattern.pest"]
struct PatternParser;

/// One condition on a single node
#[derive(Clone)]
pub enum Atom {
    /// `__` matches any node
    Any,
    /// `NP|NX` matches the label or its basic category
    Labels(Vec<String>),
    /// `/^VB/` is searched in the label
    Regex(String, Regex),
    /// `"is|was"` matches a leaf whose lowercased form is listed
    Words(Vec<String>),
}

impl Debug for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Atom::Any => write!(f, "Any"),
            Atom::Labels(labels) => f.debug_tuple("Labels").field(labels).finish(),
            Atom::Regex(pattern, _) => f.debug_tuple("Regex").field(pattern).finish(),
            Atom::Words(words) => f.debug_tuple("Words").field(words).finish(),
        }
    }
}

// Compare pattern strings, not compiled regexes
impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Atom::Any, Atom::Any) => true,
            (Atom::Labels(a), Atom::Labels(b)) => a == b,
            (Atom::Regex(a, _), Atom::Regex(b, _)) => a == b,
            (Atom::Words(a), Atom::Words(b)) => a == b,
            _ => false,
        }
    }
}

impl Atom {
    pub fn matches(&self, tree: &Tree, node: NodeId) -> bool {
        let label = tree.label(node);
        match self {
            Atom::Any => true,
            Atom::Labels(labels) => {
                let basic = basic_category(label);
                labels.iter().any(|l| l == label || l == basic)
            }
            Atom::Regex(_, re) => re.is_match(label),
            Atom::Words(words) => tree
                .token(node)
                .is_some_and(|t| words.iter().any(|w| *w == t.lower())),
        }
    }
}

/// Structural relation between the described node and an operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `<` has the operand as a child
    Child,
    /// `<<` dominates the operand
    Descendant,
    /// `>` is a child of the operand
    Parent,
    /// `>>` is dominated by the operand
    Ancestor,
    /// `<,` has the operand as its first child
    FirstChild,
    /// `<-` has the operand as its last child
    LastChild,
    /// `<#` has the operand as its head child
    HeadChild,
    /// `<<#` operand is reachable through a chain of head children
    HeadDescendant,
    /// `$+` operand is the immediately following sister
    NextSister,
    /// `$-` operand is the immediately preceding sister
    PrevSister,
    /// `$++` operand is some following sister
    RightSister,
    /// `$--` operand is some preceding sister
    LeftSister,
    /// `$` operand is any sister
    Sister,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Result<Self, PatternError> {
        let op = match symbol {
            "<" => Operator::Child,
            "<<" => Operator::Descendant,
            ">" => Operator::Parent,
            ">>" => Operator::Ancestor,
            "<," => Operator::FirstChild,
            "<-" => Operator::LastChild,
            "<#" => Operator::HeadChild,
            "<<#" => Operator::HeadDescendant,
            "$+" => Operator::NextSister,
            "$-" => Operator::PrevSister,
            "$++" => Operator::RightSister,
            "$--" => Operator::LeftSister,
            "$" => Operator::Sister,
            other => return Err(PatternError::UnknownOperator(other.to_string())),
        };
        Ok(op)
    }
}

/// A relational clause: `!$++ CC`
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub negated: bool,
    pub operator: Operator,
    pub operand: PatternNode,
}

/// A node description with an optional binding and its clauses
#[derive(Debug, Clone, PartialEq)]
pub struct PatternNode {
    pub atoms: Vec<Atom>,
    pub binding: Option<String>,
    pub clauses: Vec<Clause>,
}

impl PatternNode {
    /// All atoms must hold
    pub fn describes(&self, tree: &Tree, node: NodeId) -> bool {
        self.atoms.iter().all(|a| a.matches(tree, node))
    }

    /// Names bound anywhere in this pattern
    pub fn bindings(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.binding.iter().map(String::as_str).collect();
        for clause in &self.clauses {
            names.extend(clause.operand.bindings());
        }
        names
    }
}

/// Parse a pattern string into its AST
pub fn parse_pattern(input: &str) -> Result<PatternNode, PatternError> {
    let mut pairs = PatternParser::parse(Rule::pattern, input).map_err(Box::new)?;
    let Some(node) = pairs.next().and_then(|p| p.into_inner().next()) else {
        return Err(PatternError::Malformed(format!("empty pattern: {}", input)));
    };
    parse_node(node)
}

/// Parse `node` or `simple_node`
fn parse_node(pair: Pair<Rule>) -> Result<PatternNode, PatternError> {
    let mut atoms = Vec::new();
    let mut binding = None;
    let mut clauses = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::description => {
                for atom in inner.into_inner() {
                    atoms.push(parse_atom(atom)?);
                }
            }
            Rule::binding => {
                let Some(ident) = inner.into_inner().next() else {
                    return Err(PatternError::Malformed("binding without name".to_string()));
                };
                binding = Some(ident.as_str().to_string());
            }
            Rule::clause => clauses.push(parse_clause(inner)?),
            rule => {
                return Err(PatternError::Malformed(format!("unexpected {:?}", rule)));
            }
        }
    }

    Ok(PatternNode {
        atoms,
        binding,
        clauses,
    })
}

fn parse_atom(pair: Pair<Rule>) -> Result<Atom, PatternError> {
    match pair.as_rule() {
        Rule::any => Ok(Atom::Any),
        Rule::labels => Ok(Atom::Labels(
            pair.as_str().split('|').map(str::to_string).collect(),
        )),
        Rule::regex => {
            let body = pair
                .into_inner()
                .next()
                .map(|p| p.as_str().to_string())
                .unwrap_or_default();
            let re = Regex::new(&body).map_err(|source| PatternError::Regex {
                pattern: body.clone(),
                source,
            })?;
            Ok(Atom::Regex(body, re))
        }
        Rule::words => {
            let body = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
            Ok(Atom::Words(
                body.split('|').map(|w| w.to_lowercase()).collect(),
            ))
        }
        rule => Err(PatternError::Malformed(format!("unexpected atom {:?}", rule))),
    }
}

fn parse_clause(pair: Pair<Rule>) -> Result<Clause, PatternError> {
    let mut negated = false;
    let mut operator = None;
    let mut operand = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::negation => negated = true,
            Rule::operator => operator = Some(Operator::from_symbol(inner.as_str())?),
            Rule::node | Rule::simple_node => operand = Some(parse_node(inner)?),
            rule => {
                return Err(PatternError::Malformed(format!("unexpected {:?}", rule)));
            }
        }
    }

    let (Some(operator), Some(operand)) = (operator, operand) else {
        return Err(PatternError::Malformed("incomplete clause".to_string()));
    };
    Ok(Clause {
        negated,
        operator,
        operand,
    })
}
