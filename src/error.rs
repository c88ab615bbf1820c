//! Error and diagnostic types
//!
//! Hard failures (bad patterns, unreadable trees) are `Result` errors.
//! Structural anomalies met while converting a sentence are `Diagnostic`s:
//! they are logged, collected on the conversion, and never abort it.

use thiserror::Error;

use crate::tree::NodeId;

/// Error type for pattern compilation failures
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Pattern error: {0}")]
    Syntax(#[from] Box<pest::error::Error<crate::pattern::Rule>>),

    #[error("Pattern error: invalid regex /{pattern}/: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Pattern error: unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Pattern error: {0}")]
    Malformed(String),
}

/// Error type for bracketed tree parsing failures
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Tree error: {0}")]
    Syntax(#[from] Box<pest::error::Error<crate::tree::Rule>>),

    #[error("Tree error: tree has no nodes")]
    Empty,

    #[error("Tree error: {0}")]
    Malformed(String),
}

/// Error type for a failed conversion
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("cannot compile pattern for relation {relation}: {source}")]
    Pattern {
        relation: String,
        #[source]
        source: PatternError,
    },

    #[error("relation {relation} names unknown parent {parent}")]
    UnknownParent { relation: String, parent: String },

    #[error("tree has no nodes")]
    EmptyTree,

    #[error("conversion of sentence {sentence} panicked: {message}")]
    Panicked { sentence: usize, message: String },
}

/// A recoverable anomaly met during conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The head finder named no head for a phrase; its edges were skipped
    MissingHead { node: NodeId, label: String },
    /// A match collected earlier in a pass refers to an edge that is gone
    StaleMatch { pass: &'static str, detail: String },
    /// A pattern bound a target that is not a structural dependent of the node
    UnlabeledDependency { relation: String, governor: usize, dependent: usize },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::MissingHead { node, label } => {
                write!(f, "no head found for node {} ({})", node, label)
            }
            Diagnostic::StaleMatch { pass, detail } => {
                write!(f, "stale match in {}: {}", pass, detail)
            }
            Diagnostic::UnlabeledDependency { relation, governor, dependent } => write!(
                f,
                "{} matched non-structural pair {} -> {}",
                relation, governor, dependent
            ),
        }
    }
}

/// Collector for diagnostics that also logs each one as it arrives
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::UnlabeledDependency { .. } => {
                tracing::debug!(diagnostic = %diagnostic, "pattern target skipped")
            }
            _ => tracing::warn!(diagnostic = %diagnostic, "structural anomaly"),
        }
        self.items.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}
