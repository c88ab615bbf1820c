//! Treedeps: typed dependencies from constituency trees
//!
//! A head-percolated phrase-structure tree is turned into a basic
//! dependency tree whose labels come from a taxonomy of tree-pattern
//! driven relations, and the basic tree is then rewritten by an ordered
//! pipeline of passes into an enhanced graph (collapsed adpositions,
//! conjunct propagation, relative pronoun resolution, controlled
//! subjects).
//!
//! ```no_run
//! use treedeps::{Converter, Profile, Tree};
//!
//! let converter = Converter::english()?.with_profile(Profile::Enhanced);
//! let tree = Tree::from_bracketed("(ROOT (S (NP (NNP Sue)) (VP (VBD slept))))")?;
//! for line in converter.convert(&tree)?.enhanced.lines() {
//!     println!("{}", line);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder; // Basic dependency construction
pub mod catalog; // Relation catalogs (data)
pub mod config; // Profiles and pass switches
pub mod convert; // Converter facade and batch conversion
pub mod error;
pub mod graph; // Dependency graph with tombstones and token copies
pub mod head; // Head finding
pub mod matcher; // Tree pattern matching
pub mod pattern; // Tree pattern language
pub mod relation; // Relation registry and taxonomy tie-break
pub mod rewrite; // Rewrite pipeline passes
pub mod taxonomy; // Catalog compiled against a matcher
pub mod tree; // Constituency trees

// Re-exports for convenience
pub use catalog::Catalog;
pub use config::{PipelineConfig, Profile};
pub use convert::{Conversion, Converter};
pub use error::{ConvertError, Diagnostic, PatternError, TreeError};
pub use graph::{DependencyGraph, Edge, TokenId};
pub use head::{HeadFinder, RuleHeadFinder};
pub use matcher::{PatternMatcher, TreePatternMatcher};
pub use relation::{Relation, RelationRegistry};
pub use tree::{Node, NodeId, Token, Tree};
