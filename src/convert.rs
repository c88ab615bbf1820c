//! Conversion entry point
//!
//! A `Converter` bundles a compiled taxonomy, a head finder and a pipeline
//! configuration. Converting a tree yields both the basic tree and the
//! rewritten graph, with the diagnostics met along the way.
//!
//! ```text
//! Tree ──percolate──▶ build_basic ──▶ basic ──run_pipeline──▶ enhanced
//! ```

use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::{PipelineConfig, Profile};
use crate::error::{ConvertError, Diagnostic, Diagnostics};
use crate::graph::DependencyGraph;
use crate::head::{HeadFinder, RuleHeadFinder};
use crate::matcher::{PatternMatcher, TreePatternMatcher};
use crate::relation::{self, RelationRegistry};
use crate::taxonomy::{CoreRelations, Taxonomy};
use crate::tree::Tree;
use crate::builder::build_basic;
use crate::rewrite::run_pipeline;

/// The output of one sentence
#[derive(Debug, Clone)]
pub struct Conversion {
    /// The tree built from the constituency parse
    pub basic: DependencyGraph,
    /// The basic tree after the enabled rewrite passes
    pub enhanced: DependencyGraph,
    pub diagnostics: Vec<Diagnostic>,
}

/// Converts constituency trees into typed dependencies
pub struct Converter<M: PatternMatcher = TreePatternMatcher, H: HeadFinder = RuleHeadFinder> {
    taxonomy: Taxonomy<M>,
    head_finder: H,
    core: CoreRelations,
    config: PipelineConfig,
}

impl Converter {
    /// English catalog and head rules over the process-wide registry
    pub fn english() -> Result<Self, ConvertError> {
        Self::new(
            &Catalog::english(),
            TreePatternMatcher::new(),
            RuleHeadFinder::english(),
            relation::global(),
        )
    }
}

impl<M: PatternMatcher, H: HeadFinder> Converter<M, H> {
    pub fn new(
        catalog: &Catalog,
        matcher: M,
        head_finder: H,
        registry: Arc<RelationRegistry>,
    ) -> Result<Self, ConvertError> {
        let taxonomy = Taxonomy::compile(catalog, matcher, registry)?;
        let core = CoreRelations::resolve(taxonomy.registry());
        Ok(Self {
            taxonomy,
            head_finder,
            core,
            config: PipelineConfig::default(),
        })
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.config = PipelineConfig::for_profile(profile);
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<RelationRegistry> {
        self.taxonomy.registry()
    }

    /// Convert one tree
    ///
    /// Trees whose heads are not yet percolated are percolated on a copy
    /// with this converter's head finder.
    pub fn convert(&self, tree: &Tree) -> Result<Conversion, ConvertError> {
        if tree.is_empty() {
            return Err(ConvertError::EmptyTree);
        }
        let tree = if tree.is_percolated() {
            Cow::Borrowed(tree)
        } else {
            let mut owned = tree.clone();
            let missing = owned.percolate_heads(&self.head_finder);
            if !missing.is_empty() {
                tracing::trace!(count = missing.len(), "phrases without a head");
            }
            Cow::Owned(owned)
        };

        let mut diagnostics = Diagnostics::new();
        let basic = build_basic(&tree, &self.taxonomy, &self.core, &mut diagnostics);
        let mut enhanced = basic.clone();
        run_pipeline(&mut enhanced, &self.core, &self.config, &mut diagnostics);

        Ok(Conversion {
            basic,
            enhanced,
            diagnostics: diagnostics.into_vec(),
        })
    }

    /// Convert a batch, isolating each sentence
    ///
    /// A sentence whose conversion panics yields `ConvertError::Panicked`;
    /// the rest of the batch is unaffected.
    pub fn convert_all(&self, trees: &[Tree]) -> Vec<Result<Conversion, ConvertError>> {
        trees
            .iter()
            .enumerate()
            .map(|(sentence, tree)| {
                let _span = tracing::debug_span!("sentence", index = sentence).entered();
                panic::catch_unwind(AssertUnwindSafe(|| self.convert(tree))).unwrap_or_else(
                    |payload| {
                        let message = panic_message(payload.as_ref());
                        tracing::error!(sentence, %message, "conversion panicked");
                        Err(ConvertError::Panicked { sentence, message })
                    },
                )
            })
            .collect()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeId;

    fn converter(profile: Profile) -> Converter {
        Converter::new(
            &Catalog::english(),
            TreePatternMatcher::new(),
            RuleHeadFinder::english(),
            Arc::new(RelationRegistry::new()),
        )
        .unwrap()
        .with_profile(profile)
    }

    /// Panics on any phrase labelled `BOOM`
    struct Explosive;

    impl HeadFinder for Explosive {
        fn determine_head(&self, tree: &Tree, node: NodeId, parent: Option<NodeId>) -> Option<NodeId> {
            if tree.label(node) == "BOOM" {
                panic!("explosive head finder");
            }
            RuleHeadFinder::english().determine_head(tree, node, parent)
        }
    }

    #[test]
    fn test_convert_simple_sentence() {
        let tree = Tree::from_bracketed("(ROOT (S (NP (NNP Sue)) (VP (VBD slept)) (. .)))").unwrap();
        let conversion = converter(Profile::Enhanced).convert(&tree).unwrap();
        assert_eq!(
            conversion.basic.lines(),
            vec!["root(ROOT-0, slept-2)", "nsubj(slept-2, Sue-1)", "punct(slept-2, .-3)"]
        );
        assert!(conversion.basic.is_tree());
        assert!(conversion.diagnostics.is_empty());
    }

    #[test]
    fn test_basic_profile_leaves_tree_unchanged() {
        let tree = Tree::from_bracketed(
            "(ROOT (S (NP (NNP Sue)) (VP (VBD sat) (PP (IN on) (NP (DT the) (NN mat))))))",
        )
        .unwrap();
        let conversion = converter(Profile::Basic).convert(&tree).unwrap();
        assert_eq!(conversion.basic.lines(), conversion.enhanced.lines());

        let conversion = converter(Profile::Enhanced).convert(&tree).unwrap();
        assert!(conversion.enhanced.lines().contains(&"nmod:on(sat-2, mat-5)".to_string()));
        assert!(conversion.basic.lines().contains(&"case(mat-5, on-3)".to_string()));
    }

    #[test]
    fn test_empty_tree_rejected() {
        let result = converter(Profile::Enhanced).convert(&Tree::new());
        assert!(matches!(result, Err(ConvertError::EmptyTree)));
    }

    #[test]
    fn test_convert_all_isolates_panics() {
        let converter = Converter::new(
            &Catalog::english(),
            TreePatternMatcher::new(),
            Explosive,
            Arc::new(RelationRegistry::new()),
        )
        .unwrap();
        let trees = vec![
            Tree::from_bracketed("(ROOT (S (NP (NNP Sue)) (VP (VBD slept))))").unwrap(),
            Tree::from_bracketed("(ROOT (BOOM (NN x)))").unwrap(),
            Tree::from_bracketed("(ROOT (S (NP (NNP Bob)) (VP (VBD ran))))").unwrap(),
        ];
        let results = converter.convert_all(&trees);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        match &results[1] {
            Err(ConvertError::Panicked { sentence, message }) => {
                assert_eq!(*sentence, 1);
                assert!(message.contains("explosive"));
            }
            other => panic!("expected a caught panic, got {:?}", other.as_ref().map(|c| c.basic.lines())),
        }
        let last = results[2].as_ref().unwrap();
        assert_eq!(last.enhanced.lines()[0], "root(ROOT-0, ran-2)");
    }
}
