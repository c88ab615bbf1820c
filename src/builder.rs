//! Basic dependency construction
//!
//! The shape of the basic graph comes from head percolation alone: inside
//! every phrase, the head token of each non-head child depends on the head
//! token of the phrase. The taxonomy only chooses labels. Each pattern
//! target proposes a relation for the pair (head of the phrase, head of
//! the target); when several relations are proposed for one pair the
//! registry's tie-break picks one, and pairs nobody labels get `dep`.

use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

use crate::error::{Diagnostic, Diagnostics};
use crate::graph::{DependencyGraph, TokenId};
use crate::matcher::PatternMatcher;
use crate::relation::Relation;
use crate::taxonomy::{CoreRelations, Taxonomy};
use crate::tree::Tree;

type Pair = (usize, usize);

/// Build the basic dependency tree of a head-percolated tree
pub fn build_basic<M: PatternMatcher>(
    tree: &Tree,
    taxonomy: &Taxonomy<M>,
    core: &CoreRelations,
    diagnostics: &mut Diagnostics,
) -> DependencyGraph {
    let registry = Arc::clone(taxonomy.registry());
    let mut graph = DependencyGraph::from_tree(Arc::clone(&registry), tree);

    let phrases: Vec<_> = tree
        .preorder()
        .into_iter()
        .filter(|&n| !tree.is_leaf(n))
        .collect();

    // Structural pairs, in tree order
    let mut pairs: Vec<Pair> = Vec::new();
    let mut structural: FxHashSet<Pair> = FxHashSet::default();
    let mut headed = Vec::with_capacity(phrases.len());
    for &node in &phrases {
        let (Some(head), Some(head_child)) = (tree.head_token_position(node), tree.head_child(node))
        else {
            diagnostics.push(Diagnostic::MissingHead {
                node,
                label: tree.label(node).to_string(),
            });
            continue;
        };
        headed.push((node, head));
        for &child in tree.children(node) {
            if child == head_child {
                continue;
            }
            let Some(dependent) = tree.head_token_position(child) else {
                continue;
            };
            if dependent != head && structural.insert((head, dependent)) {
                pairs.push((head, dependent));
            }
        }
    }

    // Candidate labels per pair
    let mut candidates: FxHashMap<Pair, Vec<Relation>> = FxHashMap::default();
    for &(node, head) in &headed {
        for (relation, target) in taxonomy.candidates(tree, node) {
            let Some(dependent) = tree.head_token_position(target) else {
                continue;
            };
            if dependent == head {
                continue;
            }
            if structural.contains(&(head, dependent)) {
                candidates.entry((head, dependent)).or_default().push(relation);
            } else {
                diagnostics.push(Diagnostic::UnlabeledDependency {
                    relation: registry.name(relation),
                    governor: head + 1,
                    dependent: dependent + 1,
                });
            }
        }
    }

    for (head, dependent) in pairs {
        let relation = match candidates.get_mut(&(head, dependent)) {
            Some(found) => {
                found.sort_by_key(|&r| taxonomy.position(r).unwrap_or(usize::MAX));
                found.dedup();
                registry.most_specific(found).unwrap_or(core.dep)
            }
            None => core.dep,
        };
        graph.add_edge(
            TokenId(head as u32),
            TokenId(dependent as u32),
            relation,
            false,
        );
    }

    graph.set_root(
        tree.root_id
            .and_then(|r| tree.head_token_position(r))
            .map(|t| TokenId(t as u32)),
    );

    correct_passive_subjects(&mut graph, core);
    graph.dedup();
    graph.sort();

    tracing::debug!(
        tokens = graph.tokens().len(),
        edges = graph.len(),
        "built basic dependencies"
    );
    graph
}

/// Subjects of a governor with a passive auxiliary become passive subjects
pub fn correct_passive_subjects(graph: &mut DependencyGraph, core: &CoreRelations) {
    for id in graph.edge_ids() {
        let edge = *graph.edge(id);
        let passive = if edge.rel == core.nsubj {
            core.nsubjpass
        } else if edge.rel == core.csubj {
            core.csubjpass
        } else {
            continue;
        };
        if graph.has_out(edge.gov, core.auxpass) {
            graph.relabel(id, passive);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::head::RuleHeadFinder;
    use crate::matcher::TreePatternMatcher;
    use crate::relation::RelationRegistry;

    fn build(text: &str) -> (DependencyGraph, Diagnostics) {
        let registry = Arc::new(RelationRegistry::new());
        let taxonomy =
            Taxonomy::compile(&Catalog::english(), TreePatternMatcher::new(), Arc::clone(&registry))
                .unwrap();
        let core = CoreRelations::resolve(&registry);
        let mut tree = Tree::from_bracketed(text).unwrap();
        tree.percolate_heads(&RuleHeadFinder::english());
        let mut diagnostics = Diagnostics::new();
        let graph = build_basic(&tree, &taxonomy, &core, &mut diagnostics);
        (graph, diagnostics)
    }

    #[test]
    fn test_simple_transitive() {
        let (graph, _) =
            build("(ROOT (S (NP (NNP Mary)) (VP (VBD saw) (NP (DT the) (NN dog))) (. .)))");
        assert_eq!(
            graph.lines(),
            vec![
                "root(ROOT-0, saw-2)",
                "nsubj(saw-2, Mary-1)",
                "det(dog-4, the-3)",
                "dobj(saw-2, dog-4)",
                "punct(saw-2, .-5)",
            ]
        );
        assert!(graph.is_tree());
        assert!(graph.edges().all(|e| !e.extra));
    }

    #[test]
    fn test_descendant_relation_wins() {
        // amod and nummod both match "three"; nummod is more specific
        let (graph, _) = build("(NP (CD three) (JJ big) (NNS dogs))");
        assert_eq!(
            graph.lines(),
            vec![
                "root(ROOT-0, dogs-3)",
                "nummod(dogs-3, three-1)",
                "amod(dogs-3, big-2)",
            ]
        );
    }

    #[test]
    fn test_passive_correction() {
        //  S
        //  ├── NP  the cake
        //  └── VP
        //      ├── VBD was
        //      └── VP
        //          ├── VBN eaten
        //          └── PP  by John
        let (graph, _) = build(
            "(S (NP (DT the) (NN cake)) (VP (VBD was) (VP (VBN eaten) (PP (IN by) (NP (NNP John))))))",
        );
        let lines = graph.lines();
        assert!(lines.contains(&"nsubjpass(eaten-4, cake-2)".to_string()));
        assert!(lines.contains(&"auxpass(eaten-4, was-3)".to_string()));
        assert!(lines.contains(&"nmod(eaten-4, John-6)".to_string()));
        assert!(lines.contains(&"case(John-6, by-5)".to_string()));
        assert!(graph.is_tree());
    }

    #[test]
    fn test_unlabelled_pairs_get_dep() {
        let (graph, _) = build("(FRAG (UH oh) (NN well))");
        assert_eq!(graph.lines(), vec!["root(ROOT-0, well-2)", "dep(well-2, oh-1)"]);
    }

    #[test]
    fn test_coordination() {
        let (graph, _) = build("(NP (NP (NNP John)) (CC and) (NP (NNP Mary)))");
        assert_eq!(
            graph.lines(),
            vec![
                "root(ROOT-0, John-1)",
                "cc(John-1, and-2)",
                "conj(John-1, Mary-3)",
            ]
        );
    }

    struct NoHeads;

    impl crate::head::HeadFinder for NoHeads {
        fn determine_head(&self, _: &Tree, _: usize, _: Option<usize>) -> Option<usize> {
            None
        }
    }

    #[test]
    fn test_missing_head_is_diagnosed() {
        let registry = Arc::new(RelationRegistry::new());
        let taxonomy =
            Taxonomy::compile(&Catalog::english(), TreePatternMatcher::new(), Arc::clone(&registry))
                .unwrap();
        let core = CoreRelations::resolve(&registry);
        let mut tree = Tree::from_bracketed("(NP (DT the) (NN dog))").unwrap();
        tree.percolate_heads(&NoHeads);

        let mut diagnostics = Diagnostics::new();
        let graph = build_basic(&tree, &taxonomy, &core, &mut diagnostics);
        assert!(graph.is_empty());
        assert_eq!(graph.root(), None);
        assert!(matches!(
            diagnostics.iter().next(),
            Some(Diagnostic::MissingHead { node: 0, .. })
        ));
    }
}
