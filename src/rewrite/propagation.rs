//! Conjunct propagation
//!
//! A conjunct shares the attachments of the word it is conjoined to. For
//! `conj(gov, dep)` every edge into `gov` is copied onto `dep`, and a verb
//! or adjective without a subject inherits the subjects of `gov`, switched
//! between active and passive to suit its own form. With
//! `propagate_objects`, verbal conjuncts without a direct object also
//! inherit `gov`'s objects.
//!
//! The pass reads the conjunct edges present when it starts; every edge
//! it adds is marked extra.

use crate::graph::{DependencyGraph, TokenId};
use crate::relation::Relation;
use crate::taxonomy::CoreRelations;

use super::PassContext;

/// Tags whose subjects are always active
fn is_active_form(tag: &str) -> bool {
    matches!(tag, "VB" | "VBZ" | "VBP") || tag.starts_with("JJ")
}

fn is_clause_head(graph: &DependencyGraph, t: TokenId, core: &CoreRelations) -> bool {
    graph.in_edges(t).into_iter().any(|e| graph.base(e) == core.rcmod)
}

fn has_subject(graph: &DependencyGraph, t: TokenId, core: &CoreRelations) -> bool {
    graph
        .out_edges(t)
        .into_iter()
        .any(|e| graph.registry().descends_from(graph.edge(e).rel, core.subj))
}

fn is_core_argument(graph: &DependencyGraph, rel: Relation, core: &CoreRelations) -> bool {
    let registry = graph.registry();
    registry.descends_from(rel, core.subj) || registry.descends_from(rel, core.obj)
}

/// The subject relation a conjunct receives for `rel`
fn subject_for(graph: &DependencyGraph, rel: Relation, dep: TokenId, core: &CoreRelations) -> Relation {
    if graph.has_out(dep, core.auxpass) {
        if rel == core.nsubj {
            return core.nsubjpass;
        }
        if rel == core.csubj {
            return core.csubjpass;
        }
        return rel;
    }
    if is_active_form(&graph.token(dep).tag) {
        if rel == core.nsubjpass {
            return core.nsubj;
        }
        if rel == core.csubjpass {
            return core.csubj;
        }
    }
    rel
}

fn add_new(graph: &mut DependencyGraph, gov: TokenId, dep: TokenId, rel: Relation) -> bool {
    if gov == dep || graph.contains(gov, dep, rel) {
        return false;
    }
    graph.add_edge(gov, dep, rel, true);
    true
}

/// Share governors, subjects and optionally objects across conjuncts
pub fn propagate_conjuncts(graph: &mut DependencyGraph, ctx: &mut PassContext<'_>) {
    let core = ctx.core;
    let propagate_objects = ctx.config.propagate_objects;
    let mut added = 0usize;

    for conj in graph.edges_with_base(core.conj) {
        let edge = *graph.edge(conj);
        let (gov, dep) = (edge.gov, edge.dep);
        let relative_pair = is_clause_head(graph, gov, core) && is_clause_head(graph, dep, core);

        for e in graph.in_edges(gov) {
            let incoming = *graph.edge(e);
            if relative_pair && is_core_argument(graph, incoming.rel, core) {
                continue;
            }
            if add_new(graph, incoming.gov, dep, incoming.rel) {
                added += 1;
            }
        }

        let tag = graph.token(dep).tag.clone();
        let verbal = tag.starts_with("VB");
        if (verbal || tag.starts_with("JJ")) && !has_subject(graph, dep, core) {
            let subjects: Vec<_> = graph
                .out_edges(gov)
                .into_iter()
                .filter(|&e| graph.registry().descends_from(graph.edge(e).rel, core.subj))
                .map(|e| *graph.edge(e))
                .collect();
            for s in subjects {
                let rel = subject_for(graph, s.rel, dep, core);
                if add_new(graph, dep, s.dep, rel) {
                    added += 1;
                }
            }
        }

        if propagate_objects && verbal && !graph.has_out(dep, core.dobj) {
            for e in graph.out_with_base(gov, core.dobj) {
                let object = graph.edge(e).dep;
                if add_new(graph, dep, object, core.dobj) {
                    added += 1;
                }
            }
        }
    }
    tracing::trace!(added, "propagated across conjuncts");
}

#[cfg(test)]
mod tests {
    use crate::rewrite::Pass;
    use crate::rewrite::testing::Fixture;

    #[test]
    fn test_subject_shared_by_verb_conjuncts() {
        let mut f = Fixture::new("Mary/NNP sang/VBD and/CC danced/VBD");
        f.edge("nsubj", 2, 1).edge("conj:and", 2, 4);
        f.run(Pass::ConjunctPropagation);
        assert_eq!(
            f.lines(),
            vec!["conj:and(sang-2, danced-4)", "nsubj(danced-4, Mary-1)", "nsubj(sang-2, Mary-1)"]
        );
        assert!(f.is_extra("nsubj(danced-4, Mary-1)"));
    }

    #[test]
    fn test_passive_subject_made_active() {
        let mut f = Fixture::new("Mary/NNP was/VBD arrested/VBN and/CC sues/VBZ");
        f.edge("nsubjpass", 3, 1)
            .edge("auxpass", 3, 2)
            .edge("conj:and", 3, 5);
        f.run(Pass::ConjunctPropagation);
        assert!(f.has("nsubj(sues-5, Mary-1)"));
        assert!(!f.has("nsubjpass(sues-5, Mary-1)"));
    }

    #[test]
    fn test_active_subject_made_passive() {
        let mut f = Fixture::new("Bob/NNP ran/VBD and/CC was/VBD caught/VBN");
        f.edge("nsubj", 2, 1)
            .edge("conj:and", 2, 5)
            .edge("auxpass", 5, 4);
        f.run(Pass::ConjunctPropagation);
        assert!(f.has("nsubjpass(caught-5, Bob-1)"));
    }

    #[test]
    fn test_governor_edges_copied_to_conjunct() {
        let mut f = Fixture::new("John/NNP and/CC Mary/NNP left/VBD");
        f.edge("nsubj", 4, 1).edge("conj:and", 1, 3);
        f.run(Pass::ConjunctPropagation);
        assert!(f.has("nsubj(left-4, Mary-3)"));
        // Nouns do not receive subjects
        assert_eq!(f.lines().len(), 3);
    }

    #[test]
    fn test_conjunct_with_own_subject_untouched() {
        let mut f = Fixture::new("Mary/NNP sang/VBD and/CC Bob/NNP danced/VBD");
        f.edge("nsubj", 2, 1).edge("conj:and", 2, 5).edge("nsubj", 5, 4);
        f.run(Pass::ConjunctPropagation);
        assert!(!f.has("nsubj(danced-5, Mary-1)"));
    }

    #[test]
    fn test_relative_clause_conjuncts_keep_own_arguments() {
        let mut f = Fixture::new("man/NN who/WP came/VBD and/CC saw/VBD it/PRP");
        f.edge("rcmod", 1, 3)
            .edge("rcmod", 1, 5)
            .edge("dobj", 1, 3)
            .edge("conj:and", 3, 5);
        f.run(Pass::ConjunctPropagation);
        assert!(!f.has("dobj(man-1, saw-5)"));
    }

    #[test]
    fn test_object_propagation_is_configurable() {
        let mut f = Fixture::new("Sue/NNP washed/VBD and/CC dried/VBD dishes/NNS");
        f.edge("nsubj", 2, 1).edge("dobj", 2, 5).edge("conj:and", 2, 4);
        f.run(Pass::ConjunctPropagation);
        assert!(f.has("dobj(dried-4, dishes-5)"));

        let mut f = Fixture::new("Sue/NNP washed/VBD and/CC dried/VBD dishes/NNS");
        f.config.propagate_objects = false;
        f.edge("nsubj", 2, 1).edge("dobj", 2, 5).edge("conj:and", 2, 4);
        f.run(Pass::ConjunctPropagation);
        assert!(!f.has("dobj(dried-4, dishes-5)"));
        assert!(f.has("nsubj(dried-4, Sue-1)"));
    }
}
