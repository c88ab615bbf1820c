//! Controlling subjects
//!
//! An open clausal complement takes its subject from the clause that
//! governs it: in "Bill tried to shoot" the infinitive gets
//! `xsubj(shoot, Bill)`. Only complements introduced by an auxiliary or
//! marker qualify, and a bare "to" only when nothing hangs off it.

use crate::graph::{DependencyGraph, TokenId};
use crate::taxonomy::CoreRelations;

use super::PassContext;

fn controllers(graph: &DependencyGraph, head: TokenId, core: &CoreRelations, object_control: bool) -> Vec<TokenId> {
    if object_control {
        let objects: Vec<TokenId> = graph
            .out_with_base(head, core.dobj)
            .into_iter()
            .map(|e| graph.edge(e).dep)
            .collect();
        if !objects.is_empty() {
            return objects;
        }
    }
    graph
        .out_edges(head)
        .into_iter()
        .filter(|&e| [core.nsubj, core.nsubjpass].contains(&graph.edge(e).rel))
        .map(|e| graph.edge(e).dep)
        .collect()
}

/// Add `xsubj` edges to controlled complements
pub fn add_controlling_subjects(graph: &mut DependencyGraph, ctx: &mut PassContext<'_>) {
    let core = ctx.core;
    let object_control = ctx.config.object_control;

    for xcomp in graph.edges_with_base(core.xcomp) {
        let edge = *graph.edge(xcomp);
        let modifier = edge.dep;
        let has_subject = graph
            .out_edges(modifier)
            .into_iter()
            .any(|e| [core.nsubj, core.nsubjpass].contains(&graph.edge(e).rel));
        if has_subject {
            continue;
        }

        // Skip a marked bare "to" and an unmarked content word
        let marked = graph.has_out(modifier, core.aux) || graph.has_out(modifier, core.mark);
        let infinitive = graph.token(modifier).lower() == "to";
        if infinitive == marked {
            continue;
        }

        for subject in controllers(graph, edge.gov, core, object_control) {
            if !graph.contains(modifier, subject, core.xsubj) {
                graph.add_edge(modifier, subject, core.xsubj, true);
            }
        }
    }
}
