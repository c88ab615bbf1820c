//! Coordination passes
//!
//! `clean_multi_conjuncts` folds the weak dependents of a coordinating
//! marker ("as well as", "but rather") into the marker's `cc` relation, so
//! they do not survive as stray edges. `relabel_conjunctions` then moves
//! the conjunction lexeme onto the `conj` edges it coordinates.

use crate::graph::{DependencyGraph, EdgeId, TokenId};
use crate::taxonomy::CoreRelations;

use super::PassContext;

/// Bare relations a multi-word marker's parts are attached with
fn is_weak(graph: &DependencyGraph, edge: EdgeId, core: &CoreRelations) -> bool {
    let base = graph.base(edge);
    base == core.dep || base == core.advmod || base == core.mwe || base == core.aux || base == core.cc
}

/// Fold weak dependents of coordination markers into `cc:<phrase>`
pub fn clean_multi_conjuncts(graph: &mut DependencyGraph, ctx: &mut PassContext<'_>) {
    let core = ctx.core;
    for cc in graph.edges_with_base(core.cc) {
        let marker = graph.edge(cc).dep;
        let weak: Vec<TokenId> = graph
            .out_edges(marker)
            .into_iter()
            .map(|e| graph.edge(e).dep)
            .filter(|&w| {
                let incoming = graph.in_edges(w);
                !incoming.is_empty() && incoming.iter().all(|&e| is_weak(graph, e, core))
            })
            .collect();
        if weak.is_empty() {
            continue;
        }

        let mut words: Vec<TokenId> = weak.clone();
        words.push(marker);
        words.sort_by_key(|&t| graph.token(t).index);
        words.dedup();
        let phrase = words
            .iter()
            .map(|&t| graph.token(t).lower())
            .collect::<Vec<_>>()
            .join("_");

        let relation = graph.registry().get_or_create("cc", Some(&phrase));
        graph.relabel(cc, relation);
        for w in weak {
            for e in graph.in_edges(w) {
                graph.kill(e);
            }
        }
    }
}

/// Map a conjunction phrase to the lexeme used on `conj` edges
pub fn normalize_conjunction(phrase: &str) -> String {
    let phrase = phrase.trim().to_lowercase().replace(' ', "_");
    match phrase.as_str() {
        "not" | "instead" | "rather" | "but_rather" => "negcc".to_string(),
        "&" | "also" | "to_mention" => "and".to_string(),
        p if p.contains("well") => "and".to_string(),
        _ => phrase,
    }
}

/// Relabel plain `conj` edges with their coordinating lexeme
pub fn relabel_conjunctions(graph: &mut DependencyGraph, ctx: &mut PassContext<'_>) {
    let core = ctx.core;
    let mut markers = graph.edges_with_base(core.cc);
    markers.sort_by_key(|&e| graph.token(graph.edge(e).dep).index);

    for cc in markers {
        let edge = *graph.edge(cc);
        let lexeme = match graph.registry().specific(edge.rel) {
            Some(specific) => specific,
            None => graph.token(edge.dep).lower(),
        };
        let relation = graph
            .registry()
            .get_or_create("conj", Some(&normalize_conjunction(&lexeme)));

        let mut relabeled = 0;
        for e in graph.out_edges(edge.gov) {
            if graph.edge(e).rel == core.conj {
                graph.relabel(e, relation);
                relabeled += 1;
            }
        }
        if relabeled > 0 {
            graph.kill(cc);
        }
    }
}
