//! Relative pronouns
//!
//! `resolve_referents` links the antecedent of a relative clause to its
//! relative word with `ref`. `collapse_referents` later routes the
//! pronoun's other dependencies to the antecedent and drops the `ref`
//! edges.

use crate::graph::{DependencyGraph, TokenId};

use super::PassContext;

const RELATIVE_WORDS: &[&str] = &["that", "what", "which", "who", "whom", "whose"];

fn is_relative(graph: &DependencyGraph, t: TokenId) -> bool {
    RELATIVE_WORDS.contains(&graph.token(t).lower().as_str())
}

/// Leftmost relative word among the clause's children and grandchildren
fn relative_word(graph: &DependencyGraph, clause: TokenId, antecedent: TokenId) -> Option<TokenId> {
    let dependents = |t: TokenId| -> Vec<TokenId> {
        graph
            .out_edges(t)
            .into_iter()
            .map(|e| graph.edge(e).dep)
            .collect()
    };
    let children = dependents(clause);
    let mut candidates = children.clone();
    for &child in &children {
        candidates.extend(dependents(child));
    }

    candidates
        .into_iter()
        .filter(|&t| t != antecedent && is_relative(graph, t))
        .min_by_key(|&t| graph.token(t).index)
}

/// Add `ref(antecedent, pronoun)` for each relative clause
pub fn resolve_referents(graph: &mut DependencyGraph, ctx: &mut PassContext<'_>) {
    let core = ctx.core;
    for rcmod in graph.edges_with_base(core.rcmod) {
        let edge = *graph.edge(rcmod);
        let Some(word) = relative_word(graph, edge.dep, edge.gov) else {
            continue;
        };
        if !graph.contains(edge.gov, word, core.rel_ref) {
            graph.add_edge(edge.gov, word, core.rel_ref, true);
        }
    }
}

/// Redirect dependencies on relative pronouns to their antecedents
pub fn collapse_referents(graph: &mut DependencyGraph, ctx: &mut PassContext<'_>) {
    let core = ctx.core;
    for r in graph.edges_with_base(core.rel_ref) {
        let edge = *graph.edge(r);
        for e in graph.in_edges(edge.dep) {
            if graph.base(e) == core.rel_ref || graph.edge(e).gov == edge.gov {
                continue;
            }
            graph.reattach_dependent(e, edge.gov);
            graph.set_extra(e, true);
        }
        graph.kill(r);
    }
}
