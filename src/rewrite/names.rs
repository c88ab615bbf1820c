//! Named-entity restructuring
//!
//! A compound run such as `compound(Obama, Barack)` over tokens that share
//! one entity type is turned around: the leftmost token becomes the head
//! and the others attach to it with `name`.

use crate::graph::{DependencyGraph, TokenId};

use super::PassContext;

fn entity(graph: &DependencyGraph, t: TokenId) -> Option<&str> {
    graph
        .token(t)
        .ner
        .as_deref()
        .filter(|tag| !tag.is_empty() && *tag != "O")
}

/// True if the indices cover one span, allowing punctuation in the gaps
fn contiguous(graph: &DependencyGraph, members: &[TokenId]) -> bool {
    let indices: Vec<usize> = members.iter().map(|&t| graph.token(t).index).collect();
    let (Some(&lo), Some(&hi)) = (indices.iter().min(), indices.iter().max()) else {
        return false;
    };
    (lo..=hi).all(|i| {
        indices.contains(&i)
            || graph
                .token_at(i)
                .is_some_and(|t| graph.token(t).is_punctuation())
    })
}

/// Re-head compound runs of named entities on their leftmost token
pub fn restructure_names(graph: &mut DependencyGraph, ctx: &mut PassContext<'_>) {
    let core = ctx.core;
    let mut heads: Vec<TokenId> = graph
        .edges_with_base(core.compound)
        .into_iter()
        .map(|e| graph.edge(e).gov)
        .collect();
    heads.sort();
    heads.dedup();

    for head in heads {
        let Some(kind) = entity(graph, head).map(str::to_string) else {
            continue;
        };
        let compounds = graph.out_with_base(head, core.compound);
        let mut members: Vec<TokenId> = compounds.iter().map(|&e| graph.edge(e).dep).collect();
        if members.iter().any(|&m| entity(graph, m) != Some(kind.as_str())) {
            continue;
        }
        members.push(head);
        members.sort_by_key(|&t| graph.token(t).index);
        members.dedup();
        if members.len() < 2 || !contiguous(graph, &members) {
            continue;
        }

        let leftmost = members[0];
        let extra = compounds.iter().all(|&e| graph.edge(e).extra);
        for &e in &compounds {
            graph.kill(e);
        }
        if leftmost != head {
            for e in graph.in_edges(head) {
                graph.reattach_dependent(e, leftmost);
            }
            for e in graph.out_edges(head) {
                graph.reattach_governor(e, leftmost);
            }
        }
        for &m in &members[1..] {
            graph.add_edge(leftmost, m, core.name, extra);
        }
    }
}
