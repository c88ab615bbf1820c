//! Multi-word adposition contraction
//!
//! Fixed expressions such as "because of" or "in front of" are contracted
//! into a single `case:<phrase>` edge from the object to the first word.
//! Words are matched on adjacent raw token indices. The edges joining the
//! words are consumed, and any other dependents of the words are moved to
//! the object.
//!
//! Matches are collected before any is applied. A match whose edges were
//! consumed by an earlier contraction is reported and skipped.

use crate::error::Diagnostic;
use crate::graph::{DependencyGraph, EdgeId, TokenId};
use crate::relation::Relation;
use crate::taxonomy::CoreRelations;

use super::PassContext;

pub const TWO_WORD: &[[&str; 2]] = &[
    ["according", "to"], ["across", "from"], ["ahead", "of"], ["along", "with"],
    ["alongside", "of"], ["apart", "from"], ["as", "for"], ["as", "from"], ["as", "of"],
    ["as", "per"], ["as", "to"], ["aside", "from"], ["away", "from"], ["based", "on"],
    ["because", "of"], ["close", "by"], ["close", "to"], ["compared", "to"],
    ["compared", "with"], ["contrary", "to"], ["depending", "on"], ["due", "to"],
    ["except", "for"], ["exclusive", "of"], ["far", "from"], ["followed", "by"],
    ["inside", "of"], ["instead", "of"], ["irrespective", "of"], ["near", "to"],
    ["next", "to"], ["off", "of"], ["out", "of"], ["outside", "of"], ["owing", "to"],
    ["preliminary", "to"], ["preparatory", "to"], ["previous", "to"], ["prior", "to"],
    ["pursuant", "to"], ["regardless", "of"], ["subsequent", "to"], ["such", "as"],
    ["thanks", "to"], ["together", "with"], ["up", "to"],
];

pub const THREE_WORD: &[[&str; 3]] = &[
    ["by", "means", "of"], ["in", "accordance", "with"], ["in", "addition", "to"],
    ["in", "case", "of"], ["in", "front", "of"], ["in", "lieu", "of"], ["in", "place", "of"],
    ["in", "spite", "of"], ["on", "account", "of"], ["on", "behalf", "of"],
    ["on", "top", "of"], ["with", "regard", "to"], ["with", "respect", "to"],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// `case(O,w1) x(w1,w2) x(w2,w3)`
    Chain,
    /// `case(w2,w1) nmod(w2,O) case(O,w3)`: the second word heads a nested phrase
    Nested,
    /// `case(O,w1) x(w1,w2)`
    Linear,
    /// `case(O,w2) x(w2,w1)`
    Bis,
    /// `case(O,w2) case(O,w1)`
    Flat,
}

#[derive(Debug)]
struct Contraction {
    shape: Shape,
    object: TokenId,
    words: Vec<TokenId>,
    /// Supplies the extra flag of the new edge
    marker: EdgeId,
    consumed: Vec<EdgeId>,
    /// Token whose governors are handed to the object
    displaced: Option<TokenId>,
}

fn lower(graph: &DependencyGraph, t: TokenId) -> String {
    graph.token(t).lower()
}

/// Original token at a raw index offset
fn neighbour(graph: &DependencyGraph, t: TokenId, offset: isize) -> Option<TokenId> {
    let index = graph.token(t).index.checked_add_signed(offset)?;
    graph.token_at(index)
}

/// An edge between two tokens whose base is one of `bases`
fn link(graph: &DependencyGraph, gov: TokenId, dep: TokenId, bases: &[Relation]) -> Option<EdgeId> {
    graph
        .edges_between(gov, dep)
        .into_iter()
        .find(|&e| bases.contains(&graph.base(e)))
}

fn is_two_word(graph: &DependencyGraph, w1: TokenId, w2: TokenId) -> bool {
    let (a, b) = (lower(graph, w1), lower(graph, w2));
    TWO_WORD.iter().any(|[x, y]| *x == a && *y == b)
}

fn is_three_word(graph: &DependencyGraph, w1: TokenId, w2: TokenId, w3: TokenId) -> bool {
    let (a, b, c) = (lower(graph, w1), lower(graph, w2), lower(graph, w3));
    THREE_WORD.iter().any(|[x, y, z]| *x == a && *y == b && *z == c)
}

fn find_contraction(graph: &DependencyGraph, case: EdgeId, core: &CoreRelations) -> Option<Contraction> {
    let chain_bases = [core.dep, core.mwe, core.case];
    let bis_bases = [core.advmod, core.dep, core.mwe, core.prt, core.amod];
    let edge = *graph.edge(case);
    let (gov, x) = (edge.gov, edge.dep);

    // Three words starting at x
    if let Some(w2) = neighbour(graph, x, 1) {
        if let Some(w3) = neighbour(graph, w2, 1) {
            if is_three_word(graph, x, w2, w3) {
                if let (Some(e12), Some(e23)) = (
                    link(graph, x, w2, &chain_bases),
                    link(graph, w2, w3, &chain_bases),
                ) {
                    return Some(Contraction {
                        shape: Shape::Chain,
                        object: gov,
                        words: vec![x, w2, w3],
                        marker: case,
                        consumed: vec![case, e12, e23],
                        displaced: None,
                    });
                }
                if w2 == gov {
                    for inner in graph.out_with_base(w2, core.nmod) {
                        let object = graph.edge(inner).dep;
                        if let Some(e3) = link(graph, object, w3, &[core.case]) {
                            return Some(Contraction {
                                shape: Shape::Nested,
                                object,
                                words: vec![x, w2, w3],
                                marker: case,
                                consumed: vec![case, inner, e3],
                                displaced: Some(w2),
                            });
                        }
                    }
                }
            }
        }

        // Two words starting at x
        if is_two_word(graph, x, w2) {
            if let Some(e12) = link(graph, x, w2, &chain_bases) {
                return Some(Contraction {
                    shape: Shape::Linear,
                    object: gov,
                    words: vec![x, w2],
                    marker: case,
                    consumed: vec![case, e12],
                    displaced: None,
                });
            }
        }
    }

    // Two words ending at x
    let w1 = neighbour(graph, x, -1)?;
    if !is_two_word(graph, w1, x) {
        return None;
    }
    if let Some(e21) = link(graph, x, w1, &bis_bases) {
        return Some(Contraction {
            shape: Shape::Bis,
            object: gov,
            words: vec![w1, x],
            marker: case,
            consumed: vec![case, e21],
            displaced: None,
        });
    }
    link(graph, gov, w1, &[core.case, core.advmod]).map(|e01| Contraction {
        shape: Shape::Flat,
        object: gov,
        words: vec![w1, x],
        marker: case,
        consumed: vec![case, e01],
        displaced: None,
    })
}

/// Contract fixed multi-word adpositions into `case:<phrase>` edges
pub fn contract_multiword_adpositions(graph: &mut DependencyGraph, ctx: &mut PassContext<'_>) {
    let core = ctx.core;
    let contractions: Vec<Contraction> = graph
        .edges_with_base(core.case)
        .into_iter()
        .filter_map(|e| find_contraction(graph, e, core))
        .collect();

    for c in contractions {
        if let Some(&stale) = c.consumed.iter().find(|&&e| graph.is_dead(e)) {
            ctx.diagnostics.push(Diagnostic::StaleMatch {
                pass: "multiword-adpositions",
                detail: graph.render(stale),
            });
            continue;
        }

        let phrase = c
            .words
            .iter()
            .map(|&w| lower(graph, w))
            .collect::<Vec<_>>()
            .join("_");
        let extra = graph.edge(c.marker).extra;
        for &e in &c.consumed {
            graph.kill(e);
        }

        if let Some(displaced) = c.displaced {
            for e in graph.in_edges(displaced) {
                graph.reattach_dependent(e, c.object);
            }
        }
        for &w in &c.words {
            for e in graph.out_edges(w) {
                if graph.edge(e).dep == c.object {
                    graph.kill(e);
                } else {
                    graph.reattach_governor(e, c.object);
                }
            }
            // Plain markers on the object left by an overlapping match
            for e in graph.in_edges(w) {
                if graph.edge(e).gov == c.object && graph.base(e) == core.case {
                    graph.kill(e);
                }
            }
        }

        let relation = graph.registry().get_or_create("case", Some(&phrase));
        graph.add_edge(c.object, c.words[0], relation, extra);
        tracing::trace!(shape = ?c.shape, phrase = %phrase, "contracted adposition");
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Diagnostic;
    use crate::rewrite::Pass;
    use crate::rewrite::testing::Fixture;

    #[test]
    fn test_three_word_chain() {
        let mut f = Fixture::new("sat/VBD right/RB in/IN front/NN of/IN house/NN");
        f.edge("nmod", 1, 6)
            .edge("case", 6, 3)
            .edge("dep", 3, 4)
            .edge("case", 4, 5)
            .edge("advmod", 4, 2);
        f.run(Pass::MultiWordAdpositions);
        assert_eq!(
            f.lines(),
            vec![
                "advmod(house-6, right-2)",
                "case:in_front_of(house-6, in-3)",
                "nmod(sat-1, house-6)",
            ]
        );
    }

    #[test]
    fn test_nested_three_word() {
        // in front of the house, with front heading the phrase
        let mut f = Fixture::new("sat/VBD in/IN front/NN of/IN the/DT house/NN");
        f.edge("nmod", 1, 3)
            .edge("case", 3, 2)
            .edge("nmod", 3, 6)
            .edge("case", 6, 4)
            .edge("det", 6, 5);
        f.run(Pass::MultiWordAdpositions);
        assert_eq!(
            f.lines(),
            vec![
                "case:in_front_of(house-6, in-2)",
                "det(house-6, the-5)",
                "nmod(sat-1, house-6)",
            ]
        );
    }

    #[test]
    fn test_flat_two_word() {
        let mut f = Fixture::new("left/VBD because/IN of/IN rain/NN");
        f.edge("nmod", 1, 4).edge("case", 4, 2).edge("case", 4, 3);
        f.run(Pass::MultiWordAdpositions);
        assert_eq!(
            f.lines(),
            vec!["case:because_of(rain-4, because-2)", "nmod(left-1, rain-4)"]
        );
    }

    #[test]
    fn test_linear_and_bis() {
        let mut f = Fixture::new("ran/VBD out/IN of/IN time/NN");
        f.edge("nmod", 1, 4).edge("case", 4, 2).edge("mwe", 2, 3);
        f.run(Pass::MultiWordAdpositions);
        assert!(f.has("case:out_of(time-4, out-2)"));
        assert_eq!(f.lines().len(), 2);

        let mut f = Fixture::new("ran/VBD out/RB of/IN time/NN");
        f.edge("nmod", 1, 4).edge("case", 4, 3).edge("advmod", 3, 2);
        f.run(Pass::MultiWordAdpositions);
        assert!(f.has("case:out_of(time-4, out-2)"));
        assert_eq!(f.lines().len(), 2);
    }

    #[test]
    fn test_non_adjacent_words_not_contracted() {
        let mut f = Fixture::new("because/IN really/RB of/IN rain/NN");
        f.edge("case", 4, 1).edge("case", 4, 3).edge("advmod", 1, 2);
        f.run(Pass::MultiWordAdpositions);
        assert!(f.has("case(rain-4, because-1)"));
        assert!(f.has("case(rain-4, of-3)"));
    }

    #[test]
    fn test_overlapping_match_is_stale() {
        let mut f = Fixture::new("because/IN of/IN rain/NN");
        f.edge("case", 3, 1).edge("case", 3, 2).edge("dep", 1, 2);
        f.run(Pass::MultiWordAdpositions);
        assert_eq!(f.lines(), vec!["case:because_of(rain-3, because-1)"]);
        assert!(!f.has("case(rain-3, of-2)"));
        assert!(matches!(
            f.diagnostics.iter().next(),
            Some(Diagnostic::StaleMatch { pass: "multiword-adpositions", .. })
        ));
    }
}
