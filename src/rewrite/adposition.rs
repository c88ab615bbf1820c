//! Adposition collapse
//!
//! Case markers are folded into the relation of the phrase they mark:
//! `nmod(saw, hat) + case(hat, in)` becomes `nmod:in(saw, hat)`. The
//! coordination variants are handled first, while their `conj` edges are
//! still plain:
//!
//! - two conjoined adpositions sharing one object ("to and from Serbia")
//!   give one collapsed edge per adposition;
//! - two conjoined objects with different adpositions ("at home and in
//!   the office") get a copy of the governor for the second conjunct.
//!
//! A passive governor turns `by` into `agent`. Adverbial clauses collapse
//! their markers the same way, and stranded prepositions in relative
//! clauses can be attached to the antecedent.

use crate::graph::{DependencyGraph, EdgeId, TokenId};
use crate::relation::Relation;
use crate::taxonomy::CoreRelations;

use super::PassContext;

/// The word an edge's dependent contributes to a collapsed label
fn lexeme(graph: &DependencyGraph, edge: EdgeId) -> String {
    let e = graph.edge(edge);
    graph
        .registry()
        .specific(e.rel)
        .unwrap_or_else(|| graph.token(e.dep).lower())
}

/// `agent` for `by` under a passive governor, else `nmod:<lexeme>`
fn collapsed(graph: &DependencyGraph, core: &CoreRelations, gov: TokenId, lexeme: &str) -> Relation {
    if lexeme == "by" && graph.has_out(gov, core.auxpass) {
        core.agent
    } else {
        graph.registry().get_or_create("nmod", Some(lexeme))
    }
}

fn is_plain(graph: &DependencyGraph, edge: EdgeId, base: Relation) -> bool {
    !graph.is_dead(edge) && graph.edge(edge).rel == base
}

/// An adposition with nothing attached to it
fn is_bare_adposition(graph: &DependencyGraph, t: TokenId) -> bool {
    matches!(graph.token(t).tag.as_str(), "IN" | "TO") && graph.out_edges(t).is_empty()
}

/// Conjoined adpositions sharing one object: one edge per adposition
///
/// The second adposition hangs either off the first, `case(O,P) conj(P,P2)`,
/// or off the object heading the phrase, `case(O,P) conj(O,P2)` with P2
/// bare and before O.
fn collapse_conjoined_adpositions(graph: &mut DependencyGraph, core: &CoreRelations) {
    let index = |graph: &DependencyGraph, e: EdgeId| graph.token(graph.edge(e).dep).index;

    for nmod in graph.edges_with_base(core.nmod) {
        if !is_plain(graph, nmod, core.nmod) {
            continue;
        }
        let Ends { gov, dep: object } = Ends::of(graph, nmod);
        let mut cases = graph.out_with_base(object, core.case);
        if cases.is_empty() {
            continue;
        }
        cases.sort_by_key(|&e| index(graph, e));

        let object_index = graph.token(object).index;
        let mut conjuncts: Vec<EdgeId> = cases
            .iter()
            .flat_map(|&c| graph.out_with_base(graph.edge(c).dep, core.conj))
            .collect();
        conjuncts.extend(graph.out_with_base(object, core.conj).into_iter().filter(|&e| {
            let d = graph.edge(e).dep;
            graph.token(d).index < object_index && is_bare_adposition(graph, d)
        }));
        if conjuncts.is_empty() {
            continue;
        }
        conjuncts.sort_by_key(|&e| index(graph, e));

        let mut lexemes = vec![
            cases
                .iter()
                .map(|&e| lexeme(graph, e))
                .collect::<Vec<_>>()
                .join("_"),
        ];
        for &j in &conjuncts {
            let word = graph.token(graph.edge(j).dep).lower();
            if !lexemes.contains(&word) {
                lexemes.push(word);
            }
        }

        // Coordinators between the first and the last adposition
        let span = index(graph, cases[0])..index(graph, conjuncts[conjuncts.len() - 1]);
        let mut markers: Vec<EdgeId> = graph
            .out_with_base(object, core.cc)
            .into_iter()
            .filter(|&e| span.contains(&index(graph, e)))
            .collect();
        for &c in &cases {
            markers.extend(graph.out_with_base(graph.edge(c).dep, core.cc));
        }

        let extra = graph.edge(nmod).extra;
        for (i, lex) in lexemes.iter().enumerate() {
            let relation = collapsed(graph, core, gov, lex);
            graph.add_edge(gov, object, relation, extra || i > 0);
        }
        graph.kill(nmod);
        for e in cases.into_iter().chain(conjuncts).chain(markers) {
            graph.kill(e);
        }
    }
}

/// `nmod(G,O1) case(O1,L1) conj(O1,O2) case(O2,L2)` with L1 != L2
fn split_conjoined_objects(graph: &mut DependencyGraph, core: &CoreRelations) {
    for nmod in graph.edges_with_base(core.nmod) {
        if !is_plain(graph, nmod, core.nmod) {
            continue;
        }
        let Ends { gov, dep: first } = Ends::of(graph, nmod);
        let Some(&case1) = graph.out_with_base(first, core.case).first() else {
            continue;
        };
        let lex1 = lexeme(graph, case1);

        for conj in graph.out_with_base(first, core.conj) {
            let second = graph.edge(conj).dep;
            let Some(&case2) = graph.out_with_base(second, core.case).first() else {
                continue;
            };
            let lex2 = lexeme(graph, case2);
            if lex1 == lex2 {
                // The conjunct inherits the shared adposition by propagation
                graph.kill(case2);
                continue;
            }

            let copy = graph.copy_token(gov);
            let relation = collapsed(graph, core, gov, &lex2);
            graph.add_edge(copy, second, relation, true);
            let conj_rel = graph.edge(conj).rel;
            graph.add_edge(gov, copy, conj_rel, true);
            for cc in graph.out_with_base(first, core.cc) {
                graph.reattach_governor(cc, gov);
            }
            graph.kill(conj);
            graph.kill(case2);
        }
    }
}

/// Plain `nmod`, `poss` and `advcl` edges absorb their markers
fn collapse_markers(graph: &mut DependencyGraph, core: &CoreRelations) {
    for nmod in graph.edges_with_base(core.nmod) {
        if !is_plain(graph, nmod, core.nmod) {
            continue;
        }
        let Ends { gov, dep: object } = Ends::of(graph, nmod);
        let mut cases = graph.out_with_base(object, core.case);
        if cases.is_empty() {
            continue;
        }
        cases.sort_by_key(|&e| graph.token(graph.edge(e).dep).index);

        let possessive = cases.iter().any(|&e| {
            let t = graph.token(graph.edge(e).dep);
            t.tag == "POS" || t.form == "'s"
        });
        let relation = if possessive {
            core.poss
        } else {
            let lex = cases
                .iter()
                .map(|&e| lexeme(graph, e))
                .collect::<Vec<_>>()
                .join("_");
            collapsed(graph, core, gov, &lex)
        };
        graph.relabel(nmod, relation);
        for e in cases {
            graph.kill(e);
        }
    }

    for poss in graph.edges_with_base(core.poss) {
        let object = graph.edge(poss).dep;
        for e in graph.out_with_base(object, core.case) {
            if graph.token(graph.edge(e).dep).tag == "POS" {
                graph.kill(e);
            }
        }
    }

    for advcl in graph.edges_with_base(core.advcl) {
        if !is_plain(graph, advcl, core.advcl) {
            continue;
        }
        let clause = graph.edge(advcl).dep;
        let mut marks = graph.out_with_base(clause, core.mark);
        if marks.is_empty() {
            continue;
        }
        marks.sort_by_key(|&e| graph.token(graph.edge(e).dep).index);
        let lex = marks
            .iter()
            .map(|&e| graph.token(graph.edge(e).dep).lower())
            .collect::<Vec<_>>()
            .join("_");
        let relation = graph.registry().get_or_create("advcl", Some(&lex));
        graph.relabel(advcl, relation);
        for e in marks {
            graph.kill(e);
        }
    }
}

/// `rcmod(N,V)` with a trailing bare preposition under V: `nmod:P(V,N)`
fn attach_stranded_prepositions(graph: &mut DependencyGraph, core: &CoreRelations) {
    let bases = [core.dep, core.nmod, core.advmod, core.prt, core.case];
    for rcmod in graph.edges_with_base(core.rcmod) {
        let Ends { gov: noun, dep: verb } = Ends::of(graph, rcmod);
        let verb_index = graph.token(verb).index;
        for e in graph.out_edges(verb) {
            let prep = graph.edge(e).dep;
            let token = graph.token(prep);
            let stranded = matches!(token.tag.as_str(), "IN" | "TO" | "RP")
                && token.index > verb_index
                && graph.out_edges(prep).is_empty()
                && bases.contains(&graph.base(e));
            if stranded {
                let relation = graph.registry().get_or_create("nmod", Some(&token.lower()));
                graph.add_edge(verb, noun, relation, true);
                graph.kill(e);
            }
        }
    }
}

/// Governor and dependent of an edge
struct Ends {
    gov: TokenId,
    dep: TokenId,
}

impl Ends {
    fn of(graph: &DependencyGraph, edge: EdgeId) -> Self {
        let e = graph.edge(edge);
        Self {
            gov: e.gov,
            dep: e.dep,
        }
    }
}

/// Fold adpositions and clause markers into relation labels
pub fn collapse_adpositions(graph: &mut DependencyGraph, ctx: &mut PassContext<'_>) {
    let core = ctx.core;
    collapse_conjoined_adpositions(graph, core);
    split_conjoined_objects(graph, core);
    collapse_markers(graph, core);
    if ctx.config.stranded_prepositions {
        attach_stranded_prepositions(graph, core);
    }
}
