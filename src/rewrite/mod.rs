//! Rewrite pipeline
//!
//! The passes turn the basic tree into the enhanced graph. They run in a
//! fixed order because each one expects the normal form left by the ones
//! before it. Within a pass, deletions are tombstones: the pass kills
//! edges and keeps reading them, and the pipeline sweeps after every pass.

pub mod adposition;
pub mod control;
pub mod coordination;
pub mod multiword;
pub mod names;
pub mod propagation;
pub mod referent;

use crate::config::PipelineConfig;
use crate::error::Diagnostics;
use crate::graph::DependencyGraph;
use crate::taxonomy::CoreRelations;

/// The rewrite passes, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    MultiConjunctCleanup,
    MultiWordAdpositions,
    NameRestructuring,
    AdpositionCollapse,
    ConjunctionRelabel,
    ReferentResolution,
    ConjunctPropagation,
    ReferentCollapse,
    ControllingSubjects,
    Cleanup,
}

impl Pass {
    pub const ALL: [Pass; 10] = [
        Pass::MultiConjunctCleanup,
        Pass::MultiWordAdpositions,
        Pass::NameRestructuring,
        Pass::AdpositionCollapse,
        Pass::ConjunctionRelabel,
        Pass::ReferentResolution,
        Pass::ConjunctPropagation,
        Pass::ReferentCollapse,
        Pass::ControllingSubjects,
        Pass::Cleanup,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Pass::MultiConjunctCleanup => "multi-conjunct-cleanup",
            Pass::MultiWordAdpositions => "multiword-adpositions",
            Pass::NameRestructuring => "name-restructuring",
            Pass::AdpositionCollapse => "adposition-collapse",
            Pass::ConjunctionRelabel => "conjunction-relabel",
            Pass::ReferentResolution => "referent-resolution",
            Pass::ConjunctPropagation => "conjunct-propagation",
            Pass::ReferentCollapse => "referent-collapse",
            Pass::ControllingSubjects => "controlling-subjects",
            Pass::Cleanup => "cleanup",
        }
    }
}

/// What every pass may consult besides the graph
pub struct PassContext<'a> {
    pub core: &'a CoreRelations,
    pub config: &'a PipelineConfig,
    pub diagnostics: &'a mut Diagnostics,
}

/// Run one pass, without the trailing sweep
pub fn run_pass(pass: Pass, graph: &mut DependencyGraph, ctx: &mut PassContext<'_>) {
    match pass {
        Pass::MultiConjunctCleanup => coordination::clean_multi_conjuncts(graph, ctx),
        Pass::MultiWordAdpositions => multiword::contract_multiword_adpositions(graph, ctx),
        Pass::NameRestructuring => names::restructure_names(graph, ctx),
        Pass::AdpositionCollapse => adposition::collapse_adpositions(graph, ctx),
        Pass::ConjunctionRelabel => coordination::relabel_conjunctions(graph, ctx),
        Pass::ReferentResolution => referent::resolve_referents(graph, ctx),
        Pass::ConjunctPropagation => propagation::propagate_conjuncts(graph, ctx),
        Pass::ReferentCollapse => referent::collapse_referents(graph, ctx),
        Pass::ControllingSubjects => control::add_controlling_subjects(graph, ctx),
        Pass::Cleanup => {
            graph.dedup();
            graph.sort();
        }
    }
}

/// Run every enabled pass in order, sweeping after each
pub fn run_pipeline(
    graph: &mut DependencyGraph,
    core: &CoreRelations,
    config: &PipelineConfig,
    diagnostics: &mut Diagnostics,
) {
    let mut ctx = PassContext {
        core,
        config,
        diagnostics,
    };
    for pass in Pass::ALL {
        if !config.enabled(pass) {
            continue;
        }
        let before = graph.len();
        run_pass(pass, graph, &mut ctx);
        graph.sweep();
        tracing::debug!(pass = pass.name(), before, after = graph.len(), "rewrite pass");
    }
}


#[cfg(test)]
mod tests {
    use super::testing::Fixture;
    use super::*;

    #[test]
    fn test_pass_order_is_fixed() {
        assert_eq!(Pass::ALL[0], Pass::MultiConjunctCleanup);
        assert_eq!(Pass::ALL[9], Pass::Cleanup);
        let names: Vec<&str> = Pass::ALL.iter().map(|p| p.name()).collect();
        assert!(names.iter().position(|&n| n == "multiword-adpositions")
            < names.iter().position(|&n| n == "name-restructuring"));
    }

    #[test]
    fn test_cleanup_pass_dedups_and_sorts() {
        let mut f = Fixture::new("Mary/NNP saw/VBD dogs/NNS");
        f.edge("dobj", 2, 3).edge("nsubj", 2, 1).edge("dobj", 2, 3);
        f.run(Pass::Cleanup);
        assert_eq!(
            f.graph.lines(),
            vec!["nsubj(saw-2, Mary-1)", "dobj(saw-2, dogs-3)"]
        );
    }

    #[test]
    fn test_pipeline_runs_enabled_passes() {
        let mut f = Fixture::new("John/NNP and/CC Mary/NNP");
        f.edge("cc", 1, 2).edge("conj", 1, 3);
        let config = PipelineConfig::for_profile(crate::config::Profile::Basic);
        run_pipeline(&mut f.graph, &f.core, &config, &mut f.diagnostics);
        assert_eq!(f.graph.lines(), vec!["cc(John-1, and-2)", "conj(John-1, Mary-3)"]);

        let config = PipelineConfig::for_profile(crate::config::Profile::Enhanced);
        run_pipeline(&mut f.graph, &f.core, &config, &mut f.diagnostics);
        assert_eq!(f.graph.lines(), vec!["conj:and(John-1, Mary-3)"]);
    }
}
