//! Pipeline configuration
//!
//! A `PipelineConfig` switches each rewrite pass on or off and carries the
//! policy flags for the more aggressive sub-rules. `Profile` names the
//! usual combinations.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::rewrite::Pass;

/// Named pipeline configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Profile {
    /// The basic tree, cleaned up and sorted
    Basic,
    /// Collapsed and propagated dependencies
    #[default]
    Enhanced,
    /// Enhanced plus multi-word adpositions and the aggressive sub-rules
    EnhancedPlusPlus,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown profile: {0} (expected basic, enhanced or enhanced++)")]
pub struct ParseProfileError(String);

impl FromStr for Profile {
    type Err = ParseProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(Profile::Basic),
            "enhanced" => Ok(Profile::Enhanced),
            "enhanced++" | "enhancedplusplus" => Ok(Profile::EnhancedPlusPlus),
            _ => Err(ParseProfileError(s.to_string())),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Profile::Basic => "basic",
            Profile::Enhanced => "enhanced",
            Profile::EnhancedPlusPlus => "enhanced++",
        };
        write!(f, "{}", name)
    }
}

/// Which passes run, and how aggressively
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub multi_conjunct_cleanup: bool,
    pub multiword_adpositions: bool,
    pub name_restructuring: bool,
    pub adposition_collapse: bool,
    pub conjunction_relabel: bool,
    pub referent_resolution: bool,
    pub conjunct_propagation: bool,
    pub referent_collapse: bool,
    pub controlling_subjects: bool,
    pub cleanup: bool,
    /// Copy direct objects across verb conjuncts
    pub propagate_objects: bool,
    /// Attach prepositions stranded inside relative clauses to the antecedent
    pub stranded_prepositions: bool,
    /// Take controlling subjects from the governor's direct objects when it has any
    pub object_control: bool,
}

impl PipelineConfig {
    pub fn for_profile(profile: Profile) -> Self {
        let enhanced = profile != Profile::Basic;
        let plus = profile == Profile::EnhancedPlusPlus;
        Self {
            multi_conjunct_cleanup: enhanced,
            multiword_adpositions: plus,
            name_restructuring: enhanced,
            adposition_collapse: enhanced,
            conjunction_relabel: enhanced,
            referent_resolution: enhanced,
            conjunct_propagation: enhanced,
            referent_collapse: enhanced,
            controlling_subjects: enhanced,
            cleanup: true,
            propagate_objects: plus,
            stranded_prepositions: plus,
            object_control: false,
        }
    }

    /// Whether a pass is switched on
    pub fn enabled(&self, pass: Pass) -> bool {
        match pass {
            Pass::MultiConjunctCleanup => self.multi_conjunct_cleanup,
            Pass::MultiWordAdpositions => self.multiword_adpositions,
            Pass::NameRestructuring => self.name_restructuring,
            Pass::AdpositionCollapse => self.adposition_collapse,
            Pass::ConjunctionRelabel => self.conjunction_relabel,
            Pass::ReferentResolution => self.referent_resolution,
            Pass::ConjunctPropagation => self.conjunct_propagation,
            Pass::ReferentCollapse => self.referent_collapse,
            Pass::ControllingSubjects => self.controlling_subjects,
            Pass::Cleanup => self.cleanup,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::for_profile(Profile::default())
    }
}

impl From<Profile> for PipelineConfig {
    fn from(profile: Profile) -> Self {
        Self::for_profile(profile)
    }
}
