//! Vigil Scenarios - the two actions the loop can run
//!
//! - `Model`: STRIDE threat model for a fixed application description
//! - `Intelligence`: incident response test scenario built from ATT&CK data

pub mod attack;
pub mod config;
pub mod error;
pub mod intelligence;
pub mod questionnaire;
pub mod threat_model;

pub use config::ScenarioConfig;
pub use error::ScenarioError;
pub use intelligence::IntelligenceAction;
pub use threat_model::ThreatModelAction;

use vigil_core::ActionRegistry;

/// Registry with both actions wired to the given configuration
pub fn registry(config: &ScenarioConfig) -> ActionRegistry {
    ActionRegistry::new(
        ThreatModelAction::default(),
        IntelligenceAction::new(config.clone()),
    )
}
