use std::path::PathBuf;

use thiserror::Error;
use vigil_core::ReasoningError;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Operator input failed: {0}")]
    Operator(#[from] std::io::Error),

    #[error("Reasoning service failed: {0}")]
    Reasoning(#[from] ReasoningError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid threat group file {path}: {reason}")]
    ThreatGroups { path: PathBuf, reason: String },

    #[error("Invalid ATT&CK bundle {path}: {reason}")]
    Attack { path: PathBuf, reason: String },

    #[error("Threat model response is not valid JSON: {0}")]
    MalformedReport(#[source] serde_json::Error),
}
