//! Data files the scenario actions read

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// JSON list of `{ "group": "..." }`. Built-in groups are used when unset.
    pub threat_groups_file: Option<PathBuf>,

    /// MITRE ATT&CK enterprise STIX bundle. Enables manual technique
    /// selection when set.
    pub attack_file: Option<PathBuf>,
}
