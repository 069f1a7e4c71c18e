//! Settings stored under `~/.vigil/config.toml`.
//!
//! Every field is optional; a missing file means defaults. The API key
//! normally comes from the environment rather than the file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use vigil_core::config::{DEFAULT_API_URL, DEFAULT_INSTRUCTIONS, DEFAULT_MODEL};
use vigil_core::AgentConfig;
use vigil_scenarios::ScenarioConfig;

/// Environment variables checked for the API key, in order
const API_KEY_VARS: [&str; 2] = ["VIGIL_API_KEY", "OPENROUTER_API_KEY"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub agent: AgentSettings,
    pub scenarios: ScenarioConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub api_key: Option<SecretString>,
    pub model: String,
    pub api_url: String,
    pub temperature: f64,
    pub request_timeout_secs: u64,
    pub max_steps: Option<usize>,
    pub instructions: String,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            temperature: 0.0,
            request_timeout_secs: 120,
            max_steps: None,
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }
}

/// `~/.vigil/config.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".vigil").join("config.toml"))
}

/// Load settings from a TOML file.
///
/// If the file is missing, returns `Settings::default()`.
pub fn load(path: &Path) -> Result<Settings> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Settings::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parse config {}", path.display()))
}

impl Settings {
    /// Build the run configuration, letting `env` override the file.
    pub fn agent_config(&self, env: impl Fn(&str) -> Option<String>) -> Result<AgentConfig> {
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|var| env(var).filter(|v| !v.trim().is_empty()))
            .or_else(|| self.agent.api_key.as_ref().map(|k| k.expose_secret().clone()))
            .ok_or_else(|| {
                anyhow!(
                    "no API key: set {} or agent.api_key in the config file",
                    API_KEY_VARS.join(" or ")
                )
            })?;

        let mut config = AgentConfig::new(api_key);
        config.model = env("VIGIL_MODEL").unwrap_or_else(|| self.agent.model.clone());
        config.api_url = env("VIGIL_API_URL").unwrap_or_else(|| self.agent.api_url.clone());
        config.temperature = self.agent.temperature;
        config.request_timeout_secs = self.agent.request_timeout_secs;
        config.max_steps = self.agent.max_steps;
        config.instructions = self.agent.instructions.clone();

        config.validate().context("invalid agent configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = load(Path::new("/nonexistent/vigil/config.toml")).unwrap();
        assert_eq!(settings.agent.model, DEFAULT_MODEL);
        assert!(settings.scenarios.attack_file.is_none());
    }

    #[test]
    fn test_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[agent]
model = "openai/gpt-4o"
max_steps = 6

[scenarios]
threat_groups_file = "/data/groups.json"
"#
        )
        .unwrap();

        let settings = load(file.path()).unwrap();
        assert_eq!(settings.agent.model, "openai/gpt-4o");
        assert_eq!(settings.agent.max_steps, Some(6));
        assert_eq!(settings.agent.api_url, DEFAULT_API_URL);
        assert_eq!(
            settings.scenarios.threat_groups_file,
            Some(PathBuf::from("/data/groups.json"))
        );
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[agent\nmodel = ").unwrap();
        assert!(load(file.path()).is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut settings = Settings::default();
        settings.agent.api_key = Some(SecretString::new("from-file".to_string()));

        let config = settings
            .agent_config(env(&[("OPENROUTER_API_KEY", "from-env"), ("VIGIL_MODEL", "x/y")]))
            .unwrap();
        assert_eq!(config.model, "x/y");

        let debug = format!("{:?}", config);
        assert!(!debug.contains("from-env"));
    }

    #[test]
    fn test_file_key_is_redacted() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[agent]\napi_key = \"sk-from-file\"").unwrap();

        let settings = load(file.path()).unwrap();
        assert!(!format!("{:?}", settings).contains("sk-from-file"));

        let config = settings.agent_config(env(&[])).unwrap();
        assert_eq!(config.api_key.expose_secret(), "sk-from-file");
    }

    #[test]
    fn test_missing_key() {
        let err = Settings::default().agent_config(env(&[])).unwrap_err();
        assert!(err.to_string().contains("VIGIL_API_KEY"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut settings = Settings::default();
        settings.agent.temperature = 9.0;
        assert!(settings.agent_config(env(&[("VIGIL_API_KEY", "k")])).is_err());
    }
}
