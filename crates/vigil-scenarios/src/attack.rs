//! MITRE ATT&CK data: techniques from a STIX bundle and threat group lists

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ScenarioError;

/// One ATT&CK technique
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Technique {
    pub name: String,
    pub external_id: String,
}

impl Technique {
    /// "Phishing (T1566)"
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.external_id)
    }
}

#[derive(Deserialize)]
struct Bundle {
    objects: Vec<StixObject>,
}

#[derive(Deserialize)]
struct StixObject {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    external_references: Vec<ExternalReference>,
    #[serde(default)]
    revoked: bool,
    #[serde(default)]
    x_mitre_deprecated: bool,
}

#[derive(Deserialize)]
struct ExternalReference {
    source_name: String,
    #[serde(default)]
    external_id: Option<String>,
}

/// Active techniques from an enterprise ATT&CK bundle, sorted by name
pub fn load_techniques(path: &Path) -> Result<Vec<Technique>, ScenarioError> {
    let data = fs::read_to_string(path).map_err(|source| ScenarioError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let techniques = parse_techniques(&data).map_err(|reason| ScenarioError::Attack {
        path: path.to_path_buf(),
        reason,
    })?;
    tracing::debug!(count = techniques.len(), path = %path.display(), "loaded ATT&CK techniques");
    Ok(techniques)
}

fn parse_techniques(data: &str) -> Result<Vec<Technique>, String> {
    let bundle: Bundle = serde_json::from_str(data).map_err(|e| e.to_string())?;

    let mut techniques: Vec<Technique> = bundle
        .objects
        .into_iter()
        .filter(|o| o.kind == "attack-pattern" && !o.revoked && !o.x_mitre_deprecated)
        .filter_map(|o| {
            let external_id = o
                .external_references
                .iter()
                .find(|r| r.source_name == "mitre-attack")
                .and_then(|r| r.external_id.clone())?;
            Some(Technique {
                name: o.name?,
                external_id,
            })
        })
        .collect();

    if techniques.is_empty() {
        return Err("no attack-pattern objects found".to_string());
    }
    techniques.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.external_id.cmp(&b.external_id)));
    Ok(techniques)
}

/// Threat groups offered when no groups file is configured
pub const DEFAULT_THREAT_GROUPS: [&str; 10] = [
    "APT28",
    "APT29",
    "APT41",
    "Carbanak",
    "FIN7",
    "Kimsuky",
    "Lazarus Group",
    "OilRig",
    "Sandworm Team",
    "Wizard Spider",
];

/// Sorted group names from a JSON list of `{ "group": "..." }` objects
pub fn load_threat_groups(path: &Path) -> Result<Vec<String>, ScenarioError> {
    let data = fs::read_to_string(path).map_err(|source| ScenarioError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_threat_groups(&data).map_err(|reason| ScenarioError::ThreatGroups {
        path: path.to_path_buf(),
        reason,
    })
}

fn parse_threat_groups(data: &str) -> Result<Vec<String>, String> {
    let value: serde_json::Value = serde_json::from_str(data).map_err(|e| e.to_string())?;
    let items = value
        .as_array()
        .ok_or("expected a list of objects")?;

    let mut groups = items
        .iter()
        .map(|item| {
            item.get("group")
                .and_then(|g| g.as_str())
                .map(str::to_string)
                .ok_or_else(|| "each item must be an object with a 'group' key".to_string())
        })
        .collect::<Result<Vec<_>, _>>()?;
    groups.sort();
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BUNDLE: &str = r#"{
      "type": "bundle",
      "id": "bundle--1",
      "objects": [
        {"type": "attack-pattern", "id": "attack-pattern--b", "name": "Phishing",
         "external_references": [
           {"source_name": "mitre-attack", "external_id": "T1566", "url": "https://attack.mitre.org/techniques/T1566"},
           {"source_name": "capec", "external_id": "CAPEC-98"}
         ]},
        {"type": "attack-pattern", "id": "attack-pattern--a", "name": "Data Encrypted for Impact",
         "external_references": [{"source_name": "mitre-attack", "external_id": "T1486"}]},
        {"type": "attack-pattern", "id": "attack-pattern--old", "name": "Old Thing", "revoked": true,
         "external_references": [{"source_name": "mitre-attack", "external_id": "T1000"}]},
        {"type": "intrusion-set", "id": "intrusion-set--1", "name": "APT28"}
      ]
    }"#;

    #[test]
    fn test_parse_techniques() {
        let techniques = parse_techniques(BUNDLE).unwrap();
        assert_eq!(techniques.len(), 2);
        assert_eq!(techniques[0].display_name(), "Data Encrypted for Impact (T1486)");
        assert_eq!(techniques[1].display_name(), "Phishing (T1566)");
    }

    #[test]
    fn test_bundle_without_techniques() {
        let err = parse_techniques(r#"{"objects": []}"#).unwrap_err();
        assert!(err.contains("no attack-pattern"));
    }

    #[test]
    fn test_load_threat_groups_sorted() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"group": "Lazarus Group"}}, {{"group": "APT29", "aliases": ["Cozy Bear"]}}]"#).unwrap();
        let groups = load_threat_groups(file.path()).unwrap();
        assert_eq!(groups, vec!["APT29", "Lazarus Group"]);
    }

    #[test]
    fn test_threat_groups_validation() {
        assert!(parse_threat_groups(r#"{"group": "APT29"}"#).is_err());
        assert!(parse_threat_groups(r#"[{"name": "APT29"}]"#)
            .unwrap_err()
            .contains("'group' key"));
        assert!(parse_threat_groups("not json").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = load_threat_groups(Path::new("/nonexistent/groups.json")).unwrap_err();
        assert!(matches!(err, ScenarioError::Read { .. }));
    }
}
