//! STRIDE threat modelling
//!
//! The operator answers four profile questions, the reasoning service
//! returns a JSON threat model, and the result is rendered as markdown.

use async_trait::async_trait;
use serde::Deserialize;
use vigil_core::llm::complete;
use vigil_core::{Action, ActionContext, ActionError, Operator, ReasoningService};

use crate::error::ScenarioError;
use crate::questionnaire::choose;

/// Application described to the `Model` action when the loop runs it
pub const FINANCE_PORTFOLIO_APP: &str = "Develop highly secure web application for a finance company to manage customer portfolios, handle transactions, and provide real-time financial analytics. This application must offer a responsive user interface, ensure seamless performance, and incorporate advanced security measures to safeguard sensitive financial data. The application will utilize ReactJS on the frontend to deliver a dynamic and responsive experience. The backend will be powered by Node.js to handle server-side logic, API integrations, and interactions with our MongoDB database, which will store user profiles, transaction records, and financial data. All stored data will be encrypted using AES, and SSL/TLS will be used to secure data transmission. The system will feature different access levels for administrators, financial advisors, and customers to ensure data security. The system will support initiating, processing, and reviewing transactions with comprehensive logging and auditing.";

const APPLICATION_TYPES: [&str; 5] = [
    "Web Application",
    "Mobile Application",
    "Desktop Application",
    "Cloud Application",
    "IOT Application",
];

const SENSITIVITY_LEVELS: [&str; 6] = [
    "Top Secret",
    "Secret",
    "Confidential",
    "Restricted",
    "Unclassified",
    "None",
];

const INTERNET_FACING: [&str; 2] = ["Yes", "No"];

const AUTHENTICATION_METHODS: [&str; 5] = [
    "Single Sign On",
    "Multi Factor Authentication",
    "OAuth2",
    "Basic",
    "None",
];

/// Answers to the profile questionnaire plus the free-text description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationProfile {
    pub app_type: String,
    pub sensitivity: String,
    pub internet_facing: String,
    pub authentication: String,
    pub description: String,
}

/// Ask the four profile questions
pub fn ask_profile(
    operator: &mut dyn Operator,
    description: &str,
) -> std::io::Result<ApplicationProfile> {
    let app_type = APPLICATION_TYPES[choose(operator, "Select the application type?", &APPLICATION_TYPES)?];
    let sensitivity = SENSITIVITY_LEVELS[choose(
        operator,
        "What is the highest sensitivity level of the data processed by the application?",
        &SENSITIVITY_LEVELS,
    )?];
    let internet_facing = INTERNET_FACING[choose(
        operator,
        "Is the application internet-facing?",
        &INTERNET_FACING,
    )?];
    let authentication = AUTHENTICATION_METHODS[choose(
        operator,
        "What authentication methods are supported by the application?",
        &AUTHENTICATION_METHODS,
    )?];

    let profile = ApplicationProfile {
        app_type: app_type.to_string(),
        sensitivity: sensitivity.to_string(),
        internet_facing: internet_facing.to_string(),
        authentication: authentication.to_string(),
        description: description.to_string(),
    };

    operator.say("");
    operator.say("Here are your answers:");
    operator.say(&format!("Application type: {}", profile.app_type));
    operator.say(&format!("Data sensitivity: {}", profile.sensitivity));
    operator.say(&format!("Internet facing: {}", profile.internet_facing));
    operator.say(&format!("Authentication: {}", profile.authentication));

    Ok(profile)
}

const STRIDE_EXPERT: &str = "Act as a cyber security expert with more than 20 years experience of using the STRIDE threat modelling methodology";

pub fn threat_model_prompt(profile: &ApplicationProfile) -> String {
    format!(
        r#"{expert} to produce comprehensive threat models for a wide range of applications. Your task is to use the application description and additional information provided to you to produce a list of specific threats for the application.

For each of the STRIDE categories (Spoofing, Tampering, Repudiation, Information Disclosure, Denial of Service, and Elevation of Privilege), list multiple (3 or 4) credible threats if applicable. Each threat scenario should provide a credible scenario in which the threat could occur in the context of the application. It is very important that your responses are tailored to reflect the details you are given.

When providing the threat model, use a JSON formatted response with the keys "threat_model" and "improvement_suggestions". Under "threat_model", include an array of objects with the keys "Threat Type", "Scenario", and "Potential Impact".

Under "improvement_suggestions", include an array of strings with suggestions on how the threat modeller can improve their application description in order to allow the tool to produce a more comprehensive threat model.

APPLICATION TYPE: {app_type}
AUTHENTICATION METHODS: {authentication}
INTERNET FACING: {internet_facing}
SENSITIVE DATA: {sensitivity}
APPLICATION DESCRIPTION: {description}

Example of expected JSON response format:

{{
  "threat_model": [
    {{
      "Threat Type": "Spoofing",
      "Scenario": "Example Scenario 1",
      "Potential Impact": "Example Potential Impact 1"
    }},
    {{
      "Threat Type": "Spoofing",
      "Scenario": "Example Scenario 2",
      "Potential Impact": "Example Potential Impact 2"
    }}
  ],
  "improvement_suggestions": [
    "Example improvement suggestion 1.",
    "Example improvement suggestion 2."
  ]
}}
"#,
        expert = STRIDE_EXPERT,
        app_type = profile.app_type,
        authentication = profile.authentication,
        internet_facing = profile.internet_facing,
        sensitivity = profile.sensitivity,
        description = profile.description,
    )
}

/// Prompt asking for mitigations of the threats in `threats`
pub fn mitigations_prompt(threats: &str) -> String {
    format!(
        r#"{expert}. Your task is to provide potential mitigations for the threats identified in the threat model. It is very important that your responses are tailored to reflect the details of the threats.

Example of expected JSON response format:
{{
  "Threat_type": "spoofing",
  "Scenario": "Scenario 1",
  "Suggested Mitigation": "Mitigation1"
}} // ... more threats

Below is the list of identified threats:
{threats}

YOUR RESPONSE (do not wrap in a code block):
"#,
        expert = STRIDE_EXPERT,
        threats = threats,
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Threat {
    #[serde(rename = "Threat Type")]
    pub threat_type: String,
    #[serde(rename = "Scenario")]
    pub scenario: String,
    #[serde(rename = "Potential Impact")]
    pub potential_impact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThreatModelReport {
    pub threat_model: Vec<Threat>,
    #[serde(default)]
    pub improvement_suggestions: Vec<String>,
}

impl ThreatModelReport {
    /// Parse a model reply, tolerating a surrounding ```json fence
    pub fn parse(reply: &str) -> Result<Self, ScenarioError> {
        serde_json::from_str(strip_code_fence(reply)).map_err(ScenarioError::MalformedReport)
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::from("## Threat Model\n\n");
        out.push_str("| Threat Type | Scenario | Potential Impact |\n");
        out.push_str("|-------------|----------|------------------|\n");
        for t in &self.threat_model {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                cell(&t.threat_type),
                cell(&t.scenario),
                cell(&t.potential_impact)
            ));
        }

        out.push_str("\n\n## Improvement Suggestions\n\n");
        for suggestion in &self.improvement_suggestions {
            out.push_str(&format!("- {}\n", suggestion));
        }
        out
    }
}

// Pipes and newlines would break the table row
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    let inner = inner.trim_start();
    inner
        .strip_prefix("json")
        .or_else(|| inner.strip_prefix("JSON"))
        .unwrap_or(inner)
        .trim()
}

/// Ask for a threat model and render it as markdown
pub async fn generate_threat_model(
    reasoner: &dyn ReasoningService,
    profile: &ApplicationProfile,
) -> Result<String, ScenarioError> {
    let reply = complete(reasoner, STRIDE_EXPERT, &threat_model_prompt(profile)).await?;
    let report = ThreatModelReport::parse(&reply)?;
    tracing::info!(threats = report.threat_model.len(), "threat model generated");
    Ok(report.to_markdown())
}

const MITIGATIONS_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that provides threat mitigation strategies in Markdown format.";

/// Ask for mitigations of an already generated threat model
pub async fn generate_mitigations(
    reasoner: &dyn ReasoningService,
    threats: &str,
) -> Result<String, ScenarioError> {
    Ok(complete(reasoner, MITIGATIONS_SYSTEM_PROMPT, &mitigations_prompt(threats)).await?)
}

/// The `Model` action
pub struct ThreatModelAction {
    description: String,
}

impl ThreatModelAction {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

impl Default for ThreatModelAction {
    fn default() -> Self {
        Self::new(FINANCE_PORTFOLIO_APP)
    }
}

#[async_trait]
impl Action for ThreatModelAction {
    fn description(&self) -> &str {
        "use to create threat models"
    }

    async fn run(&self, ctx: &mut ActionContext<'_>) -> Result<String, ActionError> {
        let profile = ask_profile(ctx.operator, &self.description)?;
        ctx.operator.say("Generating threat model, please wait...");
        Ok(generate_threat_model(ctx.reasoner, &profile).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::test_support::{ScriptedOperator, ScriptedReasoner};

    const REPLY: &str = r#"```json
{
  "threat_model": [
    {"Threat Type": "Spoofing", "Scenario": "Stolen advisor session", "Potential Impact": "Unauthorised trades"},
    {"Threat Type": "Tampering", "Scenario": "Altered | amounts", "Potential Impact": "Financial loss"}
  ],
  "improvement_suggestions": ["Describe the key management process."]
}
```"#;

    fn profile() -> ApplicationProfile {
        ApplicationProfile {
            app_type: "Web Application".to_string(),
            sensitivity: "Confidential".to_string(),
            internet_facing: "Yes".to_string(),
            authentication: "Multi Factor Authentication".to_string(),
            description: "Portfolio manager".to_string(),
        }
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {} "), "{}");
    }

    #[test]
    fn test_parse_and_render() {
        let report = ThreatModelReport::parse(REPLY).unwrap();
        assert_eq!(report.threat_model.len(), 2);
        assert_eq!(report.threat_model[0].threat_type, "Spoofing");

        let md = report.to_markdown();
        assert!(md.starts_with("## Threat Model\n\n| Threat Type | Scenario | Potential Impact |"));
        assert!(md.contains("| Spoofing | Stolen advisor session | Unauthorised trades |"));
        assert!(md.contains("Altered \\| amounts"));
        assert!(md.contains("## Improvement Suggestions\n\n- Describe the key management process.\n"));
    }

    #[test]
    fn test_parse_rejects_prose() {
        let err = ThreatModelReport::parse("I cannot help with that.").unwrap_err();
        assert!(matches!(err, ScenarioError::MalformedReport(_)));
    }

    #[test]
    fn test_prompt_places_each_answer() {
        let prompt = threat_model_prompt(&profile());
        assert!(prompt.contains("APPLICATION TYPE: Web Application"));
        assert!(prompt.contains("AUTHENTICATION METHODS: Multi Factor Authentication"));
        assert!(prompt.contains("SENSITIVE DATA: Confidential"));
        assert!(prompt.contains("APPLICATION DESCRIPTION: Portfolio manager"));
        assert!(prompt.contains("\"Threat Type\": \"Spoofing\""));
    }

    #[test]
    fn test_mitigations_prompt_embeds_threats() {
        let prompt = mitigations_prompt("Spoofing: stolen session");
        assert!(prompt.contains("Below is the list of identified threats:\nSpoofing: stolen session"));
        assert!(prompt.contains("Suggested Mitigation"));
    }

    #[test]
    fn test_ask_profile() {
        let mut op = ScriptedOperator::new(["1", "3", "1", "2"]);
        let answers = ask_profile(&mut op, "Portfolio manager").unwrap();
        assert_eq!(answers, profile());
    }

    #[tokio::test]
    async fn test_generate_mitigations_passes_threats() {
        let reasoner = ScriptedReasoner::texts(["- Enforce MFA for advisors"]);
        let out = generate_mitigations(&reasoner, "| Spoofing | Stolen session | Trades |")
            .await
            .unwrap();
        assert_eq!(out, "- Enforce MFA for advisors");

        let requests = reasoner.requests();
        assert_eq!(requests[0].messages[0], vigil_core::ChatMessage::System(MITIGATIONS_SYSTEM_PROMPT.to_string()));
        assert!(format!("{:?}", requests[0].messages[1]).contains("Stolen session"));
    }

    #[tokio::test]
    async fn test_action_runs_questionnaire_then_model() {
        let reasoner = ScriptedReasoner::texts([REPLY]);
        let mut op = ScriptedOperator::new(["1", "3", "1", "2"]);
        let action = ThreatModelAction::default();

        let mut ctx = ActionContext {
            reasoner: &reasoner,
            operator: &mut op,
        };
        let out = action.run(&mut ctx).await.unwrap();
        assert!(out.contains("| Tampering |"));

        let requests = reasoner.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].tools.is_empty());
        let user = format!("{:?}", requests[0].messages[1]);
        assert!(user.contains("real-time financial analytics"));
    }
}
