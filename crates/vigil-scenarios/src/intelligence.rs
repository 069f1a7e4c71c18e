//! Incident response scenario generation
//!
//! The operator picks industry, company size, threat group and either an
//! incident template or ATT&CK techniques; the reasoning service writes a
//! tabletop scenario from those selections.

use async_trait::async_trait;
use vigil_core::llm::complete;
use vigil_core::{Action, ActionContext, ActionError, Operator, ReasoningService};

use crate::attack::{load_techniques, load_threat_groups, Technique, DEFAULT_THREAT_GROUPS};
use crate::config::ScenarioConfig;
use crate::error::ScenarioError;
use crate::questionnaire::{choose, choose_many};

/// Sorted
pub const INDUSTRIES: [&str; 20] = [
    "Aerospace / Defense",
    "Agriculture / Food Services",
    "Automotive",
    "Construction",
    "Education",
    "Energy / Utilities",
    "Finance / Banking",
    "Government / Public Sector",
    "Healthcare",
    "Hospitality / Tourism",
    "Insurance",
    "Legal Services",
    "Manufacturing",
    "Media / Entertainment",
    "Non-profit",
    "Real Estate",
    "Retail / E-commerce",
    "Technology / IT",
    "Telecommunication",
    "Transportation / Logistics",
];

pub const COMPANY_SIZES: [&str; 8] = [
    "1-10 employees",
    "11-50 employees",
    "51-200 employees",
    "201-500 employees",
    "501-1000 employees",
    "1001-5000 employees",
    "5001-10,000 employees",
    "10,001+ employees",
];

/// Incident response templates and the techniques each one exercises
pub const INCIDENT_TEMPLATES: [(&str, &[&str]); 4] = [
    (
        "Phishing Attack",
        &[
            "Spearphishing Attachment (T1193)",
            "User Execution (T1204)",
            "Browser Extensions (T1176)",
            "Credentials from Password Stores (T1555)",
            "Input Capture (T1056)",
            "Exfiltration Over C2 Channel (T1041)",
        ],
    ),
    (
        "Ransomware Attack",
        &[
            "Exploit Public-Facing Application (T1190)",
            "Windows Management Instrumentation (T1047)",
            "Create Account (T1136)",
            "Process Injection (T1055)",
            "Data Encrypted for Impact (T1486)",
        ],
    ),
    (
        "Malware Infection",
        &[
            "Supply Chain Compromise (T1195)",
            "Command and Scripting Interpreter (T1059)",
            "Registry Run Keys / Startup Folder (T1060)",
            "Obfuscated Files or Information (T1027)",
            "Remote Services (T1021)",
            "Data Destruction (T1485)",
        ],
    ),
    (
        "Insider Threat",
        &[
            "Valid Accounts (T1078)",
            "Account Manipulation (T1098)",
            "Exploitation for Privilege Escalation (T1068)",
            "Data Staged (T1074)",
            "Scheduled Transfer (T1029)",
            "Account Access Removal (T1531)",
        ],
    ),
];

const MANUAL_SELECTION: &str = "Manual Selection";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioSelections {
    pub industry: String,
    pub company_size: String,
    pub threat_group: String,
    pub techniques: Vec<String>,
    /// `None` when techniques were picked by hand
    pub template: Option<String>,
}

/// Walk the operator through the selections.
///
/// Manual technique selection is only offered when `techniques` is non-empty.
pub fn ask_selections(
    operator: &mut dyn Operator,
    threat_groups: &[String],
    techniques: &[Technique],
) -> std::io::Result<ScenarioSelections> {
    let industry = INDUSTRIES[choose(
        operator,
        "Select your company's industry from the list below:",
        &INDUSTRIES,
    )?];
    let company_size = COMPANY_SIZES[choose(
        operator,
        "Select your company's size from the list below:",
        &COMPANY_SIZES,
    )?];
    let threat_group = &threat_groups[choose(
        operator,
        "Please select a threat group with associated Enterprise ATT&CK techniques from the list below:",
        threat_groups,
    )?];

    let mut template_options: Vec<&str> = Vec::with_capacity(INCIDENT_TEMPLATES.len() + 1);
    if !techniques.is_empty() {
        template_options.push(MANUAL_SELECTION);
    }
    template_options.extend(INCIDENT_TEMPLATES.iter().map(|(name, _)| *name));

    let picked = template_options[choose(
        operator,
        "Select an incident response template or choose 'Manual Selection' to select techniques yourself:",
        &template_options,
    )?];

    let (template, selected): (Option<String>, Vec<String>) = if picked == MANUAL_SELECTION {
        let names: Vec<String> = techniques.iter().map(Technique::display_name).collect();
        let indices = choose_many(
            operator,
            "Select ATT&CK techniques for the scenario (you can choose multiple, separated by commas):",
            &names,
        )?;
        (None, indices.into_iter().map(|i| names[i].clone()).collect())
    } else {
        let techniques = INCIDENT_TEMPLATES
            .iter()
            .find(|(name, _)| *name == picked)
            .map(|(_, t)| t.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default();
        (Some(picked.to_string()), techniques)
    };

    let selections = ScenarioSelections {
        industry: industry.to_string(),
        company_size: company_size.to_string(),
        threat_group: threat_group.clone(),
        techniques: selected,
        template,
    };

    operator.say(&format!("Selected Industry: {}", selections.industry));
    operator.say(&format!("Selected Company Size: {}", selections.company_size));
    operator.say(&format!("Selected Threat Group: {}", selections.threat_group));
    if let Some(template) = &selections.template {
        operator.say(&format!("Selected Template: {}", template));
    }
    operator.say(&format!(
        "Selected ATT&CK Techniques: {}",
        selections.techniques.join(", ")
    ));

    Ok(selections)
}

pub const SCENARIO_SYSTEM_PROMPT: &str = "You are a cybersecurity expert. Your task is to produce a comprehensive incident response testing scenario based on the information provided.";

pub fn scenario_prompt(selections: &ScenarioSelections) -> String {
    let template_info = selections
        .template
        .as_ref()
        .map(|t| format!("This is a '{}' scenario.", t))
        .unwrap_or_default();

    format!(
        "**Background information:**
The company operates in the '{industry}' industry and is of size '{size}'.

**Threat actor information:**
Threat actor group '{group}' is planning to target the company using their known tactics.

{template_info}

**ATT&CK Techniques:**
{techniques}

**Your task:**
Create an incident response testing scenario based on the information provided. The goal of the scenario is to test the company's incident response capabilities against the identified threat actor group.

Your response should be well-structured and formatted using Markdown. Write in British English.
",
        industry = selections.industry,
        size = selections.company_size,
        group = selections.threat_group,
        template_info = template_info,
        techniques = selections.techniques.join("\n"),
    )
}

pub async fn generate_scenario(
    reasoner: &dyn ReasoningService,
    selections: &ScenarioSelections,
) -> Result<String, ScenarioError> {
    let scenario = complete(reasoner, SCENARIO_SYSTEM_PROMPT, &scenario_prompt(selections)).await?;
    tracing::info!(group = %selections.threat_group, bytes = scenario.len(), "scenario generated");
    Ok(scenario)
}

/// The `Intelligence` action
pub struct IntelligenceAction {
    config: ScenarioConfig,
}

impl IntelligenceAction {
    pub fn new(config: ScenarioConfig) -> Self {
        Self { config }
    }

    fn threat_groups(&self) -> Result<Vec<String>, ScenarioError> {
        match &self.config.threat_groups_file {
            Some(path) => load_threat_groups(path),
            None => Ok(DEFAULT_THREAT_GROUPS.iter().map(|s| s.to_string()).collect()),
        }
    }

    fn techniques(&self) -> Result<Vec<Technique>, ScenarioError> {
        match &self.config.attack_file {
            Some(path) => load_techniques(path),
            None => Ok(Vec::new()),
        }
    }

    pub async fn scenario(
        &self,
        reasoner: &dyn ReasoningService,
        operator: &mut dyn Operator,
    ) -> Result<String, ScenarioError> {
        let groups = self.threat_groups()?;
        let techniques = self.techniques()?;
        let selections = ask_selections(operator, &groups, &techniques)?;
        operator.say("Generating scenario, please wait...");
        generate_scenario(reasoner, &selections).await
    }
}

#[async_trait]
impl Action for IntelligenceAction {
    fn description(&self) -> &str {
        "Use to create threat scenarios"
    }

    async fn run(&self, ctx: &mut ActionContext<'_>) -> Result<String, ActionError> {
        Ok(self.scenario(ctx.reasoner, ctx.operator).await?)
    }
}
