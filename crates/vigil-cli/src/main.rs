//! Vigil CLI - human-in-the-loop threat analysis
//!
//! Usage:
//!   vigil run       - Let the assistant pick tools, confirming each one
//!   vigil model     - Generate a STRIDE threat model
//!   vigil scenario  - Generate an incident response scenario
//!   vigil mitigate  - Threat model plus suggested mitigations

mod config;
mod console;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vigil_core::{
    run_agent, AgentEvent, ConversationState, OpenAiCompatClient, Operator, PromptGate,
    ReasoningService, RunOutcome,
};
use vigil_scenarios::threat_model::{ask_profile, generate_mitigations, generate_threat_model};
use vigil_scenarios::IntelligenceAction;

use crate::console::ConsoleOperator;

const DEFAULT_INSTRUCTION: &str = "create a threat model using threat modelling tool";

#[derive(Parser)]
#[command(name = "vigil")]
#[command(author = "HeyBattle1")]
#[command(version)]
#[command(about = "Human-in-the-loop threat analysis assistant", long_about = None)]
struct Cli {
    /// Config file (default: ~/.vigil/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Let the assistant choose tools; every tool call needs your approval
    Run {
        /// What you want done
        #[arg(default_value = DEFAULT_INSTRUCTION)]
        instruction: String,

        /// Stop after the first approved tool and print its output
        #[arg(long)]
        return_direct: bool,
    },

    /// Generate a STRIDE threat model for an application
    Model {
        /// Application description; prompts repeatedly when omitted
        description: Option<String>,
    },

    /// Generate an incident response testing scenario
    Scenario,

    /// Generate a threat model and suggested mitigations
    Mitigate {
        /// Application description; prompts repeatedly when omitted
        description: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr so prompts on stdout stay readable
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let settings = match cli.config.or_else(config::default_path) {
        Some(path) => config::load(&path)?,
        None => config::Settings::default(),
    };
    let agent_config = settings.agent_config(|key| std::env::var(key).ok())?;
    let client = OpenAiCompatClient::new(agent_config.clone()).context("build HTTP client")?;
    let mut operator = ConsoleOperator::stdin();

    match cli.command {
        Commands::Run {
            instruction,
            return_direct,
        } => {
            let registry = vigil_scenarios::registry(&settings.scenarios);
            let state = ConversationState::new(instruction).with_return_direct(return_direct);

            println!("👁️  Vigil is working on: {}", state.input);
            let outcome = run_agent(
                &agent_config,
                &client,
                &registry,
                &mut PromptGate,
                &mut operator,
                state,
                print_event,
            )
            .await?;

            match outcome {
                RunOutcome::Finished { answer, state } => {
                    print!("{}", finished_report(&answer, &state));
                }
                RunOutcome::Aborted { rejected, state } => {
                    eprintln!(
                        "⛔ Aborted: {} was declined after {} completed step(s)",
                        rejected,
                        state.steps().len()
                    );
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        Commands::Model { description } => {
            describe_and_report(
                &client,
                &mut operator,
                description,
                "Describe the application to be modelled?",
                Report::ThreatModel,
            )
            .await?;
        }

        Commands::Scenario => {
            let action = IntelligenceAction::new(settings.scenarios.clone());
            let scenario = action.scenario(&client, &mut operator).await?;
            println!();
            println!("Scenario generated successfully:");
            println!("{}", scenario);
        }

        Commands::Mitigate { description } => {
            describe_and_report(
                &client,
                &mut operator,
                description,
                "Describe the application to show the mitigation:",
                Report::Mitigations,
            )
            .await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[derive(Clone, Copy)]
enum Report {
    ThreatModel,
    Mitigations,
}

/// Report once for `description`, or for each description the operator
/// types until an empty line. In the interactive form a failed report is
/// printed and the prompt repeats.
async fn describe_and_report(
    client: &dyn ReasoningService,
    operator: &mut dyn Operator,
    description: Option<String>,
    prompt: &str,
    report: Report,
) -> Result<()> {
    if let Some(desc) = description {
        return report_once(client, operator, &desc, report).await;
    }

    loop {
        let line = operator.ask(prompt)?;
        if line.trim().is_empty() {
            return Ok(());
        }
        if let Err(e) = report_once(client, operator, &line, report).await {
            tracing::warn!(error = %e, "report failed");
            eprintln!("❌ {:#}", e);
        }
    }
}

async fn report_once(
    client: &dyn ReasoningService,
    operator: &mut dyn Operator,
    description: &str,
    report: Report,
) -> Result<()> {
    let profile = ask_profile(operator, description)?;
    operator.say("Generating threat model, please wait...");
    let model = generate_threat_model(client, &profile).await?;
    operator.say(&model);

    if let Report::Mitigations = report {
        operator.say("Generating mitigations, please wait...");
        operator.say(&generate_mitigations(client, &model).await?);
    }
    Ok(())
}

/// Completed steps followed by the answer. With `return_direct` the answer
/// is the first step's output, so it is not repeated.
fn finished_report(answer: &str, state: &ConversationState) -> String {
    let mut out = String::new();
    for (i, step) in state.steps().iter().enumerate() {
        out.push_str(&format!("\n── Step {}: {} ──\n{}\n", i + 1, step.call.kind, step.result));
    }
    if !state.return_direct {
        out.push_str(&format!("\n{}\n", answer));
    }
    out
}

fn print_event(event: AgentEvent) {
    match event {
        AgentEvent::Deciding { step } => println!("🤔 Thinking (decision {})...", step),
        AgentEvent::Proposed(kind) => println!("💡 Proposed tool: {}", kind),
        AgentEvent::Rejected(kind) => println!("✋ {} declined", kind),
        AgentEvent::Executing(kind) => println!("🔧 Running {}...", kind),
        AgentEvent::ActionResult { kind, preview } => println!("✅ {} returned: {}", kind, preview),
        AgentEvent::Finished(_) => println!("✦ Complete"),
    }
}
