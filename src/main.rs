use anyhow::{Context, Result};
use clap::Parser;
use std::sync::atomic::Ordering;

use scrumbot::config::BotConfig;
use scrumbot::console::{Console, StdConsole};
use scrumbot::driver::{Driver, RunState, INTERRUPTED};
use scrumbot::jira::JiraClient;
use scrumbot::openai::OpenAiModel;

#[derive(Parser)]
#[command(name = "scrumbot")]
#[command(version)]
#[command(about = "Automated scrum standup over your tracked tickets", long_about = None)]
struct Cli {
    /// Ticket assignee to fetch tickets for (defaults to JIRA_EMAIL)
    #[arg(long)]
    assignee: Option<String>,

    /// Restrict the ticket list to one project key
    #[arg(long)]
    project: Option<String>,

    /// Model name to drive the conversation
    #[arg(long)]
    model: Option<String>,
}

fn main() -> Result<()> {
    ctrlc::set_handler(|| {
        INTERRUPTED.store(true, Ordering::SeqCst);
    })
    .context("Failed to install CTRL-C handler")?;

    let cli = Cli::parse();
    let mut config = BotConfig::from_env()?;
    if let Some(assignee) = cli.assignee {
        config.assignee = assignee;
    }
    if let Some(project) = cli.project {
        config.jira_project = Some(project);
    }
    if let Some(model) = cli.model {
        config.openai_model = model;
    }

    let store = JiraClient::new(
        &config.jira_url,
        &config.jira_email,
        &config.jira_api_token,
        config.jira_project.clone(),
    )?;
    let model = OpenAiModel::new(&config.openai_api_key, &config.openai_model)?;
    let mut console = StdConsole;
    console.show_notice("===== Scrum Bot =====");

    let mut state = RunState::new();
    let mut driver = Driver {
        assignee: &config.assignee,
        model: &model,
        store: &store,
        console: &mut console,
    };
    driver.run(&mut state)
}
