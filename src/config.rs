use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";

/// Environment-backed configuration. `.env` is honored the same way the
/// Jira credentials were originally loaded.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub jira_url: String,
    pub jira_email: String,
    pub jira_api_token: String,
    pub jira_project: Option<String>,
    pub assignee: String,
    pub openai_api_key: String,
    pub openai_model: String,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let jira_url = env::var("JIRA_URL").context("JIRA_URL not set")?;
        let jira_email = env::var("JIRA_EMAIL").context("JIRA_EMAIL not set")?;
        let jira_api_token = env::var("JIRA_API_TOKEN").context("JIRA_API_TOKEN not set")?;
        let jira_project = env::var("JIRA_PROJECT").ok().filter(|v| !v.is_empty());
        let assignee = env::var("SCRUMBOT_ASSIGNEE")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| jira_email.clone());
        let openai_api_key =
            env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?;
        let openai_model = env::var("SCRUMBOT_MODEL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());

        Ok(Self {
            jira_url,
            jira_email,
            jira_api_token,
            jira_project,
            assignee,
            openai_api_key,
            openai_model,
        })
    }
}
