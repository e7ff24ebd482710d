//! Environment-driven configuration for the collaborator layers. The core
//! normalizer/aggregator is configuration-free.

use crate::error::{AgentError, Result};
use std::env;
use std::path::PathBuf;

/// Default chat-completion model.
pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";

/// Default A1 range covering the complete financial model structure.
pub const DEFAULT_RANGE: &str = "Sheet1!A1:AF200";

/// Maximum number of normalized rows fed back to the model per query.
pub const MAX_ROWS: usize = 500;

/// Default cap on completion/tool-call rounds per question.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// API key for the chat-completion service.
    pub openai_api_key: String,
    /// Path to the spreadsheet service credentials file.
    pub credentials_path: PathBuf,
    /// Spreadsheet queried when the model does not name one.
    pub spreadsheet_id: String,
    pub model: String,
    /// Hard bound on the dispatcher loop.
    pub max_tool_rounds: usize,
    /// Absolute tolerance for the NET INCOME cross-check.
    pub net_income_tolerance: f64,
}

impl AgentConfig {
    /// Reads configuration from the environment. Required variables:
    /// `OPENAI_API_KEY`, `GOOGLE_APPLICATION_CREDENTIALS`,
    /// `GOOGLE_SHEET_ID`. Optional overrides: `FINANCE_AGENT_MODEL`,
    /// `MAX_TOOL_ROUNDS`, `NET_INCOME_TOLERANCE`.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            credentials_path: PathBuf::from(require_env("GOOGLE_APPLICATION_CREDENTIALS")?),
            spreadsheet_id: require_env("GOOGLE_SHEET_ID")?,
            model: env::var("FINANCE_AGENT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            max_tool_rounds: parse_env("MAX_TOOL_ROUNDS", DEFAULT_MAX_TOOL_ROUNDS)?,
            net_income_tolerance: parse_env(
                "NET_INCOME_TOLERANCE",
                crate::hierarchy::DEFAULT_TOLERANCE,
            )?,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AgentError::MissingEnv(name.to_string())),
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => value.parse().map_err(|e| AgentError::InvalidConfig {
            name: name.to_string(),
            details: format!("{}", e),
        }),
        Err(_) => Ok(default),
    }
}
