//! The dispatcher: a bounded request/tool-call loop between the
//! chat-completion service and the spreadsheet tools.

use crate::config::{AgentConfig, MAX_ROWS};
use crate::error::{AgentError, Result};
use crate::hierarchy;
use crate::llm::client::ChatClient;
use crate::llm::prompts::{
    SHEETS_QUERY_DESCRIPTION, SHEETS_ROLLUP_DESCRIPTION, SYSTEM_INSTRUCTIONS,
};
use crate::llm::types::{ChatCompletionRequest, ChatMessage, ToolCall, ToolSpec};
use crate::sheets::{SheetsClient, SheetsQueryParams, SheetsQueryReturn};
use crate::table::{self, NormalizedTable};
use log::{info, warn};

pub const SHEETS_QUERY_TOOL: &str = "sheets_query";
pub const SHEETS_ROLLUP_TOOL: &str = "sheets_rollup";

/// Orchestrates one question at a time: builds the tool declarations,
/// alternates completions with tool invocations and returns the model's
/// final answer. Holds no per-question state, so a single instance can be
/// shared across requests.
pub struct FinanceAgent {
    chat: ChatClient,
    sheets: SheetsClient,
    config: AgentConfig,
}

impl FinanceAgent {
    pub fn new(chat: ChatClient, sheets: SheetsClient, config: AgentConfig) -> Self {
        Self {
            chat,
            sheets,
            config,
        }
    }

    /// Builds the agent from configuration: loads the credentials file and
    /// constructs both service clients.
    pub async fn from_config(config: AgentConfig) -> Result<Self> {
        let sheets = SheetsClient::from_credentials_file(&config.credentials_path).await?;
        let chat = ChatClient::new(config.openai_api_key.clone());
        Ok(Self::new(chat, sheets, config))
    }

    /// Answers one question. Each round performs exactly one completion;
    /// a completion without tool calls is the final answer. The loop is
    /// hard-bounded by `max_tool_rounds`.
    pub async fn answer(&self, question: &str) -> Result<String> {
        info!("Processing question: {}", question);

        let tools = self.tool_specs()?;
        let mut messages = vec![
            ChatMessage::system(SYSTEM_INSTRUCTIONS),
            ChatMessage::user(question),
        ];

        for round in 1..=self.config.max_tool_rounds {
            let request = ChatCompletionRequest {
                model: self.config.model.clone(),
                messages: messages.clone(),
                tools: tools.clone(),
                tool_choice: "auto".to_string(),
            };

            let message = self.chat.create_completion(&request).await?;

            let calls = match message.tool_calls {
                Some(calls) if !calls.is_empty() => calls,
                _ => {
                    return message.content.ok_or_else(|| {
                        AgentError::Completion("final message had no content".to_string())
                    });
                }
            };

            info!("Round {}: {} tool call(s) requested", round, calls.len());
            messages.push(ChatMessage::assistant_tool_calls(calls.clone()));
            for call in calls {
                let payload = self.invoke_tool(&call).await?;
                messages.push(ChatMessage::tool(call.id, payload));
            }
        }

        warn!(
            "No final answer after {} rounds, giving up",
            self.config.max_tool_rounds
        );
        Err(AgentError::DispatcherExhausted {
            rounds: self.config.max_tool_rounds,
        })
    }

    fn tool_specs(&self) -> Result<Vec<ToolSpec>> {
        let parameters = serde_json::to_value(schemars::schema_for!(SheetsQueryParams))?;
        Ok(vec![
            ToolSpec::function(SHEETS_QUERY_TOOL, SHEETS_QUERY_DESCRIPTION, parameters.clone()),
            ToolSpec::function(SHEETS_ROLLUP_TOOL, SHEETS_ROLLUP_DESCRIPTION, parameters),
        ])
    }

    async fn invoke_tool(&self, call: &ToolCall) -> Result<String> {
        match call.function.name.as_str() {
            SHEETS_QUERY_TOOL => {
                let table = self.fetch_table(&call.function.arguments).await?;
                let result = SheetsQueryReturn {
                    columns: table.columns.clone(),
                    data: table.records().into_iter().take(MAX_ROWS).collect(),
                };
                Ok(serde_json::to_string(&result)?)
            }
            SHEETS_ROLLUP_TOOL => {
                let table = self.fetch_table(&call.function.arguments).await?;
                let report =
                    hierarchy::aggregate_with_tolerance(&table, self.config.net_income_tolerance);
                Ok(serde_json::to_string(&report)?)
            }
            other => Err(AgentError::Completion(format!(
                "model requested unknown tool '{}'",
                other
            ))),
        }
    }

    async fn fetch_table(&self, arguments: &str) -> Result<NormalizedTable> {
        let params: SheetsQueryParams = serde_json::from_str(arguments)
            .map_err(|e| AgentError::Completion(format!("invalid tool arguments: {}", e)))?;
        let spreadsheet_id = params
            .spreadsheet_id
            .as_deref()
            .unwrap_or(self.config.spreadsheet_id.as_str());
        let grid = self.sheets.fetch_grid(spreadsheet_id, &params.a1_range).await?;
        Ok(table::normalize(&grid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_specs_expose_both_tools() {
        let parameters = serde_json::to_value(schemars::schema_for!(SheetsQueryParams)).unwrap();
        let spec = ToolSpec::function(SHEETS_QUERY_TOOL, SHEETS_QUERY_DESCRIPTION, parameters);
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["name"], SHEETS_QUERY_TOOL);
        // The schema must document the range parameter for the model.
        let schema = json["function"]["parameters"].to_string();
        assert!(schema.contains("a1_range"));
        assert!(schema.contains("A1 notation range"));
    }

    #[test]
    fn test_tool_arguments_fall_back_to_defaults() {
        let params: SheetsQueryParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.a1_range, crate::config::DEFAULT_RANGE);
        assert!(params.spreadsheet_id.is_none());
    }

    #[tokio::test]
    async fn test_round_cap_surfaces_exhaustion() {
        let config = AgentConfig {
            openai_api_key: "test-key".to_string(),
            credentials_path: "/dev/null".into(),
            spreadsheet_id: "sheet".to_string(),
            model: crate::config::DEFAULT_MODEL.to_string(),
            max_tool_rounds: 0,
            net_income_tolerance: hierarchy::DEFAULT_TOLERANCE,
        };
        let agent = FinanceAgent::new(
            ChatClient::new(config.openai_api_key.clone()),
            SheetsClient::new(crate::sheets::ServiceCredentials {
                access_token: "t".to_string(),
            }),
            config,
        );
        // With zero rounds allowed, the loop body never runs and no
        // request is issued.
        let err = agent.answer("anything").await.unwrap_err();
        assert!(matches!(err, AgentError::DispatcherExhausted { rounds: 0 }));
    }
}
