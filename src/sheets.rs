//! Spreadsheet service client: fetches raw cell grids and appends rows over
//! the Sheets v4 REST endpoints.
//!
//! Authentication uses an explicit credentials handle loaded once at
//! construction time and shared across calls. Token minting/refresh is
//! outside this crate; the credentials file carries a ready bearer token.

use crate::error::{AgentError, Result};
use crate::table::CellGrid;
use log::{debug, info};
use reqwest::Client;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";

/// Credential handle for the spreadsheet service.
#[derive(Clone, Deserialize)]
pub struct ServiceCredentials {
    pub access_token: String,
}

impl std::fmt::Debug for ServiceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The token must never reach the logs.
        f.debug_struct("ServiceCredentials")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Parameters for a grid query. Also serves as the JSON schema advertised
/// to the model for the `sheets_query` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SheetsQueryParams {
    #[schemars(description = "Google Sheets file ID. Omit to use the configured default sheet.")]
    pub spreadsheet_id: Option<String>,

    #[schemars(description = "A1 notation range (e.g. 'Sheet1!A1:Z50')")]
    #[serde(default = "default_range")]
    pub a1_range: String,
}

fn default_range() -> String {
    crate::config::DEFAULT_RANGE.to_string()
}

impl Default for SheetsQueryParams {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            a1_range: default_range(),
        }
    }
}

/// Normalized query result fed back to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsQueryReturn {
    pub columns: Vec<String>,
    pub data: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Parameters for appending one row, keyed by column header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsAppendParams {
    pub spreadsheet_id: String,
    /// Target range (e.g. 'Sheet1!A1'). The sheet name portion is used to
    /// locate the header row.
    pub a1_range: String,
    pub values: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsAppendReturn {
    pub updated_range: String,
    pub updated_rows: u64,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    updates: AppendUpdates,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_range: String,
    updated_rows: u64,
}

#[derive(Clone, Debug)]
pub struct SheetsClient {
    client: Client,
    credentials: Arc<ServiceCredentials>,
    base_url: String,
}

impl SheetsClient {
    pub fn new(credentials: ServiceCredentials) -> Self {
        Self {
            client: Client::new(),
            credentials: Arc::new(credentials),
            base_url: SHEETS_BASE_URL.to_string(),
        }
    }

    /// Loads the credentials file and builds the client. Called once per
    /// process; the resulting handle is shared across requests.
    pub async fn from_credentials_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AgentError::SheetsAuth(format!(
                "could not read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        let credentials: ServiceCredentials = serde_json::from_str(&raw)
            .map_err(|e| AgentError::SheetsAuth(format!("invalid credentials file: {}", e)))?;
        Ok(Self::new(credentials))
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetches the raw cell grid for an A1 range. An empty range is a
    /// successful fetch with an empty grid, not an error.
    pub async fn fetch_grid(&self, spreadsheet_id: &str, a1_range: &str) -> Result<CellGrid> {
        info!("Querying spreadsheet {} range {}", spreadsheet_id, a1_range);

        let url = format!(
            "{}/spreadsheets/{}/values/{}",
            self.base_url,
            urlencoding::encode(spreadsheet_id),
            urlencoding::encode(a1_range)
        );

        let res = self
            .client
            .get(&url)
            .bearer_auth(&self.credentials.access_token)
            .send()
            .await
            .map_err(|e| AgentError::SheetsQuery(format!("request failed: {}", e)))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AgentError::SheetsQuery(format!(
                "values.get failed (status {}): {}",
                status, body
            )));
        }

        let range: ValueRange = res
            .json()
            .await
            .map_err(|e| AgentError::SheetsQuery(format!("invalid values response: {}", e)))?;

        debug!("Fetched {} raw rows", range.values.len());
        Ok(range.values)
    }

    /// Appends one row, ordering the provided values to match the sheet's
    /// header row. Columns absent from `values` are written as empty cells.
    pub async fn append_row(&self, params: &SheetsAppendParams) -> Result<SheetsAppendReturn> {
        let sheet_name = params
            .a1_range
            .split('!')
            .next()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                AgentError::SheetsAppend(format!("invalid target range '{}'", params.a1_range))
            })?;

        let header_range = format!("{}!1:1", sheet_name);
        let headers = self
            .fetch_grid(&params.spreadsheet_id, &header_range)
            .await
            .map_err(|e| AgentError::SheetsAppend(format!("could not read headers: {}", e)))?
            .into_iter()
            .next()
            .unwrap_or_default();

        if headers.is_empty() {
            return Err(AgentError::SheetsAppend(
                "could not retrieve sheet headers".to_string(),
            ));
        }

        let ordered: Vec<String> = headers
            .iter()
            .map(|header| params.values.get(header).cloned().unwrap_or_default())
            .collect();

        let url = format!(
            "{}/spreadsheets/{}/values/{}:append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS",
            self.base_url,
            urlencoding::encode(&params.spreadsheet_id),
            urlencoding::encode(&params.a1_range)
        );

        let body = serde_json::json!({ "values": [ordered] });
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.credentials.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::SheetsAppend(format!("request failed: {}", e)))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AgentError::SheetsAppend(format!(
                "values.append failed (status {}): {}",
                status, body
            )));
        }

        let response: AppendResponse = res
            .json()
            .await
            .map_err(|e| AgentError::SheetsAppend(format!("invalid append response: {}", e)))?;

        info!(
            "Appended {} row(s) to {}",
            response.updates.updated_rows, response.updates.updated_range
        );
        Ok(SheetsAppendReturn {
            updated_range: response.updates.updated_range,
            updated_rows: response.updates.updated_rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params_defaults() {
        let params: SheetsQueryParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.spreadsheet_id, None);
        assert_eq!(params.a1_range, crate::config::DEFAULT_RANGE);

        let params: SheetsQueryParams =
            serde_json::from_str(r#"{"spreadsheet_id": "abc", "a1_range": "Sheet1!A1:B2"}"#)
                .unwrap();
        assert_eq!(params.spreadsheet_id.as_deref(), Some("abc"));
        assert_eq!(params.a1_range, "Sheet1!A1:B2");
    }

    #[test]
    fn test_query_params_schema_carries_descriptions() {
        let schema = schemars::schema_for!(SheetsQueryParams);
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("A1 notation range"));
        assert!(json.contains("spreadsheet_id"));
    }

    #[test]
    fn test_credentials_debug_redacts_token() {
        let credentials = ServiceCredentials {
            access_token: "secret-token".to_string(),
        };
        let rendered = format!("{:?}", credentials);
        assert!(!rendered.contains("secret-token"));
    }

    #[tokio::test]
    async fn test_missing_credentials_file_is_auth_error() {
        let err = SheetsClient::from_credentials_file(Path::new("/nonexistent/creds.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::SheetsAuth(_)));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_query_error() {
        // Unroutable base URL: the transport error surfaces as the single
        // query-failure category at the call site.
        let client = SheetsClient::new(ServiceCredentials {
            access_token: "t".to_string(),
        })
        .with_base_url("http://127.0.0.1:1/v4");
        let err = client.fetch_grid("sheet", "Sheet1!A1:B2").await.unwrap_err();
        assert!(matches!(err, AgentError::SheetsQuery(_)));
    }
}
