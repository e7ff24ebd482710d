use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),

    #[error("Invalid configuration value for {name}: {details}")]
    InvalidConfig { name: String, details: String },

    #[error("Sheets authentication failed: {0}")]
    SheetsAuth(String),

    #[error("Sheets query failed: {0}")]
    SheetsQuery(String),

    #[error("Sheets append failed: {0}")]
    SheetsAppend(String),

    #[error("Chat completion failed: {0}")]
    Completion(String),

    #[error("Dispatcher exhausted after {rounds} tool-call rounds without a final answer")]
    DispatcherExhausted { rounds: usize },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
