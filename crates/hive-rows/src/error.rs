use thiserror::Error;

use crate::client::TransportError;
use crate::core::types::OperationState;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("{call} failed: {message}")]
    Protocol { call: &'static str, message: String },

    #[error("query failed execution: {state}{}", fmt_message(.message))]
    QueryExecution {
        state: OperationState,
        message: Option<String>,
    },

    #[error("invalid cursor state: {0}")]
    State(String),

    #[error("cannot convert column {column}: {message}")]
    Conversion { column: String, message: String },

    #[error("wait cancelled")]
    Cancelled,

    #[error("timeout")]
    Timeout,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

fn fmt_message(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(" ({m})"),
        None => String::new(),
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Transport(_) => "TRANSPORT_ERROR",
            AppError::Protocol { .. } => "PROTOCOL_ERROR",
            AppError::QueryExecution { .. } => "QUERY_EXECUTION_ERROR",
            AppError::State(_) => "STATE_ERROR",
            AppError::Conversion { .. } => "CONVERSION_ERROR",
            AppError::Cancelled => "CANCELLED",
            AppError::Timeout => "TIMEOUT",
            AppError::Io(_) => "IO_ERROR",
            AppError::Json(_) => "JSON_ERROR",
            AppError::Internal(_) => "INTERNAL",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
