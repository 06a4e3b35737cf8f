use std::fmt;

use chrono::{DateTime, Utc};

use crate::client::RpcClient;
use crate::core::types::{GetOperationStatusReq, OperationHandle, OperationState};
use crate::error::{AppError, AppResult};

/// Point-in-time snapshot of an operation's state.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    state: Option<OperationState>,
    pub observed_at: DateTime<Utc>,
    error_message: Option<String>,
}

impl Status {
    pub fn new(state: Option<OperationState>, observed_at: DateTime<Utc>) -> Self {
        Self {
            state,
            observed_at,
            error_message: None,
        }
    }

    pub fn with_error_message(mut self, message: Option<String>) -> Self {
        self.error_message = message;
        self
    }

    pub fn state(&self) -> Option<OperationState> {
        self.state
    }

    /// Server-side diagnostics reported alongside the state, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        matches!(
            self.state,
            Some(
                OperationState::Finished
                    | OperationState::Canceled
                    | OperationState::Closed
                    | OperationState::Error
                    | OperationState::TimedOut
            )
        )
    }

    pub fn is_success(&self) -> bool {
        self.state == Some(OperationState::Finished)
    }

    pub(crate) fn to_failure(&self) -> AppError {
        match self.state {
            Some(state) => AppError::QueryExecution {
                state,
                message: self.error_message.clone(),
            },
            None => AppError::State(format!("operation ended in state {self}")),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            Some(state) => write!(f, "{state}"),
            None => f.write_str("unknown"),
        }
    }
}

/// Asks the server for the current state of `operation`.
pub async fn poll(client: &dyn RpcClient, operation: &OperationHandle) -> AppResult<Status> {
    let resp = client
        .get_operation_status(GetOperationStatusReq {
            operation_handle: operation.clone(),
        })
        .await?;

    if !resp.status.is_success() {
        return Err(AppError::Protocol {
            call: "GetOperationStatus",
            message: resp.status.to_string(),
        });
    }

    let status = Status::new(resp.operation_state, Utc::now()).with_error_message(resp.error_message);
    tracing::debug!(operation = %operation.guid, state = %status, "polled operation status");
    Ok(status)
}
