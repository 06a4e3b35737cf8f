//! The RPC surface the cursor talks through.
//!
//! Connection setup, authentication and wire framing live in whatever
//! implements [`RpcClient`]; the cursor only issues the calls below.

pub mod scripted;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{
    CloseOperationReq, CloseOperationResp, FetchResultsReq, FetchResultsResp,
    GetOperationStatusReq, GetOperationStatusResp, GetResultSetMetadataReq,
    GetResultSetMetadataResp,
};

pub use self::scripted::{Fixture, Scripted, ScriptedClient};

/// The call itself failed (network, framing, serialization).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type RpcResult<T> = Result<T, TransportError>;

#[async_trait]
pub trait RpcClient: Send + Sync {
    async fn get_operation_status(
        &self,
        req: GetOperationStatusReq,
    ) -> RpcResult<GetOperationStatusResp>;

    async fn get_result_set_metadata(
        &self,
        req: GetResultSetMetadataReq,
    ) -> RpcResult<GetResultSetMetadataResp>;

    async fn fetch_results(&self, req: FetchResultsReq) -> RpcResult<FetchResultsResp>;

    async fn close_operation(&self, req: CloseOperationReq) -> RpcResult<CloseOperationResp>;
}
