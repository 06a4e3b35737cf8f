use std::{
    collections::VecDeque,
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{RpcClient, RpcResult, TransportError};
use crate::core::types::{
    CloseOperationReq, CloseOperationResp, FetchResultsReq, FetchResultsResp,
    GetOperationStatusReq, GetOperationStatusResp, GetResultSetMetadataReq,
    GetResultSetMetadataResp, OperationHandle, StatusEnvelope,
};
use crate::error::AppResult;

/// One recorded reply: either a response or a failed call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scripted<T> {
    Ok(T),
    TransportError(String),
}

impl<T> Scripted<T> {
    fn into_result(self) -> RpcResult<T> {
        match self {
            Scripted::Ok(v) => Ok(v),
            Scripted::TransportError(msg) => Err(TransportError::new(msg)),
        }
    }
}

/// A recorded conversation for a single operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub operation: OperationHandle,
    pub statuses: Vec<Scripted<GetOperationStatusResp>>,
    #[serde(default)]
    pub metadata: Vec<Scripted<GetResultSetMetadataResp>>,
    #[serde(default)]
    pub fetches: Vec<Scripted<FetchResultsResp>>,
    #[serde(default)]
    pub close: Vec<Scripted<CloseOperationResp>>,
}

impl Fixture {
    pub fn load(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[derive(Debug, Default)]
pub struct CallCounts {
    pub status: AtomicUsize,
    pub metadata: AtomicUsize,
    pub fetch: AtomicUsize,
    pub close: AtomicUsize,
}

/// Replays a [`Fixture`]. Status replies are consumed in order and the last one
/// repeats; every other list runs dry into a transport error.
#[derive(Debug)]
pub struct ScriptedClient {
    statuses: Mutex<VecDeque<Scripted<GetOperationStatusResp>>>,
    metadata: Mutex<VecDeque<Scripted<GetResultSetMetadataResp>>>,
    fetches: Mutex<VecDeque<Scripted<FetchResultsResp>>>,
    close: Mutex<VecDeque<Scripted<CloseOperationResp>>>,
    last_fetch: Mutex<Option<FetchResultsReq>>,
    pub calls: CallCounts,
}

impl ScriptedClient {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            statuses: Mutex::new(fixture.statuses.into()),
            metadata: Mutex::new(fixture.metadata.into()),
            fetches: Mutex::new(fixture.fetches.into()),
            close: Mutex::new(fixture.close.into()),
            last_fetch: Mutex::new(None),
            calls: CallCounts::default(),
        }
    }

    pub fn status_calls(&self) -> usize {
        self.calls.status.load(Ordering::SeqCst)
    }

    pub fn metadata_calls(&self) -> usize {
        self.calls.metadata.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.calls.fetch.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.calls.close.load(Ordering::SeqCst)
    }

    /// The most recent fetch request, for asserting orientation and page size.
    pub fn last_fetch(&self) -> Option<FetchResultsReq> {
        self.last_fetch.lock().ok().and_then(|g| g.clone())
    }
}

fn pop<T>(queue: &Mutex<VecDeque<Scripted<T>>>, call: &str) -> RpcResult<T> {
    let mut guard = queue
        .lock()
        .map_err(|_| TransportError::new("poisoned lock"))?;
    match guard.pop_front() {
        Some(reply) => reply.into_result(),
        None => Err(TransportError::new(format!("no scripted reply for {call}"))),
    }
}

#[async_trait]
impl RpcClient for ScriptedClient {
    async fn get_operation_status(
        &self,
        _req: GetOperationStatusReq,
    ) -> RpcResult<GetOperationStatusResp> {
        self.calls.status.fetch_add(1, Ordering::SeqCst);
        let mut guard = self
            .statuses
            .lock()
            .map_err(|_| TransportError::new("poisoned lock"))?;
        let reply = if guard.len() > 1 {
            guard.pop_front()
        } else {
            guard.front().cloned()
        };
        match reply {
            Some(reply) => reply.into_result(),
            None => Err(TransportError::new(
                "no scripted reply for GetOperationStatus",
            )),
        }
    }

    async fn get_result_set_metadata(
        &self,
        _req: GetResultSetMetadataReq,
    ) -> RpcResult<GetResultSetMetadataResp> {
        self.calls.metadata.fetch_add(1, Ordering::SeqCst);
        pop(&self.metadata, "GetResultSetMetadata")
    }

    async fn fetch_results(&self, req: FetchResultsReq) -> RpcResult<FetchResultsResp> {
        self.calls.fetch.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_fetch.lock() {
            *last = Some(req);
        }
        pop(&self.fetches, "FetchResults")
    }

    async fn close_operation(&self, _req: CloseOperationReq) -> RpcResult<CloseOperationResp> {
        self.calls.close.fetch_add(1, Ordering::SeqCst);
        let mut guard = self
            .close
            .lock()
            .map_err(|_| TransportError::new("poisoned lock"))?;
        // Servers answer CloseOperation even when nothing was recorded for it.
        Ok(guard
            .pop_front()
            .map(Scripted::into_result)
            .transpose()?
            .unwrap_or(CloseOperationResp {
                status: StatusEnvelope::success(),
            }))
    }
}
