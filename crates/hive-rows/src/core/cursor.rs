use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::client::RpcClient;
use crate::core::convert::{convert_row, Row};
use crate::core::options::CursorOptions;
use crate::core::status::{self, Status};
use crate::core::types::{
    CloseOperationReq, ColumnDesc, FetchOrientation, FetchResultsReq, GetResultSetMetadataReq,
    OperationHandle, WireRow,
};
use crate::error::{AppError, AppResult};

/// Row iteration over a query result. `Ok(None)` from `next` is end-of-data.
#[async_trait]
pub trait Rows {
    fn columns(&self) -> Vec<String>;
    async fn next(&mut self) -> AppResult<Option<Row>>;
    async fn close(&mut self) -> AppResult<()>;
}

/// Completion tracking for an operation that runs on the server.
#[async_trait]
pub trait AsyncRows {
    async fn poll(&self) -> AppResult<Status>;
    async fn wait(&mut self) -> AppResult<Status>;
}

#[derive(Debug, Clone, PartialEq)]
enum CursorState {
    NotReady,
    Ready,
    Failed(Status),
    Exhausted,
    Closed,
}

/// Cursor over the result of one remote operation.
///
/// The cursor waits for the operation to finish, reads the result schema once,
/// then pages through rows with `FetchResults`. All mutation goes through
/// `&mut self`; share it across tasks behind a lock if you must. The
/// [`CancellationToken`] from [`ResultCursor::cancellation_token`] is the one
/// piece meant to be handed to other tasks.
pub struct ResultCursor {
    client: Arc<dyn RpcClient>,
    operation: OperationHandle,
    options: CursorOptions,
    columns: Vec<ColumnDesc>,
    batch: Vec<WireRow>,
    offset: usize,
    has_more: bool,
    state: CursorState,
    cancel: CancellationToken,
}

impl std::fmt::Debug for ResultCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCursor")
            .field("operation", &self.operation)
            .field("state", &self.state)
            .field("columns", &self.columns.len())
            .field("offset", &self.offset)
            .field("batch_len", &self.batch.len())
            .field("has_more", &self.has_more)
            .finish()
    }
}

impl ResultCursor {
    pub fn new(client: Arc<dyn RpcClient>, operation: OperationHandle) -> Self {
        Self::with_options(client, operation, CursorOptions::default())
    }

    pub fn with_options(
        client: Arc<dyn RpcClient>,
        operation: OperationHandle,
        options: CursorOptions,
    ) -> Self {
        Self {
            client,
            operation,
            options,
            columns: Vec::new(),
            batch: Vec::new(),
            offset: 0,
            has_more: true,
            state: CursorState::NotReady,
            cancel: CancellationToken::new(),
        }
    }

    pub fn operation(&self) -> &OperationHandle {
        &self.operation
    }

    pub fn is_ready(&self) -> bool {
        self.state == CursorState::Ready
    }

    /// Cancelling this token aborts an in-flight or future `wait`.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn poll(&self) -> AppResult<Status> {
        status::poll(self.client.as_ref(), &self.operation).await
    }

    /// Polls until the operation reaches a terminal state, then loads the
    /// result schema. On a cursor that is already ready this is a single poll.
    pub async fn wait(&mut self) -> AppResult<Status> {
        match &self.state {
            CursorState::Closed => return Err(closed_error()),
            CursorState::Failed(status) => return Err(status.to_failure()),
            CursorState::Ready | CursorState::Exhausted => return self.poll().await,
            CursorState::NotReady => {}
        }

        let deadline = self.options.wait_timeout.map(|t| Instant::now() + t);
        loop {
            if self.cancel.is_cancelled() {
                return Err(AppError::Cancelled);
            }

            let status = self.guarded(deadline, self.poll()).await?;
            if status.is_complete() {
                return self.complete(status, deadline).await;
            }

            let mut delay = self.options.poll_interval;
            if let Some(deadline) = deadline {
                let now = Instant::now();
                if now >= deadline {
                    tracing::warn!(operation = %self.operation.guid, state = %status, "gave up waiting for operation");
                    return Err(AppError::Timeout);
                }
                delay = delay.min(deadline - now);
            }

            tokio::select! {
                _ = self.cancel.cancelled() => return Err(AppError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Runs a wait-time request under the wait deadline and the cancellation token.
    async fn guarded<T, F>(&self, deadline: Option<Instant>, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        let bounded = async {
            match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, fut)
                    .await
                    .map_err(|_| AppError::Timeout)?,
                None => fut.await,
            }
        };
        tokio::select! {
            _ = self.cancel.cancelled() => Err(AppError::Cancelled),
            res = bounded => res,
        }
    }

    async fn complete(&mut self, status: Status, deadline: Option<Instant>) -> AppResult<Status> {
        if !status.is_success() {
            tracing::warn!(operation = %self.operation.guid, state = %status, "operation did not finish successfully");
            let err = status.to_failure();
            self.state = CursorState::Failed(status);
            return Err(err);
        }

        if !self.operation.has_result_set {
            tracing::info!(operation = %self.operation.guid, "operation has no result set");
            self.has_more = false;
            self.state = CursorState::Ready;
            return Ok(status);
        }

        let req = GetResultSetMetadataReq {
            operation_handle: self.operation.clone(),
        };
        let resp = self
            .guarded(deadline, async {
                Ok(self.client.get_result_set_metadata(req).await?)
            })
            .await?;
        if !resp.status.is_success() {
            return Err(AppError::Protocol {
                call: "GetResultSetMetadata",
                message: resp.status.to_string(),
            });
        }

        self.columns = resp.schema.map(|s| s.columns).unwrap_or_default();
        self.state = CursorState::Ready;
        tracing::info!(operation = %self.operation.guid, columns = self.columns.len(), "result set ready");
        Ok(status)
    }

    /// Column names in schema order; empty until the cursor is ready.
    pub fn columns(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_descriptors(&self) -> &[ColumnDesc] {
        &self.columns
    }

    /// Next row, waiting for the operation first if needed. `Ok(None)` once the
    /// server has no more rows.
    pub async fn next(&mut self) -> AppResult<Option<Row>> {
        match &self.state {
            CursorState::Closed => return Err(closed_error()),
            CursorState::Failed(status) => return Err(status.to_failure()),
            CursorState::Exhausted => return Ok(None),
            CursorState::NotReady | CursorState::Ready => {}
        }

        if !self.is_ready() {
            let status = self.wait().await?;
            if !status.is_success() || !self.is_ready() {
                return Err(AppError::State(format!(
                    "unsuccessful query execution: {status}"
                )));
            }
        }

        while self.offset >= self.batch.len() {
            if !self.has_more {
                tracing::debug!(operation = %self.operation.guid, "result set exhausted");
                self.state = CursorState::Exhausted;
                self.batch.clear();
                self.offset = 0;
                return Ok(None);
            }
            self.fetch_next().await?;
        }

        let row = convert_row(&self.columns, &self.batch[self.offset])?;
        self.offset += 1;
        Ok(Some(row))
    }

    async fn fetch_next(&mut self) -> AppResult<()> {
        let resp = self
            .client
            .fetch_results(FetchResultsReq {
                operation_handle: self.operation.clone(),
                orientation: FetchOrientation::Next,
                max_rows: self.options.page_size,
            })
            .await?;
        if !resp.status.is_success() {
            return Err(AppError::Protocol {
                call: "FetchResults",
                message: resp.status.to_string(),
            });
        }

        self.batch = resp.results.map(|r| r.rows).unwrap_or_default();
        self.offset = 0;
        self.has_more = resp.has_more_rows.unwrap_or(false);
        tracing::debug!(
            operation = %self.operation.guid,
            rows = self.batch.len(),
            has_more = self.has_more,
            "fetched result batch"
        );
        Ok(())
    }

    /// Releases the cursor. Unless every row was read, asks the server to close
    /// the operation; that request is best-effort and never fails the call.
    pub async fn close(&mut self) -> AppResult<()> {
        if self.state == CursorState::Closed {
            return Ok(());
        }

        self.cancel.cancel();
        let drained = self.state == CursorState::Exhausted;
        self.state = CursorState::Closed;
        self.batch = Vec::new();
        self.offset = 0;

        if drained {
            return Ok(());
        }

        let res = self
            .client
            .close_operation(CloseOperationReq {
                operation_handle: self.operation.clone(),
            })
            .await;
        match res {
            Ok(resp) if resp.status.is_success() => {
                tracing::debug!(operation = %self.operation.guid, "closed remote operation");
            }
            Ok(resp) => {
                tracing::warn!(operation = %self.operation.guid, status = %resp.status, "CloseOperation rejected; ignoring");
            }
            Err(e) => {
                tracing::warn!(operation = %self.operation.guid, error = %e, "CloseOperation failed; ignoring");
            }
        }
        Ok(())
    }
}

fn closed_error() -> AppError {
    AppError::State("cursor is closed".into())
}

#[async_trait]
impl Rows for ResultCursor {
    fn columns(&self) -> Vec<String> {
        ResultCursor::columns(self)
    }

    async fn next(&mut self) -> AppResult<Option<Row>> {
        ResultCursor::next(self).await
    }

    async fn close(&mut self) -> AppResult<()> {
        ResultCursor::close(self).await
    }
}

#[async_trait]
impl AsyncRows for ResultCursor {
    async fn poll(&self) -> AppResult<Status> {
        ResultCursor::poll(self).await
    }

    async fn wait(&mut self) -> AppResult<Status> {
        ResultCursor::wait(self).await
    }
}
