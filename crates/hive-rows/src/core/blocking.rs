use tokio::runtime::Runtime;

use crate::core::convert::Row;
use crate::core::cursor::ResultCursor;
use crate::core::status::Status;
use crate::error::{AppError, AppResult};

/// Synchronous face of [`ResultCursor`] for callers that are not running inside
/// an async runtime. Owns a current-thread runtime and blocks on every call.
///
/// Must not be used from within a tokio runtime.
pub struct BlockingCursor {
    rt: Runtime,
    inner: ResultCursor,
    done: bool,
}

impl BlockingCursor {
    pub fn new(inner: ResultCursor) -> AppResult<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(Self {
            rt,
            inner,
            done: false,
        })
    }

    pub fn wait(&mut self) -> AppResult<Status> {
        self.rt.block_on(self.inner.wait())
    }

    pub fn poll(&self) -> AppResult<Status> {
        self.rt.block_on(self.inner.poll())
    }

    pub fn columns(&self) -> Vec<String> {
        self.inner.columns()
    }

    pub fn next_row(&mut self) -> AppResult<Option<Row>> {
        self.rt.block_on(self.inner.next())
    }

    pub fn close(&mut self) -> AppResult<()> {
        self.done = true;
        self.rt.block_on(self.inner.close())
    }

    pub fn cursor(&self) -> &ResultCursor {
        &self.inner
    }
}

impl Iterator for BlockingCursor {
    type Item = AppResult<Row>;

    /// Yields rows until end-of-data; after the first error iteration stops.
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
