//! Result retrieval for queries that run asynchronously on a remote,
//! HiveServer2-style query service.
//!
//! A [`ResultCursor`] is bound to an operation handle issued elsewhere. It
//! polls the operation until it reaches a terminal state, reads the result
//! schema once, then pages through rows with `FetchResults`. The RPC calls go
//! through the [`RpcClient`] trait; [`BlockingCursor`] wraps the async cursor
//! for synchronous callers.

pub mod adapters;
pub mod client;
pub mod core;
pub mod error;

pub use crate::client::{RpcClient, TransportError};
pub use crate::core::blocking::BlockingCursor;
pub use crate::core::convert::{Row, Value};
pub use crate::core::cursor::{AsyncRows, ResultCursor, Rows};
pub use crate::core::options::CursorOptions;
pub use crate::core::status::Status;
pub use crate::core::types::{ColumnDesc, ColumnType, OperationHandle, OperationState};
pub use crate::error::{AppError, AppResult};
