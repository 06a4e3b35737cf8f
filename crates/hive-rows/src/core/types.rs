use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a query running on the server. Issued by statement submission,
/// which happens outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationHandle {
    pub guid: String,
    #[serde(default = "default_true")]
    pub has_result_set: bool,
}

fn default_true() -> bool {
    true
}

impl OperationHandle {
    pub fn new(guid: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            has_result_set: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationState {
    Initialized,
    Pending,
    Running,
    Finished,
    Canceled,
    Closed,
    Error,
    TimedOut,
    Unknown,
}

impl OperationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationState::Initialized => "INITIALIZED",
            OperationState::Pending => "PENDING",
            OperationState::Running => "RUNNING",
            OperationState::Finished => "FINISHED",
            OperationState::Canceled => "CANCELED",
            OperationState::Closed => "CLOSED",
            OperationState::Error => "ERROR",
            OperationState::TimedOut => "TIMED_OUT",
            OperationState::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    Success,
    SuccessWithInfo,
    StillExecuting,
    Error,
    InvalidHandle,
}

/// Success/failure wrapper carried by every response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEnvelope {
    pub code: StatusCode,
    #[serde(default)]
    pub info_messages: Vec<String>,
    #[serde(default)]
    pub sql_state: Option<String>,
    #[serde(default)]
    pub error_code: Option<i32>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl StatusEnvelope {
    pub fn success() -> Self {
        Self::with_code(StatusCode::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::with_code(StatusCode::Error)
        }
    }

    fn with_code(code: StatusCode) -> Self {
        Self {
            code,
            info_messages: Vec::new(),
            sql_state: None,
            error_code: None,
            error_message: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.code, StatusCode::Success | StatusCode::SuccessWithInfo)
    }
}

impl fmt::Display for StatusEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.code)?;
        if let Some(code) = self.error_code {
            write!(f, " [{code}]")?;
        }
        if let Some(state) = &self.sql_state {
            write!(f, " sqlstate={state}")?;
        }
        if let Some(msg) = &self.error_message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    Boolean,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    String,
    Varchar,
    Char,
    Timestamp,
    Date,
    Decimal,
    Binary,
    Null,
    Array,
    Map,
    Struct,
    Union,
    UserDefined,
    IntervalYearMonth,
    IntervalDayTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDesc {
    pub name: String,
    pub column_type: ColumnType,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<ColumnDesc>,
}

/// A single cell as sent by the server. `None` payloads are SQL NULL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnValue {
    Bool(Option<bool>),
    Byte(Option<i8>),
    I16(Option<i16>),
    I32(Option<i32>),
    I64(Option<i64>),
    Double(Option<f64>),
    String(Option<String>),
}

impl ColumnValue {
    pub fn kind(&self) -> &'static str {
        match self {
            ColumnValue::Bool(_) => "bool",
            ColumnValue::Byte(_) => "byte",
            ColumnValue::I16(_) => "i16",
            ColumnValue::I32(_) => "i32",
            ColumnValue::I64(_) => "i64",
            ColumnValue::Double(_) => "double",
            ColumnValue::String(_) => "string",
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            ColumnValue::Bool(v) => v.is_none(),
            ColumnValue::Byte(v) => v.is_none(),
            ColumnValue::I16(v) => v.is_none(),
            ColumnValue::I32(v) => v.is_none(),
            ColumnValue::I64(v) => v.is_none(),
            ColumnValue::Double(v) => v.is_none(),
            ColumnValue::String(v) => v.is_none(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireRow {
    pub col_vals: Vec<ColumnValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    pub rows: Vec<WireRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FetchOrientation {
    Next,
}

// Requests

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetOperationStatusReq {
    pub operation_handle: OperationHandle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetResultSetMetadataReq {
    pub operation_handle: OperationHandle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResultsReq {
    pub operation_handle: OperationHandle,
    pub orientation: FetchOrientation,
    pub max_rows: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseOperationReq {
    pub operation_handle: OperationHandle,
}

// Responses

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetOperationStatusResp {
    pub status: StatusEnvelope,
    #[serde(default)]
    pub operation_state: Option<OperationState>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetResultSetMetadataResp {
    pub status: StatusEnvelope,
    #[serde(default)]
    pub schema: Option<TableSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResultsResp {
    pub status: StatusEnvelope,
    #[serde(default)]
    pub results: Option<RowSet>,
    #[serde(default)]
    pub has_more_rows: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseOperationResp {
    pub status: StatusEnvelope,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_success_codes() {
        assert!(StatusEnvelope::success().is_success());
        let mut info = StatusEnvelope::success();
        info.code = StatusCode::SuccessWithInfo;
        assert!(info.is_success());
        assert!(!StatusEnvelope::error("boom").is_success());
        let mut still = StatusEnvelope::success();
        still.code = StatusCode::StillExecuting;
        assert!(!still.is_success());
    }

    #[test]
    fn envelope_display_carries_diagnostics() {
        let mut env = StatusEnvelope::error("Invalid OperationHandle");
        env.error_code = Some(10);
        env.sql_state = Some("HY000".into());
        assert_eq!(
            env.to_string(),
            "Error [10] sqlstate=HY000: Invalid OperationHandle"
        );
    }

    #[test]
    fn wire_json_shape() {
        let resp: FetchResultsResp = serde_json::from_value(serde_json::json!({
            "status": { "code": "SUCCESS" },
            "results": { "rows": [ { "col_vals": [ { "i32": 7 }, { "string": null } ] } ] },
            "has_more_rows": false
        }))
        .unwrap();
        let rows = resp.results.unwrap().rows;
        assert_eq!(rows[0].col_vals[0], ColumnValue::I32(Some(7)));
        assert!(rows[0].col_vals[1].is_null());
        assert_eq!(resp.has_more_rows, Some(false));
    }

    #[test]
    fn fetches_only_move_forward() {
        assert_eq!(
            serde_json::to_value(FetchOrientation::Next).unwrap(),
            serde_json::json!("NEXT")
        );
        assert!(serde_json::from_value::<FetchOrientation>(serde_json::json!("PRIOR")).is_err());
    }
}
