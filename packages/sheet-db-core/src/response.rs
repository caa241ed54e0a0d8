//! Result envelope returned by every public engine operation.

use serde::Serialize;
use serde_json::Value;

use crate::error::DbError;

/// Envelope carried across the engine boundary.
///
/// Operations never return `Err` to callers; failures are encoded in
/// `status` and `error`.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    /// Canonical status code (200/204/400/404/500)
    pub status: u16,
    /// Id of the record touched by a create
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Operation payload (record object or array of records)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Human-readable failure description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Row count reported by repair and bulk-delete operations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl Response {
    /// Plain success.
    pub fn ok() -> Self {
        Self {
            status: 200,
            id: None,
            data: None,
            error: None,
            count: None,
        }
    }

    /// Success carrying the id of a freshly created record.
    pub fn ok_with_id(id: u64) -> Self {
        Self {
            id: Some(id),
            ..Self::ok()
        }
    }

    /// Success carrying a payload.
    pub fn ok_with_data(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::ok()
        }
    }

    /// Success with nothing to report.
    pub fn no_content() -> Self {
        Self {
            status: 204,
            ..Self::ok()
        }
    }

    /// Attaches a payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attaches a row count.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// True for 2xx envelopes.
    pub fn is_success(&self) -> bool {
        self.status < 300
    }
}

impl From<DbError> for Response {
    fn from(err: DbError) -> Self {
        Self {
            status: err.status(),
            id: None,
            data: None,
            error: Some(err.to_string()),
            count: None,
        }
    }
}
