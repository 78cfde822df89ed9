pub mod athena;

use crate::error::LakerelayError;
use std::fmt;

/// State of one query execution as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl QueryStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            QueryStatus::Succeeded | QueryStatus::Failed | QueryStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStatus::Queued => "QUEUED",
            QueryStatus::Running => "RUNNING",
            QueryStatus::Succeeded => "SUCCEEDED",
            QueryStatus::Failed => "FAILED",
            QueryStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw result pages fetched from the backend, before shaping.
///
/// Row 0 is the header row the query engine prepends; cells the engine
/// returned no value for are `None`.
#[derive(Debug, Clone, Default)]
pub struct RawResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Trait for query-execution backends.
pub trait QueryBackend {
    /// Submit a query for execution, returning an opaque execution handle.
    fn submit(
        &self,
        sql: &str,
        output_location: &str,
    ) -> impl std::future::Future<Output = Result<String, LakerelayError>> + Send;

    /// Current state of the execution identified by `handle`.
    fn status(
        &self,
        handle: &str,
    ) -> impl std::future::Future<Output = Result<QueryStatus, LakerelayError>> + Send;

    /// Full raw result set for a completed execution.
    fn fetch(
        &self,
        handle: &str,
    ) -> impl std::future::Future<Output = Result<RawResultSet, LakerelayError>> + Send;

    /// Stop an in-flight execution.
    fn cancel(
        &self,
        handle: &str,
    ) -> impl std::future::Future<Output = Result<(), LakerelayError>> + Send;
}
