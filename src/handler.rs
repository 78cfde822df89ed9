use crate::action::{ActionResult, Invocation, ResultRow};
use crate::backend::{QueryBackend, QueryStatus};
use crate::config::AppConfig;
use crate::error::LakerelayError;
use crate::{format, verbose};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// Ceiling for the backoff between status checks.
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(8);

/// Runtime options for the adapter, resolved from configuration.
#[derive(Debug, Clone)]
pub struct AdapterOptions {
    pub output_location: String,
    pub recognized_paths: BTreeSet<String>,
    pub poll_interval: Duration,
    pub query_timeout: Duration,
    pub verbose: bool,
}

impl AdapterOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            output_location: config.athena.output_location.clone(),
            recognized_paths: config.recognized_paths.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            query_timeout: Duration::from_secs(config.query_timeout_secs),
            verbose: config.verbose,
        }
    }
}

/// Outcome of one query execution, before envelope wrapping.
#[derive(Debug)]
pub enum QueryOutcome {
    Rows(Vec<ResultRow>),
    Failed(QueryStatus),
}

/// The adapter: routes an invocation envelope to the query backend and
/// wraps the outcome back into a response envelope.
pub struct QueryAdapter<B> {
    backend: B,
    options: AdapterOptions,
}

impl<B: QueryBackend> QueryAdapter<B> {
    pub fn new(backend: B, options: AdapterOptions) -> Self {
        Self { backend, options }
    }

    /// Handle one action invocation.
    ///
    /// An unrecognized apiPath produces a 404 envelope. A recognized path
    /// runs the query; a query that the engine reports FAILED or CANCELLED
    /// produces a 200 envelope with an embedded error body. Backend
    /// transport failures propagate as errors and never become envelopes.
    pub async fn handle(&self, invocation: &Invocation) -> Result<ActionResult, LakerelayError> {
        if !self.options.recognized_paths.contains(&invocation.api_path) {
            return Ok(ActionResult::error(
                invocation,
                404,
                format!(
                    "Unrecognized api path: {}::{}",
                    invocation.action_group, invocation.api_path
                ),
            ));
        }

        let sql = invocation.query().ok_or_else(|| LakerelayError::Request {
            message: format!(
                "missing requestBody.query for api path {}",
                invocation.api_path
            ),
        })?;

        match self.run_query(sql).await? {
            QueryOutcome::Rows(rows) => Ok(ActionResult::rows(invocation, rows)),
            QueryOutcome::Failed(status) => Ok(ActionResult::error(
                invocation,
                200,
                format!("Query failed with status '{}'", status),
            )),
        }
    }

    /// Submit the query, wait for a terminal state, and shape the rows.
    pub async fn run_query(&self, sql: &str) -> Result<QueryOutcome, LakerelayError> {
        let handle = self
            .backend
            .submit(sql, &self.options.output_location)
            .await?;
        verbose::emit(
            self.options.verbose,
            &format!("query submitted (execution {})", handle),
        );

        let status = self.wait_for_completion(&handle).await?;
        verbose::emit(
            self.options.verbose,
            &format!("query reached {} (execution {})", status, handle),
        );

        match status {
            QueryStatus::Succeeded => {
                let raw = self.backend.fetch(&handle).await?;
                Ok(QueryOutcome::Rows(format::result_rows(&raw)))
            }
            other => Ok(QueryOutcome::Failed(other)),
        }
    }

    /// Poll until a terminal status or the deadline.
    ///
    /// At least one status check always happens. Between checks the poll
    /// interval doubles up to MAX_POLL_INTERVAL. On deadline the execution
    /// is stopped best-effort and the invocation fails with Timeout.
    async fn wait_for_completion(&self, handle: &str) -> Result<QueryStatus, LakerelayError> {
        let start = Instant::now();
        let mut interval = self.options.poll_interval;

        loop {
            let status = self.backend.status(handle).await?;
            if status.is_terminal() {
                return Ok(status);
            }

            if start.elapsed() >= self.options.query_timeout {
                let _ = self.backend.cancel(handle).await;
                return Err(LakerelayError::Timeout {
                    seconds: self.options.query_timeout.as_secs(),
                });
            }

            tokio::time::sleep(interval).await;
            interval = next_poll_interval(interval);
        }
    }
}

/// Next backoff step: double, capped.
pub fn next_poll_interval(current: Duration) -> Duration {
    std::cmp::min(current * 2, MAX_POLL_INTERVAL)
}
