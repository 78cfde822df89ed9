use crate::backend::{QueryBackend, QueryStatus, RawResultSet};
use crate::config::AthenaConfig;
use crate::error::LakerelayError;
use aws_sdk_athena::Client;
use aws_sdk_athena::error::DisplayErrorContext;
use aws_sdk_athena::types::{QueryExecutionContext, QueryExecutionState, ResultConfiguration};

/// Athena-backed query executor.
pub struct AthenaBackend {
    client: Client,
    workgroup: Option<String>,
    catalog: Option<String>,
    database: Option<String>,
}

impl AthenaBackend {
    pub fn new(
        client: Client,
        workgroup: Option<String>,
        catalog: Option<String>,
        database: Option<String>,
    ) -> Self {
        Self {
            client,
            workgroup,
            catalog,
            database,
        }
    }

    /// Build a backend from config, resolving credentials and region
    /// through the standard AWS provider chain.
    pub async fn connect(config: &AthenaConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;
        Self::new(
            Client::new(&sdk_config),
            config.workgroup.clone(),
            config.catalog.clone(),
            config.database.clone(),
        )
    }

    fn map_state(state: &QueryExecutionState) -> Result<QueryStatus, LakerelayError> {
        match state {
            QueryExecutionState::Queued => Ok(QueryStatus::Queued),
            QueryExecutionState::Running => Ok(QueryStatus::Running),
            QueryExecutionState::Succeeded => Ok(QueryStatus::Succeeded),
            QueryExecutionState::Failed => Ok(QueryStatus::Failed),
            QueryExecutionState::Cancelled => Ok(QueryStatus::Cancelled),
            other => Err(LakerelayError::Backend {
                message: format!("unexpected query state: {}", other.as_str()),
            }),
        }
    }
}

fn backend_err<E>(action: &str, err: E) -> LakerelayError
where
    E: std::error::Error + Send + Sync + 'static,
{
    LakerelayError::Backend {
        message: format!("{}: {}", action, DisplayErrorContext(err)),
    }
}

impl QueryBackend for AthenaBackend {
    async fn submit(&self, sql: &str, output_location: &str) -> Result<String, LakerelayError> {
        let result_config = ResultConfiguration::builder()
            .output_location(output_location)
            .build();

        let mut request = self
            .client
            .start_query_execution()
            .query_string(sql)
            .result_configuration(result_config);

        if let Some(workgroup) = &self.workgroup {
            request = request.work_group(workgroup);
        }
        if self.catalog.is_some() || self.database.is_some() {
            let mut context = QueryExecutionContext::builder();
            if let Some(catalog) = &self.catalog {
                context = context.catalog(catalog);
            }
            if let Some(database) = &self.database {
                context = context.database(database);
            }
            request = request.query_execution_context(context.build());
        }

        let response = request
            .send()
            .await
            .map_err(|e| backend_err("failed to start query execution", e))?;

        response
            .query_execution_id()
            .map(|id| id.to_string())
            .ok_or_else(|| LakerelayError::Backend {
                message: "no query execution id in start response".to_string(),
            })
    }

    async fn status(&self, handle: &str) -> Result<QueryStatus, LakerelayError> {
        let response = self
            .client
            .get_query_execution()
            .query_execution_id(handle)
            .send()
            .await
            .map_err(|e| backend_err("failed to get query execution", e))?;

        let state = response
            .query_execution()
            .and_then(|execution| execution.status())
            .and_then(|status| status.state())
            .ok_or_else(|| LakerelayError::Backend {
                message: "no state in query execution response".to_string(),
            })?;

        Self::map_state(state)
    }

    async fn fetch(&self, handle: &str) -> Result<RawResultSet, LakerelayError> {
        let mut raw = RawResultSet::default();
        let mut next_token: Option<String> = None;

        loop {
            let mut request = self.client.get_query_results().query_execution_id(handle);
            if let Some(token) = &next_token {
                request = request.next_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| backend_err("failed to get query results", e))?;

            if let Some(result_set) = response.result_set() {
                // Column metadata repeats on every page; take it once.
                if raw.columns.is_empty()
                    && let Some(metadata) = result_set.result_set_metadata()
                {
                    raw.columns = metadata
                        .column_info()
                        .iter()
                        .map(|column| column.label().unwrap_or_else(|| column.name()).to_string())
                        .collect();
                }

                for row in result_set.rows() {
                    raw.rows.push(
                        row.data()
                            .iter()
                            .map(|datum| datum.var_char_value().map(str::to_string))
                            .collect(),
                    );
                }
            }

            match response.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        Ok(raw)
    }

    async fn cancel(&self, handle: &str) -> Result<(), LakerelayError> {
        self.client
            .stop_query_execution()
            .query_execution_id(handle)
            .send()
            .await
            .map_err(|e| backend_err("failed to stop query execution", e))?;
        Ok(())
    }
}
