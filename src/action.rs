use serde::{Deserialize, Serialize};

/// Protocol version echoed in every response envelope.
pub const MESSAGE_VERSION: &str = "1.0";

/// One shaped output record: column name to typed value.
pub type ResultRow = serde_json::Map<String, serde_json::Value>;

/// Inbound action-invocation envelope.
///
/// The agent framework omits fields it has no value for, so the echoed
/// string fields default to empty rather than failing deserialization.
/// `requestBody` is only required once the apiPath has been recognized.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    #[serde(default)]
    pub action_group: String,
    #[serde(default)]
    pub api_path: String,
    #[serde(default)]
    pub http_method: String,
    #[serde(default)]
    pub request_body: Option<RequestBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestBody {
    pub query: String,
}

impl Invocation {
    /// The SQL text carried by the invocation, if any.
    pub fn query(&self) -> Option<&str> {
        self.request_body.as_ref().map(|body| body.query.as_str())
    }
}

/// Outbound response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub message_version: String,
    pub response: ActionResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub action_group: String,
    pub api_path: String,
    pub http_method: String,
    pub http_status_code: u16,
    pub response_body: ResponseBody,
}

/// The protocol nests the payload under a content-type key.
#[derive(Debug, Serialize)]
pub struct ResponseBody {
    #[serde(rename = "application/json")]
    pub json: JsonContent,
}

#[derive(Debug, Serialize)]
pub struct JsonContent {
    pub body: ResponsePayload,
}

/// Success rows or a structured error message.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    Rows {
        #[serde(rename = "ResultSet")]
        result_set: Vec<ResultRow>,
    },
    Error {
        error: String,
    },
}

impl ActionResult {
    /// Successful envelope carrying shaped result rows.
    pub fn rows(invocation: &Invocation, rows: Vec<ResultRow>) -> Self {
        Self::build(invocation, 200, ResponsePayload::Rows { result_set: rows })
    }

    /// Error envelope with the given HTTP-style status code.
    pub fn error(invocation: &Invocation, status_code: u16, message: String) -> Self {
        Self::build(invocation, status_code, ResponsePayload::Error { error: message })
    }

    fn build(invocation: &Invocation, status_code: u16, body: ResponsePayload) -> Self {
        Self {
            message_version: MESSAGE_VERSION.to_string(),
            response: ActionResponse {
                action_group: invocation.action_group.clone(),
                api_path: invocation.api_path.clone(),
                http_method: invocation.http_method.clone(),
                http_status_code: status_code,
                response_body: ResponseBody {
                    json: JsonContent { body },
                },
            },
        }
    }
}
