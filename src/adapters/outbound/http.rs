use std::error::Error as StdError;

use anyhow::{Result as AnyResult, anyhow};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::StudioConfig;
use crate::core::{
    domain::{AgentRequest, TaskRequest, WorkflowRequest, WorkflowSummary, WorkflowUpdate},
    error::{Error, Result},
    ports::StudioBackend,
};

const API_PREFIX: &str = "/api/grpc";

/// [`StudioBackend`] speaking to a live Agent Studio instance over HTTPS.
///
/// Every request carries the configured bearer token. No timeout and no retry
/// is applied.
#[derive(Clone)]
pub struct HttpStudioBackend {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpStudioBackend {
    pub fn new(config: &StudioConfig) -> AnyResult<Self> {
        let client = build_http_client(config.verify_tls)?;
        Ok(Self::with_client(config, client))
    }

    /// Use a caller-built client, e.g. one with extra root certificates.
    pub fn with_client(config: &StudioConfig, client: reqwest::Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}{API_PREFIX}/{name}", self.base_url)
    }

    async fn get(&self, name: &str, query: &[(&str, &str)]) -> Result<Value> {
        let request = self.client.request(Method::GET, self.endpoint(name)).query(query);
        self.send(Method::GET, name, request).await
    }

    async fn post<B: Serialize + ?Sized>(&self, name: &str, body: &B) -> Result<Value> {
        let request = self.client.request(Method::POST, self.endpoint(name)).json(body);
        self.send(Method::POST, name, request).await
    }

    async fn send(&self, method: Method, name: &str, request: RequestBuilder) -> Result<Value> {
        debug!(%method, endpoint = name, "calling Agent Studio");
        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|err| Error::Connection(error_chain(&err)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| Error::Connection(error_chain(&err)))?;
        debug!(%method, endpoint = name, status = status.as_u16(), bytes = text.len(), "Agent Studio responded");

        if !status.is_success() {
            return Err(Error::backend(Some(status.as_u16()), failure_message(&text, status)));
        }
        serde_json::from_str(&text).map_err(|err| {
            Error::backend(
                Some(status.as_u16()),
                format!("{name} returned a body that is not JSON: {err}"),
            )
        })
    }
}

#[async_trait]
impl StudioBackend for HttpStudioBackend {
    async fn list_workflows(&self) -> Result<Vec<WorkflowSummary>> {
        let body = self.get("listWorkflows", &[]).await?;
        let workflows = field(&body, "workflows")?;
        let entries = workflows
            .as_array()
            .ok_or_else(|| Error::shape("workflows", "expected an array"))?;
        entries
            .iter()
            .map(|entry| -> Result<WorkflowSummary> {
                Ok(WorkflowSummary {
                    id: string_field(entry, "workflow_id")?,
                    name: string_field(entry, "name")?,
                })
            })
            .collect()
    }

    async fn get_workflow(&self, workflow_id: &str) -> Result<Value> {
        let body = self
            .get("getWorkflow", &[("workflow_id", workflow_id)])
            .await?;
        field(&body, "workflow").cloned()
    }

    async fn add_workflow(&self, request: &WorkflowRequest) -> Result<String> {
        let body = self.post("addWorkflow", request).await?;
        string_field(&body, "workflow_id")
    }

    async fn add_task(&self, request: &TaskRequest) -> Result<String> {
        let body = self.post("addTask", request).await?;
        string_field(&body, "task_id")
    }

    async fn update_workflow(&self, update: &WorkflowUpdate) -> Result<()> {
        let body = self.post("updateWorkflow", update).await?;
        match reported_failure(&body) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn default_model_id(&self) -> Result<String> {
        let body = self.get("getStudioDefaultModel", &[]).await?;
        let details = field(&body, "model_details")?;
        string_field(details, "model_id")
    }

    async fn add_agent(&self, request: &AgentRequest) -> Result<String> {
        let body = self.post("addAgent", request).await?;
        string_field(&body, "agent_id")
    }
}

/// Look up `key`, preferring a failure reported in the payload over a
/// schema complaint when the key is absent.
fn field<'a>(body: &'a Value, key: &str) -> Result<&'a Value> {
    match body.get(key) {
        Some(value) if !value.is_null() => Ok(value),
        _ => Err(reported_failure(body).unwrap_or_else(|| Error::schema(key))),
    }
}

fn string_field(body: &Value, key: &str) -> Result<String> {
    match field(body, key)? {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(Error::shape(key, "expected a string or number")),
    }
}

fn reported_failure(body: &Value) -> Option<Error> {
    let error = body.get("error").filter(|e| !e.is_null())?;
    let message = match error {
        Value::String(s) => s.clone(),
        Value::Object(obj) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    };
    Some(Error::backend(None, message))
}

fn failure_message(text: &str, status: reqwest::StatusCode) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
    }
    if let Ok(body) = serde_json::from_str::<Value>(trimmed) {
        for key in ["error", "message", "detail"] {
            if let Some(message) = body.get(key).and_then(Value::as_str) {
                return message.to_string();
            }
        }
    }
    trimmed.to_string()
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn build_http_client(verify_tls: bool) -> AnyResult<reqwest::Client> {
    // Certificate verification stays off unless explicitly requested.
    reqwest::Client::builder()
        .danger_accept_invalid_certs(!verify_tls)
        .build()
        .map_err(|err| anyhow!("Failed to build HTTP client: {err}"))
}
