use async_trait::async_trait;
use serde_json::Value;

use crate::core::domain::{AgentRequest, TaskRequest, WorkflowRequest, WorkflowSummary, WorkflowUpdate};
use crate::core::error::Result;

/// One method per Agent Studio endpoint the adapter consumes.
///
/// Implementations perform exactly one backend call per method and never
/// retry.
#[async_trait]
pub trait StudioBackend: Send + Sync {
    /// `GET listWorkflows`, projected to `{id, name}` in backend order.
    async fn list_workflows(&self) -> Result<Vec<WorkflowSummary>>;
    /// `GET getWorkflow`, returning the object under `workflow` untouched.
    async fn get_workflow(&self, workflow_id: &str) -> Result<Value>;
    /// `POST addWorkflow`, returning the new workflow ID.
    async fn add_workflow(&self, request: &WorkflowRequest) -> Result<String>;
    /// `POST addTask`, returning the new task ID.
    async fn add_task(&self, request: &TaskRequest) -> Result<String>;
    /// `POST updateWorkflow`. The metadata block is replaced as sent.
    async fn update_workflow(&self, update: &WorkflowUpdate) -> Result<()>;
    /// `GET getStudioDefaultModel`, returning `model_details.model_id`.
    async fn default_model_id(&self) -> Result<String>;
    /// `POST addAgent`, returning the new agent ID.
    async fn add_agent(&self, request: &AgentRequest) -> Result<String>;
}
