//! Inbound ports (use-case ports) define the tool operations that driving
//! adapters (MCP server, CLI) consume.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::domain::{AgentProfile, WorkflowSummary};
use crate::core::error::Result;

/// Result of `create_workflow`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedWorkflow {
    pub workflow_id: String,
}

/// Result of `make_workflow_conversational`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedTask {
    pub task_id: String,
}

/// Result of the two agent-creating operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedAgent {
    pub agent_id: String,
}

/// The six workflow tools exposed to the invoking host.
#[async_trait]
pub trait WorkflowTools: Send + Sync {
    /// Every workflow the backend lists, as `{id, name}` in backend order.
    async fn list_current_workflows(&self) -> Result<Vec<WorkflowSummary>>;

    /// The full workflow object for `id`.
    async fn get_workflow_information(&self, id: &str) -> Result<Value>;

    /// Create a blank workflow and return its ID.
    async fn create_workflow(&self, name: &str, description: &str) -> Result<CreatedWorkflow>;

    /// Attach a conversational task and flag the workflow conversational.
    async fn make_workflow_conversational(&self, workflow_id: &str) -> Result<CreatedTask>;

    /// Create an agent and install it as the workflow's manager.
    async fn add_manager_agent_to_workflow(
        &self,
        workflow_id: &str,
        profile: AgentProfile,
    ) -> Result<CreatedAgent>;

    /// Create an agent and append it to the workflow's members.
    async fn add_agent_to_workflow(
        &self,
        workflow_id: &str,
        profile: AgentProfile,
    ) -> Result<CreatedAgent>;
}
