//! MCP inbound adapter: registers the workflow tools with `rmcp` and serves
//! them over stdio.

use std::sync::Arc;

use anyhow::{Context as AnyhowContext, Result as AnyResult};
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
    transport::stdio,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::{
    domain::AgentProfile,
    error::{Error, Result as CoreResult},
    ports::WorkflowTools,
};

const SERVER_INSTRUCTIONS: &str = "Manage Agent Studio workflows. Tools: list_current_workflows, \
get_workflow_information, create_workflow, make_workflow_conversational, \
add_manager_agent_to_workflow, add_agent_to_workflow.";

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct WorkflowInfoArgs {
    /// The workflow ID in question
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CreateWorkflowArgs {
    /// The name of the new workflow
    pub name: String,
    /// A decently sized description of the workflow, including what it will be used for
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ConversationalArgs {
    /// The workflow to enable conversational behavior on
    pub workflow_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AddAgentArgs {
    /// The workflow the agent joins
    pub workflow_id: String,
    /// Display name of the new agent
    pub agent_name: String,
    /// Defines the agent's function and expertise within the crew
    pub agent_role: String,
    /// Provides context and personality to the agent, enriching interactions
    pub agent_backstory: String,
    /// The individual objective that guides the agent's decision-making
    pub agent_goal: String,
}

impl AddAgentArgs {
    pub fn into_parts(self) -> (String, AgentProfile) {
        let profile = AgentProfile {
            name: self.agent_name,
            role: self.agent_role,
            backstory: self.agent_backstory,
            goal: self.agent_goal,
        };
        (self.workflow_id, profile)
    }
}

/// MCP server exposing the six workflow tools.
#[derive(Clone)]
pub struct AgentStudioServer {
    tools: Arc<dyn WorkflowTools>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl AgentStudioServer {
    pub fn new(tools: Arc<dyn WorkflowTools>) -> Self {
        Self {
            tools,
            tool_router: Self::tool_router(),
        }
    }

    /// Definitions of every registered tool, in registration order.
    pub fn tool_definitions() -> Vec<Tool> {
        Self::tool_router().list_all()
    }

    #[tool(description = "List all of the current workflows available in an Agent Studio Instance")]
    async fn list_current_workflows(&self) -> Result<CallToolResult, McpError> {
        respond(self.tools.list_current_workflows().await)
    }

    #[tool(description = "Get information about a specific workflow in Agent Studio.")]
    async fn get_workflow_information(
        &self,
        Parameters(args): Parameters<WorkflowInfoArgs>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.tools.get_workflow_information(&args.id).await)
    }

    #[tool(description = "Create a new workflow starting at a blank slate.")]
    async fn create_workflow(
        &self,
        Parameters(args): Parameters<CreateWorkflowArgs>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.tools.create_workflow(&args.name, &args.description).await)
    }

    #[tool(description = "Make a workflow conversational")]
    async fn make_workflow_conversational(
        &self,
        Parameters(args): Parameters<ConversationalArgs>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.tools.make_workflow_conversational(&args.workflow_id).await)
    }

    #[tool(description = "Adds a new manager agent to a specified workflow.")]
    async fn add_manager_agent_to_workflow(
        &self,
        Parameters(args): Parameters<AddAgentArgs>,
    ) -> Result<CallToolResult, McpError> {
        let (workflow_id, profile) = args.into_parts();
        respond(
            self.tools
                .add_manager_agent_to_workflow(&workflow_id, profile)
                .await,
        )
    }

    #[tool(description = "Adds a new agent to a specified workflow.")]
    async fn add_agent_to_workflow(
        &self,
        Parameters(args): Parameters<AddAgentArgs>,
    ) -> Result<CallToolResult, McpError> {
        let (workflow_id, profile) = args.into_parts();
        respond(self.tools.add_agent_to_workflow(&workflow_id, profile).await)
    }
}

#[tool_handler]
impl ServerHandler for AgentStudioServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_server_info(Implementation::from_build_env())
            .with_instructions(SERVER_INSTRUCTIONS)
    }
}

/// Serve `server` over stdin/stdout until the host disconnects.
pub async fn serve_stdio(server: AgentStudioServer) -> AnyResult<()> {
    info!("starting Agent Studio MCP server on stdio");
    let running = server
        .serve(stdio())
        .await
        .context("Failed to start MCP stdio server")?;
    let reason = running
        .waiting()
        .await
        .context("MCP stdio server task failed")?;
    info!(?reason, "MCP stdio server stopped");
    Ok(())
}

/// Turn an operation outcome into a tool result. Failures become error
/// results carrying the raw description so the calling agent sees them.
fn respond<T: Serialize>(outcome: CoreResult<T>) -> Result<CallToolResult, McpError> {
    match outcome {
        Ok(value) => {
            let text = serde_json::to_string_pretty(&value).map_err(|e| {
                McpError::internal_error(format!("JSON serialization error: {e}"), None)
            })?;
            Ok(CallToolResult::success(vec![Content::text(text)]))
        }
        Err(err) => Ok(tool_failure(&err)),
    }
}

fn tool_failure(err: &Error) -> CallToolResult {
    CallToolResult::error(vec![Content::text(err.to_string())])
}
