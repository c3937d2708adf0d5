//! CLI inbound adapter that translates command-line arguments into tool calls.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use rmcp::model::Tool;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    adapters::inbound::mcp::{
        AddAgentArgs, AgentStudioServer, ConversationalArgs, CreateWorkflowArgs, WorkflowInfoArgs,
    },
    cli::{InvokeArgs, ToolsArgs},
    core::ports::WorkflowTools,
};

/// CLI adapter that consumes the `WorkflowTools` port to run single tools.
pub struct CliAdapter {
    tools: Arc<dyn WorkflowTools>,
}

impl CliAdapter {
    pub fn new(tools: Arc<dyn WorkflowTools>) -> Self {
        Self { tools }
    }

    /// Execute `invoke` and print the JSON result to stdout.
    pub async fn invoke_command(&self, args: &InvokeArgs) -> Result<()> {
        let arguments: Value = serde_json::from_str(&args.args)
            .with_context(|| format!("--args is not valid JSON: {}", args.args))?;
        let output = self.invoke(&args.tool, arguments).await?;
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    /// Run one tool by name with JSON arguments, through the same operations
    /// the MCP server exposes.
    pub async fn invoke(&self, tool: &str, arguments: Value) -> Result<Value> {
        let outcome = match tool {
            "list_current_workflows" => to_json(self.tools.list_current_workflows().await),
            "get_workflow_information" => {
                let args: WorkflowInfoArgs = parse_args(tool, arguments)?;
                to_json(self.tools.get_workflow_information(&args.id).await)
            }
            "create_workflow" => {
                let args: CreateWorkflowArgs = parse_args(tool, arguments)?;
                to_json(self.tools.create_workflow(&args.name, &args.description).await)
            }
            "make_workflow_conversational" => {
                let args: ConversationalArgs = parse_args(tool, arguments)?;
                to_json(self.tools.make_workflow_conversational(&args.workflow_id).await)
            }
            "add_manager_agent_to_workflow" => {
                let (workflow_id, profile) = parse_args::<AddAgentArgs>(tool, arguments)?.into_parts();
                to_json(
                    self.tools
                        .add_manager_agent_to_workflow(&workflow_id, profile)
                        .await,
                )
            }
            "add_agent_to_workflow" => {
                let (workflow_id, profile) = parse_args::<AddAgentArgs>(tool, arguments)?.into_parts();
                to_json(self.tools.add_agent_to_workflow(&workflow_id, profile).await)
            }
            other => bail!(
                "Unknown tool '{other}'. Available tools: {}",
                tool_names(&AgentStudioServer::tool_definitions()).join(", ")
            ),
        };
        outcome.with_context(|| format!("Tool '{tool}' failed"))
    }
}

/// Execute `tools` and print the registered tool definitions.
pub fn tools_command(args: &ToolsArgs) -> Result<()> {
    let tools = AgentStudioServer::tool_definitions();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }
    println!("Registered tools:");
    for tool in &tools {
        println!("- {}", tool.name);
        if let Some(description) = &tool.description {
            println!("    {description}");
        }
    }
    Ok(())
}

fn tool_names(tools: &[Tool]) -> Vec<String> {
    tools.iter().map(|tool| tool.name.to_string()).collect()
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T> {
    serde_json::from_value(arguments).with_context(|| format!("Invalid arguments for '{tool}'"))
}

fn to_json<T: serde::Serialize>(outcome: crate::core::Result<T>) -> Result<Value> {
    Ok(serde_json::to_value(outcome?)?)
}
