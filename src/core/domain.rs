//! Request and record shapes exchanged with the Agent Studio backend.
//!
//! Field names match the backend's JSON verbatim, so these types serialize
//! straight into request bodies.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::error::{Error, Result};

pub const PROCESS_SEQUENTIAL: &str = "sequential";
pub const PROCESS_HIERARCHICAL: &str = "hierarchical";

const METADATA_KEY: &str = "crew_ai_workflow_metadata";

const CONVERSATIONAL_TASK_NAME: &str = "Conversational Task";
const CONVERSATIONAL_TASK_DESCRIPTION: &str =
    "Respond to the user's message: {user_input}. Conversation history:\n{context}.";
const CONVERSATIONAL_TASK_EXPECTED_OUTPUT: &str =
    "Provide a response that aligns with the conversation history.";

const AGENT_TEMPERATURE: f64 = 0.1;
const AGENT_MAX_ITER: u32 = 10;

/// `{id, name}` projection of one listed workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
}

/// The crew metadata block of a workflow.
///
/// Every write of this block replaces the stored one wholesale, so callers
/// start from the latest fetched copy and change only what they mean to.
/// All five keys must be present on read; the manager references may be
/// null and are written back as null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    #[serde(deserialize_with = "id_list")]
    pub agent_id: Vec<String>,
    pub manager_agent_id: Option<String>,
    #[serde(deserialize_with = "id_list")]
    pub task_id: Vec<String>,
    pub process: String,
    pub manager_llm_model_provider_id: Option<String>,
}

const METADATA_FIELDS: [&str; 5] = [
    "agent_id",
    "manager_agent_id",
    "task_id",
    "process",
    "manager_llm_model_provider_id",
];

impl WorkflowMetadata {
    /// Decode the metadata block out of a full workflow object.
    pub fn from_workflow(workflow: &Value) -> Result<Self> {
        let block = workflow
            .get(METADATA_KEY)
            .filter(|v| !v.is_null())
            .ok_or_else(|| Error::schema(METADATA_KEY))?;
        let fields = block
            .as_object()
            .ok_or_else(|| Error::shape(METADATA_KEY, "expected an object"))?;
        if let Some(missing) = METADATA_FIELDS.iter().find(|f| !fields.contains_key(**f)) {
            return Err(Error::schema(format!("{METADATA_KEY}.{missing}")));
        }
        serde_json::from_value(block.clone()).map_err(|err| Error::shape(METADATA_KEY, err))
    }

    /// Replace the task list with the single conversational task.
    pub fn with_conversational_task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = vec![task_id.into()];
        self
    }

    /// Install a manager agent. The process switches to hierarchical and the
    /// manager model reference is cleared so the studio default applies.
    pub fn with_manager(mut self, agent_id: impl Into<String>) -> Self {
        self.manager_agent_id = Some(agent_id.into());
        self.process = PROCESS_HIERARCHICAL.to_string();
        self.manager_llm_model_provider_id = Some(String::new());
        self
    }

    /// Append a member agent, keeping existing order.
    pub fn with_member(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id.push(agent_id.into());
        self
    }
}

/// Body of `updateWorkflow`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowUpdate {
    pub workflow_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_conversational: Option<bool>,
    pub crew_ai_workflow_metadata: WorkflowMetadata,
}

impl WorkflowUpdate {
    pub fn new(workflow_id: impl Into<String>, metadata: WorkflowMetadata) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            is_conversational: None,
            crew_ai_workflow_metadata: metadata,
        }
    }

    pub fn conversational(mut self) -> Self {
        self.is_conversational = Some(true);
        self
    }
}

/// Body of `addWorkflow`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRequest {
    pub name: String,
    pub description: String,
}

/// Body of `addTask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub name: String,
    pub add_crew_ai_task_request: CrewTaskDetails,
    pub workflow_id: String,
    pub template_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewTaskDetails {
    pub description: String,
    pub expected_output: String,
    pub assigned_agent_id: String,
}

impl TaskRequest {
    /// The chat-style task that answers `{user_input}` given `{context}`.
    pub fn conversational(workflow_id: impl Into<String>) -> Self {
        Self {
            name: CONVERSATIONAL_TASK_NAME.to_string(),
            add_crew_ai_task_request: CrewTaskDetails {
                description: CONVERSATIONAL_TASK_DESCRIPTION.to_string(),
                expected_output: CONVERSATIONAL_TASK_EXPECTED_OUTPUT.to_string(),
                assigned_agent_id: String::new(),
            },
            workflow_id: workflow_id.into(),
            template_id: String::new(),
        }
    }
}

/// Caller-supplied description of an agent to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    pub name: String,
    pub role: String,
    pub backstory: String,
    pub goal: String,
}

/// Body of `addAgent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub name: String,
    pub llm_provider_model_id: String,
    pub tools_id: Vec<String>,
    pub crew_ai_agent_metadata: AgentMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    pub tmp_agent_image_path: String,
    pub tool_template_ids: Vec<String>,
}

impl AgentRequest {
    /// Build a tool-less agent bound to `model_id`, optionally associated
    /// with a workflow at creation time.
    pub fn new(profile: AgentProfile, model_id: impl Into<String>, workflow_id: Option<String>) -> Self {
        Self {
            name: profile.name,
            llm_provider_model_id: model_id.into(),
            tools_id: Vec::new(),
            crew_ai_agent_metadata: AgentMetadata::new(profile.role, profile.backstory, profile.goal),
            workflow_id,
            tmp_agent_image_path: String::new(),
            tool_template_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMetadata {
    pub role: String,
    pub backstory: String,
    pub goal: String,
    pub allow_delegation: bool,
    pub verbose: bool,
    pub cache: bool,
    pub temperature: f64,
    pub max_iter: u32,
}

impl AgentMetadata {
    pub fn new(role: String, backstory: String, goal: String) -> Self {
        Self {
            role,
            backstory,
            goal,
            allow_delegation: false,
            verbose: false,
            cache: false,
            temperature: AGENT_TEMPERATURE,
            max_iter: AGENT_MAX_ITER,
        }
    }
}

/// Identifier lists may carry numeric IDs; they are kept as strings.
fn id_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    let ids = Vec::<Id>::deserialize(deserializer)?;
    Ok(ids
        .into_iter()
        .map(|id| match id {
            Id::Text(text) => text,
            Id::Number(number) => number.to_string(),
        })
        .collect())
}
