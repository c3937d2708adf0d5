//! Process-local stand-in for the Agent Studio backend.
//!
//! Records everything it is asked to create and lets callers queue failures
//! per endpoint, so multi-step operations can be interrupted between steps.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::core::{
    domain::{
        AgentRequest, TaskRequest, WorkflowMetadata, WorkflowRequest, WorkflowSummary,
        WorkflowUpdate,
    },
    error::{Error, Result},
    ports::StudioBackend,
};

/// Backend endpoints that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListWorkflows,
    GetWorkflow,
    AddWorkflow,
    AddTask,
    UpdateWorkflow,
    DefaultModel,
    AddAgent,
}

#[derive(Default)]
struct State {
    workflows: Vec<(String, Value)>,
    tasks: Vec<(String, TaskRequest)>,
    agents: Vec<(String, AgentRequest)>,
    failures: HashMap<Endpoint, VecDeque<Error>>,
    next_id: usize,
}

impl State {
    fn mint(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn take_failure(&mut self, endpoint: Endpoint) -> Result<()> {
        match self.failures.get_mut(&endpoint).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn workflow_mut(&mut self, workflow_id: &str) -> Result<&mut Value> {
        self.workflows
            .iter_mut()
            .find(|(id, _)| id == workflow_id)
            .map(|(_, workflow)| workflow)
            .ok_or_else(|| not_found(workflow_id))
    }
}

/// In-memory [`StudioBackend`].
pub struct InMemoryStudioBackend {
    default_model_id: String,
    state: Mutex<State>,
}

impl InMemoryStudioBackend {
    pub fn new(default_model_id: impl Into<String>) -> Self {
        Self {
            default_model_id: default_model_id.into(),
            state: Mutex::new(State::default()),
        }
    }

    /// Insert a workflow with the given metadata, appended to the listing order.
    pub fn seed_workflow(&self, workflow_id: &str, name: &str, metadata: WorkflowMetadata) {
        let workflow = json!({
            "workflow_id": workflow_id,
            "name": name,
            "description": "",
            "is_conversational": false,
            "crew_ai_workflow_metadata": metadata,
        });
        self.state().workflows.push((workflow_id.to_string(), workflow));
    }

    /// Make the next call to `endpoint` fail with `err`. Calls queue up.
    pub fn fail_next(&self, endpoint: Endpoint, err: Error) {
        self.state()
            .failures
            .entry(endpoint)
            .or_default()
            .push_back(err);
    }

    pub fn workflow(&self, workflow_id: &str) -> Option<Value> {
        self.state()
            .workflows
            .iter()
            .find(|(id, _)| id == workflow_id)
            .map(|(_, workflow)| workflow.clone())
    }

    pub fn task(&self, task_id: &str) -> Option<TaskRequest> {
        self.state()
            .tasks
            .iter()
            .find(|(id, _)| id == task_id)
            .map(|(_, task)| task.clone())
    }

    pub fn agent(&self, agent_id: &str) -> Option<AgentRequest> {
        self.state()
            .agents
            .iter()
            .find(|(id, _)| id == agent_id)
            .map(|(_, agent)| agent.clone())
    }

    pub fn task_count(&self) -> usize {
        self.state().tasks.len()
    }

    pub fn agent_count(&self) -> usize {
        self.state().agents.len()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl StudioBackend for InMemoryStudioBackend {
    async fn list_workflows(&self) -> Result<Vec<WorkflowSummary>> {
        let mut state = self.state();
        state.take_failure(Endpoint::ListWorkflows)?;
        Ok(state
            .workflows
            .iter()
            .map(|(id, workflow)| WorkflowSummary {
                id: id.clone(),
                name: workflow["name"].as_str().unwrap_or_default().to_string(),
            })
            .collect())
    }

    async fn get_workflow(&self, workflow_id: &str) -> Result<Value> {
        let mut state = self.state();
        state.take_failure(Endpoint::GetWorkflow)?;
        state.workflow_mut(workflow_id).map(|workflow| workflow.clone())
    }

    async fn add_workflow(&self, request: &WorkflowRequest) -> Result<String> {
        let mut state = self.state();
        state.take_failure(Endpoint::AddWorkflow)?;
        let workflow_id = state.mint("workflow");
        let workflow = json!({
            "workflow_id": workflow_id,
            "name": request.name,
            "description": request.description,
            "is_conversational": false,
            "crew_ai_workflow_metadata": WorkflowMetadata::default(),
        });
        state.workflows.push((workflow_id.clone(), workflow));
        Ok(workflow_id)
    }

    async fn add_task(&self, request: &TaskRequest) -> Result<String> {
        let mut state = self.state();
        state.take_failure(Endpoint::AddTask)?;
        let task_id = state.mint("task");
        state.tasks.push((task_id.clone(), request.clone()));
        Ok(task_id)
    }

    async fn update_workflow(&self, update: &WorkflowUpdate) -> Result<()> {
        let mut state = self.state();
        state.take_failure(Endpoint::UpdateWorkflow)?;
        let workflow = state.workflow_mut(&update.workflow_id)?;
        workflow["crew_ai_workflow_metadata"] = serde_json::to_value(&update.crew_ai_workflow_metadata)
            .map_err(|err| Error::backend(None, err.to_string()))?;
        if let Some(flag) = update.is_conversational {
            workflow["is_conversational"] = Value::Bool(flag);
        }
        Ok(())
    }

    async fn default_model_id(&self) -> Result<String> {
        self.state().take_failure(Endpoint::DefaultModel)?;
        Ok(self.default_model_id.clone())
    }

    async fn add_agent(&self, request: &AgentRequest) -> Result<String> {
        let mut state = self.state();
        state.take_failure(Endpoint::AddAgent)?;
        let agent_id = state.mint("agent");
        state.agents.push((agent_id.clone(), request.clone()));
        Ok(agent_id)
    }
}

fn not_found(workflow_id: &str) -> Error {
    Error::backend(Some(404), format!("workflow {workflow_id} not found"))
}
