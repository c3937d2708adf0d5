//! Application service implementation that provides the `WorkflowTools` trait.
//! This is the use-case port implementation that driving adapters consume.
//!
//! The mutating operations are plain sequences of backend steps. Nothing is
//! rolled back when a later step fails, and the read-modify-write on the
//! workflow carries no version check, so concurrent writers race with
//! last-writer-wins semantics.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::core::{
    domain::{
        AgentProfile, AgentRequest, TaskRequest, WorkflowMetadata, WorkflowRequest,
        WorkflowSummary, WorkflowUpdate,
    },
    error::Result,
    ports::{CreatedAgent, CreatedTask, CreatedWorkflow, StudioBackend, WorkflowTools},
};

/// Workflow tools backed by an Agent Studio backend.
#[derive(Clone)]
pub struct WorkflowAdapter {
    backend: Arc<dyn StudioBackend>,
}

impl WorkflowAdapter {
    pub fn new(backend: Arc<dyn StudioBackend>) -> Self {
        Self { backend }
    }

    async fn latest_metadata(&self, workflow_id: &str) -> Result<WorkflowMetadata> {
        let workflow = self.backend.get_workflow(workflow_id).await?;
        WorkflowMetadata::from_workflow(&workflow)
    }

    async fn create_agent(&self, profile: AgentProfile, workflow_id: Option<String>) -> Result<String> {
        let model_id = self.backend.default_model_id().await?;
        debug!(%model_id, agent_name = %profile.name, "resolved studio default model");
        let request = AgentRequest::new(profile, model_id, workflow_id);
        self.backend.add_agent(&request).await
    }
}

#[async_trait]
impl WorkflowTools for WorkflowAdapter {
    async fn list_current_workflows(&self) -> Result<Vec<WorkflowSummary>> {
        let workflows = self.backend.list_workflows().await.inspect_err(|err| {
            warn!(error = %err, kind = err.kind(), "listing workflows failed");
        })?;
        debug!(count = workflows.len(), "listed workflows");
        Ok(workflows)
    }

    async fn get_workflow_information(&self, id: &str) -> Result<Value> {
        self.backend.get_workflow(id).await.inspect_err(|err| {
            warn!(workflow_id = id, error = %err, kind = err.kind(), "fetching workflow failed");
        })
    }

    async fn create_workflow(&self, name: &str, description: &str) -> Result<CreatedWorkflow> {
        let request = WorkflowRequest {
            name: name.to_string(),
            description: description.to_string(),
        };
        let workflow_id = self.backend.add_workflow(&request).await.inspect_err(|err| {
            warn!(name, error = %err, kind = err.kind(), "creating workflow failed");
        })?;
        info!(%workflow_id, name, "created workflow");
        Ok(CreatedWorkflow { workflow_id })
    }

    async fn make_workflow_conversational(&self, workflow_id: &str) -> Result<CreatedTask> {
        let outcome: Result<CreatedTask> = async {
            let task_id = self
                .backend
                .add_task(&TaskRequest::conversational(workflow_id))
                .await?;
            info!(workflow_id, %task_id, "created conversational task");

            let metadata = self.latest_metadata(workflow_id).await?;
            let update = WorkflowUpdate::new(workflow_id, metadata.with_conversational_task(&task_id))
                .conversational();
            self.backend.update_workflow(&update).await?;
            info!(workflow_id, %task_id, "workflow is now conversational");

            Ok(CreatedTask { task_id })
        }
        .await;
        outcome.inspect_err(|err| {
            warn!(workflow_id, error = %err, kind = err.kind(), "making workflow conversational failed");
        })
    }

    async fn add_manager_agent_to_workflow(
        &self,
        workflow_id: &str,
        profile: AgentProfile,
    ) -> Result<CreatedAgent> {
        let outcome: Result<CreatedAgent> = async {
            // The manager is not associated with the workflow at creation time.
            let agent_id = self.create_agent(profile, None).await?;
            info!(workflow_id, %agent_id, "created manager agent");

            let metadata = self.latest_metadata(workflow_id).await?;
            let update = WorkflowUpdate::new(workflow_id, metadata.with_manager(&agent_id));
            self.backend.update_workflow(&update).await?;
            info!(workflow_id, %agent_id, "installed manager agent");

            Ok(CreatedAgent { agent_id })
        }
        .await;
        outcome.inspect_err(|err| {
            warn!(workflow_id, error = %err, kind = err.kind(), "adding manager agent failed");
        })
    }

    async fn add_agent_to_workflow(
        &self,
        workflow_id: &str,
        profile: AgentProfile,
    ) -> Result<CreatedAgent> {
        let outcome: Result<CreatedAgent> = async {
            let agent_id = self
                .create_agent(profile, Some(workflow_id.to_string()))
                .await?;
            info!(workflow_id, %agent_id, "created agent");

            let metadata = self.latest_metadata(workflow_id).await?;
            let update = WorkflowUpdate::new(workflow_id, metadata.with_member(&agent_id));
            self.backend.update_workflow(&update).await?;
            info!(workflow_id, %agent_id, "appended agent to workflow");

            Ok(CreatedAgent { agent_id })
        }
        .await;
        outcome.inspect_err(|err| {
            warn!(workflow_id, error = %err, kind = err.kind(), "adding agent failed");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::memory::{Endpoint, InMemoryStudioBackend};
    use crate::core::{
        PROCESS_HIERARCHICAL, PROCESS_SEQUENTIAL,
        error::Error,
    };
    use serde_json::json;

    fn profile(name: &str) -> AgentProfile {
        AgentProfile {
            name: name.into(),
            role: "Planner".into(),
            backstory: "Has run many projects".into(),
            goal: "Keep the crew on track".into(),
        }
    }

    fn seeded_backend() -> Arc<InMemoryStudioBackend> {
        let backend = Arc::new(InMemoryStudioBackend::new("model-default"));
        backend.seed_workflow(
            "w1",
            "Support",
            WorkflowMetadata {
                agent_id: vec!["a1".into()],
                manager_agent_id: None,
                task_id: vec!["t0".into()],
                process: PROCESS_SEQUENTIAL.into(),
                manager_llm_model_provider_id: Some("llm-1".into()),
            },
        );
        backend
    }

    fn adapter(backend: &Arc<InMemoryStudioBackend>) -> WorkflowAdapter {
        WorkflowAdapter::new(backend.clone())
    }

    #[tokio::test]
    async fn lists_workflows_in_backend_order() {
        let backend = seeded_backend();
        backend.seed_workflow("w2", "Billing", WorkflowMetadata::default());
        let listed = adapter(&backend).list_current_workflows().await.unwrap();
        assert_eq!(
            listed,
            vec![
                WorkflowSummary { id: "w1".into(), name: "Support".into() },
                WorkflowSummary { id: "w2".into(), name: "Billing".into() },
            ]
        );
    }

    #[tokio::test]
    async fn created_workflow_is_readable_by_id() {
        let backend = seeded_backend();
        let tools = adapter(&backend);
        let created = tools.create_workflow("A", "B").await.unwrap();
        let workflow = tools.get_workflow_information(&created.workflow_id).await.unwrap();
        assert_eq!(workflow["workflow_id"], json!(created.workflow_id));
        assert_eq!(workflow["name"], json!("A"));
        assert_eq!(workflow["description"], json!("B"));
    }

    #[tokio::test]
    async fn empty_names_are_forwarded() {
        let backend = seeded_backend();
        let created = adapter(&backend).create_workflow("", "").await.unwrap();
        let workflow = backend.workflow(&created.workflow_id).unwrap();
        assert_eq!(workflow["name"], json!(""));
    }

    #[tokio::test]
    async fn conversational_replaces_tasks_and_keeps_other_metadata() {
        let backend = seeded_backend();
        let created = adapter(&backend).make_workflow_conversational("w1").await.unwrap();

        let workflow = backend.workflow("w1").unwrap();
        assert_eq!(workflow["is_conversational"], json!(true));
        let metadata = WorkflowMetadata::from_workflow(&workflow).unwrap();
        assert_eq!(metadata.task_id, vec![created.task_id.clone()]);
        assert_eq!(metadata.agent_id, vec!["a1".to_string()]);
        assert_eq!(metadata.process, PROCESS_SEQUENTIAL);
        assert_eq!(metadata.manager_llm_model_provider_id.as_deref(), Some("llm-1"));

        let task = backend.task(&created.task_id).unwrap();
        assert_eq!(task.workflow_id, "w1");
        assert_eq!(task.name, "Conversational Task");
    }

    #[tokio::test]
    async fn member_agent_is_appended_and_bound_at_creation() {
        let backend = seeded_backend();
        let created = adapter(&backend)
            .add_agent_to_workflow("w1", profile("Writer"))
            .await
            .unwrap();

        let metadata = WorkflowMetadata::from_workflow(&backend.workflow("w1").unwrap()).unwrap();
        assert_eq!(metadata.agent_id, vec!["a1".to_string(), created.agent_id.clone()]);
        assert_eq!(metadata.task_id, vec!["t0".to_string()]);
        assert_eq!(metadata.process, PROCESS_SEQUENTIAL);
        assert_eq!(metadata.manager_llm_model_provider_id.as_deref(), Some("llm-1"));

        let agent = backend.agent(&created.agent_id).unwrap();
        assert_eq!(agent.workflow_id.as_deref(), Some("w1"));
        assert_eq!(agent.llm_provider_model_id, "model-default");
    }

    #[tokio::test]
    async fn manager_agent_forces_hierarchical_and_resets_manager_model() {
        let backend = seeded_backend();
        let created = adapter(&backend)
            .add_manager_agent_to_workflow("w1", profile("Lead"))
            .await
            .unwrap();

        let metadata = WorkflowMetadata::from_workflow(&backend.workflow("w1").unwrap()).unwrap();
        assert_eq!(metadata.manager_agent_id, Some(created.agent_id.clone()));
        assert_eq!(metadata.process, PROCESS_HIERARCHICAL);
        assert_eq!(metadata.manager_llm_model_provider_id.as_deref(), Some(""));
        assert_eq!(metadata.agent_id, vec!["a1".to_string()]);
        assert_eq!(metadata.task_id, vec!["t0".to_string()]);

        let agent = backend.agent(&created.agent_id).unwrap();
        assert!(agent.workflow_id.is_none());
        assert_eq!(agent.crew_ai_agent_metadata.max_iter, 10);
    }

    #[tokio::test]
    async fn failed_update_leaves_orphaned_task_and_untouched_workflow() {
        let backend = seeded_backend();
        backend.fail_next(Endpoint::UpdateWorkflow, Error::backend(Some(500), "boom"));
        let before = backend.workflow("w1").unwrap();

        let err = adapter(&backend).make_workflow_conversational("w1").await.unwrap_err();
        assert!(matches!(err, Error::Backend { status: Some(500), .. }));

        assert_eq!(backend.workflow("w1").unwrap(), before);
        assert_eq!(backend.task_count(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_orphaned_agent() {
        let backend = seeded_backend();
        backend.fail_next(Endpoint::GetWorkflow, Error::Connection("refused".into()));

        let err = adapter(&backend)
            .add_agent_to_workflow("w1", profile("Writer"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
        assert_eq!(backend.agent_count(), 1);
        let metadata = WorkflowMetadata::from_workflow(&backend.workflow("w1").unwrap()).unwrap();
        assert_eq!(metadata.agent_id, vec!["a1".to_string()]);
    }

    #[tokio::test]
    async fn default_model_failure_creates_nothing() {
        let backend = seeded_backend();
        backend.fail_next(Endpoint::DefaultModel, Error::schema("model_details"));

        let err = adapter(&backend)
            .add_manager_agent_to_workflow("w1", profile("Lead"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
        assert_eq!(backend.agent_count(), 0);
    }

    #[tokio::test]
    async fn unknown_workflow_surfaces_backend_error() {
        let backend = seeded_backend();
        let err = adapter(&backend).get_workflow_information("nope").await.unwrap_err();
        assert!(matches!(err, Error::Backend { .. }));
        assert!(err.to_string().contains("nope"));
    }
}
