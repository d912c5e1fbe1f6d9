use crate::core::owned_project;
use crate::domain::model::{CodeArtifact, Project, ProjectId, UserId};
use crate::domain::ports::RecordStore;
use crate::utils::error::{PublishError, Result};
use std::sync::Arc;

/// Project and artifact bookkeeping.
pub struct ProjectRegistry {
    store: Arc<dyn RecordStore>,
}

impl ProjectRegistry {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn create_project(
        &self,
        user_id: UserId,
        name: &str,
        description: Option<String>,
    ) -> Result<Project> {
        let project = Project::new(user_id, checked_name(name)?, description);
        self.store.insert_project(&project).await?;
        tracing::info!(project_id = %project.id, "Created project '{}'", project.name);
        Ok(project)
    }

    pub async fn get_project(&self, user_id: UserId, project_id: ProjectId) -> Result<Project> {
        owned_project(self.store.as_ref(), user_id, project_id).await
    }

    /// Most recently updated first.
    pub async fn list_projects(&self, user_id: UserId) -> Result<Vec<Project>> {
        let mut projects = self.store.list_projects(user_id).await?;
        projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(projects)
    }

    /// Renaming changes the provider slug; domains already attached stay
    /// registered under the old remote project.
    pub async fn rename_project(
        &self,
        user_id: UserId,
        project_id: ProjectId,
        name: &str,
    ) -> Result<Project> {
        let mut project = owned_project(self.store.as_ref(), user_id, project_id).await?;
        project.rename(checked_name(name)?);
        self.store.update_project(&project).await?;
        Ok(project)
    }

    pub async fn delete_project(&self, user_id: UserId, project_id: ProjectId) -> Result<()> {
        let project = owned_project(self.store.as_ref(), user_id, project_id).await?;
        self.store.delete_project(project.id).await?;
        tracing::info!(project_id = %project.id, "Deleted project '{}' and its records", project.name);
        Ok(())
    }

    pub async fn record_artifact(
        &self,
        user_id: UserId,
        project_id: ProjectId,
        code: impl Into<String>,
    ) -> Result<CodeArtifact> {
        let project = owned_project(self.store.as_ref(), user_id, project_id).await?;
        let artifact = CodeArtifact::new(&project, code);
        if artifact.code.trim().is_empty() {
            return Err(PublishError::ValidationError {
                message: "generated code is empty".to_string(),
            });
        }
        self.store.insert_artifact(&artifact).await?;
        tracing::debug!(artifact_id = %artifact.id, "Stored artifact ({} bytes)", artifact.code.len());
        Ok(artifact)
    }
}

fn checked_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PublishError::ValidationError {
            message: "project name cannot be empty".to_string(),
        });
    }
    Ok(name)
}
