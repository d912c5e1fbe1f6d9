use crate::domain::model::{
    CodeArtifact, Deployment, DeploymentId, Domain, DomainId, Project, ProjectId, UserId,
};
use crate::domain::ports::RecordStore;
use crate::utils::error::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// All records, kept in insertion order. Updates of rows that no longer exist
/// are no-ops, like an SQL `UPDATE ... WHERE id = ?` matching nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub artifacts: Vec<CodeArtifact>,
    #[serde(default)]
    pub deployments: Vec<Deployment>,
    #[serde(default)]
    pub domains: Vec<Domain>,
}

impl Tables {
    pub fn insert_project(&mut self, project: &Project) -> Result<(), StoreError> {
        if self.projects.iter().any(|p| p.id == project.id) {
            return Err(StoreError::Conflict {
                entity: "project",
                key: project.id.to_string(),
            });
        }
        self.projects.push(project.clone());
        Ok(())
    }

    pub fn update_project(&mut self, project: &Project) {
        if let Some(row) = self.projects.iter_mut().find(|p| p.id == project.id) {
            *row = project.clone();
        }
    }

    pub fn get_project(&self, id: ProjectId) -> Option<Project> {
        self.projects.iter().find(|p| p.id == id).cloned()
    }

    pub fn list_projects(&self, user_id: UserId) -> Vec<Project> {
        self.projects
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn delete_project(&mut self, id: ProjectId) {
        self.projects.retain(|p| p.id != id);
        self.artifacts.retain(|a| a.project_id != id);
        self.deployments.retain(|d| d.project_id != id);
        self.domains.retain(|d| d.project_id != id);
    }

    pub fn insert_artifact(&mut self, artifact: &CodeArtifact) {
        self.artifacts.push(artifact.clone());
    }

    /// Ties on `created_at` go to the later insert.
    pub fn latest_artifact(&self, project_id: ProjectId) -> Option<CodeArtifact> {
        self.artifacts
            .iter()
            .filter(|a| a.project_id == project_id)
            .max_by_key(|a| a.created_at)
            .cloned()
    }

    pub fn insert_deployment(&mut self, deployment: &Deployment) -> Result<(), StoreError> {
        if self.deployments.iter().any(|d| d.id == deployment.id) {
            return Err(StoreError::Conflict {
                entity: "deployment",
                key: deployment.id.to_string(),
            });
        }
        self.deployments.push(deployment.clone());
        Ok(())
    }

    pub fn update_deployment(&mut self, deployment: &Deployment) {
        if let Some(row) = self.deployments.iter_mut().find(|d| d.id == deployment.id) {
            *row = deployment.clone();
        }
    }

    pub fn get_deployment(&self, id: DeploymentId) -> Option<Deployment> {
        self.deployments.iter().find(|d| d.id == id).cloned()
    }

    pub fn list_deployments(&self, project_id: ProjectId) -> Vec<Deployment> {
        let mut rows: Vec<Deployment> = self
            .deployments
            .iter()
            .rev()
            .filter(|d| d.project_id == project_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }

    pub fn live_deployment(&self, project_id: ProjectId) -> Option<Deployment> {
        self.deployments
            .iter()
            .filter(|d| d.project_id == project_id)
            .filter_map(|d| d.ready_at().map(|at| (at, d)))
            .max_by_key(|(at, _)| *at)
            .map(|(_, d)| d.clone())
    }

    pub fn insert_domain(&mut self, domain: &Domain) -> Result<(), StoreError> {
        if self
            .domains
            .iter()
            .any(|d| d.id == domain.id || d.name == domain.name)
        {
            return Err(StoreError::Conflict {
                entity: "domain",
                key: domain.name.clone(),
            });
        }
        self.domains.push(domain.clone());
        Ok(())
    }

    pub fn update_domain(&mut self, domain: &Domain) {
        if let Some(row) = self.domains.iter_mut().find(|d| d.id == domain.id) {
            *row = domain.clone();
        }
    }

    pub fn get_domain(&self, id: DomainId) -> Option<Domain> {
        self.domains.iter().find(|d| d.id == id).cloned()
    }

    pub fn find_domain_by_name(&self, name: &str) -> Option<Domain> {
        self.domains.iter().find(|d| d.name == name).cloned()
    }

    pub fn list_domains(&self, project_id: ProjectId) -> Vec<Domain> {
        let mut rows: Vec<Domain> = self
            .domains
            .iter()
            .filter(|d| d.project_id == project_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }

    pub fn delete_domain(&mut self, id: DomainId) -> bool {
        let before = self.domains.len();
        self.domains.retain(|d| d.id != id);
        self.domains.len() != before
    }
}

/// Process-local store, used by tests and short-lived runs.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Tables {
        self.tables.read().await.clone()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert_project(&self, project: &Project) -> Result<(), StoreError> {
        self.tables.write().await.insert_project(project)
    }

    async fn update_project(&self, project: &Project) -> Result<(), StoreError> {
        self.tables.write().await.update_project(project);
        Ok(())
    }

    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
        Ok(self.tables.read().await.get_project(id))
    }

    async fn list_projects(&self, user_id: UserId) -> Result<Vec<Project>, StoreError> {
        Ok(self.tables.read().await.list_projects(user_id))
    }

    async fn delete_project(&self, id: ProjectId) -> Result<(), StoreError> {
        self.tables.write().await.delete_project(id);
        Ok(())
    }

    async fn insert_artifact(&self, artifact: &CodeArtifact) -> Result<(), StoreError> {
        self.tables.write().await.insert_artifact(artifact);
        Ok(())
    }

    async fn latest_artifact(
        &self,
        project_id: ProjectId,
    ) -> Result<Option<CodeArtifact>, StoreError> {
        Ok(self.tables.read().await.latest_artifact(project_id))
    }

    async fn insert_deployment(&self, deployment: &Deployment) -> Result<(), StoreError> {
        self.tables.write().await.insert_deployment(deployment)
    }

    async fn update_deployment(&self, deployment: &Deployment) -> Result<(), StoreError> {
        self.tables.write().await.update_deployment(deployment);
        Ok(())
    }

    async fn get_deployment(&self, id: DeploymentId) -> Result<Option<Deployment>, StoreError> {
        Ok(self.tables.read().await.get_deployment(id))
    }

    async fn list_deployments(&self, project_id: ProjectId) -> Result<Vec<Deployment>, StoreError> {
        Ok(self.tables.read().await.list_deployments(project_id))
    }

    async fn live_deployment(
        &self,
        project_id: ProjectId,
    ) -> Result<Option<Deployment>, StoreError> {
        Ok(self.tables.read().await.live_deployment(project_id))
    }

    async fn insert_domain(&self, domain: &Domain) -> Result<(), StoreError> {
        self.tables.write().await.insert_domain(domain)
    }

    async fn update_domain(&self, domain: &Domain) -> Result<(), StoreError> {
        self.tables.write().await.update_domain(domain);
        Ok(())
    }

    async fn get_domain(&self, id: DomainId) -> Result<Option<Domain>, StoreError> {
        Ok(self.tables.read().await.get_domain(id))
    }

    async fn find_domain_by_name(&self, name: &str) -> Result<Option<Domain>, StoreError> {
        Ok(self.tables.read().await.find_domain_by_name(name))
    }

    async fn list_domains(&self, project_id: ProjectId) -> Result<Vec<Domain>, StoreError> {
        Ok(self.tables.read().await.list_domains(project_id))
    }

    async fn delete_domain(&self, id: DomainId) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.delete_domain(id))
    }
}
