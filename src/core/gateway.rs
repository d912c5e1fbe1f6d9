//! Caller-facing surface.
//!
//! Every operation takes the caller's raw credential, resolves it to a user
//! and only then touches records or the provider. An unknown credential fails
//! with [`PublishError::Unauthorized`] before anything is read or written.

use crate::core::deployment::DeploymentOrchestrator;
use crate::core::domains::DomainOrchestrator;
use crate::core::generation::ArtifactGenerator;
use crate::core::page::PageShell;
use crate::core::projects::ProjectRegistry;
use crate::domain::model::{
    AddDomainOutcome, ChatMessage, CodeArtifact, Deployment, DeploymentId, Domain, DomainId,
    Project, ProjectId, PublishOutcome, UserId, VerifyOutcome,
};
use crate::domain::ports::{CodeProducer, DriftObserver, HostingProvider, IdentityResolver, RecordStore};
use crate::utils::error::{PublishError, Result};
use std::sync::Arc;

pub struct PublishGateway {
    store: Arc<dyn RecordStore>,
    provider: Arc<dyn HostingProvider>,
    identity: Arc<dyn IdentityResolver>,
    projects: ProjectRegistry,
    deployments: DeploymentOrchestrator,
    domains: DomainOrchestrator,
    generator: Option<ArtifactGenerator>,
}

impl PublishGateway {
    pub fn new(
        store: Arc<dyn RecordStore>,
        provider: Arc<dyn HostingProvider>,
        identity: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            projects: ProjectRegistry::new(store.clone()),
            deployments: DeploymentOrchestrator::new(store.clone(), provider.clone()),
            domains: DomainOrchestrator::new(store.clone(), provider.clone()),
            generator: None,
            store,
            provider,
            identity,
        }
    }

    pub fn with_page_shell(mut self, shell: PageShell) -> Self {
        self.deployments =
            DeploymentOrchestrator::new(self.store.clone(), self.provider.clone()).with_page_shell(shell);
        self
    }

    pub fn with_drift_observer(mut self, observer: Arc<dyn DriftObserver>) -> Self {
        self.domains =
            DomainOrchestrator::new(self.store.clone(), self.provider.clone()).with_drift_observer(observer);
        self
    }

    pub fn with_code_producer(mut self, producer: Arc<dyn CodeProducer>) -> Self {
        self.generator = Some(ArtifactGenerator::new(self.store.clone(), producer));
        self
    }

    pub async fn authenticate(&self, credential: &str) -> Result<UserId> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(PublishError::Unauthorized);
        }
        match self.identity.resolve(credential).await {
            Some(user_id) => Ok(user_id),
            None => {
                tracing::warn!("Rejected unknown caller credential");
                Err(PublishError::Unauthorized)
            }
        }
    }

    pub async fn publish(&self, credential: &str, project_id: ProjectId) -> Result<PublishOutcome> {
        let user_id = self.authenticate(credential).await?;
        self.deployments.publish(user_id, project_id).await
    }

    pub async fn add_domain(
        &self,
        credential: &str,
        project_id: ProjectId,
        domain_name: &str,
    ) -> Result<AddDomainOutcome> {
        let user_id = self.authenticate(credential).await?;
        self.domains.add_domain(user_id, project_id, domain_name).await
    }

    pub async fn verify_domain(&self, credential: &str, domain_id: DomainId) -> Result<VerifyOutcome> {
        let user_id = self.authenticate(credential).await?;
        self.domains.verify_domain(user_id, domain_id).await
    }

    pub async fn remove_domain(&self, credential: &str, domain_id: DomainId) -> Result<()> {
        let user_id = self.authenticate(credential).await?;
        self.domains.remove_domain(user_id, domain_id).await
    }

    pub async fn list_domains(&self, credential: &str, project_id: ProjectId) -> Result<Vec<Domain>> {
        let user_id = self.authenticate(credential).await?;
        self.domains.list_domains(user_id, project_id).await
    }

    pub async fn list_deployments(
        &self,
        credential: &str,
        project_id: ProjectId,
    ) -> Result<Vec<Deployment>> {
        let user_id = self.authenticate(credential).await?;
        self.deployments.list_deployments(user_id, project_id).await
    }

    pub async fn get_deployment(
        &self,
        credential: &str,
        deployment_id: DeploymentId,
    ) -> Result<Deployment> {
        let user_id = self.authenticate(credential).await?;
        self.deployments.get_deployment(user_id, deployment_id).await
    }

    pub async fn live_deployment(
        &self,
        credential: &str,
        project_id: ProjectId,
    ) -> Result<Option<Deployment>> {
        let user_id = self.authenticate(credential).await?;
        self.deployments.live_deployment(user_id, project_id).await
    }

    pub async fn create_project(
        &self,
        credential: &str,
        name: &str,
        description: Option<String>,
    ) -> Result<Project> {
        let user_id = self.authenticate(credential).await?;
        self.projects.create_project(user_id, name, description).await
    }

    pub async fn get_project(&self, credential: &str, project_id: ProjectId) -> Result<Project> {
        let user_id = self.authenticate(credential).await?;
        self.projects.get_project(user_id, project_id).await
    }

    pub async fn list_projects(&self, credential: &str) -> Result<Vec<Project>> {
        let user_id = self.authenticate(credential).await?;
        self.projects.list_projects(user_id).await
    }

    pub async fn rename_project(
        &self,
        credential: &str,
        project_id: ProjectId,
        name: &str,
    ) -> Result<Project> {
        let user_id = self.authenticate(credential).await?;
        self.projects.rename_project(user_id, project_id, name).await
    }

    pub async fn delete_project(&self, credential: &str, project_id: ProjectId) -> Result<()> {
        let user_id = self.authenticate(credential).await?;
        self.projects.delete_project(user_id, project_id).await
    }

    pub async fn record_artifact(
        &self,
        credential: &str,
        project_id: ProjectId,
        code: String,
    ) -> Result<CodeArtifact> {
        let user_id = self.authenticate(credential).await?;
        self.projects.record_artifact(user_id, project_id, code).await
    }

    pub async fn generate(
        &self,
        credential: &str,
        project_id: ProjectId,
        messages: &[ChatMessage],
    ) -> Result<CodeArtifact> {
        let user_id = self.authenticate(credential).await?;
        let generator = self.generator.as_ref().ok_or_else(|| PublishError::MissingConfigError {
            field: "generator".to_string(),
        })?;
        generator.generate(user_id, project_id, messages).await
    }
}
