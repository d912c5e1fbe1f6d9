use crate::domain::model::{
    ChatMessage, CodeArtifact, Deployment, DeploymentId, Domain, DomainId, Project, ProjectId,
    UserId, VerificationRecord,
};
use crate::utils::error::{ProviderError, StoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// System of record for projects, artifacts, deployments and domains.
///
/// Lookups return `Ok(None)` for missing rows; ownership checks are the
/// caller's concern. "Latest" queries order by creation time, newest first.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_project(&self, project: &Project) -> Result<(), StoreError>;
    async fn update_project(&self, project: &Project) -> Result<(), StoreError>;
    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>, StoreError>;
    async fn list_projects(&self, user_id: UserId) -> Result<Vec<Project>, StoreError>;
    /// Removes the project together with its artifacts, deployments and domains.
    async fn delete_project(&self, id: ProjectId) -> Result<(), StoreError>;

    async fn insert_artifact(&self, artifact: &CodeArtifact) -> Result<(), StoreError>;
    async fn latest_artifact(&self, project_id: ProjectId)
        -> Result<Option<CodeArtifact>, StoreError>;

    async fn insert_deployment(&self, deployment: &Deployment) -> Result<(), StoreError>;
    async fn update_deployment(&self, deployment: &Deployment) -> Result<(), StoreError>;
    async fn get_deployment(&self, id: DeploymentId) -> Result<Option<Deployment>, StoreError>;
    async fn list_deployments(&self, project_id: ProjectId) -> Result<Vec<Deployment>, StoreError>;
    /// The ready deployment with the latest ready timestamp.
    async fn live_deployment(&self, project_id: ProjectId)
        -> Result<Option<Deployment>, StoreError>;

    /// Fails with [`StoreError::Conflict`] when the name is already bound.
    async fn insert_domain(&self, domain: &Domain) -> Result<(), StoreError>;
    async fn update_domain(&self, domain: &Domain) -> Result<(), StoreError>;
    async fn get_domain(&self, id: DomainId) -> Result<Option<Domain>, StoreError>;
    async fn find_domain_by_name(&self, name: &str) -> Result<Option<Domain>, StoreError>;
    async fn list_domains(&self, project_id: ProjectId) -> Result<Vec<Domain>, StoreError>;
    /// Returns whether a row was removed.
    async fn delete_domain(&self, id: DomainId) -> Result<bool, StoreError>;
}

/// Payload submitted to the hosting provider: one static file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticPage {
    pub file: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDeployment {
    pub remote_id: String,
    /// Host or URL exactly as reported by the provider.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDomain {
    pub remote_id: String,
    pub verified: bool,
    pub verification: Vec<VerificationRecord>,
}

/// Remote hosting API. Implementations carry their own credential.
#[async_trait]
pub trait HostingProvider: Send + Sync {
    async fn create_deployment(
        &self,
        slug: &str,
        page: &StaticPage,
    ) -> Result<RemoteDeployment, ProviderError>;

    async fn add_domain(&self, slug: &str, domain: &str) -> Result<RemoteDomain, ProviderError>;

    async fn get_domain(&self, slug: &str, domain: &str) -> Result<RemoteDomain, ProviderError>;

    async fn remove_domain(&self, slug: &str, domain: &str) -> Result<(), ProviderError>;
}

/// Maps a caller credential to a user. `None` means the credential is unknown.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, credential: &str) -> Option<UserId>;
}

/// Opaque code generator: conversation in, code string out.
#[async_trait]
pub trait CodeProducer: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, ProviderError>;
}

/// Side channel for remote failures that were deliberately not propagated,
/// so local and remote state drifting apart stays visible to operators.
pub trait DriftObserver: Send + Sync {
    fn remote_removal_failed(&self, domain: &Domain, slug: &str, error: &ProviderError);
}

/// Default observer: a structured warning per suppressed failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDriftObserver;

impl DriftObserver for TracingDriftObserver {
    fn remote_removal_failed(&self, domain: &Domain, slug: &str, error: &ProviderError) {
        tracing::warn!(
            drift = "orphaned_remote_domain",
            domain_id = %domain.id,
            domain = %domain.name,
            slug = %slug,
            error = %error,
            "Domain may still be registered at the hosting provider"
        );
    }
}
