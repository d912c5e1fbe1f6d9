use crate::core::owned_project;
use crate::domain::model::{
    AddDomainOutcome, Domain, DomainId, Project, ProjectId, UserId, VerifyOutcome,
};
use crate::domain::ports::{DriftObserver, HostingProvider, RecordStore, TracingDriftObserver};
use crate::domain::slug::project_slug;
use crate::utils::error::{PublishError, Result};
use crate::utils::validation::normalize_domain_name;
use std::sync::Arc;

/// Custom domain lifecycle: add (remote first, fail closed), verify
/// (reconcile against the provider), remove (local authoritative, fail open).
pub struct DomainOrchestrator {
    store: Arc<dyn RecordStore>,
    provider: Arc<dyn HostingProvider>,
    observer: Arc<dyn DriftObserver>,
}

impl DomainOrchestrator {
    pub fn new(store: Arc<dyn RecordStore>, provider: Arc<dyn HostingProvider>) -> Self {
        Self {
            store,
            provider,
            observer: Arc::new(TracingDriftObserver),
        }
    }

    pub fn with_drift_observer(mut self, observer: Arc<dyn DriftObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub async fn add_domain(
        &self,
        user_id: UserId,
        project_id: ProjectId,
        domain_name: &str,
    ) -> Result<AddDomainOutcome> {
        let project = owned_project(self.store.as_ref(), user_id, project_id).await?;
        let name = normalize_domain_name(domain_name)?;
        self.require_live_deployment(&project).await?;

        if self.store.find_domain_by_name(&name).await?.is_some() {
            return Err(PublishError::Conflict {
                entity: "domain",
                key: name,
            });
        }

        let slug = project_slug(&project);
        tracing::info!(project_id = %project.id, "Adding domain {} to '{}'", name, slug);

        let remote = self.provider.add_domain(&slug, &name).await.map_err(|err| {
            tracing::error!(project_id = %project.id, "Domain registration for {} failed: {}", name, err);
            PublishError::DomainRegistrationFailed {
                message: err.to_string(),
            }
        })?;

        let token = remote.verification.first().map(|record| record.value.clone());
        let domain = Domain::pending(&project, user_id, name, remote.remote_id, token);
        if let Err(err) = self.store.insert_domain(&domain).await {
            tracing::warn!(
                project_id = %project.id,
                "Domain {} is registered remotely but could not be stored: {}",
                domain.name,
                err
            );
            return Err(err.into());
        }

        tracing::info!(domain_id = %domain.id, "Domain {} pending verification", domain.name);
        Ok(AddDomainOutcome {
            domain,
            verification: remote.verification,
        })
    }

    /// Safe to poll: with unchanged remote state the local record is left
    /// untouched.
    pub async fn verify_domain(&self, user_id: UserId, domain_id: DomainId) -> Result<VerifyOutcome> {
        let mut domain = self.owned_domain(user_id, domain_id).await?;
        let project = self.domain_project(&domain).await?;
        self.require_live_deployment(&project).await?;

        let slug = project_slug(&project);
        let remote = self.provider.get_domain(&slug, &domain.name).await?;

        if domain.reconcile(remote.verified) {
            self.store.update_domain(&domain).await?;
            tracing::info!(domain_id = %domain.id, "Domain {} is now {}", domain.name, domain.status);
        } else if domain.is_active() && !remote.verified {
            tracing::warn!(
                domain_id = %domain.id,
                "Domain {} is active locally but the provider reports it unverified",
                domain.name
            );
        } else {
            tracing::debug!(domain_id = %domain.id, "Domain {} still {}", domain.name, domain.status);
        }

        Ok(VerifyOutcome {
            verified: remote.verified,
            domain,
            verification: remote.verification,
        })
    }

    /// The local record is deleted even when the provider call fails; such
    /// failures go to the drift observer instead of the caller.
    pub async fn remove_domain(&self, user_id: UserId, domain_id: DomainId) -> Result<()> {
        let domain = self.owned_domain(user_id, domain_id).await?;

        match self.store.get_project(domain.project_id).await? {
            Some(project) => {
                let slug = project_slug(&project);
                tracing::info!(domain_id = %domain.id, "Removing domain {} from '{}'", domain.name, slug);
                if let Err(err) = self.provider.remove_domain(&slug, &domain.name).await {
                    tracing::warn!(
                        domain_id = %domain.id,
                        "Remote removal of {} failed, deleting local record anyway: {}",
                        domain.name,
                        err
                    );
                    self.observer.remote_removal_failed(&domain, &slug, &err);
                }
            }
            None => {
                tracing::warn!(domain_id = %domain.id, "Project of domain {} is gone; skipping remote removal", domain.name);
            }
        }

        self.store.delete_domain(domain.id).await?;
        Ok(())
    }

    pub async fn list_domains(&self, user_id: UserId, project_id: ProjectId) -> Result<Vec<Domain>> {
        let project = owned_project(self.store.as_ref(), user_id, project_id).await?;
        Ok(self.store.list_domains(project.id).await?)
    }

    async fn owned_domain(&self, user_id: UserId, domain_id: DomainId) -> Result<Domain> {
        match self.store.get_domain(domain_id).await? {
            Some(domain) if domain.user_id == user_id => Ok(domain),
            _ => Err(PublishError::NotFound {
                entity: "domain",
                id: domain_id.to_string(),
            }),
        }
    }

    async fn domain_project(&self, domain: &Domain) -> Result<Project> {
        self.store
            .get_project(domain.project_id)
            .await?
            .ok_or_else(|| PublishError::NotFound {
                entity: "project",
                id: domain.project_id.to_string(),
            })
    }

    async fn require_live_deployment(&self, project: &Project) -> Result<()> {
        match self.store.live_deployment(project.id).await? {
            Some(deployment) if deployment.remote_id.is_some() => Ok(()),
            _ => Err(PublishError::NoActiveDeployment {
                project_id: project.id.to_string(),
            }),
        }
    }
}
