use crate::core::{owned_project, page::PageShell};
use crate::domain::model::{Deployment, DeploymentId, ProjectId, PublishOutcome, UserId};
use crate::domain::ports::{HostingProvider, RecordStore, RemoteDeployment};
use crate::domain::slug::project_slug;
use crate::utils::error::{ProviderError, PublishError, Result};
use std::sync::Arc;

/// Drives one publish attempt: `building -> ready | failed`.
pub struct DeploymentOrchestrator {
    store: Arc<dyn RecordStore>,
    provider: Arc<dyn HostingProvider>,
    shell: PageShell,
}

impl DeploymentOrchestrator {
    pub fn new(store: Arc<dyn RecordStore>, provider: Arc<dyn HostingProvider>) -> Self {
        Self {
            store,
            provider,
            shell: PageShell::default(),
        }
    }

    pub fn with_page_shell(mut self, shell: PageShell) -> Self {
        self.shell = shell;
        self
    }

    /// Publishes the project's latest artifact.
    ///
    /// Exactly one deployment record is created per call and it is written
    /// back at most once. A provider failure is stored on that record before
    /// `DeploymentFailed` is returned. Nothing is retried here; calling again
    /// creates a fresh record.
    pub async fn publish(&self, user_id: UserId, project_id: ProjectId) -> Result<PublishOutcome> {
        let project = owned_project(self.store.as_ref(), user_id, project_id).await?;

        let artifact = self
            .store
            .latest_artifact(project.id)
            .await?
            .ok_or_else(|| PublishError::NoArtifact {
                project_id: project.id.to_string(),
            })?;

        let slug = project_slug(&project);
        let mut deployment = Deployment::building(&project, user_id);
        self.store.insert_deployment(&deployment).await?;
        tracing::info!(
            deployment_id = %deployment.id,
            project_id = %project.id,
            artifact_id = %artifact.id,
            "Publishing project as '{}'",
            slug
        );

        let page = self.shell.render(&project.name, &artifact.code);
        let remote = self
            .provider
            .create_deployment(&slug, &page)
            .await
            .and_then(require_url);

        match remote {
            Ok(remote) => {
                let url = normalize_url(&remote.url);
                deployment.mark_ready(remote.remote_id.clone(), url.clone())?;
                if let Err(store_err) = self.store.update_deployment(&deployment).await {
                    tracing::error!(
                        deployment_id = %deployment.id,
                        remote_id = %remote.remote_id,
                        url = %url,
                        "Deployment is live but could not be recorded as ready: {}",
                        store_err
                    );
                    return Err(store_err.into());
                }
                tracing::info!(deployment_id = %deployment.id, "Deployment ready at {}", url);
                Ok(PublishOutcome {
                    deployment_id: deployment.id,
                    url,
                })
            }
            Err(err) => {
                tracing::error!(deployment_id = %deployment.id, "Hosting provider rejected deployment: {}", err);
                deployment.mark_failed(format!("Hosting provider error: {}", err))?;
                if let Err(store_err) = self.store.update_deployment(&deployment).await {
                    tracing::error!(
                        deployment_id = %deployment.id,
                        "Could not record deployment failure: {}",
                        store_err
                    );
                    return Err(store_err.into());
                }
                Err(PublishError::DeploymentFailed {
                    deployment_id: deployment.id.to_string(),
                })
            }
        }
    }

    /// Publish history, newest first. Failed attempts are kept.
    pub async fn list_deployments(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> Result<Vec<Deployment>> {
        let project = owned_project(self.store.as_ref(), user_id, project_id).await?;
        Ok(self.store.list_deployments(project.id).await?)
    }

    pub async fn get_deployment(
        &self,
        user_id: UserId,
        deployment_id: DeploymentId,
    ) -> Result<Deployment> {
        match self.store.get_deployment(deployment_id).await? {
            Some(deployment) if deployment.user_id == user_id => Ok(deployment),
            _ => Err(PublishError::NotFound {
                entity: "deployment",
                id: deployment_id.to_string(),
            }),
        }
    }

    pub async fn live_deployment(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> Result<Option<Deployment>> {
        let project = owned_project(self.store.as_ref(), user_id, project_id).await?;
        Ok(self.store.live_deployment(project.id).await?)
    }
}

fn require_url(remote: RemoteDeployment) -> std::result::Result<RemoteDeployment, ProviderError> {
    if remote.url.trim().is_empty() {
        return Err(ProviderError::Decode(
            "provider returned no deployment URL".to_string(),
        ));
    }
    Ok(remote)
}

/// Providers report a bare host; callers get an absolute https URL.
fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("https://") || url.starts_with("http://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}
