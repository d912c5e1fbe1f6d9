pub mod deployment;
pub mod domains;
pub mod gateway;
pub mod generation;
pub mod page;
pub mod projects;

pub use crate::domain::model::{Deployment, DeploymentStatus, Domain, DomainStatus, Project};
pub use crate::domain::ports::{CodeProducer, DriftObserver, HostingProvider, IdentityResolver, RecordStore};
pub use crate::utils::error::Result;

use crate::domain::model::{ProjectId, UserId};
use crate::utils::error::PublishError;

/// Loads a project the caller owns. Someone else's project reads as missing.
pub(crate) async fn owned_project(
    store: &dyn RecordStore,
    user_id: UserId,
    project_id: ProjectId,
) -> Result<Project> {
    match store.get_project(project_id).await? {
        Some(project) if project.user_id == user_id => Ok(project),
        _ => Err(PublishError::NotFound {
            entity: "project",
            id: project_id.to_string(),
        }),
    }
}
