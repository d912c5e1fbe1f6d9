use crate::core::owned_project;
use crate::domain::model::{ChatMessage, CodeArtifact, ProjectId, UserId};
use crate::domain::ports::{CodeProducer, RecordStore};
use crate::utils::error::{PublishError, Result};
use std::sync::Arc;

/// Turns a conversation into a stored artifact. Nothing is stored when the
/// producer fails or returns no code.
pub struct ArtifactGenerator {
    store: Arc<dyn RecordStore>,
    producer: Arc<dyn CodeProducer>,
}

impl ArtifactGenerator {
    pub fn new(store: Arc<dyn RecordStore>, producer: Arc<dyn CodeProducer>) -> Self {
        Self { store, producer }
    }

    pub async fn generate(
        &self,
        user_id: UserId,
        project_id: ProjectId,
        messages: &[ChatMessage],
    ) -> Result<CodeArtifact> {
        let project = owned_project(self.store.as_ref(), user_id, project_id).await?;
        if messages.is_empty() {
            return Err(PublishError::ValidationError {
                message: "at least one message is required".to_string(),
            });
        }

        tracing::info!(project_id = %project.id, "Generating code from {} messages", messages.len());
        let code = self.producer.generate(messages).await.map_err(|err| {
            tracing::error!(project_id = %project.id, "Code producer failed: {}", err);
            PublishError::GenerationFailed {
                message: err.to_string(),
            }
        })?;

        if code.trim().is_empty() {
            return Err(PublishError::GenerationFailed {
                message: "code producer returned an empty response".to_string(),
            });
        }

        let artifact = CodeArtifact::new(&project, code);
        self.store.insert_artifact(&artifact).await?;
        tracing::info!(artifact_id = %artifact.id, "Stored generated artifact");
        Ok(artifact)
    }
}
