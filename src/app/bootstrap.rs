use crate::adapters::chat_completions::ChatCompletionsProducer;
use crate::adapters::drift::DriftLog;
use crate::adapters::file_store::JsonFileRecordStore;
use crate::adapters::identity::StaticTokenIdentity;
use crate::adapters::memory_store::MemoryRecordStore;
use crate::adapters::vercel::VercelClient;
use crate::config::toml_config::{AppConfig, StoreBackend};
use crate::core::gateway::PublishGateway;
use crate::domain::ports::RecordStore;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::sync::Arc;

pub struct Runtime {
    pub gateway: PublishGateway,
    pub drift: DriftLog,
}

/// Validates `config` and assembles every adapter. All configuration errors,
/// including a missing hosting token, surface here before any request is made.
pub async fn build_runtime(config: &AppConfig) -> Result<Runtime> {
    config.validate()?;

    let store: Arc<dyn RecordStore> = match config.store.backend {
        StoreBackend::File => {
            let store = JsonFileRecordStore::open(config.store.path()).await?;
            tracing::debug!("Using record store at {}", store.path().display());
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory record store; records are lost on exit");
            Arc::new(MemoryRecordStore::new())
        }
    };

    let provider = Arc::new(VercelClient::from_config(&config.hosting)?);
    let identity = StaticTokenIdentity::from_config(&config.identities)?;
    if identity.is_empty() {
        tracing::warn!("No identities configured; every call will be rejected as unauthorized");
    } else {
        tracing::debug!("Loaded {} caller identities", identity.len());
    }

    let drift = DriftLog::new();
    let mut gateway = PublishGateway::new(store, provider, Arc::new(identity))
        .with_page_shell(config.page.clone())
        .with_drift_observer(Arc::new(drift.clone()));

    if let Some(generator) = &config.generator {
        let producer = ChatCompletionsProducer::from_config(generator)?;
        gateway = gateway.with_code_producer(Arc::new(producer));
    }

    Ok(Runtime { gateway, drift })
}
