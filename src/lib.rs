pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::AppConfig;

pub use adapters::{
    file_store::JsonFileRecordStore, memory_store::MemoryRecordStore, vercel::VercelClient,
};
pub use core::{
    deployment::DeploymentOrchestrator, domains::DomainOrchestrator, gateway::PublishGateway,
};
pub use utils::error::{PublishError, Result};
