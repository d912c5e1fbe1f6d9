use crate::domain::model::{Domain, DomainId};
use crate::domain::ports::{DriftObserver, TracingDriftObserver};
use crate::utils::error::ProviderError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftEvent {
    pub domain_id: DomainId,
    pub domain: String,
    pub slug: String,
    pub error: String,
    pub observed_at: DateTime<Utc>,
}

/// Keeps every suppressed failure so they can be listed or cleaned up later.
/// Also logs through [`TracingDriftObserver`].
#[derive(Debug, Clone, Default)]
pub struct DriftLog {
    events: Arc<Mutex<Vec<DriftEvent>>>,
}

impl DriftLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DriftEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DriftObserver for DriftLog {
    fn remote_removal_failed(&self, domain: &Domain, slug: &str, error: &ProviderError) {
        TracingDriftObserver.remote_removal_failed(domain, slug, error);
        let event = DriftEvent {
            domain_id: domain.id,
            domain: domain.name.clone(),
            slug: slug.to_string(),
            error: error.to_string(),
            observed_at: Utc::now(),
        };
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
