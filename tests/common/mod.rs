#![allow(dead_code)]

use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use vibe_publish::adapters::drift::DriftLog;
use vibe_publish::adapters::identity::StaticTokenIdentity;
use vibe_publish::domain::model::{Project, UserId};
use vibe_publish::{MemoryRecordStore, PublishGateway, VercelClient};

pub const ALICE: &str = "alice-token";
pub const BOB: &str = "bob-token";
pub const HOSTING_TOKEN: &str = "test-hosting-token";

pub struct Harness {
    pub gateway: PublishGateway,
    pub store: MemoryRecordStore,
    pub drift: DriftLog,
    pub alice: UserId,
    pub bob: UserId,
}

pub fn harness(server: &MockServer) -> Harness {
    let alice = UserId::new();
    let bob = UserId::new();
    let identity = StaticTokenIdentity::new()
        .with_token(ALICE, alice)
        .with_token(BOB, bob);
    let provider = VercelClient::new(&server.base_url(), HOSTING_TOKEN, None, None)
        .expect("valid hosting client");
    let store = MemoryRecordStore::new();
    let drift = DriftLog::new();
    let gateway = PublishGateway::new(Arc::new(store.clone()), Arc::new(provider), Arc::new(identity))
        .with_drift_observer(Arc::new(drift.clone()));

    Harness {
        gateway,
        store,
        drift,
        alice,
        bob,
    }
}

/// Creates a project for alice with one artifact.
pub async fn project_with_artifact(h: &Harness, name: &str) -> Project {
    let project = h
        .gateway
        .create_project(ALICE, name, None)
        .await
        .expect("project created");
    h.gateway
        .record_artifact(ALICE, project.id, "const App = () => <h1>Hi</h1>;".to_string())
        .await
        .expect("artifact stored");
    project
}

/// Mocks a successful deployment for `slug` and publishes the project.
pub async fn published_project(h: &Harness, server: &MockServer, name: &str, slug: &str) -> Project {
    let project = project_with_artifact(h, name).await;
    let body = format!(r#"{{"name":"{}"}}"#, slug);
    server.mock(|when, then| {
        when.method(POST)
            .path("/v13/deployments")
            .json_body_partial(body);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"id": format!("dpl_{}", slug), "url": format!("{}.vercel.app", slug)}));
    });
    h.gateway
        .publish(ALICE, project.id)
        .await
        .expect("publish succeeds");
    project
}
