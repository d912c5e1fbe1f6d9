mod common;

use anyhow::Result;
use common::{harness, project_with_artifact, published_project, ALICE, BOB};
use httpmock::prelude::*;
use serde_json::json;
use vibe_publish::domain::model::DomainStatus;
use vibe_publish::PublishError;

fn pending_domain_body(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "verified": false,
        "verification": [{
            "type": "TXT",
            "domain": format!("_vercel.{}", name),
            "value": "vc-domain-verify=abc123",
            "reason": "pending_domain_verification"
        }]
    })
}

#[tokio::test]
async fn test_add_domain_requires_live_deployment() -> Result<()> {
    let server = MockServer::start();
    let h = harness(&server);
    let project = project_with_artifact(&h, "My Site").await;

    let add_mock = server.mock(|when, then| {
        when.method(POST).path("/v9/projects/my-site/domains");
        then.status(200).json_body(pending_domain_body("example.com"));
    });

    let err = h
        .gateway
        .add_domain(ALICE, project.id, "example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::NoActiveDeployment { .. }));
    add_mock.assert_hits(0);
    assert!(h.store.snapshot().await.domains.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_domain_lifecycle() -> Result<()> {
    let server = MockServer::start();
    let h = harness(&server);
    let project = published_project(&h, &server, "My Site", "my-site").await;

    // add
    let add_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v9/projects/my-site/domains")
            .json_body(json!({"name": "example.com"}));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(pending_domain_body("example.com"));
    });

    let added = h.gateway.add_domain(ALICE, project.id, " Example.COM. ").await?;
    add_mock.assert();

    assert_eq!(added.domain.name, "example.com");
    assert_eq!(added.domain.remote_id, "example.com");
    assert_eq!(added.domain.status, DomainStatus::Pending);
    assert!(!added.domain.ssl_enabled);
    assert_eq!(
        added.domain.verification_token.as_deref(),
        Some("vc-domain-verify=abc123")
    );
    assert_eq!(added.verification.len(), 1);
    assert_eq!(added.verification[0].record_type, "TXT");

    // verify while DNS is not ready yet
    let mut pending_mock = server.mock(|when, then| {
        when.method(GET).path("/v9/projects/my-site/domains/example.com");
        then.status(200).json_body(pending_domain_body("example.com"));
    });

    let first = h.gateway.verify_domain(ALICE, added.domain.id).await?;
    let second = h.gateway.verify_domain(ALICE, added.domain.id).await?;
    pending_mock.assert_hits(2);
    pending_mock.delete();

    assert!(!first.verified);
    assert_eq!(first.domain.status, DomainStatus::Pending);
    assert!(!first.domain.ssl_enabled);
    assert_eq!(first.domain, second.domain);
    assert_eq!(first.verification[0].value, "vc-domain-verify=abc123");

    // verify once DNS is in place
    let mut verified_mock = server.mock(|when, then| {
        when.method(GET).path("/v9/projects/my-site/domains/example.com");
        then.status(200)
            .json_body(json!({"name": "example.com", "verified": true}));
    });

    let verified = h.gateway.verify_domain(ALICE, added.domain.id).await?;
    assert!(verified.verified);
    assert_eq!(verified.domain.status, DomainStatus::Active);
    assert!(verified.domain.ssl_enabled);
    let verified_at = verified.domain.verified_at;
    assert!(verified_at.is_some());

    // repeat is a no-op
    let again = h.gateway.verify_domain(ALICE, added.domain.id).await?;
    assert_eq!(again.domain.verified_at, verified_at);
    verified_mock.delete();

    // remote drift does not demote an active domain
    server.mock(|when, then| {
        when.method(GET).path("/v9/projects/my-site/domains/example.com");
        then.status(200).json_body(pending_domain_body("example.com"));
    });
    let drifted = h.gateway.verify_domain(ALICE, added.domain.id).await?;
    assert!(!drifted.verified);
    assert_eq!(drifted.domain.status, DomainStatus::Active);
    assert!(drifted.domain.ssl_enabled);

    let listed = h.gateway.list_domains(ALICE, project.id).await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, DomainStatus::Active);

    // remove
    let remove_mock = server.mock(|when, then| {
        when.method(DELETE).path("/v9/projects/my-site/domains/example.com");
        then.status(200).json_body(json!({}));
    });
    h.gateway.remove_domain(ALICE, added.domain.id).await?;
    remove_mock.assert();

    assert!(h.gateway.list_domains(ALICE, project.id).await?.is_empty());
    assert!(h.drift.events().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_add_domain_provider_rejection_stores_nothing() -> Result<()> {
    let server = MockServer::start();
    let h = harness(&server);
    let project = published_project(&h, &server, "My Site", "my-site").await;

    let add_mock = server.mock(|when, then| {
        when.method(POST).path("/v9/projects/my-site/domains");
        then.status(409)
            .json_body(json!({"error": {"code": "domain_taken", "message": "Domain is already in use"}}));
    });

    let err = h
        .gateway
        .add_domain(ALICE, project.id, "taken.com")
        .await
        .unwrap_err();
    add_mock.assert();

    match err {
        PublishError::DomainRegistrationFailed { message } => {
            assert!(message.contains("409"));
            assert!(message.contains("Domain is already in use"));
        }
        other => panic!("expected DomainRegistrationFailed, got {:?}", other),
    }
    assert!(h.store.snapshot().await.domains.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_add_domain_rejects_invalid_and_duplicate_names() -> Result<()> {
    let server = MockServer::start();
    let h = harness(&server);
    let project = published_project(&h, &server, "My Site", "my-site").await;

    let add_mock = server.mock(|when, then| {
        when.method(POST).path("/v9/projects/my-site/domains");
        then.status(200).json_body(pending_domain_body("example.com"));
    });

    let err = h
        .gateway
        .add_domain(ALICE, project.id, "not a domain")
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::ValidationError { .. }));

    h.gateway.add_domain(ALICE, project.id, "example.com").await?;
    let err = h
        .gateway
        .add_domain(ALICE, project.id, "EXAMPLE.com")
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::Conflict { entity: "domain", .. }));

    add_mock.assert_hits(1);
    assert_eq!(h.store.snapshot().await.domains.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_remove_domain_fails_open() -> Result<()> {
    let server = MockServer::start();
    let h = harness(&server);
    let project = published_project(&h, &server, "My Site", "my-site").await;

    server.mock(|when, then| {
        when.method(POST).path("/v9/projects/my-site/domains");
        then.status(200).json_body(pending_domain_body("shop.example.com"));
    });
    let added = h
        .gateway
        .add_domain(ALICE, project.id, "shop.example.com")
        .await?;

    let remove_mock = server.mock(|when, then| {
        when.method(DELETE)
            .path("/v9/projects/my-site/domains/shop.example.com");
        then.status(500).body("internal error");
    });

    h.gateway.remove_domain(ALICE, added.domain.id).await?;
    remove_mock.assert();

    assert!(h.store.snapshot().await.domains.is_empty());

    let events = h.drift.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].domain_id, added.domain.id);
    assert_eq!(events[0].domain, "shop.example.com");
    assert_eq!(events[0].slug, "my-site");
    assert!(events[0].error.contains("500"));

    // the record is gone, so a second removal reports it missing
    let err = h
        .gateway
        .remove_domain(ALICE, added.domain.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::NotFound { entity: "domain", .. }));

    Ok(())
}

#[tokio::test]
async fn test_verify_propagates_provider_error() -> Result<()> {
    let server = MockServer::start();
    let h = harness(&server);
    let project = published_project(&h, &server, "My Site", "my-site").await;

    server.mock(|when, then| {
        when.method(POST).path("/v9/projects/my-site/domains");
        then.status(200).json_body(pending_domain_body("example.com"));
    });
    let added = h.gateway.add_domain(ALICE, project.id, "example.com").await?;

    server.mock(|when, then| {
        when.method(GET).path("/v9/projects/my-site/domains/example.com");
        then.status(503).body("maintenance");
    });

    let err = h
        .gateway
        .verify_domain(ALICE, added.domain.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::ProviderError(_)));
    assert!(err.is_retryable());

    let stored = h.gateway.list_domains(ALICE, project.id).await?;
    assert_eq!(stored[0], added.domain);

    Ok(())
}

#[tokio::test]
async fn test_domains_are_scoped_to_their_owner() -> Result<()> {
    let server = MockServer::start();
    let h = harness(&server);
    let project = published_project(&h, &server, "My Site", "my-site").await;

    server.mock(|when, then| {
        when.method(POST).path("/v9/projects/my-site/domains");
        then.status(200).json_body(pending_domain_body("example.com"));
    });
    let added = h.gateway.add_domain(ALICE, project.id, "example.com").await?;

    let remote_calls = server.mock(|when, then| {
        when.path_contains("/domains/example.com");
        then.status(200).json_body(pending_domain_body("example.com"));
    });

    let err = h
        .gateway
        .verify_domain(BOB, added.domain.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::NotFound { entity: "domain", .. }));

    let err = h
        .gateway
        .remove_domain(BOB, added.domain.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::NotFound { entity: "domain", .. }));

    let err = h
        .gateway
        .add_domain(BOB, project.id, "other.com")
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::NotFound { entity: "project", .. }));

    let err = h
        .gateway
        .verify_domain("nobody", added.domain.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::Unauthorized));

    remote_calls.assert_hits(0);
    assert_eq!(h.store.snapshot().await.domains.len(), 1);

    Ok(())
}
