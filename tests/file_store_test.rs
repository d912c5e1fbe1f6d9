use anyhow::Result;
use std::sync::Arc;
use tempfile::TempDir;
use vibe_publish::adapters::identity::StaticTokenIdentity;
use vibe_publish::domain::model::{Deployment, Domain, Project, UserId};
use vibe_publish::domain::ports::RecordStore;
use vibe_publish::utils::error::StoreError;
use vibe_publish::{JsonFileRecordStore, PublishError, PublishGateway, VercelClient};

#[tokio::test]
async fn test_records_survive_reopen() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("nested").join("records.json");

    let user = UserId::new();
    let project = Project::new(user, "Persisted", Some("kept on disk".to_string()));
    let mut deployment = Deployment::building(&project, user);
    deployment.mark_ready("dpl_1", "https://persisted.vercel.app")?;
    let domain = Domain::pending(&project, user, "persisted.dev", "persisted.dev", None);

    {
        let store = JsonFileRecordStore::open(&path).await?;
        store.insert_project(&project).await?;
        store.insert_deployment(&deployment).await?;
        store.insert_domain(&domain).await?;
    }

    assert!(path.exists());
    let reopened = JsonFileRecordStore::open(&path).await?;
    assert_eq!(reopened.get_project(project.id).await?, Some(project.clone()));
    assert_eq!(
        reopened.live_deployment(project.id).await?.map(|d| d.id),
        Some(deployment.id)
    );
    assert_eq!(
        reopened.find_domain_by_name("persisted.dev").await?,
        Some(domain.clone())
    );

    reopened.delete_project(project.id).await?;
    let again = JsonFileRecordStore::open(&path).await?;
    assert!(again.get_project(project.id).await?.is_none());
    assert!(again.list_domains(project.id).await?.is_empty());
    assert!(again.list_deployments(project.id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_two_handles_on_one_file_keep_every_write() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("records.json");

    let user = UserId::new();
    let project = Project::new(user, "Shared", None);
    let first = JsonFileRecordStore::open(&path).await?;
    let second = JsonFileRecordStore::open(&path).await?;
    first.insert_project(&project).await?;

    let from_first = Deployment::building(&project, user);
    let from_second = Deployment::building(&project, user);
    first.insert_deployment(&from_first).await?;
    second.insert_deployment(&from_second).await?;

    let reopened = JsonFileRecordStore::open(&path).await?;
    let ids: Vec<_> = reopened
        .list_deployments(project.id)
        .await?
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&from_first.id));
    assert!(ids.contains(&from_second.id));

    // each handle sees the other's writes without reopening
    assert!(first.get_deployment(from_second.id).await?.is_some());
    assert!(second.get_project(project.id).await?.is_some());

    Ok(())
}

#[tokio::test]
async fn test_interleaved_writers_lose_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("records.json");

    let user = UserId::new();
    let project = Project::new(user, "Busy", None);
    JsonFileRecordStore::open(&path).await?.insert_project(&project).await?;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let store = JsonFileRecordStore::open(&path).await?;
        let project = project.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..5 {
                store
                    .insert_deployment(&Deployment::building(&project, project.user_id))
                    .await?;
            }
            Ok::<_, StoreError>(())
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let reopened = JsonFileRecordStore::open(&path).await?;
    assert_eq!(reopened.list_deployments(project.id).await?.len(), 20);
    assert!(!temp_dir.path().join("records.json.tmp").exists());

    Ok(())
}

#[tokio::test]
async fn test_duplicate_domain_is_not_persisted() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("records.json");
    let store = JsonFileRecordStore::open(&path).await?;

    let user = UserId::new();
    let project = Project::new(user, "Dup", None);
    store.insert_project(&project).await?;
    store
        .insert_domain(&Domain::pending(&project, user, "dup.dev", "dup.dev", None))
        .await?;

    let err = store
        .insert_domain(&Domain::pending(&project, user, "dup.dev", "dup.dev", None))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict { entity: "domain", .. }));

    let reopened = JsonFileRecordStore::open(&path).await?;
    assert_eq!(reopened.list_domains(project.id).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_corrupt_file_is_rejected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("records.json");
    std::fs::write(&path, "{ not json")?;

    let err = JsonFileRecordStore::open(&path).await.err();
    assert!(matches!(err, Some(StoreError::Corrupt { .. })));

    std::fs::write(&path, "   \n")?;
    let store = JsonFileRecordStore::open(&path).await?;
    assert!(store.list_projects(UserId::new()).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_gateway_on_file_store() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("records.json");
    let user = UserId::new();

    let build = |store: JsonFileRecordStore| -> Result<PublishGateway> {
        let provider = VercelClient::new("http://127.0.0.1:1", "tok", None, None)?;
        let identity = StaticTokenIdentity::new().with_token("tok-user", user);
        Ok(PublishGateway::new(Arc::new(store), Arc::new(provider), Arc::new(identity)))
    };

    let gateway = build(JsonFileRecordStore::open(&path).await?)?;
    let project = gateway.create_project("tok-user", "  Portfolio  ", None).await?;
    assert_eq!(project.name, "Portfolio");
    gateway
        .record_artifact("tok-user", project.id, "export default 1;".to_string())
        .await?;
    gateway.rename_project("tok-user", project.id, "Folio").await?;

    let gateway = build(JsonFileRecordStore::open(&path).await?)?;
    let projects = gateway.list_projects("tok-user").await?;
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "Folio");

    let err = gateway.create_project("tok-user", "   ", None).await.unwrap_err();
    assert!(matches!(err, PublishError::ValidationError { .. }));

    gateway.delete_project("tok-user", project.id).await?;
    let err = gateway.publish("tok-user", project.id).await.unwrap_err();
    assert!(matches!(err, PublishError::NotFound { entity: "project", .. }));

    Ok(())
}
