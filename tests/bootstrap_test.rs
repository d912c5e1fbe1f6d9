use anyhow::Result;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};
use vibe_publish::app::bootstrap::build_runtime;
use vibe_publish::{AppConfig, PublishError};

fn write_config(content: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    Ok(file)
}

#[tokio::test]
async fn test_runtime_from_config_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store_path = temp_dir.path().join("records.json");
    let store_path = store_path.to_string_lossy().replace('\\', "/");

    let file = write_config(&format!(
        r#"
[hosting]
provider = "vercel"
token = "tok_live"
team_id = "team_1"
request_timeout_seconds = 30

[store]
backend = "file"
path = "{}"

[[identities]]
token = "alice-token"
user_id = "6f1b1a5e-3c1c-4d0f-9a57-2f6f3b7c9d10"
name = "alice"

[page]
lang = "ar"
dir = "rtl"
"#,
        store_path
    ))?;

    let config = AppConfig::from_file(file.path())?;
    let runtime = build_runtime(&config).await?;

    let project = runtime.gateway.create_project("alice-token", "Boot", None).await?;
    assert_eq!(project.user_id.to_string(), "6f1b1a5e-3c1c-4d0f-9a57-2f6f3b7c9d10");
    assert!(std::path::Path::new(&store_path).exists());
    assert!(runtime.drift.events().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_missing_hosting_token_is_fatal() -> Result<()> {
    let config = AppConfig::from_toml_str(
        r#"
[hosting]
token = "${VIBE_PUBLISH_TEST_UNSET_TOKEN}"

[store]
backend = "memory"
"#,
    )?;

    let err = build_runtime(&config).await.err();
    assert!(matches!(err, Some(PublishError::ConfigError { .. })));

    let config = AppConfig::from_toml_str("[hosting]\n[store]\nbackend = \"memory\"\n")?;
    let err = build_runtime(&config).await.err();
    assert!(matches!(err, Some(PublishError::ConfigError { .. })));

    Ok(())
}

#[tokio::test]
async fn test_bad_identity_is_rejected() -> Result<()> {
    let config = AppConfig::from_toml_str(
        r#"
[hosting]
token = "tok"

[store]
backend = "memory"

[[identities]]
token = "alice-token"
user_id = "not-a-uuid"
"#,
    )?;

    let err = build_runtime(&config).await.err();
    assert!(matches!(err, Some(PublishError::InvalidConfigValueError { .. })));

    Ok(())
}
