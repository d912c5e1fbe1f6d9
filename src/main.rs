use clap::Parser;
use serde::Serialize;
use vibe_publish::app::bootstrap::{build_runtime, Runtime};
use vibe_publish::config::cli::{Command, DomainCommand, ProjectCommand};
use vibe_publish::config::toml_config::LogFormat;
use vibe_publish::domain::model::ChatMessage;
use vibe_publish::utils::error::ErrorSeverity;
use vibe_publish::utils::logger;
use vibe_publish::{AppConfig, CliConfig, PublishError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 載入 TOML 配置
    let config = match AppConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    let level = config.logging.level.as_deref();
    match config.logging.format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose, level),
        LogFormat::Json => logger::init_json_logger(cli.verbose, level),
    }

    tracing::info!("🚀 Starting vibe-publish");
    tracing::debug!("📁 Configuration loaded from: {}", cli.config);

    let runtime = match build_runtime(&config).await {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(exit_code(&e));
        }
    };

    let credential = cli.credential.clone().unwrap_or_default();
    match run(&runtime, &credential, cli.command).await {
        Ok(output) => {
            println!("{}", output);
            for event in runtime.drift.events() {
                eprintln!(
                    "⚠️  {} may still be attached to '{}' at the hosting provider: {}",
                    event.domain, event.slug, event.error
                );
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let code = exit_code(&e);
            if code > 0 {
                std::process::exit(code);
            }
        }
    }

    Ok(())
}

fn exit_code(e: &PublishError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

async fn run(runtime: &Runtime, credential: &str, command: Command) -> vibe_publish::Result<String> {
    let gateway = &runtime.gateway;
    match command {
        Command::Project(ProjectCommand::Create { name, description }) => {
            to_json(&gateway.create_project(credential, &name, description).await?)
        }
        Command::Project(ProjectCommand::List) => to_json(&gateway.list_projects(credential).await?),
        Command::Project(ProjectCommand::Show { project }) => {
            to_json(&gateway.get_project(credential, project).await?)
        }
        Command::Project(ProjectCommand::Rename { project, name }) => {
            to_json(&gateway.rename_project(credential, project, &name).await?)
        }
        Command::Project(ProjectCommand::Delete { project }) => {
            gateway.delete_project(credential, project).await?;
            Ok(format!("🗑️  Project {} deleted", project))
        }
        Command::Artifact { project, file } => {
            let code = tokio::fs::read_to_string(&file).await?;
            to_json(&gateway.record_artifact(credential, project, code).await?)
        }
        Command::Generate { project, prompt } => {
            let messages: Vec<ChatMessage> = prompt.into_iter().map(ChatMessage::user).collect();
            to_json(&gateway.generate(credential, project, &messages).await?)
        }
        Command::Publish { project } => {
            let outcome = gateway.publish(credential, project).await?;
            tracing::info!("✅ Published {} at {}", outcome.deployment_id, outcome.url);
            to_json(&outcome)
        }
        Command::Deployment { id } => to_json(&gateway.get_deployment(credential, id).await?),
        Command::Deployments { project, live: true } => {
            to_json(&gateway.live_deployment(credential, project).await?)
        }
        Command::Deployments { project, live: false } => {
            to_json(&gateway.list_deployments(credential, project).await?)
        }
        Command::Domain(DomainCommand::Add { project, name }) => {
            to_json(&gateway.add_domain(credential, project, &name).await?)
        }
        Command::Domain(DomainCommand::Verify { domain }) => {
            to_json(&gateway.verify_domain(credential, domain).await?)
        }
        Command::Domain(DomainCommand::Remove { domain }) => {
            gateway.remove_domain(credential, domain).await?;
            Ok(format!("🗑️  Domain {} removed", domain))
        }
        Command::Domain(DomainCommand::List { project }) => {
            to_json(&gateway.list_domains(credential, project).await?)
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> vibe_publish::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
