use crate::domain::model::{DeploymentId, DomainId, ProjectId};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "vibe-publish")]
#[command(about = "Publish generated apps and manage their custom domains")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "vibe-publish.toml")]
    pub config: String,

    /// Caller credential (bearer token)
    #[arg(long, env = "VIBE_CREDENTIAL", hide_env_values = true)]
    pub credential: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create, list, rename or delete projects
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Store code from a file as the project's newest artifact
    Artifact {
        #[arg(long)]
        project: ProjectId,
        #[arg(long)]
        file: PathBuf,
    },

    /// Ask the configured code producer for a new artifact
    Generate {
        #[arg(long)]
        project: ProjectId,
        /// One user message per occurrence, in order
        #[arg(long, required = true)]
        prompt: Vec<String>,
    },

    /// Publish the newest artifact to the hosting provider
    Publish {
        #[arg(long)]
        project: ProjectId,
    },

    /// Show one deployment record
    Deployment {
        #[arg(long)]
        id: DeploymentId,
    },

    /// Show publish history
    Deployments {
        #[arg(long)]
        project: ProjectId,
        /// Only show the live deployment
        #[arg(long)]
        live: bool,
    },

    /// Attach, verify or detach custom domains
    #[command(subcommand)]
    Domain(DomainCommand),
}

#[derive(Debug, Clone, Subcommand)]
pub enum ProjectCommand {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    List,
    Show {
        #[arg(long)]
        project: ProjectId,
    },
    Rename {
        #[arg(long)]
        project: ProjectId,
        #[arg(long)]
        name: String,
    },
    Delete {
        #[arg(long)]
        project: ProjectId,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum DomainCommand {
    Add {
        #[arg(long)]
        project: ProjectId,
        #[arg(long)]
        name: String,
    },
    Verify {
        #[arg(long)]
        domain: DomainId,
    },
    Remove {
        #[arg(long)]
        domain: DomainId,
    },
    List {
        #[arg(long)]
        project: ProjectId,
    },
}
