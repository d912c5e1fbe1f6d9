use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::utils::error::{PublishError, Result};

macro_rules! record_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = PublishError;

            fn from_str(s: &str) -> Result<Self> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| PublishError::ValidationError {
                        message: format!("'{}' is not a valid {}", s, stringify!($name)),
                    })
            }
        }
    };
}

record_id!(UserId);
record_id!(ProjectId);
record_id!(ArtifactId);
record_id!(DeploymentId);
record_id!(DomainId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(user_id: UserId, name: impl Into<String>, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            user_id,
            name: name.into(),
            description,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.updated_at = Utc::now();
    }
}

/// One immutable snapshot of generated source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeArtifact {
    pub id: ArtifactId,
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

impl CodeArtifact {
    pub fn new(project: &Project, code: impl Into<String>) -> Self {
        Self {
            id: ArtifactId::new(),
            project_id: project.id,
            user_id: project.user_id,
            code: code.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Building,
    Ready,
    Failed,
}

impl DeploymentStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, DeploymentStatus::Building)
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeploymentStatus::Building => "building",
            DeploymentStatus::Ready => "ready",
            DeploymentStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One publish attempt. Only ever moves `building -> ready | failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: DeploymentId,
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub remote_id: Option<String>,
    pub url: Option<String>,
    pub status: DeploymentStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Set when the record reaches a terminal status.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Deployment {
    pub fn building(project: &Project, user_id: UserId) -> Self {
        Self {
            id: DeploymentId::new(),
            project_id: project.id,
            user_id,
            remote_id: None,
            url: None,
            status: DeploymentStatus::Building,
            error_message: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn mark_ready(&mut self, remote_id: impl Into<String>, url: impl Into<String>) -> Result<()> {
        self.ensure_building(DeploymentStatus::Ready)?;
        self.remote_id = Some(remote_id.into());
        self.url = Some(url.into());
        self.status = DeploymentStatus::Ready;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_failed(&mut self, error_message: impl Into<String>) -> Result<()> {
        self.ensure_building(DeploymentStatus::Failed)?;
        self.error_message = Some(error_message.into());
        self.status = DeploymentStatus::Failed;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    fn ensure_building(&self, target: DeploymentStatus) -> Result<()> {
        if self.status.is_terminal() {
            return Err(PublishError::InvalidTransition {
                message: format!(
                    "deployment {} is already {} and cannot become {}",
                    self.id, self.status, target
                ),
            });
        }
        Ok(())
    }

    /// Timestamp used to rank ready deployments when picking the live one.
    pub fn ready_at(&self) -> Option<DateTime<Utc>> {
        match self.status {
            DeploymentStatus::Ready => Some(self.completed_at.unwrap_or(self.created_at)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    Pending,
    Active,
}

impl fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainStatus::Pending => f.write_str("pending"),
            DomainStatus::Active => f.write_str("active"),
        }
    }
}

/// A custom hostname bound to a project.
///
/// `ssl_enabled` is only ever true while `status` is `Active`; both are
/// written together by [`Domain::reconcile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub id: DomainId,
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub name: String,
    pub remote_id: String,
    pub verification_token: Option<String>,
    pub status: DomainStatus,
    pub ssl_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl Domain {
    pub fn pending(
        project: &Project,
        user_id: UserId,
        name: impl Into<String>,
        remote_id: impl Into<String>,
        verification_token: Option<String>,
    ) -> Self {
        Self {
            id: DomainId::new(),
            project_id: project.id,
            user_id,
            name: name.into(),
            remote_id: remote_id.into(),
            verification_token,
            status: DomainStatus::Pending,
            ssl_enabled: false,
            created_at: Utc::now(),
            verified_at: None,
        }
    }

    /// Applies the remote verification state. Returns true when the local
    /// record changed and must be written back.
    ///
    /// An active domain stays active even if the provider stops reporting it
    /// as verified; there is no deactivation path.
    pub fn reconcile(&mut self, remote_verified: bool) -> bool {
        match (self.status, remote_verified) {
            (DomainStatus::Pending, true) => {
                self.status = DomainStatus::Active;
                self.ssl_enabled = true;
                self.verified_at = Some(Utc::now());
                true
            }
            (DomainStatus::Pending, false) => {
                let changed = self.ssl_enabled;
                self.ssl_enabled = false;
                changed
            }
            (DomainStatus::Active, _) => {
                let changed = !self.ssl_enabled;
                self.ssl_enabled = true;
                changed
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == DomainStatus::Active
    }
}

/// A DNS record the user must create before the provider verifies the domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub domain: String,
    pub value: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub deployment_id: DeploymentId,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddDomainOutcome {
    pub domain: Domain,
    pub verification: Vec<VerificationRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyOutcome {
    pub verified: bool,
    pub domain: Domain,
    /// Records the provider still expects; empty once verified.
    pub verification: Vec<VerificationRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}
