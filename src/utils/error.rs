use thiserror::Error;

/// Failure of a call against a remote API (hosting provider or code producer).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} '{key}' already exists")]
    Conflict { entity: &'static str, key: String },

    #[error("store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt store: {message}")]
    Corrupt { message: String },
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Unauthorized: missing or unknown caller credential")]
    Unauthorized,

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Project {project_id} has no generated code to publish")]
    NoArtifact { project_id: String },

    #[error("No active deployment found for project {project_id}. Please publish the project first")]
    NoActiveDeployment { project_id: String },

    #[error("Deployment {deployment_id} failed")]
    DeploymentFailed { deployment_id: String },

    #[error("Failed to register domain with hosting provider: {message}")]
    DomainRegistrationFailed { message: String },

    #[error("Hosting provider error: {0}")]
    ProviderError(#[from] ProviderError),

    #[error("Code generation failed: {message}")]
    GenerationFailed { message: String },

    #[error("{entity} '{key}' is already in use")]
    Conflict { entity: &'static str, key: String },

    #[error("Invalid state transition: {message}")]
    InvalidTransition { message: String },

    #[error("Record store error: {0}")]
    StoreError(StoreError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

impl From<StoreError> for PublishError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { entity, key } => PublishError::Conflict { entity, key },
            other => PublishError::StoreError(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authorization,
    NotFound,
    Precondition,
    Provider,
    Storage,
    Configuration,
    Validation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PublishError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PublishError::Unauthorized => ErrorCategory::Authorization,
            PublishError::NotFound { .. } => ErrorCategory::NotFound,
            PublishError::NoArtifact { .. }
            | PublishError::NoActiveDeployment { .. }
            | PublishError::Conflict { .. }
            | PublishError::InvalidTransition { .. } => ErrorCategory::Precondition,
            PublishError::DeploymentFailed { .. }
            | PublishError::DomainRegistrationFailed { .. }
            | PublishError::ProviderError(_)
            | PublishError::GenerationFailed { .. } => ErrorCategory::Provider,
            PublishError::StoreError(_)
            | PublishError::IoError(_)
            | PublishError::SerializationError(_) => ErrorCategory::Storage,
            PublishError::ConfigError { .. }
            | PublishError::MissingConfigError { .. }
            | PublishError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            PublishError::ValidationError { .. } => ErrorCategory::Validation,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Provider => ErrorSeverity::Medium,
            ErrorCategory::Storage | ErrorCategory::Configuration => ErrorSeverity::Critical,
            ErrorCategory::Authorization
            | ErrorCategory::NotFound
            | ErrorCategory::Precondition
            | ErrorCategory::Validation => ErrorSeverity::High,
        }
    }

    /// Whether calling the same operation again may succeed without any
    /// change on the caller's side.
    pub fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Provider)
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PublishError::Unauthorized => "You need to sign in to do that.".to_string(),
            PublishError::NotFound { entity, .. } => {
                format!("The requested {} could not be found.", entity)
            }
            PublishError::NoArtifact { .. } => {
                "There is no generated code for this project yet.".to_string()
            }
            PublishError::NoActiveDeployment { .. } => {
                "This project has not been published yet.".to_string()
            }
            PublishError::DeploymentFailed { .. } => {
                "Publishing failed at the hosting provider.".to_string()
            }
            PublishError::DomainRegistrationFailed { message } => {
                format!("The domain could not be added: {}", message)
            }
            PublishError::ProviderError(err) => {
                format!("The hosting provider rejected the request: {}", err)
            }
            PublishError::GenerationFailed { .. } => "Code generation failed.".to_string(),
            PublishError::Conflict { entity, key } => {
                format!("The {} '{}' is already in use.", entity, key)
            }
            PublishError::ValidationError { message } => message.clone(),
            PublishError::ConfigError { .. }
            | PublishError::MissingConfigError { .. }
            | PublishError::InvalidConfigValueError { .. } => {
                format!("The service is misconfigured: {}", self)
            }
            _ => "An internal error occurred.".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            PublishError::Unauthorized => {
                "Provide a valid credential with --credential or VIBE_CREDENTIAL".to_string()
            }
            PublishError::NotFound { .. } => {
                "Check the identifier and that it belongs to your account".to_string()
            }
            PublishError::NoArtifact { .. } => {
                "Generate or add code for the project, then publish again".to_string()
            }
            PublishError::NoActiveDeployment { .. } => {
                "Publish the project successfully before attaching a domain".to_string()
            }
            PublishError::DeploymentFailed { .. } => {
                "Inspect the deployment history for the provider's error, then publish again"
                    .to_string()
            }
            PublishError::DomainRegistrationFailed { .. } => {
                "Check that the domain is not claimed by another hosting account".to_string()
            }
            PublishError::ProviderError(_) => "Try again in a moment".to_string(),
            PublishError::GenerationFailed { .. } => {
                "Try again or rephrase the request".to_string()
            }
            PublishError::Conflict { .. } => "Remove the existing binding first".to_string(),
            PublishError::ValidationError { .. } => "Correct the input and retry".to_string(),
            PublishError::ConfigError { .. }
            | PublishError::MissingConfigError { .. }
            | PublishError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or environment and restart".to_string()
            }
            _ => "Check the logs for details".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PublishError>;
