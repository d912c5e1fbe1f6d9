use crate::config::toml_config::HostingConfig;
use crate::domain::model::VerificationRecord;
use crate::domain::ports::{HostingProvider, RemoteDeployment, RemoteDomain, StaticPage};
use crate::utils::error::{ProviderError, PublishError, Result};
use crate::utils::validation::{validate_secret, validate_url};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.vercel.com";

/// [`HostingProvider`] backed by the Vercel REST API.
///
/// The bearer token is checked once, here; a client never exists without one.
#[derive(Clone)]
pub struct VercelClient {
    client: Client,
    api_base: String,
    token: String,
    team_id: Option<String>,
}

impl std::fmt::Debug for VercelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VercelClient")
            .field("api_base", &self.api_base)
            .field("team_id", &self.team_id)
            .finish_non_exhaustive()
    }
}

impl VercelClient {
    pub fn new(
        api_base: &str,
        token: &str,
        team_id: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        validate_url("hosting.api_base", api_base)?;
        validate_secret("hosting.token", token)?;

        let mut builder = Client::builder().user_agent(concat!("vibe-publish/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| PublishError::ConfigError {
            message: format!("failed to build HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            team_id: team_id.filter(|id| !id.trim().is_empty()),
        })
    }

    pub fn from_config(config: &HostingConfig) -> Result<Self> {
        Self::new(
            config.api_base(),
            config.token.as_deref().unwrap_or_default(),
            config.team_id.clone(),
            config.request_timeout(),
        )
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_base, path);
        tracing::debug!("Hosting provider request: {} {}", method, url);
        let mut request = self.client.request(method, url).bearer_auth(&self.token);
        if let Some(team_id) = &self.team_id {
            request = request.query(&[("teamId", team_id)]);
        }
        request
    }

    fn domain_path(slug: &str, domain: &str) -> String {
        format!("/v9/projects/{}/domains/{}", slug, domain)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateDeploymentBody<'a> {
    name: &'a str,
    files: [&'a StaticPage; 1],
    project_settings: ProjectSettings,
}

#[derive(Serialize)]
struct ProjectSettings {
    framework: Option<String>,
}

#[derive(Serialize)]
struct AddDomainBody<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct DeploymentResponse {
    id: String,
    url: String,
}

#[derive(Deserialize)]
struct DomainResponse {
    name: String,
    #[serde(default)]
    verified: bool,
    #[serde(default)]
    verification: Option<Vec<VerificationRecord>>,
}

impl From<DomainResponse> for RemoteDomain {
    fn from(body: DomainResponse) -> Self {
        RemoteDomain {
            remote_id: body.name,
            verified: body.verified,
            verification: body.verification.unwrap_or_default(),
        }
    }
}

async fn check_status(response: Response) -> std::result::Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Http {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> std::result::Result<T, ProviderError> {
    let text = check_status(response).await?.text().await?;
    serde_json::from_str(&text).map_err(|e| ProviderError::Decode(format!("{}: {}", e, text)))
}

#[async_trait]
impl HostingProvider for VercelClient {
    async fn create_deployment(
        &self,
        slug: &str,
        page: &StaticPage,
    ) -> std::result::Result<RemoteDeployment, ProviderError> {
        let body = CreateDeploymentBody {
            name: slug,
            files: [page],
            project_settings: ProjectSettings { framework: None },
        };
        let response = self
            .request(reqwest::Method::POST, "/v13/deployments")
            .json(&body)
            .send()
            .await?;
        let created: DeploymentResponse = decode(response).await?;
        Ok(RemoteDeployment {
            remote_id: created.id,
            url: created.url,
        })
    }

    async fn add_domain(
        &self,
        slug: &str,
        domain: &str,
    ) -> std::result::Result<RemoteDomain, ProviderError> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/v9/projects/{}/domains", slug),
            )
            .json(&AddDomainBody { name: domain })
            .send()
            .await?;
        let added: DomainResponse = decode(response).await?;
        Ok(added.into())
    }

    async fn get_domain(
        &self,
        slug: &str,
        domain: &str,
    ) -> std::result::Result<RemoteDomain, ProviderError> {
        let response = self
            .request(reqwest::Method::GET, &Self::domain_path(slug, domain))
            .send()
            .await?;
        let current: DomainResponse = decode(response).await?;
        Ok(current.into())
    }

    async fn remove_domain(&self, slug: &str, domain: &str) -> std::result::Result<(), ProviderError> {
        let response = self
            .request(reqwest::Method::DELETE, &Self::domain_path(slug, domain))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}
