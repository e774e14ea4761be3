//! Asynchronous Vercel API client.
//!
//! Resource operations live in their own modules as further `impl
//! VercelClient` blocks; this module holds construction and the shared
//! send helpers they call.

use crate::teams::is_team_id;
use crate::Result;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;
use vercel_core::client::{ApiRequest, ServiceClient, ServiceClientBuilder};
use vercel_core::config::ClientConfig;
use vercel_core::ids::{validate_id, TeamId};
use vercel_core::query::QueryParams;
use vercel_core::Error;

const USER_AGENT: &str = concat!("vercel-api-rust/", env!("CARGO_PKG_VERSION"));

/// Builder for [`VercelClient`].
#[derive(Debug, Clone)]
pub struct VercelClientBuilder {
    inner: ServiceClientBuilder,
}

impl VercelClientBuilder {
    /// Create a builder for the given API token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            inner: ServiceClientBuilder::new(token).with_user_agent(USER_AGENT),
        }
    }

    /// Create a builder from a [`ClientConfig`].
    ///
    /// The configured team must be an id (`team_...`). Use
    /// [`VercelClient::from_config_resolved`] when it may be a slug.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        if let Some(team) = config.team_id.as_deref().filter(|t| !t.is_empty()) {
            if !is_team_id(team) {
                return Err(Error::ConfigError(format!(
                    "Team `{team}` is a slug; resolve it with VercelClient::from_config_resolved"
                )));
            }
        }
        let inner = ServiceClientBuilder::from_config(config)?.with_user_agent(USER_AGENT);
        Ok(Self { inner })
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self> {
        self.inner = self.inner.with_base_url(base_url)?;
        Ok(self)
    }

    /// Scope every request to a team unless a call passes its own.
    #[must_use]
    pub fn with_team_id(mut self, team_id: impl Into<TeamId>) -> Self {
        self.inner = self.inner.with_team_id(team_id);
        self
    }

    /// Override the total request timeout (defaults to 120 seconds).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.with_timeout(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<VercelClient> {
        let inner = self.inner.build()?;
        Ok(VercelClient { inner })
    }
}

/// Asynchronous Vercel API client.
///
/// Every operation takes an optional `team_id`; a non-empty value overrides
/// the team configured on the client.
#[derive(Debug, Clone)]
pub struct VercelClient {
    inner: ServiceClient,
}

impl VercelClient {
    /// Construct a client for the default API URL.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        VercelClientBuilder::new(token).build()
    }

    /// Construct a client from configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        VercelClientBuilder::from_config(config)?.build()
    }

    /// Construct a client from configuration whose team may be a slug.
    ///
    /// A slug is looked up once with [`VercelClient::resolve_team_id`] and
    /// the resulting id becomes the client's default team.
    pub async fn from_config_resolved(config: &ClientConfig) -> Result<Self> {
        let team = config.team_id.as_deref().filter(|t| !t.is_empty());
        let Some(slug) = team.filter(|t| !is_team_id(t)) else {
            return Self::from_config(config);
        };

        let unscoped = ClientConfig {
            team_id: None,
            ..config.clone()
        };
        let client = Self::from_config(&unscoped)?;
        let team_id = client.resolve_team_id(slug).await?;
        debug!(slug = %slug, team_id = %team_id, "Resolved configured team");
        Ok(Self {
            inner: client.inner.with_team_id(team_id),
        })
    }

    /// Start a builder.
    #[must_use]
    pub fn builder(token: impl Into<String>) -> VercelClientBuilder {
        VercelClientBuilder::new(token)
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// Return the default team, if any.
    #[must_use]
    pub fn team_id(&self) -> Option<&TeamId> {
        self.inner.team_id()
    }

    /// Access the underlying request executor.
    #[must_use]
    pub fn executor(&self) -> &ServiceClient {
        &self.inner
    }

    pub(crate) fn url(&self, path: &str, team_id: Option<&str>) -> Result<Url> {
        self.inner.endpoint(path, team_id, &QueryParams::new())
    }

    pub(crate) fn url_with(
        &self,
        path: &str,
        team_id: Option<&str>,
        params: &QueryParams,
    ) -> Result<Url> {
        self.inner.endpoint(path, team_id, params)
    }

    pub(crate) async fn get_json<R>(&self, path: &str, team_id: Option<&str>) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let url = self.url(path, team_id)?;
        self.inner.execute_json(ApiRequest::get(url)).await
    }

    // Account-level lookups that must not carry a `teamId`.
    pub(crate) async fn get_json_unscoped<R>(&self, path: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let url = self.inner.unscoped_endpoint(path, &QueryParams::new())?;
        self.inner.execute_json(ApiRequest::get(url)).await
    }

    pub(crate) async fn send_json<B, R>(
        &self,
        method: Method,
        path: &str,
        team_id: Option<&str>,
        body: &B,
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path, team_id)?;
        let request = ApiRequest::new(method, url).with_json(body)?;
        self.inner.execute_json(request).await
    }

    pub(crate) async fn send_unit(
        &self,
        method: Method,
        path: &str,
        team_id: Option<&str>,
    ) -> Result<()> {
        let url = self.url(path, team_id)?;
        self.inner.execute_unit(ApiRequest::new(method, url)).await
    }

    pub(crate) async fn execute_json<R>(&self, request: ApiRequest) -> Result<R>
    where
        R: DeserializeOwned,
    {
        self.inner.execute_json(request).await
    }
}

/// Check a caller-supplied id, name or slug before it becomes a path segment.
pub(crate) fn segment<S>(value: &S) -> Result<&str>
where
    S: AsRef<str> + ?Sized,
{
    validate_id(value.as_ref())
}
