//! The request executor.
//!
//! [`ServiceClient`] performs exactly one HTTP round trip per call and
//! classifies the outcome as a success, an [`ApiError`], or a transport /
//! decode failure. Nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;
use validator::Validate;

use crate::config::ClientConfig;
use crate::error::{ApiError, Error, Result};
use crate::ids::TeamId;
use crate::query::{with_team_id, QueryParams};

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://api.vercel.com";

/// Default total request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const JSON: &str = "application/json";

/// A single request: method, fully formed URL, optional JSON body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Target URL, team scoping already applied
    pub url: Url,
    /// Pre-serialised JSON body
    pub body: Option<String>,
    /// Surface a 204 response as an error instead of an empty success
    pub error_on_no_content: bool,
}

impl ApiRequest {
    /// Create a request without a body.
    #[must_use]
    pub const fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
            error_on_no_content: false,
        }
    }

    /// GET request.
    #[must_use]
    pub const fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// POST request.
    #[must_use]
    pub const fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    /// PATCH request.
    #[must_use]
    pub const fn patch(url: Url) -> Self {
        Self::new(Method::PATCH, url)
    }

    /// PUT request.
    #[must_use]
    pub const fn put(url: Url) -> Self {
        Self::new(Method::PUT, url)
    }

    /// DELETE request.
    #[must_use]
    pub const fn delete(url: Url) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Attach a pre-serialised JSON body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialise `payload` and attach it as the body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if `payload` cannot be serialised.
    pub fn with_json<T>(self, payload: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_string(payload)?;
        Ok(self.with_body(body))
    }

    /// Treat a 204 response as [`Error::is_no_content`] rather than success.
    #[must_use]
    pub fn error_on_no_content(mut self, strict: bool) -> Self {
        self.error_on_no_content = strict;
        self
    }
}

/// A successful response, fully read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// Response status (always 2xx)
    pub status: StatusCode,
    /// Raw response body
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Decode the body as JSON. An empty body decodes as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return serde_json::from_str("null").map_err(Error::from);
        }
        serde_json::from_slice(&self.body).map_err(Error::from)
    }
}

/// Builder for [`ServiceClient`].
#[derive(Debug, Clone)]
pub struct ServiceClientBuilder {
    base_url: Option<Url>,
    token: Arc<SecretString>,
    team_id: Option<TeamId>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl ServiceClientBuilder {
    /// Create a builder for the default API URL.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: None,
            token: Arc::new(SecretString::from(token.into())),
            team_id: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
        }
    }

    /// Create a builder from a [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] if the config fails validation
    /// (timeout out of range, malformed URL), or [`Error::ConfigError`] if
    /// the token is missing.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let token = config
            .api_token
            .clone()
            .ok_or_else(|| Error::ConfigError("API token is not set".to_string()))?;

        let mut builder = Self::new(token)
            .with_base_url(&config.api_url)?
            .with_timeout(config.timeout());
        if let Some(team_id) = config.team_id.as_deref().filter(|id| !id.is_empty()) {
            builder = builder.with_team_id(team_id);
        }
        Ok(builder)
    }

    /// Override the API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the URL cannot be parsed.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self> {
        let url = Url::parse(base_url.as_ref()).map_err(|err| {
            Error::InvalidEndpoint(format!("Invalid base URL `{}`: {err}", base_url.as_ref()))
        })?;
        self.base_url = Some(normalize_base(url));
        Ok(self)
    }

    /// Scope requests to this team unless a call overrides it.
    #[must_use]
    pub fn with_team_id(mut self, team_id: impl Into<TeamId>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    /// Override the total request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the client. The HTTP transport is created here, once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the transport cannot be built.
    pub fn build(self) -> Result<ServiceClient> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => normalize_base(Url::parse(DEFAULT_API_URL)?),
        };

        let mut builder = ClientBuilder::new().timeout(self.timeout);
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        let http = builder
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        Ok(ServiceClient {
            http,
            base_url,
            token: self.token,
            team_id: self.team_id,
        })
    }
}

/// Asynchronous request executor shared by every resource call.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: Client,
    base_url: Url,
    token: Arc<SecretString>,
    team_id: Option<TeamId>,
}

impl ServiceClient {
    /// Start a builder for the given token.
    #[must_use]
    pub fn builder(token: impl Into<String>) -> ServiceClientBuilder {
        ServiceClientBuilder::new(token)
    }

    /// Return the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Return the default team, if one was configured.
    #[must_use]
    pub const fn team_id(&self) -> Option<&TeamId> {
        self.team_id.as_ref()
    }

    /// Replace the default team. The transport is shared with `self`.
    #[must_use]
    pub fn with_team_id(mut self, team_id: impl Into<TeamId>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    /// Resolve the team a call is scoped to: a non-empty explicit id wins,
    /// otherwise the client default.
    #[must_use]
    pub fn effective_team_id<'a>(&'a self, explicit: Option<&'a str>) -> Option<&'a str> {
        explicit
            .filter(|id| !id.is_empty())
            .or_else(|| self.team_id.as_ref().map(TeamId::as_str))
    }

    /// Build a team-scoped URL for `path` relative to the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the path cannot be joined.
    pub fn endpoint(&self, path: &str, team_id: Option<&str>, params: &QueryParams) -> Result<Url> {
        let url = self.unscoped_endpoint(path, params)?;
        Ok(with_team_id(url, self.effective_team_id(team_id)))
    }

    /// Build a URL for `path` without any team scoping.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the path cannot be joined.
    pub fn unscoped_endpoint(&self, path: &str, params: &QueryParams) -> Result<Url> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid API path `{path}`: {err}")))?;
        params.apply(&mut url);
        Ok(url)
    }

    /// Perform one round trip and classify the response.
    ///
    /// Any 2xx status is success, including 201 and 204; only a status
    /// outside 200..=299 becomes [`Error::Api`].
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] / [`Error::Transport`] if no response arrived.
    /// - [`Error::Api`] for any non-2xx status, or a 204 when the request
    ///   set [`ApiRequest::error_on_no_content`].
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let ApiRequest {
            method,
            url,
            body,
            error_on_no_content,
        } = request;

        debug!(method = %method, url = %url, "Sending API request");

        let mut builder = self
            .http
            .request(method.clone(), url.clone())
            .bearer_auth(self.token.expose_secret())
            .header(ACCEPT, JSON);
        if let Some(body) = body {
            builder = builder.header(CONTENT_TYPE, JSON).body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let error = ApiError::parse(status.as_u16(), &bytes).unwrap_or_else(|err| {
                warn!(
                    method = %method,
                    url = %url,
                    status = status.as_u16(),
                    error = %err,
                    "API error response is not a valid error envelope"
                );
                ApiError::unstructured(status.as_u16(), &bytes)
            });
            debug!(
                method = %method,
                url = %url,
                status = error.status_code,
                code = %error.code,
                "API request failed"
            );
            return Err(Error::Api(error));
        }

        if status == StatusCode::NO_CONTENT && error_on_no_content {
            debug!(method = %method, url = %url, "API returned no content");
            return Err(Error::Api(ApiError::no_content()));
        }

        Ok(ApiResponse {
            status,
            body: bytes.to_vec(),
        })
    }

    /// Perform one round trip and decode the body into `R`.
    ///
    /// # Errors
    ///
    /// Everything [`ServiceClient::execute`] returns, plus [`Error::Decode`]
    /// if a success body does not match `R`.
    pub async fn execute_json<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R> {
        self.execute(request).await?.json()
    }

    /// Perform one round trip without decoding the body.
    ///
    /// # Errors
    ///
    /// Everything [`ServiceClient::execute`] returns.
    pub async fn execute_unit(&self, request: ApiRequest) -> Result<()> {
        self.execute(request).await.map(|_| ())
    }
}

fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Thing {
        id: String,
    }

    fn test_client(server: &MockServer) -> ServiceClient {
        ServiceClient::builder("test-token")
            .with_base_url(server.uri())
            .unwrap()
            .build()
            .unwrap()
    }

    fn get(client: &ServiceClient, path: &str) -> ApiRequest {
        ApiRequest::get(client.endpoint(path, None, &QueryParams::new()).unwrap())
    }

    #[test]
    fn endpoint_joins_path_and_team() {
        let client = ServiceClient::builder("t")
            .with_team_id("team_default")
            .build()
            .unwrap();

        let url = client
            .endpoint("/v9/projects/prj_1", None, &QueryParams::new())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.vercel.com/v9/projects/prj_1?teamId=team_default"
        );

        let url = client
            .endpoint(
                "v9/projects/prj_1/env",
                Some("team_other"),
                &QueryParams::new().with("decrypt", true),
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.vercel.com/v9/projects/prj_1/env?decrypt=true&teamId=team_other"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let client = ServiceClient::builder("t")
            .with_base_url("http://localhost:8080/proxy")
            .unwrap()
            .build()
            .unwrap();
        let url = client.endpoint("v1/drains", None, &QueryParams::new()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/proxy/v1/drains");
    }

    #[test]
    fn effective_team_prefers_explicit_non_empty() {
        let client = ServiceClient::builder("t")
            .with_team_id("team_default")
            .build()
            .unwrap();
        assert_eq!(client.effective_team_id(Some("team_x")), Some("team_x"));
        assert_eq!(client.effective_team_id(Some("")), Some("team_default"));
        assert_eq!(client.effective_team_id(None), Some("team_default"));

        let client = ServiceClient::builder("t").build().unwrap();
        assert_eq!(client.effective_team_id(None), None);
    }

    #[test]
    fn from_config_requires_token() {
        let err = ServiceClientBuilder::from_config(&ClientConfig::default()).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));

        let config = ClientConfig::new("t")
            .with_api_url("http://localhost:3000")
            .with_team_id("team_1");
        let client = ServiceClientBuilder::from_config(&config)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:3000/");
        assert_eq!(client.team_id().map(TeamId::as_str), Some("team_1"));
    }

    #[test]
    fn from_config_validates_config() {
        let err = ServiceClientBuilder::from_config(&ClientConfig::new("t").with_timeout(0))
            .unwrap_err();
        assert!(matches!(err, Error::ValidationError(_)), "got {err:?}");

        let err = ServiceClientBuilder::from_config(&ClientConfig::new("t").with_timeout(601))
            .unwrap_err();
        assert!(matches!(err, Error::ValidationError(_)));

        let err = ServiceClientBuilder::from_config(&ClientConfig::new("t").with_api_url("nope"))
            .unwrap_err();
        assert!(matches!(err, Error::ValidationError(_)));
    }

    #[test]
    fn with_team_id_replaces_default_team() {
        let client = ServiceClient::builder("t")
            .with_team_id("team_old")
            .build()
            .unwrap()
            .with_team_id("team_new");
        assert_eq!(client.effective_team_id(None), Some("team_new"));
    }

    #[tokio::test]
    async fn sends_bearer_token_and_decodes_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/things/abc"))
            .and(header("authorization", "Bearer test-token"))
            .and(header("accept", "application/json"))
            .and(query_param_is_missing("teamId"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "abc"})))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let thing: Thing = client
            .execute_json(get(&client, "v1/things/abc"))
            .await
            .unwrap();
        assert_eq!(thing, Thing { id: "abc".into() });
    }

    #[tokio::test]
    async fn scopes_request_to_team() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/things/abc"))
            .and(query_param("teamId", "team_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "abc"})))
            .mount(&server)
            .await;

        let client = ServiceClient::builder("test-token")
            .with_base_url(server.uri())
            .unwrap()
            .with_team_id("team_1")
            .build()
            .unwrap();
        let thing: Thing = client
            .execute_json(get(&client, "v1/things/abc"))
            .await
            .unwrap();
        assert_eq!(thing.id, "abc");
    }

    #[tokio::test]
    async fn sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/things"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"name": "demo"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "new"})))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let url = client.endpoint("v1/things", None, &QueryParams::new()).unwrap();
        let request = ApiRequest::post(url)
            .with_json(&json!({"name": "demo"}))
            .unwrap();
        let thing: Thing = client.execute_json(request).await.unwrap();
        assert_eq!(thing.id, "new");
    }

    #[tokio::test]
    async fn non_success_becomes_api_error_with_raw_body() {
        let server = MockServer::start().await;
        let body = r#"{"error":{"code":"not_found","message":"no such resource"}}"#;
        Mock::given(method("GET"))
            .and(path("/v1/things/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_raw(body, "application/json"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .execute_json::<Thing>(get(&client, "v1/things/missing"))
            .await
            .unwrap_err();

        assert!(crate::error::not_found(&err));
        let api = err.api_error().unwrap();
        assert_eq!(api.status_code, 404);
        assert_eq!(api.code, "not_found");
        assert_eq!(api.message, "no such resource");
        assert_eq!(api.raw_message, body.as_bytes());
    }

    #[tokio::test]
    async fn unit_request_still_observes_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/things/abc"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": "forbidden", "message": "Not authorized"}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let url = client.endpoint("v1/things/abc", None, &QueryParams::new()).unwrap();
        let err = client.execute_unit(ApiRequest::delete(url)).await.unwrap_err();
        assert_eq!(err.status_code(), Some(403));
        assert_eq!(err.api_error().unwrap().code, "forbidden");
    }

    #[tokio::test]
    async fn malformed_error_body_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/things/abc"))
            .respond_with(ResponseTemplate::new(502).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .execute_unit(get(&client, "v1/things/abc"))
            .await
            .unwrap_err();
        let api = err.api_error().unwrap();
        assert_eq!(api.status_code, 502);
        assert!(api.code.is_empty());
        assert_eq!(api.message, "upstream exploded");
        assert_eq!(api.raw_message, b"upstream exploded");
    }

    #[tokio::test]
    async fn unit_request_skips_decoding() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/things/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        client
            .execute_unit(get(&client, "v1/things/abc"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn malformed_success_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/things/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"id\":"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .execute_json::<Thing>(get(&client, "v1/things/abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert!(err.api_error().is_none());
    }

    #[tokio::test]
    async fn no_content_is_success_unless_strict() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/things/abc/schema"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = test_client(&server);

        client
            .execute_unit(get(&client, "v1/things/abc/schema"))
            .await
            .unwrap();

        let decoded: Option<Thing> = client
            .execute_json(get(&client, "v1/things/abc/schema"))
            .await
            .unwrap();
        assert!(decoded.is_none());

        let err = client
            .execute_json::<Thing>(get(&client, "v1/things/abc/schema").error_on_no_content(true))
            .await
            .unwrap_err();
        assert!(err.is_no_content());
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn strict_flag_does_not_mask_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/things/abc/schema"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "not_found", "message": "Edge Config not found"}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .execute_unit(get(&client, "v1/things/abc/schema").error_on_no_content(true))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(!err.is_no_content());
    }

    #[tokio::test]
    async fn timeout_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": "slow"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = ServiceClient::builder("test-token")
            .with_base_url(server.uri())
            .unwrap()
            .with_timeout(Duration::from_millis(100))
            .build()
            .unwrap();

        let err = client
            .execute_json::<Thing>(get(&client, "v1/slow"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }

    #[tokio::test]
    async fn connection_failure_is_transport_error() {
        let client = ServiceClient::builder("test-token")
            .with_base_url("http://127.0.0.1:1")
            .unwrap()
            .build()
            .unwrap();

        let err = client
            .execute_unit(get(&client, "v1/things"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(err.status_code().is_none());
    }
}
