//! Project environment variables.
//!
//! Creating a variable whose key already exists for an overlapping target
//! (and git branch) is rejected with a specific error code. That case is
//! surfaced as an [`EnvironmentVariableConflict`] so callers can import the
//! existing variable instead of failing.

use crate::client::{segment, VercelClient};
use crate::Result;
use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use vercel_core::client::ApiRequest;
use vercel_core::ids::{EnvironmentVariableId, ProjectId};
use vercel_core::query::QueryParams;
use vercel_core::Error;

/// Error codes the API uses for a duplicate key/target combination.
pub const CONFLICT_CODES: &[&str] = &["existing_key_and_target", "ENV_ALREADY_EXISTS"];

/// Deployment environment a variable applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentTarget {
    /// Production deployments
    Production,
    /// Preview deployments
    Preview,
    /// Local development (`vercel env pull`)
    Development,
}

/// How a variable's value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentVariableType {
    /// Stored and returned in plain text
    Plain,
    /// Reference to a legacy secret
    Secret,
    /// Encrypted at rest, decryptable by readers
    Encrypted,
    /// Write-only; never returned
    Sensitive,
    /// Provided by the platform
    System,
}

/// An environment variable as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentVariable {
    /// Variable id.
    pub id: EnvironmentVariableId,
    /// Variable name.
    pub key: String,
    /// Value; empty for sensitive variables.
    #[serde(default)]
    pub value: String,
    /// Targets the variable applies to.
    #[serde(default)]
    pub target: Vec<EnvironmentTarget>,
    /// Storage type.
    #[serde(rename = "type")]
    pub kind: EnvironmentVariableType,
    /// Restrict a preview variable to one branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    /// Free-form comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Whether `value` was decrypted in this response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decrypted: Option<bool>,
    /// Creation timestamp.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request payload for creating an environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnvironmentVariableRequest {
    /// Variable name.
    pub key: String,
    /// Variable value.
    pub value: String,
    /// Targets the variable applies to.
    pub target: Vec<EnvironmentTarget>,
    /// Storage type.
    #[serde(rename = "type")]
    pub kind: EnvironmentVariableType,
    /// Restrict a preview variable to one branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    /// Free-form comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Request payload for updating an environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEnvironmentVariableRequest {
    /// New value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// New targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Vec<EnvironmentTarget>>,
    /// New storage type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<EnvironmentVariableType>,
    /// New branch restriction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    /// New comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedEnvironmentVariable {
    created: EnvironmentVariable,
}

#[derive(Debug, Deserialize)]
struct EnvironmentVariableList {
    envs: Vec<EnvironmentVariable>,
}

/// A create call rejected because the key already exists for the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentVariableConflict {
    /// HTTP status of the rejection (409 or 403).
    pub status_code: u16,
    /// Error code reported by the API.
    pub code: String,
    /// Error message reported by the API.
    pub message: String,
    /// Conflicting key, when reported.
    pub key: Option<String>,
    /// Targets of the existing variable, when reported.
    pub target: Vec<String>,
    /// Git branch of the existing variable, when reported.
    pub git_branch: Option<String>,
    /// Id of the existing variable, when reported.
    pub env_var_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConflictEnvelope {
    error: ConflictDetail,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConflictDetail {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    target: Option<ConflictTarget>,
    #[serde(default)]
    git_branch: Option<String>,
    #[serde(default)]
    env_var_id: Option<String>,
}

// The API reports the target as either one name or a list of names.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ConflictTarget {
    One(String),
    Many(Vec<String>),
}

impl From<ConflictTarget> for Vec<String> {
    fn from(target: ConflictTarget) -> Self {
        match target {
            ConflictTarget::One(target) => vec![target],
            ConflictTarget::Many(targets) => targets,
        }
    }
}

impl EnvironmentVariableConflict {
    /// Classify `err` as a duplicate key/target conflict.
    ///
    /// Returns `None` for every other error, including 409s with any other
    /// code.
    #[must_use]
    pub fn from_error(err: &Error) -> Option<Self> {
        let api = err.api_error()?;
        let status_matches = api.status_code == StatusCode::CONFLICT.as_u16()
            || api.status_code == StatusCode::FORBIDDEN.as_u16();
        if !status_matches || !CONFLICT_CODES.contains(&api.code.as_str()) {
            return None;
        }

        let detail = api.parse_raw::<ConflictEnvelope>().ok().map(|e| e.error);
        let (key, target, git_branch, env_var_id) = match detail {
            Some(d) => (
                d.key,
                d.target.map(Vec::from).unwrap_or_default(),
                d.git_branch,
                d.env_var_id,
            ),
            None => (None, Vec::new(), None, None),
        };

        Some(Self {
            status_code: api.status_code,
            code: api.code.clone(),
            message: api.message.clone(),
            key,
            target,
            git_branch,
            env_var_id,
        })
    }
}

impl VercelClient {
    /// Create an environment variable on a project.
    ///
    /// Use [`EnvironmentVariableConflict::from_error`] on the returned error
    /// to detect a duplicate key/target.
    pub async fn create_environment_variable(
        &self,
        project_id: &ProjectId,
        request: &CreateEnvironmentVariableRequest,
        team_id: Option<&str>,
    ) -> Result<EnvironmentVariable> {
        let path = format!("v10/projects/{}/env", segment(project_id)?);
        let response: CreatedEnvironmentVariable =
            self.send_json(Method::POST, &path, team_id, request).await?;
        Ok(response.created)
    }

    /// List a project's environment variables with values decrypted.
    pub async fn list_environment_variables(
        &self,
        project_id: &ProjectId,
        team_id: Option<&str>,
    ) -> Result<Vec<EnvironmentVariable>> {
        let path = format!("v9/projects/{}/env", segment(project_id)?);
        let url = self.url_with(&path, team_id, &QueryParams::new().with("decrypt", true))?;
        let response: EnvironmentVariableList = self.execute_json(ApiRequest::get(url)).await?;
        Ok(response.envs)
    }

    /// Fetch a single environment variable (decrypted).
    pub async fn get_environment_variable(
        &self,
        project_id: &ProjectId,
        env_id: &EnvironmentVariableId,
        team_id: Option<&str>,
    ) -> Result<EnvironmentVariable> {
        let path = format!("v1/projects/{}/env/{}", segment(project_id)?, segment(env_id)?);
        self.get_json(&path, team_id).await
    }

    /// Update an environment variable.
    pub async fn update_environment_variable(
        &self,
        project_id: &ProjectId,
        env_id: &EnvironmentVariableId,
        request: &UpdateEnvironmentVariableRequest,
        team_id: Option<&str>,
    ) -> Result<EnvironmentVariable> {
        let path = format!("v9/projects/{}/env/{}", segment(project_id)?, segment(env_id)?);
        self.send_json(Method::PATCH, &path, team_id, request).await
    }

    /// Delete an environment variable.
    pub async fn delete_environment_variable(
        &self,
        project_id: &ProjectId,
        env_id: &EnvironmentVariableId,
        team_id: Option<&str>,
    ) -> Result<()> {
        let path = format!("v9/projects/{}/env/{}", segment(project_id)?, segment(env_id)?);
        self.send_unit(Method::DELETE, &path, team_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::client;
    use serde_json::json;
    use vercel_core::ApiError;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn env_json() -> serde_json::Value {
        json!({
            "id": "env_1",
            "key": "API_URL",
            "value": "https://example.com",
            "target": ["production", "preview"],
            "type": "encrypted",
            "createdAt": 1_700_000_000_000_i64
        })
    }

    fn create_request() -> CreateEnvironmentVariableRequest {
        CreateEnvironmentVariableRequest {
            key: "API_URL".into(),
            value: "https://example.com".into(),
            target: vec![EnvironmentTarget::Production, EnvironmentTarget::Preview],
            kind: EnvironmentVariableType::Encrypted,
            git_branch: None,
            comment: None,
        }
    }

    fn api_error(status: u16, body: serde_json::Value) -> Error {
        Error::from(ApiError::from_response(
            status,
            &serde_json::to_vec(&body).unwrap(),
        ))
    }

    #[tokio::test]
    async fn create_environment_variable_returns_created() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v10/projects/prj_1/env"))
            .and(body_json(json!({
                "key": "API_URL",
                "value": "https://example.com",
                "target": ["production", "preview"],
                "type": "encrypted"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"created": env_json()})))
            .mount(&server)
            .await;

        let env = client(&server)
            .create_environment_variable(&ProjectId::new("prj_1"), &create_request(), None)
            .await
            .unwrap();
        assert_eq!(env.id, EnvironmentVariableId::new("env_1"));
        assert_eq!(env.kind, EnvironmentVariableType::Encrypted);
        assert_eq!(env.target.len(), 2);
    }

    #[tokio::test]
    async fn create_environment_variable_conflict_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v10/projects/prj_1/env"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error": {
                    "code": "existing_key_and_target",
                    "message": "A variable with the name `API_URL` already exists",
                    "key": "API_URL",
                    "target": ["production"],
                    "gitBranch": null,
                    "envVarId": "env_existing"
                }
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .create_environment_variable(&ProjectId::new("prj_1"), &create_request(), None)
            .await
            .unwrap_err();

        let conflict = EnvironmentVariableConflict::from_error(&err).unwrap();
        assert_eq!(conflict.status_code, 409);
        assert_eq!(conflict.key.as_deref(), Some("API_URL"));
        assert_eq!(conflict.target, vec!["production".to_string()]);
        assert_eq!(conflict.env_var_id.as_deref(), Some("env_existing"));
        assert!(conflict.git_branch.is_none());
    }

    #[test]
    fn other_conflicts_are_not_env_conflicts() {
        let err = api_error(
            409,
            json!({"error": {"code": "conflict", "message": "Project is being deleted"}}),
        );
        assert!(EnvironmentVariableConflict::from_error(&err).is_none());

        let err = api_error(
            400,
            json!({"error": {"code": "existing_key_and_target", "message": "odd"}}),
        );
        assert!(EnvironmentVariableConflict::from_error(&err).is_none());

        let err = Error::Transport("connection reset".into());
        assert!(EnvironmentVariableConflict::from_error(&err).is_none());
    }

    #[test]
    fn forbidden_with_conflict_code_is_classified() {
        let err = api_error(
            403,
            json!({"error": {
                "code": "ENV_ALREADY_EXISTS",
                "message": "exists",
                "key": "TOKEN",
                "target": "preview",
                "gitBranch": "staging"
            }}),
        );
        let conflict = EnvironmentVariableConflict::from_error(&err).unwrap();
        assert_eq!(conflict.target, vec!["preview".to_string()]);
        assert_eq!(conflict.git_branch.as_deref(), Some("staging"));
    }

    #[tokio::test]
    async fn list_environment_variables_requests_decryption() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v9/projects/prj_1/env"))
            .and(query_param("decrypt", "true"))
            .and(query_param("teamId", "team_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"envs": [env_json()]})))
            .mount(&server)
            .await;

        let envs = client(&server)
            .list_environment_variables(&ProjectId::new("prj_1"), Some("team_1"))
            .await
            .unwrap();
        assert_eq!(envs.len(), 1);
        assert_eq!(envs[0].key, "API_URL");
    }

    #[tokio::test]
    async fn update_environment_variable_sends_patch() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/v9/projects/prj_1/env/env_1"))
            .and(body_json(json!({"value": "https://example.org"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(env_json()))
            .mount(&server)
            .await;

        let request = UpdateEnvironmentVariableRequest {
            value: Some("https://example.org".into()),
            ..UpdateEnvironmentVariableRequest::default()
        };
        let env = client(&server)
            .update_environment_variable(
                &ProjectId::new("prj_1"),
                &EnvironmentVariableId::new("env_1"),
                &request,
                None,
            )
            .await
            .unwrap();
        assert_eq!(env.key, "API_URL");
    }

    #[tokio::test]
    async fn get_and_delete_environment_variable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/projects/prj_1/env/env_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(env_json()))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/v9/projects/prj_1/env/env_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(env_json()))
            .mount(&server)
            .await;

        let client = client(&server);
        let project = ProjectId::new("prj_1");
        let env_id = EnvironmentVariableId::new("env_1");

        let env = client
            .get_environment_variable(&project, &env_id, None)
            .await
            .unwrap();
        assert_eq!(env.value, "https://example.com");

        client
            .delete_environment_variable(&project, &env_id, None)
            .await
            .unwrap();
    }
}
