//! Projects.

use crate::client::{segment, VercelClient};
use crate::Result;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use vercel_core::ids::ProjectId;

/// Git provider hosting a linked repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitProvider {
    /// GitHub
    Github,
    /// GitLab
    Gitlab,
    /// Bitbucket
    Bitbucket,
}

/// Repository to link when creating a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRepository {
    /// Provider hosting the repository.
    #[serde(rename = "type")]
    pub provider: GitProvider,
    /// `owner/name` of the repository.
    pub repo: String,
}

/// Repository link as reported on a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLink {
    /// Provider hosting the repository.
    #[serde(rename = "type")]
    pub provider: GitProvider,
    /// Repository owner or group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    /// Repository name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    /// Branch deployed to production.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_branch: Option<String>,
}

/// A project as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project id.
    pub id: ProjectId,
    /// Project name.
    pub name: String,
    /// Owning account (user or team) id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Framework preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    /// Directory the build runs in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_directory: Option<String>,
    /// Build command override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,
    /// Install command override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_command: Option<String>,
    /// Output directory override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<String>,
    /// Region serverless functions run in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serverless_function_region: Option<String>,
    /// Linked git repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<ProjectLink>,
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

/// Request payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    /// Project name.
    pub name: String,
    /// Framework preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    /// Repository to link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_repository: Option<GitRepository>,
    /// Directory the build runs in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_directory: Option<String>,
    /// Build command override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,
    /// Install command override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_command: Option<String>,
    /// Output directory override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<String>,
    /// Region serverless functions run in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serverless_function_region: Option<String>,
}

impl CreateProjectRequest {
    /// A request with only the name set.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            framework: None,
            git_repository: None,
            root_directory: None,
            build_command: None,
            install_command: None,
            output_directory: None,
            serverless_function_region: None,
        }
    }
}

/// Request payload for updating a project. Unset fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Framework preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    /// Directory the build runs in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_directory: Option<String>,
    /// Build command override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,
    /// Install command override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_command: Option<String>,
    /// Output directory override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<String>,
    /// Region serverless functions run in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serverless_function_region: Option<String>,
}

impl VercelClient {
    /// Create a project.
    pub async fn create_project(
        &self,
        request: &CreateProjectRequest,
        team_id: Option<&str>,
    ) -> Result<Project> {
        self.send_json(Method::POST, "v11/projects", team_id, request)
            .await
    }

    /// Fetch a project by id or name.
    pub async fn get_project(&self, id_or_name: &str, team_id: Option<&str>) -> Result<Project> {
        let path = format!("v9/projects/{}", segment(id_or_name)?);
        self.get_json(&path, team_id).await
    }

    /// Update a project.
    pub async fn update_project(
        &self,
        id: &ProjectId,
        request: &UpdateProjectRequest,
        team_id: Option<&str>,
    ) -> Result<Project> {
        let path = format!("v9/projects/{}", segment(id)?);
        self.send_json(Method::PATCH, &path, team_id, request).await
    }

    /// Delete a project.
    pub async fn delete_project(&self, id: &ProjectId, team_id: Option<&str>) -> Result<()> {
        let path = format!("v9/projects/{}", segment(id)?);
        self.send_unit(Method::DELETE, &path, team_id).await
    }
}
