//! Edge Config stores and their JSON schemas.
//!
//! A store without a schema answers the schema endpoint with `204 No
//! Content`. [`VercelClient::get_edge_config_schema`] reports that as an
//! error for which [`vercel_core::Error::is_no_content`] is true, so callers
//! can tell "no schema" apart from "no store" (404).

use crate::client::{segment, VercelClient};
use crate::Result;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use vercel_core::client::ApiRequest;
use vercel_core::ids::EdgeConfigId;

/// An Edge Config store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeConfig {
    /// Store id.
    pub id: EdgeConfigId,
    /// Human-readable slug.
    pub slug: String,
    /// Owning account id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// Digest of the current contents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// Number of items stored.
    #[serde(default)]
    pub item_count: u64,
    /// Size of the stored items.
    #[serde(default)]
    pub size_in_bytes: u64,
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

/// Request payload for creating a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEdgeConfigRequest {
    /// Slug for the new store.
    pub slug: String,
}

/// JSON schema attached to a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeConfigSchema {
    /// JSON Schema document.
    pub definition: serde_json::Value,
}

impl VercelClient {
    /// Create an Edge Config store.
    pub async fn create_edge_config(
        &self,
        request: &CreateEdgeConfigRequest,
        team_id: Option<&str>,
    ) -> Result<EdgeConfig> {
        self.send_json(Method::POST, "v1/edge-config", team_id, request)
            .await
    }

    /// Fetch an Edge Config store.
    pub async fn get_edge_config(
        &self,
        id: &EdgeConfigId,
        team_id: Option<&str>,
    ) -> Result<EdgeConfig> {
        let path = format!("v1/edge-config/{}", segment(id)?);
        self.get_json(&path, team_id).await
    }

    /// Delete an Edge Config store.
    pub async fn delete_edge_config(&self, id: &EdgeConfigId, team_id: Option<&str>) -> Result<()> {
        let path = format!("v1/edge-config/{}", segment(id)?);
        self.send_unit(Method::DELETE, &path, team_id).await
    }

    /// Fetch the schema of a store.
    ///
    /// # Errors
    ///
    /// A store without a schema yields an error whose
    /// [`is_no_content`](vercel_core::Error::is_no_content) is true.
    pub async fn get_edge_config_schema(
        &self,
        id: &EdgeConfigId,
        team_id: Option<&str>,
    ) -> Result<EdgeConfigSchema> {
        let path = format!("v1/edge-config/{}/schema", segment(id)?);
        let url = self.url(&path, team_id)?;
        self.execute_json(ApiRequest::get(url).error_on_no_content(true))
            .await
    }

    /// Create or replace the schema of a store.
    pub async fn upsert_edge_config_schema(
        &self,
        id: &EdgeConfigId,
        schema: &EdgeConfigSchema,
        team_id: Option<&str>,
    ) -> Result<EdgeConfigSchema> {
        let path = format!("v1/edge-config/{}/schema", segment(id)?);
        self.send_json(Method::POST, &path, team_id, schema).await
    }

    /// Remove the schema from a store.
    pub async fn delete_edge_config_schema(
        &self,
        id: &EdgeConfigId,
        team_id: Option<&str>,
    ) -> Result<()> {
        let path = format!("v1/edge-config/{}/schema", segment(id)?);
        self.send_unit(Method::DELETE, &path, team_id).await
    }
}
