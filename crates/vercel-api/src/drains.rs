//! Log and trace drains.
//!
//! A drain forwards observability data to an external endpoint. The wire
//! format carries the endpoint either as a single URL or as an object with
//! one URL per signal; both shapes decode into [`DeliveryEndpoint`].

use crate::client::{segment, VercelClient};
use crate::Result;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vercel_core::ids::{DrainId, ProjectId, TeamId};

/// Where a drain delivers data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeliveryEndpoint {
    /// One URL for every signal.
    Url(String),
    /// A URL per signal.
    Signals(SignalEndpoints),
}

/// Per-signal delivery URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SignalEndpoints {
    /// Trace delivery URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traces: Option<String>,
    /// Log delivery URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,
}

impl DeliveryEndpoint {
    /// The single URL, if the endpoint is not split per signal.
    #[must_use]
    pub fn as_url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::Signals(_) => None,
        }
    }

    /// URL that receives traces.
    #[must_use]
    pub fn traces_url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::Signals(signals) => signals.traces.as_deref(),
        }
    }

    /// URL that receives logs.
    #[must_use]
    pub fn logs_url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::Signals(signals) => signals.logs.as_deref(),
        }
    }
}

impl From<String> for DeliveryEndpoint {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}

impl From<&str> for DeliveryEndpoint {
    fn from(url: &str) -> Self {
        Self::Url(url.to_string())
    }
}

/// Body encoding used for delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryEncoding {
    /// One JSON array per request
    Json,
    /// Newline-delimited JSON
    Ndjson,
    /// Protocol buffers
    Proto,
}

/// Plain HTTP delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpDelivery {
    /// Target endpoint.
    pub endpoint: DeliveryEndpoint,
    /// Body encoding.
    pub encoding: DeliveryEncoding,
    /// Compression applied to the body, e.g. `gzip`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<String>,
    /// Extra headers sent with every request.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// OpenTelemetry (OTLP over HTTP) delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtlpDelivery {
    /// Collector endpoint.
    pub endpoint: DeliveryEndpoint,
    /// Body encoding.
    pub encoding: DeliveryEncoding,
    /// Extra headers sent with every request.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// Delivery configuration, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Delivery {
    /// `"type": "http"`
    #[serde(rename = "http")]
    Http(HttpDelivery),
    /// `"type": "otlphttp"`
    #[serde(rename = "otlphttp")]
    OtlpHttp(OtlpDelivery),
}

impl Delivery {
    /// Endpoint of either delivery kind.
    #[must_use]
    pub const fn endpoint(&self) -> &DeliveryEndpoint {
        match self {
            Self::Http(http) => &http.endpoint,
            Self::OtlpHttp(otlp) => &otlp.endpoint,
        }
    }
}

/// Version of a data schema a drain subscribes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Schema version, e.g. `v1`.
    pub version: String,
}

/// Sampling applied before delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingRule {
    /// Rule kind, e.g. `head_sampling`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Fraction of events kept, between 0 and 1.
    pub rate: f64,
    /// Restrict the rule to one environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    /// Restrict the rule to a request path prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_path: Option<String>,
}

/// A drain as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drain {
    /// Drain id.
    pub id: DrainId,
    /// Display name.
    pub name: String,
    /// Projects the drain is limited to; empty means all.
    #[serde(default)]
    pub project_ids: Vec<ProjectId>,
    /// Subscribed schemas keyed by name (`log`, `trace`, ...).
    #[serde(default)]
    pub schemas: BTreeMap<String, SchemaVersion>,
    /// Delivery configuration.
    pub delivery: Delivery,
    /// Sampling rules.
    #[serde(default)]
    pub sampling: Vec<SamplingRule>,
    /// Owning team.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<TeamId>,
    /// Delivery status, e.g. `enabled`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
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

/// Request payload for creating a drain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDrainRequest {
    /// Display name.
    pub name: String,
    /// Projects to limit the drain to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub project_ids: Vec<ProjectId>,
    /// Schemas to subscribe to.
    pub schemas: BTreeMap<String, SchemaVersion>,
    /// Delivery configuration.
    pub delivery: Delivery,
    /// Sampling rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sampling: Vec<SamplingRule>,
}

#[derive(Debug, Deserialize)]
struct DrainList {
    drains: Vec<Drain>,
}

impl VercelClient {
    /// Create a drain.
    pub async fn create_drain(
        &self,
        request: &CreateDrainRequest,
        team_id: Option<&str>,
    ) -> Result<Drain> {
        self.send_json(Method::POST, "v1/drains", team_id, request)
            .await
    }

    /// Fetch a drain.
    pub async fn get_drain(&self, id: &DrainId, team_id: Option<&str>) -> Result<Drain> {
        let path = format!("v1/drains/{}", segment(id)?);
        self.get_json(&path, team_id).await
    }

    /// List drains.
    pub async fn list_drains(&self, team_id: Option<&str>) -> Result<Vec<Drain>> {
        let list: DrainList = self.get_json("v1/drains", team_id).await?;
        Ok(list.drains)
    }

    /// Delete a drain.
    pub async fn delete_drain(&self, id: &DrainId, team_id: Option<&str>) -> Result<()> {
        let path = format!("v1/drains/{}", segment(id)?);
        self.send_unit(Method::DELETE, &path, team_id).await
    }
}
