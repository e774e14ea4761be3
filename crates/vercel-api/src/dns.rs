//! DNS records on domains managed by Vercel.

use crate::client::{segment, VercelClient};
use crate::Result;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use vercel_core::ids::DnsRecordId;

/// DNS record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    /// IPv4 address
    A,
    /// IPv6 address
    Aaaa,
    /// Apex alias
    Alias,
    /// Certificate authority authorization
    Caa,
    /// Canonical name
    Cname,
    /// HTTPS service binding
    Https,
    /// Mail exchanger
    Mx,
    /// Service locator
    Srv,
    /// Text
    Txt,
    /// Name server
    Ns,
}

/// Payload of an SRV record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrvRecord {
    /// Target host.
    pub target: String,
    /// Record weight.
    pub weight: u32,
    /// Target port.
    pub port: u16,
    /// Record priority.
    pub priority: u32,
}

/// A DNS record as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecord {
    /// Record id.
    pub id: DnsRecordId,
    /// Domain the record belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Subdomain label; empty for the apex.
    #[serde(default)]
    pub name: String,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    /// Record value.
    #[serde(default)]
    pub value: String,
    /// Time to live in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// MX priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mx_priority: Option<u32>,
    /// Free-form comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
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

/// Request payload for creating a DNS record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDnsRecordRequest {
    /// Subdomain label; empty for the apex.
    pub name: String,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    /// Record value. Unused for SRV records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Time to live in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// MX priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mx_priority: Option<u32>,
    /// SRV payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srv: Option<SrvRecord>,
    /// Free-form comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Request payload for updating a DNS record. Unset fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDnsRecordRequest {
    /// New subdomain label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// New time to live.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// New MX priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mx_priority: Option<u32>,
    /// New SRV payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srv: Option<SrvRecord>,
    /// New comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedDnsRecord {
    uid: DnsRecordId,
}

impl VercelClient {
    /// Create a DNS record and return its id.
    ///
    /// The create endpoint only reports the new id; call
    /// [`VercelClient::get_dns_record`] for the full record.
    pub async fn create_dns_record(
        &self,
        domain: &str,
        request: &CreateDnsRecordRequest,
        team_id: Option<&str>,
    ) -> Result<DnsRecordId> {
        let path = format!("v4/domains/{}/records", segment(domain)?);
        let created: CreatedDnsRecord = self
            .send_json(Method::POST, &path, team_id, request)
            .await?;
        Ok(created.uid)
    }

    /// Fetch a DNS record.
    pub async fn get_dns_record(
        &self,
        record_id: &DnsRecordId,
        team_id: Option<&str>,
    ) -> Result<DnsRecord> {
        let path = format!("domains/records/{}", segment(record_id)?);
        self.get_json(&path, team_id).await
    }

    /// Update a DNS record.
    pub async fn update_dns_record(
        &self,
        record_id: &DnsRecordId,
        request: &UpdateDnsRecordRequest,
        team_id: Option<&str>,
    ) -> Result<DnsRecord> {
        let path = format!("v1/domains/records/{}", segment(record_id)?);
        self.send_json(Method::PATCH, &path, team_id, request).await
    }

    /// Delete a DNS record.
    pub async fn delete_dns_record(
        &self,
        domain: &str,
        record_id: &DnsRecordId,
        team_id: Option<&str>,
    ) -> Result<()> {
        let path = format!("v2/domains/{}/records/{}", segment(domain)?, segment(record_id)?);
        self.send_unit(Method::DELETE, &path, team_id).await
    }
}
