//! Teams.

use crate::client::{segment, VercelClient};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use vercel_core::ids::TeamId;

const TEAM_ID_PREFIX: &str = "team_";

/// Team ids carry the `team_` prefix; anything else is treated as a slug.
pub(crate) fn is_team_id(id_or_slug: &str) -> bool {
    id_or_slug.starts_with(TEAM_ID_PREFIX)
}

/// A team as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Team id.
    pub id: TeamId,
    /// URL slug.
    pub slug: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Team description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation timestamp.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl VercelClient {
    /// Fetch a team by id or slug.
    ///
    /// The lookup is never scoped to the client's default team.
    pub async fn get_team(&self, id_or_slug: &str) -> Result<Team> {
        let path = format!("v2/teams/{}", segment(id_or_slug)?);
        self.get_json_unscoped(&path).await
    }

    /// Turn a team id or slug into a team id.
    ///
    /// Ids (`team_...`) are returned without a request.
    pub async fn resolve_team_id(&self, id_or_slug: &str) -> Result<TeamId> {
        if is_team_id(id_or_slug) {
            return Ok(TeamId::new(id_or_slug));
        }
        debug!(slug = %id_or_slug, "Resolving team slug");
        Ok(self.get_team(id_or_slug).await?.id)
    }
}
