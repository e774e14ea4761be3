//! Query parameters and team-scoped URL building.
//!
//! Almost every endpoint accepts an optional `teamId` query parameter that
//! directs the request at a team instead of the token owner's personal
//! account. [`with_team_id`] is the single place that appends it.

use std::fmt::Display;
use url::Url;

/// Name of the team-scoping query parameter.
pub const TEAM_ID_PARAM: &str = "teamId";

/// Builder for assembling query parameter pairs.
#[derive(Debug, Default, Clone)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a required key/value pair.
    pub fn push<T>(&mut self, key: &'static str, value: T)
    where
        T: Display,
    {
        self.pairs.push((key, value.to_string()));
    }

    /// Chainable form of [`QueryParams::push`].
    #[must_use]
    pub fn with<T>(mut self, key: &'static str, value: T) -> Self
    where
        T: Display,
    {
        self.push(key, value);
        self
    }

    /// Append every collected pair to `url`.
    pub fn apply(&self, url: &mut Url) {
        if self.pairs.is_empty() {
            return;
        }
        url.query_pairs_mut()
            .extend_pairs(self.pairs.iter().map(|(k, v)| (*k, v.as_str())));
    }
}

/// Scope `url` to a team.
///
/// Appends `teamId=<id>` after any existing query string. `None` or an
/// empty id leaves the URL untouched.
#[must_use]
pub fn with_team_id(mut url: Url, team_id: Option<&str>) -> Url {
    if let Some(team_id) = team_id.filter(|id| !id.is_empty()) {
        url.query_pairs_mut().append_pair(TEAM_ID_PARAM, team_id);
    }
    url
}
