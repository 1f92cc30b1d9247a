use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    model::{
        api::id::ApiId,
        common::election::{Badge, ElectionStatus, DEFAULT_POSITIONS},
        db::election::{Election, NewElection},
        mongodb::parse_datetime,
    },
};

/// An election specification, as submitted by the create and edit forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionSpec {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// RFC 3339 timestamp or `YYYY-MM-DD`. Empty means unset.
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Defaults to `upcoming`.
    #[serde(default)]
    pub status: Option<ElectionStatus>,
    /// Defaults to [`DEFAULT_POSITIONS`].
    #[serde(default)]
    pub positions: Option<Vec<String>>,
}

impl ElectionSpec {
    /// Validate this spec and turn it into a storable election.
    /// `created_at` is kept as given so that edits preserve it.
    pub fn into_election(self, created_at: Option<DateTime<Utc>>) -> Result<NewElection> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::bad_request("Election title must not be empty"));
        }
        let start_date = optional_date("startDate", self.start_date)?;
        let end_date = optional_date("endDate", self.end_date)?;
        let positions = self
            .positions
            .unwrap_or_else(|| DEFAULT_POSITIONS.iter().map(|p| p.to_string()).collect());

        Ok(NewElection {
            title,
            description: self.description,
            status: self.status.unwrap_or_default(),
            start_date,
            end_date,
            positions,
            created_at,
        })
    }
}

/// Parse an optional date field, treating blank as absent.
fn optional_date(field: &str, raw: Option<String>) -> Result<Option<DateTime<Utc>>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_datetime(raw)
            .map(Some)
            .ok_or_else(|| Error::bad_request(format!("Invalid {field}: \"{raw}\""))),
    }
}

/// A request to change only an election's recorded status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: ElectionStatus,
}

/// An election as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionDescription {
    #[serde(rename = "_id")]
    pub id: ApiId,
    pub title: String,
    pub description: String,
    /// Effective status at the time of the request.
    pub status: ElectionStatus,
    /// Status as last recorded by an administrator.
    pub stored_status: ElectionStatus,
    /// How to draw the effective status.
    pub badge: Badge,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub positions: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub candidates_count: u64,
    pub votes_count: u64,
}

impl ElectionDescription {
    pub fn new(
        election: Election,
        candidates_count: u64,
        votes_count: u64,
        now: DateTime<Utc>,
    ) -> Self {
        let status = election.effective_status(now);
        let core = election.election;
        Self {
            id: election.id.into(),
            title: core.title,
            description: core.description,
            status,
            stored_status: core.status,
            badge: status.badge(),
            start_date: core.start_date,
            end_date: core.end_date,
            positions: core.positions,
            created_at: core.created_at,
            candidates_count,
            votes_count,
        }
    }

    /// Whether the recorded status disagrees with the dates.
    pub fn status_diverges(&self) -> bool {
        self.status != self.stored_status
    }
}

/// Narrowing applied to the election list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElectionFilter {
    /// Case-insensitive substring of the title or description.
    pub search: Option<String>,
    /// Effective status to keep.
    pub status: Option<ElectionStatus>,
}

impl ElectionFilter {
    /// Build a filter from query parameters. A blank search and a status of
    /// `all` both mean no narrowing.
    pub fn new(search: Option<String>, status: Option<&str>) -> Result<Self> {
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let status = match status.map(str::trim) {
            None | Some("") => None,
            Some(s) if s.eq_ignore_ascii_case("all") => None,
            Some(s) => Some(
                s.parse::<ElectionStatus>()
                    .map_err(|e| Error::bad_request(e.to_string()))?,
            ),
        };
        Ok(Self { search, status })
    }

    pub fn matches(&self, election: &Election, effective: ElectionStatus) -> bool {
        let status_ok = self.status.map_or(true, |status| status == effective);
        let search_ok = self
            .search
            .as_deref()
            .map_or(true, |term| election.matches_search(term));
        status_ok && search_ok
    }
}

#[cfg(test)]
mod examples {
    use chrono::SecondsFormat;

    use super::*;

    impl ElectionSpec {
        pub fn from_core(core: &NewElection) -> Self {
            Self {
                title: core.title.clone(),
                description: core.description.clone(),
                start_date: core
                    .start_date
                    .map(|d| d.to_rfc3339_opts(SecondsFormat::Millis, true)),
                end_date: core
                    .end_date
                    .map(|d| d.to_rfc3339_opts(SecondsFormat::Millis, true)),
                status: Some(core.status),
                positions: Some(core.positions.clone()),
            }
        }

        pub fn current_example() -> Self {
            Self::from_core(&NewElection::current_example())
        }

        pub fn future_example() -> Self {
            Self::from_core(&NewElection::future_example())
        }
    }
}
