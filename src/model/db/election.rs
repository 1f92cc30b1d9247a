use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::{from_bson, Bson};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::election::ElectionStatus,
    mongodb::{lenient_datetime, Id},
};

/// Core election data, as stored in the database.
///
/// Reading is lenient, see [`StoredElection`].
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredElection")]
pub struct ElectionCore {
    pub title: String,
    pub description: String,
    /// Status as last recorded by an administrator.
    pub status: ElectionStatus,
    #[serde(default, with = "lenient_datetime")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient_datetime")]
    pub end_date: Option<DateTime<Utc>>,
    /// Positions being elected, in ballot order.
    pub positions: Vec<String>,
    #[serde(default, with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

/// An election document exactly as found in the database. Older documents
/// use `name` instead of (or as well as) `title`, and fields may be missing,
/// null, or hold values no longer in use. None of that stops a document
/// from being read.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredElection {
    #[serde(default)]
    title: Bson,
    #[serde(default)]
    name: Bson,
    #[serde(default)]
    description: Bson,
    #[serde(default)]
    status: Bson,
    #[serde(default, with = "lenient_datetime")]
    start_date: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient_datetime")]
    end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    positions: Bson,
    #[serde(default, with = "lenient_datetime")]
    created_at: Option<DateTime<Utc>>,
}

fn as_string(value: Bson) -> Option<String> {
    match value {
        Bson::String(s) => Some(s),
        _ => None,
    }
}

impl From<StoredElection> for ElectionCore {
    fn from(stored: StoredElection) -> Self {
        let positions = match stored.positions {
            Bson::Array(items) => items.into_iter().filter_map(as_string).collect(),
            _ => Vec::new(),
        };
        Self {
            title: as_string(stored.title)
                .or_else(|| as_string(stored.name))
                .unwrap_or_default(),
            description: as_string(stored.description).unwrap_or_default(),
            // Unknown or missing statuses fall back to the default.
            status: from_bson(stored.status).unwrap_or_default(),
            start_date: stored.start_date,
            end_date: stored.end_date,
            positions,
            created_at: stored.created_at,
        }
    }
}

impl ElectionCore {
    /// The status this election should be treated as having at time `now`.
    pub fn effective_status(&self, now: DateTime<Utc>) -> ElectionStatus {
        self.status.effective(self.start_date, self.end_date, now)
    }

    /// Whether `term` appears in the title or description, ignoring case.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
    }
}

/// An election without an ID.
pub type NewElection = ElectionCore;

/// An election from the database, with its unique ID.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Election {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub election: ElectionCore,
}

impl Deref for Election {
    type Target = ElectionCore;

    fn deref(&self) -> &Self::Target {
        &self.election
    }
}

impl DerefMut for Election {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.election
    }
}


#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use mongodb::bson::{doc, from_document, oid::ObjectId, to_document};

    use super::*;

    #[test]
    fn legacy_documents_deserialize() {
        let id = ObjectId::new();
        let raw = doc! {
            "_id": id,
            "name": "Old Election",
            "status": "active",
            "startDate": "2024-01-01",
            "endDate": "not a date",
        };
        let election: Election = from_document(raw).unwrap();
        assert_eq!(election.id, Id::from(id));
        assert_eq!(election.title, "Old Election");
        assert_eq!(election.description, "");
        assert_eq!(
            election.start_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(election.end_date, None);
        assert!(election.positions.is_empty());

        // With a bad end date the recorded status stands.
        assert_eq!(election.effective_status(Utc::now()), ElectionStatus::Active);
    }

    fn read(raw: mongodb::bson::Document) -> Election {
        from_document(raw).unwrap()
    }

    #[test]
    fn ongoing_is_read_as_active() {
        let election = read(doc! { "_id": ObjectId::new(), "title": "X", "status": "ongoing" });
        assert_eq!(election.status, ElectionStatus::Active);
    }

    #[test]
    fn title_wins_over_name() {
        let election = read(doc! {
            "_id": ObjectId::new(),
            "title": "Dashboard Title",
            "name": "Controller Name",
        });
        assert_eq!(election.title, "Dashboard Title");
    }

    #[test]
    fn untitled_documents_read_as_empty() {
        let election = read(doc! { "_id": ObjectId::new(), "status": "active" });
        assert_eq!(election.title, "");
        assert_eq!(election.status, ElectionStatus::Active);
        assert!(election.positions.is_empty());
    }

    #[test]
    fn null_and_unknown_values_use_defaults() {
        let election = read(doc! {
            "_id": ObjectId::new(),
            "title": "Y",
            "status": Bson::Null,
            "description": 42,
            "positions": ["Chair", 7, "Treasurer"],
        });
        assert_eq!(election.status, ElectionStatus::Upcoming);
        assert_eq!(election.description, "");
        assert_eq!(election.positions, vec!["Chair", "Treasurer"]);

        let election = read(doc! { "_id": ObjectId::new(), "title": "Z", "status": "paused" });
        assert_eq!(election.status, ElectionStatus::Upcoming);
    }

    #[test]
    fn document_round_trip() {
        let election = ElectionCore::current_example();
        let document = to_document(&election).unwrap();
        assert!(document.contains_key("startDate"));
        assert_eq!(document.get_str("status").unwrap(), "upcoming");
        let back: ElectionCore = from_document(document).unwrap();
        assert_eq!(back, election);
    }

    #[test]
    fn effective_status_of_examples() {
        let now = Utc::now();
        assert_eq!(
            ElectionCore::current_example().effective_status(now),
            ElectionStatus::Active
        );
        assert_eq!(
            ElectionCore::future_example().effective_status(now),
            ElectionStatus::Upcoming
        );
        assert_eq!(
            ElectionCore::past_example().effective_status(now),
            ElectionStatus::Completed
        );
        assert_eq!(
            ElectionCore::undated_example().effective_status(now + Duration::days(400)),
            ElectionStatus::Cancelled
        );
    }

    #[test]
    fn search_matches_title_or_description() {
        let election = ElectionCore::current_example();
        assert!(election.matches_search("union"));
        assert!(election.matches_search("OFFICERS"));
        assert!(!election.matches_search("referendum"));
    }
}
