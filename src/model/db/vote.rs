use std::ops::Deref;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::mongodb::{lenient_datetime, Id};

/// Core vote data, as stored in the database.
///
/// Nothing here stops a user voting twice in one election; reports count
/// whatever records exist.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCore {
    pub election: Id,
    pub user: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate: Option<Id>,
    #[serde(default, with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A vote without an ID.
pub type NewVote = VoteCore;

/// A vote from the database, with its unique ID.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub vote: VoteCore,
}

impl Deref for Vote {
    type Target = VoteCore;

    fn deref(&self) -> &Self::Target {
        &self.vote
    }
}
