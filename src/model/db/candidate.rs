use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Core candidate data, as stored in the database.
/// A candidate's vote count is never stored; it is counted from the votes.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct CandidateCore {
    pub name: String,
    /// The election this candidate stands in.
    pub election: Id,
    /// The position they stand for, if the election has several.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

/// A candidate without an ID.
pub type NewCandidate = CandidateCore;

/// A candidate from the database, with its unique ID.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub candidate: CandidateCore,
}

impl Deref for Candidate {
    type Target = CandidateCore;

    fn deref(&self) -> &Self::Target {
        &self.candidate
    }
}

#[cfg(test)]
mod examples {
    use super::*;

    impl CandidateCore {
        pub fn example(election: Id, name: &str) -> Self {
            Self {
                name: name.to_string(),
                election,
                position: Some("President".to_string()),
            }
        }
    }
}
