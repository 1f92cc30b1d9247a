use serde::Serialize;

use crate::model::{api::id::ApiId, db::candidate::Candidate};

/// A candidate with the number of votes cast for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateDescription {
    #[serde(rename = "_id")]
    pub id: ApiId,
    pub name: String,
    pub election: ApiId,
    pub position: Option<String>,
    pub votes: u64,
}

impl CandidateDescription {
    pub fn new(candidate: Candidate, votes: u64) -> Self {
        Self {
            id: candidate.id.into(),
            name: candidate.candidate.name,
            election: candidate.candidate.election.into(),
            position: candidate.candidate.position,
            votes,
        }
    }
}
