use serde::Serialize;

use crate::model::{
    api::id::ApiId,
    common::{
        election::ElectionStatus,
        report::{ElectionTurnout, Report},
    },
};

/// Per-election line of the report summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElectionStats {
    #[serde(rename = "_id")]
    pub id: ApiId,
    pub name: String,
    pub status: ElectionStatus,
    pub votes: u64,
    pub turnout: u64,
}

impl From<ElectionTurnout> for ElectionStats {
    fn from(line: ElectionTurnout) -> Self {
        Self {
            id: line.id.into(),
            name: line.name,
            status: line.status,
            votes: line.votes,
            turnout: line.turnout,
        }
    }
}

/// The body of `GET /api/reports/summary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_elections: u64,
    pub total_votes: u64,
    pub total_users: u64,
    pub voter_turnout: u64,
    pub voted: u64,
    pub not_voted: i64,
    pub elections: Vec<ElectionStats>,
}

impl From<Report> for ReportSummary {
    fn from(report: Report) -> Self {
        Self {
            total_elections: report.totals.elections,
            total_votes: report.totals.votes,
            total_users: report.totals.users,
            voter_turnout: report.voter_turnout,
            voted: report.voted,
            not_voted: report.not_voted,
            elections: report.elections.into_iter().map(Into::into).collect(),
        }
    }
}
