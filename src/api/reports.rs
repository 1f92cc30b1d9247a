use chrono::{DateTime, Utc};
use log::debug;
use mongodb::bson::doc;
use rocket::{
    futures::{future::try_join_all, TryStreamExt},
    serde::json::Json,
    Route,
};

use crate::{
    error::{Context, Result},
    model::{
        api::{auth::AdminToken, report::ReportSummary},
        common::report::{Report, Totals},
        db::{election::Election, user::User, vote::Vote},
        mongodb::Coll,
    },
};

pub fn routes() -> Vec<Route> {
    routes![summary]
}

#[get("/summary")]
pub async fn summary(
    _token: AdminToken,
    elections: Coll<Election>,
    votes: Coll<Vote>,
    users: Coll<User>,
) -> Result<Json<ReportSummary>> {
    let report = build_report(&elections, &votes, &users, Utc::now())
        .await
        .context("Failed to fetch report summary")?;
    Ok(Json(report.into()))
}

/// Read every count the report needs and assemble it. Nothing is cached.
async fn build_report(
    elections: &Coll<Election>,
    votes: &Coll<Vote>,
    users: &Coll<User>,
    now: DateTime<Utc>,
) -> Result<Report> {
    let totals = Totals {
        elections: elections.count_documents(None, None).await?,
        votes: votes.count_documents(None, None).await?,
        users: users.count_documents(None, None).await?,
    };

    let all_elections: Vec<Election> = elections.find(None, None).await?.try_collect().await?;
    let vote_counts = try_join_all(
        all_elections
            .iter()
            .map(|election| votes.count_documents(doc! { "election": election.id }, None)),
    )
    .await?;

    let distinct_voters = votes.distinct("user", None, None).await?.len() as u64;
    debug!(
        "Report over {} elections, {} votes, {} users, {} distinct voters",
        totals.elections, totals.votes, totals.users, distinct_voters
    );

    Ok(Report::compute(
        totals,
        all_elections.iter().zip(vote_counts),
        distinct_voters,
        now,
    ))
}
