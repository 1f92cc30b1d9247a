use chrono::{DateTime, Utc};
use log::{info, warn};
use mongodb::{
    bson::{doc, oid::Error as OidError},
    options::FindOptions,
};
use rocket::{
    futures::{future::try_join_all, TryStreamExt},
    http::Status,
    response::status::Created,
    serde::json::Json,
    Route,
};

use crate::{
    error::{Context, Error, Result},
    model::{
        api::{
            auth::AdminToken,
            candidate::CandidateDescription,
            election::{ElectionDescription, ElectionFilter, ElectionSpec, StatusChange},
        },
        common::election::StatusCounts,
        db::{
            candidate::Candidate,
            election::{Election, NewElection},
            vote::Vote,
        },
        mongodb::{Coll, Id},
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        get_elections,
        get_election_stats,
        get_election,
        get_candidates,
        create_election,
        modify_election,
        change_status,
        delete_election,
    ]
}

/// Fetch an election by ID or fail with 404.
async fn find_election(elections: &Coll<Election>, election_id: Id) -> Result<Election> {
    elections
        .find_one(election_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Election {election_id}")))
}

/// Attach server-side candidate and vote counts to an election.
async fn describe(
    election: Election,
    candidates: &Coll<Candidate>,
    votes: &Coll<Vote>,
    now: DateTime<Utc>,
) -> Result<ElectionDescription> {
    let by_election = doc! { "election": election.id };
    let candidates_count = candidates
        .count_documents(by_election.clone(), None)
        .await?;
    let votes_count = votes.count_documents(by_election, None).await?;
    Ok(ElectionDescription::new(
        election,
        candidates_count,
        votes_count,
        now,
    ))
}

#[get("/elections?<search>&<status>")]
async fn get_elections(
    _token: AdminToken,
    search: Option<String>,
    status: Option<&str>,
    elections: Coll<Election>,
    candidates: Coll<Candidate>,
    votes: Coll<Vote>,
) -> Result<Json<Vec<ElectionDescription>>> {
    let filter = ElectionFilter::new(search, status)?;
    let now = Utc::now();

    let newest_first = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
    let all_elections: Vec<Election> = elections
        .find(None, newest_first)
        .await
        .context("Failed to fetch elections")?
        .try_collect()
        .await
        .context("Failed to fetch elections")?;

    let matching = all_elections
        .into_iter()
        .filter(|election| filter.matches(election, election.effective_status(now)));
    let descriptions = try_join_all(
        matching.map(|election| describe(election, &candidates, &votes, now)),
    )
    .await
    .context("Failed to count election activity")?;

    for description in descriptions.iter().filter(|d| d.status_diverges()) {
        warn!(
            "Election {} is recorded as {} but its dates make it {}",
            description.id, description.stored_status, description.status
        );
    }

    Ok(Json(descriptions))
}

#[get("/elections/stats")]
async fn get_election_stats(
    _token: AdminToken,
    elections: Coll<Election>,
) -> Result<Json<StatusCounts>> {
    let now = Utc::now();
    let counts: StatusCounts = elections
        .find(None, None)
        .await?
        .map_ok(|election| election.effective_status(now))
        .try_collect::<Vec<_>>()
        .await
        .context("Failed to fetch election stats")?
        .into_iter()
        .collect();
    Ok(Json(counts))
}

#[get("/elections/<election_id>")]
async fn get_election(
    _token: AdminToken,
    election_id: std::result::Result<Id, OidError>,
    elections: Coll<Election>,
    candidates: Coll<Candidate>,
    votes: Coll<Vote>,
) -> Result<Json<ElectionDescription>> {
    let election = find_election(&elections, election_id?).await?;
    let description = describe(election, &candidates, &votes, Utc::now()).await?;
    Ok(Json(description))
}

#[get("/elections/<election_id>/candidates")]
async fn get_candidates(
    _token: AdminToken,
    election_id: std::result::Result<Id, OidError>,
    elections: Coll<Election>,
    candidates: Coll<Candidate>,
    votes: Coll<Vote>,
) -> Result<Json<Vec<CandidateDescription>>> {
    let election = find_election(&elections, election_id?).await?;

    let standing: Vec<Candidate> = candidates
        .find(doc! { "election": election.id }, None)
        .await?
        .try_collect()
        .await?;
    let tallies = try_join_all(standing.iter().map(|candidate| {
        votes.count_documents(
            doc! { "election": election.id, "candidate": candidate.id },
            None,
        )
    }))
    .await
    .context("Failed to count candidate votes")?;

    let descriptions = standing
        .into_iter()
        .zip(tallies)
        .map(|(candidate, votes)| CandidateDescription::new(candidate, votes))
        .collect();
    Ok(Json(descriptions))
}

#[post("/elections", data = "<spec>", format = "json")]
async fn create_election(
    _token: AdminToken,
    spec: Json<ElectionSpec>,
    new_elections: Coll<NewElection>,
    elections: Coll<Election>,
    candidates: Coll<Candidate>,
    votes: Coll<Vote>,
) -> Result<Created<Json<ElectionDescription>>> {
    let now = Utc::now();
    let election = spec.0.into_election(Some(now))?;

    let new_id: Id = new_elections
        .insert_one(&election, None)
        .await
        .context("Failed to create election")?
        .inserted_id
        .as_object_id()
        .ok_or_else(|| {
            Error::Status(
                Status::InternalServerError,
                "Database returned a non-ObjectId election ID".to_string(),
            )
        })?
        .into();
    info!("Created election {new_id} \"{}\"", election.title);

    let election = find_election(&elections, new_id).await?;
    let description = describe(election, &candidates, &votes, now).await?;
    Ok(Created::new(format!("/api/elections/{new_id}")).body(Json(description)))
}

#[put("/elections/<election_id>", data = "<spec>", format = "json")]
async fn modify_election(
    _token: AdminToken,
    election_id: std::result::Result<Id, OidError>,
    spec: Json<ElectionSpec>,
    new_elections: Coll<NewElection>,
    elections: Coll<Election>,
    candidates: Coll<Candidate>,
    votes: Coll<Vote>,
) -> Result<Json<ElectionDescription>> {
    let election_id = election_id?;
    let existing = find_election(&elections, election_id).await?;

    // Any status is accepted here, whatever the dates say.
    let replacement = spec.0.into_election(existing.created_at)?;
    new_elections
        .replace_one(election_id.as_doc(), &replacement, None)
        .await
        .context("Failed to update election")?;
    info!("Updated election {election_id}");

    let election = find_election(&elections, election_id).await?;
    let description = describe(election, &candidates, &votes, Utc::now()).await?;
    Ok(Json(description))
}

#[patch("/elections/<election_id>/status", data = "<change>", format = "json")]
async fn change_status(
    _token: AdminToken,
    election_id: std::result::Result<Id, OidError>,
    change: Json<StatusChange>,
    elections: Coll<Election>,
    candidates: Coll<Candidate>,
    votes: Coll<Vote>,
) -> Result<Json<ElectionDescription>> {
    let election_id = election_id?;
    let result = elections
        .update_one(
            election_id.as_doc(),
            doc! { "$set": { "status": change.status } },
            None,
        )
        .await
        .context("Failed to update election status")?;
    if result.matched_count == 0 {
        return Err(Error::not_found(format!("Election {election_id}")));
    }
    info!("Election {election_id} recorded as {}", change.status);

    let election = find_election(&elections, election_id).await?;
    let description = describe(election, &candidates, &votes, Utc::now()).await?;
    Ok(Json(description))
}

#[delete("/elections/<election_id>")]
async fn delete_election(
    _token: AdminToken,
    election_id: std::result::Result<Id, OidError>,
    elections: Coll<Election>,
) -> Result<()> {
    let election_id = election_id?;
    let result = elections
        .delete_one(election_id.as_doc(), None)
        .await
        .context("Failed to delete election")?;
    if result.deleted_count == 0 {
        return Err(Error::not_found(format!("Election {election_id}")));
    }
    info!("Deleted election {election_id}");
    Ok(())
}
