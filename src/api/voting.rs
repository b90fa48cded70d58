use rocket::{serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::{
        api::{
            auth::{Anyone, AuthToken},
            election::VoteRequest,
            response::ApiResponse,
        },
        db::{candidate::Candidate, election::Election, voter::Voter},
        mongodb::Coll,
    },
    service::{SystemClock, VotingService},
};

pub fn routes() -> Vec<Route> {
    routes![cast_vote]
}

/// Admins get through the guard here so that they can be told why they may
/// not vote.
#[post("/elections/<election_id>/votes", data = "<vote>", format = "json")]
async fn cast_vote(
    token: AuthToken<Anyone>,
    election_id: &str,
    vote: Json<VoteRequest>,
    voters: Coll<Voter>,
    candidates: Coll<Candidate>,
    elections: Coll<Election>,
    clock: &State<SystemClock>,
) -> Result<Json<ApiResponse<()>>> {
    VotingService::new(&voters, &candidates, &elections, clock.inner())
        .cast_vote(&token.caller(), election_id, &vote.candidate_id)
        .await?;
    Ok(Json(ApiResponse::done("Vote cast successfully.")))
}
