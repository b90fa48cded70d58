use rocket::{serde::json::Json, Route, State};

use crate::{
    config::Config,
    error::Result,
    model::{
        api::{
            auth::{Anyone, AuthToken},
            candidate::CandidateDescription,
            election::ElectionSummary,
            response::ApiResponse,
        },
        db::{candidate::Candidate, election::Election, voter::Voter},
        mongodb::{Coll, Id},
    },
    service::{Clock, ElectionResults, ElectionService, RegistrationService, ResultsService, SystemClock},
};

pub fn routes() -> Vec<Route> {
    routes![list_candidates, all_elections, active_elections, election_results]
}

#[get("/candidates")]
async fn list_candidates(
    _token: AuthToken<Anyone>,
    voters: Coll<Voter>,
    candidates: Coll<Candidate>,
    clock: &State<SystemClock>,
) -> Result<Json<ApiResponse<Vec<CandidateDescription>>>> {
    let listed = RegistrationService::new(&voters, &candidates, clock.inner())
        .list_candidates()
        .await?;
    let listed = listed.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::ok("Candidates retrieved.", listed)))
}

#[get("/elections")]
async fn all_elections(
    _token: AuthToken<Anyone>,
    elections: Coll<Election>,
    candidates: Coll<Candidate>,
    config: &State<Config>,
) -> Result<Json<ApiResponse<Vec<ElectionSummary>>>> {
    let all = ElectionService::new(&elections, &candidates, config.candidate_policy())
        .list_all()
        .await?;
    let all = all.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::ok("Elections retrieved.", all)))
}

#[get("/elections/active")]
async fn active_elections(
    _token: AuthToken<Anyone>,
    elections: Coll<Election>,
    candidates: Coll<Candidate>,
    config: &State<Config>,
    clock: &State<SystemClock>,
) -> Result<Json<ApiResponse<Vec<ElectionSummary>>>> {
    let active = ElectionService::new(&elections, &candidates, config.candidate_policy())
        .list_active(clock.now())
        .await?;
    let active = active.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::ok("Active elections retrieved.", active)))
}

#[get("/elections/<election_id>/results")]
async fn election_results(
    _token: AuthToken<Anyone>,
    election_id: Id,
    elections: Coll<Election>,
) -> Result<Json<ApiResponse<ElectionResults>>> {
    let results = ResultsService::new(&elections).compute(election_id).await?;
    Ok(Json(ApiResponse::ok("Results computed.", results)))
}
