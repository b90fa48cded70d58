use rocket::{serde::json::Json, Route, State};

use crate::{
    config::Config,
    error::Result,
    model::{
        api::{
            auth::AuthToken,
            candidate::{CandidateDescription, CandidateRegistration},
            election::{ElectionDescription, ElectionRequest, ScheduledElection},
            response::ApiResponse,
            voter::VoterRegistration,
        },
        common::time::parse_timestamp,
        db::{admin::Admin, candidate::Candidate, election::Election, voter::Voter},
        mongodb::{Coll, Id},
    },
    service::{ElectionService, RegistrationService, SystemClock},
};

pub fn routes() -> Vec<Route> {
    routes![
        register_voter,
        add_candidate,
        create_election,
        edit_election,
        delete_election,
        get_election,
    ]
}

#[post("/voters", data = "<registration>", format = "json")]
async fn register_voter(
    _token: AuthToken<Admin>,
    registration: Json<VoterRegistration>,
    voters: Coll<Voter>,
    candidates: Coll<Candidate>,
    clock: &State<SystemClock>,
) -> Result<Json<ApiResponse<()>>> {
    let registration = registration.into_inner();
    RegistrationService::new(&voters, &candidates, clock.inner())
        .register_voter(registration.name, &registration.cnic, &registration.dob)
        .await?;
    Ok(Json(ApiResponse::done("Voter registered successfully.")))
}

#[post("/candidates", data = "<registration>", format = "json")]
async fn add_candidate(
    _token: AuthToken<Admin>,
    registration: Json<CandidateRegistration>,
    voters: Coll<Voter>,
    candidates: Coll<Candidate>,
    clock: &State<SystemClock>,
) -> Result<Json<ApiResponse<CandidateDescription>>> {
    let registration = registration.into_inner();
    let id = RegistrationService::new(&voters, &candidates, clock.inner())
        .add_candidate(
            registration.name.clone(),
            registration.party.clone(),
            &registration.cnic,
            &registration.dob,
        )
        .await?;
    let description = CandidateDescription {
        id: id.into(),
        name: registration.name,
        party: registration.party,
    };
    Ok(Json(ApiResponse::ok("Candidate added successfully.", description)))
}

#[post("/elections", data = "<request>", format = "json")]
async fn create_election(
    _token: AuthToken<Admin>,
    request: Json<ElectionRequest>,
    elections: Coll<Election>,
    candidates: Coll<Candidate>,
    config: &State<Config>,
) -> Result<Json<ApiResponse<ScheduledElection>>> {
    let request = request.into_inner();
    let start = parse_timestamp(&request.start_date)?;
    let end = parse_timestamp(&request.end_date)?;
    let scheduled = ElectionService::new(&elections, &candidates, config.candidate_policy())
        .create(request.name, start, end, &request.candidate_ids)
        .await?;
    let scheduled = ScheduledElection {
        id: scheduled.id.into(),
        candidates: scheduled.candidates.into_iter().map(Into::into).collect(),
    };
    Ok(Json(ApiResponse::ok("Election created successfully.", scheduled)))
}

#[put("/elections/<election_id>", data = "<request>", format = "json")]
async fn edit_election(
    _token: AuthToken<Admin>,
    election_id: Id,
    request: Json<ElectionRequest>,
    elections: Coll<Election>,
    candidates: Coll<Candidate>,
    config: &State<Config>,
) -> Result<Json<ApiResponse<Vec<CandidateDescription>>>> {
    let request = request.into_inner();
    let start = parse_timestamp(&request.start_date)?;
    let end = parse_timestamp(&request.end_date)?;
    let ballot = ElectionService::new(&elections, &candidates, config.candidate_policy())
        .edit(election_id, request.name, start, end, &request.candidate_ids)
        .await?;
    let ballot = ballot.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::ok("Election updated successfully.", ballot)))
}

#[delete("/elections/<election_id>")]
async fn delete_election(
    _token: AuthToken<Admin>,
    election_id: Id,
    elections: Coll<Election>,
    candidates: Coll<Candidate>,
    config: &State<Config>,
) -> Result<Json<ApiResponse<()>>> {
    ElectionService::new(&elections, &candidates, config.candidate_policy())
        .delete(election_id)
        .await?;
    Ok(Json(ApiResponse::done("Election deleted successfully.")))
}

#[get("/elections/<election_id>")]
async fn get_election(
    _token: AuthToken<Admin>,
    election_id: Id,
    elections: Coll<Election>,
    candidates: Coll<Candidate>,
    config: &State<Config>,
) -> Result<Json<ApiResponse<ElectionDescription>>> {
    let election = ElectionService::new(&elections, &candidates, config.candidate_policy())
        .get(election_id)
        .await?;
    Ok(Json(ApiResponse::ok("Election found.", election.into())))
}

#[cfg(test)]
mod tests {
    use mongodb::{bson::doc, Database};
    use rocket::{
        http::{uri::Origin, ContentType, Status},
        local::asynchronous::{Client, LocalResponse},
        serde::json::serde_json,
    };
    use serde::{de::DeserializeOwned, Serialize};

    use crate::{
        model::{api::id::ApiId, db::voter::NewVoter},
        service::FailureKind,
    };

    use super::*;

    async fn read<T: DeserializeOwned>(response: LocalResponse<'_>) -> ApiResponse<T> {
        serde_json::from_str(&response.into_string().await.unwrap()).unwrap()
    }

    async fn post<'c>(client: &'c Client, uri: Origin<'static>, body: &impl Serialize) -> LocalResponse<'c> {
        client
            .post(uri)
            .header(ContentType::JSON)
            .body(serde_json::to_string(body).unwrap())
            .dispatch()
            .await
    }

    async fn add_candidates(client: &Client) -> Vec<String> {
        let mut ids = Vec::new();
        for registration in [CandidateRegistration::example(), CandidateRegistration::example2()] {
            let response = post(client, uri!(add_candidate), &registration).await;
            assert_eq!(Status::Ok, response.status());
            let body: ApiResponse<CandidateDescription> = read(response).await;
            ids.push(body.data.unwrap().id.to_string());
        }
        ids
    }

    async fn create<'c>(client: &'c Client, request: &ElectionRequest) -> LocalResponse<'c> {
        post(client, uri!(create_election), request).await
    }

    #[backend_test(admin)]
    async fn register_voters(client: Client, db: Database) {
        let response = post(&client, uri!(register_voter), &VoterRegistration::example()).await;
        assert_eq!(Status::Ok, response.status());
        let body: ApiResponse<()> = read(response).await;
        assert!(body.success);
        assert_eq!(body.message, "Voter registered successfully.");

        let stored = Coll::<NewVoter>::from_db(&db)
            .find_one(doc! { "cnic": NewVoter::example().cnic.as_str() }, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.name, NewVoter::example().name);
        assert!(!stored.voted);

        // Duplicate CNIC.
        let response = post(&client, uri!(register_voter), &VoterRegistration::example()).await;
        assert_eq!(Status::Conflict, response.status());
        let body: ApiResponse<()> = read(response).await;
        assert_eq!(body.kind, Some(FailureKind::Conflict));
        assert_eq!(body.message, "Voter already registered.");

        // Bad date.
        let registration = VoterRegistration {
            dob: "15-06-1990".to_string(),
            ..VoterRegistration::example2()
        };
        let response = post(&client, uri!(register_voter), &registration).await;
        assert_eq!(Status::BadRequest, response.status());
        let body: ApiResponse<()> = read(response).await;
        assert_eq!(body.kind, Some(FailureKind::Validation));
        assert_eq!(body.message, "Invalid date format. Use YYYY-MM-DD.");
    }

    #[backend_test(admin)]
    async fn add_duplicate_candidate(client: Client) {
        add_candidates(&client).await;
        let response = post(&client, uri!(add_candidate), &CandidateRegistration::example()).await;
        assert_eq!(Status::Conflict, response.status());
        let body: ApiResponse<()> = read(response).await;
        assert_eq!(body.message, "Candidate already exists.");
    }

    #[backend_test(admin)]
    async fn election_lifecycle(client: Client, elections: Coll<Election>) {
        let candidate_ids = add_candidates(&client).await;
        let mut with_bogus = candidate_ids.clone();
        with_bogus.push(Id::new().to_string());

        // Create, silently dropping the unknown candidate.
        let request = ElectionRequest::current_example(with_bogus);
        let response = create(&client, &request).await;
        assert_eq!(Status::Ok, response.status());
        let scheduled = read::<ScheduledElection>(response).await.data.unwrap();
        let ballot: Vec<String> = scheduled.candidates.iter().map(|c| c.id.to_string()).collect();
        assert_eq!(ballot, candidate_ids);

        // The same window again conflicts.
        let response = create(&client, &request).await;
        assert_eq!(Status::Conflict, response.status());
        let body: ApiResponse<()> = read(response).await;
        assert_eq!(body.kind, Some(FailureKind::Conflict));

        // Editing an election against its own window is fine.
        let mut edited = ElectionRequest::current_example(vec![candidate_ids[1].clone()]);
        edited.name = "Renamed".to_string();
        let response = client
            .put(uri!(edit_election(*scheduled.id)))
            .header(ContentType::JSON)
            .body(serde_json::to_string(&edited).unwrap())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        let response = client.get(uri!(get_election(*scheduled.id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let description = read::<ElectionDescription>(response).await.data.unwrap();
        assert_eq!(description.name, "Renamed");
        assert_eq!(description.candidates.len(), 1);
        assert_eq!(description.turnout, 0);

        // Delete it, then it's gone.
        let response = client.delete(uri!(delete_election(*scheduled.id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(elections.count_documents(None, None).await.unwrap(), 0);
        let response = client.delete(uri!(delete_election(*scheduled.id))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
        let body: ApiResponse<()> = read(response).await;
        assert_eq!(body.message, "Election not found.");
    }

    #[backend_test(admin)]
    async fn bad_schedules(client: Client, elections: Coll<Election>) {
        // Backwards window.
        let mut request = ElectionRequest::current_example(vec![]);
        std::mem::swap(&mut request.start_date, &mut request.end_date);
        let response = create(&client, &request).await;
        assert_eq!(Status::BadRequest, response.status());
        let body: ApiResponse<()> = read(response).await;
        assert_eq!(body.message, "Invalid election schedule.");

        // Unparseable time.
        let request = ElectionRequest {
            start_date: "next tuesday".to_string(),
            ..ElectionRequest::current_example(vec![])
        };
        let response = create(&client, &request).await;
        assert_eq!(Status::BadRequest, response.status());

        assert_eq!(elections.count_documents(None, None).await.unwrap(), 0);
    }

    #[backend_test(admin)]
    async fn edit_missing_election(client: Client) {
        let request = ElectionRequest::future_example(vec![]);
        let response = client
            .put(uri!(edit_election(Id::new())))
            .header(ContentType::JSON)
            .body(serde_json::to_string(&request).unwrap())
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(voter)]
    async fn voters_cannot_manage(client: Client) {
        let response = create(&client, &ElectionRequest::current_example(vec![])).await;
        assert_eq!(Status::Forbidden, response.status());
        let body: ApiResponse<()> = read(response).await;
        assert_eq!(body.kind, Some(FailureKind::Authorization));

        let response = post(&client, uri!(register_voter), &VoterRegistration::example2()).await;
        assert_eq!(Status::Forbidden, response.status());
    }

    #[backend_test]
    async fn anonymous_cannot_manage(client: Client) {
        let response = create(&client, &ElectionRequest::current_example(vec![])).await;
        assert_eq!(Status::Unauthorized, response.status());
        let id: ApiId = Id::new().into();
        let response = client.get(uri!(get_election(*id))).dispatch().await;
        assert_eq!(Status::Unauthorized, response.status());
    }
}
