use rocket::{http::Status, serde::json::Json, Catcher, Request, Route};

use crate::{model::api::response::ApiResponse, service::FailureKind};

mod admin;
pub mod auth;
mod public;
mod voting;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(admin::routes());
    routes.extend(public::routes());
    routes.extend(auth::routes());
    routes.extend(voting::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![fallback]
}

/// Wrap every error without a body of its own in the usual envelope.
#[catch(default)]
fn fallback(status: Status, _req: &Request<'_>) -> (Status, Json<ApiResponse<()>>) {
    let mut body = ApiResponse::failure(status.reason().unwrap_or("Unknown error"));
    if status == Status::Unauthorized || status == Status::Forbidden {
        body.kind = Some(FailureKind::Authorization);
    }
    (status, Json(body))
}
