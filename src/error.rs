use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use mongodb::{bson::ser::Error as BsonError, error::Error as DbError};
use rocket::{http::Status, response::Responder, serde::json::Json, Request};
use thiserror::Error;

use crate::{model::api::response::ApiResponse, service::Rejection};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Bson(#[from] BsonError),
    #[error(transparent)]
    Rejected(#[from] Rejection),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Rejected(rejection) => rejection.status(),
            Self::Status(status, _) => *status,
            Self::Db(_) | Self::Bson(_) => Status::InternalServerError,
            Self::Jwt(err) => match err.kind() {
                JwtErrorKind::ExpiredSignature | JwtErrorKind::ImmatureSignature => {
                    Status::Unauthorized
                }
                _ => Status::BadRequest,
            },
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        match self {
            Self::Rejected(rejection) => {
                debug!("Rejected: {rejection}");
                (status, Json(ApiResponse::<()>::rejected(&rejection))).respond_to(req)
            }
            Self::Status(_, message) => {
                debug!("{status}: {message}");
                (status, Json(ApiResponse::<()>::failure(message))).respond_to(req)
            }
            err => {
                error!("{err}");
                // Handled by the catchers.
                Err(status)
            }
        }
    }
}
