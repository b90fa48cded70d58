use std::marker::PhantomData;

use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use mongodb::{bson::doc, Database};
use rocket::{
    http::{Cookie, SameSite, Status},
    request::{FromRequest, Outcome},
    time::Duration,
    Request, State,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::{Error, Result},
    model::{
        common::{Cnic, Role},
        db::{admin::Admin, voter::Voter},
        mongodb::Coll,
    },
    service::{Caller, Rejection},
};

use super::user::User;

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// An authentication token naming a user by CNIC, along with their role.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthToken<U> {
    #[serde(rename = "sub")]
    pub cnic: Cnic,
    #[serde(rename = "rgt")]
    pub role: Role,
    #[serde(skip)]
    phantom: PhantomData<U>,
}

impl<U> AuthToken<U> {
    pub fn new(cnic: Cnic, role: Role) -> Self {
        Self {
            cnic,
            role,
            phantom: PhantomData,
        }
    }

    /// The identity handed to the services.
    pub fn caller(&self) -> Caller {
        Caller {
            id: self.cnic.to_string(),
            role: self.role,
        }
    }

    /// Serialize this token into a cookie.
    pub fn into_cookie(self, config: &Config) -> Result<Cookie<'static>> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };

        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )?;

        Ok(Cookie::build(AUTH_TOKEN_COOKIE, token)
            .max_age(Duration::seconds(config.auth_ttl().num_seconds()))
            .http_only(true)
            .same_site(SameSite::Strict)
            .finish())
    }

    /// Deserialize a token from a cookie.
    pub fn from_cookie(cookie: &Cookie<'_>, config: &Config) -> Result<Self> {
        let token = jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims<U>>| claims.claims.token)?;
        Ok(token)
    }
}

/// Cookie claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims<U> {
    #[serde(flatten, bound = "")]
    token: AuthToken<U>,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

/// Does the user named by the token still exist?
async fn user_exists(db: &Database, cnic: &Cnic, role: Role) -> Result<bool> {
    let filter = doc! { "cnic": cnic.as_str() };
    let count = match role {
        Role::Voter => Coll::<Voter>::from_db(db).count_documents(filter, None).await?,
        Role::Admin => Coll::<Admin>::from_db(db).count_documents(filter, None).await?,
    };
    Ok(count > 0)
}

#[rocket::async_trait]
impl<'r, U> FromRequest<'r> for AuthToken<U>
where
    U: User + Send,
{
    type Error = Error;

    /// Get an [`AuthToken`] from the cookie, check its role is acceptable for
    /// this user type, and check the user still exists.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let unauthorized = || {
            Outcome::Failure((
                Status::Unauthorized,
                Error::Status(Status::Unauthorized, "Not logged in.".to_string()),
            ))
        };

        // Unwrap is safe as `Config` is always managed.
        let config = req.guard::<&State<Config>>().await.unwrap();

        let Some(cookie) = req.cookies().get(AUTH_TOKEN_COOKIE) else {
            return unauthorized();
        };
        let Ok(token) = Self::from_cookie(cookie, config) else {
            return unauthorized();
        };

        if let Some(required) = U::ROLE {
            if token.role != required {
                let rejection = Rejection::Forbidden("You do not have access to this resource.");
                return Outcome::Failure((Status::Forbidden, rejection.into()));
            }
        }

        let db = req.guard::<&State<Database>>().await.unwrap();
        match user_exists(db, &token.cnic, token.role).await {
            Ok(true) => Outcome::Success(token),
            Ok(false) => unauthorized(),
            Err(e) => Outcome::Failure((Status::InternalServerError, e)),
        }
    }
}
