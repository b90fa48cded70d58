use mongodb::bson::doc;
use rocket::{
    http::{Cookie, CookieJar},
    serde::json::Json,
    Route, State,
};

use crate::{
    config::Config,
    error::Result,
    model::{
        api::{
            auth::{Anyone, AuthToken, LoginRequest, AUTH_TOKEN_COOKIE},
            response::ApiResponse,
        },
        common::{time::parse_date, Cnic, Role},
        db::{admin::Admin, voter::Voter},
        mongodb::Coll,
    },
    service::Rejection,
};

pub fn routes() -> Vec<Route> {
    routes![login, logout]
}

/// Log in as whoever matches the CNIC and date of birth, checking voters
/// before admins.
#[post("/auth/login", data = "<credentials>", format = "json")]
pub async fn login(
    cookies: &CookieJar<'_>,
    credentials: Json<LoginRequest>,
    voters: Coll<Voter>,
    admins: Coll<Admin>,
    config: &State<Config>,
) -> Result<Json<ApiResponse<Role>>> {
    let (Ok(cnic), Ok(dob)) = (
        credentials.cnic.parse::<Cnic>(),
        parse_date(&credentials.dob),
    ) else {
        return Err(Rejection::InvalidCredentials.into());
    };

    let filter = doc! {
        "cnic": cnic.as_str(),
        "dob": dob.format("%Y-%m-%d").to_string(),
    };
    let role = if voters.find_one(filter.clone(), None).await?.is_some() {
        Role::Voter
    } else if admins.find_one(filter, None).await?.is_some() {
        Role::Admin
    } else {
        return Err(Rejection::InvalidCredentials.into());
    };

    let token = AuthToken::<Anyone>::new(cnic, role);
    cookies.add(token.into_cookie(config)?);

    Ok(Json(ApiResponse::ok("Logged in.", role)))
}

#[delete("/auth")]
pub fn logout(cookies: &CookieJar<'_>) -> Json<ApiResponse<()>> {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Json(ApiResponse::done("Logged out."))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json::{self, json},
    };

    use crate::model::db::{admin::NewAdmin, voter::NewVoter};

    use super::*;

    async fn login_as(client: &Client, credentials: &LoginRequest) -> (Status, ApiResponse<Role>) {
        let response = client
            .post(uri!(login))
            .header(ContentType::JSON)
            .body(json!(credentials).to_string())
            .dispatch()
            .await;
        let status = response.status();
        let body = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        (status, body)
    }

    #[backend_test]
    async fn admin_login(client: Client, admins: Coll<NewAdmin>) {
        admins.insert_one(NewAdmin::example(), None).await.unwrap();

        let (status, body) = login_as(&client, &LoginRequest::admin_example()).await;
        assert_eq!(Status::Ok, status);
        assert_eq!(body.data, Some(Role::Admin));
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
    }

    #[backend_test]
    async fn voter_login(client: Client, voters: Coll<NewVoter>) {
        voters.insert_one(NewVoter::example(), None).await.unwrap();

        let (status, body) = login_as(&client, &LoginRequest::voter_example()).await;
        assert_eq!(Status::Ok, status);
        assert_eq!(body.data, Some(Role::Voter));
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
    }

    #[backend_test]
    async fn bad_credentials(client: Client, voters: Coll<NewVoter>) {
        voters.insert_one(NewVoter::example(), None).await.unwrap();

        // Right CNIC, wrong date of birth.
        let credentials = LoginRequest {
            dob: "2000-01-01".to_string(),
            ..LoginRequest::voter_example()
        };
        let (status, body) = login_as(&client, &credentials).await;
        assert_eq!(Status::Unauthorized, status);
        assert!(!body.success);
        assert_eq!(body.message, "Invalid credentials");
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));

        // Garbage.
        let credentials = LoginRequest {
            cnic: "{ $ne: 1 }".to_string(),
            dob: "yesterday".to_string(),
        };
        let (status, _) = login_as(&client, &credentials).await;
        assert_eq!(Status::Unauthorized, status);
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
    }

    #[backend_test(voter)]
    async fn logout_removes_cookie(client: Client) {
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
        let response = client.delete(uri!(logout)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
    }
}
