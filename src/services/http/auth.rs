use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::extract::{ApiJson, ApiQuery};
use super::{bearer_token, dispatch, AppState};
use crate::models::users::{Credentials, SignUp};
use crate::services::auth::AuthRequest;

#[derive(Debug, Deserialize)]
pub struct ReferralQuery {
    #[serde(rename = "ref")]
    referred_by: Option<String>,
}

pub async fn sign_in(State(state): State<AppState>, ApiJson(credentials): ApiJson<Credentials>) -> Response {
    let outcome = dispatch(&state.auth_channel, "Auth", |response| AuthRequest::SignIn {
        credentials,
        response,
    })
    .await;

    match outcome {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn sign_up(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ReferralQuery>,
    ApiJson(request): ApiJson<SignUp>,
) -> Response {
    let result = dispatch(&state.auth_channel, "Auth", |response| AuthRequest::SignUp {
        request,
        referred_by: query.referred_by,
        response,
    })
    .await;

    match result {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Check your email to confirm your account, then return here to login!"
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(access_token) = bearer_token(&headers) else {
        return StatusCode::NO_CONTENT.into_response();
    };

    let result = dispatch(&state.auth_channel, "Auth", |response| AuthRequest::SignOut {
        access_token,
        response,
    })
    .await;

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
