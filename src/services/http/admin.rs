use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath};
use super::{dispatch, guard, AppState, CurrentSession};
use crate::models::{financials::FinancialsUpdate, transactions::NewTransaction, users::CreateUserRequest};
use crate::services::admin::AdminRequest;
use crate::services::gate::Page;

pub async fn overview(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> Response {
    let session = match guard(&current, Page::Admin) {
        Ok(session) => session,
        Err(redirect) => return redirect,
    };

    let overview = dispatch(&state.admin_channel, "Admin", |response| {
        AdminRequest::Overview { session, response }
    })
    .await;

    match overview {
        Ok(overview) => (StatusCode::OK, Json(overview)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn personalized(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    ApiPath(share_token): ApiPath<String>,
) -> Response {
    if let Err(redirect) = guard(&current, Page::PersonalizedAdmin) {
        return redirect;
    }

    let view = dispatch(&state.admin_channel, "Admin", |response| {
        AdminRequest::Personalized {
            share_token,
            response,
        }
    })
    .await;

    match view {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> Response {
    let session = match guard(&current, Page::Admin) {
        Ok(session) => session,
        Err(redirect) => return redirect,
    };

    let created = dispatch(&state.admin_channel, "Admin", |response| {
        AdminRequest::CreateUser {
            session,
            request,
            response,
        }
    })
    .await;

    match created {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_financials(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    ApiPath(profile_id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<FinancialsUpdate>,
) -> Response {
    if let Err(redirect) = guard(&current, Page::Admin) {
        return redirect;
    }

    let result = dispatch(&state.admin_channel, "Admin", |response| {
        AdminRequest::UpdateFinancials {
            profile_id,
            update,
            response,
        }
    })
    .await;

    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"message": "Financial data updated successfully"})),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn add_transaction(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    ApiPath(profile_id): ApiPath<Uuid>,
    ApiJson(transaction): ApiJson<NewTransaction>,
) -> Response {
    if let Err(redirect) = guard(&current, Page::Admin) {
        return redirect;
    }

    let created = dispatch(&state.admin_channel, "Admin", |response| {
        AdminRequest::AddTransaction {
            profile_id,
            transaction,
            response,
        }
    })
    .await;

    match created {
        Ok(transaction) => (StatusCode::CREATED, Json(transaction)).into_response(),
        Err(e) => e.into_response(),
    }
}
