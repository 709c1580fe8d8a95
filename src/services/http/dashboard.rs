use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};

use super::extract::ApiPath;
use super::{dispatch, guard, AppState, CurrentSession};
use crate::services::dashboard::DashboardRequest;
use crate::services::gate::Page;

pub async fn own_dashboard(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> Response {
    let session = match guard(&current, Page::Dashboard) {
        Ok(session) => session,
        Err(redirect) => return redirect,
    };

    let dashboard = dispatch(&state.dashboard_channel, "Dashboard", |response| {
        DashboardRequest::Own { session, response }
    })
    .await;

    match dashboard {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Public, read-only.
pub async fn shared_dashboard(
    State(state): State<AppState>,
    ApiPath(share_token): ApiPath<String>,
) -> Response {
    let dashboard = dispatch(&state.dashboard_channel, "Dashboard", |response| {
        DashboardRequest::Shared {
            share_token,
            response,
        }
    })
    .await;

    match dashboard {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => e.into_response(),
    }
}
