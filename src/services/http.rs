use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use tokio::sync::{mpsc, oneshot};
use tower_http::trace::TraceLayer;

use super::admin::AdminRequest;
use super::auth::AuthRequest;
use super::dashboard::DashboardRequest;
use super::gate::{self, Gate, Page};
use super::ServiceError;
use crate::models::users::Session;

mod admin;
mod auth;
mod dashboard;
mod extract;

#[derive(Clone)]
pub struct AppState {
    pub auth_channel: mpsc::Sender<AuthRequest>,
    pub dashboard_channel: mpsc::Sender<DashboardRequest>,
    pub admin_channel: mpsc::Sender<AdminRequest>,
}

/// The caller's session, resolved once per request by `resolve_session`.
#[derive(Clone, Debug, Default)]
pub struct CurrentSession(pub Option<Session>);

pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self.0 {
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
            ServiceError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad request"),
            ServiceError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "Unauthenticated"),
            ServiceError::ExternalService(..) => (StatusCode::BAD_GATEWAY, "External service error"),
            ServiceError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            ServiceError::Communication(..) | ServiceError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (
            status,
            Json(json!({
                "error": error,
                "details": self.0.details()
            })),
        )
            .into_response()
    }
}

/// Sends a request to a service and waits for its reply.
pub(crate) async fn dispatch<R, T>(
    channel: &mpsc::Sender<R>,
    service: &str,
    build: impl FnOnce(oneshot::Sender<Result<T, ServiceError>>) -> R,
) -> Result<T, ApiError>
where
    R: Send,
    T: Send,
{
    let (response_tx, response_rx) = oneshot::channel();

    channel
        .send(build(response_tx))
        .await
        .map_err(|e| ServiceError::Communication(service.to_string(), e.to_string()))?;

    let result = response_rx
        .await
        .map_err(|e| ServiceError::Communication(service.to_string(), e.to_string()))?;

    result.map_err(ApiError::from)
}

/// Applies the page gate, turning a refusal into a `303 See Other`.
pub(crate) fn guard(current: &CurrentSession, page: Page) -> Result<Session, Response> {
    match gate::gate(current.0.as_ref(), page) {
        Gate::Allow(session) => Ok(session.clone()),
        Gate::Redirect(to) => Err(Redirect::to(to).into_response()),
    }
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

async fn resolve_session(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let session = match bearer_token(request.headers()) {
        Some(access_token) => {
            let resolved = dispatch(&state.auth_channel, "Auth", |response| {
                AuthRequest::ResolveSession {
                    access_token,
                    response,
                }
            })
            .await;

            match resolved {
                Ok(session) => session,
                Err(e) => return e.into_response(),
            }
        }
        None => None,
    };

    request.extensions_mut().insert(CurrentSession(session));
    next.run(request).await
}

async fn landing() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn router(state: AppState) -> Router {
    // Share tokens are 32 hex characters, so they never collide with `users`.
    let gated = Router::new()
        .route("/dashboard", get(dashboard::own_dashboard))
        .route("/admin", get(admin::overview))
        .route("/admin/users", post(admin::create_user))
        .route(
            "/admin/users/{profile_id}/financials",
            put(admin::update_financials),
        )
        .route(
            "/admin/users/{profile_id}/transactions",
            post(admin::add_transaction),
        )
        .route("/admin/{share_token}", get(admin::personalized))
        .route_layer(middleware::from_fn_with_state(state.clone(), resolve_session));

    Router::new()
        .route("/", get(landing))
        .route("/health", get(|| async { "OK" }))
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/sign-out", post(auth::sign_out))
        .route("/shared/{share_token}", get(dashboard::shared_dashboard))
        .merge(gated)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_http_server(listen: &str, state: AppState) -> Result<(), anyhow::Error> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(listen).await?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
