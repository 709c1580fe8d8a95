use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::repositories::{
    auth::AuthApi, functions::FunctionsApi, AuthProvider, PgStore, PortalStore, Rejected,
    UserProvisioner,
};
use crate::settings::Settings;
use crate::utils::retry::RetryPolicy;

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod gate;
pub mod http;
pub mod links;

const CHANNEL_CAPACITY: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Communication error: {0} - {1}")]
    Communication(String, String),
    #[error("External service error: {0} -> {1} => {2}")]
    ExternalService(String, String, String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),
}

impl ServiceError {
    /// The underlying message, as reported by whoever produced it.
    pub fn details(&self) -> &str {
        match self {
            ServiceError::Internal(message)
            | ServiceError::Database(message)
            | ServiceError::NotFound(message)
            | ServiceError::BadRequest(message)
            | ServiceError::Unauthenticated(message) => message,
            ServiceError::Communication(_, message) => message,
            ServiceError::ExternalService(_, _, message) => message,
        }
    }

    pub(crate) fn database(e: anyhow::Error) -> Self {
        ServiceError::Database(e.to_string())
    }

    /// Backend rejections keep their message and become bad requests.
    pub(crate) fn external(caller: &str, service: &str, e: anyhow::Error) -> Self {
        match e.downcast_ref::<Rejected>() {
            Some(Rejected(message)) => ServiceError::BadRequest(message.clone()),
            None => ServiceError::ExternalService(caller.to_string(), service.to_string(), e.to_string()),
        }
    }
}

#[async_trait]
pub trait RequestHandler<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn handle_request(&self, request: T);
}

#[async_trait]
pub trait Service<T, H>: Send + Sync + 'static
where
    T: Send + 'static,
    H: RequestHandler<T> + Clone + Send,
{
    async fn run(&mut self, handler: H, receiver: &mut mpsc::Receiver<T>) {
        while let Some(request) = receiver.recv().await {
            let handler = handler.clone();

            tokio::spawn(async move {
                handler.handle_request(request).await;
            });
        }
    }
}

/// Everything the services talk to outside the process.
#[derive(Clone)]
pub struct Backends {
    pub store: Arc<dyn PortalStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub provisioner: Arc<dyn UserProvisioner>,
    pub links: links::LinkBuilder,
}

/// Spawns the auth, dashboard and admin services and returns the channels the
/// HTTP layer uses to reach them.
pub fn spawn_services(backends: Backends) -> http::AppState {
    let (auth_tx, mut auth_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (dashboard_tx, mut dashboard_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (admin_tx, mut admin_rx) = mpsc::channel(CHANNEL_CAPACITY);

    let mut auth_service = auth::AuthService::new();
    let mut dashboard_service = dashboard::DashboardService::new();
    let mut admin_service = admin::AdminService::new();

    log::info!("Starting auth service.");
    let auth_handler = auth::AuthRequestHandler::new(
        backends.auth.clone(),
        backends.store.clone(),
        backends.links.clone(),
    );
    tokio::spawn(async move {
        auth_service.run(auth_handler, &mut auth_rx).await;
    });

    log::info!("Starting dashboard service.");
    let dashboard_handler = dashboard::DashboardRequestHandler::new(backends.store.clone());
    tokio::spawn(async move {
        dashboard_service
            .run(dashboard_handler, &mut dashboard_rx)
            .await;
    });

    log::info!("Starting admin service.");
    let admin_handler = admin::AdminRequestHandler::new(
        backends.store,
        backends.provisioner,
        backends.links,
    );
    tokio::spawn(async move {
        admin_service.run(admin_handler, &mut admin_rx).await;
    });

    http::AppState {
        auth_channel: auth_tx,
        dashboard_channel: dashboard_tx,
        admin_channel: admin_tx,
    }
}

pub async fn start_services(pool: PgPool, settings: Settings) -> Result<(), anyhow::Error> {
    let retry = RetryPolicy::from(&settings.resilience);

    let backends = Backends {
        store: Arc::new(PgStore::new(pool, retry.clone())),
        auth: Arc::new(AuthApi::new(
            settings.auth.url,
            settings.auth.api_key.clone(),
            retry.clone(),
        )),
        provisioner: Arc::new(FunctionsApi::new(
            settings.functions.url,
            settings.auth.api_key,
            retry,
        )),
        links: links::LinkBuilder::new(&settings.server.public_origin),
    };

    let state = spawn_services(backends);

    log::info!("Starting HTTP server.");
    http::start_http_server(&settings.server.listen, state).await
}
