use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::gate::{ADMIN_PAGE, DASHBOARD_PAGE};
use super::links::LinkBuilder;
use super::{RequestHandler, Service, ServiceError};
use crate::models::{
    roles::Role,
    users::{Credentials, Session, SignUp, SignUpMetadata},
    views::SignInOutcome,
};
use crate::repositories::{AuthProvider, PortalStore, Rejected};

pub enum AuthRequest {
    SignIn {
        credentials: Credentials,
        response: oneshot::Sender<Result<SignInOutcome, ServiceError>>,
    },
    SignUp {
        request: SignUp,
        referred_by: Option<String>,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
    SignOut {
        access_token: String,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
    ResolveSession {
        access_token: String,
        response: oneshot::Sender<Result<Option<Session>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct AuthRequestHandler {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn PortalStore>,
    links: LinkBuilder,
}

impl AuthRequestHandler {
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<dyn PortalStore>, links: LinkBuilder) -> Self {
        AuthRequestHandler { auth, store, links }
    }

    /// Signs in and picks the landing page: admins go to their personalized
    /// admin page, everybody else to the dashboard.
    pub(crate) async fn sign_in(&self, credentials: Credentials) -> Result<SignInOutcome, ServiceError> {
        let tokens = self
            .auth
            .sign_in(&credentials.email, &credentials.password)
            .await
            .map_err(|e| match e.downcast_ref::<Rejected>() {
                Some(Rejected(message)) => ServiceError::Unauthenticated(message.clone()),
                None => ServiceError::external("AuthService", "Auth", e),
            })?;

        // Tokens are already issued: a failed lookup lands on the dashboard.
        let profile = match self.store.profile_by_user_id(tokens.user.id).await {
            Ok(profile) => profile,
            Err(e) => {
                log::error!("Could not load profile for {}: {}", tokens.user.id, e);
                None
            }
        };

        let redirect_to = match profile {
            Some(profile) if profile.is_admin && !profile.share_token.is_empty() => {
                format!("{}/{}", ADMIN_PAGE, profile.share_token)
            }
            Some(profile) if profile.is_admin => ADMIN_PAGE.to_string(),
            _ => DASHBOARD_PAGE.to_string(),
        };

        log::info!("User {} signed in.", tokens.user.id);

        Ok(SignInOutcome {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            redirect_to,
        })
    }

    pub(crate) async fn sign_up(&self, request: SignUp, referred_by: Option<String>) -> Result<(), ServiceError> {
        let metadata = SignUpMetadata {
            full_name: request.full_name,
            username: request.username.filter(|username| !username.is_empty()),
            referred_by: referred_by.filter(|referrer| !referrer.is_empty()),
        };

        self.auth
            .sign_up(
                &request.email,
                &request.password,
                &self.links.email_redirect(),
                &metadata,
            )
            .await
            .map_err(|e| ServiceError::external("AuthService", "Auth", e))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ServiceError> {
        self.auth
            .sign_out(access_token)
            .await
            .map_err(|e| ServiceError::external("AuthService", "Auth", e))
    }

    /// Resolves a bearer token into a session. A user without a role row is a
    /// regular user.
    pub(crate) async fn resolve_session(&self, access_token: String) -> Result<Option<Session>, ServiceError> {
        let user = self
            .auth
            .get_user(&access_token)
            .await
            .map_err(|e| ServiceError::external("AuthService", "Auth", e))?;

        let Some(user) = user else {
            return Ok(None);
        };

        let role = self
            .store
            .role_for(user.id)
            .await
            .map_err(ServiceError::database)?
            .unwrap_or(Role::User);

        Ok(Some(Session {
            user,
            role,
            access_token,
        }))
    }
}

#[async_trait]
impl RequestHandler<AuthRequest> for AuthRequestHandler {
    async fn handle_request(&self, request: AuthRequest) {
        match request {
            AuthRequest::SignIn {
                credentials,
                response,
            } => {
                let outcome = self.sign_in(credentials).await;
                let _ = response.send(outcome);
            }
            AuthRequest::SignUp {
                request,
                referred_by,
                response,
            } => {
                let result = self.sign_up(request, referred_by).await;
                let _ = response.send(result);
            }
            AuthRequest::SignOut {
                access_token,
                response,
            } => {
                let result = self.sign_out(&access_token).await;
                let _ = response.send(result);
            }
            AuthRequest::ResolveSession {
                access_token,
                response,
            } => {
                let session = self.resolve_session(access_token).await;
                let _ = response.send(session);
            }
        }
    }
}

pub struct AuthService;

impl AuthService {
    pub fn new() -> Self {
        AuthService {}
    }
}

#[async_trait]
impl Service<AuthRequest, AuthRequestHandler> for AuthService {}
