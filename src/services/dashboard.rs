use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::{
    financials::FinancialsSummary,
    profiles::UserProfile,
    users::Session,
    views::{DashboardView, TransactionView},
};
use crate::repositories::PortalStore;

pub enum DashboardRequest {
    /// The signed-in user's own dashboard.
    Own {
        session: Session,
        response: oneshot::Sender<Result<DashboardView, ServiceError>>,
    },
    /// Read-only dashboard behind `/shared/<share_token>`.
    Shared {
        share_token: String,
        response: oneshot::Sender<Result<DashboardView, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct DashboardRequestHandler {
    store: Arc<dyn PortalStore>,
}

impl DashboardRequestHandler {
    pub fn new(store: Arc<dyn PortalStore>) -> Self {
        DashboardRequestHandler { store }
    }

    pub(crate) async fn own_dashboard(&self, session: &Session) -> Result<DashboardView, ServiceError> {
        let profile = self
            .store
            .profile_by_user_id(session.user.id)
            .await
            .map_err(ServiceError::database)?;

        // Without a profile there is nothing to join; show the defaults.
        let Some(profile) = profile else {
            return Ok(DashboardView {
                welcome_name: session.user.display_name(),
                financials: FinancialsSummary::default().into(),
                transactions: Vec::new(),
            });
        };

        self.build(&profile, session.user.display_name()).await
    }

    pub(crate) async fn shared_dashboard(&self, share_token: &str) -> Result<DashboardView, ServiceError> {
        let profile = self
            .store
            .profile_by_share_token(share_token)
            .await
            .map_err(ServiceError::database)?
            .ok_or_else(|| ServiceError::NotFound("Shared dashboard not found".to_string()))?;

        let welcome_name = profile.full_name.clone();
        self.build(&profile, welcome_name).await
    }

    async fn build(&self, profile: &UserProfile, welcome_name: String) -> Result<DashboardView, ServiceError> {
        let financials = self
            .store
            .financials_for(profile.id)
            .await
            .map_err(ServiceError::database)?;

        let mut transactions = self
            .store
            .transactions_for(profile.id)
            .await
            .map_err(ServiceError::database)?;
        transactions.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));

        Ok(DashboardView {
            welcome_name,
            financials: FinancialsSummary::of(financials.as_ref()).into(),
            transactions: transactions.into_iter().map(TransactionView::from).collect(),
        })
    }
}

#[async_trait]
impl RequestHandler<DashboardRequest> for DashboardRequestHandler {
    async fn handle_request(&self, request: DashboardRequest) {
        match request {
            DashboardRequest::Own { session, response } => {
                let dashboard = self.own_dashboard(&session).await;
                if let Err(e) = &dashboard {
                    log::error!("Dashboard for {} failed: {}", session.user.id, e);
                }
                let _ = response.send(dashboard);
            }
            DashboardRequest::Shared {
                share_token,
                response,
            } => {
                let dashboard = self.shared_dashboard(&share_token).await;
                let _ = response.send(dashboard);
            }
        }
    }
}

pub struct DashboardService;

impl DashboardService {
    pub fn new() -> Self {
        DashboardService {}
    }
}

#[async_trait]
impl Service<DashboardRequest, DashboardRequestHandler> for DashboardService {}
