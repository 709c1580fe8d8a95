use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;
use uuid::Uuid;

use super::links::LinkBuilder;
use super::{RequestHandler, Service, ServiceError};
use crate::models::{
    financials::FinancialsUpdate,
    profiles::{ProfileWithFinancials, UserProfile},
    referrals::ReferralTotals,
    transactions::{NewTransaction, UserTransaction},
    users::{CreateUserRequest, Session},
    views::{AdminOverview, AdminProfileView, PersonalizedAdminView, UserRow},
};
use crate::repositories::{PortalStore, UserProvisioner};

pub enum AdminRequest {
    Overview {
        session: Session,
        response: oneshot::Sender<Result<AdminOverview, ServiceError>>,
    },
    Personalized {
        share_token: String,
        response: oneshot::Sender<Result<PersonalizedAdminView, ServiceError>>,
    },
    CreateUser {
        session: Session,
        request: CreateUserRequest,
        response: oneshot::Sender<Result<Value, ServiceError>>,
    },
    UpdateFinancials {
        profile_id: Uuid,
        update: FinancialsUpdate,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
    AddTransaction {
        profile_id: Uuid,
        transaction: NewTransaction,
        response: oneshot::Sender<Result<UserTransaction, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct AdminRequestHandler {
    store: Arc<dyn PortalStore>,
    provisioner: Arc<dyn UserProvisioner>,
    links: LinkBuilder,
}

impl AdminRequestHandler {
    pub fn new(
        store: Arc<dyn PortalStore>,
        provisioner: Arc<dyn UserProvisioner>,
        links: LinkBuilder,
    ) -> Self {
        AdminRequestHandler {
            store,
            provisioner,
            links,
        }
    }

    fn admin_view(&self, profile: &UserProfile) -> AdminProfileView {
        AdminProfileView {
            id: profile.id,
            full_name: profile.full_name.clone(),
            email: profile.email.clone(),
            share_token: profile.share_token.clone(),
            referral_link: self.links.referral(profile.id),
            admin_link: self.links.personalized_admin(&profile.share_token),
        }
    }

    fn user_rows(&self, profiles: Vec<ProfileWithFinancials>) -> Vec<UserRow> {
        profiles
            .into_iter()
            .map(|entry| {
                let summary = entry.summary();
                let share_link = self.links.shared_dashboard(&entry.profile.share_token);
                UserRow::new(entry.profile, summary, entry.financials.is_some(), share_link)
            })
            .collect()
    }

    pub(crate) async fn overview(&self, session: &Session) -> Result<AdminOverview, ServiceError> {
        // A missing admin profile only hides the links; the list still loads.
        let admin = match self.store.profile_by_user_id(session.user.id).await {
            Ok(profile) => profile.map(|profile| self.admin_view(&profile)),
            Err(e) => {
                log::error!("Error fetching admin profile {}: {}", session.user.id, e);
                None
            }
        };

        let users = self
            .store
            .profiles_with_financials()
            .await
            .map_err(ServiceError::database)?;

        Ok(AdminOverview {
            admin,
            users: self.user_rows(users),
        })
    }

    /// Resolves the admin behind `share_token` and sums the financials of the
    /// users they referred.
    pub(crate) async fn personalized(&self, share_token: &str) -> Result<PersonalizedAdminView, ServiceError> {
        let admin = self
            .store
            .profile_by_share_token(share_token)
            .await
            .map_err(ServiceError::database)?
            .ok_or_else(|| ServiceError::NotFound("Admin profile not found".to_string()))?;

        let referred = self
            .store
            .referred_profiles(admin.id)
            .await
            .map_err(ServiceError::database)?;
        let totals = ReferralTotals::from_profiles(&referred);

        Ok(PersonalizedAdminView {
            admin: self.admin_view(&admin),
            users: self.user_rows(referred),
            totals,
        })
    }

    async fn create_user(&self, session: &Session, request: CreateUserRequest) -> Result<Value, ServiceError> {
        let email = request.email.clone();
        let created = self
            .provisioner
            .create_user(&session.access_token, &request)
            .await
            .map_err(|e| ServiceError::external("AdminService", "admin-create-user", e))?;

        log::info!("Admin {} created user {}.", session.user.id, email);
        Ok(created)
    }

    pub(crate) async fn update_financials(
        &self,
        profile_id: Uuid,
        update: &FinancialsUpdate,
    ) -> Result<(), ServiceError> {
        let updated = self
            .store
            .update_financials(profile_id, update)
            .await
            .map_err(ServiceError::database)?;

        if updated == 0 {
            return Err(ServiceError::NotFound(format!(
                "No financials row for profile {}",
                profile_id
            )));
        }

        Ok(())
    }

    async fn add_transaction(
        &self,
        profile_id: Uuid,
        transaction: &NewTransaction,
    ) -> Result<UserTransaction, ServiceError> {
        self.store
            .insert_transaction(profile_id, transaction)
            .await
            .map_err(ServiceError::database)
    }
}

#[async_trait]
impl RequestHandler<AdminRequest> for AdminRequestHandler {
    async fn handle_request(&self, request: AdminRequest) {
        match request {
            AdminRequest::Overview { session, response } => {
                let overview = self.overview(&session).await;
                let _ = response.send(overview);
            }
            AdminRequest::Personalized {
                share_token,
                response,
            } => {
                let view = self.personalized(&share_token).await;
                let _ = response.send(view);
            }
            AdminRequest::CreateUser {
                session,
                request,
                response,
            } => {
                let created = self.create_user(&session, request).await;
                if let Err(e) = &created {
                    log::error!("User creation failed: {}", e);
                }
                let _ = response.send(created);
            }
            AdminRequest::UpdateFinancials {
                profile_id,
                update,
                response,
            } => {
                let result = self.update_financials(profile_id, &update).await;
                let _ = response.send(result);
            }
            AdminRequest::AddTransaction {
                profile_id,
                transaction,
                response,
            } => {
                let result = self.add_transaction(profile_id, &transaction).await;
                let _ = response.send(result);
            }
        }
    }
}

pub struct AdminService;

impl AdminService {
    pub fn new() -> Self {
        AdminService {}
    }
}

#[async_trait]
impl Service<AdminRequest, AdminRequestHandler> for AdminService {}
