use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    financials::{FinancialsUpdate, UserFinancials},
    profiles::{ProfileWithFinancials, UserProfile},
    roles::Role,
    transactions::{NewTransaction, UserTransaction},
    users::{AuthTokens, AuthUser, CreateUserRequest, SignUpMetadata},
};
use crate::utils::retry::RetryPolicy;

pub mod auth;
pub mod financials;
pub mod functions;
pub mod profiles;
pub mod roles;
pub mod transactions;

/// A 4xx answer from the hosted backend. Carries the backend's own message.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Rejected(pub String);

/// Extracts the human readable message from a hosted backend error body.
pub(crate) fn backend_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| json.get(key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Table access the portal services depend on.
#[async_trait]
pub trait PortalStore: Send + Sync + 'static {
    async fn profile_by_user_id(&self, user_id: Uuid) -> Result<Option<UserProfile>, anyhow::Error>;

    async fn profile_by_share_token(
        &self,
        share_token: &str,
    ) -> Result<Option<UserProfile>, anyhow::Error>;

    /// Every visible profile, newest first.
    async fn profiles_with_financials(&self) -> Result<Vec<ProfileWithFinancials>, anyhow::Error>;

    /// Profiles whose `referred_by` is `referrer_id`, newest first.
    async fn referred_profiles(
        &self,
        referrer_id: Uuid,
    ) -> Result<Vec<ProfileWithFinancials>, anyhow::Error>;

    async fn financials_for(&self, profile_id: Uuid) -> Result<Option<UserFinancials>, anyhow::Error>;

    async fn transactions_for(&self, profile_id: Uuid) -> Result<Vec<UserTransaction>, anyhow::Error>;

    async fn role_for(&self, user_id: Uuid) -> Result<Option<Role>, anyhow::Error>;

    /// Returns the number of rows updated.
    async fn update_financials(
        &self,
        profile_id: Uuid,
        update: &FinancialsUpdate,
    ) -> Result<u64, anyhow::Error>;

    async fn insert_transaction(
        &self,
        profile_id: Uuid,
        transaction: &NewTransaction,
    ) -> Result<UserTransaction, anyhow::Error>;
}

/// The hosted auth service.
#[async_trait]
pub trait AuthProvider: Send + Sync + 'static {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthTokens, anyhow::Error>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        email_redirect_to: &str,
        metadata: &SignUpMetadata,
    ) -> Result<(), anyhow::Error>;

    async fn sign_out(&self, access_token: &str) -> Result<(), anyhow::Error>;

    /// `None` when the token is not accepted.
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, anyhow::Error>;
}

/// The privileged user-creation function. Runs server side with elevated
/// rights; the caller's token only proves who is asking.
#[async_trait]
pub trait UserProvisioner: Send + Sync + 'static {
    async fn create_user(
        &self,
        access_token: &str,
        request: &CreateUserRequest,
    ) -> Result<Value, anyhow::Error>;
}

#[derive(Clone)]
pub struct PgStore {
    profiles: profiles::ProfileRepository,
    financials: financials::FinancialsRepository,
    transactions: transactions::TransactionRepository,
    roles: roles::RoleRepository,
    retry: RetryPolicy,
}

impl PgStore {
    pub fn new(conn: PgPool, retry: RetryPolicy) -> Self {
        Self {
            profiles: profiles::ProfileRepository::new(conn.clone()),
            financials: financials::FinancialsRepository::new(conn.clone()),
            transactions: transactions::TransactionRepository::new(conn.clone()),
            roles: roles::RoleRepository::new(conn),
            retry,
        }
    }
}

#[async_trait]
impl PortalStore for PgStore {
    async fn profile_by_user_id(&self, user_id: Uuid) -> Result<Option<UserProfile>, anyhow::Error> {
        self.retry
            .run("profile_by_user_id", || self.profiles.get_by_user_id(user_id))
            .await
    }

    async fn profile_by_share_token(
        &self,
        share_token: &str,
    ) -> Result<Option<UserProfile>, anyhow::Error> {
        self.retry
            .run("profile_by_share_token", || {
                self.profiles.get_by_share_token(share_token)
            })
            .await
    }

    async fn profiles_with_financials(&self) -> Result<Vec<ProfileWithFinancials>, anyhow::Error> {
        self.retry
            .run("profiles_with_financials", || {
                self.profiles.list_with_financials()
            })
            .await
    }

    async fn referred_profiles(
        &self,
        referrer_id: Uuid,
    ) -> Result<Vec<ProfileWithFinancials>, anyhow::Error> {
        self.retry
            .run("referred_profiles", || {
                self.profiles.list_referred_by(referrer_id)
            })
            .await
    }

    async fn financials_for(&self, profile_id: Uuid) -> Result<Option<UserFinancials>, anyhow::Error> {
        self.retry
            .run("financials_for", || self.financials.get_first(profile_id))
            .await
    }

    async fn transactions_for(&self, profile_id: Uuid) -> Result<Vec<UserTransaction>, anyhow::Error> {
        self.retry
            .run("transactions_for", || {
                self.transactions.list_for_profile(profile_id)
            })
            .await
    }

    async fn role_for(&self, user_id: Uuid) -> Result<Option<Role>, anyhow::Error> {
        self.retry
            .run("role_for", || self.roles.get_role(user_id))
            .await
    }

    async fn update_financials(
        &self,
        profile_id: Uuid,
        update: &FinancialsUpdate,
    ) -> Result<u64, anyhow::Error> {
        self.retry
            .once(
                "update_financials",
                self.financials.update_for_profile(profile_id, update),
            )
            .await
    }

    async fn insert_transaction(
        &self,
        profile_id: Uuid,
        transaction: &NewTransaction,
    ) -> Result<UserTransaction, anyhow::Error> {
        self.retry
            .once(
                "insert_transaction",
                self.transactions.insert(profile_id, transaction),
            )
            .await
    }
}
