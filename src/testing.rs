//! In-memory stand-ins for the database and the hosted backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{
    financials::{FinancialsUpdate, UserFinancials, DEFAULT_CREDIT_SCORE},
    profiles::{ProfileWithFinancials, UserProfile},
    roles::Role,
    transactions::{self, NewTransaction, TransactionType, UserTransaction},
    users::{AuthTokens, AuthUser, CreateUserRequest, Session, SignUpMetadata, UserMetadata},
};
use crate::repositories::{AuthProvider, PortalStore, Rejected, UserProvisioner};
use crate::services::{links::LinkBuilder, Backends};

pub const ORIGIN: &str = "https://portal.example";

pub fn profile(name: &str) -> UserProfile {
    UserProfile {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        full_name: name.to_string(),
        email: format!("{}@example.com", name),
        username: Some(name.to_string()),
        share_token: Uuid::new_v4().simple().to_string(),
        is_admin: false,
        referred_by: None,
        created_at: Utc::now(),
    }
}

pub fn financials(
    profile_id: Uuid,
    total_balance: Decimal,
    invested_amount: Decimal,
    profit_amount: Decimal,
) -> UserFinancials {
    UserFinancials {
        id: Uuid::new_v4(),
        user_profile_id: profile_id,
        total_balance,
        invested_amount,
        profit_amount,
        credit_score: DEFAULT_CREDIT_SCORE,
    }
}

pub fn transaction(
    profile_id: Uuid,
    transaction_type: TransactionType,
    amount: Decimal,
    days_ago: i64,
) -> UserTransaction {
    UserTransaction {
        id: Uuid::new_v4(),
        user_profile_id: profile_id,
        transaction_type,
        amount,
        description: None,
        status: transactions::COMPLETED.to_string(),
        transaction_date: Utc::now() - Duration::days(days_ago),
    }
}

fn auth_user_for(profile: &UserProfile) -> AuthUser {
    AuthUser {
        id: profile.user_id,
        email: Some(profile.email.clone()),
        user_metadata: UserMetadata {
            full_name: Some(profile.full_name.clone()),
            username: profile.username.clone(),
        },
    }
}

pub fn session(role: Role) -> Session {
    session_for(&profile("someone"), role)
}

pub fn session_for(profile: &UserProfile, role: Role) -> Session {
    Session {
        user: auth_user_for(profile),
        role,
        access_token: format!("token-{}", profile.user_id),
    }
}

#[derive(Default)]
struct StoreState {
    profiles: Vec<UserProfile>,
    financials: Vec<UserFinancials>,
    transactions: Vec<UserTransaction>,
    roles: HashMap<Uuid, Role>,
    updates: Vec<(Uuid, FinancialsUpdate)>,
}

impl StoreState {
    fn first_financials(&self, profile_id: Uuid) -> Option<UserFinancials> {
        self.financials
            .iter()
            .find(|row| row.user_profile_id == profile_id)
            .cloned()
    }

    fn joined(&self, filter: impl Fn(&UserProfile) -> bool) -> Vec<ProfileWithFinancials> {
        let mut profiles: Vec<ProfileWithFinancials> = self
            .profiles
            .iter()
            .filter(|profile| filter(profile))
            .map(|profile| ProfileWithFinancials {
                profile: profile.clone(),
                financials: self.first_financials(profile.id),
            })
            .collect();
        profiles.sort_by(|a, b| b.profile.created_at.cmp(&a.profile.created_at));
        profiles
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    profile_lookup_error: Mutex<Option<String>>,
}

impl InMemoryStore {
    pub fn add_profile(&self, profile: UserProfile) {
        self.state.lock().unwrap().profiles.push(profile);
    }

    pub fn add_financials(&self, financials: UserFinancials) {
        self.state.lock().unwrap().financials.push(financials);
    }

    pub fn add_transaction(&self, transaction: UserTransaction) {
        self.state.lock().unwrap().transactions.push(transaction);
    }

    pub fn set_role(&self, user_id: Uuid, role: Role) {
        self.state.lock().unwrap().roles.insert(user_id, role);
    }

    /// Makes every `profile_by_user_id` call fail with `message`.
    pub fn fail_profile_lookups(&self, message: &str) {
        *self.profile_lookup_error.lock().unwrap() = Some(message.to_string());
    }

    /// Every update call received, in order.
    pub fn financial_updates(&self) -> Vec<(Uuid, FinancialsUpdate)> {
        self.state.lock().unwrap().updates.clone()
    }
}

#[async_trait]
impl PortalStore for InMemoryStore {
    async fn profile_by_user_id(&self, user_id: Uuid) -> Result<Option<UserProfile>, anyhow::Error> {
        if let Some(message) = self.profile_lookup_error.lock().unwrap().clone() {
            anyhow::bail!(message);
        }

        let state = self.state.lock().unwrap();
        Ok(state.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn profile_by_share_token(
        &self,
        share_token: &str,
    ) -> Result<Option<UserProfile>, anyhow::Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .profiles
            .iter()
            .find(|p| p.share_token == share_token)
            .cloned())
    }

    async fn profiles_with_financials(&self) -> Result<Vec<ProfileWithFinancials>, anyhow::Error> {
        Ok(self.state.lock().unwrap().joined(|_| true))
    }

    async fn referred_profiles(
        &self,
        referrer_id: Uuid,
    ) -> Result<Vec<ProfileWithFinancials>, anyhow::Error> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .joined(|p| p.referred_by == Some(referrer_id)))
    }

    async fn financials_for(&self, profile_id: Uuid) -> Result<Option<UserFinancials>, anyhow::Error> {
        Ok(self.state.lock().unwrap().first_financials(profile_id))
    }

    async fn transactions_for(&self, profile_id: Uuid) -> Result<Vec<UserTransaction>, anyhow::Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .transactions
            .iter()
            .filter(|tx| tx.user_profile_id == profile_id)
            .cloned()
            .collect())
    }

    async fn role_for(&self, user_id: Uuid) -> Result<Option<Role>, anyhow::Error> {
        Ok(self.state.lock().unwrap().roles.get(&user_id).copied())
    }

    async fn update_financials(
        &self,
        profile_id: Uuid,
        update: &FinancialsUpdate,
    ) -> Result<u64, anyhow::Error> {
        let mut state = self.state.lock().unwrap();
        state.updates.push((profile_id, update.clone()));

        let mut updated = 0;
        for row in state
            .financials
            .iter_mut()
            .filter(|row| row.user_profile_id == profile_id)
        {
            row.total_balance = update.total_balance;
            row.invested_amount = update.invested_amount;
            row.profit_amount = update.profit_amount;
            row.credit_score = update.credit_score;
            updated += 1;
        }

        Ok(updated)
    }

    async fn insert_transaction(
        &self,
        profile_id: Uuid,
        transaction: &NewTransaction,
    ) -> Result<UserTransaction, anyhow::Error> {
        let row = UserTransaction {
            id: Uuid::new_v4(),
            user_profile_id: profile_id,
            transaction_type: transaction.transaction_type,
            amount: transaction.amount,
            description: transaction.description.clone(),
            status: transactions::COMPLETED.to_string(),
            transaction_date: Utc::now(),
        };
        self.state.lock().unwrap().transactions.push(row.clone());
        Ok(row)
    }
}

#[derive(Default)]
struct AuthState {
    accounts: HashMap<String, (String, Uuid)>,
    tokens: HashMap<String, AuthUser>,
    sign_ups: Vec<(String, String, SignUpMetadata)>,
    sign_outs: Vec<String>,
    outage: Option<String>,
}

#[derive(Default)]
pub struct FakeAuth {
    state: Mutex<AuthState>,
}

impl FakeAuth {
    pub fn register(&self, email: &str, password: &str, user_id: Uuid) {
        self.state
            .lock()
            .unwrap()
            .accounts
            .insert(email.to_string(), (password.to_string(), user_id));
    }

    pub fn issue_token(&self, user_id: Uuid) -> String {
        let user = AuthUser {
            id: user_id,
            email: None,
            user_metadata: UserMetadata::default(),
        };
        self.issue(user)
    }

    pub fn issue_token_for(&self, profile: &UserProfile) -> String {
        self.issue(auth_user_for(profile))
    }

    fn issue(&self, user: AuthUser) -> String {
        let token = format!("token-{}", Uuid::new_v4());
        self.state.lock().unwrap().tokens.insert(token.clone(), user);
        token
    }

    pub fn sign_ups(&self) -> Vec<(String, String, SignUpMetadata)> {
        self.state.lock().unwrap().sign_ups.clone()
    }

    pub fn sign_outs(&self) -> Vec<String> {
        self.state.lock().unwrap().sign_outs.clone()
    }

    /// Makes token lookups fail as if the auth service were unreachable.
    pub fn go_down(&self, message: &str) {
        self.state.lock().unwrap().outage = Some(message.to_string());
    }
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthTokens, anyhow::Error> {
        let account = self.state.lock().unwrap().accounts.get(email).cloned();

        match account {
            Some((expected, user_id)) if expected == password => {
                let user = AuthUser {
                    id: user_id,
                    email: Some(email.to_string()),
                    user_metadata: UserMetadata::default(),
                };
                let access_token = self.issue(user.clone());
                Ok(AuthTokens {
                    access_token,
                    refresh_token: Some("refresh".to_string()),
                    expires_in: Some(3600),
                    user,
                })
            }
            _ => Err(Rejected("Invalid login credentials".to_string()).into()),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        email_redirect_to: &str,
        metadata: &SignUpMetadata,
    ) -> Result<(), anyhow::Error> {
        self.state.lock().unwrap().sign_ups.push((
            email.to_string(),
            email_redirect_to.to_string(),
            metadata.clone(),
        ));
        Ok(())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), anyhow::Error> {
        let mut state = self.state.lock().unwrap();
        state.tokens.remove(access_token);
        state.sign_outs.push(access_token.to_string());
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, anyhow::Error> {
        let state = self.state.lock().unwrap();
        if let Some(message) = &state.outage {
            anyhow::bail!("{}", message);
        }
        Ok(state.tokens.get(access_token).cloned())
    }
}

#[derive(Default)]
pub struct FakeProvisioner {
    calls: Mutex<Vec<(String, CreateUserRequest)>>,
    rejection: Mutex<Option<String>>,
}

impl FakeProvisioner {
    pub fn reject_with(&self, message: &str) {
        *self.rejection.lock().unwrap() = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<(String, CreateUserRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserProvisioner for FakeProvisioner {
    async fn create_user(
        &self,
        access_token: &str,
        request: &CreateUserRequest,
    ) -> Result<Value, anyhow::Error> {
        if let Some(message) = self.rejection.lock().unwrap().clone() {
            return Err(Rejected(message).into());
        }

        self.calls
            .lock()
            .unwrap()
            .push((access_token.to_string(), request.clone()));
        Ok(json!({ "email": request.email }))
    }
}

pub fn backends(
    store: Arc<InMemoryStore>,
    auth: Arc<FakeAuth>,
    provisioner: Arc<FakeProvisioner>,
) -> Backends {
    Backends {
        store,
        auth,
        provisioner,
        links: LinkBuilder::new(ORIGIN),
    }
}
