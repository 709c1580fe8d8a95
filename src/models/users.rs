use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::financials::DEFAULT_CREDIT_SCORE;
use super::roles::Role;

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// A user as reported by the hosted auth service.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

impl AuthUser {
    pub fn display_name(&self) -> String {
        self.user_metadata
            .full_name
            .clone()
            .filter(|name| !name.is_empty())
            .or_else(|| self.email.clone())
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

/// The authenticated caller, resolved once per request.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub user: AuthUser,
    pub role: Role,
    pub access_token: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SignUpMetadata {
    pub full_name: String,
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referred_by: Option<String>,
}

/// Body of the privileged `admin-create-user` function.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub total_balance: Decimal,
    #[serde(default)]
    pub invested_amount: Decimal,
    #[serde(default)]
    pub profit_amount: Decimal,
    #[serde(default = "default_credit_score")]
    pub credit_score: i32,
}

fn default_credit_score() -> i32 {
    DEFAULT_CREDIT_SCORE
}
