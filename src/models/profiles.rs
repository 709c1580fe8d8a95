use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::financials::{FinancialsSummary, UserFinancials};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub username: Option<String>,
    /// Opaque token behind `/shared/<token>` and `/admin/<token>`. Stable for
    /// the profile's lifetime.
    pub share_token: String,
    pub is_admin: bool,
    pub referred_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A profile joined with its first financials row, if it has one.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileWithFinancials {
    pub profile: UserProfile,
    pub financials: Option<UserFinancials>,
}

impl ProfileWithFinancials {
    pub fn summary(&self) -> FinancialsSummary {
        FinancialsSummary::of(self.financials.as_ref())
    }
}
