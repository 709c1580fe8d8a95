//! Response shapes returned to the portal front-end.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::financials::FinancialsSummary;
use super::profiles::UserProfile;
use super::referrals::ReferralTotals;
use super::transactions::{TransactionType, UserTransaction};
use crate::utils::money;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SignInOutcome {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub redirect_to: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FinancialsView {
    pub total_balance: Decimal,
    pub invested_amount: Decimal,
    pub profit_amount: Decimal,
    pub credit_score: i32,
    pub total_balance_display: String,
    pub invested_amount_display: String,
    pub profit_amount_display: String,
}

impl From<FinancialsSummary> for FinancialsView {
    fn from(summary: FinancialsSummary) -> Self {
        Self {
            total_balance: summary.total_balance,
            invested_amount: summary.invested_amount,
            profit_amount: summary.profit_amount,
            credit_score: summary.credit_score,
            total_balance_display: money::format_usd(summary.total_balance),
            invested_amount_display: money::format_usd(summary.invested_amount),
            profit_amount_display: money::format_usd(summary.profit_amount),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransactionView {
    pub id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub amount_display: String,
    pub description: Option<String>,
    pub status: String,
    pub transaction_date: DateTime<Utc>,
}

impl From<UserTransaction> for TransactionView {
    fn from(tx: UserTransaction) -> Self {
        Self {
            amount_display: money::signed_amount(tx.transaction_type, tx.amount),
            id: tx.id,
            transaction_type: tx.transaction_type,
            amount: tx.amount,
            description: tx.description,
            status: tx.status,
            transaction_date: tx.transaction_date,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardView {
    pub welcome_name: String,
    pub financials: FinancialsView,
    /// Newest first.
    pub transactions: Vec<TransactionView>,
}

/// The admin's own profile with the links it hands out.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AdminProfileView {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub share_token: String,
    pub referral_link: String,
    pub admin_link: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserRow {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub has_financials: bool,
    pub financials: FinancialsView,
    pub share_link: String,
}

impl UserRow {
    pub fn new(profile: UserProfile, summary: FinancialsSummary, has_financials: bool, share_link: String) -> Self {
        Self {
            id: profile.id,
            full_name: profile.full_name,
            email: profile.email,
            username: profile.username,
            created_at: profile.created_at,
            has_financials,
            financials: summary.into(),
            share_link,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AdminOverview {
    pub admin: Option<AdminProfileView>,
    pub users: Vec<UserRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PersonalizedAdminView {
    pub admin: AdminProfileView,
    pub users: Vec<UserRow>,
    pub totals: ReferralTotals,
}
