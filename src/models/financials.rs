use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_CREDIT_SCORE: i32 = 660;

fn default_credit_score() -> i32 {
    DEFAULT_CREDIT_SCORE
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, sqlx::FromRow)]
pub struct UserFinancials {
    pub id: Uuid,
    pub user_profile_id: Uuid,
    pub total_balance: Decimal,
    pub invested_amount: Decimal,
    pub profit_amount: Decimal,
    pub credit_score: i32,
}

/// The displayable part of a financials row. Profiles without a row show
/// `FinancialsSummary::default()`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FinancialsSummary {
    pub total_balance: Decimal,
    pub invested_amount: Decimal,
    pub profit_amount: Decimal,
    pub credit_score: i32,
}

impl Default for FinancialsSummary {
    fn default() -> Self {
        Self {
            total_balance: Decimal::ZERO,
            invested_amount: Decimal::ZERO,
            profit_amount: Decimal::ZERO,
            credit_score: DEFAULT_CREDIT_SCORE,
        }
    }
}

impl From<&UserFinancials> for FinancialsSummary {
    fn from(row: &UserFinancials) -> Self {
        Self {
            total_balance: row.total_balance,
            invested_amount: row.invested_amount,
            profit_amount: row.profit_amount,
            credit_score: row.credit_score,
        }
    }
}

impl FinancialsSummary {
    pub fn of(row: Option<&UserFinancials>) -> Self {
        row.map(Self::from).unwrap_or_default()
    }
}

/// Values written by an admin edit. Fields left out of the request fall back
/// to zero amounts and the default credit score.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct FinancialsUpdate {
    #[serde(default)]
    pub total_balance: Decimal,
    #[serde(default)]
    pub invested_amount: Decimal,
    #[serde(default)]
    pub profit_amount: Decimal,
    #[serde(default = "default_credit_score")]
    pub credit_score: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn missing_row_uses_defaults() {
        let summary = FinancialsSummary::of(None);

        assert_eq!(summary.total_balance, Decimal::ZERO);
        assert_eq!(summary.invested_amount, Decimal::ZERO);
        assert_eq!(summary.profit_amount, Decimal::ZERO);
        assert_eq!(summary.credit_score, 660);
    }

    #[test]
    fn partial_update_fills_defaults() {
        let update: FinancialsUpdate = serde_json::from_str(r#"{"total_balance": 1000}"#).unwrap();

        assert_eq!(update.total_balance, dec!(1000));
        assert_eq!(update.invested_amount, Decimal::ZERO);
        assert_eq!(update.profit_amount, Decimal::ZERO);
        assert_eq!(update.credit_score, DEFAULT_CREDIT_SCORE);
    }
}
