use rust_decimal::Decimal;
use serde::Serialize;

use super::profiles::ProfileWithFinancials;

/// Sums over the users referred by one admin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ReferralTotals {
    pub total_balance: Decimal,
    pub total_invested: Decimal,
    pub total_profit: Decimal,
}

impl ReferralTotals {
    pub fn from_profiles(profiles: &[ProfileWithFinancials]) -> Self {
        profiles.iter().fold(Self::default(), |mut acc, entry| {
            let summary = entry.summary();
            acc.total_balance += summary.total_balance;
            acc.total_invested += summary.invested_amount;
            acc.total_profit += summary.profit_amount;
            acc
        })
    }
}
