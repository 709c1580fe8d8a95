pub mod financials;
pub mod profiles;
pub mod referrals;
pub mod roles;
pub mod transactions;
pub mod users;
pub mod views;
