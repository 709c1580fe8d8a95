pub mod money;
pub mod retry;
