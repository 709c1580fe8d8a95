//! Page-level role gating.
//!
//! This only decides where a caller is sent. Row access itself is enforced by
//! the database's row-level policies.

use crate::models::users::Session;

pub const AUTH_PAGE: &str = "/auth";
pub const DASHBOARD_PAGE: &str = "/dashboard";
pub const ADMIN_PAGE: &str = "/admin";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Admin,
    /// `/admin/<share_token>`: any signed-in user.
    PersonalizedAdmin,
}

#[derive(Debug, PartialEq)]
pub enum Gate<'a> {
    Allow(&'a Session),
    Redirect(&'static str),
}

pub fn gate(session: Option<&Session>, page: Page) -> Gate<'_> {
    let Some(session) = session else {
        return Gate::Redirect(AUTH_PAGE);
    };

    match page {
        Page::Dashboard if session.role.is_admin() => Gate::Redirect(ADMIN_PAGE),
        Page::Admin if !session.role.is_admin() => Gate::Redirect(DASHBOARD_PAGE),
        _ => Gate::Allow(session),
    }
}
