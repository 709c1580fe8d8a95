use uuid::Uuid;

/// Builds the portal's shareable URLs. Links are plain concatenation: no
/// signing and no expiry.
#[derive(Clone, Debug)]
pub struct LinkBuilder {
    origin: String,
}

impl LinkBuilder {
    pub fn new(origin: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    /// Sign-up link that records `profile_id` as the referrer.
    pub fn referral(&self, profile_id: Uuid) -> String {
        format!("{}/auth?ref={}", self.origin, profile_id)
    }

    pub fn personalized_admin(&self, share_token: &str) -> String {
        format!("{}/admin/{}", self.origin, share_token)
    }

    pub fn shared_dashboard(&self, share_token: &str) -> String {
        format!("{}/shared/{}", self.origin, share_token)
    }

    /// Where the confirmation email sends a new user.
    pub fn email_redirect(&self) -> String {
        format!("{}/auth", self.origin)
    }
}
