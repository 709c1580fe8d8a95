use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;

use super::{backend_message, AuthProvider, Rejected};
use crate::models::users::{AuthTokens, AuthUser, SignUpMetadata};
use crate::utils::retry::RetryPolicy;

/// Client for the hosted auth REST API.
pub struct AuthApi {
    url: String,
    api_key: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl AuthApi {
    pub fn new(url: String, api_key: String, retry: RetryPolicy) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
            retry,
        }
    }

    async fn send(
        &self,
        label: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, anyhow::Error> {
        let response = self
            .retry
            .once(label, async move {
                request.send().await.map_err(anyhow::Error::from)
            })
            .await?;

        Self::check(response).await
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, anyhow::Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await?;
        let message = backend_message(&body);
        if status.is_client_error() {
            return Err(Rejected(message).into());
        }

        anyhow::bail!("Auth service returned {}: {}", status, message)
    }

    async fn fetch_user(&self, access_token: &str) -> Result<Option<AuthUser>, anyhow::Error> {
        let response = self
            .client
            .get(format!("{}/user", self.url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }

        let user: AuthUser = Self::check(response).await?.json().await?;
        Ok(Some(user))
    }
}

#[async_trait]
impl AuthProvider for AuthApi {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthTokens, anyhow::Error> {
        let payload = json!({
            "email": email,
            "password": password,
        });

        let request = self
            .client
            .post(format!("{}/token", self.url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.api_key)
            .json(&payload);

        let response = self.send("auth sign_in", request).await?;
        let tokens: AuthTokens = response.json().await?;

        Ok(tokens)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        email_redirect_to: &str,
        metadata: &SignUpMetadata,
    ) -> Result<(), anyhow::Error> {
        let payload = json!({
            "email": email,
            "password": password,
            "data": metadata,
        });

        let request = self
            .client
            .post(format!("{}/signup", self.url))
            .query(&[("redirect_to", email_redirect_to)])
            .header("apikey", &self.api_key)
            .json(&payload);

        self.send("auth sign_up", request).await?;

        Ok(())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), anyhow::Error> {
        let request = self
            .client
            .post(format!("{}/logout", self.url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token);

        self.send("auth sign_out", request).await?;

        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, anyhow::Error> {
        self.retry
            .run("auth get_user", || self.fetch_user(access_token))
            .await
    }
}
