use async_trait::async_trait;
use serde_json::Value;

use super::{backend_message, Rejected, UserProvisioner};
use crate::models::users::CreateUserRequest;
use crate::utils::retry::RetryPolicy;

const ADMIN_CREATE_USER: &str = "admin-create-user";

/// Invokes the hosted serverless functions.
pub struct FunctionsApi {
    url: String,
    api_key: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl FunctionsApi {
    pub fn new(url: String, api_key: String, retry: RetryPolicy) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
            retry,
        }
    }

    async fn invoke(&self, name: &str, access_token: &str, body: Value) -> Result<Value, anyhow::Error> {
        let response = self
            .client
            .post(format!("{}/{}", self.url, name))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_client_error() {
            return Err(Rejected(backend_message(&text)).into());
        }
        if !status.is_success() {
            anyhow::bail!("Function {} returned {}: {}", name, status, backend_message(&text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl UserProvisioner for FunctionsApi {
    async fn create_user(
        &self,
        access_token: &str,
        request: &CreateUserRequest,
    ) -> Result<Value, anyhow::Error> {
        let body = serde_json::to_value(request)?;

        // Not idempotent: a retry could create the user twice.
        self.retry
            .once(
                ADMIN_CREATE_USER,
                self.invoke(ADMIN_CREATE_USER, access_token, body),
            )
            .await
    }
}
