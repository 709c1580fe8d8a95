use std::future::Future;
use std::time::Duration;

use anyhow::anyhow;

use crate::settings::Resilience;

/// Timeout and retry budget applied to every call leaving the process.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    timeout: Duration,
    max_attempts: u32,
    backoff: Duration,
}

impl From<&Resilience> for RetryPolicy {
    fn from(settings: &Resilience) -> Self {
        Self {
            timeout: Duration::from_millis(settings.timeout_ms),
            max_attempts: settings.max_attempts.max(1),
            backoff: Duration::from_millis(settings.backoff_ms),
        }
    }
}

impl RetryPolicy {
    /// Runs an idempotent call, retrying failures and timeouts with linear
    /// backoff.
    pub async fn run<T, F, Fut>(&self, label: &str, mut call: F) -> Result<T, anyhow::Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, anyhow::Error>>,
    {
        let mut attempt = 1;

        loop {
            match self.once(label, call()).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts => {
                    log::warn!(
                        "{} failed (attempt {}/{}): {}",
                        label,
                        attempt,
                        self.max_attempts,
                        e
                    );
                    tokio::time::sleep(self.backoff * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Runs a call once under the timeout. Used for writes.
    pub async fn once<T, Fut>(&self, label: &str, call: Fut) -> Result<T, anyhow::Error>
    where
        Fut: Future<Output = Result<T, anyhow::Error>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(anyhow!("{} timed out after {:?}", label, self.timeout)),
        }
    }
}
