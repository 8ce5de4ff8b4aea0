//! Upper bound on individual store calls.

use std::future::Future;
use std::time::Duration;

use tracing::error;

use sso_core::config::auth::AuthConfig;
use sso_core::error::AppError;
use sso_core::result::AppResult;

/// Wraps store futures in a timeout.
///
/// An expired call is reported as an internal error. The wrapped future is
/// dropped on expiry, which rolls back any transaction it had open.
#[derive(Debug, Clone, Copy)]
pub struct StoreDeadline {
    limit: Duration,
}

impl StoreDeadline {
    /// A deadline of `limit` per call.
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    /// The deadline configured in `auth.store_timeout_seconds`.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(Duration::from_secs(config.store_timeout_seconds))
    }

    /// Run `call`, failing if it takes longer than the limit.
    pub async fn run<T, F>(&self, operation: &'static str, call: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match tokio::time::timeout(self.limit, call).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    operation,
                    limit_ms = self.limit.as_millis() as u64,
                    "Store call exceeded deadline"
                );
                Err(AppError::internal(format!(
                    "Store call '{operation}' timed out"
                )))
            }
        }
    }
}
