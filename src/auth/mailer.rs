// OTP delivery abstraction

use axum::async_trait;
use tracing::info;

use crate::auth::error::AuthError;

/// Delivery channel for password-reset codes
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_otp(&self, recipient: &str, code: &str) -> Result<(), AuthError>;
}

/// Mailer that writes codes to the application log instead of sending
/// email. Stands in for a real provider in development and tests.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_otp(&self, recipient: &str, code: &str) -> Result<(), AuthError> {
        info!("Password reset code for {}: {}", recipient, code);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        let mailer = LogMailer;
        assert!(mailer.send_otp("user@example.com", "123456").await.is_ok());
    }
}
