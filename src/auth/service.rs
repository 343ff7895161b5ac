// Authentication business logic

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::error::AuthError;
use crate::auth::mailer::Mailer;
use crate::auth::models::{AuthResponse, Role, User, UserResponse};
use crate::auth::otp::OtpStore;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::auth::repository::{TokenRepository, UserRepository};
use crate::auth::token::TokenService;

/// Service layer for authentication operations
pub struct AuthService {
    user_repo: UserRepository,
    token_repo: TokenRepository,
    token_service: TokenService,
    otp_store: Arc<OtpStore>,
    mailer: Arc<dyn Mailer>,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        user_repo: UserRepository,
        token_repo: TokenRepository,
        token_service: TokenService,
        otp_store: Arc<OtpStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            user_repo,
            token_repo,
            token_service,
            otp_store,
            mailer,
        }
    }

    /// Register a new customer account and issue a token pair
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let email = email.trim().to_lowercase();

        validate_password_strength(password)?;

        if self.user_repo.email_exists(&email).await? {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(password)?;
        let user = self
            .user_repo
            .create_user(&email, &password_hash, Role::Customer)
            .await?;

        info!("Registered user {} ({})", user.id, user.email);

        self.issue_tokens(user).await
    }

    /// Authenticate with email and password, issuing a token pair
    ///
    /// Unknown email and wrong password both map to InvalidCredentials so
    /// responses do not reveal which accounts exist.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let user = self
            .user_repo
            .find_by_email(email.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            warn!("Failed login attempt for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        info!("User {} logged in", user.id);

        self.issue_tokens(user).await
    }

    /// Exchange a valid refresh token for a new token pair
    ///
    /// The presented token is rotated: it is invalidated before the new
    /// pair is issued, so each refresh token works exactly once.
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<AuthResponse, AuthError> {
        let claims = self.token_service.validate_refresh_token(refresh_token)?;

        let stored = self
            .token_repo
            .find_refresh_token(refresh_token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if stored.user_id != claims.sub {
            warn!("Refresh token user mismatch for user {}", claims.sub);
            return Err(AuthError::InvalidToken);
        }

        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        self.token_repo
            .invalidate_refresh_token(refresh_token)
            .await?;

        self.issue_tokens(user).await
    }

    /// Invalidate a refresh token
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let removed = self
            .token_repo
            .invalidate_refresh_token(refresh_token)
            .await?;

        if !removed {
            return Err(AuthError::InvalidToken);
        }

        Ok(())
    }

    /// Fetch the profile of the authenticated user
    pub async fn get_current_user(&self, user_id: i32) -> Result<UserResponse, AuthError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        Ok(user.into())
    }

    /// Start a password reset by emailing an OTP code
    ///
    /// Always succeeds from the caller's perspective so the endpoint does
    /// not reveal whether an email is registered.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim().to_lowercase();

        if self.user_repo.find_by_email(&email).await?.is_none() {
            info!("Password reset requested for unknown email");
            return Ok(());
        }

        let code = self.otp_store.issue(&email);
        self.mailer.send_otp(&email, &code).await?;

        Ok(())
    }

    /// Complete a password reset with a valid OTP code
    ///
    /// All of the user's refresh tokens are invalidated on success.
    pub async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let email = email.trim().to_lowercase();

        validate_password_strength(new_password)?;

        if !self.otp_store.verify_and_consume(&email, otp) {
            return Err(AuthError::InvalidOtp);
        }

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidOtp)?;

        let password_hash = hash_password(new_password)?;
        self.user_repo
            .update_password(user.id, &password_hash)
            .await?;
        self.token_repo.invalidate_user_tokens(user.id).await?;

        info!("Password reset completed for user {}", user.id);

        Ok(())
    }

    async fn issue_tokens(&self, user: User) -> Result<AuthResponse, AuthError> {
        let (access_token, refresh_token) =
            self.token_service
                .generate_token_pair(user.id, &user.email, user.role)?;

        self.token_repo
            .store_refresh_token(user.id, &refresh_token)
            .await?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            user: user.into(),
        })
    }
}
