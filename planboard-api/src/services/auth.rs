/// Sign-in and the password-reset flow
///
/// Access tokens are signed with the global `JWT_SECRET`. Reset tokens are
/// signed with the account's current password hash and emailed as a link;
/// once the password changes, the link stops working.

use std::sync::Arc;

use planboard_shared::{
    auth::{
        jwt::{self, Claims, TokenType},
        middleware::AuthContext,
    },
    models::User,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::{hash, users::USER_NOT_FOUND, verify, UserService};
use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    mail::{reset_password_email, Mailer},
    sanitize::{clean, Sanitize},
};

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";
pub const INVALID_RESET_TOKEN: &str = "Invalid reset token";
pub const SAME_PASSWORD: &str = "New password must be different from the current password";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl Sanitize for LoginRequest {
    fn sanitize(&mut self) {
        clean(&mut self.username);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Identity carried by a verified access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub sub: Uuid,
    pub username: String,
}

impl From<AuthContext> for Profile {
    fn from(context: AuthContext) -> Self {
        Self {
            sub: context.user_id,
            username: context.username,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetEmailRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

impl Sanitize for ResetEmailRequest {
    fn sanitize(&mut self) {
        clean(&mut self.email);
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[serde(rename = "userID")]
    pub user_id: Uuid,

    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

// tokens and passwords are compared verbatim
impl Sanitize for PasswordResetRequest {
    fn sanitize(&mut self) {}
}

pub struct AuthService {
    users: UserService,
    mailer: Arc<dyn Mailer>,
    secret: String,
    mail_from: String,
    app_base_url: String,
}

impl AuthService {
    pub fn new(users: UserService, mailer: Arc<dyn Mailer>, config: &Config) -> Self {
        Self {
            users,
            mailer,
            secret: config.jwt.secret.clone(),
            mail_from: config.mail.from.clone(),
            app_base_url: config.mail.app_base_url.clone(),
        }
    }

    /// Exchanges credentials for a one-hour access token
    ///
    /// Unknown usernames and wrong passwords produce the same error.
    pub async fn sign_in(&self, request: LoginRequest) -> ApiResult<TokenResponse> {
        let Some(user) = self.users.find_by_username(&request.username).await? else {
            warn!(username = %request.username, "Sign-in for unknown username");
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = verify(request.password, user.password_hash.clone()).await?;
        if !matches || !user.is_active {
            warn!(user_id = %user.id, "Sign-in rejected");
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }

        let claims = Claims::new(user.id, user.username.as_str(), TokenType::Access);
        let access_token = jwt::create_token(&claims, &self.secret)?;

        info!(user_id = %user.id, "User signed in");
        Ok(TokenResponse { access_token })
    }

    /// Emails a 15-minute password-reset link to the account owning `email`
    ///
    /// # Errors
    ///
    /// `BadRequest` when no account uses the address, `InternalError` when
    /// the mailer fails.
    pub async fn send_reset_email(&self, request: ResetEmailRequest) -> ApiResult<()> {
        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| ApiError::bad_request(USER_NOT_FOUND))?;

        let token = jwt::create_reset_token(user.id, &user.username, &user.password_hash)?;
        let message = reset_password_email(
            &self.mail_from,
            &user.email,
            &self.app_base_url,
            user.id,
            &token,
        );

        self.mailer
            .send(&message)
            .await
            .map_err(|e| ApiError::InternalError(format!("Reset email not sent: {}", e)))?;

        info!(user_id = %user.id, "Password reset email sent");
        Ok(())
    }

    /// Sets a new password using an emailed reset token
    ///
    /// # Errors
    ///
    /// - `BadRequest` if the user doesn't exist or the new password equals
    ///   the current one
    /// - `Unauthorized` if the token is invalid, expired, already used, or
    ///   issued for someone else
    pub async fn reset_password(&self, request: PasswordResetRequest) -> ApiResult<User> {
        let mut user = self.users.account(request.user_id).await?;

        jwt::validate_reset_token(&request.token, user.id, &user.password_hash).map_err(|e| {
            warn!(user_id = %user.id, error = %e, "Reset token rejected");
            ApiError::unauthorized(INVALID_RESET_TOKEN)
        })?;

        if verify(request.password.clone(), user.password_hash.clone()).await? {
            return Err(ApiError::bad_request(SAME_PASSWORD));
        }

        user.password_hash = hash(request.password, self.users.cost()).await?;
        let user = self.users.save(&user).await?;

        info!(user_id = %user.id, "Password reset");
        Ok(user)
    }
}
