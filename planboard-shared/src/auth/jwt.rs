/// JWT token generation and validation module
///
/// Tokens are signed using HS256 (HMAC-SHA256) and carry the user's id and
/// username.
///
/// # Token Types
///
/// - **Access Token**: 1 hour, signed with the global `JWT_SECRET`, presented
///   as a bearer token on every authenticated route
/// - **Password Reset Token**: 15 minutes, signed with the user's current
///   password hash, embedded in the reset link sent by email
///
/// Because a reset token's key is the password hash it was issued against,
/// the first successful reset rotates the key and every outstanding reset
/// token for that user fails validation from then on.
///
/// # Example
///
/// ```
/// use planboard_shared::auth::jwt::{create_token, validate_token, Claims, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
///
/// let claims = Claims::new(user_id, "dneri", TokenType::Access);
/// let token = create_token(&claims, "your-secret-key")?;
///
/// let validated_claims = validate_token(&token, "your-secret-key")?;
/// assert_eq!(validated_claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim stamped on and required of every token
pub const ISSUER: &str = "planboard";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },

    /// Token was issued for a different purpose
    #[error("Expected {expected} token, got {actual} token")]
    WrongType {
        expected: &'static str,
        actual: &'static str,
    },

    /// Token subject does not match the user it was presented for
    #[error("Token subject does not match user")]
    SubjectMismatch,
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Access token (1 hour)
    Access,

    /// Password reset token (15 minutes)
    PasswordReset,
}

impl TokenType {
    /// Gets default expiration duration for token type
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(1),
            TokenType::PasswordReset => Duration::minutes(15),
        }
    }

    /// Gets token type as string
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::PasswordReset => "password_reset",
        }
    }
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "planboard")
/// - `iat` / `nbf` / `exp`: Issued-at, not-before and expiry timestamps
///
/// # Custom Claims
///
/// - `username`: Username at issue time
/// - `token_type`: Access or password reset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Username (custom claim)
    pub username: String,

    /// Issuer - Always "planboard"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Token type (custom claim)
    pub token_type: TokenType,
}

impl Claims {
    /// Creates new claims with the default expiration for `token_type`
    ///
    /// # Example
    ///
    /// ```
    /// use planboard_shared::auth::jwt::{Claims, TokenType};
    /// use uuid::Uuid;
    ///
    /// let claims = Claims::new(Uuid::new_v4(), "dneri", TokenType::Access);
    /// assert!(!claims.is_expired());
    /// ```
    pub fn new(user_id: Uuid, username: impl Into<String>, token_type: TokenType) -> Self {
        Self::with_expiration(user_id, username, token_type, token_type.default_expiration())
    }

    /// Creates claims with custom expiration
    ///
    /// A negative `expires_in` produces claims that are already expired,
    /// which is useful in tests.
    pub fn with_expiration(
        user_id: Uuid,
        username: impl Into<String>,
        token_type: TokenType,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            username: username.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            token_type,
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets time until expiration
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Utc::now().timestamp();
        if self.exp > now {
            Some(Duration::seconds(self.exp - now))
        } else {
            None
        }
    }
}

/// Creates a JWT token from claims
///
/// Signs the token using HS256 with the provided secret. For access tokens
/// the secret is the global `JWT_SECRET`; for reset tokens it is the user's
/// password hash (see [`create_reset_token`]).
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token creation fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts claims
///
/// Verifies the signature, expiry, not-before time and issuer, with no
/// clock leeway. Does not look at the token type; use
/// [`validate_access_token`] or [`validate_reset_token`] for that.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    // reset links expire exactly at `exp`
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: ISSUER.to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

fn expect_type(claims: Claims, expected: TokenType) -> Result<Claims, JwtError> {
    if claims.token_type != expected {
        return Err(JwtError::WrongType {
            expected: expected.as_str(),
            actual: claims.token_type.as_str(),
        });
    }
    Ok(claims)
}

/// Validates token and checks it's an access token
///
/// # Example
///
/// ```
/// use planboard_shared::auth::jwt::{create_token, validate_access_token, Claims, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(Uuid::new_v4(), "dneri", TokenType::Access);
/// let token = create_token(&claims, "secret")?;
///
/// let validated = validate_access_token(&token, "secret")?;
/// assert_eq!(validated.token_type, TokenType::Access);
/// # Ok(())
/// # }
/// ```
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    expect_type(validate_token(token, secret)?, TokenType::Access)
}

/// Issues a password reset token keyed to `password_hash`
///
/// # Example
///
/// ```
/// use planboard_shared::auth::jwt::{create_reset_token, validate_reset_token};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let token = create_reset_token(user_id, "dneri", "$argon2id$v=19$...")?;
///
/// assert!(validate_reset_token(&token, user_id, "$argon2id$v=19$...").is_ok());
/// assert!(validate_reset_token(&token, user_id, "$argon2id$v=19$changed").is_err());
/// # Ok(())
/// # }
/// ```
pub fn create_reset_token(
    user_id: Uuid,
    username: &str,
    password_hash: &str,
) -> Result<String, JwtError> {
    let claims = Claims::new(user_id, username, TokenType::PasswordReset);
    create_token(&claims, password_hash)
}

/// Validates a password reset token for `user_id` against its current hash
///
/// Fails if the signature does not match `password_hash` (including when
/// the password changed since issue), if the token expired, if it is not a
/// reset token, or if it was issued for a different user.
pub fn validate_reset_token(
    token: &str,
    user_id: Uuid,
    password_hash: &str,
) -> Result<Claims, JwtError> {
    let claims = expect_type(validate_token(token, password_hash)?, TokenType::PasswordReset)?;

    if claims.sub != user_id {
        return Err(JwtError::SubjectMismatch);
    }

    Ok(claims)
}
