/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Access and password-reset token issuance/validation
/// - [`middleware`]: Bearer-token guard for axum routes
///
/// # Password reset tokens
///
/// Reset tokens are signed with the user's *current password hash* rather
/// than the global secret. Changing the password changes the key, so every
/// outstanding reset token stops verifying.
///
/// # Example
///
/// ```no_run
/// use planboard_shared::auth::password::{hash_password, verify_password};
/// use planboard_shared::auth::jwt::{create_token, validate_access_token, Claims, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), "dneri", TokenType::Access);
/// let token = create_token(&claims, "secret-key")?;
/// let validated = validate_access_token(&token, "secret-key")?;
/// assert_eq!(validated.username, "dneri");
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
