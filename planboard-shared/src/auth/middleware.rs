/// Authentication middleware for Axum
///
/// Validates `Authorization: Bearer <token>` access tokens and adds an
/// [`AuthContext`] to the request extensions. Every failure is answered
/// with 401 before the handler runs.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use planboard_shared::auth::middleware::{jwt_auth_middleware, AuthContext};
///
/// async fn profile(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}!", auth.username)
/// }
///
/// let app: Router = Router::new()
///     .route("/profile", get(profile))
///     .layer(middleware::from_fn(|req, next| {
///         jwt_auth_middleware("your-jwt-secret".to_string(), req, next)
///     }));
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_access_token, Claims, JwtError};

/// Authentication context added to request extensions
///
/// Handlers read it with `Extension<AuthContext>`; the ids of every entity
/// touched by a request are checked against `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Username carried by the token
    pub username: String,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
        }
    }
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Authorization header is not a bearer token
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

impl AuthError {
    fn message(&self) -> &str {
        match self {
            AuthError::MissingCredentials => "Missing credentials",
            AuthError::InvalidFormat(msg) | AuthError::InvalidToken(msg) => msg,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!(reason = %self, "Rejected unauthenticated request");

        let body = serde_json::json!({
            "error": "unauthorized",
            "message": self.message(),
        });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// Extracts and validates the bearer token of a request
pub fn authenticate(req: &Request, secret: &str) -> Result<AuthContext, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_access_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken("Invalid token".to_string()),
    })?;

    Ok(claims.into())
}

/// JWT authentication middleware
///
/// # Errors
///
/// Returns 401 Unauthorized if the header is missing, is not a bearer
/// token, or carries a token that fails validation (bad signature, expired,
/// wrong issuer, not an access token).
pub async fn jwt_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_context = authenticate(&req, &secret)?;
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, TokenType};
    use axum::body::Body;
    use chrono::Duration;

    const SECRET: &str = "middleware-test-secret-0123456789abcdef";

    fn request_with(auth: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/api/auth/profile");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_authenticate_valid_token() {
        let user_id = Uuid::new_v4();
        let token = create_token(&Claims::new(user_id, "dneri", TokenType::Access), SECRET).unwrap();

        let context = authenticate(&request_with(Some(&format!("Bearer {}", token))), SECRET)
            .expect("Should authenticate");

        assert_eq!(context.user_id, user_id);
        assert_eq!(context.username, "dneri");
    }

    #[test]
    fn test_authenticate_missing_header() {
        let result = authenticate(&request_with(None), SECRET);
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }

    #[test]
    fn test_authenticate_wrong_scheme() {
        let result = authenticate(&request_with(Some("Basic ZG5lcmk6cHc=")), SECRET);
        assert!(matches!(result, Err(AuthError::InvalidFormat(_))));

        let result = authenticate(&request_with(Some("Bearer ")), SECRET);
        assert!(matches!(result, Err(AuthError::InvalidFormat(_))));
    }

    #[test]
    fn test_authenticate_rejects_bad_tokens() {
        let user_id = Uuid::new_v4();

        let other_secret =
            create_token(&Claims::new(user_id, "dneri", TokenType::Access), "another-secret").unwrap();
        let expired = create_token(
            &Claims::with_expiration(user_id, "dneri", TokenType::Access, Duration::hours(-2)),
            SECRET,
        )
        .unwrap();
        let reset =
            create_token(&Claims::new(user_id, "dneri", TokenType::PasswordReset), SECRET).unwrap();

        for token in [other_secret.as_str(), expired.as_str(), reset.as_str(), "garbage"] {
            let result = authenticate(&request_with(Some(&format!("Bearer {}", token))), SECRET);
            assert!(matches!(result, Err(AuthError::InvalidToken(_))), "token {} accepted", token);
        }
    }

    #[test]
    fn test_auth_error_into_response() {
        for err in [
            AuthError::MissingCredentials,
            AuthError::InvalidFormat("test".to_string()),
            AuthError::InvalidToken("test".to_string()),
        ] {
            assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }
}
