/// Custom middleware for the API server
///
/// - `security`: security headers on every response
///
/// Bearer-token authentication lives in `planboard_shared::auth::middleware`
/// and is attached per route group in [`crate::app::build_router`].

pub mod security;
