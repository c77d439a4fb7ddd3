//! # Planboard Shared Library
//!
//! This crate contains the domain types, persistence layer and auth
//! primitives used by the Planboard API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, projects and the list → feature →
//!   user story → task hierarchy) and the assembled project tree
//! - `store`: The `PlannerStore` persistence trait with Postgres and
//!   in-memory implementations
//! - `ordering`: Drag-and-drop position recompute for sibling collections
//! - `auth`: Password hashing, JWT issuance/validation, bearer middleware
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod ordering;
pub mod store;

/// Current version of the Planboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
