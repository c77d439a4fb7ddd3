//! # Planboard API Server Library
//!
//! REST backend for a Kanban-style planning board: users own projects,
//! projects hold lists, lists hold features, features hold user stories and
//! user stories hold tasks.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `mail`: Outgoing email (password reset)
//! - `middleware`: Security headers
//! - `routes`: API route handlers
//! - `sanitize`: HTML stripping of request text
//! - `services`: Business logic

pub mod app;
pub mod config;
pub mod error;
pub mod mail;
pub mod middleware;
pub mod routes;
pub mod sanitize;
pub mod services;
