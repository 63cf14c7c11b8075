//! Shared types, errors, and configuration for Bursar.
//!
//! This crate provides common pieces used across all other crates:
//! - Money handling in integer cents (with dollar-string parsing at the edge)
//! - Application-wide error types
//! - Configuration management
//! - Token verification for the hosted identity provider
//! - Status-change email notifications

pub mod auth;
pub mod config;
pub mod error;
pub mod notify;
pub mod types;

pub use auth::{Claims, TokenVerifier};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use notify::NotificationService;
