//! Core library for tripjournal.
//!
//! Provides the authenticated REST client for the Trip Journal service along
//! with its wire models, payload codec, session state, and the configuration
//! and credential storage used by front ends.

pub mod api;
pub mod auth;
pub mod codec;
pub mod config;
pub mod models;

pub use api::{ApiError, JournalClient};
pub use auth::{AuthStatus, Token};
pub use config::Config;
