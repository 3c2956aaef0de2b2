//! Shared types and configuration for PocketLedger.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Currency codes for account denomination
//! - Configuration management

pub mod config;
pub mod types;

pub use self::config::AppConfig;
