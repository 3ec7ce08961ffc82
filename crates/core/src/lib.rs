//! Townsquare Core - Shared types library.
//!
//! This crate provides common types used across all Townsquare components:
//! - `marketplace` - Customer-facing marketplace API
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, rating aggregates, conversation keys,
//!   and the status enums shared by the marketplace and CLI

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
