//! Core types for Townsquare.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod conversation;
pub mod email;
pub mod id;
pub mod kind;
pub mod rating;
pub mod status;

pub use conversation::ConversationKey;
pub use email::{Email, EmailError};
pub use id::*;
pub use kind::{TargetKind, TargetKindError};
pub use rating::{Rating, RatingError, RatingSummary};
pub use status::*;
