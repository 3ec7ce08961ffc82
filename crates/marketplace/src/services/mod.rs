//! Business logic services.

pub mod auth;
pub mod geo;
pub mod payments;
pub mod storage;
