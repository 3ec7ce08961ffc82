//! Domain models for the marketplace.
//!
//! These types represent validated domain objects separate from database row
//! types; repositories convert rows into them.

pub mod booking;
pub mod business;
pub mod catalog;
pub mod conversation;
pub mod favorite;
pub mod order;
pub mod review;
pub mod session;
pub mod user;

pub use booking::{Booking, NewBooking};
pub use business::Business;
pub use catalog::{Product, Service};
pub use conversation::{Conversation, ConversationSide, Message};
pub use favorite::Favorite;
pub use order::{NewOrder, Order};
pub use review::Review;
pub use session::{CurrentUser, session_keys};
pub use user::{ProfileUpdate, User};
