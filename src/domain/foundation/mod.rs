//! Foundation value objects shared across the domain.
//!
//! Strongly-typed ids and timestamps. These types carry no behavior beyond
//! construction, formatting, and serde support.

mod ids;
mod timestamp;

pub use ids::{ConversationId, TurnId};
pub use timestamp::Timestamp;
