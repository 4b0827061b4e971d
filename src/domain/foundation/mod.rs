//! Shared domain primitives.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode};
pub use ids::{SiteId, TicketNumber, TruckId};
pub use timestamp::Timestamp;
