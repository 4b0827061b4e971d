//! HTTP adapters - REST API implementations.

pub mod ticket;

// Re-export key types for convenience
pub use ticket::ticket_router;
pub use ticket::TicketAppState;
