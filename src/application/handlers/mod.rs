//! Application handlers.
//!
//! Command handlers that orchestrate domain operations over the ports.

pub mod ingest_tickets;
pub mod query_tickets;

pub use ingest_tickets::{
    IngestTicketsCommand, IngestTicketsError, IngestTicketsHandler, IngestTicketsResult,
};
pub use query_tickets::{QueryTicketsCommand, QueryTicketsError, QueryTicketsHandler};
