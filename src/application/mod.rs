//! Application layer - Commands and Handlers.
//!
//! Orchestrates validation, domain construction, and the storage port. The
//! handlers here are the only entry points the HTTP shell calls.

pub mod handlers;

pub use handlers::{
    IngestTicketsCommand, IngestTicketsError, IngestTicketsHandler, IngestTicketsResult,
    QueryTicketsCommand, QueryTicketsError, QueryTicketsHandler,
};
