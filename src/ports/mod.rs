//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.

mod ticket_store;

pub use ticket_store::{
    NewTicketRow, StoredTicket, TicketStore, TicketStoreTransaction, TruckRecord,
};
