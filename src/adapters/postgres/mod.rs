//! PostgreSQL adapters.

mod seed;
mod ticket_store;

pub use seed::{seed_from_dir, SiteSeed, TruckSeed};
pub use ticket_store::PostgresTicketStore;
