//! Haulboard - Dispatch ticketing for material hauling job sites.
//!
//! Ingests dispatch tickets (truck + timestamp + material) on behalf of
//! physical job sites, assigns each ticket a gap-free per-site sequence
//! number, and serves filtered, paginated read-back of stored tickets.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
