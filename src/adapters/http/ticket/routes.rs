//! Route configuration for ticket endpoints.
//!
//! Configures the Axum router with the ticket API surface.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{create_tickets, find_tickets, health, TicketAppState};

/// Creates the ticket router with all endpoints.
///
/// Routes:
/// - `POST /api/v1/trucks/:truck_id/tickets` - ingest a ticket batch
/// - `GET /api/v1/tickets` - filtered, paginated read-back
/// - `GET /health` - liveness probe
pub fn ticket_router() -> Router<TicketAppState> {
    Router::new()
        .route("/api/v1/trucks/:truck_id/tickets", post(create_tickets))
        .route("/api/v1/tickets", get(find_tickets))
        .route("/health", get(health))
}
