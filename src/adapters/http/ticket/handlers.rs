//! HTTP handlers for ticket endpoints.
//!
//! These handlers connect Axum routes to the application layer handlers
//! and map classified errors onto HTTP statuses.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::{
    IngestTicketsCommand, IngestTicketsError, IngestTicketsHandler, QueryTicketsCommand,
    QueryTicketsError, QueryTicketsHandler,
};
use crate::domain::foundation::TruckId;
use crate::ports::TicketStore;

use super::dto::{
    ErrorResponse, IngestTicketsRequest, TicketFilterParams, TicketListResponse, TicketResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing the storage port.
#[derive(Clone)]
pub struct TicketAppState {
    pub store: Arc<dyn TicketStore>,
}

impl TicketAppState {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    pub fn ingest_handler(&self) -> IngestTicketsHandler {
        IngestTicketsHandler::new(self.store.clone())
    }

    pub fn query_handler(&self) -> QueryTicketsHandler {
        QueryTicketsHandler::new(self.store.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/v1/trucks/:truck_id/tickets - Ingest a ticket batch
pub async fn create_tickets(
    State(state): State<TicketAppState>,
    Path(truck_id): Path<String>,
    Json(request): Json<IngestTicketsRequest>,
) -> Result<impl IntoResponse, TicketApiError> {
    let truck_id: TruckId = truck_id
        .parse()
        .map_err(|_| TicketApiError::BadRequest("Truck ID must be an integer".to_string()))?;

    let tickets = request
        .tickets
        .ok_or_else(|| TicketApiError::BadRequest("List of tickets was not provided".to_string()))?;

    let handler = state.ingest_handler();
    handler
        .handle(IngestTicketsCommand { truck_id, tickets })
        .await?;

    Ok(StatusCode::OK)
}

/// GET /api/v1/tickets - Filtered, paginated read-back
pub async fn find_tickets(
    State(state): State<TicketAppState>,
    Query(params): Query<TicketFilterParams>,
) -> Result<impl IntoResponse, TicketApiError> {
    let handler = state.query_handler();
    let tickets = handler
        .handle(QueryTicketsCommand {
            site_id: params.site_id,
            start_date: params.start_date,
            end_date: params.end_date,
            page_number: params.page_number,
            page_size: params.page_size,
        })
        .await?;

    let mut presented = Vec::with_capacity(tickets.len());
    for ticket in &tickets {
        let presentation = ticket
            .present()
            .map_err(|err| TicketApiError::Internal(err.to_string()))?;
        presented.push(TicketResponse::from(presentation));
    }

    Ok(Json(TicketListResponse { tickets: presented }))
}

/// GET /health - Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts classified kernel errors to HTTP responses.
#[derive(Debug)]
pub enum TicketApiError {
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl From<IngestTicketsError> for TicketApiError {
    fn from(err: IngestTicketsError) -> Self {
        match err {
            IngestTicketsError::BadRequest(inner) => {
                tracing::error!(error = %inner, "rejected ticket ingestion request");
                TicketApiError::BadRequest(inner.message)
            }
            IngestTicketsError::Conflict(inner) => {
                tracing::error!(error = %inner, "dispatch times are not unique for the requested tickets");
                TicketApiError::Conflict(inner.message)
            }
            IngestTicketsError::Storage(inner) => {
                tracing::error!(error = %inner, "ticket ingestion failed");
                TicketApiError::Internal(inner.message)
            }
        }
    }
}

impl From<QueryTicketsError> for TicketApiError {
    fn from(err: QueryTicketsError) -> Self {
        match err {
            QueryTicketsError::BadRequest(inner) => {
                tracing::error!(error = %inner, "rejected ticket query request");
                TicketApiError::BadRequest(inner.message)
            }
            QueryTicketsError::Storage(inner) => {
                tracing::error!(error = %inner, "ticket query failed");
                TicketApiError::Internal(inner.message)
            }
        }
    }
}

impl IntoResponse for TicketApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            TicketApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg))
            }
            TicketApiError::Conflict(msg) => (StatusCode::CONFLICT, ErrorResponse::conflict(msg)),
            TicketApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::internal(msg),
            ),
        };

        (status, Json(error)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, ErrorCode};

    #[test]
    fn ingest_errors_map_to_http_categories() {
        let bad = IngestTicketsError::BadRequest(DomainError::new(
            ErrorCode::InvalidTimestamp,
            "Dispatch time not a valid date",
        ));
        assert!(matches!(
            TicketApiError::from(bad),
            TicketApiError::BadRequest(_)
        ));

        let conflict = IngestTicketsError::Conflict(DomainError::new(
            ErrorCode::DuplicateDispatchTime,
            "Dispatch time for a truck must be unique",
        ));
        assert!(matches!(
            TicketApiError::from(conflict),
            TicketApiError::Conflict(_)
        ));

        let storage = IngestTicketsError::Storage(DomainError::new(
            ErrorCode::DatabaseError,
            "boom",
        ));
        assert!(matches!(
            TicketApiError::from(storage),
            TicketApiError::Internal(_)
        ));
    }

    #[test]
    fn error_body_carries_the_kernel_message() {
        let err = IngestTicketsError::Conflict(DomainError::new(
            ErrorCode::DuplicateDispatchTime,
            "Dispatch time for a truck must be unique",
        ));
        match TicketApiError::from(err) {
            TicketApiError::Conflict(msg) => {
                assert_eq!(msg, "Dispatch time for a truck must be unique")
            }
            other => panic!("expected Conflict, got {:?}", other),
        }
    }
}
