//! HTTP DTOs (Data Transfer Objects) for ticket endpoints.
//!
//! Wire names are camelCase, matching the dispatch clients. Request
//! payloads stay loose (`Option` fields) so the kernel's validation
//! pipeline, not the deserializer, decides what is usable.

use serde::{Deserialize, Serialize};

use crate::domain::ticketing::{RawTicket, TicketPresentation};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// POST body: a batch of raw tickets for one truck.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IngestTicketsRequest {
    pub tickets: Option<Vec<RawTicket>>,
}

/// Query-string filters for ticket read-back, all optional and unparsed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketFilterParams {
    pub site_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page_number: Option<String>,
    pub page_size: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// One presented ticket.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub site_name: String,
    pub truck_license_plate: String,
    pub number: i64,
    /// RFC 3339 with millisecond precision.
    pub dispatch_time: String,
    pub material: String,
}

impl From<TicketPresentation> for TicketResponse {
    fn from(presentation: TicketPresentation) -> Self {
        Self {
            site_name: presentation.site_name,
            truck_license_plate: presentation.truck_license_plate,
            number: presentation.number,
            dispatch_time: presentation.dispatch_time.to_rfc3339(),
            material: presentation.material.to_string(),
        }
    }
}

/// Response for ticket read-back.
#[derive(Debug, Clone, Serialize)]
pub struct TicketListResponse {
    pub tickets: Vec<TicketResponse>,
}

/// Error response for API errors.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            code: "CONFLICT".to_string(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
        }
    }
}
