//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors (caught before any storage access)
    MissingField,
    InvalidTimestamp,
    FutureTimestamp,
    InvalidMaterial,
    InvalidFilter,
    UnknownTruck,

    // Uniqueness conflicts
    DuplicateDispatchTime,
    TicketConflict,

    // Presentation invariant
    IncompletePresentation,

    // Infrastructure errors
    DatabaseError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::MissingField => "MISSING_FIELD",
            ErrorCode::InvalidTimestamp => "INVALID_TIMESTAMP",
            ErrorCode::FutureTimestamp => "FUTURE_TIMESTAMP",
            ErrorCode::InvalidMaterial => "INVALID_MATERIAL",
            ErrorCode::InvalidFilter => "INVALID_FILTER",
            ErrorCode::UnknownTruck => "UNKNOWN_TRUCK",
            ErrorCode::DuplicateDispatchTime => "DUPLICATE_DISPATCH_TIME",
            ErrorCode::TicketConflict => "TICKET_CONFLICT",
            ErrorCode::IncompletePresentation => "INCOMPLETE_PRESENTATION",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
///
/// Callers branch on `code`, never on error type identity.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Whether this error is a uniqueness conflict (pre-flight or storage
    /// backstop).
    pub fn is_conflict(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::DuplicateDispatchTime | ErrorCode::TicketConflict
        )
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}
