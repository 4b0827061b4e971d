//! Stateless validation of raw ticket input.
//!
//! Everything here runs before domain objects are built and before any
//! storage access; failures carry a classified [`DomainError`] the façade
//! maps onto the request/conflict taxonomy.

use std::collections::HashSet;

use serde::Deserialize;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};

use super::{Material, Ticket};

/// Raw ticket payload as received from the shell. Fields stay untyped JSON
/// until validation proves them present and string-shaped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTicket {
    pub dispatch_time: Option<serde_json::Value>,
    pub material: Option<serde_json::Value>,
}

impl RawTicket {
    pub fn new(
        dispatch_time: impl Into<serde_json::Value>,
        material: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            dispatch_time: Some(dispatch_time.into()),
            material: Some(material.into()),
        }
    }
}

/// Parsed field values of one raw ticket, in input order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedTicket {
    pub dispatch_time: Timestamp,
    pub material: Material,
}

/// Validate the dispatch time parses and is not a future date.
pub fn validate_dispatch_time(raw: &str) -> Result<Timestamp, DomainError> {
    let parsed = Timestamp::parse_rfc3339(raw).map_err(|_| {
        DomainError::new(ErrorCode::InvalidTimestamp, "Dispatch time not a valid date")
            .with_detail("time", raw)
    })?;

    if parsed.is_after(&Timestamp::now()) {
        return Err(
            DomainError::new(ErrorCode::FutureTimestamp, "Dispatch time is at a future date")
                .with_detail("time", raw),
        );
    }

    Ok(parsed)
}

/// Validate the material belongs to the known allow-set.
pub fn validate_material(raw: &str) -> Result<Material, DomainError> {
    raw.parse()
}

/// Validate a raw batch field-by-field, stopping at the first offender.
pub fn validate_ticket_batch(raw: &[RawTicket]) -> Result<Vec<ValidatedTicket>, DomainError> {
    raw.iter()
        .map(|ticket| {
            let time = ticket
                .dispatch_time
                .as_ref()
                .and_then(|value| value.as_str())
                .ok_or_else(|| {
                    DomainError::new(
                        ErrorCode::MissingField,
                        "Dispatch time is missing or not a valid value",
                    )
                })?;
            let material = ticket
                .material
                .as_ref()
                .and_then(|value| value.as_str())
                .ok_or_else(|| {
                    DomainError::new(
                        ErrorCode::MissingField,
                        "Material is missing or not a valid value",
                    )
                })?;

            Ok(ValidatedTicket {
                dispatch_time: validate_dispatch_time(time)?,
                material: validate_material(material)?,
            })
        })
        .collect()
}

/// Ensure dispatch times are unique within one truck's batch.
///
/// Pre-flight check only; the storage unique constraint on
/// `(truck_id, dispatch_time)` remains the enforcement point.
pub fn validate_dispatch_time_uniqueness(tickets: &[Ticket]) -> Result<(), DomainError> {
    let mut seen = HashSet::new();
    for ticket in tickets {
        if !seen.insert(ticket.dispatch_time()) {
            return Err(DomainError::new(
                ErrorCode::DuplicateDispatchTime,
                "Dispatch time for a truck must be unique",
            )
            .with_detail("time", ticket.dispatch_time().to_rfc3339()));
        }
    }
    Ok(())
}
