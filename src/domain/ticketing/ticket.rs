//! Ticket value object and its presentation view.

use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorCode, TicketNumber, Timestamp};

use super::{Material, Truck};

/// One dispatch record: truck, dispatch time, material, and (once assigned)
/// the site-scoped sequence number.
///
/// Constructed from validated input on the write path (no number yet) or
/// from a storage row on the read path (number always present). Never
/// mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    truck: Truck,
    dispatch_time: Timestamp,
    material: Material,
    number: Option<TicketNumber>,
}

impl Ticket {
    /// Write-path constructor. The sequence number is assigned later,
    /// inside the numbering transaction.
    pub fn new(truck: Truck, dispatch_time: Timestamp, material: Material) -> Self {
        tracing::debug!(
            truck_id = %truck.id(),
            %dispatch_time,
            %material,
            "building ticket from request data"
        );
        Self {
            truck,
            dispatch_time,
            material,
            number: None,
        }
    }

    /// Read-path constructor: storage always supplies the assigned number.
    pub fn from_record(
        truck: Truck,
        dispatch_time: Timestamp,
        material: Material,
        number: TicketNumber,
    ) -> Self {
        Self {
            truck,
            dispatch_time,
            material,
            number: Some(number),
        }
    }

    pub fn truck(&self) -> &Truck {
        &self.truck
    }

    pub fn dispatch_time(&self) -> Timestamp {
        self.dispatch_time
    }

    pub fn material(&self) -> Material {
        self.material
    }

    pub fn number(&self) -> Option<TicketNumber> {
        self.number
    }

    /// Client-facing view of a stored ticket.
    ///
    /// A ticket read back from storage always carries its site, license and
    /// number; absence means a broken rehydration invariant, not a
    /// user-facing error path.
    pub fn present(&self) -> Result<TicketPresentation, DomainError> {
        let site = self.truck.site().ok_or_else(|| {
            DomainError::new(
                ErrorCode::IncompletePresentation,
                "Site must be defined in order to present ticket",
            )
        })?;

        let license = self.truck.license().ok_or_else(|| {
            DomainError::new(
                ErrorCode::IncompletePresentation,
                "Truck license plate must be defined in order to present ticket",
            )
        })?;

        let number = self.number.ok_or_else(|| {
            DomainError::new(
                ErrorCode::IncompletePresentation,
                "Ticket number must be defined in order to present ticket",
            )
        })?;

        Ok(TicketPresentation {
            site_name: site.name().to_string(),
            truck_license_plate: license.to_string(),
            number: number.as_i64(),
            dispatch_time: self.dispatch_time,
            material: self.material,
        })
    }
}

/// Serialized client view of a stored ticket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPresentation {
    pub site_name: String,
    pub truck_license_plate: String,
    pub number: i64,
    pub dispatch_time: Timestamp,
    pub material: Material,
}
