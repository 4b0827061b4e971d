//! IngestTicketsHandler - ticket batch validation, numbering, persistence.
//!
//! This is the write-path façade and the numbering coordinator in one
//! place: raw input is validated, domain objects are built, the in-memory
//! dispatch-time pre-check runs, and the batch is numbered and committed
//! inside a single storage transaction.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, TicketNumber, TruckId};
use crate::domain::ticketing::{
    validate_dispatch_time_uniqueness, validate_ticket_batch, RawTicket, Ticket, Truck,
};
use crate::ports::{NewTicketRow, TicketStore, TicketStoreTransaction};

/// Command to ingest a batch of dispatch tickets for one truck.
#[derive(Debug, Clone)]
pub struct IngestTicketsCommand {
    pub truck_id: TruckId,
    pub tickets: Vec<RawTicket>,
}

/// Result of a committed ingestion batch.
#[derive(Debug, Clone)]
pub struct IngestTicketsResult {
    /// Numbers assigned to the batch, in input order.
    pub numbers: Vec<TicketNumber>,
}

/// Error type for ticket ingestion, classified by discriminant for the
/// HTTP taxonomy.
#[derive(Debug, Clone)]
pub enum IngestTicketsError {
    /// Malformed or missing input, rejected before any storage write.
    BadRequest(DomainError),
    /// Dispatch-time or numbering uniqueness violation, from the pre-check
    /// or the storage backstop.
    Conflict(DomainError),
    /// Unexpected storage failure; the transaction was rolled back.
    Storage(DomainError),
}

impl std::fmt::Display for IngestTicketsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestTicketsError::BadRequest(err)
            | IngestTicketsError::Conflict(err)
            | IngestTicketsError::Storage(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for IngestTicketsError {}

impl From<DomainError> for IngestTicketsError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::DuplicateDispatchTime | ErrorCode::TicketConflict => {
                IngestTicketsError::Conflict(err)
            }
            ErrorCode::MissingField
            | ErrorCode::InvalidTimestamp
            | ErrorCode::FutureTimestamp
            | ErrorCode::InvalidMaterial
            | ErrorCode::UnknownTruck => IngestTicketsError::BadRequest(err),
            _ => IngestTicketsError::Storage(err),
        }
    }
}

/// Handler for ticket ingestion.
pub struct IngestTicketsHandler {
    store: Arc<dyn TicketStore>,
}

impl IngestTicketsHandler {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        cmd: IngestTicketsCommand,
    ) -> Result<IngestTicketsResult, IngestTicketsError> {
        if cmd.tickets.is_empty() {
            return Err(IngestTicketsError::BadRequest(DomainError::new(
                ErrorCode::MissingField,
                "List of tickets was not provided",
            )));
        }

        // 1. Validation pipeline, then domain construction.
        let validated = validate_ticket_batch(&cmd.tickets)?;
        let truck = Truck::with_id(cmd.truck_id);
        let tickets: Vec<Ticket> = validated
            .into_iter()
            .map(|v| Ticket::new(truck.clone(), v.dispatch_time, v.material))
            .collect();

        // 2. Fast-path duplicate check; the storage constraint re-checks on
        // commit.
        validate_dispatch_time_uniqueness(&tickets)?;

        // 3. Numbering protocol inside one exclusively-owned transaction.
        let mut txn = self.store.begin().await?;
        match Self::number_and_insert(txn.as_mut(), cmd.truck_id, &tickets).await {
            Ok(numbers) => {
                txn.commit().await?;
                tracing::info!(
                    truck_id = %cmd.truck_id,
                    count = numbers.len(),
                    first_number = %numbers[0],
                    "ticket batch committed"
                );
                Ok(IngestTicketsResult { numbers })
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback failed after ingestion error");
                }
                Err(IngestTicketsError::from(err))
            }
        }
    }

    /// Resolve the truck, read the site's current maximum fresh from
    /// storage, assign contiguous numbers in input order, bulk-insert.
    ///
    /// The read-then-write is not race-free on its own; a concurrent batch
    /// may compute the same maximum. The unique constraint on the
    /// site-scoped number makes the losing transaction fail with a
    /// conflict instead of corrupting the sequence.
    async fn number_and_insert(
        txn: &mut dyn TicketStoreTransaction,
        truck_id: TruckId,
        tickets: &[Ticket],
    ) -> Result<Vec<TicketNumber>, DomainError> {
        let truck = txn.find_truck(truck_id).await?.ok_or_else(|| {
            DomainError::new(ErrorCode::UnknownTruck, "Truck is not registered")
                .with_detail("truckId", truck_id.to_string())
        })?;

        let current_max = txn.max_ticket_number_for_site(truck.site_id).await?;

        let rows: Vec<NewTicketRow> = tickets
            .iter()
            .enumerate()
            .map(|(i, ticket)| NewTicketRow {
                truck_id: truck.id,
                site_id: truck.site_id,
                dispatch_time: ticket.dispatch_time(),
                material: ticket.material(),
                number: TicketNumber::new(current_max + i as i64 + 1),
            })
            .collect();

        txn.insert_tickets(&rows).await?;

        Ok(rows.into_iter().map(|row| row.number).collect())
    }
}
