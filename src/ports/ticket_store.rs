//! Ticket store port - the storage collaborator contract.
//!
//! The write path runs the numbering protocol against an explicit
//! transaction handle; the read path is a single filtered fetch. Row
//! records defined here are the only shapes that cross the boundary -
//! storage row layouts never leak upward.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SiteId, TicketNumber, Timestamp, TruckId};
use crate::domain::ticketing::{Material, QueryDescriptor};

/// Truck row as stored, resolved inside the numbering transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruckRecord {
    pub id: TruckId,
    pub site_id: SiteId,
    pub license: String,
}

/// Fully-numbered ticket row ready for insertion. Carries the denormalized
/// site id so the site-scoped number constraint is expressible in storage.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTicketRow {
    pub truck_id: TruckId,
    pub site_id: SiteId,
    pub dispatch_time: Timestamp,
    pub material: Material,
    pub number: TicketNumber,
}

/// Joined read-back row: ticket plus its owning truck and site.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTicket {
    pub site_id: SiteId,
    pub site_name: String,
    pub truck_id: TruckId,
    pub truck_license: String,
    pub dispatch_time: Timestamp,
    pub material: Material,
    pub number: TicketNumber,
}

/// Storage collaborator for ticket persistence and read-back.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Opens a transaction for the numbering protocol.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` when a transaction cannot be opened
    async fn begin(&self) -> Result<Box<dyn TicketStoreTransaction>, DomainError>;

    /// Filtered, paginated read-back of stored tickets, ordered by dispatch
    /// time ascending with row id as the tie-breaker.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on any storage failure
    async fn find_tickets(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<Vec<StoredTicket>, DomainError>;
}

/// One open storage transaction.
///
/// Exclusively owned by the coordinator call that opened it; consumed by
/// `commit` or `rollback`. Implementations must guarantee nothing written
/// through the handle is visible until commit succeeds.
#[async_trait]
pub trait TicketStoreTransaction: Send {
    /// Resolves a truck row by id. `None` when the truck is not registered.
    async fn find_truck(&mut self, truck_id: TruckId) -> Result<Option<TruckRecord>, DomainError>;

    /// Highest committed ticket number across the site's trucks; 0 when the
    /// site has no tickets yet.
    async fn max_ticket_number_for_site(&mut self, site_id: SiteId) -> Result<i64, DomainError>;

    /// Bulk-inserts the batch in one write.
    ///
    /// # Errors
    ///
    /// - `TicketConflict` when a unique constraint rejects a row
    /// - `DatabaseError` on any other storage failure
    async fn insert_tickets(&mut self, rows: &[NewTicketRow]) -> Result<(), DomainError>;

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// - `TicketConflict` when constraint enforcement is deferred to commit
    /// - `DatabaseError` on any other storage failure
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;

    /// Rolls the transaction back, discarding buffered writes.
    async fn rollback(self: Box<Self>) -> Result<(), DomainError>;
}
