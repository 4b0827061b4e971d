//! Concurrency test for the numbering protocol.
//!
//! Two ingestion batches race on the same site. A barrier inside the
//! store forces both transactions to read the same current maximum before
//! either commits, so both try to claim the same ticket number. Exactly
//! one batch must commit; the other must surface a conflict.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Barrier;

use haulboard::adapters::memory::InMemoryTicketStore;
use haulboard::application::handlers::{
    IngestTicketsCommand, IngestTicketsError, IngestTicketsHandler,
};
use haulboard::domain::foundation::{DomainError, SiteId, TruckId};
use haulboard::domain::ticketing::{QueryDescriptor, RawTicket};
use haulboard::ports::{
    NewTicketRow, StoredTicket, TicketStore, TicketStoreTransaction, TruckRecord,
};

// =============================================================================
// Barrier-gated store wrapper
// =============================================================================

/// Wraps the in-memory store and holds every transaction at the point
/// where it has just read the site maximum, until `participants`
/// transactions have reached the same point.
struct GatedStore {
    inner: InMemoryTicketStore,
    gate: Arc<Barrier>,
}

impl GatedStore {
    fn new(inner: InMemoryTicketStore, participants: usize) -> Self {
        Self {
            inner,
            gate: Arc::new(Barrier::new(participants)),
        }
    }
}

#[async_trait]
impl TicketStore for GatedStore {
    async fn begin(&self) -> Result<Box<dyn TicketStoreTransaction>, DomainError> {
        let inner = self.inner.begin().await?;
        Ok(Box::new(GatedTransaction {
            inner,
            gate: self.gate.clone(),
        }))
    }

    async fn find_tickets(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<Vec<StoredTicket>, DomainError> {
        self.inner.find_tickets(descriptor).await
    }
}

struct GatedTransaction {
    inner: Box<dyn TicketStoreTransaction>,
    gate: Arc<Barrier>,
}

#[async_trait]
impl TicketStoreTransaction for GatedTransaction {
    async fn find_truck(&mut self, truck_id: TruckId) -> Result<Option<TruckRecord>, DomainError> {
        self.inner.find_truck(truck_id).await
    }

    async fn max_ticket_number_for_site(&mut self, site_id: SiteId) -> Result<i64, DomainError> {
        let max = self.inner.max_ticket_number_for_site(site_id).await?;
        // Hold until every racer has read its maximum.
        self.gate.wait().await;
        Ok(max)
    }

    async fn insert_tickets(&mut self, rows: &[NewTicketRow]) -> Result<(), DomainError> {
        self.inner.insert_tickets(rows).await
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        self.inner.rollback().await
    }
}

// =============================================================================
// Tests
// =============================================================================

fn raw_ticket(dispatch_time: &str) -> RawTicket {
    RawTicket::new(dispatch_time, "Soil")
}

#[tokio::test]
async fn exactly_one_of_two_racing_batches_survives() {
    let memory = InMemoryTicketStore::new();
    memory.add_site(1, "Cedar Yard").await;
    memory.add_truck(1, 1, "ABC-123").await;
    memory.add_truck(2, 1, "DEF-456").await;

    let store = Arc::new(GatedStore::new(memory.clone(), 2));
    let handler = Arc::new(IngestTicketsHandler::new(store));

    // Distinct trucks and distinct dispatch times: only the site-scoped
    // number can collide, and both racers will claim number 1.
    let first = {
        let handler = handler.clone();
        tokio::spawn(async move {
            handler
                .handle(IngestTicketsCommand {
                    truck_id: TruckId::new(1),
                    tickets: vec![raw_ticket("2000-01-01T00:00:00Z")],
                })
                .await
        })
    };
    let second = {
        let handler = handler.clone();
        tokio::spawn(async move {
            handler
                .handle(IngestTicketsCommand {
                    truck_id: TruckId::new(2),
                    tickets: vec![raw_ticket("2000-06-01T00:00:00Z")],
                })
                .await
        })
    };

    let outcomes = vec![first.await.unwrap(), second.await.unwrap()];

    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    let conflicts = outcomes
        .iter()
        .filter(|r| matches!(r, Err(IngestTicketsError::Conflict(_))))
        .count();

    assert_eq!(wins, 1, "exactly one racing batch must commit");
    assert_eq!(conflicts, 1, "the losing batch must surface a conflict");

    let committed = memory.committed_tickets().await;
    assert_eq!(committed.len(), 1);
    assert_eq!(committed[0].number.as_i64(), 1);
}

#[tokio::test]
async fn the_loser_succeeds_on_retry_with_a_fresh_maximum() {
    let memory = InMemoryTicketStore::new();
    memory.add_site(1, "Cedar Yard").await;
    memory.add_truck(1, 1, "ABC-123").await;
    memory.add_truck(2, 1, "DEF-456").await;

    let store = Arc::new(GatedStore::new(memory.clone(), 2));
    let handler = Arc::new(IngestTicketsHandler::new(store));

    let race = |truck_id: i64, time: &str| {
        let handler = handler.clone();
        let cmd = IngestTicketsCommand {
            truck_id: TruckId::new(truck_id),
            tickets: vec![raw_ticket(time)],
        };
        tokio::spawn(async move { handler.handle(cmd).await })
    };

    let first = race(1, "2000-01-01T00:00:00Z");
    let second = race(2, "2000-06-01T00:00:00Z");
    let outcomes = vec![first.await.unwrap(), second.await.unwrap()];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);

    // Retry through the ungated store: the fresh maximum read assigns the
    // next free number.
    let retry_handler = IngestTicketsHandler::new(Arc::new(memory.clone()));
    let result = retry_handler
        .handle(IngestTicketsCommand {
            truck_id: TruckId::new(2),
            tickets: vec![raw_ticket("2000-07-01T00:00:00Z")],
        })
        .await
        .unwrap();

    assert_eq!(result.numbers.len(), 1);
    assert_eq!(result.numbers[0].as_i64(), 2);

    let committed = memory.committed_tickets().await;
    assert_eq!(committed.len(), 2);
    let mut numbers: Vec<i64> = committed.iter().map(|t| t.number.as_i64()).collect();
    numbers.sort_unstable();
    assert_eq!(numbers, vec![1, 2]);
}
