//! In-memory ticket store for tests and local development.
//!
//! Matches the Postgres adapter at the contract level: writes buffer inside
//! a transaction and the unique constraints on `(truck_id, dispatch_time)`
//! and `(site_id, number)` are enforced when the buffer is applied at
//! commit. Two racing transactions can therefore both read the same site
//! maximum and only one of them will commit, exactly as with the real
//! storage backstop.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::foundation::{DomainError, ErrorCode, SiteId, TruckId};
use crate::domain::ticketing::QueryDescriptor;
use crate::ports::{NewTicketRow, StoredTicket, TicketStore, TicketStoreTransaction, TruckRecord};

#[derive(Debug, Clone)]
struct SiteRow {
    name: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    sites: HashMap<i64, SiteRow>,
    trucks: HashMap<i64, TruckRecord>,
    tickets: Vec<NewTicketRow>,
}

impl MemoryState {
    /// Rejects a row that collides with a committed ticket on either
    /// unique constraint.
    fn check_constraints(&self, row: &NewTicketRow) -> Result<(), DomainError> {
        for existing in &self.tickets {
            if existing.truck_id == row.truck_id && existing.dispatch_time == row.dispatch_time {
                return Err(DomainError::new(
                    ErrorCode::TicketConflict,
                    "Ticket conflicts with an already stored ticket",
                )
                .with_detail("constraint", "tickets_truck_dispatch_key"));
            }
            if existing.site_id == row.site_id && existing.number == row.number {
                return Err(DomainError::new(
                    ErrorCode::TicketConflict,
                    "Ticket conflicts with an already stored ticket",
                )
                .with_detail("constraint", "tickets_site_number_key"));
            }
        }
        Ok(())
    }
}

/// In-memory implementation of TicketStore.
#[derive(Clone, Default)]
pub struct InMemoryTicketStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryTicketStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a site (test/dev fixture).
    pub async fn add_site(&self, id: i64, name: &str) {
        self.state.lock().await.sites.insert(
            id,
            SiteRow {
                name: name.to_string(),
            },
        );
    }

    /// Registers a truck (test/dev fixture).
    pub async fn add_truck(&self, id: i64, site_id: i64, license: &str) {
        self.state.lock().await.trucks.insert(
            id,
            TruckRecord {
                id: TruckId::new(id),
                site_id: SiteId::new(site_id),
                license: license.to_string(),
            },
        );
    }

    /// Snapshot of committed ticket rows (test assertions).
    pub async fn committed_tickets(&self) -> Vec<NewTicketRow> {
        self.state.lock().await.tickets.clone()
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn begin(&self) -> Result<Box<dyn TicketStoreTransaction>, DomainError> {
        Ok(Box::new(MemoryTransaction {
            state: self.state.clone(),
            pending: Vec::new(),
        }))
    }

    async fn find_tickets(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<Vec<StoredTicket>, DomainError> {
        let state = self.state.lock().await;

        let mut matches: Vec<(usize, StoredTicket)> = state
            .tickets
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                row.dispatch_time >= descriptor.start
                    && row.dispatch_time <= descriptor.end
                    && descriptor.site_id.map_or(true, |site| row.site_id == site)
            })
            .map(|(id, row)| {
                let truck = state
                    .trucks
                    .get(&row.truck_id.as_i64())
                    .cloned()
                    .ok_or_else(|| {
                        DomainError::new(ErrorCode::DatabaseError, "Ticket references unknown truck")
                    })?;
                let site = state.sites.get(&row.site_id.as_i64()).ok_or_else(|| {
                    DomainError::new(ErrorCode::DatabaseError, "Ticket references unknown site")
                })?;

                Ok((
                    id,
                    StoredTicket {
                        site_id: row.site_id,
                        site_name: site.name.clone(),
                        truck_id: truck.id,
                        truck_license: truck.license,
                        dispatch_time: row.dispatch_time,
                        material: row.material,
                        number: row.number,
                    },
                ))
            })
            .collect::<Result<_, DomainError>>()?;

        // Same ordering policy as the Postgres adapter: dispatch time, then
        // insertion order as the row-id tie-breaker.
        matches.sort_by(|(a_id, a), (b_id, b)| {
            a.dispatch_time
                .cmp(&b.dispatch_time)
                .then(a_id.cmp(b_id))
        });

        let offset = descriptor.offset.unwrap_or(0).max(0) as usize;
        let rows = matches.into_iter().map(|(_, row)| row).skip(offset);
        let rows: Vec<StoredTicket> = match descriptor.limit {
            Some(limit) => rows.take(limit.max(0) as usize).collect(),
            None => rows.collect(),
        };

        Ok(rows)
    }
}

/// Buffering transaction; nothing is visible until commit.
struct MemoryTransaction {
    state: Arc<Mutex<MemoryState>>,
    pending: Vec<NewTicketRow>,
}

#[async_trait]
impl TicketStoreTransaction for MemoryTransaction {
    async fn find_truck(&mut self, truck_id: TruckId) -> Result<Option<TruckRecord>, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .trucks
            .get(&truck_id.as_i64())
            .cloned())
    }

    async fn max_ticket_number_for_site(&mut self, site_id: SiteId) -> Result<i64, DomainError> {
        let state = self.state.lock().await;

        // Aggregate through the truck relation, as the SQL adapter does.
        Ok(state
            .tickets
            .iter()
            .filter(|row| {
                state
                    .trucks
                    .get(&row.truck_id.as_i64())
                    .map_or(false, |truck| truck.site_id == site_id)
            })
            .map(|row| row.number.as_i64())
            .max()
            .unwrap_or(0))
    }

    async fn insert_tickets(&mut self, rows: &[NewTicketRow]) -> Result<(), DomainError> {
        self.pending.extend_from_slice(rows);
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), DomainError> {
        let pending = std::mem::take(&mut self.pending);
        let mut state = self.state.lock().await;

        // All-or-nothing: check the whole buffer before any row lands.
        for (i, row) in pending.iter().enumerate() {
            state.check_constraints(row)?;
            for earlier in &pending[..i] {
                if earlier.truck_id == row.truck_id && earlier.dispatch_time == row.dispatch_time {
                    return Err(DomainError::new(
                        ErrorCode::TicketConflict,
                        "Ticket conflicts with an already stored ticket",
                    )
                    .with_detail("constraint", "tickets_truck_dispatch_key"));
                }
            }
        }

        state.tickets.extend(pending);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        // Buffered rows are simply dropped.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{TicketNumber, Timestamp};
    use crate::domain::ticketing::{DateRange, Material, TicketQuery};

    fn row(truck_id: i64, site_id: i64, dispatch_time: &str, number: i64) -> NewTicketRow {
        NewTicketRow {
            truck_id: TruckId::new(truck_id),
            site_id: SiteId::new(site_id),
            dispatch_time: Timestamp::parse_rfc3339(dispatch_time).unwrap(),
            material: Material::Soil,
            number: TicketNumber::new(number),
        }
    }

    async fn store_with_fixtures() -> InMemoryTicketStore {
        let store = InMemoryTicketStore::new();
        store.add_site(1, "Cedar Yard").await;
        store.add_truck(4, 1, "ABC-123").await;
        store.add_truck(5, 1, "DEF-456").await;
        store
    }

    #[tokio::test]
    async fn committed_rows_become_visible() {
        let store = store_with_fixtures().await;

        let mut txn = store.begin().await.unwrap();
        txn.insert_tickets(&[row(4, 1, "2000-01-01T00:00:00Z", 1)])
            .await
            .unwrap();
        txn.commit().await.unwrap();

        assert_eq!(store.committed_tickets().await.len(), 1);
    }

    #[tokio::test]
    async fn rolled_back_rows_are_discarded() {
        let store = store_with_fixtures().await;

        let mut txn = store.begin().await.unwrap();
        txn.insert_tickets(&[row(4, 1, "2000-01-01T00:00:00Z", 1)])
            .await
            .unwrap();
        txn.rollback().await.unwrap();

        assert!(store.committed_tickets().await.is_empty());
    }

    #[tokio::test]
    async fn buffered_rows_are_invisible_to_the_site_maximum() {
        let store = store_with_fixtures().await;

        let mut txn = store.begin().await.unwrap();
        txn.insert_tickets(&[row(4, 1, "2000-01-01T00:00:00Z", 1)])
            .await
            .unwrap();

        let mut other = store.begin().await.unwrap();
        assert_eq!(
            other.max_ticket_number_for_site(SiteId::new(1)).await.unwrap(),
            0
        );

        txn.commit().await.unwrap();
        let mut third = store.begin().await.unwrap();
        assert_eq!(
            third.max_ticket_number_for_site(SiteId::new(1)).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn interleaved_transactions_collide_on_the_site_number_constraint() {
        let store = store_with_fixtures().await;

        // Both transactions read the same maximum before either commits.
        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();
        assert_eq!(
            first.max_ticket_number_for_site(SiteId::new(1)).await.unwrap(),
            0
        );
        assert_eq!(
            second.max_ticket_number_for_site(SiteId::new(1)).await.unwrap(),
            0
        );

        first
            .insert_tickets(&[row(4, 1, "2000-01-01T00:00:00Z", 1)])
            .await
            .unwrap();
        second
            .insert_tickets(&[row(5, 1, "2000-06-01T00:00:00Z", 1)])
            .await
            .unwrap();

        first.commit().await.unwrap();
        let err = second.commit().await.unwrap_err();

        assert_eq!(err.code, ErrorCode::TicketConflict);
        assert_eq!(store.committed_tickets().await.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_truck_dispatch_time_collides() {
        let store = store_with_fixtures().await;

        let mut txn = store.begin().await.unwrap();
        txn.insert_tickets(&[row(4, 1, "2000-01-01T00:00:00Z", 1)])
            .await
            .unwrap();
        txn.commit().await.unwrap();

        let mut txn = store.begin().await.unwrap();
        txn.insert_tickets(&[row(4, 1, "2000-01-01T00:00:00Z", 2)])
            .await
            .unwrap();
        let err = txn.commit().await.unwrap_err();

        assert_eq!(err.code, ErrorCode::TicketConflict);
    }

    #[tokio::test]
    async fn conflicting_commit_is_all_or_nothing() {
        let store = store_with_fixtures().await;

        let mut txn = store.begin().await.unwrap();
        txn.insert_tickets(&[row(4, 1, "2000-01-01T00:00:00Z", 1)])
            .await
            .unwrap();
        txn.commit().await.unwrap();

        // One clean row plus one colliding row: neither may land.
        let mut txn = store.begin().await.unwrap();
        txn.insert_tickets(&[
            row(5, 1, "2003-01-01T00:00:00Z", 2),
            row(4, 1, "2000-01-01T00:00:00Z", 3),
        ])
        .await
        .unwrap();
        assert!(txn.commit().await.is_err());

        assert_eq!(store.committed_tickets().await.len(), 1);
    }

    #[tokio::test]
    async fn read_back_is_ordered_by_dispatch_time() {
        let store = store_with_fixtures().await;

        let mut txn = store.begin().await.unwrap();
        txn.insert_tickets(&[
            row(4, 1, "2002-01-01T00:00:00Z", 1),
            row(4, 1, "2000-01-01T00:00:00Z", 2),
            row(4, 1, "2001-01-01T00:00:00Z", 3),
        ])
        .await
        .unwrap();
        txn.commit().await.unwrap();

        let descriptor = TicketQuery::new(None, DateRange::default(), None).descriptor();
        let rows = store.find_tickets(&descriptor).await.unwrap();

        let numbers: Vec<i64> = rows.iter().map(|r| r.number.as_i64()).collect();
        assert_eq!(numbers, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn site_filter_and_window_apply() {
        let store = store_with_fixtures().await;
        store.add_site(2, "North Pit").await;
        store.add_truck(9, 2, "XYZ-999").await;

        let mut txn = store.begin().await.unwrap();
        txn.insert_tickets(&[
            row(4, 1, "2000-01-01T00:00:00Z", 1),
            row(9, 2, "2000-02-01T00:00:00Z", 1),
        ])
        .await
        .unwrap();
        txn.commit().await.unwrap();

        let descriptor = TicketQuery::new(
            Some(SiteId::new(2)),
            DateRange::default(),
            None,
        )
        .descriptor();
        let rows = store.find_tickets(&descriptor).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].site_name, "North Pit");
        assert_eq!(rows[0].truck_license, "XYZ-999");
    }
}
