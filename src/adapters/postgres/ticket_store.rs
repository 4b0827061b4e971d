//! PostgreSQL implementation of the ticket store port.
//!
//! The numbering transaction maps directly onto a sqlx transaction; the
//! unique constraints on `(truck_id, dispatch_time)` and `(site_id,
//! number)` are the backstop that serializes racing batches. Unique
//! violations are translated to `TicketConflict` so no raw storage error
//! crosses the port boundary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::domain::foundation::{DomainError, ErrorCode, SiteId, TicketNumber, Timestamp, TruckId};
use crate::domain::ticketing::{Material, QueryDescriptor};
use crate::ports::{NewTicketRow, StoredTicket, TicketStore, TicketStoreTransaction, TruckRecord};

/// SQLSTATE code Postgres raises for unique-constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL implementation of TicketStore.
#[derive(Clone)]
pub struct PostgresTicketStore {
    pool: PgPool,
}

impl PostgresTicketStore {
    /// Creates a new PostgresTicketStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketStore for PostgresTicketStore {
    async fn begin(&self) -> Result<Box<dyn TicketStoreTransaction>, DomainError> {
        let txn = self.pool.begin().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to open transaction: {}", e),
            )
        })?;

        Ok(Box::new(PgTicketTransaction { txn }))
    }

    async fn find_tickets(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<Vec<StoredTicket>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT s.id AS site_id, s.name AS site_name,
                   tr.id AS truck_id, tr.license AS truck_license,
                   t.dispatch_time, t.material, t.number
            FROM tickets t
            JOIN trucks tr ON tr.id = t.truck_id
            JOIN sites s ON s.id = t.site_id
            WHERE t.dispatch_time >= $1
              AND t.dispatch_time <= $2
              AND ($3::bigint IS NULL OR t.site_id = $3)
            ORDER BY t.dispatch_time ASC, t.id ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(descriptor.start.as_datetime())
        .bind(descriptor.end.as_datetime())
        .bind(descriptor.site_id.map(|id| id.as_i64()))
        .bind(descriptor.limit)
        .bind(descriptor.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch tickets: {}", e),
            )
        })?;

        rows.into_iter().map(row_to_stored_ticket).collect()
    }
}

/// One open sqlx transaction implementing the numbering protocol's
/// storage primitives.
struct PgTicketTransaction {
    txn: Transaction<'static, Postgres>,
}

#[async_trait]
impl TicketStoreTransaction for PgTicketTransaction {
    async fn find_truck(&mut self, truck_id: TruckId) -> Result<Option<TruckRecord>, DomainError> {
        let row = sqlx::query("SELECT id, site_id, license FROM trucks WHERE id = $1")
            .bind(truck_id.as_i64())
            .fetch_optional(&mut *self.txn)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to fetch truck: {}", e),
                )
            })?;

        match row {
            Some(row) => {
                let id: i64 = get(&row, "id")?;
                let site_id: i64 = get(&row, "site_id")?;
                let license: String = get(&row, "license")?;

                Ok(Some(TruckRecord {
                    id: TruckId::new(id),
                    site_id: SiteId::new(site_id),
                    license,
                }))
            }
            None => Ok(None),
        }
    }

    async fn max_ticket_number_for_site(&mut self, site_id: SiteId) -> Result<i64, DomainError> {
        // Cross-entity aggregate: ticket -> truck -> site.
        let result: (Option<i64>,) = sqlx::query_as(
            r#"
            SELECT MAX(t.number)
            FROM tickets t
            JOIN trucks tr ON tr.id = t.truck_id
            WHERE tr.site_id = $1
            "#,
        )
        .bind(site_id.as_i64())
        .fetch_one(&mut *self.txn)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to read site ticket number maximum: {}", e),
            )
        })?;

        Ok(result.0.unwrap_or(0))
    }

    async fn insert_tickets(&mut self, rows: &[NewTicketRow]) -> Result<(), DomainError> {
        let truck_ids: Vec<i64> = rows.iter().map(|r| r.truck_id.as_i64()).collect();
        let site_ids: Vec<i64> = rows.iter().map(|r| r.site_id.as_i64()).collect();
        let dispatch_times: Vec<DateTime<Utc>> =
            rows.iter().map(|r| *r.dispatch_time.as_datetime()).collect();
        let materials: Vec<String> = rows.iter().map(|r| r.material.to_string()).collect();
        let numbers: Vec<i64> = rows.iter().map(|r| r.number.as_i64()).collect();

        sqlx::query(
            r#"
            INSERT INTO tickets (truck_id, site_id, dispatch_time, material, number)
            SELECT * FROM UNNEST(
                $1::bigint[], $2::bigint[], $3::timestamptz[], $4::text[], $5::bigint[]
            )
            "#,
        )
        .bind(&truck_ids)
        .bind(&site_ids)
        .bind(&dispatch_times)
        .bind(&materials)
        .bind(&numbers)
        .execute(&mut *self.txn)
        .await
        .map_err(conflict_or_database)?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.txn.commit().await.map_err(conflict_or_database)
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        self.txn.rollback().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to roll back transaction: {}", e),
            )
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

/// Translates a unique-constraint violation into the conflict domain error;
/// everything else stays an opaque database error.
fn conflict_or_database(e: sqlx::Error) -> DomainError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            DomainError::new(
                ErrorCode::TicketConflict,
                "Ticket conflicts with an already stored ticket",
            )
            .with_detail("constraint", db.constraint().unwrap_or_default())
        }
        _ => DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to write tickets: {}", e),
        ),
    }
}

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(column).map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get {}: {}", column, e),
        )
    })
}

fn row_to_stored_ticket(row: PgRow) -> Result<StoredTicket, DomainError> {
    let site_id: i64 = get(&row, "site_id")?;
    let site_name: String = get(&row, "site_name")?;
    let truck_id: i64 = get(&row, "truck_id")?;
    let truck_license: String = get(&row, "truck_license")?;
    let dispatch_time: DateTime<Utc> = get(&row, "dispatch_time")?;
    let material: String = get(&row, "material")?;
    let number: i64 = get(&row, "number")?;

    let material = material.parse::<Material>().map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid material in storage: {}", e),
        )
    })?;

    Ok(StoredTicket {
        site_id: SiteId::new(site_id),
        site_name,
        truck_id: TruckId::new(truck_id),
        truck_license,
        dispatch_time: Timestamp::from_datetime(dispatch_time),
        material,
        number: TicketNumber::new(number),
    })
}
