//! QueryTicketsHandler - filtered, paginated ticket read-back.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, SiteId, Timestamp};
use crate::domain::ticketing::{DateRange, Page, Site, Ticket, TicketQuery, Truck};
use crate::ports::{StoredTicket, TicketStore};

/// Raw filter strings as received from the shell. Parsing happens in the
/// handler so the shell stays transport-only.
#[derive(Debug, Clone, Default)]
pub struct QueryTicketsCommand {
    pub site_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page_number: Option<String>,
    pub page_size: Option<String>,
}

/// Error type for ticket read-back, classified by discriminant.
#[derive(Debug, Clone)]
pub enum QueryTicketsError {
    /// Malformed filter combination, rejected before any storage access.
    BadRequest(DomainError),
    /// Unexpected storage failure.
    Storage(DomainError),
}

impl std::fmt::Display for QueryTicketsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryTicketsError::BadRequest(err) | QueryTicketsError::Storage(err) => {
                write!(f, "{}", err)
            }
        }
    }
}

impl std::error::Error for QueryTicketsError {}

/// Handler for ticket read-back.
pub struct QueryTicketsHandler {
    store: Arc<dyn TicketStore>,
}

impl QueryTicketsHandler {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    /// Results come back ordered by dispatch time ascending (row id breaks
    /// ties), so read-back and pagination are deterministic.
    pub async fn handle(
        &self,
        cmd: QueryTicketsCommand,
    ) -> Result<Vec<Ticket>, QueryTicketsError> {
        let query = Self::build_query(&cmd).map_err(QueryTicketsError::BadRequest)?;
        let descriptor = query.descriptor();

        let rows = self
            .store
            .find_tickets(&descriptor)
            .await
            .map_err(QueryTicketsError::Storage)?;

        tracing::debug!(count = rows.len(), "ticket query returned rows");
        Ok(rows.into_iter().map(Self::rehydrate).collect())
    }

    /// Validates the filter combination and builds the query value object.
    fn build_query(cmd: &QueryTicketsCommand) -> Result<TicketQuery, DomainError> {
        let site_id = cmd
            .site_id
            .as_deref()
            .map(|raw| {
                raw.parse::<SiteId>().map_err(|_| {
                    DomainError::new(
                        ErrorCode::InvalidFilter,
                        "'siteId' query parameter must be an integer",
                    )
                })
            })
            .transpose()?;

        let start = cmd
            .start_date
            .as_deref()
            .map(|raw| {
                Timestamp::parse_rfc3339(raw).map_err(|_| {
                    DomainError::new(
                        ErrorCode::InvalidFilter,
                        "'startDate' query parameter must be a valid date",
                    )
                })
            })
            .transpose()?;

        let end = cmd
            .end_date
            .as_deref()
            .map(|raw| {
                Timestamp::parse_rfc3339(raw).map_err(|_| {
                    DomainError::new(
                        ErrorCode::InvalidFilter,
                        "'endDate' query parameter must be a valid date",
                    )
                })
            })
            .transpose()?;

        if let (Some(start), Some(end)) = (&start, &end) {
            if !start.is_before(end) {
                return Err(DomainError::new(
                    ErrorCode::InvalidFilter,
                    "'startDate' must be earlier than 'endDate'",
                ));
            }
        }

        let page_number = Self::parse_page_field(cmd.page_number.as_deref(), "pageNumber")?;
        let page_size = Self::parse_page_field(cmd.page_size.as_deref(), "pageSize")?;

        let page = match (page_number, page_size) {
            (Some(number), Some(size)) => Some(Page { number, size }),
            (None, None) => None,
            _ => {
                return Err(DomainError::new(
                    ErrorCode::InvalidFilter,
                    "Both 'pageNumber' AND 'pageSize' query parameters must be present to use pagination",
                ))
            }
        };

        Ok(TicketQuery::new(site_id, DateRange { start, end }, page))
    }

    fn parse_page_field(raw: Option<&str>, name: &str) -> Result<Option<u32>, DomainError> {
        raw.map(|value| match value.parse::<u32>() {
            Ok(parsed) if parsed >= 1 => Ok(parsed),
            _ => Err(DomainError::new(
                ErrorCode::InvalidFilter,
                format!("'{}' query parameter must be a positive integer", name),
            )),
        })
        .transpose()
    }

    fn rehydrate(row: StoredTicket) -> Ticket {
        let site = Site::from_record(row.site_id, row.site_name);
        let truck = Truck::from_record(row.truck_id, row.truck_license, site);
        Ticket::from_record(truck, row.dispatch_time, row.material, row.number)
    }
}
