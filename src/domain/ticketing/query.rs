//! Read-back query value object and its storage-agnostic descriptor.

use chrono::{TimeZone, Utc};

use crate::domain::foundation::{SiteId, Timestamp};

/// Date window for ticket read-back. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateRange {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

/// Pagination request. The façade guarantees both halves are present and
/// at least 1 before this is constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    /// Row offset for a 1-based page number.
    pub fn offset(&self) -> i64 {
        (i64::from(self.number) - 1) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

/// Immutable read-back filter over stored tickets.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketQuery {
    site_id: Option<SiteId>,
    date_range: DateRange,
    page: Option<Page>,
}

impl TicketQuery {
    pub fn new(site_id: Option<SiteId>, date_range: DateRange, page: Option<Page>) -> Self {
        tracing::debug!(?site_id, ?date_range, ?page, "building ticket query from filters");
        Self {
            site_id,
            date_range,
            page,
        }
    }

    /// Normalizes into a descriptor consumable by a storage adapter.
    ///
    /// Defaults are applied exactly once, here: an open start falls back to
    /// the 1900-01-01 floor, an open end to the current time, and an unset
    /// site means all sites.
    pub fn descriptor(&self) -> QueryDescriptor {
        QueryDescriptor {
            site_id: self.site_id,
            start: self.date_range.start.unwrap_or_else(range_floor),
            end: self.date_range.end.unwrap_or_else(Timestamp::now),
            limit: self.page.map(|p| p.limit()),
            offset: self.page.map(|p| p.offset()),
        }
    }
}

/// Storage-agnostic query descriptor consumed by `TicketStore`
/// implementations. Both date bounds are always concrete.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    pub site_id: Option<SiteId>,
    pub start: Timestamp,
    pub end: Timestamp,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn range_floor() -> Timestamp {
    Timestamp::from_datetime(Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_bounds_default_to_floor_and_now() {
        let before = Timestamp::now();
        let descriptor = TicketQuery::new(None, DateRange::default(), None).descriptor();
        let after = Timestamp::now();

        assert_eq!(descriptor.start.to_rfc3339(), "1900-01-01T00:00:00.000Z");
        assert!(!descriptor.end.is_before(&before));
        assert!(!descriptor.end.is_after(&after));
        assert!(descriptor.site_id.is_none());
        assert!(descriptor.limit.is_none());
        assert!(descriptor.offset.is_none());
    }

    #[test]
    fn explicit_bounds_pass_through() {
        let start = Timestamp::parse_rfc3339("2000-01-01T00:00:00Z").unwrap();
        let end = Timestamp::parse_rfc3339("2001-01-01T00:00:00Z").unwrap();
        let range = DateRange {
            start: Some(start),
            end: Some(end),
        };

        let descriptor = TicketQuery::new(Some(SiteId::new(2)), range, None).descriptor();

        assert_eq!(descriptor.site_id, Some(SiteId::new(2)));
        assert_eq!(descriptor.start, start);
        assert_eq!(descriptor.end, end);
    }

    #[test]
    fn pagination_translates_to_limit_and_offset() {
        let page = Page { number: 3, size: 25 };
        let descriptor =
            TicketQuery::new(None, DateRange::default(), Some(page)).descriptor();

        assert_eq!(descriptor.limit, Some(25));
        assert_eq!(descriptor.offset, Some(50));
    }

    #[test]
    fn first_page_starts_at_offset_zero() {
        let page = Page { number: 1, size: 10 };
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 10);
    }
}
