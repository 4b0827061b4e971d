//! Truck value object.

use crate::domain::foundation::TruckId;

use super::Site;

/// A vehicle identified by id, optionally carrying its license plate and
/// owning site.
///
/// On the write path only the id is known; the read path rehydrates the
/// full record for presentation. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Truck {
    id: TruckId,
    license: Option<String>,
    site: Option<Site>,
}

impl Truck {
    /// Write-path constructor: only the id is known.
    pub fn with_id(id: TruckId) -> Self {
        tracing::debug!(truck_id = %id, "building truck from id");
        Self {
            id,
            license: None,
            site: None,
        }
    }

    /// Read-path constructor: rehydrated with license and owning site.
    pub fn from_record(id: TruckId, license: impl Into<String>, site: Site) -> Self {
        Self {
            id,
            license: Some(license.into()),
            site: Some(site),
        }
    }

    pub fn id(&self) -> TruckId {
        self.id
    }

    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    pub fn site(&self) -> Option<&Site> {
        self.site.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SiteId;

    #[test]
    fn write_path_truck_has_only_an_id() {
        let truck = Truck::with_id(TruckId::new(8));
        assert_eq!(truck.id(), TruckId::new(8));
        assert!(truck.license().is_none());
        assert!(truck.site().is_none());
    }

    #[test]
    fn read_path_truck_carries_license_and_site() {
        let site = Site::from_record(SiteId::new(1), "North Pit");
        let truck = Truck::from_record(TruckId::new(8), "ABC-123", site.clone());

        assert_eq!(truck.license(), Some("ABC-123"));
        assert_eq!(truck.site(), Some(&site));
    }
}
