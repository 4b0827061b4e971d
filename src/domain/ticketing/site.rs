//! Site value object.

use crate::domain::foundation::SiteId;

/// A physical yard that owns trucks and accumulates a single ticket
/// numbering sequence.
///
/// Only ever rehydrated from storage; read-only reference used for
/// presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    id: SiteId,
    name: String,
}

impl Site {
    /// Rehydrates a site from a storage row.
    pub fn from_record(id: SiteId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> SiteId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
