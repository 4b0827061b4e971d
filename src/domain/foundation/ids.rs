//! Strongly-typed identifier value objects.
//!
//! Sites and trucks are keyed by database integers supplied by the yard
//! reference data, so the inner representation is `i64` rather than a
//! generated id.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Unique identifier for a job site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(i64);

impl SiteId {
    /// Creates a SiteId from a raw database id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the inner integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SiteId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Unique identifier for a truck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TruckId(i64);

impl TruckId {
    /// Creates a TruckId from a raw database id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the inner integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TruckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TruckId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// A ticket's position in its site's numbering sequence.
///
/// Unique within a site, assigned in commit order, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketNumber(i64);

impl TicketNumber {
    /// Creates a TicketNumber from a raw sequence value.
    pub fn new(number: i64) -> Self {
        Self(number)
    }

    /// Returns the inner integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
