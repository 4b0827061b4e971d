//! Material codes accepted on dispatch tickets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Material carried on a dispatch ticket.
///
/// The allow-set mirrors the material codes the yard systems dispatch;
/// anything else is rejected during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    Soil,
}

impl Material {
    /// All known material codes.
    pub const ALL: &'static [Material] = &[Material::Soil];

    /// The wire/storage representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Material::Soil => "Soil",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Material {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Material::ALL
            .iter()
            .find(|material| material.as_str() == s)
            .copied()
            .ok_or_else(|| {
                DomainError::new(ErrorCode::InvalidMaterial, "Material is not a known code")
                    .with_detail("material", s)
            })
    }
}
