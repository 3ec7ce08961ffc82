//! Review/favorite target kinds.
//!
//! Favorites and reviews can point at a business, a product, or a service.
//! The table each kind lives in is resolved here, in one place, instead of
//! being restated as a string ladder in every data-access module.

use serde::{Deserialize, Serialize};

/// Error returned when parsing a [`TargetKind`] from a string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid target kind: {0}")]
pub struct TargetKindError(pub String);

/// The kind of entity a favorite or review points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Business,
    Product,
    Service,
}

impl TargetKind {
    /// All kinds, in a stable order.
    pub const ALL: [Self; 3] = [Self::Business, Self::Product, Self::Service];

    /// The wire/database string for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Product => "product",
            Self::Service => "service",
        }
    }

    /// The table holding rows of this kind.
    ///
    /// Rating aggregates (`rating_sum`, `review_count`) live directly on
    /// these tables, so review writes address them through this mapping.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Business => "businesses",
            Self::Product => "products",
            Self::Service => "services",
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TargetKind {
    type Err = TargetKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "business" => Ok(Self::Business),
            "product" => Ok(Self::Product),
            "service" => Ok(Self::Service),
            other => Err(TargetKindError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_through_str() {
        for kind in TargetKind::ALL {
            let parsed: TargetKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_rejects_unknown_kind() {
        assert!("favourite".parse::<TargetKind>().is_err());
        assert!("".parse::<TargetKind>().is_err());
    }

    #[test]
    fn test_table_mapping() {
        assert_eq!(TargetKind::Business.table(), "businesses");
        assert_eq!(TargetKind::Product.table(), "products");
        assert_eq!(TargetKind::Service.table(), "services");
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&TargetKind::Product).unwrap();
        assert_eq!(json, "\"product\"");
    }
}
