//! Review ratings and aggregate rating summaries.
//!
//! Aggregates are maintained incrementally: each target row carries a
//! running `(sum, count)` pair that is adjusted in the same transaction as
//! the review write. The exposed average is the mean rounded to one decimal,
//! so a target rated [5, 4, 3] reads as 4.0 with a count of 3.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Error returned when a rating value is out of range.
#[derive(Debug, Clone, thiserror::Error)]
#[error("rating must be between 1 and 5, got {0}")]
pub struct RatingError(pub i16);

/// A star rating between 1 and 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(i16);

impl Rating {
    /// Lowest allowed rating.
    pub const MIN: i16 = 1;
    /// Highest allowed rating.
    pub const MAX: i16 = 5;

    /// Create a rating, validating the 1-5 range.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError`] if the value is outside 1..=5.
    pub const fn new(value: i16) -> Result<Self, RatingError> {
        if value >= Self::MIN && value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(RatingError(value))
        }
    }

    /// The underlying value.
    #[must_use]
    pub const fn value(self) -> i16 {
        self.0
    }
}

impl TryFrom<i16> for Rating {
    type Error = RatingError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Running rating aggregate for a business, product, or service.
///
/// `sum` is the total of all visible review ratings; `count` is how many
/// there are. Mutations mirror review writes one-to-one so the pair never
/// needs a full re-scan of the review collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// Sum of all review ratings.
    pub sum: i64,
    /// Number of reviews.
    pub count: i64,
}

impl RatingSummary {
    /// An empty summary (no reviews).
    #[must_use]
    pub const fn empty() -> Self {
        Self { sum: 0, count: 0 }
    }

    /// Build a summary from raw counters, e.g. columns read off a target row.
    #[must_use]
    pub const fn from_parts(sum: i64, count: i64) -> Self {
        Self { sum, count }
    }

    /// Account for a newly added review.
    #[must_use]
    pub const fn apply_add(self, rating: Rating) -> Self {
        Self {
            sum: self.sum + rating.value() as i64,
            count: self.count + 1,
        }
    }

    /// Account for a removed review.
    ///
    /// Saturates at zero so a drifted counter can never go negative.
    #[must_use]
    pub const fn apply_remove(self, rating: Rating) -> Self {
        let sum = self.sum - rating.value() as i64;
        let count = self.count - 1;
        Self {
            sum: if sum < 0 { 0 } else { sum },
            count: if count < 0 { 0 } else { count },
        }
    }

    /// Account for a review whose rating changed from `old` to `new`.
    #[must_use]
    pub const fn apply_replace(self, old: Rating, new: Rating) -> Self {
        Self {
            sum: self.sum - old.value() as i64 + new.value() as i64,
            count: self.count,
        }
    }

    /// The mean rating rounded to one decimal place, or `None` when there
    /// are no reviews.
    #[must_use]
    pub fn average(self) -> Option<Decimal> {
        if self.count == 0 {
            return None;
        }
        let mean = Decimal::from(self.sum) / Decimal::from(self.count);
        Some(mean.round_dp(1))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rating(v: i16) -> Rating {
        Rating::new(v).unwrap()
    }

    #[test]
    fn test_rating_range() {
        assert!(Rating::new(1).is_ok());
        assert!(Rating::new(5).is_ok());
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert!(Rating::new(-3).is_err());
    }

    #[test]
    fn test_average_of_five_four_three_is_exactly_four() {
        let summary = RatingSummary::empty()
            .apply_add(rating(5))
            .apply_add(rating(4))
            .apply_add(rating(3));

        assert_eq!(summary.count, 3);
        assert_eq!(summary.average().unwrap(), Decimal::new(40, 1)); // 4.0
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        // [5, 4] -> 4.5; [5, 5, 4] -> 4.666... -> 4.7
        let two = RatingSummary::from_parts(9, 2);
        assert_eq!(two.average().unwrap().to_string(), "4.5");

        let three = RatingSummary::from_parts(14, 3);
        assert_eq!(three.average().unwrap().to_string(), "4.7");
    }

    #[test]
    fn test_average_empty_is_none() {
        assert_eq!(RatingSummary::empty().average(), None);
    }

    #[test]
    fn test_remove_inverts_add() {
        let summary = RatingSummary::empty()
            .apply_add(rating(4))
            .apply_add(rating(2))
            .apply_remove(rating(4));

        assert_eq!(summary, RatingSummary::from_parts(2, 1));
    }

    #[test]
    fn test_remove_saturates_at_zero() {
        let summary = RatingSummary::empty().apply_remove(rating(5));
        assert_eq!(summary, RatingSummary::empty());
    }

    #[test]
    fn test_replace_keeps_count() {
        let summary = RatingSummary::from_parts(8, 2).apply_replace(rating(3), rating(5));
        assert_eq!(summary, RatingSummary::from_parts(10, 2));
    }

    #[test]
    fn test_replace_matches_remove_then_add() {
        let base = RatingSummary::from_parts(12, 3);
        let replaced = base.apply_replace(rating(2), rating(5));
        let removed_added = base.apply_remove(rating(2)).apply_add(rating(5));
        assert_eq!(replaced, removed_added);
    }
}
