//! Saturating `{min, max}` interval arithmetic (§4.5 "Interval arithmetic").
//!
//! The same shape is used for both cost and size estimates, since `Add`,
//! `Multiply`, `Union` and `MultiplyByCostFactor` are all defined
//! identically for both.

/// A closed `[min, max]` range over `u64`, saturating instead of
/// overflowing or panicking.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Interval {
    pub min: u64,
    pub max: u64,
}

/// `CostEstimate { min, max }` (§6.4).
pub type CostEstimate = Interval;
/// The collaborator's size-estimate shape (§6.3).
pub type SizeEstimate = Interval;

impl Interval {
    pub const ZERO: Interval = Interval { min: 0, max: 0 };
    /// "no information" — used when a size can't be computed or queried.
    pub const UNKNOWN: Interval = Interval { min: 0, max: u64::MAX };

    #[must_use]
    pub fn exact(value: u64) -> Self {
        Interval { min: value, max: value }
    }

    #[must_use]
    pub fn new(min: u64, max: u64) -> Self {
        Interval { min, max }
    }

    #[must_use]
    pub fn add(self, other: Interval) -> Interval {
        Interval {
            min: self.min.saturating_add(other.min),
            max: self.max.saturating_add(other.max),
        }
    }

    #[must_use]
    pub fn multiply(self, other: Interval) -> Interval {
        Interval {
            min: self.min.saturating_mul(other.min),
            max: self.max.saturating_mul(other.max),
        }
    }

    #[must_use]
    pub fn union(self, other: Interval) -> Interval {
        Interval {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Scale both ends by `factor`, rounding up, saturating at `u64::MAX`
    /// (§4.5 `MultiplyByCostFactor`).
    #[must_use]
    pub fn multiply_by_cost_factor(self, factor: f64) -> Interval {
        Interval {
            min: scale(self.min, factor),
            max: scale(self.max, factor),
        }
    }
}

#[expect(
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    reason = "cost factors are small ratios; precision loss at u64 extremes is acceptable for an estimate"
)]
fn scale(value: u64, factor: f64) -> u64 {
    if factor <= 0.0 {
        return 0;
    }
    let scaled = (value as f64) * factor;
    if scaled >= u64::MAX as f64 {
        u64::MAX
    } else {
        scaled.ceil() as u64
    }
}

#[cfg(test)]
mod tests;
