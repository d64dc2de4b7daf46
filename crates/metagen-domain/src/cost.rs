//! Exact accounting of model spend

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// A non-negative monetary amount, stored as whole nano-units (1e-9).
///
/// Providers report costs as floats. Converting each one to an integer count
/// once, at the boundary, keeps every later summation exact: three calls
/// costing `0.01`, `0.02` and nothing add up to exactly `0.03`.
///
/// # Examples
///
/// ```
/// use metagen_domain::Cost;
///
/// let total: Cost = [Some(0.01), Some(0.02), None]
///     .into_iter()
///     .map(Cost::from_reported)
///     .sum();
/// assert_eq!(total, Cost::from_f64(0.03));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cost(u64);

impl Cost {
    /// Nano-units per whole currency unit
    pub const NANOS_PER_UNIT: u64 = 1_000_000_000;

    /// Zero cost
    pub const ZERO: Cost = Cost(0);

    /// Create from a raw nano-unit count
    pub const fn from_nanos(nanos: u64) -> Self {
        Cost(nanos)
    }

    /// Raw nano-unit count
    pub const fn nanos(self) -> u64 {
        self.0
    }

    /// Convert a reported float, rounding to the nearest nano-unit.
    ///
    /// Negative, NaN and infinite values are treated as zero.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() || value <= 0.0 {
            return Cost::ZERO;
        }
        let nanos = (value * Self::NANOS_PER_UNIT as f64).round();
        if nanos >= u64::MAX as f64 {
            Cost(u64::MAX)
        } else {
            Cost(nanos as u64)
        }
    }

    /// Normalize an optional reported cost; absent means zero
    pub fn from_reported(value: Option<f64>) -> Self {
        value.map(Self::from_f64).unwrap_or_default()
    }

    /// Float view of the amount
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / Self::NANOS_PER_UNIT as f64
    }

    /// Whether nothing was spent
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Add without overflowing
    pub fn saturating_add(self, other: Cost) -> Cost {
        Cost(self.0.saturating_add(other.0))
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, other: Cost) -> Cost {
        self.saturating_add(other)
    }
}

impl AddAssign for Cost {
    fn add_assign(&mut self, other: Cost) {
        *self = self.saturating_add(other);
    }
}

impl Sum for Cost {
    fn sum<I: Iterator<Item = Cost>>(iter: I) -> Cost {
        iter.fold(Cost::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Cost> for Cost {
    fn sum<I: Iterator<Item = &'a Cost>>(iter: I) -> Cost {
        iter.copied().sum()
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / Self::NANOS_PER_UNIT;
        let frac = format!("{:09}", self.0 % Self::NANOS_PER_UNIT);
        let trimmed = frac.trim_end_matches('0');
        if trimmed.len() < 2 {
            write!(f, "{}.{:0<2}", whole, trimmed)
        } else {
            write!(f, "{}.{}", whole, trimmed)
        }
    }
}

impl Serialize for Cost {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Cost {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<f64>::deserialize(deserializer)?;
        Ok(Cost::from_reported(value))
    }
}
