//! Bounds on the number of bits a codec can emit.
//!
//! A [`SizeBound`] is a lower bound and an optional upper bound, both in
//! bits.  Bounds compose the way codecs do: `+` for sequential fields,
//! `|` for alternatives, `* k` for repetition.  Bounds are hints used for
//! validation and buffer pre-sizing; encoders always measure actual sizes.

use std::ops::{Add, BitOr, Mul};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeBound {
    /// Minimum encoded size in bits.
    pub lower: u64,
    /// Maximum encoded size in bits, if known.
    pub upper: Option<u64>,
}

impl SizeBound {
    /// A codec that always emits exactly `n` bits.
    pub const fn exact(n: u64) -> Self {
        Self { lower: n, upper: Some(n) }
    }

    /// At least `n` bits, no upper bound.
    pub const fn at_least(n: u64) -> Self {
        Self { lower: n, upper: None }
    }

    /// Between `lower` and `upper` bits inclusive.
    pub const fn bounded(lower: u64, upper: u64) -> Self {
        Self { lower, upper: Some(upper) }
    }

    /// Nothing known: zero or more bits.
    pub const fn unknown() -> Self {
        Self { lower: 0, upper: None }
    }

    /// Bound for a value encoded by one of two alternatives.
    pub fn choice(self, other: Self) -> Self {
        let upper = match (self.upper, other.upper) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        };
        Self { lower: self.lower.min(other.lower), upper }
    }
}

/// Sequential composition: both fields are emitted.
impl Add for SizeBound {
    type Output = SizeBound;

    fn add(self, rhs: SizeBound) -> SizeBound {
        let upper = match (self.upper, rhs.upper) {
            (Some(a), Some(b)) => Some(a.saturating_add(b)),
            _ => None,
        };
        SizeBound { lower: self.lower.saturating_add(rhs.lower), upper }
    }
}

/// Alias for [`SizeBound::choice`].
impl BitOr for SizeBound {
    type Output = SizeBound;

    fn bitor(self, rhs: SizeBound) -> SizeBound {
        self.choice(rhs)
    }
}

/// Repetition: the field is emitted `rhs` times.
impl Mul<u64> for SizeBound {
    type Output = SizeBound;

    fn mul(self, rhs: u64) -> SizeBound {
        SizeBound {
            lower: self.lower.saturating_mul(rhs),
            upper: self.upper.map(|u| u.saturating_mul(rhs)),
        }
    }
}
