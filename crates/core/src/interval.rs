//! Transaction validity interval.
//!
//! Time never comes from a clock here: the ledger hands every transaction a
//! window `[lower, upper]` within which it is allowed to execute, and the
//! guards reason about deadlines relative to that window only.

use crate::types::PosixTime;
use serde::{Deserialize, Serialize};

/// Where a bound sits on the time line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundKind {
    NegativeInfinity,
    Finite(PosixTime),
    PositiveInfinity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bound {
    pub kind: BoundKind,
    pub inclusive: bool,
}

impl Bound {
    pub const fn finite(t: PosixTime) -> Self {
        Self {
            kind: BoundKind::Finite(t),
            inclusive: true,
        }
    }

    pub const fn exclusive(t: PosixTime) -> Self {
        Self {
            kind: BoundKind::Finite(t),
            inclusive: false,
        }
    }

    pub const fn neg_infinity() -> Self {
        Self {
            kind: BoundKind::NegativeInfinity,
            inclusive: true,
        }
    }

    pub const fn pos_infinity() -> Self {
        Self {
            kind: BoundKind::PositiveInfinity,
            inclusive: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityInterval {
    pub lower: Bound,
    pub upper: Bound,
}

impl Default for ValidityInterval {
    fn default() -> Self {
        Self::always()
    }
}

impl ValidityInterval {
    /// `(-inf, +inf)`.
    pub const fn always() -> Self {
        Self {
            lower: Bound::neg_infinity(),
            upper: Bound::pos_infinity(),
        }
    }

    /// `[lower, upper]`.
    pub const fn between(lower: PosixTime, upper: PosixTime) -> Self {
        Self {
            lower: Bound::finite(lower),
            upper: Bound::finite(upper),
        }
    }

    /// `[lower, +inf)`.
    pub const fn starting_at(lower: PosixTime) -> Self {
        Self {
            lower: Bound::finite(lower),
            upper: Bound::pos_infinity(),
        }
    }

    /// `(-inf, upper]`.
    pub const fn until(upper: PosixTime) -> Self {
        Self {
            lower: Bound::neg_infinity(),
            upper: Bound::finite(upper),
        }
    }

    /// The "current time" guards compare against: the finite lower bound,
    /// or `0` when the window is unbounded below.
    pub fn reference_time(&self) -> PosixTime {
        match self.lower.kind {
            BoundKind::Finite(t) => t,
            BoundKind::NegativeInfinity | BoundKind::PositiveInfinity => 0,
        }
    }

    /// Every instant of the window lies strictly before `point`.
    pub fn is_entirely_before(&self, point: PosixTime) -> bool {
        match self.upper.kind {
            BoundKind::NegativeInfinity => true,
            BoundKind::PositiveInfinity => false,
            BoundKind::Finite(t) if self.upper.inclusive => t < point,
            BoundKind::Finite(t) => t <= point,
        }
    }

    /// Every instant of the window lies strictly after `point`.
    pub fn is_entirely_after(&self, point: PosixTime) -> bool {
        match self.lower.kind {
            BoundKind::PositiveInfinity => true,
            BoundKind::NegativeInfinity => false,
            BoundKind::Finite(t) if self.lower.inclusive => point < t,
            BoundKind::Finite(t) => point <= t,
        }
    }

    pub fn contains(&self, point: PosixTime) -> bool {
        !self.is_entirely_before(point) && !self.is_entirely_after(point)
    }

    /// The window reaches `deadline`: it contains it (boundary included) or
    /// lies wholly after it.
    pub fn has_passed(&self, deadline: PosixTime) -> bool {
        !self.is_entirely_before(deadline)
    }
}
