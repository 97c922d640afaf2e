use std::fmt;

use super::{
    AbstractDomain, HasBottom, HasTop, SpecializeByConditional, TryToValue, ValueDomain,
};
use crate::prelude::*;
use crate::syntax::{BinOpType, RelOpType, UnOpType};

/// The domain of residue classes modulo `N`.
///
/// A value is either bottom, a single residue class `k + N*Z` with
/// `k` in `[0, N)`, or top. Sums, differences and products are computed in
/// `Z/NZ`. The lattice has finite height, so no widening is needed.
///
/// Residue classes are unbounded in both directions, so an order comparison
/// between two non-bottom values can always be satisfied by some pair of
/// representatives; only an equality between distinct residues is refutable.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ModuloDomain<const N: i64> {
    /// The empty set.
    Bottom,
    /// The residue class of the contained value.
    Residue(i64),
    /// All integers.
    Top,
}

use ModuloDomain::{Bottom, Residue, Top};

impl<const N: i64> ModuloDomain<N> {
    fn residues(self, rhs: Self) -> Option<(i64, i64)> {
        match (self, rhs) {
            (Residue(left), Residue(right)) => Some((left, right)),
            _ => None,
        }
    }
}

impl<const N: i64> AbstractDomain for ModuloDomain<N> {
    fn merge(&self, other: &Self) -> Self {
        match (self, other) {
            (left, right) if left == right => *left,
            (Bottom, value) | (value, Bottom) => *value,
            _ => Top,
        }
    }

    fn is_top(&self) -> bool {
        matches!(self, Top)
    }
}

impl<const N: i64> HasTop for ModuloDomain<N> {
    fn top() -> Self {
        Top
    }
}

impl<const N: i64> HasBottom for ModuloDomain<N> {
    fn bottom() -> Self {
        Bottom
    }

    fn is_bottom(&self) -> bool {
        matches!(self, Bottom)
    }
}

impl<const N: i64> TryToValue for ModuloDomain<N> {
    /// A residue class contains infinitely many values, so no element of the
    /// domain pins down a single concrete value.
    fn try_to_value(&self) -> Option<i64> {
        None
    }
}

impl<const N: i64> SpecializeByConditional for ModuloDomain<N> {}

impl<const N: i64> From<i64> for ModuloDomain<N> {
    fn from(value: i64) -> Self {
        if N <= 0 {
            Bottom
        } else {
            Residue(value.rem_euclid(N))
        }
    }
}

impl<const N: i64> Default for ModuloDomain<N> {
    /// The value of unassigned variables, i.e. the abstraction of `0`.
    fn default() -> Self {
        Self::from(0)
    }
}

impl<const N: i64> ValueDomain for ModuloDomain<N> {
    fn bin_op(&self, op: BinOpType, rhs: &Self) -> Self {
        use BinOpType::*;
        match op {
            Add | Sub | Mul => {
                if self.is_bottom() || rhs.is_bottom() {
                    return Bottom;
                }
                if op == Mul && (*self == Residue(0) || *rhs == Residue(0)) {
                    return Residue(0);
                }
                match self.residues(*rhs) {
                    None => Top,
                    Some((left, right)) => {
                        let result = match op {
                            Add => left as i128 + right as i128,
                            Sub => left as i128 - right as i128,
                            _ => left as i128 * right as i128,
                        };
                        Residue(result.rem_euclid(N as i128) as i64)
                    }
                }
            }
            Div => match (self, rhs) {
                (Bottom, _) | (_, Bottom) => Bottom,
                // The magnitude of the divisor is unknown, so nothing is
                // known about the quotient.
                _ => Top,
            },
            Rem => match (self, rhs) {
                (Bottom, _) | (_, Bottom) => Bottom,
                // A divisor that is a multiple of N preserves the residue
                // class of the dividend.
                (value, Residue(0)) => *value,
                _ => Top,
            },
            Pow => match (self, rhs) {
                (Bottom, _) | (_, Bottom) => Bottom,
                // 1^e = 1 for every exponent.
                (Residue(1), _) => Residue(1),
                // Powers are not periodic with period N, so the residue of
                // the exponent reveals nothing.
                _ => Top,
            },
        }
    }

    fn un_op(&self, op: UnOpType) -> Self {
        match (op, self) {
            (UnOpType::Identity, _) => *self,
            (UnOpType::Negate, Residue(value)) => Residue((-value).rem_euclid(N)),
            (UnOpType::Negate, other) => *other,
        }
    }

    fn may_hold(&self, op: RelOpType, rhs: &Self) -> bool {
        if self.is_bottom() || rhs.is_bottom() {
            return false;
        }
        match op {
            RelOpType::Equal => match self.residues(*rhs) {
                Some((left, right)) => left == right,
                None => true,
            },
            _ => true,
        }
    }
}

impl<const N: i64> fmt::Display for ModuloDomain<N> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bottom => write!(formatter, "bot"),
            Residue(value) => write!(formatter, "{value}"),
            Top => write!(formatter, "top"),
        }
    }
}
