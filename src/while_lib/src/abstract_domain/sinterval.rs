use std::fmt;

use super::{
    AbstractDomain, HasBottom, HasTop, SpecializeByConditional, TryToValue, ValueDomain,
};
use crate::prelude::*;
use crate::syntax::{BinOpType, RelOpType, UnOpType};

/// An offset at or beyond the sentinel is read as infinite.
const OFFSET_SENTINEL: i64 = i32::MAX as i64;

/// Centers are kept within the sentinel range; values reaching outside
/// collapse to top.
const CENTER_SENTINEL: i64 = i32::MAX as i64;

/// An abstract domain representing values by a centred interval
/// `center ± offset`.
///
/// The representation is symmetric around its center, so joining two values
/// recenters the covered range and may over-approximate by one element. The
/// lattice has infinite height; widening blows the offset up to the sentinel
/// (i.e. to top) as soon as it grows.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum SymmetricIntervalDomain {
    /// The empty set.
    Bottom,
    /// All values `v` with `center - offset <= v <= center + offset`.
    Value {
        /// The midpoint of the covered range.
        center: i64,
        /// The radius of the covered range. Always non-negative; the
        /// sentinel value means "unbounded".
        offset: i64,
    },
}

use SymmetricIntervalDomain::{Bottom, Value};

impl SymmetricIntervalDomain {
    /// Create a new value covering `center ± offset`.
    pub fn new(center: i64, offset: i64) -> SymmetricIntervalDomain {
        assert!(offset >= 0);
        if offset >= OFFSET_SENTINEL || center.abs() >= CENTER_SENTINEL {
            Self::top()
        } else {
            Value { center, offset }
        }
    }

    /// Build a value covering the range `low..=high` of an intermediate
    /// computation, recentring and collapsing to top when the range leaves
    /// the sentinel space.
    fn from_effective_bounds(low: i128, high: i128) -> SymmetricIntervalDomain {
        debug_assert!(low <= high);
        if low <= -(CENTER_SENTINEL as i128) || high >= CENTER_SENTINEL as i128 {
            return Self::top();
        }
        let center = low + (high - low) / 2;
        let offset = (high - center).max(center - low);
        Value {
            center: center as i64,
            offset: offset as i64,
        }
    }

    /// The covered range, with infinities substituted for unbounded sides.
    fn effective_bounds(&self) -> Option<(i128, i128)> {
        match self {
            Bottom => None,
            Value { center, offset } => {
                if *offset >= OFFSET_SENTINEL {
                    Some((-(1 << 62), 1 << 62))
                } else {
                    Some((
                        *center as i128 - *offset as i128,
                        *center as i128 + *offset as i128,
                    ))
                }
            }
        }
    }

    fn bin_op_via_bounds<F>(&self, rhs: &Self, op: F) -> SymmetricIntervalDomain
    where
        F: FnOnce((i128, i128), (i128, i128)) -> Option<(i128, i128)>,
    {
        match (self.effective_bounds(), rhs.effective_bounds()) {
            (Some(left), Some(right)) => match op(left, right) {
                Some((low, high)) => Self::from_effective_bounds(low, high),
                None => Bottom,
            },
            _ => Bottom,
        }
    }
}

impl AbstractDomain for SymmetricIntervalDomain {
    /// Merge as value sets; the result covers both inputs and is recentred.
    fn merge(&self, other: &Self) -> Self {
        match (self, other) {
            (Bottom, value) | (value, Bottom) => *value,
            _ => {
                let (low, high) = self.effective_bounds().unwrap();
                let (other_low, other_high) = other.effective_bounds().unwrap();
                Self::from_effective_bounds(low.min(other_low), high.max(other_high))
            }
        }
    }

    fn is_top(&self) -> bool {
        matches!(self, Value { offset, .. } if *offset >= OFFSET_SENTINEL)
    }
}

impl HasTop for SymmetricIntervalDomain {
    fn top() -> Self {
        Value {
            center: 0,
            offset: OFFSET_SENTINEL,
        }
    }
}

impl HasBottom for SymmetricIntervalDomain {
    fn bottom() -> Self {
        Bottom
    }

    fn is_bottom(&self) -> bool {
        matches!(self, Bottom)
    }
}

impl TryToValue for SymmetricIntervalDomain {
    fn try_to_value(&self) -> Option<i64> {
        match self {
            Value { center, offset } if *offset == 0 => Some(*center),
            _ => None,
        }
    }
}

impl SpecializeByConditional for SymmetricIntervalDomain {}

impl From<i64> for SymmetricIntervalDomain {
    fn from(value: i64) -> Self {
        if value.abs() >= CENTER_SENTINEL {
            Self::top()
        } else {
            Value {
                center: value,
                offset: 0,
            }
        }
    }
}

impl Default for SymmetricIntervalDomain {
    /// The value of unassigned variables, i.e. the abstraction of `0`.
    fn default() -> Self {
        Self::from(0)
    }
}

impl ValueDomain for SymmetricIntervalDomain {
    /// Blow the offset up to the sentinel as soon as it grows.
    fn widen(&self, other: &Self) -> Self {
        match (self, other) {
            (Bottom, _) => *other,
            (_, Bottom) => *self,
            (
                Value {
                    offset: previous_offset,
                    ..
                },
                _,
            ) => {
                let merged = self.merge(other);
                match merged {
                    Value { offset, .. } if offset > *previous_offset => Self::top(),
                    _ => merged,
                }
            }
        }
    }

    fn bin_op(&self, op: BinOpType, rhs: &Self) -> Self {
        use BinOpType::*;
        match op {
            Add => self.bin_op_via_bounds(rhs, |(low, high), (rhs_low, rhs_high)| {
                Some((low + rhs_low, high + rhs_high))
            }),
            Sub => self.bin_op_via_bounds(rhs, |(low, high), (rhs_low, rhs_high)| {
                Some((low - rhs_high, high - rhs_low))
            }),
            Mul => self.bin_op_via_bounds(rhs, |(low, high), (rhs_low, rhs_high)| {
                let corners = [
                    low * rhs_low,
                    low * rhs_high,
                    high * rhs_low,
                    high * rhs_high,
                ];
                Some((
                    *corners.iter().min().unwrap(),
                    *corners.iter().max().unwrap(),
                ))
            }),
            Div => self.bin_op_via_bounds(rhs, |(low, high), (rhs_low, rhs_high)| {
                if rhs_low == 0 && rhs_high == 0 {
                    // Division by zero has no result.
                    None
                } else if rhs_low <= 0 && rhs_high >= 0 {
                    Some((-(1 << 62), 1 << 62))
                } else {
                    let corners = [
                        low / rhs_low,
                        low / rhs_high,
                        high / rhs_low,
                        high / rhs_high,
                    ];
                    Some((
                        *corners.iter().min().unwrap(),
                        *corners.iter().max().unwrap(),
                    ))
                }
            }),
            Rem => self.bin_op_via_bounds(rhs, |(low, high), (rhs_low, rhs_high)| {
                if rhs_low == 0 && rhs_high == 0 {
                    None
                } else if rhs_low <= 0 && rhs_high >= 0 {
                    Some((-(1 << 62), 1 << 62))
                } else {
                    let divisor_magnitude = rhs_low.abs().max(rhs_high.abs());
                    let dividend_magnitude = low.abs().max(high.abs());
                    let bound = (divisor_magnitude - 1).min(dividend_magnitude);
                    Some((-bound, bound))
                }
            }),
            Pow => match (self, rhs) {
                (Bottom, _) | (_, Bottom) => Bottom,
                _ => Self::top(),
            },
        }
    }

    fn un_op(&self, op: UnOpType) -> Self {
        match (op, self) {
            (UnOpType::Identity, _) | (UnOpType::Negate, Bottom) => *self,
            (UnOpType::Negate, Value { center, offset }) => Value {
                center: center.wrapping_neg(),
                offset: *offset,
            },
        }
    }

    fn may_hold(&self, op: RelOpType, rhs: &Self) -> bool {
        use RelOpType::*;
        let (Some((low, high)), Some((rhs_low, rhs_high))) =
            (self.effective_bounds(), rhs.effective_bounds())
        else {
            return false;
        };
        match op {
            Less => low < rhs_high,
            LessOrEqual => low <= rhs_high,
            Equal => low <= rhs_high && high >= rhs_low,
            GreaterOrEqual => high >= rhs_low,
            Greater => high > rhs_low,
            NotEqual => {
                !(self.try_to_value().is_some() && self.try_to_value() == rhs.try_to_value())
            }
        }
    }
}

impl fmt::Display for SymmetricIntervalDomain {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bottom => write!(formatter, "bot"),
            Value { center, offset } => {
                if *offset >= OFFSET_SENTINEL {
                    write!(formatter, "{center} ±inf")
                } else {
                    write!(formatter, "{center} ±{offset}")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(center: i64, offset: i64) -> SymmetricIntervalDomain {
        SymmetricIntervalDomain::new(center, offset)
    }

    #[test]
    fn abstraction() {
        assert_eq!(SymmetricIntervalDomain::from(5), value(5, 0));
        assert_eq!(
            SymmetricIntervalDomain::from_values(&[2, 4, 6]),
            value(4, 2)
        );
        assert_eq!(SymmetricIntervalDomain::from_values(&[]), Bottom);
    }

    #[test]
    fn merge_covers_both_operands() {
        let left = value(-3, 1);
        let right = value(4, 2);
        let merged = left.merge(&right);
        for operand in [left, right] {
            let (low, high) = operand.effective_bounds().unwrap();
            let (merged_low, merged_high) = merged.effective_bounds().unwrap();
            assert!(merged_low <= low && merged_high >= high);
        }
        assert_eq!(Bottom.merge(&left), left);
    }

    #[test]
    fn arithmetic() {
        use BinOpType::*;
        assert_eq!(value(5, 1).bin_op(Add, &value(-2, 2)), value(3, 3));
        assert_eq!(value(5, 1).bin_op(Sub, &value(2, 1)), value(3, 2));
        // 4..=6 times 1..=3 is 4..=18, recentred.
        let product = value(5, 1).bin_op(Mul, &value(2, 1));
        let (low, high) = product.effective_bounds().unwrap();
        assert!(low <= 4 && high >= 18);
        assert_eq!(value(5, 1).un_op(UnOpType::Negate), value(-5, 1));
        assert_eq!(Bottom.bin_op(Add, &value(1, 1)), Bottom);
    }

    #[test]
    fn division_by_zero() {
        use BinOpType::{Div, Rem};
        assert_eq!(value(10, 2).bin_op(Div, &value(0, 0)), Bottom);
        assert!(value(10, 2).bin_op(Div, &value(0, 1)).is_top());
        assert_eq!(value(10, 2).bin_op(Rem, &value(0, 0)), Bottom);
        // 8..=12 divided by 2 is 4..=6.
        assert_eq!(value(10, 2).bin_op(Div, &value(2, 0)), value(5, 1));
    }

    #[test]
    fn widening_blows_the_offset_up() {
        let previous = value(0, 1);
        let grown = value(1, 2);
        assert!(previous.widen(&grown).is_top());
        assert_eq!(previous.widen(&previous.clone()), previous);
        assert_eq!(Bottom.widen(&grown), grown);
    }

    #[test]
    fn comparisons() {
        use RelOpType::*;
        assert!(value(0, 2).may_hold(Less, &value(5, 1)));
        assert!(!value(5, 1).may_hold(Less, &value(0, 2)));
        assert!(value(0, 2).may_hold(Equal, &value(3, 1)));
        assert!(!value(0, 2).may_hold(Equal, &value(5, 1)));
        assert!(!value(3, 0).may_hold(NotEqual, &value(3, 0)));
        assert!(value(3, 1).may_hold(NotEqual, &value(3, 1)));
        assert!(!Bottom.may_hold(Equal, &value(0, 1)));
    }

    #[test]
    fn display() {
        assert_eq!(value(5, 3).to_string(), "5 ±3");
        assert_eq!(SymmetricIntervalDomain::top().to_string(), "0 ±inf");
        assert_eq!(Bottom.to_string(), "bot");
    }
}
