use std::fmt;

use super::{
    AbstractDomain, HasBottom, HasTop, SpecializeByConditional, TryToValue, ValueDomain,
};
use crate::prelude::*;
use crate::syntax::{BinOpType, RelOpType, UnOpType};

/// The sign domain: every value is abstracted to its sign.
///
/// The lattice has five elements. `Bottom` is the empty set, `Minus` the
/// negative integers, `Zero` the singleton `{0}`, `Plus` the positive
/// integers and `Top` all integers. The lattice has finite height, so no
/// widening is needed.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum SignDomain {
    /// The empty set.
    Bottom,
    /// All negative integers.
    Minus,
    /// The value zero.
    Zero,
    /// All positive integers.
    Plus,
    /// All integers.
    Top,
}

use SignDomain::*;

impl SignDomain {
    /// The sign of the opposite value.
    fn negated(self) -> SignDomain {
        match self {
            Minus => Plus,
            Plus => Minus,
            other => other,
        }
    }

    fn add(self, rhs: SignDomain) -> SignDomain {
        match (self, rhs) {
            (Bottom, _) | (_, Bottom) => Bottom,
            (Zero, sign) | (sign, Zero) => sign,
            (Minus, Minus) => Minus,
            (Plus, Plus) => Plus,
            _ => Top,
        }
    }

    fn mul(self, rhs: SignDomain) -> SignDomain {
        match (self, rhs) {
            (Bottom, _) | (_, Bottom) => Bottom,
            (Zero, _) | (_, Zero) => Zero,
            (Minus, Minus) | (Plus, Plus) => Plus,
            (Minus, Plus) | (Plus, Minus) => Minus,
            _ => Top,
        }
    }

    /// Truncating division. A quotient of nonzero operands can still be zero
    /// (e.g. `-1 / -2 == 0`), so the sign of the result is almost never known.
    fn div(self, rhs: SignDomain) -> SignDomain {
        match (self, rhs) {
            (Bottom, _) | (_, Bottom) => Bottom,
            // Division by zero has no result.
            (_, Zero) => Bottom,
            (Zero, _) => Zero,
            _ => Top,
        }
    }

    /// Remainder of the truncating division. The sign of a nonzero remainder
    /// follows the dividend, but the remainder may always be zero.
    fn rem(self, rhs: SignDomain) -> SignDomain {
        match (self, rhs) {
            (Bottom, _) | (_, Bottom) => Bottom,
            (_, Zero) => Bottom,
            (Zero, _) => Zero,
            _ => Top,
        }
    }

    /// Exponentiation. Exponents less than one yield `1`.
    fn pow(self, rhs: SignDomain) -> SignDomain {
        match (self, rhs) {
            (Bottom, _) | (_, Bottom) => Bottom,
            // x^e = 1 for e <= 0.
            (_, Minus) | (_, Zero) => Plus,
            (Minus, _) => Top,
            (Zero, Plus) => Zero,
            // 0^e is 0 for positive and 1 for non-positive exponents.
            (Zero, Top) => Top,
            (Plus, _) => Plus,
            (Top, _) => Top,
        }
    }
}

impl AbstractDomain for SignDomain {
    fn merge(&self, other: &Self) -> Self {
        match (self, other) {
            (left, right) if left == right => *left,
            (Bottom, sign) | (sign, Bottom) => *sign,
            _ => Top,
        }
    }

    fn is_top(&self) -> bool {
        matches!(self, Top)
    }
}

impl HasTop for SignDomain {
    fn top() -> Self {
        Top
    }
}

impl HasBottom for SignDomain {
    fn bottom() -> Self {
        Bottom
    }

    fn is_bottom(&self) -> bool {
        matches!(self, Bottom)
    }
}

impl TryToValue for SignDomain {
    fn try_to_value(&self) -> Option<i64> {
        match self {
            Zero => Some(0),
            _ => None,
        }
    }
}

impl SpecializeByConditional for SignDomain {
    fn add_less_equal_bound(self, bound: i64) -> Option<Self> {
        if self == Bottom {
            return None;
        }
        if bound < 0 {
            // Only negative values remain.
            match self {
                Minus | Top => Some(Minus),
                _ => None,
            }
        } else if bound == 0 {
            match self {
                Plus => None,
                sign => Some(sign),
            }
        } else {
            Some(self)
        }
    }

    fn add_greater_equal_bound(self, bound: i64) -> Option<Self> {
        if self == Bottom {
            return None;
        }
        if bound > 0 {
            match self {
                Plus | Top => Some(Plus),
                _ => None,
            }
        } else if bound == 0 {
            match self {
                Minus => None,
                sign => Some(sign),
            }
        } else {
            Some(self)
        }
    }

    fn add_not_equal_bound(self, bound: i64) -> Option<Self> {
        match (self, bound) {
            (Bottom, _) => None,
            (Zero, 0) => None,
            _ => Some(self),
        }
    }
}

impl From<i64> for SignDomain {
    fn from(value: i64) -> Self {
        match value {
            0 => Zero,
            negative if negative < 0 => Minus,
            _ => Plus,
        }
    }
}

impl Default for SignDomain {
    /// The value of unassigned variables, i.e. the abstraction of `0`.
    fn default() -> Self {
        Zero
    }
}

impl ValueDomain for SignDomain {
    fn bin_op(&self, op: BinOpType, rhs: &Self) -> Self {
        use BinOpType::*;
        match op {
            Add => self.add(*rhs),
            Sub => self.add(rhs.negated()),
            Mul => self.mul(*rhs),
            Div => self.div(*rhs),
            Rem => self.rem(*rhs),
            Pow => self.pow(*rhs),
        }
    }

    fn un_op(&self, op: UnOpType) -> Self {
        match op {
            UnOpType::Identity => *self,
            UnOpType::Negate => self.negated(),
        }
    }

    fn may_hold(&self, op: RelOpType, rhs: &Self) -> bool {
        use RelOpType::*;
        if self.is_bottom() || rhs.is_bottom() {
            return false;
        }
        match op {
            Less => match (self, rhs) {
                (Minus, _) | (Top, _) | (_, Top) => true,
                (Zero, Plus) | (Plus, Plus) => true,
                _ => false,
            },
            LessOrEqual => match (self, rhs) {
                (Minus, _) | (Top, _) | (_, Top) => true,
                (Zero, Zero) | (Zero, Plus) | (Plus, Plus) => true,
                _ => false,
            },
            // The comparison may hold iff the concretizations intersect.
            Equal => match (self, rhs) {
                (Top, _) | (_, Top) => true,
                (left, right) => left == right,
            },
            GreaterOrEqual => rhs.may_hold(LessOrEqual, self),
            Greater => rhs.may_hold(Less, self),
            NotEqual => !matches!((self, rhs), (Zero, Zero)),
        }
    }
}

impl fmt::Display for SignDomain {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bottom => write!(formatter, "bot"),
            Minus => write!(formatter, "-"),
            Zero => write!(formatter, "0"),
            Plus => write!(formatter, "+"),
            Top => write!(formatter, "top"),
        }
    }
}
