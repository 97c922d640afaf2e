use std::fmt;

use super::{
    AbstractDomain, HasBottom, HasTop, SpecializeByConditional, TryToValue, ValueDomain,
};
use crate::prelude::*;
use crate::syntax::{BinOpType, RelOpType, UnOpType};

/// The one-point lattice: every value is swallowed and the only possible
/// answer is "anything".
///
/// The domain is provided as a baseline. Every operation returns the single
/// element and every comparison may hold.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
pub struct BlackHoleDomain;

impl AbstractDomain for BlackHoleDomain {
    fn merge(&self, _other: &Self) -> Self {
        BlackHoleDomain
    }

    fn is_top(&self) -> bool {
        true
    }
}

impl HasTop for BlackHoleDomain {
    fn top() -> Self {
        BlackHoleDomain
    }
}

impl HasBottom for BlackHoleDomain {
    fn bottom() -> Self {
        BlackHoleDomain
    }

    /// The single element doubles as the bottom of the one-point lattice.
    fn is_bottom(&self) -> bool {
        true
    }
}

impl TryToValue for BlackHoleDomain {
    fn try_to_value(&self) -> Option<i64> {
        None
    }
}

impl SpecializeByConditional for BlackHoleDomain {}

impl From<i64> for BlackHoleDomain {
    fn from(_value: i64) -> Self {
        BlackHoleDomain
    }
}

impl ValueDomain for BlackHoleDomain {
    fn bin_op(&self, _op: BinOpType, _rhs: &Self) -> Self {
        BlackHoleDomain
    }

    fn un_op(&self, _op: UnOpType) -> Self {
        BlackHoleDomain
    }

    fn may_hold(&self, _op: RelOpType, _rhs: &Self) -> bool {
        true
    }
}

impl fmt::Display for BlackHoleDomain {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "top")
    }
}
