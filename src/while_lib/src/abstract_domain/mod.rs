//! This module defines traits describing general properties of abstract domains
//! as well as the domain types implementing these traits.
//!
//! An abstract domain is a lattice of sets of integers. Interpreting a program
//! under an abstract domain computes, for every variable, a value whose
//! concretization contains all values the variable may hold in any concrete
//! run. Every operation of a domain must be a sound over-approximation of the
//! corresponding concrete operation.

use std::fmt::Display;

use crate::syntax::{BinOpType, RelOpType, UnOpType};

mod black_hole;
pub use black_hole::*;

mod sign;
pub use sign::*;

mod interval;
pub use interval::*;

mod sinterval;
pub use sinterval::*;

mod modulo;
pub use modulo::*;

mod state;
pub use state::*;

/// The main trait describing an abstract domain.
///
/// Each abstract domain is partially ordered and elements of the same domain
/// can be merged.
pub trait AbstractDomain: Sized + Eq + Clone {
    /// Return the least upper bound (with respect to the partial order on the
    /// domain) of the two inputs `self` and `other`.
    fn merge(&self, other: &Self) -> Self;

    /// Returns whether the element represents the top element
    /// (i.e. maximal with respect to the partial order) or not.
    fn is_top(&self) -> bool;
}

/// An abstract domain implementing this trait has a global maximum, i.e. a *Top* element.
pub trait HasTop {
    /// Return an instance of the *Top* element, representing all integers.
    fn top() -> Self;
}

/// An abstract domain implementing this trait has a global minimum, i.e. a *Bottom* element.
pub trait HasBottom {
    /// Return an instance of the *Bottom* element, representing the empty set.
    fn bottom() -> Self;

    /// Returns whether the element represents the bottom element or not.
    fn is_bottom(&self) -> bool;
}

/// A conversion trait for abstract domains whose elements may represent
/// exactly one concrete value.
pub trait TryToValue {
    /// If `self` represents a single concrete value, return it.
    fn try_to_value(&self) -> Option<i64>;
}

/// A trait for abstract domains that can learn from comparisons used as
/// branch or loop conditions.
///
/// Each method intersects `self` with the set of values satisfying the
/// corresponding comparison against a known concrete `bound` and returns
/// `None` if the intersection is empty. The default implementations learn
/// nothing, which is always sound.
pub trait SpecializeByConditional: Sized {
    /// Restrict `self` to values less than or equal to `bound`.
    fn add_less_equal_bound(self, _bound: i64) -> Option<Self> {
        Some(self)
    }

    /// Restrict `self` to values greater than or equal to `bound`.
    fn add_greater_equal_bound(self, _bound: i64) -> Option<Self> {
        Some(self)
    }

    /// Restrict `self` to values different from `bound`.
    fn add_not_equal_bound(self, _bound: i64) -> Option<Self> {
        Some(self)
    }
}

/// A trait for abstract domains that can represent the values of program
/// variables.
///
/// The domain implements all operations the interpretation engine composes:
/// the abstraction function (via `From<i64>` and [`ValueDomain::from_values`]),
/// arithmetic, comparisons and the widening used to force loop analyses to
/// converge. The `Default` element is the abstraction of `0`; it is the value
/// read for variables that have not been assigned yet.
pub trait ValueDomain:
    AbstractDomain
    + HasTop
    + HasBottom
    + TryToValue
    + SpecializeByConditional
    + Default
    + From<i64>
    + Display
{
    /// Abstraction of a finite set of concrete values,
    /// i.e. the least upper bound of the abstractions of the elements.
    fn from_values(values: &[i64]) -> Self {
        values
            .iter()
            .fold(Self::bottom(), |acc, &value| acc.merge(&Self::from(value)))
    }

    /// The widening operator. `self` is the value from the previous fixpoint
    /// iteration, `other` the value of the current one.
    ///
    /// The result must be an upper bound of both inputs, and every ascending
    /// chain of widenings must stabilize after finitely many steps. Domains of
    /// finite height can keep this default, for which the plain least upper
    /// bound already qualifies.
    fn widen(&self, other: &Self) -> Self {
        self.merge(other)
    }

    /// Compute the abstract result of a binary arithmetic operation.
    fn bin_op(&self, op: BinOpType, rhs: &Self) -> Self;

    /// Compute the abstract result of a unary arithmetic operation.
    fn un_op(&self, op: UnOpType) -> Self;

    /// Decide whether a comparison may hold between concrete values taken
    /// from the concretizations of `self` and `rhs`.
    ///
    /// A result of `false` means the comparison definitely does not hold for
    /// any such pair of values; `true` means it may hold.
    fn may_hold(&self, op: RelOpType, rhs: &Self) -> bool;
}
