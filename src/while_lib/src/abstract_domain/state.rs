use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::ops::DerefMut;
use std::sync::Arc;

use itertools::Itertools as _;

use super::{AbstractDomain, HasBottom, ValueDomain};
use crate::prelude::*;

/// An abstract state maps variable names to abstract values.
///
/// Variables not present in the map are read as the domain's default element,
/// i.e. the abstraction of `0`. The map itself is wrapped into an `Arc` to
/// enable cheap cloning at the join points of branches and loops; mutation
/// goes through copy-on-write.
///
/// A state may additionally be flagged as *bottom*, meaning that the program
/// point it belongs to is unreachable. Filtering a state through a condition
/// that definitely does not hold produces a bottom state; transfer functions
/// map bottom states to bottom states, and joins ignore them.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct AbstractState<T: ValueDomain> {
    bindings: Arc<BTreeMap<String, T>>,
    bottom: bool,
}

impl<T: ValueDomain> AbstractState<T> {
    /// Create an empty state. No variable is bound,
    /// so every variable reads as the domain's default element.
    pub fn new() -> Self {
        AbstractState {
            bindings: Arc::new(BTreeMap::new()),
            bottom: false,
        }
    }

    /// Returns the abstract value of `var`,
    /// or the domain's default element if `var` is unbound.
    pub fn load(&self, var: &str) -> T {
        self.bindings.get(var).cloned().unwrap_or_default()
    }

    /// Bind `var` to `value`, inserting or overwriting.
    pub fn store(&mut self, var: impl Into<String>, value: T) {
        Arc::make_mut(&mut self.bindings).insert(var.into(), value);
    }

    /// Returns whether the state represents an unreachable program point.
    pub fn is_bottom(&self) -> bool {
        self.bottom
    }

    /// Return the unreachable state with the same variables as `self`.
    ///
    /// Every binding is mapped to the domain's bottom element so that joins
    /// with reachable states are unaffected pointwise.
    pub fn to_bottom(&self) -> Self {
        AbstractState {
            bindings: Arc::new(
                self.bindings
                    .keys()
                    .map(|var| (var.clone(), T::bottom()))
                    .collect(),
            ),
            bottom: true,
        }
    }

    /// Pointwise least upper bound of two states.
    ///
    /// The join runs over the union of both key sets. A variable bound in
    /// only one operand reads as the domain's default element in the other,
    /// so e.g. a variable first assigned in one branch of an `if` is joined
    /// against the implicit zero it still holds on the other branch.
    pub fn merge(&self, other: &Self) -> Self {
        if self.bottom || self == other {
            return other.clone();
        }
        if other.bottom {
            return self.clone();
        }
        let mut merged = BTreeMap::new();
        for var in self.bindings.keys().chain(other.bindings.keys()) {
            if !merged.contains_key(var) {
                merged.insert(var.clone(), self.load(var).merge(&other.load(var)));
            }
        }
        AbstractState {
            bindings: Arc::new(merged),
            bottom: false,
        }
    }

    /// Pointwise widening. `self` is the state of the previous fixpoint
    /// iteration, `current` the state of the current one.
    ///
    /// Widening runs over the union of both key sets, with missing entries
    /// read as the domain's default element, so a variable first assigned
    /// inside a loop body cannot escape widening.
    pub fn widen(&self, current: &Self) -> Self {
        if self.bottom {
            return current.clone();
        }
        if current.bottom {
            return current.clone();
        }
        let mut widened = BTreeMap::new();
        for var in self.bindings.keys().chain(current.bindings.keys()) {
            if !widened.contains_key(var) {
                widened.insert(var.clone(), self.load(var).widen(&current.load(var)));
            }
        }
        AbstractState {
            bindings: Arc::new(widened),
            bottom: false,
        }
    }

    /// Pointwise partial order: `self` is below `other` iff every variable's
    /// value in `self` is below its value in `other`.
    pub fn le(&self, other: &Self) -> bool {
        if self.bottom {
            return true;
        }
        if other.bottom {
            return false;
        }
        self.bindings
            .keys()
            .chain(other.bindings.keys())
            .all(|var| {
                let left = self.load(var);
                let right = other.load(var);
                left.merge(&right) == right
            })
    }
}

impl<T: ValueDomain> Default for AbstractState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ValueDomain> Deref for AbstractState<T> {
    type Target = BTreeMap<String, T>;

    fn deref(&self) -> &Self::Target {
        &self.bindings
    }
}

impl<T: ValueDomain> DerefMut for AbstractState<T> {
    fn deref_mut(&mut self) -> &mut BTreeMap<String, T> {
        Arc::make_mut(&mut self.bindings)
    }
}

impl<T: ValueDomain> FromIterator<(String, T)> for AbstractState<T> {
    /// Generate a new state from an iterator over the bindings it should contain.
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (String, T)>,
    {
        AbstractState {
            bindings: Arc::new(iter.into_iter().collect()),
            bottom: false,
        }
    }
}

impl<T: ValueDomain> fmt::Display for AbstractState<T> {
    /// Render the state as `[x -> value, y -> value]`.
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "[{}]",
            self.bindings
                .iter()
                .map(|(var, value)| format!("{var} -> {value}"))
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstract_domain::{IntervalDomain, SignDomain};

    fn state(bindings: &[(&str, SignDomain)]) -> AbstractState<SignDomain> {
        bindings
            .iter()
            .map(|(var, value)| (var.to_string(), *value))
            .collect()
    }

    #[test]
    fn unbound_variables_read_as_default() {
        let state: AbstractState<SignDomain> = AbstractState::new();
        assert_eq!(state.load("x"), SignDomain::Zero);
    }

    #[test]
    fn store_overwrites() {
        let mut s = state(&[("x", SignDomain::Plus)]);
        s.store("x", SignDomain::Minus);
        s.store("y", SignDomain::Zero);
        assert_eq!(s.load("x"), SignDomain::Minus);
        assert_eq!(s.load("y"), SignDomain::Zero);
    }

    #[test]
    fn merge_joins_bindings_unique_to_one_operand_with_the_default() {
        let left = state(&[("x", SignDomain::Plus), ("y", SignDomain::Minus)]);
        let right = state(&[("x", SignDomain::Minus), ("z", SignDomain::Plus)]);
        let merged = left.merge(&right);
        assert_eq!(merged.load("x"), SignDomain::Top);
        // "y" and "z" are bound in only one operand and implicitly zero in
        // the other, so the join must cover zero as well.
        assert_eq!(merged.load("y"), SignDomain::Top);
        assert_eq!(merged.load("z"), SignDomain::Top);
    }

    #[test]
    fn merge_ignores_bottom_states() {
        let reachable = state(&[("x", SignDomain::Plus)]);
        let unreachable = reachable.to_bottom();
        assert_eq!(unreachable.merge(&reachable), reachable);
        assert_eq!(reachable.merge(&unreachable), reachable);
        assert!(unreachable.merge(&unreachable.clone()).is_bottom());
    }

    #[test]
    fn widening_covers_keys_of_both_states() {
        let previous: AbstractState<IntervalDomain> = AbstractState::new();
        let current = [("x".to_string(), IntervalDomain::new(0, 100))]
            .into_iter()
            .collect::<AbstractState<_>>();
        // "x" is missing in the previous state and must still be widened:
        // its previous value is the default [0; 0].
        let widened = previous.widen(&current);
        assert!(widened.load("x").is_top() || widened.load("x") != IntervalDomain::new(0, 100));
    }

    #[test]
    fn partial_order() {
        let small = state(&[("x", SignDomain::Plus)]);
        let large = state(&[("x", SignDomain::Top), ("y", SignDomain::Top)]);
        assert!(small.le(&large));
        assert!(!large.le(&small));
        assert!(small.to_bottom().le(&small));
    }

    #[test]
    fn display() {
        let s = state(&[("x", SignDomain::Plus), ("y", SignDomain::Bottom)]);
        assert_eq!(s.to_string(), "[x -> +, y -> bot]");
        let empty: AbstractState<SignDomain> = AbstractState::new();
        assert_eq!(empty.to_string(), "[]");
    }
}
