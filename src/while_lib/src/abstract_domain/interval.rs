use std::fmt;

use super::{
    AbstractDomain, HasBottom, HasTop, SpecializeByConditional, TryToValue, ValueDomain,
};
use crate::prelude::*;
use crate::syntax::{BinOpType, RelOpType, UnOpType};

/// Bounds at or beyond the sentinels are read as infinities:
/// a start of `MIN_SENTINEL` means "unbounded below",
/// an end of `MAX_SENTINEL` means "unbounded above".
const MIN_SENTINEL: i64 = i32::MIN as i64;
const MAX_SENTINEL: i64 = i32::MAX as i64;

/// Stand-in for an infinite bound during intermediate computations.
/// Large enough that no product of finite bounds can reach it.
const EFF_INFINITY: i128 = 1 << 62;

/// An abstract domain representing values by a closed integer interval,
/// with widening hints to allow fast and exact widening of simple loop
/// counter variables.
///
/// The widening hints record bounds that were learned from branch and loop
/// conditions but did not restrict the interval at the time. When the
/// interval later grows past such a hint during a fixpoint iteration, the
/// widening jumps to the hint instead of straight to infinity. The
/// `widening_delay` postpones widening while the interval is still shorter
/// than it was after the last widening, so that loops with a refinable guard
/// can converge to an exact bound. See [`IntervalDomain::widen`].
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub enum IntervalDomain {
    /// The empty set.
    Bottom,
    /// A closed interval of integers. `start <= end` always holds.
    Interval {
        /// The lower bound, included in the interval.
        start: i64,
        /// The upper bound, included in the interval.
        end: i64,
        /// A lower bound learned from a condition, for widening.
        widening_lower_bound: Option<i64>,
        /// An upper bound learned from a condition, for widening.
        widening_upper_bound: Option<i64>,
        /// The length of the interval after the last widening.
        widening_delay: u64,
    },
}

use IntervalDomain::{Bottom, Interval};

impl IntervalDomain {
    /// Create a new interval with the given bounds and no widening hints.
    ///
    /// Both `start` and `end` are inclusive. Bounds beyond the sentinel range
    /// are clamped to the corresponding sentinel, i.e. to infinity.
    pub fn new(start: i64, end: i64) -> IntervalDomain {
        assert!(start <= end);
        Self::from_effective_bounds(start as i128, end as i128)
    }

    /// Build an interval from bounds of an intermediate computation,
    /// clamping into the sentinel range.
    fn from_effective_bounds(start: i128, end: i128) -> IntervalDomain {
        Interval {
            start: start.clamp(MIN_SENTINEL as i128, MAX_SENTINEL as i128) as i64,
            end: end.clamp(MIN_SENTINEL as i128, MAX_SENTINEL as i128) as i64,
            widening_lower_bound: None,
            widening_upper_bound: None,
            widening_delay: 0,
        }
    }

    /// The bounds used for computations: sentinel bounds are replaced by a
    /// stand-in value that behaves like infinity.
    fn effective_bounds(&self) -> Option<(i128, i128)> {
        match self {
            Bottom => None,
            Interval { start, end, .. } => {
                let start = if *start <= MIN_SENTINEL {
                    -EFF_INFINITY
                } else {
                    *start as i128
                };
                let end = if *end >= MAX_SENTINEL {
                    EFF_INFINITY
                } else {
                    *end as i128
                };
                Some((start, end))
            }
        }
    }

    /// True if the interval contains exactly one value.
    fn is_singleton(&self) -> bool {
        matches!(self, Interval { start, end, .. }
            if start == end && *start > MIN_SENTINEL && *end < MAX_SENTINEL)
    }

    /// Returns true if the two intervals represent the same value sets,
    /// ignoring widening hints and delays.
    pub fn equal_as_value_sets(&self, other: &IntervalDomain) -> bool {
        match (self, other) {
            (Bottom, Bottom) => true,
            (
                Interval { start, end, .. },
                Interval {
                    start: other_start,
                    end: other_end,
                    ..
                },
            ) => start == other_start && end == other_end,
            _ => false,
        }
    }

    /// If `bound` is outside the interval and more restrictive than the
    /// current lower widening hint, record it as the new hint.
    fn update_widening_lower_bound(&mut self, bound: Option<i64>) {
        if let (
            Some(bound),
            Interval {
                start,
                widening_lower_bound,
                ..
            },
        ) = (bound, self)
        {
            if bound < *start {
                match widening_lower_bound {
                    Some(previous) if *previous >= bound => (),
                    _ => *widening_lower_bound = Some(bound),
                }
            }
        }
    }

    /// If `bound` is outside the interval and more restrictive than the
    /// current upper widening hint, record it as the new hint.
    fn update_widening_upper_bound(&mut self, bound: Option<i64>) {
        if let (
            Some(bound),
            Interval {
                end,
                widening_upper_bound,
                ..
            },
        ) = (bound, self)
        {
            if bound > *end {
                match widening_upper_bound {
                    Some(previous) if *previous <= bound => (),
                    _ => *widening_upper_bound = Some(bound),
                }
            }
        }
    }

    /// Merge two intervals without performing widening.
    /// Widening hints that remain outside the merged interval are kept.
    fn signed_merge(&self, other: &IntervalDomain) -> IntervalDomain {
        match (self, other) {
            (Bottom, _) => other.clone(),
            (_, Bottom) => self.clone(),
            (
                Interval {
                    start,
                    end,
                    widening_lower_bound,
                    widening_upper_bound,
                    widening_delay,
                },
                Interval {
                    start: other_start,
                    end: other_end,
                    widening_lower_bound: other_lower,
                    widening_upper_bound: other_upper,
                    widening_delay: other_delay,
                },
            ) => {
                let mut merged = Interval {
                    start: *start.min(other_start),
                    end: *end.max(other_end),
                    widening_lower_bound: None,
                    widening_upper_bound: None,
                    widening_delay: *widening_delay.max(other_delay),
                };
                merged.update_widening_lower_bound(*widening_lower_bound);
                merged.update_widening_lower_bound(*other_lower);
                merged.update_widening_upper_bound(*widening_upper_bound);
                merged.update_widening_upper_bound(*other_upper);
                merged
            }
        }
    }

    /// The number of values in the interval minus one, saturated into `u64`.
    fn length(&self) -> u64 {
        match self.effective_bounds() {
            None => 0,
            Some((start, end)) => (end - start).min(u64::MAX as i128) as u64,
        }
    }

    /// The delay counter carried into the result of an arithmetic operation.
    fn propagated_delay(&self, rhs: &IntervalDomain) -> u64 {
        match (self, rhs) {
            (
                Interval { widening_delay, .. },
                Interval {
                    widening_delay: other_delay,
                    ..
                },
            ) => *widening_delay.max(other_delay),
            _ => 0,
        }
    }

    /// Keep the value set of `interval` but attach the given delay.
    fn with_delay(interval: IntervalDomain, delay: u64) -> IntervalDomain {
        match interval {
            Bottom => Bottom,
            Interval { start, end, .. } => Interval {
                start,
                end,
                widening_lower_bound: None,
                widening_upper_bound: None,
                widening_delay: delay,
            },
        }
    }

    /// The widening hints an operand contributes to additive operations.
    /// A singleton without explicit hints contributes its exact value, so
    /// that e.g. incrementing a hinted loop counter shifts the hint along.
    fn hint_bounds(&self) -> (Option<i64>, Option<i64>) {
        match self {
            Bottom => (None, None),
            Interval {
                start,
                end,
                widening_lower_bound,
                widening_upper_bound,
                ..
            } => {
                let singleton = self.is_singleton();
                (
                    widening_lower_bound.or_else(|| singleton.then_some(*start)),
                    widening_upper_bound.or_else(|| singleton.then_some(*end)),
                )
            }
        }
    }

    fn add(&self, rhs: &IntervalDomain) -> IntervalDomain {
        match (self.effective_bounds(), rhs.effective_bounds()) {
            (Some((start, end)), Some((rhs_start, rhs_end))) => {
                let mut sum = Self::with_delay(
                    Self::from_effective_bounds(start + rhs_start, end + rhs_end),
                    self.propagated_delay(rhs),
                );
                let (lower, upper) = self.hint_bounds();
                let (rhs_lower, rhs_upper) = rhs.hint_bounds();
                sum.update_widening_lower_bound(combine_hints(lower, rhs_lower, i64::checked_add));
                sum.update_widening_upper_bound(combine_hints(upper, rhs_upper, i64::checked_add));
                sum
            }
            _ => Bottom,
        }
    }

    fn sub(&self, rhs: &IntervalDomain) -> IntervalDomain {
        match (self.effective_bounds(), rhs.effective_bounds()) {
            (Some((start, end)), Some((rhs_start, rhs_end))) => {
                let mut difference = Self::with_delay(
                    Self::from_effective_bounds(start - rhs_end, end - rhs_start),
                    self.propagated_delay(rhs),
                );
                let (lower, upper) = self.hint_bounds();
                let (rhs_lower, rhs_upper) = rhs.hint_bounds();
                difference
                    .update_widening_lower_bound(combine_hints(lower, rhs_upper, i64::checked_sub));
                difference
                    .update_widening_upper_bound(combine_hints(upper, rhs_lower, i64::checked_sub));
                difference
            }
            _ => Bottom,
        }
    }

    /// Multiplication takes the minimum and maximum of all four corner
    /// products, which is exact even for intervals straddling zero.
    fn mul(&self, rhs: &IntervalDomain) -> IntervalDomain {
        match (self.effective_bounds(), rhs.effective_bounds()) {
            (Some((start, end)), Some((rhs_start, rhs_end))) => {
                let corners = [
                    start * rhs_start,
                    start * rhs_end,
                    end * rhs_start,
                    end * rhs_end,
                ];
                let low = *corners.iter().min().unwrap();
                let high = *corners.iter().max().unwrap();
                Self::with_delay(
                    Self::from_effective_bounds(low, high),
                    self.propagated_delay(rhs),
                )
            }
            _ => Bottom,
        }
    }

    fn div(&self, rhs: &IntervalDomain) -> IntervalDomain {
        let delay = self.propagated_delay(rhs);
        match (self.effective_bounds(), rhs.effective_bounds()) {
            (Some((start, end)), Some((rhs_start, rhs_end))) => {
                if rhs_start == 0 && rhs_end == 0 {
                    // Division by zero has no result.
                    Bottom
                } else if rhs_start <= 0 && rhs_end >= 0 {
                    // The divisor may be zero but does not have to be.
                    Self::with_delay(IntervalDomain::top(), delay)
                } else {
                    let corners = [
                        start / rhs_start,
                        start / rhs_end,
                        end / rhs_start,
                        end / rhs_end,
                    ];
                    let low = *corners.iter().min().unwrap();
                    let high = *corners.iter().max().unwrap();
                    Self::with_delay(Self::from_effective_bounds(low, high), delay)
                }
            }
            _ => Bottom,
        }
    }

    /// The remainder is bounded by the divisor range and by the dividend.
    /// Its sign follows the dividend.
    fn rem(&self, rhs: &IntervalDomain) -> IntervalDomain {
        let delay = self.propagated_delay(rhs);
        match (self.effective_bounds(), rhs.effective_bounds()) {
            (Some((start, end)), Some((rhs_start, rhs_end))) => {
                if rhs_start == 0 && rhs_end == 0 {
                    Bottom
                } else if rhs_start <= 0 && rhs_end >= 0 {
                    Self::with_delay(IntervalDomain::top(), delay)
                } else {
                    let divisor_magnitude = rhs_start.abs().max(rhs_end.abs());
                    let dividend_magnitude = start.abs().max(end.abs());
                    let bound = (divisor_magnitude - 1).min(dividend_magnitude);
                    let low = if start < 0 { -bound } else { 0 };
                    let high = if end > 0 { bound } else { 0 };
                    Self::with_delay(Self::from_effective_bounds(low, high), delay)
                }
            }
            _ => Bottom,
        }
    }

    /// Exponentiation. Exponents less than one yield `1`, matching the
    /// concrete executor.
    ///
    /// For a fixed base the extreme results over an exponent range occur at
    /// the two largest exponents (the sign may alternate) or at the smallest
    /// ones, and for a fixed exponent at the corner bases or at zero. Taking
    /// the minimum and maximum over those candidates is therefore sound.
    fn pow(&self, rhs: &IntervalDomain) -> IntervalDomain {
        let delay = self.propagated_delay(rhs);
        match (self.effective_bounds(), rhs.effective_bounds()) {
            (Some((start, end)), Some((rhs_start, rhs_end))) => {
                let mut candidates = Vec::new();
                if rhs_start <= 0 {
                    candidates.push(1);
                }
                if rhs_end >= 1 {
                    let exp_low = rhs_start.max(1);
                    let exponents = [exp_low, exp_low + 1, rhs_end - 1, rhs_end];
                    let mut bases = vec![start, end];
                    if start < 0 && end > 0 {
                        bases.push(0);
                    }
                    for &base in &bases {
                        for &exponent in &exponents {
                            if exponent >= exp_low && exponent <= rhs_end {
                                candidates.push(saturating_pow(base, exponent));
                            }
                        }
                    }
                }
                let low = *candidates.iter().min().unwrap();
                let high = *candidates.iter().max().unwrap();
                Self::with_delay(Self::from_effective_bounds(low, high), delay)
            }
            _ => Bottom,
        }
    }
}

/// Combine two optional hint bounds with a checked operation.
fn combine_hints(
    left: Option<i64>,
    right: Option<i64>,
    op: fn(i64, i64) -> Option<i64>,
) -> Option<i64> {
    match (left, right) {
        (Some(left), Some(right)) => {
            op(left, right).filter(|bound| (MIN_SENTINEL..=MAX_SENTINEL).contains(bound))
        }
        _ => None,
    }
}

/// `base ^ exponent` saturated at the effective infinity.
/// The caller guarantees `exponent >= 1`.
fn saturating_pow(base: i128, exponent: i128) -> i128 {
    match base {
        0 => 0,
        1 => 1,
        -1 => {
            if exponent % 2 == 0 {
                1
            } else {
                -1
            }
        }
        _ => {
            let mut result: i128 = 1;
            for _ in 0..exponent {
                result *= base;
                if result.abs() >= EFF_INFINITY {
                    return result.signum() * EFF_INFINITY;
                }
            }
            result
        }
    }
}

impl AbstractDomain for IntervalDomain {
    /// Merge two intervals as value sets, keeping widening hints that remain
    /// outside the merged interval. No widening is performed; that is the
    /// job of [`IntervalDomain::widen`].
    fn merge(&self, other: &IntervalDomain) -> IntervalDomain {
        self.signed_merge(other)
    }

    /// Return `true` if the interval is unbounded in both directions.
    fn is_top(&self) -> bool {
        matches!(self, Interval { start, end, .. }
            if *start <= MIN_SENTINEL && *end >= MAX_SENTINEL)
    }
}

impl HasTop for IntervalDomain {
    fn top() -> Self {
        Interval {
            start: MIN_SENTINEL,
            end: MAX_SENTINEL,
            widening_lower_bound: None,
            widening_upper_bound: None,
            widening_delay: 0,
        }
    }
}

impl HasBottom for IntervalDomain {
    fn bottom() -> Self {
        Bottom
    }

    fn is_bottom(&self) -> bool {
        matches!(self, Bottom)
    }
}

impl TryToValue for IntervalDomain {
    /// If the interval contains exactly one value, return it.
    fn try_to_value(&self) -> Option<i64> {
        match self {
            Interval { start, .. } if self.is_singleton() => Some(*start),
            _ => None,
        }
    }
}

impl SpecializeByConditional for IntervalDomain {
    fn add_less_equal_bound(self, bound: i64) -> Option<Self> {
        match self {
            Bottom => None,
            Interval {
                start,
                end,
                widening_lower_bound,
                mut widening_upper_bound,
                widening_delay,
            } => {
                if let Some(old_bound) = widening_upper_bound {
                    if old_bound <= bound {
                        return Some(Interval {
                            start,
                            end,
                            widening_lower_bound,
                            widening_upper_bound,
                            widening_delay,
                        });
                    }
                    widening_upper_bound = None;
                }
                if end < bound {
                    // The bound does not restrict the interval; remember it
                    // as a widening hint.
                    Some(Interval {
                        start,
                        end,
                        widening_lower_bound,
                        widening_upper_bound: Some(bound),
                        widening_delay,
                    })
                } else if start <= bound {
                    Some(Interval {
                        start,
                        end: bound,
                        widening_lower_bound,
                        widening_upper_bound,
                        widening_delay,
                    })
                } else {
                    None
                }
            }
        }
    }

    fn add_greater_equal_bound(self, bound: i64) -> Option<Self> {
        match self {
            Bottom => None,
            Interval {
                start,
                end,
                mut widening_lower_bound,
                widening_upper_bound,
                widening_delay,
            } => {
                if let Some(old_bound) = widening_lower_bound {
                    if old_bound >= bound {
                        return Some(Interval {
                            start,
                            end,
                            widening_lower_bound,
                            widening_upper_bound,
                            widening_delay,
                        });
                    }
                    widening_lower_bound = None;
                }
                if start > bound {
                    Some(Interval {
                        start,
                        end,
                        widening_lower_bound: Some(bound),
                        widening_upper_bound,
                        widening_delay,
                    })
                } else if end >= bound {
                    Some(Interval {
                        start: bound,
                        end,
                        widening_lower_bound,
                        widening_upper_bound,
                        widening_delay,
                    })
                } else {
                    None
                }
            }
        }
    }

    fn add_not_equal_bound(self, bound: i64) -> Option<Self> {
        let Interval {
            mut start,
            mut end,
            widening_lower_bound,
            widening_upper_bound,
            widening_delay,
        } = self
        else {
            return None;
        };
        if start == bound && end == bound {
            return None;
        }
        let rebuilt = Interval {
            start,
            end,
            widening_lower_bound,
            widening_upper_bound,
            widening_delay,
        };
        if start > bound {
            return rebuilt.add_greater_equal_bound(bound.saturating_add(1));
        }
        if end < bound {
            return rebuilt.add_less_equal_bound(bound.saturating_sub(1));
        }
        if start == bound {
            start += 1;
        } else if end == bound {
            end -= 1;
        }
        Some(Interval {
            start,
            end,
            widening_lower_bound,
            widening_upper_bound,
            widening_delay,
        })
    }
}

impl From<i64> for IntervalDomain {
    /// Create an interval containing only `value`.
    fn from(value: i64) -> Self {
        Self::from_effective_bounds(value as i128, value as i128)
    }
}

impl Default for IntervalDomain {
    /// The value of unassigned variables, i.e. the abstraction of `0`.
    fn default() -> Self {
        Self::from(0)
    }
}

impl ValueDomain for IntervalDomain {
    /// Widen `other` (the merged value of the current fixpoint iteration)
    /// against `self` (the value of the previous iteration).
    ///
    /// ## Widening strategy
    ///
    /// If the value set did not grow, nothing happens. Widening is also
    /// delayed while the interval is not longer than it was after the last
    /// widening; this lets a loop whose guard keeps restricting the interval
    /// reach its exact fixpoint. When widening does fire, each grown bound
    /// jumps to the corresponding widening hint if one exists, and to
    /// infinity otherwise.
    fn widen(&self, other: &Self) -> Self {
        let (previous, mut current) = match (self, other) {
            (Bottom, _) => return other.clone(),
            (_, Bottom) => return self.clone(),
            // The merge guarantees that the result covers both inputs even
            // when `other` does not contain `self`.
            (previous, current) => (previous.clone(), previous.signed_merge(current)),
        };
        if current.equal_as_value_sets(&previous) || current.is_top() {
            return current;
        }
        if let Interval { widening_delay, .. } = &current {
            if current.length() <= widening_delay.saturating_add(1) {
                return current;
            }
        }
        let mut has_been_widened = false;
        if let (
            Interval {
                start: previous_start,
                end: previous_end,
                ..
            },
            Interval {
                start,
                end,
                widening_lower_bound,
                widening_upper_bound,
                ..
            },
        ) = (&previous, &mut current)
        {
            if *start < *previous_start {
                // The interval grew downwards.
                *start = widening_lower_bound.take().unwrap_or(MIN_SENTINEL);
                has_been_widened = true;
            }
            if *end > *previous_end {
                // The interval grew upwards.
                *end = widening_upper_bound.take().unwrap_or(MAX_SENTINEL);
                has_been_widened = true;
            }
        }
        if has_been_widened {
            let new_delay = current.length();
            if let Interval { widening_delay, .. } = &mut current {
                *widening_delay = new_delay;
            }
        }
        current
    }

    fn bin_op(&self, op: BinOpType, rhs: &Self) -> Self {
        use BinOpType::*;
        match op {
            Add => self.add(rhs),
            Sub => self.sub(rhs),
            Mul => self.mul(rhs),
            Div => self.div(rhs),
            Rem => self.rem(rhs),
            Pow => self.pow(rhs),
        }
    }

    fn un_op(&self, op: UnOpType) -> Self {
        match op {
            UnOpType::Identity => self.clone(),
            UnOpType::Negate => match self.effective_bounds() {
                None => Bottom,
                Some((start, end)) => {
                    let delay = match self {
                        Interval { widening_delay, .. } => *widening_delay,
                        Bottom => 0,
                    };
                    Self::with_delay(Self::from_effective_bounds(-end, -start), delay)
                }
            },
        }
    }

    fn may_hold(&self, op: RelOpType, rhs: &Self) -> bool {
        use RelOpType::*;
        let (Some((start, end)), Some((rhs_start, rhs_end))) =
            (self.effective_bounds(), rhs.effective_bounds())
        else {
            return false;
        };
        match op {
            Less => start < rhs_end,
            LessOrEqual => start <= rhs_end,
            Equal => start <= rhs_end && end >= rhs_start,
            GreaterOrEqual => end >= rhs_start,
            Greater => end > rhs_start,
            NotEqual => !(self.is_singleton() && rhs.is_singleton() && start == rhs_start),
        }
    }
}

impl fmt::Display for IntervalDomain {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bottom => write!(formatter, "bot"),
            Interval { start, end, .. } => {
                if *start <= MIN_SENTINEL {
                    write!(formatter, "(-inf; ")?;
                } else {
                    write!(formatter, "[{start}; ")?;
                }
                if *end >= MAX_SENTINEL {
                    write!(formatter, "+inf)")
                } else {
                    write!(formatter, "{end}]")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
