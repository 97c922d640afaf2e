use super::*;

impl IntervalDomain {
    /// Return a new interval with the given bounds and no widening hints.
    pub fn mock(start: i64, end: i64) -> IntervalDomain {
        IntervalDomain::new(start, end)
    }

    /// Return a new interval with the given bounds and widening hints.
    pub fn mock_with_bounds(
        lower_bound: Option<i64>,
        start: i64,
        end: i64,
        upper_bound: Option<i64>,
    ) -> IntervalDomain {
        let mut domain = IntervalDomain::mock(start, end);
        domain.update_widening_lower_bound(lower_bound);
        domain.update_widening_upper_bound(upper_bound);
        domain
    }
}

#[test]
fn abstraction() {
    assert_eq!(IntervalDomain::from(5), IntervalDomain::mock(5, 5));
    assert_eq!(
        IntervalDomain::from_values(&[-3, 1, 5]),
        IntervalDomain::mock(-3, 5)
    );
    assert_eq!(IntervalDomain::from_values(&[]), IntervalDomain::Bottom);
}

#[test]
fn merge() {
    let left = IntervalDomain::mock(-3, 1);
    let right = IntervalDomain::mock(0, 5);
    assert_eq!(left.merge(&right), IntervalDomain::mock(-3, 5));
    assert_eq!(
        IntervalDomain::Bottom.merge(&right),
        IntervalDomain::mock(0, 5)
    );
    assert_eq!(left.merge(&IntervalDomain::top()), IntervalDomain::top());
}

#[test]
fn merge_keeps_widening_hints_outside_the_merged_interval() {
    let left = IntervalDomain::mock_with_bounds(None, 0, 2, Some(9));
    let right = IntervalDomain::mock(1, 3);
    let merged = left.merge(&right);
    assert_eq!(
        merged,
        IntervalDomain::mock_with_bounds(None, 0, 3, Some(9))
    );
    // A hint swallowed by the merged interval is dropped.
    let right = IntervalDomain::mock(1, 11);
    let merged = left.merge(&right);
    assert_eq!(merged, IntervalDomain::mock(0, 11));
}

#[test]
fn arithmetic() {
    use BinOpType::*;
    let small = IntervalDomain::mock(2, 3);
    let negative = IntervalDomain::mock(-5, -4);
    assert_eq!(small.bin_op(Add, &negative), IntervalDomain::mock(-3, -1));
    assert_eq!(small.bin_op(Sub, &negative), IntervalDomain::mock(6, 8));
    assert_eq!(small.bin_op(Mul, &negative), IntervalDomain::mock(-15, -8));
    assert_eq!(
        small.un_op(UnOpType::Negate),
        IntervalDomain::mock(-3, -2)
    );
    assert_eq!(small.un_op(UnOpType::Identity), small);
    assert_eq!(
        IntervalDomain::Bottom.bin_op(Add, &small),
        IntervalDomain::Bottom
    );
}

#[test]
fn multiplication_of_zero_straddling_intervals() {
    let straddling = IntervalDomain::mock(-2, 3);
    assert_eq!(
        straddling.bin_op(BinOpType::Mul, &straddling),
        IntervalDomain::mock(-6, 9)
    );
}

#[test]
fn division() {
    use BinOpType::Div;
    let dividend = IntervalDomain::mock(10, 20);
    assert_eq!(
        dividend.bin_op(Div, &IntervalDomain::mock(2, 5)),
        IntervalDomain::mock(2, 10)
    );
    assert_eq!(
        dividend.bin_op(Div, &IntervalDomain::mock(-2, -1)),
        IntervalDomain::mock(-20, -5)
    );
    // A divisor that is exactly zero has no result.
    assert_eq!(
        dividend.bin_op(Div, &IntervalDomain::from(0)),
        IntervalDomain::Bottom
    );
    // A divisor that only may be zero widens to top.
    assert!(dividend
        .bin_op(Div, &IntervalDomain::mock(-1, 1))
        .is_top());
}

#[test]
fn remainder() {
    use BinOpType::Rem;
    let dividend = IntervalDomain::mock(0, 100);
    assert_eq!(
        dividend.bin_op(Rem, &IntervalDomain::mock(3, 10)),
        IntervalDomain::mock(0, 9)
    );
    // The remainder is also bounded by the dividend.
    assert_eq!(
        IntervalDomain::mock(0, 3).bin_op(Rem, &IntervalDomain::from(10)),
        IntervalDomain::mock(0, 3)
    );
    // The sign of the remainder follows the dividend.
    assert_eq!(
        IntervalDomain::mock(-7, -1).bin_op(Rem, &IntervalDomain::from(3)),
        IntervalDomain::mock(-2, 0)
    );
    assert_eq!(
        dividend.bin_op(Rem, &IntervalDomain::from(0)),
        IntervalDomain::Bottom
    );
    assert!(dividend
        .bin_op(Rem, &IntervalDomain::mock(0, 5))
        .is_top());
}

#[test]
fn exponentiation() {
    use BinOpType::Pow;
    assert_eq!(
        IntervalDomain::from(2).bin_op(Pow, &IntervalDomain::from(10)),
        IntervalDomain::mock(1024, 1024)
    );
    // Exponents less than one yield 1.
    assert_eq!(
        IntervalDomain::from(7).bin_op(Pow, &IntervalDomain::mock(-3, 0)),
        IntervalDomain::mock(1, 1)
    );
    // A negative base alternates signs, so inner exponents matter.
    let result = IntervalDomain::from(-2).bin_op(Pow, &IntervalDomain::mock(1, 3));
    assert_eq!(result, IntervalDomain::mock(-8, 4));
    // Zero in the base range pulls the minimum down to zero.
    let result = IntervalDomain::mock(-1, 2).bin_op(Pow, &IntervalDomain::mock(2, 2));
    assert_eq!(result, IntervalDomain::mock(0, 4));
}

#[test]
fn widening_without_hints_jumps_to_infinity() {
    let previous = IntervalDomain::mock(0, 0);
    let current = IntervalDomain::mock(0, 5);
    let widened = previous.widen(&current);
    assert_eq!(widened.try_to_value(), None);
    match widened {
        IntervalDomain::Interval { start, end, .. } => {
            assert_eq!(start, 0);
            assert!(end >= MAX_SENTINEL);
        }
        IntervalDomain::Bottom => panic!("widening must not produce bottom"),
    }
}

#[test]
fn widening_respects_hints_and_delay() {
    // Growth below the delay threshold is tolerated without widening.
    let previous = IntervalDomain::mock(0, 0);
    let current = IntervalDomain::mock_with_bounds(None, 0, 1, Some(9));
    assert_eq!(previous.widen(&current), current);
    // Larger growth widens up to the recorded hint.
    let current = IntervalDomain::mock_with_bounds(None, 0, 2, Some(9));
    let widened = previous.widen(&current);
    assert!(widened.equal_as_value_sets(&IntervalDomain::mock(0, 9)));
    // The delay now covers the widened length, so moderate growth sticks.
    let grown = IntervalDomain::with_delay(IntervalDomain::mock(0, 10), 9);
    let widened = widened.widen(&grown);
    assert!(widened.equal_as_value_sets(&IntervalDomain::mock(0, 10)));
}

#[test]
fn widening_of_stable_values_is_the_identity() {
    let value = IntervalDomain::mock(3, 17);
    assert_eq!(value.widen(&value.clone()), value);
}

#[test]
fn comparisons() {
    use RelOpType::*;
    let low = IntervalDomain::mock(0, 5);
    let high = IntervalDomain::mock(10, 20);
    assert!(low.may_hold(Less, &high));
    assert!(!high.may_hold(Less, &low));
    assert!(!high.may_hold(LessOrEqual, &low));
    assert!(low.may_hold(NotEqual, &high));
    assert!(!low.may_hold(Equal, &high));
    assert!(low.may_hold(Equal, &IntervalDomain::mock(5, 7)));
    assert!(high.may_hold(GreaterOrEqual, &low));
    assert!(!low.may_hold(Greater, &high));
    // Only singleton intervals can refute a disequality.
    let five = IntervalDomain::from(5);
    assert!(!five.may_hold(NotEqual, &five.clone()));
    assert!(low.may_hold(NotEqual, &low.clone()));
    // Bottom refutes everything.
    assert!(!IntervalDomain::Bottom.may_hold(Equal, &low));
}

#[test]
fn specialization_tightens_bounds_or_records_hints() {
    let value = IntervalDomain::mock(0, 10);
    assert_eq!(
        value.clone().add_less_equal_bound(5),
        Some(IntervalDomain::mock(0, 5))
    );
    assert_eq!(
        value.clone().add_greater_equal_bound(3),
        Some(IntervalDomain::mock(3, 10))
    );
    assert_eq!(value.clone().add_greater_equal_bound(11), None);
    // A bound outside the interval becomes a widening hint.
    assert_eq!(
        value.clone().add_less_equal_bound(42),
        Some(IntervalDomain::mock_with_bounds(None, 0, 10, Some(42)))
    );
    // Disequalities trim matching endpoints.
    assert_eq!(
        value.clone().add_not_equal_bound(0),
        Some(IntervalDomain::mock(1, 10))
    );
    assert_eq!(
        value.add_not_equal_bound(5),
        Some(IntervalDomain::mock(0, 10))
    );
    assert_eq!(IntervalDomain::from(7).add_not_equal_bound(7), None);
}

#[test]
fn display() {
    assert_eq!(IntervalDomain::mock(-3, 5).to_string(), "[-3; 5]");
    assert_eq!(IntervalDomain::Bottom.to_string(), "bot");
    assert_eq!(IntervalDomain::top().to_string(), "(-inf; +inf)");
    let half_open = IntervalDomain::mock(0, 0).widen(&IntervalDomain::mock(0, 5));
    assert_eq!(half_open.to_string(), "[0; +inf)");
}
