//! The abstract interpretation engine.
//!
//! The engine recursively descends the syntax tree: statements transform
//! abstract states, arithmetic expressions evaluate to abstract values, and
//! boolean expressions *filter* the state, returning the part of it in which
//! the condition may hold. Loops are analyzed by a fixpoint iteration with
//! widening, so the engine terminates on every program for every domain with
//! a terminating widening.

use crate::abstract_domain::{
    AbstractState, HasTop, SpecializeByConditional, TryToValue, ValueDomain,
};
use crate::syntax::{AExp, BExp, BoolOpType, RelOpType, Stm};

/// Interpret a whole program, starting from the empty abstract state.
pub fn interpret_program<T: ValueDomain>(program: &Stm) -> AbstractState<T> {
    interpret(program, AbstractState::new())
}

/// The transfer function for statements: compute the abstract state after
/// executing `statement` in the given abstract state.
pub fn interpret<T: ValueDomain>(statement: &Stm, state: AbstractState<T>) -> AbstractState<T> {
    if state.is_bottom() {
        // Unreachable code transforms nothing.
        return state;
    }
    match statement {
        Stm::Skip => state,
        // The abstract interpretation has no output channel, so a print is a no-op.
        Stm::Print(_) => state,
        Stm::Assign { var, value } => {
            let mut state = state;
            let value = eval(value, &state);
            state.store(var.clone(), value);
            state
        }
        Stm::Seq(first, second) => interpret(second, interpret(first, state)),
        Stm::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let then_state = interpret(
                then_branch,
                specialize_by_condition(condition, state.clone()),
            );
            let else_state = interpret(
                else_branch,
                specialize_by_condition(&condition.negate(), state),
            );
            then_state.merge(&else_state)
        }
        Stm::While { condition, body } => {
            let mut state = state;
            loop {
                let previous = state.clone();
                let body_state = interpret(body, specialize_by_condition(condition, state));
                state = previous.merge(&body_state);
                state = previous.widen(&state);
                if state == previous {
                    break;
                }
            }
            // The negated guard holds whenever the loop exits.
            specialize_by_condition(&condition.negate(), state)
        }
        Stm::Input(var) => {
            let mut state = state;
            state.store(var.clone(), T::top());
            state
        }
    }
}

/// Evaluate an arithmetic expression to an abstract value.
pub fn eval<T: ValueDomain>(expression: &AExp, state: &AbstractState<T>) -> T {
    match expression {
        AExp::Const(value) => T::from(*value),
        AExp::Var(name) => state.load(name),
        AExp::UnOp { op, arg } => eval(arg, state).un_op(*op),
        AExp::BinOp { op, lhs, rhs } => eval(lhs, state).bin_op(*op, &eval(rhs, state)),
    }
}

/// Filter `state` through a boolean condition: the result covers every
/// environment of `state` in which `condition` may hold, and is the bottom
/// state if the condition definitely does not hold.
pub fn specialize_by_condition<T: ValueDomain>(
    condition: &BExp,
    state: AbstractState<T>,
) -> AbstractState<T> {
    if state.is_bottom() {
        return state;
    }
    match condition {
        BExp::Const(true) => state,
        BExp::Const(false) => state.to_bottom(),
        BExp::Not(inner) => specialize_by_condition(&inner.negate(), state),
        BExp::BoolOp { op, lhs, rhs } => match op {
            BoolOpType::And => {
                specialize_by_condition(rhs, specialize_by_condition(lhs, state))
            }
            BoolOpType::Or => specialize_by_condition(lhs, state.clone())
                .merge(&specialize_by_condition(rhs, state)),
            BoolOpType::Xor => {
                let left_only = specialize_by_condition(
                    lhs,
                    specialize_by_condition(&rhs.negate(), state.clone()),
                );
                let right_only = specialize_by_condition(
                    rhs,
                    specialize_by_condition(&lhs.negate(), state),
                );
                left_only.merge(&right_only)
            }
            // The negated connectives are filtered through their positive
            // counterparts over negated operands.
            BoolOpType::Nand => specialize_by_condition(&lhs.negate(), state.clone())
                .merge(&specialize_by_condition(&rhs.negate(), state)),
            BoolOpType::Nor => specialize_by_condition(
                &rhs.negate(),
                specialize_by_condition(&lhs.negate(), state),
            ),
            BoolOpType::Xnor => {
                let both = specialize_by_condition(rhs, specialize_by_condition(lhs, state.clone()));
                let neither = specialize_by_condition(
                    &rhs.negate(),
                    specialize_by_condition(&lhs.negate(), state),
                );
                both.merge(&neither)
            }
        },
        BExp::Cmp { op, lhs, rhs } => specialize_by_comparison(*op, lhs, rhs, state),
    }
}

/// Filter a state through a single comparison.
///
/// Comparisons between constant expressions are decided exactly. Otherwise
/// the domain's `may_hold` either keeps or empties the state, and when one
/// side is a variable and the other side evaluates to a single concrete
/// value, the variable's abstract value is additionally specialized by the
/// comparison.
fn specialize_by_comparison<T: ValueDomain>(
    op: RelOpType,
    lhs: &AExp,
    rhs: &AExp,
    state: AbstractState<T>,
) -> AbstractState<T> {
    if let (Some(left), Some(right)) = (lhs.try_const_eval(), rhs.try_const_eval()) {
        return if op.eval(left, right) {
            state
        } else {
            state.to_bottom()
        };
    }
    let left = eval(lhs, &state);
    let right = eval(rhs, &state);
    if !left.may_hold(op, &right) {
        return state.to_bottom();
    }
    let mut state = state;
    if let AExp::Var(name) = lhs {
        if let Some(bound) = right.try_to_value() {
            match restrict_by_bound(left, op, bound) {
                Some(value) => state.store(name.clone(), value),
                None => return state.to_bottom(),
            }
            return state;
        }
    }
    if let AExp::Var(name) = rhs {
        if let Some(bound) = left.try_to_value() {
            // Mirror the comparison so the variable is on the left.
            match restrict_by_bound(right, mirror(op), bound) {
                Some(value) => state.store(name.clone(), value),
                None => return state.to_bottom(),
            }
        }
    }
    state
}

/// Restrict `value` to the part satisfying `value <op> bound`.
fn restrict_by_bound<T: SpecializeByConditional>(
    value: T,
    op: RelOpType,
    bound: i64,
) -> Option<T> {
    use RelOpType::*;
    match op {
        Less => value.add_less_equal_bound(bound.checked_sub(1)?),
        LessOrEqual => value.add_less_equal_bound(bound),
        Equal => value
            .add_less_equal_bound(bound)?
            .add_greater_equal_bound(bound),
        GreaterOrEqual => value.add_greater_equal_bound(bound),
        Greater => value.add_greater_equal_bound(bound.checked_add(1)?),
        NotEqual => value.add_not_equal_bound(bound),
    }
}

/// The comparison with its operands swapped.
fn mirror(op: RelOpType) -> RelOpType {
    use RelOpType::*;
    match op {
        Less => Greater,
        LessOrEqual => GreaterOrEqual,
        Equal => Equal,
        GreaterOrEqual => LessOrEqual,
        Greater => Less,
        NotEqual => NotEqual,
    }
}
