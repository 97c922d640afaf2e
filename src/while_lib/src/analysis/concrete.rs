//! The concrete executor.
//!
//! Identical in shape to the abstract engine, but computing on `i64` values:
//! branches take exactly one side, loops iterate natively (and may diverge,
//! faithfully reproducing the program's semantics), `print` writes to the
//! output channel and `input` reads from the input channel.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{BufRead, Write};

use itertools::Itertools as _;

use crate::prelude::*;
use crate::syntax::{AExp, BExp, BinOpType, BoolOpType, Stm, UnOpType};

/// A concrete program state mapping variables to integer values.
///
/// Unbound variables read as `0`.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct ConcreteState {
    bindings: BTreeMap<String, i64>,
}

impl ConcreteState {
    /// Create an empty state.
    pub fn new() -> Self {
        ConcreteState::default()
    }

    /// Returns the value of `var`, or `0` if `var` is unbound.
    pub fn load(&self, var: &str) -> i64 {
        self.bindings.get(var).copied().unwrap_or(0)
    }

    /// Bind `var` to `value`, inserting or overwriting.
    pub fn store(&mut self, var: impl Into<String>, value: i64) {
        self.bindings.insert(var.into(), value);
    }

    /// Iterate over the bindings in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &i64)> {
        self.bindings.iter()
    }
}

impl fmt::Display for ConcreteState {
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

/// Execute a whole program from the empty state,
/// reading from standard input and writing to standard output.
pub fn execute_program(program: &Stm) -> Result<ConcreteState, Error> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    execute(
        program,
        ConcreteState::new(),
        &mut stdin.lock(),
        &mut stdout.lock(),
    )
}

/// Execute a statement in the given state.
///
/// The input and output channels are parameters so that tests can script the
/// `input` statement and observe `print`. Division or remainder by zero
/// aborts the execution with an error; a malformed line on `input` is
/// reported to standard error and read as `0`.
pub fn execute<R: BufRead + ?Sized, W: Write + ?Sized>(
    statement: &Stm,
    state: ConcreteState,
    input: &mut R,
    output: &mut W,
) -> Result<ConcreteState, Error> {
    match statement {
        Stm::Skip => Ok(state),
        Stm::Assign { var, value } => {
            let mut state = state;
            let value = eval(value, &state)?;
            state.store(var.clone(), value);
            Ok(state)
        }
        Stm::Seq(first, second) => {
            execute(second, execute(first, state, input, output)?, input, output)
        }
        Stm::If {
            condition,
            then_branch,
            else_branch,
        } => {
            if eval_condition(condition, &state)? {
                execute(then_branch, state, input, output)
            } else {
                execute(else_branch, state, input, output)
            }
        }
        Stm::While { condition, body } => {
            let mut state = state;
            while eval_condition(condition, &state)? {
                state = execute(body, state, input, output)?;
            }
            Ok(state)
        }
        Stm::Print(value) => {
            let value = eval(value, &state)?;
            writeln!(output, "{value}").context("Writing to the output channel failed")?;
            Ok(state)
        }
        Stm::Input(var) => {
            let mut state = state;
            write!(output, "> {var} := ").context("Writing to the output channel failed")?;
            output
                .flush()
                .context("Writing to the output channel failed")?;
            let mut line = String::new();
            let value = match input.read_line(&mut line) {
                Ok(_) => line.trim().parse().unwrap_or_else(|_| {
                    eprintln!("[input] '{}' is not an integer, reading 0", line.trim());
                    0
                }),
                Err(error) => {
                    eprintln!("[input] reading a value for {var} failed ({error}), reading 0");
                    0
                }
            };
            state.store(var.clone(), value);
            Ok(state)
        }
    }
}

/// Evaluate an arithmetic expression in the given state.
pub fn eval(expression: &AExp, state: &ConcreteState) -> Result<i64, Error> {
    match expression {
        AExp::Const(value) => Ok(*value),
        AExp::Var(name) => Ok(state.load(name)),
        AExp::UnOp { op, arg } => {
            let arg = eval(arg, state)?;
            match op {
                UnOpType::Identity => Ok(arg),
                UnOpType::Negate => Ok(arg.wrapping_neg()),
            }
        }
        AExp::BinOp { op, lhs, rhs } => {
            let left = eval(lhs, state)?;
            let right = eval(rhs, state)?;
            use BinOpType::*;
            match op {
                Add => Ok(left.wrapping_add(right)),
                Sub => Ok(left.wrapping_sub(right)),
                Mul => Ok(left.wrapping_mul(right)),
                Div => {
                    if right == 0 {
                        Err(anyhow!("division by zero in '{expression}'"))
                    } else {
                        Ok(left.wrapping_div(right))
                    }
                }
                Rem => {
                    if right == 0 {
                        Err(anyhow!("remainder by zero in '{expression}'"))
                    } else {
                        Ok(left.wrapping_rem(right))
                    }
                }
                // Exponents less than one yield 1.
                Pow => Ok(left.wrapping_pow(right.clamp(0, u32::MAX as i64) as u32)),
            }
        }
    }
}

/// Evaluate a boolean expression in the given state.
pub fn eval_condition(condition: &BExp, state: &ConcreteState) -> Result<bool, Error> {
    match condition {
        BExp::Const(value) => Ok(*value),
        BExp::Not(inner) => Ok(!eval_condition(inner, state)?),
        BExp::BoolOp { op, lhs, rhs } => {
            let left = eval_condition(lhs, state)?;
            let right = eval_condition(rhs, state)?;
            use BoolOpType::*;
            Ok(match op {
                And => left && right,
                Or => left || right,
                Xor => left ^ right,
                Nand => !(left && right),
                Nor => !(left || right),
                Xnor => !(left ^ right),
            })
        }
        BExp::Cmp { op, lhs, rhs } => {
            let left = eval(lhs, state)?;
            let right = eval(rhs, state)?;
            Ok(op.eval(left, right))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse;

    fn run(source: &str, input: &str) -> (ConcreteState, String) {
        let program = parse(source).unwrap();
        let mut output = Vec::new();
        let state = execute(
            &program,
            ConcreteState::new(),
            &mut input.as_bytes(),
            &mut output,
        )
        .unwrap();
        (state, String::from_utf8(output).unwrap())
    }

    #[test]
    fn assignment_and_arithmetic() {
        let (state, _) = run("x := 5; y := x + 3", "");
        assert_eq!(state.load("x"), 5);
        assert_eq!(state.load("y"), 8);
    }

    #[test]
    fn loops_iterate_natively() {
        let (state, _) = run("x := 0; while x < 10 do x := x + 1", "");
        assert_eq!(state.load("x"), 10);
    }

    #[test]
    fn branches_take_exactly_one_side() {
        let (state, _) = run("if 1 < 2 then x := 1 else x := -1", "");
        assert_eq!(state.load("x"), 1);
    }

    #[test]
    fn print_writes_to_the_output_channel() {
        let (_, output) = run("x := 6; print x * 7", "");
        assert_eq!(output, "42\n");
    }

    #[test]
    fn input_reads_from_the_input_channel() {
        let (state, output) = run("input x; y := x * 2", "21\n");
        assert_eq!(state.load("x"), 21);
        assert_eq!(state.load("y"), 42);
        assert_eq!(output, "> x := ");
    }

    #[test]
    fn malformed_input_reads_zero() {
        let (state, _) = run("input x", "not a number\n");
        assert_eq!(state.load("x"), 0);
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let program = parse("x := 10; y := x / 0").unwrap();
        let result = execute(
            &program,
            ConcreteState::new(),
            &mut "".as_bytes(),
            &mut Vec::<u8>::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn exponentiation_follows_the_multiply_loop() {
        let (state, _) = run("x := 2 ^ 10; y := 2 ^ -3; z := 0 ^ 0", "");
        assert_eq!(state.load("x"), 1024);
        assert_eq!(state.load("y"), 1);
        assert_eq!(state.load("z"), 1);
    }

    #[test]
    fn remainder_follows_the_dividend_sign() {
        let (state, _) = run("x := -7 % 3; y := 7 % 3", "");
        assert_eq!(state.load("x"), -1);
        assert_eq!(state.load("y"), 1);
    }
}
