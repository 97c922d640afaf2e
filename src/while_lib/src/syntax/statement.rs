use std::fmt;

use super::{AExp, BExp};
use crate::prelude::*;

/// A statement of the While language.
///
/// A whole program is a single statement, typically a sequential composition.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone)]
pub enum Stm {
    /// The statement that does nothing.
    Skip,
    /// Assignment of the value of an arithmetic expression to a variable.
    Assign {
        /// The name of the assigned variable
        var: String,
        /// The assigned expression
        value: AExp,
    },
    /// Sequential composition of two statements.
    Seq(Box<Stm>, Box<Stm>),
    /// Conditional branch.
    If {
        /// The branch condition
        condition: BExp,
        /// The statement executed if the condition holds
        then_branch: Box<Stm>,
        /// The statement executed if the condition does not hold
        else_branch: Box<Stm>,
    },
    /// Loop executing `body` as long as `condition` holds.
    While {
        /// The loop condition
        condition: BExp,
        /// The loop body
        body: Box<Stm>,
    },
    /// Print the value of an arithmetic expression to the standard output.
    Print(AExp),
    /// Read an integer from the standard input into a variable.
    Input(String),
}

impl fmt::Display for Stm {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stm::Skip => write!(formatter, "skip"),
            Stm::Assign { var, value } => write!(formatter, "{var} := {value}"),
            Stm::Seq(first, second) => write!(formatter, "{first}; {second}"),
            Stm::If {
                condition,
                then_branch,
                else_branch,
            } => write!(
                formatter,
                "if {condition} then ({then_branch}) else ({else_branch})"
            ),
            Stm::While { condition, body } => {
                write!(formatter, "while {condition} do ({body})")
            }
            Stm::Print(value) => write!(formatter, "print {value}"),
            Stm::Input(var) => write!(formatter, "input {var}"),
        }
    }
}
