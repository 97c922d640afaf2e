//! The abstract syntax of the While language.
//!
//! A program is a single [`Stm`] produced by the [`frontend`](crate::frontend)
//! module. Statements, arithmetic expressions and boolean expressions are
//! separate sum types, so a node can only ever carry children of the category
//! its constructor demands.

mod expression;
pub use expression::*;

mod statement;
pub use statement::*;
