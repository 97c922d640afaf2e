//! Interpreters for the While language.
//!
//! [`interpreter`] contains the abstract interpretation engine, a family of
//! transfer functions parametric over an abstract domain. [`concrete`]
//! contains the concrete executor, which shares the shape of the engine but
//! computes on `i64` values and performs real input and output.

pub mod concrete;
pub mod interpreter;
