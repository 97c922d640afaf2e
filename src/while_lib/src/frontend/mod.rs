//! The frontend of the analyzer: lexing and parsing of While programs.
//!
//! The surface language has assignments, `skip`, sequential composition with
//! `;`, `if .. then .. else ..`, `while .. do ..`, `print` and `input`.
//! Branch and loop bodies are single statements; parentheses group sequences,
//! as in `while x < 10 do (x := x + 1; print x)`. Line comments start
//! with `#`.
//!
//! Parse errors carry the line and column of the offending token. An empty
//! program (or one containing only comments) parses to `skip`.

mod lexer;
mod parser;

pub use lexer::{Token, TokenKind};
pub use parser::parse;
