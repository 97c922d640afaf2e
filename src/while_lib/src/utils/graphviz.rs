//! Export of syntax trees to the Graphviz DOT format.
//!
//! The exported file can be compiled with `dot -Tpng -O <file>`.

use std::fmt::Write as _;

use crate::prelude::*;
use crate::syntax::{AExp, BExp, Stm, UnOpType};

/// Export the syntax tree of a program to `path` in Graphviz DOT format.
pub fn export_ast(program: &Stm, path: &str) -> Result<(), Error> {
    let dot = ast_to_dot(program).expect("writing to a string cannot fail");
    std::fs::write(path, dot).with_context(|| format!("Writing the AST to {path} failed"))
}

/// Render the syntax tree of a program as a `strict digraph`.
///
/// Every node carries the label of its syntactic construct; edges point from
/// parent to child. Node IDs are assigned during the traversal.
pub fn ast_to_dot(program: &Stm) -> Result<String, std::fmt::Error> {
    let mut dot = String::new();
    writeln!(dot, "strict digraph AST {{")?;
    writeln!(dot, "  splines = true;")?;
    writeln!(dot, "  layout  = dot;")?;
    writeln!(dot, "  node [fontname = \"Times\", style = \"solid\"];")?;
    writeln!(dot, "  edge [fontname = \"Times\", arrowhead = \"open\"];")?;
    writeln!(dot)?;
    let mut next_id = 0;
    write_stm(&mut dot, program, &mut next_id)?;
    writeln!(dot, "}}")?;
    Ok(dot)
}

/// Emit a node with the given label and return its ID.
fn write_node(dot: &mut String, label: &str, next_id: &mut usize) -> Result<usize, std::fmt::Error> {
    let id = *next_id;
    *next_id += 1;
    writeln!(dot, "  {id} [label=\"{label}\"]")?;
    Ok(id)
}

fn write_edge(dot: &mut String, parent: usize, child: usize) -> Result<(), std::fmt::Error> {
    writeln!(dot, "  {parent} -> {child}")
}

fn write_stm(dot: &mut String, statement: &Stm, next_id: &mut usize) -> Result<usize, std::fmt::Error> {
    match statement {
        Stm::Skip => write_node(dot, "skip", next_id),
        Stm::Assign { var, value } => {
            let id = write_node(dot, ":=", next_id)?;
            let var_id = write_node(dot, &format!("Var\\n{var}"), next_id)?;
            write_edge(dot, id, var_id)?;
            let value_id = write_aexp(dot, value, next_id)?;
            write_edge(dot, id, value_id)?;
            Ok(id)
        }
        Stm::Seq(first, second) => {
            let id = write_node(dot, ";", next_id)?;
            let first_id = write_stm(dot, first, next_id)?;
            write_edge(dot, id, first_id)?;
            let second_id = write_stm(dot, second, next_id)?;
            write_edge(dot, id, second_id)?;
            Ok(id)
        }
        Stm::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let id = write_node(dot, "if-then-else", next_id)?;
            let condition_id = write_bexp(dot, condition, next_id)?;
            write_edge(dot, id, condition_id)?;
            let then_id = write_stm(dot, then_branch, next_id)?;
            write_edge(dot, id, then_id)?;
            let else_id = write_stm(dot, else_branch, next_id)?;
            write_edge(dot, id, else_id)?;
            Ok(id)
        }
        Stm::While { condition, body } => {
            let id = write_node(dot, "while", next_id)?;
            let condition_id = write_bexp(dot, condition, next_id)?;
            write_edge(dot, id, condition_id)?;
            let body_id = write_stm(dot, body, next_id)?;
            write_edge(dot, id, body_id)?;
            Ok(id)
        }
        Stm::Print(value) => {
            let id = write_node(dot, "print", next_id)?;
            let value_id = write_aexp(dot, value, next_id)?;
            write_edge(dot, id, value_id)?;
            Ok(id)
        }
        Stm::Input(var) => {
            let id = write_node(dot, "input", next_id)?;
            let var_id = write_node(dot, &format!("Var\\n{var}"), next_id)?;
            write_edge(dot, id, var_id)?;
            Ok(id)
        }
    }
}

fn write_aexp(dot: &mut String, expression: &AExp, next_id: &mut usize) -> Result<usize, std::fmt::Error> {
    match expression {
        AExp::Const(value) => write_node(dot, &format!("Num\\n{value}"), next_id),
        AExp::Var(name) => write_node(dot, &format!("Var\\n{name}"), next_id),
        AExp::UnOp { op, arg } => {
            let symbol = match op {
                UnOpType::Identity => "+",
                UnOpType::Negate => "-",
            };
            let id = write_node(dot, &format!("AExp\\n{symbol}"), next_id)?;
            let arg_id = write_aexp(dot, arg, next_id)?;
            write_edge(dot, id, arg_id)?;
            Ok(id)
        }
        AExp::BinOp { op, lhs, rhs } => {
            let id = write_node(dot, &format!("AExp\\n{}", op.symbol()), next_id)?;
            let lhs_id = write_aexp(dot, lhs, next_id)?;
            write_edge(dot, id, lhs_id)?;
            let rhs_id = write_aexp(dot, rhs, next_id)?;
            write_edge(dot, id, rhs_id)?;
            Ok(id)
        }
    }
}

fn write_bexp(dot: &mut String, expression: &BExp, next_id: &mut usize) -> Result<usize, std::fmt::Error> {
    match expression {
        BExp::Const(value) => write_node(dot, &format!("Bool\\n{value}"), next_id),
        BExp::Not(inner) => {
            let id = write_node(dot, "BExp\\nnot", next_id)?;
            let inner_id = write_bexp(dot, inner, next_id)?;
            write_edge(dot, id, inner_id)?;
            Ok(id)
        }
        BExp::BoolOp { op, lhs, rhs } => {
            let id = write_node(dot, &format!("BExp\\n{}", op.symbol()), next_id)?;
            let lhs_id = write_bexp(dot, lhs, next_id)?;
            write_edge(dot, id, lhs_id)?;
            let rhs_id = write_bexp(dot, rhs, next_id)?;
            write_edge(dot, id, rhs_id)?;
            Ok(id)
        }
        BExp::Cmp { op, lhs, rhs } => {
            let id = write_node(dot, &format!("BExp\\n{}", op.symbol()), next_id)?;
            let lhs_id = write_aexp(dot, lhs, next_id)?;
            write_edge(dot, id, lhs_id)?;
            let rhs_id = write_aexp(dot, rhs, next_id)?;
            write_edge(dot, id, rhs_id)?;
            Ok(id)
        }
    }
}
