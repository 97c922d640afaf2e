use std::fmt;
use std::sync::Arc;

use crate::prelude::*;

/// The opcodes of binary arithmetic operations.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum BinOpType {
    /// Addition
    Add,
    /// Subtraction
    Sub,
    /// Multiplication
    Mul,
    /// Truncating integer division
    Div,
    /// Remainder of the integer division
    Rem,
    /// Integer exponentiation. Exponents less than one yield `1`.
    Pow,
}

impl BinOpType {
    /// The surface syntax of the operation.
    pub fn symbol(self) -> &'static str {
        use BinOpType::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Rem => "%",
            Pow => "^",
        }
    }
}

/// The opcodes of unary arithmetic operations.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum UnOpType {
    /// The identity (unary plus).
    Identity,
    /// The opposite (unary minus).
    Negate,
}

/// The opcodes of comparisons between arithmetic expressions.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum RelOpType {
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
    /// `=`
    Equal,
    /// `>=`
    GreaterOrEqual,
    /// `>`
    Greater,
    /// `<>`
    NotEqual,
}

impl RelOpType {
    /// The comparison denoting the logical complement.
    ///
    /// Comparisons come in complementary pairs, so negating one is a plain
    /// opcode swap.
    pub fn negate(self) -> RelOpType {
        use RelOpType::*;
        match self {
            Less => GreaterOrEqual,
            LessOrEqual => Greater,
            Equal => NotEqual,
            GreaterOrEqual => Less,
            Greater => LessOrEqual,
            NotEqual => Equal,
        }
    }

    /// The surface syntax of the comparison.
    pub fn symbol(self) -> &'static str {
        use RelOpType::*;
        match self {
            Less => "<",
            LessOrEqual => "<=",
            Equal => "=",
            GreaterOrEqual => ">=",
            Greater => ">",
            NotEqual => "<>",
        }
    }

    /// Evaluate the comparison on two concrete values.
    pub fn eval(self, lhs: i64, rhs: i64) -> bool {
        use RelOpType::*;
        match self {
            Less => lhs < rhs,
            LessOrEqual => lhs <= rhs,
            Equal => lhs == rhs,
            GreaterOrEqual => lhs >= rhs,
            Greater => lhs > rhs,
            NotEqual => lhs != rhs,
        }
    }
}

/// The opcodes of binary boolean connectives.
///
/// Every connective has a negated counterpart, so the complement of a
/// boolean expression is again a single node (see [`BExp::negate`]).
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum BoolOpType {
    /// Logical conjunction
    And,
    /// Logical disjunction
    Or,
    /// Exclusive disjunction
    Xor,
    /// Negated conjunction
    Nand,
    /// Negated disjunction
    Nor,
    /// Negated exclusive disjunction
    Xnor,
}

impl BoolOpType {
    /// The connective denoting the logical complement.
    pub fn negate(self) -> BoolOpType {
        use BoolOpType::*;
        match self {
            And => Nand,
            Or => Nor,
            Xor => Xnor,
            Nand => And,
            Nor => Or,
            Xnor => Xor,
        }
    }

    /// The surface syntax of the connective.
    pub fn symbol(self) -> &'static str {
        use BoolOpType::*;
        match self {
            And => "and",
            Or => "or",
            Xor => "xor",
            Nand => "nand",
            Nor => "nor",
            Xnor => "xnor",
        }
    }
}

/// An arithmetic expression.
///
/// Children are held behind shared-ownership pointers so that rewrites like
/// [`BExp::negate`] can produce new nodes that share their operands with the
/// original tree.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone)]
pub enum AExp {
    /// A constant integer value.
    Const(i64),
    /// A program variable.
    Var(String),
    /// A unary operation.
    UnOp {
        /// The opcode of the operation
        op: UnOpType,
        /// The operand
        arg: Arc<AExp>,
    },
    /// A binary operation.
    BinOp {
        /// The opcode of the operation
        op: BinOpType,
        /// The left operand
        lhs: Arc<AExp>,
        /// The right operand
        rhs: Arc<AExp>,
    },
}

impl AExp {
    /// If the expression contains no variables, evaluate it concretely.
    ///
    /// Returns `None` for expressions reading variables and for expressions
    /// whose evaluation has no defined result (division by zero).
    pub fn try_const_eval(&self) -> Option<i64> {
        match self {
            AExp::Const(value) => Some(*value),
            AExp::Var(_) => None,
            AExp::UnOp { op, arg } => {
                let arg = arg.try_const_eval()?;
                match op {
                    UnOpType::Identity => Some(arg),
                    UnOpType::Negate => Some(arg.wrapping_neg()),
                }
            }
            AExp::BinOp { op, lhs, rhs } => {
                let lhs = lhs.try_const_eval()?;
                let rhs = rhs.try_const_eval()?;
                use BinOpType::*;
                match op {
                    Add => Some(lhs.wrapping_add(rhs)),
                    Sub => Some(lhs.wrapping_sub(rhs)),
                    Mul => Some(lhs.wrapping_mul(rhs)),
                    Div => (rhs != 0).then(|| lhs.wrapping_div(rhs)),
                    Rem => (rhs != 0).then(|| lhs.wrapping_rem(rhs)),
                    Pow => Some(lhs.wrapping_pow(rhs.clamp(0, u32::MAX as i64) as u32)),
                }
            }
        }
    }
}

impl fmt::Display for AExp {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AExp::Const(value) => write!(formatter, "{value}"),
            AExp::Var(name) => write!(formatter, "{name}"),
            AExp::UnOp { op, arg } => match op {
                UnOpType::Identity => write!(formatter, "+{arg}"),
                UnOpType::Negate => write!(formatter, "-{arg}"),
            },
            AExp::BinOp { op, lhs, rhs } => {
                write!(formatter, "({lhs} {} {rhs})", op.symbol())
            }
        }
    }
}

/// A boolean expression or comparison.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone)]
pub enum BExp {
    /// A constant boolean value.
    Const(bool),
    /// Logical negation.
    Not(Arc<BExp>),
    /// A binary boolean connective.
    BoolOp {
        /// The opcode of the connective
        op: BoolOpType,
        /// The left operand
        lhs: Arc<BExp>,
        /// The right operand
        rhs: Arc<BExp>,
    },
    /// A comparison between two arithmetic expressions.
    Cmp {
        /// The opcode of the comparison
        op: RelOpType,
        /// The left operand
        lhs: Arc<AExp>,
        /// The right operand
        rhs: Arc<AExp>,
    },
}

impl BExp {
    /// Return the expression denoting the logical complement of `self`.
    ///
    /// The rewrite touches only the root node: constants are flipped,
    /// `not b` unwraps to `b`, and comparisons and connectives swap to their
    /// paired opcode while sharing their operands with `self`. In particular
    /// the function never recurses into operands, so it is O(1) per call.
    pub fn negate(&self) -> BExp {
        match self {
            BExp::Const(value) => BExp::Const(!value),
            BExp::Not(inner) => (**inner).clone(),
            BExp::BoolOp { op, lhs, rhs } => BExp::BoolOp {
                op: op.negate(),
                lhs: lhs.clone(),
                rhs: rhs.clone(),
            },
            BExp::Cmp { op, lhs, rhs } => BExp::Cmp {
                op: op.negate(),
                lhs: lhs.clone(),
                rhs: rhs.clone(),
            },
        }
    }
}

impl fmt::Display for BExp {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BExp::Const(value) => write!(formatter, "{value}"),
            BExp::Not(inner) => write!(formatter, "not {inner}"),
            BExp::BoolOp { op, lhs, rhs } => {
                write!(formatter, "({lhs} {} {rhs})", op.symbol())
            }
            BExp::Cmp { op, lhs, rhs } => {
                write!(formatter, "{lhs} {} {rhs}", op.symbol())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Arc<AExp> {
        Arc::new(AExp::Var(name.to_string()))
    }

    #[test]
    fn negation_is_an_involution() {
        let comparisons = [
            RelOpType::Less,
            RelOpType::LessOrEqual,
            RelOpType::Equal,
            RelOpType::GreaterOrEqual,
            RelOpType::Greater,
            RelOpType::NotEqual,
        ];
        for op in comparisons {
            let cmp = BExp::Cmp {
                op,
                lhs: var("x"),
                rhs: var("y"),
            };
            assert_eq!(cmp.negate().negate(), cmp);
        }
        let connectives = [
            BoolOpType::And,
            BoolOpType::Or,
            BoolOpType::Xor,
            BoolOpType::Nand,
            BoolOpType::Nor,
            BoolOpType::Xnor,
        ];
        for op in connectives {
            let conn = BExp::BoolOp {
                op,
                lhs: Arc::new(BExp::Const(true)),
                rhs: Arc::new(BExp::Const(false)),
            };
            assert_eq!(conn.negate().negate(), conn);
        }
        assert_eq!(BExp::Const(true).negate(), BExp::Const(false));
        assert_eq!(BExp::Const(true).negate().negate(), BExp::Const(true));
    }

    #[test]
    fn negating_not_unwraps_the_operand() {
        let cmp = BExp::Cmp {
            op: RelOpType::Less,
            lhs: var("x"),
            rhs: Arc::new(AExp::Const(10)),
        };
        let negated = BExp::Not(Arc::new(cmp.clone())).negate();
        assert_eq!(negated, cmp);
    }

    #[test]
    fn negation_shares_operands() {
        let lhs = var("x");
        let rhs = var("y");
        let cmp = BExp::Cmp {
            op: RelOpType::Less,
            lhs: lhs.clone(),
            rhs: rhs.clone(),
        };
        if let BExp::Cmp {
            lhs: negated_lhs, ..
        } = cmp.negate()
        {
            assert!(Arc::ptr_eq(&lhs, &negated_lhs));
        } else {
            panic!("negating a comparison must yield a comparison");
        }
    }

    #[test]
    fn constant_folding() {
        let expression = AExp::BinOp {
            op: BinOpType::Mul,
            lhs: Arc::new(AExp::Const(6)),
            rhs: Arc::new(AExp::BinOp {
                op: BinOpType::Add,
                lhs: Arc::new(AExp::Const(3)),
                rhs: Arc::new(AExp::Const(4)),
            }),
        };
        assert_eq!(expression.try_const_eval(), Some(42));
        assert_eq!(var("x").try_const_eval(), None);
        let division_by_zero = AExp::BinOp {
            op: BinOpType::Div,
            lhs: Arc::new(AExp::Const(1)),
            rhs: Arc::new(AExp::Const(0)),
        };
        assert_eq!(division_by_zero.try_const_eval(), None);
    }
}
