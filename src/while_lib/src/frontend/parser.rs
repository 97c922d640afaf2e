use std::sync::Arc;

use super::lexer::{Lexer, Token, TokenKind};
use crate::prelude::*;
use crate::syntax::{AExp, BExp, BinOpType, BoolOpType, RelOpType, Stm, UnOpType};

/// Parse a While program into its syntax tree.
///
/// An empty program (or one containing only comments) parses to `skip`.
pub fn parse(source: &str) -> Result<Stm, Error> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser { tokens, pos: 0 };
    parser.parse_program()
}

/// A recursive-descent parser over the token list.
///
/// The grammar needs one point of backtracking: at the start of a boolean
/// atom, a `(` can open either a parenthesized boolean expression or the
/// arithmetic left operand of a comparison. The parser first tries the
/// comparison and rewinds on failure.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn advance(&mut self) -> TokenKind {
        let token = self.tokens[self.pos].kind.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: &str) -> Error {
        let token = &self.tokens[self.pos];
        anyhow!(
            "line {}, column {}: expected {}, found '{}'",
            token.line,
            token.column,
            message,
            token.kind
        )
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<(), Error> {
        if *self.peek() == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    fn parse_program(&mut self) -> Result<Stm, Error> {
        if *self.peek() == TokenKind::Eof {
            return Ok(Stm::Skip);
        }
        let program = self.parse_stm()?;
        self.expect(TokenKind::Eof, "end of input")?;
        Ok(program)
    }

    /// `stm := stm_atom { ';' stm_atom } [';']`
    fn parse_stm(&mut self) -> Result<Stm, Error> {
        let mut statement = self.parse_stm_atom()?;
        while *self.peek() == TokenKind::Semicolon {
            self.advance();
            // A trailing semicolon before the end of the program or of a
            // parenthesized block is accepted.
            if matches!(self.peek(), TokenKind::Eof | TokenKind::RightParen) {
                break;
            }
            let next = self.parse_stm_atom()?;
            statement = Stm::Seq(Box::new(statement), Box::new(next));
        }
        Ok(statement)
    }

    fn parse_stm_atom(&mut self) -> Result<Stm, Error> {
        match self.peek().clone() {
            TokenKind::Skip => {
                self.advance();
                Ok(Stm::Skip)
            }
            TokenKind::Print => {
                self.advance();
                Ok(Stm::Print(self.parse_aexp()?))
            }
            TokenKind::Input => {
                self.advance();
                match self.advance() {
                    TokenKind::Ident(name) => Ok(Stm::Input(name)),
                    _ => Err(self.error("a variable name after 'input'")),
                }
            }
            TokenKind::If => {
                self.advance();
                let condition = self.parse_bexp()?;
                self.expect(TokenKind::Then, "'then'")?;
                let then_branch = self.parse_stm_atom()?;
                self.expect(TokenKind::Else, "'else'")?;
                let else_branch = self.parse_stm_atom()?;
                Ok(Stm::If {
                    condition,
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                })
            }
            TokenKind::While => {
                self.advance();
                let condition = self.parse_bexp()?;
                self.expect(TokenKind::Do, "'do'")?;
                let body = self.parse_stm_atom()?;
                Ok(Stm::While {
                    condition,
                    body: Box::new(body),
                })
            }
            TokenKind::Ident(name) => {
                self.advance();
                self.expect(TokenKind::Assign, "':='")?;
                let value = self.parse_aexp()?;
                Ok(Stm::Assign { var: name, value })
            }
            TokenKind::LeftParen => {
                self.advance();
                let statement = self.parse_stm()?;
                self.expect(TokenKind::RightParen, "')'")?;
                Ok(statement)
            }
            _ => Err(self.error("a statement")),
        }
    }

    /// `bexp := bterm { ('or'|'nor') bterm }`
    fn parse_bexp(&mut self) -> Result<BExp, Error> {
        let mut expression = self.parse_bterm()?;
        loop {
            let op = match self.peek() {
                TokenKind::Or => BoolOpType::Or,
                TokenKind::Nor => BoolOpType::Nor,
                _ => return Ok(expression),
            };
            self.advance();
            let rhs = self.parse_bterm()?;
            expression = BExp::BoolOp {
                op,
                lhs: Arc::new(expression),
                rhs: Arc::new(rhs),
            };
        }
    }

    /// `bterm := bfact { ('xor'|'xnor') bfact }`
    fn parse_bterm(&mut self) -> Result<BExp, Error> {
        let mut expression = self.parse_bfact()?;
        loop {
            let op = match self.peek() {
                TokenKind::Xor => BoolOpType::Xor,
                TokenKind::Xnor => BoolOpType::Xnor,
                _ => return Ok(expression),
            };
            self.advance();
            let rhs = self.parse_bfact()?;
            expression = BExp::BoolOp {
                op,
                lhs: Arc::new(expression),
                rhs: Arc::new(rhs),
            };
        }
    }

    /// `bfact := bunary { ('and'|'nand') bunary }`
    fn parse_bfact(&mut self) -> Result<BExp, Error> {
        let mut expression = self.parse_bunary()?;
        loop {
            let op = match self.peek() {
                TokenKind::And => BoolOpType::And,
                TokenKind::Nand => BoolOpType::Nand,
                _ => return Ok(expression),
            };
            self.advance();
            let rhs = self.parse_bunary()?;
            expression = BExp::BoolOp {
                op,
                lhs: Arc::new(expression),
                rhs: Arc::new(rhs),
            };
        }
    }

    /// `bunary := 'not' bunary | batom`
    fn parse_bunary(&mut self) -> Result<BExp, Error> {
        if *self.peek() == TokenKind::Not {
            self.advance();
            Ok(BExp::Not(Arc::new(self.parse_bunary()?)))
        } else {
            self.parse_batom()
        }
    }

    /// `batom := 'true' | 'false' | aexp relop aexp | '(' bexp ')'`
    fn parse_batom(&mut self) -> Result<BExp, Error> {
        match self.peek() {
            TokenKind::True => {
                self.advance();
                return Ok(BExp::Const(true));
            }
            TokenKind::False => {
                self.advance();
                return Ok(BExp::Const(false));
            }
            _ => (),
        }
        // A '(' may open a parenthesized boolean expression or the left
        // operand of a comparison; try the comparison first and rewind.
        let saved = self.pos;
        if let Ok(lhs) = self.parse_aexp() {
            if let Some(op) = self.peek_relop() {
                self.advance();
                let rhs = self.parse_aexp()?;
                return Ok(BExp::Cmp {
                    op,
                    lhs: Arc::new(lhs),
                    rhs: Arc::new(rhs),
                });
            }
        }
        self.pos = saved;
        self.expect(TokenKind::LeftParen, "a boolean expression")?;
        let expression = self.parse_bexp()?;
        self.expect(TokenKind::RightParen, "')'")?;
        Ok(expression)
    }

    fn peek_relop(&self) -> Option<RelOpType> {
        match self.peek() {
            TokenKind::Less => Some(RelOpType::Less),
            TokenKind::LessOrEqual => Some(RelOpType::LessOrEqual),
            TokenKind::Equal => Some(RelOpType::Equal),
            TokenKind::GreaterOrEqual => Some(RelOpType::GreaterOrEqual),
            TokenKind::Greater => Some(RelOpType::Greater),
            TokenKind::NotEqual => Some(RelOpType::NotEqual),
            _ => None,
        }
    }

    /// `aexp := term { ('+'|'-') term }`
    fn parse_aexp(&mut self) -> Result<AExp, Error> {
        let mut expression = self.parse_term()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinOpType::Add,
                TokenKind::Minus => BinOpType::Sub,
                _ => return Ok(expression),
            };
            self.advance();
            let rhs = self.parse_term()?;
            expression = AExp::BinOp {
                op,
                lhs: Arc::new(expression),
                rhs: Arc::new(rhs),
            };
        }
    }

    /// `term := factor { ('*'|'/'|'%') factor }`
    fn parse_term(&mut self) -> Result<AExp, Error> {
        let mut expression = self.parse_factor()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinOpType::Mul,
                TokenKind::Slash => BinOpType::Div,
                TokenKind::Percent => BinOpType::Rem,
                _ => return Ok(expression),
            };
            self.advance();
            let rhs = self.parse_factor()?;
            expression = AExp::BinOp {
                op,
                lhs: Arc::new(expression),
                rhs: Arc::new(rhs),
            };
        }
    }

    /// `factor := ('+'|'-') factor | power`
    fn parse_factor(&mut self) -> Result<AExp, Error> {
        match self.peek() {
            TokenKind::Plus => {
                self.advance();
                Ok(AExp::UnOp {
                    op: UnOpType::Identity,
                    arg: Arc::new(self.parse_factor()?),
                })
            }
            TokenKind::Minus => {
                self.advance();
                Ok(AExp::UnOp {
                    op: UnOpType::Negate,
                    arg: Arc::new(self.parse_factor()?),
                })
            }
            _ => self.parse_power(),
        }
    }

    /// `power := atom [ '^' factor ]`, right-associative
    fn parse_power(&mut self) -> Result<AExp, Error> {
        let base = self.parse_atom()?;
        if *self.peek() == TokenKind::Caret {
            self.advance();
            let exponent = self.parse_factor()?;
            Ok(AExp::BinOp {
                op: BinOpType::Pow,
                lhs: Arc::new(base),
                rhs: Arc::new(exponent),
            })
        } else {
            Ok(base)
        }
    }

    /// `atom := number | ident | '(' aexp ')'`
    fn parse_atom(&mut self) -> Result<AExp, Error> {
        match self.peek().clone() {
            TokenKind::Number(value) => {
                self.advance();
                Ok(AExp::Const(value))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(AExp::Var(name))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expression = self.parse_aexp()?;
                self.expect(TokenKind::RightParen, "')'")?;
                Ok(expression)
            }
            _ => Err(self.error("an arithmetic expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_assignments_and_sequences() {
        let program = parse("x := 5; y := x + 3").unwrap();
        assert_eq!(program.to_string(), "x := 5; y := (x + 3)");
    }

    #[test]
    fn empty_programs_parse_to_skip() {
        assert_eq!(parse("").unwrap(), Stm::Skip);
        assert_eq!(parse("# only a comment\n").unwrap(), Stm::Skip);
    }

    #[test]
    fn operator_precedence() {
        let program = parse("x := 1 + 2 * 3").unwrap();
        assert_eq!(program.to_string(), "x := (1 + (2 * 3))");
        let program = parse("x := (1 + 2) * 3").unwrap();
        assert_eq!(program.to_string(), "x := ((1 + 2) * 3)");
        // Exponentiation binds tighter than multiplication
        // and is right-associative.
        let program = parse("x := 2 * 3 ^ 2 ^ 2").unwrap();
        assert_eq!(program.to_string(), "x := (2 * (3 ^ (2 ^ 2)))");
    }

    #[test]
    fn unary_operators() {
        let program = parse("x := -y + +1").unwrap();
        assert_eq!(program.to_string(), "x := (-y + +1)");
    }

    #[test]
    fn boolean_precedence() {
        let program = parse("if a < 1 or b < 2 and c < 3 then skip else skip").unwrap();
        assert_eq!(
            program.to_string(),
            "if (a < 1 or (b < 2 and c < 3)) then (skip) else (skip)"
        );
    }

    #[test]
    fn parenthesized_booleans_backtrack() {
        // '(' may open an arithmetic operand...
        let program = parse("if (x + 1) < 2 then skip else skip").unwrap();
        assert_eq!(
            program.to_string(),
            "if (x + 1) < 2 then (skip) else (skip)"
        );
        // ...or a parenthesized boolean expression.
        let program = parse("if (x < 1 and true) or false then skip else skip").unwrap();
        assert_eq!(
            program.to_string(),
            "if ((x < 1 and true) or false) then (skip) else (skip)"
        );
    }

    #[test]
    fn loop_bodies_are_single_statements() {
        let program = parse("while x < 2 do x := x + 1; y := 0").unwrap();
        assert!(matches!(program, Stm::Seq(_, _)));
        let program = parse("while x < 2 do (x := x + 1; y := 0)").unwrap();
        assert!(matches!(program, Stm::While { .. }));
    }

    #[test]
    fn trailing_semicolons_are_accepted() {
        assert!(parse("x := 1;").is_ok());
        assert!(parse("while x < 2 do (x := x + 1;)").is_ok());
    }

    #[test]
    fn parse_errors_carry_positions() {
        let error = parse("x := ;").unwrap_err();
        assert!(error.to_string().contains("line 1"));
        assert!(error.to_string().contains("arithmetic expression"));
        let error = parse("if x < 1 then skip").unwrap_err();
        assert!(error.to_string().contains("'else'"));
        let error = parse("x + 1").unwrap_err();
        assert!(error.to_string().contains("':='"));
    }

    #[test]
    fn programs_with_every_connective_parse() {
        let source = "if a < 1 nand b < 2 then skip else \
                      (if c < 3 nor d < 4 then skip else \
                      (if e < 5 xnor f < 6 then skip else skip))";
        assert!(parse(source).is_ok());
    }
}
