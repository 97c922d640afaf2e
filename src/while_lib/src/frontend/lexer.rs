use crate::prelude::*;

/// A lexical token together with its source position.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    /// The kind of the token, including its payload for numbers and identifiers.
    pub kind: TokenKind,
    /// 1-based source line of the first character.
    pub line: u32,
    /// 1-based source column of the first character.
    pub column: u32,
}

/// The kinds of tokens of the While language.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenKind {
    /// An integer literal.
    Number(i64),
    /// An identifier, i.e. a variable name.
    Ident(String),
    /// `skip`
    Skip,
    /// `if`
    If,
    /// `then`
    Then,
    /// `else`
    Else,
    /// `while`
    While,
    /// `do`
    Do,
    /// `print`
    Print,
    /// `input`
    Input,
    /// `true`
    True,
    /// `false`
    False,
    /// `not`
    Not,
    /// `and`
    And,
    /// `or`
    Or,
    /// `xor`
    Xor,
    /// `nand`
    Nand,
    /// `nor`
    Nor,
    /// `xnor`
    Xnor,
    /// `:=`
    Assign,
    /// `;`
    Semicolon,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `^`
    Caret,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
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
    /// End of input.
    Eof,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TokenKind::*;
        match self {
            Number(value) => write!(formatter, "{value}"),
            Ident(name) => write!(formatter, "{name}"),
            Skip => write!(formatter, "skip"),
            If => write!(formatter, "if"),
            Then => write!(formatter, "then"),
            Else => write!(formatter, "else"),
            While => write!(formatter, "while"),
            Do => write!(formatter, "do"),
            Print => write!(formatter, "print"),
            Input => write!(formatter, "input"),
            True => write!(formatter, "true"),
            False => write!(formatter, "false"),
            Not => write!(formatter, "not"),
            And => write!(formatter, "and"),
            Or => write!(formatter, "or"),
            Xor => write!(formatter, "xor"),
            Nand => write!(formatter, "nand"),
            Nor => write!(formatter, "nor"),
            Xnor => write!(formatter, "xnor"),
            Assign => write!(formatter, ":="),
            Semicolon => write!(formatter, ";"),
            Plus => write!(formatter, "+"),
            Minus => write!(formatter, "-"),
            Star => write!(formatter, "*"),
            Slash => write!(formatter, "/"),
            Percent => write!(formatter, "%"),
            Caret => write!(formatter, "^"),
            LeftParen => write!(formatter, "("),
            RightParen => write!(formatter, ")"),
            Less => write!(formatter, "<"),
            LessOrEqual => write!(formatter, "<="),
            Equal => write!(formatter, "="),
            GreaterOrEqual => write!(formatter, ">="),
            Greater => write!(formatter, ">"),
            NotEqual => write!(formatter, "<>"),
            Eof => write!(formatter, "end of input"),
        }
    }
}

pub struct Lexer<'src> {
    source: &'src [u8],
    pos: usize,
    line: u32,
    /// Byte offset of the first character of the current line.
    line_start: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            source: source.as_bytes(),
            pos: 0,
            line: 1,
            line_start: 0,
        }
    }

    /// Tokenize the whole input. The returned list ends with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                return Ok(tokens);
            }
        }
    }

    fn column(&self, pos: usize) -> u32 {
        (pos - self.line_start) as u32 + 1
    }

    fn make_token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            line: self.line,
            column: self.column(start),
        }
    }

    fn next_token(&mut self) -> Result<Token, Error> {
        self.skip_whitespace_and_comments();

        if self.pos >= self.source.len() {
            return Ok(self.make_token(TokenKind::Eof, self.pos));
        }

        let start = self.pos;
        let ch = self.source[self.pos];

        if ch.is_ascii_alphabetic() || ch == b'_' {
            return Ok(self.scan_ident_or_keyword());
        }
        if ch.is_ascii_digit() {
            return self.scan_number();
        }
        self.scan_symbol(start)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                if self.source[self.pos] == b'\n' {
                    self.line += 1;
                    self.line_start = self.pos + 1;
                }
                self.pos += 1;
            }
            if self.pos < self.source.len() && self.source[self.pos] == b'#' {
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            break;
        }
    }

    fn scan_ident_or_keyword(&mut self) -> Token {
        let start = self.pos;
        while self.pos < self.source.len()
            && (self.source[self.pos].is_ascii_alphanumeric() || self.source[self.pos] == b'_')
        {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap();
        let kind = match text {
            "skip" => TokenKind::Skip,
            "if" => TokenKind::If,
            "then" => TokenKind::Then,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "print" => TokenKind::Print,
            "input" => TokenKind::Input,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "not" => TokenKind::Not,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "xor" => TokenKind::Xor,
            "nand" => TokenKind::Nand,
            "nor" => TokenKind::Nor,
            "xnor" => TokenKind::Xnor,
            _ => TokenKind::Ident(text.to_string()),
        };
        self.make_token(kind, start)
    }

    fn scan_number(&mut self) -> Result<Token, Error> {
        let start = self.pos;
        while self.pos < self.source.len() && self.source[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap();
        let value = text.parse().with_context(|| {
            format!(
                "line {}, column {}: integer literal '{}' is out of range",
                self.line,
                self.column(start),
                text
            )
        })?;
        Ok(self.make_token(TokenKind::Number(value), start))
    }

    fn scan_symbol(&mut self, start: usize) -> Result<Token, Error> {
        let ch = self.source[self.pos];
        self.pos += 1;
        let peek = self.source.get(self.pos).copied();
        let kind = match ch {
            b';' => TokenKind::Semicolon,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            b'^' => TokenKind::Caret,
            b'(' => TokenKind::LeftParen,
            b')' => TokenKind::RightParen,
            b'=' => TokenKind::Equal,
            b':' if peek == Some(b'=') => {
                self.pos += 1;
                TokenKind::Assign
            }
            b'<' if peek == Some(b'=') => {
                self.pos += 1;
                TokenKind::LessOrEqual
            }
            b'<' if peek == Some(b'>') => {
                self.pos += 1;
                TokenKind::NotEqual
            }
            b'<' => TokenKind::Less,
            b'>' if peek == Some(b'=') => {
                self.pos += 1;
                TokenKind::GreaterOrEqual
            }
            b'>' => TokenKind::Greater,
            other => {
                return Err(anyhow!(
                    "line {}, column {}: unexpected character '{}'",
                    self.line,
                    self.column(start),
                    char::from(other)
                ))
            }
        };
        Ok(self.make_token(kind, start))
    }
}
