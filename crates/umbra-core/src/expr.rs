//! Closed-form expression language.
//!
//! Predicates are annotated with strings such as `(((x + 2) << 4) & 6) == 0`. The
//! numeric validator never trusts the chain data that produced such a string: it
//! re-parses the text here and evaluates the resulting tree in plain modular
//! arithmetic.
//!
//! Precedence, lowest first: `==`, `|`, `^`, `&`, `<<`/`>>`, `+`/`-`. Function calls
//! `rotl(a, b)` and `rotr(a, b)` are primaries.

use crate::operation::{OpKind, word_mask};
use crate::result::{Error, Result};
use std::fmt;

/// Parsed expression tree over the single input `x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Input,
    Literal(u64),
    Binary(OpKind, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Evaluates the tree for input `x` in `width`-bit arithmetic.
    pub fn eval(&self, x: u64, width: u32) -> u64 {
        match self {
            Expr::Input => x & word_mask(width),
            Expr::Literal(v) => v & word_mask(width),
            Expr::Binary(op, lhs, rhs) => op.apply(lhs.eval(x, width), rhs.eval(x, width), width),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Input => f.write_str("x"),
            Expr::Literal(v) => write!(f, "{v}"),
            Expr::Binary(OpKind::Rotl, l, r) => write!(f, "rotl({l}, {r})"),
            Expr::Binary(OpKind::Rotr, l, r) => write!(f, "rotr({l}, {r})"),
            Expr::Binary(op, l, r) => write!(f, "({l} {} {r})", symbol(*op)),
        }
    }
}

/// An `expr == constant` predicate as written in artifact annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedForm {
    pub expr: Expr,
    pub expected: Expr,
}

impl ClosedForm {
    /// Parses `lhs == rhs`; a leading `//` comment marker is accepted.
    pub fn parse(source: &str) -> Result<Self> {
        let text = source.trim();
        let text = text.strip_prefix("//").unwrap_or(text);
        let mut parser = Parser::new(text)?;
        let expr = parser.parse_bitor()?;
        parser.expect(Token::EqEq)?;
        let expected = parser.parse_bitor()?;
        parser.finish()?;
        Ok(Self { expr, expected })
    }

    /// Evaluates both sides for `x` and reports `(lhs, rhs)`.
    pub fn eval(&self, x: u64, width: u32) -> (u64, u64) {
        (self.expr.eval(x, width), self.expected.eval(x, width))
    }
}

/// Parses a bare expression (no `==`).
pub fn parse_expr(source: &str) -> Result<Expr> {
    let mut parser = Parser::new(source)?;
    let expr = parser.parse_bitor()?;
    parser.finish()?;
    Ok(expr)
}

fn symbol(op: OpKind) -> &'static str {
    match op {
        OpKind::Add => "+",
        OpKind::Sub => "-",
        OpKind::Shl => "<<",
        OpKind::Shr => ">>",
        OpKind::And => "&",
        OpKind::Or => "|",
        OpKind::Xor => "^",
        OpKind::Rotl => "rotl",
        OpKind::Rotr => "rotr",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Number(u64),
    Op(OpKind),
    EqEq,
    LParen,
    RParen,
    Comma,
}

struct Parser<'a> {
    raw: &'a str,
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(raw: &'a str) -> Result<Self> {
        Ok(Self {
            raw,
            tokens: tokenize(raw)?,
            pos: 0,
        })
    }

    fn error(&self, msg: impl Into<String>) -> Error {
        let offset = self
            .tokens
            .get(self.pos)
            .map_or(self.raw.len(), |(offset, _)| *offset);
        Error::ExpressionParse {
            pos: offset,
            msg: msg.into(),
            raw: self.raw.to_string(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, want: Token) -> Result<()> {
        match self.peek() {
            Some(t) if *t == want => {
                self.pos += 1;
                Ok(())
            }
            other => Err(self.error(format!("expected {want:?}, found {other:?}"))),
        }
    }

    fn finish(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(t) => Err(self.error(format!("trailing token {t:?}"))),
        }
    }

    /// Parses one left-associative precedence level.
    fn binary_level(
        &mut self,
        ops: &[OpKind],
        next: fn(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        let mut lhs = next(self)?;
        while let Some(Token::Op(op)) = self.peek() {
            let op = *op;
            if !ops.contains(&op) {
                break;
            }
            self.pos += 1;
            let rhs = next(self)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_bitor(&mut self) -> Result<Expr> {
        self.binary_level(&[OpKind::Or], Self::parse_bitxor)
    }

    fn parse_bitxor(&mut self) -> Result<Expr> {
        self.binary_level(&[OpKind::Xor], Self::parse_bitand)
    }

    fn parse_bitand(&mut self) -> Result<Expr> {
        self.binary_level(&[OpKind::And], Self::parse_shift)
    }

    fn parse_shift(&mut self) -> Result<Expr> {
        self.binary_level(&[OpKind::Shl, OpKind::Shr], Self::parse_additive)
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        self.binary_level(&[OpKind::Add, OpKind::Sub], Self::parse_primary)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.bump() {
            Some(Token::Number(v)) => Ok(Expr::Literal(v)),
            Some(Token::LParen) => {
                let inner = self.parse_bitor()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => match name.as_str() {
                "x" => Ok(Expr::Input),
                "rotl" | "rotr" => {
                    let op = if name == "rotl" {
                        OpKind::Rotl
                    } else {
                        OpKind::Rotr
                    };
                    self.expect(Token::LParen)?;
                    let value = self.parse_bitor()?;
                    self.expect(Token::Comma)?;
                    let amount = self.parse_bitor()?;
                    self.expect(Token::RParen)?;
                    Ok(Expr::Binary(op, Box::new(value), Box::new(amount)))
                }
                _ => {
                    self.pos -= 1;
                    Err(self.error(format!("unknown identifier '{name}'")))
                }
            },
            Some(other) => {
                self.pos -= 1;
                Err(self.error(format!("unexpected token {other:?}")))
            }
            None => Err(self.error("unexpected end of expression")),
        }
    }
}

fn tokenize(raw: &str) -> Result<Vec<(usize, Token)>> {
    let bytes = raw.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    let err = |pos: usize, msg: String| Error::ExpressionParse {
        pos,
        msg,
        raw: raw.to_string(),
    };

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        let two = bytes.get(i..i + 2);
        let token = match c {
            b' ' | b'\t' => {
                i += 1;
                continue;
            }
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b',' => Token::Comma,
            b'+' => Token::Op(OpKind::Add),
            b'-' => Token::Op(OpKind::Sub),
            b'&' => Token::Op(OpKind::And),
            b'|' => Token::Op(OpKind::Or),
            b'^' => Token::Op(OpKind::Xor),
            b'<' if two == Some(&b"<<"[..]) => Token::Op(OpKind::Shl),
            b'>' if two == Some(&b">>"[..]) => Token::Op(OpKind::Shr),
            b'=' if two == Some(&b"=="[..]) => Token::EqEq,
            b'0'..=b'9' => {
                let (value, len) = lex_number(&raw[i..]).map_err(|msg| err(start, msg))?;
                i += len;
                tokens.push((start, Token::Number(value)));
                continue;
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                let len = raw[i..]
                    .bytes()
                    .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
                    .count();
                tokens.push((start, Token::Ident(raw[i..i + len].to_string())));
                i += len;
                continue;
            }
            other => return Err(err(start, format!("unexpected character '{}'", other as char))),
        };
        i += match token {
            Token::Op(OpKind::Shl | OpKind::Shr) | Token::EqEq => 2,
            _ => 1,
        };
        tokens.push((start, token));
    }
    Ok(tokens)
}

/// Lexes a decimal or `0x` hexadecimal literal, returning `(value, consumed)`.
fn lex_number(s: &str) -> std::result::Result<(u64, usize), String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        let len = hex.bytes().take_while(u8::is_ascii_hexdigit).count();
        if len == 0 {
            return Err("empty hex literal".to_string());
        }
        let value = u64::from_str_radix(&hex[..len], 16).map_err(|e| e.to_string())?;
        return Ok((value, len + 2));
    }
    let len = s.bytes().take_while(u8::is_ascii_digit).count();
    let value = s[..len].parse::<u64>().map_err(|e| e.to_string())?;
    Ok((value, len))
}
