//! Recursive-descent parser for the `Plural-Forms` expression grammar:
//!
//! ```text
//! expr   := or
//! or     := and ("||" and)*
//! and    := cmp ("&&" cmp)*
//! cmp    := arith OP arith         OP ∈ {==,!=,<,<=,>,>=}
//! arith  := term ("%" term)*
//! term   := INT | "n" | "(" expr ")"
//! ```
//!
//! The host language's own expression parser isn't available here, so this
//! is a small hand-rolled recursive descent rather than a borrowed library.

use crate::error::{Error, Result};
use crate::plural::ast::{CmpOp, Expr};

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Int(i64),
    Var,
    LParen,
    RParen,
    Percent,
    AndAnd,
    OrOr,
    Cmp(CmpOp),
    Eof,
}

fn tokenize(source: &str) -> Result<Vec<Tok>> {
    let mut out = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        macro_rules! two {
            ($next:expr, $tok:expr) => {
                if chars.get(i + 1) == Some(&$next) {
                    out.push($tok);
                    i += 2;
                    continue;
                }
            };
        }
        match c {
            '(' => {
                out.push(Tok::LParen);
                i += 1;
            }
            ')' => {
                out.push(Tok::RParen);
                i += 1;
            }
            '%' => {
                out.push(Tok::Percent);
                i += 1;
            }
            '&' => {
                two!('&', Tok::AndAnd);
                return Err(Error::format(format!("invalid expression: stray '&' at {i}")));
            }
            '|' => {
                two!('|', Tok::OrOr);
                return Err(Error::format(format!("invalid expression: stray '|' at {i}")));
            }
            '=' => {
                two!('=', Tok::Cmp(CmpOp::Eq));
                return Err(Error::format(format!("invalid expression: stray '=' at {i}")));
            }
            '!' => {
                two!('=', Tok::Cmp(CmpOp::Ne));
                return Err(Error::format(format!("invalid expression: stray '!' at {i}")));
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    out.push(Tok::Cmp(CmpOp::Le));
                    i += 2;
                } else {
                    out.push(Tok::Cmp(CmpOp::Lt));
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    out.push(Tok::Cmp(CmpOp::Ge));
                    i += 2;
                } else {
                    out.push(Tok::Cmp(CmpOp::Gt));
                    i += 1;
                }
            }
            'n' => {
                out.push(Tok::Var);
                i += 1;
            }
            '0'..='9' => {
                let start = i;
                while chars.get(i).is_some_and(|d| d.is_ascii_digit()) {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value: i64 = text
                    .parse()
                    .map_err(|_| Error::format(format!("invalid integer literal {text:?}")))?;
                out.push(Tok::Int(value));
            }
            other => {
                return Err(Error::format(format!(
                    "invalid expression: unexpected character {other:?}"
                )));
            }
        }
    }
    out.push(Tok::Eof);
    Ok(out)
}

struct Parser {
    tokens: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Tok {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Tok {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, tok: &Tok) -> Result<()> {
        if self.peek() == tok {
            self.advance();
            Ok(())
        } else {
            Err(Error::format(format!(
                "invalid expression: expected {tok:?}, found {:?}",
                self.peek()
            )))
        }
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_and()?;
        while *self.peek() == Tok::OrOr {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_cmp()?;
        while *self.peek() == Tok::AndAnd {
            self.advance();
            let rhs = self.parse_cmp()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_cmp(&mut self) -> Result<Expr> {
        let lhs = self.parse_arith()?;
        if let Tok::Cmp(op) = *self.peek() {
            self.advance();
            let rhs = self.parse_arith()?;
            Ok(Expr::Cmp(op, Box::new(lhs), Box::new(rhs)))
        } else {
            Err(Error::format(format!(
                "invalid expression: expected a comparison operator, found {:?}",
                self.peek()
            )))
        }
    }

    fn parse_arith(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_term()?;
        while *self.peek() == Tok::Percent {
            self.advance();
            let rhs = self.parse_term()?;
            lhs = Expr::Mod(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr> {
        match self.advance() {
            Tok::Int(v) => Ok(Expr::Lit(v)),
            Tok::Var => Ok(Expr::Var),
            Tok::LParen => {
                let inner = self.parse_expr()?;
                self.expect(&Tok::RParen)?;
                Ok(Expr::Paren(Box::new(inner)))
            }
            other => Err(Error::format(format!(
                "invalid expression: expected a term, found {other:?}"
            ))),
        }
    }
}

/// Parses a complete Boolean expression (the grammar's `expr` production),
/// requiring the whole `source` to be consumed.
pub fn parse(source: &str) -> Result<Expr> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expr()?;
    if *parser.peek() != Tok::Eof {
        return Err(Error::format(format!(
            "invalid expression: trailing input at {:?}",
            parser.peek()
        )));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_equal() {
        let e = parse("n == 1").unwrap();
        assert!(e.check(1));
        assert!(!e.check(2));
    }

    #[test]
    fn parses_and_chain() {
        let e = parse("n != 1 && n%10 == 1 && n < 100").unwrap();
        assert!(e.check(11));
        assert!(!e.check(1));
        assert!(!e.check(111));
    }

    #[test]
    fn parses_parenthesized_range() {
        let e = parse("(n >= 1 && n <= 12)").unwrap();
        assert!(e.check(1));
        assert!(e.check(8));
        assert!(!e.check(23));
    }

    #[test]
    fn parses_or_with_parens() {
        let e = parse("n%10 >= 2 && n%10 <= 4 && (n%100 < 10 || n%100 >= 20)").unwrap();
        assert!(e.check(2));
        assert!(!e.check(12));
        assert!(!e.check(21));
        assert!(e.check(22));
    }

    #[test]
    fn rejects_malformed_expression() {
        assert!(parse("n ===").is_err());
        assert!(parse("n + 1 == 2").is_err());
    }
}
