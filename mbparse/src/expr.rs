//! Operator-precedence expression parsing.
//!
//! Binding, loosest to tightest: `IMP` `EQV` `XOR` `OR` `AND` `NOT`
//! comparisons `+ -` `MOD` `\` `* /` unary `+ -` `^`. `^` is
//! right-associative and binds tighter than unary minus, so `-2^2` is `-4`.

use mbasic::ast::{BinaryOp, Expr};

use crate::error::ParseError;
use crate::stmt::Parser;
use crate::token::{Keyword, TokenKind};

const PREC_NOT: u8 = 6;
const PREC_UNARY: u8 = 12;

fn binary_op(kind: &TokenKind) -> Option<(BinaryOp, u8, bool)> {
    Some(match kind {
        TokenKind::Keyword(Keyword::Imp) => (BinaryOp::Imp, 1, false),
        TokenKind::Keyword(Keyword::Eqv) => (BinaryOp::Eqv, 2, false),
        TokenKind::Keyword(Keyword::Xor) => (BinaryOp::Xor, 3, false),
        TokenKind::Keyword(Keyword::Or) => (BinaryOp::Or, 4, false),
        TokenKind::Keyword(Keyword::And) => (BinaryOp::And, 5, false),
        TokenKind::Eq => (BinaryOp::Eq, 7, false),
        TokenKind::Ne => (BinaryOp::Ne, 7, false),
        TokenKind::Lt => (BinaryOp::Lt, 7, false),
        TokenKind::Gt => (BinaryOp::Gt, 7, false),
        TokenKind::Le => (BinaryOp::Le, 7, false),
        TokenKind::Ge => (BinaryOp::Ge, 7, false),
        TokenKind::Plus => (BinaryOp::Add, 8, false),
        TokenKind::Minus => (BinaryOp::Sub, 8, false),
        TokenKind::Keyword(Keyword::Mod) => (BinaryOp::Mod, 9, false),
        TokenKind::Backslash => (BinaryOp::IntDiv, 10, false),
        TokenKind::Star => (BinaryOp::Mul, 11, false),
        TokenKind::Slash => (BinaryOp::Div, 11, false),
        TokenKind::Caret => (BinaryOp::Pow, 13, true),
        _ => return None,
    })
}

impl<'a> Parser<'a> {
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(1)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;
        while let Some((op, prec, right_assoc)) = binary_op(self.peek()) {
            if prec < min_prec {
                break;
            }
            self.advance();
            let next_min = if right_assoc { prec } else { prec + 1 };
            let rhs = self.parse_binary(next_min)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_binary(PREC_UNARY)?;
                Ok(Expr::Unary(mbasic::ast::UnaryOp::Neg, Box::new(operand)))
            }
            TokenKind::Plus => {
                self.advance();
                self.parse_prefix()
            }
            TokenKind::Keyword(Keyword::Not) => {
                self.advance();
                let operand = self.parse_binary(PREC_NOT)?;
                Ok(Expr::Unary(mbasic::ast::UnaryOp::Not, Box::new(operand)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            TokenKind::Number(value) => {
                self.advance();
                Ok(Expr::Number(value))
            }
            TokenKind::StringLit(text) => {
                self.advance();
                Ok(Expr::StringLit(text))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect_rparen()?;
                Ok(inner)
            }
            TokenKind::Ident { name, suffix } => {
                self.advance();
                // An identifier starting `fn` followed by `(` is a user
                // function call.
                if name.starts_with("fn") && name.len() > 2 && self.peek() == &TokenKind::LParen {
                    let args = self.parse_args()?;
                    return Ok(Expr::UserFn(self.resolve_fn(&name, suffix), args));
                }
                if self.peek() == &TokenKind::LParen {
                    let subscripts = self.parse_args()?;
                    return Ok(Expr::Element(self.resolve_var(&name, suffix), subscripts));
                }
                Ok(Expr::Var(self.resolve_var(&name, suffix)))
            }
            TokenKind::Keyword(Keyword::Fn) => {
                self.advance();
                let (name, suffix) = self.expect_ident()?;
                let full = format!("fn{}", name);
                let args = if self.peek() == &TokenKind::LParen {
                    self.parse_args()?
                } else {
                    Vec::new()
                };
                Ok(Expr::UserFn(self.resolve_fn(&full, suffix), args))
            }
            TokenKind::Keyword(keyword) => match keyword.function_name() {
                Some(name) => {
                    self.advance();
                    let args = if self.peek() == &TokenKind::LParen {
                        self.parse_args()?
                    } else {
                        Vec::new()
                    };
                    Ok(Expr::Call(name.to_string(), args))
                }
                None => Err(self.syntax_error("Expected expression")),
            },
            _ => Err(self.syntax_error("Expected expression")),
        }
    }

    /// Parenthesized argument (or subscript) list. A `#` before an argument
    /// is tolerated for the file-number forms like `INPUT$(n, #1)`.
    pub(crate) fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect_lparen()?;
        let mut args = Vec::new();
        if self.peek() == &TokenKind::RParen {
            self.advance();
            return Ok(args);
        }
        loop {
            if self.peek() == &TokenKind::Hash {
                self.advance();
            }
            args.push(self.parse_expr()?);
            match self.peek() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RParen => {
                    self.advance();
                    return Ok(args);
                }
                _ => return Err(self.syntax_error("Expected , or ) in argument list")),
            }
        }
    }
}
