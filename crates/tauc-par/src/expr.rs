//! Expression parsing.
//!
//! Layered precedence levels, lowest first:
//!
//! | Level | Operators |
//! |-------|-----------|
//! | 1 | `or` |
//! | 2 | `and` |
//! | 3 | `<`, `>`, `<=`, `>=`, `==`, `!=` |
//! | 4 | `+`, `-` |
//! | 5 | `*`, `/` |
//! | 6 | prefix `-`, `not` |
//!
//! Every binary level folds left-associatively: `a - b - c` parses as
//! `(a - b) - c`. Prefix operators nest right-associatively, so
//! `not not x` is `not (not x)`.

use tauc_lex::TokenKind;
use tauc_util::{CompileError, Result, Span};

use crate::ast::{
    ArrayCellExpr, BinOp, BinaryExpr, BoolLiteral, CallExpr, Expr, Id, IdExpr, IntLiteral, UnOp,
    UnaryExpr,
};
use crate::Parser;

impl Parser {
    /// Expression entry point (the `or` level).
    pub(crate) fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        while self.at(TokenKind::Or) {
            let op_span = self.advance().span;
            let right = self.parse_and()?;
            left = self.binary(BinOp::Or, op_span, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_comparison()?;
        while self.at(TokenKind::And) {
            let op_span = self.advance().span;
            let right = self.parse_comparison()?;
            left = self.binary(BinOp::And, op_span, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Le => BinOp::Le,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Ge => BinOp::Ge,
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::Ne => BinOp::Ne,
                _ => return Ok(left),
            };
            let op_span = self.advance().span;
            let right = self.parse_additive()?;
            left = self.binary(op, op_span, left, right);
        }
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => return Ok(left),
            };
            let op_span = self.advance().span;
            let right = self.parse_multiplicative()?;
            left = self.binary(op, op_span, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => return Ok(left),
            };
            let op_span = self.advance().span;
            let right = self.parse_unary()?;
            left = self.binary(op, op_span, left, right);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let op = match self.peek_kind() {
            TokenKind::Minus => UnOp::Neg,
            TokenKind::Not => UnOp::Not,
            _ => return self.parse_atom(),
        };
        let op_span = self.advance().span;
        let expr = self.parse_unary()?;
        let span = op_span.to(expr.span());
        Ok(Expr::Unary(UnaryExpr {
            id: self.fresh_node(),
            op,
            expr: Box::new(expr),
            span,
        }))
    }

    /// atom = INT | "true" | "false" | "(" expr ")" | term
    fn parse_atom(&mut self) -> Result<Expr> {
        match self.peek_kind() {
            TokenKind::Int => {
                let token = self.advance();
                let value: i64 = token.value.parse().map_err(|_| {
                    CompileError::parse(
                        "an integer literal that fits in 64 bits",
                        token.to_string(),
                        token.span,
                    )
                })?;
                Ok(Expr::Int(IntLiteral {
                    id: self.fresh_node(),
                    value,
                    span: token.span,
                }))
            }
            TokenKind::True | TokenKind::False => {
                let token = self.advance();
                Ok(Expr::Bool(BoolLiteral {
                    id: self.fresh_node(),
                    value: token.kind == TokenKind::True,
                    span: token.span,
                }))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::Id => self.parse_term(),
            _ => Err(self.expected("an expression")),
        }
    }

    /// term = ID [ "(" args ")" | "[" expr "]" ]
    fn parse_term(&mut self) -> Result<Expr> {
        let name = self.parse_ident()?;
        match self.peek_kind() {
            TokenKind::LParen => Ok(Expr::Call(self.parse_call_of(name)?)),
            TokenKind::LBracket => Ok(Expr::ArrayCell(self.parse_array_cell_of(name)?)),
            _ => {
                let span = name.span;
                Ok(Expr::Id(IdExpr {
                    id: self.fresh_node(),
                    name,
                    span,
                }))
            }
        }
    }

    /// Finish a call whose callee identifier has already been consumed.
    pub(crate) fn parse_call_of(&mut self, name: Id) -> Result<CallExpr> {
        let callee_span = name.span;
        let callee = Expr::Id(IdExpr {
            id: self.fresh_node(),
            name,
            span: callee_span,
        });
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if self.at_expr_start() {
            args.push(self.parse_expr()?);
            while self.at(TokenKind::Comma) {
                self.advance();
                args.push(self.parse_expr()?);
            }
        }
        let end = self.expect(TokenKind::RParen)?.span;
        Ok(CallExpr {
            id: self.fresh_node(),
            callee: Box::new(callee),
            args,
            span: callee_span.to(end),
        })
    }

    /// Finish an array cell whose array identifier has already been consumed.
    pub(crate) fn parse_array_cell_of(&mut self, name: Id) -> Result<ArrayCellExpr> {
        let array_span = name.span;
        let array = Expr::Id(IdExpr {
            id: self.fresh_node(),
            name,
            span: array_span,
        });
        self.expect(TokenKind::LBracket)?;
        let index = self.parse_expr()?;
        let end = self.expect(TokenKind::RBracket)?.span;
        Ok(ArrayCellExpr {
            id: self.fresh_node(),
            array: Box::new(array),
            index: Box::new(index),
            span: array_span.to(end),
        })
    }

    fn binary(&mut self, op: BinOp, op_span: Span, left: Expr, right: Expr) -> Expr {
        let span = left.span().to(right.span());
        Expr::Binary(BinaryExpr {
            id: self.fresh_node(),
            op,
            op_span,
            left: Box::new(left),
            right: Box::new(right),
            span,
        })
    }
}
