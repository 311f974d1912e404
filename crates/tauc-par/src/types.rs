//! Type annotation parsing.

use tauc_lex::TokenKind;
use tauc_util::Result;

use crate::ast::{ArrayTypeAst, TypeAst};
use crate::Parser;

impl Parser {
    /// type = "int" | "bool" | "void" | "[" [ expr ] "]" type
    pub(crate) fn parse_type(&mut self) -> Result<TypeAst> {
        match self.peek_kind() {
            TokenKind::IntTy => Ok(TypeAst::Int(self.advance().span)),
            TokenKind::BoolTy => Ok(TypeAst::Bool(self.advance().span)),
            TokenKind::VoidTy => Ok(TypeAst::Void(self.advance().span)),
            TokenKind::LBracket => self.parse_array_type(),
            _ => Err(self.expected("a type")),
        }
    }

    fn parse_array_type(&mut self) -> Result<TypeAst> {
        let start = self.expect(TokenKind::LBracket)?.span;
        let size = if self.at_expr_start() {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        self.expect(TokenKind::RBracket)?;
        let elem = self.parse_type()?;
        let span = start.to(elem.span());
        Ok(TypeAst::Array(ArrayTypeAst {
            size,
            elem: Box::new(elem),
            span,
        }))
    }
}
