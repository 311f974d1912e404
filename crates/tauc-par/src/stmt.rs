//! Statement and block parsing.

use tauc_lex::TokenKind;
use tauc_util::Result;

use crate::ast::{
    AssignStmt, CallStmt, CompoundStmt, Expr, IdExpr, IfStmt, PrintStmt, ReturnStmt, Stmt,
    VarDecl, WhileStmt,
};
use crate::Parser;

impl Parser {
    /// nest = "{" { declaration } { statement | nest } [ return ] "}"
    pub(crate) fn parse_block(&mut self) -> Result<CompoundStmt> {
        let start = self.expect(TokenKind::LBrace)?.span;
        let mut decls = Vec::new();
        while self.at(TokenKind::Var) {
            decls.push(self.parse_declaration()?);
        }
        let mut stmts = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::Call
                | TokenKind::Print
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Id => stmts.push(self.parse_statement()?),
                TokenKind::LBrace => stmts.push(Stmt::Compound(self.parse_block()?)),
                _ => break,
            }
        }
        if self.at(TokenKind::Return) {
            stmts.push(self.parse_return()?);
        }
        let end = self.expect(TokenKind::RBrace)?.span;
        Ok(CompoundStmt {
            id: self.fresh_node(),
            decls,
            stmts,
            span: start.to(end),
        })
    }

    /// declaration = "var" ID ":" type
    fn parse_declaration(&mut self) -> Result<VarDecl> {
        let start = self.expect(TokenKind::Var)?.span;
        let name = self.parse_ident()?;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        let span = start.to(ty.span());
        Ok(VarDecl { name, ty, span })
    }

    /// statement = call | print | if | while | equation
    fn parse_statement(&mut self) -> Result<Stmt> {
        match self.peek_kind() {
            TokenKind::Call => self.parse_call_stmt(),
            TokenKind::Print => self.parse_print_stmt(),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::Id => self.parse_assign_stmt(),
            _ => Err(self.expected("a statement")),
        }
    }

    /// call = "call" ID "(" [ args ] ")"
    fn parse_call_stmt(&mut self) -> Result<Stmt> {
        let start = self.expect(TokenKind::Call)?.span;
        let name = self.parse_ident()?;
        let call = self.parse_call_of(name)?;
        let span = start.to(call.span);
        Ok(Stmt::Call(CallStmt { call, span }))
    }

    /// print = "print" expr
    fn parse_print_stmt(&mut self) -> Result<Stmt> {
        let start = self.expect(TokenKind::Print)?.span;
        let expr = self.parse_expr()?;
        let span = start.to(expr.span());
        Ok(Stmt::Print(PrintStmt { expr, span }))
    }

    /// if = "if" expr nest [ "else" nest ]
    fn parse_if_stmt(&mut self) -> Result<Stmt> {
        let start = self.expect(TokenKind::If)?.span;
        let cond = self.parse_expr()?;
        let then_body = self.parse_block()?;
        let mut span = start.to(then_body.span);
        let else_body = if self.at(TokenKind::Else) {
            self.advance();
            let body = self.parse_block()?;
            span = start.to(body.span);
            Some(body)
        } else {
            None
        };
        Ok(Stmt::If(IfStmt {
            cond,
            then_body,
            else_body,
            span,
        }))
    }

    /// while = "while" expr nest
    fn parse_while_stmt(&mut self) -> Result<Stmt> {
        let start = self.expect(TokenKind::While)?.span;
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        let span = start.to(body.span);
        Ok(Stmt::While(WhileStmt { cond, body, span }))
    }

    /// return = "return" [ expr ]
    fn parse_return(&mut self) -> Result<Stmt> {
        let token = self.expect(TokenKind::Return)?;
        let mut span = token.span;
        let expr = if self.at_expr_start() {
            let expr = self.parse_expr()?;
            span = span.to(expr.span());
            Some(expr)
        } else {
            None
        };
        Ok(Stmt::Return(ReturnStmt { expr, span }))
    }

    /// equation = (ID | array_ref) "=" expr
    fn parse_assign_stmt(&mut self) -> Result<Stmt> {
        let name = self.parse_ident()?;
        let lhs = if self.at(TokenKind::LBracket) {
            Expr::ArrayCell(self.parse_array_cell_of(name)?)
        } else {
            let span = name.span;
            Expr::Id(IdExpr {
                id: self.fresh_node(),
                name,
                span,
            })
        };
        self.expect(TokenKind::Assign)?;
        let rhs = self.parse_expr()?;
        let span = lhs.span().to(rhs.span());
        Ok(Stmt::Assign(AssignStmt { lhs, rhs, span }))
    }
}
