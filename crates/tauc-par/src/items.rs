//! Top-level declaration parsing.

use tauc_lex::TokenKind;
use tauc_util::Result;

use crate::ast::{FuncDecl, ParamDecl, Program};
use crate::Parser;

impl Parser {
    /// program = { func_decl } EOF
    pub fn parse_program(&mut self) -> Result<Program> {
        let start = self.peek().span;
        let mut decls = Vec::new();
        while self.at(TokenKind::Func) {
            decls.push(self.parse_func_decl()?);
        }
        self.expect(TokenKind::Eof)?;
        let span = match decls.last() {
            Some(last) => start.to(last.span),
            None => start,
        };
        Ok(Program { decls, span })
    }

    /// func_decl = "func" ID "(" [ params ] ")" ":" type nest
    fn parse_func_decl(&mut self) -> Result<FuncDecl> {
        let start = self.expect(TokenKind::Func)?.span;
        let name = self.parse_ident()?;
        self.expect(TokenKind::LParen)?;
        let params = if self.at(TokenKind::Id) {
            self.parse_params()?
        } else {
            Vec::new()
        };
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Colon)?;
        let ret_type = self.parse_type()?;
        let body = self.parse_block()?;
        let span = start.to(body.span);
        Ok(FuncDecl {
            id: self.fresh_node(),
            name,
            params,
            ret_type,
            body,
            span,
        })
    }

    /// params = param { "," param }
    fn parse_params(&mut self) -> Result<Vec<ParamDecl>> {
        let mut params = vec![self.parse_param()?];
        while self.at(TokenKind::Comma) {
            self.advance();
            params.push(self.parse_param()?);
        }
        Ok(params)
    }

    /// param = ID ":" type
    fn parse_param(&mut self) -> Result<ParamDecl> {
        let name = self.parse_ident()?;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        let span = name.span.to(ty.span());
        Ok(ParamDecl { name, ty, span })
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::TypeAst;
    use crate::test_util::parse_source;
    use tauc_util::CompileError;

    #[test]
    fn test_empty_program() {
        let program = parse_source("").expect("parse failed");
        assert!(program.decls.is_empty());
    }

    #[test]
    fn test_func_decl() {
        let program = parse_source("func main(): void { }").expect("parse failed");
        assert_eq!(program.decls.len(), 1);
        let func = &program.decls[0];
        assert_eq!(func.name.name, "main");
        assert!(func.params.is_empty());
        assert!(matches!(func.ret_type, TypeAst::Void(_)));
    }

    #[test]
    fn test_func_decl_params() {
        let program =
            parse_source("func add(a: int, b: int): int { return a + b }").expect("parse failed");
        let func = &program.decls[0];
        assert_eq!(func.params.len(), 2);
        assert_eq!(func.params[0].name.name, "a");
        assert_eq!(func.params[1].name.name, "b");
        assert!(matches!(func.params[0].ty, TypeAst::Int(_)));
    }

    #[test]
    fn test_multiple_funcs() {
        let program =
            parse_source("func f(): void { } func g(): void { }").expect("parse failed");
        assert_eq!(program.decls.len(), 2);
    }

    #[test]
    fn test_program_span_contains_funcs() {
        let program =
            parse_source("func f(): void { }\nfunc g(): void { }").expect("parse failed");
        for func in &program.decls {
            assert!(program.span.contains_span(func.span));
        }
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let err = parse_source("func f(): void { } var").expect_err("expected parse error");
        assert!(matches!(err, CompileError::Parse { .. }));
    }

    #[test]
    fn test_missing_colon() {
        let err = parse_source("func f() void { }").expect_err("expected parse error");
        let CompileError::Parse { expected, .. } = err else {
            panic!("expected parse error");
        };
        assert_eq!(expected, ":");
    }
}
