//! Name binding.
//!
//! One walk over the AST that constructs the scope tree, creates symbols
//! for declarations, and resolves every identifier use. Function names go
//! into the global scope, parameters into the function's scope, and each
//! compound statement opens a fresh local scope.

use tauc_par::{
    ast, CompoundStmt, Expr, FuncDecl, NodeId, Program, Stmt, TypeAst,
};
use tauc_util::{CompileError, FxHashMap, Result};

use crate::scope::{ScopeId, ScopeKind, ScopeTree};
use crate::symbol::{SymbolId, SymbolTable};

/// Output of the binder: the scope tree, the symbol table, and the side
/// tables mapping AST nodes to what the walk established for them.
#[derive(Debug, Default)]
pub struct Bindings {
    pub scopes: ScopeTree,
    pub symbols: SymbolTable,
    /// `Id` node → its symbol, for declaration and use sites alike.
    pub resolutions: FxHashMap<NodeId, SymbolId>,
    /// `FuncDecl`/`CompoundStmt` node → the scope it introduced.
    pub scope_of: FxHashMap<NodeId, ScopeId>,
}

impl Bindings {
    /// The symbol an identifier resolved to. Missing entries are internal
    /// errors: binding has already succeeded by the time anyone asks.
    pub fn resolution(&self, id: &ast::Id) -> Result<SymbolId> {
        self.resolutions.get(&id.id).copied().ok_or_else(|| {
            CompileError::internal(format!("unresolved identifier `{}`", id.name), id.span)
        })
    }
}

/// Bind a program, producing its [`Bindings`].
pub fn bind(program: &Program) -> Result<Bindings> {
    let mut binder = Binder {
        bindings: Bindings::default(),
    };
    binder.program(program)?;
    Ok(binder.bindings)
}

struct Binder {
    bindings: Bindings,
}

impl Binder {
    fn program(&mut self, program: &Program) -> Result<()> {
        let global = self
            .bindings
            .scopes
            .push(ScopeKind::Global, None, program.span);
        for decl in &program.decls {
            self.func_decl(decl, global)?;
        }
        Ok(())
    }

    fn func_decl(&mut self, func: &FuncDecl, global: ScopeId) -> Result<()> {
        self.declare(global, &func.name)?;
        let func_scope = self
            .bindings
            .scopes
            .push(ScopeKind::Func, Some(global), func.span);
        self.bindings.scope_of.insert(func.id, func_scope);
        for param in &func.params {
            self.declare(func_scope, &param.name)?;
            self.type_ast(&param.ty, func_scope)?;
        }
        self.type_ast(&func.ret_type, func_scope)?;
        self.compound(&func.body, func_scope)
    }

    fn compound(&mut self, block: &CompoundStmt, parent: ScopeId) -> Result<()> {
        let scope = self
            .bindings
            .scopes
            .push(ScopeKind::Local, Some(parent), block.span);
        self.bindings.scope_of.insert(block.id, scope);
        for decl in &block.decls {
            self.declare(scope, &decl.name)?;
            self.type_ast(&decl.ty, scope)?;
        }
        for stmt in &block.stmts {
            self.stmt(stmt, scope)?;
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: &Stmt, scope: ScopeId) -> Result<()> {
        match stmt {
            Stmt::Compound(s) => self.compound(s, scope),
            Stmt::Assign(s) => {
                self.expr(&s.lhs, scope)?;
                self.expr(&s.rhs, scope)
            }
            Stmt::If(s) => {
                self.expr(&s.cond, scope)?;
                self.compound(&s.then_body, scope)?;
                match &s.else_body {
                    Some(body) => self.compound(body, scope),
                    None => Ok(()),
                }
            }
            Stmt::While(s) => {
                self.expr(&s.cond, scope)?;
                self.compound(&s.body, scope)
            }
            Stmt::Return(s) => match &s.expr {
                Some(expr) => self.expr(expr, scope),
                None => Ok(()),
            },
            Stmt::Call(s) => {
                self.expr(&s.call.callee, scope)?;
                for arg in &s.call.args {
                    self.expr(arg, scope)?;
                }
                Ok(())
            }
            Stmt::Print(s) => self.expr(&s.expr, scope),
        }
    }

    fn expr(&mut self, expr: &Expr, scope: ScopeId) -> Result<()> {
        match expr {
            Expr::Id(e) => match self.bindings.scopes.resolve_from(scope, &e.name.name) {
                Some(symbol) => {
                    self.bindings.resolutions.insert(e.name.id, symbol);
                    Ok(())
                }
                None => Err(CompileError::name(
                    format!("undefined name `{}`", e.name.name),
                    e.span,
                )),
            },
            Expr::Call(e) => {
                self.expr(&e.callee, scope)?;
                for arg in &e.args {
                    self.expr(arg, scope)?;
                }
                Ok(())
            }
            Expr::ArrayCell(e) => {
                self.expr(&e.array, scope)?;
                self.expr(&e.index, scope)
            }
            Expr::Int(_) | Expr::Bool(_) => Ok(()),
            Expr::Binary(e) => {
                self.expr(&e.left, scope)?;
                self.expr(&e.right, scope)
            }
            Expr::Unary(e) => self.expr(&e.expr, scope),
        }
    }

    fn type_ast(&mut self, ty: &TypeAst, scope: ScopeId) -> Result<()> {
        match ty {
            TypeAst::Int(_) | TypeAst::Bool(_) | TypeAst::Void(_) => Ok(()),
            TypeAst::Array(a) => {
                if let Some(size) = &a.size {
                    self.expr(size, scope)?;
                }
                self.type_ast(&a.elem, scope)
            }
        }
    }

    /// Create a symbol for a declaration and bind it in `scope`.
    fn declare(&mut self, scope: ScopeId, id: &ast::Id) -> Result<SymbolId> {
        let symbol = self.bindings.symbols.define(&id.name, scope);
        if !self.bindings.scopes.define(scope, &id.name, symbol) {
            return Err(CompileError::name(
                format!("duplicate definition of `{}`", id.name),
                id.span,
            ));
        }
        self.bindings.resolutions.insert(id.id, symbol);
        Ok(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tauc_lex::Lexer;
    use tauc_par::Parser;

    fn bind_source(source: &str) -> Result<(Program, Bindings)> {
        let program = Parser::parse(Lexer::tokenize(source)?)?;
        let bindings = bind(&program)?;
        Ok((program, bindings))
    }

    /// Collect every `Id` use inside expressions of a statement list.
    fn expr_ids(expr: &Expr, out: &mut Vec<NodeId>) {
        match expr {
            Expr::Id(e) => out.push(e.name.id),
            Expr::Call(e) => {
                expr_ids(&e.callee, out);
                for arg in &e.args {
                    expr_ids(arg, out);
                }
            }
            Expr::ArrayCell(e) => {
                expr_ids(&e.array, out);
                expr_ids(&e.index, out);
            }
            Expr::Binary(e) => {
                expr_ids(&e.left, out);
                expr_ids(&e.right, out);
            }
            Expr::Unary(e) => expr_ids(&e.expr, out),
            Expr::Int(_) | Expr::Bool(_) => {}
        }
    }

    #[test]
    fn test_resolves_local_use() {
        let (_, bindings) =
            bind_source("func main(): void { var x: int x = 1 print x }").expect("bind failed");
        // main + x
        assert_eq!(bindings.symbols.len(), 2);
    }

    #[test]
    fn test_undefined_name() {
        let err = bind_source("func main(): void { print y }").expect_err("expected name error");
        let CompileError::Name { message, span } = err else {
            panic!("expected name error");
        };
        assert!(message.contains("`y`"));
        // span covers exactly `y` on line 1
        assert_eq!(span.start.col, 27);
        assert_eq!(span.end.col, 28);
    }

    #[test]
    fn test_duplicate_var_in_same_scope() {
        let err = bind_source("func main(): void { var x: int var x: bool }")
            .expect_err("expected name error");
        assert!(matches!(err, CompileError::Name { .. }));
    }

    #[test]
    fn test_duplicate_function_names() {
        let err = bind_source("func f(): void { } func f(): void { }")
            .expect_err("expected name error");
        assert!(matches!(err, CompileError::Name { .. }));
    }

    #[test]
    fn test_duplicate_param() {
        let err =
            bind_source("func f(a: int, a: int): void { }").expect_err("expected name error");
        assert!(matches!(err, CompileError::Name { .. }));
    }

    #[test]
    fn test_shadowing_across_scopes_allowed() {
        let (program, bindings) = bind_source(
            "func main(): void { var x: int { var x: bool x = true } x = 1 }",
        )
        .expect("bind failed");
        // main, outer x, inner x
        assert_eq!(bindings.symbols.len(), 3);

        // The two assignments resolve to different symbols.
        let body = &program.decls[0].body;
        let Stmt::Compound(inner) = &body.stmts[0] else {
            panic!("expected nested block");
        };
        let Stmt::Assign(inner_assign) = &inner.stmts[0] else {
            panic!("expected inner assignment");
        };
        let Stmt::Assign(outer_assign) = &body.stmts[1] else {
            panic!("expected outer assignment");
        };
        let Expr::Id(inner_lhs) = &inner_assign.lhs else {
            panic!();
        };
        let Expr::Id(outer_lhs) = &outer_assign.lhs else {
            panic!();
        };
        let inner_sym = bindings.resolutions[&inner_lhs.name.id];
        let outer_sym = bindings.resolutions[&outer_lhs.name.id];
        assert_ne!(inner_sym, outer_sym);
    }

    #[test]
    fn test_param_resolves_in_body() {
        let (_, bindings) =
            bind_source("func f(n: int): int { return n }").expect("bind failed");
        assert_eq!(bindings.symbols.len(), 2);
    }

    #[test]
    fn test_call_to_earlier_function_resolves() {
        let (_, bindings) =
            bind_source("func g(): void { } func main(): void { call g() }").expect("bind failed");
        assert_eq!(bindings.symbols.len(), 2);
    }

    #[test]
    fn test_forward_reference_rejected() {
        // Binding is a single in-order walk; a body may only name
        // functions declared before it.
        let err = bind_source("func main(): void { call g() } func g(): void { }")
            .expect_err("expected name error");
        assert!(matches!(err, CompileError::Name { .. }));
    }

    #[test]
    fn test_recursive_call_resolves() {
        let (_, bindings) =
            bind_source("func f(n: int): int { return f(n - 1) }").expect("bind failed");
        assert_eq!(bindings.symbols.len(), 2);
    }

    #[test]
    fn test_resolution_totality_and_scope_chain() {
        let source = "func fact(n: int): int { if n <= 1 { return 1 } return n * fact(n - 1) } \
                      func main(): void { print fact(5) }";
        let (program, bindings) = bind_source(source).expect("bind failed");

        for func in &program.decls {
            let func_scope = bindings.scope_of[&func.id];
            let body_scope = bindings.scope_of[&func.body.id];
            // every use in the body resolves to a symbol on the scope chain
            let mut ids = Vec::new();
            for stmt in &func.body.stmts {
                collect_stmt_ids(stmt, &mut ids);
            }
            for id in ids {
                let symbol = bindings.resolutions[&id];
                let decl_scope = bindings.symbols.get(symbol).scope;
                assert!(bindings.scopes.is_ancestor_or_self(decl_scope, body_scope));
            }
            assert!(bindings
                .scopes
                .is_ancestor_or_self(func_scope, body_scope));
        }
    }

    fn collect_stmt_ids(stmt: &Stmt, out: &mut Vec<NodeId>) {
        match stmt {
            Stmt::Compound(s) => {
                for stmt in &s.stmts {
                    collect_stmt_ids(stmt, out);
                }
            }
            Stmt::Assign(s) => {
                expr_ids(&s.lhs, out);
                expr_ids(&s.rhs, out);
            }
            Stmt::If(s) => {
                expr_ids(&s.cond, out);
                for stmt in &s.then_body.stmts {
                    collect_stmt_ids(stmt, out);
                }
                if let Some(body) = &s.else_body {
                    for stmt in &body.stmts {
                        collect_stmt_ids(stmt, out);
                    }
                }
            }
            Stmt::While(s) => {
                expr_ids(&s.cond, out);
                for stmt in &s.body.stmts {
                    collect_stmt_ids(stmt, out);
                }
            }
            Stmt::Return(s) => {
                if let Some(expr) = &s.expr {
                    expr_ids(expr, out);
                }
            }
            Stmt::Call(s) => {
                expr_ids(&s.call.callee, out);
                for arg in &s.call.args {
                    expr_ids(arg, out);
                }
            }
            Stmt::Print(s) => expr_ids(&s.expr, out),
        }
    }
}
