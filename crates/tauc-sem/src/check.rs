//! Type checking.
//!
//! Synthesis only: every expression's type is computed bottom-up, no
//! inference variables. Function signatures are installed on their symbols
//! before any body is walked, so recursive calls typecheck. The declared
//! return type flows down as context for `return` statements.
//!
//! Array types are supported under the following rules, enforced here so
//! the later passes never see an ill-formed array:
//! - a declared array must have an integer-literal size of at least 1,
//! - the element type must be `int` or `bool`,
//! - arrays cannot be parameters, return values, or assignment operands;
//!   an array variable may only be indexed.

use tauc_par::{
    ArrayTypeAst, BinOp, CallExpr, CompoundStmt, Expr, FuncDecl, NodeId, Program, Stmt, TypeAst,
    UnOp, VarDecl,
};
use tauc_util::{CompileError, FxHashMap, Result, Span};

use crate::bind::Bindings;
use crate::types::Type;

/// Expression types, keyed by AST node id.
#[derive(Debug, Default)]
pub struct TypeMap {
    exprs: FxHashMap<NodeId, Type>,
}

impl TypeMap {
    pub fn get(&self, id: NodeId) -> Option<&Type> {
        self.exprs.get(&id)
    }

    /// The type of an expression. Missing entries are internal errors:
    /// checking has already succeeded by the time anyone asks.
    pub fn expr_type(&self, expr: &Expr) -> Result<&Type> {
        self.exprs.get(&expr.node_id()).ok_or_else(|| {
            CompileError::internal("expression has no type", expr.span())
        })
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    fn record(&mut self, id: NodeId, ty: Type) {
        self.exprs.insert(id, ty);
    }
}

/// Type-check a bound program. Writes declaration types onto symbols and
/// returns the expression type map.
pub fn check(program: &Program, bindings: &mut Bindings) -> Result<TypeMap> {
    let mut checker = Checker {
        bindings,
        types: TypeMap::default(),
    };
    checker.program(program)?;
    Ok(checker.types)
}

struct Checker<'a> {
    bindings: &'a mut Bindings,
    types: TypeMap,
}

impl Checker<'_> {
    fn program(&mut self, program: &Program) -> Result<()> {
        for func in &program.decls {
            self.install_signature(func)?;
        }
        for func in &program.decls {
            let ret = self.resolve_type(&func.ret_type)?;
            self.check_compound(&func.body, &ret)?;
        }
        Ok(())
    }

    /// Resolve a function's signature and set it on the function symbol
    /// and its parameter symbols.
    fn install_signature(&mut self, func: &FuncDecl) -> Result<()> {
        let mut params = Vec::new();
        for param in &func.params {
            let ty = self.resolve_type(&param.ty)?;
            if matches!(ty, Type::Array(_)) {
                return Err(CompileError::ty(
                    "array types cannot be used as parameters",
                    param.span,
                ));
            }
            if ty == Type::Void {
                return Err(CompileError::ty(
                    "parameter cannot have type void",
                    param.span,
                ));
            }
            let symbol = self.bindings.resolution(&param.name)?;
            self.bindings.symbols.set_type(symbol, ty.clone());
            params.push(ty);
        }
        let ret = self.resolve_type(&func.ret_type)?;
        if matches!(ret, Type::Array(_)) {
            return Err(CompileError::ty(
                "array types cannot be returned",
                func.ret_type.span(),
            ));
        }
        let symbol = self.bindings.resolution(&func.name)?;
        self.bindings.symbols.set_type(
            symbol,
            Type::Func {
                params,
                ret: Box::new(ret),
            },
        );
        Ok(())
    }

    fn resolve_type(&mut self, ty: &TypeAst) -> Result<Type> {
        match ty {
            TypeAst::Int(_) => Ok(Type::Int),
            TypeAst::Bool(_) => Ok(Type::Bool),
            TypeAst::Void(_) => Ok(Type::Void),
            TypeAst::Array(a) => self.resolve_array_type(a),
        }
    }

    fn resolve_array_type(&mut self, a: &ArrayTypeAst) -> Result<Type> {
        let elem = self.resolve_type(&a.elem)?;
        if !elem.is_scalar() {
            return Err(CompileError::ty(
                format!("array element type must be int or bool, found {elem}"),
                a.elem.span(),
            ));
        }
        let Some(size) = &a.size else {
            return Err(CompileError::ty("array type requires a size", a.span));
        };
        let Expr::Int(lit) = size.as_ref() else {
            return Err(CompileError::ty(
                "array size must be an integer literal",
                size.span(),
            ));
        };
        if lit.value < 1 {
            return Err(CompileError::ty("array size must be positive", lit.span));
        }
        self.types.record(lit.id, Type::Int);
        Ok(Type::Array(Box::new(elem)))
    }

    fn check_var_decl(&mut self, decl: &VarDecl) -> Result<()> {
        let ty = self.resolve_type(&decl.ty)?;
        if ty == Type::Void {
            return Err(CompileError::ty(
                "variable cannot have type void",
                decl.span,
            ));
        }
        let symbol = self.bindings.resolution(&decl.name)?;
        self.bindings.symbols.set_type(symbol, ty);
        Ok(())
    }

    fn check_compound(&mut self, block: &CompoundStmt, ret: &Type) -> Result<()> {
        for decl in &block.decls {
            self.check_var_decl(decl)?;
        }
        for stmt in &block.stmts {
            self.check_stmt(stmt, ret)?;
        }
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &Stmt, ret: &Type) -> Result<()> {
        match stmt {
            Stmt::Compound(s) => self.check_compound(s, ret),
            Stmt::Assign(s) => {
                let lhs = self.check_expr(&s.lhs)?;
                let rhs = self.check_expr(&s.rhs)?;
                if matches!(lhs, Type::Func { .. }) {
                    return Err(CompileError::ty("cannot assign to a function", s.lhs.span()));
                }
                if matches!(lhs, Type::Array(_)) || matches!(rhs, Type::Array(_)) {
                    return Err(CompileError::ty("arrays cannot be assigned", s.span));
                }
                if lhs != rhs {
                    return Err(CompileError::ty(
                        format!("mismatched types in assignment: expected {lhs}, found {rhs}"),
                        s.span,
                    ));
                }
                Ok(())
            }
            Stmt::If(s) => {
                self.check_condition(&s.cond)?;
                self.check_compound(&s.then_body, ret)?;
                match &s.else_body {
                    Some(body) => self.check_compound(body, ret),
                    None => Ok(()),
                }
            }
            Stmt::While(s) => {
                self.check_condition(&s.cond)?;
                self.check_compound(&s.body, ret)
            }
            Stmt::Return(s) => match &s.expr {
                Some(expr) => {
                    let ty = self.check_expr(expr)?;
                    if *ret == Type::Void {
                        return Err(CompileError::ty(
                            "void function cannot return a value",
                            s.span,
                        ));
                    }
                    if ty != *ret {
                        return Err(CompileError::ty(
                            format!("wrong return type: expected {ret}, found {ty}"),
                            s.span,
                        ));
                    }
                    Ok(())
                }
                None => {
                    if *ret != Type::Void {
                        return Err(CompileError::ty(
                            format!("missing return value: expected {ret}"),
                            s.span,
                        ));
                    }
                    Ok(())
                }
            },
            Stmt::Call(s) => {
                self.check_call(&s.call)?;
                Ok(())
            }
            Stmt::Print(s) => {
                let ty = self.check_expr(&s.expr)?;
                if ty != Type::Int {
                    return Err(CompileError::ty(
                        format!("print operand must have type int, found {ty}"),
                        s.expr.span(),
                    ));
                }
                Ok(())
            }
        }
    }

    fn check_condition(&mut self, cond: &Expr) -> Result<()> {
        let ty = self.check_expr(cond)?;
        if ty != Type::Bool {
            return Err(CompileError::ty(
                format!("condition must have type bool, found {ty}"),
                cond.span(),
            ));
        }
        Ok(())
    }

    fn check_expr(&mut self, expr: &Expr) -> Result<Type> {
        let ty = match expr {
            Expr::Id(e) => {
                let symbol = self.bindings.resolution(&e.name)?;
                self.bindings
                    .symbols
                    .type_of(symbol)
                    .cloned()
                    .ok_or_else(|| {
                        CompileError::internal(
                            format!("symbol `{}` has no type", e.name.name),
                            e.span,
                        )
                    })?
            }
            Expr::Int(_) => Type::Int,
            Expr::Bool(_) => Type::Bool,
            Expr::Call(e) => self.check_call(e)?,
            Expr::ArrayCell(e) => {
                let array_ty = self.check_expr(&e.array)?;
                let Type::Array(elem) = array_ty else {
                    return Err(CompileError::ty(
                        format!("indexed value is not an array, found {array_ty}"),
                        e.array.span(),
                    ));
                };
                let index_ty = self.check_expr(&e.index)?;
                if index_ty != Type::Int {
                    return Err(CompileError::ty(
                        format!("array index must have type int, found {index_ty}"),
                        e.index.span(),
                    ));
                }
                *elem
            }
            Expr::Binary(e) => {
                let left = self.check_expr(&e.left)?;
                let right = self.check_expr(&e.right)?;
                match e.op {
                    BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
                        self.require_operands(e.op, &left, &right, &Type::Int, e.op_span)?;
                        Type::Int
                    }
                    BinOp::And | BinOp::Or => {
                        self.require_operands(e.op, &left, &right, &Type::Bool, e.op_span)?;
                        Type::Bool
                    }
                    BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                        self.require_operands(e.op, &left, &right, &Type::Int, e.op_span)?;
                        Type::Bool
                    }
                    BinOp::Eq | BinOp::Ne => {
                        if left != right || !left.is_scalar() {
                            return Err(CompileError::ty(
                                format!(
                                    "operator `{}` requires two int or two bool operands, \
                                     found {left} and {right}",
                                    e.op.as_str()
                                ),
                                e.op_span,
                            ));
                        }
                        Type::Bool
                    }
                }
            }
            Expr::Unary(e) => {
                let inner = self.check_expr(&e.expr)?;
                let (required, result) = match e.op {
                    UnOp::Neg => (Type::Int, Type::Int),
                    UnOp::Not => (Type::Bool, Type::Bool),
                };
                if inner != required {
                    return Err(CompileError::ty(
                        format!(
                            "operator `{}` requires a {required} operand, found {inner}",
                            e.op.as_str()
                        ),
                        e.span,
                    ));
                }
                result
            }
        };
        self.types.record(expr.node_id(), ty.clone());
        Ok(ty)
    }

    fn check_call(&mut self, call: &CallExpr) -> Result<Type> {
        let callee_ty = self.check_expr(&call.callee)?;
        let Type::Func { params, ret } = callee_ty else {
            return Err(CompileError::ty(
                format!("called value is not a function, found {callee_ty}"),
                call.callee.span(),
            ));
        };
        if call.args.len() != params.len() {
            return Err(CompileError::ty(
                format!(
                    "wrong number of arguments: expected {}, found {}",
                    params.len(),
                    call.args.len()
                ),
                call.span,
            ));
        }
        for (arg, param_ty) in call.args.iter().zip(&params) {
            let arg_ty = self.check_expr(arg)?;
            if arg_ty != *param_ty {
                return Err(CompileError::ty(
                    format!("mismatched argument type: expected {param_ty}, found {arg_ty}"),
                    arg.span(),
                ));
            }
        }
        let ty = *ret;
        self.types.record(call.id, ty.clone());
        Ok(ty)
    }

    fn require_operands(
        &self,
        op: BinOp,
        left: &Type,
        right: &Type,
        required: &Type,
        span: Span,
    ) -> Result<()> {
        if left != required || right != required {
            return Err(CompileError::ty(
                format!(
                    "operator `{}` requires {required} operands, found {left} and {right}",
                    op.as_str()
                ),
                span,
            ));
        }
        Ok(())
    }
}
