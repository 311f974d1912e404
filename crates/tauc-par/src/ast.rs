//! tauc-par - AST Node Definitions
//!
//! The AST is created once by the parser and never rewritten; later passes
//! decorate it through side tables keyed by [`NodeId`]. Every node that a
//! later pass decorates (expressions, identifiers, compound statements,
//! function declarations) carries its own `NodeId`, assigned by the parser
//! from a per-parse counter, plus the half-open [`Span`] of its source text.

use tauc_util::{define_idx, Span};

define_idx!(NodeId);

/// AST root - an ordered sequence of function declarations.
#[derive(Debug, Clone)]
pub struct Program {
    pub decls: Vec<FuncDecl>,
    pub span: Span,
}

/// Function declaration: `func name(params): ret { ... }`
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub id: NodeId,
    pub name: Id,
    pub params: Vec<ParamDecl>,
    pub ret_type: TypeAst,
    pub body: CompoundStmt,
    pub span: Span,
}

/// Parameter declaration: `name: type`
#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: Id,
    pub ty: TypeAst,
    pub span: Span,
}

/// Variable declaration: `var name: type`
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: Id,
    pub ty: TypeAst,
    pub span: Span,
}

/// An identifier occurrence, at either a declaration or a use site.
///
/// The binder resolves each `Id` to a symbol, keyed by its `NodeId`.
#[derive(Debug, Clone)]
pub struct Id {
    pub id: NodeId,
    pub name: String,
    pub span: Span,
}

/// Syntactic type annotation.
#[derive(Debug, Clone)]
pub enum TypeAst {
    Int(Span),
    Bool(Span),
    Void(Span),
    Array(ArrayTypeAst),
}

/// Array type annotation: `[size] element`
#[derive(Debug, Clone)]
pub struct ArrayTypeAst {
    pub size: Option<Box<Expr>>,
    pub elem: Box<TypeAst>,
    pub span: Span,
}

impl TypeAst {
    pub fn span(&self) -> Span {
        match self {
            TypeAst::Int(span) | TypeAst::Bool(span) | TypeAst::Void(span) => *span,
            TypeAst::Array(a) => a.span,
        }
    }
}

/// Statement.
#[derive(Debug, Clone)]
pub enum Stmt {
    Compound(CompoundStmt),
    Assign(AssignStmt),
    If(IfStmt),
    While(WhileStmt),
    Return(ReturnStmt),
    Call(CallStmt),
    Print(PrintStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Compound(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Call(s) => s.span,
            Stmt::Print(s) => s.span,
        }
    }
}

/// Braced block: declarations first, then statements, then an optional
/// trailing return. Opens a fresh local scope.
#[derive(Debug, Clone)]
pub struct CompoundStmt {
    pub id: NodeId,
    pub decls: Vec<VarDecl>,
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// Assignment: `lhs = rhs`. The left side is an identifier or array cell.
#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub lhs: Expr,
    pub rhs: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_body: CompoundStmt,
    pub else_body: Option<CompoundStmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: CompoundStmt,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub expr: Option<Expr>,
    pub span: Span,
}

/// Call in statement position: `call f(args)`. The return value is
/// discarded.
#[derive(Debug, Clone)]
pub struct CallStmt {
    pub call: CallExpr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct PrintStmt {
    pub expr: Expr,
    pub span: Span,
}

/// Expression.
#[derive(Debug, Clone)]
pub enum Expr {
    Id(IdExpr),
    Call(CallExpr),
    ArrayCell(ArrayCellExpr),
    Int(IntLiteral),
    Bool(BoolLiteral),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Id(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::ArrayCell(e) => e.span,
            Expr::Int(e) => e.span,
            Expr::Bool(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Unary(e) => e.span,
        }
    }

    /// The decoration key of this expression.
    pub fn node_id(&self) -> NodeId {
        match self {
            Expr::Id(e) => e.id,
            Expr::Call(e) => e.id,
            Expr::ArrayCell(e) => e.id,
            Expr::Int(e) => e.id,
            Expr::Bool(e) => e.id,
            Expr::Binary(e) => e.id,
            Expr::Unary(e) => e.id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IdExpr {
    pub id: NodeId,
    pub name: Id,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub id: NodeId,
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// Array element access: `array[index]`
#[derive(Debug, Clone)]
pub struct ArrayCellExpr {
    pub id: NodeId,
    pub array: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IntLiteral {
    pub id: NodeId,
    pub value: i64,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BoolLiteral {
    pub id: NodeId,
    pub value: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub id: NodeId,
    pub op: BinOp,
    pub op_span: Span,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub id: NodeId,
    pub op: UnOp,
    pub expr: Box<Expr>,
    pub span: Span,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

impl UnOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Not => "not",
        }
    }
}
