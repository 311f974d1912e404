//! Frame layout (offsets) pass.
//!
//! Writes a frame slot onto every symbol and records each function's frame
//! size. Parameters count down from -2 in declaration order; locals count
//! up from 3, and nested compound statements keep allocating from the
//! current frontier, so sibling blocks never share slots. The frame size
//! is the final high-water offset.

use tauc_par::{CompoundStmt, Expr, FuncDecl, NodeId, Program, Stmt, TypeAst};
use tauc_sem::Bindings;
use tauc_util::{CompileError, FxHashMap, Result};

/// First local slot, above the return address and the two saved registers.
const LOCALS_BASE: i64 = 3;

/// Per-function frame sizes, keyed by `FuncDecl` node id.
#[derive(Debug, Default)]
pub struct FrameLayout {
    sizes: FxHashMap<NodeId, i64>,
}

impl FrameLayout {
    pub fn get(&self, id: NodeId) -> Option<i64> {
        self.sizes.get(&id).copied()
    }

    /// The frame size of a function. Missing entries are internal errors.
    pub fn size_of(&self, func: &FuncDecl) -> Result<i64> {
        self.get(func.id).ok_or_else(|| {
            CompileError::internal(
                format!("function `{}` has no frame size", func.name.name),
                func.span,
            )
        })
    }
}

/// Assign offsets to every symbol and a frame size to every function.
pub fn assign_frames(program: &Program, bindings: &mut Bindings) -> Result<FrameLayout> {
    let mut layout = FrameLayout::default();
    for func in &program.decls {
        let size = frame_func(func, bindings)?;
        layout.sizes.insert(func.id, size);
    }
    Ok(layout)
}

fn frame_func(func: &FuncDecl, bindings: &mut Bindings) -> Result<i64> {
    // The function symbol itself is a label, not a slot; its offset of 0
    // identifies it as addressable by name.
    let func_symbol = bindings.resolution(&func.name)?;
    bindings.symbols.set_offset(func_symbol, 0);

    let mut offset = -2;
    for param in &func.params {
        let symbol = bindings.resolution(&param.name)?;
        bindings.symbols.set_offset(symbol, offset);
        offset -= 1;
    }

    let mut frontier = LOCALS_BASE;
    alloc_block(&func.body, bindings, &mut frontier)?;
    Ok(frontier)
}

fn alloc_block(block: &CompoundStmt, bindings: &mut Bindings, frontier: &mut i64) -> Result<()> {
    for decl in &block.decls {
        let symbol = bindings.resolution(&decl.name)?;
        bindings.symbols.set_offset(symbol, *frontier);
        *frontier += slot_count(&decl.ty)?;
    }
    for stmt in &block.stmts {
        alloc_stmt(stmt, bindings, frontier)?;
    }
    Ok(())
}

fn alloc_stmt(stmt: &Stmt, bindings: &mut Bindings, frontier: &mut i64) -> Result<()> {
    match stmt {
        Stmt::Compound(block) => alloc_block(block, bindings, frontier),
        Stmt::If(s) => {
            alloc_block(&s.then_body, bindings, frontier)?;
            match &s.else_body {
                Some(body) => alloc_block(body, bindings, frontier),
                None => Ok(()),
            }
        }
        Stmt::While(s) => alloc_block(&s.body, bindings, frontier),
        Stmt::Assign(_) | Stmt::Return(_) | Stmt::Call(_) | Stmt::Print(_) => Ok(()),
    }
}

/// Number of frame slots a declared type occupies.
fn slot_count(ty: &TypeAst) -> Result<i64> {
    match ty {
        TypeAst::Int(_) | TypeAst::Bool(_) | TypeAst::Void(_) => Ok(1),
        TypeAst::Array(a) => match a.size.as_deref() {
            // The checker has already pinned the size to a positive literal.
            Some(Expr::Int(lit)) => Ok(lit.value),
            _ => Err(CompileError::internal(
                "array size is not an integer literal",
                a.span,
            )),
        },
    }
}
