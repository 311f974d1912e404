//! tauc-sem - Semantic Analysis
//!
//! Two passes over the shared AST:
//!
//! 1. **Binder** ([`bind`]): builds the scope tree (global, per-function,
//!    and per-block local scopes), creates a symbol for every declaration,
//!    and resolves every identifier use to its symbol by walking the scope
//!    chain outward. Unresolved names and duplicate definitions in one
//!    scope are name errors.
//! 2. **Type checker** ([`check`]): synthesizes a semantic [`Type`] for
//!    every expression, installs declaration types on symbols, and rejects
//!    ill-typed programs. Function signatures are installed before any body
//!    is checked, so recursive and forward calls typecheck.
//!
//! Both passes leave the AST untouched and publish their results through
//! side tables ([`Bindings`], [`TypeMap`]) keyed by AST node id, which the
//! code generator consumes. Each decoration has exactly one producing pass.

pub mod bind;
pub mod check;
pub mod scope;
pub mod symbol;
pub mod types;

pub use bind::{bind, Bindings};
pub use check::{check, TypeMap};
pub use scope::{Scope, ScopeId, ScopeKind, ScopeTree};
pub use symbol::{Symbol, SymbolId, SymbolTable};
pub use types::Type;

use tauc_par::Program;
use tauc_util::Result;

/// Run both semantic passes in order.
pub fn analyze(program: &Program) -> Result<(Bindings, TypeMap)> {
    let mut bindings = bind(program)?;
    let types = check(program, &mut bindings)?;
    Ok((bindings, types))
}
