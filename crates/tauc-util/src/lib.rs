//! tauc-util - Core Utilities and Foundation Types
//!
//! Shared infrastructure for every phase of the Tau compiler:
//!
//! - [`span`]: source coordinates ([`Coord`]) and half-open ranges ([`Span`])
//!   attached to tokens, AST nodes, and diagnostics.
//! - [`error`]: the compiler error taxonomy ([`CompileError`]). Every phase
//!   returns `Result<_, CompileError>`; the first error aborts the pipeline.
//! - [`index_vec`]: typed-index vectors ([`IndexVec`] keyed by [`Idx`]
//!   newtypes) used for the scope and symbol arenas. Distinct index types
//!   keep the different id spaces (nodes, scopes, symbols) from being mixed
//!   up at compile time.

pub mod error;
pub mod index_vec;
pub mod span;

pub use error::{CompileError, Result};
pub use index_vec::{Idx, IndexVec};
pub use span::{Coord, Span};

// Re-export commonly used hash types
pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
