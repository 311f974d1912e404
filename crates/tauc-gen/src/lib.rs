//! tauc-gen - Frame Layout and Code Generation
//!
//! The last two passes of the pipeline:
//!
//! 1. **Frame layout** ([`assign_frames`]): assigns every symbol its slot
//!    in the activation record and computes each function's frame size.
//!    The record, addressed relative to the frame pointer:
//!
//!    ```text
//!    offset  slot
//!      -1    return value
//!      -2    first parameter
//!      ...   further parameters, one slot lower each
//!       0    saved return address
//!       1    saved caller frame pointer
//!       2    saved caller stack pointer
//!       3..  locals, in declaration order; nested blocks keep
//!            allocating from the current frontier (no slot reuse)
//!    ```
//!
//!    An array local of size N takes N contiguous slots; its symbol's
//!    offset is the base slot.
//!
//! 2. **Code generation** ([`generate`]): walks the decorated AST and
//!    emits the flat instruction listing, honoring the calling convention
//!    above and lowering boolean control flow via short-circuit jumps.

pub mod codegen;
pub mod frame;

pub use codegen::generate;
pub use frame::{assign_frames, FrameLayout};
