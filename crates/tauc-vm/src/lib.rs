//! tauc-vm - Target Machine
//!
//! The stack machine the compiler targets. This crate owns the instruction
//! set ([`Insn`]) that the code generator emits, and a reference executor
//! ([`Vm`]) used by the driver's run mode and by the end-to-end tests.
//!
//! # Machine model
//!
//! - A **program counter** over the flat instruction listing. `Label`
//!   pseudo-ops bind names to addresses in a resolution pre-pass and are
//!   no-ops at run time.
//! - An **operand stack** of `i64` values. Pushes, arithmetic,
//!   comparisons, and jumps-with-condition work here.
//! - A flat **memory** of `i64` slots holding the activation records,
//!   addressed through the `FP` and `SP` registers. `SP` addresses the
//!   next free slot. `Load`/`Store` move values between the operand stack
//!   and memory.
//! - `Call` pops a code address from the operand stack and pushes the
//!   return address; `JumpIndirect` pops a code address and jumps.
//!
//! Execution starts at address 0 with `FP = SP = 0` and stops at `Halt`
//! (or when control falls off the end of the listing). `Print` appends to
//! the collected output.

pub mod exec;
pub mod insn;

pub use exec::{Vm, DEFAULT_STEP_LIMIT};
pub use insn::Insn;

use thiserror::Error;

/// Runtime or resolution fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    #[error("undefined label `{0}`")]
    UndefinedLabel(String),

    #[error("duplicate label `{0}`")]
    DuplicateLabel(String),

    #[error("operand stack underflow at pc {pc}")]
    StackUnderflow { pc: usize },

    #[error("invalid memory address {address} at pc {pc}")]
    BadAddress { address: i64, pc: usize },

    #[error("invalid jump target {target} at pc {pc}")]
    BadJump { target: i64, pc: usize },

    #[error("division by zero at pc {pc}")]
    DivisionByZero { pc: usize },

    #[error("step budget of {0} exhausted")]
    StepLimit(u64),
}
