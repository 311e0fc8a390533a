//! OcelotOS System Call Boundary
//!
//! The layer between untrusted user programs and the kernel proper: trap
//! frames come in, every caller-supplied address is validated against the
//! caller's own address space, arguments are decoded from the user stack,
//! operations dispatch through a registry, and processes that misbehave
//! are terminated.
//!
//! # Security Model
//! - Nothing from user space is dereferenced before validation, and ranges
//!   are validated page by page, end to end
//! - Reads of user memory are fused with their checks; the crate has no
//!   unchecked read primitive to misuse
//! - Validation failures and unknown operations terminate the caller with
//!   the killed status; they never become return values and never panic
//!   the kernel
//! - Collaborators (address space, console, scheduler) are explicit trait
//!   objects, so the whole layer runs under host tests
//!
//! # Layout
//! - [`mm`]: address vocabulary and the address-space seam
//! - [`syscall`]: validation, decoding, the registry, dispatch, handlers
//! - [`trap`]: trap-frame ABI and the entry point
//! - [`process`]: exit records and the termination path
//! - [`console`]: user-visible output seam

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod console;
pub mod mm;
pub mod process;
pub mod syscall;
pub mod trap;

#[cfg(test)]
pub(crate) mod mock;

pub use trap::{handle_trap, TrapContext, TrapFrame, TRAP_VECTOR};
