//! Trap Entry From User Mode
//!
//! User programs raise syscalls with a software interrupt. The gate is
//! wired user-callable and leaves interrupts enabled; the entry stub saves
//! register state as a [`TrapFrame`] before calling [`handle_trap`].
//! Everything the caller controls, the whole frame and everything its
//! stack pointer points at, is untrusted input.

use crate::console::Console;
use crate::mm::{AddressSpace, VirtAddr};
use crate::process::{self, Process, Scheduler};
use crate::syscall::{self, Flow};

/// Software-interrupt vector for system calls.
///
/// The IDT entry must carry DPL 3 so user mode may raise it.
pub const TRAP_VECTOR: u8 = 0x30;

/// Register state captured at trap entry.
///
/// Field order matches the entry stub's push sequence: general-purpose
/// registers first, then the frame the CPU pushed on the privilege switch.
/// `rax` doubles as the result register. `rsp` is the caller's stack
/// pointer, where the operation number and arguments live as consecutive
/// machine words.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct TrapFrame {
    pub rax: u64,
    pub rbx: u64,
    pub rcx: u64,
    pub rdx: u64,
    pub rsi: u64,
    pub rdi: u64,
    pub rbp: u64,
    pub r8: u64,
    pub r9: u64,
    pub r10: u64,
    pub r11: u64,
    pub r12: u64,
    pub r13: u64,
    pub r14: u64,
    pub r15: u64,
    pub rip: u64,
    pub cs: u64,
    pub rflags: u64,
    pub rsp: u64,
    pub ss: u64,
}

impl TrapFrame {
    /// The caller's stack pointer at the moment of the trap.
    #[inline]
    pub fn user_stack_pointer(&self) -> VirtAddr {
        VirtAddr::new(self.rsp as usize)
    }

    /// Place a syscall result where the caller will see it.
    #[inline]
    pub fn set_result(&mut self, value: isize) {
        self.rax = value as i64 as u64;
    }
}

/// Everything the trap path needs to act on behalf of the calling thread.
///
/// Threaded explicitly through validation and dispatch instead of reaching
/// for a current-thread global, so the whole layer runs under host tests
/// with fake collaborators.
pub struct TrapContext<'a> {
    /// The calling process's address space.
    pub space: &'a dyn AddressSpace,
    /// Sink for user-visible output.
    pub console: &'a mut dyn Console,
    /// The calling process's record.
    pub process: &'a Process,
    /// Teardown entry point for terminations.
    pub scheduler: &'a mut dyn Scheduler,
}

impl<'a> TrapContext<'a> {
    /// Bundle the collaborators for one trap.
    pub fn new(
        space: &'a dyn AddressSpace,
        console: &'a mut dyn Console,
        process: &'a Process,
        scheduler: &'a mut dyn Scheduler,
    ) -> Self {
        Self {
            space,
            console,
            process,
            scheduler,
        }
    }

    /// Terminate the calling process with `status`.
    pub fn terminate(&mut self, status: i32) -> Flow {
        process::terminate(self.process, self.console, self.scheduler, status);
        Flow::Terminated
    }
}

/// Entry point for syscall traps.
///
/// Dispatches the operation and, when the caller survives it, writes the
/// result into the frame the stub will restore.
pub fn handle_trap(frame: &mut TrapFrame, ctx: &mut TrapContext<'_>) {
    match syscall::dispatch(frame, ctx) {
        Flow::Resume(value) => frame.set_result(value),
        Flow::Terminated => {}
    }
}
