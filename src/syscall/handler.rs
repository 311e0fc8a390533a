//! Syscall Dispatch and Handlers
//!
//! The trap path lands here with nothing trusted but the frame itself.
//! Dispatch validates and reads the operation number from the caller's
//! stack, resolves a descriptor, decodes the declared arguments, and runs
//! the handler. Every failure along the way routes through the termination
//! path; the caller never sees a fault as a return value.
//!
//! # Security Considerations
//! - The stack pointer is validated before the operation number is read
//! - Unknown numbers resolve to [`sys_unsupported`]; nothing falls through
//! - Handlers receive only decoded, validated argument words
//! - A handler that touches a user buffer validates the full range first

use crate::process::KILLED;
use crate::trap::{TrapContext, TrapFrame};

use super::args::{self, SyscallArgs, UserStack};
use super::table::SyscallTable;
use super::validate::UserSlice;
use super::Fault;

/// Standard output file descriptor.
pub const STDOUT_FD: i32 = 1;

/// What the trap path should do once an operation has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Resume user mode with this value in the frame's result register.
    Resume(isize),
    /// The calling process was terminated; there is nothing to resume.
    Terminated,
}

/// Dispatch the syscall described by `frame` against the installed table.
pub fn dispatch(frame: &TrapFrame, ctx: &mut TrapContext<'_>) -> Flow {
    dispatch_on(super::installed_table(), frame, ctx)
}

/// Dispatch against an explicit table.
fn dispatch_on(table: &SyscallTable, frame: &TrapFrame, ctx: &mut TrapContext<'_>) -> Flow {
    let stack = UserStack::new(ctx.space, frame.user_stack_pointer());

    // Slot 0 is the operation number; reading it validates the stack
    // pointer itself.
    let number = match stack.word(0) {
        Ok(word) => word,
        Err(fault) => return kill(ctx, fault),
    };

    let desc = table.lookup(number);
    let args = match args::decode(&stack, number, desc.arity) {
        Ok(args) => args,
        Err(fault) => return kill(ctx, fault),
    };

    log::trace!("{}: {}", ctx.process.name(), desc.name);
    (desc.handler)(&args, ctx)
}

/// Terminate the caller over `fault`.
fn kill(ctx: &mut TrapContext<'_>, fault: Fault) -> Flow {
    log::warn!("{}: {}", ctx.process.name(), fault);
    ctx.terminate(KILLED)
}

/// exit(status): terminate the calling process.
///
/// Never returns to user mode; the status is whatever the caller said.
pub(super) fn sys_exit(args: &SyscallArgs, ctx: &mut TrapContext<'_>) -> Flow {
    ctx.terminate(args.int(0))
}

/// write(fd, buffer, size): write a user buffer to the console.
///
/// The full `[buffer, buffer + size)` range is validated before `fd` is
/// looked at, so a hostile buffer kills the caller even when the fd is
/// bogus too. With no file table wired up yet, any fd other than standard
/// output fails with -1; that is an error return, not an offense.
pub(super) fn sys_write(args: &SyscallArgs, ctx: &mut TrapContext<'_>) -> Flow {
    let fd = args.int(0);
    let buffer = args.ptr(1);
    let size = args.size(2);

    let slice = match UserSlice::new(ctx.space, buffer, size) {
        Ok(slice) => slice,
        Err(fault) => return kill(ctx, fault),
    };

    if fd != STDOUT_FD {
        log::trace!("{}: write to unsupported fd {}", ctx.process.name(), fd);
        return Flow::Resume(-1);
    }

    ctx.console.write_bytes(slice.bytes());
    Flow::Resume(size as isize)
}

/// Fallback for operation numbers with no registered descriptor.
pub(super) fn sys_unsupported(args: &SyscallArgs, ctx: &mut TrapContext<'_>) -> Flow {
    kill(ctx, Fault::Unsupported(args.number()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mm::{PAGE_SIZE, WORD_SIZE};
    use crate::mock::{MockConsole, MockScheduler, MockSpace};
    use crate::process::{ExitState, Process};
    use crate::syscall::table::{numbers, SyscallDescriptor};

    const BASE: usize = 0x40_0000;
    const STACK: usize = BASE + 2 * PAGE_SIZE;

    struct Harness {
        space: MockSpace,
        console: MockConsole,
        scheduler: MockScheduler,
        process: Process,
    }

    impl Harness {
        fn new(name: &str) -> Self {
            Self {
                space: MockSpace::new(BASE, 4),
                console: MockConsole::new(),
                scheduler: MockScheduler::new(),
                process: Process::new(name),
            }
        }

        fn dispatch(&mut self, table: &SyscallTable) -> Flow {
            let frame = TrapFrame {
                rsp: STACK as u64,
                ..TrapFrame::default()
            };
            let mut ctx = TrapContext::new(
                &self.space,
                &mut self.console,
                &self.process,
                &mut self.scheduler,
            );
            dispatch_on(table, &frame, &mut ctx)
        }
    }

    #[test]
    fn test_write_to_stdout() {
        let mut h = Harness::new("echo");
        h.space.write(BASE, b"hello");
        h.space
            .write_words(STACK, &[numbers::SYS_WRITE, 1, BASE, 5]);

        let flow = h.dispatch(&SyscallTable::with_defaults());

        assert_eq!(flow, Flow::Resume(5));
        assert_eq!(h.console.writes().len(), 1);
        assert_eq!(h.console.writes()[0], b"hello");
        assert_eq!(h.process.exit_state(), ExitState::Running);
        assert_eq!(h.scheduler.reclaims(), 0);
    }

    #[test]
    fn test_write_buffer_crossing_unmapped_page() {
        let mut h = Harness::new("echo");
        // Buffer starts on mapped page 0 and runs onto unmapped page 1.
        h.space.unmap(1);
        let buffer = BASE + PAGE_SIZE - 2;
        h.space
            .write_words(STACK, &[numbers::SYS_WRITE, 1, buffer, 8]);

        let flow = h.dispatch(&SyscallTable::with_defaults());

        assert_eq!(flow, Flow::Terminated);
        assert_eq!(h.process.exit_state(), ExitState::Terminated);
        assert_eq!(h.process.exit_status(), -1);
        // Nothing reaches the console except the status line.
        assert_eq!(h.console.writes().len(), 1);
        assert_eq!(h.console.writes()[0], b"echo: exit(-1)\n");
        assert_eq!(h.scheduler.reclaims(), 1);
    }

    #[test]
    fn test_write_unsupported_fd_fails_without_killing() {
        let mut h = Harness::new("echo");
        h.space.write(BASE, b"hello");
        h.space
            .write_words(STACK, &[numbers::SYS_WRITE, 7, BASE, 5]);

        let flow = h.dispatch(&SyscallTable::with_defaults());

        assert_eq!(flow, Flow::Resume(-1));
        assert!(h.console.writes().is_empty());
        assert_eq!(h.process.exit_state(), ExitState::Running);
    }

    #[test]
    fn test_write_validates_buffer_before_fd() {
        let mut h = Harness::new("echo");
        h.space.unmap(1);
        // Bad fd and a bad buffer together: the buffer check runs first
        // and the caller dies.
        h.space
            .write_words(STACK, &[numbers::SYS_WRITE, 7, BASE + PAGE_SIZE, 4]);

        let flow = h.dispatch(&SyscallTable::with_defaults());

        assert_eq!(flow, Flow::Terminated);
        assert_eq!(h.process.exit_status(), -1);
    }

    #[test]
    fn test_write_zero_length() {
        let mut h = Harness::new("echo");
        h.space
            .write_words(STACK, &[numbers::SYS_WRITE, 1, BASE, 0]);

        let flow = h.dispatch(&SyscallTable::with_defaults());

        assert_eq!(flow, Flow::Resume(0));
        assert_eq!(h.console.writes().len(), 1);
        assert!(h.console.writes()[0].is_empty());
    }

    #[test]
    fn test_write_zero_length_still_validates_base() {
        let mut h = Harness::new("echo");
        h.space.unmap(1);
        h.space
            .write_words(STACK, &[numbers::SYS_WRITE, 1, BASE + PAGE_SIZE, 0]);

        let flow = h.dispatch(&SyscallTable::with_defaults());

        assert_eq!(flow, Flow::Terminated);
        assert_eq!(h.process.exit_status(), -1);
    }

    #[test]
    fn test_exit_fixes_status() {
        let mut h = Harness::new("worker");
        h.space.write_words(STACK, &[numbers::SYS_EXIT, 42]);

        let flow = h.dispatch(&SyscallTable::with_defaults());

        assert_eq!(flow, Flow::Terminated);
        assert_eq!(h.process.exit_state(), ExitState::Terminated);
        assert_eq!(h.process.exit_status(), 42);
        assert_eq!(h.console.writes().len(), 1);
        assert_eq!(h.console.writes()[0], b"worker: exit(42)\n");
        assert_eq!(h.scheduler.reclaims(), 1);
    }

    #[test]
    fn test_unknown_number_kills_without_reading_arguments() {
        let mut h = Harness::new("probe");
        h.space.write_words(STACK, &[9999, 1, 2, 3]);

        let flow = h.dispatch(&SyscallTable::with_defaults());

        assert_eq!(flow, Flow::Terminated);
        assert_eq!(h.process.exit_status(), -1);
        // Only the operation number itself was read from user memory.
        assert_eq!(h.space.reads(), [(STACK, WORD_SIZE)]);
    }

    #[test]
    fn test_unmapped_stack_pointer_kills_before_any_read() {
        let mut h = Harness::new("probe");
        h.space.unmap(2);

        let flow = h.dispatch(&SyscallTable::with_defaults());

        assert_eq!(flow, Flow::Terminated);
        assert_eq!(h.process.exit_status(), -1);
        assert!(h.space.reads().is_empty());
        assert_eq!(h.console.writes().len(), 1);
        assert_eq!(h.console.writes()[0], b"probe: exit(-1)\n");
    }

    #[test]
    fn test_registered_operation_dispatches() {
        fn echo_first_arg(args: &SyscallArgs, _ctx: &mut TrapContext<'_>) -> Flow {
            Flow::Resume(args.size(0) as isize)
        }

        let mut table = SyscallTable::with_defaults();
        table
            .register(SyscallDescriptor {
                number: 5,
                name: "echo",
                arity: 1,
                handler: echo_first_arg,
            })
            .unwrap();

        let mut h = Harness::new("custom");
        h.space.write_words(STACK, &[5, 1234]);
        assert_eq!(h.dispatch(&table), Flow::Resume(1234));
    }
}
