//! Process Records and Termination
//!
//! The boundary layer owns the moment a process dies: explicit exit requests
//! and every validation failure in the trap path funnel into [`terminate`],
//! which fixes the exit status exactly once, reports it, and hands the
//! thread back to the scheduler.
//!
//! # Security Model
//! - The exit status is write-once: the first terminator wins and later
//!   attempts change nothing
//! - The status line is emitted once per process, as a single console write
//! - Exception handlers reuse the same path, so a process killed for a bad
//!   pointer is indistinguishable from one that called exit(-1)

use core::fmt::{self, Write};

use spin::Mutex;

use crate::console::Console;

/// Capacity of a process name, in bytes.
pub const NAME_CAPACITY: usize = 16;

/// Exit status recorded for a process killed by the kernel.
pub const KILLED: i32 = -1;

/// Lifecycle of a process crossing the termination path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    /// Normal execution; the exit status still holds the killed sentinel.
    Running,
    /// Termination has begun and the status is fixed.
    Terminating,
    /// The record is final; nothing about it changes again.
    Terminated,
}

#[derive(Debug, Clone, Copy)]
struct ExitRecord {
    state: ExitState,
    status: i32,
}

/// Per-process record, as seen by the syscall boundary.
///
/// The scheduler owns the full thread control block; this layer needs the
/// name (for the status line) and the exit record (shared with the parent's
/// wait path, hence the lock).
#[derive(Debug)]
pub struct Process {
    name: [u8; NAME_CAPACITY],
    name_len: usize,
    exit: Mutex<ExitRecord>,
}

impl Process {
    /// Create a record for a freshly loaded process.
    ///
    /// Names longer than [`NAME_CAPACITY`] bytes are truncated at a
    /// character boundary.
    pub fn new(name: &str) -> Self {
        let mut buf = [0u8; NAME_CAPACITY];
        let mut len = name.len().min(NAME_CAPACITY);
        while !name.is_char_boundary(len) {
            len -= 1;
        }
        buf[..len].copy_from_slice(&name.as_bytes()[..len]);
        Self {
            name: buf,
            name_len: len,
            exit: Mutex::new(ExitRecord {
                state: ExitState::Running,
                status: KILLED,
            }),
        }
    }

    /// The process name.
    pub fn name(&self) -> &str {
        core::str::from_utf8(&self.name[..self.name_len]).unwrap_or("?")
    }

    /// Current position in the termination lifecycle.
    pub fn exit_state(&self) -> ExitState {
        self.exit.lock().state
    }

    /// The recorded exit status.
    ///
    /// Holds the killed sentinel until termination fixes it; the parent's
    /// wait path reads it once the process has terminated.
    pub fn exit_status(&self) -> i32 {
        self.exit.lock().status
    }

    /// Move `RUNNING -> TERMINATING`, fixing the status.
    ///
    /// Returns false if termination had already begun; the stored status is
    /// untouched in that case.
    fn begin_exit(&self, status: i32) -> bool {
        let mut exit = self.exit.lock();
        if exit.state != ExitState::Running {
            return false;
        }
        exit.state = ExitState::Terminating;
        exit.status = status;
        true
    }

    /// Move `TERMINATING -> TERMINATED`.
    fn finish_exit(&self) {
        let mut exit = self.exit.lock();
        debug_assert_eq!(exit.state, ExitState::Terminating);
        exit.state = ExitState::Terminated;
    }
}

/// Thread-teardown entry point into the scheduler.
pub trait Scheduler {
    /// Reclaim the calling thread.
    ///
    /// Kernel implementations unschedule the thread and switch away, never
    /// returning control to user mode; test doubles record the call.
    fn reclaim_current(&mut self);
}

/// Terminate `process` with `status`.
///
/// The first caller wins: the status is fixed, one
/// `<process-name>: exit(<status>)` line goes to the console, the record
/// becomes final, and the thread is handed to the scheduler. A later call
/// for the same process changes nothing and emits nothing.
///
/// The record reaches `TERMINATED` before the scheduler is involved, so any
/// waiter the scheduler wakes sees the final status.
pub fn terminate(
    process: &Process,
    console: &mut dyn Console,
    scheduler: &mut dyn Scheduler,
    status: i32,
) {
    if !process.begin_exit(status) {
        return;
    }

    let mut line = LineBuf::new();
    let _ = write!(line, "{}: exit({})\n", process.name(), status);
    console.write_bytes(line.as_bytes());

    log::debug!("{} terminated with status {}", process.name(), status);

    process.finish_exit();
    scheduler.reclaim_current();
}

/// Fixed-capacity buffer so the status line reaches the console in a single
/// call. Overflow truncates the line rather than panicking.
struct LineBuf {
    buf: [u8; 64],
    len: usize,
}

impl LineBuf {
    const fn new() -> Self {
        Self {
            buf: [0; 64],
            len: 0,
        }
    }

    fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl fmt::Write for LineBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let room = self.buf.len() - self.len;
        let n = bytes.len().min(room);
        self.buf[self.len..self.len + n].copy_from_slice(&bytes[..n]);
        self.len += n;
        if n < bytes.len() {
            return Err(fmt::Error);
        }
        Ok(())
    }
}
