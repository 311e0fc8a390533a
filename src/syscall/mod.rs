//! System Call Interface
//!
//! The user/kernel boundary: operation numbers and argument words arrive as
//! machine words on the untrusted user stack, get validated and decoded,
//! and dispatch through a registry to handlers.
//!
//! # Security Model
//! - Whitelist dispatch: only registered operations run; every other number
//!   terminates the caller
//! - Every caller-supplied address is validated against the caller's own
//!   address space before the first byte is read, full ranges included
//! - Faults terminate the offender with the killed status; they are never
//!   error returns to the caller and never kernel panics
//!
//! # Current Operations
//! - 0: exit(status) - terminate the calling process
//! - 1: write(fd, buf, len) - write a user buffer to standard output

use spin::Once;

use crate::mm::VirtAddr;

mod args;
mod handler;
mod table;
mod validate;

pub use args::{SyscallArgs, UserStack, MAX_ARGS};
pub use handler::{dispatch, Flow, STDOUT_FD};
pub use table::{numbers, Handler, RegisterError, SyscallDescriptor, SyscallTable, TABLE_SIZE};
pub use validate::{valid, valid_range, UserSlice};

/// A security fault in the trap path.
///
/// Faults are not errors a caller gets back; the dispatch layer reports
/// them and terminates the offender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// An address failed validation.
    Memory(VirtAddr),
    /// The operation number has no registered descriptor.
    Unsupported(usize),
}

impl core::fmt::Display for Fault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Memory(addr) => write!(f, "memory fault at {}", addr),
            Self::Unsupported(number) => write!(f, "unimplemented system call {}", number),
        }
    }
}

static TABLE: Once<SyscallTable> = Once::new();

/// Install the baseline syscall table.
///
/// Called once at boot, before the trap vector is armed. Harmless if a
/// dispatch beats it there: installation is idempotent.
pub fn init() {
    let table = installed_table();
    log::info!("syscall table ready, {} operations", table.count());
}

/// The installed table, installing the baseline on first use.
pub(crate) fn installed_table() -> &'static SyscallTable {
    TABLE.call_once(SyscallTable::with_defaults)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mm::VirtAddr;

    #[test]
    fn test_fault_display() {
        let fault = Fault::Memory(VirtAddr::new(0x40_0000));
        assert_eq!(
            format!("{}", fault),
            "memory fault at 0x0000000000400000"
        );
        assert_eq!(
            format!("{}", Fault::Unsupported(9999)),
            "unimplemented system call 9999"
        );
    }

    #[test]
    fn test_installed_table_has_defaults() {
        init();
        let table = installed_table();
        assert_eq!(table.count(), 2);
        assert_eq!(table.lookup(numbers::SYS_EXIT).name, "exit");
    }
}
