//! Syscall Registry
//!
//! Operations are values, not match arms: a [`SyscallDescriptor`] binds an
//! operation number to its arity and handler, and the [`SyscallTable`] maps
//! numbers to descriptors. Adding an operation is a registration, not an
//! edit to a dispatch switch. Lookup never fails; numbers with no
//! registered descriptor resolve to the unsupported-operation handler,
//! which terminates the caller.

use core::fmt;

use crate::trap::TrapContext;

use super::args::{SyscallArgs, MAX_ARGS};
use super::handler::{self, Flow};

/// System call numbers
pub mod numbers {
    pub const SYS_EXIT: usize = 0;
    pub const SYS_WRITE: usize = 1;
}

/// Number of slots in the registry.
pub const TABLE_SIZE: usize = 32;

/// Handler signature: decoded arguments in, control disposition out.
pub type Handler = fn(&SyscallArgs, &mut TrapContext<'_>) -> Flow;

/// One registered operation.
#[derive(Clone, Copy)]
pub struct SyscallDescriptor {
    /// Operation number, which is also the table slot.
    pub number: usize,
    /// Name used in diagnostics only.
    pub name: &'static str,
    /// Argument words the decoder fetches before the handler runs.
    pub arity: usize,
    /// The operation itself.
    pub handler: Handler,
}

impl fmt::Debug for SyscallDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SyscallDescriptor({}: {}/{})",
            self.number, self.name, self.arity
        )
    }
}

/// Error type for registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    /// The operation number is outside the table.
    InvalidNumber,
    /// The slot already holds a descriptor.
    SlotOccupied,
    /// Declared arity exceeds what the decoder will fetch.
    ArityTooLarge,
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNumber => write!(f, "operation number out of range"),
            Self::SlotOccupied => write!(f, "operation number already registered"),
            Self::ArityTooLarge => write!(f, "arity exceeds decoder maximum"),
        }
    }
}

/// Fallback descriptor for every unregistered number.
///
/// Arity 0 keeps the decoder away from argument slots the caller may not
/// even have; the handler terminates the caller.
const UNSUPPORTED: SyscallDescriptor = SyscallDescriptor {
    number: usize::MAX,
    name: "unsupported",
    arity: 0,
    handler: handler::sys_unsupported,
};

/// The operation registry.
#[derive(Debug)]
pub struct SyscallTable {
    slots: [Option<SyscallDescriptor>; TABLE_SIZE],
}

impl SyscallTable {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            slots: [None; TABLE_SIZE],
        }
    }

    /// Create a registry with the baseline operations in place.
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        let defaults = [
            SyscallDescriptor {
                number: numbers::SYS_EXIT,
                name: "exit",
                arity: 1,
                handler: handler::sys_exit,
            },
            SyscallDescriptor {
                number: numbers::SYS_WRITE,
                name: "write",
                arity: 3,
                handler: handler::sys_write,
            },
        ];
        for desc in defaults {
            if let Err(err) = table.register(desc) {
                panic!("baseline operation table is inconsistent: {}", err);
            }
        }
        table
    }

    /// Register an operation.
    pub fn register(&mut self, desc: SyscallDescriptor) -> Result<(), RegisterError> {
        if desc.number >= TABLE_SIZE {
            return Err(RegisterError::InvalidNumber);
        }
        if desc.arity > MAX_ARGS {
            return Err(RegisterError::ArityTooLarge);
        }
        if self.slots[desc.number].is_some() {
            return Err(RegisterError::SlotOccupied);
        }
        self.slots[desc.number] = Some(desc);
        Ok(())
    }

    /// Resolve an operation number.
    ///
    /// Never fails: unknown numbers resolve to the unsupported-operation
    /// descriptor.
    pub fn lookup(&self, number: usize) -> &SyscallDescriptor {
        match self.slots.get(number).and_then(|slot| slot.as_ref()) {
            Some(desc) => desc,
            None => &UNSUPPORTED,
        }
    }

    /// Number of registered operations.
    pub fn count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

impl Default for SyscallTable {
    fn default() -> Self {
        Self::new()
    }
}
