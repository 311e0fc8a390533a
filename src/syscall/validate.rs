//! User-Pointer Validation
//!
//! Every address a user program hands the kernel is hostile until proven
//! otherwise. This module is the single gate: the trap path validates the
//! stack pointer, each argument slot, and every page of every buffer range
//! here before one byte is read.
//!
//! # Security Principles
//! - Validate ALL of a range, not just its first byte: a buffer may begin
//!   in mapped memory and run off the end of it
//! - Fail-secure: lookup failures, overflow, and the null address all deny
//! - No side effects and no caching; mappings are re-judged on every access

use crate::mm::{AddressSpace, VirtAddr, PAGE_SIZE};

use super::Fault;

/// Validate a single user address.
///
/// True only if `addr` is non-null, lies strictly below the user-space
/// limit, and its page is mapped user-accessible in `space`. Never faults;
/// a failed page lookup is simply "invalid".
pub fn valid(addr: VirtAddr, space: &dyn AddressSpace) -> bool {
    if addr.is_null() || !addr.is_user() {
        return false;
    }
    match space.lookup(addr.align_down()) {
        Some(flags) => flags.user_accessible(),
        None => false,
    }
}

/// Validate every page touched by `[addr, addr + len)`.
///
/// Checks the page holding the first byte, the page holding the last byte,
/// and every page boundary crossed in between. A zero-length range still
/// requires a valid base address.
pub fn valid_range(addr: VirtAddr, len: usize, space: &dyn AddressSpace) -> bool {
    if len == 0 {
        return valid(addr, space);
    }

    let last = match addr.checked_add(len - 1) {
        Some(last) => last,
        None => return false,
    };
    if !last.is_user() {
        return false;
    }

    let mut cur = addr;
    loop {
        if !valid(cur, space) {
            return false;
        }
        match cur.align_down().checked_add(PAGE_SIZE) {
            Some(next) if next <= last => cur = next,
            _ => return true,
        }
    }
}

/// A user buffer whose full byte range has passed validation.
///
/// Constructing one is the only way handler code reaches user buffer memory;
/// the borrow is taken from the same address space the range was validated
/// against.
pub struct UserSlice<'a> {
    space: &'a dyn AddressSpace,
    addr: VirtAddr,
    len: usize,
}

impl<'a> UserSlice<'a> {
    /// Validate `[addr, addr + len)` and wrap it.
    pub fn new(space: &'a dyn AddressSpace, addr: VirtAddr, len: usize) -> Result<Self, Fault> {
        if !valid_range(addr, len, space) {
            return Err(Fault::Memory(addr));
        }
        Ok(Self { space, addr, len })
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Borrow the user bytes.
    pub fn bytes(&self) -> &[u8] {
        // SAFETY: the whole range was validated against `space` when this
        // handle was constructed, and the mappings cannot change under a
        // synchronous trap on the owning thread.
        unsafe { self.space.user_bytes(self.addr, self.len) }
    }
}
