//! Address-Space Interface
//!
//! The page-table machinery lives in the memory-management subsystem proper;
//! the syscall boundary needs exactly two things from it: "is this page
//! mapped for the calling process?" and, once a whole range has been
//! validated, "lend me those bytes".
//!
//! # Security Model
//! - `lookup` is the membership test behind pointer validation; it is called
//!   on attacker-chosen addresses and must never fault or allocate
//! - `user_bytes` is the only way user memory becomes visible to kernel
//!   code, and it is unsafe: the caller proves the range was validated first

use bitflags::bitflags;

use super::address::VirtAddr;

bitflags! {
    /// Permission and status bits for one mapped page, as reported by the
    /// owning process's page tables.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PageFlags: u64 {
        /// The page is backed by a frame.
        const PRESENT = 1 << 0;
        /// The page may be written.
        const WRITABLE = 1 << 1;
        /// The page is reachable from user mode.
        const USER = 1 << 2;

        /// A normal user data mapping.
        const USER_RW = Self::PRESENT.bits() | Self::WRITABLE.bits() | Self::USER.bits();
    }
}

impl PageFlags {
    /// Whether the mapping lets user mode touch the page.
    ///
    /// Presence alone is not enough: a supervisor-only page below the user
    /// limit is still off limits to user pointers.
    #[inline]
    pub fn user_accessible(self) -> bool {
        self.contains(Self::PRESENT) && self.contains(Self::USER)
    }
}

/// One process's view of virtual memory.
///
/// Implemented over real page tables by the paging subsystem and by in-memory
/// fakes in the unit tests; the syscall layer is written against this seam so
/// it can be exercised without a booted machine.
pub trait AddressSpace {
    /// Look up the mapping for the page whose base address is `page`.
    ///
    /// Returns `None` for unmapped pages. Any internal lookup failure is
    /// reported as `None`, never propagated.
    fn lookup(&self, page: VirtAddr) -> Option<PageFlags>;

    /// Borrow `len` bytes of user memory starting at `addr`.
    ///
    /// # Safety
    /// Every byte of `[addr, addr + len)` must have passed validation against
    /// this same address space, and the mappings must not change for the
    /// lifetime of the borrow. Both hold inside a synchronous trap, where the
    /// inspected space belongs exclusively to the calling process.
    unsafe fn user_bytes(&self, addr: VirtAddr, len: usize) -> &[u8];
}
