//! Virtual Address Type
//!
//! Type-safe wrapper for the virtual addresses user programs hand the kernel.
//!
//! # Security Properties
//! - Untrusted addresses are stored exactly as received; nothing here
//!   canonicalizes or otherwise repairs attacker-controlled values
//! - Arithmetic on untrusted addresses is checked, never wrapping
//! - Nothing on this type dereferences; turning an address into bytes
//!   goes through the address-space interface after validation

use core::fmt;

/// Page size (4 KiB)
pub const PAGE_SIZE: usize = 4096;
/// Page size mask
pub const PAGE_MASK: usize = PAGE_SIZE - 1;
/// Machine word size; one syscall stack slot
pub const WORD_SIZE: usize = core::mem::size_of::<usize>();

/// Exclusive upper bound of user space.
///
/// User space is the canonical lower half (bit 47 clear). Everything at or
/// above this limit, including the non-canonical hole and the higher-half
/// kernel mappings, is never a legal user pointer.
pub const USER_LIMIT: usize = 0x0000_8000_0000_0000;

/// A virtual memory address.
///
/// This is a newtype wrapper so raw integers from a trap frame cannot be
/// confused with addresses the kernel has already judged.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct VirtAddr(usize);

impl VirtAddr {
    /// Wrap a raw address value.
    ///
    /// Untrusted input is stored verbatim; judging it is the validator's job.
    #[inline]
    pub const fn new(addr: usize) -> Self {
        Self(addr)
    }

    /// Get the raw address value.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0
    }

    /// Check for the null address.
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Check if the address lies strictly below the user-space limit.
    #[inline]
    pub const fn is_user(self) -> bool {
        self.0 < USER_LIMIT
    }

    /// Align the address down to the containing page boundary.
    #[inline]
    pub const fn align_down(self) -> Self {
        Self(self.0 & !PAGE_MASK)
    }

    /// Add an offset, failing on address-space wraparound.
    #[inline]
    pub const fn checked_add(self, offset: usize) -> Option<Self> {
        match self.0.checked_add(offset) {
            Some(addr) => Some(Self(addr)),
            None => None,
        }
    }
}

impl fmt::Debug for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtAddr({:#018x})", self.0)
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
