//! Memory interfaces for OcelotOS's syscall boundary
//!
//! Provides:
//! - The virtual-address vocabulary (page geometry, user/kernel split)
//! - The per-process address-space seam used for pointer validation
//!
//! Page tables, frame allocation, and the kernel heap live in the
//! memory-management subsystem proper and reach this layer only through
//! the [`AddressSpace`] trait.

mod address;
mod space;

pub use address::{VirtAddr, PAGE_SIZE, USER_LIMIT, WORD_SIZE};
pub use space::{AddressSpace, PageFlags};
