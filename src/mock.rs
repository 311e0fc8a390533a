//! Mock collaborators for unit tests
//!
//! A simulated address space, console, and scheduler so the trap path can
//! be exercised hosted, with no page tables or devices behind it.

use std::cell::RefCell;

use crate::console::Console;
use crate::mm::{AddressSpace, PageFlags, VirtAddr, PAGE_SIZE};
use crate::process::Scheduler;

/// In-memory address space over a contiguous arena of pages.
///
/// Pages can be unmapped or remapped with arbitrary flags to model holes
/// and supervisor-only mappings. Every `user_bytes` borrow is logged so
/// tests can assert exactly which user memory the kernel touched.
pub(crate) struct MockSpace {
    base: usize,
    mem: Vec<u8>,
    flags: Vec<Option<PageFlags>>,
    reads: RefCell<Vec<(usize, usize)>>,
}

impl MockSpace {
    /// An arena of `pages` pages at `base`, all mapped user-accessible.
    pub fn new(base: usize, pages: usize) -> Self {
        assert_eq!(base % PAGE_SIZE, 0, "arena base must be page-aligned");
        Self {
            base,
            mem: vec![0; pages * PAGE_SIZE],
            flags: vec![Some(PageFlags::USER_RW); pages],
            reads: RefCell::new(Vec::new()),
        }
    }

    /// Drop the mapping of the `index`-th arena page.
    pub fn unmap(&mut self, index: usize) {
        self.flags[index] = None;
    }

    /// Override the flags of the `index`-th arena page.
    pub fn set_flags(&mut self, index: usize, flags: PageFlags) {
        self.flags[index] = Some(flags);
    }

    /// Poke bytes into the arena.
    pub fn write(&mut self, addr: usize, bytes: &[u8]) {
        let offset = addr - self.base;
        self.mem[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Lay out machine words at `addr`, the shape of a syscall frame.
    pub fn write_words(&mut self, addr: usize, words: &[usize]) {
        for (i, word) in words.iter().enumerate() {
            self.write(addr + i * core::mem::size_of::<usize>(), &word.to_ne_bytes());
        }
    }

    /// Every `(addr, len)` the kernel borrowed from user memory.
    pub fn reads(&self) -> Vec<(usize, usize)> {
        self.reads.borrow().clone()
    }
}

impl AddressSpace for MockSpace {
    fn lookup(&self, page: VirtAddr) -> Option<PageFlags> {
        let addr = page.as_usize();
        if addr < self.base {
            return None;
        }
        let index = (addr - self.base) / PAGE_SIZE;
        self.flags.get(index).copied().flatten()
    }

    unsafe fn user_bytes(&self, addr: VirtAddr, len: usize) -> &[u8] {
        self.reads.borrow_mut().push((addr.as_usize(), len));
        let offset = addr.as_usize() - self.base;
        &self.mem[offset..offset + len]
    }
}

/// Console that records each atomic write separately.
pub(crate) struct MockConsole {
    writes: Vec<Vec<u8>>,
}

impl MockConsole {
    pub fn new() -> Self {
        Self { writes: Vec::new() }
    }

    /// The recorded writes, one entry per `write_bytes` call.
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }
}

impl Console for MockConsole {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.writes.push(bytes.to_vec());
    }
}

/// Scheduler that counts teardown requests.
pub(crate) struct MockScheduler {
    reclaims: usize,
}

impl MockScheduler {
    pub fn new() -> Self {
        Self { reclaims: 0 }
    }

    pub fn reclaims(&self) -> usize {
        self.reclaims
    }
}

impl Scheduler for MockScheduler {
    fn reclaim_current(&mut self) {
        self.reclaims += 1;
    }
}
