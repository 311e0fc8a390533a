//! Syscall Argument Decoding
//!
//! Arguments travel as machine words on the caller's stack: the operation
//! number at the trapped stack pointer, arguments in the slots above it.
//! The layout is untyped and position-based, so every slot address is
//! validated before its word is read. [`UserStack`] fuses the check and the
//! read; there is no way to fetch a slot without its check.

use crate::mm::{AddressSpace, VirtAddr, WORD_SIZE};

use super::validate;
use super::Fault;

/// Upper bound on declared operation arity.
pub const MAX_ARGS: usize = 6;

/// Bounds-checked reader over the caller's stack frame.
pub struct UserStack<'a> {
    space: &'a dyn AddressSpace,
    sp: VirtAddr,
}

impl<'a> UserStack<'a> {
    /// Wrap the trapped stack pointer. Nothing is accessed until [`word`].
    ///
    /// [`word`]: UserStack::word
    pub fn new(space: &'a dyn AddressSpace, sp: VirtAddr) -> Self {
        Self { space, sp }
    }

    /// Read slot `index`, validating the word's full range first.
    ///
    /// The stack pointer carries no alignment guarantee, so a slot may
    /// straddle a page boundary; both pages must then be mapped.
    pub fn word(&self, index: usize) -> Result<usize, Fault> {
        let offset = index.checked_mul(WORD_SIZE);
        let addr = match offset.and_then(|offset| self.sp.checked_add(offset)) {
            Some(addr) => addr,
            None => return Err(Fault::Memory(self.sp)),
        };
        if !validate::valid_range(addr, WORD_SIZE, self.space) {
            return Err(Fault::Memory(addr));
        }

        // SAFETY: the word's full range was validated just above against
        // the same address space.
        let bytes = unsafe { self.space.user_bytes(addr, WORD_SIZE) };
        let mut word = [0u8; WORD_SIZE];
        word.copy_from_slice(bytes);
        Ok(usize::from_ne_bytes(word))
    }
}

/// Decoded, validated argument words for one operation.
#[derive(Debug, Clone, Copy)]
pub struct SyscallArgs {
    number: usize,
    words: [usize; MAX_ARGS],
    count: usize,
}

impl SyscallArgs {
    /// The operation number from slot 0.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Raw argument word `index`, 0-based past the operation number.
    pub fn word(&self, index: usize) -> usize {
        debug_assert!(index < self.count, "argument index beyond declared arity");
        if index < self.count {
            self.words[index]
        } else {
            0
        }
    }

    /// Argument as a signed integer (the word's low 32 bits).
    pub fn int(&self, index: usize) -> i32 {
        self.word(index) as i32
    }

    /// Argument as a user pointer.
    pub fn ptr(&self, index: usize) -> VirtAddr {
        VirtAddr::new(self.word(index))
    }

    /// Argument as an unsigned size.
    pub fn size(&self, index: usize) -> usize {
        self.word(index)
    }
}

/// Decode `arity` argument words following the operation number.
///
/// Slots are read in order and the first failure aborts the decode, so no
/// partial argument list ever reaches a handler.
pub(crate) fn decode(
    stack: &UserStack<'_>,
    number: usize,
    arity: usize,
) -> Result<SyscallArgs, Fault> {
    debug_assert!(arity <= MAX_ARGS, "descriptor arity beyond decoder maximum");
    let arity = arity.min(MAX_ARGS);

    let mut words = [0usize; MAX_ARGS];
    for slot in 0..arity {
        words[slot] = stack.word(slot + 1)?;
    }
    Ok(SyscallArgs {
        number,
        words,
        count: arity,
    })
}
