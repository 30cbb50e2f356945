//! PLIC register map.
//!
//! All offsets are bytes from the controller base and address 32-bit
//! registers. Bitmaps pack 32 sources per word, source `n` in bit `n % 32`
//! of word `n / 32`.

use fe310_hal::{ContextId, SourceId};

/// Base address of the controller on FE310-G002.
pub const PLIC_BASE: usize = 0x0C00_0000;

pub const PRIORITY_BASE: usize = 0x00_0000;
pub const PENDING_BASE: usize = 0x00_1000;
pub const ENABLE_BASE: usize = 0x00_2000;
pub const ENABLE_STRIDE: usize = 0x80;
pub const CONTEXT_BASE: usize = 0x20_0000;
pub const CONTEXT_STRIDE: usize = 0x1000;

/// Offset of the priority register of `source`.
pub const fn priority(source: SourceId) -> usize {
    PRIORITY_BASE + 4 * source.index()
}

/// Offset of pending word `word`.
pub const fn pending(word: usize) -> usize {
    PENDING_BASE + 4 * word
}

/// Offset of enable word `word` of `context`.
pub const fn enable(context: ContextId, word: usize) -> usize {
    ENABLE_BASE + ENABLE_STRIDE * context.index() + 4 * word
}

pub const fn threshold(context: ContextId) -> usize {
    CONTEXT_BASE + CONTEXT_STRIDE * context.index()
}

/// Read claims, write completes.
pub const fn claim_complete(context: ContextId) -> usize {
    CONTEXT_BASE + CONTEXT_STRIDE * context.index() + 4
}

/// Bitmap word holding `source`.
pub const fn word(source: SourceId) -> usize {
    source.index() / 32
}

/// Bit of `source` inside its bitmap word.
pub const fn bit(source: SourceId) -> u32 {
    1 << (source.raw() % 32)
}
