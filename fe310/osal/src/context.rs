//! Execution level tokens.
//!
//! Thread code and interrupt code reach the same exclusion state through
//! different kernel entry points, and mixing them up corrupts the kernel.
//! Each entry point therefore demands the matching token. Tokens are
//! neither `Send` nor `Sync`, so a token minted in one level cannot be
//! smuggled into another.

use core::marker::PhantomData;

/// Proof that the caller runs at thread level.
#[derive(Debug)]
pub struct ThreadContext {
    _not_send: PhantomData<*const ()>,
}

impl ThreadContext {
    /// # Safety
    ///
    /// Must only be called from thread-level code (never from a trap
    /// handler), typically once per thread at its entry point.
    pub unsafe fn enter() -> Self {
        Self {
            _not_send: PhantomData,
        }
    }
}

/// Proof that the caller runs inside an interrupt service routine.
#[derive(Debug)]
pub struct IsrContext {
    _not_send: PhantomData<*const ()>,
}

impl IsrContext {
    /// # Safety
    ///
    /// Must only be called by the trap handler for the duration of one
    /// interrupt, with the token dropped before the trap returns.
    pub unsafe fn enter() -> Self {
        Self {
            _not_send: PhantomData,
        }
    }
}
