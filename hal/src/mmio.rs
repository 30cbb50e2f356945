//! Memory-mapped register access
//!
//! Drivers never touch raw pointers. They address their register block
//! through a [`RegisterBus`] by byte offset, which lets the same driver run
//! against silicon ([`Mmio`]) or a behavioural model on the host.

/// 32-bit register block addressed by byte offset.
///
/// Every call is one bus access. Reads may have side effects (popping a
/// FIFO, claiming an interrupt), so callers must not read speculatively.
pub trait RegisterBus {
    fn read32(&self, offset: usize) -> u32;

    fn write32(&self, offset: usize, value: u32);

    /// Read-modify-write of one register. Not atomic with respect to other
    /// execution levels; callers hold the system lock when that matters.
    fn modify32<F>(&self, offset: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
        Self: Sized,
    {
        let value = self.read32(offset);
        self.write32(offset, f(value));
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for &B {
    fn read32(&self, offset: usize) -> u32 {
        (**self).read32(offset)
    }

    fn write32(&self, offset: usize, value: u32) {
        (**self).write32(offset, value)
    }
}

#[cfg(feature = "std")]
impl<B: RegisterBus + ?Sized> RegisterBus for std::sync::Arc<B> {
    fn read32(&self, offset: usize) -> u32 {
        (**self).read32(offset)
    }

    fn write32(&self, offset: usize, value: u32) {
        (**self).write32(offset, value)
    }
}

/// Volatile access to a physical register block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// # Safety
    ///
    /// `base` must be the address of a mapped register block large enough
    /// for every offset the owning driver uses, and that driver must be its
    /// only user.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    pub const fn base(&self) -> usize {
        self.base
    }
}

impl RegisterBus for Mmio {
    #[inline]
    fn read32(&self, offset: usize) -> u32 {
        // SAFETY: validity of `base + offset` is the contract of `Mmio::new`.
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u32) }
    }

    #[inline]
    fn write32(&self, offset: usize, value: u32) {
        // SAFETY: as above.
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }
}
