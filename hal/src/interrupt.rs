//! Interrupt controller abstraction

use core::fmt;
use core::num::NonZeroU32;

use crate::error::{HalError, HalResult};

/// Number of an external interrupt source.
///
/// Source 0 is reserved by the claim/complete protocol to mean "nothing
/// pending", so it has no representation here: a claim that finds nothing
/// yields `None` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(NonZeroU32);

impl SourceId {
    /// Creates a source id from a platform constant.
    ///
    /// # Panics
    ///
    /// Panics (at compile time when used in a const) if `id` is 0.
    pub const fn from_raw(id: u32) -> Self {
        match NonZeroU32::new(id) {
            Some(id) => SourceId(id),
            None => panic!("interrupt source 0 is reserved"),
        }
    }

    /// Decodes the value read back from a claim register.
    pub const fn from_claim(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(id) => Some(SourceId(id)),
            None => None,
        }
    }

    /// Get the raw source number
    pub const fn raw(self) -> u32 {
        self.0.get()
    }

    /// Index into per-source tables.
    pub const fn index(self) -> usize {
        self.0.get() as usize
    }
}

impl TryFrom<u32> for SourceId {
    type Error = HalError;

    fn try_from(id: u32) -> HalResult<Self> {
        Self::from_claim(id).ok_or(HalError::InvalidParameter)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "irq{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SourceId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "irq{}", self.0.get());
    }
}

/// A hardware execution unit's view into the interrupt controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextId(u32);

impl ContextId {
    /// Machine mode of hart 0, the only context on single-hart parts.
    pub const HART0_MACHINE: ContextId = ContextId(0);

    pub const fn new(id: u32) -> Self {
        ContextId(id)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ContextId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "ctx{}", self.0);
    }
}

/// Interrupt priority; larger values win, 0 never interrupts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Priority(u32);

impl Priority {
    /// A source at this priority can never be claimed.
    pub const DISABLED: Priority = Priority(0);

    /// Create a priority that can actually fire.
    pub fn new(priority: u32) -> HalResult<Self> {
        if priority == 0 {
            Err(HalError::InvalidParameter)
        } else {
            Ok(Priority(priority))
        }
    }

    /// Create priority without validation (const fn)
    pub const fn new_unchecked(priority: u32) -> Self {
        Priority(priority)
    }

    /// Get the raw priority value
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Priority({})", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Priority {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Priority({})", self.0);
    }
}

/// Priority-based external interrupt controller with a claim/complete
/// handshake.
///
/// None of the operations can fail: out-of-range ids or a `complete` that
/// does not match the preceding `claim` are contract violations with
/// undefined hardware effect, exactly as on silicon.
pub trait InterruptController {
    /// Zero every priority, enable bit and context threshold.
    fn init(&self);

    /// Set the source priority and enable it for context 0.
    fn enable(&self, source: SourceId, priority: Priority);

    /// Clear the source enable bit; the priority is left as is.
    fn disable(&self, source: SourceId);

    /// Take ownership of the highest-priority pending source, if any.
    fn claim(&self, context: ContextId) -> Option<SourceId>;

    /// Release a source previously returned by [`claim`](Self::claim).
    fn complete(&self, context: ContextId, source: SourceId);

    /// Only sources with a priority above `threshold` interrupt `context`.
    fn set_threshold(&self, context: ContextId, threshold: Priority);

    /// Check if interrupt is pending
    fn is_pending(&self, source: SourceId) -> bool;
}

impl<C: InterruptController + ?Sized> InterruptController for &C {
    fn init(&self) {
        (**self).init()
    }

    fn enable(&self, source: SourceId, priority: Priority) {
        (**self).enable(source, priority)
    }

    fn disable(&self, source: SourceId) {
        (**self).disable(source)
    }

    fn claim(&self, context: ContextId) -> Option<SourceId> {
        (**self).claim(context)
    }

    fn complete(&self, context: ContextId, source: SourceId) {
        (**self).complete(context, source)
    }

    fn set_threshold(&self, context: ContextId, threshold: Priority) {
        (**self).set_threshold(context, threshold)
    }

    fn is_pending(&self, source: SourceId) -> bool {
        (**self).is_pending(source)
    }
}
