//! Interrupt source dispatch.
//!
//! Every source slot starts out unhandled. Slots are bound to handlers once,
//! while the table is being built at boot; the finished table is immutable.
//! An interrupt from a slot nobody registered means the platform is
//! misconfigured, so it halts instead of being ignored.

use fe310_hal::SourceId;
use fe310_osal::IsrContext;
use log::error;

use crate::params::FE310_NUM_SOURCES;

/// Dispatch table sized for FE310-G002.
pub type Fe310DispatchTable<'a> = DispatchTable<'a, FE310_NUM_SOURCES>;

/// Something that services one interrupt source.
pub trait InterruptHandler: Sync {
    /// Called from the trap handler between claim and complete.
    fn on_interrupt(&self, isr: &IsrContext);
}

/// Adapts a closure into an [`InterruptHandler`].
pub struct FnHandler<F>(pub F);

impl<F: Fn(&IsrContext) + Sync> InterruptHandler for FnHandler<F> {
    fn on_interrupt(&self, isr: &IsrContext) {
        (self.0)(isr)
    }
}

/// Halts on an interrupt with no registered handler.
#[cold]
pub fn unhandled_interrupt(source: SourceId) -> ! {
    error!("unhandled PLIC interrupt {source}");
    panic!("unhandled PLIC interrupt {source}");
}

/// Fixed map from source id to handler; slot 0 is never populated.
pub struct DispatchTable<'a, const N: usize> {
    entries: [Option<&'a dyn InterruptHandler>; N],
}

impl<'a, const N: usize> DispatchTable<'a, N> {
    /// A table where every source is unhandled.
    pub const fn empty() -> Self {
        Self { entries: [None; N] }
    }

    pub fn builder() -> DispatchTableBuilder<'a, N> {
        DispatchTableBuilder {
            table: Self::empty(),
        }
    }

    pub fn is_registered(&self, source: SourceId) -> bool {
        matches!(self.entries.get(source.index()), Some(Some(_)))
    }

    /// Run the handler bound to `source`.
    pub fn dispatch(&self, source: SourceId, isr: &IsrContext) {
        match self.entries.get(source.index()) {
            Some(Some(handler)) => handler.on_interrupt(isr),
            _ => unhandled_interrupt(source),
        }
    }
}

impl<const N: usize> Default for DispatchTable<'_, N> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Collects handler registrations before the table is frozen.
pub struct DispatchTableBuilder<'a, const N: usize> {
    table: DispatchTable<'a, N>,
}

impl<'a, const N: usize> DispatchTableBuilder<'a, N> {
    /// Bind `handler` to `source`.
    ///
    /// # Panics
    ///
    /// Panics if `source` does not fit the table or is already bound; both
    /// are board configuration bugs.
    pub fn register(mut self, source: SourceId, handler: &'a dyn InterruptHandler) -> Self {
        let slot = self
            .table
            .entries
            .get_mut(source.index())
            .unwrap_or_else(|| panic!("{source} beyond dispatch table of {N} slots"));
        assert!(slot.is_none(), "{source} registered twice");
        *slot = Some(handler);
        self
    }

    pub fn build(self) -> DispatchTable<'a, N> {
        self.table
    }
}
