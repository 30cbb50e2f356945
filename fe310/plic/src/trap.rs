//! Machine external interrupt entry.

use fe310_hal::{ContextId, InterruptController};
use fe310_osal::IsrContext;
use log::trace;

use crate::dispatch::DispatchTable;

/// The single handler behind the machine external interrupt vector.
///
/// One trap drains the controller: it keeps claiming until nothing is
/// pending, so back-to-back sources cost one trap prologue, not one each.
/// Sources are serviced strictly one at a time, each completed before the
/// next claim.
pub struct ExternalInterrupts<'a, C, const N: usize> {
    controller: C,
    table: DispatchTable<'a, N>,
}

impl<'a, C: InterruptController, const N: usize> ExternalInterrupts<'a, C, N> {
    pub fn new(controller: C, table: DispatchTable<'a, N>) -> Self {
        Self { controller, table }
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn table(&self) -> &DispatchTable<'a, N> {
        &self.table
    }

    /// Trap entry.
    ///
    /// # Safety
    ///
    /// Must only be called from the machine external interrupt trap, with
    /// interrupts masked at the core.
    pub unsafe fn on_external_trap(&self) {
        let isr = IsrContext::enter();
        self.service(&isr);
    }

    /// Claim, dispatch and complete until the controller reports nothing
    /// pending. Returns the number of sources served.
    pub fn service(&self, isr: &IsrContext) -> usize {
        let context = ContextId::HART0_MACHINE;
        let mut served = 0;

        while let Some(source) = self.controller.claim(context) {
            trace!("plic: dispatch {source}");
            self.table.dispatch(source, isr);
            self.controller.complete(context, source);
            served += 1;
        }

        served
    }
}
