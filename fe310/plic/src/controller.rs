//! PLIC driver.

use fe310_hal::{ContextId, InterruptController, Mmio, Priority, RegisterBus, SourceId};
use log::debug;

use crate::params::PlicParams;
use crate::regs;

/// Driver for a PLIC register block.
///
/// The register block is the only state: nothing is cached, so the driver
/// can be shared freely between thread level and the trap handler.
pub struct Plic<B: RegisterBus> {
    bus: B,
    params: PlicParams,
}

impl Plic<Mmio> {
    /// The FE310-G002 controller at its fixed address.
    ///
    /// # Safety
    ///
    /// Must be called at most once, on an FE310-G002.
    pub const unsafe fn fe310() -> Self {
        Self::new(Mmio::new(regs::PLIC_BASE), PlicParams::FE310_G002)
    }
}

impl<B: RegisterBus> Plic<B> {
    pub const fn new(bus: B, params: PlicParams) -> Self {
        Self { bus, params }
    }

    pub fn params(&self) -> &PlicParams {
        &self.params
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Current priority of `source`.
    pub fn priority(&self, source: SourceId) -> Priority {
        Priority::new_unchecked(self.bus.read32(regs::priority(source)))
    }

    /// Whether `source` is enabled for context 0.
    pub fn is_enabled(&self, source: SourceId) -> bool {
        let word = self.bus.read32(regs::enable(ContextId::HART0_MACHINE, regs::word(source)));
        word & regs::bit(source) != 0
    }

    pub fn threshold(&self, context: ContextId) -> Priority {
        Priority::new_unchecked(self.bus.read32(regs::threshold(context)))
    }

    fn check_source(&self, source: SourceId) {
        debug_assert!(
            self.params.has_source(source),
            "{source} outside controller range"
        );
    }
}

impl<B: RegisterBus> InterruptController for Plic<B> {
    fn init(&self) {
        for source in self.params.sources() {
            self.bus.write32(regs::priority(source), 0);
        }

        for context in 0..self.params.num_contexts as u32 {
            let context = ContextId::new(context);
            for word in 0..self.params.bitmap_words() {
                self.bus.write32(regs::enable(context, word), 0);
            }
            self.bus.write32(regs::threshold(context), 0);
        }

        debug!(
            "plic: {} sources, {} contexts reset",
            self.params.num_sources - 1,
            self.params.num_contexts
        );
    }

    fn enable(&self, source: SourceId, priority: Priority) {
        self.check_source(source);
        debug_assert!(
            priority > Priority::DISABLED && priority <= self.params.max_priority,
            "{priority} out of range for {source}"
        );

        self.bus.write32(regs::priority(source), priority.raw());
        self.bus.modify32(
            regs::enable(ContextId::HART0_MACHINE, regs::word(source)),
            |word| word | regs::bit(source),
        );
        debug!("plic: {source} enabled at {priority}");
    }

    fn disable(&self, source: SourceId) {
        self.check_source(source);

        self.bus.modify32(
            regs::enable(ContextId::HART0_MACHINE, regs::word(source)),
            |word| word & !regs::bit(source),
        );
        debug!("plic: {source} disabled");
    }

    fn claim(&self, context: ContextId) -> Option<SourceId> {
        SourceId::from_claim(self.bus.read32(regs::claim_complete(context)))
    }

    fn complete(&self, context: ContextId, source: SourceId) {
        self.bus.write32(regs::claim_complete(context), source.raw());
    }

    fn set_threshold(&self, context: ContextId, threshold: Priority) {
        debug_assert!(threshold <= self.params.max_priority);
        self.bus.write32(regs::threshold(context), threshold.raw());
    }

    fn is_pending(&self, source: SourceId) -> bool {
        self.bus.read32(regs::pending(regs::word(source))) & regs::bit(source) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    /// Plain memory: no claim semantics, just remembers writes.
    #[derive(Default)]
    struct Memory {
        cells: RefCell<BTreeMap<usize, u32>>,
        writes: RefCell<Vec<(usize, u32)>>,
    }

    impl RegisterBus for Memory {
        fn read32(&self, offset: usize) -> u32 {
            self.cells.borrow().get(&offset).copied().unwrap_or(0)
        }

        fn write32(&self, offset: usize, value: u32) {
            self.cells.borrow_mut().insert(offset, value);
            self.writes.borrow_mut().push((offset, value));
        }
    }

    fn plic() -> Plic<Memory> {
        Plic::new(Memory::default(), PlicParams::FE310_G002)
    }

    #[test]
    fn init_clears_priorities_enables_and_threshold() {
        let plic = plic();
        plic.bus.write32(regs::priority(SourceId::from_raw(9)), 4);
        plic.bus.write32(regs::enable(ContextId::HART0_MACHINE, 1), u32::MAX);
        plic.bus.write32(regs::threshold(ContextId::HART0_MACHINE), 3);
        plic.bus.writes.borrow_mut().clear();

        plic.init();

        let writes = plic.bus.writes.borrow();
        // 52 priorities, 2 enable words, 1 threshold.
        assert_eq!(writes.len(), 55);
        assert!(writes.iter().all(|&(_, value)| value == 0));
        assert!(writes.iter().all(|&(offset, _)| offset != regs::PRIORITY_BASE));
        assert_eq!(plic.priority(SourceId::from_raw(9)), Priority::DISABLED);
        assert_eq!(plic.threshold(ContextId::HART0_MACHINE), Priority::DISABLED);
    }

    #[test]
    fn enable_sets_priority_and_bit_in_the_right_word() {
        let plic = plic();
        let low = SourceId::from_raw(3);
        let high = SourceId::from_raw(40);

        plic.enable(low, Priority::new_unchecked(1));
        plic.enable(high, Priority::new_unchecked(6));

        assert_eq!(plic.bus.read32(0x2000), 1 << 3);
        assert_eq!(plic.bus.read32(0x2004), 1 << 8);
        assert_eq!(plic.priority(high).raw(), 6);
        assert!(plic.is_enabled(low) && plic.is_enabled(high));
    }

    #[test]
    fn disable_leaves_priority_and_neighbours() {
        let plic = plic();
        let uart0 = SourceId::from_raw(3);
        let uart1 = SourceId::from_raw(4);
        plic.enable(uart0, Priority::new_unchecked(1));
        plic.enable(uart1, Priority::new_unchecked(1));

        plic.disable(uart0);

        assert!(!plic.is_enabled(uart0));
        assert!(plic.is_enabled(uart1));
        assert_eq!(plic.priority(uart0).raw(), 1);
    }

    #[test]
    fn claim_of_zero_means_nothing_pending() {
        let plic = plic();
        assert_eq!(plic.claim(ContextId::HART0_MACHINE), None);

        plic.bus.write32(regs::claim_complete(ContextId::HART0_MACHINE), 7);
        assert_eq!(
            plic.claim(ContextId::HART0_MACHINE),
            Some(SourceId::from_raw(7))
        );
    }
}
