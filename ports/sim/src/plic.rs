//! Behavioural model of the PLIC register block.

use std::sync::Arc;

use fe310_hal::RegisterBus;
use fe310_plic::regs::{
    CONTEXT_BASE, CONTEXT_STRIDE, ENABLE_BASE, ENABLE_STRIDE, PENDING_BASE,
};
use fe310_plic::PlicParams;
use log::trace;
use parking_lot::Mutex;

/// Level-sensitive interrupt request wire from a peripheral model.
pub trait InterruptLine: Send + Sync {
    fn is_asserted(&self) -> bool;
}

struct State {
    params: PlicParams,
    priority: Vec<u32>,
    enable: Vec<Vec<u32>>,
    threshold: Vec<u32>,
    claimed: Vec<Option<u32>>,
    pending: Vec<bool>,
    /// Gateway closed: one request forwarded and not yet completed.
    in_flight: Vec<bool>,
    /// Edge requests waiting at a closed gateway.
    raised: Vec<bool>,
    lines: Vec<Option<Arc<dyn InterruptLine>>>,
}

impl State {
    fn new(params: PlicParams) -> Self {
        let sources = params.num_sources;
        Self {
            params,
            priority: vec![0; sources],
            enable: vec![vec![0; params.bitmap_words()]; params.num_contexts],
            threshold: vec![0; params.num_contexts],
            claimed: vec![None; params.num_contexts],
            pending: vec![false; sources],
            in_flight: vec![false; sources],
            raised: vec![false; sources],
            lines: vec![None; sources],
        }
    }

    /// Forward requests through every open gateway.
    fn sample(&mut self) {
        for id in 1..self.params.num_sources {
            if self.in_flight[id] {
                continue;
            }
            let level = self.lines[id].as_ref().is_some_and(|line| line.is_asserted());
            if self.raised[id] || level {
                self.raised[id] = false;
                self.pending[id] = true;
                self.in_flight[id] = true;
            }
        }
    }

    fn enabled(&self, context: usize, id: usize) -> bool {
        self.enable[context][id / 32] & (1 << (id % 32)) != 0
    }

    fn claim(&mut self, context: usize) -> u32 {
        if let Some(outstanding) = self.claimed[context] {
            panic!("context {context} claimed again before completing irq{outstanding}");
        }
        self.sample();

        let threshold = self.threshold[context];
        let mut best: Option<(usize, u32)> = None;
        for id in 1..self.params.num_sources {
            let priority = self.priority[id];
            if !self.pending[id] || !self.enabled(context, id) || priority <= threshold {
                continue;
            }
            // Strictly greater: on a tie the lower id, seen first, stays.
            if best.map_or(true, |(_, top)| priority > top) {
                best = Some((id, priority));
            }
        }

        match best {
            Some((id, _)) => {
                self.pending[id] = false;
                self.claimed[context] = Some(id as u32);
                trace!("sim plic: ctx{context} claimed irq{id}");
                id as u32
            }
            None => 0,
        }
    }

    fn complete(&mut self, context: usize, id: u32) {
        let outstanding = self.claimed[context].take();
        assert_eq!(
            outstanding,
            Some(id),
            "complete of irq{id} does not match the outstanding claim"
        );
        self.in_flight[id as usize] = false;
    }

    fn pending_word(&mut self, word: usize) -> u32 {
        self.sample();
        (0..32)
            .filter(|bit| {
                let id = word * 32 + bit;
                self.pending.get(id).copied().unwrap_or(false)
            })
            .fold(0, |acc, bit| acc | (1 << bit))
    }

    /// Priority and threshold registers only implement the bits needed
    /// for the maximum priority; writes drop the rest.
    fn priority_mask(&self) -> u32 {
        u32::MAX >> self.params.max_priority.raw().leading_zeros()
    }
}

/// PLIC model with level (connected lines) and edge ([`raise`](Self::raise))
/// request inputs.
///
/// Protocol violations that silicon would silently misbehave on (claiming
/// twice, completing the wrong id) panic here.
pub struct SimPlic {
    state: Mutex<State>,
}

impl SimPlic {
    pub fn new(params: PlicParams) -> Self {
        Self {
            state: Mutex::new(State::new(params)),
        }
    }

    pub fn fe310() -> Self {
        Self::new(PlicParams::FE310_G002)
    }

    /// Wire a peripheral's interrupt output to `source`.
    pub fn connect(&self, source: u32, line: Arc<dyn InterruptLine>) {
        self.state.lock().lines[source as usize] = Some(line);
    }

    /// Latch one request on `source`, as if its line pulsed.
    pub fn raise(&self, source: u32) {
        self.state.lock().raised[source as usize] = true;
    }

    /// The id `context` currently owns, if any.
    pub fn claimed(&self, context: usize) -> Option<u32> {
        self.state.lock().claimed[context]
    }
}

impl RegisterBus for SimPlic {
    fn read32(&self, offset: usize) -> u32 {
        let mut state = self.state.lock();
        match offset {
            o if o < PENDING_BASE => state.priority.get(o / 4).copied().unwrap_or(0),
            o if o < ENABLE_BASE => state.pending_word((o - PENDING_BASE) / 4),
            o if o < CONTEXT_BASE => {
                let rel = o - ENABLE_BASE;
                let (context, word) = (rel / ENABLE_STRIDE, (rel % ENABLE_STRIDE) / 4);
                state
                    .enable
                    .get(context)
                    .and_then(|words| words.get(word))
                    .copied()
                    .unwrap_or(0)
            }
            o => {
                let rel = o - CONTEXT_BASE;
                let context = rel / CONTEXT_STRIDE;
                if context >= state.params.num_contexts {
                    return 0;
                }
                match rel % CONTEXT_STRIDE {
                    0 => state.threshold[context],
                    4 => state.claim(context),
                    _ => 0,
                }
            }
        }
    }

    fn write32(&self, offset: usize, value: u32) {
        let mut state = self.state.lock();
        let mask = state.priority_mask();
        match offset {
            o if o < PENDING_BASE => {
                let id = o / 4;
                // Slot 0 is hardwired to zero.
                if id != 0 && id < state.params.num_sources {
                    state.priority[id] = value & mask;
                }
            }
            o if o < ENABLE_BASE => {}
            o if o < CONTEXT_BASE => {
                let rel = o - ENABLE_BASE;
                let (context, word) = (rel / ENABLE_STRIDE, (rel % ENABLE_STRIDE) / 4);
                if let Some(slot) = state.enable.get_mut(context).and_then(|w| w.get_mut(word)) {
                    *slot = if word == 0 { value & !1 } else { value };
                }
            }
            o => {
                let rel = o - CONTEXT_BASE;
                let context = rel / CONTEXT_STRIDE;
                if context >= state.params.num_contexts {
                    return;
                }
                match rel % CONTEXT_STRIDE {
                    0 => state.threshold[context] = value & mask,
                    4 => state.complete(context, value),
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fe310_plic::regs;
    use fe310_hal::{ContextId, SourceId};
    use std::sync::atomic::{AtomicBool, Ordering};

    const CTX: ContextId = ContextId::HART0_MACHINE;

    fn enable(plic: &SimPlic, id: u32, priority: u32) {
        let source = SourceId::from_raw(id);
        plic.write32(regs::priority(source), priority);
        plic.modify32(regs::enable(CTX, regs::word(source)), |w| w | regs::bit(source));
    }

    #[test]
    fn gateway_holds_edge_until_complete() {
        let plic = SimPlic::fe310();
        enable(&plic, 5, 1);

        plic.raise(5);
        assert_eq!(plic.read32(regs::claim_complete(CTX)), 5);
        plic.raise(5);
        plic.write32(regs::claim_complete(CTX), 5);

        assert_eq!(plic.read32(regs::claim_complete(CTX)), 5);
        plic.write32(regs::claim_complete(CTX), 5);
        assert_eq!(plic.read32(regs::claim_complete(CTX)), 0);
    }

    struct Wire(AtomicBool);

    impl InterruptLine for Wire {
        fn is_asserted(&self) -> bool {
            self.0.load(Ordering::Relaxed)
        }
    }

    #[test]
    fn level_line_repends_after_complete() {
        let plic = SimPlic::fe310();
        let wire = Arc::new(Wire(AtomicBool::new(true)));
        plic.connect(7, wire.clone());
        enable(&plic, 7, 2);

        assert_eq!(plic.read32(regs::claim_complete(CTX)), 7);
        plic.write32(regs::claim_complete(CTX), 7);
        assert_eq!(plic.read32(regs::claim_complete(CTX)), 7);

        wire.0.store(false, Ordering::Relaxed);
        plic.write32(regs::claim_complete(CTX), 7);
        assert_eq!(plic.read32(regs::claim_complete(CTX)), 0);
    }

    #[test]
    fn priority_and_threshold_keep_only_implemented_bits() {
        let plic = SimPlic::fe310();
        plic.write32(regs::PRIORITY_BASE, 3);
        plic.write32(regs::priority(SourceId::from_raw(1)), 99);
        plic.write32(regs::priority(SourceId::from_raw(2)), 8);
        plic.write32(regs::threshold(CTX), 0xF);

        assert_eq!(plic.read32(regs::PRIORITY_BASE), 0);
        assert_eq!(plic.read32(regs::priority(SourceId::from_raw(1))), 3);
        assert_eq!(plic.read32(regs::priority(SourceId::from_raw(2))), 0);
        assert_eq!(plic.read32(regs::threshold(CTX)), 7);
    }

    #[test]
    #[should_panic(expected = "does not match")]
    fn mismatched_complete_panics() {
        let plic = SimPlic::fe310();
        enable(&plic, 3, 1);
        plic.raise(3);
        assert_eq!(plic.read32(regs::claim_complete(CTX)), 3);
        plic.write32(regs::claim_complete(CTX), 4);
    }

    #[test]
    #[should_panic(expected = "claimed again")]
    fn double_claim_panics() {
        let plic = SimPlic::fe310();
        enable(&plic, 3, 1);
        plic.raise(3);
        plic.read32(regs::claim_complete(CTX));
        plic.read32(regs::claim_complete(CTX));
    }
}
