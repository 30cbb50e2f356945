//! Behavioural model of one UART unit.
//!
//! Time does not pass on its own: the transmitter only shifts bytes out
//! when the test calls [`SimUart::shift_out`], and bytes only arrive
//! through [`SimUart::inject`] or the loopback path.

use std::collections::VecDeque;

use fe310_hal::RegisterBus;
use fe310_serial::regs::{
    self, RxCtrl, TxCtrl, Watermarks, DATA_MASK, DIV_MASK, FIFO_DEPTH, RXDATA_EMPTY, TXDATA_FULL,
};
use log::trace;
use parking_lot::Mutex;

use crate::plic::InterruptLine;

struct State {
    depth: usize,
    tx: VecDeque<u8>,
    rx: VecDeque<u8>,
    txctrl: TxCtrl,
    rxctrl: RxCtrl,
    ie: Watermarks,
    div: u32,
    loopback: bool,
    wire: Vec<u8>,
    lost: usize,
}

impl State {
    fn pending(&self) -> Watermarks {
        let mut ip = Watermarks::empty();
        if self.txctrl.contains(TxCtrl::TXEN) && (self.tx.len() as u32) < self.txctrl.count() {
            ip |= Watermarks::TXWM;
        }
        // Pends while data is present, even with a zero watermark.
        if self.rxctrl.contains(RxCtrl::RXEN) && self.rx.len() as u32 >= self.rxctrl.count().max(1) {
            ip |= Watermarks::RXWM;
        }
        ip
    }

    fn receive(&mut self, byte: u8) -> bool {
        if !self.rxctrl.contains(RxCtrl::RXEN) || self.rx.len() >= self.depth {
            self.lost += 1;
            return false;
        }
        self.rx.push_back(byte);
        true
    }
}

/// UART register block with FIFOs of a configurable depth.
pub struct SimUart {
    state: Mutex<State>,
}

impl SimUart {
    pub fn new(depth: usize) -> Self {
        Self {
            state: Mutex::new(State {
                depth,
                tx: VecDeque::with_capacity(depth),
                rx: VecDeque::with_capacity(depth),
                txctrl: TxCtrl::empty(),
                rxctrl: RxCtrl::empty(),
                ie: Watermarks::empty(),
                div: 0,
                loopback: false,
                wire: Vec::new(),
                lost: 0,
            }),
        }
    }

    /// A unit with the FE310 FIFO depth.
    pub fn fe310() -> Self {
        Self::new(FIFO_DEPTH)
    }

    /// Transmitted bytes land in the unit's own receive FIFO.
    pub fn with_loopback(self) -> Self {
        self.state.lock().loopback = true;
        self
    }

    /// Bytes arriving on the line. Returns how many fit the receive FIFO.
    pub fn inject(&self, bytes: &[u8]) -> usize {
        let mut state = self.state.lock();
        bytes.iter().filter(|&&byte| state.receive(byte)).count()
    }

    /// Let the transmitter send up to `max` bytes. Returns how many left
    /// the transmit FIFO.
    pub fn shift_out(&self, max: usize) -> usize {
        let mut state = self.state.lock();
        if !state.txctrl.contains(TxCtrl::TXEN) {
            return 0;
        }

        let mut sent = 0;
        while sent < max {
            let Some(byte) = state.tx.pop_front() else {
                break;
            };
            if state.loopback {
                state.receive(byte);
            } else {
                state.wire.push(byte);
            }
            sent += 1;
        }
        if sent > 0 {
            trace!("sim uart: shifted out {sent} bytes");
        }
        sent
    }

    /// Everything sent on the line so far, oldest first.
    pub fn take_wire(&self) -> Vec<u8> {
        core::mem::take(&mut self.state.lock().wire)
    }

    pub fn ie(&self) -> Watermarks {
        self.state.lock().ie
    }

    pub fn ip(&self) -> Watermarks {
        self.state.lock().pending()
    }

    pub fn div(&self) -> u32 {
        self.state.lock().div
    }

    pub fn txctrl(&self) -> TxCtrl {
        self.state.lock().txctrl
    }

    pub fn rxctrl(&self) -> RxCtrl {
        self.state.lock().rxctrl
    }

    pub fn tx_level(&self) -> usize {
        self.state.lock().tx.len()
    }

    pub fn rx_level(&self) -> usize {
        self.state.lock().rx.len()
    }

    /// Received bytes dropped because the receiver was off or full.
    pub fn lost(&self) -> usize {
        self.state.lock().lost
    }
}

impl Default for SimUart {
    fn default() -> Self {
        Self::fe310()
    }
}

impl RegisterBus for SimUart {
    fn read32(&self, offset: usize) -> u32 {
        let mut state = self.state.lock();
        match offset {
            regs::TXDATA => {
                if state.tx.len() >= state.depth {
                    TXDATA_FULL
                } else {
                    0
                }
            }
            regs::RXDATA => match state.rx.pop_front() {
                Some(byte) => u32::from(byte),
                None => RXDATA_EMPTY,
            },
            regs::TXCTRL => state.txctrl.bits(),
            regs::RXCTRL => state.rxctrl.bits(),
            regs::IE => state.ie.bits(),
            regs::IP => state.pending().bits(),
            regs::DIV => state.div,
            _ => 0,
        }
    }

    fn write32(&self, offset: usize, value: u32) {
        let mut state = self.state.lock();
        match offset {
            regs::TXDATA => {
                // A write to a full FIFO is dropped, as on silicon.
                if state.tx.len() < state.depth {
                    state.tx.push_back((value & DATA_MASK) as u8);
                }
            }
            regs::TXCTRL => state.txctrl = TxCtrl::from_bits_truncate(value),
            regs::RXCTRL => state.rxctrl = RxCtrl::from_bits_truncate(value),
            regs::IE => state.ie = Watermarks::from_bits_truncate(value),
            regs::DIV => state.div = value & DIV_MASK,
            _ => {}
        }
    }
}

impl InterruptLine for SimUart {
    fn is_asserted(&self) -> bool {
        let state = self.state.lock();
        state.ie.intersects(state.pending())
    }
}
