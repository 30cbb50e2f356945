//! UART register block.

use bitflags::bitflags;

/// Transmit data; reads report [`TXDATA_FULL`].
pub const TXDATA: usize = 0x00;
/// Receive data; reads pop the FIFO or report [`RXDATA_EMPTY`].
pub const RXDATA: usize = 0x04;
pub const TXCTRL: usize = 0x08;
pub const RXCTRL: usize = 0x0C;
/// Interrupt enable, laid out as [`Watermarks`].
pub const IE: usize = 0x10;
/// Interrupt pending, laid out as [`Watermarks`]. Read only.
pub const IP: usize = 0x14;
/// Baud divisor, bits 15:0.
pub const DIV: usize = 0x18;

pub const TXDATA_FULL: u32 = 1 << 31;
pub const RXDATA_EMPTY: u32 = 1 << 31;
pub const DATA_MASK: u32 = 0xFF;

pub const DIV_MASK: u32 = 0xFFFF;

/// FIFO depth of each direction.
pub const FIFO_DEPTH: usize = 8;

bitflags! {
    /// Interrupt enable/pending bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Watermarks: u32 {
        /// Transmit FIFO fill below the transmit watermark.
        const TXWM = 1 << 0;
        /// Receive FIFO fill at the receive watermark.
        const RXWM = 1 << 1;
    }
}

bitflags! {
    /// Transmit control register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TxCtrl: u32 {
        const TXEN = 1 << 0;
        /// Two stop bits instead of one.
        const NSTOP = 1 << 1;
        const TXCNT = 0x7 << 16;
    }
}

bitflags! {
    /// Receive control register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RxCtrl: u32 {
        const RXEN = 1 << 0;
        const RXCNT = 0x7 << 16;
    }
}

const CNT_SHIFT: u32 = 16;

impl TxCtrl {
    /// Watermark field: TXWM pends while the FIFO holds fewer entries.
    pub const fn watermark(count: u32) -> Self {
        Self::from_bits_truncate((count & 0x7) << CNT_SHIFT)
    }

    pub const fn count(self) -> u32 {
        (self.bits() & Self::TXCNT.bits()) >> CNT_SHIFT
    }
}

impl RxCtrl {
    /// Watermark field: RXWM pends once the FIFO holds this many entries.
    pub const fn watermark(count: u32) -> Self {
        Self::from_bits_truncate((count & 0x7) << CNT_SHIFT)
    }

    pub const fn count(self) -> u32 {
        (self.bits() & Self::RXCNT.bits()) >> CNT_SHIFT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watermark_fields_sit_at_bit_16() {
        let tx = TxCtrl::TXEN | TxCtrl::watermark(1);
        assert_eq!(tx.bits(), 0x0001_0001);
        assert_eq!(tx.count(), 1);

        let rx = RxCtrl::RXEN | RxCtrl::watermark(7);
        assert_eq!(rx.bits(), 0x0007_0001);
        assert_eq!(rx.count(), 7);
    }
}
