//! Channel event flags.

use bitflags::bitflags;

bitflags! {
    /// Conditions raised by the interrupt handler for thread-level
    /// consumers. Flags accumulate until taken.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ChannelEvents: u8 {
        /// The input queue went from empty to holding data.
        const INPUT_AVAILABLE = 1 << 0;
        /// The output queue ran dry.
        const OUTPUT_EMPTY = 1 << 1;
        /// Raised together with `OUTPUT_EMPTY`. The unit has no separate
        /// shift-register-empty signal, so bytes may still be on the wire.
        const TRANSMISSION_END = 1 << 2;
        /// A received byte was dropped because the input queue was full.
        const QUEUE_FULL = 1 << 3;
    }
}
