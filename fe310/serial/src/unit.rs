//! Physical UART units.

use fe310_hal::{Mmio, SourceId};

/// One UART peripheral: where its registers live and which controller
/// source it drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartUnit {
    pub base: usize,
    pub source: SourceId,
}

impl UartUnit {
    pub const UART0: UartUnit = UartUnit {
        base: 0x1001_3000,
        source: SourceId::from_raw(3),
    };

    pub const UART1: UartUnit = UartUnit {
        base: 0x1002_3000,
        source: SourceId::from_raw(4),
    };

    /// Register access for this unit.
    ///
    /// # Safety
    ///
    /// The returned handle must be the only one for this unit.
    pub const unsafe fn mmio(self) -> Mmio {
        Mmio::new(self.base)
    }
}
