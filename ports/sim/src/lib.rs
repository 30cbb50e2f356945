//! Host models of the FE310 interrupt controller and UART.
//!
//! Both models implement [`RegisterBus`](fe310_hal::RegisterBus), so the
//! real drivers run against them unchanged. Register side effects follow
//! the hardware: reading the claim register claims, reading `RXDATA` pops,
//! pending bits are derived from FIFO levels.

pub mod plic;
pub mod uart;

pub use plic::{InterruptLine, SimPlic};
pub use uart::SimUart;
