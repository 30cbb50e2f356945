//! # fe310-serial
//!
//! Serial driver for the FE310 UART units. Bytes move between the
//! peripheral FIFOs and software queues entirely from the unit's interrupt
//! handler; threads only ever touch the queues.
//!
//! ## Module Overview
//! - [`regs`]   – UART register block layout.
//! - [`unit`]   – the physical units and their interrupt sources.
//! - [`events`] – channel event flags raised by the interrupt handler.
//! - [`driver`] – [`SerialDriver`] itself.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod driver;
pub mod error;
pub mod events;
pub mod regs;
pub mod unit;

pub use driver::{init_units, DriverState, SerialDriver, DEFAULT_QUEUE_SIZE, SERIAL_IRQ_PRIORITY};
pub use error::SerialError;
pub use events::ChannelEvents;
pub use unit::UartUnit;
