//! Hardware Abstraction Layer (HAL) seams for the FE310 interrupt core
//!
//! This crate provides the vendor-agnostic pieces shared by the interrupt
//! controller, the serial driver and the host simulator: memory-mapped
//! register access, interrupt controller identities and contract, serial
//! line configuration and core clock derivation.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod clock;
pub mod error;
pub mod interrupt;
pub mod mmio;
pub mod uart;

// Re-export commonly used types
pub use clock::{ClockError, CoreClock, PllConfig};
pub use error::{HalError, HalResult};
pub use interrupt::{ContextId, InterruptController, Priority, SourceId};
pub use mmio::{Mmio, RegisterBus};
pub use uart::{SerialConfig, StopBits};
