//! # fe310-plic
//!
//! Platform-level interrupt controller support:
//!
//! - [`regs`]       – register map of the controller.
//! - [`params`]     – platform sizing (sources, contexts, priorities).
//! - [`controller`] – the [`Plic`] driver implementing
//!   [`InterruptController`](fe310_hal::InterruptController).
//! - [`dispatch`]   – source id to handler table with a fail-fast default.
//! - [`trap`]       – the machine external interrupt entry point.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod controller;
pub mod dispatch;
pub mod params;
pub mod regs;
pub mod trap;

pub use controller::Plic;
pub use dispatch::{
    unhandled_interrupt, DispatchTable, DispatchTableBuilder, Fe310DispatchTable, FnHandler,
    InterruptHandler,
};
pub use params::{PlicParams, FE310_NUM_SOURCES};
pub use trap::ExternalInterrupts;
