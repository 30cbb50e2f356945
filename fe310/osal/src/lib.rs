//! # fe310-osal
//!
//! The small slice of the RTOS the interrupt core depends on:
//!
//! - [`context`] – tokens proving which execution level the caller runs at.
//! - [`lock`]    – the system lock, with one entry point per level.
//! - [`queue`]   – bounded byte queues used by the serial driver.
//! - [`timeout`] – bounded waiting for thread-side blocking calls.
//!
//! The lock is built on `critical-section`, so the final image must link
//! exactly one implementation (interrupt masking on a single hart, a host
//! mutex under test).

#![cfg_attr(not(feature = "std"), no_std)]

pub mod context;
pub mod lock;
pub mod queue;
pub mod timeout;

pub use context::{IsrContext, ThreadContext};
pub use lock::SysLock;
pub use queue::ByteQueue;
pub use timeout::{Poller, Timeout};
