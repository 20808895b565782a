//! Kairos Hardware Abstraction Layer
//!
//! This crate defines the hardware traits consumed by the storage and
//! timing core. Chip-specific HALs (RP2040, STM32, ...) implement them so
//! the same core logic runs on different boards.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Core logic (kairos-core)               │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  kairos-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  Chip HAL (flash ROM calls, hardware    │
//! │  timer, RTC peripheral)                 │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`flash::RawFlash`] - Sector-erase / page-program flash access
//! - [`time::TickCounter`] - Free-running counter with one-shot alarm
//! - [`rtc::Rtc`] - Hardware calendar (date and time of day)
//!
//! Interrupt masking is not a trait here: the core and the chip HALs both
//! go through the `critical-section` crate, with the platform supplying
//! the acquire/restore implementation.

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod rtc;
pub mod time;

// Re-export key traits at crate root for convenience
pub use flash::RawFlash;
pub use rtc::{DateTime, Rtc};
pub use time::TickCounter;
