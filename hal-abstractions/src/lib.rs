//! Hardware abstraction traits for the sensor gateway
//!
//! This crate defines the collaborator surfaces the gateway core drives.
//! Boards implement these traits on their HAL types; host tests implement
//! them on fakes.
//!
//! LED and relay lines use `embedded_hal::digital::OutputPin` directly and
//! loop sleeps use `embedded_hal_async::delay::DelayNs`, so they need no
//! trait here.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![deny(warnings)]

pub mod collector;
pub mod control;
pub mod serial;

pub use collector::Collector;
pub use control::ControlTransport;
pub use serial::SerialLink;
