//! Platform-agnostic core logic for the sensor gateway
//!
//! This crate contains the concurrent data pipeline and the shared
//! hardware-state coordination. It has NO hardware dependencies: boards hand
//! in collaborators through the `gateway-hal` traits and `embedded-hal` pins.
//!
//! ```text
//! SerialLink ─▶ SerialIngest ─▶ Mailbox<InputResult, 4> ─▶ NetworkEgress ─▶ Collector
//!                   │                                          │
//!                   └── receive flag ──▶ StatusPanel ◀── send flag
//!                                            ▲
//! button edge ─▶ DebouncedInput ─────────────┤ toggle
//! ControlTransport ─▶ ControlListener ─▶ RelayState
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![deny(warnings)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod control;
pub mod debounce;
pub mod egress;
pub mod error;
pub mod flags;
pub mod frame;
pub mod indicator;
pub mod ingest;
pub mod mailbox;
pub mod payload;
pub mod stats;

#[cfg(test)]
mod testing;

pub use control::{ControlListener, RelayCommand, Reply};
pub use debounce::{DebouncedInput, EdgeOutcome};
pub use egress::{EgressOutcome, NetworkEgress};
pub use error::{ControlError, FrameError, PayloadError};
pub use flags::{ActivityFlag, ActivityFlags, RelayState};
pub use frame::{InputResult, SensorReading, FRAME_LEN};
pub use indicator::{Indicator, StatusPanel, StatusPins};
pub use ingest::{IngestOutcome, SerialIngest};
pub use mailbox::{Mailbox, SlotHandle};
pub use stats::{PipelineStats, StatsSnapshot};

/// The mailbox between serial ingest and network egress.
pub type FrameMailbox = Mailbox<InputResult, { config::MAILBOX_CAPACITY }>;
