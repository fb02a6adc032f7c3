//! Shared status flags
//!
//! Single-word atomics written by one role and read by another. They carry
//! level-triggered status, not queued events: the last writer wins.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::control::RelayCommand;

/// "Something happened since the last refresh" marker for one indicator
#[derive(Debug, Default)]
pub struct ActivityFlag(AtomicBool);

impl ActivityFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Read and clear
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// The three activity flags driven onto the status LEDs
#[derive(Debug, Default)]
pub struct ActivityFlags {
    /// Set by the status panel itself after every refresh
    pub heartbeat: ActivityFlag,
    /// Set by serial ingest when a frame is queued
    pub receive: ActivityFlag,
    /// Set by network egress when a frame is taken
    pub send: ActivityFlag,
}

impl ActivityFlags {
    pub const fn new() -> Self {
        Self {
            heartbeat: ActivityFlag::new(),
            receive: ActivityFlag::new(),
            send: ActivityFlag::new(),
        }
    }
}

/// Desired relay output
///
/// Written by the button path and the control endpoint, applied to the pin by
/// the status panel on its next tick.
#[derive(Debug, Default)]
pub struct RelayState(AtomicBool);

impl RelayState {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Flip the relay; returns the new state
    pub fn toggle(&self) -> bool {
        !self.0.fetch_xor(true, Ordering::AcqRel)
    }

    pub fn set(&self, on: bool) {
        self.0.store(on, Ordering::Release);
    }

    pub fn apply(&self, command: RelayCommand) {
        self.set(command == RelayCommand::On);
    }

    pub fn is_on(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::thread;
    use std::vec::Vec;

    #[test]
    fn test_take_clears_flag() {
        let flag = ActivityFlag::new();
        assert!(!flag.take());

        flag.set();
        flag.set();
        assert!(flag.is_set());
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[test]
    fn test_relay_commands_and_toggle() {
        let relay = RelayState::new();
        assert!(!relay.is_on());

        relay.apply(RelayCommand::On);
        assert!(relay.is_on());
        relay.apply(RelayCommand::On);
        assert!(relay.is_on());

        assert!(!relay.toggle());
        assert!(!relay.is_on());
        assert!(relay.toggle());

        relay.apply(RelayCommand::Off);
        assert!(!relay.is_on());
    }

    #[test]
    fn test_concurrent_toggles_are_not_lost() {
        let relay = Arc::new(RelayState::new());
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let relay = Arc::clone(&relay);
                thread::spawn(move || {
                    for _ in 0..1001 {
                        relay.toggle();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        // 4 * 1001 toggles is an even count.
        assert!(!relay.is_on());
    }
}
