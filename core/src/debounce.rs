//! Debounced push button
//!
//! The edge handler runs in interrupt context and only touches two atomics:
//!
//! ```text
//!            falling edge / raise event, start timer
//!   ARMED ─────────────────────────────────────────▶ DISARMED
//!     ▲                                                 │
//!     └──────────────── timer expiry ◀──────────────────┘
//!                   (edges here are ignored)
//! ```
//!
//! The board starts a one-shot timer of [`DEBOUNCE_WINDOW_MS`] when
//! [`DebouncedInput::on_falling_edge`] reports [`EdgeOutcome::Accepted`] and
//! calls [`DebouncedInput::rearm`] when it fires. The status panel consumes
//! the event with [`DebouncedInput::take_event`] in ordinary task context.
//!
//! [`DEBOUNCE_WINDOW_MS`]: crate::config::DEBOUNCE_WINDOW_MS

use core::sync::atomic::{AtomicBool, Ordering};

/// What the edge handler should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeOutcome {
    /// Logical press recorded; start the debounce timer
    Accepted,
    /// Still bouncing
    Ignored,
}

#[derive(Debug)]
pub struct DebouncedInput {
    armed: AtomicBool,
    pending: AtomicBool,
}

impl DebouncedInput {
    /// Armed, no pending event
    pub const fn new() -> Self {
        Self {
            armed: AtomicBool::new(true),
            pending: AtomicBool::new(false),
        }
    }

    /// Falling-edge handler
    pub fn on_falling_edge(&self) -> EdgeOutcome {
        match self
            .armed
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                self.pending.store(true, Ordering::Release);
                EdgeOutcome::Accepted
            }
            Err(_) => EdgeOutcome::Ignored,
        }
    }

    /// Debounce timer expiry
    pub fn rearm(&self) {
        self.armed.store(true, Ordering::Release);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Consume the pending press, if any
    pub fn take_event(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

impl Default for DebouncedInput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEBOUNCE_WINDOW_MS;

    /// Feed edges at the given millisecond timestamps, firing the one-shot
    /// timer whenever its deadline has passed, and count logical presses.
    fn count_presses(edges_ms: &[u32]) -> usize {
        let input = DebouncedInput::new();
        let mut deadline: Option<u32> = None;
        let mut presses = 0;

        for &t in edges_ms {
            if deadline.is_some_and(|d| t > d) {
                input.rearm();
                deadline = None;
            }
            if input.on_falling_edge() == EdgeOutcome::Accepted {
                deadline = Some(t + DEBOUNCE_WINDOW_MS);
            }
            if input.take_event() {
                presses += 1;
            }
        }
        presses
    }

    #[test]
    fn test_bounce_burst_is_one_press() {
        assert_eq!(count_presses(&[0, 2, 5, 9, 40, 120, 299]), 1);
    }

    #[test]
    fn test_edge_on_window_boundary_is_ignored() {
        assert_eq!(count_presses(&[0, 300]), 1);
        assert_eq!(count_presses(&[0, 301]), 2);
    }

    #[test]
    fn test_window_restarts_from_accepted_edge_only() {
        // 250 and 500 fall inside windows opened at 0 and 400 respectively;
        // the ignored edge at 250 does not extend the first window.
        assert_eq!(count_presses(&[0, 250, 400, 500, 701, 1100]), 4);
    }

    #[test]
    fn test_event_is_consumed_once() {
        let input = DebouncedInput::new();
        assert_eq!(input.on_falling_edge(), EdgeOutcome::Accepted);
        assert!(!input.is_armed());
        assert_eq!(input.on_falling_edge(), EdgeOutcome::Ignored);

        assert!(input.take_event());
        assert!(!input.take_event());

        input.rearm();
        assert!(input.is_armed());
        assert!(!input.take_event());
    }
}
