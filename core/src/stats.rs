//! Failure and throughput counters
//!
//! Purely additive: nothing in the pipeline reads these to make decisions.

use core::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Default)]
pub struct PipelineStats {
    frames_queued: AtomicU32,
    frames_dropped: AtomicU32,
    short_reads: AtomicU32,
    read_errors: AtomicU32,
    pushes_sent: AtomicU32,
    push_failures: AtomicU32,
    control_accepted: AtomicU32,
    control_rejected: AtomicU32,
}

/// Point-in-time copy of [`PipelineStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatsSnapshot {
    pub frames_queued: u32,
    /// Frames lost to a saturated mailbox
    pub frames_dropped: u32,
    pub short_reads: u32,
    pub read_errors: u32,
    pub pushes_sent: u32,
    /// Pushes that failed to send or did not fit the request buffer
    pub push_failures: u32,
    pub control_accepted: u32,
    pub control_rejected: u32,
}

fn bump(counter: &AtomicU32) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl PipelineStats {
    pub const fn new() -> Self {
        Self {
            frames_queued: AtomicU32::new(0),
            frames_dropped: AtomicU32::new(0),
            short_reads: AtomicU32::new(0),
            read_errors: AtomicU32::new(0),
            pushes_sent: AtomicU32::new(0),
            push_failures: AtomicU32::new(0),
            control_accepted: AtomicU32::new(0),
            control_rejected: AtomicU32::new(0),
        }
    }

    pub fn frame_queued(&self) {
        bump(&self.frames_queued);
    }

    pub fn frame_dropped(&self) {
        bump(&self.frames_dropped);
    }

    pub fn short_read(&self) {
        bump(&self.short_reads);
    }

    pub fn read_error(&self) {
        bump(&self.read_errors);
    }

    pub fn push_sent(&self) {
        bump(&self.pushes_sent);
    }

    pub fn push_failed(&self) {
        bump(&self.push_failures);
    }

    pub fn control_accepted(&self) {
        bump(&self.control_accepted);
    }

    pub fn control_rejected(&self) {
        bump(&self.control_rejected);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |c: &AtomicU32| c.load(Ordering::Relaxed);
        StatsSnapshot {
            frames_queued: load(&self.frames_queued),
            frames_dropped: load(&self.frames_dropped),
            short_reads: load(&self.short_reads),
            read_errors: load(&self.read_errors),
            pushes_sent: load(&self.pushes_sent),
            push_failures: load(&self.push_failures),
            control_accepted: load(&self.control_accepted),
            control_rejected: load(&self.control_rejected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let stats = PipelineStats::new();
        stats.frame_queued();
        stats.frame_queued();
        stats.frame_dropped();
        stats.push_failed();
        stats.control_rejected();

        assert_eq!(
            stats.snapshot(),
            StatsSnapshot {
                frames_queued: 2,
                frames_dropped: 1,
                push_failures: 1,
                control_rejected: 1,
                ..Default::default()
            }
        );
    }
}
