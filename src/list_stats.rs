//! Display list statistics for debugging and allocation analysis.
//!
//! Enable stats by compiling with the `list-stats` feature:
//! ```bash
//! cargo run --example frame_cycle --features list-stats
//! ```
//!
//! Counters are per thread. They show how often lists are created versus
//! reset for reuse, how retirements were decided, how many drawables the
//! arenas handed out and how many prepare passes ran. Call [`end_frame`] once
//! per frame to print and clear them every second.

/// Snapshot of accumulated list statistics.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub lists_created: u64,
    pub lists_reset: u64,
    pub lists_kept: u64,
    pub lists_discarded: u64,
    pub drawables_allocated: u64,
    pub prepare_passes: u64,
}

#[cfg(feature = "list-stats")]
mod inner {
    use std::cell::RefCell;
    use std::time::Instant;

    thread_local! {
        static STATS: RefCell<ListStats> = RefCell::new(ListStats::new());
    }

    struct ListStats {
        counters: super::StatsSnapshot,
        last_print: Instant,
    }

    impl ListStats {
        fn new() -> Self {
            Self {
                counters: super::StatsSnapshot::default(),
                last_print: Instant::now(),
            }
        }

        fn reset(&mut self) {
            self.counters = super::StatsSnapshot::default();
            self.last_print = Instant::now();
        }
    }

    fn bump(f: impl FnOnce(&mut super::StatsSnapshot)) {
        STATS.with(|s| f(&mut s.borrow_mut().counters));
    }

    #[inline]
    pub fn record_list_created() {
        bump(|c| c.lists_created += 1);
    }

    #[inline]
    pub fn record_list_reset() {
        bump(|c| c.lists_reset += 1);
    }

    #[inline]
    pub fn record_list_kept() {
        bump(|c| c.lists_kept += 1);
    }

    #[inline]
    pub fn record_list_discarded() {
        bump(|c| c.lists_discarded += 1);
    }

    #[inline]
    pub fn record_drawable_allocated() {
        bump(|c| c.drawables_allocated += 1);
    }

    #[inline]
    pub fn record_prepare_pass() {
        bump(|c| c.prepare_passes += 1);
    }

    /// Return a snapshot of the current stats (for testing).
    pub fn get_stats() -> super::StatsSnapshot {
        STATS.with(|s| s.borrow().counters.clone())
    }

    /// Reset all stats to zero (for test isolation).
    pub fn reset_stats() {
        STATS.with(|s| s.borrow_mut().reset());
    }

    /// Called at the end of each frame to potentially log stats.
    pub fn end_frame() {
        STATS.with(|s| {
            let mut stats = s.borrow_mut();
            if stats.last_print.elapsed().as_secs() < 1 {
                return;
            }

            let c = &stats.counters;
            let retired = c.lists_kept + c.lists_discarded;
            let reuse_rate = if retired > 0 {
                (c.lists_kept as f64 / retired as f64) * 100.0
            } else {
                0.0
            };

            log::info!(
                "[List Stats] created={} reset={} kept={} discarded={} reuse_rate={:.1}%",
                c.lists_created,
                c.lists_reset,
                c.lists_kept,
                c.lists_discarded,
                reuse_rate
            );
            log::info!(
                "  drawables={} prepare_passes={}",
                c.drawables_allocated,
                c.prepare_passes
            );

            stats.reset();
        });
    }
}

#[cfg(feature = "list-stats")]
pub use inner::*;

// No-op implementations when feature is disabled - these get completely inlined away

#[cfg(not(feature = "list-stats"))]
#[inline(always)]
pub fn get_stats() -> StatsSnapshot {
    StatsSnapshot::default()
}

#[cfg(not(feature = "list-stats"))]
#[inline(always)]
pub fn reset_stats() {}

#[cfg(not(feature = "list-stats"))]
#[inline(always)]
pub fn end_frame() {}

#[cfg(not(feature = "list-stats"))]
#[inline(always)]
pub fn record_list_created() {}

#[cfg(not(feature = "list-stats"))]
#[inline(always)]
pub fn record_list_reset() {}

#[cfg(not(feature = "list-stats"))]
#[inline(always)]
pub fn record_list_kept() {}

#[cfg(not(feature = "list-stats"))]
#[inline(always)]
pub fn record_list_discarded() {}

#[cfg(not(feature = "list-stats"))]
#[inline(always)]
pub fn record_drawable_allocated() {}

#[cfg(not(feature = "list-stats"))]
#[inline(always)]
pub fn record_prepare_pass() {}
