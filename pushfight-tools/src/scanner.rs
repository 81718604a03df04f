//! Reachability scan over a range of permutation indices.
//!
//! Walks the range in lexicographic order with [`Perm::next_permutation`]
//! instead of unranking every index, and counts permutations that pass
//! [`Perm::is_reachable`].

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use pushfight_core::Perm;

use crate::checkpoint::{Checkpoint, ScanState};
use crate::stats::ScanStats;

/// Permutations processed between checks of the interrupt flag and timers.
const BATCH: u64 = 1 << 16;

pub struct Scanner {
    pub state: ScanState,
    pub stats: ScanStats,
}

impl Scanner {
    pub fn new(state: ScanState) -> Self {
        Self {
            stats: ScanStats::new(&state),
            state,
        }
    }

    /// Scan until the range is done or `running` is cleared.
    ///
    /// Saves a checkpoint every `checkpoint_interval_secs`, on interrupt and
    /// at the end. Returns whether the range was completed.
    pub fn run(
        &mut self,
        running: &AtomicBool,
        checkpoint_interval_secs: u64,
        log_interval_secs: u64,
        checkpoint_path: &Path,
    ) -> io::Result<bool> {
        let checkpoint_interval = Duration::from_secs(checkpoint_interval_secs);
        let mut last_checkpoint = Instant::now();

        if self.state.is_complete() {
            return Ok(true);
        }
        let mut perm = Perm::at_index(self.state.next)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        while !self.state.is_complete() {
            let batch_end = (self.state.next + BATCH).min(self.state.end);
            self.scan_batch(&mut perm, batch_end);

            if !running.load(Ordering::SeqCst) {
                Checkpoint::save(checkpoint_path, &self.state)?;
                return Ok(false);
            }
            if self.stats.should_log(log_interval_secs) {
                self.stats.log_progress(&self.state);
            }
            if last_checkpoint.elapsed() >= checkpoint_interval {
                Checkpoint::save(checkpoint_path, &self.state)?;
                last_checkpoint = Instant::now();
            }
        }

        Checkpoint::save(checkpoint_path, &self.state)?;
        Ok(true)
    }

    /// Process indices up to `batch_end`, leaving `perm` at `state.next`.
    fn scan_batch(&mut self, perm: &mut Perm, batch_end: u64) {
        while self.state.next < batch_end {
            if perm.is_reachable() {
                self.state.reachable += 1;
            }
            self.state.next += 1;
            if self.state.next < self.state.end {
                let advanced = perm.next_permutation();
                debug_assert!(advanced, "ran past the last permutation at {}", self.state.next);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("pushfight_scan_{}_{}.bin", name, std::process::id()))
    }

    fn count_directly(start: u64, end: u64) -> u64 {
        (start..end)
            .filter(|&i| Perm::at_index(i).unwrap().is_reachable())
            .count() as u64
    }

    #[test]
    fn test_scan_matches_direct_count() {
        let path = temp_path("direct");
        let start = 194_131_625_000;
        let mut scanner = Scanner::new(ScanState::new(start, start + 3000));
        let running = AtomicBool::new(true);
        assert!(scanner.run(&running, 3600, 3600, &path).unwrap());
        assert_eq!(scanner.state.next, start + 3000);
        assert_eq!(scanner.state.reachable, count_directly(start, start + 3000));
        assert_eq!(Checkpoint::load(&path).unwrap(), scanner.state);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_scan_to_last_permutation() {
        let path = temp_path("last");
        let end = pushfight_core::TOTAL_PERMS;
        let mut scanner = Scanner::new(ScanState::new(end - 100, end));
        let running = AtomicBool::new(true);
        assert!(scanner.run(&running, 3600, 3600, &path).unwrap());
        assert_eq!(scanner.state.reachable, count_directly(end - 100, end));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_interrupt_and_resume() {
        let path = temp_path("resume");
        let (start, end) = (1_000_000, 1_000_000 + 2 * BATCH + 17);

        // Interrupted before starting: exactly one batch is processed.
        let mut scanner = Scanner::new(ScanState::new(start, end));
        let stopped = AtomicBool::new(false);
        assert!(!scanner.run(&stopped, 3600, 3600, &path).unwrap());
        assert_eq!(scanner.state.next, start + BATCH);

        let saved = Checkpoint::load(&path).unwrap();
        assert_eq!(saved, scanner.state);

        let mut resumed = Scanner::new(saved);
        let running = AtomicBool::new(true);
        assert!(resumed.run(&running, 3600, 3600, &path).unwrap());

        let mut fresh = Scanner::new(ScanState::new(start, end));
        assert!(fresh.run(&running, 3600, 3600, &path).unwrap());
        assert_eq!(resumed.state, fresh.state);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_empty_range() {
        let path = temp_path("empty");
        let mut scanner = Scanner::new(ScanState::new(5, 5));
        assert!(scanner.run(&AtomicBool::new(true), 3600, 3600, &path).unwrap());
        assert_eq!(scanner.state.reachable, 0);
    }
}
