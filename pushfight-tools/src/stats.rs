//! Scan statistics and progress reporting.

use std::time::Instant;

use crate::checkpoint::ScanState;

/// Peak resident set size of this process in bytes.
/// Returns None if unable to determine.
pub fn peak_memory_usage() -> Option<u64> {
    let mut usage = std::mem::MaybeUninit::<libc::rusage>::uninit();
    // SAFETY: getrusage only writes into the provided struct.
    let result = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
    if result != 0 {
        return None;
    }
    // SAFETY: initialized by the successful call above.
    let max_rss = unsafe { usage.assume_init() }.ru_maxrss as u64;

    // macOS reports bytes, everything else kilobytes.
    if cfg!(target_os = "macos") {
        Some(max_rss)
    } else {
        Some(max_rss * 1024)
    }
}

/// Format bytes as human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format seconds as hh:mm:ss.
pub fn format_duration(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

/// One-line summary of reachable and unreachable counts.
pub fn report(state: &ScanState) -> String {
    let processed = state.processed();
    let unreachable = processed - state.reachable;
    format!(
        "Processed {} permutations. {} reachable ({:.2}%). {} unreachable ({:.2}%).",
        processed,
        state.reachable,
        percent(state.reachable, processed),
        unreachable,
        percent(unreachable, processed),
    )
}

/// Timing collected while scanning.
#[derive(Debug)]
pub struct ScanStats {
    start_time: Instant,
    last_log_time: Instant,
    /// Processed count at the last log line, for the recent rate.
    last_log_processed: u64,
    /// Processed count when this run started (non-zero after resuming).
    initial_processed: u64,
}

impl ScanStats {
    pub fn new(state: &ScanState) -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_log_time: now,
            last_log_processed: state.processed(),
            initial_processed: state.processed(),
        }
    }

    /// Average permutations per second in this run.
    pub fn rate(&self, state: &ScanState) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            (state.processed() - self.initial_processed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Check if we should log progress
    pub fn should_log(&self, interval_secs: u64) -> bool {
        self.last_log_time.elapsed().as_secs() >= interval_secs
    }

    /// Log progress and reset log timer
    pub fn log_progress(&mut self, state: &ScanState) {
        let now = Instant::now();
        let elapsed_total = self.start_time.elapsed().as_secs();

        let since_last = self.last_log_time.elapsed().as_secs_f64();
        let rate = if since_last > 0.0 {
            (state.processed() - self.last_log_processed) as f64 / since_last
        } else {
            self.rate(state)
        };

        let remaining = state.end - state.next;
        let eta = if rate > 0.0 {
            format_duration((remaining as f64 / rate) as u64)
        } else {
            "--:--:--".to_string()
        };

        let mem_str = peak_memory_usage()
            .map(|m| format!(" peak_mem={}", format_bytes(m)))
            .unwrap_or_default();

        println!(
            "[{}] next={} done={:.3}% rate={:.0}/s eta={}{}",
            format_duration(elapsed_total),
            state.next,
            percent(state.processed(), state.total()),
            rate,
            eta,
            mem_str,
        );
        println!("           {}", report(state));

        self.last_log_time = now;
        self.last_log_processed = state.processed();
    }

    /// Print final summary
    pub fn print_summary(&self, state: &ScanState) {
        println!("Range: [{}, {})", state.start, state.end);
        println!("{}", report(state));
        println!(
            "Time this run: {}",
            format_duration(self.start_time.elapsed().as_secs())
        );
        println!("Average rate: {:.0} permutations/sec", self.rate(state));
        if let Some(peak) = peak_memory_usage() {
            println!("Peak memory: {}", format_bytes(peak));
        }
    }
}
