//! Turns cumulative tick counters into point-in-time percentages.

use std::collections::HashMap;

use super::process::ProcessRecord;
use super::sample::CpuSample;

/// Busy share of the interval between two samples, in `[0, 100]`.
///
/// Returns exactly 0 when no ticks elapsed (or the counters went backwards).
pub fn cpu_percent(current: &CpuSample, previous: &CpuSample) -> f64 {
    let total_delta = current.total as f64 - previous.total as f64;
    if total_delta <= 0.0 {
        return 0.0;
    }
    let idle_delta = current.idle as f64 - previous.idle as f64;
    (100.0 * (1.0 - idle_delta / total_delta)).clamp(0.0, 100.0)
}

/// User and system shares of the interval, each in `[0, 100]`.
pub fn cpu_breakdown(current: &CpuSample, previous: &CpuSample) -> (f64, f64) {
    let total_delta = current.total as f64 - previous.total as f64;
    if total_delta <= 0.0 {
        return (0.0, 0.0);
    }
    let share = |now: u64, before: u64| {
        ((now as f64 - before as f64) / total_delta * 100.0).clamp(0.0, 100.0)
    };
    (
        share(current.user + current.nice, previous.user + previous.nice),
        share(current.system, previous.system),
    )
}

/// Remembers each process's cumulative CPU time so the next cycle can turn
/// it into a percentage of the system-wide tick delta.
#[derive(Debug, Default)]
pub struct ProcessCpuTracker {
    previous: HashMap<u32, u64>,
}

impl ProcessCpuTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `cpu_percent` on every record and forgets pids that are gone.
    ///
    /// Processes seen for the first time get 0, as does everything when
    /// `total_delta` is 0.
    pub fn update(&mut self, processes: &mut [ProcessRecord], total_delta: u64) {
        let mut current = HashMap::with_capacity(processes.len());
        for process in processes.iter_mut() {
            process.cpu_percent = match self.previous.get(&process.pid) {
                Some(&before) if total_delta > 0 => {
                    let delta = process.cpu_time_ticks.saturating_sub(before);
                    (delta as f64 / total_delta as f64 * 100.0).clamp(0.0, 100.0)
                }
                _ => 0.0,
            };
            current.insert(process.pid, process.cpu_time_ticks);
        }
        self.previous = current;
    }

    pub fn tracked(&self) -> usize {
        self.previous.len()
    }
}
