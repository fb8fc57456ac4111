use serde::Serialize;

use super::process::ProcessRecord;
use super::sample::{CpuSample, MemorySample};

/// Utilization derived from the last two CPU samples, in percent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct CpuUsage {
    pub total: f64,
    pub user: f64,
    pub system: f64,
}

/// Everything one poll cycle produced. Published whole, never mutated.
///
/// `processes` is in canonical order: CPU percent descending, then memory
/// percent descending.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Snapshot {
    pub sequence: u64,
    pub cpu: CpuSample,
    pub cpu_usage: CpuUsage,
    pub memory: MemorySample,
    pub processes: Vec<ProcessRecord>,
}

impl Snapshot {
    pub fn process_count(&self) -> usize {
        self.processes.len()
    }
}
