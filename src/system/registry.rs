use std::cmp::Ordering;

use crate::fuzzy::{self, DEFAULT_THRESHOLD};

use super::process::ProcessRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Cpu,
    Memory,
    Pid,
    Name,
}

impl SortBy {
    pub fn next(self) -> Self {
        match self {
            SortBy::Cpu => SortBy::Memory,
            SortBy::Memory => SortBy::Pid,
            SortBy::Pid => SortBy::Name,
            SortBy::Name => SortBy::Cpu,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortBy::Cpu => "CPU",
            SortBy::Memory => "Memory",
            SortBy::Pid => "PID",
            SortBy::Name => "Name",
        }
    }

    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => SortBy::Memory,
            "pid" => SortBy::Pid,
            "name" => SortBy::Name,
            _ => SortBy::Cpu,
        }
    }

    /// Ascending three-way comparison on this key.
    fn compare(self, a: &ProcessRecord, b: &ProcessRecord) -> Ordering {
        match self {
            SortBy::Cpu => a.cpu_percent.total_cmp(&b.cpu_percent),
            SortBy::Memory => a.memory_percent.total_cmp(&b.memory_percent),
            SortBy::Pid => a.pid.cmp(&b.pid),
            SortBy::Name => a.name.cmp(&b.name),
        }
    }
}

/// Records whose name matches `query`, best match first.
///
/// An empty query returns the input untouched. Equal scores keep their input
/// order.
pub fn filter_processes(
    processes: &[ProcessRecord],
    query: &str,
    threshold: f64,
) -> Vec<ProcessRecord> {
    if query.is_empty() {
        return processes.to_vec();
    }

    let mut scored: Vec<(f64, &ProcessRecord)> = processes
        .iter()
        .filter(|p| fuzzy::matches(&p.name, query, threshold))
        .map(|p| (fuzzy::match_score(&p.name, query), p))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    scored.into_iter().map(|(_, p)| p.clone()).collect()
}

/// Stable in-place sort. `descending` puts the largest key first.
pub fn sort_processes(processes: &mut [ProcessRecord], criteria: SortBy, descending: bool) {
    if descending {
        processes.sort_by(|a, b| criteria.compare(b, a));
    } else {
        processes.sort_by(|a, b| criteria.compare(a, b));
    }
}

/// Canonical unfiltered order: CPU descending, then memory descending.
pub fn sort_canonical(processes: &mut [ProcessRecord]) {
    processes.sort_by(|a, b| {
        b.cpu_percent
            .total_cmp(&a.cpu_percent)
            .then_with(|| b.memory_percent.total_cmp(&a.memory_percent))
    });
}

/// The process list of the latest snapshot, with filter and sort views.
#[derive(Debug, Clone)]
pub struct ProcessRegistry {
    processes: Vec<ProcessRecord>,
    threshold: f64,
}

impl Default for ProcessRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_THRESHOLD)
    }

    pub fn with_threshold(threshold: f64) -> Self {
        ProcessRegistry {
            processes: Vec::new(),
            threshold,
        }
    }

    pub fn set_processes(&mut self, processes: Vec<ProcessRecord>) {
        self.processes = processes;
    }

    pub fn processes(&self) -> &[ProcessRecord] {
        &self.processes
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn filter(&self, query: &str) -> Vec<ProcessRecord> {
        filter_processes(&self.processes, query, self.threshold)
    }

    pub fn sort(&self, criteria: SortBy, descending: bool) -> Vec<ProcessRecord> {
        let mut sorted = self.processes.clone();
        sort_processes(&mut sorted, criteria, descending);
        sorted
    }

    pub fn find(&self, pid: u32) -> Option<&ProcessRecord> {
        self.processes.iter().find(|p| p.pid == pid)
    }
}
