use std::fmt;

use serde::{Serialize, Serializer};

/// Scheduler state of a process, kept as its single-character code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ProcessState {
    Running,
    Sleeping,
    DiskSleep,
    Stopped,
    Zombie,
    Idle,
    Dead,
    #[default]
    Unknown,
    Other(char),
}

impl ProcessState {
    pub fn from_code(code: char) -> Self {
        match code {
            'R' => ProcessState::Running,
            'S' => ProcessState::Sleeping,
            'D' => ProcessState::DiskSleep,
            'T' | 't' => ProcessState::Stopped,
            'Z' => ProcessState::Zombie,
            'I' => ProcessState::Idle,
            'X' | 'x' => ProcessState::Dead,
            '?' => ProcessState::Unknown,
            other => ProcessState::Other(other),
        }
    }

    pub fn code(self) -> char {
        match self {
            ProcessState::Running => 'R',
            ProcessState::Sleeping => 'S',
            ProcessState::DiskSleep => 'D',
            ProcessState::Stopped => 'T',
            ProcessState::Zombie => 'Z',
            ProcessState::Idle => 'I',
            ProcessState::Dead => 'X',
            ProcessState::Unknown => '?',
            ProcessState::Other(c) => c,
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for ProcessState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.code())
    }
}

/// One live process as seen by a single poll cycle.
///
/// `cpu_percent` and `memory_percent` are filled in by the sampler; collectors
/// leave them at zero. `cpu_time_ticks` is cumulative CPU time expressed in
/// the same tick unit as [`crate::system::sample::CpuSample`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub user: String,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub memory_bytes: u64,
    pub virtual_memory_bytes: u64,
    pub resident_memory_bytes: u64,
    pub state: ProcessState,
    pub cpu_time_ticks: u64,
}

impl ProcessRecord {
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        ProcessRecord {
            pid,
            name: name.into(),
            ..ProcessRecord::default()
        }
    }
}
