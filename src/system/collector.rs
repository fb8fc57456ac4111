use super::process::ProcessRecord;
use super::sample::{CpuSample, MemorySample};

/// Raw readings from the host. Every call goes back to the OS; nothing is
/// cached between calls.
///
/// Failures never surface as errors: an unreadable system-wide source yields
/// an all-zero sample, and a process that cannot be read is left out.
pub trait MetricsSource: Send {
    fn read_cpu_sample(&self) -> CpuSample;
    fn read_memory_sample(&self) -> MemorySample;
    fn read_processes(&self) -> Vec<ProcessRecord>;
}

/// Returns the same readings on every call.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pub cpu: CpuSample,
    pub memory: MemorySample,
    pub processes: Vec<ProcessRecord>,
}

impl StaticSource {
    pub fn new(cpu: CpuSample, memory: MemorySample, processes: Vec<ProcessRecord>) -> Self {
        StaticSource {
            cpu,
            memory,
            processes,
        }
    }
}

impl MetricsSource for StaticSource {
    fn read_cpu_sample(&self) -> CpuSample {
        self.cpu
    }

    fn read_memory_sample(&self) -> MemorySample {
        self.memory
    }

    fn read_processes(&self) -> Vec<ProcessRecord> {
        self.processes.clone()
    }
}
