use crate::system::collector::MetricsSource;
use crate::system::process::ProcessRecord;
use crate::system::sample::{CpuSample, MemorySample};

pub const NAME: &str = "unsupported";

/// No counters on this host: every read is the "unavailable" value.
pub struct Collector;

pub fn collector() -> Collector {
    tracing::info!("no native collector for this platform; readings will be empty");
    Collector
}

impl MetricsSource for Collector {
    fn read_cpu_sample(&self) -> CpuSample {
        CpuSample::default()
    }

    fn read_memory_sample(&self) -> MemorySample {
        MemorySample::default()
    }

    fn read_processes(&self) -> Vec<ProcessRecord> {
        Vec::new()
    }
}
