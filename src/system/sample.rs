use serde::Serialize;

/// Cumulative CPU tick counters since boot, aggregated over all cores.
///
/// A single sample says nothing about utilization; see [`crate::system::cpu`].
/// An all-zero sample means the counters could not be read this cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CpuSample {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub total: u64,
}

impl CpuSample {
    /// Builds a sample, deriving `total` from the individual counters.
    pub fn from_ticks(
        user: u64,
        nice: u64,
        system: u64,
        idle: u64,
        iowait: u64,
        irq: u64,
        softirq: u64,
    ) -> Self {
        let total = user
            .saturating_add(nice)
            .saturating_add(system)
            .saturating_add(idle)
            .saturating_add(iowait)
            .saturating_add(irq)
            .saturating_add(softirq);
        CpuSample {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            total,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        *self == CpuSample::default()
    }
}

/// Point-in-time memory counters, in bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MemorySample {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub cached: u64,
    pub buffers: u64,
    pub percent_used: f64,
}

impl MemorySample {
    /// Sample for hosts exposing total/free/cached/buffers; `used` is what is
    /// left once the reclaimable parts are subtracted.
    pub fn from_counters(total: u64, free: u64, cached: u64, buffers: u64) -> Self {
        let used = total
            .saturating_sub(free)
            .saturating_sub(cached)
            .saturating_sub(buffers);
        MemorySample {
            total,
            used,
            free,
            cached,
            buffers,
            percent_used: percent_of(used, total),
        }
    }

    /// Sample for hosts without a buffers notion, where `used` comes from the
    /// platform's own page classification.
    pub fn from_classified(total: u64, used: u64, free: u64, cached: u64) -> Self {
        MemorySample {
            total,
            used,
            free,
            cached,
            buffers: 0,
            percent_used: percent_of(used, total),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.total == 0
    }
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}
