use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::collector::MetricsSource;
use super::cpu::{ProcessCpuTracker, cpu_breakdown, cpu_percent};
use super::registry::sort_canonical;
use super::sample::{CpuSample, percent_of};
use super::snapshot::{CpuUsage, Snapshot};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Idle,
    Running,
    Stopped,
}

/// One collect → derive step. Owns the CPU history; never shared.
pub struct Poller<S> {
    source: S,
    previous_cpu: Option<CpuSample>,
    tracker: ProcessCpuTracker,
    sequence: u64,
}

impl<S: MetricsSource> Poller<S> {
    pub fn new(source: S) -> Self {
        Poller {
            source,
            previous_cpu: None,
            tracker: ProcessCpuTracker::new(),
            sequence: 0,
        }
    }

    pub fn poll(&mut self) -> Snapshot {
        let _span = tracing::debug_span!("poll", sequence = self.sequence + 1).entered();

        let cpu = self.source.read_cpu_sample();
        let (cpu_usage, total_delta) = self.derive_cpu(&cpu);

        let memory = self.source.read_memory_sample();
        let mut processes = self.source.read_processes();
        // per-pid baselines stay paired with the last good system sample
        if !cpu.is_unavailable() {
            self.tracker.update(&mut processes, total_delta);
        }
        for process in &mut processes {
            process.memory_percent = percent_of(process.memory_bytes, memory.total);
        }
        sort_canonical(&mut processes);

        self.sequence += 1;
        tracing::debug!(processes = processes.len(), cpu = cpu_usage.total, "poll complete");

        Snapshot {
            sequence: self.sequence,
            cpu,
            cpu_usage,
            memory,
            processes,
        }
    }

    /// Two cycles `interval` apart, returning the second, so CPU figures are
    /// real deltas rather than the zero of a first cycle.
    pub async fn settled(&mut self, interval: Duration) -> Snapshot {
        self.poll();
        tokio::time::sleep(interval).await;
        self.poll()
    }

    /// An unreadable sample reads as idle and leaves the history alone, so
    /// the next good sample is measured against the last good one.
    fn derive_cpu(&mut self, cpu: &CpuSample) -> (CpuUsage, u64) {
        if cpu.is_unavailable() {
            return (CpuUsage::default(), 0);
        }
        let derived = match self.previous_cpu {
            Some(previous) => {
                let (user, system) = cpu_breakdown(cpu, &previous);
                let usage = CpuUsage {
                    total: cpu_percent(cpu, &previous),
                    user,
                    system,
                };
                (usage, cpu.total.saturating_sub(previous.total))
            }
            None => (CpuUsage::default(), 0),
        };
        self.previous_cpu = Some(*cpu);
        derived
    }
}

/// Background poll loop publishing immutable snapshots through a single-slot
/// channel. Readers never wait on collection work.
pub struct Sampler<S> {
    interval: Duration,
    state: SamplerState,
    source: Option<S>,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    snapshot_rx: watch::Receiver<Arc<Snapshot>>,
    stop_tx: watch::Sender<bool>,
    worker: Option<JoinHandle<()>>,
}

impl<S: MetricsSource + 'static> Sampler<S> {
    pub fn new(source: S) -> Self {
        Self::with_interval(source, DEFAULT_INTERVAL)
    }

    pub fn with_interval(source: S, interval: Duration) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(Snapshot::default()));
        let (stop_tx, _) = watch::channel(false);
        Sampler {
            interval,
            state: SamplerState::Idle,
            source: Some(source),
            snapshot_tx,
            snapshot_rx,
            stop_tx,
            worker: None,
        }
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs the first cycle on the calling thread, then hands the loop to the
    /// runtime. Only the first call from `Idle` does anything.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn start(&mut self) {
        if self.state != SamplerState::Idle {
            return;
        }
        let Some(source) = self.source.take() else {
            return;
        };

        let mut poller = Poller::new(source);
        self.snapshot_tx.send_replace(Arc::new(poller.poll()));

        let tx = self.snapshot_tx.clone();
        let stop_rx = self.stop_tx.subscribe();
        self.worker = Some(tokio::spawn(run(poller, self.interval, tx, stop_rx)));
        self.state = SamplerState::Running;
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "sampler started");
    }

    /// Signals the loop and waits for it to exit. Anything collected after
    /// the signal is discarded. Calling it again is a no-op.
    pub async fn stop(&mut self) {
        if self.state == SamplerState::Stopped {
            return;
        }
        self.stop_tx.send_replace(true);
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                tracing::warn!(error = %e, "sampler task ended abnormally");
            }
        }
        self.state = SamplerState::Stopped;
        tracing::info!("sampler stopped");
    }

    /// Latest published snapshot. Never blocks on collection.
    pub fn current_snapshot(&self) -> Arc<Snapshot> {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that wakes on every publish.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot_rx.clone()
    }
}

impl<S> Drop for Sampler<S> {
    fn drop(&mut self) {
        self.stop_tx.send_replace(true);
    }
}

async fn run<S: MetricsSource + 'static>(
    mut poller: Poller<S>,
    period: Duration,
    tx: watch::Sender<Arc<Snapshot>>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick fires immediately; the synchronous cycle already covered it
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = stop_rx.changed() => break,
        }
        if *stop_rx.borrow() {
            break;
        }

        let cycle = tokio::task::spawn_blocking(move || {
            let snapshot = poller.poll();
            (poller, snapshot)
        })
        .await;
        let snapshot = match cycle {
            Ok((returned, snapshot)) => {
                poller = returned;
                snapshot
            }
            Err(e) => {
                tracing::warn!(error = %e, "collection worker died; sampler exiting");
                break;
            }
        };

        if *stop_rx.borrow() {
            break;
        }
        tx.send_replace(Arc::new(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;
    use crate::system::process::ProcessRecord;
    use crate::system::sample::MemorySample;

    /// Each read advances the counters: 100 ticks per cycle, 25 of them busy.
    struct Scripted {
        cycle: Arc<AtomicU64>,
        processes: Mutex<Vec<ProcessRecord>>,
    }

    impl Scripted {
        fn new(processes: Vec<ProcessRecord>) -> (Self, Arc<AtomicU64>) {
            let cycle = Arc::new(AtomicU64::new(0));
            let source = Scripted {
                cycle: Arc::clone(&cycle),
                processes: Mutex::new(processes),
            };
            (source, cycle)
        }
    }

    impl MetricsSource for Scripted {
        fn read_cpu_sample(&self) -> CpuSample {
            let n = self.cycle.fetch_add(1, Ordering::SeqCst) + 1;
            CpuSample::from_ticks(25 * n, 0, 0, 75 * n, 0, 0, 0)
        }

        fn read_memory_sample(&self) -> MemorySample {
            MemorySample::from_counters(1000, 500, 0, 0)
        }

        fn read_processes(&self) -> Vec<ProcessRecord> {
            let n = self.cycle.load(Ordering::SeqCst);
            let mut procs = self.processes.lock().unwrap().clone();
            for p in &mut procs {
                p.cpu_time_ticks = n * u64::from(p.pid);
            }
            procs
        }
    }

    fn proc(pid: u32, bytes: u64) -> ProcessRecord {
        ProcessRecord {
            memory_bytes: bytes,
            ..ProcessRecord::new(pid, format!("p{pid}"))
        }
    }

    #[test]
    fn poller_first_cycle_is_zero_then_tracks_deltas() {
        let (source, _) = Scripted::new(vec![proc(5, 100), proc(10, 50)]);
        let mut poller = Poller::new(source);

        let first = poller.poll();
        assert_eq!(first.sequence, 1);
        assert_eq!(first.cpu_usage.total, 0.0);
        assert!(first.processes.iter().all(|p| p.cpu_percent == 0.0));

        let second = poller.poll();
        assert_eq!(second.sequence, 2);
        assert!((second.cpu_usage.total - 25.0).abs() < 1e-9);
        // pid 10 burns 10 ticks per 100, pid 5 burns 5
        let pids: Vec<u32> = second.processes.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![10, 5]);
        assert!((second.processes[0].cpu_percent - 10.0).abs() < 1e-9);
        assert!((second.processes[1].memory_percent - 10.0).abs() < 1e-9);
    }

    #[test]
    fn unavailable_cpu_keeps_previous_sample() {
        struct Flaky(AtomicU64);
        impl MetricsSource for Flaky {
            fn read_cpu_sample(&self) -> CpuSample {
                match self.0.fetch_add(1, Ordering::SeqCst) {
                    0 => CpuSample::from_ticks(10, 0, 0, 90, 0, 0, 0),
                    1 => CpuSample::default(),
                    _ => CpuSample::from_ticks(60, 0, 0, 140, 0, 0, 0),
                }
            }
            fn read_memory_sample(&self) -> MemorySample {
                MemorySample::default()
            }
            fn read_processes(&self) -> Vec<ProcessRecord> {
                vec![proc(1, 4096)]
            }
        }

        let mut poller = Poller::new(Flaky(AtomicU64::new(0)));
        poller.poll();
        let gap = poller.poll();
        assert_eq!(gap.cpu_usage.total, 0.0);
        // zero total memory must not divide
        assert_eq!(gap.processes[0].memory_percent, 0.0);

        let after = poller.poll();
        assert!((after.cpu_usage.total - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn settled_snapshot_waits_the_given_interval() {
        let (source, _) = Scripted::new(vec![proc(10, 50)]);
        let mut poller = Poller::new(source);
        let interval = Duration::from_millis(30);

        let started = std::time::Instant::now();
        let snapshot = poller.settled(interval).await;
        assert!(started.elapsed() >= interval);
        assert_eq!(snapshot.sequence, 2);
        assert!((snapshot.cpu_usage.total - 25.0).abs() < 1e-9);
        assert!((snapshot.processes[0].cpu_percent - 10.0).abs() < 1e-9);
    }

    #[test]
    fn process_share_spans_an_unavailable_cycle() {
        // 100 system ticks and 20 process ticks per cycle; cycle 2 is unreadable
        struct Gappy(AtomicU64);
        impl MetricsSource for Gappy {
            fn read_cpu_sample(&self) -> CpuSample {
                let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
                if n == 2 {
                    CpuSample::default()
                } else {
                    CpuSample::from_ticks(50 * n, 0, 0, 50 * n, 0, 0, 0)
                }
            }
            fn read_memory_sample(&self) -> MemorySample {
                MemorySample::from_counters(1000, 500, 0, 0)
            }
            fn read_processes(&self) -> Vec<ProcessRecord> {
                let n = self.0.load(Ordering::SeqCst);
                vec![ProcessRecord {
                    cpu_time_ticks: 20 * n,
                    ..proc(7, 10)
                }]
            }
        }

        let mut poller = Poller::new(Gappy(AtomicU64::new(0)));
        let first = poller.poll();
        let gap = poller.poll();
        let after = poller.poll();

        assert_eq!(first.processes[0].cpu_percent, 0.0);
        assert_eq!(gap.processes[0].cpu_percent, 0.0);
        assert!((after.cpu_usage.total - 50.0).abs() < 1e-9);
        assert!((after.processes[0].cpu_percent - 20.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn start_publishes_initial_snapshot_synchronously() {
        let (source, _) = Scripted::new(vec![proc(1, 10)]);
        let mut sampler = Sampler::with_interval(source, Duration::from_secs(60));
        assert_eq!(sampler.state(), SamplerState::Idle);
        assert_eq!(sampler.current_snapshot().sequence, 0);

        sampler.start();
        assert_eq!(sampler.state(), SamplerState::Running);
        let snap = sampler.current_snapshot();
        assert_eq!(snap.sequence, 1);
        assert_eq!(snap.process_count(), 1);

        sampler.stop().await;
        assert_eq!(sampler.state(), SamplerState::Stopped);
    }

    #[tokio::test]
    async fn snapshots_arrive_in_order() {
        let (source, _) = Scripted::new(vec![proc(1, 10), proc(2, 20)]);
        let mut sampler = Sampler::with_interval(source, Duration::from_millis(10));
        let mut rx = sampler.subscribe();
        sampler.start();

        let mut last = sampler.current_snapshot().sequence;
        for _ in 0..3 {
            rx.changed().await.unwrap();
            let seq = rx.borrow_and_update().sequence;
            assert!(seq >= last);
            last = seq;
        }
        assert!(last >= 2);

        sampler.stop().await;
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_final() {
        let (source, cycles) = Scripted::new(Vec::new());
        let mut sampler = Sampler::with_interval(source, Duration::from_millis(10));
        sampler.start();
        sampler.stop().await;
        sampler.stop().await;
        assert_eq!(sampler.state(), SamplerState::Stopped);

        let seq = sampler.current_snapshot().sequence;
        let reads = cycles.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sampler.current_snapshot().sequence, seq);
        assert_eq!(cycles.load(Ordering::SeqCst), reads);

        // no restart from Stopped
        sampler.start();
        assert_eq!(sampler.state(), SamplerState::Stopped);
    }

    #[tokio::test]
    async fn start_twice_does_not_spawn_second_loop() {
        let (source, cycles) = Scripted::new(Vec::new());
        let mut sampler = Sampler::with_interval(source, Duration::from_secs(60));
        sampler.start();
        sampler.start();
        assert_eq!(cycles.load(Ordering::SeqCst), 1);
        sampler.stop().await;
    }

    #[tokio::test]
    async fn stop_from_idle_never_collects() {
        let (source, cycles) = Scripted::new(Vec::new());
        let mut sampler = Sampler::new(source);
        sampler.stop().await;
        assert_eq!(sampler.state(), SamplerState::Stopped);
        sampler.start();
        assert_eq!(cycles.load(Ordering::SeqCst), 0);
    }
}
