//! Counter-file collector: reads the aggregate CPU line, the memory key/value
//! table and one `stat`/`status` pair per process from a procfs-style tree.

use std::fmt;
use std::path::PathBuf;

use super::collector::MetricsSource;
use super::fs::FileSystem;
use super::process::{ProcessRecord, ProcessState};
use super::sample::{CpuSample, MemorySample};
use super::users::AccountResolver;

/// Bytes per resident page.
pub const PAGE_SIZE: u64 = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseError {}

/// Why a single process could not be read.
#[derive(Debug)]
pub enum CollectError {
    /// The process exited between enumeration and the detail read.
    ProcessGone(u32),
    Io(std::io::Error),
    Parse(String),
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectError::ProcessGone(pid) => write!(f, "process {pid} disappeared"),
            CollectError::Io(e) => write!(f, "I/O error: {e}"),
            CollectError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for CollectError {}

impl From<std::io::Error> for CollectError {
    fn from(e: std::io::Error) -> Self {
        CollectError::Io(e)
    }
}

impl From<ParseError> for CollectError {
    fn from(e: ParseError) -> Self {
        CollectError::Parse(e.message)
    }
}

/// Parses the aggregate `cpu` line of a stat file.
///
/// A malformed counter reads as 0 without affecting its neighbours; a missing
/// aggregate line is an error.
pub fn parse_cpu_line(content: &str) -> Result<CpuSample, ParseError> {
    let line = content
        .lines()
        .find(|l| l.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| ParseError::new("no aggregate cpu line"))?;

    let mut fields = line.split_whitespace().skip(1);
    let mut next = || {
        fields
            .next()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0)
    };
    let (user, nice, system, idle) = (next(), next(), next(), next());
    let (iowait, irq, softirq) = (next(), next(), next());

    Ok(CpuSample::from_ticks(
        user, nice, system, idle, iowait, irq, softirq,
    ))
}

/// Memory counters of interest, already scaled to bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemInfo {
    pub total: u64,
    pub free: u64,
    pub cached: u64,
    pub buffers: u64,
}

/// Parses a `Key:   value kB` table. Unknown keys and malformed values are
/// skipped; a missing key reads as 0.
pub fn parse_meminfo(content: &str) -> MemInfo {
    let mut info = MemInfo::default();
    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Ok(kib) = value.parse::<u64>() else {
            continue;
        };
        let bytes = kib.saturating_mul(1024);
        match key {
            "MemTotal:" => info.total = bytes,
            "MemFree:" => info.free = bytes,
            "Cached:" => info.cached = bytes,
            "Buffers:" => info.buffers = bytes,
            _ => {}
        }
    }
    info
}

/// Fields taken from a per-process `stat` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PidStat {
    pub pid: u32,
    pub name: String,
    pub state: ProcessState,
    pub utime: u64,
    pub stime: u64,
    pub vsize: u64,
    pub rss_pages: u64,
}

/// Parses a per-process `stat` line.
///
/// The command name sits between the first `(` and the last `)` and may itself
/// contain spaces or parentheses.
pub fn parse_pid_stat(content: &str) -> Result<PidStat, ParseError> {
    let open = content
        .find('(')
        .ok_or_else(|| ParseError::new("stat: missing '('"))?;
    let close = content
        .rfind(')')
        .ok_or_else(|| ParseError::new("stat: missing ')'"))?;
    if close < open {
        return Err(ParseError::new("stat: unbalanced name"));
    }

    let pid = content[..open]
        .trim()
        .parse::<u32>()
        .map_err(|_| ParseError::new("stat: bad pid"))?;
    let name = content[open + 1..close].to_string();

    // Fields after comm: state(0) ppid(1) pgrp(2) session(3) tty_nr(4)
    // tpgid(5) flags(6) minflt(7) cminflt(8) majflt(9) cmajflt(10)
    // utime(11) stime(12) cutime(13) cstime(14) priority(15) nice(16)
    // num_threads(17) itrealvalue(18) starttime(19) vsize(20) rss(21)
    let fields: Vec<&str> = content[close + 1..].split_whitespace().collect();
    if fields.len() < 22 {
        return Err(ParseError::new(format!(
            "stat: expected at least 22 fields after name, got {}",
            fields.len()
        )));
    }

    let state = fields[0]
        .chars()
        .next()
        .map(ProcessState::from_code)
        .unwrap_or_default();
    let number = |idx: usize| fields[idx].parse::<u64>().unwrap_or(0);

    Ok(PidStat {
        pid,
        name,
        state,
        utime: number(11),
        stime: number(12),
        vsize: number(20),
        // rss is signed in the kernel; negative values are nonsense here
        rss_pages: fields[21].parse::<i64>().map(|v| v.max(0) as u64).unwrap_or(0),
    })
}

/// Fields taken from a per-process `status` stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PidStatus {
    pub uid: Option<u32>,
    pub vm_rss: Option<u64>,
}

pub fn parse_pid_status(content: &str) -> PidStatus {
    let mut status = PidStatus::default();
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("Uid:") {
            // real, effective, saved, filesystem
            status.uid = rest.split_whitespace().next().and_then(|v| v.parse().ok());
        } else if let Some(rest) = line.strip_prefix("VmRSS:") {
            status.vm_rss = rest
                .split_whitespace()
                .next()
                .and_then(|v| v.parse::<u64>().ok())
                .map(|kib| kib.saturating_mul(1024));
        }
    }
    status
}

/// Collector over a procfs tree rooted at `root` (normally `/proc`).
pub struct ProcfsCollector<F, A> {
    fs: F,
    root: PathBuf,
    accounts: A,
}

impl<F: FileSystem, A: AccountResolver> ProcfsCollector<F, A> {
    pub fn new(fs: F, root: impl Into<PathBuf>, accounts: A) -> Self {
        ProcfsCollector {
            fs,
            root: root.into(),
            accounts,
        }
    }

    /// Reads one process. Any failure means the record is not usable this cycle.
    pub fn collect_process(&self, pid: u32) -> Result<ProcessRecord, CollectError> {
        let dir = self.root.join(pid.to_string());

        let stat_content = self
            .fs
            .read_to_string(&dir.join("stat"))
            .map_err(|_| CollectError::ProcessGone(pid))?;
        let stat = parse_pid_stat(&stat_content)?;

        let status_content = self
            .fs
            .read_to_string(&dir.join("status"))
            .map_err(|_| CollectError::ProcessGone(pid))?;
        let status = parse_pid_status(&status_content);

        if stat.pid != pid {
            return Err(CollectError::Parse(format!(
                "stat pid {} does not match directory {pid}",
                stat.pid
            )));
        }

        let resident = stat.rss_pages.saturating_mul(PAGE_SIZE);
        Ok(ProcessRecord {
            pid,
            name: stat.name,
            user: status
                .uid
                .map(|uid| self.accounts.resolve(uid))
                .unwrap_or_default(),
            cpu_percent: 0.0,
            memory_percent: 0.0,
            memory_bytes: status.vm_rss.unwrap_or(resident),
            virtual_memory_bytes: stat.vsize,
            resident_memory_bytes: resident,
            state: stat.state,
            cpu_time_ticks: stat.utime.saturating_add(stat.stime),
        })
    }
}

impl<F: FileSystem, A: AccountResolver> MetricsSource for ProcfsCollector<F, A> {
    fn read_cpu_sample(&self) -> CpuSample {
        let path = self.root.join("stat");
        let parsed = self
            .fs
            .read_to_string(&path)
            .map_err(CollectError::from)
            .and_then(|content| parse_cpu_line(&content).map_err(CollectError::from));
        match parsed {
            Ok(sample) => sample,
            Err(err) => {
                tracing::info!(path = %path.display(), error = %err, "cpu counters unavailable");
                CpuSample::default()
            }
        }
    }

    fn read_memory_sample(&self) -> MemorySample {
        let path = self.root.join("meminfo");
        match self.fs.read_to_string(&path) {
            Ok(content) => {
                let info = parse_meminfo(&content);
                MemorySample::from_counters(info.total, info.free, info.cached, info.buffers)
            }
            Err(err) => {
                tracing::info!(path = %path.display(), error = %err, "memory counters unavailable");
                MemorySample::default()
            }
        }
    }

    fn read_processes(&self) -> Vec<ProcessRecord> {
        let names = match self.fs.read_dir_names(&self.root) {
            Ok(names) => names,
            Err(err) => {
                tracing::info!(root = %self.root.display(), error = %err, "process table unavailable");
                return Vec::new();
            }
        };

        let mut processes = Vec::with_capacity(names.len());
        for name in names {
            let Ok(pid) = name.parse::<u32>() else {
                continue;
            };
            if pid == 0 {
                continue;
            }
            match self.collect_process(pid) {
                Ok(record) => processes.push(record),
                Err(err) => tracing::debug!(pid, error = %err, "dropping process"),
            }
        }
        processes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::fs::MockFs;
    use crate::system::users::StaticAccounts;

    const STAT: &str = "cpu  4705 356 584 3699 23 0 12 0 0 0\n\
                        cpu0 1393 280 260 983 2 0 5 0 0 0\n\
                        intr 1462898\n";

    fn pid_stat(pid: u32, name: &str, utime: u64, stime: u64, vsize: u64, rss: i64) -> String {
        format!(
            "{pid} ({name}) S 1 {pid} {pid} 0 -1 4194560 100 0 0 0 {utime} {stime} 0 0 20 0 1 0 500 {vsize} {rss} 18446744073709551615"
        )
    }

    fn status(uid: u32, rss_kib: Option<u64>) -> String {
        let mut s = format!("Name:\tproc\nState:\tS (sleeping)\nUid:\t{uid}\t{uid}\t{uid}\t{uid}\n");
        if let Some(kib) = rss_kib {
            s.push_str(&format!("VmRSS:\t{kib} kB\n"));
        }
        s
    }

    fn collector(fs: MockFs) -> ProcfsCollector<MockFs, StaticAccounts> {
        ProcfsCollector::new(fs, "/proc", StaticAccounts::new([(0, "root"), (1000, "alice")]))
    }

    #[test]
    fn cpu_line_sums_seven_counters() {
        let sample = parse_cpu_line(STAT).unwrap();
        assert_eq!(sample.user, 4705);
        assert_eq!(sample.idle, 3699);
        assert_eq!(sample.softirq, 12);
        assert_eq!(sample.total, 4705 + 356 + 584 + 3699 + 23 + 0 + 12);
    }

    #[test]
    fn cpu_line_malformed_field_reads_zero() {
        let sample = parse_cpu_line("cpu 10 x 5 100 0 0 0\n").unwrap();
        assert_eq!(sample.nice, 0);
        assert_eq!(sample.user, 10);
        assert_eq!(sample.total, 115);
    }

    #[test]
    fn cpu_line_missing_is_error() {
        assert!(parse_cpu_line("cpu0 1 2 3 4\n").is_err());
        assert!(parse_cpu_line("").is_err());
    }

    #[test]
    fn meminfo_scales_kib_to_bytes() {
        let info = parse_meminfo(
            "MemTotal:       16000 kB\nMemFree:         4000 kB\nMemAvailable:    9000 kB\n\
             Buffers:          500 kB\nCached:          3000 kB\nSwapCached:        10 kB\n",
        );
        assert_eq!(info.total, 16000 * 1024);
        assert_eq!(info.free, 4000 * 1024);
        assert_eq!(info.buffers, 500 * 1024);
        assert_eq!(info.cached, 3000 * 1024);
    }

    #[test]
    fn meminfo_bad_value_only_affects_its_key() {
        let info = parse_meminfo("MemTotal: 100 kB\nMemFree: lots kB\nCached: 10 kB\n");
        assert_eq!(info.total, 100 * 1024);
        assert_eq!(info.free, 0);
        assert_eq!(info.cached, 10 * 1024);
    }

    #[test]
    fn pid_stat_strips_parentheses_and_keeps_spaces() {
        let stat = parse_pid_stat(&pid_stat(42, "Web Content (x)", 7, 3, 1_000_000, 25)).unwrap();
        assert_eq!(stat.pid, 42);
        assert_eq!(stat.name, "Web Content (x)");
        assert_eq!(stat.state, ProcessState::Sleeping);
        assert_eq!(stat.utime, 7);
        assert_eq!(stat.stime, 3);
        assert_eq!(stat.vsize, 1_000_000);
        assert_eq!(stat.rss_pages, 25);
    }

    #[test]
    fn pid_stat_rejects_truncated_line() {
        assert!(parse_pid_stat("42 (short) S 1 2").is_err());
        assert!(parse_pid_stat("garbage").is_err());
    }

    #[test]
    fn pid_stat_negative_rss_is_zero() {
        let stat = parse_pid_stat(&pid_stat(5, "k", 0, 0, 0, -1)).unwrap();
        assert_eq!(stat.rss_pages, 0);
    }

    #[test]
    fn status_reads_real_uid_and_rss() {
        let parsed = parse_pid_status("Uid:\t1000\t0\t0\t0\nVmRSS:\t  2048 kB\n");
        assert_eq!(parsed.uid, Some(1000));
        assert_eq!(parsed.vm_rss, Some(2048 * 1024));
        assert_eq!(parse_pid_status("Name:\tkthreadd\n"), PidStatus::default());
    }

    #[test]
    fn collector_reads_full_tree() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/stat", STAT);
        fs.add_file(
            "/proc/meminfo",
            "MemTotal: 1000 kB\nMemFree: 200 kB\nCached: 300 kB\nBuffers: 100 kB\n",
        );
        fs.add_process("/proc", 1, &pid_stat(1, "init", 10, 5, 4096, 3), &status(0, Some(12)));
        fs.add_process("/proc", 77, &pid_stat(77, "editor", 1, 1, 8192, 2), &status(1000, None));
        fs.add_file("/proc/self/stat", "not a pid dir");

        let collector = collector(fs);
        assert_eq!(collector.read_cpu_sample().total, 9379);

        let mem = collector.read_memory_sample();
        assert_eq!(mem.total, 1000 * 1024);
        assert_eq!(mem.used, 400 * 1024);

        let mut procs = collector.read_processes();
        procs.sort_by_key(|p| p.pid);
        assert_eq!(procs.len(), 2);

        assert_eq!(procs[0].name, "init");
        assert_eq!(procs[0].user, "root");
        assert_eq!(procs[0].memory_bytes, 12 * 1024);
        assert_eq!(procs[0].resident_memory_bytes, 3 * PAGE_SIZE);
        assert_eq!(procs[0].virtual_memory_bytes, 4096);
        assert_eq!(procs[0].cpu_time_ticks, 15);

        // no VmRSS: fall back to rss pages
        assert_eq!(procs[1].user, "alice");
        assert_eq!(procs[1].memory_bytes, 2 * PAGE_SIZE);
    }

    #[test]
    fn vanished_process_is_dropped() {
        let mut fs = MockFs::new();
        fs.add_process("/proc", 10, &pid_stat(10, "a", 0, 0, 0, 0), &status(0, None));
        fs.add_process("/proc", 11, &pid_stat(11, "b", 0, 0, 0, 0), &status(0, None));
        fs.remove_file("/proc/11/status");

        let procs = collector(fs).read_processes();
        assert_eq!(procs.len(), 1);
        assert_eq!(procs[0].pid, 10);
    }

    #[test]
    fn pid_zero_is_never_returned() {
        let mut fs = MockFs::new();
        fs.add_process("/proc", 0, &pid_stat(0, "swapper", 0, 0, 0, 0), &status(0, None));
        assert!(collector(fs).read_processes().is_empty());
    }

    #[test]
    fn missing_sources_yield_zero_samples() {
        let collector = collector(MockFs::new());
        assert!(collector.read_cpu_sample().is_unavailable());
        assert!(collector.read_memory_sample().is_unavailable());
        assert!(collector.read_processes().is_empty());
    }
}
