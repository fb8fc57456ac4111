use std::ffi::CStr;
use std::mem;

use libproc::libproc::bsd_info::BSDInfo;
use libproc::libproc::pid_rusage::{RUsageInfoV2, pidrusage};
use libproc::libproc::proc_pid::{self, pidinfo};
use libproc::libproc::task_info::TaskAllInfo;
use libproc::processes::{ProcFilter, pids_by_type};

use crate::system::collector::MetricsSource;
use crate::system::process::{ProcessRecord, ProcessState};
use crate::system::sample::{CpuSample, MemorySample};
use crate::system::users::{AccountResolver, SystemAccounts};

pub const NAME: &str = "macos";

/// Host CPU ticks run at 100 Hz; task times are in mach absolute units.
const NANOS_PER_TICK: u64 = 10_000_000;

pub struct Collector {
    accounts: SystemAccounts,
    host: libc::mach_port_t,
    timebase: (u32, u32),
    page_size: u64,
}

pub fn collector() -> Collector {
    let mut info = libc::mach_timebase_info { numer: 0, denom: 0 };
    // SAFETY: `info` is a valid out-pointer for the duration of the call.
    let timebase = if unsafe { libc::mach_timebase_info(&mut info) } == 0 && info.denom != 0 {
        (info.numer, info.denom)
    } else {
        (1, 1)
    };
    // SAFETY: sysconf has no memory-safety preconditions.
    let page_size = match unsafe { libc::sysconf(libc::_SC_PAGESIZE) } {
        n if n > 0 => n as u64,
        _ => 4096,
    };
    Collector {
        accounts: SystemAccounts::load(),
        host: host_port(),
        timebase,
        page_size,
    }
}

impl Collector {
    fn to_ticks(&self, mach_time: u64) -> u64 {
        let (numer, denom) = self.timebase;
        let nanos = (mach_time as u128 * numer as u128 / denom as u128) as u64;
        nanos / NANOS_PER_TICK
    }

    fn collect_process(&self, pid: u32) -> Option<ProcessRecord> {
        match pidinfo::<TaskAllInfo>(pid as i32, 0) {
            Ok(info) => {
                let resident = info.ptinfo.pti_resident_size;
                Some(ProcessRecord {
                    memory_bytes: resident,
                    virtual_memory_bytes: info.ptinfo.pti_virtual_size,
                    resident_memory_bytes: resident,
                    cpu_time_ticks: self.to_ticks(
                        info.ptinfo
                            .pti_total_user
                            .saturating_add(info.ptinfo.pti_total_system),
                    ),
                    ..self.identify(pid, Some(&info.pbsd))
                })
            }
            Err(task_err) => {
                // task info is denied for other users' processes; rusage and
                // BSD info usually are not
                let usage = match pidrusage::<RUsageInfoV2>(pid as i32) {
                    Ok(usage) => usage,
                    Err(err) => {
                        tracing::debug!(pid, task_error = %task_err, error = %err, "dropping process");
                        return None;
                    }
                };
                let bsd = pidinfo::<BSDInfo>(pid as i32, 0).ok();
                Some(self.rusage_record(pid, bsd.as_ref(), &usage))
            }
        }
    }

    fn rusage_record(&self, pid: u32, bsd: Option<&BSDInfo>, usage: &RUsageInfoV2) -> ProcessRecord {
        ProcessRecord {
            memory_bytes: usage.ri_resident_size,
            resident_memory_bytes: usage.ri_resident_size,
            cpu_time_ticks: self.to_ticks(usage.ri_user_time.saturating_add(usage.ri_system_time)),
            ..self.identify(pid, bsd)
        }
    }

    /// Name, owner and state. Without BSD info only the name is recoverable.
    fn identify(&self, pid: u32, bsd: Option<&BSDInfo>) -> ProcessRecord {
        let name = bsd
            .and_then(|b| comm_to_string(&b.pbi_comm))
            .filter(|n| !n.is_empty())
            .or_else(|| proc_pid::name(pid as i32).ok())
            .unwrap_or_default();
        match bsd {
            Some(b) => ProcessRecord {
                user: self.accounts.resolve(b.pbi_uid),
                state: state_from_status(b.pbi_status),
                ..ProcessRecord::new(pid, name)
            },
            None => ProcessRecord {
                state: ProcessState::Unknown,
                ..ProcessRecord::new(pid, name)
            },
        }
    }
}

impl MetricsSource for Collector {
    fn read_cpu_sample(&self) -> CpuSample {
        // SAFETY: zeroed is a valid bit pattern for this plain C struct.
        let mut load: libc::host_cpu_load_info = unsafe { mem::zeroed() };
        let mut count = libc::HOST_CPU_LOAD_INFO_COUNT;
        // SAFETY: `load` is large enough for `count` integers.
        let kr = unsafe {
            libc::host_statistics64(
                self.host,
                libc::HOST_CPU_LOAD_INFO,
                &mut load as *mut _ as libc::host_info64_t,
                &mut count,
            )
        };
        if kr != libc::KERN_SUCCESS {
            tracing::info!(kern_return = kr, "cpu counters unavailable");
            return CpuSample::default();
        }
        let ticks = |state: libc::c_int| u64::from(load.cpu_ticks[state as usize]);
        CpuSample::from_ticks(
            ticks(libc::CPU_STATE_USER),
            ticks(libc::CPU_STATE_NICE),
            ticks(libc::CPU_STATE_SYSTEM),
            ticks(libc::CPU_STATE_IDLE),
            0,
            0,
            0,
        )
    }

    fn read_memory_sample(&self) -> MemorySample {
        let Some(total) = physical_memory() else {
            tracing::info!("hw.memsize unavailable");
            return MemorySample::default();
        };

        // SAFETY: zeroed is a valid bit pattern for this plain C struct.
        let mut vm: libc::vm_statistics64 = unsafe { mem::zeroed() };
        let mut count = libc::HOST_VM_INFO64_COUNT;
        // SAFETY: `vm` is large enough for `count` integers.
        let kr = unsafe {
            libc::host_statistics64(
                self.host,
                libc::HOST_VM_INFO64,
                &mut vm as *mut _ as libc::host_info64_t,
                &mut count,
            )
        };
        if kr != libc::KERN_SUCCESS {
            tracing::info!(kern_return = kr, "vm counters unavailable");
            return MemorySample::default();
        }

        let pages = |n: u32| u64::from(n).saturating_mul(self.page_size);
        let used = pages(vm.active_count)
            .saturating_add(pages(vm.inactive_count))
            .saturating_add(pages(vm.wire_count));
        MemorySample::from_classified(
            total,
            used.min(total),
            total.saturating_sub(used),
            pages(vm.inactive_count),
        )
    }

    fn read_processes(&self) -> Vec<ProcessRecord> {
        let pids = match pids_by_type(ProcFilter::All) {
            Ok(pids) => pids,
            Err(err) => {
                tracing::info!(error = %err, "process table unavailable");
                return Vec::new();
            }
        };
        pids.into_iter()
            .filter(|&pid| pid != 0)
            .filter_map(|pid| self.collect_process(pid))
            .collect()
    }
}

/// Taken once per collector; every call adds a user reference to the right.
#[allow(deprecated)]
fn host_port() -> libc::mach_port_t {
    // SAFETY: returns a send right to the host port; no preconditions.
    unsafe { libc::mach_host_self() }
}

fn physical_memory() -> Option<u64> {
    let mut value: u64 = 0;
    let mut len = mem::size_of::<u64>();
    // SAFETY: the name is NUL-terminated and `value`/`len` describe a u64 buffer.
    let rc = unsafe {
        libc::sysctlbyname(
            c"hw.memsize".as_ptr(),
            &mut value as *mut u64 as *mut libc::c_void,
            &mut len,
            std::ptr::null_mut(),
            0,
        )
    };
    (rc == 0 && value > 0).then_some(value)
}

fn comm_to_string(comm: &[libc::c_char]) -> Option<String> {
    // SAFETY: c_char and u8 have the same layout.
    let bytes: &[u8] = unsafe { &*(comm as *const [libc::c_char] as *const [u8]) };
    CStr::from_bytes_until_nul(bytes)
        .ok()
        .map(|s| s.to_string_lossy().into_owned())
}

fn state_from_status(status: u32) -> ProcessState {
    match status {
        1 => ProcessState::Idle,
        2 => ProcessState::Running,
        3 => ProcessState::Sleeping,
        4 => ProcessState::Stopped,
        5 => ProcessState::Zombie,
        _ => ProcessState::Unknown,
    }
}
