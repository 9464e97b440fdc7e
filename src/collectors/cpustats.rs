//! CPU time, interrupt and boot time parsing.
//!
//! FreeBSD exposes CPU times as flat sysctl strings (`kern.cp_time` for the
//! aggregate, `kern.cp_times` with five counters per core) and interrupts via
//! `vmstat -i`. Linux exposes all of it in /proc/stat.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, warn};

use crate::collectors::procs::ProcessCounts;
use crate::value::NumericValue;

/// Counters per core in `kern.cp_times`: user, nice, system, irq, idle.
pub const CP_TIME_FIELDS: usize = 5;

/// Highest IRQ number accepted into the interrupt table.
const MAX_IRQ: usize = 65_535;

/// One CPU time breakdown, aggregate or per core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuTimes {
    pub user: NumericValue,
    pub nice: NumericValue,
    pub system: NumericValue,
    pub irq: NumericValue,
    pub idle: NumericValue,
}

impl CpuTimes {
    /// Builds a record from tokens in `kern.cp_time` order.
    pub fn from_cp_time(fields: &[&str]) -> Option<Self> {
        match fields {
            [user, nice, system, irq, idle, ..] => Some(Self {
                user: NumericValue::coerce(user),
                nice: NumericValue::coerce(nice),
                system: NumericValue::coerce(system),
                irq: NumericValue::coerce(irq),
                idle: NumericValue::coerce(idle),
            }),
            _ => None,
        }
    }
}

/// Aggregate CPU times plus one record per core, `cpu0` first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuBreakdown {
    pub aggregate: Option<CpuTimes>,
    pub cores: Vec<CpuTimes>,
}

/// Splits the flat per-core counter string into five-token windows.
///
/// Trailing tokens that do not fill a whole window are dropped.
pub fn parse_cpu_times(aggregate: &str, per_core: &str) -> CpuBreakdown {
    let agg_fields: Vec<&str> = aggregate.split_whitespace().collect();
    let aggregate = CpuTimes::from_cp_time(&agg_fields);
    if aggregate.is_none() {
        warn!(
            "Aggregate CPU times need {} fields, got {}",
            CP_TIME_FIELDS,
            agg_fields.len()
        );
    }

    let core_fields: Vec<&str> = per_core.split_whitespace().collect();
    let ncpu = core_fields.len() / CP_TIME_FIELDS;
    let remainder = core_fields.len() % CP_TIME_FIELDS;
    if remainder != 0 {
        debug!("Ignoring {} trailing per-core CPU fields", remainder);
    }

    let cores = core_fields
        .chunks_exact(CP_TIME_FIELDS)
        .take(ncpu)
        .filter_map(CpuTimes::from_cp_time)
        .collect();

    CpuBreakdown { aggregate, cores }
}

/// System interrupt counts; index N holds IRQ N.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterruptTable {
    pub total: Option<NumericValue>,
    pub irqs: Vec<NumericValue>,
}

impl InterruptTable {
    /// Stores a count, zero-filling any IRQ numbers skipped so far.
    pub fn set(&mut self, irq: usize, count: NumericValue) {
        if irq > MAX_IRQ {
            warn!("Ignoring out-of-range IRQ number {}", irq);
            return;
        }
        if self.irqs.len() <= irq {
            self.irqs.resize(irq + 1, NumericValue::Integer(0));
        }
        self.irqs[irq] = count;
    }
}

/// Parses `vmstat -i` output.
///
/// ```text
/// interrupt                          total       rate
/// irq1: atkbd0                           3          0
/// irq16: ehci0 uhci0                   120          1
/// Total                             900123       1001
/// ```
pub fn parse_vmstat_interrupts(content: &str) -> InterruptTable {
    let mut table = InterruptTable::default();

    for line in content.lines() {
        if line.starts_with("irq") {
            let comps: Vec<&str> = line.split_whitespace().collect();
            // name, device (may span several tokens), total, rate
            if comps.len() < 4 {
                debug!("Skipping short interrupt line: {}", line);
                continue;
            }

            let irqnum = comps[0]
                .strip_prefix("irq")
                .and_then(|rest| rest.split(':').next())
                .and_then(|n| n.parse::<usize>().ok());
            let Some(irqnum) = irqnum else {
                debug!("Skipping interrupt line without IRQ number: {}", line);
                continue;
            };

            table.set(irqnum, NumericValue::coerce(comps[comps.len() - 2]));
        } else if line.starts_with("Total") {
            if let Some(total) = line.split_whitespace().nth(1) {
                table.total = Some(NumericValue::coerce(total));
            }
        }
    }

    table
}

/// Parses the `kern.boottime` sysctl value.
///
/// Format: `{ sec = 1700000000, usec = 123456 } Tue Nov 14 22:13:20 2023`
pub fn parse_boottime(value: &str) -> Option<i64> {
    if let Ok(sec) = value.trim().parse::<i64>() {
        return Some(sec);
    }

    let inner = value.split('}').next()?.trim().trim_start_matches('{');
    inner.split(',').find_map(|pair| {
        let (key, val) = pair.split_once('=')?;
        if key.trim() == "sec" {
            val.trim().parse::<i64>().ok()
        } else {
            None
        }
    })
}

/// CPU times, boot time and interrupts as reported by the kernel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KernelCpuStats {
    pub cpu: CpuBreakdown,
    pub btime: Option<i64>,
    pub intr: InterruptTable,
}

/// Parses Linux /proc/stat.
///
/// `cpu` lines carry user nice system idle iowait irq softirq ...; the fields
/// kept are user, nice, system, irq and idle. The `intr` line is the total
/// followed by one count per IRQ number starting at 0.
pub fn parse_proc_stat(content: &str) -> KernelCpuStats {
    let mut stat = KernelCpuStats::default();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&key) = parts.first() else {
            continue;
        };

        if let Some(suffix) = key.strip_prefix("cpu") {
            if parts.len() < 7 {
                debug!("Skipping short cpu line in /proc/stat: {}", line);
                continue;
            }
            let times = CpuTimes {
                user: NumericValue::coerce(parts[1]),
                nice: NumericValue::coerce(parts[2]),
                system: NumericValue::coerce(parts[3]),
                idle: NumericValue::coerce(parts[4]),
                irq: NumericValue::coerce(parts[6]),
            };

            if suffix.is_empty() {
                stat.cpu.aggregate = Some(times);
            } else if let Ok(idx) = suffix.parse::<usize>() {
                // Offline cores leave gaps, keep indices contiguous
                if stat.cpu.cores.len() <= idx {
                    stat.cpu.cores.resize(idx + 1, CpuTimes::default());
                }
                stat.cpu.cores[idx] = times;
            }
        } else if key == "btime" {
            stat.btime = parts.get(1).and_then(|v| v.parse().ok());
        } else if key == "intr" {
            stat.intr.total = parts.get(1).map(|v| NumericValue::coerce(v));
            for (irq, count) in parts.iter().skip(2).enumerate() {
                stat.intr.set(irq, NumericValue::coerce(count));
            }
        }
    }

    stat
}

/// CPU statistics snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuStats {
    pub btime: Option<i64>,
    pub cpu: CpuBreakdown,
    pub intr: InterruptTable,
    pub counts: ProcessCounts,
}

impl Serialize for CpuStats {
    /// Flat map: btime, cpu, cpu0..cpuN, intr, processes, procs_blocked, procs_running.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("btime", &self.btime)?;
        map.serialize_entry("cpu", &self.cpu.aggregate)?;
        for (idx, core) in self.cpu.cores.iter().enumerate() {
            map.serialize_entry(&format!("cpu{}", idx), core)?;
        }
        map.serialize_entry("intr", &self.intr)?;
        map.serialize_entry("processes", &self.counts.processes)?;
        map.serialize_entry("procs_blocked", &self.counts.procs_blocked)?;
        map.serialize_entry("procs_running", &self.counts.procs_running)?;
        map.end()
    }
}
