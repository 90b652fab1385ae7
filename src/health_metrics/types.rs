use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cumulative CPU counters at one point in time, in nanoseconds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CpuCounters {
    /// Total CPU time consumed by the container.
    pub total_usage: u64,
    /// Total CPU time of the host.
    pub system_usage: u64,
    /// `0` when the engine does not report it.
    pub online_cpus: u64,
    pub per_cpu_usage: Vec<u64>,
}

/// Memory counters, in bytes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemoryCounters {
    pub usage: u64,
    /// Page cache portion of `usage`.
    pub cache: u64,
    /// `0` means unlimited.
    pub limit: u64,
}

/// Paired read returned by one stats query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub previous: CpuCounters,
    pub current: CpuCounters,
    pub memory: MemoryCounters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Percent of one core; may exceed 100 on multi-core hosts.
    pub cpu_percent: f64,
    /// Percent of the memory limit, not clamped to 100.
    pub memory_percent: f64,
    pub sampled_at: DateTime<Utc>,
}
