use super::types::{CpuCounters, MemoryCounters};

/// CPU utilization between two snapshots, in percent of one core.
///
/// Returns `0.0` whenever there is no usable signal: a first sample, a counter
/// reset (negative delta) or an empty CPU set.
pub fn cpu_percent(previous: &CpuCounters, current: &CpuCounters) -> f64 {
    // Deltas in floating point so that a counter reset goes negative instead of wrapping.
    let cpu_delta = current.total_usage as f64 - previous.total_usage as f64;
    let system_delta = current.system_usage as f64 - previous.system_usage as f64;

    let online_cpus = if current.online_cpus == 0 {
        current.per_cpu_usage.len() as f64
    } else {
        current.online_cpus as f64
    };

    if system_delta > 0.0 && cpu_delta > 0.0 {
        (cpu_delta / system_delta) * online_cpus * 100.0
    } else {
        0.0
    }
}

/// Working-set memory as a percentage of the limit. `0.0` for an unlimited container.
pub fn memory_percent(memory: &MemoryCounters) -> f64 {
    if memory.limit == 0 {
        return 0.0;
    }
    let working_set = memory.usage.saturating_sub(memory.cache) as f64;
    (working_set / memory.limit as f64) * 100.0
}
