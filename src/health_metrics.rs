//! Container health metrics.
//!
//! The engine reports cumulative counters; utilization is derived from the
//! difference between two snapshots. See [`cpu_percent`] and [`memory_percent`].

pub mod calculator;
pub mod types;

pub use calculator::{cpu_percent, memory_percent};
pub use types::{CpuCounters, HealthReport, MemoryCounters, StatsSnapshot};
