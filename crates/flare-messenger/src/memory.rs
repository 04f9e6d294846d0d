//! Process memory figures attached to handled-message breadcrumbs.

/// Resident memory usage of the current process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryUsage {
    /// Current resident set size in bytes.
    pub current_bytes: u64,
    /// Peak resident set size in bytes.
    pub peak_bytes: u64,
}

/// Samples the process's resident memory.
///
/// Returns `None` on platforms without a readable `/proc/self/status`.
pub fn sample() -> Option<MemoryUsage> {
    imp::sample()
}

#[cfg(target_os = "linux")]
mod imp {
    use super::MemoryUsage;
    use std::fs;

    pub fn sample() -> Option<MemoryUsage> {
        let status = fs::read_to_string("/proc/self/status").ok()?;
        parse_status(&status)
    }

    pub(super) fn parse_status(status: &str) -> Option<MemoryUsage> {
        let mut current = None;
        let mut peak = None;
        for line in status.lines() {
            if let Some(rest) = line.strip_prefix("VmRSS:") {
                current = parse_kib(rest);
            } else if let Some(rest) = line.strip_prefix("VmHWM:") {
                peak = parse_kib(rest);
            }
        }
        Some(MemoryUsage {
            current_bytes: current?,
            peak_bytes: peak?,
        })
    }

    fn parse_kib(value: &str) -> Option<u64> {
        let kib: u64 = value.trim().trim_end_matches("kB").trim().parse().ok()?;
        Some(kib * 1024)
    }
}

#[cfg(not(target_os = "linux"))]
mod imp {
    use super::MemoryUsage;

    pub fn sample() -> Option<MemoryUsage> {
        None
    }
}
