// Byte-counter to human-unit conversion. Every GB/MB value on the wire goes through here.

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to 1 decimal place; the scale the OS-level percent counters report at.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn bytes_to_mb(bytes: u64) -> f64 {
    round2(bytes as f64 / BYTES_PER_MB)
}

pub fn bytes_to_gb(bytes: u64) -> f64 {
    round2(bytes as f64 / BYTES_PER_GB)
}

/// `part / total` as a 0–100 percent at 1 decimal; 0.0 when `total` is 0.
pub fn usage_percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1((part as f64 / total as f64) * 100.0).clamp(0.0, 100.0)
}
