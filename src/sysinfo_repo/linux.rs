// Linux-specific helpers: /proc/cpuinfo model name, interface drop counters.

/// Read first "model name" from /proc/cpuinfo (Linux). Prefer over sysinfo when it returns "cpu0" etc.
pub(super) fn read_cpu_model_linux() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/cpuinfo").ok()?;
        if let Some(name) = parse_cpu_model(&content) {
            return Some(name);
        }
    }
    None
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_cpu_model(cpuinfo: &str) -> Option<String> {
    cpuinfo
        .lines()
        .find(|line| line.starts_with("model name"))
        .and_then(|line| line.split_once(':'))
        .map(|(_, v)| v.trim())
        .filter(|s| !s.is_empty() && *s != "cpu0")
        .map(str::to_string)
}

/// (rx_dropped, tx_dropped) from /sys/class/net/<interface>/statistics. (0, 0) when unavailable.
pub(super) fn read_interface_drops(interface_name: &str) -> (u64, u64) {
    #[cfg(target_os = "linux")]
    {
        let read = |counter: &str| {
            let path = format!("/sys/class/net/{}/statistics/{}", interface_name, counter);
            std::fs::read_to_string(&path)
                .ok()
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(0)
        };
        (read("rx_dropped"), read("tx_dropped"))
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = interface_name;
        (0, 0)
    }
}
