// GPU enumeration via NVML. No driver, no device, or any NVML error yields an empty list.

use crate::models::GpuDescriptor;

#[cfg(feature = "nvml")]
pub(super) fn read_gpus() -> Vec<GpuDescriptor> {
    match nvml::enumerate() {
        Ok(gpus) => gpus,
        Err(e) => {
            tracing::debug!(error = %e, operation = "read_gpus", "GPU enumeration failed, reporting none");
            Vec::new()
        }
    }
}

#[cfg(not(feature = "nvml"))]
pub(super) fn read_gpus() -> Vec<GpuDescriptor> {
    Vec::new()
}

#[cfg(feature = "nvml")]
mod nvml {
    use nvml_wrapper::Nvml;
    use nvml_wrapper::enum_wrappers::device::TemperatureSensor;
    use nvml_wrapper::error::NvmlError;

    use crate::models::GpuDescriptor;
    use crate::units::{bytes_to_mb, round2};

    pub(super) fn enumerate() -> Result<Vec<GpuDescriptor>, NvmlError> {
        let nvml = Nvml::init()?;
        let count = nvml.device_count()?;
        let mut gpus = Vec::with_capacity(count as usize);
        for index in 0..count {
            let device = nvml.device_by_index(index)?;
            let memory = device.memory_info()?;
            gpus.push(GpuDescriptor {
                id: index,
                name: device
                    .name()
                    .unwrap_or_else(|_| "Unknown NVIDIA GPU".to_string()),
                load: round2(
                    device
                        .utilization_rates()
                        .map(|u| f64::from(u.gpu))
                        .unwrap_or(0.0),
                ),
                memory_total_mb: bytes_to_mb(memory.total),
                memory_used_mb: bytes_to_mb(memory.used),
                memory_free_mb: bytes_to_mb(memory.free),
                temperature_c: device
                    .temperature(TemperatureSensor::Gpu)
                    .ok()
                    .map(f64::from),
                fan_speed: device.fan_speed(0).ok().map(f64::from),
            });
        }
        Ok(gpus)
    }
}
