//! Inference device probing.
//!
//! Active probing lives here, not in core: the probe shells out to
//! `nvidia-smi`, which is the most reliable signal when NVIDIA drivers are
//! installed. Hosts without it simply run on the CPU.

use std::process::Command;

use facelift_core::SystemProbe;

/// Production probe backed by `nvidia-smi`.
pub struct DefaultSystemProbe;

impl SystemProbe for DefaultSystemProbe {
    fn gpu_name(&self) -> Option<String> {
        detect_nvidia_gpu()
    }
}

/// Name of the first NVIDIA GPU, when drivers are present.
fn detect_nvidia_gpu() -> Option<String> {
    let output = Command::new("nvidia-smi")
        .args(["--query-gpu=name", "--format=csv,noheader"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    // One line per GPU; the first one is the inference device.
    let name = stdout.lines().next()?.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
