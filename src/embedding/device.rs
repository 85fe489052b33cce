use candle_core::Device;

#[cfg(any(feature = "metal", feature = "cuda"))]
use tracing::{info, warn};

#[cfg(not(any(feature = "metal", feature = "cuda")))]
use tracing::debug;

use super::error::EmbeddingError;

/// Picks Metal, then CUDA, when compiled in; otherwise (or on failure) the CPU.
pub fn select_device() -> Result<Device, EmbeddingError> {
    #[cfg(any(feature = "metal", feature = "cuda"))]
    {
        let mut failures: Vec<String> = Vec::new();

        #[cfg(feature = "metal")]
        {
            match Device::new_metal(0) {
                Ok(device) => {
                    info!("Encoder using Metal GPU");
                    return Ok(device);
                }
                Err(e) => {
                    let msg = e.to_string();
                    warn!(error = %msg, "Metal device unavailable");
                    failures.push(format!("metal: {msg}"));
                }
            }
        }

        #[cfg(feature = "cuda")]
        {
            match Device::new_cuda(0) {
                Ok(device) => {
                    info!("Encoder using CUDA GPU");
                    return Ok(device);
                }
                Err(e) => {
                    let msg = e.to_string();
                    warn!(error = %msg, "CUDA device unavailable");
                    failures.push(format!("cuda: {msg}"));
                }
            }
        }

        warn!(reason = %failures.join("; "), "Falling back to CPU device");
    }

    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    debug!("Built without GPU features, using CPU");

    Ok(Device::Cpu)
}
