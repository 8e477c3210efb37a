//! CPAL device discovery and the device-backed platform.
//!
//! [`CpalDevice`] finds output devices; [`DevicePlatform`] turns one into
//! [`GraphContext`]s that play through it.
//!
//! # Example: List and Select a Device
//!
//! ```no_run
//! use ambiance::{AmbientEngine, CpalDevice, DevicePlatform, EngineConfig};
//!
//! for (i, device) in CpalDevice::list_outputs().iter().enumerate() {
//!     println!("[{}] {} ({} Hz, {} ch)",
//!         i, device.name(), device.sample_rate(), device.channels());
//! }
//!
//! let platform = DevicePlatform::named("Speakers");
//! let mut engine = AmbientEngine::new(platform, EngineConfig::default());
//! ```

use alloc::string::String;
use alloc::vec::Vec;

use cpal::traits::{DeviceTrait, HostTrait};
use tracing::{debug, info};

use crate::context::GraphContext;
use crate::error::AudioError;
use crate::nodes::CpalSink;
use crate::platform::AudioPlatform;

/// A discovered audio output device.
///
/// Use [`CpalDevice::default_output`] to get the system default, or
/// [`CpalDevice::list_outputs`] to enumerate all available devices.
pub struct CpalDevice {
    device: cpal::Device,
    config: cpal::SupportedStreamConfig,

    name: String,
    sample_rate: u32,
    channels: u16,
}

impl CpalDevice {
    fn from_device(device: cpal::Device) -> Option<Self> {
        let config = device.default_output_config().ok()?;
        let name = device.name().unwrap_or_else(|_| "Unknown".into());

        Some(Self {
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
            name,
            device,
            config,
        })
    }

    /// Get the system's default output device.
    ///
    /// Returns `None` if no audio device is available.
    pub fn default_output() -> Option<Self> {
        let host = cpal::default_host();
        Self::from_device(host.default_output_device()?)
    }

    /// List all available audio output devices.
    ///
    /// Returns an empty list if no devices are found or if enumeration fails.
    pub fn list_outputs() -> Vec<Self> {
        let host = cpal::default_host();
        host.output_devices()
            .map(|devices| devices.filter_map(Self::from_device).collect())
            .unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the device's sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the number of output channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Open a stream on this device and wrap it in a sink node.
    pub fn create_sink(&self) -> Result<CpalSink, AudioError> {
        CpalSink::new(&self.device, &self.config)
    }
}

/// Creates [`GraphContext`]s that play through a sound card.
///
/// The device is looked up every time a context is created, so a device
/// plugged in after a failed attempt is picked up by the next one.
#[derive(Debug, Default, Clone)]
pub struct DevicePlatform {
    /// Substring of the preferred device name; `None` for the system default
    device_name: Option<String>,
}

impl DevicePlatform {
    /// Play through the first output device whose name contains `name`,
    /// falling back to the system default.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            device_name: Some(name.into()),
        }
    }

    fn find_device(&self) -> Option<CpalDevice> {
        if let Some(wanted) = &self.device_name {
            let found = CpalDevice::list_outputs()
                .into_iter()
                .find(|device| device.name().contains(wanted.as_str()));
            if found.is_some() {
                return found;
            }
            debug!(wanted = %wanted, "named output device not found, using default");
        }
        CpalDevice::default_output()
    }
}

impl AudioPlatform for DevicePlatform {
    type Context = GraphContext;

    fn create_context(&mut self) -> Result<GraphContext, AudioError> {
        let device = self
            .find_device()
            .ok_or_else(|| AudioError::UnsupportedPlatform("no audio output device".into()))?;

        let sink = device.create_sink()?;
        info!(
            device = device.name(),
            sample_rate = device.sample_rate(),
            channels = device.channels(),
            "output device opened"
        );

        Ok(GraphContext::new(device.sample_rate()).with_output(sink))
    }
}
