//! Monitor configuration, fixed at startup

use embassy_time::Duration;

use crate::error::ConfigError;
use crate::model::{ChannelId, ChannelSet, MAX_CHANNELS};
use crate::thermistor::SteinhartHart;

pub const DEFAULT_CHANNELS: [ChannelId; 3] = [0, 1, 2];
pub const DEFAULT_SAMPLE_COUNT: u8 = 5;
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_REFERENCE_OHMS: f64 = 10_000.0;
pub const DEFAULT_RESOLUTION_BITS: u8 = 10;

/// Queue slots reserved per polled channel
const QUEUE_SLACK: usize = 5;

/// Everything the scheduler needs to know about the probes and the converter
#[derive(Clone, Debug, PartialEq)]
pub struct MonitorConfig {
    /// Channels polled every cycle, in this order
    pub channels: ChannelSet,
    /// Raw exchanges averaged into one reading
    pub sample_count: u8,
    /// Time between the end of one cycle and the start of the next
    pub interval: Duration,
    /// Resistor in series with the probe (ohms)
    pub reference_ohms: f64,
    pub resolution_bits: u8,
    pub coefficients: SteinhartHart,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            channels: DEFAULT_CHANNELS.iter().copied().collect(),
            sample_count: DEFAULT_SAMPLE_COUNT,
            interval: DEFAULT_INTERVAL,
            reference_ohms: DEFAULT_REFERENCE_OHMS,
            resolution_bits: DEFAULT_RESOLUTION_BITS,
            coefficients: SteinhartHart::IGRILL,
        }
    }
}

impl MonitorConfig {
    pub fn with_channels(mut self, channels: &[ChannelId]) -> Result<Self, ConfigError> {
        self.channels = ChannelSet::from_slice(channels)
            .map_err(|_| ConfigError::TooManyChannels(channels.len()))?;
        Ok(self)
    }

    pub fn with_sample_count(mut self, sample_count: u8) -> Self {
        self.sample_count = sample_count;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_reference_ohms(mut self, reference_ohms: f64) -> Self {
        self.reference_ohms = reference_ohms;
        self
    }

    pub fn with_resolution_bits(mut self, resolution_bits: u8) -> Self {
        self.resolution_bits = resolution_bits;
        self
    }

    pub fn with_coefficients(mut self, coefficients: SteinhartHart) -> Self {
        self.coefficients = coefficients;
        self
    }

    /// Maximum code the converter can produce, `2^bits - 1`
    pub fn full_scale(&self) -> u16 {
        ((1u32 << self.resolution_bits.min(16)) - 1) as u16
    }

    /// Room for a few full cycles so a slow sink doesn't stall sampling
    pub fn queue_capacity(&self) -> usize {
        QUEUE_SLACK * self.channels.len().max(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels.is_empty() {
            return Err(ConfigError::NoChannels);
        }

        for (i, &channel) in self.channels.iter().enumerate() {
            if usize::from(channel) >= MAX_CHANNELS {
                return Err(ConfigError::ChannelOutOfRange(channel));
            }
            if self.channels[..i].contains(&channel) {
                return Err(ConfigError::DuplicateChannel(channel));
            }
        }

        if self.sample_count == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        if self.interval == Duration::from_ticks(0) {
            return Err(ConfigError::ZeroInterval);
        }
        if !(self.reference_ohms.is_finite() && self.reference_ohms > 0.0) {
            return Err(ConfigError::InvalidReference(self.reference_ohms.to_string()));
        }
        if !(8..=16).contains(&self.resolution_bits) {
            return Err(ConfigError::InvalidResolution(self.resolution_bits));
        }

        Ok(())
    }
}
