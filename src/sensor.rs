//! Averaged channel reads on top of a [`Transport`]

use crate::config::MonitorConfig;
use crate::error::SensorError;
use crate::frame;
use crate::model::ChannelId;
use crate::traits::Transport;

/// Reads probes through the converter, averaging several conversions per
/// reading to smooth out noise.
pub struct SensorReader<T> {
    transport: T,
    sample_count: u8,
    resolution_bits: u8,
    full_scale: u16,
    /// Last raw ADC code (for diagnostics)
    last_raw: Option<u16>,
}

impl<T: Transport> SensorReader<T> {
    pub fn new(transport: T, config: &MonitorConfig) -> Self {
        Self {
            transport,
            sample_count: config.sample_count.max(1),
            resolution_bits: config.resolution_bits,
            full_scale: config.full_scale(),
            last_raw: None,
        }
    }

    /// Mean ADC code of `sample_count` conversions of `channel`.
    ///
    /// A transport failure aborts the read right away; samples gathered
    /// before it are discarded. A mean of zero or of the full-scale code has
    /// no temperature and is reported per channel instead.
    pub fn read_channel(&mut self, channel: ChannelId) -> Result<f64, SensorError> {
        let request = frame::request(channel);
        let mut total: u32 = 0;

        for _ in 0..self.sample_count {
            let reply = self.transport.exchange(&request)?;
            let code = frame::decode_reply(&reply, self.resolution_bits);
            self.last_raw = Some(code);
            total += u32::from(code);
        }

        if total == 0 {
            return Err(SensorError::ProbeDisconnected(channel));
        }
        if total >= u32::from(self.full_scale) * u32::from(self.sample_count) {
            return Err(SensorError::OutOfRange(channel));
        }

        Ok(f64::from(total) / f64::from(self.sample_count))
    }

    pub fn last_raw_value(&self) -> Option<u16> {
        self.last_raw
    }

    pub fn sample_count(&self) -> u8 {
        self.sample_count
    }
}
