// Model of the data produced by the monitor

use chrono::{DateTime, Utc};

/// ADC input line a probe is wired to.
pub type ChannelId = u8;

/// Inputs on an MCP3008-style converter.
pub const MAX_CHANNELS: usize = 8;

/// Ordered, fixed set of channels polled every cycle.
pub type ChannelSet = heapless::Vec<ChannelId, MAX_CHANNELS>;

/// One temperature measurement, produced once per channel per cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    channel: ChannelId,
    fahrenheit: f64,
    timestamp: DateTime<Utc>,
}

impl Reading {
    pub const fn new(channel: ChannelId, fahrenheit: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            channel,
            fahrenheit,
            timestamp,
        }
    }

    pub const fn channel(&self) -> ChannelId {
        self.channel
    }

    pub const fn fahrenheit(&self) -> f64 {
        self.fahrenheit
    }

    /// Acquisition time
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
