//! Error types shared across the sampling pipeline

use std::io;

use embedded_hal::spi::ErrorKind;
use thiserror::Error;

use crate::model::ChannelId;

/// A failed exchange with the converter.
///
/// Never recovered locally: once the bus misbehaves the scheduler stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("SPI bus error: {0}")]
    Bus(ErrorKind),
}

/// Outcome of a failed channel read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SensorError {
    /// Every sample on the channel was the zero sentinel.
    #[error("probe for channel {0} is disconnected")]
    ProbeDisconnected(ChannelId),
    /// The mean sits at the converter's full-scale code, so the divider
    /// gives no finite resistance (usually a shorted probe).
    #[error("reading on channel {0} is at full scale")]
    OutOfRange(ChannelId),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Fatal conditions that stop the polling scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("reading channel {channel} failed")]
    Transport {
        channel: ChannelId,
        #[source]
        source: TransportError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no channels configured")]
    NoChannels,
    #[error("channel {0} does not exist on an 8-input converter")]
    ChannelOutOfRange(ChannelId),
    #[error("channel {0} is configured more than once")]
    DuplicateChannel(ChannelId),
    #[error("at most 8 channels can be polled, got {0}")]
    TooManyChannels(usize),
    #[error("sample count must be at least 1")]
    ZeroSamples,
    #[error("polling interval must be non-zero")]
    ZeroInterval,
    #[error("reference resistor must be a positive number of ohms, got {0}")]
    InvalidReference(String),
    #[error("ADC resolution must be between 8 and 16 bits, got {0}")]
    InvalidResolution(u8),
    #[error("missing value for {0}")]
    MissingValue(&'static str),
    #[error("invalid value {value:?} for {flag}")]
    InvalidValue { flag: &'static str, value: String },
    #[error("unknown argument {0:?}")]
    UnknownArgument(String),
}

/// The SPI character device could not be opened or configured.
#[derive(Debug, Error)]
#[error("cannot open SPI device {path}")]
pub struct OpenError {
    pub path: String,
    #[source]
    pub source: io::Error,
}
