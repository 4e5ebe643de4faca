//! Command line options shared by the binaries
//!
//! ```text
//! --device <path>       SPI device node (default /dev/spidev0.0)
//! --channels <list>     comma separated channels, e.g. 0,1,2
//! --interval-ms <n>     time between cycles
//! --samples <n>         conversions averaged per reading
//! ```

use embassy_time::Duration;

use crate::config::MonitorConfig;
use crate::error::ConfigError;
use crate::model::ChannelId;

pub const DEFAULT_DEVICE: &str = "/dev/spidev0.0";

#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    pub device: String,
    pub config: MonitorConfig,
}

impl Options {
    /// Parse arguments (without the program name) and validate the result.
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut device = DEFAULT_DEVICE.to_string();
        let mut config = MonitorConfig::default();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--device" => device = value(&mut args, "--device")?,
                "--channels" => {
                    let list = value(&mut args, "--channels")?;
                    let channels = parse_channels(&list)?;
                    config = config.with_channels(&channels)?;
                }
                "--interval-ms" => {
                    let ms: u64 = parse(&mut args, "--interval-ms")?;
                    config = config.with_interval(Duration::from_millis(ms));
                }
                "--samples" => {
                    let samples: u8 = parse(&mut args, "--samples")?;
                    config = config.with_sample_count(samples);
                }
                _ => return Err(ConfigError::UnknownArgument(arg)),
            }
        }

        config.validate()?;
        Ok(Self { device, config })
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &'static str) -> Result<String, ConfigError> {
    args.next().ok_or(ConfigError::MissingValue(flag))
}

fn parse<T: core::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, ConfigError> {
    let raw = value(args, flag)?;
    raw.parse()
        .map_err(|_| ConfigError::InvalidValue { flag, value: raw })
}

fn parse_channels(list: &str) -> Result<Vec<ChannelId>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|_| ConfigError::InvalidValue {
                flag: "--channels",
                value: s.to_string(),
            })
        })
        .collect()
}
