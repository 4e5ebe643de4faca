use embedded_hal::spi::{Error as _, SpiDevice};
use linux_embedded_hal::SpidevDevice;
use linux_embedded_hal::spidev::{SpiModeFlags, Spidev, SpidevOptions};

use crate::error::{OpenError, TransportError};
use crate::frame::{FRAME_LEN, Frame};
use crate::traits::Transport;

const SPI_FREQ_HZ: u32 = 1_000_000;
const BITS_PER_WORD: u8 = 8;

/// Converter attached to any `embedded-hal` SPI device
pub struct SpiTransport<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> SpiTransport<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiDevice> Transport for SpiTransport<SPI> {
    fn exchange(&mut self, request: &Frame) -> Result<Frame, TransportError> {
        let mut reply = [0u8; FRAME_LEN];
        self.spi
            .transfer(&mut reply, request)
            .map_err(|e| TransportError::Bus(e.kind()))?;
        Ok(reply)
    }
}

/// Open a Linux spidev node (e.g. `/dev/spidev0.0`) in mode 0 at 1 MHz
pub fn open_spidev(path: &str) -> Result<SpiTransport<SpidevDevice>, OpenError> {
    let open_error = |source| OpenError {
        path: path.to_string(),
        source,
    };

    let mut spi = Spidev::open(path).map_err(open_error)?;
    spi.configure(
        &SpidevOptions::new()
            .bits_per_word(BITS_PER_WORD)
            .max_speed_hz(SPI_FREQ_HZ)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build(),
    )
    .map_err(open_error)?;

    log::debug!("[SPI] Opened {} at {} Hz", path, SPI_FREQ_HZ);
    Ok(SpiTransport::new(SpidevDevice(spi)))
}
