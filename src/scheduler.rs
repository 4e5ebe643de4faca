//! Periodic multi-channel sampling
//!
//! ```text
//!            entry / tick              all channels tried
//!   Idle ───────────────────▶ Sampling ──────────────────▶ Idle
//!     │                          │
//!     │ cancelled                │ cancelled (next cycle) / transport fault
//!     ▼                          ▼
//!   Draining ── queue closed ──▶ Stopped
//! ```
//!
//! Cancellation is only observed while waiting for the next tick and before
//! a cycle starts, so an exchange in flight always completes.

use chrono::Utc;
use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Timer};
use log::{debug, error, info, warn};

use crate::cancel::CancellationToken;
use crate::config::MonitorConfig;
use crate::error::{PollError, SensorError};
use crate::model::{ChannelId, ChannelSet, Reading};
use crate::queue::BoundedQueue;
use crate::sensor::SensorReader;
use crate::thermistor::Thermistor;
use crate::traits::Transport;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Sampling,
    Draining,
    Stopped,
}

/// Counters for one scheduler run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub cycles: u64,
    pub readings: u64,
    pub disconnections: u64,
    /// Channels skipped because their mean was at full scale
    pub out_of_range: u64,
}

pub struct PollingScheduler<'a, T> {
    reader: SensorReader<T>,
    thermistor: Thermistor,
    channels: ChannelSet,
    interval: Duration,
    queue: &'a BoundedQueue<Reading>,
    cancel: &'a CancellationToken,
    state: SchedulerState,
    stats: CycleStats,
}

impl<'a, T: Transport> PollingScheduler<'a, T> {
    /// `config` is expected to have passed [`MonitorConfig::validate`].
    pub fn new(
        transport: T,
        config: &MonitorConfig,
        queue: &'a BoundedQueue<Reading>,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            reader: SensorReader::new(transport, config),
            thermistor: Thermistor::from_config(config),
            channels: config.channels.clone(),
            interval: config.interval,
            queue,
            cancel,
            state: SchedulerState::Idle,
            stats: CycleStats::default(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    /// Sample until cancelled or until the bus fails.
    ///
    /// The queue is closed on both paths so the consumer always terminates.
    pub async fn run(&mut self) -> Result<CycleStats, PollError> {
        info!(
            "Polling channels {:?} every {} ms",
            self.channels.as_slice(),
            self.interval.as_millis()
        );

        let outcome = self.poll_until_cancelled().await;
        self.drain();
        outcome?;

        info!(
            "Stopped after {} cycles: {} readings, {} disconnections, {} out of range",
            self.stats.cycles,
            self.stats.readings,
            self.stats.disconnections,
            self.stats.out_of_range
        );
        Ok(self.stats)
    }

    async fn poll_until_cancelled(&mut self) -> Result<(), PollError> {
        loop {
            if self.cancel.is_cancelled() {
                return Ok(());
            }

            self.state = SchedulerState::Sampling;
            self.sample_cycle().await?;
            self.state = SchedulerState::Idle;

            if let Either::Second(()) =
                select(Timer::after(self.interval), self.cancel.cancelled()).await
            {
                debug!("Cancelled while idle");
                return Ok(());
            }
        }
    }

    /// Try every configured channel once, in order
    async fn sample_cycle(&mut self) -> Result<(), PollError> {
        self.stats.cycles += 1;

        for channel in self.channels.clone() {
            match self.reader.read_channel(channel) {
                Ok(mean) => self.emit(channel, mean).await,
                Err(SensorError::ProbeDisconnected(channel)) => {
                    warn!("probe for channel {} is disconnected", channel);
                    self.stats.disconnections += 1;
                }
                Err(SensorError::OutOfRange(channel)) => {
                    warn!("reading on channel {} is at full scale, skipping", channel);
                    self.stats.out_of_range += 1;
                }
                Err(SensorError::Transport(source)) => {
                    error!("reading channel {}: {}", channel, source);
                    return Err(PollError::Transport { channel, source });
                }
            }
        }

        Ok(())
    }

    async fn emit(&mut self, channel: ChannelId, mean: f64) {
        let estimate = self.thermistor.estimate(mean);
        debug!("rt for chan {} is: {:.2}", channel, estimate.resistance);
        debug!("tempk for chan {} is: {:.2}", channel, estimate.kelvin);

        let reading = Reading::new(channel, estimate.fahrenheit(), Utc::now());
        match self.queue.push(reading).await {
            Ok(()) => self.stats.readings += 1,
            Err(_) => {
                // Consumer went away
                warn!("Reading queue closed, dropping reading for chan {}", channel);
                self.cancel.cancel();
            }
        }
    }

    fn drain(&mut self) {
        self.state = SchedulerState::Draining;
        self.queue.close();
        self.state = SchedulerState::Stopped;
    }
}
