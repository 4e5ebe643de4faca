//! Thermistor probe monitor
//!
//! Samples thermistor probes through an SPI analog-to-digital converter,
//! converts the averaged readings to temperatures with the Steinhart-Hart
//! equation and hands timestamped readings to a sink at a fixed cadence.
//!
//! ```text
//! ShutdownController ─▶ CancellationToken ─▶ PollingScheduler
//!                                               │ Transport → SensorReader → Thermistor
//!                                               ▼
//!                                         BoundedQueue<Reading> ─▶ ReadingSink
//! ```

pub mod cancel;
pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod hardware;
pub mod model;
pub mod queue;
pub mod report;
pub mod scheduler;
pub mod sensor;
pub mod shutdown;
pub mod thermistor;
pub mod traits;

pub use cancel::CancellationToken;
pub use config::MonitorConfig;
pub use error::{ConfigError, OpenError, PollError, SensorError, TransportError};
pub use model::{ChannelId, Reading};
pub use queue::BoundedQueue;
pub use report::{LogSink, report_readings};
pub use scheduler::{CycleStats, PollingScheduler, SchedulerState};
pub use sensor::SensorReader;
pub use shutdown::{ShutdownController, Termination};
pub use thermistor::{SteinhartHart, Thermistor};
pub use traits::{ReadingSink, Transport};
