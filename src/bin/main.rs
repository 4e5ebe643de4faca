use std::process;

use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use linux_embedded_hal::SpidevDevice;
use log::{error, info};
use static_cell::StaticCell;

use probewatch::cli::Options;
use probewatch::hardware::{self, SpiTransport};
use probewatch::{
    BoundedQueue, CancellationToken, CycleStats, LogSink, MonitorConfig, PollError,
    PollingScheduler, Reading, ShutdownController, report_readings,
};

type Probe = SpiTransport<SpidevDevice>;

static CANCEL: CancellationToken = CancellationToken::new();
static SHUTDOWN: ShutdownController = ShutdownController::new();
static OUTCOME: Signal<CriticalSectionRawMutex, Result<CycleStats, PollError>> = Signal::new();
static QUEUE: StaticCell<BoundedQueue<Reading>> = StaticCell::new();
static CONFIG: StaticCell<MonitorConfig> = StaticCell::new();

#[embassy_executor::task]
async fn sample_probes(
    probe: Probe,
    config: &'static MonitorConfig,
    queue: &'static BoundedQueue<Reading>,
) {
    let mut scheduler = PollingScheduler::new(probe, config, queue, &CANCEL);
    OUTCOME.signal(scheduler.run().await);
}

#[embassy_executor::task]
async fn report(queue: &'static BoundedQueue<Reading>) {
    report_readings(queue, LogSink).await;

    match OUTCOME.wait().await {
        Ok(_) => process::exit(0),
        Err(PollError::Transport { channel, source }) => {
            error!("[FATAL] reading value on channel {}: {}", channel, source);
            process::exit(1);
        }
    }
}

#[embassy_executor::task]
async fn watch_shutdown() {
    SHUTDOWN.run(&CANCEL).await;
}

fn fail(message: impl core::fmt::Display) -> ! {
    error!("[ERROR] {}", message);
    process::exit(1);
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("=== Probewatch ===");

    let options = Options::from_args(std::env::args().skip(1)).unwrap_or_else(|e| fail(e));
    let probe = hardware::open_spidev(&options.device)
        .unwrap_or_else(|e| fail(format!("{e}: {}", e.source)));

    if let Err(e) = SHUTDOWN.install() {
        fail(format!("cannot install signal handlers: {e}"));
    }

    let config: &'static MonitorConfig = CONFIG.init(options.config);
    let queue: &'static BoundedQueue<Reading> =
        QUEUE.init(BoundedQueue::new(config.queue_capacity()));

    if let Err(e) = spawner.spawn(watch_shutdown()) {
        fail(format!("failed to spawn shutdown task: {e:?}"));
    }
    if let Err(e) = spawner.spawn(report(queue)) {
        fail(format!("failed to spawn report task: {e:?}"));
    }
    if let Err(e) = spawner.spawn(sample_probes(probe, config, queue)) {
        fail(format!("failed to spawn sampling task: {e:?}"));
    }
}
