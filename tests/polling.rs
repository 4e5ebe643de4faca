use std::sync::Mutex;

use embassy_futures::block_on;
use embassy_futures::join::{join, join3};
use embassy_time::Duration;
use embedded_hal::spi::ErrorKind;
use log::{Level, LevelFilter, Metadata, Record};

use probewatch::frame::Frame;
use probewatch::{
    BoundedQueue, CancellationToken, ChannelId, CycleStats, MonitorConfig, PollError,
    PollingScheduler, Reading, ReadingSink, SchedulerState, ShutdownController, Termination,
    Thermistor, Transport, TransportError, report_readings,
};

/// In-memory converter: a fixed code per channel, optionally failing on the
/// n-th exchange of one channel.
struct StubAdc {
    codes: [u16; 8],
    fail_on: Option<(ChannelId, usize)>,
    exchanges: Vec<ChannelId>,
}

impl StubAdc {
    fn new(codes: &[(ChannelId, u16)]) -> Self {
        let mut table = [0; 8];
        for &(channel, code) in codes {
            table[usize::from(channel)] = code;
        }
        Self {
            codes: table,
            fail_on: None,
            exchanges: Vec::new(),
        }
    }

    fn exchanges_on(&self, channel: ChannelId) -> usize {
        self.exchanges.iter().filter(|&&c| c == channel).count()
    }
}

impl Transport for StubAdc {
    fn exchange(&mut self, request: &Frame) -> Result<Frame, TransportError> {
        assert_eq!(request[0], 1, "missing start bit");
        let channel = (request[1] >> 4) - 8;
        self.exchanges.push(channel);

        if self.fail_on == Some((channel, self.exchanges_on(channel))) {
            return Err(TransportError::Bus(ErrorKind::Other));
        }

        let code = self.codes[usize::from(channel)];
        Ok([0x00, (code >> 8) as u8, code as u8])
    }
}

/// Keeps every warning so tests can check which channel was reported.
/// Tests run in parallel, so look for a line only one test produces.
struct WarningLog;

static WARNINGS: Mutex<Vec<String>> = Mutex::new(Vec::new());
static LOGGER: WarningLog = WarningLog;

impl log::Log for WarningLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            WARNINGS.lock().unwrap().push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

fn capture_warnings() {
    // Only the first call installs it
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Warn);
}

fn warned(line: &str) -> bool {
    WARNINGS.lock().unwrap().iter().any(|w| w == line)
}

fn config(channels: &[ChannelId], interval: Duration) -> MonitorConfig {
    let config = MonitorConfig::default()
        .with_channels(channels)
        .unwrap()
        .with_interval(interval);
    config.validate().unwrap();
    config
}

async fn drain(queue: &BoundedQueue<Reading>) -> Vec<Reading> {
    let mut readings = Vec::new();
    while let Some(reading) = queue.pop().await {
        readings.push(reading);
    }
    readings
}

/// Sink that requests shutdown once it has seen `limit` readings
struct StopAfter<'a> {
    limit: usize,
    seen: Vec<Reading>,
    shutdown: &'a ShutdownController,
}

impl ReadingSink for StopAfter<'_> {
    fn report(&mut self, reading: &Reading) {
        self.seen.push(*reading);
        if self.seen.len() == self.limit {
            self.shutdown.request(Termination::Interrupt);
        }
    }
}

#[test]
fn one_cycle_skips_disconnected_probe() {
    capture_warnings();
    let config = config(&[0, 1, 2], Duration::from_secs(60));
    let queue = BoundedQueue::new(config.queue_capacity());
    let cancel = CancellationToken::new();
    let mut adc = StubAdc::new(&[(0, 512), (1, 300), (2, 0)]);

    let mut scheduler = PollingScheduler::new(&mut adc, &config, &queue, &cancel);
    let (outcome, (first, second, rest)) = block_on(join(scheduler.run(), async {
        let first = queue.pop().await.unwrap();
        let second = queue.pop().await.unwrap();
        cancel.cancel();
        (first, second, drain(&queue).await)
    }));

    assert_eq!(
        outcome,
        Ok(CycleStats {
            cycles: 1,
            readings: 2,
            disconnections: 1,
            out_of_range: 0,
        })
    );
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    drop(scheduler);

    assert!(warned("probe for channel 2 is disconnected"));
    assert_eq!(first.channel(), 0);
    assert_eq!(second.channel(), 1);
    assert!(rest.is_empty());
    assert!(first.timestamp() <= second.timestamp());

    let thermistor = Thermistor::from_config(&config);
    assert!((first.fahrenheit() - thermistor.estimate(512.0).fahrenheit()).abs() < 1e-9);
    assert!((second.fahrenheit() - thermistor.estimate(300.0).fahrenheit()).abs() < 1e-9);

    // Every channel was sampled sample_count times
    for channel in 0..3 {
        assert_eq!(adc.exchanges_on(channel), 5);
    }
}

#[test]
fn full_scale_channel_is_skipped() {
    capture_warnings();
    let config = config(&[0, 1, 2], Duration::from_secs(60));
    let queue = BoundedQueue::new(config.queue_capacity());
    let cancel = CancellationToken::new();
    let mut adc = StubAdc::new(&[(0, 512), (1, 1023), (2, 300)]);

    let mut scheduler = PollingScheduler::new(&mut adc, &config, &queue, &cancel);
    let (outcome, readings) = block_on(join(scheduler.run(), async {
        let first = queue.pop().await.unwrap();
        let second = queue.pop().await.unwrap();
        cancel.cancel();
        let mut readings = vec![first, second];
        readings.extend(drain(&queue).await);
        readings
    }));

    let stats = outcome.unwrap();
    assert_eq!(
        stats,
        CycleStats {
            cycles: 1,
            readings: 2,
            disconnections: 0,
            out_of_range: 1,
        }
    );
    assert_eq!(scheduler.stats(), stats);
    drop(scheduler);

    assert!(warned("reading on channel 1 is at full scale, skipping"));
    let channels: Vec<_> = readings.iter().map(Reading::channel).collect();
    assert_eq!(channels, vec![0, 2]);
    assert!(readings.iter().all(|r| r.fahrenheit().is_finite()));
    assert!(readings.iter().all(|r| r.fahrenheit() > -459.67));
    assert_eq!(adc.exchanges_on(1), 5);
}

#[test]
fn cancel_while_idle_stops_without_partial_cycle() {
    let config = config(&[0, 1], Duration::from_secs(3600));
    let queue = BoundedQueue::new(config.queue_capacity());
    let cancel = CancellationToken::new();
    let mut adc = StubAdc::new(&[(0, 400), (1, 600)]);

    let mut scheduler = PollingScheduler::new(&mut adc, &config, &queue, &cancel);
    let (outcome, readings) = block_on(join(scheduler.run(), async {
        // Wait until the first cycle is queued; the scheduler is idle by then
        while queue.len() < 2 {
            embassy_futures::yield_now().await;
        }
        cancel.cancel();
        drain(&queue).await
    }));

    let stats = outcome.unwrap();
    assert_eq!(stats.cycles, 1);
    assert_eq!(stats.readings, 2);
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    assert!(queue.is_closed());

    let channels: Vec<_> = readings.iter().map(Reading::channel).collect();
    assert_eq!(channels, vec![0, 1]);
}

#[test]
fn cancelled_before_start_never_samples() {
    let config = config(&[0, 1, 2], Duration::from_secs(2));
    let queue = BoundedQueue::new(config.queue_capacity());
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut adc = StubAdc::new(&[(0, 100), (1, 100), (2, 100)]);

    let mut scheduler = PollingScheduler::new(&mut adc, &config, &queue, &cancel);
    assert_eq!(block_on(scheduler.run()), Ok(CycleStats::default()));
    drop(scheduler);

    assert!(adc.exchanges.is_empty());
    assert_eq!(block_on(queue.pop()), None);
}

#[test]
fn transport_fault_stops_the_cycle() {
    let config = config(&[0, 1, 2], Duration::from_secs(2));
    let queue = BoundedQueue::new(config.queue_capacity());
    let cancel = CancellationToken::new();
    let mut adc = StubAdc::new(&[(0, 500), (1, 500), (2, 500)]);
    adc.fail_on = Some((1, 2));

    let mut scheduler = PollingScheduler::new(&mut adc, &config, &queue, &cancel);
    assert_eq!(
        block_on(scheduler.run()),
        Err(PollError::Transport {
            channel: 1,
            source: TransportError::Bus(ErrorKind::Other),
        })
    );
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    drop(scheduler);

    // Only channel 0 made it out, and nothing was tried after the fault
    let readings = block_on(drain(&queue));
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].channel(), 0);
    assert_eq!(adc.exchanges_on(0), 5);
    assert_eq!(adc.exchanges_on(1), 2);
    assert_eq!(adc.exchanges_on(2), 0);
    assert!(!cancel.is_cancelled());
}

#[test]
fn repeated_cycles_keep_channel_order() {
    let config = config(&[2, 0], Duration::from_millis(1));
    let queue = BoundedQueue::new(config.queue_capacity());
    let cancel = CancellationToken::new();
    let mut adc = StubAdc::new(&[(0, 450), (2, 550)]);

    let mut scheduler = PollingScheduler::new(&mut adc, &config, &queue, &cancel);
    let (outcome, readings) = block_on(join(scheduler.run(), async {
        let mut readings = Vec::new();
        for _ in 0..6 {
            readings.push(queue.pop().await.unwrap());
        }
        cancel.cancel();
        readings.extend(drain(&queue).await);
        readings
    }));

    let stats = outcome.unwrap();
    assert!(stats.cycles >= 3);
    assert_eq!(stats.readings as usize, readings.len());
    // Whole cycles only
    assert_eq!(readings.len() % 2, 0);

    for (i, reading) in readings.iter().enumerate() {
        let expected = if i % 2 == 0 { 2 } else { 0 };
        assert_eq!(reading.channel(), expected);
    }
    for pair in readings.windows(3) {
        assert!(pair[0].timestamp() <= pair[2].timestamp());
    }
}

#[test]
fn full_queue_applies_backpressure() {
    let config = config(&[0, 1, 2], Duration::from_millis(1));
    // Smaller than one cycle so the producer has to wait on the consumer
    let queue = BoundedQueue::new(1);
    let cancel = CancellationToken::new();
    let mut adc = StubAdc::new(&[(0, 200), (1, 300), (2, 400)]);

    let mut scheduler = PollingScheduler::new(&mut adc, &config, &queue, &cancel);
    let (outcome, readings) = block_on(join(scheduler.run(), async {
        let mut readings = Vec::new();
        for _ in 0..4 {
            assert!(queue.len() <= 1);
            readings.push(queue.pop().await.unwrap());
        }
        cancel.cancel();
        readings.extend(drain(&queue).await);
        readings
    }));

    let stats = outcome.unwrap();
    assert_eq!(stats.readings as usize, readings.len());
    assert_eq!(readings.len() % 3, 0);
    let channels: Vec<_> = readings.iter().take(4).map(Reading::channel).collect();
    assert_eq!(channels, vec![0, 1, 2, 0]);
}

#[test]
fn signal_drains_and_stops_every_task() {
    let config = config(&[0, 1], Duration::from_millis(1));
    let queue = BoundedQueue::new(config.queue_capacity());
    let cancel = CancellationToken::new();
    let shutdown = ShutdownController::new();
    let mut adc = StubAdc::new(&[(0, 700), (1, 0)]);

    let mut sink = StopAfter {
        limit: 3,
        seen: Vec::new(),
        shutdown: &shutdown,
    };

    let mut scheduler = PollingScheduler::new(&mut adc, &config, &queue, &cancel);
    let (outcome, reported, termination) = block_on(join3(
        scheduler.run(),
        report_readings(&queue, &mut sink),
        shutdown.run(&cancel),
    ));

    assert_eq!(termination, Some(Termination::Interrupt));
    let stats = outcome.unwrap();
    assert!(stats.cycles >= 3);
    assert_eq!(stats.readings, stats.cycles);
    assert_eq!(stats.disconnections, stats.cycles);
    assert_eq!(reported, stats.readings);
    assert!(sink.seen.iter().all(|r| r.channel() == 0));

    // A late second signal changes nothing
    shutdown.request(Termination::Terminate);
    assert!(!cancel.cancel());
}
