//! Consumer side of the reading queue

use log::info;

use crate::model::Reading;
use crate::queue::BoundedQueue;
use crate::traits::ReadingSink;

/// Reports each reading as a log line
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl ReadingSink for LogSink {
    fn report(&mut self, reading: &Reading) {
        info!(
            "value for chan {} is: {:.2}",
            reading.channel(),
            reading.fahrenheit()
        );
    }
}

/// Feed readings to `sink` until the queue is closed and empty.
///
/// Returns the number of readings reported.
pub async fn report_readings<S: ReadingSink>(queue: &BoundedQueue<Reading>, mut sink: S) -> u64 {
    let mut reported = 0;
    while let Some(reading) = queue.pop().await {
        sink.report(&reading);
        reported += 1;
    }

    info!("Reading queue closed after {} readings", reported);
    reported
}
