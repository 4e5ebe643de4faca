//! Termination signals to cancellation

use core::fmt;
use std::{io, thread};

use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::{debug, info};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use crate::cancel::CancellationToken;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    Interrupt,
    Terminate,
}

impl Termination {
    pub fn from_signal(signal: i32) -> Option<Self> {
        match signal {
            SIGINT => Some(Self::Interrupt),
            SIGTERM => Some(Self::Terminate),
            _ => None,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("SIGINT"),
            Self::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Turns the first termination request into a cancellation
pub struct ShutdownController {
    requested: Signal<CriticalSectionRawMutex, Termination>,
}

impl ShutdownController {
    pub const fn new() -> Self {
        Self {
            requested: Signal::new(),
        }
    }

    /// Record a termination request; safe to call from any thread
    pub fn request(&self, termination: Termination) {
        self.requested.signal(termination);
    }

    /// Forward SIGINT and SIGTERM to [`request`](Self::request) from a
    /// background thread.
    pub fn install(&'static self) -> io::Result<()> {
        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        thread::Builder::new()
            .name("signals".into())
            .spawn(move || {
                for signal in signals.forever() {
                    if let Some(termination) = Termination::from_signal(signal) {
                        self.request(termination);
                    }
                }
            })?;
        Ok(())
    }

    /// Wait for a termination request and cancel `cancel`.
    ///
    /// Also returns (with `None`) if the token gets cancelled some other way.
    pub async fn run(&self, cancel: &CancellationToken) -> Option<Termination> {
        match select(self.requested.wait(), cancel.cancelled()).await {
            Either::First(termination) => {
                info!("{}", termination);
                if !cancel.cancel() {
                    debug!("Already cancelled");
                }
                Some(termination)
            }
            Either::Second(()) => None,
        }
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}
