use core::cell::RefCell;
use core::future::poll_fn;
use core::task::Poll;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::waitqueue::MultiWakerRegistration;

/// Tasks that may wait on one token at the same time
const MAX_WAITERS: usize = 4;

struct TokenState {
    cancelled: bool,
    waiters: MultiWakerRegistration<MAX_WAITERS>,
}

/// One-shot cooperative cancellation flag.
///
/// Once cancelled it stays cancelled; cancelling again does nothing.
pub struct CancellationToken {
    state: Mutex<CriticalSectionRawMutex, RefCell<TokenState>>,
}

impl CancellationToken {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(TokenState {
                cancelled: false,
                waiters: MultiWakerRegistration::new(),
            })),
        }
    }

    /// Request cancellation, waking every waiter.
    ///
    /// Returns `true` only for the call that actually cancelled.
    pub fn cancel(&self) -> bool {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if state.cancelled {
                return false;
            }
            state.cancelled = true;
            state.waiters.wake();
            true
        })
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.lock(|state| state.borrow().cancelled)
    }

    /// Resolves once the token is cancelled
    pub async fn cancelled(&self) {
        poll_fn(|cx| {
            self.state.lock(|state| {
                let mut state = state.borrow_mut();
                if state.cancelled {
                    return Poll::Ready(());
                }
                state.waiters.register(cx.waker());
                Poll::Pending
            })
        })
        .await
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
