//! Bounded FIFO between the sampling task and the reporting task
//!
//! Pushing into a full queue waits for the consumer (backpressure, nothing is
//! dropped). Closing the queue lets the consumer drain what is left and then
//! observe the end of the stream.

use core::cell::RefCell;
use core::future::poll_fn;
use core::task::Poll;
use std::collections::VecDeque;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::waitqueue::WakerRegistration;

/// Returned by [`BoundedQueue::push`] when the queue is already closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueClosed<T>(pub T);

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
    senders: WakerRegistration,
    receivers: WakerRegistration,
}

pub struct BoundedQueue<T> {
    capacity: usize,
    state: Mutex<CriticalSectionRawMutex, RefCell<QueueState<T>>>,
}

impl<T> BoundedQueue<T> {
    /// A queue holding at most `capacity` items (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            state: Mutex::new(RefCell::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                closed: false,
                senders: WakerRegistration::new(),
                receivers: WakerRegistration::new(),
            })),
        }
    }

    /// Append `item`, waiting while the queue is full.
    pub async fn push(&self, item: T) -> Result<(), QueueClosed<T>> {
        let mut item = Some(item);
        poll_fn(|cx| {
            self.state.lock(|state| {
                let mut state = state.borrow_mut();
                if state.closed {
                    return Poll::Ready(item.take().map_or(Ok(()), |v| Err(QueueClosed(v))));
                }
                if state.items.len() < self.capacity {
                    if let Some(v) = item.take() {
                        state.items.push_back(v);
                        state.receivers.wake();
                    }
                    return Poll::Ready(Ok(()));
                }
                state.senders.register(cx.waker());
                Poll::Pending
            })
        })
        .await
    }

    /// Next item in FIFO order, or `None` once the queue is closed and empty.
    pub async fn pop(&self) -> Option<T> {
        poll_fn(|cx| {
            self.state.lock(|state| {
                let mut state = state.borrow_mut();
                if let Some(item) = state.items.pop_front() {
                    state.senders.wake();
                    return Poll::Ready(Some(item));
                }
                if state.closed {
                    return Poll::Ready(None);
                }
                state.receivers.register(cx.waker());
                Poll::Pending
            })
        })
        .await
    }

    /// Refuse further pushes. Items already queued stay available to `pop`.
    ///
    /// Returns `false` if the queue was already closed.
    pub fn close(&self) -> bool {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if state.closed {
                return false;
            }
            state.closed = true;
            state.senders.wake();
            state.receivers.wake();
            true
        })
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock(|state| state.borrow().closed)
    }

    pub fn len(&self) -> usize {
        self.state.lock(|state| state.borrow().items.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
