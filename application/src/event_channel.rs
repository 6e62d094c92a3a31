//! Per-session event channel.
//!
//! A bounded, single-subscriber queue of [`SessionEvent`]s. When the buffer is
//! full the oldest non-terminal event is discarded so progress noise never
//! pushes out a cycle's outcome; terminal events are never dropped.
//!
//! Closing the channel (from either side) turns publishing into a no-op and
//! cancels the channel's teardown token. The subscriber still drains whatever
//! was queued before seeing end-of-stream.

use conclave_domain::SessionEvent;
use futures::Stream;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryRecvError {
    #[error("no event available")]
    Empty,

    #[error("event channel closed")]
    Closed,
}

struct State {
    queue: VecDeque<SessionEvent>,
    capacity: usize,
    closed: bool,
    dropped: u64,
}

struct Shared {
    state: Mutex<State>,
    notify: Notify,
    teardown: CancellationToken,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn close(&self) {
        self.lock().closed = true;
        self.teardown.cancel();
        self.notify.notify_one();
    }
}

/// Create a channel holding at most `capacity` non-terminal events.
pub fn event_channel(capacity: usize) -> (EventPublisher, EventSubscriber) {
    event_channel_with_teardown(capacity, CancellationToken::new())
}

/// Like [`event_channel`], but cancels `teardown` once either side closes.
pub fn event_channel_with_teardown(
    capacity: usize,
    teardown: CancellationToken,
) -> (EventPublisher, EventSubscriber) {
    let shared = Arc::new(Shared {
        state: Mutex::new(State {
            queue: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
            closed: false,
            dropped: 0,
        }),
        notify: Notify::new(),
        teardown,
    });
    (
        EventPublisher {
            shared: Arc::clone(&shared),
        },
        EventSubscriber { shared },
    )
}

/// Sending half, cloned freely within a session.
#[derive(Clone)]
pub struct EventPublisher {
    shared: Arc<Shared>,
}

impl EventPublisher {
    /// Queue an event. Returns `false` when the channel is closed or the
    /// event itself had to be discarded.
    pub fn publish(&self, event: SessionEvent) -> bool {
        let mut state = self.shared.lock();
        if state.closed {
            return false;
        }

        if state.queue.len() >= state.capacity {
            match state.queue.iter().position(|e| !e.is_terminal()) {
                Some(oldest) => {
                    state.queue.remove(oldest);
                    state.dropped += 1;
                }
                // Buffer holds only outcomes; they stay, progress goes
                None if !event.is_terminal() => {
                    state.dropped += 1;
                    return false;
                }
                None => {}
            }
        }

        state.queue.push_back(event);
        drop(state);
        self.shared.notify.notify_one();
        true
    }

    pub fn close(&self) {
        self.shared.close();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }
}

/// Receiving half. Dropping it tears the channel down.
pub struct EventSubscriber {
    shared: Arc<Shared>,
}

impl EventSubscriber {
    /// Wait for the next event; `None` once closed and drained.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        loop {
            let notified = self.shared.notify.notified();
            {
                let mut state = self.shared.lock();
                if let Some(event) = state.queue.pop_front() {
                    return Some(event);
                }
                if state.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    pub fn try_recv(&mut self) -> Result<SessionEvent, TryRecvError> {
        let mut state = self.shared.lock();
        match state.queue.pop_front() {
            Some(event) => Ok(event),
            None if state.closed => Err(TryRecvError::Closed),
            None => Err(TryRecvError::Empty),
        }
    }

    /// Number of events discarded because the buffer was full.
    pub fn dropped(&self) -> u64 {
        self.shared.lock().dropped
    }

    pub fn into_stream(self) -> impl Stream<Item = SessionEvent> + Send {
        futures::stream::unfold(self, |mut subscriber| async move {
            subscriber.recv().await.map(|event| (event, subscriber))
        })
    }
}

impl Drop for EventSubscriber {
    fn drop(&mut self) {
        {
            let mut state = self.shared.lock();
            state.closed = true;
            state.queue.clear();
        }
        self.shared.teardown.cancel();
    }
}

impl std::fmt::Debug for EventSubscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("EventSubscriber")
            .field("queued", &state.queue.len())
            .field("closed", &state.closed)
            .field("dropped", &state.dropped)
            .finish()
    }
}
