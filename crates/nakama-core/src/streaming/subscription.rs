use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::task::AtomicWaker;
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::Topic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Open,
    Closed,
}

#[derive(Debug)]
struct Channel {
    topic: Topic,
    unsubscribed: AtomicBool,
    /// Set when the transport stops producing frames
    ended: AtomicBool,
    pump: Mutex<Option<JoinHandle<()>>>,
    waker: AtomicWaker,
}

/// Cloneable teardown handle for one live channel. Safe to call any number of times.
#[derive(Debug, Clone)]
pub struct Unsubscribe {
    channel: Arc<Channel>,
}

impl Unsubscribe {
    pub(crate) fn new(topic: Topic) -> Self {
        Self {
            channel: Arc::new(Channel {
                topic,
                unsubscribed: AtomicBool::new(false),
                ended: AtomicBool::new(false),
                pump: Mutex::new(None),
                waker: AtomicWaker::new(),
            }),
        }
    }

    pub(crate) fn set_pump(&self, pump: JoinHandle<()>) {
        if self.channel.unsubscribed.load(Ordering::Acquire) {
            pump.abort();
            return;
        }
        *self.channel.pump.lock() = Some(pump);
    }

    pub(crate) fn mark_ended(&self) {
        self.channel.ended.store(true, Ordering::Release);
        self.channel.waker.wake();
    }

    pub fn topic(&self) -> Topic {
        self.channel.topic
    }

    /// Stop the channel. Once this returns the consumer sees no further items, even
    /// ones already buffered.
    pub fn unsubscribe(&self) {
        let was_unsubscribed = self.channel.unsubscribed.swap(true, Ordering::AcqRel);
        if let Some(pump) = self.channel.pump.lock().take() {
            pump.abort();
        }
        self.channel.waker.wake();
        if !was_unsubscribed {
            tracing::debug!(topic = %self.channel.topic, "unsubscribed");
        }
    }

    pub fn is_unsubscribed(&self) -> bool {
        self.channel.unsubscribed.load(Ordering::Acquire)
    }

    pub fn state(&self) -> SubscriptionState {
        if self.is_unsubscribed() || self.channel.ended.load(Ordering::Acquire) {
            SubscriptionState::Closed
        } else {
            SubscriptionState::Open
        }
    }
}

/// Typed live items for one topic, as a cancellable stream.
///
/// Dropping the subscription unsubscribes.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: mpsc::Receiver<T>,
    handle: Unsubscribe,
}

impl<T> Subscription<T> {
    pub(crate) fn new(rx: mpsc::Receiver<T>, handle: Unsubscribe) -> Self {
        Self { rx, handle }
    }

    /// Wrap a local channel (in-process hand-off) so it behaves like a live topic.
    pub fn from_channel(topic: Topic, rx: mpsc::Receiver<T>) -> Self {
        Self::new(rx, Unsubscribe::new(topic))
    }

    pub fn topic(&self) -> Topic {
        self.handle.topic()
    }

    pub fn state(&self) -> SubscriptionState {
        self.handle.state()
    }

    pub fn handle(&self) -> Unsubscribe {
        self.handle.clone()
    }

    pub fn unsubscribe(&mut self) {
        self.handle.unsubscribe();
        self.rx.close();
    }

    /// Next live item, or `None` once the channel is closed.
    pub async fn recv(&mut self) -> Option<T> {
        self.next().await
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let this = self.get_mut();
        this.handle.channel.waker.register(cx.waker());

        if this.handle.is_unsubscribed() {
            this.rx.close();
            return Poll::Ready(None);
        }

        match this.rx.poll_recv(cx) {
            // Raced with unsubscribe: the frame is dropped, not delivered
            Poll::Ready(Some(_)) if this.handle.is_unsubscribed() => Poll::Ready(None),
            Poll::Ready(Some(item)) => Poll::Ready(Some(item)),
            Poll::Ready(None) => {
                this.handle.channel.ended.store(true, Ordering::Release);
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.handle.unsubscribe();
    }
}
