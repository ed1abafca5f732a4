use std::collections::{HashSet, VecDeque};

use tokio::sync::watch;

use crate::models::StreamItem;

/// Live items held back from the view until the user asks for them.
///
/// Nothing here touches the cache; the pending counter drives the "N new posts"
/// affordance.
#[derive(Debug)]
pub struct LiveQueue<T> {
    pending: VecDeque<T>,
    ids: HashSet<String>,
    count_tx: watch::Sender<usize>,
}

impl<T: StreamItem> LiveQueue<T> {
    pub fn new() -> Self {
        let (count_tx, _rx) = watch::channel(0);
        Self {
            pending: VecDeque::new(),
            ids: HashSet::new(),
            count_tx,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn watch_count(&self) -> watch::Receiver<usize> {
        self.count_tx.subscribe()
    }

    /// Append to the tail. Returns false for an id that is already queued.
    pub fn enqueue(&mut self, item: T) -> bool {
        if !self.ids.insert(item.id().to_string()) {
            return false;
        }
        self.pending.push_back(item);
        self.count_tx.send_replace(self.pending.len());
        true
    }

    /// Drain in arrival order, oldest first: prepending them one by one leaves the
    /// newest arrival at the top.
    pub fn flush(&mut self) -> Vec<T> {
        self.ids.clear();
        let drained: Vec<T> = self.pending.drain(..).collect();
        if !drained.is_empty() {
            self.count_tx.send_replace(0);
        }
        drained
    }

    /// "1 new post", "3 new posts". `None` when nothing is pending.
    pub fn label(&self, noun: &str) -> Option<String> {
        pending_label(self.pending.len(), noun)
    }
}

impl<T: StreamItem> Default for LiveQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub fn pending_label(count: usize, noun: &str) -> Option<String> {
    match count {
        0 => None,
        1 => Some(format!("1 new {}", noun)),
        n => Some(format!("{} new {}s", n, noun)),
    }
}
