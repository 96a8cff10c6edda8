use std::collections::VecDeque;

pub const DEFAULT_RECENT_CAPACITY: usize = 5;

/// Fixed-capacity FIFO. Pushing past capacity drops the oldest entry.
#[derive(Debug, Clone)]
pub struct RecentQueue<T> {
    capacity: usize,
    items: VecDeque<T>,
}

impl<T: Clone> RecentQueue<T> {
    pub fn new(capacity: usize) -> Self {
        RecentQueue {
            capacity,
            items: VecDeque::with_capacity(capacity + 1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn enqueue(&mut self, value: T) {
        self.items.push_back(value);
        while self.items.len() > self.capacity {
            self.items.pop_front();
        }
    }

    pub fn dequeue(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Overwrite every queued value matching `pred` in place. Order and
    /// length are unchanged. Returns how many entries were replaced.
    pub fn replace_where(&mut self, mut pred: impl FnMut(&T) -> bool, value: &T) -> usize {
        let mut replaced = 0;
        for slot in self.items.iter_mut().filter(|v| pred(v)) {
            *slot = value.clone();
            replaced += 1;
        }
        replaced
    }

    pub fn oldest_first(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }

    pub fn newest_first(&self) -> Vec<T> {
        self.items.iter().rev().cloned().collect()
    }

    /// Reset to the last `capacity` values of `values`.
    pub fn replace_all(&mut self, values: impl IntoIterator<Item = T>) {
        self.items.clear();
        for value in values {
            self.enqueue(value);
        }
    }

    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.items.retain(keep);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> Default for RecentQueue<T> {
    fn default() -> Self {
        RecentQueue::new(DEFAULT_RECENT_CAPACITY)
    }
}
