//! Bounded entity storage
//!
//! Two policies, both allocated once up front:
//! - `SlotPool`: fixed slots, insertion is refused when every slot is taken
//! - `RecentPool`: ring of the most recent entries, the oldest is evicted

use std::collections::VecDeque;

/// Fixed number of slots; `insert` is a no-op once full
#[derive(Debug, Clone)]
pub struct SlotPool<T> {
    slots: Box<[Option<T>]>,
    live: usize,
}

impl<T> SlotPool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "pool capacity must be positive");
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            live: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn is_full(&self) -> bool {
        self.live >= self.slots.len()
    }

    /// Place `item` in the first free slot; returns its slot index
    pub fn insert(&mut self, item: T) -> Option<usize> {
        let index = self.slots.iter().position(Option::is_none)?;
        self.slots[index] = Some(item);
        self.live += 1;
        Some(index)
    }

    /// Free every slot whose item fails the predicate
    pub fn retain_mut(&mut self, mut keep: impl FnMut(&mut T) -> bool) {
        for slot in self.slots.iter_mut() {
            let expired = slot.as_mut().is_some_and(|item| !keep(item));
            if expired {
                *slot = None;
                self.live -= 1;
            }
        }
    }

    /// Live items in slot order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(Option::as_ref)
    }
}

/// Keeps at most `capacity` entries, newest last
#[derive(Debug, Clone)]
pub struct RecentPool<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RecentPool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "pool capacity must be positive");
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append, dropping the oldest entry if the pool is at capacity
    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn retain_mut(&mut self, keep: impl FnMut(&mut T) -> bool) {
        self.items.retain_mut(keep);
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T> Extend<T> for RecentPool<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}
