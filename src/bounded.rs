use serde::{Deserialize, Serialize};
use std::collections::vec_deque::{IntoIter, Iter};
use std::collections::VecDeque;

/// FIFO sequence that never holds more than `capacity` items.
///
/// Pushing onto a full queue evicts the oldest item. Shared by the prompt
/// queue and the keystroke history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundedQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the bound, evicting oldest items if the queue is now over it.
    pub fn set_capacity(&mut self, capacity: usize) -> Vec<T> {
        self.capacity = capacity;
        self.trim()
    }

    /// Keep the first `len` items, dropping the newest.
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    /// Append to the back; returns the evicted front item, if any.
    pub fn push_back(&mut self, item: T) -> Option<T> {
        self.items.push_back(item);
        self.trim().into_iter().next()
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn back(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Free slots before the queue is full.
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.items.len())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Evict oldest items until within capacity; returns them oldest first.
    pub fn trim(&mut self) -> Vec<T> {
        let excess = self.items.len().saturating_sub(self.capacity);
        self.items.drain(..excess).collect()
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.items.iter()
    }
}

impl<'a, T> IntoIterator for &'a BoundedQueue<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> IntoIterator for BoundedQueue<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let queue: BoundedQueue<u32> = BoundedQueue::new(3);
        assert!(queue.is_empty());
        assert_eq!(queue.capacity(), 3);
        assert_eq!(queue.remaining(), 3);
        assert!(!queue.is_full());
    }

    #[test]
    fn test_push_within_capacity() {
        let mut queue = BoundedQueue::new(3);
        assert_eq!(queue.push_back(1), None);
        assert_eq!(queue.push_back(2), None);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.front(), Some(&1));
        assert_eq!(queue.back(), Some(&2));
    }

    #[test]
    fn test_push_evicts_oldest() {
        let mut queue = BoundedQueue::new(2);
        queue.push_back('a');
        queue.push_back('b');
        assert!(queue.is_full());
        assert_eq!(queue.push_back('c'), Some('a'));
        assert_eq!(queue.iter().copied().collect::<String>(), "bc");
    }

    #[test]
    fn test_pop_front() {
        let mut queue = BoundedQueue::new(2);
        queue.push_back(7);
        assert_eq!(queue.pop_front(), Some(7));
        assert_eq!(queue.pop_front(), None);
    }

    #[test]
    fn test_shrink_capacity_trims_oldest() {
        let mut queue = BoundedQueue::new(5);
        for i in 0..5 {
            queue.push_back(i);
        }
        assert_eq!(queue.set_capacity(2), vec![0, 1, 2]);
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![3, 4]);
    }

    #[test]
    fn test_zero_capacity_holds_nothing() {
        let mut queue = BoundedQueue::new(0);
        assert_eq!(queue.push_back(1), Some(1));
        assert!(queue.is_empty());
        assert!(queue.is_full());
    }

    #[test]
    fn test_truncate_drops_newest() {
        let mut queue = BoundedQueue::new(5);
        for i in 0..5 {
            queue.push_back(i);
        }
        queue.truncate(2);
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![0, 1]);
        queue.truncate(4);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_deserialized_overfull_queue_trims() {
        let mut queue: BoundedQueue<u32> =
            serde_json::from_str(r#"{"items": [1, 2, 3, 4], "capacity": 2}"#).unwrap();
        assert_eq!(queue.len(), 4);
        assert_eq!(queue.set_capacity(2), vec![1, 2]);
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![3, 4]);
    }

    #[test]
    fn test_clear() {
        let mut queue = BoundedQueue::new(2);
        queue.push_back(1);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.remaining(), 2);
    }
}
