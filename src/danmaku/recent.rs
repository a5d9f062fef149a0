//! Bounded, de-duplicated text sequences.
//!
//! Three pieces of engine state share the same shape: the recently shown ring,
//! the persisted user messages and the pending scroll queue. All of them keep
//! at most `capacity` distinct strings, newest at the front, and silently drop
//! whatever falls off the back.

use std::collections::VecDeque;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecencyList {
    items: VecDeque<String>,
    capacity: usize,
}

impl RecencyList {
    pub fn new(capacity: usize) -> Self {
        Self { items: VecDeque::with_capacity(capacity), capacity }
    }

    /// Build from an existing ordering (front = most recent). Later duplicates
    /// lose to earlier ones and the result is truncated to `capacity`.
    pub fn from_ordered<I, S>(capacity: usize, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::new(capacity);
        list.extend_back(items);
        list
    }

    /// Move `text` to the front, removing any earlier copy.
    pub fn push_front(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.items.retain(|t| *t != text);
        self.items.push_front(text);
        self.items.truncate(self.capacity);
    }

    /// Append entries behind the current ones, skipping texts already present.
    pub fn extend_back<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for item in items {
            if self.items.len() >= self.capacity {
                break;
            }
            let item = item.into();
            if !self.contains(&item) {
                self.items.push_back(item);
            }
        }
    }

    pub fn pop_front(&mut self) -> Option<String> {
        self.items.pop_front()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.items.iter().any(|t| t == text)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_front_dedups_and_moves_to_front() {
        let mut list = RecencyList::new(3);
        list.push_front("a");
        list.push_front("b");
        list.push_front("a");
        assert_eq!(list.to_vec(), vec!["a", "b"]);
    }

    #[test]
    fn push_front_truncates_oldest() {
        let mut list = RecencyList::new(2);
        for t in ["a", "b", "c"] {
            list.push_front(t);
        }
        assert_eq!(list.to_vec(), vec!["c", "b"]);
    }

    #[test]
    fn from_ordered_keeps_first_occurrence() {
        let list = RecencyList::from_ordered(10, ["x", "y", "x", "z"]);
        assert_eq!(list.to_vec(), vec!["x", "y", "z"]);
    }

    #[test]
    fn extend_back_stops_at_capacity() {
        let mut list = RecencyList::new(2);
        list.extend_back(["a", "b", "c"]);
        assert_eq!(list.len(), 2);
        assert_eq!(list.pop_front().as_deref(), Some("a"));
    }
}
