//! An ordered sequence of unique keys with predictable `O(1)` APIs.
//!
//! # Complexity
//! - `push_front`, `push_back`, `remove`, `move_to_front`, `front`, `back`,
//!   `contains`: `O(1)` amortized.
//! - `iter`: `O(n)` over the live keys, head to tail.
//!
//! # Layout
//! Nodes live in a `Vec` arena and link to each other by index; a side map
//! resolves a key to its slot so removal from the middle never scans.
//! Vacated slots are recycled through a free list.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;

type NodeSlot<K> = Option<Node<K>>;

/// Doubly linked key sequence backed by an indexable arena.
///
/// Each key appears at most once. Inserting a key that is already present
/// is a no-op that returns `false`.
///
/// # Examples
///
/// ```
/// use evicache::collections::KeyList;
///
/// let mut list = KeyList::new();
/// list.push_back("a");
/// list.push_back("b");
/// list.push_front("c");
/// assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec!["c", "a", "b"]);
///
/// list.move_to_front(&"b");
/// assert_eq!(list.front(), Some(&"b"));
/// assert_eq!(list.back(), Some(&"a"));
/// ```
pub struct KeyList<K>
where
    K: Eq + Hash + Clone,
{
    index: HashMap<K, usize>,
    nodes: Vec<NodeSlot<K>>,
    free_list: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<K> KeyList<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            head: None,
            tail: None,
        }
    }

    /// Returns the number of keys currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` when the list holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns `true` when `key` is in the list.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the key at the head.
    #[must_use]
    pub fn front(&self) -> Option<&K> {
        self.head.and_then(|index| self.key_at(index))
    }

    /// Returns the key at the tail.
    #[must_use]
    pub fn back(&self) -> Option<&K> {
        self.tail.and_then(|index| self.key_at(index))
    }

    /// Inserts `key` at the head. Returns `false` if it was already present.
    pub fn push_front(&mut self, key: K) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        let index = self.allocate_slot(key.clone());
        self.attach_front(index);
        self.index.insert(key, index);
        true
    }

    /// Inserts `key` at the tail. Returns `false` if it was already present.
    pub fn push_back(&mut self, key: K) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        let index = self.allocate_slot(key.clone());
        self.attach_back(index);
        self.index.insert(key, index);
        true
    }

    /// Removes `key` wherever it sits. Returns whether it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        let Some(index) = self.index.remove(key) else {
            return false;
        };
        self.detach(index);
        self.nodes[index] = None;
        self.free_list.push(index);
        true
    }

    /// Moves `key` to the head. Returns whether it was present.
    pub fn move_to_front(&mut self, key: &K) -> bool {
        let Some(&index) = self.index.get(key) else {
            return false;
        };
        if self.head != Some(index) {
            self.detach(index);
            self.attach_front(index);
        }
        true
    }

    /// Removes every key, keeping allocated capacity.
    pub fn clear(&mut self) {
        self.index.clear();
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
    }

    /// Returns an iterator that yields keys from head to tail.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter { list: self, current: self.head, remaining: self.len() }
    }

    fn key_at(&self, index: usize) -> Option<&K> {
        self.nodes.get(index).and_then(Option::as_ref).map(|node| &node.key)
    }

    fn allocate_slot(&mut self, key: K) -> usize {
        if let Some(index) = self.free_list.pop() {
            self.nodes[index] = Some(Node::new(key));
            index
        } else {
            self.nodes.push(Some(Node::new(key)));
            self.nodes.len() - 1
        }
    }

    fn detach(&mut self, index: usize) {
        let (prev, next) = match self.nodes.get(index).and_then(Option::as_ref) {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(prev_index) => {
                if let Some(prev_node) = self.nodes.get_mut(prev_index).and_then(Option::as_mut) {
                    prev_node.next = next;
                }
            }
            None => {
                self.head = next;
            }
        }

        match next {
            Some(next_index) => {
                if let Some(next_node) = self.nodes.get_mut(next_index).and_then(Option::as_mut) {
                    next_node.prev = prev;
                }
            }
            None => {
                self.tail = prev;
            }
        }

        if let Some(node) = self.nodes.get_mut(index).and_then(Option::as_mut) {
            node.prev = None;
            node.next = None;
        }
    }

    fn attach_front(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index).and_then(Option::as_mut) {
            node.prev = None;
            node.next = self.head;
        }

        if let Some(head_index) = self.head {
            if let Some(head_node) = self.nodes.get_mut(head_index).and_then(Option::as_mut) {
                head_node.prev = Some(index);
            }
        } else {
            self.tail = Some(index);
        }

        self.head = Some(index);
    }

    fn attach_back(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index).and_then(Option::as_mut) {
            node.prev = self.tail;
            node.next = None;
        }

        if let Some(tail_index) = self.tail {
            if let Some(tail_node) = self.nodes.get_mut(tail_index).and_then(Option::as_mut) {
                tail_node.next = Some(index);
            }
        } else {
            self.head = Some(index);
        }

        self.tail = Some(index);
    }
}

impl<K> Default for KeyList<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for KeyList<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[derive(Debug)]
struct Node<K> {
    key: K,
    prev: Option<usize>,
    next: Option<usize>,
}

impl<K> Node<K> {
    fn new(key: K) -> Self {
        Self { key, prev: None, next: None }
    }
}

/// Iterator over keys from head to tail.
pub struct Iter<'a, K>
where
    K: Eq + Hash + Clone,
{
    list: &'a KeyList<K>,
    current: Option<usize>,
    remaining: usize,
}

impl<'a, K> Iterator for Iter<'a, K>
where
    K: Eq + Hash + Clone,
{
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.current?;
        let node = self.list.nodes.get(index).and_then(Option::as_ref)?;
        self.current = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> where K: Eq + Hash + Clone {}

impl<K> FusedIterator for Iter<'_, K> where K: Eq + Hash + Clone {}
