//! Bounded FIFO tabu memory.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Short-term memory of recently used moves.
///
/// Entries are kept in insertion order and the oldest entry is evicted
/// once the configured capacity is exceeded. The same key may be pushed
/// more than once; it stays tabu until its last occurrence is evicted.
///
/// # Examples
///
/// ```
/// use u_tabu::tabu::TabuMemory;
///
/// let mut memory = TabuMemory::new(2);
/// memory.push("a");
/// memory.push("b");
/// memory.push("c");
/// assert!(!memory.contains(&"a"));
/// assert_eq!(memory.iter().copied().collect::<Vec<_>>(), vec!["b", "c"]);
/// ```
#[derive(Debug, Clone)]
pub struct TabuMemory<K> {
    capacity: usize,
    queue: VecDeque<K>,
    // occurrences of each key currently in `queue`
    counts: HashMap<K, usize>,
}

impl<K: Clone + Eq + Hash> TabuMemory<K> {
    /// Creates an empty memory holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            queue: VecDeque::with_capacity(capacity + 1),
            counts: HashMap::with_capacity(capacity + 1),
        }
    }

    /// Appends `key`, evicting and returning the oldest entry if the
    /// capacity is exceeded.
    pub fn push(&mut self, key: K) -> Option<K> {
        *self.counts.entry(key.clone()).or_insert(0) += 1;
        self.queue.push_back(key);

        if self.queue.len() > self.capacity {
            let oldest = self.queue.pop_front()?;
            if let Entry::Occupied(mut slot) = self.counts.entry(oldest.clone()) {
                *slot.get_mut() -= 1;
                if *slot.get() == 0 {
                    slot.remove();
                }
            }
            return Some(oldest);
        }
        None
    }

    /// Whether `key` is currently tabu.
    pub fn contains(&self, key: &K) -> bool {
        self.counts.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates from the oldest to the newest entry.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.queue.iter()
    }
}
