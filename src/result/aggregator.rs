use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Serialize, Serializer};

/// Append-only collection shared by concurrently running producers.
///
/// `add` never blocks for longer than a vector push and never fails.
/// Iteration is lazy and index based: every item whose `add` completed
/// before iteration started is yielded exactly once, items added while
/// iterating may or may not be seen, and items from one producer keep their
/// relative order.
pub struct Aggregator<T> {
    items: RwLock<Vec<Arc<T>>>,
}

impl<T> Aggregator<T> {
    pub fn new() -> Self {
        Aggregator {
            items: RwLock::new(Vec::new()),
        }
    }

    pub fn add(&self, item: T) -> Arc<T> {
        let item = Arc::new(item);
        self.add_shared(Arc::clone(&item));
        item
    }

    pub fn add_shared(&self, item: Arc<T>) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(item);
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lazy iterator over the items. Call again to restart.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            source: self,
            next: 0,
        }
    }

    /// Items added so far, as one consistent copy.
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn get(&self, index: usize) -> Option<Arc<T>> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index)
            .cloned()
    }
}

impl<T> Default for Aggregator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Aggregator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.snapshot().iter()).finish()
    }
}

impl<T: Serialize> Serialize for Aggregator<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let items = self.snapshot();
        serializer.collect_seq(items.iter().map(|item| item.as_ref()))
    }
}

impl<T> FromIterator<T> for Aggregator<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Aggregator {
            items: RwLock::new(iter.into_iter().map(Arc::new).collect()),
        }
    }
}

/// Iterator returned by [`Aggregator::iter`].
pub struct Iter<'a, T> {
    source: &'a Aggregator<T>,
    next: usize,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            source: self.source,
            next: self.next,
        }
    }
}

impl<T> Iterator for Iter<'_, T> {
    type Item = Arc<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.source.get(self.next)?;
        self.next += 1;
        Some(item)
    }
}

impl<'a, T> IntoIterator for &'a Aggregator<T> {
    type Item = Arc<T>;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
