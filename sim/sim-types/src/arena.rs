//! Generational arena backing body and joint storage.
//!
//! Slots are reused after removal, but every reuse bumps the slot's
//! generation, so an [`Index`] taken before the removal no longer resolves.
//! Iteration follows slot order, which keeps solver sweeps deterministic.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A slot index paired with the generation it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Index {
    slot: u32,
    generation: u32,
}

impl Index {
    /// Build an index from raw parts.
    ///
    /// Parts that were never issued by an arena simply fail to resolve.
    #[must_use]
    pub const fn from_raw_parts(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }

    /// Split the index into `(slot, generation)`.
    #[must_use]
    pub const fn into_raw_parts(self) -> (u32, u32) {
        (self.slot, self.generation)
    }

    /// Slot position inside the arena.
    #[must_use]
    pub const fn slot(self) -> usize {
        self.slot as usize
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
enum Entry<T> {
    Free {
        generation: u32,
        next_free: Option<u32>,
    },
    Occupied {
        generation: u32,
        value: T,
    },
}

/// Storage that hands out [`Index`] handles.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Arena<T> {
    entries: Vec<Entry<T>>,
    free_head: Option<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    /// Create an empty arena.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    /// Create an empty arena with room for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    /// Number of live values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the arena holds no live values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a value, reusing a freed slot when one exists.
    pub fn insert(&mut self, value: T) -> Index {
        self.len += 1;

        if let Some(slot) = self.free_head {
            let entry = &mut self.entries[slot as usize];
            if let Entry::Free {
                generation,
                next_free,
            } = *entry
            {
                self.free_head = next_free;
                *entry = Entry::Occupied { generation, value };
                return Index::from_raw_parts(slot, generation);
            }
        }

        let slot = u32::try_from(self.entries.len()).unwrap_or(u32::MAX);
        self.entries.push(Entry::Occupied {
            generation: 0,
            value,
        });
        Index::from_raw_parts(slot, 0)
    }

    /// Remove the value at `index`, invalidating every copy of the handle.
    pub fn remove(&mut self, index: Index) -> Option<T> {
        if !self.contains(index) {
            return None;
        }

        let freed = Entry::Free {
            generation: index.generation.wrapping_add(1),
            next_free: self.free_head,
        };
        let old = std::mem::replace(&mut self.entries[index.slot()], freed);
        self.free_head = Some(index.slot);
        self.len -= 1;

        match old {
            Entry::Occupied { value, .. } => Some(value),
            Entry::Free { .. } => None,
        }
    }

    /// Whether `index` still resolves to a live value.
    #[must_use]
    pub fn contains(&self, index: Index) -> bool {
        self.get(index).is_some()
    }

    /// Shared access to the value at `index`.
    #[must_use]
    pub fn get(&self, index: Index) -> Option<&T> {
        match self.entries.get(index.slot()) {
            Some(Entry::Occupied { generation, value }) if *generation == index.generation => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Mutable access to the value at `index`.
    pub fn get_mut(&mut self, index: Index) -> Option<&mut T> {
        match self.entries.get_mut(index.slot()) {
            Some(Entry::Occupied { generation, value }) if *generation == index.generation => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Mutable access to two distinct values at once.
    ///
    /// Returns `None` for either side that does not resolve. Passing the same
    /// slot twice yields the value on the first side only.
    pub fn get2_mut(&mut self, a: Index, b: Index) -> (Option<&mut T>, Option<&mut T>) {
        if a.slot == b.slot {
            return (self.get_mut(a), None);
        }

        let (first, second, swapped) = if a.slot < b.slot {
            (a, b, false)
        } else {
            (b, a, true)
        };
        if second.slot() >= self.entries.len() {
            let only = self.get_mut(first);
            return if swapped { (None, only) } else { (only, None) };
        }

        let (head, tail) = self.entries.split_at_mut(second.slot());
        let lo = Self::resolve_mut(&mut head[first.slot()], first.generation);
        let hi = Self::resolve_mut(&mut tail[0], second.generation);

        if swapped {
            (hi, lo)
        } else {
            (lo, hi)
        }
    }

    fn resolve_mut(entry: &mut Entry<T>, expected: u32) -> Option<&mut T> {
        match entry {
            Entry::Occupied { generation, value } if *generation == expected => Some(value),
            _ => None,
        }
    }

    /// Iterate over live `(Index, &T)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Index, &T)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| match entry {
                Entry::Occupied { generation, value } => Some((
                    Index::from_raw_parts(slot as u32, *generation),
                    value,
                )),
                Entry::Free { .. } => None,
            })
    }

    /// Iterate over live `(Index, &mut T)` pairs in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Index, &mut T)> {
        self.entries
            .iter_mut()
            .enumerate()
            .filter_map(|(slot, entry)| match entry {
                Entry::Occupied { generation, value } => Some((
                    Index::from_raw_parts(slot as u32, *generation),
                    value,
                )),
                Entry::Free { .. } => None,
            })
    }

    /// Remove every value for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(Index, &mut T) -> bool) {
        let doomed: Vec<Index> = self
            .iter_mut()
            .filter_map(|(index, value)| (!keep(index, value)).then_some(index))
            .collect();
        for index in doomed {
            self.remove(index);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");

        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena.get(b), Some(&"b"));
    }

    #[test]
    fn test_stale_index_after_reuse() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        assert_eq!(arena.remove(a), Some(1));

        let b = arena.insert(2);
        assert_eq!(a.slot(), b.slot());
        assert_ne!(a, b);
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(b), Some(&2));
        assert!(arena.remove(a).is_none());
    }

    #[test]
    fn test_get2_mut_both_orders() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);

        {
            let (x, y) = arena.get2_mut(a, b);
            *x.unwrap() += 10;
            *y.unwrap() += 20;
        }
        {
            let (y, x) = arena.get2_mut(b, a);
            assert_eq!(*y.unwrap(), 22);
            assert_eq!(*x.unwrap(), 11);
        }
    }

    #[test]
    fn test_get2_mut_same_and_missing() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        let missing = Index::from_raw_parts(7, 0);

        let (x, y) = arena.get2_mut(a, a);
        assert!(x.is_some());
        assert!(y.is_none());

        let (x, y) = arena.get2_mut(missing, a);
        assert!(x.is_none());
        assert_eq!(y.copied(), Some(1));
    }

    #[test]
    fn test_iter_in_slot_order_and_retain() {
        let mut arena = Arena::new();
        for i in 0..5 {
            arena.insert(i);
        }
        arena.retain(|_, v| *v % 2 == 0);

        let values: Vec<i32> = arena.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![0, 2, 4]);
        assert_eq!(arena.len(), 3);
    }
}
