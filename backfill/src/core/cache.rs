use std::{
    collections::{HashMap, VecDeque},
    hash::Hash,
    num::NonZeroUsize,
    rc::Rc,
};

/// Memo of expensive artifacts owned by one analysis session.
///
/// Unbounded unless a capacity is given. A bounded memo evicts the oldest inserted key first,
/// regardless of how recently it was read.
#[must_use]
pub struct Memo<K, V> {
    entries: HashMap<K, Rc<V>>,
    insertion_order: VecDeque<K>,
    capacity: Option<NonZeroUsize>,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self { entries: HashMap::new(), insertion_order: VecDeque::new(), capacity: None }
    }
}

impl<K: Copy + Eq + Hash, V> Memo<K, V> {
    pub fn bounded(capacity: NonZeroUsize) -> Self {
        Self { capacity: Some(capacity), ..Self::default() }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Return the memoized value, computing and remembering it on the first request.
    pub fn get_or_insert_with(&mut self, key: K, compute: impl FnOnce() -> V) -> Rc<V> {
        if let Some(value) = self.entries.get(&key) {
            return Rc::clone(value);
        }
        let value = Rc::new(compute());
        if let Some(capacity) = self.capacity
            && self.entries.len() >= capacity.get()
            && let Some(oldest) = self.insertion_order.pop_front()
        {
            self.entries.remove(&oldest);
        }
        self.entries.insert(key, Rc::clone(&value));
        self.insertion_order.push_back(key);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_computes_once() {
        let mut memo = Memo::<u32, String>::default();
        let mut n_calls = 0;
        for _ in 0..3 {
            let value = memo.get_or_insert_with(1, || {
                n_calls += 1;
                "fitted".to_string()
            });
            assert_eq!(value.as_str(), "fitted");
        }
        assert_eq!(n_calls, 1);
    }

    #[test]
    fn test_returns_same_instance() {
        let mut memo = Memo::<u32, String>::default();
        let first = memo.get_or_insert_with(1, || "a".to_string());
        let second = memo.get_or_insert_with(1, || "b".to_string());
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(second.as_str(), "a");
    }

    #[test]
    fn test_bounded_evicts_oldest_inserted() {
        let mut memo = Memo::<u32, u32>::bounded(NonZeroUsize::new(2).unwrap());
        memo.get_or_insert_with(1, || 1);
        memo.get_or_insert_with(2, || 2);

        // Reading the oldest key does not protect it from eviction:
        memo.get_or_insert_with(1, || 1);
        memo.get_or_insert_with(3, || 3);

        assert_eq!(memo.len(), 2);
        assert!(!memo.contains(&1));
        assert!(memo.contains(&2));
        assert!(memo.contains(&3));
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let mut memo = Memo::<u32, u32>::default();
        for key in 0..100 {
            memo.get_or_insert_with(key, || key);
        }
        assert_eq!(memo.len(), 100);
    }
}
