// 🗂️ Ordered Associative Map - the room registry container
// Key-unique, insertion-ordered, linear lookup over two parallel sequences
//
// A few hundred rooms at most, so an O(n) scan is fine. What matters is
// that iteration reproduces load order for the listing commands.

// ============================================================================
// CONTRACT
// ============================================================================

/// Minimal associative-array contract used for the registry
pub trait AssocMap<K, V> {
    /// Insert or replace. Replacing keeps the key at its original position.
    ///
    /// Returns `false` only on an internal fault, never on a duplicate key.
    fn put(&mut self, key: K, value: V) -> bool;

    /// Remove the pair for `key`. Returns true iff something was removed.
    fn remove(&mut self, key: &K) -> bool;

    /// Value stored under `key`, or `None` when the key is absent
    fn get(&self, key: &K) -> Option<&V>;

    /// All keys in insertion order
    fn keys(&self) -> &[K];

    fn contains(&self, key: &K) -> bool;
}

// ============================================================================
// ORDERED MAP
// ============================================================================

/// Two parallel vectors: `keys[i]` maps to `values[i]`
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<K, V> {
    keys: Vec<K>,
    values: Vec<V>,
}

impl<K: PartialEq, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        OrderedMap {
            keys: Vec::new(),
            values: Vec::new(),
        }
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// Mutable access to a stored value (check-in / check-out mutate rooms in place)
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = self.position(key)?;
        self.values.get_mut(idx)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// `(key, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.keys.iter().zip(self.values.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.values.iter()
    }
}

impl<K: PartialEq, V> AssocMap<K, V> for OrderedMap<K, V> {
    fn put(&mut self, key: K, value: V) -> bool {
        if let Some(idx) = self.position(&key) {
            self.values[idx] = value;
            return true;
        }

        // Growing either vector is the only thing that can fail here
        if self.keys.try_reserve(1).is_err() || self.values.try_reserve(1).is_err() {
            return false;
        }

        self.keys.push(key);
        self.values.push(value);
        true
    }

    fn remove(&mut self, key: &K) -> bool {
        match self.position(key) {
            Some(idx) => {
                self.keys.remove(idx);
                self.values.remove(idx);
                true
            }
            None => false,
        }
    }

    fn get(&self, key: &K) -> Option<&V> {
        self.position(key).map(|idx| &self.values[idx])
    }

    fn keys(&self) -> &[K] {
        &self.keys
    }

    fn contains(&self, key: &K) -> bool {
        self.position(key).is_some()
    }
}

impl<K: PartialEq, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PartialEq, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (key, value) in iter {
            map.put(key, value);
        }
        map
    }
}

// ============================================================================
// TESTS
// ============================================================================
