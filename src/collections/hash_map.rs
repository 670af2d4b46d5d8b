use std::borrow::Borrow;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const INITIAL_BUCKETS: usize = 16;

/// Resize once `len / buckets` exceeds 3/4.
const LOAD_FACTOR_NUM: usize = 3;
const LOAD_FACTOR_DEN: usize = 4;

/// Hash map resolving collisions by separate chaining.
///
/// Each bucket owns a small vector of entries, newest first. After an
/// insertion pushes the load factor above 0.75 the bucket array doubles and
/// every entry is reinserted with the same insertion routine.
///
/// `get` returns `Option<&V>`, so a present entry whose value is itself
/// "empty" (`V = Option<_>`, say) is never confused with a missing key.
/// `contains_key` walks the chain instead of going through `get`.
#[derive(Debug, Clone)]
pub struct ChainedHashMap<K, V> {
    buckets: Vec<Vec<(K, V)>>,
    len: usize,
}

impl<K: Hash + Eq, V> Default for ChainedHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

fn bucket_index<Q: Hash + ?Sized>(key: &Q, bucket_count: usize) -> usize {
    let mut h = DefaultHasher::new();
    key.hash(&mut h);
    (h.finish() % bucket_count as u64) as usize
}

fn new_buckets<K, V>(count: usize) -> Vec<Vec<(K, V)>> {
    std::iter::repeat_with(Vec::new).take(count).collect()
}

/// Overwrite in place or prepend. Returns the displaced value on overwrite.
fn insert_into<K: Hash + Eq, V>(buckets: &mut [Vec<(K, V)>], key: K, value: V) -> Option<V> {
    let idx = bucket_index(&key, buckets.len());
    let chain = &mut buckets[idx];
    if let Some(entry) = chain.iter_mut().find(|(k, _)| *k == key) {
        return Some(std::mem::replace(&mut entry.1, value));
    }
    chain.insert(0, (key, value));
    None
}

impl<K: Hash + Eq, V> ChainedHashMap<K, V> {
    pub fn new() -> Self {
        Self {
            buckets: new_buckets(INITIAL_BUCKETS),
            len: 0,
        }
    }

    /// Insert or overwrite. Returns the previous value for `key`, if any.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let old = insert_into(&mut self.buckets, key, value);
        if old.is_none() {
            self.len += 1;
            if self.len * LOAD_FACTOR_DEN > self.buckets.len() * LOAD_FACTOR_NUM {
                self.resize();
            }
        }
        old
    }

    fn resize(&mut self) {
        let doubled = self.buckets.len() * 2;
        let old = std::mem::replace(&mut self.buckets, new_buckets(doubled));
        for (k, v) in old.into_iter().flatten() {
            insert_into(&mut self.buckets, k, v);
        }
        tracing::trace!(buckets = self.buckets.len(), len = self.len, "hash map resized");
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = bucket_index(key, self.buckets.len());
        self.buckets[idx]
            .iter()
            .find(|(k, _)| Borrow::<Q>::borrow(k) == key)
            .map(|(_, v)| v)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = bucket_index(key, self.buckets.len());
        self.buckets[idx]
            .iter_mut()
            .find(|(k, _)| Borrow::<Q>::borrow(k) == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = bucket_index(key, self.buckets.len());
        self.buckets[idx].iter().any(|(k, _)| Borrow::<Q>::borrow(k) == key)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = bucket_index(key, self.buckets.len());
        let chain = &mut self.buckets[idx];
        let pos = chain.iter().position(|(k, _)| Borrow::<Q>::borrow(k) == key)?;
        self.len -= 1;
        Some(chain.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Entries in bucket order. The order is not meaningful.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.buckets.iter().flatten().map(|(k, v)| (k, v))
    }
}
