use crate::error::{Error, Result};

const INITIAL_CAPACITY: usize = 10;

/// Random-access container with amortized O(1) append.
///
/// Capacity starts at 10 and doubles whenever an append would exceed it.
/// It never shrinks. `capacity()` reports this logical capacity, which is
/// what the doubling policy is defined against.
#[derive(Debug, Clone)]
pub struct GrowableArray<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> Default for GrowableArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> GrowableArray<T> {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn add(&mut self, value: T) {
        if self.items.len() == self.capacity {
            self.capacity *= 2;
            self.items.reserve_exact(self.capacity - self.items.len());
        }
        self.items.push(value);
    }

    pub fn get(&self, index: usize) -> Result<&T> {
        self.items.get(index).ok_or(Error::Bounds {
            index,
            len: self.items.len(),
        })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.items.len();
        self.items.get_mut(index).ok_or(Error::Bounds { index, len })
    }

    /// Replace the value at `index`, returning the old one.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        let slot = self.get_mut(index)?;
        Ok(std::mem::replace(slot, value))
    }

    /// Remove the value at `index`, shifting everything after it left by one.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        if index >= self.items.len() {
            return Err(Error::Bounds {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
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

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Index of the first element matching `pred`.
    pub fn position(&self, pred: impl FnMut(&T) -> bool) -> Option<usize> {
        self.items.iter().position(pred)
    }
}

impl<T: Clone> GrowableArray<T> {
    /// Independent copy of the current contents.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }
}

impl<'a, T> IntoIterator for &'a GrowableArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> FromIterator<T> for GrowableArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = GrowableArray::new();
        for value in iter {
            array.add(value);
        }
        array
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn capacity_doubles_from_ten() {
        let mut a = GrowableArray::new();
        assert_eq!(a.capacity(), 10);
        for i in 0..10 {
            a.add(i);
        }
        assert_eq!(a.capacity(), 10);
        a.add(10);
        assert_eq!(a.capacity(), 20);
        for i in 11..21 {
            a.add(i);
        }
        assert_eq!(a.capacity(), 40);
        assert_eq!(a.len(), 21);
    }

    #[test]
    fn get_and_set_are_bounds_checked() {
        let mut a: GrowableArray<&str> = ["x", "y"].into_iter().collect();
        assert_eq!(a.get(2), Err(Error::Bounds { index: 2, len: 2 }));
        assert_eq!(a.set(5, "z"), Err(Error::Bounds { index: 5, len: 2 }));
        assert_eq!(a.set(1, "z"), Ok("y"));
        assert_eq!(a.get(1), Ok(&"z"));
    }

    #[test]
    fn bounds_follow_len_not_capacity() {
        let mut a = GrowableArray::new();
        a.add(1);
        // Index 1 is inside the allocated capacity but past the end.
        assert!(a.get(1).is_err());
    }

    #[test]
    fn remove_at_shifts_left() {
        let mut a: GrowableArray<i32> = (0..5).collect();
        assert_eq!(a.remove_at(1), Ok(1));
        assert_eq!(a.as_slice(), &[0, 2, 3, 4]);
        assert_eq!(a.remove_at(3), Ok(4));
        assert_eq!(a.as_slice(), &[0, 2, 3]);
        assert_eq!(a.remove_at(3), Err(Error::Bounds { index: 3, len: 3 }));
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn capacity_never_shrinks() {
        let mut a: GrowableArray<i32> = (0..25).collect();
        let cap = a.capacity();
        while !a.is_empty() {
            a.remove_at(0).unwrap();
        }
        assert_eq!(a.capacity(), cap);
    }

    proptest! {
        #[test]
        fn prop_adds_are_readable_in_order(values in proptest::collection::vec(any::<i64>(), 0..300)) {
            let mut a = GrowableArray::new();
            for v in &values {
                a.add(*v);
            }
            prop_assert_eq!(a.len(), values.len());
            for (i, v) in values.iter().enumerate() {
                prop_assert_eq!(a.get(i), Ok(v));
            }
            prop_assert!(a.capacity() >= a.len());
        }
    }
}
