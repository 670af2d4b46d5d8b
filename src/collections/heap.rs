use std::cmp::Ordering;

use crate::error::{Error, Result};

const INITIAL_CAPACITY: usize = 16;

// 0-based binary tree navigation.
#[inline(always)]
fn parent(i: usize) -> usize {
    (i - 1) / 2
}

#[inline(always)]
fn left(i: usize) -> usize {
    2 * i + 1
}

#[inline(always)]
fn right(i: usize) -> usize {
    2 * i + 2
}

/// Array-backed binary max-heap ordered by an injected comparator.
///
/// The comparator is the only source of ordering: `cmp(a, b) == Greater`
/// means `a` leaves the heap before `b`. If the comparator is not a total,
/// antisymmetric order the heap stays well-formed but extraction yields just
/// one of the admissible orders.
pub struct MaxHeap<T, C = fn(&T, &T) -> Ordering> {
    data: Vec<T>,
    cmp: C,
}

impl<T: std::fmt::Debug, C> std::fmt::Debug for MaxHeap<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaxHeap").field("data", &self.data).finish()
    }
}

impl<T, C> MaxHeap<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    pub fn new(cmp: C) -> Self {
        Self {
            data: Vec::with_capacity(INITIAL_CAPACITY),
            cmp,
        }
    }

    fn above(&self, a: usize, b: usize) -> bool {
        (self.cmp)(&self.data[a], &self.data[b]) == Ordering::Greater
    }

    pub fn insert(&mut self, value: T) {
        self.data.push(value);
        self.sift_up(self.data.len() - 1);
    }

    pub fn extract_max(&mut self) -> Result<T> {
        if self.data.is_empty() {
            return Err(Error::EmptyStructure);
        }
        let root = self.data.swap_remove(0);
        if !self.data.is_empty() {
            self.sift_down(0);
        }
        Ok(root)
    }

    pub fn peek(&self) -> Result<&T> {
        self.data.first().ok_or(Error::EmptyStructure)
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let p = parent(i);
            if !self.above(i, p) {
                break;
            }
            self.data.swap(i, p);
            i = p;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.data.len();
        loop {
            let l = left(i);
            if l >= len {
                break;
            }
            let r = right(i);
            let child = if r < len && self.above(r, l) { r } else { l };
            if !self.above(child, i) {
                break;
            }
            self.data.swap(i, child);
            i = child;
        }
    }

    /// Drain by repeated extraction. The result is non-increasing under the comparator.
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.data.len());
        while let Ok(value) = self.extract_max() {
            out.push(value);
        }
        out
    }
}

impl<T, C> MaxHeap<T, C> {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Backing storage order, which is not priority order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }
}

/// Rank `items` from highest to lowest by pushing them through a heap.
pub fn sort_by_extraction<T, C>(items: impl IntoIterator<Item = T>, cmp: C) -> Vec<T>
where
    C: Fn(&T, &T) -> Ordering,
{
    let mut heap = MaxHeap::new(cmp);
    for item in items {
        heap.insert(item);
    }
    heap.into_sorted_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn by_value(a: &i32, b: &i32) -> Ordering {
        a.cmp(b)
    }

    fn assert_heap_property<T, C: Fn(&T, &T) -> Ordering>(heap: &MaxHeap<T, C>) {
        for i in 1..heap.len() {
            assert_ne!(
                (heap.cmp)(&heap.data[parent(i)], &heap.data[i]),
                Ordering::Less,
                "slot {i} orders above its parent"
            );
        }
    }

    #[test]
    fn extracts_largest_first() {
        let mut heap = MaxHeap::new(by_value as fn(&i32, &i32) -> Ordering);
        for v in [5, 1, 9, 3, 7] {
            heap.insert(v);
            assert_heap_property(&heap);
        }
        assert_eq!(heap.peek(), Ok(&9));
        assert_eq!(heap.extract_max(), Ok(9));
        assert_heap_property(&heap);
        assert_eq!(heap.into_sorted_vec(), vec![7, 5, 3, 1]);
    }

    #[test]
    fn empty_heap() {
        let mut heap = MaxHeap::new(by_value as fn(&i32, &i32) -> Ordering);
        assert_eq!(heap.peek(), Err(Error::EmptyStructure));
        assert_eq!(heap.extract_max(), Err(Error::EmptyStructure));
        heap.insert(1);
        assert_eq!(heap.extract_max(), Ok(1));
        assert!(heap.is_empty());
    }

    #[test]
    fn comparator_decides_direction() {
        let smallest_first = sort_by_extraction([4, 2, 8, 6], |a: &i32, b: &i32| b.cmp(a));
        assert_eq!(smallest_first, vec![2, 4, 6, 8]);
    }

    #[test]
    fn rank_by_metric() {
        // Courses ranked by enrolment count.
        let courses = [("CS101", 120u32), ("MA201", 45), ("PH110", 80)];
        let ranked = sort_by_extraction(courses, |a, b| a.1.cmp(&b.1));
        let names: Vec<_> = ranked.iter().map(|c| c.0).collect();
        assert_eq!(names, ["CS101", "PH110", "MA201"]);
    }

    #[test]
    fn peek_does_not_mutate() {
        let mut heap = MaxHeap::new(by_value as fn(&i32, &i32) -> Ordering);
        heap.insert(2);
        heap.insert(3);
        let before = heap.as_slice().to_vec();
        assert_eq!(heap.peek(), Ok(&3));
        assert_eq!(heap.as_slice(), before.as_slice());
        assert_eq!(heap.len(), 2);
    }

    #[test]
    fn equal_keys_still_drain_completely() {
        // Compare on the first field only so distinct elements tie.
        let mut heap = MaxHeap::new(|a: &(u8, char), b: &(u8, char)| a.0.cmp(&b.0));
        for item in [(1, 'a'), (2, 'b'), (1, 'c'), (2, 'd')] {
            heap.insert(item);
        }
        let out = heap.into_sorted_vec();
        assert_eq!(out.len(), 4);
        assert!(out[..2].iter().all(|x| x.0 == 2));
        assert!(out[2..].iter().all(|x| x.0 == 1));
    }

    proptest! {
        #[test]
        fn prop_extraction_is_non_increasing(values in proptest::collection::vec(any::<i32>(), 0..200)) {
            let mut heap = MaxHeap::new(by_value as fn(&i32, &i32) -> Ordering);
            for v in &values {
                heap.insert(*v);
            }
            let out = heap.into_sorted_vec();
            prop_assert_eq!(out.len(), values.len());
            for pair in out.windows(2) {
                prop_assert!(pair[0] >= pair[1]);
            }
        }
    }
}
