use super::arena::SlotArena;

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    next: Option<usize>,
}

/// Singly linked sequence with a tracked tail.
///
/// Nodes live in a slot arena and link by index. Appending is O(1);
/// removing by value is a single O(n) pass.
#[derive(Debug, Clone)]
pub struct SinglyLinkedSequence<T> {
    nodes: SlotArena<Node<T>>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<T> Default for SinglyLinkedSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SinglyLinkedSequence<T> {
    pub fn new() -> Self {
        Self {
            nodes: SlotArena::new(),
            head: None,
            tail: None,
        }
    }

    pub fn append(&mut self, value: T) {
        let idx = self.nodes.insert(Node { value, next: None });
        match self.tail.and_then(|t| self.nodes.get_mut(t)) {
            Some(tail) => tail.next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            cur: self.head,
        }
    }
}

impl<T: PartialEq> SinglyLinkedSequence<T> {
    /// Remove the first element equal to `value`. Later equal elements are left alone.
    pub fn remove(&mut self, value: &T) -> bool {
        let mut prev: Option<usize> = None;
        let mut cur = self.head;
        while let Some(idx) = cur {
            let Some(node) = self.nodes.get(idx) else {
                break;
            };
            let next = node.next;
            if node.value != *value {
                prev = cur;
                cur = next;
                continue;
            }

            match prev.and_then(|p| self.nodes.get_mut(p)) {
                Some(p) => p.next = next,
                None => self.head = next,
            }
            if self.tail == Some(idx) {
                self.tail = prev;
            }
            self.nodes.remove(idx);
            return true;
        }
        false
    }

    pub fn contains(&self, value: &T) -> bool {
        self.iter().any(|v| v == value)
    }
}

pub struct Iter<'a, T> {
    nodes: &'a SlotArena<Node<T>>,
    cur: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.cur?)?;
        self.cur = node.next;
        Some(&node.value)
    }
}

impl<'a, T> IntoIterator for &'a SinglyLinkedSequence<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> FromIterator<T> for SinglyLinkedSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut seq = SinglyLinkedSequence::new();
        for value in iter {
            seq.append(value);
        }
        seq
    }
}
