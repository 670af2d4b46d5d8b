use crate::error::{Error, Result};

use super::arena::SlotArena;

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    next: Option<usize>,
}

/// Singly linked FIFO. Every operation is O(1).
#[derive(Debug, Clone)]
pub struct FifoQueue<T> {
    nodes: SlotArena<Node<T>>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<T> Default for FifoQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FifoQueue<T> {
    pub fn new() -> Self {
        Self {
            nodes: SlotArena::new(),
            head: None,
            tail: None,
        }
    }

    pub fn enqueue(&mut self, value: T) {
        let idx = self.nodes.insert(Node { value, next: None });
        match self.tail.and_then(|t| self.nodes.get_mut(t)) {
            Some(tail) => tail.next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }

    pub fn dequeue(&mut self) -> Result<T> {
        let idx = self.head.ok_or(Error::EmptyStructure)?;
        let node = self.nodes.remove(idx).ok_or(Error::EmptyStructure)?;
        self.head = node.next;
        if self.head.is_none() {
            self.tail = None;
        }
        Ok(node.value)
    }

    pub fn peek(&self) -> Result<&T> {
        self.head
            .and_then(|idx| self.nodes.get(idx))
            .map(|node| &node.value)
            .ok_or(Error::EmptyStructure)
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_in_first_out() {
        let mut waitlist = FifoQueue::new();
        waitlist.enqueue("s1001");
        waitlist.enqueue("s1002");
        waitlist.enqueue("s1003");
        assert_eq!(waitlist.len(), 3);
        assert_eq!(waitlist.peek(), Ok(&"s1001"));
        assert_eq!(waitlist.dequeue(), Ok("s1001"));
        assert_eq!(waitlist.dequeue(), Ok("s1002"));
        waitlist.enqueue("s1004");
        assert_eq!(waitlist.dequeue(), Ok("s1003"));
        assert_eq!(waitlist.dequeue(), Ok("s1004"));
        assert!(waitlist.is_empty());
    }

    #[test]
    fn empty_queue_reports_empty_structure() {
        let mut q: FifoQueue<u32> = FifoQueue::new();
        assert_eq!(q.peek(), Err(Error::EmptyStructure));
        assert_eq!(q.dequeue(), Err(Error::EmptyStructure));
        q.enqueue(7);
        assert_eq!(q.dequeue(), Ok(7));
        assert_eq!(q.dequeue(), Err(Error::EmptyStructure));
        assert_eq!(q.len(), 0);
    }

    #[test]
    fn drained_queue_accepts_new_items() {
        let mut q = FifoQueue::new();
        q.enqueue(1);
        q.dequeue().unwrap();
        q.enqueue(2);
        q.enqueue(3);
        assert_eq!(q.peek(), Ok(&2));
        assert_eq!(q.dequeue(), Ok(2));
        assert_eq!(q.dequeue(), Ok(3));
    }
}
