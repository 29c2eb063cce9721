//! Binary min-heap priority queue keyed by an external `f32` priority.

use crate::errors::{BulwarkError, Result};

/// Min-heap of items with caller-supplied priorities. Ties are broken by
/// heap order, not insertion order. Iteration yields items in heap order,
/// which is ascending-priority only in the repeated-dequeue sense.
#[derive(Debug, Clone, Default)]
pub struct PriorityQueue<T> {
    heap: Vec<(f32, T)>,
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self { heap: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn enqueue(&mut self, item: T, priority: f32) {
        self.heap.push((priority, item));
        self.sift_up(self.heap.len() - 1);
    }

    /// Lowest-priority item without removing it.
    pub fn peek(&self) -> Result<&T> {
        self.heap
            .first()
            .map(|(_, item)| item)
            .ok_or_else(|| BulwarkError::InvalidOperation("peek on empty queue".into()))
    }

    /// Remove and return the lowest-priority item.
    pub fn dequeue(&mut self) -> Result<T> {
        if self.heap.is_empty() {
            return Err(BulwarkError::InvalidOperation(
                "dequeue on empty queue".into(),
            ));
        }
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let (_, item) = self.heap.pop().expect("checked non-empty");
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Ok(item)
    }

    /// Items in heap order (root first).
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.heap.iter().map(|(_, item)| item)
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.heap[index].0 < self.heap[parent].0 {
                self.heap.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;
            if left < len && self.heap[left].0 < self.heap[smallest].0 {
                smallest = left;
            }
            if right < len && self.heap[right].0 < self.heap[smallest].0 {
                smallest = right;
            }
            if smallest == index {
                break;
            }
            self.heap.swap(index, smallest);
            index = smallest;
        }
    }
}
