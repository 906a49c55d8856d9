//! Array-backed binary heap with a pluggable orientation.
//!
//! The same sift-up/sift-down logic serves both the generic max-heap and the
//! min-oriented open list used by A*. Orientation is selected with a marker
//! type ([`MaxFirst`] or [`MinFirst`]) so the comparison direction is fixed at
//! compile time.

use crate::error::{Error, Result};

use std::fmt;
use std::marker::PhantomData;

/// Decides which of two elements belongs closer to the root.
pub trait HeapOrder {
    fn outranks<T: Ord>(a: &T, b: &T) -> bool;
}

/// Largest element at the root.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxFirst;

/// Smallest element at the root.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinFirst;

impl HeapOrder for MaxFirst {
    fn outranks<T: Ord>(a: &T, b: &T) -> bool {
        a > b
    }
}

impl HeapOrder for MinFirst {
    fn outranks<T: Ord>(a: &T, b: &T) -> bool {
        a < b
    }
}

pub struct Heap<T, O = MaxFirst> {
    items: Vec<T>,
    _order: PhantomData<O>,
}

pub type MaxHeap<T> = Heap<T, MaxFirst>;
pub type MinHeap<T> = Heap<T, MinFirst>;

impl<T: Ord, O: HeapOrder> Heap<T, O> {
    pub fn new() -> Self {
        Heap {
            items: Vec::new(),
            _order: PhantomData,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Heap {
            items: Vec::with_capacity(capacity),
            _order: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Elements in storage order, not priority order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn insert(&mut self, item: T) {
        self.items.push(item);
        self.sift_up(self.items.len() - 1);
    }

    pub fn peek(&self) -> Result<&T> {
        self.items.first().ok_or(Error::EmptyContainer)
    }

    pub fn extract(&mut self) -> Result<T> {
        if self.items.is_empty() {
            return Err(Error::EmptyContainer);
        }
        // swap_remove moves the last element into the root slot.
        let top = self.items.swap_remove(0);
        self.heapify(0);
        Ok(top)
    }

    /// Linear membership scan.
    pub fn contains(&self, item: &T) -> bool {
        self.items.iter().any(|existing| existing == item)
    }

    /// Checks the heap property for the subtree rooted at `index`.
    pub fn is_heap(&self, index: usize) -> bool {
        let len = self.items.len();
        if index >= len {
            return true;
        }
        let parent = &self.items[index];
        for child in [2 * index + 1, 2 * index + 2] {
            if child < len && O::outranks(&self.items[child], parent) {
                return false;
            }
        }
        self.is_heap(2 * index + 1) && self.is_heap(2 * index + 2)
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !O::outranks(&self.items[index], &self.items[parent]) {
                break;
            }
            self.items.swap(index, parent);
            index = parent;
        }
    }

    fn heapify(&mut self, mut index: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut best = index;
            if left < len && O::outranks(&self.items[left], &self.items[best]) {
                best = left;
            }
            if right < len && O::outranks(&self.items[right], &self.items[best]) {
                best = right;
            }
            if best == index {
                return;
            }
            self.items.swap(index, best);
            index = best;
        }
    }
}

impl<T: Ord, O: HeapOrder> Default for Heap<T, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, O> Clone for Heap<T, O> {
    fn clone(&self) -> Self {
        Heap {
            items: self.items.clone(),
            _order: PhantomData,
        }
    }
}

impl<T: fmt::Debug, O> fmt::Debug for Heap<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T: Ord, O: HeapOrder> FromIterator<T> for Heap<T, O> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut heap = Heap::new();
        for item in iter {
            heap.insert(item);
        }
        heap
    }
}
