use super::sample::OrderedSample;
use crate::Time;

const FREE: usize = usize::MAX;

/// stable reference to a heap entry, valid until that entry is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle(usize);

/// binary min-heap of pending firings with external handles.
///
/// push, pop, update-by-handle, and delete-by-handle are O(log n);
/// peeking the minimum is O(1). handles are recycled after removal, so
/// holding a stale one is a logic error on the caller's side.
#[derive(Debug, Clone, Default)]
pub struct FiringQueue<K> {
    heap: Vec<OrderedSample<K>>,
    owner: Vec<usize>, // heap position -> handle id
    slot: Vec<usize>,  // handle id -> heap position, FREE when retired
    free: Vec<usize>,
}

impl<K> FiringQueue<K> {
    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            owner: Vec::new(),
            slot: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn peek(&self) -> Option<&OrderedSample<K>> {
        self.heap.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrderedSample<K>> {
        self.heap.iter()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.owner.clear();
        self.slot.clear();
        self.free.clear();
    }

    pub fn push(&mut self, sample: OrderedSample<K>) -> Handle {
        let id = match self.free.pop() {
            Some(id) => id,
            None => {
                self.slot.push(FREE);
                self.slot.len() - 1
            }
        };
        let position = self.heap.len();
        self.heap.push(sample);
        self.owner.push(id);
        self.slot[id] = position;
        self.sift_up(position);
        Handle(id)
    }

    pub fn pop(&mut self) -> Option<OrderedSample<K>> {
        if self.heap.is_empty() {
            None
        } else {
            Some(self.remove_at(0))
        }
    }

    pub fn update(&mut self, handle: Handle, time: Time) {
        let position = self.slot[handle.0];
        assert!(position != FREE, "update through a retired handle");
        self.heap[position].time = time;
        self.sift_up(position);
        self.sift_down(position);
    }

    pub fn remove(&mut self, handle: Handle) -> OrderedSample<K> {
        let position = self.slot[handle.0];
        assert!(position != FREE, "remove through a retired handle");
        self.remove_at(position)
    }

    fn remove_at(&mut self, position: usize) -> OrderedSample<K> {
        let last = self.heap.len() - 1;
        self.swap(position, last);
        let sample = self.heap.pop().expect("nonempty by construction");
        let id = self.owner.pop().expect("owner tracks heap");
        self.slot[id] = FREE;
        self.free.push(id);
        if position < self.heap.len() {
            self.sift_up(position);
            self.sift_down(position);
        }
        sample
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a != b {
            self.heap.swap(a, b);
            self.owner.swap(a, b);
            self.slot[self.owner[a]] = a;
            self.slot[self.owner[b]] = b;
        }
    }

    fn sift_up(&mut self, mut position: usize) {
        while position > 0 {
            let parent = (position - 1) / 2;
            if self.heap[position].time < self.heap[parent].time {
                self.swap(position, parent);
                position = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut position: usize) {
        loop {
            let left = 2 * position + 1;
            let right = left + 1;
            let mut least = position;
            if left < self.heap.len() && self.heap[left].time < self.heap[least].time {
                least = left;
            }
            if right < self.heap.len() && self.heap[right].time < self.heap[least].time {
                least = right;
            }
            if least == position {
                break;
            }
            self.swap(position, least);
            position = least;
        }
    }
}
