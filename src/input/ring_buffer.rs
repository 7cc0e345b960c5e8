/// Fixed-capacity sequence container with overwrite-on-full semantics.
///
/// Elements are kept oldest to newest. Pushing into a full buffer
/// overwrites the oldest element; the order of survivors never changes.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Vec<Option<T>>,
    /// Slot index of the oldest element.
    start: usize,
    /// Number of live elements.
    count: usize,
}

impl<T> RingBuffer<T> {
    /// Create an empty buffer holding at most `capacity` elements.
    /// Returns `None` for a zero capacity.
    pub fn try_new(capacity: usize) -> Option<Self> {
        if capacity == 0 {
            return None;
        }
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Some(Self {
            slots,
            start: 0,
            count: 0,
        })
    }

    /// Like [`try_new`](Self::try_new) for capacities known to be non-zero.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Some(buffer) => buffer,
            None => panic!("ring buffer capacity must be at least 1"),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Append an element. Returns the overwritten oldest element when full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let capacity = self.capacity();
        if self.count < capacity {
            let idx = (self.start + self.count) % capacity;
            self.slots[idx] = Some(item);
            self.count += 1;
            None
        } else {
            let evicted = self.slots[self.start].replace(item);
            self.start = (self.start + 1) % capacity;
            evicted
        }
    }

    /// Remove and return the oldest element.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let item = self.slots[self.start].take();
        self.start = (self.start + 1) % self.capacity();
        self.count -= 1;
        item
    }

    /// Remove and return the newest element.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let idx = self.physical(self.count - 1);
        self.count -= 1;
        self.slots[idx].take()
    }

    /// Oldest element, if any.
    pub fn peek_front(&self) -> Option<&T> {
        if self.count == 0 {
            return None;
        }
        self.slots[self.start].as_ref()
    }

    /// Newest element, if any.
    pub fn peek_back(&self) -> Option<&T> {
        if self.count == 0 {
            return None;
        }
        self.slots[self.physical(self.count - 1)].as_ref()
    }

    /// Element at logical position `index` (0 = oldest).
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.count {
            return None;
        }
        self.slots[self.physical(index)].as_ref()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        (0..self.count).filter_map(move |i| self.slots[self.physical(i)].as_ref())
    }

    /// Drop every element and rewind the start index.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.start = 0;
        self.count = 0;
    }

    fn physical(&self, logical: usize) -> usize {
        (self.start + logical) % self.capacity()
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Owned snapshot, oldest first. Mutating the result does not touch the buffer.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    /// Owned copy of the newest `n` elements, oldest first.
    pub fn tail(&self, n: usize) -> Vec<T> {
        let n = n.min(self.count);
        self.iter().skip(self.count - n).cloned().collect()
    }
}
