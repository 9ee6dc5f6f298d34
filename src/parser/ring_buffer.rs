//! Growable ring buffer backing the token lookahead.
//!
//! Appends and front pops are amortized O(1), indexing is O(1). When the
//! buffer is full it doubles its backing storage and moves the live region
//! (which may wrap past the end of the old storage) to the start of the new
//! one. Insertion in the middle shifts elements and is O(n).

use std::fmt::Debug;

const INITIAL_CAPACITY: usize = 8;

pub struct RingBuffer<T> {
    slots: Vec<Option<T>>,
    head: usize,
    len: usize,
}

impl<T> RingBuffer<T> {
    pub fn new() -> Self {
        RingBuffer::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        RingBuffer {
            slots: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, index: usize) -> usize {
        (self.head + index) % self.slots.len()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        self.slots[self.slot(index)].as_ref()
    }

    pub fn push_back(&mut self, value: T) {
        if self.len == self.slots.len() {
            self.grow();
        }
        let slot = self.slot(self.len);
        self.slots[slot] = Some(value);
        self.len += 1;
    }

    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let value = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.len -= 1;
        value
    }

    /// Inserts `value` so that it ends up at `index`, shifting everything
    /// from `index` on one place towards the back.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) {
        assert!(index <= self.len, "insert index {} out of bounds (len {})", index, self.len);

        if self.len == self.slots.len() {
            self.grow();
        }

        let mut position = self.len;
        while position > index {
            let from = self.slot(position - 1);
            let to = self.slot(position);
            self.slots[to] = self.slots[from].take();
            position -= 1;
        }

        let slot = self.slot(index);
        self.slots[slot] = Some(value);
        self.len += 1;
    }

    /// Doubles the storage. The live region is copied in order, so a region
    /// that wrapped around the end of the old storage is laid out
    /// contiguously from slot 0 of the new one.
    fn grow(&mut self) {
        let new_capacity = self.slots.len() * 2;
        let mut slots: Vec<Option<T>> = (0..new_capacity).map(|_| None).collect();

        for (index, slot) in slots.iter_mut().enumerate().take(self.len) {
            let old = (self.head + index) % self.slots.len();
            *slot = self.slots[old].take();
        }

        self.slots = slots;
        self.head = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).filter_map(move |index| self.get(index))
    }
}

impl<T> Default for RingBuffer<T> {
    fn default() -> Self {
        RingBuffer::new()
    }
}

impl<T: Debug> Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::RingBuffer;

    #[test]
    fn test_push_pop_in_order() {
        let mut buffer = RingBuffer::with_capacity(2);
        buffer.push_back(1);
        buffer.push_back(2);
        buffer.push_back(3);

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.pop_front(), Some(1));
        assert_eq!(buffer.pop_front(), Some(2));
        assert_eq!(buffer.pop_front(), Some(3));
        assert_eq!(buffer.pop_front(), None);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_growth_relocates_wrapped_region() {
        let mut buffer = RingBuffer::with_capacity(4);
        for value in 0..4 {
            buffer.push_back(value);
        }
        // Move the head forward so the live region wraps.
        assert_eq!(buffer.pop_front(), Some(0));
        assert_eq!(buffer.pop_front(), Some(1));
        buffer.push_back(4);
        buffer.push_back(5);
        assert_eq!(buffer.capacity(), 4);

        buffer.push_back(6);

        assert_eq!(buffer.capacity(), 8);
        let contents: Vec<i32> = buffer.iter().copied().collect();
        assert_eq!(contents, vec![2, 3, 4, 5, 6]);
        assert_eq!(buffer.get(0), Some(&2));
        assert_eq!(buffer.get(4), Some(&6));
        assert_eq!(buffer.get(5), None);
    }

    #[test]
    fn test_insert_into_full_wrapped_buffer() {
        let mut buffer = RingBuffer::with_capacity(4);
        for value in 0..4 {
            buffer.push_back(value);
        }
        buffer.pop_front();
        buffer.push_back(4);

        buffer.insert(2, 99);

        let contents: Vec<i32> = buffer.iter().copied().collect();
        assert_eq!(contents, vec![1, 2, 99, 3, 4]);
    }

    /// Small deterministic generator so the sequence is reproducible.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            self.0 >> 33
        }
    }

    #[test]
    fn test_matches_reference_queue() {
        let mut rng = Lcg(0x5eed);
        let mut buffer = RingBuffer::with_capacity(1);
        let mut reference = VecDeque::new();
        let mut grew = false;

        for step in 0..5000u64 {
            let before = buffer.capacity();
            match rng.next() % 10 {
                0..=4 => {
                    buffer.push_back(step);
                    reference.push_back(step);
                }
                5..=7 => assert_eq!(buffer.pop_front(), reference.pop_front()),
                8 => {
                    let index = (rng.next() as usize) % (reference.len() + 1);
                    buffer.insert(index, step);
                    reference.insert(index, step);
                }
                _ => {
                    let index = (rng.next() as usize) % (reference.len() + 2);
                    assert_eq!(buffer.get(index), reference.get(index));
                }
            }
            grew |= buffer.capacity() > before;
            assert_eq!(buffer.len(), reference.len());
        }

        assert!(grew);
        assert!(buffer.iter().eq(reference.iter()));
    }
}
