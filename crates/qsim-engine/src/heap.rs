//! Indexed binary min-heap over [`PendingWait`] fire times.
//!
//! Plain `BinaryHeap` has no way to remove an arbitrary element, which is
//! exactly what a `Linked` wait needs when its queue side fires first: the
//! timer side must be pulled out of the heap without waiting for it to
//! surface on its own. Each entry carries its own heap slot index
//! (`heap_index`), updated on every swap, so removal-by-handle is O(log n)
//! instead of a linear scan.

use crate::event::WaitHandle;

#[derive(Default)]
pub struct TimerHeap {
    entries: Vec<WaitHandle>,
}

impl TimerHeap {
    pub fn new() -> Self {
        TimerHeap {
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn peek_min_time(&self) -> Option<f64> {
        self.entries.first().and_then(|e| e.fire_time)
    }

    /// Insert a timed wait. `entry.fire_time` must be `Some`.
    pub fn push(&mut self, entry: WaitHandle) {
        debug_assert!(
            entry.fire_time.is_some(),
            "only timed waits belong in the heap"
        );
        let idx = self.entries.len();
        entry.heap_index.set(Some(idx));
        self.entries.push(entry);
        self.sift_up(idx);
    }

    /// Remove and return the entry with the smallest `fire_time`.
    pub fn pop_min(&mut self) -> Option<WaitHandle> {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        self.swap(0, last);
        let min = self.entries.pop().expect("checked non-empty above");
        min.heap_index.set(None);
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some(min)
    }

    /// Remove a specific entry by its recorded heap slot. A no-op if the
    /// entry is no longer in the heap (already popped).
    pub fn remove(&mut self, entry: &WaitHandle) {
        let Some(idx) = entry.heap_index.get() else {
            return;
        };
        let last = self.entries.len() - 1;
        if idx != last {
            self.swap(idx, last);
        }
        self.entries.pop();
        entry.heap_index.set(None);
        if idx < self.entries.len() {
            self.sift_down(idx);
            self.sift_up(idx);
        }
    }

    fn time_at(&self, i: usize) -> f64 {
        self.entries[i]
            .fire_time
            .expect("heap entry without a fire_time")
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.entries.swap(i, j);
        self.entries[i].heap_index.set(Some(i));
        self.entries[j].heap_index.set(Some(j));
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.time_at(i) < self.time_at(parent) {
                self.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        loop {
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            let mut smallest = i;
            if left < self.entries.len() && self.time_at(left) < self.time_at(smallest) {
                smallest = left;
            }
            if right < self.entries.len() && self.time_at(right) < self.time_at(smallest) {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.swap(i, smallest);
            i = smallest;
        }
    }
}
