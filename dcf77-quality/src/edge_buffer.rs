use crate::{time_diff, DEBOUNCE_US, EDGE_BUFFER_SIZE};

/// Ring of debounced input transitions, written only from the edge ISR.
///
/// Each record is the microsecond timestamp of an accepted transition plus
/// the pin level sampled right after it. The level is sampled rather than
/// inferred so that glitch pairs with the same polarity stay visible to the
/// pulse extractor instead of corrupting it. Occupancy saturates at
/// capacity; once full the ring keeps the most recent window.
pub struct EdgeBuffer {
    times: [u32; EDGE_BUFFER_SIZE],
    levels: [u8; EDGE_BUFFER_SIZE],
    head: usize,
    count: usize,
    last_edge_us: Option<u32>,
}

impl EdgeBuffer {
    pub const fn new() -> Self {
        Self {
            times: [0; EDGE_BUFFER_SIZE],
            levels: [0; EDGE_BUFFER_SIZE],
            head: 0,
            count: 0,
            last_edge_us: None,
        }
    }

    /// Records one transition, dropping it when it falls inside the
    /// debounce window of the previously accepted edge.
    ///
    /// A dropped edge does not move the debounce reference, so a burst of
    /// chatter collapses onto its first transition.
    pub fn record(&mut self, now: u32, level: bool) {
        if let Some(last) = self.last_edge_us {
            if time_diff(last, now) < DEBOUNCE_US {
                return;
            }
        }
        self.last_edge_us = Some(now);
        self.times[self.head] = now;
        self.levels[self.head] = level as u8;
        self.head = (self.head + 1) % EDGE_BUFFER_SIZE;
        if self.count < EDGE_BUFFER_SIZE {
            self.count += 1;
        }
    }

    /// Number of records currently retained.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Copies the retained records, oldest first, into the caller's arrays.
    fn copy_into(
        &self,
        times: &mut [u32; EDGE_BUFFER_SIZE],
        levels: &mut [u8; EDGE_BUFFER_SIZE],
    ) -> usize {
        let start = (self.head + EDGE_BUFFER_SIZE - self.count) % EDGE_BUFFER_SIZE;
        for i in 0..self.count {
            let p = (start + i) % EDGE_BUFFER_SIZE;
            times[i] = self.times[p];
            levels[i] = self.levels[p];
        }
        self.count
    }
}

/// Value copy of the edge ring, owned by the analysis loop.
///
/// `capture` must run with the edge interrupt masked; afterwards the
/// snapshot is immutable and the ring advances independently.
pub struct EdgeSnapshot {
    times: [u32; EDGE_BUFFER_SIZE],
    levels: [u8; EDGE_BUFFER_SIZE],
    len: usize,
}

impl EdgeSnapshot {
    pub const fn new() -> Self {
        Self {
            times: [0; EDGE_BUFFER_SIZE],
            levels: [0; EDGE_BUFFER_SIZE],
            len: 0,
        }
    }

    /// Copies the ring's current window and returns the number of records.
    pub fn capture(&mut self, ring: &EdgeBuffer) -> usize {
        self.len = ring.copy_into(&mut self.times, &mut self.levels);
        self.len
    }

    pub fn times(&self) -> &[u32] {
        &self.times[..self.len]
    }

    pub fn levels(&self) -> &[u8] {
        &self.levels[..self.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_of(ring: &EdgeBuffer) -> (Vec<u32>, Vec<u8>) {
        let mut snap = EdgeSnapshot::new();
        snap.capture(ring);
        (snap.times().to_vec(), snap.levels().to_vec())
    }

    #[test]
    fn first_edge_is_always_accepted() {
        let mut ring = EdgeBuffer::new();
        ring.record(5, true);
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn chatter_collapses_onto_its_first_transition() {
        let mut ring = EdgeBuffer::new();
        ring.record(0, false);
        // 10 ms after the accepted edge: dropped, reference stays at 0
        ring.record(10_000, true);
        // 25 ms after the accepted edge: accepted
        ring.record(25_000, true);
        let (times, levels) = snapshot_of(&ring);
        assert_eq!(times, vec![0, 25_000]);
        assert_eq!(levels, vec![0, 1]);
    }

    #[test]
    fn occupancy_saturates_and_keeps_the_newest_window() {
        let mut ring = EdgeBuffer::new();
        for i in 0..(2 * EDGE_BUFFER_SIZE) {
            ring.record(i as u32 * DEBOUNCE_US, (i % 2) == 0);
        }
        assert_eq!(ring.len(), EDGE_BUFFER_SIZE);
        let (times, _) = snapshot_of(&ring);
        assert_eq!(times.len(), EDGE_BUFFER_SIZE);
        assert_eq!(times[0], EDGE_BUFFER_SIZE as u32 * DEBOUNCE_US);
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn debounce_survives_the_counter_wrap() {
        let mut ring = EdgeBuffer::new();
        ring.record(u32::MAX - 5_000, false);
        // 10 ms later in wrapped time: still chatter
        ring.record(5_000, true);
        assert_eq!(ring.len(), 1);
        // 25 ms later: accepted
        ring.record(20_000, true);
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn empty_ring_yields_an_empty_snapshot() {
        let ring = EdgeBuffer::new();
        let mut snap = EdgeSnapshot::new();
        assert_eq!(snap.capture(&ring), 0);
        assert!(snap.times().is_empty());
        assert!(ring.is_empty());
    }
}
