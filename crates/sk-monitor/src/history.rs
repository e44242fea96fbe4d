//! Bounded sample history.

use sk_core::TrajectorySample;

/// Circular buffer holding the most recent samples of one trajectory,
/// addressed by absolute sample index.
///
/// Slot reuse keeps the steady state allocation-free: once a slot has seen a
/// sample of the right dimension, later overwrites copy in place.
#[derive(Debug, Clone)]
pub struct HistoryRing {
    slots: Vec<TrajectorySample>,
}

impl HistoryRing {
    /// Ring with `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "history ring needs at least one slot");
        Self {
            slots: vec![TrajectorySample::from_slice(0.0, &[]); capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Store the sample with absolute index `k`, overwriting whatever aged
    /// out of that slot.
    pub fn put(&mut self, k: u64, sample: &TrajectorySample) {
        let i = (k % self.slots.len() as u64) as usize;
        self.slots[i].assign_from(sample);
    }

    /// Sample with absolute index `k`. Only the most recent `capacity`
    /// indices are meaningful; older ones alias newer slots.
    pub fn get(&self, k: u64) -> &TrajectorySample {
        &self.slots[(k % self.slots.len() as u64) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retains_last_capacity_samples() {
        let mut ring = HistoryRing::new(3);
        for k in 0..7_u64 {
            ring.put(k, &TrajectorySample::from_slice(k as f64, &[k as f64]));
        }
        for k in 4..7_u64 {
            assert_eq!(ring.get(k).time, k as f64);
        }
        // Index 3 aliases index 6 in a 3-slot ring.
        assert_eq!(ring.get(3).time, 6.0);
    }

    #[test]
    fn overwrite_reuses_slot_allocation() {
        let mut ring = HistoryRing::new(2);
        ring.put(0, &TrajectorySample::from_slice(0.0, &[1.0, 2.0]));
        let ptr = ring.get(0).coords.as_slice().as_ptr();
        ring.put(2, &TrajectorySample::from_slice(2.0, &[3.0, 4.0]));
        assert_eq!(ring.get(2).coords.as_slice(), &[3.0, 4.0]);
        assert_eq!(ring.get(2).coords.as_slice().as_ptr(), ptr);
    }
}
