// Window buffer - Bounded FIFO of recent parsed samples
use crate::domain::reading::ParsedSample;
use crate::domain::snapshot::SamplePoint;
use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 50;

#[derive(Debug, Clone)]
pub struct WindowBuffer {
    entries: VecDeque<SamplePoint>,
    capacity: usize,
}

impl Default for WindowBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl WindowBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Add a sample at the tail, evicting the oldest entry once over capacity.
    /// Returns false (and leaves the buffer alone) if `index` does not follow
    /// the last stored index.
    pub fn append(&mut self, index: u64, sample: ParsedSample) -> bool {
        if let Some(last) = self.entries.back() {
            if index <= last.index {
                tracing::warn!(
                    "Rejecting sample {}: index must follow {}",
                    index,
                    last.index
                );
                return false;
            }
        }

        self.entries.push_back(SamplePoint::new(index, sample));
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        true
    }

    pub fn snapshot(&self) -> Vec<SamplePoint> {
        self.entries.iter().copied().collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(rsrp: f64) -> ParsedSample {
        ParsedSample {
            rsrp: Some(rsrp),
            ..Default::default()
        }
    }

    #[test]
    fn test_evicts_oldest_over_capacity() {
        let mut buffer = WindowBuffer::new(5);
        for index in 1..=12 {
            assert!(buffer.append(index, sample(-(index as f64))));
            assert!(buffer.len() <= 5);
        }

        let indices: Vec<u64> = buffer.snapshot().iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![8, 9, 10, 11, 12]);
    }

    #[test]
    fn test_default_capacity() {
        let mut buffer = WindowBuffer::default();
        for index in 1..=60 {
            buffer.append(index, ParsedSample::default());
        }
        assert_eq!(buffer.len(), 50);
        assert_eq!(buffer.snapshot()[0].index, 11);
    }

    #[test]
    fn test_rejects_non_increasing_index() {
        let mut buffer = WindowBuffer::new(3);
        assert!(buffer.append(4, sample(-100.0)));
        assert!(!buffer.append(4, sample(-101.0)));
        assert!(!buffer.append(2, sample(-102.0)));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_snapshot_does_not_mutate() {
        let mut buffer = WindowBuffer::new(3);
        buffer.append(1, sample(-100.0));
        buffer.append(2, sample(-105.0));

        assert_eq!(buffer.snapshot(), buffer.snapshot());
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut buffer = WindowBuffer::new(0);
        buffer.append(1, sample(-1.0));
        buffer.append(2, sample(-2.0));
        assert!(!buffer.is_empty());
        assert_eq!(buffer.snapshot()[0].index, 2);
    }
}
