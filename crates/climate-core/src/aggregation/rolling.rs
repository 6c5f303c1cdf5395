use heapless::Deque;

use super::MAX_WINDOW;

/// Sliding window over the most recent valid samples of one metric.
///
/// The window is fed for the whole life of the process and never reset
/// between uplinks. Once `capacity` samples are stored, each new sample
/// evicts the oldest one.
#[derive(Debug, Clone)]
pub struct RollingAverageBuffer {
    samples: Deque<f32, MAX_WINDOW>,
    capacity: usize,
}

impl RollingAverageBuffer {
    /// Create an empty window holding at most `capacity` samples.
    ///
    /// `capacity` is clamped to `1..=MAX_WINDOW`; configuration validation
    /// rejects values outside that range before buffers are built.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Deque::new(),
            capacity: capacity.clamp(1, MAX_WINDOW),
        }
    }

    /// Add a sample. NaN and infinite values are ignored.
    ///
    /// Returns whether the sample was stored.
    pub fn feed(&mut self, value: f32) -> bool {
        if !value.is_finite() {
            return false;
        }

        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        // Room was made above, so this cannot fail.
        self.samples.push_back(value).is_ok()
    }

    /// Arithmetic mean of the stored samples, `None` until the first valid feed.
    pub fn average(&self) -> Option<f32> {
        if self.samples.is_empty() {
            return None;
        }

        // Summed in f64 so a window of large finite values cannot overflow.
        let sum: f64 = self.samples.iter().map(|&v| f64::from(v)).sum();
        Some((sum / self.samples.len() as f64) as f32)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_has_no_average() {
        let buffer = RollingAverageBuffer::new(5);
        assert_eq!(buffer.average(), None);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_invalid_feeds_are_ignored() {
        let mut buffer = RollingAverageBuffer::new(5);
        assert!(!buffer.feed(f32::NAN));
        assert!(!buffer.feed(f32::INFINITY));
        assert_eq!(buffer.average(), None);

        buffer.feed(4.0);
        buffer.feed(f32::NAN);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.average(), Some(4.0));
    }

    #[test]
    fn test_oldest_sample_is_evicted() {
        let mut buffer = RollingAverageBuffer::new(2);
        buffer.feed(1.0);
        buffer.feed(2.0);
        buffer.feed(6.0);

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.average(), Some(4.0)); // (2 + 6) / 2
    }

    #[test]
    fn test_capacity_is_clamped() {
        assert_eq!(RollingAverageBuffer::new(0).capacity(), 1);
        assert_eq!(RollingAverageBuffer::new(1000).capacity(), MAX_WINDOW);
    }

    #[test]
    fn test_large_samples_do_not_overflow() {
        let mut buffer = RollingAverageBuffer::new(2);
        buffer.feed(3.0e38);
        buffer.feed(3.0e38);
        assert_eq!(buffer.average(), Some(3.0e38));
    }

    proptest! {
        #[test]
        fn test_average_tracks_most_recent_window(
            capacity in 1usize..=MAX_WINDOW,
            values in proptest::collection::vec(-1000i32..1000, 1..64),
        ) {
            let mut buffer = RollingAverageBuffer::new(capacity);
            for &v in &values {
                buffer.feed(v as f32);
            }

            let window = &values[values.len().saturating_sub(capacity)..];
            let expected = window.iter().map(|&v| v as f64).sum::<f64>() / window.len() as f64;

            prop_assert!(buffer.len() <= capacity);
            prop_assert_eq!(buffer.len(), window.len());
            let average = buffer.average().unwrap() as f64;
            prop_assert!((average - expected).abs() < 1e-3);
        }

        #[test]
        fn test_only_invalid_feeds_stay_missing(count in 0usize..32) {
            let mut buffer = RollingAverageBuffer::new(4);
            for _ in 0..count {
                buffer.feed(f32::NAN);
            }
            prop_assert_eq!(buffer.average(), None);
        }
    }
}
