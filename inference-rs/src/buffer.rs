//! Rolling data buffers for the per-stream price history.
//!
//! Holds the most recent observations in arrival order with bounded
//! memory and contiguous read access for the window scanners.

/// A generic rolling buffer with a bounded number of live elements.
///
/// Backed by a `Vec` with a moving head: evicting the oldest element only
/// advances the head, and the dead prefix is compacted once it reaches the
/// capacity. Pushes are amortized O(1) and the live elements always form a
/// single contiguous slice.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingBuffer<T> {
    buffer: Vec<T>,
    head: usize,
    capacity: usize,
}

impl<T> RollingBuffer<T> {
    /// Create a new rolling buffer with the specified capacity.
    ///
    /// A capacity of zero is raised to one.
    ///
    /// # Example
    /// ```
    /// use tick_inference::RollingBuffer;
    /// let buffer: RollingBuffer<f64> = RollingBuffer::new(100);
    /// assert!(buffer.is_empty());
    /// ```
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Vec::with_capacity(capacity.saturating_mul(2)),
            head: 0,
            capacity,
        }
    }

    /// Add a new element, evicting the oldest ones beyond capacity.
    pub fn push(&mut self, value: T) {
        self.buffer.push(value);
        self.evict_excess();
    }

    /// Change the capacity, evicting the oldest elements if the buffer
    /// now holds more than `capacity` of them.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.evict_excess();
    }

    fn evict_excess(&mut self) {
        let excess = self.len().saturating_sub(self.capacity);
        self.head += excess;
        if self.head >= self.capacity {
            self.buffer.drain(..self.head);
            self.head = 0;
        }
    }

    /// Get the current number of elements in the buffer.
    pub fn len(&self) -> usize {
        self.buffer.len() - self.head
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the buffer capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The live elements, oldest to newest.
    pub fn as_slice(&self) -> &[T] {
        &self.buffer[self.head..]
    }

    /// The most recent element.
    pub fn last(&self) -> Option<&T> {
        self.as_slice().last()
    }
}

/// Parallel price and timestamp history for one stream.
///
/// Both sequences always have the same length and are evicted from the
/// front in lockstep.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    prices: RollingBuffer<f64>,
    timestamps: RollingBuffer<i64>,
}

impl PriceHistory {
    /// Create an empty history holding at most `max_history` observations.
    pub fn new(max_history: usize) -> Self {
        Self {
            prices: RollingBuffer::new(max_history),
            timestamps: RollingBuffer::new(max_history),
        }
    }

    /// Append one observation, keeping at most `max_history` of them.
    ///
    /// Prices are accepted as given; validation belongs to the caller.
    pub fn append(&mut self, price: f64, timestamp: i64, max_history: usize) {
        if max_history != self.prices.capacity() {
            self.prices.set_capacity(max_history);
            self.timestamps.set_capacity(max_history);
        }
        self.prices.push(price);
        self.timestamps.push(timestamp);
    }

    /// Prices, oldest to newest.
    pub fn prices(&self) -> &[f64] {
        self.prices.as_slice()
    }

    /// Timestamps in Unix milliseconds, parallel to [`prices`](Self::prices).
    pub fn timestamps(&self) -> &[i64] {
        self.timestamps.as_slice()
    }

    /// Most recent `(price, timestamp)` pair.
    pub fn latest(&self) -> Option<(f64, i64)> {
        Some((*self.prices.last()?, *self.timestamps.last()?))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn max_history(&self) -> usize {
        self.prices.capacity()
    }
}
