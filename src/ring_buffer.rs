use crate::Price;

/// Fixed-capacity window over the most recent values.
#[derive(Clone, Debug)]
pub(crate) struct RingBuffer {
    buffer: Vec<Price>,
    /// Slot of the oldest value once full, next write position.
    head: usize,
    len: usize,
}

impl RingBuffer {
    #[must_use]
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "ring buffer capacity must be positive");

        Self {
            buffer: vec![0.0; capacity],
            head: 0,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn is_ready(&self) -> bool {
        self.len == self.buffer.len()
    }

    /// Appends `value`, returning the evicted oldest value once full.
    #[inline]
    pub(crate) fn push(&mut self, value: Price) -> Option<Price> {
        let evicted = self.is_ready().then(|| self.buffer[self.head]);

        self.buffer[self.head] = value;
        self.head += 1;
        if self.head == self.buffer.len() {
            self.head = 0;
        }
        if self.len < self.buffer.len() {
            self.len += 1;
        }

        evicted
    }

    /// Values from oldest to newest.
    pub(crate) fn iter(&self) -> impl Iterator<Item = Price> + '_ {
        let start = if self.is_ready() { self.head } else { 0 };

        (0..self.len).map(move |i| self.buffer[(start + i) % self.buffer.len()])
    }
}

/// Running sum over a [`RingBuffer`] that tolerates `NaN` entries.
///
/// The sum is undefined while any `NaN` sits in the window and recovers once
/// it is evicted. Maintained incrementally via add/subtract, so it may
/// accumulate FP rounding drift over very long runs.
#[derive(Clone, Debug)]
pub(crate) struct WindowSum {
    window: RingBuffer,
    sum: Price,
    undefined: usize,
}

impl WindowSum {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            window: RingBuffer::new(capacity),
            sum: 0.0,
            undefined: 0,
        }
    }

    /// Pushes `value` and returns the window sum once the window is full and
    /// free of `NaN`.
    #[inline]
    pub(crate) fn push(&mut self, value: Price) -> Option<Price> {
        if let Some(evicted) = self.window.push(value) {
            if evicted.is_nan() {
                self.undefined -= 1;
            } else {
                self.sum -= evicted;
            }
        }

        if value.is_nan() {
            self.undefined += 1;
        } else {
            self.sum += value;
        }

        (self.window.is_ready() && self.undefined == 0).then_some(self.sum)
    }
}
