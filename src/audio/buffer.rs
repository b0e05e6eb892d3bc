//! Fixed-capacity circular buffer carrying processed samples from the input
//! callback to the output callback.
//!
//! The input side [`push_slice`](RingBuffer::push_slice)s each processed
//! block; the output side [`pop_slice`](RingBuffer::pop_slice)s whatever the
//! hardware asks for.  When the buffer runs dry the shortfall is filled with
//! `T::default()` — for audio that is silence, which is the correct underrun
//! behaviour for a live passthrough (a glitch, never a panic).  When the
//! buffer is full the oldest samples are overwritten so latency stays bounded
//! instead of growing without limit.
//!
//! # Example
//!
//! ```rust
//! use earbridge::audio::RingBuffer;
//!
//! let mut buf = RingBuffer::new(4);
//! buf.push_slice(&[1.0, 2.0, 3.0]);
//!
//! let mut out = [0.0_f32; 4];
//! let delivered = buf.pop_slice(&mut out);
//! assert_eq!(delivered, 3);
//! assert_eq!(out, [1.0, 2.0, 3.0, 0.0]); // shortfall padded with silence
//! ```

// ---------------------------------------------------------------------------
// RingBuffer
// ---------------------------------------------------------------------------

/// A fixed-capacity circular buffer.
///
/// Generic over `T: Copy + Default`, though the engine uses `RingBuffer<f32>`
/// exclusively.  Never allocates beyond its initial capacity.
pub struct RingBuffer<T> {
    buf: Vec<T>,
    capacity: usize,
    /// Index of the next write position (wraps around `capacity`).
    write_pos: usize,
    /// Number of valid samples currently stored (≤ `capacity`).
    len: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Create a new ring buffer with the given `capacity`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RingBuffer capacity must be > 0");
        Self {
            buf: vec![T::default(); capacity],
            capacity,
            write_pos: 0,
            len: 0,
        }
    }

    /// Append `data`, overwriting the oldest samples on overflow.
    pub fn push_slice(&mut self, data: &[T]) {
        for &item in data {
            self.buf[self.write_pos] = item;
            self.write_pos = (self.write_pos + 1) % self.capacity;
            if self.len < self.capacity {
                self.len += 1;
            }
        }
    }

    /// Fill `out` with the oldest stored samples in chronological order.
    ///
    /// Returns how many real samples were delivered; positions past that
    /// count are set to `T::default()` (silence on underrun).
    pub fn pop_slice(&mut self, out: &mut [T]) -> usize {
        let available = self.len.min(out.len());

        // Oldest valid sample sits `len` slots behind the write cursor.
        let read_pos = (self.write_pos + self.capacity - self.len) % self.capacity;

        for (i, slot) in out.iter_mut().take(available).enumerate() {
            *slot = self.buf[(read_pos + i) % self.capacity];
        }
        for slot in out.iter_mut().skip(available) {
            *slot = T::default();
        }

        self.len -= available;
        available
    }

    /// Discard all samples and reset the write position.
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.len = 0;
    }

    /// Number of valid samples currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when the buffer contains no samples.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of samples the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
