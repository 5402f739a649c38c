//! Pooled byte buffers backing generated code fragments.
//!
//! Buffers are leased during Generate and come back to the pool when the
//! owning [`PooledBuffer`] is dropped, which happens once the fragment has
//! been drained to a writer. Leasing and returning are lock-free and may
//! happen on any worker thread.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use bytes::BytesMut;
use crossbeam_queue::SegQueue;
use serde::Serialize;
use tracing::trace;

/// Default capacity of a freshly allocated buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 4 * 1024;

/// Default number of idle buffers kept for reuse.
pub const DEFAULT_MAX_POOLED: usize = 64;

/// Thread-safe pool of reusable byte buffers.
#[derive(Debug)]
pub struct BufferPool {
    buffers: SegQueue<BytesMut>,
    buffer_size: usize,
    max_pooled: usize,
    leased: AtomicUsize,
    returned: AtomicUsize,
    reused: AtomicUsize,
}

impl BufferPool {
    pub fn new(buffer_size: usize, max_pooled: usize) -> Arc<Self> {
        Arc::new(Self {
            buffers: SegQueue::new(),
            buffer_size,
            max_pooled,
            leased: AtomicUsize::new(0),
            returned: AtomicUsize::new(0),
            reused: AtomicUsize::new(0),
        })
    }

    pub fn with_defaults() -> Arc<Self> {
        Self::new(DEFAULT_BUFFER_SIZE, DEFAULT_MAX_POOLED)
    }

    /// Lease a cleared buffer with room for at least `min_capacity` bytes.
    pub fn lease(self: &Arc<Self>, min_capacity: usize) -> PooledBuffer {
        self.leased.fetch_add(1, Ordering::Relaxed);

        let mut buffer = match self.buffers.pop() {
            Some(mut buffer) => {
                self.reused.fetch_add(1, Ordering::Relaxed);
                buffer.clear();
                buffer
            }
            None => BytesMut::with_capacity(self.buffer_size),
        };
        buffer.reserve(min_capacity);

        PooledBuffer {
            buffer: Some(buffer),
            pool: Arc::clone(self),
        }
    }

    fn give_back(&self, buffer: BytesMut) {
        self.returned.fetch_add(1, Ordering::Relaxed);

        // Oversized buffers are dropped rather than pinned in the pool.
        if self.buffers.len() < self.max_pooled && buffer.capacity() <= self.buffer_size * 4 {
            self.buffers.push(buffer);
            trace!("Returned buffer to pool");
        } else {
            trace!("Dropping buffer, pool full or buffer oversized");
        }
    }

    pub fn stats(&self) -> BufferPoolStats {
        let leased = self.leased.load(Ordering::Relaxed);
        let returned = self.returned.load(Ordering::Relaxed);
        BufferPoolStats {
            leased,
            returned,
            reused: self.reused.load(Ordering::Relaxed),
            outstanding: leased.saturating_sub(returned),
            idle: self.buffers.len(),
        }
    }
}

/// Counters for pool usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BufferPoolStats {
    pub leased: usize,
    pub returned: usize,
    pub reused: usize,
    pub outstanding: usize,
    pub idle: usize,
}

/// A buffer leased from a [`BufferPool`].
///
/// The buffer goes back to its pool exactly once, when this handle drops.
#[derive(Debug)]
pub struct PooledBuffer {
    buffer: Option<BytesMut>,
    pool: Arc<BufferPool>,
}

impl PooledBuffer {
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.extend_from_slice(bytes);
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_deref().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.pool.give_back(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_buffer_is_returned_once() {
        let pool = BufferPool::new(64, 4);
        let mut buffer = pool.lease(8);
        buffer.extend_from_slice(b"hello");
        assert_eq!(buffer.as_bytes(), b"hello");
        assert_eq!(pool.stats().outstanding, 1);

        drop(buffer);

        let stats = pool.stats();
        assert_eq!(stats.leased, 1);
        assert_eq!(stats.returned, 1);
        assert_eq!(stats.outstanding, 0);
        assert_eq!(stats.idle, 1);
    }

    #[test]
    fn reused_buffer_starts_empty() {
        let pool = BufferPool::new(64, 4);
        let mut first = pool.lease(0);
        first.extend_from_slice(b"stale");
        drop(first);

        let second = pool.lease(0);
        assert!(second.is_empty());
        assert_eq!(pool.stats().reused, 1);
    }

    #[test]
    fn full_pool_drops_extra_buffers() {
        let pool = BufferPool::new(16, 1);
        let a = pool.lease(0);
        let b = pool.lease(0);
        drop(a);
        drop(b);

        let stats = pool.stats();
        assert_eq!(stats.returned, 2);
        assert_eq!(stats.idle, 1);
    }

    #[test]
    fn concurrent_leases_balance() {
        use rayon::prelude::*;

        let pool = BufferPool::new(32, 8);
        (0..256).into_par_iter().for_each(|i| {
            let mut buffer = pool.lease(4);
            buffer.extend_from_slice(&(i as u32).to_le_bytes());
            assert_eq!(buffer.len(), 4);
        });

        let stats = pool.stats();
        assert_eq!(stats.leased, 256);
        assert_eq!(stats.returned, 256);
        assert_eq!(stats.outstanding, 0);
    }
}
