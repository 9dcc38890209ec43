//! Pooled byte buffers for delivery reassembly.
//!
//! A [`BufferPool`] hands out [`PooledBuffer`] guards backed by
//! [`BytesMut`]. Dropping a guard clears the buffer and returns its
//! capacity to the pool, so every acquisition is released exactly once
//! on every exit path, including early returns and rejection paths.
//! [`BufferPool::outstanding`] lets tests assert leak-freedom.

use std::{
    ops::{Deref, DerefMut},
    sync::{
        Arc,
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use bytes::BytesMut;

/// Initial capacity hint for reassembly buffers.
pub const DEFAULT_BUFFER_CAPACITY: usize = 10 * 1024;

#[derive(Debug)]
struct PoolInner {
    free: Mutex<Vec<BytesMut>>,
    capacity_hint: usize,
    outstanding: AtomicUsize,
}

/// Pool of reusable reassembly buffers.
#[derive(Clone, Debug)]
pub struct BufferPool {
    inner: Arc<PoolInner>,
}

impl Default for BufferPool {
    fn default() -> Self { Self::new(DEFAULT_BUFFER_CAPACITY) }
}

impl BufferPool {
    /// Create a pool whose fresh buffers start with `capacity_hint` bytes.
    #[must_use]
    pub fn new(capacity_hint: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                free: Mutex::new(Vec::new()),
                capacity_hint,
                outstanding: AtomicUsize::new(0),
            }),
        }
    }

    /// Take a cleared buffer from the pool, allocating when empty.
    #[must_use]
    pub fn acquire(&self) -> PooledBuffer {
        let recycled = self
            .inner
            .free
            .lock()
            .ok()
            .and_then(|mut free| free.pop());
        let buf = recycled.unwrap_or_else(|| BytesMut::with_capacity(self.inner.capacity_hint));
        self.inner.outstanding.fetch_add(1, Ordering::Relaxed);
        PooledBuffer {
            buf,
            pool: Arc::clone(&self.inner),
        }
    }

    /// Number of buffers currently checked out of the pool.
    #[must_use]
    pub fn outstanding(&self) -> usize { self.inner.outstanding.load(Ordering::Relaxed) }

    /// Number of idle buffers waiting for reuse.
    #[must_use]
    pub fn idle(&self) -> usize { self.inner.free.lock().map_or(0, |free| free.len()) }
}

/// Guard over a pooled buffer; returns the buffer on drop.
#[derive(Debug)]
pub struct PooledBuffer {
    buf: BytesMut,
    pool: Arc<PoolInner>,
}

impl Deref for PooledBuffer {
    type Target = BytesMut;

    fn deref(&self) -> &BytesMut { &self.buf }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut BytesMut { &mut self.buf }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        self.pool.outstanding.fetch_sub(1, Ordering::Relaxed);
        let mut buf = std::mem::take(&mut self.buf);
        buf.clear();
        if let Ok(mut free) = self.pool.free.lock() {
            free.push(buf);
        }
    }
}
