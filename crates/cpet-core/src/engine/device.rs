use super::error::EngineError;
use std::mem;
use std::ops::{Deref, DerefMut};
use tracing::debug;

/// Owner of the buffers a batched run works on, with optional byte accounting.
///
/// Acquired at the start of a batched run and released when dropped. Every
/// allocation is checked against the budget before any memory is touched, so
/// an oversized window fails up front instead of part-way through a run.
#[derive(Debug)]
pub struct DeviceContext {
    limit: Option<usize>,
    allocated: usize,
}

/// A contiguous buffer allocated through a [`DeviceContext`].
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceBuffer<T> {
    data: Vec<T>,
}

impl<T> Deref for DeviceBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T> DerefMut for DeviceBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl DeviceContext {
    pub fn acquire(limit: Option<usize>) -> Self {
        debug!(limit = ?limit, "Device context acquired.");
        Self {
            limit,
            allocated: 0,
        }
    }

    /// Bytes currently charged against this context.
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// A zero-initialized buffer of `len` elements.
    pub fn alloc<T: Copy + Default>(&mut self, len: usize) -> Result<DeviceBuffer<T>, EngineError> {
        self.reserve(len, mem::size_of::<T>())?;
        Ok(DeviceBuffer {
            data: vec![T::default(); len],
        })
    }

    /// A buffer filled with `len` copies of `value`.
    pub fn alloc_filled<T: Copy>(
        &mut self,
        len: usize,
        value: T,
    ) -> Result<DeviceBuffer<T>, EngineError> {
        self.reserve(len, mem::size_of::<T>())?;
        Ok(DeviceBuffer {
            data: vec![value; len],
        })
    }

    /// Copies host data into a new buffer.
    pub fn upload<T: Copy>(&mut self, host: &[T]) -> Result<DeviceBuffer<T>, EngineError> {
        self.reserve(host.len(), mem::size_of::<T>())?;
        Ok(DeviceBuffer {
            data: host.to_vec(),
        })
    }

    fn reserve(&mut self, len: usize, element_size: usize) -> Result<(), EngineError> {
        let requested = len.checked_mul(element_size).unwrap_or(usize::MAX);
        let available = self
            .limit
            .map_or(usize::MAX, |limit| limit.saturating_sub(self.allocated));
        if requested > available {
            return Err(EngineError::DeviceMemoryExhausted {
                requested,
                available,
            });
        }
        self.allocated = self.allocated.saturating_add(requested);
        Ok(())
    }
}

impl Drop for DeviceContext {
    fn drop(&mut self) {
        debug!(bytes = self.allocated, "Device context released.");
    }
}
