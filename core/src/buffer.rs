//! buffer.rs
//! Append-only growable output buffer owned by a single request.
//!
//! Summary: codecs write into the spare capacity reserved by `grow_by`;
//! ownership moves to the completion callback as `Bytes`.

use bytes::Bytes;

use crate::types::StreamError;

#[derive(Debug, Default)]
pub struct OutputBuffer {
    data: Vec<u8>,
    /// Allocation budget in bytes; growth past it fails like an allocation failure.
    limit: Option<usize>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: Option<usize>) -> Self {
        Self { data: Vec::new(), limit }
    }

    /// Ensure at least `additional` bytes of spare capacity past the written data.
    ///
    /// Growth is amortized (the backing `Vec` at least doubles), so repeated
    /// calls with shrinking requirements rarely reallocate.
    ///
    /// # Errors
    /// - `StreamError::Memory` if the budget would be exceeded or the
    ///   allocator refuses the reservation.
    pub fn grow_by(&mut self, additional: usize) -> Result<(), StreamError> {
        let oom = StreamError::Memory { requested: additional };
        let required = self.data.len().checked_add(additional).ok_or_else(|| oom.clone())?;

        if let Some(limit) = self.limit {
            if required > limit {
                return Err(oom);
            }
        }
        if self.data.capacity() >= required {
            return Ok(());
        }
        self.data.try_reserve(additional).map_err(|_| oom)
    }

    /// Expose the spare capacity as an initialized slice, let `f` write into its
    /// prefix and keep only the bytes `f` reports as written.
    ///
    /// `f` returns `(written, value)`; on error nothing is appended.
    pub fn fill_spare<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut [u8]) -> Result<(usize, T), E>,
    {
        let len = self.data.len();
        let cap = self.data.capacity();
        // Within capacity: never reallocates.
        self.data.resize(cap, 0);

        match f(&mut self.data[len..]) {
            Ok((written, value)) => {
                self.data.truncate(len + written.min(cap - len));
                Ok(value)
            }
            Err(e) => {
                self.data.truncate(len);
                Err(e)
            }
        }
    }

    /// Raw access for codecs that append into `Vec` spare capacity themselves
    /// (e.g. `flate2`'s `*_vec` calls). Writers must stay within capacity.
    pub fn as_mut_vec(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn spare_capacity(&self) -> usize {
        self.data.capacity() - self.data.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Final handoff to the completion callback.
    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.data)
    }
}
