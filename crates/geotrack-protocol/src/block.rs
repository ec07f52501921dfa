//! Size-bounded immutable byte block.
//!
//! Every protocol structure (frame, command) is a byte block with a declared
//! minimum and maximum length, checked once at construction. After that the
//! contents are immutable: accessors hand out copies or shared immutable
//! views, never the backing storage itself, so no caller can mutate a block
//! another component already validated.

use bytes::Bytes;
use geotrack_core::{Error, Result};
use std::hash::{Hash, Hasher};

/// An immutable byte buffer with enforced size bounds.
///
/// # Equality and Hashing
///
/// Two blocks are equal when their byte contents are equal, regardless of
/// their declared bounds. The hash folds the XOR checksum of the contents
/// with the length — collision-prone, but consistent with equality and cheap
/// for table lookups; it carries no security weight.
///
/// # Example
///
/// ```
/// use geotrack_protocol::BoundedBlock;
///
/// let block = BoundedBlock::new(&b"BR00"[..], 4, 1028).unwrap();
/// assert_eq!(block.len(), 4);
/// assert_eq!(block.contents(), b"BR00");
///
/// // Out-of-bounds data is rejected at construction
/// assert!(BoundedBlock::new(&b"BR"[..], 4, 1028).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct BoundedBlock {
    /// Validated contents, sentinels and all
    data: Bytes,

    /// Smallest length this block accepts
    min_size: usize,

    /// Largest length this block accepts
    max_size: usize,
}

impl BoundedBlock {
    /// Create a block from raw bytes, validating the size bounds.
    ///
    /// # Errors
    /// Returns `Error::SizeViolation` if `min_size > max_size` or the data
    /// length falls outside `[min_size, max_size]`.
    pub fn new(data: impl Into<Bytes>, min_size: usize, max_size: usize) -> Result<Self> {
        let data = data.into();
        if min_size > max_size || data.len() < min_size || data.len() > max_size {
            return Err(Error::SizeViolation {
                min: min_size,
                max: max_size,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            min_size,
            max_size,
        })
    }

    /// Create a block that accepts exactly one length.
    ///
    /// # Errors
    /// Returns `Error::SizeViolation` if the data length differs from `size`.
    pub fn exact(data: impl Into<Bytes>, size: usize) -> Result<Self> {
        Self::new(data, size, size)
    }

    /// Borrow the block contents.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Return a fresh owned copy of the block contents.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.data.to_vec()
    }

    /// Length of the block contents in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the block is empty (only possible with `min_size` 0).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Smallest length this block accepts.
    #[must_use]
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Largest length this block accepts.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// XOR fold of all content bytes.
    #[must_use]
    pub fn checksum(&self) -> u8 {
        self.data.iter().fold(0u8, |acc, &b| acc ^ b)
    }
}

impl PartialEq for BoundedBlock {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for BoundedBlock {}

impl Hash for BoundedBlock {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(self.checksum());
        state.write_usize(self.data.len());
    }
}
