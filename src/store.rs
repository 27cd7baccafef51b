//! Persistent blob storage interface.
//!
//! The platform provides a flat name→bytes store (typically a small flash filesystem). The link
//! layer uses it for exactly one blob: the persisted peer record, read once during startup and
//! written once when pairing completes. The reset operation removes it again.

use crate::Error;

/// Trait for flat persistent blob stores.
///
/// Implementations map a short name to an opaque byte sequence that survives reboots. Partial
/// writes must be reported through the returned length, not hidden; the caller treats a short
/// write as a failure.
pub trait BlobStore {
    /// Returns whether a blob named `name` exists.
    fn exists(&self, name: &str) -> bool;

    /// Reads the blob named `name` into `buf`, returning the number of bytes read.
    ///
    /// Blobs larger than `buf` are truncated to `buf.len()` bytes; the caller detects this as a
    /// length mismatch.
    fn read(&self, name: &str, buf: &mut [u8]) -> Result<usize, Error>;

    /// Writes `bytes` as the blob named `name`, replacing any previous content.
    ///
    /// Returns the number of bytes actually written, which may be less than `bytes.len()` when
    /// the medium fills up mid-write.
    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<usize, Error>;

    /// Removes the blob named `name`.
    ///
    /// Removing a blob that does not exist is not an error.
    fn remove(&mut self, name: &str) -> Result<(), Error>;
}
