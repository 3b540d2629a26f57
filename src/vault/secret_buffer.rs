//! Owned byte buffer for passphrases, wiped on `clear()` and on drop.
//!
//! Best effort only: copies the allocator or the OS made earlier (page
//! swaps, core dumps, reallocations before the buffer was wrapped) are
//! out of reach.

use std::fmt;

use zeroize::Zeroizing;

/// An exclusively-owned secret byte string.
#[derive(Default)]
pub struct SecretBuffer {
    bytes: Zeroizing<Vec<u8>>,
}

impl SecretBuffer {
    /// Copy `bytes` into a new buffer.
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: Zeroizing::new(bytes.to_vec()),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Zero the contents in place, then release them.
    pub fn clear(&mut self) {
        // Dropping the old Zeroizing wipes the full allocation.
        self.bytes = Zeroizing::new(Vec::new());
    }
}

impl From<&[u8]> for SecretBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer([REDACTED])")
    }
}
