//! Recovered-signer cache
//!
//! Public key recovery dominates verification cost, and the same header is
//! often verified several times during sync. The cache maps a sealed
//! header's hash to the address recovered from its seal. Entries are never
//! trusted on their own: the verifier still checks the cached signer
//! against the authority set in force for the header's step.

use std::num::NonZeroUsize;

use aura_types::{Address, H256};
use lru::LruCache;
use parking_lot::Mutex;
use tracing::trace;

/// Bounded LRU map from sealed header hash to recovered signer.
pub struct SignatureCache {
    inner: Mutex<LruCache<H256, Address>>,
}

impl SignatureCache {
    /// Creates a cache holding at most `capacity` signers.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Cached signer for `hash`, refreshing its recency.
    pub fn get(&self, hash: &H256) -> Option<Address> {
        let signer = self.inner.lock().get(hash).copied();
        if signer.is_some() {
            trace!(%hash, "signature cache hit");
        }
        signer
    }

    /// Records the signer recovered for `hash`.
    pub fn put(&self, hash: H256, signer: Address) {
        self.inner.lock().put(hash, signer);
    }

    /// Number of cached signers.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Maximum number of cached signers.
    pub fn capacity(&self) -> usize {
        self.inner.lock().cap().get()
    }
}

impl std::fmt::Debug for SignatureCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("SignatureCache")
            .field("len", &inner.len())
            .field("capacity", &inner.cap())
            .finish()
    }
}
