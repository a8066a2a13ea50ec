//! State Hashing for Determinism Verification
//!
//! Provides deterministic hashing of world state for:
//! - Replay / determinism verification (two runs, same seed, same hash)
//! - Round-trip checks on the serialized snapshot format

use sha2::{Digest, Sha256};

use super::geometry::Vec2;

/// Hash output type (256 bits / 32 bytes).
pub type StateHash = [u8; 32];

/// Deterministic hasher for battle state.
///
/// Wraps SHA-256 with helpers for the engine's primitive types. The
/// order in which fields are fed to the hasher is part of its contract:
/// callers must hash fields in a fixed, documented order (battle
/// construction already enforces stable iteration via `BTreeMap`).
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with a domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create a hasher for a world-state snapshot.
    pub fn for_world_state() -> Self {
        Self::new(b"SKIRMISH_STATE_V1")
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a `u8`.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a `u32` (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a `u64` (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an `f64`, hashed via its raw IEEE-754 bit pattern so
    /// that `-0.0` and `0.0` hash identically to how they compare equal.
    #[inline]
    pub fn update_f64(&mut self, value: f64) {
        self.hasher.update(value.to_bits().to_le_bytes());
    }

    /// Update with a 2D vector.
    #[inline]
    pub fn update_vec2(&mut self, value: Vec2) {
        self.update_f64(value.x);
        self.update_f64(value.y);
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute a hash over world state, calling `add_state` to feed the
/// game-specific fields after the tick and seed have already been hashed.
pub fn compute_state_hash<F>(tick: u32, seed: u32, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_world_state();
    hasher.update_u32(tick);
    hasher.update_u32(seed);
    add_state(&mut hasher);
    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_hasher_is_deterministic() {
        let make_hash = || {
            let mut hasher = StateHasher::for_world_state();
            hasher.update_u32(100);
            hasher.update_f64(5.5);
            hasher.update_vec2(Vec2::new(1.0, 2.0));
            hasher.update_bool(true);
            hasher.finalize()
        };

        assert_eq!(make_hash(), make_hash());
    }

    #[test]
    fn hash_order_matters() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(1);
            h.update_u32(2);
            h.finalize()
        };
        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(2);
            h.update_u32(1);
            h.finalize()
        };
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn domain_separation() {
        let hash1 = {
            let mut h = StateHasher::new(b"DOMAIN_A");
            h.update_u32(1);
            h.finalize()
        };
        let hash2 = {
            let mut h = StateHasher::new(b"DOMAIN_B");
            h.update_u32(1);
            h.finalize()
        };
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn compute_state_hash_is_consistent() {
        let hash1 = compute_state_hash(100, 12345, |h| {
            h.update_f64(5.0);
            h.update_bool(true);
        });
        let hash2 = compute_state_hash(100, 12345, |h| {
            h.update_f64(5.0);
            h.update_bool(true);
        });
        assert_eq!(hash1, hash2);

        let hash3 = compute_state_hash(101, 12345, |h| {
            h.update_f64(5.0);
            h.update_bool(true);
        });
        assert_ne!(hash1, hash3);
    }
}
