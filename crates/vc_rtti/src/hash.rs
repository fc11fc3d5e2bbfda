//! Hash states used by the registry and the attribute maps.
//!
//! - [`FixedHashState`]: `foldhash` with a fixed seed, so that hashes of
//!   type names are identical in every process. [`TypeId`] relies on it.
//! - [`NoOpHashState`]: passes already-hashed keys (native `TypeId`s, our
//!   [`TypeId`]s) straight through.
//!
//! [`TypeId`]: crate::info::TypeId

use core::hash::{BuildHasher, Hasher};

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHashState

const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x95EE04C4F326B271);

/// Hasher whose output only depends on its input.
pub type FixedHasher = FoldHasher<'static>;

/// Builds [`FixedHasher`]s.
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use vc_rtti::hash::FixedHashState;
///
/// let a = FixedHashState.hash_one("f32");
/// let b = FixedHashState.hash_one("f32");
/// assert_eq!(a, b);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// NoOpHashState

/// Uses the written integer as the hash.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHasher {
    hash: u64,
}

impl Hasher for NoOpHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes.iter().rev() {
            self.hash = self.hash.rotate_left(8).wrapping_add(*byte as u64);
        }
    }

    #[inline]
    fn write_u32(&mut self, i: u32) {
        // Spread the bits so hashbrown's control bytes (top 7 bits) vary.
        self.hash = (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }
}

/// Builds [`NoOpHasher`]s.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHashState;

impl BuildHasher for NoOpHashState {
    type Hasher = NoOpHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        NoOpHasher::default()
    }
}

// -----------------------------------------------------------------------------
// Maps

/// A `hashbrown` map with a deterministic hasher.
pub type HashMap<K, V, S = FixedHashState> = hashbrown::HashMap<K, V, S>;

/// A map keyed by the compiler's [`TypeId`](core::any::TypeId).
pub type NativeTypeIdMap<V> = HashMap<core::any::TypeId, V, NoOpHashState>;

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{FixedHashState, NoOpHashState};
    use core::hash::BuildHasher;

    #[test]
    fn fixed_hash_is_stable() {
        assert_eq!(FixedHashState.hash_one("i32"), FixedHashState.hash_one("i32"));
        assert_ne!(FixedHashState.hash_one("i32"), FixedHashState.hash_one("u32"));
    }

    #[test]
    fn no_op_passes_u64() {
        assert_eq!(NoOpHashState.hash_one(77u64), 77);
    }
}
