use core::fmt;
use core::hash::BuildHasher;

use crate::decl::Reflect;
use crate::hash::FixedHashState;

// -----------------------------------------------------------------------------
// TypeId

/// A stable identity derived from a canonical type name.
///
/// Unlike [`core::any::TypeId`], the value only depends on the name, so it
/// is identical across builds and processes. `TypeId(0)` is reserved as
/// [`TypeId::INVALID`] and never produced by [`from_name`](Self::from_name).
///
/// # Examples
///
/// ```
/// use vc_rtti::info::{TypeId, TypeInfo};
///
/// let id = TypeId::from_name("f32");
/// assert!(id.is_valid());
/// assert_eq!(id, TypeInfo::of::<f32>().type_id());
/// assert!(!TypeId::INVALID.is_valid());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    /// The "no type" identity.
    pub const INVALID: TypeId = TypeId(0);

    /// Hashes a canonical type name.
    pub fn from_name(name: &str) -> TypeId {
        let hash = FixedHashState.hash_one(name);
        let folded = (hash ^ (hash >> 32)) as u32;
        if folded == 0 {
            TypeId(1)
        } else {
            TypeId(folded)
        }
    }

    /// The identity of an unqualified reflected type.
    #[inline]
    pub fn of<T: Reflect>() -> TypeId {
        TypeId::from_name(&T::type_name())
    }

    /// Wraps a raw value, e.g. one read back from a log.
    #[inline]
    pub const fn from_raw(raw: u32) -> TypeId {
        TypeId(raw)
    }

    /// Returns the raw value.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns `false` for [`TypeId::INVALID`].
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({:#010x})", self.0)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

// -----------------------------------------------------------------------------
// Tests
