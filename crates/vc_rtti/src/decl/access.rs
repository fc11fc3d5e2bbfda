use alloc::boxed::Box;
use core::fmt;

use vc_ptr::{Ptr, PtrMut};

// -----------------------------------------------------------------------------
// ErasedAccess

/// Projects a pointer to an owner onto one of its parts.
trait ErasedAccess: Send + Sync {
    /// # Safety
    /// - `owner` points to a valid value of the owner type.
    unsafe fn get<'a>(&self, owner: Ptr<'a>) -> Ptr<'a>;

    /// # Safety
    /// - `owner` points to a valid value of the owner type.
    unsafe fn get_mut<'a>(&self, owner: PtrMut<'a>) -> PtrMut<'a>;
}

struct FieldAccess<T: 'static, M: 'static> {
    get: fn(&T) -> &M,
    get_mut: fn(&mut T) -> &mut M,
}

impl<T: 'static, M: 'static> ErasedAccess for FieldAccess<T, M> {
    #[inline]
    unsafe fn get<'a>(&self, owner: Ptr<'a>) -> Ptr<'a> {
        owner.debug_assert_aligned::<T>();
        // SAFETY: guaranteed by the caller.
        let owner = unsafe { owner.as_ref::<T>() };
        Ptr::from_ref((self.get)(owner))
    }

    #[inline]
    unsafe fn get_mut<'a>(&self, owner: PtrMut<'a>) -> PtrMut<'a> {
        owner.debug_assert_aligned::<T>();
        // SAFETY: guaranteed by the caller.
        let owner = unsafe { owner.consume::<T>() };
        PtrMut::from_mut((self.get_mut)(owner))
    }
}

// -----------------------------------------------------------------------------
// Accessor

/// A type-erased pair of projections from `T` to a part of `T`.
pub(crate) struct Accessor {
    inner: Box<dyn ErasedAccess>,
}

impl Accessor {
    pub(crate) fn new<T: 'static, M: 'static>(
        get: fn(&T) -> &M,
        get_mut: fn(&mut T) -> &mut M,
    ) -> Self {
        Self {
            inner: Box::new(FieldAccess { get, get_mut }),
        }
    }

    /// # Safety
    /// - `owner` points to a valid value of the type this accessor was
    ///   created for.
    #[inline]
    pub(crate) unsafe fn get<'a>(&self, owner: Ptr<'a>) -> Ptr<'a> {
        // SAFETY: guaranteed by the caller.
        unsafe { self.inner.get(owner) }
    }

    /// # Safety
    /// - `owner` points to a valid value of the type this accessor was
    ///   created for.
    #[inline]
    pub(crate) unsafe fn get_mut<'a>(&self, owner: PtrMut<'a>) -> PtrMut<'a> {
        // SAFETY: guaranteed by the caller.
        unsafe { self.inner.get_mut(owner) }
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Accessor")
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Accessor;
    use vc_ptr::{Ptr, PtrMut};

    struct Pair {
        a: u32,
        b: u64,
    }

    #[test]
    fn projects_onto_fields() {
        let access = Accessor::new::<Pair, u64>(|p| &p.b, |p| &mut p.b);
        let mut pair = Pair { a: 1, b: 2 };

        let b = unsafe { access.get(Ptr::from_ref(&pair)) };
        assert_eq!(unsafe { *b.as_ref::<u64>() }, 2);

        let b = unsafe { access.get_mut(PtrMut::from_mut(&mut pair)) };
        unsafe { *b.consume::<u64>() = 7 };
        assert_eq!(pair.b, 7);
        assert_eq!(pair.a, 1);
    }
}
