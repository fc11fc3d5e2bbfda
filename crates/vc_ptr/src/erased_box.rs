use alloc::alloc::{alloc, dealloc};
use core::alloc::Layout;
use core::fmt;
use core::ptr::NonNull;

use crate::{OwningPtr, Ptr, PtrMut};

// -----------------------------------------------------------------------------
// ErasedBox

/// Heap storage for one value whose type is only known by its [`Layout`].
///
/// `ErasedBox` owns the allocation, never the value: dropping the box frees
/// the memory without running any destructor. Whoever initializes the
/// storage is responsible for destroying the value (through an
/// [`OwningPtr`]) before the box goes away.
///
/// Zero-sized layouts do not allocate; they use a dangling, well-aligned
/// address instead.
///
/// # Examples
///
/// ```
/// # use core::alloc::Layout;
/// # use vc_ptr::ErasedBox;
/// let storage = ErasedBox::new_uninit(Layout::new::<u64>()).unwrap();
/// unsafe {
///     storage.as_owning().write(7u64);
///     assert_eq!(*storage.as_ptr().as_ref::<u64>(), 7);
///     storage.as_owning().drop_as::<u64>();
/// }
/// ```
pub struct ErasedBox {
    ptr: NonNull<u8>,
    layout: Layout,
}

// SAFETY: `ErasedBox` is plain memory; thread-safety of the value stored in
// it is the concern of the type record that manages it.
unsafe impl Send for ErasedBox {}
// SAFETY: see above.
unsafe impl Sync for ErasedBox {}

impl ErasedBox {
    /// Allocates uninitialized storage for `layout`.
    ///
    /// Returns `None` if the allocator fails.
    pub fn new_uninit(layout: Layout) -> Option<Self> {
        if layout.size() == 0 {
            let dangling = core::ptr::without_provenance_mut::<u8>(layout.align());
            return NonNull::new(dangling).map(|ptr| Self { ptr, layout });
        }

        // SAFETY: the layout has a non-zero size.
        let raw = unsafe { alloc(layout) };
        NonNull::new(raw).map(|ptr| Self { ptr, layout })
    }

    /// The layout this storage was allocated for.
    #[inline]
    pub const fn layout(&self) -> Layout {
        self.layout
    }

    /// Returns the storage address.
    #[inline]
    pub const fn as_non_null(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Borrows the stored value.
    ///
    /// # Safety
    /// The storage is initialized.
    #[inline]
    pub const unsafe fn as_ptr(&self) -> Ptr<'_> {
        // SAFETY: guaranteed by the caller.
        unsafe { Ptr::new(self.ptr) }
    }

    /// Borrows the stored value exclusively.
    ///
    /// # Safety
    /// The storage is initialized.
    #[inline]
    pub const unsafe fn as_mut(&mut self) -> PtrMut<'_> {
        // SAFETY: guaranteed by the caller.
        unsafe { PtrMut::new(self.ptr) }
    }

    /// Returns an owning pointer into the storage.
    ///
    /// # Safety
    /// The caller takes over the value's ownership state: either the storage
    /// is uninitialized and the pointer is used to initialize it, or the
    /// value is consumed through the pointer exactly once.
    #[inline]
    pub const unsafe fn as_owning(&self) -> OwningPtr<'_> {
        // SAFETY: guaranteed by the caller.
        unsafe { OwningPtr::new(self.ptr) }
    }
}

impl Drop for ErasedBox {
    fn drop(&mut self) {
        if self.layout.size() != 0 {
            // SAFETY: allocated in `new_uninit` with the same layout.
            unsafe { dealloc(self.ptr.as_ptr(), self.layout) }
        }
    }
}

impl fmt::Debug for ErasedBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedBox")
            .field("ptr", &self.ptr)
            .field("size", &self.layout.size())
            .field("align", &self.layout.align())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::ErasedBox;
    use alloc::string::String;
    use core::alloc::Layout;

    #[test]
    fn zero_sized_is_aligned() {
        let storage = ErasedBox::new_uninit(Layout::new::<[u64; 0]>()).unwrap();
        assert_eq!(storage.layout().size(), 0);
        assert!(unsafe { storage.as_ptr() }.is_aligned::<u64>());
    }

    #[test]
    fn stores_heap_value() {
        let mut storage = ErasedBox::new_uninit(Layout::new::<String>()).unwrap();
        unsafe {
            storage.as_owning().write(String::from("abc"));
            storage.as_mut().as_mut::<String>().push('d');
            assert_eq!(storage.as_ptr().as_ref::<String>(), "abcd");
            storage.as_owning().drop_as::<String>();
        }
    }
}
