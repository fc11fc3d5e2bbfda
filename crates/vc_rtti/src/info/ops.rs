use core::alloc::Layout;
use core::ptr::{self, NonNull};

use vc_ptr::{OwningPtr, Ptr};

use crate::info::TypeInfo;

// -----------------------------------------------------------------------------
// Constructor

/// Writes a default value into uninitialized storage.
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub(crate) struct Constructor {
    func: unsafe fn(OwningPtr<'_>),
}

impl Constructor {
    /// # Safety
    /// - `dst` is uninitialized storage for `T`.
    unsafe fn construct_default<T: Default>(dst: OwningPtr<'_>) {
        // SAFETY: guaranteed by the caller.
        unsafe { dst.write(T::default()) }
    }

    /// # Safety
    /// - `dst` is uninitialized storage for a thin pointer.
    unsafe fn construct_null(dst: OwningPtr<'_>) {
        // SAFETY: guaranteed by the caller.
        unsafe { dst.write(ptr::null::<u8>()) }
    }

    pub(crate) const fn defaulted<T: Default>() -> Self {
        Self {
            func: Self::construct_default::<T>,
        }
    }

    pub(crate) const fn null_pointer() -> Self {
        Self {
            func: Self::construct_null,
        }
    }

    #[inline(always)]
    pub(crate) unsafe fn call(self, dst: OwningPtr<'_>) {
        // SAFETY: guaranteed by the caller.
        unsafe { (self.func)(dst) }
    }
}

// -----------------------------------------------------------------------------
// Cloner

/// Clones a value into uninitialized storage.
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub(crate) struct Cloner {
    func: unsafe fn(Ptr<'_>, OwningPtr<'_>),
}

impl Cloner {
    /// # Safety
    /// - `src` points to a valid `T`.
    /// - `dst` is uninitialized storage for `T`.
    unsafe fn clone_via_clone<T: Clone>(src: Ptr<'_>, dst: OwningPtr<'_>) {
        src.debug_assert_aligned::<T>();
        // SAFETY: guaranteed by the caller.
        unsafe { dst.write(src.as_ref::<T>().clone()) }
    }

    /// # Safety
    /// - `src` points to a valid `T`.
    /// - `dst` is uninitialized storage for `T`.
    unsafe fn clone_via_copy<T: Copy>(src: Ptr<'_>, dst: OwningPtr<'_>) {
        src.debug_assert_aligned::<T>();
        dst.debug_assert_aligned::<T>();
        // SAFETY: guaranteed by the caller.
        unsafe {
            ptr::copy_nonoverlapping::<T>(src.as_ptr().cast(), dst.as_ptr().cast(), 1);
        }
    }

    pub(crate) const fn clonable<T: Clone>() -> Self {
        Self {
            func: Self::clone_via_clone::<T>,
        }
    }

    pub(crate) const fn copyable<T: Copy>() -> Self {
        Self {
            func: Self::clone_via_copy::<T>,
        }
    }

    #[inline(always)]
    pub(crate) unsafe fn call(self, src: Ptr<'_>, dst: OwningPtr<'_>) {
        // SAFETY: guaranteed by the caller.
        unsafe { (self.func)(src, dst) }
    }
}

// -----------------------------------------------------------------------------
// Dropper

/// Drops a value in place.
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub(crate) struct Dropper {
    func: unsafe fn(OwningPtr<'_>),
}

impl Dropper {
    /// # Safety
    /// - `ptr` points to a valid `T`.
    unsafe fn drop_fn<T>(ptr: OwningPtr<'_>) {
        // SAFETY: guaranteed by the caller.
        unsafe { ptr.drop_as::<T>() }
    }

    /// Returns `None` for types without drop glue.
    pub(crate) const fn of<T>() -> Option<Dropper> {
        if core::mem::needs_drop::<T>() {
            Some(Dropper {
                func: Self::drop_fn::<T>,
            })
        } else {
            None
        }
    }

    #[inline(always)]
    pub(crate) unsafe fn call(self, ptr: OwningPtr<'_>) {
        // SAFETY: guaranteed by the caller.
        unsafe { (self.func)(ptr) }
    }
}

// -----------------------------------------------------------------------------
// ValueOps

/// Operations of a sized value type.
///
/// Moving is a bitwise copy and always available, so it has no slot.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ValueOps {
    pub(crate) layout: Layout,
    pub(crate) construct: Option<Constructor>,
    pub(crate) clone: Option<Cloner>,
    pub(crate) drop: Option<Dropper>,
}

impl ValueOps {
    /// Layout and drop glue of `T`, without construction.
    pub(crate) const fn of<T>() -> Self {
        Self {
            layout: Layout::new::<T>(),
            construct: None,
            clone: None,
            drop: Dropper::of::<T>(),
        }
    }

    /// A thin raw pointer: null by default, copied bitwise.
    pub(crate) const fn pointer() -> Self {
        Self {
            layout: Layout::new::<*const u8>(),
            construct: Some(Constructor::null_pointer()),
            clone: Some(Cloner::copyable::<*const u8>()),
            drop: None,
        }
    }
}

// -----------------------------------------------------------------------------
// Storage

/// How values of a record are laid out and manipulated.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Storage {
    /// A single value with its own operations.
    Value(ValueOps),
    /// `len` elements described by another record.
    Array {
        element: &'static TypeInfo,
        len: usize,
    },
    /// No values of this type exist on their own (references).
    Opaque,
}

impl Storage {
    pub(crate) fn layout(&self) -> Option<Layout> {
        match self {
            Storage::Value(ops) => Some(ops.layout),
            Storage::Array { element, len } => {
                let element = element.layout()?;
                let size = element.size().checked_mul(*len)?;
                Layout::from_size_align(size, element.align()).ok()
            }
            Storage::Opaque => None,
        }
    }

    pub(crate) fn can_construct(&self) -> bool {
        match self {
            Storage::Value(ops) => ops.construct.is_some(),
            Storage::Array { element, .. } => element.can_construct(),
            Storage::Opaque => false,
        }
    }

    pub(crate) fn can_copy_construct(&self) -> bool {
        match self {
            Storage::Value(ops) => ops.clone.is_some(),
            Storage::Array { element, .. } => element.can_copy_construct(),
            Storage::Opaque => false,
        }
    }

    pub(crate) fn can_move_construct(&self) -> bool {
        match self {
            Storage::Value(_) => true,
            Storage::Array { element, .. } => element.can_move_construct(),
            Storage::Opaque => false,
        }
    }

    /// # Safety
    /// - `dst` is uninitialized storage for this layout.
    /// - [`can_construct`](Self::can_construct) returned `true`.
    pub(crate) unsafe fn construct_in_place(&self, dst: OwningPtr<'_>) {
        match self {
            Storage::Value(ops) => {
                if let Some(construct) = ops.construct {
                    // SAFETY: guaranteed by the caller.
                    unsafe { construct.call(dst) }
                }
            }
            Storage::Array { element, len } => {
                let Some(stride) = element.layout().map(|l| l.size()) else {
                    return;
                };
                for index in 0..*len {
                    // SAFETY: `index * stride` stays inside the array storage.
                    unsafe { element.storage().construct_in_place(dst_at(&dst, index * stride)) }
                }
            }
            Storage::Opaque => {}
        }
    }

    /// # Safety
    /// - `src` points to a valid value of this record.
    /// - `dst` is uninitialized storage for this layout.
    /// - [`can_copy_construct`](Self::can_copy_construct) returned `true`.
    pub(crate) unsafe fn clone_in_place(&self, src: Ptr<'_>, dst: OwningPtr<'_>) {
        match self {
            Storage::Value(ops) => {
                if let Some(clone) = ops.clone {
                    // SAFETY: guaranteed by the caller.
                    unsafe { clone.call(src, dst) }
                }
            }
            Storage::Array { element, len } => {
                let Some(stride) = element.layout().map(|l| l.size()) else {
                    return;
                };
                for index in 0..*len {
                    // SAFETY: both offsets stay inside their arrays.
                    unsafe {
                        element
                            .storage()
                            .clone_in_place(src.byte_add(index * stride), dst_at(&dst, index * stride));
                    }
                }
            }
            Storage::Opaque => {}
        }
    }

    /// # Safety
    /// - `ptr` points to a valid value of this record, which is consumed.
    pub(crate) unsafe fn drop_in_place(&self, ptr: OwningPtr<'_>) {
        match self {
            Storage::Value(ops) => {
                if let Some(drop) = ops.drop {
                    // SAFETY: guaranteed by the caller.
                    unsafe { drop.call(ptr) }
                }
            }
            Storage::Array { element, len } => {
                let Some(stride) = element.layout().map(|l| l.size()) else {
                    return;
                };
                for index in 0..*len {
                    // SAFETY: each element is dropped exactly once.
                    unsafe { element.storage().drop_in_place(dst_at(&ptr, index * stride)) }
                }
            }
            Storage::Opaque => {}
        }
    }
}

/// An owning pointer `offset` bytes into `base`.
///
/// # Safety
/// - `offset` stays inside the storage `base` points into.
#[inline]
unsafe fn dst_at<'a>(base: &OwningPtr<'a>, offset: usize) -> OwningPtr<'a> {
    // SAFETY: guaranteed by the caller; the address is derived from a
    // non-null pointer inside the same allocation.
    unsafe { OwningPtr::new(NonNull::new_unchecked(base.as_ptr().add(offset))) }
}
