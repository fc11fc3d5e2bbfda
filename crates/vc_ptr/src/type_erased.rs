use core::fmt;
use core::marker::PhantomData;
use core::mem::ManuallyDrop;
use core::ptr::NonNull;

// -----------------------------------------------------------------------------
// Common methods

macro_rules! impl_erased_ptr {
    ($ptr:ident) => {
        impl From<$ptr<'_>> for NonNull<u8> {
            #[inline(always)]
            fn from(ptr: $ptr<'_>) -> Self {
                ptr.0
            }
        }

        impl $ptr<'_> {
            /// Returns `true` if the address is aligned for `T`.
            #[inline]
            pub fn is_aligned<T>(&self) -> bool {
                self.0.as_ptr().cast::<T>().is_aligned()
            }

            /// Panics on a misaligned address, only with `debug_assertions`.
            #[cfg_attr(debug_assertions, track_caller)]
            #[cfg_attr(not(debug_assertions), inline(always))]
            pub fn debug_assert_aligned<T>(&self) {
                debug_assert!(
                    self.is_aligned::<T>(),
                    "misaligned pointer {:p} for {} (align {})",
                    self.0,
                    core::any::type_name::<T>(),
                    align_of::<T>(),
                );
            }

            /// Moves the pointer forward by `count` bytes.
            ///
            /// # Safety
            /// - The result must stay inside the same allocation.
            /// - The pointee at the result must live for the pointer lifetime.
            #[inline]
            pub const unsafe fn byte_add(self, count: usize) -> Self {
                // SAFETY: guaranteed by the caller.
                Self(unsafe { self.0.add(count) }, PhantomData)
            }
        }

        impl fmt::Pointer for $ptr<'_> {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Pointer::fmt(&self.0, f)
            }
        }

        impl fmt::Debug for $ptr<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($ptr), self.0)
            }
        }
    };
}

// -----------------------------------------------------------------------------
// Ptr

/// A type-erased shared borrow, the untyped form of `&'a T`.
///
/// The pointee type is tracked elsewhere (usually by a runtime type record),
/// so every typed access is `unsafe`.
///
/// # Examples
///
/// ```
/// # use vc_ptr::Ptr;
/// let value = 8i32;
/// let ptr = Ptr::from_ref(&value);
///
/// ptr.debug_assert_aligned::<i32>();
/// assert_eq!(unsafe { *ptr.as_ref::<i32>() }, 8);
/// ```
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct Ptr<'a>(NonNull<u8>, PhantomData<&'a u8>);

impl_erased_ptr!(Ptr);

impl<'a> Ptr<'a> {
    /// Creates a `Ptr` from a raw address.
    ///
    /// # Safety
    /// - `ptr` points to a live value of the intended pointee type.
    /// - The value is not mutated while `'a` lasts.
    #[inline(always)]
    pub const unsafe fn new(ptr: NonNull<u8>) -> Self {
        Self(ptr, PhantomData)
    }

    /// Erases the type of a shared reference.
    #[inline(always)]
    pub const fn from_ref<T: ?Sized>(value: &'a T) -> Self {
        Self(NonNull::from_ref(value).cast(), PhantomData)
    }

    /// Returns the raw address.
    #[inline(always)]
    pub const fn as_ptr(self) -> *const u8 {
        self.0.as_ptr()
    }

    /// Restores the shared reference.
    ///
    /// # Safety
    /// - `T` is the type of the pointee.
    /// - The address is aligned for `T`.
    #[inline(always)]
    pub const unsafe fn as_ref<T>(self) -> &'a T {
        // SAFETY: guaranteed by the caller.
        unsafe { &*self.0.as_ptr().cast::<T>() }
    }
}

impl<'a, T: ?Sized> From<&'a T> for Ptr<'a> {
    #[inline]
    fn from(value: &'a T) -> Self {
        Self::from_ref(value)
    }
}

// -----------------------------------------------------------------------------
// PtrMut

/// A type-erased exclusive borrow, the untyped form of `&'a mut T`.
///
/// # Examples
///
/// ```
/// # use vc_ptr::PtrMut;
/// let mut value = 8i32;
/// let mut ptr = PtrMut::from_mut(&mut value);
///
/// unsafe { *ptr.as_mut::<i32>() += 2; }
/// assert_eq!(value, 10);
/// ```
#[repr(transparent)]
pub struct PtrMut<'a>(NonNull<u8>, PhantomData<&'a mut u8>);

impl_erased_ptr!(PtrMut);

impl<'a> PtrMut<'a> {
    /// Creates a `PtrMut` from a raw address.
    ///
    /// # Safety
    /// - `ptr` points to a live value of the intended pointee type.
    /// - No other access to the value happens while `'a` lasts.
    #[inline(always)]
    pub const unsafe fn new(ptr: NonNull<u8>) -> Self {
        Self(ptr, PhantomData)
    }

    /// Erases the type of an exclusive reference.
    #[inline(always)]
    pub const fn from_mut<T: ?Sized>(value: &'a mut T) -> Self {
        Self(NonNull::from_mut(value).cast(), PhantomData)
    }

    /// Returns the raw address.
    #[inline(always)]
    pub const fn as_ptr(&self) -> *mut u8 {
        self.0.as_ptr()
    }

    /// Downgrades to a shared pointer for the duration of `&self`.
    #[inline(always)]
    pub const fn borrow(&self) -> Ptr<'_> {
        Ptr(self.0, PhantomData)
    }

    /// Reborrows with a shorter lifetime.
    #[inline(always)]
    pub const fn reborrow(&mut self) -> PtrMut<'_> {
        PtrMut(self.0, PhantomData)
    }

    /// Restores a shared reference tied to `&self`.
    ///
    /// # Safety
    /// - `T` is the type of the pointee.
    /// - The address is aligned for `T`.
    #[inline(always)]
    pub const unsafe fn as_ref<T>(&self) -> &T {
        // SAFETY: guaranteed by the caller.
        unsafe { &*self.0.as_ptr().cast::<T>() }
    }

    /// Restores an exclusive reference tied to `&mut self`.
    ///
    /// # Safety
    /// - `T` is the type of the pointee.
    /// - The address is aligned for `T`.
    #[inline(always)]
    pub const unsafe fn as_mut<T>(&mut self) -> &mut T {
        // SAFETY: guaranteed by the caller.
        unsafe { &mut *self.0.as_ptr().cast::<T>() }
    }

    /// Converts into an exclusive reference with the full lifetime `'a`.
    ///
    /// # Safety
    /// - `T` is the type of the pointee.
    /// - The address is aligned for `T`.
    #[inline(always)]
    pub const unsafe fn consume<T>(self) -> &'a mut T {
        // SAFETY: guaranteed by the caller.
        unsafe { &mut *self.0.as_ptr().cast::<T>() }
    }
}

impl<'a, T: ?Sized> From<&'a mut T> for PtrMut<'a> {
    #[inline]
    fn from(value: &'a mut T) -> Self {
        Self::from_mut(value)
    }
}

// -----------------------------------------------------------------------------
// OwningPtr

/// A type-erased pointer that owns its pointee but not its storage.
///
/// The pointee must be consumed exactly once, by [`drop_as`](Self::drop_as),
/// [`read`](Self::read), or a type-erased destructor. It may also point to
/// uninitialized storage that a constructor is about to fill, in which
/// case the constructor takes over the obligation.
///
/// # Examples
///
/// ```
/// # use vc_ptr::OwningPtr;
/// let text = OwningPtr::make(String::from("moved"), |ptr| unsafe {
///     ptr.read::<String>()
/// });
/// assert_eq!(text, "moved");
/// ```
#[repr(transparent)]
pub struct OwningPtr<'a>(NonNull<u8>, PhantomData<&'a mut u8>);

impl_erased_ptr!(OwningPtr);

impl<'a> OwningPtr<'a> {
    /// Creates an `OwningPtr` from a raw address.
    ///
    /// # Safety
    /// - `ptr` points to storage valid for reads and writes for `'a`.
    /// - Ownership of the pointee (if initialized) moves into this pointer.
    #[inline(always)]
    pub const unsafe fn new(ptr: NonNull<u8>) -> Self {
        Self(ptr, PhantomData)
    }

    /// Takes ownership of a value that the caller will not drop.
    #[inline(always)]
    pub const fn from_value<T>(value: &'a mut ManuallyDrop<T>) -> Self {
        Self(NonNull::from_mut(value).cast(), PhantomData)
    }

    /// Moves `value` behind an `OwningPtr` for the duration of `f`.
    ///
    /// `f` must consume the pointee, otherwise the value leaks.
    #[inline]
    pub fn make<T, R>(value: T, f: impl FnOnce(OwningPtr<'_>) -> R) -> R {
        let mut value = ManuallyDrop::new(value);
        f(OwningPtr::from_value(&mut value))
    }

    /// Returns the raw address.
    #[inline(always)]
    pub const fn as_ptr(&self) -> *mut u8 {
        self.0.as_ptr()
    }

    /// Borrows the pointee.
    #[inline(always)]
    pub const fn borrow(&self) -> Ptr<'_> {
        Ptr(self.0, PhantomData)
    }

    /// Borrows the pointee exclusively.
    #[inline(always)]
    pub const fn borrow_mut(&mut self) -> PtrMut<'_> {
        PtrMut(self.0, PhantomData)
    }

    /// Drops the pointee in place.
    ///
    /// # Safety
    /// - `T` is the type of the initialized pointee.
    /// - The address is aligned for `T`.
    #[inline]
    pub unsafe fn drop_as<T>(self) {
        self.debug_assert_aligned::<T>();
        // SAFETY: guaranteed by the caller.
        unsafe { self.0.as_ptr().cast::<T>().drop_in_place() }
    }

    /// Moves the pointee out.
    ///
    /// # Safety
    /// - `T` is the type of the initialized pointee.
    /// - The address is aligned for `T`.
    #[inline]
    pub unsafe fn read<T>(self) -> T {
        self.debug_assert_aligned::<T>();
        // SAFETY: guaranteed by the caller.
        unsafe { self.0.as_ptr().cast::<T>().read() }
    }

    /// Writes `value` into the (uninitialized) storage.
    ///
    /// # Safety
    /// - The storage holds no initialized value, or its value may leak.
    /// - The address is aligned and large enough for `T`.
    #[inline]
    pub unsafe fn write<T>(self, value: T) {
        self.debug_assert_aligned::<T>();
        // SAFETY: guaranteed by the caller.
        unsafe { self.0.as_ptr().cast::<T>().write(value) }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{OwningPtr, Ptr, PtrMut};
    use core::mem::ManuallyDrop;

    #[test]
    fn byte_add_walks_fields() {
        let pair = [3u16, 7u16];
        let first = Ptr::from_ref(&pair);
        let second = unsafe { first.byte_add(size_of::<u16>()) };
        assert_eq!(unsafe { *second.as_ref::<u16>() }, 7);
    }

    #[test]
    fn reborrow_keeps_address() {
        let mut value = 1u64;
        let mut ptr = PtrMut::from_mut(&mut value);
        let addr = ptr.as_ptr();
        assert_eq!(ptr.reborrow().as_ptr(), addr);
        assert_eq!(ptr.borrow().as_ptr(), addr.cast_const());
    }

    #[test]
    fn owning_write_then_read() {
        let mut slot = ManuallyDrop::new(0u32);
        let ptr = OwningPtr::from_value(&mut slot);
        let addr = ptr.as_ptr();
        unsafe { ptr.write(42u32) };
        let ptr = unsafe { OwningPtr::new(core::ptr::NonNull::new_unchecked(addr)) };
        assert_eq!(unsafe { ptr.read::<u32>() }, 42);
    }
}
