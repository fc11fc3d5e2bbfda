use alloc::sync::Arc;
use core::fmt;
use core::marker::PhantomData;
use core::ptr::NonNull;

use vc_ptr::{ErasedBox, OwningPtr, Ptr, PtrMut};

use crate::data::{AccessError, ConstructError};
use crate::info::{Const, TypeDesc, TypeInfo, Typed};
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// PointerMode

/// What the data pointer of a [`DataObject`] designates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerMode {
    /// The data pointer is the address of the value.
    AddressOf,
    /// The data pointer is the value itself: an array decayed to a pointer
    /// to its first element.
    Direct,
}

impl PointerMode {
    #[inline]
    fn for_type(info: &TypeInfo) -> Self {
        if info.is_array() {
            PointerMode::Direct
        } else {
            PointerMode::AddressOf
        }
    }
}

// -----------------------------------------------------------------------------
// Container

/// The shared state behind one or more handles.
struct Container {
    type_info: &'static TypeInfo,
    data: NonNull<u8>,
    mode: PointerMode,
    /// Present when the value is owned and must be destroyed.
    storage: Option<ErasedBox>,
}

impl Drop for Container {
    fn drop(&mut self) {
        if let Some(storage) = &self.storage {
            // SAFETY: the owned value is initialized and dropped exactly once,
            // the storage is released after this.
            unsafe { self.type_info.destruct(storage.as_owning()) }
        }
    }
}

// -----------------------------------------------------------------------------
// DataObject

/// A reference-counted, type-erased handle to a value and its record.
///
/// A handle either owns its value, created from a record
/// ([`create`](Self::create), [`TypeInfo::construct`], ...), or wraps a value
/// borrowed for `'a` ([`wrap`](Self::wrap), [`wrap_ref`](Self::wrap_ref)).
/// Cloning a handle shares the value; an owned value is destroyed with the
/// last handle, a wrapped value is never destroyed.
///
/// A default handle is null: it holds no value and no record.
///
/// # Examples
///
/// ```
/// use vc_rtti::data::DataObject;
///
/// let mut value = 5u32;
/// {
///     let mut wrapped = DataObject::wrap(&mut value);
///     assert!(wrapped.is_wrapped());
///     *wrapped.try_get_mut::<u32>().unwrap() += 1;
/// }
/// assert_eq!(value, 6);
///
/// let owned = DataObject::create_moved(String::from("text"));
/// let shared = owned.clone();
/// assert_eq!(owned.ref_count(), 2);
/// assert_eq!(shared.try_get::<String>().unwrap(), "text");
/// ```
pub struct DataObject<'a> {
    inner: Option<Arc<Container>>,
    _marker: PhantomData<&'a mut ()>,
}

// SAFETY: values behind a `DataObject` are reflected types, which are
// `Send + Sync`, raw pointers, which are only dereferenced by unsafe code,
// or arrays of those.
unsafe impl Send for DataObject<'_> {}
// SAFETY: see above.
unsafe impl Sync for DataObject<'_> {}

impl DataObject<'static> {
    /// Creates a default `T` in the global registry, or a null object.
    #[inline]
    pub fn create<T: Typed>() -> Self {
        TypeInfo::of::<T>().construct()
    }

    /// Creates a default `T` in `registry`, or a null object.
    #[inline]
    pub fn create_in<T: Typed>(registry: &'static TypeRegistry) -> Self {
        registry.get::<T>().construct()
    }

    /// Creates a default `T` in the global registry.
    #[inline]
    pub fn try_create<T: Typed>() -> Result<Self, ConstructError> {
        TypeInfo::of::<T>().try_construct()
    }

    /// Clones `value` into a new object, or returns a null object if the
    /// type is not copyable.
    #[inline]
    pub fn create_copy<T: Typed>(value: &T) -> Self {
        Self::create_copy_in(TypeRegistry::global(), value)
    }

    /// [`create_copy`](Self::create_copy) with the record from `registry`.
    pub fn create_copy_in<T: Typed>(registry: &'static TypeRegistry, value: &T) -> Self {
        let info = registry.get::<T>();
        // SAFETY: `value` is a `T` and `info` describes `T`.
        unsafe { info.copy_construct(Ptr::from_ref(value)) }
    }

    /// Moves `value` into a new object.
    #[inline]
    pub fn create_moved<T: Typed>(value: T) -> Self {
        Self::create_moved_in(TypeRegistry::global(), value)
    }

    /// [`create_moved`](Self::create_moved) with the record from `registry`.
    pub fn create_moved_in<T: Typed>(registry: &'static TypeRegistry, value: T) -> Self {
        let info = registry.get::<T>();
        // SAFETY: the pointer holds a `T` and `info` describes `T`; the value
        // is consumed by the move.
        OwningPtr::make(value, |ptr| unsafe { info.move_construct(ptr) })
    }

    /// Takes ownership of an initialized value in `storage`.
    ///
    /// # Safety
    /// - `storage` holds a valid value of `info`'s type, laid out per
    ///   `info.layout()`.
    pub(crate) unsafe fn from_owned(info: &'static TypeInfo, storage: ErasedBox) -> Self {
        Self {
            inner: Some(Arc::new(Container {
                type_info: info,
                data: storage.as_non_null(),
                mode: PointerMode::for_type(info),
                storage: Some(storage),
            })),
            _marker: PhantomData,
        }
    }
}

impl<'a> DataObject<'a> {
    /// The null object.
    #[inline]
    pub const fn null() -> Self {
        Self {
            inner: None,
            _marker: PhantomData,
        }
    }

    /// Wraps a mutable borrow, typed as `T`.
    #[inline]
    pub fn wrap<T: Typed>(value: &'a mut T) -> Self {
        Self::wrap_in(TypeRegistry::global(), value)
    }

    /// [`wrap`](Self::wrap) with the record from `registry`.
    pub fn wrap_in<T: Typed>(registry: &'static TypeRegistry, value: &'a mut T) -> Self {
        Self::wrapped(registry.get::<T>(), NonNull::from(value).cast())
    }

    /// Wraps a shared borrow, typed as `const T`.
    #[inline]
    pub fn wrap_ref<T: Typed>(value: &'a T) -> Self {
        Self::wrap_ref_in(TypeRegistry::global(), value)
    }

    /// [`wrap_ref`](Self::wrap_ref) with the record from `registry`.
    pub fn wrap_ref_in<T: Typed>(registry: &'static TypeRegistry, value: &'a T) -> Self {
        Self::wrapped(registry.get::<Const<T>>(), NonNull::from(value).cast())
    }

    fn wrapped(info: &'static TypeInfo, data: NonNull<u8>) -> Self {
        Self {
            inner: Some(Arc::new(Container {
                type_info: info,
                data,
                mode: PointerMode::for_type(info),
                storage: None,
            })),
            _marker: PhantomData,
        }
    }

    // -------------------------------------------------------------------------
    // Queries

    /// Returns `true` if the object holds no value.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.inner.is_none()
    }

    /// The record of the held value.
    #[inline]
    pub fn type_info(&self) -> Option<&'static TypeInfo> {
        self.inner.as_ref().map(|c| c.type_info)
    }

    /// Returns `true` if the value is borrowed rather than owned.
    #[inline]
    pub fn is_wrapped(&self) -> bool {
        self.inner.as_ref().is_some_and(|c| c.storage.is_none())
    }

    /// What the data pointer designates.
    #[inline]
    pub fn pointer_mode(&self) -> Option<PointerMode> {
        self.inner.as_ref().map(|c| c.mode)
    }

    /// Number of handles sharing the value, zero for the null object.
    #[inline]
    pub fn ref_count(&self) -> usize {
        self.inner.as_ref().map_or(0, Arc::strong_count)
    }

    /// The address of the value.
    #[inline]
    pub fn data_ptr(&self) -> Option<NonNull<u8>> {
        self.inner.as_ref().map(|c| c.data)
    }

    /// Borrows the value untyped.
    #[inline]
    pub fn as_ptr(&self) -> Option<Ptr<'_>> {
        // SAFETY: the value lives at least as long as this handle.
        self.data_ptr().map(|data| unsafe { Ptr::new(data) })
    }

    /// Borrows the value untyped and exclusively.
    ///
    /// # Safety
    /// - No other handle accesses the value while the borrow is alive.
    /// - The value is not const-qualified, or is not mutated.
    #[inline]
    pub unsafe fn as_ptr_mut(&mut self) -> Option<PtrMut<'_>> {
        // SAFETY: guaranteed by the caller.
        self.data_ptr().map(|data| unsafe { PtrMut::new(data) })
    }

    /// Returns `true` if the held value is exactly a `T`.
    #[inline]
    pub fn is_exact_type<T: Typed>(&self) -> bool {
        self.type_info()
            .is_some_and(|info| info == info.registry().get::<T>())
    }

    /// Returns `true` if the held value may be viewed as a `T`, see
    /// [`TypeInfo::can_cast_to`].
    #[inline]
    pub fn can_cast_to<T: Typed>(&self) -> bool {
        self.type_info()
            .is_some_and(|info| info.can_cast_to_type::<T>())
    }

    // -------------------------------------------------------------------------
    // Typed access

    /// Borrows the value as a `T`.
    ///
    /// # Safety
    /// - The held value can be read as a `T`, e.g. [`is_exact_type`] or
    ///   [`can_cast_to`] returned `true` for a layout-compatible `T`.
    ///
    /// # Panics
    /// On the null object.
    ///
    /// [`is_exact_type`]: Self::is_exact_type
    /// [`can_cast_to`]: Self::can_cast_to
    #[inline]
    pub unsafe fn get<T>(&self) -> &T {
        match self.as_ptr() {
            // SAFETY: guaranteed by the caller.
            Some(ptr) => unsafe { ptr.as_ref::<T>() },
            None => panic!("`DataObject::get` on a null object"),
        }
    }

    /// Borrows the value as a `T`, exclusively.
    ///
    /// # Safety
    /// - The held value can be written as a `T`.
    /// - No other handle accesses the value while the borrow is alive.
    ///
    /// # Panics
    /// On the null object.
    #[inline]
    pub unsafe fn get_mut<T>(&mut self) -> &mut T {
        // SAFETY: guaranteed by the caller.
        match unsafe { self.as_ptr_mut() } {
            // SAFETY: guaranteed by the caller.
            Some(ptr) => unsafe { ptr.consume::<T>() },
            None => panic!("`DataObject::get_mut` on a null object"),
        }
    }

    /// Borrows the value as a `T` after checking its type.
    ///
    /// Succeeds if the held type is `T` or `const T`, ignoring references.
    pub fn try_get<T: Typed>(&self) -> Result<&T, AccessError> {
        let info = self.type_info().ok_or(AccessError::Null)?;
        if !is_view_of::<T>(info) {
            return Err(mismatch::<T>(info));
        }
        // SAFETY: the held value is a `T`, possibly const.
        Ok(unsafe { self.get::<T>() })
    }

    /// Borrows the value as a mutable `T` after checking its type and that
    /// this is the only handle.
    ///
    /// Succeeds if the held type is `T`, ignoring references.
    pub fn try_get_mut<T: Typed>(&mut self) -> Result<&mut T, AccessError> {
        let info = self.type_info().ok_or(AccessError::Null)?;
        if !is_view_of::<T>(info) {
            return Err(mismatch::<T>(info));
        }
        self.check_exclusive(info)?;
        // SAFETY: the held value is a mutable `T` and this handle is unique.
        Ok(unsafe { self.get_mut::<T>() })
    }

    /// Fails unless the held value is mutable and this is its only handle.
    pub(crate) fn check_exclusive(&self, info: &'static TypeInfo) -> Result<(), AccessError> {
        if held_desc(info).is_const() {
            return Err(AccessError::ReadOnly(info.name()));
        }
        match self.ref_count() {
            count if count > 1 => Err(AccessError::Shared(count)),
            _ => Ok(()),
        }
    }

    /// Clones the held value into a new owned object.
    pub fn try_copy(&self) -> Result<DataObject<'static>, ConstructError> {
        let Some(container) = &self.inner else {
            return Ok(DataObject::null());
        };
        // SAFETY: the pointer designates a valid value of the record.
        unsafe {
            container
                .type_info
                .try_copy_construct(Ptr::new(container.data))
        }
    }
}

/// The held descriptor, references stripped.
#[inline]
fn held_desc(info: &TypeInfo) -> &TypeDesc {
    match info.desc() {
        TypeDesc::Reference(_, inner) => inner,
        other => other,
    }
}

/// Whether a value of `info` may be borrowed as `T`.
fn is_view_of<T: Typed>(info: &TypeInfo) -> bool {
    let held = held_desc(info);
    let target = T::type_desc();
    *held == target || *held == target.add_const()
}

#[inline]
fn mismatch<T>(info: &'static TypeInfo) -> AccessError {
    AccessError::TypeMismatch {
        expected: core::any::type_name::<T>(),
        found: info.name(),
    }
}

impl Clone for DataObject<'_> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl Default for DataObject<'_> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for DataObject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            None => f.write_str("DataObject(null)"),
            Some(container) => f
                .debug_struct("DataObject")
                .field("type", &container.type_info.name())
                .field("mode", &container.mode)
                .field("wrapped", &container.storage.is_none())
                .field("ref_count", &Arc::strong_count(container))
                .finish(),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{DataObject, PointerMode};
    use crate::data::AccessError;
    use crate::decl::{Reflect, TypeDecl};
    use crate::info::{Const, TypeInfo};
    use alloc::string::String;
    use core::sync::atomic::{AtomicUsize, Ordering};

    static CREATED: AtomicUsize = AtomicUsize::new(0);
    static DROPPED: AtomicUsize = AtomicUsize::new(0);

    struct Tracked(u32);

    impl Default for Tracked {
        fn default() -> Self {
            CREATED.fetch_add(1, Ordering::SeqCst);
            Tracked(42)
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            DROPPED.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Reflect for Tracked {
        fn declare(decl: &mut TypeDecl<Self>) {
            decl.default_constructible();
        }
    }

    #[test]
    fn owned_and_wrapped_lifetimes() {
        let object = DataObject::create::<Tracked>();
        assert_eq!(CREATED.load(Ordering::SeqCst), 1);
        assert!(!object.is_wrapped());
        assert_eq!(object.try_get::<Tracked>().unwrap().0, 42);

        let shared = object.clone();
        drop(object);
        assert_eq!(DROPPED.load(Ordering::SeqCst), 0);
        drop(shared);
        assert_eq!(DROPPED.load(Ordering::SeqCst), 1);

        let mut local = Tracked(7);
        let wrapped = DataObject::wrap(&mut local);
        assert!(wrapped.is_wrapped());
        let copy = wrapped.clone();
        drop(wrapped);
        drop(copy);
        assert_eq!(DROPPED.load(Ordering::SeqCst), 1);
        assert_eq!(local.0, 7);
        drop(local);
        assert_eq!(DROPPED.load(Ordering::SeqCst), 2);
        assert_eq!(CREATED.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn null_object() {
        let null = DataObject::default();
        assert!(null.is_null());
        assert_eq!(null.ref_count(), 0);
        assert!(null.type_info().is_none());
        assert!(!null.is_exact_type::<u8>());
        assert_eq!(null.try_get::<u8>(), Err(AccessError::Null));

        assert!(DataObject::create::<*const String>().try_get::<*const String>().is_ok());
    }

    #[test]
    fn typed_views() {
        let mut value = 3i32;
        let shared = DataObject::wrap_ref(&value);
        assert_eq!(shared.type_info(), Some(TypeInfo::of::<Const<i32>>()));
        assert_eq!(shared.try_get::<i32>().copied(), Ok(3));
        assert!(shared.can_cast_to::<Const<i32>>());
        assert!(!shared.can_cast_to::<i32>());
        drop(shared);

        let mut object = DataObject::wrap(&mut value);
        assert!(object.is_exact_type::<i32>());
        assert!(object.can_cast_to::<Const<i32>>());
        assert!(matches!(
            object.try_get::<u32>(),
            Err(AccessError::TypeMismatch { found: "i32", .. })
        ));

        let other = object.clone();
        assert_eq!(object.try_get_mut::<i32>().err(), Some(AccessError::Shared(2)));
        drop(other);
        *object.try_get_mut::<i32>().unwrap() = 9;
        drop(object);
        assert_eq!(value, 9);
    }

    #[test]
    fn const_values_are_read_only() {
        let value = 1.5f32;
        let mut object = DataObject::wrap_ref(&value);
        assert_eq!(
            object.try_get_mut::<f32>().err(),
            Some(AccessError::ReadOnly("const f32"))
        );
        assert_eq!(object.try_get::<f32>().copied(), Ok(1.5));
    }

    #[test]
    fn arrays_use_direct_mode() {
        let mut grid = [1u8, 2, 3, 4];
        let object = DataObject::wrap(&mut grid);
        assert_eq!(object.pointer_mode(), Some(PointerMode::Direct));
        assert!(object.can_cast_to::<*mut u8>());
        assert!(object.can_cast_to::<*const u8>());

        let copy = object.try_copy().unwrap();
        assert!(!copy.is_wrapped());
        assert_eq!(copy.try_get::<[u8; 4]>().unwrap(), &[1, 2, 3, 4]);
        assert_eq!(
            DataObject::create_moved(5u8).pointer_mode(),
            Some(PointerMode::AddressOf)
        );
    }

    #[test]
    fn copies_and_moves() {
        let text = String::from("abc");
        let copy = DataObject::create_copy(&text);
        assert_eq!(copy.try_get::<String>().unwrap(), "abc");

        let moved = DataObject::create_moved(text);
        assert_eq!(moved.try_get::<String>().map(String::len), Ok(3));

        let grid = DataObject::create_moved([String::from("a"), String::from("b")]);
        assert_eq!(grid.try_get::<[String; 2]>().unwrap()[1], "b");
    }
}
