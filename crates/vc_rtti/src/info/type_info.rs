use alloc::boxed::Box;
use alloc::string::ToString;
use core::alloc::Layout;
use core::any::{Any, TypeId as NativeTypeId};
use core::fmt;
use core::hash::{Hash, Hasher};
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use vc_ptr::{ErasedBox, OwningPtr, Ptr};

use crate::data::{ConstructError, DataObject};
use crate::decl::ClassDecl;
use crate::info::{QualifierFlags, Storage, TypeDesc, TypeId, Typed};
use crate::module::{ModuleSet, TypeInfoModule};
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// TypeInfo

/// The runtime record of one type.
///
/// Records are unique per registry and descriptor: two records of the same
/// registry describe the same type if and only if they are the same object,
/// so `==` compares addresses.
///
/// A record is created empty and filled the first time it is requested.
/// Filling runs the base type's declaration and then every module of the
/// registry's [`ModuleSet`], see [`TypeInfoModule`].
///
/// # Examples
///
/// ```
/// use vc_rtti::info::{Const, TypeInfo};
///
/// let value = TypeInfo::of::<u32>();
/// let constant = TypeInfo::of::<Const<u32>>();
///
/// assert!(constant.is_const());
/// assert_eq!(constant.next_unqualified(), value);
/// assert!(value.can_cast_to(constant));
/// assert!(!constant.can_cast_to(value));
/// ```
pub struct TypeInfo {
    desc: TypeDesc,
    name: Box<str>,
    type_id: TypeId,
    flags: QualifierFlags,
    registry: &'static TypeRegistry,
    module_set: &'static ModuleSet,
    requires_init: AtomicBool,
    filled: AtomicBool,
    next_unqualified: OnceLock<&'static TypeInfo>,
    storage: OnceLock<Storage>,
    class_decl: OnceLock<ClassDecl>,
    modules: Box<[OnceLock<Box<dyn Any + Send + Sync>>]>,
}

impl TypeInfo {
    /// Returns the record of `T` in the global registry.
    #[inline]
    pub fn of<T: Typed>() -> &'static TypeInfo {
        TypeRegistry::global().get::<T>()
    }

    /// The descriptor this record was created for.
    #[inline]
    pub fn desc(&self) -> &TypeDesc {
        &self.desc
    }

    /// The canonical name, e.g. `*const f32` or `[u8; 4]`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The identity derived from [`name`](Self::name).
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Qualifiers of the outermost layer.
    #[inline]
    pub fn flags(&self) -> QualifierFlags {
        self.flags
    }

    /// The registry that owns this record.
    #[inline]
    pub fn registry(&self) -> &'static TypeRegistry {
        self.registry
    }

    /// Returns `true` once filling has completed.
    ///
    /// Records handed out by the registry are always filled, except while
    /// their own fill is still running on the current thread.
    #[inline]
    pub fn is_filled(&self) -> bool {
        self.filled.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_const(&self) -> bool {
        self.flags.contains(QualifierFlags::CONST)
    }

    #[inline]
    pub fn is_pointer(&self) -> bool {
        self.flags.contains(QualifierFlags::POINTER)
    }

    #[inline]
    pub fn is_reference(&self) -> bool {
        self.flags.is_reference()
    }

    #[inline]
    pub fn is_lvalue_reference(&self) -> bool {
        self.flags.contains(QualifierFlags::LVALUE_REF)
    }

    #[inline]
    pub fn is_rvalue_reference(&self) -> bool {
        self.flags.contains(QualifierFlags::RVALUE_REF)
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.flags.contains(QualifierFlags::ARRAY)
    }

    #[inline]
    pub fn is_pointer_or_array(&self) -> bool {
        self.flags.is_pointer_or_array()
    }

    /// Returns `true` if any qualifier is present.
    #[inline]
    pub fn is_qualified(&self) -> bool {
        !self.flags.is_empty()
    }

    /// The array length, if this is an array.
    #[inline]
    pub fn array_len(&self) -> Option<usize> {
        self.desc.array_len()
    }

    /// The record with one qualifier layer removed.
    ///
    /// See [`TypeDesc::next_unqualified`]. Unqualified records return
    /// themselves.
    #[inline]
    pub fn next_unqualified(&'static self) -> &'static TypeInfo {
        match self.next_unqualified.get() {
            Some(next) => next,
            None => self,
        }
    }

    /// The record with every qualifier removed.
    pub fn fully_unqualified(&'static self) -> &'static TypeInfo {
        let mut info = self;
        while info.is_qualified() {
            let next = info.next_unqualified();
            if core::ptr::eq(next, info) {
                break;
            }
            info = next;
        }
        info
    }

    // -------------------------------------------------------------------------
    // Capabilities

    /// Memory layout of a value, `None` for references.
    #[inline]
    pub fn layout(&self) -> Option<Layout> {
        self.storage().layout()
    }

    /// A default value can be created.
    #[inline]
    pub fn can_construct(&self) -> bool {
        self.storage().can_construct()
    }

    /// A value can be duplicated.
    #[inline]
    pub fn can_copy_construct(&self) -> bool {
        self.storage().can_copy_construct()
    }

    /// A value can be moved into new storage.
    #[inline]
    pub fn can_move_construct(&self) -> bool {
        self.storage().can_move_construct()
    }

    /// Values can be destroyed; true whenever any construction is possible.
    #[inline]
    pub fn can_destruct(&self) -> bool {
        self.can_construct() || self.can_copy_construct() || self.can_move_construct()
    }

    // -------------------------------------------------------------------------
    // Construction

    /// Creates a default value, or a null object if that is not possible.
    pub fn construct(&'static self) -> DataObject<'static> {
        self.try_construct().unwrap_or_else(|error| {
            log::debug!("{error}");
            DataObject::null()
        })
    }

    /// Creates a default value.
    pub fn try_construct(&'static self) -> Result<DataObject<'static>, ConstructError> {
        if !self.can_construct() {
            return Err(ConstructError::NotConstructible(self.name_static()));
        }
        let storage = self.allocate()?;
        // SAFETY: the storage is fresh and sized for this record.
        unsafe {
            self.storage().construct_in_place(storage.as_owning());
            Ok(DataObject::from_owned(self, storage))
        }
    }

    /// Clones the value at `src`, or returns a null object.
    ///
    /// # Safety
    /// - `src` points to a valid value of this record's type.
    pub unsafe fn copy_construct(&'static self, src: Ptr<'_>) -> DataObject<'static> {
        // SAFETY: guaranteed by the caller.
        unsafe { self.try_copy_construct(src) }.unwrap_or_else(|error| {
            log::debug!("{error}");
            DataObject::null()
        })
    }

    /// Clones the value at `src`.
    ///
    /// # Safety
    /// - `src` points to a valid value of this record's type.
    pub unsafe fn try_copy_construct(
        &'static self,
        src: Ptr<'_>,
    ) -> Result<DataObject<'static>, ConstructError> {
        if !self.can_copy_construct() {
            return Err(ConstructError::NotCopyable(self.name_static()));
        }
        let storage = self.allocate()?;
        // SAFETY: `src` is valid per the caller, the storage is fresh.
        unsafe {
            self.storage().clone_in_place(src, storage.as_owning());
            Ok(DataObject::from_owned(self, storage))
        }
    }

    /// Moves the value at `src` into new storage, or returns a null object.
    ///
    /// # Safety
    /// - `src` points to a valid value of this record's type. It is consumed
    ///   whether or not the move succeeds.
    pub unsafe fn move_construct(&'static self, src: OwningPtr<'_>) -> DataObject<'static> {
        // SAFETY: guaranteed by the caller.
        unsafe { self.try_move_construct(src) }.unwrap_or_else(|error| {
            log::debug!("{error}");
            DataObject::null()
        })
    }

    /// Moves the value at `src` into new storage.
    ///
    /// On failure the value is destroyed in place.
    ///
    /// # Safety
    /// - `src` points to a valid value of this record's type. It is consumed
    ///   whether or not the move succeeds.
    pub unsafe fn try_move_construct(
        &'static self,
        src: OwningPtr<'_>,
    ) -> Result<DataObject<'static>, ConstructError> {
        if !self.can_move_construct() {
            // SAFETY: guaranteed by the caller.
            unsafe { self.storage().drop_in_place(src) };
            return Err(ConstructError::NotMovable(self.name_static()));
        }
        let storage = match self.allocate() {
            Ok(storage) => storage,
            Err(error) => {
                // SAFETY: guaranteed by the caller.
                unsafe { self.storage().drop_in_place(src) };
                return Err(error);
            }
        };
        let size = storage.layout().size();
        // SAFETY: moves are bitwise; the source is not used afterwards.
        unsafe {
            core::ptr::copy_nonoverlapping(src.as_ptr(), storage.as_non_null().as_ptr(), size);
            Ok(DataObject::from_owned(self, storage))
        }
    }

    /// Drops the value at `ptr` in place.
    ///
    /// # Safety
    /// - `ptr` points to a valid value of this record's type, which is
    ///   consumed.
    #[inline]
    pub unsafe fn destruct(&self, ptr: OwningPtr<'_>) {
        // SAFETY: guaranteed by the caller.
        unsafe { self.storage().drop_in_place(ptr) }
    }

    fn allocate(&'static self) -> Result<ErasedBox, ConstructError> {
        let Some(layout) = self.layout() else {
            return Err(ConstructError::NotConstructible(self.name_static()));
        };
        ErasedBox::new_uninit(layout).ok_or(ConstructError::AllocFailed {
            type_name: self.name_static(),
            size: layout.size(),
        })
    }

    #[inline]
    fn name_static(&'static self) -> &'static str {
        &self.name
    }

    // -------------------------------------------------------------------------
    // Casts and navigation

    /// Returns `true` if a value of this type may be viewed as `other`.
    ///
    /// See [`TypeDesc::can_cast_to`] for the rules.
    #[inline]
    pub fn can_cast_to(&self, other: &TypeInfo) -> bool {
        self == other || self.desc.can_cast_to(&other.desc)
    }

    /// [`can_cast_to`](Self::can_cast_to) against the record of `T` in the
    /// same registry.
    #[inline]
    pub fn can_cast_to_type<T: Typed>(&self) -> bool {
        self.can_cast_to(self.registry.get::<T>())
    }

    /// The const-qualified record.
    #[inline]
    pub fn add_const(&self) -> &'static TypeInfo {
        self.registry.get_or_create(&self.desc.clone().add_const())
    }

    /// The record of a raw pointer to this type.
    #[inline]
    pub fn add_pointer(&self) -> &'static TypeInfo {
        self.registry.get_or_create(&self.desc.clone().add_pointer())
    }

    /// The record of an lvalue reference to this type.
    #[inline]
    pub fn add_lvalue_reference(&self) -> &'static TypeInfo {
        self.registry.get_or_create(&self.desc.clone().add_lvalue_reference())
    }

    /// The record of an rvalue reference to this type.
    #[inline]
    pub fn add_rvalue_reference(&self) -> &'static TypeInfo {
        self.registry.get_or_create(&self.desc.clone().add_rvalue_reference())
    }

    /// The record of an array of `len` values of this type.
    #[inline]
    pub fn add_array(&self, len: usize) -> &'static TypeInfo {
        self.registry.get_or_create(&self.desc.clone().add_array(len))
    }

    // -------------------------------------------------------------------------
    // Modules

    /// Returns module `M` of this record.
    ///
    /// # Panics
    /// If `M` is not part of the registry's [`ModuleSet`], or if called on
    /// the record whose fill is running before `M` was filled.
    pub fn get<M: TypeInfoModule>(&self) -> &M {
        match self.module::<M>() {
            Some(module) => module,
            None => panic!(
                "type info module `{}` is not available on `{}`",
                core::any::type_name::<M>(),
                self.name,
            ),
        }
    }

    /// Returns module `M` of this record, if present and filled.
    pub fn module<M: TypeInfoModule>(&self) -> Option<&M> {
        let index = self.module_set.index_of(NativeTypeId::of::<M>())?;
        self.modules.get(index)?.get()?.downcast_ref::<M>()
    }

    // -------------------------------------------------------------------------
    // Filling

    pub(crate) fn reserve(
        registry: &'static TypeRegistry,
        module_set: &'static ModuleSet,
        desc: TypeDesc,
    ) -> TypeInfo {
        let name: Box<str> = desc.to_string().into_boxed_str();
        let modules = (0..module_set.len()).map(|_| OnceLock::new()).collect();
        TypeInfo {
            type_id: TypeId::from_name(&name),
            flags: desc.flags(),
            name,
            desc,
            registry,
            module_set,
            requires_init: AtomicBool::new(true),
            filled: AtomicBool::new(false),
            next_unqualified: OnceLock::new(),
            storage: OnceLock::new(),
            class_decl: OnceLock::new(),
            modules,
        }
    }

    /// Claims the fill. Exactly one caller ever gets `true`.
    #[inline]
    pub(crate) fn claim_fill(&self) -> bool {
        self.requires_init
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    #[inline]
    pub(crate) fn mark_filled(&self) {
        self.filled.store(true, Ordering::Release);
    }

    #[inline]
    pub(crate) fn module_set(&self) -> &'static ModuleSet {
        self.module_set
    }

    pub(crate) fn set_next_unqualified(&self, next: &'static TypeInfo) {
        let _ = self.next_unqualified.set(next);
    }

    pub(crate) fn set_storage(&self, storage: Storage) {
        let _ = self.storage.set(storage);
    }

    pub(crate) fn set_module(&self, index: usize, module: Box<dyn Any + Send + Sync>) {
        if let Some(slot) = self.modules.get(index) {
            let _ = slot.set(module);
        }
    }

    pub(crate) fn set_class_decl(&self, class: ClassDecl) {
        let _ = self.class_decl.set(class);
    }

    /// Layout and operations of values.
    ///
    /// Opaque until the fill has computed them.
    #[inline]
    pub(crate) fn storage(&self) -> &Storage {
        self.storage.get().unwrap_or(&Storage::Opaque)
    }

    /// The class facts of a plain record.
    #[inline]
    pub(crate) fn class_decl(&self) -> Option<&ClassDecl> {
        self.class_decl.get()
    }
}

impl PartialEq for TypeInfo {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self, other)
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::ptr::hash(self, state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("type_id", &self.type_id)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TypeInfo {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// -----------------------------------------------------------------------------
// Tests
