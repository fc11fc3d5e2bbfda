use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::TypeId as NativeTypeId;
use core::fmt;
use std::sync::{OnceLock, PoisonError, RwLock};

use crate::hash::{HashMap, NativeTypeIdMap, NoOpHashState};
use crate::info::{TypeDesc, TypeId, TypeInfo, Typed};
use crate::module::ModuleSet;
use crate::registry::{RegistryError, fill};

static GLOBAL: TypeRegistry = TypeRegistry::new();

// -----------------------------------------------------------------------------
// TypeRegistry

/// The owner of all type records of one module configuration.
///
/// Records are created lazily, at most once per descriptor, and live for
/// the rest of the program. Most code uses the [`global`](Self::global)
/// registry through [`TypeInfo::of`]; separate registries exist to compose
/// records from a different [`ModuleSet`].
///
/// All methods are safe to call from any thread, and from inside the fill
/// of another record.
///
/// # Examples
///
/// ```
/// use vc_rtti::info::{TypeDesc, TypeInfo};
/// use vc_rtti::registry::TypeRegistry;
///
/// let registry = TypeRegistry::global();
/// let info = registry.get::<*const u8>();
///
/// assert_eq!(registry.get_or_create(&TypeDesc::of::<*const u8>()), info);
/// assert_eq!(registry.get_by_name("*const u8"), Some(info));
/// assert_eq!(registry.get_by_id(info.type_id()), Some(info));
/// ```
pub struct TypeRegistry {
    module_set: OnceLock<ModuleSet>,
    by_native: RwLock<NativeTypeIdMap<&'static TypeInfo>>,
    by_desc: RwLock<HashMap<TypeDesc, &'static TypeInfo>>,
    by_id: RwLock<HashMap<TypeId, &'static TypeInfo, NoOpHashState>>,
}

impl TypeRegistry {
    /// Creates an empty registry, usually as a `static`.
    pub const fn new() -> Self {
        Self {
            module_set: OnceLock::new(),
            by_native: RwLock::new(HashMap::with_hasher(NoOpHashState)),
            by_desc: RwLock::new(HashMap::with_hasher(crate::hash::FixedHashState)),
            by_id: RwLock::new(HashMap::with_hasher(NoOpHashState)),
        }
    }

    /// The registry used by [`TypeInfo::of`].
    #[inline]
    pub fn global() -> &'static TypeRegistry {
        &GLOBAL
    }

    /// Sets the modules records are composed of.
    ///
    /// Only possible before the first record is created; the default is
    /// [`ModuleSet::default`].
    pub fn configure(&self, modules: ModuleSet) -> Result<(), RegistryError> {
        self.module_set
            .set(modules)
            .map_err(|_| RegistryError::AlreadyInUse)
    }

    /// The modules records are composed of.
    #[inline]
    pub fn modules(&'static self) -> &'static ModuleSet {
        self.module_set.get_or_init(ModuleSet::default)
    }

    /// Returns the filled record of `T`.
    ///
    /// A request made while `T` is being filled on the same thread returns
    /// the reserved, partially filled record. Other threads wait for the
    /// fill to finish, so two threads first filling records that declare
    /// each other can wait forever.
    pub fn get<T: Typed>(&'static self) -> &'static TypeInfo {
        let native = NativeTypeId::of::<T>();
        let cached = self
            .by_native
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&native)
            .copied();

        let info = match cached {
            Some(info) => info,
            None => {
                let info = self.reserve(T::type_desc());
                self.by_native
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(native, info);
                info
            }
        };

        fill::ensure_filled(self, info);
        info
    }

    /// Returns the filled record of `desc`, creating it if needed.
    ///
    /// Non-canonical descriptors are canonicalized first.
    pub fn get_or_create(&'static self, desc: &TypeDesc) -> &'static TypeInfo {
        let info = self.reserve(desc.clone());
        fill::ensure_filled(self, info);
        info
    }

    /// Returns the record with identity `id`, if it was created.
    pub fn get_by_id(&self, id: TypeId) -> Option<&'static TypeInfo> {
        self.by_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .copied()
    }

    /// Returns the record named `name`, if it was created.
    pub fn get_by_name(&self, name: &str) -> Option<&'static TypeInfo> {
        self.get_by_id(TypeId::from_name(name))
            .filter(|info| info.name() == name)
    }

    /// Returns `true` if the record of `T` was created.
    pub fn contains<T: Typed>(&self) -> bool {
        self.by_desc
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&T::type_desc())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.by_desc
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no record was created yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A snapshot of all records, in no particular order.
    pub fn records(&self) -> Vec<&'static TypeInfo> {
        self.by_desc
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .copied()
            .collect()
    }

    /// Returns the record of `desc`, creating an unfilled one if needed.
    fn reserve(&'static self, desc: TypeDesc) -> &'static TypeInfo {
        let desc = if desc.is_canonical() {
            desc
        } else {
            desc.canonicalize()
        };

        if let Some(info) = self
            .by_desc
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&desc)
            .copied()
        {
            return info;
        }

        // Naming the record runs user code, which may use this registry.
        let record = Box::new(TypeInfo::reserve(self, self.modules(), desc.clone()));

        let mut by_desc = self.by_desc.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(info) = by_desc.get(&desc).copied() {
            return info;
        }
        let info: &'static TypeInfo = Box::leak(record);
        by_desc.insert(desc, info);
        drop(by_desc);

        let mut by_id = self.by_id.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(other) = by_id.get(&info.type_id()) {
            log::warn!(
                "type id {} of `{}` collides with `{}`",
                info.type_id(),
                info.name(),
                other.name(),
            );
        } else {
            by_id.insert(info.type_id(), info);
        }
        drop(by_id);

        log::debug!("created type record `{}` ({})", info.name(), info.type_id());
        info
    }
}

impl Default for TypeRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("modules", &self.module_set.get())
            .field("len", &self.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypeRegistry;
    use crate::decl::{Reflect, TypeDecl};
    use crate::info::{Const, TypeDesc, TypeInfo};
    use crate::module::{BasicTypeInfo, ClassTypeInfo, ModuleSet};
    use crate::registry::RegistryError;
    use alloc::vec::Vec;
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn registries_are_independent() {
        static OTHER: TypeRegistry = TypeRegistry::new();

        let global = TypeInfo::of::<u64>();
        let local = OTHER.get::<u64>();
        assert_ne!(global, local);
        assert_eq!(global.type_id(), local.type_id());
        assert!(local.can_cast_to(global.add_const()));
    }

    #[test]
    fn configure_only_before_use() {
        static LOCAL: TypeRegistry = TypeRegistry::new();

        assert_eq!(LOCAL.configure(ModuleSet::empty().with::<BasicTypeInfo>()), Ok(()));
        assert_eq!(
            LOCAL.configure(ModuleSet::default()),
            Err(RegistryError::AlreadyInUse)
        );
        let info = LOCAL.get::<i16>();
        assert!(info.module::<BasicTypeInfo>().is_some());
        assert!(info.module::<ClassTypeInfo>().is_none());

        static USED: TypeRegistry = TypeRegistry::new();
        let _ = USED.get::<i16>();
        assert!(USED.configure(ModuleSet::default()).is_err());
    }

    #[test]
    fn raw_descriptors_share_records() {
        let raw = TypeDesc::Const(alloc::boxed::Box::new(TypeDesc::Const(
            alloc::boxed::Box::new(TypeDesc::of::<u8>()),
        )));
        let info = TypeRegistry::global().get_or_create(&raw);
        assert_eq!(info, TypeInfo::of::<Const<u8>>());
        assert_eq!(info.name(), "const u8");
    }

    #[test]
    fn lookups() {
        static LOCAL: TypeRegistry = TypeRegistry::new();

        assert!(LOCAL.is_empty());
        assert!(!LOCAL.contains::<*mut i8>());
        let info = LOCAL.get::<*mut i8>();
        assert!(LOCAL.contains::<*mut i8>());
        // the pointer and its pointee
        assert_eq!(LOCAL.len(), 2);
        assert_eq!(LOCAL.get_by_name("*mut i8"), Some(info));
        assert_eq!(LOCAL.get_by_name("i8"), Some(info.next_unqualified()));
        assert_eq!(LOCAL.get_by_name("*const i8"), None);
        assert_eq!(LOCAL.records().len(), 2);
    }

    static DECLARED: AtomicUsize = AtomicUsize::new(0);

    struct Slow;

    impl Reflect for Slow {
        fn declare(_decl: &mut TypeDecl<Self>) {
            DECLARED.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(core::time::Duration::from_millis(20));
        }
    }

    #[test]
    fn concurrent_first_access() {
        static LOCAL: TypeRegistry = TypeRegistry::new();

        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| LOCAL.get::<Slow>() as *const TypeInfo as usize))
            .collect();
        let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(DECLARED.load(Ordering::SeqCst), 1);
        assert!(LOCAL.get::<Slow>().is_filled());
    }

    static NAMED: TypeRegistry = TypeRegistry::new();

    struct Named;

    impl Reflect for Named {
        fn type_name() -> alloc::borrow::Cow<'static, str> {
            let prefix = NAMED.get::<u8>().name();
            alloc::format!("{prefix}::Named").into()
        }
    }

    #[test]
    fn type_names_may_use_the_registry() {
        let info = NAMED.get::<Named>();
        assert_eq!(info.name(), "u8::Named");
        assert!(NAMED.contains::<u8>());
        assert_eq!(NAMED.get_by_name("u8::Named"), Some(info));
    }

    /// `R` names itself as a template parameter.
    struct Template<A, B>(A, B);

    impl<A: Reflect, B: Reflect> Reflect for Template<A, B> {
        fn declare(decl: &mut TypeDecl<Self>) {
            decl.class(Default::default())
                .template_parameter::<A>()
                .template_parameter::<B>();
        }
    }

    #[derive(Default)]
    struct Recursive;

    impl Reflect for Recursive {
        fn declare(decl: &mut TypeDecl<Self>) {
            decl.class(Default::default())
                .template_parameter::<Template<Recursive, Recursive>>();
        }
    }

    #[test]
    fn self_reference_terminates() {
        let info = TypeInfo::of::<Template<Recursive, Recursive>>();
        let description = info.get::<ClassTypeInfo>().description().unwrap();
        let params = description.template_parameters();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0], TypeInfo::of::<Recursive>());

        let inner = params[0].get::<ClassTypeInfo>().description().unwrap();
        assert_eq!(inner.template_parameters(), [info]);
    }

    /// `Derived` names itself through the template arguments of its base.
    struct Base<A, B>(core::marker::PhantomData<(A, B)>);

    impl<A: Reflect, B: Reflect> Reflect for Base<A, B> {
        fn type_name() -> alloc::borrow::Cow<'static, str> {
            alloc::format!("Base<{}, {}>", A::type_name(), B::type_name()).into()
        }

        fn declare(decl: &mut TypeDecl<Self>) {
            decl.class(Default::default())
                .template_parameter::<A>()
                .template_parameter::<B>();
        }
    }

    struct Derived {
        base: Base<Derived, Derived>,
    }

    impl Reflect for Derived {
        fn type_name() -> alloc::borrow::Cow<'static, str> {
            "Derived".into()
        }

        fn declare(decl: &mut TypeDecl<Self>) {
            decl.base::<Base<Derived, Derived>>(|d| &d.base, |d| &mut d.base);
        }
    }

    #[test]
    fn self_reference_through_base() {
        let info = TypeInfo::of::<Derived>();
        assert!(info.is_filled());

        let description = info.get::<ClassTypeInfo>().description().unwrap();
        let base = description.base_class().unwrap();
        assert_eq!(base.name(), "Base<Derived, Derived>");
        assert_eq!(base, TypeInfo::of::<Base<Derived, Derived>>());

        let params = base.get::<ClassTypeInfo>().description().unwrap().template_parameters();
        assert_eq!(params, [info, info]);
        assert!(!info.can_cast_to(base));
    }
}
