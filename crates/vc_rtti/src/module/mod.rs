//! Type info modules.
//!
//! A record is composed of modules. When a record is filled, each module of
//! the registry's [`ModuleSet`] is created with
//! [`TypeInfoModule::handle_type`] and then fed the class facts of the type,
//! always in this order:
//!
//! 1. [`handle_type`](TypeInfoModule::handle_type), for every type;
//! 2. [`handle_class`](TypeInfoModule::handle_class), for reflected classes;
//! 3. [`handle_template_parameter`](TypeInfoModule::handle_template_parameter),
//!    once per template parameter;
//! 4. [`handle_base_class`](TypeInfoModule::handle_base_class), if a base
//!    class is declared;
//! 5. [`handle_class_member`](TypeInfoModule::handle_class_member), once per
//!    member, in declaration order.
//!
//! Modules run in the order of the set. The default set is
//! [`BasicTypeInfo`] followed by [`ClassTypeInfo`].

// -----------------------------------------------------------------------------
// Modules

mod basic;
mod class;

// -----------------------------------------------------------------------------
// Exports

pub use basic::BasicTypeInfo;
pub use class::{ClassDescription, ClassTypeInfo, MemberDescription};

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId as NativeTypeId};
use core::fmt;
use core::marker::PhantomData;

use crate::attributes::AttributeContainer;
use crate::decl::ClassDecl;
use crate::info::TypeInfo;

// -----------------------------------------------------------------------------
// TypeInfoModule

/// One facet of a type record.
///
/// All hooks except [`handle_type`](Self::handle_type) default to doing
/// nothing. Records passed to the hooks may still be filling when the type
/// refers to itself, e.g. through a template parameter.
///
/// # Examples
///
/// ```
/// use vc_rtti::info::TypeInfo;
/// use vc_rtti::module::{ModuleSet, TypeInfoModule};
/// use vc_rtti::registry::TypeRegistry;
///
/// struct Size(Option<usize>);
///
/// impl TypeInfoModule for Size {
///     fn handle_type(info: &'static TypeInfo) -> Self {
///         Size(info.layout().map(|l| l.size()))
///     }
/// }
///
/// static REGISTRY: TypeRegistry = TypeRegistry::new();
/// REGISTRY.configure(ModuleSet::default().with::<Size>()).unwrap();
///
/// assert_eq!(REGISTRY.get::<u16>().get::<Size>().0, Some(2));
/// ```
pub trait TypeInfoModule: Any + Send + Sync + Sized {
    /// Creates the module for `info`.
    fn handle_type(info: &'static TypeInfo) -> Self;

    /// Called for reflected classes with the class attributes.
    fn handle_class(&mut self, _attributes: &'static AttributeContainer) {}

    /// Called once per template parameter, in order.
    fn handle_template_parameter(&mut self, _parameter: &'static TypeInfo) {}

    /// Called with the base class, if any.
    fn handle_base_class(&mut self, _base: &'static TypeInfo) {}

    /// Called once per member, in declaration order.
    fn handle_class_member(
        &mut self,
        _name: &'static str,
        _member: &'static TypeInfo,
        _attributes: &'static AttributeContainer,
    ) {
    }
}

// -----------------------------------------------------------------------------
// ErasedModule

/// Runs the composition steps of one module type.
trait ErasedModule: Send + Sync {
    fn module_id(&self) -> NativeTypeId;

    fn module_name(&self) -> &'static str;

    fn fill(
        &self,
        info: &'static TypeInfo,
        class: Option<&'static ClassDecl>,
    ) -> Box<dyn Any + Send + Sync>;
}

struct ModuleFiller<M>(PhantomData<fn() -> M>);

impl<M: TypeInfoModule> ErasedModule for ModuleFiller<M> {
    #[inline]
    fn module_id(&self) -> NativeTypeId {
        NativeTypeId::of::<M>()
    }

    #[inline]
    fn module_name(&self) -> &'static str {
        core::any::type_name::<M>()
    }

    fn fill(
        &self,
        info: &'static TypeInfo,
        class: Option<&'static ClassDecl>,
    ) -> Box<dyn Any + Send + Sync> {
        let registry = info.registry();
        let mut module = M::handle_type(info);

        if let Some(class) = class {
            if class.reflected {
                module.handle_class(&class.attributes);
            }
            for parameter in &class.template_params {
                module.handle_template_parameter(parameter(registry));
            }
            if let Some(base) = &class.base {
                module.handle_base_class((base.type_info)(registry));
            }
            for member in &class.members {
                module.handle_class_member(
                    member.name,
                    (member.type_info)(registry),
                    &member.attributes,
                );
            }
        }

        Box::new(module)
    }
}

// -----------------------------------------------------------------------------
// ModuleSet

/// The ordered list of modules every record of a registry is composed of.
///
/// # Examples
///
/// ```
/// use vc_rtti::module::{BasicTypeInfo, ClassTypeInfo, ModuleSet};
///
/// let set = ModuleSet::default();
/// assert!(set.contains::<BasicTypeInfo>());
/// assert!(set.contains::<ClassTypeInfo>());
///
/// let basic_only = ModuleSet::empty().with::<BasicTypeInfo>();
/// assert_eq!(basic_only.len(), 1);
/// ```
pub struct ModuleSet {
    modules: Vec<Box<dyn ErasedModule>>,
}

impl ModuleSet {
    /// A set without modules.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Appends module `M`. Adding a module twice has no effect.
    pub fn with<M: TypeInfoModule>(mut self) -> Self {
        if self.contains::<M>() {
            log::warn!(
                "type info module `{}` is already in the set",
                core::any::type_name::<M>()
            );
            return self;
        }
        self.modules.push(Box::new(ModuleFiller::<M>(PhantomData)));
        self
    }

    /// Returns `true` if `M` is part of the set.
    #[inline]
    pub fn contains<M: TypeInfoModule>(&self) -> bool {
        self.index_of(NativeTypeId::of::<M>()).is_some()
    }

    /// Number of modules.
    #[inline]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` if the set has no modules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Type names of the modules, in fill order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.modules.iter().map(|m| m.module_name())
    }

    pub(crate) fn index_of(&self, id: NativeTypeId) -> Option<usize> {
        self.modules.iter().position(|m| m.module_id() == id)
    }

    /// Fills module `index` of `info`.
    pub(crate) fn fill(
        &self,
        index: usize,
        info: &'static TypeInfo,
        class: Option<&'static ClassDecl>,
    ) -> Option<Box<dyn Any + Send + Sync>> {
        let module = self.modules.get(index)?;
        #[cfg(all(debug_assertions, feature = "debug"))]
        log::trace!("filling `{}` of `{}`", module.module_name(), info.name());
        Some(module.fill(info, class))
    }
}

impl Default for ModuleSet {
    fn default() -> Self {
        Self::empty().with::<BasicTypeInfo>().with::<ClassTypeInfo>()
    }
}

impl fmt::Debug for ModuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ClassTypeInfo, ModuleSet, TypeInfoModule};
    use crate::attributes::{AttributeContainer, Attributes};
    use crate::decl::{Reflect, TypeDecl};
    use crate::info::TypeInfo;
    use crate::registry::TypeRegistry;
    use alloc::vec::Vec;

    /// Records every hook call, to check the composition order.
    struct Trace {
        calls: Vec<&'static str>,
        members: Vec<&'static str>,
    }

    impl TypeInfoModule for Trace {
        fn handle_type(_info: &'static TypeInfo) -> Self {
            Trace {
                calls: alloc::vec!["type"],
                members: Vec::new(),
            }
        }

        fn handle_class(&mut self, _attributes: &'static AttributeContainer) {
            self.calls.push("class");
        }

        fn handle_template_parameter(&mut self, _parameter: &'static TypeInfo) {
            self.calls.push("template");
        }

        fn handle_base_class(&mut self, _base: &'static TypeInfo) {
            self.calls.push("base");
        }

        fn handle_class_member(
            &mut self,
            name: &'static str,
            _member: &'static TypeInfo,
            _attributes: &'static AttributeContainer,
        ) {
            self.calls.push("member");
            self.members.push(name);
        }
    }

    /// Tells whether a type has a `+=`-like operation, declared by attribute.
    struct Assignable(bool);

    struct AddAssign;
    impl Reflect for AddAssign {}

    impl TypeInfoModule for Assignable {
        fn handle_type(_info: &'static TypeInfo) -> Self {
            Assignable(false)
        }

        fn handle_class(&mut self, attributes: &'static AttributeContainer) {
            self.0 = attributes.contains::<AddAssign>();
        }
    }

    #[derive(Default)]
    struct Base {
        id: u32,
    }

    impl Reflect for Base {
        fn declare(decl: &mut TypeDecl<Self>) {
            decl.member("id", |b| &b.id, |b| &mut b.id);
        }
    }

    #[derive(Default)]
    struct Derived {
        base: Base,
        a: f32,
        b: f32,
    }

    impl Reflect for Derived {
        fn declare(decl: &mut TypeDecl<Self>) {
            decl.member("b", |d| &d.b, |d| &mut d.b)
                .base::<Base>(|d| &d.base, |d| &mut d.base)
                .template_parameter::<u8>()
                .class(Attributes::new().with(AddAssign))
                .member("a", |d| &d.a, |d| &mut d.a);
        }
    }

    static REGISTRY: TypeRegistry = TypeRegistry::new();

    fn registry() -> &'static TypeRegistry {
        // Tests share the registry; only the first configure succeeds.
        let _ = REGISTRY.configure(
            ModuleSet::default()
                .with::<Trace>()
                .with::<Assignable>()
                .with::<Trace>(),
        );
        &REGISTRY
    }

    #[test]
    fn hooks_run_in_fixed_order() {
        let trace = registry().get::<Derived>().get::<Trace>();
        assert_eq!(
            trace.calls,
            ["type", "class", "template", "base", "member", "member"]
        );
        assert_eq!(trace.members, ["b", "a"]);

        let trace = registry().get::<u32>().get::<Trace>();
        assert_eq!(trace.calls, ["type"]);
    }

    #[test]
    fn custom_module_reads_attributes() {
        assert!(registry().get::<Derived>().get::<Assignable>().0);
        assert!(!registry().get::<Base>().get::<Assignable>().0);
        assert!(registry().modules().contains::<ClassTypeInfo>());
        assert_eq!(registry().modules().len(), 4);
    }

    #[test]
    fn missing_module_is_none() {
        struct Unused;
        impl TypeInfoModule for Unused {
            fn handle_type(_info: &'static TypeInfo) -> Self {
                Unused
            }
        }

        assert!(registry().get::<u8>().module::<Unused>().is_none());
        assert!(TypeInfo::of::<u8>().module::<Trace>().is_none());
    }
}
