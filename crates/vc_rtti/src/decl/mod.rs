//! Declaring reflected types.
//!
//! A type opts in by implementing [`Reflect`]. Its [`declare`] hook fills a
//! [`TypeDecl`], which states what the type can do (default construction,
//! cloning) and what it is made of (class attributes, template parameters,
//! a base class, members). The declaration runs once per registry, the first
//! time the type's record is filled.
//!
//! [`declare`]: Reflect::declare

// -----------------------------------------------------------------------------
// Modules

mod access;
mod class;

// -----------------------------------------------------------------------------
// Exports

pub(crate) use access::Accessor;
pub(crate) use class::{BaseDecl, ClassDecl, Declaration, MemberDecl, PendingAttributes};

use alloc::borrow::Cow;
use core::marker::PhantomData;

use crate::attributes::{AttributeContainer, Attributes};
use crate::info::{Cloner, Constructor, Typed, ValueOps};
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// Reflect

/// A Rust type that can be described at runtime.
///
/// Primitives, `String` and `&'static str` are reflected by this crate;
/// other types implement the trait by hand or with
/// [`impl_reflect_opaque!`](crate::impl_reflect_opaque).
///
/// # Examples
///
/// ```
/// use vc_rtti::decl::{Reflect, TypeDecl};
/// use vc_rtti::info::TypeInfo;
///
/// #[derive(Default, Clone)]
/// struct Point { x: f32, y: f32 }
///
/// impl Reflect for Point {
///     fn type_name() -> std::borrow::Cow<'static, str> { "Point".into() }
///
///     fn declare(decl: &mut TypeDecl<Self>) {
///         decl.default_constructible()
///             .copyable()
///             .member("x", |p| &p.x, |p| &mut p.x)
///             .member("y", |p| &p.y, |p| &mut p.y);
///     }
/// }
///
/// let info = TypeInfo::of::<Point>();
/// assert_eq!(info.name(), "Point");
/// assert!(info.can_construct());
/// ```
pub trait Reflect: Sized + Send + Sync + 'static {
    /// The canonical name of the unqualified type.
    ///
    /// Defaults to [`core::any::type_name`]. The name is hashed into the
    /// [`TypeId`](crate::info::TypeId), so it should be unique.
    #[inline]
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed(core::any::type_name::<Self>())
    }

    /// States the capabilities and the class structure of the type.
    ///
    /// The default declares nothing: the type can be moved and dropped, but
    /// not constructed, and it is not a reflected class.
    #[inline]
    fn declare(decl: &mut TypeDecl<Self>) {
        let _ = decl;
    }
}

// -----------------------------------------------------------------------------
// TypeDecl

/// Builder handed to [`Reflect::declare`].
pub struct TypeDecl<T: Reflect> {
    ops: ValueOps,
    class: ClassDecl,
    attributes: PendingAttributes,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Reflect> TypeDecl<T> {
    fn new() -> Self {
        Self {
            ops: ValueOps::of::<T>(),
            class: ClassDecl::default(),
            attributes: PendingAttributes::default(),
            _marker: PhantomData,
        }
    }

    /// Values can be created with [`Default`].
    pub fn default_constructible(&mut self) -> &mut Self
    where
        T: Default,
    {
        self.ops.construct = Some(Constructor::defaulted::<T>());
        self
    }

    /// Values can be duplicated with [`Clone`].
    pub fn copyable(&mut self) -> &mut Self
    where
        T: Clone,
    {
        self.ops.clone = Some(Cloner::clonable::<T>());
        self
    }

    /// Declares the type a reflected class carrying `attributes`.
    ///
    /// Calling it again merges the attributes, later values replacing
    /// earlier ones of the same type.
    pub fn class(&mut self, attributes: Attributes) -> &mut Self {
        self.class.reflected = true;
        self.attributes.merge_class(attributes);
        self
    }

    /// Records `P` as the next template parameter of the type.
    ///
    /// This alone does not make the type a reflected class.
    pub fn template_parameter<P: Typed>(&mut self) -> &mut Self {
        self.class.template_params.push(TypeRegistry::get::<P>);
        self
    }

    /// Declares `B` the base class, reachable through the given upcasts.
    pub fn base<B: Reflect>(
        &mut self,
        upcast: fn(&T) -> &B,
        upcast_mut: fn(&mut T) -> &mut B,
    ) -> &mut Self {
        self.class.reflected = true;
        if self.class.base.is_some() {
            log::warn!(
                "`{}` declares more than one base class, `{}` replaces the previous one",
                T::type_name(),
                B::type_name(),
            );
        }
        self.class.base = Some(BaseDecl {
            type_info: TypeRegistry::get::<B>,
            access: Accessor::new(upcast, upcast_mut),
        });
        self
    }

    /// Declares a member without attributes.
    #[inline]
    pub fn member<M: Typed>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> &M,
        get_mut: fn(&mut T) -> &mut M,
    ) -> &mut Self {
        self.member_with(name, get, get_mut, Attributes::new())
    }

    /// Declares a member carrying `attributes`.
    ///
    /// Member names are unique within a class. A repeated name replaces the
    /// earlier member, keeping its position.
    pub fn member_with<M: Typed>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> &M,
        get_mut: fn(&mut T) -> &mut M,
        attributes: Attributes,
    ) -> &mut Self {
        self.class.reflected = true;
        let replaced = self.class.set_member(MemberDecl {
            name,
            type_info: TypeRegistry::get::<M>,
            attributes: AttributeContainer::new(),
            access: Accessor::new(get, get_mut),
        });
        if replaced {
            log::warn!(
                "`{}` declares member `{name}` twice, the later one wins",
                T::type_name(),
            );
        }
        self.attributes.set_member(name, attributes);
        self
    }

    fn finish(self) -> Declaration {
        let class = self.class.is_present().then_some(self.class);
        Declaration {
            ops: self.ops,
            class,
            attributes: self.attributes,
        }
    }
}

/// Runs the declaration of `T`.
pub(crate) fn declare_erased<T: Reflect>() -> Declaration {
    let mut decl = TypeDecl::<T>::new();
    T::declare(&mut decl);
    decl.finish()
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Reflect, TypeDecl, declare_erased};
    use crate::attributes::Attributes;
    use crate::enumerate::{MemberRef, for_each_reflected_member};
    use crate::module::ClassTypeInfo;
    use crate::registry::TypeRegistry;
    use crate::testing;
    use alloc::vec::Vec;

    #[derive(Default, Clone)]
    struct Sample {
        value: i32,
    }

    impl Reflect for Sample {
        fn declare(decl: &mut TypeDecl<Self>) {
            decl.default_constructible()
                .member("value", |s| &s.value, |s| &mut s.value);
        }
    }

    struct Twice {
        first: i32,
        second: i32,
        other: u8,
    }

    impl Reflect for Twice {
        fn declare(decl: &mut TypeDecl<Self>) {
            decl.member("x", |t| &t.first, |t| &mut t.first)
                .member("other", |t| &t.other, |t| &mut t.other)
                .member_with(
                    "x",
                    |t| &t.second,
                    |t| &mut t.second,
                    Attributes::new().with(7u16),
                );
        }
    }

    struct Tagged;

    impl Reflect for Tagged {
        fn declare(decl: &mut TypeDecl<Self>) {
            decl.template_parameter::<i32>();
        }
    }

    struct Labels;

    impl Reflect for Labels {
        fn declare(decl: &mut TypeDecl<Self>) {
            decl.class(Attributes::new().with(1u32).with(2u32))
                .class(Attributes::new().with(3u32).with(4i64));
        }
    }

    static REGISTRY: TypeRegistry = TypeRegistry::new();

    #[test]
    fn capabilities() {
        let decl = declare_erased::<Sample>();
        assert!(decl.ops.construct.is_some());
        assert!(decl.ops.clone.is_none());

        let class = decl.class.unwrap();
        assert!(class.reflected);
        assert_eq!(class.members.len(), 1);
        assert_eq!(class.members[0].name, "value");
    }

    #[test]
    fn later_member_wins() {
        testing::capture_warnings();

        let names: Vec<_> = declare_erased::<Twice>()
            .class
            .unwrap()
            .members
            .iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, ["x", "other"]);
        assert!(testing::warned(&["Twice", "`x`", "twice"]));

        let value = Twice {
            first: 1,
            second: 2,
            other: 3,
        };
        let mut seen = Vec::new();
        for_each_reflected_member(&value, false, |name: &'static str, member: MemberRef<'_>| {
            if name == "x" {
                seen.push(*member.downcast_ref::<i32>().unwrap());
                assert_eq!(member.get_attribute::<u16>(), Some(&7));
            }
        });
        assert_eq!(seen, [2]);
    }

    #[test]
    fn later_attribute_wins() {
        testing::capture_warnings();

        let class = REGISTRY.get::<Labels>().get::<ClassTypeInfo>();
        let attributes = class.description().unwrap().attributes();
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes.try_get::<u32>(), Some(&3));
        assert_eq!(attributes.try_get::<i64>(), Some(&4));
        assert!(testing::warned(&["u32", "twice"]));
    }

    #[test]
    fn template_parameter_alone_is_not_a_class() {
        let decl = declare_erased::<Tagged>();
        let class = decl.class.unwrap();
        assert!(!class.reflected);
        assert_eq!(class.template_params.len(), 1);
        assert_eq!((class.template_params[0])(&REGISTRY).name(), "i32");
    }

    #[test]
    fn plain_types_have_no_class() {
        struct Plain;
        impl Reflect for Plain {}

        let decl = declare_erased::<Plain>();
        assert!(decl.class.is_none());
        assert!(decl.ops.construct.is_none());
    }
}
