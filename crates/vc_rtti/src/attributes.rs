//! Attributes attached to classes and members.
//!
//! Declarations collect attribute values with the [`Attributes`] builder.
//! Once the owning record is filled they live in an [`AttributeContainer`],
//! keyed by the [`TypeId`] of the attribute type, at most one value per type.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::data::DataObject;
use crate::decl::Reflect;
use crate::hash::{HashMap, NoOpHashState};
use crate::info::{TypeId, TypeInfo};
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// Attributes

type MakeAttribute = Box<dyn FnOnce(&'static TypeRegistry) -> DataObject<'static>>;

struct PendingAttribute {
    type_id: TypeId,
    type_name: fn() -> Cow<'static, str>,
    make: MakeAttribute,
}

/// Attribute values of one class or member, before they are registered.
///
/// # Examples
///
/// ```
/// use vc_rtti::attributes::Attributes;
///
/// let attributes = Attributes::new().with(0.5f32).with("tooltip");
/// assert_eq!(attributes.len(), 2);
/// ```
#[derive(Default)]
pub struct Attributes {
    pending: Vec<PendingAttribute>,
}

impl Attributes {
    /// No attributes.
    #[inline]
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Adds `value`, replacing an earlier value of the same type.
    pub fn with<A: Reflect>(mut self, value: A) -> Self {
        self.push(PendingAttribute {
            type_id: TypeId::of::<A>(),
            type_name: A::type_name,
            make: Box::new(move |registry| DataObject::create_moved_in(registry, value)),
        });
        self
    }

    /// Number of attribute values.
    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if there are no attribute values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Adds every value of `other`, later values replacing earlier ones.
    pub(crate) fn merge(&mut self, other: Attributes) {
        for attribute in other.pending {
            self.push(attribute);
        }
    }

    fn push(&mut self, attribute: PendingAttribute) {
        if let Some(index) = self.pending.iter().position(|p| p.type_id == attribute.type_id) {
            log::warn!(
                "attribute `{}` is given twice, the later value wins",
                (attribute.type_name)(),
            );
            self.pending.remove(index);
        }
        self.pending.push(attribute);
    }

    /// Moves the values into records of `registry`.
    ///
    /// The records of the value types must be able to move values, so this
    /// runs once the storage of the declaring record is known.
    pub(crate) fn resolve(self, registry: &'static TypeRegistry) -> AttributeContainer {
        let mut container = AttributeContainer::new();
        for attribute in self.pending {
            let data = (attribute.make)(registry);
            if data.is_null() {
                log::warn!(
                    "attribute `{}` cannot be moved into its record and is dropped",
                    (attribute.type_name)(),
                );
                continue;
            }
            container.attributes.insert(attribute.type_id, AttributeData { data });
        }
        container
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attributes")
            .field("len", &self.pending.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// AttributeData

/// One owned, type-erased attribute value.
#[derive(Clone)]
pub struct AttributeData {
    data: DataObject<'static>,
}

impl AttributeData {
    /// The record of the stored value.
    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        match self.data.type_info() {
            Some(info) => info,
            None => unreachable!("attribute data is never null"),
        }
    }

    /// Returns `true` if the value is exactly an `A`.
    #[inline]
    pub fn is_type<A: Reflect>(&self) -> bool {
        self.data.is_exact_type::<A>()
    }

    /// Returns the value if it is an `A`.
    #[inline]
    pub fn try_get<A: Reflect>(&self) -> Option<&A> {
        self.data.try_get::<A>().ok()
    }

    /// The value as a [`DataObject`].
    #[inline]
    pub fn data(&self) -> &DataObject<'static> {
        &self.data
    }
}

impl fmt::Debug for AttributeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AttributeData")
            .field(&self.type_info().name())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// AttributeContainer

/// Attribute values keyed by the [`TypeId`] of their type.
///
/// # Examples
///
/// ```
/// use vc_rtti::attributes::Attributes;
/// use vc_rtti::decl::{Reflect, TypeDecl};
/// use vc_rtti::module::ClassTypeInfo;
/// use vc_rtti::info::TypeInfo;
///
/// struct Tooltip(&'static str);
/// impl Reflect for Tooltip {}
///
/// struct Widget;
/// impl Reflect for Widget {
///     fn declare(decl: &mut TypeDecl<Self>) {
///         decl.class(Attributes::new().with(Tooltip("a widget")));
///     }
/// }
///
/// let class = TypeInfo::of::<Widget>().get::<ClassTypeInfo>();
/// let attributes = class.description().unwrap().attributes();
/// assert_eq!(attributes.try_get::<Tooltip>().unwrap().0, "a widget");
/// assert!(attributes.try_get::<u32>().is_none());
/// ```
#[derive(Clone, Default)]
pub struct AttributeContainer {
    attributes: HashMap<TypeId, AttributeData, NoOpHashState>,
}

impl AttributeContainer {
    /// A shared empty container.
    pub const EMPTY: &'static Self = &Self::new();

    /// Creates an empty container.
    #[inline]
    pub const fn new() -> Self {
        Self {
            attributes: HashMap::with_hasher(NoOpHashState),
        }
    }

    /// Returns the value of type `A`, if present.
    pub fn try_get<A: Reflect>(&self) -> Option<&A> {
        self.attributes.get(&TypeId::of::<A>())?.try_get::<A>()
    }

    /// Returns the entry for `type_id`, if present.
    #[inline]
    pub fn get_by_id(&self, type_id: TypeId) -> Option<&AttributeData> {
        self.attributes.get(&type_id)
    }

    /// Returns `true` if a value of type `A` is present.
    #[inline]
    pub fn contains<A: Reflect>(&self) -> bool {
        self.attributes.contains_key(&TypeId::of::<A>())
    }

    /// Iterates over the entries, in no particular order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (TypeId, &AttributeData)> {
        self.attributes.iter().map(|(id, data)| (*id, data))
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns `true` if there are no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

}

impl fmt::Debug for AttributeContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.attributes.values()).finish()
    }
}

// -----------------------------------------------------------------------------
// Accessor helpers

/// Implements attribute lookups for a type with an `attributes()` method
/// returning `&AttributeContainer`.
macro_rules! impl_attribute_fns {
    () => {
        /// Returns the attribute of type `A`, if present.
        #[inline]
        pub fn get_attribute<A: $crate::decl::Reflect>(&self) -> Option<&A> {
            self.attributes().try_get::<A>()
        }

        /// Returns the attribute with the given identity, if present.
        #[inline]
        pub fn get_attribute_by_id(
            &self,
            type_id: $crate::info::TypeId,
        ) -> Option<&$crate::attributes::AttributeData> {
            self.attributes().get_by_id(type_id)
        }

        /// Returns `true` if an attribute of type `A` is present.
        #[inline]
        pub fn has_attribute<A: $crate::decl::Reflect>(&self) -> bool {
            self.attributes().contains::<A>()
        }
    };
}

pub(crate) use impl_attribute_fns;

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{AttributeContainer, Attributes};
    use crate::decl::{Reflect, TypeDecl};
    use crate::info::TypeId;
    use crate::module::ClassTypeInfo;
    use crate::registry::TypeRegistry;
    use alloc::string::String;

    static REGISTRY: TypeRegistry = TypeRegistry::new();

    #[derive(Debug, PartialEq)]
    struct Version(u32);

    impl Reflect for Version {
        fn declare(decl: &mut TypeDecl<Self>) {
            decl.class(Attributes::new().with(Version(1))).member_with(
                "number",
                |v| &v.0,
                |v| &mut v.0,
                Attributes::new().with(Version(2)),
            );
        }
    }

    #[test]
    fn later_values_replace_earlier() {
        let container = Attributes::new()
            .with(1u8)
            .with(String::from("name"))
            .with(2u8)
            .resolve(&REGISTRY);

        assert_eq!(container.len(), 2);
        assert_eq!(container.try_get::<u8>(), Some(&2));
        assert_eq!(container.try_get::<String>().map(String::as_str), Some("name"));
        assert!(container.contains::<String>());
        assert!(!container.contains::<u16>());
    }

    #[test]
    fn entries_know_their_type() {
        let container = Attributes::new().with(0.25f64).resolve(&REGISTRY);
        let entry = container.get_by_id(TypeId::of::<f64>()).unwrap();

        assert!(entry.is_type::<f64>());
        assert!(!entry.is_type::<f32>());
        assert_eq!(entry.type_info().name(), "f64");
        assert!(core::ptr::eq(entry.type_info(), REGISTRY.get::<f64>()));
    }

    #[test]
    fn empty_container() {
        assert!(AttributeContainer::EMPTY.is_empty());
        assert_eq!(AttributeContainer::EMPTY.iter().count(), 0);
        assert!(AttributeContainer::EMPTY.try_get::<u8>().is_none());
    }

    #[test]
    fn values_of_the_declaring_type() {
        let info = REGISTRY.get::<Version>();
        let description = info.get::<ClassTypeInfo>().description().unwrap();

        let attributes = description.attributes();
        assert_eq!(attributes.try_get::<Version>(), Some(&Version(1)));
        let entry = attributes.get_by_id(TypeId::of::<Version>()).unwrap();
        assert!(core::ptr::eq(entry.type_info(), info));

        let number = description.member("number").unwrap();
        assert_eq!(number.get_attribute::<Version>(), Some(&Version(2)));
    }
}
