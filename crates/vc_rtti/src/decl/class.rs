use alloc::vec::Vec;

use crate::attributes::{AttributeContainer, Attributes};
use crate::decl::Accessor;
use crate::info::{TypeInfo, ValueOps};
use crate::registry::TypeRegistry;

/// Resolves a record inside a registry.
pub(crate) type TypeInfoFn = fn(&'static TypeRegistry) -> &'static TypeInfo;

// -----------------------------------------------------------------------------
// Declaration

/// Everything [`Reflect::declare`](crate::decl::Reflect::declare) produced
/// for a base type, with the Rust types erased.
#[derive(Debug)]
pub(crate) struct Declaration {
    pub(crate) ops: ValueOps,
    pub(crate) class: Option<ClassDecl>,
    pub(crate) attributes: PendingAttributes,
}

impl Declaration {
    /// Moves the attribute values into `registry` and returns the class
    /// facts, if any.
    ///
    /// Must run after the storage of the declaring record is set, since an
    /// attribute may be a value of the declaring type itself.
    pub(crate) fn into_class(self, registry: &'static TypeRegistry) -> Option<ClassDecl> {
        let mut class = self.class?;
        self.attributes.resolve_into(&mut class, registry);
        Some(class)
    }
}

// -----------------------------------------------------------------------------
// PendingAttributes

/// Attribute values collected by a declaration, not yet registered.
#[derive(Debug, Default)]
pub(crate) struct PendingAttributes {
    class: Attributes,
    members: Vec<(&'static str, Attributes)>,
}

impl PendingAttributes {
    pub(crate) fn merge_class(&mut self, attributes: Attributes) {
        self.class.merge(attributes);
    }

    pub(crate) fn set_member(&mut self, name: &'static str, attributes: Attributes) {
        self.members.retain(|(member, _)| *member != name);
        self.members.push((name, attributes));
    }

    fn resolve_into(self, class: &mut ClassDecl, registry: &'static TypeRegistry) {
        class.attributes = self.class.resolve(registry);
        for (name, attributes) in self.members {
            if let Some(member) = class.members.iter_mut().find(|m| m.name == name) {
                member.attributes = attributes.resolve(registry);
            }
        }
    }
}

// -----------------------------------------------------------------------------
// ClassDecl

/// The class facts of a type: its attributes, template parameters, base
/// class and members, in declaration order.
#[derive(Debug, Default)]
pub(crate) struct ClassDecl {
    /// Set once the type is declared a class, or declares a base or a member.
    pub(crate) reflected: bool,
    pub(crate) attributes: AttributeContainer,
    pub(crate) template_params: Vec<TypeInfoFn>,
    pub(crate) base: Option<BaseDecl>,
    pub(crate) members: Vec<MemberDecl>,
}

impl ClassDecl {
    /// Returns `true` if the declaration carries any class fact.
    #[inline]
    pub(crate) fn is_present(&self) -> bool {
        self.reflected || !self.template_params.is_empty()
    }

    pub(crate) fn member(&self, name: &str) -> Option<&MemberDecl> {
        self.members.iter().find(|m| m.name == name)
    }

    fn member_index(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name == name)
    }

    /// Adds `member`, replacing a member of the same name in place.
    ///
    /// Returns `true` if a member was replaced.
    pub(crate) fn set_member(&mut self, member: MemberDecl) -> bool {
        match self.member_index(member.name) {
            Some(index) => {
                self.members[index] = member;
                true
            }
            None => {
                self.members.push(member);
                false
            }
        }
    }
}

/// The single base class of a class.
#[derive(Debug)]
pub(crate) struct BaseDecl {
    pub(crate) type_info: TypeInfoFn,
    pub(crate) access: Accessor,
}

/// A named member of a class.
#[derive(Debug)]
pub(crate) struct MemberDecl {
    pub(crate) name: &'static str,
    pub(crate) type_info: TypeInfoFn,
    pub(crate) attributes: AttributeContainer,
    pub(crate) access: Accessor,
}
