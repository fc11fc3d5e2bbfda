use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::attributes::{AttributeContainer, impl_attribute_fns};
use crate::hash::HashMap;
use crate::info::TypeInfo;
use crate::module::TypeInfoModule;

// -----------------------------------------------------------------------------
// MemberDescription

/// A member of a reflected class.
#[derive(Debug, Clone)]
pub struct MemberDescription {
    name: &'static str,
    type_info: &'static TypeInfo,
    attributes: &'static AttributeContainer,
}

impl MemberDescription {
    /// The member name, unique within its class.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The record of the member type.
    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        self.type_info
    }

    /// The member attributes.
    #[inline]
    pub fn attributes(&self) -> &'static AttributeContainer {
        self.attributes
    }

    impl_attribute_fns!();
}

// -----------------------------------------------------------------------------
// ClassDescription

/// The class structure of a reflected type.
#[derive(Debug)]
pub struct ClassDescription {
    attributes: &'static AttributeContainer,
    template_parameters: Vec<&'static TypeInfo>,
    base_class: Option<&'static TypeInfo>,
    members: Vec<MemberDescription>,
    member_indices: HashMap<&'static str, usize>,
}

impl ClassDescription {
    fn new(attributes: &'static AttributeContainer) -> Self {
        Self {
            attributes,
            template_parameters: Vec::new(),
            base_class: None,
            members: Vec::new(),
            member_indices: HashMap::default(),
        }
    }

    /// The class attributes.
    #[inline]
    pub fn attributes(&self) -> &'static AttributeContainer {
        self.attributes
    }

    impl_attribute_fns!();

    /// Template parameters, in declaration order.
    #[inline]
    pub fn template_parameters(&self) -> &[&'static TypeInfo] {
        &self.template_parameters
    }

    /// The base class, if any.
    #[inline]
    pub fn base_class(&self) -> Option<&'static TypeInfo> {
        self.base_class
    }

    /// Own members in declaration order, base class members excluded.
    #[inline]
    pub fn members(&self) -> &[MemberDescription] {
        &self.members
    }

    /// Looks up an own member by name.
    pub fn member(&self, name: &str) -> Option<&MemberDescription> {
        let index = *self.member_indices.get(name)?;
        self.members.get(index)
    }

    /// Looks up a member by name, then through the base class chain.
    pub fn find_member(&self, name: &str) -> Option<&MemberDescription> {
        if let Some(member) = self.member(name) {
            return Some(member);
        }
        let mut base = self.base_class;
        while let Some(info) = base {
            let description = info.module::<ClassTypeInfo>()?.description()?;
            if let Some(member) = description.member(name) {
                return Some(member);
            }
            base = description.base_class;
        }
        None
    }
}

// -----------------------------------------------------------------------------
// ClassTypeInfo

/// Class structure of a type, absent for types that are not reflected
/// classes.
///
/// # Examples
///
/// ```
/// use vc_rtti::decl::{Reflect, TypeDecl};
/// use vc_rtti::info::TypeInfo;
/// use vc_rtti::module::ClassTypeInfo;
///
/// #[derive(Default)]
/// struct Vector2 { x: f32, y: f32 }
///
/// impl Reflect for Vector2 {
///     fn declare(decl: &mut TypeDecl<Self>) {
///         decl.member("x", |v| &v.x, |v| &mut v.x)
///             .member("y", |v| &v.y, |v| &mut v.y);
///     }
/// }
///
/// let class = TypeInfo::of::<Vector2>().get::<ClassTypeInfo>();
/// assert!(class.is_reflected_class());
/// let names: Vec<_> = class.description().unwrap().members().iter().map(|m| m.name()).collect();
/// assert_eq!(names, ["x", "y"]);
///
/// assert!(!TypeInfo::of::<f32>().get::<ClassTypeInfo>().is_reflected_class());
/// ```
#[derive(Debug, Default)]
pub struct ClassTypeInfo {
    description: Option<Box<ClassDescription>>,
}

impl ClassTypeInfo {
    /// Returns `true` if the type is a reflected class.
    #[inline]
    pub fn is_reflected_class(&self) -> bool {
        self.description.is_some()
    }

    /// The class structure, if the type is a reflected class.
    #[inline]
    pub fn description(&self) -> Option<&ClassDescription> {
        self.description.as_deref()
    }
}

impl TypeInfoModule for ClassTypeInfo {
    #[inline]
    fn handle_type(_info: &'static TypeInfo) -> Self {
        Self::default()
    }

    fn handle_class(&mut self, attributes: &'static AttributeContainer) {
        match &mut self.description {
            Some(description) => description.attributes = attributes,
            None => self.description = Some(Box::new(ClassDescription::new(attributes))),
        }
    }

    fn handle_template_parameter(&mut self, parameter: &'static TypeInfo) {
        if let Some(description) = &mut self.description {
            description.template_parameters.push(parameter);
        }
    }

    fn handle_base_class(&mut self, base: &'static TypeInfo) {
        if let Some(description) = &mut self.description {
            description.base_class = Some(base);
        }
    }

    fn handle_class_member(
        &mut self,
        name: &'static str,
        member: &'static TypeInfo,
        attributes: &'static AttributeContainer,
    ) {
        let Some(description) = &mut self.description else {
            return;
        };
        if description.member_indices.contains_key(name) {
            log::warn!("member `{name}` is already described, ignoring the new one");
            return;
        }
        description
            .member_indices
            .insert(name, description.members.len());
        description.members.push(MemberDescription {
            name,
            type_info: member,
            attributes,
        });
    }
}

// -----------------------------------------------------------------------------
// Tests
