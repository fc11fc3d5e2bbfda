use crate::attributes::AttributeContainer;
use crate::enumerate::{MemberMut, MemberRef};
use crate::info::TypeInfo;

// -----------------------------------------------------------------------------
// ClassVisitor

/// A callback for [`for_each_reflected_class`].
///
/// Implemented for closures taking nothing, the class record, or the class
/// record and its attributes. `Marker` tells the implementations apart and
/// is always inferred.
///
/// [`for_each_reflected_class`]: crate::enumerate::for_each_reflected_class
pub trait ClassVisitor<Marker> {
    fn visit_class(&mut self, info: &'static TypeInfo, attributes: &'static AttributeContainer);
}

impl<F: FnMut()> ClassVisitor<fn()> for F {
    #[inline]
    fn visit_class(&mut self, _: &'static TypeInfo, _: &'static AttributeContainer) {
        self()
    }
}

impl<F: FnMut(&'static TypeInfo)> ClassVisitor<fn(&'static TypeInfo)> for F {
    #[inline]
    fn visit_class(&mut self, info: &'static TypeInfo, _: &'static AttributeContainer) {
        self(info)
    }
}

impl<F> ClassVisitor<fn(&'static TypeInfo, &'static AttributeContainer)> for F
where
    F: FnMut(&'static TypeInfo, &'static AttributeContainer),
{
    #[inline]
    fn visit_class(&mut self, info: &'static TypeInfo, attributes: &'static AttributeContainer) {
        self(info, attributes)
    }
}

// -----------------------------------------------------------------------------
// MemberTypeVisitor

/// A callback for [`for_each_reflected_member_type`].
///
/// Implemented for closures taking nothing, the member name, the name and
/// the member record, or the name, the record and the member attributes.
///
/// [`for_each_reflected_member_type`]: crate::enumerate::for_each_reflected_member_type
pub trait MemberTypeVisitor<Marker> {
    fn visit_member_type(
        &mut self,
        name: &'static str,
        info: &'static TypeInfo,
        attributes: &'static AttributeContainer,
    );
}

impl<F: FnMut()> MemberTypeVisitor<fn()> for F {
    #[inline]
    fn visit_member_type(
        &mut self,
        _: &'static str,
        _: &'static TypeInfo,
        _: &'static AttributeContainer,
    ) {
        self()
    }
}

impl<F: FnMut(&'static str)> MemberTypeVisitor<fn(&'static str)> for F {
    #[inline]
    fn visit_member_type(
        &mut self,
        name: &'static str,
        _: &'static TypeInfo,
        _: &'static AttributeContainer,
    ) {
        self(name)
    }
}

impl<F> MemberTypeVisitor<fn(&'static str, &'static TypeInfo)> for F
where
    F: FnMut(&'static str, &'static TypeInfo),
{
    #[inline]
    fn visit_member_type(
        &mut self,
        name: &'static str,
        info: &'static TypeInfo,
        _: &'static AttributeContainer,
    ) {
        self(name, info)
    }
}

impl<F> MemberTypeVisitor<fn(&'static str, &'static TypeInfo, &'static AttributeContainer)> for F
where
    F: FnMut(&'static str, &'static TypeInfo, &'static AttributeContainer),
{
    #[inline]
    fn visit_member_type(
        &mut self,
        name: &'static str,
        info: &'static TypeInfo,
        attributes: &'static AttributeContainer,
    ) {
        self(name, info, attributes)
    }
}

// -----------------------------------------------------------------------------
// MemberVisitor

/// A callback for shared member walks, see [`for_each_reflected_member`].
///
/// Implemented for closures taking nothing, the member name, the name and a
/// [`MemberRef`], or the name, the view and the member attributes.
///
/// [`for_each_reflected_member`]: crate::enumerate::for_each_reflected_member
pub trait MemberVisitor<Marker> {
    fn visit_member(&mut self, member: MemberRef<'_>);
}

impl<F: FnMut()> MemberVisitor<fn()> for F {
    #[inline]
    fn visit_member(&mut self, _: MemberRef<'_>) {
        self()
    }
}

impl<F: FnMut(&'static str)> MemberVisitor<fn(&'static str)> for F {
    #[inline]
    fn visit_member(&mut self, member: MemberRef<'_>) {
        self(member.name())
    }
}

impl<F> MemberVisitor<fn(&'static str, MemberRef<'_>)> for F
where
    F: FnMut(&'static str, MemberRef<'_>),
{
    #[inline]
    fn visit_member(&mut self, member: MemberRef<'_>) {
        self(member.name(), member)
    }
}

impl<F> MemberVisitor<fn(&'static str, MemberRef<'_>, &'static AttributeContainer)> for F
where
    F: FnMut(&'static str, MemberRef<'_>, &'static AttributeContainer),
{
    #[inline]
    fn visit_member(&mut self, member: MemberRef<'_>) {
        self(member.name(), member, member.attributes())
    }
}

// -----------------------------------------------------------------------------
// MemberVisitorMut

/// A callback for exclusive member walks, see
/// [`for_each_reflected_member_mut`].
///
/// The same shapes as [`MemberVisitor`], with [`MemberMut`] views.
///
/// [`for_each_reflected_member_mut`]: crate::enumerate::for_each_reflected_member_mut
pub trait MemberVisitorMut<Marker> {
    fn visit_member_mut(&mut self, member: MemberMut<'_>);
}

impl<F: FnMut()> MemberVisitorMut<fn()> for F {
    #[inline]
    fn visit_member_mut(&mut self, _: MemberMut<'_>) {
        self()
    }
}

impl<F: FnMut(&'static str)> MemberVisitorMut<fn(&'static str)> for F {
    #[inline]
    fn visit_member_mut(&mut self, member: MemberMut<'_>) {
        self(member.name())
    }
}

impl<F> MemberVisitorMut<fn(&'static str, MemberMut<'_>)> for F
where
    F: FnMut(&'static str, MemberMut<'_>),
{
    #[inline]
    fn visit_member_mut(&mut self, member: MemberMut<'_>) {
        self(member.name(), member)
    }
}

impl<F> MemberVisitorMut<fn(&'static str, MemberMut<'_>, &'static AttributeContainer)> for F
where
    F: FnMut(&'static str, MemberMut<'_>, &'static AttributeContainer),
{
    #[inline]
    fn visit_member_mut(&mut self, member: MemberMut<'_>) {
        let (name, attributes) = (member.name(), member.attributes());
        self(name, member, attributes)
    }
}
