use vc_ptr::{Ptr, PtrMut};

use crate::data::{AccessError, DataObject};
use crate::decl::{ClassDecl, MemberDecl};
use crate::enumerate::{
    ClassVisitor, MemberMut, MemberRef, MemberTypeVisitor, MemberVisitor, MemberVisitorMut,
};
use crate::info::{TypeInfo, Typed};

// -----------------------------------------------------------------------------
// Class lookup

/// The record whose class facts describe values of `info`: const and
/// reference layers are looked through, pointers and arrays are not.
fn class_owner(mut info: &'static TypeInfo) -> &'static TypeInfo {
    while info.is_reference() || (info.is_const() && !info.is_pointer_or_array()) {
        info = info.next_unqualified();
    }
    info
}

/// The class facts of `info`, if it is a reflected class.
#[inline]
fn reflected_class(info: &'static TypeInfo) -> Option<&'static ClassDecl> {
    info.class_decl().filter(|class| class.reflected)
}

#[inline]
fn base_of(info: &'static TypeInfo, class: &ClassDecl) -> Option<&'static TypeInfo> {
    class.base.as_ref().map(|base| (base.type_info)(info.registry()))
}

// -----------------------------------------------------------------------------
// Walks

fn walk_classes(
    info: &'static TypeInfo,
    include_base: bool,
    f: &mut dyn FnMut(&'static TypeInfo, &'static ClassDecl),
) {
    let mut current = Some(class_owner(info));
    while let Some(info) = current {
        let Some(class) = reflected_class(info) else {
            return;
        };
        f(info, class);
        current = if include_base { base_of(info, class) } else { None };
    }
}

fn walk_members<'a>(
    info: &'static TypeInfo,
    owner: Ptr<'a>,
    include_base: bool,
    f: &mut dyn FnMut(&'static MemberDecl, &'static TypeInfo, Ptr<'a>),
) {
    let info = class_owner(info);
    let Some(class) = reflected_class(info) else {
        return;
    };
    let registry = info.registry();
    for member in &class.members {
        // SAFETY: `owner` points to a value of `info`, which declared the member.
        let ptr = unsafe { member.access.get(owner) };
        f(member, (member.type_info)(registry), ptr);
    }
    if include_base && let Some(base) = &class.base {
        // SAFETY: as above, for the base projection.
        let ptr = unsafe { base.access.get(owner) };
        walk_members((base.type_info)(registry), ptr, include_base, f);
    }
}

fn walk_members_mut(
    info: &'static TypeInfo,
    mut owner: PtrMut<'_>,
    include_base: bool,
    f: &mut dyn FnMut(&'static MemberDecl, &'static TypeInfo, PtrMut<'_>),
) {
    let info = class_owner(info);
    let Some(class) = reflected_class(info) else {
        return;
    };
    let registry = info.registry();
    for member in &class.members {
        // SAFETY: `owner` points to a value of `info`, which declared the member.
        let ptr = unsafe { member.access.get_mut(owner.reborrow()) };
        f(member, (member.type_info)(registry), ptr);
    }
    if include_base && let Some(base) = &class.base {
        // SAFETY: as above, for the base projection.
        let ptr = unsafe { base.access.get_mut(owner) };
        walk_members_mut((base.type_info)(registry), ptr, include_base, f);
    }
}

/// Finds the member `name` of the value at `owner`, own members first, then
/// the base chain.
fn find_member_mut<'b>(
    info: &'static TypeInfo,
    owner: PtrMut<'b>,
    name: &str,
) -> Option<(&'static MemberDecl, &'static TypeInfo, PtrMut<'b>)> {
    let info = class_owner(info);
    let class = reflected_class(info)?;
    let registry = info.registry();
    if let Some(member) = class.member(name) {
        // SAFETY: `owner` points to a value of `info`, which declared the member.
        let ptr = unsafe { member.access.get_mut(owner) };
        return Some((member, (member.type_info)(registry), ptr));
    }
    let base = class.base.as_ref()?;
    // SAFETY: as above, for the base projection.
    let ptr = unsafe { base.access.get_mut(owner) };
    find_member_mut((base.type_info)(registry), ptr, name)
}

// -----------------------------------------------------------------------------
// Entry points

/// Visits the class of `T`, then, if `include_base`, each class of its base
/// chain.
///
/// Nothing is visited if `T` is not a reflected class.
///
/// # Examples
///
/// ```
/// use vc_rtti::decl::{Reflect, TypeDecl};
/// use vc_rtti::enumerate::for_each_reflected_class;
/// use vc_rtti::info::TypeInfo;
///
/// #[derive(Default)]
/// struct Base;
/// impl Reflect for Base {
///     fn declare(decl: &mut TypeDecl<Self>) {
///         decl.class(Default::default());
///     }
/// }
///
/// #[derive(Default)]
/// struct Derived(Base);
/// impl Reflect for Derived {
///     fn declare(decl: &mut TypeDecl<Self>) {
///         decl.base::<Base>(|d| &d.0, |d| &mut d.0);
///     }
/// }
///
/// let mut classes = Vec::new();
/// for_each_reflected_class::<Derived, _>(true, |info: &'static TypeInfo| {
///     classes.push(info.name());
/// });
/// assert_eq!(classes.len(), 2);
/// ```
pub fn for_each_reflected_class<T: Typed, M>(
    include_base: bool,
    mut visitor: impl ClassVisitor<M>,
) {
    walk_classes(TypeInfo::of::<T>(), include_base, &mut |info, class| {
        visitor.visit_class(info, &class.attributes);
    });
}

/// Visits the declared members of `T` without a value: own members in
/// declaration order, then, if `include_base`, those of the base chain.
pub fn for_each_reflected_member_type<T: Typed, M>(
    include_base: bool,
    mut visitor: impl MemberTypeVisitor<M>,
) {
    walk_classes(TypeInfo::of::<T>(), include_base, &mut |info, class| {
        let registry = info.registry();
        for member in &class.members {
            let info = (member.type_info)(registry);
            visitor.visit_member_type(member.name, info, &member.attributes);
        }
    });
}

/// Visits the members of `value`: own members in declaration order, then,
/// if `include_base`, those of the base chain.
///
/// # Examples
///
/// ```
/// use vc_rtti::decl::{Reflect, TypeDecl};
/// use vc_rtti::enumerate::{MemberRef, for_each_reflected_member};
///
/// #[derive(Default)]
/// struct Size {
///     width: u32,
///     height: u32,
/// }
///
/// impl Reflect for Size {
///     fn declare(decl: &mut TypeDecl<Self>) {
///         decl.member::<u32>("width", |s| &s.width, |s| &mut s.width)
///             .member::<u32>("height", |s| &s.height, |s| &mut s.height);
///     }
/// }
///
/// let mut area = 1;
/// let size = Size { width: 3, height: 4 };
/// for_each_reflected_member(&size, false, |_: &str, m: MemberRef<'_>| {
///     area *= m.downcast_ref::<u32>().unwrap();
/// });
/// assert_eq!(area, 12);
/// ```
pub fn for_each_reflected_member<T: Typed, M>(
    value: &T,
    include_base: bool,
    mut visitor: impl MemberVisitor<M>,
) {
    let owner = Ptr::from_ref(value);
    walk_members(TypeInfo::of::<T>(), owner, include_base, &mut |member, info, ptr| {
        visitor.visit_member(MemberRef::new(member.name, info, ptr, &member.attributes));
    });
}

/// [`for_each_reflected_member`] with exclusive member views.
pub fn for_each_reflected_member_mut<T: Typed, M>(
    value: &mut T,
    include_base: bool,
    mut visitor: impl MemberVisitorMut<M>,
) {
    let owner = PtrMut::from_mut(value);
    walk_members_mut(TypeInfo::of::<T>(), owner, include_base, &mut |member, info, ptr| {
        visitor.visit_member_mut(MemberMut::new(member.name, info, ptr, &member.attributes));
    });
}

/// Walks the members of `src` and visits each one together with the member
/// of `dst` of the same name.
///
/// Members of `src` are walked like [`for_each_reflected_member`]. The
/// matching member of `dst` is searched in its own members, then in its
/// base chain. Members without a match are skipped. The two members may
/// have different types.
///
/// # Examples
///
/// ```
/// use vc_rtti::decl::{Reflect, TypeDecl};
/// use vc_rtti::enumerate::{MemberMut, MemberRef, for_each_reflected_member_in_both};
///
/// #[derive(Default)]
/// struct Celsius {
///     temperature: f32,
///     label: String,
/// }
///
/// #[derive(Default)]
/// struct Fahrenheit {
///     temperature: f64,
///     label: String,
/// }
///
/// impl Reflect for Celsius {
///     fn declare(decl: &mut TypeDecl<Self>) {
///         decl.member::<f32>("temperature", |c| &c.temperature, |c| &mut c.temperature)
///             .member::<String>("label", |c| &c.label, |c| &mut c.label);
///     }
/// }
///
/// impl Reflect for Fahrenheit {
///     fn declare(decl: &mut TypeDecl<Self>) {
///         decl.member::<f64>("temperature", |f| &f.temperature, |f| &mut f.temperature)
///             .member::<String>("label", |f| &f.label, |f| &mut f.label);
///     }
/// }
///
/// let src = Celsius { temperature: 100.0, label: "boiling".into() };
/// let mut dst = Fahrenheit::default();
/// for_each_reflected_member_in_both(&src, &mut dst, false, |_, from, mut to| {
///     if !to.assign_from(from) {
///         let celsius = *from.downcast_ref::<f32>().unwrap();
///         *to.downcast_mut::<f64>().unwrap() = f64::from(celsius) * 1.8 + 32.0;
///     }
/// });
/// assert_eq!(dst.temperature, 212.0);
/// assert_eq!(dst.label, "boiling");
/// ```
pub fn for_each_reflected_member_in_both<A: Typed, B: Typed>(
    src: &A,
    dst: &mut B,
    include_base: bool,
    mut visitor: impl FnMut(&'static str, MemberRef<'_>, MemberMut<'_>),
) {
    let dst_info = TypeInfo::of::<B>();
    let mut dst = PtrMut::from_mut(dst);
    let src = Ptr::from_ref(src);
    walk_members(TypeInfo::of::<A>(), src, include_base, &mut |member, info, ptr| {
        let Some((found, found_info, found_ptr)) =
            find_member_mut(dst_info, dst.reborrow(), member.name)
        else {
            return;
        };
        visitor(
            member.name,
            MemberRef::new(member.name, info, ptr, &member.attributes),
            MemberMut::new(found.name, found_info, found_ptr, &found.attributes),
        );
    });
}

// -----------------------------------------------------------------------------
// DataObject walks

impl DataObject<'_> {
    /// Visits the members of the held value, see [`for_each_reflected_member`].
    ///
    /// Nothing is visited for the null object.
    pub fn for_each_member<M>(&self, include_base: bool, mut visitor: impl MemberVisitor<M>) {
        let (Some(info), Some(ptr)) = (self.type_info(), self.as_ptr()) else {
            return;
        };
        walk_members(info, ptr, include_base, &mut |member, info, ptr| {
            visitor.visit_member(MemberRef::new(member.name, info, ptr, &member.attributes));
        });
    }

    /// Visits the members of the held value with exclusive views, see
    /// [`for_each_reflected_member_mut`].
    ///
    /// Fails unless the value is mutable and this is its only handle.
    pub fn for_each_member_mut<M>(
        &mut self,
        include_base: bool,
        mut visitor: impl MemberVisitorMut<M>,
    ) -> Result<(), AccessError> {
        let info = self.type_info().ok_or(AccessError::Null)?;
        self.check_exclusive(info)?;
        // SAFETY: the value is mutable and not shared.
        let Some(ptr) = (unsafe { self.as_ptr_mut() }) else {
            return Err(AccessError::Null);
        };
        walk_members_mut(info, ptr, include_base, &mut |member, info, ptr| {
            visitor.visit_member_mut(MemberMut::new(member.name, info, ptr, &member.attributes));
        });
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::attributes::{AttributeContainer, Attributes};
    use crate::data::{AccessError, DataObject};
    use crate::decl::{Reflect, TypeDecl};
    use crate::enumerate::{
        MemberMut, MemberRef, for_each_reflected_class, for_each_reflected_member,
        for_each_reflected_member_in_both, for_each_reflected_member_mut,
        for_each_reflected_member_type,
    };
    use crate::info::TypeInfo;
    use alloc::string::String;
    use alloc::vec::Vec;

    struct Label(&'static str);
    impl Reflect for Label {}

    #[derive(Default, Clone)]
    struct Shape {
        id: u32,
        tag: String,
    }

    impl Reflect for Shape {
        fn declare(decl: &mut TypeDecl<Self>) {
            decl.default_constructible()
                .copyable()
                .class(Attributes::new().with(Label("shape")))
                .member::<u32>("id", |s| &s.id, |s| &mut s.id)
                .member_with::<String>(
                    "tag",
                    |s| &s.tag,
                    |s| &mut s.tag,
                    Attributes::new().with(Label("display name")),
                );
        }
    }

    #[derive(Default, Clone)]
    struct Circle {
        shape: Shape,
        radius: f32,
        center: [f32; 2],
    }

    impl Reflect for Circle {
        fn declare(decl: &mut TypeDecl<Self>) {
            decl.default_constructible()
                .copyable()
                .base::<Shape>(|c| &c.shape, |c| &mut c.shape)
                .member::<f32>("radius", |c| &c.radius, |c| &mut c.radius)
                .member::<[f32; 2]>("center", |c| &c.center, |c| &mut c.center);
        }
    }

    fn circle() -> Circle {
        Circle {
            shape: Shape {
                id: 7,
                tag: String::from("wheel"),
            },
            radius: 2.0,
            center: [1.0, -1.0],
        }
    }

    #[test]
    fn classes_then_bases() {
        let mut count = 0;
        for_each_reflected_class::<Circle, _>(true, || count += 1);
        assert_eq!(count, 2);

        count = 0;
        for_each_reflected_class::<Circle, _>(false, || count += 1);
        assert_eq!(count, 1);

        let mut labels = Vec::new();
        for_each_reflected_class::<Circle, _>(
            true,
            |info: &'static TypeInfo, attributes: &'static AttributeContainer| {
                labels.push((info.name(), attributes.try_get::<Label>().map(|l| l.0)));
            },
        );
        assert_eq!(labels[1], (TypeInfo::of::<Shape>().name(), Some("shape")));
        assert_eq!(labels[0].1, None);

        count = 0;
        for_each_reflected_class::<u8, _>(true, || count += 1);
        for_each_reflected_class::<*const Circle, _>(true, || count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn own_members_before_base_members() {
        let mut names = Vec::new();
        for_each_reflected_member_type::<Circle, _>(true, |name: &'static str| names.push(name));
        assert_eq!(names, ["radius", "center", "id", "tag"]);

        names.clear();
        for_each_reflected_member_type::<Circle, _>(false, |name: &'static str| names.push(name));
        assert_eq!(names, ["radius", "center"]);

        let mut types = Vec::new();
        for_each_reflected_member_type::<Shape, _>(
            false,
            |_: &'static str, info: &'static TypeInfo| types.push(info),
        );
        assert_eq!(types, [TypeInfo::of::<u32>(), TypeInfo::of::<String>()]);
    }

    #[test]
    fn shared_walk_reads_values_and_attributes() {
        let value = circle();
        let mut visits = 0;
        for_each_reflected_member(&value, true, || visits += 1);
        assert_eq!(visits, 4);

        let mut found = None;
        for_each_reflected_member(
            &value,
            true,
            |name: &'static str, member: MemberRef<'_>, attributes: &'static AttributeContainer| {
                if let Some(label) = attributes.try_get::<Label>() {
                    found = Some((name, label.0, member.downcast_ref::<String>().cloned()));
                }
            },
        );
        assert_eq!(found, Some(("tag", "display name", Some(String::from("wheel")))));

        let mut radius = None;
        for_each_reflected_member(&value, false, |_: &str, member: MemberRef<'_>| {
            if let Some(r) = member.downcast_ref::<f32>() {
                radius = Some(*r);
            }
            assert!(member.downcast_ref::<u32>().is_none());
        });
        assert_eq!(radius, Some(2.0));
    }

    #[test]
    fn exclusive_walk_mutates() {
        let mut value = circle();
        for_each_reflected_member_mut(&mut value, true, |_: &str, mut member: MemberMut<'_>| {
            if let Some(id) = member.downcast_mut::<u32>() {
                *id += 1;
            } else if let Some(center) = member.downcast_mut::<[f32; 2]>() {
                *center = [0.0; 2];
            }
        });
        assert_eq!(value.shape.id, 8);
        assert_eq!(value.center, [0.0, 0.0]);
        assert_eq!(value.radius, 2.0);
    }

    #[derive(Default, Clone, Copy, PartialEq, Debug)]
    struct Vector3 {
        x: f32,
        y: f32,
        z: f32,
    }

    impl Reflect for Vector3 {
        fn declare(decl: &mut TypeDecl<Self>) {
            decl.default_constructible()
                .copyable()
                .member::<f32>("x", |v| &v.x, |v| &mut v.x)
                .member::<f32>("y", |v| &v.y, |v| &mut v.y)
                .member::<f32>("z", |v| &v.z, |v| &mut v.z);
        }
    }

    #[derive(Default, Clone, Copy, PartialEq, Debug)]
    struct Array3([f32; 3]);

    impl Reflect for Array3 {
        fn declare(decl: &mut TypeDecl<Self>) {
            decl.default_constructible().copyable().class(Attributes::new());
        }
    }

    #[derive(Default)]
    struct Source {
        f: f32,
        pos: Vector3,
        only_here: u8,
    }

    impl Reflect for Source {
        fn declare(decl: &mut TypeDecl<Self>) {
            decl.member::<f32>("f", |s| &s.f, |s| &mut s.f)
                .member::<Vector3>("pos", |s| &s.pos, |s| &mut s.pos)
                .member::<u8>("only_here", |s| &s.only_here, |s| &mut s.only_here);
        }
    }

    #[derive(Default)]
    struct Target {
        f: f32,
        pos: Array3,
    }

    impl Reflect for Target {
        fn declare(decl: &mut TypeDecl<Self>) {
            decl.member::<f32>("f", |t| &t.f, |t| &mut t.f)
                .member::<Array3>("pos", |t| &t.pos, |t| &mut t.pos);
        }
    }

    #[test]
    fn binary_walk_matches_by_name() {
        let src = Source {
            f: 0.5,
            pos: Vector3 {
                x: 1.0,
                y: 2.0,
                z: 3.0,
            },
            only_here: 9,
        };
        let mut dst = Target::default();
        let mut visited = Vec::new();

        for_each_reflected_member_in_both(&src, &mut dst, true, |name, from, mut to| {
            visited.push(name);
            if to.assign_from(from) {
                return;
            }
            assert_eq!(from.type_info(), TypeInfo::of::<Vector3>());
            assert_eq!(to.type_info(), TypeInfo::of::<Array3>());
            let v = from.downcast_ref::<Vector3>().unwrap();
            *to.downcast_mut::<Array3>().unwrap() = Array3([v.x, v.y, v.z]);
        });

        assert_eq!(visited, ["f", "pos"]);
        assert_eq!(dst.f, 0.5);
        assert_eq!(dst.pos, Array3([1.0, 2.0, 3.0]));
    }

    #[test]
    fn binary_walk_finds_base_members() {
        let src = circle();
        let mut dst = Circle::default();
        let mut copied = 0;
        for_each_reflected_member_in_both(&src.shape, &mut dst, false, |_, from, mut to| {
            if to.assign_from(from) {
                copied += 1;
            }
        });
        assert_eq!(copied, 2);
        assert_eq!(dst.shape.id, 7);
        assert_eq!(dst.shape.tag, "wheel");
        assert_eq!(dst.radius, 0.0);
    }

    #[test]
    fn data_object_walks() {
        let object = DataObject::create_moved(circle());
        let mut names = Vec::new();
        object.for_each_member(true, |name: &'static str| names.push(name));
        assert_eq!(names, ["radius", "center", "id", "tag"]);

        let value = circle();
        let wrapped = DataObject::wrap_ref(&value);
        let mut count = 0;
        wrapped.for_each_member(false, || count += 1);
        assert_eq!(count, 2);

        let mut shared = object.clone();
        assert_eq!(
            shared.for_each_member_mut(true, || {}),
            Err(AccessError::Shared(2))
        );
        drop(object);
        shared
            .for_each_member_mut(true, |_: &str, mut member: MemberMut<'_>| {
                if let Some(radius) = member.downcast_mut::<f32>() {
                    *radius *= 2.0;
                }
            })
            .unwrap();
        assert_eq!(shared.try_get::<Circle>().unwrap().radius, 4.0);

        let mut read_only = DataObject::wrap_ref(&value);
        assert!(matches!(
            read_only.for_each_member_mut(true, || {}),
            Err(AccessError::ReadOnly(_))
        ));
        assert_eq!(DataObject::null().for_each_member_mut(true, || {}), Err(AccessError::Null));
    }
}
