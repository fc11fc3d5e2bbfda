use alloc::borrow::Cow;
use alloc::boxed::Box;
use core::any::TypeId as NativeTypeId;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::decl::{Declaration, Reflect, declare_erased};
use crate::info::{QualifierFlags, Typed};

// -----------------------------------------------------------------------------
// BaseType

/// An unqualified Rust type that can sit at the bottom of a [`TypeDesc`].
///
/// Identity is the compiler's [`TypeId`](core::any::TypeId); the other fields
/// are hooks used while filling the type record.
#[derive(Clone, Copy)]
pub struct BaseType {
    native_id: NativeTypeId,
    type_name: fn() -> Cow<'static, str>,
    declare: fn() -> Declaration,
}

impl BaseType {
    /// Returns the base type for `T`.
    #[inline]
    pub fn of<T: Reflect>() -> Self {
        Self {
            native_id: NativeTypeId::of::<T>(),
            type_name: T::type_name,
            declare: declare_erased::<T>,
        }
    }

    /// The compiler's identity of this type.
    #[inline]
    pub fn native_id(&self) -> NativeTypeId {
        self.native_id
    }

    /// The canonical name, see [`Reflect::type_name`].
    #[inline]
    pub fn type_name(&self) -> Cow<'static, str> {
        (self.type_name)()
    }

    /// Runs [`Reflect::declare`] and erases the result.
    #[inline]
    pub(crate) fn declaration(&self) -> Declaration {
        (self.declare)()
    }
}

impl PartialEq for BaseType {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.native_id == other.native_id
    }
}

impl Eq for BaseType {}

impl Hash for BaseType {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.native_id.hash(state);
    }
}

impl fmt::Debug for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}

// -----------------------------------------------------------------------------
// RefKind

/// Which kind of reference a [`TypeDesc::Reference`] layer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    /// A plain borrow, `&T` or `&mut T`.
    LValue,
    /// A borrow whose referent may be moved out.
    RValue,
}

// -----------------------------------------------------------------------------
// TypeDesc

/// Structural description of a possibly-qualified type.
///
/// Every descriptor maps to exactly one [`TypeInfo`](crate::info::TypeInfo).
/// The `add_*` builders keep descriptors canonical:
///
/// - const is idempotent and has no effect on references;
/// - const on an array moves onto its elements;
/// - references to references collapse, lvalue winning;
/// - pointers and arrays cannot hold references, the reference is dropped.
///
/// Descriptors assembled directly from the variants are canonicalized by
/// the registry before use.
///
/// # Examples
///
/// ```
/// use vc_rtti::info::TypeDesc;
///
/// let desc = TypeDesc::of::<i32>().add_const().add_pointer();
/// assert_eq!(desc.to_string(), "*const i32");
/// assert_eq!(desc.next_unqualified().to_string(), "const i32");
/// assert_eq!(desc.next_unqualified().next_unqualified().to_string(), "i32");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    /// An unqualified value type.
    Plain(BaseType),
    /// A const-qualified type (value or pointer).
    Const(Box<TypeDesc>),
    /// A raw pointer to the inner type.
    Pointer(Box<TypeDesc>),
    /// A reference to the inner type.
    Reference(RefKind, Box<TypeDesc>),
    /// `len` consecutive values of the inner type.
    Array(Box<TypeDesc>, usize),
}

impl TypeDesc {
    /// Returns the descriptor of `T`.
    #[inline]
    pub fn of<T: Typed + ?Sized>() -> TypeDesc {
        T::type_desc()
    }

    /// Describes an unqualified base type.
    #[inline]
    pub const fn plain(base: BaseType) -> TypeDesc {
        TypeDesc::Plain(base)
    }

    /// Adds a const qualifier.
    pub fn add_const(self) -> TypeDesc {
        match self {
            TypeDesc::Const(_) | TypeDesc::Reference(..) => self,
            TypeDesc::Array(element, len) => TypeDesc::Array(Box::new(element.add_const()), len),
            other => TypeDesc::Const(Box::new(other)),
        }
    }

    /// Wraps in a raw pointer.
    pub fn add_pointer(self) -> TypeDesc {
        TypeDesc::Pointer(Box::new(self.remove_reference()))
    }

    /// Wraps in an lvalue reference.
    #[inline]
    pub fn add_lvalue_reference(self) -> TypeDesc {
        self.add_reference(RefKind::LValue)
    }

    /// Wraps in an rvalue reference.
    #[inline]
    pub fn add_rvalue_reference(self) -> TypeDesc {
        self.add_reference(RefKind::RValue)
    }

    /// Wraps in a reference of the given kind.
    pub fn add_reference(self, kind: RefKind) -> TypeDesc {
        match self {
            TypeDesc::Reference(inner_kind, inner) => {
                let kind = if kind == RefKind::LValue || inner_kind == RefKind::LValue {
                    RefKind::LValue
                } else {
                    RefKind::RValue
                };
                TypeDesc::Reference(kind, inner)
            }
            other => TypeDesc::Reference(kind, Box::new(other)),
        }
    }

    /// Wraps in an array of `len` elements.
    pub fn add_array(self, len: usize) -> TypeDesc {
        TypeDesc::Array(Box::new(self.remove_reference()), len)
    }

    /// Drops an outer reference layer, if any.
    pub fn remove_reference(self) -> TypeDesc {
        match self {
            TypeDesc::Reference(_, inner) => *inner,
            other => other,
        }
    }

    /// Rebuilds the descriptor through the canonical builders.
    pub fn canonicalize(self) -> TypeDesc {
        match self {
            TypeDesc::Plain(_) => self,
            TypeDesc::Const(inner) => inner.canonicalize().add_const(),
            TypeDesc::Pointer(inner) => inner.canonicalize().add_pointer(),
            TypeDesc::Reference(kind, inner) => inner.canonicalize().add_reference(kind),
            TypeDesc::Array(inner, len) => inner.canonicalize().add_array(len),
        }
    }

    /// Returns `true` if the builders would leave the descriptor unchanged.
    pub fn is_canonical(&self) -> bool {
        match self {
            TypeDesc::Plain(_) => true,
            TypeDesc::Const(inner) => {
                matches!(**inner, TypeDesc::Plain(_) | TypeDesc::Pointer(_)) && inner.is_canonical()
            }
            TypeDesc::Pointer(inner) | TypeDesc::Array(inner, _) => {
                !inner.is_reference() && inner.is_canonical()
            }
            TypeDesc::Reference(_, inner) => !inner.is_reference() && inner.is_canonical(),
        }
    }

    /// The qualifiers of the outermost layer.
    pub fn flags(&self) -> QualifierFlags {
        match self {
            TypeDesc::Plain(_) => QualifierFlags::empty(),
            TypeDesc::Const(inner) => QualifierFlags::CONST | inner.flags(),
            TypeDesc::Pointer(_) => QualifierFlags::POINTER,
            TypeDesc::Reference(RefKind::LValue, _) => QualifierFlags::LVALUE_REF,
            TypeDesc::Reference(RefKind::RValue, _) => QualifierFlags::RVALUE_REF,
            TypeDesc::Array(element, _) => {
                QualifierFlags::ARRAY | (element.flags() & QualifierFlags::CONST)
            }
        }
    }

    /// Returns `true` for a const value, a const pointer, or an array of const.
    #[inline]
    pub fn is_const(&self) -> bool {
        self.flags().contains(QualifierFlags::CONST)
    }

    /// Returns `true` for a raw pointer layer.
    #[inline]
    pub fn is_pointer(&self) -> bool {
        self.flags().contains(QualifierFlags::POINTER)
    }

    /// Returns `true` for a reference layer of either kind.
    #[inline]
    pub fn is_reference(&self) -> bool {
        matches!(self, TypeDesc::Reference(..))
    }

    /// Returns `true` for an array layer.
    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, TypeDesc::Array(..))
    }

    /// Returns `true` for a pointer or array layer.
    #[inline]
    pub fn is_pointer_or_array(&self) -> bool {
        self.flags().is_pointer_or_array()
    }

    /// The base type whose declaration describes values of this type.
    ///
    /// Only plain and const plain descriptors have one.
    pub(crate) fn value_base(&self) -> Option<&BaseType> {
        match self {
            TypeDesc::Plain(base) => Some(base),
            TypeDesc::Const(inner) => match &**inner {
                TypeDesc::Plain(base) => Some(base),
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns `true` if any qualifier is present.
    #[inline]
    pub fn is_qualified(&self) -> bool {
        !matches!(self, TypeDesc::Plain(_))
    }

    /// The array length, if this is an array layer.
    #[inline]
    pub fn array_len(&self) -> Option<usize> {
        match self {
            TypeDesc::Array(_, len) => Some(*len),
            _ => None,
        }
    }

    /// Strips exactly one qualifier layer.
    ///
    /// - references yield the referent;
    /// - pointers (const or not) yield the pointee;
    /// - arrays yield the element without its const;
    /// - const values yield the value.
    ///
    /// An unqualified descriptor yields itself.
    pub fn next_unqualified(&self) -> &TypeDesc {
        match self {
            TypeDesc::Plain(_) => self,
            TypeDesc::Pointer(inner) | TypeDesc::Reference(_, inner) => inner,
            TypeDesc::Const(inner) => match &**inner {
                TypeDesc::Pointer(pointee) => pointee,
                _ => inner,
            },
            TypeDesc::Array(element, _) => match &**element {
                TypeDesc::Const(value) => value,
                _ => element,
            },
        }
    }

    /// Strips every qualifier layer.
    pub fn fully_unqualified(&self) -> &BaseType {
        let mut desc = self;
        loop {
            match desc {
                TypeDesc::Plain(base) => return base,
                other => desc = other.next_unqualified(),
            }
        }
    }

    /// Returns `true` if a value of this type may be viewed as `other`.
    ///
    /// Rules, first failure wins:
    /// 1. identical descriptors always cast;
    /// 2. references are transparent: strip them from both sides;
    /// 3. const never becomes mutable, except that an array of const casts to
    ///    a pointer whose pointee is const;
    /// 4. pointer and array layers must line up: arrays decay to pointers,
    ///    never the reverse, and only one array dimension may decay;
    /// 5. the remaining base types must be identical. Conversions between
    ///    base and derived classes are not casts.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_rtti::info::{Const, TypeDesc};
    ///
    /// let array = TypeDesc::of::<[Const<u8>; 4]>();
    /// assert!(array.can_cast_to(&TypeDesc::of::<*const u8>()));
    /// assert!(!array.can_cast_to(&TypeDesc::of::<*mut u8>()));
    /// ```
    pub fn can_cast_to(&self, other: &TypeDesc) -> bool {
        if self == other {
            return true;
        }

        if self.is_reference() || other.is_reference() {
            return self
                .strip_reference()
                .can_cast_to(other.strip_reference());
        }

        if self.is_const() {
            let target_is_const = if self.is_array() && other.is_pointer() {
                other.next_unqualified().is_const()
            } else {
                other.is_const()
            };
            if !target_is_const {
                return false;
            }
        }

        if self.is_pointer_or_array() || other.is_pointer_or_array() {
            if !(self.is_pointer_or_array() && other.is_pointer()) {
                return false;
            }
            let next = self.next_unqualified();
            if next.is_array() {
                return false;
            }
            return next.can_cast_to(other.next_unqualified());
        }

        self.fully_unqualified() == other.fully_unqualified()
    }

    #[inline]
    fn strip_reference(&self) -> &TypeDesc {
        match self {
            TypeDesc::Reference(_, inner) => inner,
            _ => self,
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Plain(base) => f.write_str(&base.type_name()),
            TypeDesc::Const(inner) => write!(f, "const {inner}"),
            TypeDesc::Pointer(inner) => match &**inner {
                TypeDesc::Const(pointee) => write!(f, "*const {pointee}"),
                pointee => write!(f, "*mut {pointee}"),
            },
            TypeDesc::Reference(RefKind::LValue, inner) => match &**inner {
                TypeDesc::Const(referent) => write!(f, "&{referent}"),
                referent => write!(f, "&mut {referent}"),
            },
            TypeDesc::Reference(RefKind::RValue, inner) => write!(f, "&move {inner}"),
            TypeDesc::Array(element, len) => write!(f, "[{element}; {len}]"),
        }
    }
}

impl fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDesc({self})")
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{RefKind, TypeDesc};
    use crate::info::{Const, QualifierFlags};
    use alloc::boxed::Box;
    use alloc::string::ToString;

    fn int() -> TypeDesc {
        TypeDesc::of::<i32>()
    }

    #[test]
    fn const_moves_onto_array_elements() {
        let desc = int().add_array(4).add_const();
        assert_eq!(desc, int().add_const().add_array(4));
        assert_eq!(desc.flags(), QualifierFlags::ARRAY | QualifierFlags::CONST);
        assert_eq!(desc.next_unqualified(), &int());
    }

    #[test]
    fn references_collapse() {
        let desc = int().add_rvalue_reference().add_lvalue_reference();
        assert_eq!(desc, int().add_lvalue_reference());
        assert_eq!(int().add_lvalue_reference().add_const(), int().add_lvalue_reference());
    }

    #[test]
    fn canonicalize_raw_variants() {
        let raw = TypeDesc::Const(Box::new(TypeDesc::Array(
            Box::new(TypeDesc::Reference(RefKind::LValue, Box::new(int()))),
            2,
        )));
        assert!(!raw.is_canonical());
        let canonical = raw.canonicalize();
        assert!(canonical.is_canonical());
        assert_eq!(canonical, TypeDesc::of::<[Const<i32>; 2]>());
    }

    #[test]
    fn const_pointer_flags() {
        let desc = int().add_pointer().add_const();
        assert_eq!(desc.flags(), QualifierFlags::CONST | QualifierFlags::POINTER);
        assert_eq!(desc.next_unqualified(), &int());
        assert_eq!(desc.to_string(), "const *mut i32");
    }

    #[test]
    fn names() {
        assert_eq!(TypeDesc::of::<*const *mut f32>().to_string(), "*const *mut f32");
        assert_eq!(TypeDesc::of::<[Const<f32>; 3]>().to_string(), "[const f32; 3]");
        assert_eq!(int().add_lvalue_reference().to_string(), "&mut i32");
        assert_eq!(int().add_const().add_lvalue_reference().to_string(), "&i32");
        assert_eq!(int().add_rvalue_reference().to_string(), "&move i32");
    }

    #[test]
    fn fully_unqualified_reaches_base() {
        let desc = TypeDesc::of::<*const [*mut u8; 2]>().add_lvalue_reference();
        assert_eq!(desc.fully_unqualified(), TypeDesc::of::<u8>().fully_unqualified());
    }

    #[test]
    fn multi_dimension_arrays_do_not_decay() {
        let grid = TypeDesc::of::<[[i32; 2]; 2]>();
        assert!(!grid.can_cast_to(&TypeDesc::of::<*mut i32>()));
        assert!(grid.can_cast_to(&grid.clone()));
    }

    #[test]
    fn arrays_are_not_targets() {
        assert!(!int().can_cast_to(&int().add_array(4)));
        assert!(!int().add_pointer().can_cast_to(&int().add_array(4)));
        assert!(int().add_array(4).can_cast_to(&int().add_pointer()));
    }
}
