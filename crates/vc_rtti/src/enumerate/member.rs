use core::fmt;
use core::ptr::NonNull;

use vc_ptr::{ErasedBox, OwningPtr, Ptr, PtrMut};

use crate::attributes::{AttributeContainer, impl_attribute_fns};
use crate::info::{TypeInfo, Typed};

// -----------------------------------------------------------------------------
// MemberRef

/// A shared view of one member during a walk.
#[derive(Clone, Copy)]
pub struct MemberRef<'a> {
    name: &'static str,
    type_info: &'static TypeInfo,
    ptr: Ptr<'a>,
    attributes: &'static AttributeContainer,
}

impl<'a> MemberRef<'a> {
    #[inline]
    pub(crate) fn new(
        name: &'static str,
        type_info: &'static TypeInfo,
        ptr: Ptr<'a>,
        attributes: &'static AttributeContainer,
    ) -> Self {
        Self {
            name,
            type_info,
            ptr,
            attributes,
        }
    }

    /// The declared member name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The record of the declared member type.
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

    /// The untyped address of the member.
    #[inline]
    pub fn as_ptr(&self) -> Ptr<'a> {
        self.ptr
    }

    /// Returns `true` if the member is declared as an `M`.
    #[inline]
    pub fn is<M: Typed>(&self) -> bool {
        self.type_info == self.type_info.registry().get::<M>()
    }

    /// Borrows the member as an `M`, if it is declared as one.
    #[inline]
    pub fn downcast_ref<M: Typed>(&self) -> Option<&'a M> {
        // SAFETY: the member is an `M`.
        self.is::<M>().then(|| unsafe { self.ptr.as_ref::<M>() })
    }
}

impl fmt::Debug for MemberRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberRef")
            .field("name", &self.name)
            .field("type", &self.type_info.name())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// MemberMut

/// An exclusive view of one member during a walk.
pub struct MemberMut<'a> {
    name: &'static str,
    type_info: &'static TypeInfo,
    ptr: PtrMut<'a>,
    attributes: &'static AttributeContainer,
}

impl<'a> MemberMut<'a> {
    #[inline]
    pub(crate) fn new(
        name: &'static str,
        type_info: &'static TypeInfo,
        ptr: PtrMut<'a>,
        attributes: &'static AttributeContainer,
    ) -> Self {
        Self {
            name,
            type_info,
            ptr,
            attributes,
        }
    }

    /// The declared member name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The record of the declared member type.
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

    /// Reborrows as a shared view.
    #[inline]
    pub fn as_ref(&self) -> MemberRef<'_> {
        MemberRef::new(self.name, self.type_info, self.ptr.borrow(), self.attributes)
    }

    /// The untyped address of the member.
    #[inline]
    pub fn as_ptr_mut(&mut self) -> PtrMut<'_> {
        self.ptr.reborrow()
    }

    /// Returns `true` if the member is declared as an `M`.
    #[inline]
    pub fn is<M: Typed>(&self) -> bool {
        self.type_info == self.type_info.registry().get::<M>()
    }

    /// Borrows the member as an `M`, if it is declared as one.
    #[inline]
    pub fn downcast_ref<M: Typed>(&self) -> Option<&M> {
        // SAFETY: the member is an `M`.
        self.is::<M>().then(|| unsafe { self.ptr.as_ref::<M>() })
    }

    /// Borrows the member as a mutable `M`, if it is declared as one.
    #[inline]
    pub fn downcast_mut<M: Typed>(&mut self) -> Option<&mut M> {
        if self.is::<M>() {
            // SAFETY: the member is an `M`.
            Some(unsafe { self.ptr.as_mut::<M>() })
        } else {
            None
        }
    }

    /// Converts into a mutable `M`, if the member is declared as one.
    #[inline]
    pub fn into_mut<M: Typed>(self) -> Option<&'a mut M> {
        if self.is::<M>() {
            // SAFETY: the member is an `M`.
            Some(unsafe { self.ptr.consume::<M>() })
        } else {
            None
        }
    }

    /// Replaces the member with a clone of `src`.
    ///
    /// Returns `false`, leaving the member untouched, if `src` has a
    /// different type or the type cannot be cloned.
    pub fn assign_from(&mut self, src: MemberRef<'_>) -> bool {
        let info = self.type_info;
        if src.type_info != info || !info.can_copy_construct() {
            return false;
        }
        let Some(dst) = NonNull::new(self.ptr.as_ptr()) else {
            return false;
        };
        let Some(layout) = info.layout() else {
            return false;
        };
        let Some(scratch) = ErasedBox::new_uninit(layout) else {
            return false;
        };

        // SAFETY: `src` is a valid value of `info`; the scratch storage is
        // sized for it. The old value is dropped before the bitwise move of
        // the clone, which the scratch storage then forgets.
        unsafe {
            info.storage().clone_in_place(src.ptr, scratch.as_owning());
            info.destruct(OwningPtr::new(dst));
            core::ptr::copy_nonoverlapping(
                scratch.as_non_null().as_ptr(),
                dst.as_ptr(),
                layout.size(),
            );
        }
        true
    }
}

impl fmt::Debug for MemberMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberMut")
            .field("name", &self.name)
            .field("type", &self.type_info.name())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{MemberMut, MemberRef};
    use crate::attributes::AttributeContainer;
    use crate::info::TypeInfo;
    use alloc::string::String;
    use vc_ptr::{Ptr, PtrMut};

    #[test]
    fn assign_same_typed_values_only() {
        let src = String::from("new");
        let mut dst = String::from("old");
        let mut count = 5u32;

        let from = MemberRef::new(
            "name",
            TypeInfo::of::<String>(),
            Ptr::from_ref(&src),
            AttributeContainer::EMPTY,
        );
        {
            let mut to = MemberMut::new(
                "name",
                TypeInfo::of::<String>(),
                PtrMut::from_mut(&mut dst),
                AttributeContainer::EMPTY,
            );
            assert!(to.assign_from(from));
            assert_eq!(to.downcast_ref::<String>().map(String::as_str), Some("new"));
        }
        {
            let mut to = MemberMut::new(
                "count",
                TypeInfo::of::<u32>(),
                PtrMut::from_mut(&mut count),
                AttributeContainer::EMPTY,
            );
            assert!(!to.assign_from(from));
        }

        assert_eq!(dst, "new");
        assert_eq!(src, "new");
        assert_eq!(count, 5);
    }
}
