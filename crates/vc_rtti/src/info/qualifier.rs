use bitflags::bitflags;

bitflags! {
    /// Qualifiers present on the outermost layer of a type.
    ///
    /// A const pointer carries `CONST | POINTER`; an array of const elements
    /// carries `ARRAY | CONST`, because const on an array always applies to
    /// its elements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct QualifierFlags: u8 {
        /// The value may not be mutated through this type.
        const CONST       = 1 << 0;
        /// A raw pointer (`*const T` / `*mut T`).
        const POINTER     = 1 << 1;
        /// An lvalue reference (`&T` / `&mut T`).
        const LVALUE_REF  = 1 << 2;
        /// An rvalue reference, the borrowed-for-move form.
        const RVALUE_REF  = 1 << 3;
        /// A fixed-length array.
        const ARRAY       = 1 << 4;
    }
}

impl QualifierFlags {
    /// Either reference kind.
    pub const REFERENCE: Self = Self::LVALUE_REF.union(Self::RVALUE_REF);

    /// Returns `true` if this is any kind of reference.
    #[inline]
    pub const fn is_reference(self) -> bool {
        self.intersects(Self::REFERENCE)
    }

    /// Returns `true` if this is a pointer or an array.
    #[inline]
    pub const fn is_pointer_or_array(self) -> bool {
        self.intersects(Self::POINTER.union(Self::ARRAY))
    }
}
