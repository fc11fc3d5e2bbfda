//! Member and class enumeration.
//!
//! Walks visit the reflected classes or members of a type, own members
//! first in declaration order, then, on request, those of the base chain.
//! Visitors are closures; the arguments they receive depend on the
//! parameters they take, see [`MemberVisitor`] and friends.
//!
//! [`for_each_reflected_member_in_both`] pairs the members of two values
//! by name, for copies between types that share member names but not
//! layouts.

// -----------------------------------------------------------------------------
// Modules

mod member;
mod visitor;
mod walk;

// -----------------------------------------------------------------------------
// Exports

pub use member::{MemberMut, MemberRef};
pub use visitor::{ClassVisitor, MemberTypeVisitor, MemberVisitor, MemberVisitorMut};
pub use walk::{
    for_each_reflected_class, for_each_reflected_member, for_each_reflected_member_in_both,
    for_each_reflected_member_mut, for_each_reflected_member_type,
};
