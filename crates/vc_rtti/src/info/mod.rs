//! Type descriptors and type records.
//!
//! - [`TypeDesc`]: the structure of a possibly-qualified type, with the
//!   canonical qualifier builders and the cast rules.
//! - [`TypeInfo`]: the unique runtime record of one descriptor inside a
//!   [`TypeRegistry`](crate::registry::TypeRegistry).
//! - [`Typed`]: maps Rust types (and the [`Const`], [`LvalueRef`] and
//!   [`RvalueRef`] markers) to descriptors.

// -----------------------------------------------------------------------------
// Modules

mod ops;
mod qualifier;
mod type_desc;
mod type_id;
mod type_info;
mod typed;

// -----------------------------------------------------------------------------
// Exports

pub(crate) use ops::{Cloner, Constructor, Storage, ValueOps};

pub use qualifier::QualifierFlags;
pub use type_desc::{BaseType, RefKind, TypeDesc};
pub use type_id::TypeId;
pub use type_info::TypeInfo;
pub use typed::{Const, LvalueRef, RvalueRef, Typed};
