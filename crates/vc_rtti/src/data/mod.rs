//! Type-erased values.
//!
//! A [`DataObject`] pairs a pointer with the [`TypeInfo`] of the value it
//! designates. It can own a value created from a record, or wrap a borrowed
//! one, and gives checked typed access to it.
//!
//! [`TypeInfo`]: crate::info::TypeInfo

// -----------------------------------------------------------------------------
// Modules

mod data_object;
mod error;

// -----------------------------------------------------------------------------
// Exports

pub use data_object::{DataObject, PointerMode};
pub use error::{AccessError, ConstructError};
