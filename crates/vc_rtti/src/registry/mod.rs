//! The type registry.
//!
//! A [`TypeRegistry`] owns the records of one module configuration. Records
//! are created on first request and filled exactly once. Filling may request
//! other records, including the one being filled: such a reentrant request
//! on the same thread gets the partially filled record instead of waiting.
//!
//! Types can also be registered ahead of use, with
//! [`impl_auto_register!`](crate::impl_auto_register) and
//! [`TypeRegistry::auto_register`].

// -----------------------------------------------------------------------------
// Modules

mod auto_register;
mod error;
mod fill;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

#[cfg(feature = "auto_register")]
#[doc(hidden)]
pub use auto_register::AutoRegistration;

pub use error::RegistryError;
pub use type_registry::TypeRegistry;
