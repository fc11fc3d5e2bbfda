//! Runtime type records composed from pluggable modules.
//!
//! **Records**
//!
//! Every [`Typed`](info::Typed) type, including its const, pointer,
//! reference and array forms, has one [`TypeInfo`](info::TypeInfo) per
//! [`TypeRegistry`](registry::TypeRegistry). Records are created lazily,
//! filled exactly once, and answer capability and cast queries.
//!
//! **Declarations**
//!
//! A type opts in with [`Reflect`](decl::Reflect), stating what it can do
//! and what it is made of: class attributes, template parameters, a base
//! class and named members.
//!
//! **Modules**
//!
//! The metadata kept per record is a [`ModuleSet`](module::ModuleSet) of
//! [`TypeInfoModule`](module::TypeInfoModule)s, filled from the declaration
//! in a fixed order. [`BasicTypeInfo`](module::BasicTypeInfo) and
//! [`ClassTypeInfo`](module::ClassTypeInfo) are the defaults.
//!
//! **Values**
//!
//! [`DataObject`](data::DataObject) is a shared, type-erased handle to an
//! owned or borrowed value. Members of reflected values are walked with the
//! functions in [`enumerate`].
//!
//! # Examples
//!
//! ```
//! use vc_rtti::data::DataObject;
//! use vc_rtti::decl::{Reflect, TypeDecl};
//! use vc_rtti::enumerate::for_each_reflected_member_type;
//! use vc_rtti::info::TypeInfo;
//!
//! #[derive(Default, Clone)]
//! struct Player {
//!     name: String,
//!     health: u32,
//! }
//!
//! impl Reflect for Player {
//!     fn declare(decl: &mut TypeDecl<Self>) {
//!         decl.default_constructible()
//!             .copyable()
//!             .member::<String>("name", |p| &p.name, |p| &mut p.name)
//!             .member::<u32>("health", |p| &p.health, |p| &mut p.health);
//!     }
//! }
//!
//! let info = TypeInfo::of::<Player>();
//! assert!(info.can_construct());
//!
//! let player = info.construct();
//! assert_eq!(player.try_get::<Player>().map(|p| p.health), Ok(0));
//!
//! let mut names = Vec::new();
//! for_each_reflected_member_type::<Player, _>(false, |name: &'static str| names.push(name));
//! assert_eq!(names, ["name", "health"]);
//! ```
#![expect(unsafe_code, reason = "Type-erased values are inherently unsafe.")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;
extern crate std;

// -----------------------------------------------------------------------------
// Modules

pub mod attributes;
pub mod data;
pub mod decl;
pub mod enumerate;
pub mod hash;
pub mod impls;
pub mod info;
pub mod module;
pub mod param;
pub mod registry;

#[cfg(test)]
mod testing;

// -----------------------------------------------------------------------------
// Top-level exports

#[doc(hidden)]
pub mod __macro_exports {
    pub use alloc::borrow::Cow;

    #[cfg(feature = "auto_register")]
    pub use crate::registry::AutoRegistration;
    #[cfg(feature = "auto_register")]
    pub use inventory;
}

pub use data::DataObject;
pub use decl::Reflect;
pub use info::{TypeInfo, Typed};
pub use registry::TypeRegistry;
