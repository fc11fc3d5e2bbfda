//! Type-erased pointers and heap storage for the runtime type records.
//!
//! **Ptr** and **PtrMut**
//!
//! [`Ptr<'a>`] and [`PtrMut<'a>`] are untyped `&T` and `&mut T`. They keep the
//! borrow lifetime and offer debug alignment checks, while the pointee type
//! is tracked by whoever hands them out.
//!
//! **OwningPtr**
//!
//! [`OwningPtr<'a>`] owns the pointee but not the storage. It is what a
//! type-erased constructor writes into and what a type-erased destructor
//! consumes.
//!
//! **ErasedBox**
//!
//! [`ErasedBox`] owns a heap allocation described only by a
//! [`Layout`](core::alloc::Layout). It frees the memory on drop and never runs
//! the destructor of the value inside.
#![expect(unsafe_code, reason = "Raw pointers are inherently unsafe.")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod erased_box;
mod type_erased;

// -----------------------------------------------------------------------------
// Top-level exports

pub use erased_box::ErasedBox;
pub use type_erased::{OwningPtr, Ptr, PtrMut};
