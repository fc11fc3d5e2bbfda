//! Reflection of foreign types.
//!
//! ## Implemented Menu
//!
//! - `bool`, `char`, `()`
//! - `i8`-`i128`, `u8`-`u128`, `isize`, `usize`, `f32`, `f64`
//! - `String`, `&'static str`
//!
//! All of them are default constructible and copyable. Qualified forms
//! (`Const<T>`, pointers, arrays) come with [`Typed`](crate::info::Typed).

// -----------------------------------------------------------------------------
// Modules

mod primitives;

// -----------------------------------------------------------------------------
// Macros

/// Implements [`Reflect`](crate::decl::Reflect) for a value type without
/// class structure.
///
/// The flags in parentheses declare capabilities:
/// - `default`: default constructible, needs [`Default`];
/// - `clone`: copyable, needs [`Clone`].
///
/// The type name defaults to [`core::any::type_name`]; `as "Name"`
/// overrides it.
///
/// # Examples
///
/// ```
/// use vc_rtti::impl_reflect_opaque;
/// use vc_rtti::info::TypeInfo;
///
/// #[derive(Default, Clone)]
/// pub struct Handle(u32);
///
/// impl_reflect_opaque!(Handle as "Handle" => (default, clone));
///
/// let info = TypeInfo::of::<Handle>();
/// assert_eq!(info.name(), "Handle");
/// assert!(info.can_construct());
/// assert!(info.can_copy_construct());
/// ```
#[macro_export]
macro_rules! impl_reflect_opaque {
    ($ty:ty => ($($flag:ident),* $(,)?)) => {
        impl $crate::decl::Reflect for $ty {
            fn declare(decl: &mut $crate::decl::TypeDecl<Self>) {
                let _ = &decl;
                $( $crate::__reflect_opaque_flag!(decl, $flag); )*
            }
        }
    };
    ($ty:ty as $name:literal => ($($flag:ident),* $(,)?)) => {
        impl $crate::decl::Reflect for $ty {
            #[inline]
            fn type_name() -> $crate::__macro_exports::Cow<'static, str> {
                $crate::__macro_exports::Cow::Borrowed($name)
            }

            fn declare(decl: &mut $crate::decl::TypeDecl<Self>) {
                let _ = &decl;
                $( $crate::__reflect_opaque_flag!(decl, $flag); )*
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_opaque_flag {
    ($decl:ident, default) => {
        $decl.default_constructible();
    };
    ($decl:ident, clone) => {
        $decl.copyable();
    };
}
