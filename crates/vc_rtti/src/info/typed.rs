use core::marker::PhantomData;

use crate::decl::Reflect;
use crate::info::{BaseType, TypeDesc};

// -----------------------------------------------------------------------------
// Typed

/// A type with a runtime [`TypeInfo`](crate::info::TypeInfo).
///
/// Every [`Reflect`] type is `Typed`. Qualified forms are spelled with Rust
/// types where Rust has them and with marker types where it does not:
///
/// | Rust type | Descriptor |
/// | --- | --- |
/// | `T` (`T: Reflect`) | `T` |
/// | [`Const<T>`] | `const T` |
/// | `*const T` | `*const T` (pointer to `const T`) |
/// | `*mut T` | `*mut T` |
/// | [`LvalueRef<T>`] | `&mut T`; `LvalueRef<Const<T>>` is `&T` |
/// | [`RvalueRef<T>`] | `&move T` |
/// | `[T; N]` | `[T; N]`; `[Const<T>; N]` is `[const T; N]` |
///
/// # Examples
///
/// ```
/// use vc_rtti::info::{Const, LvalueRef, Typed};
///
/// assert_eq!(<*const f32>::type_desc().to_string(), "*const f32");
/// assert_eq!(<LvalueRef<Const<f32>>>::type_desc().to_string(), "&f32");
/// ```
pub trait Typed: 'static {
    /// Returns the canonical descriptor of this type.
    fn type_desc() -> TypeDesc;
}

impl<T: Reflect> Typed for T {
    #[inline]
    fn type_desc() -> TypeDesc {
        TypeDesc::plain(BaseType::of::<T>())
    }
}

// -----------------------------------------------------------------------------
// Qualifier markers

/// Marker for `const T`. Never instantiated.
pub struct Const<T: ?Sized>(PhantomData<fn() -> *const T>);

/// Marker for an lvalue reference to `T`. Never instantiated.
pub struct LvalueRef<T: ?Sized>(PhantomData<fn() -> *const T>);

/// Marker for an rvalue reference to `T`. Never instantiated.
pub struct RvalueRef<T: ?Sized>(PhantomData<fn() -> *const T>);

impl<T: Typed> Typed for Const<T> {
    #[inline]
    fn type_desc() -> TypeDesc {
        T::type_desc().add_const()
    }
}

impl<T: Typed> Typed for LvalueRef<T> {
    #[inline]
    fn type_desc() -> TypeDesc {
        T::type_desc().add_lvalue_reference()
    }
}

impl<T: Typed> Typed for RvalueRef<T> {
    #[inline]
    fn type_desc() -> TypeDesc {
        T::type_desc().add_rvalue_reference()
    }
}

impl<T: Typed> Typed for *const T {
    #[inline]
    fn type_desc() -> TypeDesc {
        T::type_desc().add_const().add_pointer()
    }
}

impl<T: Typed> Typed for *mut T {
    #[inline]
    fn type_desc() -> TypeDesc {
        T::type_desc().add_pointer()
    }
}

impl<T: Typed, const N: usize> Typed for [T; N] {
    #[inline]
    fn type_desc() -> TypeDesc {
        T::type_desc().add_array(N)
    }
}
