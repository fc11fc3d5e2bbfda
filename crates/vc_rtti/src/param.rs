//! Argument checks for dynamic calls.
//!
//! A caller wraps each argument into a [`DynamicParam`], and checks the list
//! against the [`ParamSignature`] of the callee before invoking it. This
//! crate does not invoke anything itself.
//!
//! # Examples
//!
//! ```
//! use vc_rtti::info::{Const, LvalueRef};
//! use vc_rtti::param::{DynamicParam, ParamError, ParamSignature};
//!
//! // fn scale(factor: f32, target: &mut [f32; 3])
//! let signature = ParamSignature::of::<(Const<f32>, LvalueRef<[f32; 3]>)>();
//!
//! let factor = 2.0f32;
//! let mut target = [1.0f32; 3];
//! let args = [DynamicParam::from_ref(&factor), DynamicParam::from_mut(&mut target)];
//! assert_eq!(signature.check(&args), Ok(()));
//!
//! let args = [DynamicParam::from_ref(&factor), DynamicParam::from_ref(&factor)];
//! assert!(matches!(signature.check(&args), Err(ParamError::NotConvertible { index: 1, .. })));
//! ```

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use thiserror::Error;

use crate::data::DataObject;
use crate::info::{TypeInfo, Typed};
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// ParamError

/// An error returned by [`ParamSignature::check`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParamError {
    /// The number of arguments differs from the number of parameters.
    #[error("expected {expected} arguments, found {found}")]
    ArityMismatch { expected: usize, found: usize },
    /// An argument holds no value.
    #[error("argument {index} is null")]
    NullArgument { index: usize },
    /// An argument cannot be viewed as its parameter type.
    #[error("argument {index} of type `{found}` is not convertible to `{expected}`")]
    NotConvertible {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
}

// -----------------------------------------------------------------------------
// DynamicParam

/// A type-erased argument.
#[derive(Clone, Default)]
pub struct DynamicParam<'a> {
    data: DataObject<'a>,
}

impl<'a> DynamicParam<'a> {
    /// Passes `value` as `const T`.
    #[inline]
    pub fn from_ref<T: Typed>(value: &'a T) -> Self {
        Self {
            data: DataObject::wrap_ref(value),
        }
    }

    /// Passes `value` as a mutable `T`.
    #[inline]
    pub fn from_mut<T: Typed>(value: &'a mut T) -> Self {
        Self {
            data: DataObject::wrap(value),
        }
    }

    /// Passes the value of an existing object.
    #[inline]
    pub fn from_data(data: DataObject<'a>) -> Self {
        Self { data }
    }

    /// The object holding the argument.
    #[inline]
    pub fn data(&self) -> &DataObject<'a> {
        &self.data
    }

    #[inline]
    pub fn into_data(self) -> DataObject<'a> {
        self.data
    }

    /// The record of the argument, `None` for a null argument.
    #[inline]
    pub fn type_info(&self) -> Option<&'static TypeInfo> {
        self.data.type_info()
    }

    /// Returns `true` if the argument may be passed as `param`.
    #[inline]
    pub fn is_convertible_to(&self, param: &TypeInfo) -> bool {
        self.type_info().is_some_and(|info| info.can_cast_to(param))
    }

    /// Returns `true` if the argument may be passed as a `P`.
    #[inline]
    pub fn is_convertible_to_type<P: Typed>(&self) -> bool {
        self.data.can_cast_to::<P>()
    }
}

impl fmt::Debug for DynamicParam<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DynamicParam").field(&self.data).finish()
    }
}

// -----------------------------------------------------------------------------
// ParamSignature

/// The ordered parameter types of a callee.
#[derive(Clone, PartialEq, Eq)]
pub struct ParamSignature {
    params: Vec<&'static TypeInfo>,
}

impl ParamSignature {
    #[inline]
    pub fn new(params: Vec<&'static TypeInfo>) -> Self {
        Self { params }
    }

    /// The signature of a tuple of parameter types, from the global
    /// registry.
    #[inline]
    pub fn of<L: ParamList>() -> Self {
        Self::of_in::<L>(TypeRegistry::global())
    }

    /// [`of`](Self::of) with the records from `registry`.
    #[inline]
    pub fn of_in<L: ParamList>(registry: &'static TypeRegistry) -> Self {
        Self::new(L::param_infos(registry))
    }

    #[inline]
    pub fn params(&self) -> &[&'static TypeInfo] {
        &self.params
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Checks the arity, then each argument in order.
    pub fn check(&self, args: &[DynamicParam<'_>]) -> Result<(), ParamError> {
        if args.len() != self.params.len() {
            return Err(ParamError::ArityMismatch {
                expected: self.params.len(),
                found: args.len(),
            });
        }
        for (index, (&param, arg)) in self.params.iter().zip(args).enumerate() {
            let Some(info) = arg.type_info() else {
                return Err(ParamError::NullArgument { index });
            };
            if !info.can_cast_to(param) {
                return Err(ParamError::NotConvertible {
                    index,
                    expected: param.name(),
                    found: info.name(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ParamSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.params.iter().map(|info| info.name()))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ParamList

/// A tuple of up to eight [`Typed`] parameter types.
pub trait ParamList {
    fn param_infos(registry: &'static TypeRegistry) -> Vec<&'static TypeInfo>;
}

impl ParamList for () {
    #[inline]
    fn param_infos(_: &'static TypeRegistry) -> Vec<&'static TypeInfo> {
        Vec::new()
    }
}

macro_rules! impl_param_list {
    ($($param:ident),+) => {
        impl<$($param: Typed),+> ParamList for ($($param,)+) {
            #[inline]
            fn param_infos(registry: &'static TypeRegistry) -> Vec<&'static TypeInfo> {
                vec![$(registry.get::<$param>()),+]
            }
        }
    };
}

impl_param_list!(P0);
impl_param_list!(P0, P1);
impl_param_list!(P0, P1, P2);
impl_param_list!(P0, P1, P2, P3);
impl_param_list!(P0, P1, P2, P3, P4);
impl_param_list!(P0, P1, P2, P3, P4, P5);
impl_param_list!(P0, P1, P2, P3, P4, P5, P6);
impl_param_list!(P0, P1, P2, P3, P4, P5, P6, P7);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{DynamicParam, ParamError, ParamSignature};
    use crate::data::DataObject;
    use crate::info::{Const, LvalueRef, TypeInfo};
    use alloc::string::String;
    use alloc::vec;

    #[test]
    fn arity_and_nulls() {
        let signature = ParamSignature::of::<(i32, String)>();
        assert_eq!(signature.len(), 2);
        assert_eq!(
            signature.check(&[]),
            Err(ParamError::ArityMismatch {
                expected: 2,
                found: 0
            })
        );

        let mut number = 1;
        let args = [
            DynamicParam::from_mut(&mut number),
            DynamicParam::from_data(DataObject::null()),
        ];
        assert_eq!(signature.check(&args), Err(ParamError::NullArgument { index: 1 }));

        assert!(ParamSignature::of::<()>().check(&[]).is_ok());
    }

    #[test]
    fn conversions_follow_casts() {
        let value = 1.5f32;
        let mut slot = 0.0f32;
        let shared = DynamicParam::from_ref(&value);
        assert!(shared.is_convertible_to_type::<Const<f32>>());
        assert!(shared.is_convertible_to_type::<LvalueRef<Const<f32>>>());
        assert!(!shared.is_convertible_to_type::<f32>());

        let exclusive = DynamicParam::from_mut(&mut slot);
        assert!(exclusive.is_convertible_to_type::<f32>());
        assert!(exclusive.is_convertible_to(TypeInfo::of::<LvalueRef<f32>>()));
        assert!(!exclusive.is_convertible_to_type::<f64>());

        let signature = ParamSignature::new(vec![TypeInfo::of::<LvalueRef<f32>>()]);
        assert_eq!(
            signature.check(&[shared.clone()]),
            Err(ParamError::NotConvertible {
                index: 0,
                expected: "&mut f32",
                found: "const f32",
            })
        );
        assert_eq!(signature.check(&[exclusive]), Ok(()));
    }

    #[test]
    fn arrays_decay_to_pointers() {
        let text = *b"abc";
        let signature = ParamSignature::of::<(*const u8,)>();
        assert_eq!(signature.check(&[DynamicParam::from_ref(&text)]), Ok(()));

        let signature = ParamSignature::of::<(*mut u8,)>();
        assert!(signature.check(&[DynamicParam::from_ref(&text)]).is_err());
    }
}
