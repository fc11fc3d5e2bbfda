use crate::registry::TypeRegistry;

#[cfg(feature = "auto_register")]
use crate::{decl::Reflect, info::TypeInfo};

// -----------------------------------------------------------------------------
// Registration entries

/// One statically submitted type, see [`impl_auto_register!`].
///
/// [`impl_auto_register!`]: crate::impl_auto_register
#[cfg(feature = "auto_register")]
#[doc(hidden)]
pub struct AutoRegistration(pub fn(&'static TypeRegistry) -> &'static TypeInfo);

#[cfg(feature = "auto_register")]
inventory::collect!(AutoRegistration);

/// Always submitted, so that its presence tells whether `inventory` works
/// on the current platform.
#[cfg(feature = "auto_register")]
struct AvailFlag;

#[cfg(feature = "auto_register")]
impl Reflect for AvailFlag {}

#[cfg(feature = "auto_register")]
inventory::submit! {
    AutoRegistration(TypeRegistry::get::<AvailFlag>)
}

// -----------------------------------------------------------------------------
// TypeRegistry::auto_register

impl TypeRegistry {
    /// Creates the records of every type submitted with
    /// [`impl_auto_register!`](crate::impl_auto_register).
    ///
    /// Returns `true` if automatic registration works on the current
    /// platform. Later calls are cheap and keep returning `true`.
    ///
    /// ## Feature Dependency
    ///
    /// This method requires the `auto_register` feature. When disabled, it
    /// does nothing and returns `false`.
    ///
    /// ## Platform Support
    ///
    /// Supported platforms include Linux, macOS, Windows, iOS, Android, and
    /// Web, enabled by the `inventory` crate. On unsupported platforms, this
    /// method is a no-op.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vc_rtti::decl::Reflect;
    /// use vc_rtti::registry::TypeRegistry;
    ///
    /// struct Foo;
    /// impl Reflect for Foo {}
    ///
    /// vc_rtti::impl_auto_register!(Foo, [Foo; 2]);
    ///
    /// static REGISTRY: TypeRegistry = TypeRegistry::new();
    /// assert!(REGISTRY.auto_register());
    /// assert!(REGISTRY.contains::<[Foo; 2]>());
    /// ```
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&'static self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            // Reduce the cost of repeated calls.
            if self.contains::<AvailFlag>() {
                return true;
            }
            for entry in inventory::iter::<AutoRegistration> {
                (entry.0)(self);
            }
            self.contains::<AvailFlag>()
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }
}

// -----------------------------------------------------------------------------
// Macros

/// Submits types for [`TypeRegistry::auto_register`].
///
/// Accepts any [`Typed`](crate::info::Typed) types without generic
/// parameters. Expands to nothing without the `auto_register` feature.
#[macro_export]
macro_rules! impl_auto_register {
    ($($ty:ty),+ $(,)?) => {
        $( $crate::__auto_register_one! { $ty } )+
    };
}

#[cfg(feature = "auto_register")]
#[doc(hidden)]
#[macro_export]
macro_rules! __auto_register_one {
    ($ty:ty) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::__macro_exports::AutoRegistration(
                $crate::registry::TypeRegistry::get::<$ty>
            )
        }
    };
}

#[cfg(not(feature = "auto_register"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __auto_register_one {
    ($ty:ty) => {};
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(all(test, feature = "auto_register"))]
mod tests {
    use crate::decl::Reflect;
    use crate::registry::TypeRegistry;

    struct Registered;
    impl Reflect for Registered {}

    crate::impl_auto_register!(Registered, *const Registered);

    #[test]
    fn submitted_types_are_created() {
        static LOCAL: TypeRegistry = TypeRegistry::new();

        assert!(!LOCAL.contains::<Registered>());
        assert!(LOCAL.auto_register());
        assert!(LOCAL.contains::<Registered>());
        assert!(LOCAL.contains::<*const Registered>());
        assert!(LOCAL.auto_register());
    }
}
