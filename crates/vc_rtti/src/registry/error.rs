use thiserror::Error;

/// An error returned by [`TypeRegistry::configure`].
///
/// [`TypeRegistry::configure`]: crate::registry::TypeRegistry::configure
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    /// The module set is fixed once the first record is created.
    #[error("the registry already has a module set")]
    AlreadyInUse,
}
