use crate::data::DataObject;
use crate::info::{TypeId, TypeInfo};
use crate::module::TypeInfoModule;

/// Name, identity and default construction of a type.
///
/// # Examples
///
/// ```
/// use vc_rtti::info::TypeInfo;
/// use vc_rtti::module::BasicTypeInfo;
///
/// let basic = TypeInfo::of::<i64>().get::<BasicTypeInfo>();
/// assert_eq!(basic.type_name(), "i64");
/// assert!(basic.can_construct());
/// assert_eq!(basic.construct().try_get::<i64>().copied(), Ok(0));
/// ```
#[derive(Debug)]
pub struct BasicTypeInfo {
    type_info: &'static TypeInfo,
}

impl BasicTypeInfo {
    /// The canonical type name.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_info.name()
    }

    /// The identity derived from the name.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_info.type_id()
    }

    /// The record this module belongs to.
    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        self.type_info
    }

    /// See [`TypeInfo::can_construct`].
    #[inline]
    pub fn can_construct(&self) -> bool {
        self.type_info.can_construct()
    }

    /// See [`TypeInfo::construct`].
    #[inline]
    pub fn construct(&self) -> DataObject<'static> {
        self.type_info.construct()
    }
}

impl TypeInfoModule for BasicTypeInfo {
    #[inline]
    fn handle_type(info: &'static TypeInfo) -> Self {
        Self { type_info: info }
    }
}
