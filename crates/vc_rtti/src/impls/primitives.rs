use alloc::string::String;

use crate::impl_reflect_opaque;

impl_reflect_opaque!(bool => (default, clone));
impl_reflect_opaque!(char => (default, clone));
impl_reflect_opaque!(() => (default, clone));

impl_reflect_opaque!(i8 => (default, clone));
impl_reflect_opaque!(i16 => (default, clone));
impl_reflect_opaque!(i32 => (default, clone));
impl_reflect_opaque!(i64 => (default, clone));
impl_reflect_opaque!(i128 => (default, clone));
impl_reflect_opaque!(isize => (default, clone));

impl_reflect_opaque!(u8 => (default, clone));
impl_reflect_opaque!(u16 => (default, clone));
impl_reflect_opaque!(u32 => (default, clone));
impl_reflect_opaque!(u64 => (default, clone));
impl_reflect_opaque!(u128 => (default, clone));
impl_reflect_opaque!(usize => (default, clone));

impl_reflect_opaque!(f32 => (default, clone));
impl_reflect_opaque!(f64 => (default, clone));

impl_reflect_opaque!(String as "String" => (default, clone));
impl_reflect_opaque!(&'static str => (default, clone));

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::data::DataObject;
    use crate::info::{Const, TypeInfo};
    use alloc::string::String;

    #[test]
    fn names() {
        assert_eq!(TypeInfo::of::<i32>().name(), "i32");
        assert_eq!(TypeInfo::of::<f64>().name(), "f64");
        assert_eq!(TypeInfo::of::<()>().name(), "()");
        assert_eq!(TypeInfo::of::<String>().name(), "String");
        assert_eq!(TypeInfo::of::<&'static str>().name(), "&str");
        assert_eq!(TypeInfo::of::<[Const<char>; 2]>().name(), "[const char; 2]");
    }

    #[test]
    fn values() {
        assert_eq!(DataObject::create::<bool>().try_get::<bool>().copied(), Ok(false));
        assert_eq!(DataObject::create::<&'static str>().try_get::<&'static str>().copied(), Ok(""));
        assert_eq!(DataObject::create::<[u16; 3]>().try_get::<[u16; 3]>().copied(), Ok([0; 3]));

        let text = DataObject::create_moved(String::from("moved"));
        let copy = text.try_copy().unwrap();
        drop(text);
        assert_eq!(copy.try_get::<String>().unwrap(), "moved");
    }
}
