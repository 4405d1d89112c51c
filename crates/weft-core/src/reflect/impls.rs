use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::hash::{BuildHasher, Hash};

use super::{Kind, Map, NumberSlot, Reflect, ReflectMut, ReflectRef, Sequence};
use crate::value::Function;

macro_rules! reflect_int {
    ($variant:ident, $wide:ty, $($ty:ty),*) => {
        $(
            impl NumberSlot for $ty {
                fn set_f64(&mut self, n: f64) {
                    *self = n as $wide as $ty;
                }
            }

            impl Reflect for $ty {
                fn kind(&self) -> Kind {
                    Kind::$variant(<$ty>::BITS)
                }

                fn reflect_ref(&self) -> ReflectRef<'_> {
                    ReflectRef::$variant(*self as $wide)
                }

                fn reflect_mut(&mut self) -> ReflectMut<'_> {
                    ReflectMut::$variant(self)
                }
            }
        )*
    };
}

reflect_int!(Int, i64, i8, i16, i32, i64, isize);
reflect_int!(Uint, u64, u8, u16, u32, u64, usize);

macro_rules! reflect_float {
    ($($ty:ty => $bits:expr),*) => {
        $(
            impl NumberSlot for $ty {
                fn set_f64(&mut self, n: f64) {
                    *self = n as $ty;
                }
            }

            impl Reflect for $ty {
                fn kind(&self) -> Kind {
                    Kind::Float($bits)
                }

                fn reflect_ref(&self) -> ReflectRef<'_> {
                    ReflectRef::Float(*self as f64)
                }

                fn reflect_mut(&mut self) -> ReflectMut<'_> {
                    ReflectMut::Float(self)
                }
            }
        )*
    };
}

reflect_float!(f32 => 32, f64 => 64);

impl Reflect for bool {
    fn kind(&self) -> Kind {
        Kind::Bool
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Bool(*self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Bool(self)
    }
}

impl Reflect for String {
    fn kind(&self) -> Kind {
        Kind::String
    }

    fn type_name(&self) -> &'static str {
        "String"
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::String(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::String(self)
    }
}

impl Reflect for Function {
    fn kind(&self) -> Kind {
        Kind::Opaque
    }

    fn type_name(&self) -> &'static str {
        "Function"
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Opaque
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Opaque
    }
}

// ========================================
// Sequences
// ========================================

impl<T: Reflect + Default> Sequence for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|v| v as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice().get_mut(index).map(|v| v as &mut dyn Reflect)
    }

    fn reset(&mut self, len: usize) {
        self.clear();
        self.resize_with(len, T::default);
    }
}

impl<T: Reflect + Default> Reflect for Vec<T> {
    fn kind(&self) -> Kind {
        Kind::Sequence
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Sequence(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Sequence(self)
    }
}

/// Fixed-size arrays encode like sequences. They cannot be resized, so the
/// decoder sees them as opaque.
impl<T: Reflect, const N: usize> Sequence for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|v| v as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice().get_mut(index).map(|v| v as &mut dyn Reflect)
    }

    fn reset(&mut self, _len: usize) {}
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn kind(&self) -> Kind {
        Kind::Sequence
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Sequence(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Opaque
    }
}

// ========================================
// Maps
// ========================================

/// Key policy for reflected maps.
///
/// Every key stringifies through `Display` on encode, but only string keys
/// can be rebuilt from a host object key on decode.
pub trait MapKey: Display {
    fn from_host_key(key: &str) -> Option<Self>
    where
        Self: Sized;
}

impl MapKey for String {
    fn from_host_key(key: &str) -> Option<Self> {
        Some(key.to_string())
    }
}

macro_rules! unsupported_key {
    ($($ty:ty),*) => {
        $(
            impl MapKey for $ty {
                fn from_host_key(_key: &str) -> Option<Self> {
                    None
                }
            }
        )*
    };
}

unsupported_key!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, bool, char);

impl<K, V, S> Map for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash,
    V: Reflect + Default,
    S: BuildHasher,
{
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn key_type_name(&self) -> &'static str {
        std::any::type_name::<K>()
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (String, &dyn Reflect)> + '_> {
        Box::new(self.iter().map(|(k, v)| (k.to_string(), v as &dyn Reflect)))
    }

    fn clear(&mut self) {
        HashMap::clear(self);
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut dyn Reflect> {
        let key = K::from_host_key(key)?;
        Some(self.entry(key).or_default() as &mut dyn Reflect)
    }
}

impl<K, V, S> Reflect for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash,
    V: Reflect + Default,
    S: BuildHasher,
{
    fn kind(&self) -> Kind {
        Kind::Map
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Map(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Map(self)
    }
}

impl<K, V> Map for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: Reflect + Default,
{
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn key_type_name(&self) -> &'static str {
        std::any::type_name::<K>()
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (String, &dyn Reflect)> + '_> {
        Box::new(self.iter().map(|(k, v)| (k.to_string(), v as &dyn Reflect)))
    }

    fn clear(&mut self) {
        BTreeMap::clear(self);
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut dyn Reflect> {
        let key = K::from_host_key(key)?;
        Some(self.entry(key).or_default() as &mut dyn Reflect)
    }
}

impl<K, V> Reflect for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: Reflect + Default,
{
    fn kind(&self) -> Kind {
        Kind::Map
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Map(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Map(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_slots_truncate_toward_zero() {
        let mut n = 0i32;
        n.set_f64(3.9);
        assert_eq!(n, 3);
        n.set_f64(-3.9);
        assert_eq!(n, -3);
    }

    #[test]
    fn out_of_range_integers_are_not_rejected() {
        // 300 goes through i64 first, then wraps into u8
        let mut n = 0u8;
        n.set_f64(300.0);
        assert_eq!(n, 44);
    }

    #[test]
    fn kinds_carry_width_and_signedness() {
        assert_eq!(0i16.kind(), Kind::Int(16));
        assert_eq!(0u64.kind(), Kind::Uint(64));
        assert_eq!(0f32.kind(), Kind::Float(32));
        assert_eq!(Kind::Int(64).to_string(), "i64");
    }

    #[test]
    fn vec_reset_allocates_exact_zeroed_length() {
        let mut items = vec![7i32, 8, 9, 10];
        Sequence::reset(&mut items, 2);
        assert_eq!(items, vec![0, 0]);
    }

    #[test]
    fn map_entries_stringify_keys() {
        let mut map = BTreeMap::new();
        map.insert(1u32, true);
        map.insert(20u32, false);

        let keys: Vec<String> = Map::entries(&map).map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["1", "20"]);
    }

    #[test]
    fn only_string_keys_are_rebuilt_from_host_keys() {
        let mut by_name: HashMap<String, i32> = HashMap::new();
        assert!(by_name.entry_mut("a").is_some());

        let mut by_id: HashMap<u32, i32> = HashMap::new();
        assert!(by_id.entry_mut("1").is_none());
    }

    #[test]
    fn fixed_arrays_are_read_only_to_the_decoder() {
        let mut arr = [1u8, 2, 3];
        assert!(matches!(arr.reflect_ref(), ReflectRef::Sequence(s) if s.len() == 3));
        assert!(matches!(arr.reflect_mut(), ReflectMut::Opaque));
    }
}
