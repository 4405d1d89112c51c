//! Reflect - runtime type description for the marshaling layer
//!
//! Rust has no built-in introspection, so every marshalable type describes
//! itself through the object-safe [`Reflect`] trait. The decoder and encoder
//! only ever see `&dyn Reflect` / `&mut dyn Reflect` and drive the whole
//! conversion from [`Kind`] and the [`ReflectRef`] / [`ReflectMut`] views.
//!
//! # 学習ポイント
//! - Object-safe trait (`dyn Reflect`) による型消去
//! - Record は `#[derive(Reflect)]` で生成、`#[js("key")]` が tag
//! - tag の無いフィールドは marshaling から完全に除外される

mod describe;
mod impls;

use std::fmt;

pub use self::describe::{FieldDescription, describe};
pub use self::impls::MapKey;

/// Value-kind classifier of a reflected type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    String,
    /// Signed integer of the given bit width.
    Int(u32),
    /// Unsigned integer of the given bit width.
    Uint(u32),
    Bool,
    /// Floating point of the given bit width.
    Float(u32),
    Sequence,
    Map,
    Record,
    /// Anything the marshaler cannot express.
    Opaque,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::String => f.write_str("string"),
            Kind::Int(bits) => write!(f, "i{bits}"),
            Kind::Uint(bits) => write!(f, "u{bits}"),
            Kind::Bool => f.write_str("bool"),
            Kind::Float(bits) => write!(f, "f{bits}"),
            Kind::Sequence => f.write_str("sequence"),
            Kind::Map => f.write_str("map"),
            Kind::Record => f.write_str("record"),
            Kind::Opaque => f.write_str("opaque"),
        }
    }
}

/// A type the marshaling layer can look into.
pub trait Reflect {
    fn kind(&self) -> Kind;

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn reflect_ref(&self) -> ReflectRef<'_>;

    fn reflect_mut(&mut self) -> ReflectMut<'_>;
}

/// Read-only view used by the encoder.
pub enum ReflectRef<'a> {
    String(&'a str),
    Int(i64),
    Uint(u64),
    Bool(bool),
    Float(f64),
    Sequence(&'a dyn Sequence),
    Map(&'a dyn Map),
    Record(&'a dyn Record),
    Opaque,
}

/// Writable view used by the decoder.
pub enum ReflectMut<'a> {
    /// Takes the host's `String(x)` coercion of whatever arrives, with no
    /// type check: `42` becomes `"42"` and `null` becomes `"null"`, not a
    /// tagged rendering of the non-string value.
    String(&'a mut String),
    Int(&'a mut dyn NumberSlot),
    Uint(&'a mut dyn NumberSlot),
    Bool(&'a mut bool),
    Float(&'a mut dyn NumberSlot),
    Sequence(&'a mut dyn Sequence),
    Map(&'a mut dyn Map),
    Record(&'a mut dyn Record),
    Opaque,
}

/// A numeric field that accepts a host number.
///
/// Integers truncate toward zero; out-of-range values follow `as` casts
/// and are not reported.
pub trait NumberSlot {
    fn set_f64(&mut self, n: f64);
}

/// Declared field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    /// External key name. `None` hides the field from marshaling.
    pub tag: Option<&'static str>,
}

impl Field {
    pub const fn new(name: &'static str, tag: Option<&'static str>) -> Self {
        Self { name, tag }
    }
}

/// Struct-like composite with declared fields.
///
/// Implemented by `#[derive(Reflect)]`. Field indices follow declaration order.
pub trait Record {
    fn fields(&self) -> &'static [Field];

    fn field(&self, index: usize) -> Option<&dyn Reflect>;

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

/// Ordered, indexable collection.
pub trait Sequence {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Replaces the contents with `len` zero-valued elements.
    fn reset(&mut self, len: usize);
}

/// Associative map.
pub trait Map {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key_type_name(&self) -> &'static str;

    /// Entries with keys stringified through `Display`. Order is unspecified.
    fn entries(&self) -> Box<dyn Iterator<Item = (String, &dyn Reflect)> + '_>;

    fn clear(&mut self);

    /// Zero-valued slot for a host key, inserted if missing.
    ///
    /// `None` when the key type cannot be built from a host string key.
    fn entry_mut(&mut self, key: &str) -> Option<&mut dyn Reflect>;
}
