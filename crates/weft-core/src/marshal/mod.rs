//! Marshal - tag-driven conversion between records and host values
//!
//! Both directions walk the runtime description exposed by
//! [`Reflect`](crate::reflect::Reflect) and share one convention: a field is
//! visible only if it carries a `#[js("key")]` tag, and `key` is the host
//! property it maps to.
//!
//! # 非対称性（既知）
//! - decode は範囲外の数値をそのまま切り捨てる（範囲チェックなし）
//! - encode は非文字列の map key を文字列化するが、decode は拒否する

mod decode;
mod encode;
mod error;

#[cfg(test)]
pub(crate) mod fixtures;

pub use self::decode::{decode, decode_into};
pub use self::encode::encode;
pub use self::error::{ErrorKind, MarshalError};
