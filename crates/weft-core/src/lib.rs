//! weft-core
//!
//! Bridges synchronous Rust handlers into an embedded JavaScript-style host
//! as promise-returning functions, and converts tagged Rust records to and
//! from the host's dynamic values.
//!
//! # モジュール構成
//! - **value**: ホスト側の動的な値（Value, Object, Function）
//! - **reflect**: 実行時の型記述（Reflect trait, `#[derive(Reflect)]`）
//! - **marshal**: タグ駆動の decode / encode
//! - **bridge**: Promise, Handler, Bridge（blocking pool への dispatch）
//! - **args**: 引数ごとの独立した decode
//!
//! # 使用例
//! ```ignore
//! #[derive(Default, Reflect)]
//! struct Person {
//!     #[js("name")]
//!     name: String,
//!     #[js("age")]
//!     age: i64,
//! }
//!
//! let bridge = Bridge::current()?;
//! bridge.register(&mut exports, "birthday", |_this: Value, args: Vec<Value>| {
//!     let mut person: Person = decode_into(&args[0])?;
//!     person.age += 1;
//!     Ok::<_, BoxError>(encode(&person)?)
//! })?;
//! ```

extern crate self as weft_core;

pub mod args;
pub mod bridge;
pub mod marshal;
pub mod reflect;
pub mod value;

pub use weft_derive::Reflect;

pub use crate::args::{Arg, parse, parse_all};
pub use crate::bridge::{
    BoxError, Bridge, BridgeError, Handler, Promise, PromiseState, Registry, Rejection,
};
pub use crate::marshal::{ErrorKind, MarshalError, decode, decode_into, encode};
pub use crate::reflect::Reflect;
pub use crate::value::{Function, Object, Value, ValueType};
