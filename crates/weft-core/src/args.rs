//! Typed arguments - each raw argument paired with its decoded form
//!
//! A handler receives its arguments as raw host values. [`parse_all`] decodes
//! every one of them into the same record type and keeps the raw value next
//! to the result, so one malformed argument never hides the others.

use crate::marshal::{self, MarshalError};
use crate::reflect::Reflect;
use crate::value::Value;

/// One argument: the raw host value and the result of decoding it.
#[derive(Debug, Clone)]
pub struct Arg<T> {
    raw: Value,
    decoded: Result<T, MarshalError>,
}

impl<T: Reflect + Default> Arg<T> {
    pub fn parse(raw: Value) -> Self {
        let decoded = marshal::decode_into::<T>(&raw);
        if let Err(err) = &decoded {
            tracing::trace!(error = %err, "argument did not decode");
        }
        Self { raw, decoded }
    }
}

impl<T> Arg<T> {
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn value(&self) -> Option<&T> {
        self.decoded.as_ref().ok()
    }

    pub fn error(&self) -> Option<&MarshalError> {
        self.decoded.as_ref().err()
    }

    pub fn is_ok(&self) -> bool {
        self.decoded.is_ok()
    }

    pub fn result(&self) -> Result<&T, &MarshalError> {
        self.decoded.as_ref()
    }

    pub fn into_value(self) -> Result<T, MarshalError> {
        self.decoded
    }

    pub fn into_parts(self) -> (Value, Result<T, MarshalError>) {
        (self.raw, self.decoded)
    }
}

pub fn parse<T: Reflect + Default>(raw: Value) -> Arg<T> {
    Arg::parse(raw)
}

/// Decodes every argument independently, preserving order.
pub fn parse_all<T, I>(args: I) -> Vec<Arg<T>>
where
    T: Reflect + Default,
    I: IntoIterator<Item = Value>,
{
    args.into_iter().map(Arg::parse).collect()
}
