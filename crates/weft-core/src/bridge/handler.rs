//! Handler trait - the synchronous function behind a bridged entry point
//!
//! # 学習ポイント
//! - Blanket impl でクロージャをそのまま Handler にする
//! - `Arc<dyn Handler>` で型消去して Function に閉じ込める

use crate::value::Value;

/// Error type handlers may return. Only its `Display` text reaches the host.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A blocking `(this, args) -> result` function.
///
/// Any closure of the right shape is a handler:
///
/// ```ignore
/// bridge.register(&mut target, "double", |_this: Value, args: Vec<Value>| {
///     let n = args.first().and_then(Value::as_f64).ok_or("expected a number")?;
///     Ok::<_, BoxError>(n * 2.0)
/// })?;
/// ```
///
/// The result goes through the host's native coercion (`Into<Value>`); records
/// should already have been encoded by the handler.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, this: Value, args: Vec<Value>) -> Result<Value, BoxError>;
}

impl<F, R, E> Handler for F
where
    F: Fn(Value, Vec<Value>) -> Result<R, E> + Send + Sync + 'static,
    R: Into<Value>,
    E: Into<BoxError>,
{
    fn call(&self, this: Value, args: Vec<Value>) -> Result<Value, BoxError> {
        self(this, args).map(Into::into).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_handlers() {
        let handler = |_this: Value, args: Vec<Value>| {
            let n = args.first().and_then(Value::as_f64).ok_or("expected a number")?;
            Ok::<_, BoxError>(n * 2.0)
        };

        let value = Handler::call(&handler, Value::Undefined, vec![Value::from(21)]).unwrap();
        assert_eq!(value, Value::Number(42.0));

        let err = Handler::call(&handler, Value::Undefined, vec![]).unwrap_err();
        assert_eq!(err.to_string(), "expected a number");
    }
}
