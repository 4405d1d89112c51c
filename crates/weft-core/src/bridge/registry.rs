//! Registry - batch registration of bridged entry points
//!
//! # 使用例
//! ```ignore
//! Registry::new()
//!     .register("lookup", lookup)?
//!     .register("store", store)?
//!     .expect(&["lookup", "store"])
//!     .install(&bridge, &mut exports)?;
//! ```
//!
//! # Fail-fast 設計
//! - 同名の二重登録は `register()` 時点でエラー
//! - `expect()` で宣言した名前が揃っていなければ `install()` は何も書き込まない

use std::collections::BTreeMap;
use std::sync::Arc;

use super::handler::Handler;
use super::{Bridge, BridgeError};
use crate::value::Value;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("entry point '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("missing entry points: {0:?}. These were expected but not registered.")]
    MissingEntryPoints(Vec<String>),
}

/// Named handlers waiting to be attached to a host object.
#[derive(Default)]
pub struct Registry {
    handlers: BTreeMap<String, Arc<dyn Handler>>,
    expected: Option<Vec<String>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H: Handler>(
        mut self,
        name: impl Into<String>,
        handler: H,
    ) -> Result<Self, RegistryError> {
        let name = name.into();
        if self.handlers.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        self.handlers.insert(name, Arc::new(handler));
        Ok(self)
    }

    /// Entry points that must be registered before `install()` succeeds.
    pub fn expect(mut self, names: &[&str]) -> Self {
        self.expected = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub fn names(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Attaches every handler to `target` as a promise-returning function.
    pub fn install(self, bridge: &Bridge, target: &mut Value) -> Result<(), BridgeError> {
        if let Some(expected) = &self.expected {
            let missing: Vec<String> = expected
                .iter()
                .filter(|name| !self.handlers.contains_key(*name))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(RegistryError::MissingEntryPoints(missing).into());
            }
        }

        let Some(object) = target.as_object_mut() else {
            return Err(BridgeError::NotAnObject(target.type_of()));
        };
        for (name, handler) in self.handlers {
            let function = bridge.wrap_shared(&name, handler);
            object.set(name, function);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::BoxError;
    use crate::value::Object;

    fn echo(_this: Value, args: Vec<Value>) -> Result<Value, BoxError> {
        Ok(args.into_iter().next().unwrap_or_default())
    }

    #[test]
    fn double_registration_is_rejected() {
        let result = Registry::new()
            .register("echo", echo)
            .unwrap()
            .register("echo", echo);
        assert!(matches!(result, Err(RegistryError::AlreadyRegistered(name)) if name == "echo"));
    }

    #[test]
    fn names_are_listed() {
        let registry = Registry::new()
            .register("b", echo)
            .unwrap()
            .register("a", echo)
            .unwrap();
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn install_fails_fast_on_missing_entry_points() {
        let bridge = Bridge::current().unwrap();
        let mut target = Value::Object(Object::new());

        let err = Registry::new()
            .register("echo", echo)
            .unwrap()
            .expect(&["echo", "store"])
            .install(&bridge, &mut target)
            .unwrap_err();

        assert!(matches!(
            err,
            BridgeError::Registry(RegistryError::MissingEntryPoints(missing)) if missing == vec!["store".to_string()]
        ));
        assert!(target.as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn installed_entry_points_return_promises() {
        let bridge = Bridge::current().unwrap();
        let mut target = Value::Object(Object::new());

        Registry::new()
            .register("echo", echo)
            .unwrap()
            .expect(&["echo"])
            .install(&bridge, &mut target)
            .unwrap();

        let result = target
            .as_object()
            .unwrap()
            .invoke("echo", vec![Value::from("hi")])
            .unwrap();
        let promise = result.as_promise().unwrap().clone();
        assert_eq!(promise.await, Ok(Value::from("hi")));
    }
}
