use std::fmt;
use std::sync::Arc;

use super::Value;

type Callable = dyn Fn(Value, Vec<Value>) -> Value + Send + Sync;

/// A host callable: `(this, args) -> value`.
///
/// Cloning shares the underlying closure; two clones compare equal.
#[derive(Clone)]
pub struct Function {
    name: Arc<str>,
    inner: Arc<Callable>,
}

impl Function {
    pub fn new<F>(name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(Value, Vec<Value>) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            inner: Arc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, this: Value, args: Vec<Value>) -> Value {
        (self.inner)(this, args)
    }

    pub(crate) fn same(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// An anonymous function returning `undefined`.
impl Default for Function {
    fn default() -> Self {
        Self::new("", |_, _| Value::Undefined)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function").field("name", &self.name).finish_non_exhaustive()
    }
}
