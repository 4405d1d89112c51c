//! Bridge - promise-returning entry points over blocking handlers
//!
//! Invoking a bridged function never blocks the caller: it builds a pending
//! [`Promise`], dispatches the handler onto the runtime's blocking pool and
//! returns the promise right away. The task settles the promise exactly once:
//!
//! - handler returned `Ok(value)` -> fulfilled with `value`
//! - handler returned `Err(e)` -> rejected with `e.to_string()`
//! - handler panicked -> rejected with `"panic: <message>"`
//!
//! Panics never escape the task. There are no retries, timeouts or
//! cancellation; each invocation is independent of every other.

mod error;
mod handler;
mod invocation;
mod promise;
mod registry;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tokio::runtime::Handle;

pub use self::error::BridgeError;
pub use self::handler::{BoxError, Handler};
pub use self::invocation::InvocationId;
pub use self::promise::{FAULT_PREFIX, Promise, PromiseState, Rejection, Resolver};
pub use self::registry::{Registry, RegistryError};
use crate::value::{Function, Value};

/// Turns handlers into host functions backed by a tokio runtime.
#[derive(Debug, Clone)]
pub struct Bridge {
    runtime: Handle,
}

impl Bridge {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    /// Binds to the runtime of the calling context.
    pub fn current() -> Result<Self, BridgeError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| BridgeError::NoRuntime)
    }

    /// Attaches `handler` to `target` under `name`. An existing property of
    /// the same name is overwritten.
    pub fn register<H: Handler>(
        &self,
        target: &mut Value,
        name: &str,
        handler: H,
    ) -> Result<(), BridgeError> {
        let Some(object) = target.as_object_mut() else {
            return Err(BridgeError::NotAnObject(target.type_of()));
        };
        object.set(name, self.wrap(name, handler));
        tracing::debug!(entry_point = name, "registered bridged function");
        Ok(())
    }

    /// The promise-returning host function for `handler`, unattached.
    pub fn wrap<H: Handler>(&self, name: &str, handler: H) -> Function {
        self.wrap_shared(name, Arc::new(handler))
    }

    pub(crate) fn wrap_shared(&self, name: &str, handler: Arc<dyn Handler>) -> Function {
        let runtime = self.runtime.clone();
        let entry_point: Arc<str> = Arc::from(name);
        Function::new(name, move |this, args| {
            let (promise, resolver) = Promise::pending();
            dispatch(&runtime, &entry_point, Arc::clone(&handler), this, args, resolver);
            Value::Promise(promise)
        })
    }
}

fn dispatch(
    runtime: &Handle,
    entry_point: &str,
    handler: Arc<dyn Handler>,
    this: Value,
    args: Vec<Value>,
    resolver: Resolver,
) {
    let call_id = InvocationId::new();
    let span = tracing::debug_span!("bridge_call", entry_point, %call_id, args = args.len());

    // the JoinHandle is dropped on purpose: settlement goes through the resolver
    runtime.spawn_blocking(move || {
        let _entered = span.enter();
        resolver.start();

        match panic::catch_unwind(AssertUnwindSafe(|| handler.call(this, args))) {
            Ok(Ok(value)) => {
                tracing::debug!("bridged call fulfilled");
                resolver.resolve(value);
            }
            Ok(Err(err)) => {
                tracing::debug!(error = %err, "bridged call rejected");
                resolver.reject(Rejection::new(err.to_string()));
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!(panic = %message, "recovered panic in bridged call");
                resolver.reject(Rejection::fault(message));
            }
        }
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Barrier, mpsc};
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::args::parse_all;
    use crate::marshal::{encode, fixtures::Person};
    use crate::value::Object;

    fn exports() -> Value {
        Value::Object(Object::new())
    }

    fn call(target: &Value, name: &str, args: Vec<Value>) -> Promise {
        let result = target.as_object().unwrap().invoke(name, args).unwrap();
        result.as_promise().unwrap().clone()
    }

    #[tokio::test]
    async fn fulfilled_with_handler_result() {
        let bridge = Bridge::current().unwrap();
        let mut target = exports();
        bridge
            .register(&mut target, "add", |_this: Value, args: Vec<Value>| {
                let sum: f64 = args.iter().filter_map(Value::as_f64).sum();
                Ok::<_, BoxError>(sum)
            })
            .unwrap();

        let promise = call(&target, "add", vec![1.into(), 2.into(), 3.5.into()]);
        assert_eq!(promise.await, Ok(Value::Number(6.5)));
    }

    #[tokio::test]
    async fn returned_error_rejects_with_its_description() {
        let bridge = Bridge::current().unwrap();
        let mut target = exports();
        bridge
            .register(&mut target, "fail", |_this: Value, _args: Vec<Value>| {
                Err::<Value, _>("record not found")
            })
            .unwrap();

        let rejection = call(&target, "fail", vec![]).await.unwrap_err();
        assert_eq!(rejection.message(), "record not found");
        assert!(!rejection.is_recovered_fault());
    }

    #[tokio::test]
    async fn panic_rejects_with_fault_prefix() {
        let bridge = Bridge::current().unwrap();
        let mut target = exports();
        bridge
            .register(&mut target, "boom", |_this: Value, args: Vec<Value>| {
                let first = &args[3];
                Ok::<_, BoxError>(first.clone())
            })
            .unwrap();

        let rejection = call(&target, "boom", vec![]).await.unwrap_err();
        assert!(rejection.is_recovered_fault());
        assert!(rejection.message().starts_with("panic: index out of bounds"));
    }

    #[tokio::test]
    async fn panic_with_string_payload() {
        let bridge = Bridge::current().unwrap();
        let function = bridge.wrap("explode", |_this: Value, _args: Vec<Value>| {
            if true {
                panic!("bad state {}", 7);
            }
            Ok::<Value, BoxError>(Value::Undefined)
        });

        let result = function.call(Value::Undefined, vec![]);
        let rejection = result.as_promise().unwrap().clone().await.unwrap_err();
        assert_eq!(rejection.message(), "panic: bad state 7");
    }

    #[tokio::test]
    async fn a_panicking_call_does_not_affect_the_next_one() {
        let bridge = Bridge::current().unwrap();
        let mut target = exports();
        bridge
            .register(&mut target, "maybe", |_this: Value, args: Vec<Value>| {
                if args.is_empty() {
                    panic!("no args");
                }
                Ok::<_, BoxError>(args.len())
            })
            .unwrap();

        assert!(call(&target, "maybe", vec![]).await.is_err());
        assert_eq!(
            call(&target, "maybe", vec![Value::Null]).await,
            Ok(Value::Number(1.0))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn invocation_returns_before_the_handler_finishes() {
        let bridge = Bridge::current().unwrap();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = std::sync::Mutex::new(release_rx);
        let function = bridge.wrap("slow", move |_this: Value, _args: Vec<Value>| {
            let rx = release_rx.lock().map_err(|e| e.to_string())?;
            rx.recv_timeout(Duration::from_secs(5))
                .map_err(|e| e.to_string())?;
            Ok::<_, BoxError>("done")
        });

        let promise = function.call(Value::Undefined, vec![]);
        let promise = promise.as_promise().unwrap().clone();
        assert!(!promise.is_settled());

        release_tx.send(()).unwrap();
        assert_eq!(promise.await, Ok(Value::from("done")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn invocations_run_concurrently() {
        let bridge = Bridge::current().unwrap();
        // both calls must be inside the handler at once to get past the barrier
        let barrier = Arc::new(Barrier::new(2));
        let entered = Arc::new(AtomicUsize::new(0));
        let function = bridge.wrap("meet", {
            let barrier = Arc::clone(&barrier);
            let entered = Arc::clone(&entered);
            move |_this: Value, _args: Vec<Value>| {
                entered.fetch_add(1, Ordering::SeqCst);
                barrier.wait();
                Ok::<_, BoxError>(true)
            }
        });

        let a = function.call(Value::Undefined, vec![]);
        let b = function.call(Value::Undefined, vec![]);
        let (a, b) = (a.as_promise().unwrap().clone(), b.as_promise().unwrap().clone());

        assert_eq!(a.await, Ok(Value::Bool(true)));
        assert_eq!(b.await, Ok(Value::Bool(true)));
        assert_eq!(entered.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn handler_receives_this_and_args() {
        let bridge = Bridge::current().unwrap();
        let mut target = exports();
        target.as_object_mut().unwrap().set("prefix", "Dr. ");
        bridge
            .register(&mut target, "greet", |this: Value, args: Vec<Value>| {
                Ok::<_, BoxError>(format!("{}{}", this.get("prefix"), args[0]))
            })
            .unwrap();

        let promise = call(&target, "greet", vec!["Ann".into()]);
        assert_eq!(promise.await, Ok(Value::from("Dr. Ann")));
    }

    #[tokio::test]
    async fn typed_arguments_and_encoded_results() {
        let bridge = Bridge::current().unwrap();
        let mut target = exports();
        bridge
            .register(&mut target, "birthday", |_this: Value, args: Vec<Value>| {
                let mut people = Vec::new();
                for arg in parse_all::<Person, _>(args) {
                    let mut person = arg.into_value()?;
                    person.age += 1;
                    people.push(encode(&person)?);
                }
                Ok::<_, BoxError>(people)
            })
            .unwrap();

        let ann = Value::from(json!({ "name": "Ann", "age": 40 }));
        let result = call(&target, "birthday", vec![ann]).await.unwrap();
        assert_eq!(result.into_json(), json!([{ "name": "Ann", "age": 41 }]));

        let rejection = call(&target, "birthday", vec![Value::from(json!({ "age": "x" }))])
            .await
            .unwrap_err();
        assert_eq!(
            rejection.message(),
            "error setting field 'age' at index 1: expected number for i64 field, got string"
        );
    }

    #[test]
    fn register_requires_an_object_target() {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let bridge = Bridge::new(runtime.handle().clone());
        let mut target = Value::from(3);

        let err = bridge
            .register(&mut target, "f", |_this: Value, _args: Vec<Value>| {
                Ok::<_, BoxError>(Value::Undefined)
            })
            .unwrap_err();
        assert!(matches!(err, BridgeError::NotAnObject(crate::value::ValueType::Number)));
    }

    #[test]
    fn current_fails_outside_a_runtime() {
        assert!(matches!(Bridge::current(), Err(BridgeError::NoRuntime)));
    }
}
