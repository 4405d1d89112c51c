use thiserror::Error;

use super::registry::RegistryError;
use crate::value::ValueType;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("no tokio runtime to run bridged calls on")]
    NoRuntime,

    #[error("registration target must be an object, got {0}")]
    NotAnObject(ValueType),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
