//! Runtime descriptor of a callback's argument type.

use std::any::{Any, TypeId, type_name};
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Type-erased decoder: JSON value → boxed argument of the described type.
pub(crate) type DecodeFn = fn(Value) -> Result<Box<dyn Any + Send>, serde_json::Error>;

/// Describes the argument type a [`FunctionCallback`](super::function_callback::FunctionCallback)
/// accepts.
///
/// Carries the Rust [`TypeId`] (for checked invocation), the type name (for
/// diagnostics and schema adapters) and a JSON decoder used by tool dispatch.
/// Two descriptors are equal when they describe the same Rust type.
#[derive(Clone, Copy)]
pub struct InputType {
    id: TypeId,
    name: &'static str,
    decode: DecodeFn,
}

impl InputType {
    /// Descriptor for `T`.
    pub fn of<T>() -> Self
    where
        T: DeserializeOwned + Send + 'static,
    {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            decode: decode_as::<T>,
        }
    }

    /// Fully qualified Rust type name (e.g. `i32`, `my_app::Weather`).
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// `true` if this descriptor stands for `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    pub(crate) fn decode(&self, raw: Value) -> Result<Box<dyn Any + Send>, serde_json::Error> {
        (self.decode)(raw)
    }
}

impl PartialEq for InputType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for InputType {}

impl fmt::Debug for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InputType").field(&self.name).finish()
    }
}

fn decode_as<T>(raw: Value) -> Result<Box<dyn Any + Send>, serde_json::Error>
where
    T: DeserializeOwned + Send + 'static,
{
    let value: T = serde_json::from_value(raw)?;
    Ok(Box::new(value))
}
