//! Named, described, typed wrapper around a tool implementation.
//!
//! A [`FunctionCallback`] is what a model sees as a "tool": a unique name, a
//! human-readable description and an input type, backed by a caller-supplied
//! function. The implementation is stored type-erased so callbacks with
//! different argument/result types can live in one registry, while
//! [`FunctionCallback::invoke`] keeps calls type-checked at runtime.
//!
//! The callback never decodes raw input. Whoever drives the tool loop decodes
//! the model's arguments into [`FunctionCallback::input_type`] first (see
//! [`crate::tool_dispatch`]).
//!
//! # Examples
//!
//! ```
//! use std::convert::Infallible;
//! use chat_options::function::function_callback::FunctionCallback;
//! use chat_options::function::input_type::InputType;
//!
//! let cb = FunctionCallback::builder()
//!     .function("double", |x: i64| Ok::<_, Infallible>(x * 2))
//!     .description("Doubles a number")
//!     .input_type(InputType::of::<i64>())
//!     .build()?;
//!
//! let out: i64 = cb.invoke(21_i64)?;
//! assert_eq!(out, 42);
//! # Ok::<(), chat_options::error_handler::ChatOptionsError>(())
//! ```

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

use crate::error_handler::{BoxError, CallbackError, Result, ValidationError};
use crate::function::input_type::InputType;

/// Why a type-erased call did not produce a value.
enum ErasedFailure {
    WrongInput,
    Failed(BoxError),
}

type ErasedFn =
    dyn Fn(Box<dyn Any + Send>) -> std::result::Result<Box<dyn Any + Send>, ErasedFailure>
        + Send
        + Sync;

type EncodeFn = fn(Box<dyn Any + Send>) -> Option<std::result::Result<Value, serde_json::Error>>;

struct Inner {
    name: String,
    description: String,
    input_type: InputType,
    output_id: TypeId,
    output_name: &'static str,
    function: Box<ErasedFn>,
    encode: EncodeFn,
}

/// An immutable tool definition with its implementation.
///
/// Cloning is cheap and yields a handle to the *same* callback. Equality is
/// identity: a callback equals its clones and nothing else, even another
/// callback with identical name and description.
#[derive(Clone)]
pub struct FunctionCallback {
    inner: Arc<Inner>,
}

impl FunctionCallback {
    /// Returns a fresh builder.
    pub fn builder() -> FunctionCallbackBuilder {
        FunctionCallbackBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Human-readable description offered to the model. May be empty.
    pub fn description(&self) -> &str {
        &self.inner.description
    }

    pub fn input_type(&self) -> InputType {
        self.inner.input_type
    }

    /// Rust type name of the implementation's result.
    pub fn output_type_name(&self) -> &'static str {
        self.inner.output_name
    }

    /// `true` if both handles point at the same callback.
    pub fn ptr_eq(&self, other: &FunctionCallback) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Applies an already-decoded argument and returns the typed result.
    ///
    /// Both types are checked before the implementation runs.
    ///
    /// # Errors
    /// - [`CallbackError::InputTypeMismatch`] if `I` is not the input type
    /// - [`CallbackError::OutputTypeMismatch`] if `O` is not the result type
    /// - [`CallbackError::Function`] carrying the implementation's own error
    pub fn invoke<I, O>(&self, input: I) -> Result<O>
    where
        I: Send + 'static,
        O: 'static,
    {
        if !self.inner.input_type.is::<I>() {
            return Err(CallbackError::InputTypeMismatch {
                name: self.inner.name.clone(),
                expected: self.inner.input_type.name(),
                actual: type_name::<I>(),
            }
            .into());
        }
        if self.inner.output_id != TypeId::of::<O>() {
            return Err(self.output_mismatch::<O>().into());
        }

        let out = self.invoke_erased(Box::new(input))?;
        match out.downcast::<O>() {
            Ok(value) => Ok(*value),
            Err(_) => Err(self.output_mismatch::<O>().into()),
        }
    }

    /// Type-erased form of [`FunctionCallback::invoke`].
    ///
    /// `input` must hold a value of [`FunctionCallback::input_type`]; the
    /// returned box holds a value of the result type.
    ///
    /// # Errors
    /// - [`CallbackError::InputTypeMismatch`] if `input` holds another type
    /// - [`CallbackError::Function`] carrying the implementation's own error
    pub fn invoke_erased(&self, input: Box<dyn Any + Send>) -> Result<Box<dyn Any + Send>> {
        (self.inner.function)(input).map_err(|failure| {
            let err = match failure {
                ErasedFailure::WrongInput => CallbackError::InputTypeMismatch {
                    name: self.inner.name.clone(),
                    expected: self.inner.input_type.name(),
                    actual: "<type-erased value>",
                },
                ErasedFailure::Failed(source) => CallbackError::Function {
                    name: self.inner.name.clone(),
                    source,
                },
            };
            err.into()
        })
    }

    /// Serializes a result produced by [`FunctionCallback::invoke_erased`].
    pub(crate) fn encode_output(&self, output: Box<dyn Any + Send>) -> Result<Value> {
        match (self.inner.encode)(output) {
            Some(Ok(value)) => Ok(value),
            Some(Err(source)) => Err(CallbackError::Encode {
                name: self.inner.name.clone(),
                source,
            }
            .into()),
            None => Err(CallbackError::OutputTypeMismatch {
                name: self.inner.name.clone(),
                actual: self.inner.output_name,
                requested: "<type-erased value>",
            }
            .into()),
        }
    }

    fn output_mismatch<O>(&self) -> CallbackError {
        CallbackError::OutputTypeMismatch {
            name: self.inner.name.clone(),
            actual: self.inner.output_name,
            requested: type_name::<O>(),
        }
    }
}

impl PartialEq for FunctionCallback {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for FunctionCallback {}

impl fmt::Debug for FunctionCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionCallback")
            .field("name", &self.inner.name)
            .field("description", &self.inner.description)
            .field("input_type", &self.inner.input_type)
            .field("output_type", &self.inner.output_name)
            .finish()
    }
}

/// Name + implementation captured by [`FunctionCallbackBuilder::function`].
struct PendingFunction {
    name: String,
    input_type: InputType,
    output_id: TypeId,
    output_name: &'static str,
    function: Box<ErasedFn>,
    encode: EncodeFn,
}

/// Construction stage for [`FunctionCallback`].
#[derive(Default)]
#[must_use]
pub struct FunctionCallbackBuilder {
    function: Option<PendingFunction>,
    description: String,
    declared_input: Option<InputType>,
}

impl FunctionCallbackBuilder {
    /// Sets the unique tool name and its implementation in one call.
    ///
    /// The argument type `I` becomes the callback's input type. Errors
    /// returned by `implementation` are passed through to the caller of
    /// `invoke` unchanged.
    pub fn function<I, O, E, F>(mut self, name: impl Into<String>, implementation: F) -> Self
    where
        I: DeserializeOwned + Send + 'static,
        O: Serialize + Send + 'static,
        E: Into<BoxError>,
        F: Fn(I) -> std::result::Result<O, E> + Send + Sync + 'static,
    {
        let function: Box<ErasedFn> = Box::new(move |arg: Box<dyn Any + Send>| {
            let input = arg
                .downcast::<I>()
                .map_err(|_| ErasedFailure::WrongInput)?;
            implementation(*input)
                .map(|out| Box::new(out) as Box<dyn Any + Send>)
                .map_err(|e| ErasedFailure::Failed(e.into()))
        });

        self.function = Some(PendingFunction {
            name: name.into(),
            input_type: InputType::of::<I>(),
            output_id: TypeId::of::<O>(),
            output_name: type_name::<O>(),
            function,
            encode: encode_as::<O>,
        });
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Declares the expected input type. `build` checks it against the function.
    pub fn input_type(mut self, input_type: InputType) -> Self {
        self.declared_input = Some(input_type);
        self
    }

    /// Finalizes the callback.
    ///
    /// # Errors
    /// - [`ValidationError::MissingFunction`] if `function(..)` was never called
    /// - [`ValidationError::EmptyName`] if the name is blank
    /// - [`ValidationError::InputTypeMismatch`] if a declared input type differs
    ///   from the function's argument type
    pub fn build(self) -> Result<FunctionCallback> {
        let Some(pending) = self.function else {
            return Err(ValidationError::MissingFunction.into());
        };

        if pending.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }

        if let Some(declared) = self.declared_input {
            if declared != pending.input_type {
                return Err(ValidationError::InputTypeMismatch {
                    name: pending.name,
                    declared: declared.name(),
                    actual: pending.input_type.name(),
                }
                .into());
            }
        }

        debug!(
            name = %pending.name,
            input = pending.input_type.name(),
            output = pending.output_name,
            "function callback built"
        );

        Ok(FunctionCallback {
            inner: Arc::new(Inner {
                name: pending.name,
                description: self.description,
                input_type: pending.input_type,
                output_id: pending.output_id,
                output_name: pending.output_name,
                function: pending.function,
                encode: pending.encode,
            }),
        })
    }
}

fn encode_as<O>(output: Box<dyn Any + Send>) -> Option<std::result::Result<Value, serde_json::Error>>
where
    O: Serialize + 'static,
{
    let value = output.downcast::<O>().ok()?;
    Some(serde_json::to_value(&*value))
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;
    use crate::error_handler::ChatOptionsError;

    #[derive(Debug, thiserror::Error)]
    #[error("station offline")]
    struct StationOffline;

    fn identity(name: &str) -> FunctionCallback {
        FunctionCallback::builder()
            .function(name, |i: i32| Ok::<_, Infallible>(i))
            .description(name)
            .input_type(InputType::of::<i32>())
            .build()
            .unwrap()
    }

    #[test]
    fn exposes_metadata() {
        let cb = identity("cb");
        assert_eq!(cb.name(), "cb");
        assert_eq!(cb.description(), "cb");
        assert_eq!(cb.input_type(), InputType::of::<i32>());
        assert_eq!(cb.output_type_name(), "i32");
    }

    #[test]
    fn description_defaults_to_empty() {
        let cb = FunctionCallback::builder()
            .function("noop", |_: ()| Ok::<_, Infallible>(()))
            .build()
            .unwrap();
        assert_eq!(cb.description(), "");
    }

    #[test]
    fn build_without_function_fails() {
        let err = FunctionCallback::builder()
            .description("nothing")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ChatOptionsError::Validation(ValidationError::MissingFunction)
        ));
    }

    #[test]
    fn build_with_blank_name_fails() {
        let err = FunctionCallback::builder()
            .function("  ", |i: i32| Ok::<_, Infallible>(i))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ChatOptionsError::Validation(ValidationError::EmptyName)
        ));
    }

    #[test]
    fn declared_input_type_must_match_function() {
        let err = FunctionCallback::builder()
            .function("cb", |i: i32| Ok::<_, Infallible>(i))
            .input_type(InputType::of::<String>())
            .build()
            .unwrap_err();
        match err {
            ChatOptionsError::Validation(ValidationError::InputTypeMismatch {
                name,
                declared,
                actual,
            }) => {
                assert_eq!(name, "cb");
                assert_eq!(declared, type_name::<String>());
                assert_eq!(actual, "i32");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invoke_applies_argument() {
        let cb = FunctionCallback::builder()
            .function("len", |s: String| Ok::<_, Infallible>(s.len()))
            .build()
            .unwrap();
        let n: usize = cb.invoke("four".to_string()).unwrap();
        assert_eq!(n, 4);
    }

    #[test]
    fn invoke_checks_types_before_running() {
        let cb = identity("cb");

        let err = cb.invoke::<i64, i32>(1).unwrap_err();
        assert!(matches!(
            err,
            ChatOptionsError::Callback(CallbackError::InputTypeMismatch { .. })
        ));

        let err = cb.invoke::<i32, String>(1).unwrap_err();
        assert!(matches!(
            err,
            ChatOptionsError::Callback(CallbackError::OutputTypeMismatch { .. })
        ));
    }

    #[test]
    fn erased_invoke_rejects_wrong_payload() {
        let cb = identity("cb");
        let err = cb.invoke_erased(Box::new("nope")).unwrap_err();
        assert!(matches!(
            err,
            ChatOptionsError::Callback(CallbackError::InputTypeMismatch { .. })
        ));

        let out = cb.invoke_erased(Box::new(7_i32)).unwrap();
        assert_eq!(*out.downcast::<i32>().unwrap(), 7);
    }

    #[test]
    fn implementation_error_propagates_unchanged() {
        let cb = FunctionCallback::builder()
            .function("weather", |_city: String| -> std::result::Result<f64, StationOffline> {
                Err(StationOffline)
            })
            .build()
            .unwrap();

        let err = cb.invoke::<String, f64>("Oslo".into()).unwrap_err();
        let ChatOptionsError::Callback(inner) = err else {
            panic!("expected callback error");
        };
        let source = inner.function_error().expect("function error");
        assert!(source.downcast_ref::<StationOffline>().is_some());
    }

    #[test]
    fn anyhow_errors_are_accepted() {
        let cb = FunctionCallback::builder()
            .function("fail", |_: ()| -> anyhow::Result<()> {
                Err(anyhow::anyhow!("quota exceeded"))
            })
            .build()
            .unwrap();

        let err = cb.invoke::<(), ()>(()).unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn equality_is_identity() {
        let a = identity("cb");
        let b = identity("cb");
        let a2 = a.clone();

        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert!(vec![a.clone()].contains(&a2));
        assert!(!vec![a].contains(&b));
    }

    #[test]
    fn encodes_output_as_json() {
        let cb = identity("cb");
        let out = cb.invoke_erased(Box::new(5_i32)).unwrap();
        assert_eq!(cb.encode_output(out).unwrap(), serde_json::json!(5));
    }
}
