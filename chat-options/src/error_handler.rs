//! Unified error handling for `chat-options`.
//!
//! This module exposes a single top-level error type [`ChatOptionsError`] for the whole
//! library, and groups domain-specific errors in nested enums ([`ValidationError`],
//! [`RegistryError`], [`CallbackError`], [`ConfigError`]). Small helpers for reading
//! optional numeric settings from an environment-like source return the unified
//! [`Result<T>`] alias.
//!
//! All messages include the prefix `[Chat Options]` to simplify attribution in logs.

use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, ChatOptionsError>;

/// Boxed error produced by a registered tool implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `chat-options` crate.
///
/// Variants wrap domain-specific enums. Prefer adding a new sub-enum for a
/// distinct domain instead of growing this type.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ChatOptionsError {
    /// A builder was finalized with missing or inconsistent fields.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Registration or lookup problem inside a function registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Invocation of a registered callback failed.
    #[error(transparent)]
    Callback(#[from] CallbackError),

    /// Environment-driven defaults could not be read.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/* ------------------------------------------------------------------------- */
/* Validation errors                                                         */
/* ------------------------------------------------------------------------- */

/// Raised by `build()` when a required field is missing or inconsistent.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// `function(name, implementation)` was never called on the builder.
    #[error("[Chat Options] function callback requires a name and an implementation")]
    MissingFunction,

    /// The callback name was empty or whitespace only.
    #[error("[Chat Options] function callback name must not be empty")]
    EmptyName,

    /// A declared input type does not match the implementation's argument type.
    #[error(
        "[Chat Options] callback `{name}` declares input type `{declared}` but its function takes `{actual}`"
    )]
    InputTypeMismatch {
        /// Callback name.
        name: String,
        /// Type passed to `input_type(...)`.
        declared: &'static str,
        /// Argument type of the registered function.
        actual: &'static str,
    },
}

/* ------------------------------------------------------------------------- */
/* Registry errors                                                           */
/* ------------------------------------------------------------------------- */

/// Errors raised by a function registry.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Two callbacks with the same name were registered into one registry.
    #[error("[Chat Options] duplicate function callback name: {0}")]
    DuplicateName(String),

    /// No callback with the requested name is registered.
    #[error("[Chat Options] no function callback registered under name: {0}")]
    NotFound(String),
}

/* ------------------------------------------------------------------------- */
/* Callback errors                                                           */
/* ------------------------------------------------------------------------- */

/// Errors produced while invoking a [`FunctionCallback`](crate::function::function_callback::FunctionCallback).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CallbackError {
    /// The argument passed to `invoke` is not the callback's input type.
    #[error("[Chat Options] callback `{name}` expects input `{expected}`, got `{actual}`")]
    InputTypeMismatch {
        /// Callback name.
        name: String,
        /// Declared input type.
        expected: &'static str,
        /// Type supplied by the caller.
        actual: &'static str,
    },

    /// The caller asked for a result type the function does not return.
    #[error("[Chat Options] callback `{name}` returns `{actual}`, requested `{requested}`")]
    OutputTypeMismatch {
        /// Callback name.
        name: String,
        /// Real output type.
        actual: &'static str,
        /// Type requested by the caller.
        requested: &'static str,
    },

    /// The raw tool-call arguments could not be decoded into the input type.
    #[error("[Chat Options] failed to decode arguments for `{name}`: {source}")]
    Decode {
        /// Callback name.
        name: String,
        /// Underlying decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// The function result could not be encoded back to JSON.
    #[error("[Chat Options] failed to encode result of `{name}`: {source}")]
    Encode {
        /// Callback name.
        name: String,
        /// Underlying encoder error.
        #[source]
        source: serde_json::Error,
    },

    /// The registered implementation itself failed. `source` is its own error, untouched.
    #[error("[Chat Options] function `{name}` failed: {source}")]
    Function {
        /// Callback name.
        name: String,
        /// Error returned by the implementation.
        #[source]
        source: BoxError,
    },
}

impl CallbackError {
    /// Returns the implementation's own error if this is a [`CallbackError::Function`].
    pub fn function_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            CallbackError::Function { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment-driven defaults.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A number failed to parse.
    #[error("[Chat Options] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `CHAT_TOP_K`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u32`).
        reason: &'static str,
    },

    /// Value had the wrong format.
    #[error("[Chat Options] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `CHAT_STOP_SEQUENCES`).
        var: &'static str,
        /// Explanation.
        reason: &'static str,
    },
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Reads an optional, non-empty string (`None` if unset or blank).
pub fn env_opt_string<F>(lookup: &F, name: &'static str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an optional `u32` (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`ChatOptionsError::Config`] with [`ConfigError::InvalidNumber`] if the
/// variable is set but not a valid `u32`.
pub fn env_opt_u32<F>(lookup: &F, name: &'static str) -> Result<Option<u32>>
where
    F: Fn(&str) -> Option<String>,
{
    match env_opt_string(lookup, name) {
        Some(v) => v.parse::<u32>().map(Some).map_err(|_| {
            ChatOptionsError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u32",
            })
        }),
        None => Ok(None),
    }
}

/// Parses an optional finite `f64` (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`ChatOptionsError::Config`] with [`ConfigError::InvalidNumber`] if the
/// variable is set but not a finite number.
pub fn env_opt_f64<F>(lookup: &F, name: &'static str) -> Result<Option<f64>>
where
    F: Fn(&str) -> Option<String>,
{
    match env_opt_string(lookup, name) {
        Some(v) => match v.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(ConfigError::InvalidNumber {
                var: name,
                reason: "expected finite f64",
            }
            .into()),
        },
        None => Ok(None),
    }
}

/// Splits an optional comma-separated list.
///
/// # Errors
/// Returns [`ConfigError::InvalidFormat`] if any entry is empty after trimming.
pub fn env_opt_list<F>(lookup: &F, name: &'static str) -> Result<Option<Vec<String>>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = env_opt_string(lookup, name) else {
        return Ok(None);
    };
    let items: Vec<String> = raw.split(',').map(|s| s.trim().to_string()).collect();
    if items.iter().any(String::is_empty) {
        return Err(ConfigError::InvalidFormat {
            var: name,
            reason: "comma-separated list must not contain empty entries",
        }
        .into());
    }
    Ok(Some(items))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn numbers_parse_or_report_variable() {
        let env = source(&[("A", " 42 "), ("B", "x"), ("C", ""), ("D", "NaN")]);
        assert_eq!(env_opt_u32(&env, "A").unwrap(), Some(42));
        assert_eq!(env_opt_u32(&env, "C").unwrap(), None);
        assert_eq!(env_opt_u32(&env, "MISSING").unwrap(), None);

        let err = env_opt_u32(&env, "B").unwrap_err();
        assert!(matches!(
            err,
            ChatOptionsError::Config(ConfigError::InvalidNumber { var: "B", .. })
        ));
        assert!(env_opt_f64(&env, "D").is_err());
        assert_eq!(env_opt_f64(&env, "A").unwrap(), Some(42.0));
    }

    #[test]
    fn list_rejects_empty_entries() {
        let env = source(&[("OK", "###, END"), ("BAD", "a,,b")]);
        assert_eq!(
            env_opt_list(&env, "OK").unwrap(),
            Some(vec!["###".to_string(), "END".to_string()])
        );
        assert!(matches!(
            env_opt_list(&env, "BAD"),
            Err(ChatOptionsError::Config(ConfigError::InvalidFormat { .. }))
        ));
    }

    #[test]
    fn messages_are_prefixed() {
        let err = ChatOptionsError::from(RegistryError::NotFound("weather".into()));
        assert!(err.to_string().starts_with("[Chat Options]"));
        assert!(err.to_string().contains("weather"));
    }
}
