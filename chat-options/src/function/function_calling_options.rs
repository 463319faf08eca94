//! Chat options extended with tool callbacks (function calling).
//!
//! [`FunctionCallingOptions`] embeds a [`ChatOptions`] and adds two ways of
//! designating tools:
//!
//! - `function_callbacks`: callback instances, kept in insertion order and
//!   resolvable by name through [`FunctionCallingOptions::resolve`];
//! - `functions`: bare names referring to callbacks registered elsewhere (an
//!   external catalog). They are never resolved here.
//!
//! Duplicate callback names are rejected at [`FunctionCallingOptionsBuilder::build`].
//!
//! # Examples
//!
//! ```
//! use std::convert::Infallible;
//! use chat_options::config::chat_options::GenerationOptions;
//! use chat_options::function::function_callback::FunctionCallback;
//! use chat_options::function::function_calling_options::{FunctionCallingOptions, ToolCallbacks};
//!
//! let cb = FunctionCallback::builder()
//!     .function("cb", |i: i32| Ok::<_, Infallible>(i))
//!     .description("cb")
//!     .build()?;
//!
//! let options = FunctionCallingOptions::builder()
//!     .function_callbacks([cb.clone()])
//!     .functions(["func"])
//!     .top_k(111)
//!     .temperature(1.1)
//!     .build()?;
//!
//! assert!(options.function_callbacks().contains(&cb));
//! assert!(options.functions().contains("func"));
//! assert_eq!(options.top_k(), Some(111));
//! # Ok::<(), chat_options::error_handler::ChatOptionsError>(())
//! ```

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::config::chat_options::{ChatOptions, ChatOptionsBuilder, GenerationOptions};
use crate::error_handler::{RegistryError, Result};
use crate::function::function_callback::FunctionCallback;

/// Read-only view over a tool registry.
///
/// Implemented by [`FunctionCallingOptions`]; the tool loop should depend on
/// this trait only.
pub trait ToolCallbacks {
    /// Registered callbacks in insertion order.
    fn function_callbacks(&self) -> &[FunctionCallback];

    /// Names of tools registered elsewhere.
    fn functions(&self) -> &BTreeSet<String>;

    /// Non-failing lookup by name.
    fn get(&self, name: &str) -> Option<&FunctionCallback>;

    /// Looks up a callback by name among `function_callbacks` only.
    ///
    /// # Errors
    /// [`RegistryError::NotFound`] if no callback has this name.
    fn resolve(&self, name: &str) -> Result<&FunctionCallback> {
        self.get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()).into())
    }
}

/// Immutable chat options plus a tool registry.
#[derive(Debug, Clone, Default)]
pub struct FunctionCallingOptions {
    options: ChatOptions,
    function_callbacks: Vec<FunctionCallback>,
    functions: BTreeSet<String>,
    index: HashMap<String, usize>,
}

impl FunctionCallingOptions {
    /// Returns a fresh builder.
    pub fn builder() -> FunctionCallingOptionsBuilder {
        FunctionCallingOptionsBuilder::default()
    }

    /// Wraps plain options in a registry with no tools.
    pub fn from_chat_options(options: ChatOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// The embedded base options.
    pub fn chat_options(&self) -> &ChatOptions {
        &self.options
    }

    /// `true` if this exact callback (by identity) is registered.
    pub fn contains_callback(&self, callback: &FunctionCallback) -> bool {
        self.function_callbacks.iter().any(|cb| cb.ptr_eq(callback))
    }

    /// Returns a new registry with its own collections.
    ///
    /// Callback handles are shared with `self`; callbacks are immutable.
    pub fn copy(&self) -> FunctionCallingOptions {
        self.clone()
    }

    /// Returns a builder pre-filled with this registry's contents.
    pub fn to_builder(&self) -> FunctionCallingOptionsBuilder {
        FunctionCallingOptionsBuilder {
            options: self.options.to_builder(),
            function_callbacks: self.function_callbacks.clone(),
            functions: self.functions.clone(),
        }
    }

    /// Overlays `overrides` on top of `self`.
    ///
    /// - scalar options follow [`ChatOptions::merge`];
    /// - a callback in `overrides` replaces the base callback with the same
    ///   name in place, new names are appended;
    /// - function names are the union of both sets.
    ///
    /// # Errors
    /// Only if the merged registry fails to build, which cannot happen for two
    /// valid inputs.
    pub fn merge(&self, overrides: &FunctionCallingOptions) -> Result<FunctionCallingOptions> {
        let mut callbacks = self.function_callbacks.clone();
        for cb in &overrides.function_callbacks {
            match self.index.get(cb.name()) {
                Some(&pos) => callbacks[pos] = cb.clone(),
                None => callbacks.push(cb.clone()),
            }
        }

        let functions = self
            .functions
            .union(&overrides.functions)
            .cloned()
            .collect::<BTreeSet<_>>();

        FunctionCallingOptionsBuilder {
            options: self.options.merge(&overrides.options).to_builder(),
            function_callbacks: callbacks,
            functions,
        }
        .build()
    }
}

impl ToolCallbacks for FunctionCallingOptions {
    fn function_callbacks(&self) -> &[FunctionCallback] {
        &self.function_callbacks
    }

    fn functions(&self) -> &BTreeSet<String> {
        &self.functions
    }

    fn get(&self, name: &str) -> Option<&FunctionCallback> {
        self.index
            .get(name)
            .and_then(|&pos| self.function_callbacks.get(pos))
    }
}

impl GenerationOptions for FunctionCallingOptions {
    fn model(&self) -> Option<&str> {
        self.options.model()
    }

    fn temperature(&self) -> Option<f64> {
        self.options.temperature()
    }

    fn top_p(&self) -> Option<f64> {
        self.options.top_p()
    }

    fn top_k(&self) -> Option<u32> {
        self.options.top_k()
    }

    fn max_tokens(&self) -> Option<u32> {
        self.options.max_tokens()
    }

    fn frequency_penalty(&self) -> Option<f64> {
        self.options.frequency_penalty()
    }

    fn presence_penalty(&self) -> Option<f64> {
        self.options.presence_penalty()
    }

    fn stop_sequences(&self) -> Option<&[String]> {
        self.options.stop_sequences()
    }
}

/// Construction stage for [`FunctionCallingOptions`].
///
/// Forwards every [`ChatOptionsBuilder`] setter and adds the tool setters.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct FunctionCallingOptionsBuilder {
    options: ChatOptionsBuilder,
    function_callbacks: Vec<FunctionCallback>,
    functions: BTreeSet<String>,
}

impl FunctionCallingOptionsBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.options = self.options.model(model);
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.options = self.options.temperature(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.options = self.options.top_p(top_p);
        self
    }

    pub fn top_k(mut self, top_k: u32) -> Self {
        self.options = self.options.top_k(top_k);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.options = self.options.max_tokens(max_tokens);
        self
    }

    pub fn frequency_penalty(mut self, penalty: f64) -> Self {
        self.options = self.options.frequency_penalty(penalty);
        self
    }

    pub fn presence_penalty(mut self, penalty: f64) -> Self {
        self.options = self.options.presence_penalty(penalty);
        self
    }

    pub fn stop_sequences<I, S>(mut self, stops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = self.options.stop_sequences(stops);
        self
    }

    pub fn stop_sequence(mut self, stop: impl Into<String>) -> Self {
        self.options = self.options.stop_sequence(stop);
        self
    }

    /// Replaces the whole callback collection.
    pub fn function_callbacks<I>(mut self, callbacks: I) -> Self
    where
        I: IntoIterator<Item = FunctionCallback>,
    {
        self.function_callbacks = callbacks.into_iter().collect();
        self
    }

    /// Appends one callback.
    pub fn function_callback(mut self, callback: FunctionCallback) -> Self {
        self.function_callbacks.push(callback);
        self
    }

    /// Replaces the whole set of referenced function names.
    pub fn functions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.functions = names.into_iter().map(Into::into).collect();
        self
    }

    /// Adds one referenced function name.
    pub fn function(mut self, name: impl Into<String>) -> Self {
        self.functions.insert(name.into());
        self
    }

    /// Finalizes the registry.
    ///
    /// # Errors
    /// [`RegistryError::DuplicateName`] naming the first callback (in insertion
    /// order) whose name was already taken.
    pub fn build(self) -> Result<FunctionCallingOptions> {
        let mut index = HashMap::with_capacity(self.function_callbacks.len());
        for (pos, cb) in self.function_callbacks.iter().enumerate() {
            if index.insert(cb.name().to_string(), pos).is_some() {
                warn!(name = cb.name(), "duplicate function callback rejected");
                return Err(RegistryError::DuplicateName(cb.name().to_string()).into());
            }
        }

        debug!(
            callbacks = self.function_callbacks.len(),
            functions = self.functions.len(),
            "function calling options built"
        );

        Ok(FunctionCallingOptions {
            options: self.options.build(),
            function_callbacks: self.function_callbacks,
            functions: self.functions,
            index,
        })
    }
}
