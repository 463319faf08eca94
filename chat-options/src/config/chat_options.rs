//! Immutable generation parameters for a single chat request.
//!
//! [`ChatOptions`] is produced by [`ChatOptionsBuilder`] and never changes
//! afterwards. Every field is optional: `None` means "use the provider default".
//! Range checks are left to the provider adapter that translates the options,
//! so values like `top_p = 2.2` are stored as given.
//!
//! # Examples
//!
//! ```
//! use chat_options::config::chat_options::{ChatOptions, GenerationOptions};
//!
//! let opts = ChatOptions::builder()
//!     .temperature(0.7)
//!     .top_p(0.9)
//!     .top_k(40)
//!     .build();
//!
//! let copy = opts.copy();
//! assert_eq!(copy.temperature(), Some(0.7));
//! assert_eq!(copy, opts);
//! ```

/// Read-only view over generation parameters.
///
/// Consumers that only need sampling settings should depend on this trait
/// rather than on a concrete options type.
pub trait GenerationOptions {
    /// Model identifier.
    fn model(&self) -> Option<&str>;
    /// Sampling temperature.
    fn temperature(&self) -> Option<f64>;
    /// Nucleus sampling mass.
    fn top_p(&self) -> Option<f64>;
    /// Candidate pool size for top-k sampling.
    fn top_k(&self) -> Option<u32>;
    /// Maximum number of tokens to generate.
    fn max_tokens(&self) -> Option<u32>;
    /// Frequency penalty.
    fn frequency_penalty(&self) -> Option<f64>;
    /// Presence penalty.
    fn presence_penalty(&self) -> Option<f64>;
    /// Sequences that stop generation.
    fn stop_sequences(&self) -> Option<&[String]>;
}

/// Generation parameters for one chat request.
///
/// # Fields
///
/// - `model`: Model identifier (e.g., `"llama3"`, `"gpt-4o"`).
/// - `temperature`: Controls randomness (0.0 = deterministic, >1.0 = more random).
/// - `top_p`: Nucleus sampling cutoff.
/// - `top_k`: Size of the candidate pool.
/// - `max_tokens`: Maximum number of tokens to generate.
/// - `frequency_penalty` / `presence_penalty`: Repetition controls.
/// - `stop_sequences`: Strings that end generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    model: Option<String>,
    temperature: Option<f64>,
    top_p: Option<f64>,
    top_k: Option<u32>,
    max_tokens: Option<u32>,
    frequency_penalty: Option<f64>,
    presence_penalty: Option<f64>,
    stop_sequences: Option<Vec<String>>,
}

impl ChatOptions {
    /// Returns a fresh builder with every field unset.
    pub fn builder() -> ChatOptionsBuilder {
        ChatOptionsBuilder::default()
    }

    /// Returns an independent copy with identical field values.
    ///
    /// Collection fields are cloned, so nothing is shared with `self`.
    pub fn copy(&self) -> ChatOptions {
        self.clone()
    }

    /// Returns a builder pre-filled with this value's fields.
    pub fn to_builder(&self) -> ChatOptionsBuilder {
        ChatOptionsBuilder {
            inner: self.clone(),
        }
    }

    /// Overlays `overrides` on top of `self`.
    ///
    /// Each field comes from `overrides` when it is set there, otherwise from `self`.
    /// `stop_sequences` is replaced as a whole, never concatenated.
    pub fn merge(&self, overrides: &ChatOptions) -> ChatOptions {
        ChatOptions {
            model: overrides.model.clone().or_else(|| self.model.clone()),
            temperature: overrides.temperature.or(self.temperature),
            top_p: overrides.top_p.or(self.top_p),
            top_k: overrides.top_k.or(self.top_k),
            max_tokens: overrides.max_tokens.or(self.max_tokens),
            frequency_penalty: overrides.frequency_penalty.or(self.frequency_penalty),
            presence_penalty: overrides.presence_penalty.or(self.presence_penalty),
            stop_sequences: overrides
                .stop_sequences
                .clone()
                .or_else(|| self.stop_sequences.clone()),
        }
    }
}

impl GenerationOptions for ChatOptions {
    fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    fn top_p(&self) -> Option<f64> {
        self.top_p
    }

    fn top_k(&self) -> Option<u32> {
        self.top_k
    }

    fn max_tokens(&self) -> Option<u32> {
        self.max_tokens
    }

    fn frequency_penalty(&self) -> Option<f64> {
        self.frequency_penalty
    }

    fn presence_penalty(&self) -> Option<f64> {
        self.presence_penalty
    }

    fn stop_sequences(&self) -> Option<&[String]> {
        self.stop_sequences.as_deref()
    }
}

/// Mutable construction stage for [`ChatOptions`].
///
/// Every setter overwrites the previous value of its field, except
/// [`ChatOptionsBuilder::stop_sequence`], which appends.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct ChatOptionsBuilder {
    inner: ChatOptions,
}

impl ChatOptionsBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.inner.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.inner.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.inner.top_p = Some(top_p);
        self
    }

    pub fn top_k(mut self, top_k: u32) -> Self {
        self.inner.top_k = Some(top_k);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.inner.max_tokens = Some(max_tokens);
        self
    }

    pub fn frequency_penalty(mut self, penalty: f64) -> Self {
        self.inner.frequency_penalty = Some(penalty);
        self
    }

    pub fn presence_penalty(mut self, penalty: f64) -> Self {
        self.inner.presence_penalty = Some(penalty);
        self
    }

    /// Replaces all stop sequences.
    pub fn stop_sequences<I, S>(mut self, stops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.stop_sequences = Some(stops.into_iter().map(Into::into).collect());
        self
    }

    /// Appends a single stop sequence.
    pub fn stop_sequence(mut self, stop: impl Into<String>) -> Self {
        self.inner
            .stop_sequences
            .get_or_insert_with(Vec::new)
            .push(stop.into());
        self
    }

    /// Finalizes the options. Never fails.
    pub fn build(self) -> ChatOptions {
        self.inner
    }
}
