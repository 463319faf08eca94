//! Default chat options: presets and values read from environment variables.
//!
//! Presets mirror the usual request profiles:
//!
//! - **Precise**  → low temperature (refine/verify)
//! - **Balanced** → moderate temperature with nucleus sampling (drafting)
//! - **Creative** → high temperature, wide candidate pool
//!
//! # Environment variables
//!
//! All optional; unset or empty means "provider default".
//! - `CHAT_MODEL`             = model identifier
//! - `CHAT_TEMPERATURE`       = f64
//! - `CHAT_TOP_P`             = f64
//! - `CHAT_TOP_K`             = u32
//! - `CHAT_MAX_TOKENS`        = u32
//! - `CHAT_FREQUENCY_PENALTY` = f64
//! - `CHAT_PRESENCE_PENALTY`  = f64
//! - `CHAT_STOP_SEQUENCES`    = comma-separated list

use tracing::debug;

use crate::{
    config::chat_options::ChatOptions,
    error_handler::{Result, env_opt_f64, env_opt_list, env_opt_string, env_opt_u32},
};

/// Low-randomness preset.
///
/// # Defaults
/// - `temperature = Some(0.2)`
pub fn precise() -> ChatOptions {
    ChatOptions::builder().temperature(0.2).build()
}

/// General-purpose preset.
///
/// # Defaults
/// - `temperature = Some(0.7)`
/// - `top_p = Some(0.9)`
pub fn balanced() -> ChatOptions {
    ChatOptions::builder().temperature(0.7).top_p(0.9).build()
}

/// High-diversity preset.
///
/// # Defaults
/// - `temperature = Some(1.0)`
/// - `top_p = Some(0.95)`
/// - `top_k = Some(50)`
pub fn creative() -> ChatOptions {
    ChatOptions::builder()
        .temperature(1.0)
        .top_p(0.95)
        .top_k(50)
        .build()
}

/// Reads options from the process environment.
///
/// # Errors
/// See [`from_source`].
pub fn from_env() -> Result<ChatOptions> {
    from_source(|name| std::env::var(name).ok())
}

/// Reads options through an arbitrary key lookup.
///
/// # Errors
/// - [`ConfigError::InvalidNumber`](crate::error_handler::ConfigError::InvalidNumber)
///   if a numeric variable is set but malformed
/// - [`ConfigError::InvalidFormat`](crate::error_handler::ConfigError::InvalidFormat)
///   if `CHAT_STOP_SEQUENCES` has empty entries
pub fn from_source<F>(lookup: F) -> Result<ChatOptions>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = ChatOptions::builder();

    if let Some(model) = env_opt_string(&lookup, "CHAT_MODEL") {
        builder = builder.model(model);
    }
    if let Some(t) = env_opt_f64(&lookup, "CHAT_TEMPERATURE")? {
        builder = builder.temperature(t);
    }
    if let Some(p) = env_opt_f64(&lookup, "CHAT_TOP_P")? {
        builder = builder.top_p(p);
    }
    if let Some(k) = env_opt_u32(&lookup, "CHAT_TOP_K")? {
        builder = builder.top_k(k);
    }
    if let Some(n) = env_opt_u32(&lookup, "CHAT_MAX_TOKENS")? {
        builder = builder.max_tokens(n);
    }
    if let Some(v) = env_opt_f64(&lookup, "CHAT_FREQUENCY_PENALTY")? {
        builder = builder.frequency_penalty(v);
    }
    if let Some(v) = env_opt_f64(&lookup, "CHAT_PRESENCE_PENALTY")? {
        builder = builder.presence_penalty(v);
    }
    if let Some(stops) = env_opt_list(&lookup, "CHAT_STOP_SEQUENCES")? {
        builder = builder.stop_sequences(stops);
    }

    let options = builder.build();
    debug!(?options, "chat options loaded from environment");
    Ok(options)
}
