use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Crate target prefix used to filter only library-originated logs.
pub const TARGET_PREFIX: &str = "chat_options";

/// RFC3339 UTC timer implemented via `chrono`.
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        let s = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// Build a **library-scoped** formatting layer that renders ONLY events emitted by this crate
/// (callback builds, registry rejections, tool dispatch).
///
/// - RFC3339 UTC timestamps
/// - Compact single-line format with `file:line` and target
/// - Span close events, so `dispatch` reports its duration
/// - ANSI colors only when stdout is a terminal
///
/// Compose it in the binary together with your global subscriber.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stdout().is_terminal();

    let only_this_crate = filter::filter_fn(|meta| meta.target().starts_with(TARGET_PREFIX));

    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(only_this_crate)
}

/// Level directive for **this** library only, e.g. `chat_options=debug`.
///
/// # Errors
/// Propagates the directive parser error (not expected for a valid [`Level`]).
pub fn level_directive(level: Level) -> Result<Directive, ParseError> {
    let s = format!("{TARGET_PREFIX}={}", level.as_str().to_lowercase());
    Directive::from_str(&s)
}

/// Creates an `EnvFilter` from `RUST_LOG` (or `default`), then raises this
/// library to `level`.
///
/// # Errors
/// See [`level_directive`].
pub fn env_filter_with_level(default: &str, level: Level) -> Result<EnvFilter, ParseError> {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    Ok(base.add_directive(level_directive(level)?))
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use tracing_subscriber::layer::SubscriberExt;

    use super::*;
    use crate::function::function_callback::FunctionCallback;

    #[test]
    fn directive_targets_this_crate() {
        let d = level_directive(Level::DEBUG).unwrap();
        assert_eq!(d.to_string(), "chat_options=debug");
    }

    #[test]
    fn layer_composes_with_registry() {
        let subscriber = tracing_subscriber::registry()
            .with(env_filter_with_level("warn", Level::DEBUG).unwrap())
            .with(layer());

        tracing::subscriber::with_default(subscriber, || {
            let cb = FunctionCallback::builder()
                .function("traced", |i: u8| Ok::<_, Infallible>(i))
                .build();
            assert!(cb.is_ok());
        });
    }
}
