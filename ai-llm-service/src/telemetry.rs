use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Target prefixes of the workspace crates whose events this layer renders.
pub const WORKSPACE_TARGETS: &[&str] = &[
    "mediquery",
    "api",
    "med_qa",
    "rag_store",
    "answer_eval",
    "ai_llm_service",
];

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

/// Build a **workspace-scoped** formatting layer that renders only events whose
/// target starts with one of [`WORKSPACE_TARGETS`].
///
/// - RFC3339 UTC timestamps
/// - Compact single-line format
/// - `file:line` and target (module path)
/// - Span close events (duration at the end of spans)
/// - ANSI colors only when stdout is a terminal
///
/// Third-party crates (hyper, reqwest, ort) stay quiet unless a second layer is
/// added by the binary.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stdout().is_terminal();

    let only_workspace = filter::filter_fn(|meta| {
        WORKSPACE_TARGETS
            .iter()
            .any(|prefix| meta.target().starts_with(prefix))
    });

    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(only_workspace)
}

/// Level directive for a single target, e.g. `rag_store=debug`.
pub fn level_directive(target: &str, level: Level) -> Option<Directive> {
    let s = format!("{target}={}", level.as_str().to_lowercase());
    Directive::from_str(&s).ok()
}

/// Creates an `EnvFilter` from `RUST_LOG` or `default`, then raises every
/// workspace crate to `level`.
///
/// Example: `default = "warn"`, `level = Level::DEBUG` shows warnings from
/// dependencies and debug output from this workspace.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    WORKSPACE_TARGETS
        .iter()
        .filter_map(|t| level_directive(t, level))
        .fold(base, EnvFilter::add_directive)
}
