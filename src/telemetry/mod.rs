//! Telemetry: tracing bootstrap and change-feed rendering.

use std::io::IsTerminal;

use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::reactive::StateChange;

pub const PATH_COLOR: &str = "\x1b[32m"; // green
pub const LINE_COLOR: &str = "\x1b[35m"; // magenta / dark pink
pub const RESET_COLOR: &str = "\x1b[0m";

/// Installs the global tracing subscriber: env-filtered fmt output plus
/// `tracing-error`'s span-trace layer. Loads `.env` first so `RUST_LOG`
/// can come from a local env file. Idempotent — a second call is a no-op.
pub fn init_tracing() {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(ErrorLayer::default())
        .try_init();
}

/// Formatter color mode for telemetry output.
///
/// - [`FormatterMode::Auto`]: detects TTY capability via `stderr.is_terminal()`
/// - [`FormatterMode::Colored`]: always include color codes
/// - [`FormatterMode::Plain`]: never include color codes (for logs/files)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatterMode {
    #[default]
    Auto,
    Colored,
    Plain,
}

impl FormatterMode {
    /// Auto-detect based on stderr TTY capability.
    pub fn auto_detect() -> Self {
        if std::io::stderr().is_terminal() {
            FormatterMode::Colored
        } else {
            FormatterMode::Plain
        }
    }

    /// Returns true if this mode should use colored output. `Auto` performs
    /// TTY detection on each call.
    pub fn is_colored(&self) -> bool {
        match self {
            FormatterMode::Auto => std::io::stderr().is_terminal(),
            FormatterMode::Colored => true,
            FormatterMode::Plain => false,
        }
    }
}

/// Renders state changes for consumption by sinks.
pub trait ChangeFormatter: Send + Sync {
    fn render(&self, change: &StateChange) -> String;
}

/// Plain text formatter with optional ANSI color codes.
pub struct PlainFormatter {
    mode: FormatterMode,
}

impl PlainFormatter {
    /// Create a new formatter with auto-detected color mode.
    pub fn new() -> Self {
        Self {
            mode: FormatterMode::Auto,
        }
    }

    /// Create a new formatter with explicit color mode.
    pub fn with_mode(mode: FormatterMode) -> Self {
        Self { mode }
    }
}

impl Default for PlainFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFormatter for PlainFormatter {
    fn render(&self, change: &StateChange) -> String {
        let use_color = self.mode.is_colored();
        match change {
            StateChange::RootObserved { at } => {
                if use_color {
                    format!("{LINE_COLOR}root state observed | {at}{RESET_COLOR}\n")
                } else {
                    format!("root state observed | {at}\n")
                }
            }
            StateChange::SliceMounted { path, at } => {
                let joined = path.join(".");
                if use_color {
                    format!(
                        "{LINE_COLOR}slice mounted at {PATH_COLOR}{joined}{LINE_COLOR} | {at}{RESET_COLOR}\n"
                    )
                } else {
                    format!("slice mounted at {joined} | {at}\n")
                }
            }
        }
    }
}
