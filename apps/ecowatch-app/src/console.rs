//! # Console Filter
//!
//! Developer-console noise suppression, as an injected value instead of a
//! patched global.
//!
//! ## Channels and Patterns
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Console Filter                                  │
//! │                                                                         │
//! │  args ──► join(" ") ──► any pattern is a substring?                    │
//! │                            │                                            │
//! │                 yes ◄──────┴──────► no                                  │
//! │                  │                   │                                  │
//! │              dropped          ConsoleSink::write(channel, message)     │
//! │                                                                         │
//! │  warn                 ──► warn patterns                                │
//! │  error / log          ──► suppressed patterns                          │
//! │  handle_rejection     ──► suppressed patterns, else previous handler,  │
//! │                           else reported as unhandled                   │
//! │                                                                         │
//! │  unfiltered()         ──► straight to the sink                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The filter only decides what reaches the console. It never touches
//! application data.

use std::fmt::Display;
use std::sync::Arc;

use tracing::{error, info, warn};

// =============================================================================
// Patterns
// =============================================================================

/// Compiled-in warning patterns.
pub const DEFAULT_WARN_PATTERNS: &[&str] = &[
    "Require cycle:",
    "VirtualizedLists should never be nested",
    "Non-serializable values were found in the navigation state",
];

/// Compiled-in patterns for known-noisy dev errors.
pub const DEFAULT_SUPPRESSED_PATTERNS: &[&str] = &[
    "ECONNREFUSED",
    "Network request failed",
    "Could not connect to development server",
    "Unable to resolve host",
];

/// The two pattern lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolePatterns {
    /// Checked against the warn channel.
    pub warn: Vec<String>,
    /// Checked against the error and log channels and rejections.
    pub suppressed: Vec<String>,
}

impl Default for ConsolePatterns {
    fn default() -> Self {
        ConsolePatterns {
            warn: DEFAULT_WARN_PATTERNS.iter().map(|p| p.to_string()).collect(),
            suppressed: DEFAULT_SUPPRESSED_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl ConsolePatterns {
    /// Adds extra patterns to both lists.
    pub fn extended(
        mut self,
        warn: impl IntoIterator<Item = String>,
        suppressed: impl IntoIterator<Item = String>,
    ) -> Self {
        self.warn.extend(warn);
        self.suppressed.extend(suppressed);
        self
    }
}

fn matches_any(patterns: &[String], message: &str) -> bool {
    patterns.iter().any(|p| message.contains(p.as_str()))
}

fn join_args<I>(args: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    args.into_iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Sinks
// =============================================================================

/// Console channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Log,
    Warn,
    Error,
}

/// Where forwarded console output goes.
pub trait ConsoleSink: Send + Sync {
    fn write(&self, channel: Channel, message: &str);
}

/// Forwards console output to tracing at the matching level.
pub struct TracingSink;

impl ConsoleSink for TracingSink {
    fn write(&self, channel: Channel, message: &str) {
        match channel {
            Channel::Log => info!(target: "ecowatch::console", "{}", message),
            Channel::Warn => warn!(target: "ecowatch::console", "{}", message),
            Channel::Error => error!(target: "ecowatch::console", "{}", message),
        }
    }
}

/// Handler for rejections the filter does not swallow.
pub type RejectionHandler = Box<dyn Fn(&str) + Send + Sync>;

/// What happened to a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionOutcome {
    /// Matched a suppressed pattern; marked handled.
    Suppressed,
    /// Passed to the previously installed handler.
    Delegated,
    /// No previous handler; reported on the error channel.
    Unhandled,
}

// =============================================================================
// Console Filter
// =============================================================================

/// Pattern-based console filter in front of a [`ConsoleSink`].
pub struct ConsoleFilter {
    sink: Arc<dyn ConsoleSink>,
    patterns: ConsolePatterns,
    previous_rejection_handler: Option<RejectionHandler>,
}

impl ConsoleFilter {
    pub fn new(sink: Arc<dyn ConsoleSink>, patterns: ConsolePatterns) -> Self {
        ConsoleFilter {
            sink,
            patterns,
            previous_rejection_handler: None,
        }
    }

    /// Installs the handler that unmatched rejections are delegated to.
    /// Only one is kept; installing again replaces it.
    pub fn with_previous_rejection_handler(mut self, handler: RejectionHandler) -> Self {
        self.previous_rejection_handler = Some(handler);
        self
    }

    /// Log channel. Returns whether the call was forwarded.
    pub fn log<I>(&self, args: I) -> bool
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.forward(Channel::Log, &self.patterns.suppressed, join_args(args))
    }

    /// Warn channel. Returns whether the call was forwarded.
    pub fn warn<I>(&self, args: I) -> bool
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.forward(Channel::Warn, &self.patterns.warn, join_args(args))
    }

    /// Error channel. Returns whether the call was forwarded.
    pub fn error<I>(&self, args: I) -> bool
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.forward(Channel::Error, &self.patterns.suppressed, join_args(args))
    }

    /// Routes an uncaught async failure.
    pub fn handle_rejection(&self, message: &str) -> RejectionOutcome {
        if matches_any(&self.patterns.suppressed, message) {
            return RejectionOutcome::Suppressed;
        }

        match self.previous_rejection_handler {
            Some(ref handler) => {
                handler(message);
                RejectionOutcome::Delegated
            }
            None => {
                self.sink
                    .write(Channel::Error, &format!("Unhandled rejection: {}", message));
                RejectionOutcome::Unhandled
            }
        }
    }

    /// A handle that bypasses all patterns.
    pub fn unfiltered(&self) -> Unfiltered<'_> {
        Unfiltered { sink: &*self.sink }
    }

    fn forward(&self, channel: Channel, patterns: &[String], message: String) -> bool {
        if matches_any(patterns, &message) {
            return false;
        }
        self.sink.write(channel, &message);
        true
    }
}

/// Direct access to the sink, see [`ConsoleFilter::unfiltered`].
pub struct Unfiltered<'a> {
    sink: &'a dyn ConsoleSink,
}

impl Unfiltered<'_> {
    pub fn log<I>(&self, args: I)
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.sink.write(Channel::Log, &join_args(args));
    }

    pub fn warn<I>(&self, args: I)
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.sink.write(Channel::Warn, &join_args(args));
    }

    pub fn error<I>(&self, args: I)
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.sink.write(Channel::Error, &join_args(args));
    }
}
