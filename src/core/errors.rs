/*!
 * Error Types
 * Centralized error handling with thiserror and miette support
 *
 * Exactly one of {value, Expired, Caller, Serialization, Enforcement} reaches
 * the caller per call. Caller errors are never reinterpreted as timeouts and
 * nothing is retried automatically.
 */

use miette::Diagnostic;
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Identifier for the error kind raised when a deadline elapses.
///
/// Defaults to [`TimeoutKind::Exceeded`]; callers that need to signal expiry
/// through their own error vocabulary can substitute a custom kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeoutKind {
    /// The default kind: the deadline elapsed before an outcome was available
    Exceeded,

    /// A caller-chosen kind, raised in place of the default on expiry
    Custom(Cow<'static, str>),
}

impl TimeoutKind {
    /// Create a custom kind from a name
    pub fn custom(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Custom(name.into())
    }

    /// Get the kind's name
    pub fn name(&self) -> &str {
        match self {
            Self::Exceeded => "timeout_exceeded",
            Self::Custom(name) => name,
        }
    }
}

impl Default for TimeoutKind {
    fn default() -> Self {
        Self::Exceeded
    }
}

impl fmt::Display for TimeoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Timeout execution error
///
/// `E` is the error type of the underlying work; it crosses the engine
/// unchanged so callers keep matching on their own error values.
#[derive(Debug, Error)]
pub enum TimeoutError<E> {
    /// The deadline elapsed before the work produced an outcome
    #[error("{message}")]
    Expired { kind: TimeoutKind, message: String },

    /// The work itself failed; propagated with its original type and payload
    #[error("{0}")]
    Caller(E),

    /// A value could not cross the worker isolation boundary
    #[error("{type_name} cannot cross the worker boundary: {reason}")]
    Serialization { type_name: String, reason: String },

    /// The enforcement machinery itself failed (spawn, timer, channel)
    #[error("enforcement failure: {0}")]
    Enforcement(#[from] EnforcementError),
}

impl<E> TimeoutError<E> {
    /// Check if this is a deadline expiry
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired { .. })
    }

    /// Check if this is an error raised by the work itself
    pub fn is_caller(&self) -> bool {
        matches!(self, Self::Caller(_))
    }

    /// Get the expiry kind, if this is an expiry
    pub fn kind(&self) -> Option<&TimeoutKind> {
        match self {
            Self::Expired { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Extract the caller's error, if the work itself failed
    pub fn into_caller_error(self) -> Option<E> {
        match self {
            Self::Caller(e) => Some(e),
            _ => None,
        }
    }
}

/// Failures of the enforcement machinery, as opposed to outcomes of the work
#[derive(Debug, Error, Diagnostic)]
pub enum EnforcementError {
    #[error("failed to spawn isolated worker: {0}")]
    #[diagnostic(
        code(timebound::worker::spawn_failed),
        help("Check process limits (RLIMIT_NPROC) and available memory.")
    )]
    Spawn(#[source] nix::errno::Errno),

    #[error("failed to arm deadline timer: {0}")]
    #[diagnostic(
        code(timebound::alarm::timer_failed),
        help("Per-process timer limits may be exhausted. See timer_create(2).")
    )]
    Timer(#[source] nix::errno::Errno),

    #[error("failed to install deadline handler: {0}")]
    #[diagnostic(
        code(timebound::alarm::handler_failed),
        help("SIGALRM handler installation was rejected by the OS.")
    )]
    Handler(#[source] nix::errno::Errno),

    #[error("outcome channel failure: {0}")]
    #[diagnostic(
        code(timebound::worker::channel_failed),
        help("The one-shot channel to the worker could not be created or read.")
    )]
    Channel(#[source] std::io::Error),

    #[error("could not decode worker outcome: {0}")]
    #[diagnostic(
        code(timebound::worker::decode_failed),
        help("The worker wrote a malformed outcome frame.")
    )]
    Decode(String),

    #[error("worker exited without reporting an outcome ({status})")]
    #[diagnostic(
        code(timebound::worker::exited),
        help("The worker crashed or called exit() before writing its outcome.")
    )]
    WorkerExited { status: String },
}

/// Invalid timeout specification
#[derive(Debug, Error, Diagnostic, Clone, PartialEq)]
pub enum SpecError {
    #[error("timeout duration must be a finite number of seconds, got {0}")]
    #[diagnostic(
        code(timebound::spec::invalid_duration),
        help("Pass a finite value; non-positive values mean \"already expired\".")
    )]
    InvalidDuration(f64),
}
