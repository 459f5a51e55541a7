/*!
 * Timeout Specification
 * Per-callable timeout configuration: duration, error kind, message
 *
 * A spec is built once per wrapped callable and may be superseded per call by
 * an explicit override duration, which always wins over the configured value.
 */

use crate::core::errors::{SpecError, TimeoutError, TimeoutKind};
use std::time::Duration;

/// Timeout specification for a bounded call
///
/// `duration = None` disables enforcement entirely: the call runs unguarded
/// and no timing apparatus is engaged. A zero duration means "already
/// expired" - the engine raises the configured kind before the work runs.
#[derive(Debug, Clone, Default)]
pub struct TimeoutSpec {
    duration: Option<Duration>,
    kind: TimeoutKind,
    message: Option<String>,
}

impl TimeoutSpec {
    /// Spec with enforcement disabled
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Spec bounding the call to `duration`
    pub fn after(duration: Duration) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    /// Spec bounding the call to a fractional number of seconds
    ///
    /// Non-positive values are clamped to zero and mean immediate expiry.
    /// NaN and infinite values are rejected.
    pub fn after_secs(secs: f64) -> Result<Self, SpecError> {
        if !secs.is_finite() {
            return Err(SpecError::InvalidDuration(secs));
        }
        let duration = if secs <= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(secs)
        };
        Ok(Self::after(duration))
    }

    /// Replace the configured duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Set the error kind raised on expiry
    pub fn with_kind(mut self, kind: TimeoutKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set a fixed expiry message, replacing the generated one
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Get the configured duration
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Get the configured error kind
    pub fn kind(&self) -> &TimeoutKind {
        &self.kind
    }

    /// Get the configured message, if any
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Build the expiry error for a call against this spec
    ///
    /// `duration` is the effective bound for the call (a per-call override may
    /// differ from the configured one), so the generated message names what
    /// was actually enforced.
    pub fn expired<E>(&self, name: &str, duration: Duration) -> TimeoutError<E> {
        let message = match &self.message {
            Some(message) => message.clone(),
            None => format!(
                "Function {} timed out after {} seconds",
                name,
                format_seconds(duration)
            ),
        };
        TimeoutError::Expired {
            kind: self.kind.clone(),
            message,
        }
    }
}

/// Render a duration in seconds the way callers wrote it: "1", "0.2"
fn format_seconds(duration: Duration) -> String {
    format!("{}", duration.as_secs_f64())
}
