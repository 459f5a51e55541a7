/*!
 * Timebound Wrapper
 * The call contract exposed to decoration layers: configure a callable once,
 * call it many times, override the deadline per call
 */

use crate::core::errors::{TimeoutError, TimeoutKind};
use crate::core::spec::TimeoutSpec;
use crate::engine;
use crate::engine::request::ExecutionRequest;
use crate::engine::select::StrategyPreference;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// A callable with an attached timeout specification
///
/// Configuration mirrors the recognized options of the call contract:
/// duration (absent disables enforcement), `use_isolated_worker` (default
/// true), error kind (default [`TimeoutKind::Exceeded`]), and an optional
/// fixed message.
///
/// ## Example
///
/// ```no_run
/// use std::time::Duration;
/// use timebound::{Timebound, TimeoutError};
///
/// let fetch = Timebound::wrap("fetch", |_url: String| -> Result<u32, String> {
///     // ... long-running work ...
///     Ok(200)
/// })
/// .with_duration(Duration::from_secs(3));
///
/// let status: Result<u32, TimeoutError<String>> =
///     fetch.call("https://example.com".to_string());
/// let rushed: Result<u32, TimeoutError<String>> = fetch
///     .call_with_deadline("https://example.com".to_string(), Duration::from_secs(1));
/// ```
pub struct Timebound<F> {
    name: &'static str,
    func: F,
    spec: TimeoutSpec,
    use_isolated_worker: bool,
}

impl<F> Timebound<F> {
    /// Wrap a callable with enforcement disabled and isolated-worker
    /// preference
    pub fn wrap(name: &'static str, func: F) -> Self {
        Self {
            name,
            func,
            spec: TimeoutSpec::unbounded(),
            use_isolated_worker: true,
        }
    }

    /// Replace the whole timeout specification
    pub fn with_spec(mut self, spec: TimeoutSpec) -> Self {
        self.spec = spec;
        self
    }

    /// Set the default deadline
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.spec = self.spec.with_duration(duration);
        self
    }

    /// Set the error kind raised on expiry
    pub fn with_kind(mut self, kind: TimeoutKind) -> Self {
        self.spec = self.spec.with_kind(kind);
        self
    }

    /// Set a fixed expiry message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.spec = self.spec.with_message(message);
        self
    }

    /// Prefer the isolated worker (true, the default) or the in-process
    /// alarm where the selector allows it (false)
    pub fn use_isolated_worker(mut self, isolated: bool) -> Self {
        self.use_isolated_worker = isolated;
        self
    }

    /// The wrapped callable's name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The configured specification
    pub fn spec(&self) -> &TimeoutSpec {
        &self.spec
    }

    /// Call with the configured deadline
    pub fn call<A, T, E>(&self, args: A) -> Result<T, TimeoutError<E>>
    where
        F: Fn(A) -> Result<T, E>,
        A: Serialize,
        T: Serialize + DeserializeOwned,
        E: Serialize + DeserializeOwned,
    {
        self.dispatch(args, None)
    }

    /// Call with a deadline overriding the configured one for this call only
    ///
    /// The override always takes precedence, including over an absent
    /// configured duration.
    pub fn call_with_deadline<A, T, E>(
        &self,
        args: A,
        deadline: Duration,
    ) -> Result<T, TimeoutError<E>>
    where
        F: Fn(A) -> Result<T, E>,
        A: Serialize,
        T: Serialize + DeserializeOwned,
        E: Serialize + DeserializeOwned,
    {
        self.dispatch(args, Some(deadline))
    }

    fn dispatch<A, T, E>(
        &self,
        args: A,
        override_duration: Option<Duration>,
    ) -> Result<T, TimeoutError<E>>
    where
        F: Fn(A) -> Result<T, E>,
        A: Serialize,
        T: Serialize + DeserializeOwned,
        E: Serialize + DeserializeOwned,
    {
        let spec = match override_duration {
            Some(duration) => self.spec.clone().with_duration(duration),
            None => self.spec.clone(),
        };
        let preference = if self.use_isolated_worker {
            StrategyPreference::IsolatedWorker
        } else {
            StrategyPreference::Alarm
        };
        engine::run(
            ExecutionRequest::new(self.name, |a| (self.func)(a), args),
            &spec,
            preference,
        )
    }
}
