/*!
 * Timeout Engine
 * Façade combining spec, selector, and strategies into one operation:
 * "run this callable with these arguments, bounded by this duration"
 */

pub mod request;
pub mod select;
pub mod wrap;

use crate::core::errors::TimeoutError;
use crate::core::spec::TimeoutSpec;
use crate::engine::request::ExecutionRequest;
use crate::engine::select::{select, Strategy, StrategyPreference};
use crate::{alarm, worker};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Run a request bounded by `spec`, using the preferred strategy where the
/// selector allows it
///
/// - `spec.duration() == None`: the request runs directly and its value or
///   error passes through unchanged; no timing apparatus is engaged.
/// - a zero duration means "already expired": the expiry error is raised and
///   the work never runs.
/// - otherwise the selected strategy enforces the deadline; on expiry the
///   configured kind is raised with the caller-supplied message, or a
///   generated one naming the function and the effective duration.
///
/// The serde bounds exist because the isolated worker may be selected at
/// runtime; the alarm path itself moves nothing across a boundary.
pub fn run<A, T, E, F>(
    request: ExecutionRequest<A, F>,
    spec: &TimeoutSpec,
    preference: StrategyPreference,
) -> Result<T, TimeoutError<E>>
where
    F: FnOnce(A) -> Result<T, E>,
    A: Serialize,
    T: Serialize + DeserializeOwned,
    E: Serialize + DeserializeOwned,
{
    let Some(duration) = spec.duration() else {
        let (_, func, args) = request.into_parts();
        return func(args).map_err(TimeoutError::Caller);
    };

    if duration.is_zero() {
        // Non-positive durations are "already expired" by policy.
        return Err(spec.expired(request.name(), duration));
    }

    match select(preference) {
        Strategy::Alarm => {
            debug!("enforcing {duration:?} on '{}' via alarm", request.name());
            alarm::run(request, duration, spec)
        }
        Strategy::IsolatedWorker => {
            debug!(
                "enforcing {duration:?} on '{}' via isolated worker",
                request.name()
            );
            worker::run(request, duration, spec)
        }
    }
}
