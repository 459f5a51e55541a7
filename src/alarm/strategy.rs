/*!
 * Alarm Strategy Execution
 * Runs the request synchronously under an armed deadline
 *
 * The deadline decides races: if the timer fired before the work returned,
 * the call reports expiry even when a late result (or late caller error) is
 * in hand. A result is honored only if it was produced strictly before the
 * deadline as observed here.
 */

use crate::alarm::guard::AlarmGuard;
use crate::core::errors::TimeoutError;
use crate::core::spec::TimeoutSpec;
use crate::engine::request::ExecutionRequest;
use log::debug;
use std::time::Duration;

/// Run the request on the current thread, bounded by `duration`
///
/// Callers are expected to have routed through the strategy selector: the
/// alarm slot is process-global and interruption is only meaningful on the
/// primary thread. Imposes no transferability requirements - nothing leaves
/// the process.
///
/// Preemption works through EINTR: a blocking syscall in the work is cut
/// short when the deadline fires, but compute-bound work or calls that retry
/// on EINTR (such as `std::thread::sleep`) run to completion and are only
/// then reported as expired. Work that must be stopped on schedule belongs
/// in the isolated worker.
pub fn run<A, T, E, F>(
    request: ExecutionRequest<A, F>,
    duration: Duration,
    spec: &TimeoutSpec,
) -> Result<T, TimeoutError<E>>
where
    F: FnOnce(A) -> Result<T, E>,
{
    let (name, func, args) = request.into_parts();

    // timer_settime treats an all-zero expiration as disarm, so a zero
    // duration must expire here, before any work runs.
    if duration.is_zero() {
        return Err(spec.expired(name, duration));
    }

    let guard = AlarmGuard::arm(duration)?;
    let result = func(args);
    let expired = guard.fired();
    drop(guard);

    if expired {
        debug!("'{name}' ran past its {duration:?} deadline, discarding its outcome");
        return Err(spec.expired(name, duration));
    }
    result.map_err(TimeoutError::Caller)
}
