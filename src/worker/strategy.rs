/*!
 * Process Strategy
 * Deadline enforcement through an isolated worker process
 *
 * The worker is a forked child tied to the parent's lifetime; the parent
 * blocks on the outcome channel with a bound equal to the deadline and kills
 * the worker outright on expiry. A worker that finishes a moment after the
 * parent declared timeout loses the race: its late frame is discarded with it.
 *
 * A killed worker runs no cleanup code; timed-out work carries no side-effect
 * guarantees.
 */

use crate::core::errors::{EnforcementError, TimeoutError};
use crate::core::spec::TimeoutSpec;
use crate::engine::request::ExecutionRequest;
use crate::worker::channel::{OutcomeChannel, RecvError};
use crate::worker::outcome::WireOutcome;
use crate::worker::runner;
use log::{debug, warn};
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{fork, ForkResult, Pid};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};

/// How long the parent waits for a finished worker to exit on its own before
/// escalating to SIGKILL
const EXIT_GRACE: Duration = Duration::from_millis(200);
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Run the request in an isolated worker, bounded by `duration`
///
/// The arguments are probed for transferability before anything is spawned;
/// a value that cannot cross the boundary raises
/// [`TimeoutError::Serialization`] with zero execution.
pub fn run<A, T, E, F>(
    request: ExecutionRequest<A, F>,
    duration: Duration,
    spec: &TimeoutSpec,
) -> Result<T, TimeoutError<E>>
where
    F: FnOnce(A) -> Result<T, E>,
    A: Serialize,
    T: Serialize + DeserializeOwned,
    E: Serialize + DeserializeOwned,
{
    let (name, func, args) = request.into_parts();

    // Capability probe: the function body must never run if its arguments
    // cannot cross the isolation boundary.
    if let Err(err) = bincode::serialize(&args) {
        return Err(TimeoutError::Serialization {
            type_name: std::any::type_name::<A>().to_string(),
            reason: err.to_string(),
        });
    }

    let (sender, receiver) = OutcomeChannel::create()
        .map_err(|e| TimeoutError::Enforcement(EnforcementError::Channel(e)))?;
    let deadline = Instant::now() + duration;

    // SAFETY: the child's first and only act is to run the captured work and
    // report over its channel end; it exits via _exit without touching the
    // parent's teardown paths.
    match unsafe { fork() } {
        Err(errno) => Err(EnforcementError::Spawn(errno).into()),
        Ok(ForkResult::Child) => {
            drop(receiver);
            bind_to_parent_lifetime();
            runner::run_worker(sender, func, args)
        }
        Ok(ForkResult::Parent { child }) => {
            drop(sender);
            debug!("spawned worker {child} for '{name}' (deadline in {duration:?})");

            match receiver.recv_frame_deadline(deadline) {
                Ok(frame) => {
                    reap_with_grace(child);
                    decode(&frame)
                }
                Err(RecvError::Elapsed) => {
                    warn!("worker {child} for '{name}' missed its {duration:?} deadline, killing");
                    terminate(child);
                    Err(spec.expired(name, duration))
                }
                Err(RecvError::Disconnected) => {
                    let status = reap_blocking(child);
                    Err(EnforcementError::WorkerExited { status }.into())
                }
                Err(RecvError::Io(e)) => {
                    terminate(child);
                    Err(EnforcementError::Channel(e).into())
                }
            }
        }
    }
}

/// Decode the worker's single frame into the call's result
fn decode<T, E>(frame: &[u8]) -> Result<T, TimeoutError<E>>
where
    T: DeserializeOwned,
    E: DeserializeOwned,
{
    match bincode::deserialize::<WireOutcome<T, E>>(frame) {
        Ok(WireOutcome::Success(value)) => Ok(value),
        Ok(WireOutcome::Failure(error)) => Err(TimeoutError::Caller(error)),
        Ok(WireOutcome::Unserializable { type_name, reason }) => {
            Err(TimeoutError::Serialization { type_name, reason })
        }
        Ok(WireOutcome::Panicked { message }) => {
            // The work panicked in the child; resume the panic here so both
            // strategies surface panics the same way.
            std::panic::resume_unwind(Box::new(message))
        }
        Err(err) => Err(EnforcementError::Decode(err.to_string()).into()),
    }
}

/// Mark the worker so it cannot outlive the parent (child side)
fn bind_to_parent_lifetime() {
    #[cfg(target_os = "linux")]
    // SAFETY: plain prctl with immediate arguments.
    if unsafe { nix::libc::prctl(nix::libc::PR_SET_PDEATHSIG, nix::libc::SIGKILL as nix::libc::c_ulong) } != 0 {
        // Not fatal: the parent still kills or reaps the worker on every
        // normal path; this only covers abrupt parent death.
        warn!("could not set parent-death signal for worker");
    }
}

/// Kill the worker and reap it; used when the deadline has already been
/// declared and no result will be honored
fn terminate(child: Pid) {
    if let Err(errno) = kill(child, Signal::SIGKILL) {
        // ESRCH: it exited between the deadline check and the kill. The
        // deadline already won; its late frame stays discarded.
        debug!("worker {child} already gone at kill time: {errno}");
    }
    match waitpid(child, None) {
        Ok(status) => debug!("reaped worker {child}: {status:?}"),
        Err(errno) => warn!("failed to reap worker {child}: {errno}"),
    }
}

/// Wait briefly for a finished worker to exit cleanly, then force it
///
/// Cleanup only: the outcome is already in hand, so failures here are logged
/// and never surfaced to the caller.
fn reap_with_grace(child: Pid) {
    let grace_deadline = Instant::now() + EXIT_GRACE;
    loop {
        match waitpid(child, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => {
                if Instant::now() >= grace_deadline {
                    debug!("worker {child} lingering after success, killing");
                    terminate(child);
                    return;
                }
                std::thread::sleep(EXIT_POLL_INTERVAL);
            }
            Ok(status) => {
                debug!("worker {child} exited: {status:?}");
                return;
            }
            Err(errno) => {
                warn!("failed to reap worker {child}: {errno}");
                return;
            }
        }
    }
}

/// Blocking reap for a worker that died before reporting; returns a
/// description of its wait status
fn reap_blocking(child: Pid) -> String {
    match waitpid(child, None) {
        Ok(WaitStatus::Exited(_, code)) => format!("exit code {code}"),
        Ok(WaitStatus::Signaled(_, signal, _)) => format!("killed by {signal}"),
        Ok(status) => format!("{status:?}"),
        Err(errno) => format!("wait failed: {errno}"),
    }
}
