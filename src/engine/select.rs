/*!
 * Strategy Selector
 * Decides per invocation whether the alarm strategy is usable
 *
 * SIGALRM-based preemption is a capability of the process's primary thread
 * only; every other context is routed to worker-based isolation regardless
 * of caller preference - correctness over caller intent.
 */

use log::debug;

/// Caller preference for how the deadline is enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyPreference {
    /// Prefer the isolated worker even where the alarm is available (default
    /// of the call contract)
    IsolatedWorker,

    /// Prefer the in-process alarm; honored only on the primary thread
    Alarm,
}

/// The strategy actually used for a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Alarm,
    IsolatedWorker,
}

/// Whether the alarm strategy may be used for this invocation
pub fn can_use_alarm(preference: StrategyPreference) -> bool {
    preference == StrategyPreference::Alarm && on_primary_thread()
}

/// Select the strategy for this invocation
pub fn select(preference: StrategyPreference) -> Strategy {
    if can_use_alarm(preference) {
        Strategy::Alarm
    } else {
        if preference == StrategyPreference::Alarm {
            debug!("alarm requested off the primary thread, falling back to isolated worker");
        }
        Strategy::IsolatedWorker
    }
}

/// Whether the current thread is the process's primary thread, the only
/// context asynchronous SIGALRM preemption can target
#[cfg(target_os = "linux")]
pub fn on_primary_thread() -> bool {
    // The main thread's kernel thread id equals the process id.
    // SAFETY: both calls have no preconditions.
    unsafe { nix::libc::gettid() == nix::libc::getpid() }
}

#[cfg(not(target_os = "linux"))]
pub fn on_primary_thread() -> bool {
    std::thread::current().name() == Some("main")
}
