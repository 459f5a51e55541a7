/*!
 * Timebound Library
 * Deadline enforcement for arbitrary units of work: run a callable, give up
 * after a configured duration, and surface a distinguishable timeout error
 * instead of blocking forever.
 *
 * Two enforcement strategies with equivalent external behavior:
 *
 * - **Alarm**: in-process, one-shot POSIX timer delivering SIGALRM on the
 *   calling thread. Usable only on the process's primary thread; the handler
 *   slot is saved and restored around every call.
 * - **Isolated worker**: a forked child process that reports exactly one
 *   outcome over a one-shot channel and is killed when the deadline elapses.
 *   Usable from any thread; requires the arguments and result to be
 *   transferable across the process boundary.
 */

#[cfg(not(unix))]
compile_error!("timebound relies on POSIX signals and fork; unix targets only");

pub mod alarm;
pub mod core;
pub mod engine;
pub mod worker;

// Re-exports
pub use crate::core::errors::{EnforcementError, SpecError, TimeoutError, TimeoutKind};
pub use crate::core::spec::TimeoutSpec;
pub use crate::engine::request::ExecutionRequest;
pub use crate::engine::select::{can_use_alarm, on_primary_thread, Strategy, StrategyPreference};
pub use crate::engine::wrap::Timebound;
pub use crate::engine::run;
