/*!
 * Alarm Strategy
 * In-process deadline enforcement: one-shot POSIX timer delivering SIGALRM
 * on the calling thread, with scoped handler installation and restoration
 */

pub mod guard;
pub mod strategy;

pub use guard::AlarmGuard;
pub use strategy::run;
