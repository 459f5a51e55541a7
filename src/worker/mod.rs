/*!
 * Isolated Worker Strategy
 * Out-of-process deadline enforcement: fork a worker, wait on a one-shot
 * outcome channel with a bound, kill and reap the worker on expiry
 */

pub mod channel;
pub mod outcome;
pub mod runner;
pub mod strategy;

pub use channel::{OutcomeChannel, OutcomeReceiver, OutcomeSender, RecvError};
pub use strategy::run;
