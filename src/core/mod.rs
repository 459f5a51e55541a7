/*!
 * Core Types
 * Error taxonomy and timeout specification shared by both strategies
 */

pub mod errors;
pub mod spec;

pub use errors::{EnforcementError, SpecError, TimeoutError, TimeoutKind};
pub use spec::TimeoutSpec;
