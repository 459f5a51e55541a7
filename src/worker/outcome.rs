/*!
 * Wire Outcome
 * The single envelope a worker writes to the outcome channel
 */

use serde::{Deserialize, Serialize};

/// Outcome of the work as it crosses the isolation boundary
///
/// Produced at most once per request and consumed at most once. `Success` and
/// `Failure` carry the caller's own types so their identity survives the
/// transport; the remaining variants are reconstructions for values that
/// could not cross.
#[derive(Debug, Serialize, Deserialize)]
pub enum WireOutcome<T, E> {
    /// The work returned a value
    Success(T),

    /// The work returned its own error
    Failure(E),

    /// The value or error could not be encoded for the transport
    Unserializable { type_name: String, reason: String },

    /// The work panicked; the payload rendered as text
    Panicked { message: String },
}

impl<T, E> WireOutcome<T, E> {
    /// Name of the payload type for diagnostics on encode failure
    pub(crate) fn payload_type_name(&self) -> &'static str {
        match self {
            Self::Success(_) => std::any::type_name::<T>(),
            Self::Failure(_) => std::any::type_name::<E>(),
            _ => "outcome envelope",
        }
    }
}
