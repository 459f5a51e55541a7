/*!
 * Worker Runner
 * Child-side execution: run the work, write exactly one outcome, exit
 *
 * The runner never returns. Every path - value, caller error, panic, encode
 * failure - ends with one frame on the channel (or one failed attempt) and an
 * immediate `_exit`, so the child cannot fall back into the parent's code.
 */

use crate::worker::channel::OutcomeSender;
use crate::worker::outcome::WireOutcome;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};

/// Execute the work in the forked child and report its outcome
pub(crate) fn run_worker<A, T, E, F>(sender: OutcomeSender, func: F, args: A) -> !
where
    F: FnOnce(A) -> Result<T, E>,
    T: Serialize,
    E: Serialize,
{
    // The parent's panic hook would print a backtrace to the shared stderr;
    // the panic is reported through the channel instead.
    panic::set_hook(Box::new(|_| {}));

    let outcome: WireOutcome<T, E> = match panic::catch_unwind(AssertUnwindSafe(move || func(args)))
    {
        Ok(Ok(value)) => WireOutcome::Success(value),
        Ok(Err(error)) => WireOutcome::Failure(error),
        Err(payload) => WireOutcome::Panicked {
            message: panic_message(payload.as_ref()),
        },
    };

    let frame = encode(&outcome);
    let code = match sender.send_frame(&frame) {
        Ok(()) => 0,
        Err(_) => 1,
    };

    // Skip atexit handlers inherited from the parent.
    unsafe { nix::libc::_exit(code) }
}

/// Encode the envelope, falling back to a reconstruction when the payload
/// refuses to serialize
fn encode<T, E>(outcome: &WireOutcome<T, E>) -> Vec<u8>
where
    T: Serialize,
    E: Serialize,
{
    match bincode::serialize(outcome) {
        Ok(frame) => frame,
        Err(err) => {
            let fallback: WireOutcome<(), ()> = WireOutcome::Unserializable {
                type_name: outcome.payload_type_name().to_string(),
                reason: err.to_string(),
            };
            // Plain strings always encode; an empty frame surfaces as a
            // decode error on the parent side if they somehow do not.
            bincode::serialize(&fallback).unwrap_or_default()
        }
    }
}

/// Render a panic payload as text
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_from_str_and_string() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");

        let payload: Box<dyn std::any::Any + Send> = Box::new("owned".to_string());
        assert_eq!(panic_message(payload.as_ref()), "owned");

        let payload: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "opaque panic payload");
    }

    #[test]
    fn test_encode_falls_back_for_unserializable_payload() {
        struct Opaque;
        impl Serialize for Opaque {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("refuses to cross"))
            }
        }

        let outcome: WireOutcome<Opaque, ()> = WireOutcome::Success(Opaque);
        let frame = encode(&outcome);
        let decoded: WireOutcome<(), ()> = bincode::deserialize(&frame).unwrap();
        match decoded {
            WireOutcome::Unserializable { type_name, reason } => {
                assert!(type_name.contains("Opaque"));
                assert!(reason.contains("refuses to cross"));
            }
            other => panic!("expected Unserializable, got {other:?}"),
        }
    }
}
