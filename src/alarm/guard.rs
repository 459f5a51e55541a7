/*!
 * Alarm Guard
 * Scoped acquisition of the process-wide SIGALRM slot
 *
 * Arming installs the deadline handler and a one-shot timer; dropping the
 * guard disarms the timer and restores whatever handler was installed
 * before, on every exit path (return, caller error, panic unwind). The slot
 * mutex keeps concurrent arms from clobbering each other's saved handler.
 */

use crate::core::errors::EnforcementError;
use log::warn;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigEvent, SigHandler, SigSet, SigevNotify, Signal};
use nix::sys::time::TimeSpec;
use nix::sys::timer::{Expiration, Timer, TimerSetTimeFlags};
use nix::time::ClockId;
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Set by the signal handler when the deadline fires; the only state shared
/// with signal context
static ALARM_FIRED: AtomicBool = AtomicBool::new(false);

/// The SIGALRM handler slot is process-global; one armed call at a time
static ALARM_SLOT: Mutex<()> = Mutex::new(());

extern "C" fn deadline_handler(_signal: nix::libc::c_int) {
    // Async-signal-safe: a single atomic store.
    ALARM_FIRED.store(true, Ordering::SeqCst);
}

/// RAII guard over the armed deadline
pub struct AlarmGuard {
    _slot: MutexGuard<'static, ()>,
    timer: Option<Timer>,
    previous: SigAction,
}

impl AlarmGuard {
    /// Install the deadline handler and arm a one-shot timer for `duration`
    ///
    /// The handler is installed without SA_RESTART so blocking syscalls in
    /// the protected call return EINTR when the deadline fires. Sub-unit
    /// durations are subject to the timer's resolution (typically well under
    /// a millisecond for CLOCK_MONOTONIC timers, but never better than the
    /// OS signal delivery latency).
    pub fn arm(duration: Duration) -> Result<Self, EnforcementError> {
        let slot = ALARM_SLOT.lock();
        ALARM_FIRED.store(false, Ordering::SeqCst);

        let action = SigAction::new(
            SigHandler::Handler(deadline_handler),
            SaFlags::empty(),
            SigSet::empty(),
        );
        // SAFETY: the handler only stores to an atomic flag.
        let previous =
            unsafe { sigaction(Signal::SIGALRM, &action) }.map_err(EnforcementError::Handler)?;

        let timer = match armed_timer(duration) {
            Ok(timer) => timer,
            Err(errno) => {
                // SAFETY: restoring the action observed above.
                if let Err(restore_errno) = unsafe { sigaction(Signal::SIGALRM, &previous) } {
                    warn!("failed to restore SIGALRM handler after timer error: {restore_errno}");
                }
                return Err(EnforcementError::Timer(errno));
            }
        };

        Ok(Self {
            _slot: slot,
            timer: Some(timer),
            previous,
        })
    }

    /// Whether the deadline has fired since arming
    pub fn fired(&self) -> bool {
        ALARM_FIRED.load(Ordering::SeqCst)
    }
}

impl Drop for AlarmGuard {
    fn drop(&mut self) {
        // Dropping the timer deletes it, which disarms any pending expiry.
        self.timer.take();
        // SAFETY: restoring the action saved at arm time.
        if let Err(errno) = unsafe { sigaction(Signal::SIGALRM, &self.previous) } {
            warn!("failed to restore SIGALRM handler: {errno}");
        }
    }
}

/// Create and arm a single-shot CLOCK_MONOTONIC timer for `duration`
fn armed_timer(duration: Duration) -> nix::Result<Timer> {
    let mut timer = Timer::new(ClockId::CLOCK_MONOTONIC, signal_event())?;
    timer.set(
        Expiration::OneShot(TimeSpec::from_duration(duration)),
        TimerSetTimeFlags::empty(),
    )?;
    Ok(timer)
}

/// Expiry notification targeted at the calling thread where the OS allows,
/// so delivery interrupts the protected call rather than an arbitrary thread
#[cfg(target_os = "linux")]
fn signal_event() -> SigEvent {
    // SAFETY: gettid has no preconditions.
    let thread_id = unsafe { nix::libc::gettid() };
    SigEvent::new(SigevNotify::SigevThreadId {
        signal: Signal::SIGALRM,
        thread_id,
        si_value: 0,
    })
}

#[cfg(not(target_os = "linux"))]
fn signal_event() -> SigEvent {
    SigEvent::new(SigevNotify::SigevSignal {
        signal: Signal::SIGALRM,
        si_value: 0,
    })
}
