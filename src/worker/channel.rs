/*!
 * Outcome Channel
 * Single-use transport for exactly one outcome frame between a worker and
 * its parent
 *
 * Built on a socketpair so the parent side can block with a read timeout.
 * One writer, one reader, one message: both endpoint types consume themselves
 * on use, so a second send or receive does not typecheck.
 */

use std::io::{ErrorKind, Read, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::time::Instant;

/// Factory for one channel per call
pub struct OutcomeChannel;

impl OutcomeChannel {
    /// Create a connected (sender, receiver) endpoint pair
    pub fn create() -> std::io::Result<(OutcomeSender, OutcomeReceiver)> {
        let (write_end, read_end) = UnixStream::pair()?;
        Ok((
            OutcomeSender { stream: write_end },
            OutcomeReceiver { stream: read_end },
        ))
    }
}

/// Write end, owned exclusively by the worker
pub struct OutcomeSender {
    stream: UnixStream,
}

impl OutcomeSender {
    /// Write the single outcome frame and close the write end
    pub fn send_frame(mut self, payload: &[u8]) -> std::io::Result<()> {
        let len = payload.len() as u32;
        self.stream.write_all(&len.to_le_bytes())?;
        self.stream.write_all(payload)?;
        self.stream.shutdown(Shutdown::Write)
    }
}

/// Why a bounded receive produced no frame
#[derive(Debug)]
pub enum RecvError {
    /// The deadline elapsed before a complete frame arrived
    Elapsed,
    /// The write end closed without a complete frame (worker died)
    Disconnected,
    /// Transport failure
    Io(std::io::Error),
}

/// Read end, owned exclusively by the parent
pub struct OutcomeReceiver {
    stream: UnixStream,
}

impl OutcomeReceiver {
    /// Block for the single outcome frame until `deadline`
    ///
    /// A frame only counts if it is complete before the deadline; a partial
    /// frame at expiry is discarded along with the worker.
    pub fn recv_frame_deadline(mut self, deadline: Instant) -> Result<Vec<u8>, RecvError> {
        let mut len_buf = [0u8; 4];
        self.read_bounded(&mut len_buf, deadline)?;

        let len = u32::from_le_bytes(len_buf) as usize;
        let mut frame = vec![0u8; len];
        self.read_bounded(&mut frame, deadline)?;
        Ok(frame)
    }

    fn read_bounded(&mut self, buf: &mut [u8], deadline: Instant) -> Result<(), RecvError> {
        let remaining = match deadline.checked_duration_since(Instant::now()) {
            Some(remaining) if !remaining.is_zero() => remaining,
            _ => return Err(RecvError::Elapsed),
        };
        self.stream
            .set_read_timeout(Some(remaining))
            .map_err(RecvError::Io)?;

        match self.stream.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                Err(RecvError::Elapsed)
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(RecvError::Disconnected),
            Err(e) => Err(RecvError::Io(e)),
        }
    }
}
