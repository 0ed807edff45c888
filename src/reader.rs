//! Consumer-facing handle yielding reassembled frames in identifier order.

use std::io;

use bytes::{Buf, Bytes};
use thiserror::Error;

use crate::{
    delivery::{Delivery, Requester, TransportError},
    fragment::CompletedFrame,
};

/// Errors returned by [`Reader`].
#[derive(Clone, Debug, Error)]
pub enum ReadError {
    /// The packet source failed or ran dry. Returned by this read and every
    /// later one.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The caller's buffer cannot hold the next frame. The frame is kept and
    /// returned by the next read with a large enough buffer.
    #[error("buffer too small: frame needs {required} bytes but only {available} are available")]
    BufferTooSmall { required: usize, available: usize },
    /// The engine went away without reporting a transport error, for example
    /// because its task was dropped.
    #[error("reassembly engine stopped")]
    EngineStopped,
}

impl ReadError {
    /// Whether every later read will fail with this same error.
    #[must_use]
    pub const fn is_terminal(&self) -> bool { !matches!(self, Self::BufferTooSmall { .. }) }
}

impl From<ReadError> for io::Error {
    fn from(error: ReadError) -> Self {
        let kind = match &error {
            ReadError::Transport(transport) => transport.kind(),
            ReadError::BufferTooSmall { .. } => io::ErrorKind::InvalidInput,
            ReadError::EngineStopped => io::ErrorKind::BrokenPipe,
        };
        io::Error::new(kind, error)
    }
}

/// Reads reassembled frames from a running
/// [`ReassemblyEngine`](crate::ReassemblyEngine).
///
/// Each read rendezvous with the engine: the engine hands over at most one
/// frame per read and waits while nobody reads. Once a terminal error has
/// been returned, the reader remembers it and never contacts the engine
/// again. Reads take `&mut self`, so a reader serves one consumer at a time.
#[derive(Debug)]
pub struct Reader {
    requester: Requester,
    pending: Option<CompletedFrame>,
    terminal: Option<ReadError>,
    unread: Bytes,
}

impl Reader {
    pub(crate) fn new(requester: Requester) -> Self {
        Self {
            requester,
            pending: None,
            terminal: None,
            unread: Bytes::new(),
        }
    }

    /// Wait for the next frame.
    ///
    /// Dropping the returned future while a frame is being handed over may
    /// lose that frame.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Transport`] once the source has failed and
    /// [`ReadError::EngineStopped`] if the engine vanished.
    pub async fn next_frame(&mut self) -> Result<CompletedFrame, ReadError> {
        if let Some(ready) = self.ready()? {
            return Ok(ready);
        }
        let delivery = self.requester.request().await;
        self.accept(delivery)
    }

    /// Copy the next frame into `buf`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// As [`Reader::next_frame`], plus [`ReadError::BufferTooSmall`] when
    /// `buf` is shorter than the frame.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize, ReadError> {
        let frame = self.next_frame().await?;
        self.copy_out(frame, buf)
    }

    /// Blocking flavour of [`Reader::next_frame`] for synchronous threads.
    ///
    /// # Errors
    ///
    /// As [`Reader::next_frame`].
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context.
    pub fn blocking_next_frame(&mut self) -> Result<CompletedFrame, ReadError> {
        if let Some(ready) = self.ready()? {
            return Ok(ready);
        }
        let delivery = self.requester.blocking_request();
        self.accept(delivery)
    }

    /// Blocking flavour of [`Reader::read`] for synchronous threads.
    ///
    /// # Errors
    ///
    /// As [`Reader::read`].
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context.
    pub fn blocking_read(&mut self, buf: &mut [u8]) -> Result<usize, ReadError> {
        let frame = self.blocking_next_frame()?;
        self.copy_out(frame, buf)
    }

    /// Whether a terminal error has been observed.
    #[must_use]
    pub fn is_terminated(&self) -> bool { self.terminal.is_some() }

    /// A frame held back by [`ReadError::BufferTooSmall`], or the remembered
    /// terminal error.
    fn ready(&mut self) -> Result<Option<CompletedFrame>, ReadError> {
        if let Some(frame) = self.pending.take() {
            return Ok(Some(frame));
        }
        match &self.terminal {
            Some(error) => Err(error.clone()),
            None => Ok(None),
        }
    }

    fn accept(&mut self, delivery: Option<Delivery>) -> Result<CompletedFrame, ReadError> {
        let error = match delivery {
            Some(Delivery::Frame(frame)) => return Ok(frame),
            Some(Delivery::Terminated(error)) => ReadError::Transport(error),
            None => ReadError::EngineStopped,
        };
        self.terminal = Some(error.clone());
        Err(error)
    }

    fn copy_out(&mut self, frame: CompletedFrame, buf: &mut [u8]) -> Result<usize, ReadError> {
        if let Some(written) = frame.copy_to_slice(buf) {
            return Ok(written);
        }
        let required = frame.len();
        self.pending = Some(frame);
        Err(ReadError::BufferTooSmall {
            required,
            available: buf.len(),
        })
    }
}

/// Blocking byte-stream adapter.
///
/// Frames are concatenated into one stream: each call copies as many bytes
/// of the current frame as fit in `buf` and keeps the rest for the next
/// call. Empty frames contribute nothing and are skipped. A source ending
/// with [`io::ErrorKind::UnexpectedEof`] reads as end of stream (`Ok(0)`).
///
/// Bytes left over from a partially read frame are only returned through
/// this adapter, not by [`Reader::read`] or [`Reader::next_frame`].
///
/// Must not be called from within an asynchronous execution context.
impl io::Read for Reader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.unread.is_empty() {
            match self.blocking_next_frame() {
                Ok(frame) => self.unread = frame.into_bytes(),
                Err(ReadError::Transport(error)) if error.kind() == io::ErrorKind::UnexpectedEof => {
                    return Ok(0);
                }
                Err(error) => return Err(error.into()),
            }
        }
        let len = buf.len().min(self.unread.len());
        buf[..len].copy_from_slice(&self.unread[..len]);
        self.unread.advance(len);
        Ok(len)
    }
}
