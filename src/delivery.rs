//! Single-slot rendezvous between the engine and the [`Reader`](crate::Reader).
//!
//! The reader asks for an item by sending a one-shot reply slot; the engine's
//! [`Deliverer::deliver`] waits for such a request and fills it. Neither side
//! can run ahead: the engine holds at most one completed frame that nobody
//! has asked for yet.

use std::{io, sync::Arc};

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::fragment::CompletedFrame;

/// Failure of the packet source, shared between the engine and the reader.
///
/// Cloning is cheap; every read after termination returns the same error.
#[derive(Clone, Debug, Error)]
#[error("transport error: {0}")]
pub struct TransportError(#[source] Arc<io::Error>);

impl TransportError {
    /// The [`io::ErrorKind`] reported by the source.
    #[must_use]
    pub fn kind(&self) -> io::ErrorKind { self.0.kind() }

    /// Borrow the underlying I/O error.
    #[must_use]
    pub fn get_ref(&self) -> &io::Error { &self.0 }
}

impl From<io::Error> for TransportError {
    fn from(error: io::Error) -> Self { Self(Arc::new(error)) }
}

/// Item handed from the engine to the reader.
#[derive(Debug)]
pub(crate) enum Delivery {
    Frame(CompletedFrame),
    Terminated(TransportError),
}

/// The reader went away; nothing can be delivered any more.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("reader closed")]
pub(crate) struct ReaderClosed;

type Request = oneshot::Sender<Delivery>;

/// Create the producer and consumer halves of a rendezvous.
pub(crate) fn rendezvous() -> (Deliverer, Requester) {
    let (tx, rx) = mpsc::channel(1);
    (Deliverer { requests: rx }, Requester { requests: tx })
}

/// Engine half: fulfils read requests.
#[derive(Debug)]
pub(crate) struct Deliverer {
    requests: mpsc::Receiver<Request>,
}

impl Deliverer {
    /// Wait for a read request and hand `item` over.
    ///
    /// A request whose reader stopped waiting is skipped and `item` goes to
    /// the next one.
    pub(crate) async fn deliver(&mut self, mut item: Delivery) -> Result<(), ReaderClosed> {
        loop {
            let reply = self.requests.recv().await.ok_or(ReaderClosed)?;
            match reply.send(item) {
                Ok(()) => return Ok(()),
                Err(returned) => item = returned,
            }
        }
    }
}

/// Reader half: asks for the next item.
#[derive(Debug)]
pub(crate) struct Requester {
    requests: mpsc::Sender<Request>,
}

impl Requester {
    /// Ask the engine for one item. `None` means the engine is gone.
    pub(crate) async fn request(&self) -> Option<Delivery> {
        let (tx, rx) = oneshot::channel();
        self.requests.send(tx).await.ok()?;
        rx.await.ok()
    }

    /// Blocking flavour of [`Requester::request`].
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context.
    pub(crate) fn blocking_request(&self) -> Option<Delivery> {
        let (tx, rx) = oneshot::channel();
        self.requests.blocking_send(tx).ok()?;
        rx.blocking_recv().ok()
    }
}
