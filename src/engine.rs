//! The ingestion loop that turns datagrams into ordered frames.
//!
//! [`ReassemblyEngine`] is the sole owner of the
//! [`FragmentCache`](crate::fragment::FragmentCache) and of the delivery
//! cursor. After every datagram it drains the cache: while the frame at the
//! cursor is complete it is delivered and the cursor advances by one,
//! wrapping at `u32::MAX`. A later frame that completes first waits until
//! every frame before it has been delivered.

use std::net::SocketAddr;

use bytes::Bytes;
use log::{debug, warn};

use crate::{
    config::DefragConfig,
    delivery::{Deliverer, Delivery, ReaderClosed, TransportError},
    fragment::{FragmentCache, FrameId},
    hooks::SharedHooks,
    metrics,
    source::PacketSource,
};

/// Why [`ReassemblyEngine::run`] returned.
#[derive(Clone, Debug)]
pub enum EngineStop {
    /// The packet source failed; the error was offered to the reader.
    SourceFailed(TransportError),
    /// The reader was dropped, so no frame can be delivered.
    ReaderClosed,
}

/// Drives a [`PacketSource`] and feeds completed frames to a
/// [`Reader`](crate::Reader).
///
/// Build one with [`DefragBuilder::build`](crate::DefragBuilder::build) and
/// poll [`ReassemblyEngine::run`] on any executor, or let
/// [`DefragBuilder::spawn`](crate::DefragBuilder::spawn) do it on Tokio.
#[derive(Debug)]
pub struct ReassemblyEngine<S> {
    source: S,
    cache: FragmentCache,
    cursor: FrameId,
    deliverer: Deliverer,
    hooks: SharedHooks,
    buffer: Vec<u8>,
}

impl<S: PacketSource> ReassemblyEngine<S> {
    pub(crate) fn new(
        source: S,
        config: &DefragConfig,
        deliverer: Deliverer,
        hooks: SharedHooks,
    ) -> Self {
        Self {
            source,
            cache: FragmentCache::new(),
            cursor: config.first_frame_id,
            deliverer,
            hooks,
            buffer: vec![0; config.max_datagram_size.get()],
        }
    }

    /// Identifier of the next frame to be delivered.
    #[must_use]
    pub const fn cursor(&self) -> FrameId { self.cursor }

    /// Run until the source fails or the reader is dropped.
    ///
    /// Per-datagram errors are logged and reported to the hooks; they never
    /// stop the loop. The source is not called again after it fails.
    pub async fn run(mut self) -> EngineStop {
        debug!("reassembly engine started: cursor={}", self.cursor);
        loop {
            let received = self.source.recv_from(&mut self.buffer).await;
            if let Ok((len, peer)) = received {
                self.ingest(len, peer);
            }

            if self.drain().await.is_err() {
                debug!("reader dropped; stopping reassembly engine");
                return EngineStop::ReaderClosed;
            }

            if let Err(error) = received {
                return self.terminate(error.into()).await;
            }
        }
    }

    fn ingest(&mut self, len: usize, peer: SocketAddr) {
        if len == 0 {
            return;
        }
        metrics::inc_datagrams();
        let datagram = Bytes::copy_from_slice(&self.buffer[..len]);
        if let Err(error) = self.cache.insert(datagram) {
            warn!("discarding datagram: peer={peer}, len={len}, error={error}");
            metrics::inc_rejected(error.kind());
            self.hooks.get().on_datagram_error(&error, peer);
        }
    }

    /// Deliver consecutive complete frames starting at the cursor.
    async fn drain(&mut self) -> Result<(), ReaderClosed> {
        while let Some(frame) = self.cache.take_if_complete(self.cursor) {
            let (frame_id, len) = (frame.frame_id(), frame.len());
            self.deliverer.deliver(Delivery::Frame(frame)).await?;
            self.cursor = self.cursor.next();
            tracing::debug!(frame_id = frame_id.get(), len, "frame delivered");
            metrics::inc_delivered();
            self.hooks.get().on_frame_delivered(frame_id, len);
        }
        metrics::set_pending(self.cache.len());
        Ok(())
    }

    async fn terminate(self, error: TransportError) -> EngineStop {
        tracing::info!(
            error = %error,
            pending = self.cache.len(),
            "packet source stopped; terminating reassembly engine"
        );
        self.hooks.get().on_terminated(&error);
        let Self { mut deliverer, .. } = self;
        if deliverer
            .deliver(Delivery::Terminated(error.clone()))
            .await
            .is_err()
        {
            debug!("reader dropped before terminal error was delivered");
        }
        EngineStop::SourceFailed(error)
    }
}
