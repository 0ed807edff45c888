//! Engine configuration and the builder that wires an engine to its reader.

use std::num::NonZeroUsize;

use crate::{
    delivery::rendezvous,
    engine::{EngineStop, ReassemblyEngine},
    fragment::{FrameId, HEADER_SIZE},
    hooks::{ReassemblyHooks, SharedHooks},
    reader::Reader,
    source::PacketSource,
};

/// Largest datagram a well-formed sender can produce: a header plus a
/// payload of `u16::MAX` bytes.
pub const MAX_WIRE_DATAGRAM: usize = HEADER_SIZE + u16::MAX as usize;

/// Settings for a [`ReassemblyEngine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DefragConfig {
    /// Size of the receive buffer. Datagrams longer than this are truncated
    /// by the transport and then rejected as truncated payloads.
    pub max_datagram_size: NonZeroUsize,
    /// Identifier of the first frame to deliver.
    pub first_frame_id: FrameId,
}

impl Default for DefragConfig {
    fn default() -> Self {
        Self {
            max_datagram_size: NonZeroUsize::new(MAX_WIRE_DATAGRAM)
                .unwrap_or(NonZeroUsize::MIN),
            first_frame_id: FrameId::new(0),
        }
    }
}

/// Builder for a [`ReassemblyEngine`] and its paired [`Reader`].
///
/// # Examples
///
/// ```no_run
/// use std::num::NonZeroUsize;
///
/// use defrag::DefragBuilder;
/// use tokio::net::UdpSocket;
///
/// # async fn demo() -> std::io::Result<()> {
/// let socket = UdpSocket::bind("127.0.0.1:9000").await?;
/// let mut reader = DefragBuilder::new()
///     .max_datagram_size(NonZeroUsize::new(1_500).expect("non-zero"))
///     .spawn(socket);
/// let mut buf = vec![0_u8; 1 << 20];
/// let len = reader.read(&mut buf).await?;
/// println!("frame of {len} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct DefragBuilder {
    config: DefragConfig,
    hooks: SharedHooks,
}

impl DefragBuilder {
    /// Start from the default configuration and no-op hooks.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Set the receive buffer size.
    #[must_use]
    pub fn max_datagram_size(mut self, size: NonZeroUsize) -> Self {
        self.config.max_datagram_size = size;
        self
    }

    /// Set the identifier of the first frame to deliver.
    #[must_use]
    pub fn first_frame_id(mut self, frame_id: FrameId) -> Self {
        self.config.first_frame_id = frame_id;
        self
    }

    /// Install observability hooks.
    #[must_use]
    pub fn hooks(mut self, hooks: impl ReassemblyHooks) -> Self {
        self.hooks = SharedHooks::new(hooks);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: DefragConfig) -> Self {
        self.config = config;
        self
    }

    /// Build an engine over `source` and the reader it delivers to.
    ///
    /// Nothing happens until [`ReassemblyEngine::run`] is polled.
    #[must_use]
    pub fn build<S: PacketSource>(self, source: S) -> (Reader, ReassemblyEngine<S>) {
        let (deliverer, requester) = rendezvous();
        let engine = ReassemblyEngine::new(source, &self.config, deliverer, self.hooks);
        (Reader::new(requester), engine)
    }

    /// Build an engine over `source`, spawn it on the current Tokio runtime,
    /// and return its reader.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn spawn<S: PacketSource>(self, source: S) -> Reader {
        let (reader, engine) = self.build(source);
        tokio::spawn(async move {
            match engine.run().await {
                EngineStop::SourceFailed(error) => {
                    log::debug!("reassembly engine finished: {error}");
                }
                EngineStop::ReaderClosed => log::debug!("reassembly engine finished: reader closed"),
            }
        });
        reader
    }
}
