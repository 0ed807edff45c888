//! Observability callbacks invoked by the reassembly engine.
//!
//! Rejected datagrams never reach the frame reader. [`ReassemblyHooks`] is
//! where applications observe them, alongside the engine's own log output
//! and metrics.

use std::{fmt, net::SocketAddr, sync::Arc};

use crate::{
    delivery::TransportError,
    fragment::{DatagramError, FrameId},
};

/// Callbacks run on the engine task.
///
/// Every method has a no-op default, so implementations override only what
/// they need. Callbacks run inline in the ingestion loop and should return
/// quickly.
///
/// ```
/// use std::{
///     net::SocketAddr,
///     sync::{
///         Arc,
///         atomic::{AtomicUsize, Ordering},
///     },
/// };
///
/// use defrag::{ReassemblyHooks, fragment::DatagramError};
///
/// #[derive(Default)]
/// struct CountRejects(AtomicUsize);
///
/// impl ReassemblyHooks for CountRejects {
///     fn on_datagram_error(&self, _error: &DatagramError, _peer: SocketAddr) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
///
/// let hooks = Arc::new(CountRejects::default());
/// let _builder = defrag::DefragBuilder::new().hooks(hooks.clone());
/// ```
pub trait ReassemblyHooks: Send + Sync + 'static {
    /// Called when a datagram is discarded because it failed validation.
    fn on_datagram_error(&self, _error: &DatagramError, _peer: SocketAddr) {}

    /// Called after a frame has been handed to the reader.
    fn on_frame_delivered(&self, _frame_id: FrameId, _len: usize) {}

    /// Called once when the packet source fails and the engine stops.
    fn on_terminated(&self, _error: &TransportError) {}
}

/// Hooks that do nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHooks;

impl ReassemblyHooks for NoopHooks {}

impl<H: ReassemblyHooks + ?Sized> ReassemblyHooks for Arc<H> {
    fn on_datagram_error(&self, error: &DatagramError, peer: SocketAddr) {
        (**self).on_datagram_error(error, peer);
    }

    fn on_frame_delivered(&self, frame_id: FrameId, len: usize) {
        (**self).on_frame_delivered(frame_id, len);
    }

    fn on_terminated(&self, error: &TransportError) { (**self).on_terminated(error); }
}

/// Type-erased hooks stored by the engine.
#[derive(Clone)]
pub(crate) struct SharedHooks(Arc<dyn ReassemblyHooks>);

impl SharedHooks {
    pub(crate) fn new(hooks: impl ReassemblyHooks) -> Self { Self(Arc::new(hooks)) }

    pub(crate) fn get(&self) -> &dyn ReassemblyHooks { self.0.as_ref() }
}

impl Default for SharedHooks {
    fn default() -> Self { Self::new(NoopHooks) }
}

impl fmt::Debug for SharedHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("SharedHooks") }
}
