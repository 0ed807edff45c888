#![doc(html_root_url = "https://docs.rs/defrag/latest")]
//! Public API for the `defrag` library.
//!
//! This crate reassembles frames that a sender split across several
//! datagrams. Each datagram carries a ten-byte [`FragmentHeader`]; a
//! [`ReassemblyEngine`] collects fragments from a [`PacketSource`] and hands
//! complete frames to a [`Reader`] in frame-identifier order.
//!
//! ```no_run
//! use tokio::net::UdpSocket;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let socket = UdpSocket::bind("0.0.0.0:9000").await?;
//! let mut reader = defrag::defrag(socket);
//! let mut buf = vec![0_u8; 1 << 20];
//! loop {
//!     let len = reader.read(&mut buf).await?;
//!     println!("frame of {len} bytes");
//! }
//! # }
//! ```

pub mod config;
pub mod delivery;
pub mod engine;
pub mod fragment;
pub mod hooks;
pub mod metrics;
pub mod reader;
pub mod source;

pub use config::{DefragBuilder, DefragConfig, MAX_WIRE_DATAGRAM};
pub use delivery::TransportError;
pub use engine::{EngineStop, ReassemblyEngine};
pub use fragment::{
    CompletedFrame,
    DatagramError,
    FragmentCache,
    FragmentHeader,
    FragmentStatus,
    FragmentationError,
    Fragmenter,
    FrameId,
    HEADER_SIZE,
    ProtocolViolation,
};
pub use hooks::{NoopHooks, ReassemblyHooks};
pub use reader::{ReadError, Reader};
pub use source::PacketSource;

/// Spawn a reassembly engine over `source` on the current Tokio runtime and
/// return the reader for its frames.
///
/// Shorthand for `DefragBuilder::new().spawn(source)`.
///
/// # Panics
///
/// Panics if called outside a Tokio runtime.
#[must_use]
pub fn defrag<S: PacketSource>(source: S) -> Reader { DefragBuilder::new().spawn(source) }
