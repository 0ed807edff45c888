//! Wire format and reassembly state for fragmented frames.
//!
//! This module collects the domain types of the reassembly layer: the fixed
//! header every datagram starts with, the cache that gathers fragments per
//! frame, and the outbound [`Fragmenter`] used by senders and tests. None of
//! it performs I/O; the [`engine`](crate::engine) drives it.

pub mod cache;
pub mod error;
pub mod fragmenter;
pub mod header;
pub mod id;
mod partial;

pub use cache::FragmentCache;
pub use error::{DatagramError, FragmentStatus, FragmentationError, ProtocolViolation};
pub use fragmenter::{FragmentBatch, Fragmenter};
pub use header::{FragmentHeader, HEADER_SIZE};
pub use id::FrameId;
pub use partial::CompletedFrame;
