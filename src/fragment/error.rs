//! Error and status types emitted by the fragment layer.
//!
//! Per-datagram failures are local: the engine reports them and keeps
//! receiving. They never reach the frame consumer.

use thiserror::Error;

use super::FrameId;

/// Result of feeding a fragment into a [`FragmentCache`](crate::fragment::FragmentCache).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FragmentStatus {
    /// The frame still expects more fragments.
    Incomplete,
    /// The fragment filled the last empty slot of its frame.
    Complete,
    /// The slot was already filled; its bytes were replaced and the missing
    /// count left untouched.
    Duplicate,
}

/// Reasons a structurally valid header is refused.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// The fragment index lies outside the declared fragment count.
    #[error("fragment index {index} out of range for frame {frame_id} with {count} fragments")]
    IndexOutOfRange {
        frame_id: FrameId,
        index: u16,
        count: u16,
    },
    /// The datagram carries fewer payload bytes than the header declares.
    #[error("frame {frame_id} fragment declares {declared} payload bytes but {available} arrived")]
    TruncatedPayload {
        frame_id: FrameId,
        declared: u16,
        available: usize,
    },
    /// The fragment disagrees with earlier fragments on the fragment count.
    #[error("frame {frame_id} fragment declares {found} fragments, expected {expected}")]
    CountMismatch {
        frame_id: FrameId,
        expected: u16,
        found: u16,
    },
}

/// Errors produced while ingesting a single datagram.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DatagramError {
    /// The datagram is too short to hold a fragment header.
    #[error("malformed header: datagram of {len} bytes is shorter than the header")]
    MalformedHeader { len: usize },
    /// The header is readable but violates the fragment protocol.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),
}

impl DatagramError {
    /// Short, stable label used for metrics and log fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MalformedHeader { .. } => "malformed_header",
            Self::Protocol(ProtocolViolation::IndexOutOfRange { .. }) => "index_out_of_range",
            Self::Protocol(ProtocolViolation::TruncatedPayload { .. }) => "truncated_payload",
            Self::Protocol(ProtocolViolation::CountMismatch { .. }) => "count_mismatch",
        }
    }
}

/// Errors produced while fragmenting outbound frames.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FragmentationError {
    /// The payload needs more fragments than a `u16` count can describe.
    #[error("payload of {len} bytes needs more than {max} fragments")]
    TooManyFragments { len: usize, max: u16 },
}
