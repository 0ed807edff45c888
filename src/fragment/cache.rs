//! Inbound store that collects fragments until their frame is complete.
//!
//! [`FragmentCache`] keys partial frames by [`FrameId`]. Entries are created
//! on the first fragment seen for an identifier and removed exactly once, by
//! [`FragmentCache::take_if_complete`]. There is no eviction: a frame that
//! never completes stays buffered. A late duplicate of a frame that was
//! already taken starts a fresh entry; if that entry is complete it waits
//! until the cursor wraps back to its identifier and is delivered again.

use std::collections::{HashMap, hash_map::Entry};

use bytes::Bytes;

use super::{
    CompletedFrame,
    DatagramError,
    FragmentHeader,
    FragmentStatus,
    FrameId,
    HEADER_SIZE,
    ProtocolViolation,
    partial::PartialFrame,
};

/// Frame id → in-progress reassembly state.
#[derive(Debug, Default)]
pub struct FragmentCache {
    frames: HashMap<FrameId, PartialFrame>,
}

impl FragmentCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Ingest one datagram (header followed by payload).
    ///
    /// The payload span is a zero-copy slice of `datagram`, truncated to the
    /// declared payload length. A datagram that fails validation leaves every
    /// cached frame untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use defrag::fragment::{FragmentCache, FragmentHeader, FragmentStatus, FrameId};
    ///
    /// let mut cache = FragmentCache::new();
    /// let mut datagram = FragmentHeader::new(FrameId::new(0), 1, 0, 2).to_bytes().to_vec();
    /// datagram.extend_from_slice(b"hi");
    /// assert_eq!(cache.insert(datagram.into()), Ok(FragmentStatus::Complete));
    /// let frame = cache.take_if_complete(FrameId::new(0)).expect("complete");
    /// assert_eq!(frame.into_bytes().as_ref(), b"hi");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`DatagramError::MalformedHeader`] when the datagram cannot
    /// hold a header, and [`DatagramError::Protocol`] when the index is out of
    /// range, the payload is shorter than declared, or the fragment count
    /// disagrees with earlier fragments of the same frame.
    pub fn insert(&mut self, datagram: Bytes) -> Result<FragmentStatus, DatagramError> {
        let header = FragmentHeader::decode(&datagram)?;
        let frame_id = header.frame_id();

        if header.fragment_index() >= header.fragment_count() {
            return Err(ProtocolViolation::IndexOutOfRange {
                frame_id,
                index: header.fragment_index(),
                count: header.fragment_count(),
            }
            .into());
        }

        let end = HEADER_SIZE + usize::from(header.payload_len());
        if datagram.len() < end {
            return Err(ProtocolViolation::TruncatedPayload {
                frame_id,
                declared: header.payload_len(),
                available: datagram.len() - HEADER_SIZE,
            }
            .into());
        }

        let partial = match self.frames.entry(frame_id) {
            Entry::Occupied(occupied) => {
                let partial = occupied.into_mut();
                if partial.fragment_count() != header.fragment_count() {
                    return Err(ProtocolViolation::CountMismatch {
                        frame_id,
                        expected: partial.fragment_count(),
                        found: header.fragment_count(),
                    }
                    .into());
                }
                partial
            }
            Entry::Vacant(vacant) => {
                vacant.insert(PartialFrame::new(frame_id, header.fragment_count()))
            }
        };

        Ok(partial.fill(
            usize::from(header.fragment_index()),
            datagram.slice(HEADER_SIZE..end),
        ))
    }

    /// Remove and return the frame for `frame_id` if every fragment arrived.
    pub fn take_if_complete(&mut self, frame_id: FrameId) -> Option<CompletedFrame> {
        match self.frames.entry(frame_id) {
            Entry::Occupied(occupied) if occupied.get().is_complete() => {
                occupied.remove().into_completed()
            }
            _ => None,
        }
    }

    /// Whether a partial or complete frame is buffered for `frame_id`.
    #[must_use]
    pub fn contains(&self, frame_id: FrameId) -> bool { self.frames.contains_key(&frame_id) }

    /// Number of slots still empty for `frame_id`, if it is buffered.
    #[must_use]
    pub fn missing(&self, frame_id: FrameId) -> Option<usize> {
        self.frames.get(&frame_id).map(PartialFrame::missing)
    }

    /// Number of frames currently buffered.
    #[must_use]
    pub fn len(&self) -> usize { self.frames.len() }

    /// Whether no frames are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.frames.is_empty() }
}
