//! Per-frame reassembly state and the completed frame it yields.

use bytes::{Bytes, BytesMut};

use super::{FragmentStatus, FrameId};

/// Slots for a frame whose fragments are still arriving.
#[derive(Debug)]
pub(crate) struct PartialFrame {
    frame_id: FrameId,
    fragment_count: u16,
    slots: Vec<Option<Bytes>>,
    missing: usize,
    total_size: usize,
}

impl PartialFrame {
    pub(crate) fn new(frame_id: FrameId, fragment_count: u16) -> Self {
        let count = usize::from(fragment_count);
        Self {
            frame_id,
            fragment_count,
            slots: vec![None; count],
            missing: count,
            total_size: 0,
        }
    }

    pub(crate) fn fragment_count(&self) -> u16 { self.fragment_count }

    pub(crate) fn missing(&self) -> usize { self.missing }

    #[cfg(test)]
    pub(crate) fn total_size(&self) -> usize { self.total_size }

    pub(crate) fn is_complete(&self) -> bool { self.missing == 0 }

    /// Store `payload` at `index`. The caller has checked the index bound.
    pub(crate) fn fill(&mut self, index: usize, payload: Bytes) -> FragmentStatus {
        let len = payload.len();
        match self.slots[index].replace(payload) {
            Some(previous) => {
                self.total_size = self.total_size - previous.len() + len;
                FragmentStatus::Duplicate
            }
            None => {
                self.missing -= 1;
                self.total_size += len;
                if self.is_complete() {
                    FragmentStatus::Complete
                } else {
                    FragmentStatus::Incomplete
                }
            }
        }
    }

    /// Convert into a [`CompletedFrame`], or `None` while slots are empty.
    pub(crate) fn into_completed(self) -> Option<CompletedFrame> {
        let spans = self.slots.into_iter().collect::<Option<Vec<_>>>()?;
        Some(CompletedFrame {
            frame_id: self.frame_id,
            spans,
            len: self.total_size,
        })
    }
}

/// A fully reassembled frame: its payload spans in fragment-index order.
///
/// Spans are zero-copy slices of the datagrams they arrived in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletedFrame {
    frame_id: FrameId,
    spans: Vec<Bytes>,
    len: usize,
}

impl CompletedFrame {
    /// Identifier shared by the fragments that formed this frame.
    #[must_use]
    pub const fn frame_id(&self) -> FrameId { self.frame_id }

    /// Total payload length across all spans.
    #[must_use]
    pub const fn len(&self) -> usize { self.len }

    /// Whether the frame carries no payload bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.len == 0 }

    /// Borrow the payload spans in fragment-index order.
    #[must_use]
    pub fn spans(&self) -> &[Bytes] { &self.spans }

    /// Copy the payload into the front of `buf`, returning the bytes written.
    ///
    /// Returns `None` without writing anything if `buf` is shorter than
    /// [`CompletedFrame::len`].
    #[must_use]
    pub fn copy_to_slice(&self, buf: &mut [u8]) -> Option<usize> {
        if buf.len() < self.len {
            return None;
        }
        let mut offset = 0;
        for span in &self.spans {
            buf[offset..offset + span.len()].copy_from_slice(span);
            offset += span.len();
        }
        Some(offset)
    }

    /// Join the spans into one contiguous buffer.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        if let [single] = self.spans.as_slice() {
            return single.clone();
        }
        let mut buf = BytesMut::with_capacity(self.len);
        for span in self.spans {
            buf.extend_from_slice(&span);
        }
        buf.freeze()
    }
}
