//! Outbound helper that splits frames into wire-ready datagrams.
//!
//! [`Fragmenter`] is the sending counterpart of the
//! [`FragmentCache`](crate::fragment::FragmentCache). It hands out sequential
//! [`FrameId`] values starting at zero, wrapping at `u32::MAX`, which is the
//! order the reassembly engine delivers in.

use std::{
    num::NonZeroU16,
    sync::atomic::{AtomicU32, Ordering},
};

use bytes::{BufMut, Bytes, BytesMut};

use super::{FragmentHeader, FragmentationError, FrameId, HEADER_SIZE};

/// Splits frames into datagrams carrying at most `max_payload` bytes each.
#[derive(Debug)]
pub struct Fragmenter {
    max_payload: NonZeroU16,
    next_frame_id: AtomicU32,
}

impl Fragmenter {
    /// Create a fragmenter whose first frame uses identifier zero.
    #[must_use]
    pub const fn new(max_payload: NonZeroU16) -> Self {
        Self::with_starting_id(max_payload, FrameId::new(0))
    }

    /// Create a fragmenter starting from a specific [`FrameId`].
    #[must_use]
    pub const fn with_starting_id(max_payload: NonZeroU16, start_at: FrameId) -> Self {
        Self {
            max_payload,
            next_frame_id: AtomicU32::new(start_at.get()),
        }
    }

    /// Maximum payload bytes carried by one datagram.
    #[must_use]
    pub const fn max_payload(&self) -> NonZeroU16 { self.max_payload }

    /// Largest datagram this fragmenter produces.
    #[must_use]
    pub fn max_datagram_size(&self) -> usize { HEADER_SIZE + usize::from(self.max_payload.get()) }

    /// Reserve and return the next [`FrameId`], wrapping at `u32::MAX`.
    #[must_use]
    pub fn next_frame_id(&self) -> FrameId {
        FrameId::new(self.next_frame_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Split `payload` into datagrams under a freshly reserved identifier.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentationError::TooManyFragments`] when the payload needs
    /// more than `u16::MAX` fragments. The identifier is not consumed in that
    /// case.
    pub fn fragment(&self, payload: impl AsRef<[u8]>) -> Result<FragmentBatch, FragmentationError> {
        let payload = payload.as_ref();
        let count = self.fragment_count(payload.len())?;
        let frame_id = self.next_frame_id();
        Ok(self.build(frame_id, count, payload))
    }

    /// Split `payload` into datagrams tagged with `frame_id`.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentationError::TooManyFragments`] when the payload needs
    /// more than `u16::MAX` fragments.
    pub fn fragment_with_id(
        &self,
        frame_id: FrameId,
        payload: impl AsRef<[u8]>,
    ) -> Result<FragmentBatch, FragmentationError> {
        let payload = payload.as_ref();
        let count = self.fragment_count(payload.len())?;
        Ok(self.build(frame_id, count, payload))
    }

    /// An empty payload still occupies one (empty) fragment.
    fn fragment_count(&self, len: usize) -> Result<u16, FragmentationError> {
        let chunks = len.div_ceil(usize::from(self.max_payload.get())).max(1);
        u16::try_from(chunks).map_err(|_| FragmentationError::TooManyFragments {
            len,
            max: u16::MAX,
        })
    }

    fn build(&self, frame_id: FrameId, count: u16, payload: &[u8]) -> FragmentBatch {
        let datagrams = if payload.is_empty() {
            vec![encode_datagram(frame_id, count, 0, payload)]
        } else {
            payload
                .chunks(usize::from(self.max_payload.get()))
                .zip(0..count)
                .map(|(chunk, index)| encode_datagram(frame_id, count, index, chunk))
                .collect()
        };

        FragmentBatch {
            frame_id,
            datagrams,
        }
    }
}

fn encode_datagram(frame_id: FrameId, count: u16, index: u16, chunk: &[u8]) -> Bytes {
    // Chunks never exceed `max_payload`, itself a u16.
    let len = u16::try_from(chunk.len()).unwrap_or(u16::MAX);
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + chunk.len());
    FragmentHeader::new(frame_id, count, index, len).put(&mut buf);
    buf.put_slice(chunk);
    buf.freeze()
}

/// Datagrams produced for one frame, in fragment-index order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentBatch {
    frame_id: FrameId,
    datagrams: Vec<Bytes>,
}

impl FragmentBatch {
    /// Identifier shared by every datagram in the batch.
    #[must_use]
    pub const fn frame_id(&self) -> FrameId { self.frame_id }

    /// Number of datagrams in the batch.
    #[must_use]
    pub fn len(&self) -> usize { self.datagrams.len() }

    /// Whether the batch holds no datagrams. Never true for batches built by
    /// a [`Fragmenter`].
    #[must_use]
    pub fn is_empty(&self) -> bool { self.datagrams.is_empty() }

    /// Borrow the encoded datagrams.
    #[must_use]
    pub fn datagrams(&self) -> &[Bytes] { &self.datagrams }

    /// Consume the batch, returning the encoded datagrams.
    #[must_use]
    pub fn into_datagrams(self) -> Vec<Bytes> { self.datagrams }
}

impl IntoIterator for FragmentBatch {
    type Item = Bytes;
    type IntoIter = std::vec::IntoIter<Bytes>;

    fn into_iter(self) -> Self::IntoIter { self.datagrams.into_iter() }
}
