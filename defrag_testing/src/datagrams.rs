//! Builders for wire datagrams.

use std::num::NonZeroU16;

use bytes::{BufMut, Bytes, BytesMut};
use defrag::{FragmentHeader, Fragmenter, FrameId, HEADER_SIZE};

/// Encode one fragment whose declared length matches `payload`.
///
/// # Panics
///
/// Panics if `payload` is longer than `u16::MAX` bytes.
#[must_use]
pub fn datagram(frame_id: u32, count: u16, index: u16, payload: &[u8]) -> Bytes {
    let len = u16::try_from(payload.len()).expect("payload must fit in u16");
    raw_datagram(FragmentHeader::new(FrameId::new(frame_id), count, index, len), payload)
}

/// Encode `header` followed by `payload` verbatim, without checking that the
/// declared length matches.
#[must_use]
pub fn raw_datagram(header: FragmentHeader, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    header.put(&mut buf);
    buf.put_slice(payload);
    buf.freeze()
}

/// Split `payload` into datagrams of at most `max_payload` bytes for
/// `frame_id`, in fragment-index order.
///
/// # Panics
///
/// Panics if `max_payload` is zero or the payload needs more than
/// `u16::MAX` fragments.
#[must_use]
pub fn fragment_frame(frame_id: u32, payload: &[u8], max_payload: u16) -> Vec<Bytes> {
    Fragmenter::new(NonZeroU16::new(max_payload).expect("max_payload must be non-zero"))
        .fragment_with_id(FrameId::new(frame_id), payload)
        .expect("payload must fit in u16::MAX fragments")
        .into_datagrams()
}
