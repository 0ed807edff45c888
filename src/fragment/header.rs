//! Fixed-width header carried at the start of every datagram.
//!
//! The layout is ten bytes in network byte order:
//! `[frame_id: u32][fragment_count: u16][fragment_index: u16][payload_len: u16]`.
//! Only structural decoding happens here; range and length checks belong to
//! the [`FragmentCache`](crate::fragment::FragmentCache).

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::{DatagramError, FrameId};

/// Size of an encoded [`FragmentHeader`] in bytes.
pub const HEADER_SIZE: usize = 10;

/// Header describing a single fragment.
///
/// # Examples
///
/// ```
/// use defrag::fragment::{FragmentHeader, FrameId, HEADER_SIZE};
/// let header = FragmentHeader::new(FrameId::new(7), 3, 1, 512);
/// let mut wire = [0_u8; HEADER_SIZE];
/// header.encode_into(&mut wire);
/// assert_eq!(FragmentHeader::decode(&wire), Ok(header));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FragmentHeader {
    frame_id: FrameId,
    fragment_count: u16,
    fragment_index: u16,
    payload_len: u16,
}

impl FragmentHeader {
    /// Create a new fragment header.
    #[must_use]
    pub const fn new(
        frame_id: FrameId,
        fragment_count: u16,
        fragment_index: u16,
        payload_len: u16,
    ) -> Self {
        Self {
            frame_id,
            fragment_count,
            fragment_index,
            payload_len,
        }
    }

    /// Return the logical frame identifier.
    #[must_use]
    pub const fn frame_id(&self) -> FrameId { self.frame_id }

    /// Total number of fragments making up the frame.
    #[must_use]
    pub const fn fragment_count(&self) -> u16 { self.fragment_count }

    /// Zero-based position of this fragment within the frame.
    #[must_use]
    pub const fn fragment_index(&self) -> u16 { self.fragment_index }

    /// Declared number of payload bytes following the header.
    #[must_use]
    pub const fn payload_len(&self) -> u16 { self.payload_len }

    /// Parse a header from the start of `bytes`.
    ///
    /// Trailing bytes after the header are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DatagramError::MalformedHeader`] if fewer than
    /// [`HEADER_SIZE`] bytes are available.
    pub fn decode(bytes: &[u8]) -> Result<Self, DatagramError> {
        if bytes.len() < HEADER_SIZE {
            return Err(DatagramError::MalformedHeader { len: bytes.len() });
        }
        let mut buf = bytes;
        Ok(Self {
            frame_id: FrameId::new(buf.get_u32()),
            fragment_count: buf.get_u16(),
            fragment_index: buf.get_u16(),
            payload_len: buf.get_u16(),
        })
    }

    /// Write the encoded header into the first [`HEADER_SIZE`] bytes of `buf`.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is shorter than [`HEADER_SIZE`]; callers size the
    /// buffer before encoding.
    pub fn encode_into(&self, buf: &mut [u8]) {
        let mut dst = &mut buf[..HEADER_SIZE];
        self.put(&mut dst);
    }

    /// Append the encoded header to a growable buffer.
    pub fn put(&self, dst: &mut impl BufMut) {
        dst.put_u32(self.frame_id.get());
        dst.put_u16(self.fragment_count);
        dst.put_u16(self.fragment_index);
        dst.put_u16(self.payload_len);
    }

    /// Encode the header into a freshly allocated buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE);
        self.put(&mut buf);
        buf.freeze()
    }
}
