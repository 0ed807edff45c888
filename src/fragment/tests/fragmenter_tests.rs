//! Tests for the outbound fragmenter.

use std::num::NonZeroU16;

use rstest::rstest;

use crate::fragment::{
    FragmentCache,
    FragmentHeader,
    FragmentStatus,
    FragmentationError,
    Fragmenter,
    FrameId,
    HEADER_SIZE,
};

fn fragmenter(max_payload: u16) -> Fragmenter {
    Fragmenter::new(NonZeroU16::new(max_payload).expect("non-zero"))
}

#[rstest]
#[case::empty(0, 4, 1)]
#[case::exact_fit(8, 4, 2)]
#[case::remainder(9, 4, 3)]
#[case::single(3, 4, 1)]
fn splits_into_expected_fragment_count(
    #[case] len: usize,
    #[case] max_payload: u16,
    #[case] expected: usize,
) {
    let fragmenter = fragmenter(max_payload);
    let batch = fragmenter
        .fragment(vec![7_u8; len])
        .expect("fragmentation succeeds");
    assert_eq!(batch.len(), expected);

    for (index, datagram) in batch.datagrams().iter().enumerate() {
        let header = FragmentHeader::decode(datagram).expect("header decodes");
        assert_eq!(usize::from(header.fragment_count()), expected);
        assert_eq!(usize::from(header.fragment_index()), index);
        assert_eq!(
            datagram.len(),
            HEADER_SIZE + usize::from(header.payload_len())
        );
        assert!(datagram.len() <= fragmenter.max_datagram_size());
    }
}

#[test]
fn assigns_sequential_frame_ids() {
    let fragmenter = fragmenter(16);
    let first = fragmenter.fragment(b"one").expect("fragment");
    let second = fragmenter.fragment(b"two").expect("fragment");
    assert_eq!(first.frame_id(), FrameId::new(0));
    assert_eq!(second.frame_id(), FrameId::new(1));
}

#[test]
fn frame_ids_wrap_at_u32_max() {
    let fragmenter = Fragmenter::with_starting_id(
        NonZeroU16::new(16).expect("non-zero"),
        FrameId::new(u32::MAX),
    );
    assert_eq!(fragmenter.next_frame_id(), FrameId::new(u32::MAX));
    assert_eq!(fragmenter.next_frame_id(), FrameId::new(0));
}

#[test]
fn rejects_payload_needing_too_many_fragments() {
    let fragmenter = fragmenter(1);
    let payload = vec![0_u8; usize::from(u16::MAX) + 1];
    assert_eq!(
        fragmenter.fragment(&payload),
        Err(FragmentationError::TooManyFragments {
            len: payload.len(),
            max: u16::MAX,
        })
    );
    assert_eq!(fragmenter.next_frame_id(), FrameId::new(0));
}

#[test]
fn fragments_reassemble_through_cache() {
    let payload: Vec<u8> = (0..=255).collect();
    let batch = fragmenter(10)
        .fragment_with_id(FrameId::new(77), &payload)
        .expect("fragment");

    let mut cache = FragmentCache::new();
    let mut statuses = Vec::new();
    for datagram in batch.into_iter().rev() {
        statuses.push(cache.insert(datagram).expect("accepted"));
    }
    assert_eq!(statuses.last(), Some(&FragmentStatus::Complete));

    let frame = cache
        .take_if_complete(FrameId::new(77))
        .expect("frame complete");
    assert_eq!(frame.into_bytes().as_ref(), payload.as_slice());
}
