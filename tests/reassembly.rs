//! End-to-end tests for frame ordering, validation, and termination.

use std::{
    io,
    sync::{Arc, Mutex},
    time::Duration,
};

use bytes::Bytes;
use defrag::{
    DatagramError,
    DefragBuilder,
    EngineStop,
    FrameId,
    ProtocolViolation,
    ReadError,
    ReassemblyHooks,
    TransportError,
};
use defrag_testing::{ChannelSource, ScriptedSource, Step, datagram, fragment_frame};
use rstest::rstest;
use tokio::time::{sleep, timeout};

const READ_TIMEOUT: Duration = Duration::from_secs(5);

async fn read_frame(reader: &mut defrag::Reader) -> Result<Vec<u8>, ReadError> {
    let mut buf = vec![0_u8; 4_096];
    let len = timeout(READ_TIMEOUT, reader.read(&mut buf))
        .await
        .expect("read should not hang")?;
    buf.truncate(len);
    Ok(buf)
}

async fn read_frame_ids(reader: &mut defrag::Reader) -> Vec<u32> {
    let mut ids = Vec::new();
    loop {
        match timeout(READ_TIMEOUT, reader.next_frame())
            .await
            .expect("read should not hang")
        {
            Ok(frame) => ids.push(frame.frame_id().get()),
            Err(ReadError::Transport(_)) => return ids,
            Err(other) => panic!("unexpected read error: {other}"),
        }
    }
}

#[tokio::test]
async fn out_of_order_fragments_read_as_one_frame() {
    let source = ScriptedSource::new([datagram(0, 2, 1, b"B"), datagram(0, 2, 0, b"A")]);
    let mut reader = defrag::defrag(source);

    assert_eq!(read_frame(&mut reader).await.expect("frame"), b"AB");

    let err = read_frame(&mut reader)
        .await
        .expect_err("source exhaustion must surface");
    match err {
        ReadError::Transport(error) => assert_eq!(error.kind(), io::ErrorKind::UnexpectedEof),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn later_frame_waits_for_earlier_one() {
    let mut steps = Vec::new();
    steps.extend(fragment_frame(2, b"third", 2));
    steps.extend(fragment_frame(1, b"second", 2));
    steps.push(datagram(0, 2, 1, b"st"));
    steps.push(datagram(0, 2, 0, b"fir"));
    let mut reader = defrag::defrag(ScriptedSource::new(steps));

    assert_eq!(read_frame(&mut reader).await.expect("frame 0"), b"first");
    assert_eq!(read_frame(&mut reader).await.expect("frame 1"), b"second");
    assert_eq!(read_frame(&mut reader).await.expect("frame 2"), b"third");
    assert!(read_frame(&mut reader).await.is_err());
}

#[tokio::test]
async fn frame_ids_wrap_around() {
    let source = ScriptedSource::new([datagram(0, 1, 0, b"after"), datagram(u32::MAX, 1, 0, b"before")]);
    let mut reader = DefragBuilder::new()
        .first_frame_id(FrameId::new(u32::MAX))
        .spawn(source);

    let first = reader.next_frame().await.expect("frame");
    assert_eq!(first.frame_id(), FrameId::new(u32::MAX));
    assert_eq!(first.into_bytes().as_ref(), b"before");

    let second = reader.next_frame().await.expect("frame");
    assert_eq!(second.frame_id(), FrameId::new(0));
    assert_eq!(second.into_bytes().as_ref(), b"after");
}

#[tokio::test]
async fn frame_beyond_gap_is_never_delivered() {
    let source = ScriptedSource::new([datagram(1, 1, 0, b"orphan")]);
    let mut reader = defrag::defrag(source);
    assert!(read_frame_ids(&mut reader).await.is_empty());
}

#[rstest]
#[case::index_out_of_range(datagram(0, 2, 2, b"x"))]
#[case::malformed_header(Bytes::from_static(&[0, 0, 0]))]
#[case::count_mismatch(datagram(0, 3, 1, b"x"))]
#[tokio::test]
async fn bad_datagram_leaves_other_fragments_intact(#[case] bad: Bytes) {
    let source = ScriptedSource::new([datagram(0, 2, 0, b"ok"), bad, datagram(0, 2, 1, b"!")]);
    let mut reader = defrag::defrag(source);
    assert_eq!(read_frame(&mut reader).await.expect("frame"), b"ok!");
}

#[tokio::test]
async fn duplicate_fragments_deliver_frame_once() {
    let source = ScriptedSource::new([
        datagram(0, 2, 0, b"a"),
        datagram(0, 2, 0, b"a"),
        datagram(0, 2, 1, b"b"),
        datagram(0, 2, 1, b"b"),
        datagram(0, 2, 0, b"a"),
        datagram(1, 1, 0, b"c"),
    ]);
    let mut reader = defrag::defrag(source);
    assert_eq!(read_frame_ids(&mut reader).await, vec![0, 1]);
}

#[tokio::test]
async fn terminal_error_repeats_without_polling_source() {
    let source = ScriptedSource::new([datagram(0, 1, 0, b"only")])
        .then_fail(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
    let probe = source.probe();
    let mut reader = defrag::defrag(source);

    assert_eq!(read_frame(&mut reader).await.expect("frame"), b"only");

    for _ in 0..3 {
        match read_frame(&mut reader).await {
            Err(ReadError::Transport(error)) => {
                assert_eq!(error.kind(), io::ErrorKind::ConnectionReset);
                assert_eq!(error.to_string(), "transport error: reset");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
        assert!(reader.is_terminated());
    }
    assert_eq!(probe.calls(), 2);
}

#[tokio::test]
async fn undersized_buffer_keeps_frame_for_next_read() {
    let source = ScriptedSource::new([datagram(0, 1, 0, b"twelve bytes")]);
    let mut reader = defrag::defrag(source);

    let mut small = [0_u8; 4];
    match reader.read(&mut small).await {
        Err(ReadError::BufferTooSmall { required, available }) => {
            assert_eq!((required, available), (12, 4));
        }
        other => panic!("expected BufferTooSmall, got {other:?}"),
    }
    assert!(!reader.is_terminated());

    assert_eq!(read_frame(&mut reader).await.expect("frame"), b"twelve bytes");
}

#[tokio::test]
async fn engine_stays_one_frame_ahead_at_most() {
    let (tx, source) = ChannelSource::channel();
    let probe = source.probe();
    let mut reader = defrag::defrag(source);

    for id in 0..3 {
        tx.send(Step::Datagram(datagram(id, 1, 0, b"f")))
            .expect("engine alive");
    }
    sleep(Duration::from_millis(50)).await;
    assert_eq!(probe.calls(), 1, "engine must wait for a reader");

    assert_eq!(read_frame(&mut reader).await.expect("frame"), b"f");
    sleep(Duration::from_millis(50)).await;
    assert_eq!(probe.calls(), 2);

    drop(tx);
    assert_eq!(read_frame_ids(&mut reader).await, vec![1, 2]);
}

#[tokio::test]
async fn engine_stops_when_reader_is_dropped() {
    let source = ScriptedSource::new([datagram(0, 1, 0, b"unread")]);
    let (reader, engine) = DefragBuilder::new().build(source);
    drop(reader);

    let stop = timeout(READ_TIMEOUT, engine.run())
        .await
        .expect("engine should stop");
    assert!(matches!(stop, EngineStop::ReaderClosed));
}

#[tokio::test]
async fn engine_reports_source_failure() {
    let (mut reader, engine) = DefragBuilder::new().build(ScriptedSource::new(Vec::<Bytes>::new()));
    let engine = tokio::spawn(engine.run());

    assert!(matches!(
        read_frame(&mut reader).await,
        Err(ReadError::Transport(_))
    ));
    match engine.await.expect("engine task") {
        EngineStop::SourceFailed(error) => assert_eq!(error.kind(), io::ErrorKind::UnexpectedEof),
        EngineStop::ReaderClosed => panic!("reader was still alive"),
    }
}

#[tokio::test]
async fn dropped_engine_stops_reader() {
    let (mut reader, engine) = DefragBuilder::new().build(ScriptedSource::new(Vec::<Bytes>::new()));
    drop(engine);

    assert!(matches!(
        read_frame(&mut reader).await,
        Err(ReadError::EngineStopped)
    ));
    assert!(matches!(
        read_frame(&mut reader).await,
        Err(ReadError::EngineStopped)
    ));
}

#[derive(Default)]
struct Recorder {
    rejected: Mutex<Vec<DatagramError>>,
    delivered: Mutex<Vec<(FrameId, usize)>>,
    terminated: Mutex<Option<io::ErrorKind>>,
}

impl ReassemblyHooks for Recorder {
    fn on_datagram_error(&self, error: &DatagramError, _peer: std::net::SocketAddr) {
        self.rejected.lock().expect("lock").push(*error);
    }

    fn on_frame_delivered(&self, frame_id: FrameId, len: usize) {
        self.delivered.lock().expect("lock").push((frame_id, len));
    }

    fn on_terminated(&self, error: &TransportError) {
        *self.terminated.lock().expect("lock") = Some(error.kind());
    }
}

#[tokio::test]
async fn hooks_observe_rejections_deliveries_and_termination() {
    let hooks = Arc::new(Recorder::default());
    let source = ScriptedSource::new([
        Bytes::from_static(b"short"),
        datagram(0, 1, 4, b"x"),
        datagram(0, 1, 0, b"abc"),
    ]);
    let mut reader = DefragBuilder::new().hooks(hooks.clone()).spawn(source);

    assert_eq!(read_frame_ids(&mut reader).await, vec![0]);

    assert_eq!(
        *hooks.rejected.lock().expect("lock"),
        vec![
            DatagramError::MalformedHeader { len: 5 },
            DatagramError::Protocol(ProtocolViolation::IndexOutOfRange {
                frame_id: FrameId::new(0),
                index: 4,
                count: 1,
            }),
        ]
    );
    assert_eq!(
        *hooks.delivered.lock().expect("lock"),
        vec![(FrameId::new(0), 3)]
    );
    assert_eq!(
        *hooks.terminated.lock().expect("lock"),
        Some(io::ErrorKind::UnexpectedEof)
    );
}
