//! Rejected datagrams are reported through the `log` facade.

use defrag_testing::{LoggerHandle, ScriptedSource, datagram, logger};
use rstest::rstest;
use serial_test::serial;

#[rstest]
#[tokio::test]
#[serial]
async fn rejected_datagram_is_logged(mut logger: LoggerHandle) {
    let source = ScriptedSource::new([datagram(9, 2, 7, b"bad"), datagram(0, 1, 0, b"good")]);
    let mut reader = defrag::defrag(source);

    let frame = reader.next_frame().await.expect("frame");
    assert_eq!(frame.into_bytes().as_ref(), b"good");
    assert!(reader.next_frame().await.is_err());

    let warnings = logger.take_matching("discarding datagram");
    assert_eq!(warnings.len(), 1, "captured: {warnings:?}");
    assert!(
        warnings[0].contains("fragment index 7 out of range for frame 9 with 2 fragments"),
        "unexpected message: {}",
        warnings[0]
    );
}

#[rstest]
#[tokio::test]
#[serial]
async fn valid_traffic_logs_no_warnings(mut logger: LoggerHandle) {
    let source = ScriptedSource::new([datagram(0, 1, 0, b"clean")]);
    let mut reader = defrag::defrag(source);

    reader.next_frame().await.expect("frame");
    assert!(reader.next_frame().await.is_err());

    assert!(logger.take_matching("discarding datagram").is_empty());
}
