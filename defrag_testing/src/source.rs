//! In-memory packet sources.

use std::{
    collections::VecDeque,
    io,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use bytes::Bytes;
use defrag::PacketSource;
use tokio::sync::mpsc;

/// Sender address reported by the in-memory sources.
pub const TEST_PEER: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 4_000);

/// One scripted outcome of [`PacketSource::recv_from`].
#[derive(Debug)]
pub enum Step {
    /// Yield this datagram.
    Datagram(Bytes),
    /// Fail with this error.
    Fail(io::Error),
}

impl From<Bytes> for Step {
    fn from(datagram: Bytes) -> Self { Self::Datagram(datagram) }
}

/// Counts how often a source was asked for a datagram.
#[derive(Clone, Debug, Default)]
pub struct SourceProbe(Arc<AtomicUsize>);

impl SourceProbe {
    /// Number of `recv_from` calls so far.
    #[must_use]
    pub fn calls(&self) -> usize { self.0.load(Ordering::SeqCst) }

    fn record(&self) { self.0.fetch_add(1, Ordering::SeqCst); }
}

/// Replays a fixed script, then fails with [`io::ErrorKind::UnexpectedEof`].
#[derive(Debug)]
pub struct ScriptedSource {
    steps: VecDeque<Step>,
    probe: SourceProbe,
}

impl ScriptedSource {
    /// Script that yields each datagram in turn and then reports end of stream.
    pub fn new(steps: impl IntoIterator<Item = impl Into<Step>>) -> Self {
        Self {
            steps: steps.into_iter().map(Into::into).collect(),
            probe: SourceProbe::default(),
        }
    }

    /// Append a failure to the script.
    #[must_use]
    pub fn then_fail(mut self, error: io::Error) -> Self {
        self.steps.push_back(Step::Fail(error));
        self
    }

    /// Handle observing how often the source is polled.
    #[must_use]
    pub fn probe(&self) -> SourceProbe { self.probe.clone() }
}

#[async_trait]
impl PacketSource for ScriptedSource {
    async fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.probe.record();
        match self.steps.pop_front() {
            Some(Step::Datagram(datagram)) => {
                let len = datagram.len().min(buf.len());
                buf[..len].copy_from_slice(&datagram[..len]);
                Ok((len, TEST_PEER))
            }
            Some(Step::Fail(error)) => Err(error),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "script exhausted",
            )),
        }
    }
}

/// Source fed interactively from a test through an unbounded channel.
///
/// Dropping every [`mpsc::UnboundedSender`] ends the stream with
/// [`io::ErrorKind::UnexpectedEof`].
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::UnboundedReceiver<Step>,
    probe: SourceProbe,
}

impl ChannelSource {
    /// Create a source and the sender that feeds it.
    #[must_use]
    pub fn channel() -> (mpsc::UnboundedSender<Step>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            tx,
            Self {
                rx,
                probe: SourceProbe::default(),
            },
        )
    }

    /// Handle observing how often the source is polled.
    #[must_use]
    pub fn probe(&self) -> SourceProbe { self.probe.clone() }
}

#[async_trait]
impl PacketSource for ChannelSource {
    async fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.probe.record();
        match self.rx.recv().await {
            Some(Step::Datagram(datagram)) => {
                let len = datagram.len().min(buf.len());
                buf[..len].copy_from_slice(&datagram[..len]);
                Ok((len, TEST_PEER))
            }
            Some(Step::Fail(error)) => Err(error),
            None => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "channel closed")),
        }
    }
}
