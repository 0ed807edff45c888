//! Datagram sources feeding the reassembly engine.
//!
//! [`PacketSource`] is the only capability the engine consumes. Any error it
//! returns, including a clean end of stream, is terminal: the engine reports
//! it to the reader once and never calls the source again.

use std::{io, net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use tokio::net::UdpSocket;

/// A packet-oriented transport yielding one datagram per call.
#[async_trait]
pub trait PacketSource: Send + 'static {
    /// Receive a single datagram into `buf`.
    ///
    /// Returns the number of bytes written and the sender's address. A
    /// datagram larger than `buf` may be truncated by the transport.
    ///
    /// # Errors
    ///
    /// Any error signals that the source is exhausted or has failed.
    async fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;
}

#[async_trait]
impl PacketSource for UdpSocket {
    async fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        UdpSocket::recv_from(self, buf).await
    }
}

#[async_trait]
impl PacketSource for Arc<UdpSocket> {
    async fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        UdpSocket::recv_from(self, buf).await
    }
}

#[async_trait]
impl<S: PacketSource + ?Sized> PacketSource for Box<S> {
    async fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        (**self).recv_from(buf).await
    }
}
