//! Command line interface for the `defrag` binary.
//!
//! The binary binds a UDP socket, reassembles incoming frames, and writes
//! each frame's payload to standard output.

use std::{net::SocketAddr, num::NonZeroUsize};

use clap::Parser;

/// Command line arguments for the `defrag` binary.
#[derive(Debug, Parser)]
#[command(
    name = "defrag",
    version,
    about = "Reassemble fragmented UDP frames and write them to stdout"
)]
pub struct Cli {
    /// Local address to receive datagrams on.
    #[arg(short, long, default_value = "0.0.0.0:9000")]
    pub bind: SocketAddr,

    /// Receive buffer size in bytes; larger datagrams are truncated.
    #[arg(long)]
    pub max_datagram_size: Option<NonZeroUsize>,

    /// Prefix every frame with its length as a big-endian u32.
    #[arg(long)]
    pub length_prefix: bool,
}
