//! Receive fragmented frames over UDP and write them to stdout.

mod cli;

use clap::Parser;
use defrag::{DefragBuilder, ReadError};
use tokio::{io::AsyncWriteExt, net::UdpSocket};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let socket = UdpSocket::bind(cli.bind).await?;
    tracing::info!(local_addr = %socket.local_addr()?, "receiving fragments");

    let mut builder = DefragBuilder::new();
    if let Some(size) = cli.max_datagram_size {
        builder = builder.max_datagram_size(size);
    }
    let mut reader = builder.spawn(socket);
    let mut stdout = tokio::io::stdout();

    loop {
        let frame = match reader.next_frame().await {
            Ok(frame) => frame,
            Err(ReadError::Transport(error)) => {
                tracing::error!(%error, "socket failed");
                return Err(error.into());
            }
            Err(error) => return Err(error.into()),
        };
        if cli.length_prefix {
            stdout.write_u32(u32::try_from(frame.len())?).await?;
        }
        for span in frame.spans() {
            stdout.write_all(span).await?;
        }
        stdout.flush().await?;
    }
}
