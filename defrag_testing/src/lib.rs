//! Utilities for driving a [`ReassemblyEngine`](defrag::ReassemblyEngine)
//! from scripted datagrams during tests.
//!
//! ```rust
//! use defrag::DefragBuilder;
//! use defrag_testing::{ScriptedSource, datagram};
//!
//! # async fn example() {
//! let source = ScriptedSource::new([datagram(0, 1, 0, b"hi")]);
//! let mut reader = DefragBuilder::new().spawn(source);
//! let mut buf = [0_u8; 8];
//! assert_eq!(reader.read(&mut buf).await.unwrap(), 2);
//! # }
//! ```

pub mod datagrams;
pub mod logging;
pub mod source;

pub use datagrams::{datagram, fragment_frame, raw_datagram};
pub use logging::{LoggerHandle, logger};
pub use source::{ChannelSource, ScriptedSource, SourceProbe, Step, TEST_PEER};
