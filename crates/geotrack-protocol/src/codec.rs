//! Tokio codec wiring the tracker protocol into `Framed` TCP streams.
//!
//! The codec is a thin integration layer: [`StreamParser`] handles buffering
//! and sentinel detection, [`Frame::parse`] handles validation. Decode errors
//! are per-frame — the session logs them and keeps reading; they never
//! poison the stream.

use bytes::BytesMut;
use geotrack_core::{Error, Result};
use tokio_util::codec::{Decoder, Encoder};

use crate::{Frame, StreamParser};

/// Codec for tracker frames over TCP.
///
/// # Example
///
/// ```rust,no_run
/// use futures::StreamExt;
/// use tokio::net::TcpStream;
/// use tokio_util::codec::Framed;
/// use geotrack_protocol::TrackerCodec;
///
/// # async fn example() -> geotrack_core::Result<()> {
/// let stream = TcpStream::connect("127.0.0.1:9090").await?;
/// let mut framed = Framed::new(stream, TrackerCodec::new());
///
/// while let Some(result) = framed.next().await {
///     match result {
///         Ok(frame) => println!("received {frame}"),
///         Err(e) => eprintln!("bad frame: {e}"),
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct TrackerCodec {
    /// Reassembles sentinel-framed messages from the byte stream
    parser: StreamParser,
}

impl TrackerCodec {
    /// Create a new codec.
    pub fn new() -> Self {
        Self {
            parser: StreamParser::new(),
        }
    }
}

impl Decoder for TrackerCodec {
    type Item = Frame;
    type Error = Error;

    /// Extract the next validated frame from the stream.
    ///
    /// Returns `Ok(None)` while a frame is still incomplete. A complete but
    /// invalid frame (bad device id, unknown command) is an `Err` item; the
    /// parser has already consumed it, so the caller can log and continue
    /// with the next read.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if !src.is_empty() {
            self.parser.feed(src);
            src.clear();
        }

        match self.parser.next_frame() {
            Some(raw) => Frame::parse(&raw).map(Some),
            None => Ok(None),
        }
    }
}

impl Encoder<Frame> for TrackerCodec {
    type Error = Error;

    /// Write a frame's wire bytes. Frames are validated at construction, so
    /// encoding cannot produce an invalid message.
    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<()> {
        dst.extend_from_slice(item.as_bytes());
        Ok(())
    }
}
