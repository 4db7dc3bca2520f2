//! Newline-delimited JSON over TCP
//!
//! Each connection gets a client id and an outbound queue. Reading and
//! writing share one task so a client's messages go out in the order the
//! service produced them.
//!
//! Input is framed by [`RequestCodec`], which never buffers more than the
//! configured line limit. Oversized lines and lines that are not UTF-8 are
//! answered with an `error` message; only I/O failures close the socket.

use std::future::Future;
use std::io;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tokio_util::bytes::BytesMut;
use tokio_util::codec::{Decoder, FramedRead, LinesCodec, LinesCodecError};
use tracing::{debug, error, info, warn};

use crate::protocol::{ClientId, ClientMessage, ServerMessage};
use crate::service::RoomService;

/// Accept connections until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    service: Arc<RoomService>,
    max_line_bytes: usize,
    shutdown: F,
) -> io::Result<()>
where
    F: Future<Output = ()>,
{
    info!(addr = %listener.local_addr()?, "Room server listening");
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, no longer accepting connections");
                return Ok(());
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    debug!(%peer, "Accepted connection");
                    let service = Arc::clone(&service);
                    tokio::spawn(async move {
                        if let Err(err) = handle_connection(stream, service, max_line_bytes).await {
                            error!(%peer, error = %err, "Connection failed");
                        }
                    });
                }
                Err(err) => error!(error = %err, "Failed to accept connection"),
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    service: Arc<RoomService>,
    max_line_bytes: usize,
) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let (client, rx) = service.connect();
    let mut frames = FramedRead::new(reader, RequestCodec::new(max_line_bytes));
    let mut outbound = UnboundedReceiverStream::new(rx);

    let result = loop {
        tokio::select! {
            frame = frames.next() => match frame {
                Some(Ok(Frame::Line(line))) => handle_line(&service, client, &line),
                Some(Ok(Frame::TooLong)) => {
                    warn!(client = %client, max_line_bytes, "Oversized message");
                    service.reject_input(
                        client,
                        format!("Message exceeds {} bytes", max_line_bytes),
                    );
                }
                Some(Ok(Frame::NotUtf8)) => {
                    warn!(client = %client, "Message is not valid UTF-8");
                    service.reject_input(client, "Invalid message: not valid UTF-8");
                }
                Some(Err(err)) => break Err(err),
                None => break Ok(()),
            },
            Some(message) = outbound.next() => {
                if let Err(err) = write_message(&mut writer, &message).await {
                    break Err(err);
                }
            }
        }
    };

    service.disconnect(client);
    result
}

/// One unit of client input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Frame {
    Line(String),
    TooLong,
    NotUtf8,
}

/// Newline framing with a length cap.
///
/// Wraps [`LinesCodec`] and turns its recoverable errors into frames so the
/// read stream keeps going. Past the cap the rest of the line is discarded
/// as it arrives.
#[derive(Debug)]
struct RequestCodec {
    lines: LinesCodec,
}

impl RequestCodec {
    fn new(max_line_bytes: usize) -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(max_line_bytes),
        }
    }

    fn frame(decoded: Result<Option<String>, LinesCodecError>) -> io::Result<Option<Frame>> {
        match decoded {
            Ok(line) => Ok(line.map(Frame::Line)),
            Err(LinesCodecError::MaxLineLengthExceeded) => Ok(Some(Frame::TooLong)),
            Err(LinesCodecError::Io(err)) if err.kind() == io::ErrorKind::InvalidData => {
                Ok(Some(Frame::NotUtf8))
            }
            Err(LinesCodecError::Io(err)) => Err(err),
        }
    }
}

impl Decoder for RequestCodec {
    type Item = Frame;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> io::Result<Option<Frame>> {
        Self::frame(self.lines.decode(src))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> io::Result<Option<Frame>> {
        Self::frame(self.lines.decode_eof(src))
    }
}

fn handle_line(service: &RoomService, client: ClientId, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }

    match serde_json::from_str::<ClientMessage>(line) {
        Ok(message) => service.handle(client, message),
        Err(err) => {
            warn!(client = %client, error = %err, "Malformed message");
            service.reject_input(client, format!("Invalid message: {}", err));
        }
    }
}

async fn write_message(writer: &mut OwnedWriteHalf, message: &ServerMessage) -> io::Result<()> {
    let mut bytes = serde_json::to_vec(message)?;
    bytes.push(b'\n');
    writer.write_all(&bytes).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut RequestCodec, buf: &mut BytesMut) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Some(frame) = codec.decode(buf).unwrap() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn test_splits_lines() {
        let mut codec = RequestCodec::new(64);
        let mut buf = BytesMut::from(&b"{\"a\":1}\r\n{\"b\":2}\n{\"c\""[..]);
        assert_eq!(
            decode_all(&mut codec, &mut buf),
            vec![
                Frame::Line("{\"a\":1}".to_string()),
                Frame::Line("{\"b\":2}".to_string()),
            ]
        );
        assert_eq!(&buf[..], b"{\"c\"");
    }

    #[test]
    fn test_long_line_rejected_before_newline() {
        let mut codec = RequestCodec::new(8);
        let mut buf = BytesMut::from(&[b'x'; 32][..]);
        assert_eq!(decode_all(&mut codec, &mut buf), vec![Frame::TooLong]);
        assert!(buf.len() <= 8);

        // The tail of the long line is dropped, the next line survives.
        buf.extend_from_slice(b"xxxxxxxxxxxx\nok\n");
        assert_eq!(
            decode_all(&mut codec, &mut buf),
            vec![Frame::Line("ok".to_string())]
        );
    }

    #[test]
    fn test_invalid_utf8_is_a_frame() {
        let mut codec = RequestCodec::new(64);
        let mut buf = BytesMut::from(&b"\xff\xfe\nok\n"[..]);
        assert_eq!(
            decode_all(&mut codec, &mut buf),
            vec![Frame::NotUtf8, Frame::Line("ok".to_string())]
        );
    }
}
