//! Native-messaging host.
//!
//! Every message is UTF-8 JSON preceded by its byte length as a 32-bit
//! unsigned integer in native byte order. Stdout carries frames only, so
//! nothing else may write to it while the host runs.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::message::{RelayResponse, handle_message};
use super::service::AnalysisPort;

/// Largest inbound message accepted from the browser
pub const MAX_INBOUND_MESSAGE: usize = 1024 * 1024;

#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
    Message(Vec<u8>),
    /// Payload over the limit; its bytes were consumed and discarded
    Oversized(usize),
}

/// Read one frame; `None` when input ends on a frame boundary
pub async fn read_frame<R>(reader: &mut R) -> io::Result<Option<Frame>>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        match reader.read(&mut header[filled..]).await? {
            0 if filled == 0 => return Ok(None),
            0 => {
                warn!(bytes = filled, "Input ended inside a frame header");
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated frame header"));
            }
            read => filled += read,
        }
    }

    let length = u32::from_ne_bytes(header) as usize;
    if length > MAX_INBOUND_MESSAGE {
        let mut remaining = (&mut *reader).take(length as u64);
        let discarded = tokio::io::copy(&mut remaining, &mut tokio::io::sink()).await?;
        if discarded < length as u64 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated message"));
        }
        return Ok(Some(Frame::Oversized(length)));
    }

    let mut payload = vec![0u8; length];
    reader.read_exact(&mut payload).await?;
    Ok(Some(Frame::Message(payload)))
}

/// Write one frame and flush it
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let length = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "message too large"))?;
    writer.write_all(&length.to_ne_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await
}

/// Serve requests until end of input or cancellation.
///
/// Requests are answered in order, one response frame per request frame.
pub async fn run_host<P, R, W>(
    port: &P,
    reader: &mut R,
    writer: &mut W,
    cancel: &CancellationToken,
) -> io::Result<()>
where
    P: AnalysisPort + ?Sized,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("Native messaging host started");
    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => break,
            frame = read_frame(reader) => frame?,
        };

        let response = match frame {
            None => break,
            Some(Frame::Message(payload)) => {
                debug!(bytes = payload.len(), "Received message");
                handle_message(port, &payload, cancel).await
            }
            Some(Frame::Oversized(length)) => {
                warn!(length, limit = MAX_INBOUND_MESSAGE, "Rejected oversized message");
                RelayResponse::error(format!(
                    "Message too large ({length} bytes, limit {MAX_INBOUND_MESSAGE})"
                ))
            }
        };

        let encoded = serde_json::to_vec(&response).map_err(io::Error::other)?;
        write_frame(writer, &encoded).await?;
    }
    info!("Native messaging host stopped");
    Ok(())
}
