//! # Stream Framing
//!
//! One envelope per frame: `u32` big-endian length, then the bincode
//! envelope. Bad frames are consumed whole so the next read starts on a
//! frame boundary.

use crate::domain::{CodecError, Envelope, Wave};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest accepted frame (16 MiB).
pub const MAX_WAVE_BYTES: usize = 16 * 1024 * 1024;

/// Encode a wave as a complete frame.
pub fn encode_frame(wave: &Wave) -> Result<Vec<u8>, CodecError> {
    let body = bincode::serialize(&wave.to_envelope()?)
        .map_err(|e| CodecError::Encode(e.to_string()))?;
    if body.len() > MAX_WAVE_BYTES {
        return Err(CodecError::FrameTooLarge {
            len: body.len(),
            max: MAX_WAVE_BYTES,
        });
    }

    let mut frame = Vec::with_capacity(4 + body.len());
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Write one wave and flush.
pub async fn write_wave<W>(writer: &mut W, wave: &Wave) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let frame = encode_frame(wave)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one raw envelope.
pub async fn read_envelope<R>(reader: &mut R) -> Result<Envelope, CodecError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut len_buf = [0u8; 4];
    let mut filled = 0;
    while filled < len_buf.len() {
        let n = reader.read(&mut len_buf[filled..]).await?;
        if n == 0 {
            return Err(if filled == 0 {
                CodecError::Closed
            } else {
                CodecError::Io("end of stream inside frame header".into())
            });
        }
        filled += n;
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_WAVE_BYTES {
        let mut rest = (&mut *reader).take(len as u64);
        let skipped = tokio::io::copy(&mut rest, &mut tokio::io::sink()).await?;
        if skipped < len as u64 {
            return Err(CodecError::Io("end of stream inside oversized frame".into()));
        }
        return Err(CodecError::FrameTooLarge {
            len,
            max: MAX_WAVE_BYTES,
        });
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;

    bincode::deserialize(&body).map_err(|e| CodecError::Malformed {
        wave_id: None,
        reason: e.to_string(),
    })
}

/// Read one typed wave.
pub async fn read_wave<R>(reader: &mut R) -> Result<Wave, CodecError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    Wave::from_envelope(read_envelope(reader).await?)
}
