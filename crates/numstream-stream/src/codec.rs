//! Length-prefixed CBOR framing.
//!
//! Each frame is a 4-byte big-endian body length followed by the
//! CBOR-encoded [`StreamMessage`].

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Result, StreamError};
use crate::messages::{limits::MAX_FRAME_LEN, StreamMessage};

const LEN_PREFIX: usize = 4;

/// Encode a message into a complete frame.
pub fn encode(message: &StreamMessage) -> Result<Bytes> {
    message
        .validate_limits()
        .map_err(|e| StreamError::Codec(e.into()))?;

    let mut buf = BytesMut::with_capacity(64);
    buf.put_u32(0);
    ciborium::into_writer(message, (&mut buf).writer())
        .map_err(|e| StreamError::Codec(e.to_string()))?;

    let body_len = buf.len() - LEN_PREFIX;
    if body_len > MAX_FRAME_LEN {
        return Err(StreamError::Codec(format!(
            "frame of {body_len} bytes exceeds maximum {MAX_FRAME_LEN}"
        )));
    }
    buf[..LEN_PREFIX].copy_from_slice(&(body_len as u32).to_be_bytes());

    Ok(buf.freeze())
}

/// Decode a frame body (without its length prefix).
pub fn decode(body: &[u8]) -> Result<StreamMessage> {
    let message: StreamMessage =
        ciborium::from_reader(body).map_err(|e| StreamError::Codec(e.to_string()))?;
    message
        .validate_limits()
        .map_err(|e| StreamError::Codec(e.into()))?;
    Ok(message)
}

/// Write one message and flush.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    message: &StreamMessage,
) -> Result<()> {
    let frame = encode(message)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one message.
///
/// Returns `Ok(None)` if the peer closed the stream before a new frame began.
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<StreamMessage>> {
    let len = match reader.read_u32().await {
        Ok(len) => len as usize,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    // Validate frame size before allocation
    if len > MAX_FRAME_LEN {
        return Err(StreamError::Codec(format!(
            "frame of {len} bytes exceeds maximum {MAX_FRAME_LEN}"
        )));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    decode(&body).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{ErrorCode, NumberResponse, NumbersRequest};
    use numstream_core::ClientId;

    #[test]
    fn test_frame_prefix_matches_body() {
        let msg = StreamMessage::Number(NumberResponse::partial(42));
        let frame = encode(&msg).unwrap();

        let len = u32::from_be_bytes(frame[..4].try_into().unwrap()) as usize;
        assert_eq!(len, frame.len() - 4);
        assert_eq!(decode(&frame[4..]).unwrap(), msg);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(decode(&[0xff, 0x00, 0x13]).is_err());
    }

    #[tokio::test]
    async fn test_stream_of_frames() {
        let (mut client, mut server) = tokio::io::duplex(1024);

        let request = StreamMessage::Request(NumbersRequest::new(ClientId::NIL, 4, 1));
        let error = StreamMessage::Error {
            code: ErrorCode::Expired,
            message: "gone".into(),
        };
        write_message(&mut client, &request).await.unwrap();
        write_message(&mut client, &error).await.unwrap();
        drop(client);

        assert_eq!(read_message(&mut server).await.unwrap(), Some(request));
        assert_eq!(read_message(&mut server).await.unwrap(), Some(error));
        assert_eq!(read_message(&mut server).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        client
            .write_all(&((MAX_FRAME_LEN as u32) + 1).to_be_bytes())
            .await
            .unwrap();

        let err = read_message(&mut server).await.unwrap_err();
        assert!(matches!(err, StreamError::Codec(_)));
    }

    #[tokio::test]
    async fn test_truncated_body_is_error() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        client.write_all(&10u32.to_be_bytes()).await.unwrap();
        client.write_all(&[1, 2, 3]).await.unwrap();
        drop(client);

        assert!(read_message(&mut server).await.is_err());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_decode_arbitrary_bytes_never_panics(
                body in proptest::collection::vec(any::<u8>(), 0..256)
            ) {
                let _ = decode(&body);
            }
        }
    }
}
