//! TCP client for number streams.

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, ToSocketAddrs};

use numstream_core::ClientId;
use numstream_stream::{read_message, write_message, NumbersRequest, StreamError, StreamMessage};

use crate::error::{NumstreamError, Result};

/// Numbers received over one connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fetch {
    /// Numbers in the order received.
    pub numbers: Vec<u32>,
    /// Checksum from the final payload, if it arrived.
    pub checksum: Option<String>,
}

impl Fetch {
    /// Whether the final payload was received.
    pub fn is_complete(&self) -> bool {
        self.checksum.is_some()
    }
}

/// A connection to a number server.
///
/// A connection carries a single request, so fetching consumes the client.
pub struct NumberClient {
    stream: TcpStream,
}

impl NumberClient {
    /// Connect to the server at `addr`.
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }

    /// Request numbers and read them until the final payload.
    ///
    /// With `break_after = Some(k)` the connection is closed after `k`
    /// numbers, leaving the session on the server resumable.
    pub async fn get_numbers(
        self,
        client_id: ClientId,
        count: u32,
        seed: u32,
        break_after: Option<u32>,
    ) -> Result<Fetch> {
        self.get_numbers_with(client_id, count, seed, break_after, |_| {})
            .await
    }

    /// Like [`get_numbers`](Self::get_numbers), calling `on_number` as each
    /// number arrives.
    pub async fn get_numbers_with(
        self,
        client_id: ClientId,
        count: u32,
        seed: u32,
        break_after: Option<u32>,
        mut on_number: impl FnMut(u32),
    ) -> Result<Fetch> {
        let break_after = break_after.filter(|&k| k > 0);
        let (mut reader, mut writer) = self.stream.into_split();

        let request = NumbersRequest::new(client_id, count, seed);
        write_message(&mut writer, &StreamMessage::Request(request)).await?;

        let mut fetch = Fetch::default();
        loop {
            match read_message(&mut reader).await? {
                Some(StreamMessage::Number(response)) => {
                    on_number(response.number);
                    fetch.numbers.push(response.number);

                    if response.is_final() {
                        fetch.checksum = Some(response.checksum);
                        let _ = writer.shutdown().await;
                        return Ok(fetch);
                    }

                    if break_after.is_some_and(|k| fetch.numbers.len() == k as usize) {
                        tracing::debug!(received = fetch.numbers.len(), "breaking connection");
                        return Ok(fetch);
                    }
                }
                Some(StreamMessage::Error { code, message }) => {
                    return Err(StreamError::Peer { code, message }.into());
                }
                Some(StreamMessage::Request(_)) => {
                    return Err(NumstreamError::Protocol(
                        "server sent a request frame".into(),
                    ));
                }
                None => return Ok(fetch),
            }
        }
    }
}
