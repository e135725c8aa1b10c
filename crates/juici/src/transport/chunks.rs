use bytes::Bytes;
use futures::stream::{BoxStream, Stream, StreamExt};

use crate::errors::TransportError;

/// Source of text chunks for a streamed reply
///
/// Chunks are whatever the transport delivered, decoded as UTF-8. There is no framing,
/// so a chunk boundary carries no meaning beyond arrival order.
pub struct ChunkSource {
    inner: BoxStream<'static, Result<Bytes, TransportError>>,
    decoder: Utf8Decoder,
    finished: bool,
}

impl ChunkSource {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, TransportError>> + Send + 'static,
    {
        ChunkSource {
            inner: stream.boxed(),
            decoder: Utf8Decoder::default(),
            finished: false,
        }
    }

    pub fn from_response(response: reqwest::Response) -> Self {
        Self::new(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|e| TransportError::Stream(e.to_string()))),
        )
    }

    /// Next decoded chunk, `Ok(None)` once the stream closed cleanly
    ///
    /// Deliveries that decode to nothing (for example the first half of a split
    /// code point) are skipped. After an error the source reports end of stream.
    pub async fn next_chunk(&mut self) -> Result<Option<String>, TransportError> {
        while !self.finished {
            match self.inner.next().await {
                Some(Ok(bytes)) => {
                    let text = self.decoder.decode(&bytes);
                    if !text.is_empty() {
                        return Ok(Some(text));
                    }
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Err(e);
                }
                None => {
                    self.finished = true;
                    let tail = self.decoder.finish();
                    if !tail.is_empty() {
                        return Ok(Some(tail));
                    }
                }
            }
        }
        Ok(None)
    }
}

impl std::fmt::Debug for ChunkSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkSource")
            .field("pending_bytes", &self.decoder.pending.len())
            .field("finished", &self.finished)
            .finish()
    }
}

/// Incremental UTF-8 decoder that holds back an incomplete trailing code point
#[derive(Debug, Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    fn decode(&mut self, bytes: &[u8]) -> String {
        let mut buffer = std::mem::take(&mut self.pending);
        buffer.extend_from_slice(bytes);

        let mut out = String::with_capacity(buffer.len());
        let mut input = buffer.as_slice();
        loop {
            match std::str::from_utf8(input) {
                Ok(valid) => {
                    out.push_str(valid);
                    input = &[];
                    break;
                }
                Err(e) => {
                    let (valid, rest) = input.split_at(e.valid_up_to());
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            input = &rest[len..];
                        }
                        // incomplete sequence at the end, wait for more bytes
                        None => {
                            input = rest;
                            break;
                        }
                    }
                }
            }
        }

        self.pending = input.to_vec();
        out
    }

    fn finish(&mut self) -> String {
        let tail = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        tail
    }
}
