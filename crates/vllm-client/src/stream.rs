use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::{Stream, StreamExt};

use crate::error::Error;
use crate::types::CompletionChunk;

/// Lazy sequence of completion chunks decoded from an SSE response body.
///
/// Forward-only and single-pass: each chunk is yielded exactly once and the
/// stream cannot be restarted. Ends at the `[DONE]` sentinel or when the
/// remote side closes the connection.
pub struct CompletionStream {
    inner: Pin<Box<dyn Stream<Item = Result<CompletionChunk, Error>> + Send>>,
}

impl CompletionStream {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self {
            inner: Box::pin(decode_sse(response.bytes_stream())),
        }
    }
}

impl Stream for CompletionStream {
    type Item = Result<CompletionChunk, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for CompletionStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionStream").finish_non_exhaustive()
    }
}

enum SseEvent {
    Chunk(CompletionChunk),
    Done,
    Skip,
}

fn decode_sse<S>(bytes: S) -> impl Stream<Item = Result<CompletionChunk, Error>>
where
    S: Stream<Item = Result<Bytes, reqwest::Error>>,
{
    async_stream::try_stream! {
        futures_util::pin_mut!(bytes);

        // Raw byte buffer: transport frames can cut a multi-byte UTF-8
        // character anywhere, so decoding happens per complete event.
        let mut buf: Vec<u8> = Vec::new();
        'outer: while let Some(frame) = bytes.next().await {
            let frame = frame.map_err(Error::Http)?;
            buf.extend_from_slice(&frame);

            while let Some(raw) = next_event(&mut buf)? {
                match parse_event(&raw)? {
                    SseEvent::Chunk(chunk) => yield chunk,
                    SseEvent::Done => break 'outer,
                    SseEvent::Skip => {}
                }
            }
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Drains one SSE event (up to a blank line) out of `buf`, if complete.
fn next_event(buf: &mut Vec<u8>) -> Result<Option<String>, Error> {
    let (end, skip) = match (find(buf, b"\n\n"), find(buf, b"\r\n\r\n")) {
        (Some(a), Some(b)) if b < a => (b, 4),
        (Some(a), _) => (a, 2),
        (None, Some(b)) => (b, 4),
        (None, None) => return Ok(None),
    };

    let event = std::str::from_utf8(&buf[..end])
        .map_err(|e| Error::Stream(format!("non-utf8 event: {e}")))?
        .to_string();
    buf.drain(..end + skip);
    Ok(Some(event))
}

fn parse_event(raw: &str) -> Result<SseEvent, Error> {
    let mut data_lines = Vec::new();
    for line in raw.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
        // `event:`, `id:`, retry fields and `:` comments are irrelevant here
    }

    if data_lines.is_empty() {
        return Ok(SseEvent::Skip);
    }

    let data = data_lines.join("\n");
    if data.trim() == "[DONE]" {
        return Ok(SseEvent::Done);
    }

    let chunk = serde_json::from_str::<CompletionChunk>(&data)
        .map_err(|e| Error::Stream(format!("malformed chunk: {e}")))?;
    Ok(SseEvent::Chunk(chunk))
}
