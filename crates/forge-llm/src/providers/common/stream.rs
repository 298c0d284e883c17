//! Line-framed stream decoding shared by the streaming providers.
//!
//! Response bodies arrive in arbitrary byte chunks. Each chunk is appended to
//! a carry-over buffer, complete lines are decoded, and the trailing partial
//! line is carried into the next read. Carry-over is raw bytes so a UTF-8
//! character split across reads is only decoded once it is whole.

use std::collections::VecDeque;
use std::pin::Pin;

use bytes::Bytes;
use futures::stream::{self, Stream};
use futures_util::StreamExt;
use serde_json::Value;

use crate::provider::{LLMError, Result};

const SSE_DATA_PREFIX: &str = "data: ";
const SSE_DONE: &str = "[DONE]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// Server-sent events; only `data: ` lines carry payloads.
    Sse,
    /// One JSON document per line.
    Ndjson,
}

/// Pulls the text fragment out of one decoded frame.
pub type TextExtractor = fn(&Value) -> Option<&str>;

/// Result of feeding one chunk to [`decode_step`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Bytes of the trailing incomplete line.
    pub carry: Vec<u8>,
    pub fragments: Vec<String>,
    /// Frames that were not valid JSON.
    pub skipped: usize,
}

/// Fold one chunk into the carry-over buffer and decode every complete line.
pub fn decode_step(mut carry: Vec<u8>, chunk: &[u8], format: FrameFormat, extract: TextExtractor) -> Decoded {
    carry.extend_from_slice(chunk);

    let mut fragments = Vec::new();
    let mut skipped = 0;
    let mut consumed = 0;

    while let Some(offset) = carry[consumed..].iter().position(|b| *b == b'\n') {
        let line = &carry[consumed..consumed + offset];
        consumed += offset + 1;

        match decode_line(line, format, extract) {
            Frame::Text(text) => fragments.push(text),
            Frame::Malformed => skipped += 1,
            Frame::Ignored => {}
        }
    }

    carry.drain(..consumed);
    Decoded {
        carry,
        fragments,
        skipped,
    }
}

enum Frame {
    Text(String),
    Malformed,
    Ignored,
}

fn decode_line(line: &[u8], format: FrameFormat, extract: TextExtractor) -> Frame {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let Ok(line) = std::str::from_utf8(line) else {
        return Frame::Malformed;
    };

    let payload = match format {
        FrameFormat::Sse => match line.strip_prefix(SSE_DATA_PREFIX) {
            Some(data) => data.trim(),
            None => return Frame::Ignored,
        },
        FrameFormat::Ndjson => line.trim(),
    };
    if payload.is_empty() || payload == SSE_DONE {
        return Frame::Ignored;
    }

    match serde_json::from_str::<Value>(payload) {
        Ok(value) => match extract(&value) {
            Some(text) if !text.is_empty() => Frame::Text(text.to_string()),
            _ => Frame::Ignored,
        },
        Err(_) => Frame::Malformed,
    }
}

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

struct DecodeState {
    provider: &'static str,
    body: ByteStream,
    format: FrameFormat,
    extract: TextExtractor,
    carry: Vec<u8>,
    pending: VecDeque<String>,
    skipped: usize,
    received: bool,
    finished: bool,
}

/// Lazily decode a response body into text fragments.
///
/// A body that ends without yielding a single byte produces a backend error.
/// Any carry-over left when the body ends is discarded.
pub fn decode_stream<S>(
    provider: &'static str,
    body: S,
    format: FrameFormat,
    extract: TextExtractor,
) -> impl Stream<Item = Result<String>> + Send
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    let state = DecodeState {
        provider,
        body: Box::pin(body),
        format,
        extract,
        carry: Vec::new(),
        pending: VecDeque::new(),
        skipped: 0,
        received: false,
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(fragment) = state.pending.pop_front() {
                return Some((Ok(fragment), state));
            }
            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => {
                    state.received |= !chunk.is_empty();
                    let decoded = decode_step(std::mem::take(&mut state.carry), &chunk, state.format, state.extract);
                    state.carry = decoded.carry;
                    state.skipped += decoded.skipped;
                    state.pending.extend(decoded.fragments);
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(LLMError::Http(e)), state));
                }
                None => {
                    state.finished = true;
                    if state.skipped > 0 || !state.carry.is_empty() {
                        log::debug!(
                            "{} stream: skipped {} malformed frames, dropped {} trailing bytes",
                            state.provider,
                            state.skipped,
                            state.carry.len()
                        );
                    }
                    if !state.received {
                        return Some((Err(LLMError::no_body(state.provider)), state));
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_content(value: &Value) -> Option<&str> {
        value.pointer("/message/content").and_then(Value::as_str)
    }

    fn candidate_text(value: &Value) -> Option<&str> {
        value
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
    }

    fn decode_all(chunks: &[&[u8]], format: FrameFormat, extract: TextExtractor) -> (Vec<String>, usize) {
        let mut carry = Vec::new();
        let mut fragments = Vec::new();
        let mut skipped = 0;
        for chunk in chunks {
            let decoded = decode_step(carry, chunk, format, extract);
            carry = decoded.carry;
            fragments.extend(decoded.fragments);
            skipped += decoded.skipped;
        }
        (fragments, skipped)
    }

    #[test]
    fn ndjson_line_split_across_chunks() {
        let chunks: [&[u8]; 3] = [
            br#"{"message":{"content":"Hel"}}"#.as_slice(),
            b"\n{\"mess",
            b"age\":{\"content\":\"lo\"}}\n",
        ];
        let (fragments, skipped) = decode_all(&chunks, FrameFormat::Ndjson, message_content);
        assert_eq!(fragments, vec!["Hel", "lo"]);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn partial_line_stays_in_carry() {
        let decoded = decode_step(Vec::new(), b"{\"message\":", FrameFormat::Ndjson, message_content);
        assert!(decoded.fragments.is_empty());
        assert_eq!(decoded.carry, b"{\"message\":".to_vec());
    }

    #[test]
    fn sse_ignores_non_data_lines_and_done() {
        let body = b"event: message\n: keep-alive\n\ndata: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hi\"}]}}]}\r\n\r\ndata: [DONE]\n";
        let (fragments, skipped) = decode_all(&[body.as_slice()], FrameFormat::Sse, candidate_text);
        assert_eq!(fragments, vec!["Hi"]);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn malformed_frames_are_counted_not_fatal() {
        let body = b"data: {not json\ndata: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"ok\"}]}}]}\ndata: {\"usage\":{}}\n";
        let (fragments, skipped) = decode_all(&[body.as_slice()], FrameFormat::Sse, candidate_text);
        assert_eq!(fragments, vec!["ok"]);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn chunk_boundaries_do_not_change_output() {
        let body = "{\"message\":{\"content\":\"héllo \"}}\n\
                    garbage\n\
                    \n\
                    {\"message\":{\"content\":\"wörld 🌍\"}}\n\
                    {\"done\":true}\n"
            .as_bytes();

        let (whole, whole_skipped) = decode_all(&[body], FrameFormat::Ndjson, message_content);
        assert_eq!(whole, vec!["héllo ", "wörld 🌍"]);
        assert_eq!(whole_skipped, 1);

        let bytes: Vec<&[u8]> = body.chunks(1).collect();
        assert_eq!(decode_all(&bytes, FrameFormat::Ndjson, message_content), (whole.clone(), 1));

        for size in [2, 3, 5, 7, 13] {
            let chunks: Vec<&[u8]> = body.chunks(size).collect();
            assert_eq!(
                decode_all(&chunks, FrameFormat::Ndjson, message_content),
                (whole.clone(), 1),
                "chunk size {size}"
            );
        }
    }

    #[test]
    fn sse_chunk_boundaries_do_not_change_output() {
        let body = "event: message\r\n\
                    data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Grüß \"}]}}]}\r\n\r\n\
                    data: {broken\r\n\r\n\
                    data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"dich ✓\"}]}}]}\r\n\r\n\
                    data: [DONE]\r\n"
            .as_bytes();

        let (whole, whole_skipped) = decode_all(&[body], FrameFormat::Sse, candidate_text);
        assert_eq!(whole, vec!["Grüß ", "dich ✓"]);
        assert_eq!(whole_skipped, 1);

        let bytes: Vec<&[u8]> = body.chunks(1).collect();
        assert_eq!(decode_all(&bytes, FrameFormat::Sse, candidate_text), (whole, 1));
    }

    fn body_from(chunks: Vec<&'static [u8]>) -> impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static {
        stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from_static(c))))
    }

    #[tokio::test]
    async fn stream_yields_fragments_lazily() {
        let body = body_from(vec![
            b"{\"message\":{\"content\":\"a\"}}\n{\"message\":",
            b"{\"content\":\"b\"}}\n{\"message\":{\"content\":\"dropped\"}}",
        ]);
        let fragments: Vec<String> = decode_stream("Ollama", body, FrameFormat::Ndjson, message_content)
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(fragments, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn empty_body_is_backend_error() {
        let results: Vec<Result<String>> =
            decode_stream("Ollama", body_from(vec![]), FrameFormat::Ndjson, message_content)
                .collect()
                .await;
        assert_eq!(results.len(), 1);
        match &results[0] {
            Err(LLMError::Backend { message, .. }) => assert_eq!(message, "no response body"),
            other => panic!("expected backend error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn body_without_text_is_not_an_error() {
        let results: Vec<Result<String>> =
            decode_stream("Gemini", body_from(vec![b": ping\n\n"]), FrameFormat::Sse, candidate_text)
                .collect()
                .await;
        assert!(results.is_empty());
    }
}
