use crate::api::logging::{emit_sse_parse_error, emit_unknown_sse_event};
use crate::api::ByteStream;
use crate::types::{AgentId, StreamEvent};
use anyhow::Result;
use futures::StreamExt;
use serde::Deserialize;
use std::collections::VecDeque;

#[derive(Deserialize)]
struct TokenPayload {
    token: String,
}

#[derive(Deserialize)]
struct AgentPayload {
    agent: AgentId,
    name: String,
    description: String,
}

#[derive(Deserialize)]
struct DonePayload {
    processing_time_ms: u64,
}

#[derive(Deserialize)]
struct ErrorPayload {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

/// Reassembles `event:`/`data:` frames from an arbitrarily-chunked byte
/// stream.
///
/// Lines are the unit of buffering: a network read may end anywhere,
/// including mid-line, so only text up to the last newline is consumed per
/// call and the remainder stays buffered for the next chunk. The pending
/// event name survives chunk boundaries the same way.
#[derive(Default)]
pub struct SseParser {
    buffer: String,
    pending_event: Option<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let Some(end) = self.buffer.rfind('\n') else {
            return Vec::new();
        };
        let complete: String = self.buffer.drain(..=end).collect();

        let mut events = Vec::new();
        for line in complete.lines() {
            if let Some(rest) = line.strip_prefix("event: ") {
                self.pending_event = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("data: ") {
                // A data line is only meaningful under a pending event name,
                // and always consumes it, parseable or not.
                let Some(event_name) = self.pending_event.take() else {
                    continue;
                };
                if let Some(event) = decode_event(&event_name, rest) {
                    events.push(event);
                }
            }
        }
        events
    }
}

fn decode_event(event_name: &str, data: &str) -> Option<StreamEvent> {
    let decoded = match event_name {
        "token" => serde_json::from_str::<TokenPayload>(data)
            .map(|payload| StreamEvent::Token {
                text: payload.token,
            }),
        "agent" => serde_json::from_str::<AgentPayload>(data).map(|payload| {
            StreamEvent::AgentSelected {
                agent: payload.agent,
                name: payload.name,
                description: payload.description,
            }
        }),
        "done" => serde_json::from_str::<DonePayload>(data).map(|payload| StreamEvent::Done {
            processing_time_ms: payload.processing_time_ms,
        }),
        "error" => serde_json::from_str::<ErrorPayload>(data).map(|payload| StreamEvent::Error {
            message: payload.message,
            code: payload.code,
        }),
        other => {
            emit_unknown_sse_event(other);
            return None;
        }
    };

    match decoded {
        Ok(event) => Some(event),
        Err(error) => {
            emit_sse_parse_error(event_name, data, &error);
            None
        }
    }
}

/// Finite, single-pass event producer for one chat turn.
///
/// Wraps the response body and a parser behind an explicit pull operation;
/// `close` drops the transport so a cancelled turn terminates instead of
/// hanging on the next read.
pub struct EventStream {
    bytes: Option<ByteStream>,
    parser: SseParser,
    ready: VecDeque<StreamEvent>,
}

impl EventStream {
    pub fn new(bytes: ByteStream) -> Self {
        Self {
            bytes: Some(bytes),
            parser: SseParser::new(),
            ready: VecDeque::new(),
        }
    }

    /// Pull the next event. `Ok(None)` is normal end of stream; bytes still
    /// buffered at that point belong to an unterminated frame and are
    /// discarded. A transport error ends the sequence.
    pub async fn next_event(&mut self) -> Result<Option<StreamEvent>> {
        loop {
            if let Some(event) = self.ready.pop_front() {
                return Ok(Some(event));
            }
            let Some(bytes) = self.bytes.as_mut() else {
                return Ok(None);
            };
            match bytes.next().await {
                Some(Ok(chunk)) => self.ready.extend(self.parser.process(&chunk)),
                Some(Err(error)) => {
                    self.bytes = None;
                    return Err(error);
                }
                None => {
                    self.bytes = None;
                    return Ok(None);
                }
            }
        }
    }

    /// Drop the underlying transport; subsequent pulls report end of stream.
    pub fn close(&mut self) {
        self.bytes = None;
        self.ready.clear();
    }
}
