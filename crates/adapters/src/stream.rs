//! Stream-chunk parsing: one universal rule for every vendor (§4.1).
//!
//! Lines not prefixed with `data:` are dropped. `data: [DONE]` terminates
//! the stream. Otherwise the payload is re-wrapped into the OpenAI SSE
//! chunk shape and re-emitted; malformed JSON is dropped silently rather
//! than treated as fatal.

use chrono::Utc;
use serde_json::{json, Value};

pub const DONE_FRAME: &str = "data: [DONE]\n\n";

/// The result of parsing one upstream SSE line.
pub enum StreamEvent {
    /// Drop this line; it carried no usable frame.
    Skip,
    /// Forward this rewrapped frame to the caller.
    Frame(String),
    /// The terminal `[DONE]` frame; the caller should stop reading.
    Done,
}

pub fn parse_stream_chunk(model: &str, line: &str) -> StreamEvent {
    let Some(rest) = line.strip_prefix("data:") else {
        return StreamEvent::Skip;
    };
    let data = rest.trim();

    if data == "[DONE]" {
        return StreamEvent::Done;
    }

    let Ok(parsed) = serde_json::from_str::<Value>(data) else {
        return StreamEvent::Skip;
    };

    let wrapped = json!({
        "id": parsed.get("id").cloned().unwrap_or_else(|| json!(format!("chatcmpl-{}", uuid::Uuid::new_v4()))),
        "object": "chat.completion.chunk",
        "created": parsed.get("created").and_then(Value::as_i64).unwrap_or_else(|| Utc::now().timestamp()),
        "model": parsed.get("model").and_then(Value::as_str).unwrap_or(model),
        "choices": parsed.get("choices").cloned().unwrap_or_else(|| json!([])),
    });

    match serde_json::to_string(&wrapped) {
        Ok(s) => StreamEvent::Frame(format!("data: {s}\n\n")),
        Err(_) => StreamEvent::Skip,
    }
}
