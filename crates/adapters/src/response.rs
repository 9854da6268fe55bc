//! Response parsers: translate a vendor's wire response into a
//! `StandardResponse`, per §4.1.

use chrono::Utc;
use llm_gateway_core::{Choice, FinishReason, Message, StandardResponse, Usage};
use serde_json::Value;
use uuid::Uuid;

use crate::error::AdapterResult;
use crate::types::VendorShape;

pub fn parse_response(shape: VendorShape, model: &str, raw: &Value) -> AdapterResult<StandardResponse> {
    match shape {
        VendorShape::OpenAi | VendorShape::Custom => parse_openai(model, raw),
        VendorShape::Anthropic => parse_anthropic(model, raw),
        VendorShape::Gemini => parse_gemini(model, raw),
        VendorShape::Qwen | VendorShape::QwenOfficial => parse_qwen(model, raw),
        VendorShape::Spark => parse_spark(model, raw),
        VendorShape::OllamaNative => parse_ollama(model, raw),
    }
}

fn now() -> i64 {
    Utc::now().timestamp()
}

fn new_id() -> String {
    format!("chatcmpl-{}", Uuid::new_v4())
}

fn parse_finish_reason(tag: Option<&str>) -> FinishReason {
    match tag.unwrap_or("stop").to_lowercase().as_str() {
        "length" | "max_tokens" => FinishReason::Length,
        "content_filter" | "safety" => FinishReason::ContentFilter,
        "error" => FinishReason::Error,
        _ => FinishReason::Stop,
    }
}

fn usage_from(prompt: u64, completion: u64) -> Usage {
    Usage { prompt_tokens: prompt, completion_tokens: completion, total_tokens: prompt + completion }
}

fn parse_openai(model: &str, raw: &Value) -> AdapterResult<StandardResponse> {
    let choice = raw
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first());

    let choices = match choice {
        None => vec![],
        Some(c) => {
            let content = c
                .pointer("/message/content")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            let finish = c.get("finish_reason").and_then(|v| v.as_str());
            vec![Choice {
                index: 0,
                message: Message::assistant(content),
                finish_reason: parse_finish_reason(finish),
            }]
        }
    };

    let usage = raw
        .get("usage")
        .map(|u| Usage {
            prompt_tokens: u.get("prompt_tokens").and_then(Value::as_u64).unwrap_or(0),
            completion_tokens: u.get("completion_tokens").and_then(Value::as_u64).unwrap_or(0),
            total_tokens: u.get("total_tokens").and_then(Value::as_u64).unwrap_or(0),
        })
        .unwrap_or_default();

    Ok(StandardResponse {
        id: raw.get("id").and_then(Value::as_str).map(str::to_string).unwrap_or_else(new_id),
        object: "chat.completion".to_string(),
        created: raw.get("created").and_then(Value::as_i64).unwrap_or_else(now),
        model: raw.get("model").and_then(Value::as_str).unwrap_or(model).to_string(),
        choices,
        usage,
    })
}

fn parse_anthropic(model: &str, raw: &Value) -> AdapterResult<StandardResponse> {
    let content = raw
        .get("content")
        .and_then(Value::as_array)
        .map(|blocks| {
            blocks
                .iter()
                .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
                .filter_map(|b| b.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let finish = raw.get("stop_reason").and_then(Value::as_str);
    let finish_reason = match finish {
        Some("max_tokens") => FinishReason::Length,
        Some("stop_sequence") | Some("end_turn") | None => FinishReason::Stop,
        _ => FinishReason::Stop,
    };

    let prompt_tokens = raw.pointer("/usage/input_tokens").and_then(Value::as_u64).unwrap_or(0);
    let completion_tokens = raw.pointer("/usage/output_tokens").and_then(Value::as_u64).unwrap_or(0);

    Ok(StandardResponse {
        id: raw.get("id").and_then(Value::as_str).map(str::to_string).unwrap_or_else(new_id),
        object: "chat.completion".to_string(),
        created: now(),
        model: raw.get("model").and_then(Value::as_str).unwrap_or(model).to_string(),
        choices: vec![Choice { index: 0, message: Message::assistant(content), finish_reason }],
        usage: usage_from(prompt_tokens, completion_tokens),
    })
}

fn parse_gemini(model: &str, raw: &Value) -> AdapterResult<StandardResponse> {
    let candidates = raw.get("candidates").and_then(Value::as_array);

    let choices = match candidates.and_then(|c| c.first()) {
        None => vec![],
        Some(candidate) => {
            let text = candidate
                .pointer("/content/parts/0/text")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let finish = candidate.get("finishReason").and_then(Value::as_str).map(str::to_lowercase);
            vec![Choice {
                index: 0,
                message: Message::assistant(text),
                finish_reason: parse_finish_reason(finish.as_deref()),
            }]
        }
    };

    let prompt_tokens = raw.pointer("/usageMetadata/promptTokenCount").and_then(Value::as_u64).unwrap_or(0);
    let completion_tokens = raw.pointer("/usageMetadata/candidatesTokenCount").and_then(Value::as_u64).unwrap_or(0);
    let total_tokens = raw
        .pointer("/usageMetadata/totalTokenCount")
        .and_then(Value::as_u64)
        .unwrap_or(prompt_tokens + completion_tokens);

    Ok(StandardResponse {
        id: new_id(),
        object: "chat.completion".to_string(),
        created: now(),
        model: model.to_string(),
        choices,
        usage: Usage { prompt_tokens, completion_tokens, total_tokens },
    })
}

fn parse_qwen(model: &str, raw: &Value) -> AdapterResult<StandardResponse> {
    let message = raw.pointer("/output/choices/0/message");
    let content = message.and_then(|m| m.get("content")).and_then(Value::as_str).unwrap_or_default();
    let finish = message.and_then(|m| m.get("finish_reason")).and_then(Value::as_str);

    let prompt_tokens = raw.pointer("/usage/input_tokens").and_then(Value::as_u64).unwrap_or(0);
    let completion_tokens = raw.pointer("/usage/output_tokens").and_then(Value::as_u64).unwrap_or(0);
    let total_tokens = raw
        .pointer("/usage/total_tokens")
        .and_then(Value::as_u64)
        .unwrap_or(prompt_tokens + completion_tokens);

    let choices = if message.is_some() {
        vec![Choice { index: 0, message: Message::assistant(content), finish_reason: parse_finish_reason(finish) }]
    } else {
        vec![]
    };

    Ok(StandardResponse {
        id: raw.get("request_id").and_then(Value::as_str).map(str::to_string).unwrap_or_else(new_id),
        object: "chat.completion".to_string(),
        created: now(),
        model: model.to_string(),
        choices,
        usage: Usage { prompt_tokens, completion_tokens, total_tokens },
    })
}

fn parse_spark(model: &str, raw: &Value) -> AdapterResult<StandardResponse> {
    let content = raw
        .pointer("/payload/choices/text/0/content")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let id = raw.pointer("/header/sid").and_then(Value::as_str).map(str::to_string).unwrap_or_else(new_id);
    let model_name = raw.pointer("/header/skill/name").and_then(Value::as_str).unwrap_or(model).to_string();

    Ok(StandardResponse {
        id,
        object: "chat.completion".to_string(),
        created: now(),
        model: model_name,
        choices: vec![Choice { index: 0, message: Message::assistant(content), finish_reason: FinishReason::Stop }],
        usage: Usage::default(),
    })
}

fn parse_ollama(model: &str, raw: &Value) -> AdapterResult<StandardResponse> {
    let content = raw.pointer("/message/content").and_then(Value::as_str).unwrap_or_default();
    let done = raw.get("done").and_then(Value::as_bool).unwrap_or(true);
    let finish_reason = if done { FinishReason::Stop } else { FinishReason::Length };

    let prompt_tokens = raw.get("prompt_eval_count").and_then(Value::as_u64).unwrap_or(0);
    let completion_tokens = raw.get("eval_count").and_then(Value::as_u64).unwrap_or(0);

    Ok(StandardResponse {
        id: new_id(),
        object: "chat.completion".to_string(),
        created: now(),
        model: raw.get("model").and_then(Value::as_str).unwrap_or(model).to_string(),
        choices: vec![Choice { index: 0, message: Message::assistant(content), finish_reason }],
        usage: usage_from(prompt_tokens, completion_tokens),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gemini_parse_matches_scenario_in_spec() {
        let raw = json!({
            "candidates": [{
                "content": {"parts": [{"text": "hello"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 1, "totalTokenCount": 4}
        });
        let resp = parse_gemini("gemini-1.5-pro", &raw).unwrap();
        assert_eq!(resp.choices[0].message.content, "hello");
        assert_eq!(resp.choices[0].finish_reason, FinishReason::Stop);
        assert_eq!(resp.usage, Usage { prompt_tokens: 3, completion_tokens: 1, total_tokens: 4 });
    }

    #[test]
    fn gemini_parse_handles_empty_candidates() {
        let raw = json!({"candidates": []});
        let resp = parse_gemini("gemini-1.5-pro", &raw).unwrap();
        assert!(resp.choices.is_empty());
    }

    #[test]
    fn anthropic_parse_concatenates_text_blocks() {
        let raw = json!({
            "id": "msg_1",
            "content": [{"type": "text", "text": "hel"}, {"type": "image", "text": "ignored"}, {"type": "text", "text": "lo"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 5, "output_tokens": 2}
        });
        let resp = parse_anthropic("claude-3", &raw).unwrap();
        assert_eq!(resp.choices[0].message.content, "hello");
        assert_eq!(resp.usage.total_tokens, 7);
    }

    #[test]
    fn openai_parse_defaults_usage_and_created_when_absent() {
        let raw = json!({"choices": [{"message": {"role":"assistant","content":"hi"}, "finish_reason":"stop"}]});
        let resp = parse_openai("gpt-4o", &raw).unwrap();
        assert_eq!(resp.choices[0].message.content, "hi");
        assert_eq!(resp.usage, Usage::default());
        assert!(resp.created > 0);
    }

    #[test]
    fn ollama_parse_reads_native_usage_fields() {
        let raw = json!({
            "message": {"role": "assistant", "content": "done"},
            "done": true,
            "prompt_eval_count": 10,
            "eval_count": 4
        });
        let resp = parse_ollama("llama3", &raw).unwrap();
        assert_eq!(resp.choices[0].message.content, "done");
        assert_eq!(resp.usage.prompt_tokens, 10);
        assert_eq!(resp.usage.completion_tokens, 4);
    }

    /// Invariant 5 (§8): for every shape the registry can parse, a mock
    /// upstream echoing a canonical response yields a `StandardResponse`
    /// whose `choices[0].message.content` matches the echoed content.
    fn mock_upstream_echo(shape: VendorShape, content: &str) -> Value {
        match shape {
            VendorShape::OpenAi | VendorShape::Custom => json!({
                "id": "cmpl-1",
                "choices": [{"message": {"role": "assistant", "content": content}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2},
            }),
            VendorShape::Anthropic => json!({
                "id": "msg_1",
                "content": [{"type": "text", "text": content}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 1, "output_tokens": 1},
            }),
            VendorShape::Gemini => json!({
                "candidates": [{"content": {"parts": [{"text": content}]}, "finishReason": "STOP"}],
                "usageMetadata": {"promptTokenCount": 1, "candidatesTokenCount": 1, "totalTokenCount": 2},
            }),
            VendorShape::Qwen | VendorShape::QwenOfficial => json!({
                "request_id": "req-1",
                "output": {"choices": [{"message": {"role": "assistant", "content": content}, "finish_reason": "stop"}]},
                "usage": {"input_tokens": 1, "output_tokens": 1, "total_tokens": 2},
            }),
            VendorShape::Spark => json!({
                "header": {"sid": "sid-1"},
                "payload": {"choices": {"text": [{"content": content}]}},
            }),
            VendorShape::OllamaNative => json!({
                "model": "llama3",
                "message": {"role": "assistant", "content": content},
                "done": true,
                "prompt_eval_count": 1,
                "eval_count": 1,
            }),
        }
    }

    #[test]
    fn every_shape_round_trips_echoed_content() {
        let shapes = [
            VendorShape::OpenAi,
            VendorShape::Anthropic,
            VendorShape::Gemini,
            VendorShape::Qwen,
            VendorShape::QwenOfficial,
            VendorShape::Spark,
            VendorShape::OllamaNative,
            VendorShape::Custom,
        ];
        for shape in shapes {
            let raw = mock_upstream_echo(shape, "hello-from-upstream");
            let resp = parse_response(shape, "probe-model", &raw).expect("parses");
            assert_eq!(
                resp.choices[0].message.content, "hello-from-upstream",
                "shape {shape:?} did not round-trip the echoed content"
            );
        }
    }
}
