//! Test-request builders: a minimal body used by the Connectivity Probe
//! (§4.1, §4.4).

use serde_json::{json, Value};

use crate::types::VendorShape;

/// Builds a minimal probe body for `shape`. `model` is the configurable
/// test model id (see `llm_gateway_config::DispatchConfig::claude_test_model`
/// for the Anthropic case, which the original hard-codes and this gateway
/// does not).
pub fn build_test_request(shape: VendorShape, model: &str) -> Value {
    match shape {
        VendorShape::Anthropic => json!({
            "model": model,
            "max_tokens": 10,
            "messages": [{"role": "user", "content": "Hi"}],
        }),
        VendorShape::OllamaNative => json!({
            "model": model,
            "messages": [{"role": "user", "content": "Hi"}],
            "options": {"num_predict": 10},
        }),
        VendorShape::Gemini => json!({
            "contents": [{"role": "user", "parts": [{"text": "Hi"}]}],
            "generationConfig": {"maxOutputTokens": 10},
        }),
        VendorShape::Qwen | VendorShape::QwenOfficial => json!({
            "model": model,
            "input": {"messages": [{"role": "user", "content": "Hi"}]},
            "parameters": {"result_format": "message", "max_tokens": 10},
        }),
        VendorShape::Spark => json!({
            "header": {"app_id": "", "uid": "gateway-probe"},
            "parameter": {"chat": {"domain": model, "max_tokens": 10}},
            "payload": {"message": {"text": [{"role": "user", "content": "Hi"}]}},
        }),
        VendorShape::OpenAi | VendorShape::Custom => json!({
            "model": model,
            "messages": [{"role": "user", "content": "Hi"}],
            "max_tokens": 10,
        }),
    }
}

/// Default probe model id per vendor shape, used when the record doesn't
/// specify `model_name` (the original defaults to "llama3.2" for ollama,
/// "gpt-3.5-turbo" otherwise).
pub fn default_test_model(shape: VendorShape) -> &'static str {
    match shape {
        VendorShape::OllamaNative => "llama3.2",
        _ => "gpt-3.5-turbo",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anthropic_test_request_has_top_level_max_tokens() {
        let body = build_test_request(VendorShape::Anthropic, "claude-sonnet-4-20250514");
        assert_eq!(body["max_tokens"], json!(10));
        assert!(body.get("parameters").is_none());
    }

    #[test]
    fn ollama_default_model_is_llama() {
        assert_eq!(default_test_model(VendorShape::OllamaNative), "llama3.2");
        assert_eq!(default_test_model(VendorShape::OpenAi), "gpt-3.5-turbo");
    }
}
