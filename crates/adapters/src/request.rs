//! Request builders: translate a `StandardRequest` into each vendor's wire
//! body, per §4.1.

use llm_gateway_core::{Role, StandardRequest};
use serde_json::{json, Value};

use crate::registry::ResolvedAdapter;
use crate::types::VendorShape;

const DEFAULT_CLAUDE_MAX_TOKENS: u64 = 4096;

/// Builds the outgoing body for `resolved.shape`, merging in any
/// operator-configured default `params` from the `ModelRecord` first so
/// they survive vendor-specific key renaming (SPEC_FULL §4.1 supplement).
pub fn build_request(resolved: &ResolvedAdapter, req: &StandardRequest, params: &Value) -> Value {
    let mut body = match resolved.shape {
        VendorShape::OpenAi | VendorShape::Custom => build_openai(req),
        VendorShape::Anthropic => build_anthropic(req),
        VendorShape::Gemini => build_gemini(req),
        VendorShape::Qwen => build_qwen(req, false),
        VendorShape::QwenOfficial => build_qwen(req, true),
        VendorShape::Spark => build_spark(req),
        VendorShape::OllamaNative => build_ollama(req),
    };
    merge_params(&mut body, params);
    body
}

fn merge_params(body: &mut Value, params: &Value) {
    let Some(defaults) = params.as_object() else { return };
    let Some(body_obj) = body.as_object_mut() else { return };
    for (k, v) in defaults {
        body_obj.entry(k.clone()).or_insert_with(|| v.clone());
    }
}

fn build_openai(req: &StandardRequest) -> Value {
    let mut body = json!({
        "model": req.model.clone().unwrap_or_default(),
        "messages": req.messages.iter().map(message_json).collect::<Vec<_>>(),
    });
    set_opt(&mut body, "temperature", req.temperature);
    set_opt(&mut body, "max_tokens", req.max_tokens);
    set_opt(&mut body, "top_p", req.top_p);
    if let Some(stop) = req.stop.clone() {
        body["stop"] = json!(stop.into_vec());
    }
    if let Some(stream) = req.stream {
        body["stream"] = json!(stream);
    }
    body
}

fn build_anthropic(req: &StandardRequest) -> Value {
    let (system, rest) = req.split_system();
    let mut body = json!({
        "model": req.model.clone().unwrap_or_default(),
        "messages": rest.iter().map(|m| message_json(m)).collect::<Vec<_>>(),
        "max_tokens": req.max_tokens.unwrap_or(DEFAULT_CLAUDE_MAX_TOKENS as u32),
    });
    if let Some(system) = system {
        body["system"] = json!(system);
    }
    set_opt(&mut body, "temperature", req.temperature);
    set_opt(&mut body, "top_p", req.top_p);
    if let Some(stop) = req.stop.clone() {
        body["stop_sequences"] = json!(stop.into_vec());
    }
    if let Some(stream) = req.stream {
        body["stream"] = json!(stream);
    }
    body
}

fn build_gemini(req: &StandardRequest) -> Value {
    let (system, rest) = req.split_system();
    let contents: Vec<Value> = rest
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::Assistant => "model",
                _ => "user",
            };
            json!({ "role": role, "parts": [{"text": m.content}] })
        })
        .collect();

    let mut generation_config = serde_json::Map::new();
    if let Some(mt) = req.max_tokens {
        generation_config.insert("maxOutputTokens".into(), json!(mt));
    }
    if let Some(tp) = req.top_p {
        generation_config.insert("topP".into(), json!(tp));
    }
    if let Some(tk) = req.top_k {
        generation_config.insert("topK".into(), json!(tk));
    }
    if let Some(temp) = req.temperature {
        generation_config.insert("temperature".into(), json!(temp));
    }
    if let Some(stop) = req.stop.clone() {
        generation_config.insert("stopSequences".into(), json!(stop.into_vec()));
    }

    let mut body = json!({ "contents": contents });
    if let Some(system) = system {
        body["systemInstruction"] = json!({ "parts": [{"text": system}] });
    }
    if !generation_config.is_empty() {
        body["generationConfig"] = Value::Object(generation_config);
    }
    body
}

fn build_qwen(req: &StandardRequest, official: bool) -> Value {
    let max_tokens_key = if official { "max_output_tokens" } else { "max_tokens" };
    let mut parameters = serde_json::Map::new();
    parameters.insert("result_format".into(), json!("message"));
    parameters.insert(max_tokens_key.to_string(), json!(req.max_tokens.unwrap_or(1500)));
    parameters.insert("temperature".into(), json!(req.temperature.unwrap_or(0.7)));
    parameters.insert("top_p".into(), json!(req.top_p.unwrap_or(0.8)));

    json!({
        "model": req.model.clone().unwrap_or_default(),
        "input": { "messages": req.messages.iter().map(message_json).collect::<Vec<_>>() },
        "parameters": Value::Object(parameters),
    })
}

fn build_spark(req: &StandardRequest) -> Value {
    let domain = req.model.clone().unwrap_or_else(|| "generalv3.5".to_string());
    json!({
        "header": { "app_id": "", "uid": "gateway-user" },
        "parameter": {
            "chat": {
                "domain": domain,
                "temperature": req.temperature.unwrap_or(0.5),
                "max_tokens": req.max_tokens.unwrap_or(2048),
                "top_k": 4,
            }
        },
        "payload": {
            "message": {
                "text": req.messages.iter().map(message_json).collect::<Vec<_>>()
            }
        }
    })
}

fn build_ollama(req: &StandardRequest) -> Value {
    let (system, rest) = req.split_system();
    let mut messages: Vec<Value> = Vec::with_capacity(rest.len() + 1);
    if let Some(system) = system {
        messages.push(json!({ "role": "user", "content": format!("System: {system}") }));
    }
    for m in &rest {
        let role = match m.role {
            Role::Assistant => "assistant",
            _ => "user",
        };
        messages.push(json!({ "role": role, "content": m.content }));
    }

    let mut options = serde_json::Map::new();
    if let Some(t) = req.temperature {
        options.insert("temperature".into(), json!(t));
    }
    if let Some(mt) = req.max_tokens {
        options.insert("num_predict".into(), json!(mt));
    }
    if let Some(tp) = req.top_p {
        options.insert("top_p".into(), json!(tp));
    }
    if let Some(stop) = req.stop.clone() {
        options.insert("stop".into(), json!(stop.into_vec()));
    }

    let mut body = json!({
        "model": req.model.clone().unwrap_or_default(),
        "messages": messages,
        "stream": req.stream.unwrap_or(false),
    });
    if !options.is_empty() {
        body["options"] = Value::Object(options);
    }
    body
}

fn message_json(m: &llm_gateway_core::Message) -> Value {
    let role = match m.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    };
    json!({ "role": role, "content": m.content })
}

fn set_opt<T: Into<Value>>(body: &mut Value, key: &str, value: Option<T>) {
    if let Some(v) = value {
        body[key] = v.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_gateway_core::Message;

    fn req(messages: Vec<Message>) -> StandardRequest {
        StandardRequest {
            model: Some("m".into()),
            messages,
            temperature: None,
            max_tokens: None,
            top_p: None,
            top_k: None,
            stop: None,
            stream: None,
        }
    }

    #[test]
    fn claude_translation_extracts_system_and_defaults_max_tokens() {
        let r = req(vec![Message::system("be terse"), Message::user("hi")]);
        let body = build_anthropic(&r);
        assert_eq!(body["system"], json!("be terse"));
        assert_eq!(body["messages"][0]["role"], json!("user"));
        assert_eq!(body["max_tokens"], json!(4096));
    }

    #[test]
    fn gemini_translation_renames_knobs_and_roles() {
        let mut r = req(vec![Message::system("sys"), Message::user("hi"), Message::assistant("yo")]);
        r.max_tokens = Some(100);
        r.top_p = Some(0.9);
        let body = build_gemini(&r);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], json!("sys"));
        assert_eq!(body["contents"][1]["role"], json!("model"));
        assert_eq!(body["generationConfig"]["maxOutputTokens"], json!(100));
        assert_eq!(body["generationConfig"]["topP"], json!(0.9));
    }

    #[test]
    fn ollama_translation_prefixes_system_into_user_message() {
        let r = req(vec![Message::system("sys"), Message::user("hi")]);
        let body = build_ollama(&r);
        assert_eq!(body["messages"][0]["content"], json!("System: sys"));
        assert_eq!(body["messages"][1]["content"], json!("hi"));
    }

    #[test]
    fn params_defaults_merge_without_overwriting_explicit_fields() {
        let r = req(vec![Message::user("hi")]);
        let params = json!({ "temperature": 0.42, "safety_settings": "strict" });
        let body = build_request(
            &ResolvedAdapter {
                shape: VendorShape::OpenAi,
                api_base: String::new(),
                api_path: String::new(),
                auth_header: "Authorization",
                auth_format: "Bearer",
                stream_support: true,
            },
            &r,
            &params,
        );
        assert_eq!(body["safety_settings"], json!("strict"));
        assert_eq!(body["temperature"], json!(0.42));
    }
}
