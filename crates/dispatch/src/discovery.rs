//! Upstream Model Discovery: lists the models a given vendor credential can
//! see (§4.5).

use std::sync::Arc;
use std::time::Duration;

use llm_gateway_client::UpstreamClient;
use serde::Serialize;
use serde_json::Value;

const DISCOVERY_TIMEOUT_SECS: u64 = 15;
const FAMILY_TOKENS: &[&str] = &["gpt", "claude", "qwen", "glm", "llama", "mistral", "gemini"];

#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredModel {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryResult {
    pub success: bool,
    pub message: String,
    pub models: Vec<DiscoveredModel>,
}

pub struct ModelDiscovery {
    client: Arc<UpstreamClient>,
}

impl ModelDiscovery {
    pub fn new(client: Arc<UpstreamClient>) -> Self {
        Self { client }
    }

    pub async fn list_available(&self, vendor: &str, api_base: &str, api_key: &str) -> DiscoveryResult {
        match vendor {
            "openai" | "zhipu" | "hunyuan" | "doubao" | "mistral" | "perplexity" | "groq" | "localai" | "lmstudio"
            | "vllm" | "minimax" | "deepseek" | "moonshot" | "stepfun" | "qwen" => {
                self.fetch_openai_compatible(api_base, api_key).await
            }
            "gemini" => self.fetch_gemini(api_base, api_key).await,
            "ollama" => self.fetch_ollama(api_base).await,
            other => builtin_models(other),
        }
    }

    async fn fetch_openai_compatible(&self, api_base: &str, api_key: &str) -> DiscoveryResult {
        let base = api_base.trim_end_matches('/');
        let url = if base.ends_with("/v1") { format!("{base}/models") } else { format!("{base}/v1/models") };

        let mut headers = std::collections::HashMap::new();
        headers.insert("Authorization".to_string(), format!("Bearer {api_key}"));

        match self.client.get_json(&url, &headers, Duration::from_secs(DISCOVERY_TIMEOUT_SECS)).await {
            Ok((status, bytes)) if status.is_success() => match serde_json::from_slice::<Value>(&bytes) {
                Ok(body) => models_from_data_array(&body),
                Err(_) => builtin_models("openai"),
            },
            _ => builtin_models("openai"),
        }
    }

    async fn fetch_gemini(&self, api_base: &str, api_key: &str) -> DiscoveryResult {
        let base = api_base.trim_end_matches('/');
        let url = format!("{base}/v1beta/models?key={api_key}");

        match self.client.get_json(&url, &std::collections::HashMap::new(), Duration::from_secs(DISCOVERY_TIMEOUT_SECS)).await {
            Ok((status, bytes)) if status.is_success() => match serde_json::from_slice::<Value>(&bytes) {
                Ok(body) => models_from_gemini(&body),
                Err(_) => builtin_models("gemini"),
            },
            _ => builtin_models("gemini"),
        }
    }

    async fn fetch_ollama(&self, api_base: &str) -> DiscoveryResult {
        let host = api_base
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .split('/')
            .next()
            .unwrap_or("localhost:11434");
        let url = format!("http://{host}/api/tags");

        match self.client.get_json(&url, &std::collections::HashMap::new(), Duration::from_secs(DISCOVERY_TIMEOUT_SECS)).await {
            Ok((status, bytes)) if status.is_success() => match serde_json::from_slice::<Value>(&bytes) {
                Ok(body) => models_from_ollama_tags(&body),
                Err(_) => builtin_models("ollama"),
            },
            _ => builtin_models("ollama"),
        }
    }
}

/// Parses an OpenAI-shaped `{"data": [{"id": "..."}]}` model listing,
/// keeping only ids that match a known model-family token (§4.5).
fn models_from_data_array(body: &Value) -> DiscoveryResult {
    let models: Vec<DiscoveredModel> = body
        .get("data")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| e.get("id").and_then(Value::as_str))
                .filter(|id| matches_known_family(id))
                .map(|id| DiscoveredModel { id: id.to_string(), name: id.to_string(), description: String::new() })
                .collect()
        })
        .unwrap_or_default();
    DiscoveryResult { success: true, message: "listed models".to_string(), models }
}

fn models_from_gemini(body: &Value) -> DiscoveryResult {
    let models: Vec<DiscoveredModel> = body
        .get("models")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| e.get("name").and_then(Value::as_str))
                .map(|n| n.trim_start_matches("models/").to_string())
                .filter(|id| matches_known_family(id))
                .map(|id| DiscoveredModel { name: id.clone(), id, description: String::new() })
                .collect()
        })
        .unwrap_or_default();
    DiscoveryResult { success: true, message: "listed models".to_string(), models }
}

fn models_from_ollama_tags(body: &Value) -> DiscoveryResult {
    let models: Vec<DiscoveredModel> = body
        .get("models")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| e.get("name").and_then(Value::as_str))
                .map(|n| DiscoveredModel { id: n.to_string(), name: n.to_string(), description: String::new() })
                .collect()
        })
        .unwrap_or_default();
    DiscoveryResult { success: true, message: "listed models".to_string(), models }
}

pub fn matches_known_family(model_id: &str) -> bool {
    let lower = model_id.to_lowercase();
    FAMILY_TOKENS.iter().any(|t| lower.contains(t))
}

/// The static built-in fallback list per vendor, grounded in
/// `_get_builtin_models` from the original source.
fn builtin_models(vendor: &str) -> DiscoveryResult {
    let list: &[(&str, &str)] = match vendor {
        "openai" => &[("gpt-3.5-turbo", ""), ("gpt-4", ""), ("gpt-4o", "")],
        "qwen" | "qwen_official" => &[("qwen-turbo", ""), ("qwen-plus", ""), ("qwen-max", "")],
        "zhipu" => &[("glm-4", ""), ("glm-4v", ""), ("glm-3-turbo", "")],
        "spark" => &[("spark-v3.1", ""), ("spark-v3.5", "")],
        "doubao" => &[("Doubao-pro-32k", ""), ("Doubao-pro-128k", "")],
        "claude" => &[
            ("claude-sonnet-4-20250514", ""),
            ("claude-opus-4-20250514", ""),
            ("claude-haiku-3-20250514", ""),
        ],
        "gemini" => &[("gemini-1.5-pro", ""), ("gemini-1.5-flash", ""), ("gemini-pro", "")],
        "mistral" => &[("mistral-large-latest", ""), ("mistral-medium-latest", ""), ("mistral-small-latest", "")],
        "groq" => &[("llama3-70b-8192", ""), ("llama3-8b-8192", ""), ("mixtral-8x7b-32768", "")],
        "ollama" => &[("llama3", ""), ("llama3.1", ""), ("qwen2", ""), ("mistral", "")],
        "localai" | "lmstudio" | "vllm" => &[("local-model", "")],
        _ => &[],
    };

    DiscoveryResult {
        success: true,
        message: "built-in model list".to_string(),
        models: list
            .iter()
            .map(|(id, desc)| DiscoveredModel { id: id.to_string(), name: id.to_string(), description: desc.to_string() })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_token_filter_matches_spec_keyword_list() {
        assert!(matches_known_family("gpt-4o"));
        assert!(matches_known_family("claude-3-opus"));
        assert!(matches_known_family("glm-4"));
        assert!(!matches_known_family("totally-unrelated-model"));
    }

    #[test]
    fn data_array_filters_out_unknown_families() {
        let body = serde_json::json!({"data": [{"id": "gpt-4o"}, {"id": "text-embedding-3-small"}, {"id": "claude-3"}]});
        let result = models_from_data_array(&body);
        let ids: Vec<_> = result.models.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["gpt-4o", "claude-3"]);
    }

    #[test]
    fn gemini_models_strip_the_models_prefix() {
        let body = serde_json::json!({"models": [{"name": "models/gemini-1.5-pro"}]});
        let result = models_from_gemini(&body);
        assert_eq!(result.models[0].id, "gemini-1.5-pro");
    }

    #[test]
    fn ollama_tags_pass_through_local_names() {
        let body = serde_json::json!({"models": [{"name": "llama3:latest"}]});
        let result = models_from_ollama_tags(&body);
        assert_eq!(result.models[0].id, "llama3:latest");
    }

    #[test]
    fn builtin_models_nonempty_for_known_vendors() {
        assert!(!builtin_models("claude").models.is_empty());
        assert!(!builtin_models("ollama").models.is_empty());
        assert!(builtin_models("nonexistent-vendor").models.is_empty());
    }
}
