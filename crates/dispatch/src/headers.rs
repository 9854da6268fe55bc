//! Shared request-header assembly (§4.2 step 4), used by both the Dispatch
//! Engine (real calls) and the Connectivity Probe (test calls) so the two
//! paths can never drift — a probe must see the same headers a real
//! dispatch attempt would send, including vendor-specific extras like
//! Anthropic's `anthropic-version`.

use std::collections::HashMap;

use llm_gateway_adapters::{ResolvedAdapter, VendorShape};
use llm_gateway_core::ModelRecord;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Builds the header set for one outgoing call to `resolved`'s upstream,
/// authenticated with `record.api_key`.
pub fn build_headers(record: &ModelRecord, resolved: &ResolvedAdapter) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers.insert("Accept".to_string(), "application/json".to_string());

    if !resolved.auth_header.is_empty() {
        headers.insert(resolved.auth_header.to_string(), resolved.auth_value(&record.api_key));
    }

    if matches!(resolved.shape, VendorShape::Anthropic) {
        headers.insert("anthropic-version".to_string(), ANTHROPIC_VERSION.to_string());
        headers.insert("anthropic-dangerous-direct-browser-access".to_string(), "true".to_string());
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use llm_gateway_core::{ConnectStatus, ModelStatus, QuotaStatus};
    use serde_json::Value;

    fn record() -> ModelRecord {
        ModelRecord {
            id: 1,
            vendor: "claude".to_string(),
            model_name: "claude-sonnet-4-20250514".to_string(),
            api_base: "https://api.anthropic.com".to_string(),
            api_path: None,
            api_spec: None,
            api_key: "sk-ant-test".to_string(),
            params: Value::Null,
            priority: 1,
            status: ModelStatus::Enabled,
            connect_status: ConnectStatus::Reachable,
            quota_status: QuotaStatus::Sufficient,
            create_time: Utc::now(),
            update_time: Utc::now(),
        }
    }

    #[test]
    fn anthropic_headers_carry_version_and_direct_browser_access() {
        let resolved = ResolvedAdapter {
            shape: VendorShape::Anthropic,
            api_base: "https://api.anthropic.com".to_string(),
            api_path: "/v1/messages".to_string(),
            auth_header: "x-api-key",
            auth_format: "",
            stream_support: true,
        };
        let headers = build_headers(&record(), &resolved);
        assert_eq!(headers.get("anthropic-version").map(String::as_str), Some("2023-06-01"));
        assert_eq!(headers.get("anthropic-dangerous-direct-browser-access").map(String::as_str), Some("true"));
        assert_eq!(headers.get("x-api-key").map(String::as_str), Some("sk-ant-test"));
    }

    #[test]
    fn non_anthropic_headers_omit_anthropic_extras() {
        let resolved = ResolvedAdapter {
            shape: VendorShape::OpenAi,
            api_base: "https://api.openai.com".to_string(),
            api_path: "/v1/chat/completions".to_string(),
            auth_header: "Authorization",
            auth_format: "Bearer",
            stream_support: true,
        };
        let headers = build_headers(&record(), &resolved);
        assert!(headers.get("anthropic-version").is_none());
        assert_eq!(headers.get("Authorization").map(String::as_str), Some("Bearer sk-ant-test"));
    }
}
