//! `AdapterRegistry`: `get(vendor_tag)`, `list_known()`, and the resolution
//! rule that lets `api_spec` win over `vendor` when both are present and
//! `api_spec` is recognized (§4.1, §9).

use std::collections::HashMap;

use llm_gateway_core::ModelRecord;
use once_cell::sync::Lazy;

use crate::error::{AdapterError, AdapterResult};
use crate::table::VENDOR_TABLE;
use crate::types::{ApiSpec, VendorAdapter, VendorShape};

static BY_VENDOR: Lazy<HashMap<&'static str, &'static VendorAdapter>> =
    Lazy::new(|| VENDOR_TABLE.iter().map(|a| (a.vendor, a)).collect());

/// A read-only, process-lifetime registry of vendor adapters (§3: "the
/// Registry exclusively owns the adapter objects ... read-only after
/// construction"). Any number of readers may access it concurrently
/// without locking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdapterRegistry;

/// The fully-resolved translation context for one `ModelRecord`: which
/// shape to build/parse with, and the concrete auth/url parameters.
#[derive(Debug, Clone)]
pub struct ResolvedAdapter {
    pub shape: VendorShape,
    pub api_base: String,
    pub api_path: String,
    pub auth_header: &'static str,
    pub auth_format: &'static str,
    pub stream_support: bool,
}

impl ResolvedAdapter {
    pub fn auth_value(&self, api_key: &str) -> String {
        if self.auth_format.is_empty() {
            api_key.to_string()
        } else {
            format!("{} {}", self.auth_format, api_key)
        }
    }
}

impl AdapterRegistry {
    pub fn get(&self, vendor_tag: &str) -> Option<&'static VendorAdapter> {
        BY_VENDOR.get(vendor_tag).copied()
    }

    pub fn list_known(&self) -> Vec<&'static str> {
        VENDOR_TABLE.iter().map(|a| a.vendor).collect()
    }

    /// Resolves the adapter for a `ModelRecord`: `api_spec` wins over
    /// `vendor` when present and recognized (§4.1, §9); otherwise falls
    /// back to the vendor tag, and fails only if neither resolves.
    pub fn resolve(&self, record: &ModelRecord) -> AdapterResult<ResolvedAdapter> {
        if let Some(spec_tag) = record.api_spec.as_deref() {
            if let Some(spec) = ApiSpec::parse(spec_tag) {
                let base = self.get(&record.vendor);
                return Ok(self.build_resolved(VendorShape::from(spec), record, base));
            }
        }

        let adapter = self
            .get(&record.vendor)
            .ok_or_else(|| AdapterError::UnknownVendor(record.vendor.clone()))?;
        Ok(self.build_resolved(adapter.shape, record, Some(adapter)))
    }

    fn build_resolved(
        &self,
        shape: VendorShape,
        record: &ModelRecord,
        base_adapter: Option<&'static VendorAdapter>,
    ) -> ResolvedAdapter {
        let (default_base, default_path, auth_header, auth_format, stream_support) = match base_adapter {
            Some(a) => (a.default_api_base, a.default_api_path, a.auth_header, a.auth_format, a.stream_support),
            None => ("", "/v1/chat/completions", "Authorization", "Bearer", true),
        };

        let api_base = if record.api_base.is_empty() {
            default_base.to_string()
        } else {
            record.api_base.clone()
        };
        let api_path = record.api_path.clone().unwrap_or_else(|| default_path.to_string());

        ResolvedAdapter { shape, api_base, api_path, auth_header, auth_format, stream_support }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use llm_gateway_core::{ConnectStatus, ModelStatus, QuotaStatus};
    use serde_json::Value;

    fn record(vendor: &str, api_spec: Option<&str>) -> ModelRecord {
        ModelRecord {
            id: 1,
            vendor: vendor.to_string(),
            model_name: "m".to_string(),
            api_base: String::new(),
            api_path: None,
            api_spec: api_spec.map(str::to_string),
            api_key: "k".to_string(),
            params: Value::Null,
            priority: 10,
            status: ModelStatus::Enabled,
            connect_status: ConnectStatus::Reachable,
            quota_status: QuotaStatus::Sufficient,
            create_time: Utc::now(),
            update_time: Utc::now(),
        }
    }

    #[test]
    fn api_spec_wins_over_vendor_when_recognized() {
        let registry = AdapterRegistry;
        // vendor=custom but api_spec=openai: per §9, api_spec wins.
        let resolved = registry.resolve(&record("custom", Some("openai"))).unwrap();
        assert_eq!(resolved.shape, VendorShape::OpenAi);
    }

    #[test]
    fn unrecognized_api_spec_falls_back_to_vendor() {
        let registry = AdapterRegistry;
        let resolved = registry.resolve(&record("claude", Some("not-a-real-spec"))).unwrap();
        assert_eq!(resolved.shape, VendorShape::Anthropic);
    }

    #[test]
    fn unknown_vendor_with_no_api_spec_errors() {
        let registry = AdapterRegistry;
        let err = registry.resolve(&record("nonexistent", None));
        assert!(err.is_err());
    }

    #[test]
    fn list_known_contains_core_vendors() {
        let registry = AdapterRegistry;
        let known = registry.list_known();
        for v in ["openai", "claude", "gemini", "ollama", "qwen_official"] {
            assert!(known.contains(&v), "missing {v}");
        }
    }
}
