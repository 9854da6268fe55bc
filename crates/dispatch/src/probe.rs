//! Connectivity Probe: a lightweight per-model reachability test (§4.4).

use std::sync::Arc;
use std::time::Duration;

use llm_gateway_adapters::{build_test_request, default_test_model, AdapterRegistry, VendorShape};
use llm_gateway_client::UpstreamClient;
use llm_gateway_config::DispatchConfig;
use llm_gateway_core::ConnectStatus;
use llm_gateway_repository::ModelRepository;
use reqwest::StatusCode;

use crate::error::DispatchResult;
use crate::headers::build_headers;
use crate::url::build_url;

pub struct ConnectivityProbe {
    repository: Arc<dyn ModelRepository>,
    registry: AdapterRegistry,
    client: Arc<UpstreamClient>,
    config: DispatchConfig,
}

impl ConnectivityProbe {
    pub fn new(
        repository: Arc<dyn ModelRepository>,
        registry: AdapterRegistry,
        client: Arc<UpstreamClient>,
        config: DispatchConfig,
    ) -> Self {
        Self { repository, registry, client, config }
    }

    /// `probe(model_id) -> {reachable: bool}`. Interprets the upstream
    /// status per §4.4 and writes `connect_status` back to the record.
    pub async fn probe(&self, model_id: u64) -> DispatchResult<bool> {
        let record = self.repository.get(model_id).await?;
        let resolved = self.registry.resolve(&record)?;

        let model = if record.model_name.is_empty() {
            if resolved.shape == VendorShape::Anthropic {
                self.config.claude_test_model.clone()
            } else {
                default_test_model(resolved.shape).to_string()
            }
        } else {
            record.model_name.clone()
        };
        let body = build_test_request(resolved.shape, &model);
        let url = build_url(&resolved.api_base, &resolved.api_path, &model);
        let headers = build_headers(&record, &resolved);

        let reachable = match self
            .client
            .post_json_no_redirect(&url, &headers, &body, Duration::from_secs(self.config.probe_timeout_secs))
            .await
        {
            Ok(status) => interpret_status(status),
            // A transport error (connection refused, DNS failure, timeout)
            // is treated the same as a 5xx: optimistic, not quarantined.
            Err(_) => true,
        };

        let status = if reachable { ConnectStatus::Reachable } else { ConnectStatus::Unreachable };
        self.repository.set_connect_status(model_id, status).await?;
        Ok(reachable)
    }
}

/// §4.4, invariant 8: 200 and 429 are reachable; any other 4xx is not;
/// 5xx is optimistically reachable.
fn interpret_status(status: StatusCode) -> bool {
    match status.as_u16() {
        200 | 429 => true,
        400..=499 => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_gateway_core::{ModelRecord, ModelStatus, QuotaStatus};
    use llm_gateway_repository::InMemoryModelRepository;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn status_mapping_matches_invariant_eight() {
        assert!(interpret_status(StatusCode::OK));
        assert!(interpret_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(!interpret_status(StatusCode::BAD_REQUEST));
        assert!(!interpret_status(StatusCode::UNAUTHORIZED));
        assert!(!interpret_status(StatusCode::NOT_FOUND));
        assert!(interpret_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(interpret_status(StatusCode::BAD_GATEWAY));
    }

    fn claude_record(id: u64, api_base: String) -> ModelRecord {
        let now = chrono::Utc::now();
        ModelRecord {
            id,
            vendor: "claude".to_string(),
            model_name: String::new(),
            api_base,
            api_path: None,
            api_spec: None,
            api_key: "sk-ant-test".to_string(),
            params: serde_json::Value::Null,
            priority: 1,
            status: ModelStatus::Enabled,
            connect_status: ConnectStatus::Unreachable,
            quota_status: QuotaStatus::Sufficient,
            create_time: now,
            update_time: now,
        }
    }

    /// Regression test: a probe against an Anthropic model with no
    /// `model_name` set must use `DispatchConfig.claude_test_model`, and
    /// must carry the same `anthropic-version` header a real dispatch
    /// attempt would send (§4.4, §9). Before this fix the probe sent
    /// OpenAI-shaped headers and the generic test model, so real Anthropic
    /// probes came back HTTP 400 and were marked permanently unreachable.
    #[tokio::test]
    async fn anthropic_probe_uses_configured_test_model_and_version_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(header("x-api-key", "sk-ant-test"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let repo: Arc<dyn ModelRepository> = Arc::new(InMemoryModelRepository::new());
        let id = repo.create(claude_record(0, server.uri())).await.unwrap().id;

        let mut config = DispatchConfig::default();
        config.claude_test_model = "claude-sonnet-4-20250514".to_string();
        let probe = ConnectivityProbe::new(repo.clone(), AdapterRegistry, Arc::new(UpstreamClient::new()), config);

        let reachable = probe.probe(id).await.unwrap();
        assert!(reachable);
        let record = repo.get(id).await.unwrap();
        assert_eq!(record.connect_status, ConnectStatus::Reachable);
    }
}
