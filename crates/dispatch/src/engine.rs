//! The Dispatch Engine: candidate selection, per-candidate translation and
//! invocation, success validation, and sequential failover (§4.2).

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use llm_gateway_adapters::{build_request, parse_response, AdapterRegistry};
use llm_gateway_client::{ClientError, LineStream, UpstreamClient};
use llm_gateway_config::DispatchConfig;
use llm_gateway_core::{DispatchAttempt, DispatchOutcome, ModelRecord, OperationLog, StandardRequest, StandardResponse};
use llm_gateway_repository::ModelRepository;
use serde_json::Value;

use crate::error::{DispatchError, DispatchResult};
use crate::headers::build_headers;
use crate::url::build_url;

/// Only the body excerpt is carried in failure details, never the full
/// payload (upstream errors can be large or echo request content back).
const ERROR_EXCERPT_LEN: usize = 500;

/// The outcome handed back to the HTTP layer: either a complete response or
/// a line stream already in SSE-frame shape (see `llm_gateway_adapters::stream`).
pub enum DispatchOutput {
    Unary(StandardResponse),
    Stream(LineStream),
}

pub struct DispatchEngine {
    repository: Arc<dyn ModelRepository>,
    registry: AdapterRegistry,
    client: Arc<UpstreamClient>,
    config: DispatchConfig,
    alert_threshold: f64,
}

impl DispatchEngine {
    pub fn new(
        repository: Arc<dyn ModelRepository>,
        registry: AdapterRegistry,
        client: Arc<UpstreamClient>,
        config: DispatchConfig,
    ) -> Self {
        Self::with_alert_threshold(repository, registry, client, config, 80.0)
    }

    pub fn with_alert_threshold(
        repository: Arc<dyn ModelRepository>,
        registry: AdapterRegistry,
        client: Arc<UpstreamClient>,
        config: DispatchConfig,
        alert_threshold: f64,
    ) -> Self {
        Self { repository, registry, client, config, alert_threshold }
    }

    /// Candidate selection per §4.2 steps 1-4.
    async fn select_candidates(&self, request: &StandardRequest) -> DispatchResult<Vec<ModelRecord>> {
        let eligible = self.repository.list_candidates().await?;

        let candidates = if request.is_auto() {
            eligible
        } else {
            let requested = request.model.as_deref().unwrap_or_default();
            let (matching, rest): (Vec<_>, Vec<_>) =
                eligible.into_iter().partition(|r| r.model_name == requested);
            matching.into_iter().chain(rest).collect()
        };

        if candidates.is_empty() {
            return Err(DispatchError::NoAvailableModel);
        }
        Ok(candidates)
    }

    fn resolve_url(&self, record: &ModelRecord, resolved: &llm_gateway_adapters::ResolvedAdapter) -> String {
        build_url(&resolved.api_base, &resolved.api_path, &record.model_name)
    }

    /// Public entry point: `dispatch(standard_request) -> StandardResponse | StreamingBody`.
    pub async fn dispatch(&self, request: StandardRequest) -> DispatchResult<DispatchOutput> {
        let candidates = self.select_candidates(&request).await?;

        if request.wants_stream() {
            self.dispatch_stream(request, candidates).await
        } else {
            self.dispatch_unary(request, candidates).await.map(DispatchOutput::Unary)
        }
    }

    async fn dispatch_unary(&self, request: StandardRequest, candidates: Vec<ModelRecord>) -> DispatchResult<StandardResponse> {
        let requested_model = request.model.clone().unwrap_or_else(|| "auto".to_string());
        let mut last_detail = String::new();

        for record in &candidates {
            let started = Instant::now();
            let attempt = self.attempt_unary(&request, record).await;
            match attempt {
                Ok((response, usage_tokens)) => {
                    self.log_attempt(&requested_model, record, DispatchOutcome::Success, None, Some(usage_tokens), started.elapsed());
                    if usage_tokens > 0 {
                        let _ = self.repository.add_quota_usage(record.id, usage_tokens, self.alert_threshold).await;
                    }
                    return Ok(response);
                }
                Err((outcome, detail)) => {
                    self.log_attempt(&requested_model, record, outcome, Some(detail.clone()), None, started.elapsed());
                    last_detail = detail;
                }
            }
        }

        Err(DispatchError::AllUpstreamsFailed { detail: last_detail })
    }

    /// Returns `Ok((response, total_tokens))` on a validated success, or
    /// `Err((outcome, detail))` for any of the internal failure outcomes
    /// (§7: these never escape dispatch directly).
    async fn attempt_unary(
        &self,
        request: &StandardRequest,
        record: &ModelRecord,
    ) -> Result<(StandardResponse, u64), (DispatchOutcome, String)> {
        let resolved = self
            .registry
            .resolve(record)
            .map_err(|e| (DispatchOutcome::ValidationError, e.to_string()))?;

        let url = self.resolve_url(record, &resolved);
        let headers = build_headers(record, &resolved);
        let body = build_request(&resolved, request, &record.params);

        let (status, bytes) = self
            .client
            .post_json(&url, &headers, &body, Duration::from_secs(self.config.unary_timeout_secs))
            .await
            .map_err(|e| (DispatchOutcome::TransportError, e.to_string()))?;

        if status != reqwest::StatusCode::OK {
            let excerpt: String = String::from_utf8_lossy(&bytes).chars().take(ERROR_EXCERPT_LEN).collect();
            return Err((DispatchOutcome::UpstreamHttpError, format!("HTTP {status}: {excerpt}")));
        }

        let raw: Value = serde_json::from_slice(&bytes)
            .map_err(|e| (DispatchOutcome::ValidationError, format!("invalid JSON: {e}")))?;

        let parsed = parse_response(resolved.shape, &record.model_name, &raw)
            .map_err(|e| (DispatchOutcome::ValidationError, e.to_string()))?;

        if !parsed.is_valid() {
            return Err((DispatchOutcome::EmptyResponse, "empty choices or blank content".to_string()));
        }

        let total_tokens = parsed.usage.total_tokens;
        Ok((parsed, total_tokens))
    }

    async fn dispatch_stream(&self, request: StandardRequest, candidates: Vec<ModelRecord>) -> DispatchResult<DispatchOutput> {
        let requested_model = request.model.clone().unwrap_or_else(|| "auto".to_string());
        let mut last_detail = String::new();

        for record in &candidates {
            let resolved = match self.registry.resolve(record) {
                Ok(r) => r,
                Err(e) => {
                    last_detail = e.to_string();
                    continue;
                }
            };
            let url = self.resolve_url(record, &resolved);
            let headers = build_headers(record, &resolved);
            let body = build_request(&resolved, &request, &record.params);

            let started = Instant::now();
            match self
                .client
                .open_stream(&url, &headers, &body, Duration::from_secs(self.config.stream_timeout_secs))
                .await
            {
                Ok((status, stream)) if status == reqwest::StatusCode::OK => {
                    self.log_attempt(&requested_model, record, DispatchOutcome::Success, None, None, started.elapsed());
                    return Ok(DispatchOutput::Stream(wrap_adapter_stream(stream, resolved.shape, record.model_name.clone())));
                }
                Ok((status, _)) => {
                    self.log_attempt(
                        &requested_model,
                        record,
                        DispatchOutcome::UpstreamHttpError,
                        Some(format!("HTTP {status}")),
                        None,
                        started.elapsed(),
                    );
                    return Ok(DispatchOutput::Stream(single_error_frame_stream()));
                }
                Err(ClientError::Transport(e)) => {
                    self.log_attempt(&requested_model, record, DispatchOutcome::TransportError, Some(e.to_string()), None, started.elapsed());
                    last_detail = e.to_string();
                    continue;
                }
                Err(e) => {
                    self.log_attempt(&requested_model, record, DispatchOutcome::TransportError, Some(e.to_string()), None, started.elapsed());
                    last_detail = e.to_string();
                    continue;
                }
            }
        }

        Err(DispatchError::AllUpstreamsFailed { detail: last_detail })
    }

    fn log_attempt(
        &self,
        requested_model: &str,
        record: &ModelRecord,
        outcome: DispatchOutcome,
        error_detail: Option<String>,
        usage_tokens: Option<u64>,
        elapsed: Duration,
    ) {
        let attempt = DispatchAttempt { model_id: record.id, started_at: Utc::now(), outcome, error_detail, usage_tokens };
        let log = OperationLog::from_attempt(0, requested_model, &record.model_name, &attempt);

        let outcome_label = outcome_label(outcome);
        metrics::counter!("gateway_dispatch_attempts_total", "vendor" => record.vendor.clone(), "outcome" => outcome_label)
            .increment(1);
        metrics::histogram!("gateway_dispatch_attempt_duration_seconds", "vendor" => record.vendor.clone())
            .record(elapsed.as_secs_f64());

        match outcome {
            DispatchOutcome::Success => {
                tracing::info!(model_id = record.id, vendor = %record.vendor, log = ?log, "dispatch attempt succeeded")
            }
            _ => {
                tracing::warn!(model_id = record.id, vendor = %record.vendor, log = ?log, "dispatch attempt failed")
            }
        }
    }
}

fn outcome_label(outcome: DispatchOutcome) -> &'static str {
    match outcome {
        DispatchOutcome::Success => "success",
        DispatchOutcome::UpstreamHttpError => "upstream_http_error",
        DispatchOutcome::EmptyResponse => "empty_response",
        DispatchOutcome::TransportError => "transport_error",
        DispatchOutcome::ValidationError => "validation_error",
    }
}

/// Wraps the raw upstream line stream through the adapter's stream-chunk
/// parser, per §4.1/invariant 6. Lines the parser drops are filtered out
/// entirely rather than forwarded as empty frames.
fn wrap_adapter_stream(mut raw: LineStream, shape: llm_gateway_adapters::VendorShape, model: String) -> LineStream {
    use futures::StreamExt;
    let _ = shape; // stream-chunk parsing is vendor-agnostic per §4.1; kept for future per-vendor divergence.
    let stream = async_stream::stream! {
        while let Some(line) = raw.next().await {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            match llm_gateway_adapters::parse_stream_chunk(&model, &line) {
                llm_gateway_adapters::StreamEvent::Frame(frame) => yield Ok(frame),
                llm_gateway_adapters::StreamEvent::Done => {
                    yield Ok(llm_gateway_adapters::DONE_FRAME.to_string());
                    return;
                }
                llm_gateway_adapters::StreamEvent::Skip => {}
            }
        }
    };
    Box::pin(stream)
}

fn single_error_frame_stream() -> LineStream {
    let stream = async_stream::stream! {
        yield Ok::<_, ClientError>("data: {\"error\":\"request failed\"}\n\n".to_string());
    };
    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_gateway_config::DispatchConfig;
    use llm_gateway_core::{ConnectStatus, ModelStatus, QuotaStatus};
    use llm_gateway_repository::InMemoryModelRepository;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record(id: u64, vendor: &str, model_name: &str, priority: u32, api_base: String) -> ModelRecord {
        let now = Utc::now();
        ModelRecord {
            id,
            vendor: vendor.to_string(),
            model_name: model_name.to_string(),
            api_base,
            api_path: None,
            api_spec: None,
            api_key: "test-key".to_string(),
            params: Value::Null,
            priority,
            status: ModelStatus::Enabled,
            connect_status: ConnectStatus::Reachable,
            quota_status: QuotaStatus::Sufficient,
            create_time: now,
            update_time: now,
        }
    }

    fn request(model: Option<&str>) -> StandardRequest {
        StandardRequest {
            model: model.map(str::to_string),
            messages: vec![llm_gateway_core::Message::user("hi")],
            temperature: None,
            max_tokens: None,
            top_p: None,
            top_k: None,
            stop: None,
            stream: None,
        }
    }

    #[tokio::test]
    async fn auto_failover_returns_second_candidates_content() {
        let m1 = MockServer::start().await;
        Mock::given(method("POST")).and(path("/v1/chat/completions")).respond_with(ResponseTemplate::new(500)).mount(&m1).await;
        let m2 = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "ok"}, "finish_reason": "stop"}]
            })))
            .mount(&m2)
            .await;

        let repo: Arc<dyn ModelRepository> = Arc::new(InMemoryModelRepository::new());
        repo.create(record(0, "openai", "gpt-4o", 10, m1.uri())).await.unwrap();
        repo.create(record(0, "deepseek", "deepseek-chat", 20, m2.uri())).await.unwrap();

        let engine = DispatchEngine::new(repo, AdapterRegistry, Arc::new(UpstreamClient::new()), DispatchConfig::default());
        let result = engine.dispatch(request(Some("auto"))).await.unwrap();
        match result {
            DispatchOutput::Unary(resp) => assert_eq!(resp.choices[0].message.content, "ok"),
            _ => panic!("expected unary response"),
        }
    }

    #[tokio::test]
    async fn requested_model_tried_first_even_with_lower_priority() {
        let slow = MockServer::start().await;
        Mock::given(method("POST")).and(path("/v1/chat/completions")).respond_with(ResponseTemplate::new(500)).mount(&slow).await;
        let fallback = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "from-qwen"}, "finish_reason": "stop"}]
            })))
            .mount(&fallback)
            .await;

        let repo: Arc<dyn ModelRepository> = Arc::new(InMemoryModelRepository::new());
        repo.create(record(0, "openai", "gpt-4o", 10, slow.uri())).await.unwrap();
        repo.create(record(0, "qwen", "qwen-turbo", 5, fallback.uri())).await.unwrap();

        let engine = DispatchEngine::new(repo, AdapterRegistry, Arc::new(UpstreamClient::new()), DispatchConfig::default());
        let result = engine.dispatch(request(Some("gpt-4o"))).await.unwrap();
        match result {
            DispatchOutput::Unary(resp) => assert_eq!(resp.choices[0].message.content, "from-qwen"),
            _ => panic!("expected unary response"),
        }
    }

    #[tokio::test]
    async fn empty_choices_is_rejected_and_falls_through() {
        let empty = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&empty)
            .await;
        let good = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "ok"}, "finish_reason": "stop"}]
            })))
            .mount(&good)
            .await;

        let repo: Arc<dyn ModelRepository> = Arc::new(InMemoryModelRepository::new());
        repo.create(record(0, "openai", "a", 1, empty.uri())).await.unwrap();
        repo.create(record(0, "openai", "b", 2, good.uri())).await.unwrap();

        let engine = DispatchEngine::new(repo, AdapterRegistry, Arc::new(UpstreamClient::new()), DispatchConfig::default());
        let result = engine.dispatch(request(Some("auto"))).await.unwrap();
        match result {
            DispatchOutput::Unary(resp) => assert_eq!(resp.choices[0].message.content, "ok"),
            _ => panic!("expected unary response"),
        }
    }

    #[tokio::test]
    async fn no_eligible_models_fails_without_any_upstream_call() {
        let repo: Arc<dyn ModelRepository> = Arc::new(InMemoryModelRepository::new());
        let mut disabled = record(0, "openai", "gpt-4o", 1, "https://unused.invalid".to_string());
        disabled.status = ModelStatus::Disabled;
        repo.create(disabled).await.unwrap();

        let engine = DispatchEngine::new(repo, AdapterRegistry, Arc::new(UpstreamClient::new()), DispatchConfig::default());
        let err = engine.dispatch(request(Some("auto"))).await.unwrap_err();
        assert!(matches!(err, DispatchError::NoAvailableModel));
    }
}
