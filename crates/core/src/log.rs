//! Ephemeral per-candidate dispatch records, persisted as `OperationLog`
//! events but never part of the core's own state (see §3, §6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::QuotaStat;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DispatchOutcome {
    Success,
    UpstreamHttpError,
    EmptyResponse,
    TransportError,
    ValidationError,
}

impl DispatchOutcome {
    pub fn is_failure(self) -> bool {
        !matches!(self, DispatchOutcome::Success)
    }
}

/// `operation_log.log_type` per §6: 1=access(success), 2=switch, 3=error,
/// 4=test (connectivity probe).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[repr(u8)]
pub enum DispatchLogType {
    Access = 1,
    Switch = 2,
    Error = 3,
    Test = 4,
}

/// One record per upstream attempt within a single dispatch call.
#[derive(Debug, Clone)]
pub struct DispatchAttempt {
    pub model_id: u64,
    pub started_at: DateTime<Utc>,
    pub outcome: DispatchOutcome,
    pub error_detail: Option<String>,
    pub usage_tokens: Option<u64>,
}

impl DispatchAttempt {
    pub fn log_type(&self) -> DispatchLogType {
        match self.outcome {
            DispatchOutcome::Success => DispatchLogType::Access,
            _ => DispatchLogType::Error,
        }
    }

    /// The `log_content` JSON body for this attempt's `OperationLog` row.
    pub fn to_log_content(&self, requested_model: &str, attempted_model: &str) -> Value {
        serde_json::json!({
            "requested_model": requested_model,
            "attempted_model": attempted_model,
            "status": self.outcome,
            "usage": self.usage_tokens,
            "error": self.error_detail,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationLog {
    pub id: u64,
    pub log_type: DispatchLogType,
    pub model_id: u64,
    pub log_content: Value,
    /// 0=failure, 1=success.
    pub status: u8,
    pub create_time: DateTime<Utc>,
}

impl OperationLog {
    pub fn from_attempt(id: u64, requested_model: &str, attempted_model: &str, attempt: &DispatchAttempt) -> Self {
        Self {
            id,
            log_type: attempt.log_type(),
            model_id: attempt.model_id,
            log_content: attempt.to_log_content(requested_model, attempted_model),
            status: if attempt.outcome == DispatchOutcome::Success { 1 } else { 0 },
            create_time: attempt.started_at,
        }
    }
}

/// Usage extracted from an upstream response, handed to the Quota Tracker.
/// Grounded in the original `quota_monitor.calculate_usage` helper.
pub fn apply_usage_to_quota(stat: &mut QuotaStat, total_tokens: u64) {
    stat.add_usage(total_tokens);
}
