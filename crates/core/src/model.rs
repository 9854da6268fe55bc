//! `ModelRecord` and `QuotaStat`: the persisted descriptors the Repository
//! owns and the Dispatch Engine reads. See §3.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[repr(u8)]
pub enum ModelStatus {
    Disabled = 0,
    Enabled = 1,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectStatus {
    Unreachable = 0,
    Reachable = 1,
}

/// A 3-valued health label derived from the ratio of used to total tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[repr(u8)]
pub enum QuotaStatus {
    Exhausted = 0,
    NearExhaust = 1,
    Sufficient = 2,
}

/// A persisted descriptor of one upstream model.
///
/// `api_key` is never included in `Debug` output or default `Serialize`
/// output; see `to_public` / the `Serialize` impl below, which omits it
/// unless the caller explicitly asks for the sensitive view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRecord {
    pub id: u64,
    pub vendor: String,
    pub model_name: String,
    pub api_base: String,
    pub api_path: Option<String>,
    pub api_spec: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: String,
    #[serde(default)]
    pub params: Value,
    pub priority: u32,
    pub status: ModelStatus,
    pub connect_status: ConnectStatus,
    pub quota_status: QuotaStatus,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl ModelRecord {
    pub fn is_eligible(&self) -> bool {
        self.status == ModelStatus::Enabled && self.connect_status == ConnectStatus::Reachable
    }

    /// The public view used for any response that might leave the process
    /// (GET /v1/models, admin listings) — the credential never rides along.
    pub fn to_public_json(&self) -> Value {
        let mut v = serde_json::to_value(self).expect("ModelRecord always serializes");
        if let Some(obj) = v.as_object_mut() {
            obj.remove("api_key");
        }
        v
    }
}

/// One row per ModelRecord, keyed by `model_id` — never embedded inside
/// `ModelRecord` itself, to avoid a cyclic reference (see §9).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum SyncType {
    Manual,
    Auto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaStat {
    pub id: u64,
    pub model_id: u64,
    pub total_quota: f64,
    pub used_quota: f64,
    pub remain_quota: f64,
    pub used_ratio: f64,
    pub sync_type: SyncType,
    pub last_sync_time: Option<DateTime<Utc>>,
    pub update_time: DateTime<Utc>,
}

impl QuotaStat {
    pub fn new(model_id: u64, total_quota: f64) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            model_id,
            total_quota,
            used_quota: 0.0,
            remain_quota: total_quota,
            used_ratio: 0.0,
            sync_type: SyncType::Manual,
            last_sync_time: None,
            update_time: now,
        }
    }

    /// Adds newly consumed tokens and recomputes `remain_quota`/`used_ratio`
    /// per §3's invariant: `used_ratio = round(used/total*100, 2)`.
    pub fn add_usage(&mut self, total_tokens: u64) {
        self.used_quota += total_tokens as f64;
        if self.total_quota > 0.0 {
            self.remain_quota = (self.total_quota - self.used_quota).max(0.0);
            self.used_ratio = (self.used_quota / self.total_quota * 100.0 * 100.0).round() / 100.0;
        } else {
            self.remain_quota = 0.0;
            self.used_ratio = 0.0;
        }
        self.update_time = Utc::now();
    }

    /// `quota_status` transition per §4.7, given a configurable alert
    /// threshold (default 80).
    pub fn quota_status(&self, alert_threshold: f64) -> QuotaStatus {
        if self.used_ratio >= 100.0 {
            QuotaStatus::Exhausted
        } else if self.used_ratio >= alert_threshold {
            QuotaStatus::NearExhaust
        } else {
            QuotaStatus::Sufficient
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_usage_recomputes_ratio_and_clamps_remain() {
        let mut q = QuotaStat::new(1, 1000.0);
        q.add_usage(250);
        assert_eq!(q.used_quota, 250.0);
        assert_eq!(q.remain_quota, 750.0);
        assert_eq!(q.used_ratio, 25.0);

        q.add_usage(800);
        assert_eq!(q.remain_quota, 0.0);
        assert!(q.used_ratio >= 100.0);
    }

    #[test]
    fn quota_status_transitions_at_thresholds() {
        let mut q = QuotaStat::new(2, 100.0);
        assert!(matches!(q.quota_status(80.0), QuotaStatus::Sufficient));
        q.add_usage(85);
        assert!(matches!(q.quota_status(80.0), QuotaStatus::NearExhaust));
        q.add_usage(20);
        assert!(matches!(q.quota_status(80.0), QuotaStatus::Exhausted));
    }

    #[test]
    fn zero_total_quota_yields_zero_ratio() {
        let mut q = QuotaStat::new(3, 0.0);
        q.add_usage(42);
        assert_eq!(q.used_ratio, 0.0);
        assert_eq!(q.remain_quota, 0.0);
    }

    #[test]
    fn public_json_omits_api_key() {
        let rec = ModelRecord {
            id: 1,
            vendor: "openai".into(),
            model_name: "gpt-4o".into(),
            api_base: "https://api.openai.com".into(),
            api_path: None,
            api_spec: Some("openai".into()),
            api_key: "sk-super-secret".into(),
            params: Value::Null,
            priority: 10,
            status: ModelStatus::Enabled,
            connect_status: ConnectStatus::Reachable,
            quota_status: QuotaStatus::Sufficient,
            create_time: Utc::now(),
            update_time: Utc::now(),
        };
        let json = rec.to_public_json();
        assert!(json.get("api_key").is_none());
    }
}
