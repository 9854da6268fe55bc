//! Core types shared by the LLM gateway's crates: the standardized
//! request/response envelopes, the persisted model/quota descriptors, and
//! the dispatch-attempt/operation-log records.

pub mod error;
pub mod log;
pub mod model;
pub mod standard;

pub use error::{CoreError, CoreResult};
pub use log::{apply_usage_to_quota, DispatchAttempt, DispatchLogType, DispatchOutcome, OperationLog};
pub use model::{ConnectStatus, ModelRecord, ModelStatus, QuotaStat, QuotaStatus, SyncType};
pub use standard::{Choice, FinishReason, Message, Role, StandardRequest, StandardResponse, StopSequences, Usage};
