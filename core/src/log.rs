//! Per-call observability records.
//!
//! # Design
//! One `CallLogRecord` is created per dispatched call and never reused. The
//! dispatcher fills it in as the call progresses and hands the finished
//! record to a `CallLogSink` exactly once, on every outcome path. The
//! default sink emits `tracing` events; tests inject a collecting sink to
//! assert on what was logged.

use std::time::{Instant, SystemTime};

use tracing::{error, info};

use crate::http::HttpMethod;

/// Everything recorded about one HTTP call.
#[derive(Debug, Clone)]
pub struct CallLogRecord {
    pub method: HttpMethod,
    pub path: String,
    /// Wall-clock start, for correlation with server-side logs.
    pub started_at: SystemTime,
    /// Filled in by `finish`.
    pub elapsed_ms: Option<u128>,
    /// From the `x-correlation-id` response header; absent on some responses.
    pub correlation_id: Option<String>,
    pub status: Option<u16>,
    /// Raw bodies, captured only when body logging is enabled.
    pub request_body: Option<String>,
    pub response_body: Option<String>,
    started: Instant,
}

impl CallLogRecord {
    pub fn start(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            started_at: SystemTime::now(),
            elapsed_ms: None,
            correlation_id: None,
            status: None,
            request_body: None,
            response_body: None,
            started: Instant::now(),
        }
    }

    /// Compute elapsed time. Idempotent in effect but intended to be called
    /// once, right before the record is handed to the sink.
    pub fn finish(&mut self) {
        self.elapsed_ms = Some(self.started.elapsed().as_millis());
    }

    /// True when the call completed below the 400 range (or never reached
    /// the server, in which case it is still reported as an error).
    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(status) if status < 400)
    }
}

/// Receives the finished record for each call.
pub trait CallLogSink: Send + Sync {
    fn log(&self, record: &CallLogRecord);
}

/// Default sink: `info` events below status 400, `error` otherwise.
#[derive(Debug, Default)]
pub struct TracingSink;

impl CallLogSink for TracingSink {
    fn log(&self, record: &CallLogRecord) {
        let method = record.method.as_str();
        let path = record.path.as_str();
        let status = record.status.unwrap_or(0);
        let elapsed_ms = record.elapsed_ms.unwrap_or(0) as u64;
        let correlation_id = record.correlation_id.as_deref().unwrap_or("-");
        if record.is_success() {
            info!(method, path, status, elapsed_ms, correlation_id, "api call");
        } else {
            error!(method, path, status, elapsed_ms, correlation_id, "api call failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_starts_without_outcome_fields() {
        let record = CallLogRecord::start(HttpMethod::Get, "/api/v2/utilities/ping");
        assert!(record.elapsed_ms.is_none());
        assert!(record.status.is_none());
        assert!(record.correlation_id.is_none());
        assert!(record.request_body.is_none());
    }

    #[test]
    fn finish_populates_elapsed() {
        let mut record = CallLogRecord::start(HttpMethod::Post, "/api/v2/transactions/create");
        record.finish();
        assert!(record.elapsed_ms.is_some());
    }

    #[test]
    fn success_requires_a_status_below_400() {
        let mut record = CallLogRecord::start(HttpMethod::Get, "/ping");
        assert!(!record.is_success());
        record.status = Some(200);
        assert!(record.is_success());
        record.status = Some(404);
        assert!(!record.is_success());
    }
}
