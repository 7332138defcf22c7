//! The single chokepoint for outbound HTTP calls.
//!
//! # Design
//! `execute` performs exactly one blocking round-trip per invocation: merge
//! headers, resolve the timeout, send, classify the response by status and
//! content type, and capture failures as values. The ureq agent is built
//! with `http_status_as_error(false)` in capture mode so non-2xx responses
//! arrive as data and the dispatcher interprets the status itself; raise
//! mode leaves ureq's native status error on and propagates it. The call
//! log record is finalized and handed to the sink in one place, after the
//! dispatch body returns, so every outcome path logs exactly once.

use std::sync::Arc;
use std::time::Duration;

use ureq::Agent;

use crate::auth::{AuthenticationContext, ClientIdentity};
use crate::error::{ApiError, ErrorResult};
use crate::http::{Endpoint, HttpMethod, ResponseBody};
use crate::log::{CallLogRecord, CallLogSink, TracingSink};

/// Tax calculation and large batch operations can legitimately run long, so
/// the fallback timeout is generous.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// Response header carrying the server-side correlation identifier.
const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// How transport-level failures are surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Non-2xx responses become structured [`ApiError::Http`] values with
    /// status, correlation id, raw body, and the parsed error model. The
    /// primary contract.
    #[default]
    Capture,
    /// Compatibility mode for exception-style callers: ureq's native
    /// status-as-error behavior is enabled and the resulting transport
    /// error propagates as [`ApiError::Transport`].
    Raise,
}

/// Dispatcher settings, resolved once at client construction.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub base_url: String,
    /// Client-level timeout; `None` means [`DEFAULT_TIMEOUT`].
    pub timeout: Option<Duration>,
    /// Copy raw request/response bodies into the call log record.
    pub log_bodies: bool,
    pub error_mode: ErrorMode,
}

/// Issues HTTP calls and normalizes their outcomes.
pub struct RequestDispatcher {
    agent: Agent,
    config: DispatcherConfig,
    sink: Arc<dyn CallLogSink>,
}

impl RequestDispatcher {
    pub fn new(config: DispatcherConfig) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    pub fn with_sink(config: DispatcherConfig, sink: Arc<dyn CallLogSink>) -> Self {
        let connect = config.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let agent_config = Agent::config_builder()
            .http_status_as_error(config.error_mode == ErrorMode::Raise)
            .timeout_connect(Some(connect))
            .build();
        Self {
            agent: agent_config.new_agent(),
            config,
            sink,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Execute one invocation descriptor against the remote API.
    ///
    /// The call log record is finished and handed to the sink exactly once,
    /// whatever the outcome.
    pub fn execute(
        &self,
        endpoint: Endpoint,
        auth: &AuthenticationContext,
        identity: &ClientIdentity,
    ) -> Result<ResponseBody, ApiError> {
        let mut record = CallLogRecord::start(endpoint.method, endpoint.path.clone());
        if self.config.log_bodies {
            record.request_body = endpoint.body.clone();
        }

        let outcome = self.dispatch(endpoint, auth, identity, &mut record);

        record.finish();
        self.sink.log(&record);
        outcome
    }

    fn dispatch(
        &self,
        endpoint: Endpoint,
        auth: &AuthenticationContext,
        identity: &ClientIdentity,
        record: &mut CallLogRecord,
    ) -> Result<ResponseBody, ApiError> {
        let url = format!("{}{}", self.config.base_url, endpoint.path);
        let headers = merge_headers(auth.render_headers(identity), &endpoint.headers);
        let timeout = resolve_timeout(endpoint.timeout, self.config.timeout);

        let sent = match endpoint.method {
            HttpMethod::Get => {
                prepare(self.agent.get(&url), &endpoint, &headers, timeout).call()
            }
            HttpMethod::Delete => {
                prepare(self.agent.delete(&url), &endpoint, &headers, timeout).call()
            }
            HttpMethod::Post | HttpMethod::Put => {
                let builder = match endpoint.method {
                    HttpMethod::Post => self.agent.post(&url),
                    _ => self.agent.put(&url),
                };
                let builder = prepare(builder, &endpoint, &headers, timeout)
                    .content_type("application/json");
                match &endpoint.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = match sent {
            Ok(response) => response,
            Err(err) => {
                // Raise mode surfaces non-2xx statuses through here; keep
                // the status on the record so the failure is still logged
                // accurately.
                if let ureq::Error::StatusCode(code) = &err {
                    record.status = Some(*code);
                }
                return Err(ApiError::Transport(err));
            }
        };

        let status = response.status().as_u16();
        record.status = Some(status);
        record.correlation_id = header_value(&response, CORRELATION_ID_HEADER);
        let content_type = header_value(&response, "content-type").unwrap_or_default();
        let content_length = header_value(&response, "content-length");

        let body = response
            .body_mut()
            .read_to_string()
            .map_err(ApiError::Transport)?;
        if self.config.log_bodies {
            record.response_body = Some(body.clone());
        }

        if status >= 400 {
            let error = serde_json::from_str::<ErrorResult>(&body)
                .ok()
                .map(|result| result.error);
            return Err(ApiError::Http {
                status,
                correlation_id: record.correlation_id.clone(),
                body,
                error,
            });
        }

        classify(status, &content_type, content_length.as_deref(), body)
    }
}

/// Resolve the effective timeout: per-call override, else client-level
/// setting, else the fixed default.
fn resolve_timeout(per_call: Option<Duration>, client: Option<Duration>) -> Duration {
    per_call.or(client).unwrap_or(DEFAULT_TIMEOUT)
}

/// Merge caller-supplied headers over the auth-rendered set; caller headers
/// win on (case-insensitive) name collision.
fn merge_headers(
    rendered: Vec<(String, String)>,
    caller: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged = rendered;
    for (name, value) in caller {
        merged.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        merged.push((name.clone(), value.clone()));
    }
    merged
}

/// Apply query parameters, headers, and the per-request timeout to a ureq
/// request builder. Query parameters with `None` or empty values are
/// omitted entirely.
fn prepare<Any>(
    builder: ureq::RequestBuilder<Any>,
    endpoint: &Endpoint,
    headers: &[(String, String)],
    timeout: Duration,
) -> ureq::RequestBuilder<Any> {
    let mut builder = builder
        .config()
        .timeout_global(Some(timeout))
        .build();
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    for (name, value) in &endpoint.query {
        match value {
            Some(value) if !value.is_empty() => {
                builder = builder.query(name.as_str(), value.as_str());
            }
            _ => {}
        }
    }
    builder
}

/// Classify a successful (sub-400) response by status and content type.
fn classify(
    status: u16,
    content_type: &str,
    content_length: Option<&str>,
    body: String,
) -> Result<ResponseBody, ApiError> {
    if content_type.contains("text/csv") {
        return Ok(ResponseBody::Csv(body));
    }
    let json_content = content_type.contains("application/json");
    let zero_length = content_length == Some("0") || body.is_empty();
    if status == 204 || (json_content && zero_length) {
        return Ok(ResponseBody::NoContent);
    }
    match serde_json::from_str(&body) {
        Ok(value) => Ok(ResponseBody::Json(value)),
        Err(err) => Err(ApiError::UnexpectedFormat {
            message: format!("unable to parse response body as JSON: {err}"),
            body,
        }),
    }
}

fn header_value(response: &ureq::http::Response<ureq::Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
