//! The long-lived client: identity, credentials, configuration, and the
//! typed operations built on the dispatcher.
//!
//! # Design
//! `AvataxClient` owns one `AuthenticationContext`, one `ClientIdentity`,
//! and one `RequestDispatcher`; nothing is ambient or static, so multiple
//! clients with different credentials coexist safely. Each typed operation
//! builds an `Endpoint` descriptor, hands it to the dispatcher, and decodes
//! the generic JSON result into its response model. The handful of
//! operations here stand in for the generated endpoint surface; `execute`
//! is the escape hatch for calling anything else.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::auth::{AuthenticationContext, ClientIdentity};
use crate::builder::TransactionBuilder;
use crate::dispatcher::{DispatcherConfig, ErrorMode, RequestDispatcher};
use crate::error::ApiError;
use crate::http::{Endpoint, ResponseBody};
use crate::log::{CallLogSink, TracingSink};
use crate::transaction::{CreateTransactionModel, DocumentType, TransactionModel};

const SANDBOX_URL: &str = "https://sandbox-rest.avatax.com";
const PRODUCTION_URL: &str = "https://rest.avatax.com";

/// Map an environment string to a base URL: the literal `"sandbox"` selects
/// the sandbox host, an `http://`/`https://` string is used verbatim (with
/// any trailing slash trimmed), anything else selects production.
fn resolve_environment(environment: &str) -> String {
    if environment == "sandbox" {
        SANDBOX_URL.to_string()
    } else if environment.starts_with("http://") || environment.starts_with("https://") {
        environment.trim_end_matches('/').to_string()
    } else {
        PRODUCTION_URL.to_string()
    }
}

/// Response of the ping operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResultModel {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub authentication_type: Option<String>,
    #[serde(default)]
    pub authenticated_user_name: Option<String>,
    #[serde(default)]
    pub authenticated_account_id: Option<i64>,
}

/// Synchronous client for the tax-calculation REST API.
pub struct AvataxClient {
    identity: ClientIdentity,
    auth: AuthenticationContext,
    config: DispatcherConfig,
    sink: Arc<dyn CallLogSink>,
    dispatcher: RequestDispatcher,
}

impl AvataxClient {
    /// Fails with a configuration error when `app_name` or `app_version`
    /// is empty.
    pub fn new(
        app_name: impl Into<String>,
        app_version: impl Into<String>,
        machine_name: impl Into<String>,
        environment: &str,
    ) -> Result<Self, ApiError> {
        let identity = ClientIdentity::new(app_name, app_version, machine_name)?;
        let config = DispatcherConfig {
            base_url: resolve_environment(environment),
            timeout: None,
            log_bodies: false,
            error_mode: ErrorMode::Capture,
        };
        let sink: Arc<dyn CallLogSink> = Arc::new(TracingSink);
        let dispatcher = RequestDispatcher::with_sink(config.clone(), sink.clone());
        Ok(Self {
            identity,
            auth: AuthenticationContext::new(),
            config,
            sink,
            dispatcher,
        })
    }

    // --- credentials (each replaces the previous variant) ---

    pub fn with_username_password(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.auth.set_username_password(username, password);
        self
    }

    pub fn with_license_key(
        mut self,
        account_id: impl Into<String>,
        license_key: impl Into<String>,
    ) -> Self {
        self.auth.set_license_key(account_id, license_key);
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth.set_bearer_token(token);
        self
    }

    // --- dispatcher configuration ---

    /// Client-level timeout for connect and overall request duration;
    /// individual endpoints may still override it per call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self.rebuild_dispatcher()
    }

    /// Copy raw request/response bodies into call log records.
    pub fn with_body_logging(mut self, enabled: bool) -> Self {
        self.config.log_bodies = enabled;
        self.rebuild_dispatcher()
    }

    pub fn with_error_mode(mut self, error_mode: ErrorMode) -> Self {
        self.config.error_mode = error_mode;
        self.rebuild_dispatcher()
    }

    /// Replace the default tracing sink with an injected one.
    pub fn with_log_sink(mut self, sink: Arc<dyn CallLogSink>) -> Self {
        self.sink = sink;
        self.rebuild_dispatcher()
    }

    fn rebuild_dispatcher(mut self) -> Self {
        self.dispatcher = RequestDispatcher::with_sink(self.config.clone(), self.sink.clone());
        self
    }

    pub fn base_url(&self) -> &str {
        self.dispatcher.base_url()
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    /// Dispatch an arbitrary endpoint descriptor with this client's
    /// credentials and configuration.
    pub fn execute(&self, endpoint: Endpoint) -> Result<ResponseBody, ApiError> {
        self.dispatcher.execute(endpoint, &self.auth, &self.identity)
    }

    // --- operations ---

    /// Verify connectivity and report whether the configured credentials
    /// authenticate.
    pub fn ping(&self) -> Result<PingResultModel, ApiError> {
        let body = self.execute(Endpoint::get("/api/v2/utilities/ping"))?;
        decode(body)
    }

    /// Submit a transaction draft for tax calculation.
    pub fn create_transaction(
        &self,
        model: &CreateTransactionModel,
    ) -> Result<TransactionModel, ApiError> {
        let payload = serde_json::to_string(model)
            .map_err(|err| ApiError::Serialization(err.to_string()))?;
        let body = self.execute(Endpoint::post("/api/v2/transactions/create").body(payload))?;
        decode(body)
    }

    /// Download the flat tax-rate file for a content date. CSV passthrough;
    /// the body is returned unparsed.
    pub fn download_tax_rates_by_zip_code(&self, date: &str) -> Result<String, ApiError> {
        let body = self.execute(Endpoint::get(format!(
            "/api/v2/taxratesbyzipcode/files/{date}"
        )))?;
        match body {
            ResponseBody::Csv(content) => Ok(content),
            other => Err(ApiError::UnexpectedFormat {
                message: "expected a text/csv response".to_string(),
                body: format!("{other:?}"),
            }),
        }
    }

    /// Start a fluent transaction draft against this client.
    pub fn transaction_builder(
        &self,
        company_code: impl Into<String>,
        document_type: DocumentType,
        customer_code: impl Into<String>,
    ) -> TransactionBuilder<'_> {
        TransactionBuilder::new(self, company_code, document_type, customer_code)
    }
}

/// Decode the dispatcher's generic JSON value into a typed response model.
fn decode<T: DeserializeOwned>(body: ResponseBody) -> Result<T, ApiError> {
    match body {
        ResponseBody::Json(value) => serde_json::from_value(value.clone()).map_err(|err| {
            ApiError::UnexpectedFormat {
                message: format!("response did not match the expected shape: {err}"),
                body: value.to_string(),
            }
        }),
        other => Err(ApiError::UnexpectedFormat {
            message: "expected a JSON response body".to_string(),
            body: format!("{other:?}"),
        }),
    }
}
