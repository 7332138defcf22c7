//! Credential handling and per-call header rendering.
//!
//! # Design
//! Exactly one credential variant is active at a time; setting a new one
//! replaces the old (last-write-wins). No local validation is performed —
//! whether a credential is good is only ever decided by the remote service.
//! `render_headers` is a pure function of the current variant, so it can be
//! unit-tested without any network setup.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::ApiError;

/// Identifier reported in the `X-Avalara-Client` banner.
pub const SDK_IDENTIFIER: &str = "RustRestClient";

/// SDK version reported in the `X-Avalara-Client` banner.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One of the mutually exclusive credential sets accepted by the service.
///
/// The two pair variants render as HTTP Basic auth; `BearerToken` renders as
/// an `Authorization: Bearer` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    UsernamePassword { username: String, password: String },
    AccountLicenseKey { account_id: String, license_key: String },
    BearerToken { token: String },
}

impl Credentials {
    /// The value for the `Authorization` header.
    fn authorization_value(&self) -> String {
        match self {
            Credentials::UsernamePassword { username, password } => {
                format!("Basic {}", BASE64.encode(format!("{username}:{password}")))
            }
            Credentials::AccountLicenseKey { account_id, license_key } => {
                format!("Basic {}", BASE64.encode(format!("{account_id}:{license_key}")))
            }
            Credentials::BearerToken { token } => format!("Bearer {token}"),
        }
    }
}

/// Immutable application identity, fixed at client construction.
#[derive(Debug, Clone)]
pub struct ClientIdentity {
    pub app_name: String,
    pub app_version: String,
    pub machine_name: String,
}

impl ClientIdentity {
    /// Fails with a configuration error when `app_name` or `app_version`
    /// is empty. `machine_name` may be blank.
    pub fn new(
        app_name: impl Into<String>,
        app_version: impl Into<String>,
        machine_name: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let app_name = app_name.into();
        let app_version = app_version.into();
        if app_name.is_empty() {
            return Err(ApiError::Configuration("app_name must not be empty".to_string()));
        }
        if app_version.is_empty() {
            return Err(ApiError::Configuration("app_version must not be empty".to_string()));
        }
        Ok(Self {
            app_name,
            app_version,
            machine_name: machine_name.into(),
        })
    }

    /// The `X-Avalara-Client` banner string.
    pub fn client_header(&self) -> String {
        format!(
            "{}; {}; {}; {}; {}",
            self.app_name, self.app_version, SDK_IDENTIFIER, SDK_VERSION, self.machine_name
        )
    }
}

/// Holds the active credential and renders transport headers for each call.
#[derive(Debug, Clone, Default)]
pub struct AuthenticationContext {
    credentials: Option<Credentials>,
}

impl AuthenticationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any configured credential with a username/password pair.
    pub fn set_username_password(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.credentials = Some(Credentials::UsernamePassword {
            username: username.into(),
            password: password.into(),
        });
    }

    /// Replace any configured credential with an account id / license key pair.
    pub fn set_license_key(&mut self, account_id: impl Into<String>, license_key: impl Into<String>) {
        self.credentials = Some(Credentials::AccountLicenseKey {
            account_id: account_id.into(),
            license_key: license_key.into(),
        });
    }

    /// Replace any configured credential with an OAuth bearer token.
    pub fn set_bearer_token(&mut self, token: impl Into<String>) {
        self.credentials = Some(Credentials::BearerToken { token: token.into() });
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Headers attached to every call: `Accept`, the client banner, and at
    /// most one `Authorization` header. With no credential configured the
    /// auth header is simply absent; the remote service then rejects the
    /// call with its own authentication error.
    pub fn render_headers(&self, identity: &ClientIdentity) -> Vec<(String, String)> {
        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("X-Avalara-Client".to_string(), identity.client_header()),
        ];
        if let Some(creds) = &self.credentials {
            headers.push(("Authorization".to_string(), creds.authorization_value()));
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> ClientIdentity {
        ClientIdentity::new("TestApp", "1.0", "test-host").unwrap()
    }

    fn auth_headers(ctx: &AuthenticationContext) -> Vec<String> {
        ctx.render_headers(&identity())
            .into_iter()
            .filter(|(name, _)| name == "Authorization")
            .map(|(_, value)| value)
            .collect()
    }

    #[test]
    fn identity_requires_app_name_and_version() {
        assert!(matches!(
            ClientIdentity::new("", "1.0", "m"),
            Err(ApiError::Configuration(_))
        ));
        assert!(matches!(
            ClientIdentity::new("App", "", "m"),
            Err(ApiError::Configuration(_))
        ));
        assert!(ClientIdentity::new("App", "1.0", "").is_ok());
    }

    #[test]
    fn banner_contains_identity_and_sdk_fields() {
        let banner = identity().client_header();
        assert_eq!(banner, format!("TestApp; 1.0; RustRestClient; {SDK_VERSION}; test-host"));
    }

    #[test]
    fn username_password_renders_basic_auth() {
        let mut ctx = AuthenticationContext::new();
        ctx.set_username_password("bob", "secret");
        let auth = auth_headers(&ctx);
        assert_eq!(auth, vec![format!("Basic {}", BASE64.encode("bob:secret"))]);
    }

    #[test]
    fn license_key_renders_basic_auth() {
        let mut ctx = AuthenticationContext::new();
        ctx.set_license_key("12345", "1A2B3C");
        let auth = auth_headers(&ctx);
        assert_eq!(auth, vec![format!("Basic {}", BASE64.encode("12345:1A2B3C"))]);
    }

    #[test]
    fn bearer_token_renders_bearer_auth_only() {
        let mut ctx = AuthenticationContext::new();
        ctx.set_bearer_token("tok-abc");
        let auth = auth_headers(&ctx);
        assert_eq!(auth, vec!["Bearer tok-abc".to_string()]);
    }

    #[test]
    fn setting_a_new_variant_replaces_the_old() {
        let mut ctx = AuthenticationContext::new();
        ctx.set_username_password("bob", "secret");
        ctx.set_bearer_token("tok-abc");
        let auth = auth_headers(&ctx);
        // Exactly one auth header, and it is the bearer one.
        assert_eq!(auth.len(), 1);
        assert!(auth[0].starts_with("Bearer "));
    }

    #[test]
    fn no_credentials_renders_no_auth_header() {
        let ctx = AuthenticationContext::new();
        let headers = ctx.render_headers(&identity());
        assert!(headers.iter().all(|(name, _)| name != "Authorization"));
        assert!(headers.iter().any(|(name, _)| name == "Accept"));
        assert!(headers.iter().any(|(name, _)| name == "X-Avalara-Client"));
    }
}
