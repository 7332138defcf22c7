//! Synchronous client core for the AvaTax-style tax-calculation REST API.
//!
//! # Overview
//! Typed operations build [`Endpoint`] descriptors as plain data; the
//! [`RequestDispatcher`] is the single chokepoint that turns a descriptor
//! into one blocking HTTP round-trip and normalizes the outcome. The
//! [`TransactionBuilder`] accumulates a multi-line transaction draft through
//! chained calls and submits it through the same dispatcher.
//!
//! # Design
//! - `AvataxClient` owns credentials, identity, and dispatcher; no ambient
//!   state, so differently-credentialed clients coexist.
//! - Transport and decode failures are `Err` values ([`ApiError`]); panics
//!   are reserved for builder misuse, which is a caller-side ordering bug.
//! - The dispatcher decodes into generic `serde_json::Value`; typed
//!   per-operation wrappers do the structured decode, keeping the dispatcher
//!   schema-agnostic.
//! - Response models are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod auth;
pub mod builder;
pub mod client;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod log;
pub mod transaction;

pub use auth::{AuthenticationContext, ClientIdentity, Credentials};
pub use builder::TransactionBuilder;
pub use client::{AvataxClient, PingResultModel};
pub use dispatcher::{DispatcherConfig, ErrorMode, RequestDispatcher, DEFAULT_TIMEOUT};
pub use error::{ApiError, ErrorDetail, ErrorInfo, ErrorResult};
pub use http::{Endpoint, HttpMethod, ResponseBody};
pub use log::{CallLogRecord, CallLogSink, TracingSink};
pub use transaction::{
    AddressLocationInfo, AddressType, AdjustTransactionModel, CreateTransactionModel,
    DocumentType, LineItemModel, TaxDebugLevel, TaxOverrideModel, TaxOverrideType,
    TransactionModel,
};
