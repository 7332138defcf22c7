//! In-process test double for the tax-calculation REST API.
//!
//! Implements the subset of endpoints the core client exercises: ping,
//! create-transaction, and the flat tax-rate CSV download. DTOs here are
//! deliberately independent from the core crate; integration tests catch
//! schema drift between the two. Lines are carried as raw JSON values and
//! echoed back verbatim so round-trip tests see exactly what they sent.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Flat rate applied to taxable lines.
const MOCK_TAX_RATE: f64 = 0.0775;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransaction {
    #[serde(rename = "type")]
    pub document_type: Option<String>,
    pub code: Option<String>,
    pub company_code: String,
    pub customer_code: String,
    pub date: String,
    #[serde(default)]
    pub commit: Option<bool>,
    #[serde(default)]
    pub lines: Vec<Value>,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub code: String,
    pub company_code: String,
    pub customer_code: String,
    pub date: String,
    pub status: String,
    pub total_amount: f64,
    pub total_tax: f64,
    pub lines: Vec<Value>,
}

pub type Db = Arc<RwLock<HashMap<i64, Transaction>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/api/v2/utilities/ping", get(ping))
        .route("/api/v2/transactions/create", post(create_transaction))
        .route("/api/v2/taxratesbyzipcode/files/{date}", get(tax_rate_file))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn correlation_id() -> (&'static str, String) {
    ("x-correlation-id", Uuid::new_v4().to_string())
}

fn authenticated(headers: &HeaderMap) -> bool {
    headers.contains_key(header::AUTHORIZATION)
}

fn authentication_error() -> (StatusCode, [(&'static str, String); 1], Json<Value>) {
    let body = json!({
        "error": {
            "code": "AuthenticationException",
            "message": "Authentication failed. Provide an Authorization header.",
            "target": "HttpRequestHeaders",
            "details": [
                {"code": "AuthenticationException", "number": 30, "faultCode": "Client"}
            ]
        }
    });
    (StatusCode::UNAUTHORIZED, [correlation_id()], Json(body))
}

async fn ping(headers: HeaderMap) -> impl IntoResponse {
    let body = json!({
        "version": "mock-1.0",
        "authenticated": authenticated(&headers),
        "authenticationType": if authenticated(&headers) { "UsernamePassword" } else { "None" },
    });
    ([correlation_id()], Json(body))
}

async fn create_transaction(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateTransaction>,
) -> axum::response::Response {
    if !authenticated(&headers) {
        return authentication_error().into_response();
    }

    let total_amount: f64 = input
        .lines
        .iter()
        .filter_map(|line| line["amount"].as_f64())
        .sum();
    // Exempt lines carry an exemptionCode and contribute no tax.
    let total_tax: f64 = input
        .lines
        .iter()
        .filter(|line| line.get("exemptionCode").and_then(Value::as_str).is_none())
        .filter_map(|line| line["amount"].as_f64())
        .map(|amount| amount * MOCK_TAX_RATE)
        .sum();

    let mut transactions = db.write().await;
    let id = transactions.len() as i64 + 1;
    let transaction = Transaction {
        id,
        code: input.code.unwrap_or_else(|| Uuid::new_v4().to_string()),
        company_code: input.company_code,
        customer_code: input.customer_code,
        date: input.date,
        status: if input.commit.unwrap_or(false) { "Committed" } else { "Saved" }.to_string(),
        total_amount,
        total_tax,
        lines: input.lines,
    };
    transactions.insert(id, transaction.clone());

    (StatusCode::CREATED, [correlation_id()], Json(transaction)).into_response()
}

async fn tax_rate_file(Path(date): Path<String>) -> impl IntoResponse {
    let csv = format!(
        "ZIP_CODE,STATE_ABBREV,TOTAL_SALES_TAX,CONTENT_DATE\n\
         92615,CA,0.0775,{date}\n\
         98110,WA,0.0900,{date}\n"
    );
    (
        [
            (header::CONTENT_TYPE.as_str(), "text/csv".to_string()),
            correlation_id(),
        ],
        csv,
    )
}
