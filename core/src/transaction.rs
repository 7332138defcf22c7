//! Wire models for the transaction endpoints.
//!
//! # Design
//! These mirror the remote API's JSON schema (camelCase keys) but are
//! defined independently of the mock-server crate; the integration tests
//! catch schema drift between the two. Optional fields are skipped when
//! unset so the serialized draft only carries what the caller set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Document type of a transaction. Orders are temporary estimates;
/// invoices are permanent and can be committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    SalesOrder,
    SalesInvoice,
    PurchaseOrder,
    PurchaseInvoice,
    ReturnOrder,
    ReturnInvoice,
    InventoryTransferOrder,
    InventoryTransferInvoice,
    Any,
}

/// Role an address plays in a transaction; used as the key of the
/// document- and line-level address maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AddressType {
    ShipFrom,
    ShipTo,
    PointOfOrderOrigin,
    PointOfOrderAcceptance,
    SingleLocation,
}

impl AddressType {
    pub fn as_key(&self) -> &'static str {
        match self {
            AddressType::ShipFrom => "shipFrom",
            AddressType::ShipTo => "shipTo",
            AddressType::PointOfOrderOrigin => "pointOfOrderOrigin",
            AddressType::PointOfOrderAcceptance => "pointOfOrderAcceptance",
            AddressType::SingleLocation => "singleLocation",
        }
    }
}

/// A street address or a lat/long point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressLocationInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line3: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl AddressLocationInfo {
    pub fn street(
        line1: impl Into<String>,
        city: impl Into<String>,
        region: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            line1: Some(line1.into()),
            city: Some(city.into()),
            region: Some(region.into()),
            postal_code: Some(postal_code.into()),
            country: Some(country.into()),
            ..Self::default()
        }
    }

    pub fn lat_long(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..Self::default()
        }
    }
}

/// How much calculation detail the service should echo back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxDebugLevel {
    Normal,
    Diagnostic,
}

/// Kind of tax override applied to a document or line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxOverrideType {
    None,
    TaxAmount,
    TaxDate,
    Exemption,
}

/// Caller-supplied override of the computed tax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxOverrideModel {
    #[serde(rename = "type")]
    pub override_type: TaxOverrideType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_date: Option<String>,
    pub reason: String,
}

/// One line of a transaction draft.
///
/// `number` is assigned at append time by the builder, 1-based and strictly
/// increasing; it is never reassigned by later mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemModel {
    pub number: u32,
    pub amount: f64,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exemption_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<BTreeMap<String, AddressLocationInfo>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_override: Option<TaxOverrideModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discounted: Option<bool>,
}

/// The full create-transaction request payload (the builder's draft).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionModel {
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub company_code: String,
    pub customer_code: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_level: Option<TaxDebugLevel>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub addresses: BTreeMap<String, AddressLocationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_override: Option<TaxOverrideModel>,
    pub lines: Vec<LineItemModel>,
}

/// Adjustment envelope: the current draft as the replacement version of an
/// existing transaction, not submitted by the builder itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustTransactionModel {
    pub adjustment_description: String,
    pub adjustment_reason: String,
    pub new_transaction: CreateTransactionModel,
}

/// Transaction as echoed back by the service after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionModel {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub company_code: String,
    pub customer_code: String,
    pub date: String,
    pub status: String,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub total_tax: f64,
    #[serde(default)]
    pub lines: Vec<LineItemModel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_draft() -> CreateTransactionModel {
        CreateTransactionModel {
            document_type: DocumentType::SalesInvoice,
            code: None,
            company_code: "DEFAULT".to_string(),
            customer_code: "ABC".to_string(),
            date: "2026-08-29".to_string(),
            discount: None,
            commit: None,
            debug_level: None,
            parameters: BTreeMap::new(),
            addresses: BTreeMap::new(),
            tax_override: None,
            lines: Vec::new(),
        }
    }

    #[test]
    fn draft_serializes_with_camel_case_keys() {
        let mut draft = minimal_draft();
        draft.lines.push(LineItemModel {
            number: 1,
            amount: 100.0,
            quantity: 2.0,
            tax_code: Some("P0000000".to_string()),
            exemption_code: None,
            addresses: None,
            parameters: BTreeMap::new(),
            tax_override: None,
            discounted: None,
        });
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["type"], "SalesInvoice");
        assert_eq!(json["companyCode"], "DEFAULT");
        assert_eq!(json["customerCode"], "ABC");
        assert_eq!(json["lines"][0]["number"], 1);
        assert_eq!(json["lines"][0]["taxCode"], "P0000000");
        // Unset optionals are omitted, not serialized as null.
        assert!(json.get("commit").is_none());
        assert!(json["lines"][0].get("exemptionCode").is_none());
    }

    #[test]
    fn address_roles_serialize_as_camel_case_keys() {
        let mut draft = minimal_draft();
        draft.addresses.insert(
            AddressType::ShipTo.as_key().to_string(),
            AddressLocationInfo::street("100 Main St", "Irvine", "CA", "92615", "US"),
        );
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["addresses"]["shipTo"]["postalCode"], "92615");
    }

    #[test]
    fn lat_long_address_has_no_street_fields() {
        let info = AddressLocationInfo::lat_long(47.627935, -122.51702);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["latitude"], 47.627935);
        assert!(json.get("line1").is_none());
    }

    #[test]
    fn tax_override_type_field_renames_to_type() {
        let over = TaxOverrideModel {
            override_type: TaxOverrideType::TaxDate,
            tax_amount: None,
            tax_date: Some("2026-01-01".to_string()),
            reason: "Backdated invoice".to_string(),
        };
        let json = serde_json::to_value(&over).unwrap();
        assert_eq!(json["type"], "TaxDate");
        assert_eq!(json["taxDate"], "2026-01-01");
    }

    #[test]
    fn transaction_model_roundtrips() {
        let body = r#"{
            "id": 123456789,
            "code": "c7b2-4d",
            "companyCode": "DEFAULT",
            "customerCode": "ABC",
            "date": "2026-08-29",
            "status": "Committed",
            "totalAmount": 150.0,
            "totalTax": 11.63,
            "lines": [
                {"number": 1, "amount": 100.0, "quantity": 1.0, "taxCode": "P0000000"},
                {"number": 2, "amount": 50.0, "quantity": 1.0, "exemptionCode": "NT"}
            ]
        }"#;
        let txn: TransactionModel = serde_json::from_str(body).unwrap();
        assert_eq!(txn.lines.len(), 2);
        assert_eq!(txn.lines[1].number, 2);
        assert_eq!(txn.lines[1].exemption_code.as_deref(), Some("NT"));
        let back = serde_json::to_value(&txn).unwrap();
        assert_eq!(back["lines"][0]["number"], 1);
    }
}
