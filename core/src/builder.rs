//! Fluent construction of create-transaction payloads.
//!
//! # Design
//! The builder accumulates a `CreateTransactionModel` through chained calls.
//! Lines are append-only: each `with_line`/`with_exempt_line` assigns the
//! next 1-based sequence number, and numbers are never reassigned or reused.
//! "The current line" is always the last element of the line vector, so the
//! monotonic-numbering invariant is enforced by the collection itself.
//! Calling a line-mutation method before any line exists is an ordering bug
//! in caller code and panics; it is never a silent no-op and never mutates
//! document-level state.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::client::AvataxClient;
use crate::error::ApiError;
use crate::transaction::{
    AddressLocationInfo, AddressType, AdjustTransactionModel, CreateTransactionModel,
    DocumentType, LineItemModel, TaxDebugLevel, TaxOverrideModel, TransactionModel,
};

/// Stateful accumulator for one transaction draft.
///
/// Single-owner, sequential use only. `create` may be called more than once;
/// each call resubmits the accumulated draft as-is, which produces a
/// duplicate document unless the transaction code was changed in between.
pub struct TransactionBuilder<'a> {
    client: &'a AvataxClient,
    model: CreateTransactionModel,
    next_line_number: u32,
}

impl<'a> TransactionBuilder<'a> {
    /// Start a draft dated today (UTC). Every other document field starts
    /// unset and is filled in by the `with_*` methods.
    pub fn new(
        client: &'a AvataxClient,
        company_code: impl Into<String>,
        document_type: DocumentType,
        customer_code: impl Into<String>,
    ) -> Self {
        Self {
            client,
            model: CreateTransactionModel {
                document_type,
                code: None,
                company_code: company_code.into(),
                customer_code: customer_code.into(),
                date: Utc::now().format("%Y-%m-%d").to_string(),
                discount: None,
                commit: None,
                debug_level: None,
                parameters: BTreeMap::new(),
                addresses: BTreeMap::new(),
                tax_override: None,
                lines: Vec::new(),
            },
            next_line_number: 1,
        }
    }

    // --- document-level fields (overwrite in place) ---

    pub fn with_type(mut self, document_type: DocumentType) -> Self {
        self.model.document_type = document_type;
        self
    }

    pub fn with_transaction_code(mut self, code: impl Into<String>) -> Self {
        self.model.code = Some(code.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.model.date = date.into();
        self
    }

    pub fn with_commit(mut self) -> Self {
        self.model.commit = Some(true);
        self
    }

    /// Ask the service to echo back full calculation detail.
    pub fn with_diagnostics(mut self) -> Self {
        self.model.debug_level = Some(TaxDebugLevel::Diagnostic);
        self
    }

    pub fn with_discount_amount(mut self, discount: f64) -> Self {
        self.model.discount = Some(discount);
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.model.parameters.insert(name.into(), value.into());
        self
    }

    /// Set a document-level address for a role; re-invoking with the same
    /// role overwrites.
    pub fn with_address(mut self, address_type: AddressType, address: AddressLocationInfo) -> Self {
        self.model
            .addresses
            .insert(address_type.as_key().to_string(), address);
        self
    }

    /// Set a document-level address as a latitude/longitude point.
    pub fn with_lat_long(self, address_type: AddressType, latitude: f64, longitude: f64) -> Self {
        self.with_address(address_type, AddressLocationInfo::lat_long(latitude, longitude))
    }

    pub fn with_tax_override(mut self, tax_override: TaxOverrideModel) -> Self {
        self.model.tax_override = Some(tax_override);
        self
    }

    // --- lines ---

    /// Append a line with the next sequence number. Never touches prior lines.
    pub fn with_line(mut self, amount: f64, quantity: f64, tax_code: impl Into<String>) -> Self {
        let number = self.take_line_number();
        self.model.lines.push(LineItemModel {
            number,
            amount,
            quantity,
            tax_code: Some(tax_code.into()),
            exemption_code: None,
            addresses: None,
            parameters: BTreeMap::new(),
            tax_override: None,
            discounted: None,
        });
        self
    }

    /// Append a tax-exempt line: quantity fixed at 1, an exemption code
    /// instead of a tax code.
    pub fn with_exempt_line(mut self, amount: f64, exemption_code: impl Into<String>) -> Self {
        let number = self.take_line_number();
        self.model.lines.push(LineItemModel {
            number,
            amount,
            quantity: 1.0,
            tax_code: None,
            exemption_code: Some(exemption_code.into()),
            addresses: None,
            parameters: BTreeMap::new(),
            tax_override: None,
            discounted: None,
        });
        self
    }

    /// Give the most recently appended line its own address for a role.
    ///
    /// # Panics
    /// Panics if no line has been appended yet.
    pub fn with_line_address(
        mut self,
        address_type: AddressType,
        address: AddressLocationInfo,
    ) -> Self {
        self.current_line()
            .addresses
            .get_or_insert_with(BTreeMap::new)
            .insert(address_type.as_key().to_string(), address);
        self
    }

    /// Attach a parameter to the most recently appended line.
    ///
    /// # Panics
    /// Panics if no line has been appended yet.
    pub fn with_line_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.current_line().parameters.insert(name.into(), value.into());
        self
    }

    /// Mark the most recently appended line as participating in the
    /// document-level discount.
    ///
    /// # Panics
    /// Panics if no line has been appended yet.
    pub fn with_item_discount(mut self, discounted: bool) -> Self {
        self.current_line().discounted = Some(discounted);
        self
    }

    /// Apply a tax override to the most recently appended line.
    ///
    /// # Panics
    /// Panics if no line has been appended yet.
    pub fn with_line_tax_override(mut self, tax_override: TaxOverrideModel) -> Self {
        self.current_line().tax_override = Some(tax_override);
        self
    }

    // --- terminal operations ---

    /// The accumulated draft, for inspection or manual submission.
    pub fn model(&self) -> &CreateTransactionModel {
        &self.model
    }

    /// Submit the accumulated draft via the client's create-transaction
    /// operation.
    pub fn create(&self) -> Result<TransactionModel, ApiError> {
        self.client.create_transaction(&self.model)
    }

    /// Wrap the accumulated draft as the replacement version inside an
    /// adjustment envelope, without submitting anything.
    pub fn create_adjustment_request(
        &self,
        description: impl Into<String>,
        reason: impl Into<String>,
    ) -> AdjustTransactionModel {
        AdjustTransactionModel {
            adjustment_description: description.into(),
            adjustment_reason: reason.into(),
            new_transaction: self.model.clone(),
        }
    }

    fn take_line_number(&mut self) -> u32 {
        let number = self.next_line_number;
        self.next_line_number += 1;
        number
    }

    fn current_line(&mut self) -> &mut LineItemModel {
        match self.model.lines.last_mut() {
            Some(line) => line,
            None => panic!(
                "line mutation before any line exists: call with_line or with_exempt_line first"
            ),
        }
    }
}
