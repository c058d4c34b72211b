//! Accepting extracted data into the ledger.
//!
//! The extraction service answers with a JSON object holding `invoices`, `products` and
//! `customers` arrays, sometimes wrapped in a fenced code block. [`parse_response`] turns
//! that text into [`ExtractedData`]; [`Ledger::ingest`] gives every draft a fresh identity
//! and appends it. Nothing is reconciled at this point: a new customer "Acme" and an
//! existing customer "Acme" stay two records.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{IngestError, Result};
use crate::ids::RecordId;
use crate::ledger::Ledger;
use crate::money::Money;
use crate::record::{lenient, Customer, Invoice, MissingFields, Product, Record};

/// An extracted invoice line, before it has an identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct InvoiceDraft {
    #[serde(default, deserialize_with = "lenient::text")]
    pub serial_number: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub customer_name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub product_name: String,
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub quantity: Option<u32>,
    #[serde(default, deserialize_with = "lenient::money")]
    pub tax: Option<Money>,
    #[serde(default, deserialize_with = "lenient::money")]
    pub total_amount: Option<Money>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(default)]
    pub missing_fields: MissingFields,
}

/// An extracted product, before it has an identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ProductDraft {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub quantity: Option<u32>,
    #[serde(default, deserialize_with = "lenient::money")]
    pub unit_price: Option<Money>,
    #[serde(default, deserialize_with = "lenient::money")]
    pub tax: Option<Money>,
    #[serde(default, deserialize_with = "lenient::money")]
    pub price_with_tax: Option<Money>,
    #[serde(default, deserialize_with = "lenient::money")]
    pub discount: Option<Money>,
    #[serde(default)]
    pub missing_fields: MissingFields,
}

/// An extracted customer, before it has an identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct CustomerDraft {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub phone_number: String,
    #[serde(default, deserialize_with = "lenient::money")]
    pub total_purchase_amount: Option<Money>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub missing_fields: MissingFields,
}

/// Everything one extraction produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedData {
    /// Invoice lines.
    #[serde(default, deserialize_with = "nullable_list")]
    pub invoices: Vec<InvoiceDraft>,
    /// Products.
    #[serde(default, deserialize_with = "nullable_list")]
    pub products: Vec<ProductDraft>,
    /// Customers.
    #[serde(default, deserialize_with = "nullable_list")]
    pub customers: Vec<CustomerDraft>,
}

impl ExtractedData {
    /// Whether nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty() && self.products.is_empty() && self.customers.is_empty()
    }
}

fn nullable_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Counts of records appended by one ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    /// Invoice lines added.
    pub invoices: usize,
    /// Products added.
    pub products: usize,
    /// Customers added.
    pub customers: usize,
}

impl IngestSummary {
    /// Add another summary's counts to this one.
    pub fn absorb(&mut self, other: Self) {
        self.invoices += other.invoices;
        self.products += other.products;
        self.customers += other.customers;
    }
}

/// Strip an optional fenced code block from `text`.
///
/// Handles a leading ```` ```json ```` or bare ```` ``` ```` fence line and a trailing
/// ```` ``` ````. Text without a leading fence is returned trimmed.
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim()
}

/// Parse the extraction service's reply.
///
/// # Errors
///
/// Returns [`IngestError::UnparsableResponse`], carrying the raw text, when the
/// unfenced text is not a JSON object of the expected shape.
pub fn parse_response(text: &str) -> Result<ExtractedData> {
    let unparsable = |reason: String| IngestError::UnparsableResponse {
        raw: text.to_owned(),
        reason,
    };

    let value: Value =
        serde_json::from_str(strip_code_fence(text)).map_err(|e| unparsable(e.to_string()))?;
    if !value.is_object() {
        return Err(unparsable("expected a JSON object at the top level".to_owned()));
    }
    let data: ExtractedData =
        serde_json::from_value(value).map_err(|e| unparsable(e.to_string()))?;

    debug!(
        invoices = data.invoices.len(),
        products = data.products.len(),
        customers = data.customers.len(),
        "parsed extraction response"
    );
    Ok(data)
}

/// Keep the extractor's own flags when it sent any, otherwise compute them.
fn flag_missing<R: Record>(mut record: R) -> R {
    if record.missing_fields().is_empty() {
        record.refresh_missing();
    }
    record
}

impl InvoiceDraft {
    /// Give the draft a fresh identity.
    #[must_use]
    pub fn into_record(self) -> Invoice {
        flag_missing(Invoice {
            id: RecordId::generate(Invoice::KIND.id_prefix()),
            serial_number: self.serial_number,
            customer_name: self.customer_name,
            product_name: self.product_name,
            quantity: self.quantity,
            tax: self.tax,
            total_amount: self.total_amount,
            date: self.date,
            customer_id: None,
            product_id: None,
            missing_fields: self.missing_fields,
        })
    }
}

impl ProductDraft {
    /// Give the draft a fresh identity.
    #[must_use]
    pub fn into_record(self) -> Product {
        flag_missing(Product {
            id: RecordId::generate(Product::KIND.id_prefix()),
            name: self.name,
            quantity: self.quantity,
            unit_price: self.unit_price,
            tax: self.tax,
            price_with_tax: self.price_with_tax,
            discount: self.discount,
            missing_fields: self.missing_fields,
        })
    }
}

impl CustomerDraft {
    /// Give the draft a fresh identity.
    #[must_use]
    pub fn into_record(self) -> Customer {
        flag_missing(Customer {
            id: RecordId::generate(Customer::KIND.id_prefix()),
            name: self.name,
            phone_number: self.phone_number,
            total_purchase_amount: self.total_purchase_amount,
            email: self.email.filter(|e| !e.trim().is_empty()),
            address: self.address.filter(|a| !a.trim().is_empty()),
            missing_fields: self.missing_fields,
        })
    }
}

impl Ledger {
    /// Append everything in `data`, in input order, under fresh identities.
    pub fn ingest(&mut self, data: ExtractedData) -> IngestSummary {
        let summary = IngestSummary {
            invoices: data.invoices.len(),
            products: data.products.len(),
            customers: data.customers.len(),
        };

        self.invoices
            .add_many(data.invoices.into_iter().map(InvoiceDraft::into_record));
        self.products
            .add_many(data.products.into_iter().map(ProductDraft::into_record));
        self.customers
            .add_many(data.customers.into_iter().map(CustomerDraft::into_record));

        info!(
            invoices = summary.invoices,
            products = summary.products,
            customers = summary.customers,
            "ingested extraction"
        );
        summary
    }
}
