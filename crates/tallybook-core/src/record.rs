//! Record types for tallybook.
//!
//! Three independently editable collections are kept: flat invoice line items,
//! products and customers. They reference each other by *name* only
//! (`Invoice::customer_name` ↔ `Customer::name`, `Invoice::product_name` ↔
//! `Product::name`); the optional id back-references on [`Invoice`] are informational
//! and never used as join keys.
//!
//! Field names on the wire are camelCase, matching what the extraction service emits.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::ids::{IdPrefix, RecordId};
use crate::missing::{compute_missing, Present};
use crate::money::Money;

/// Wire names of record attributes, as they appear in `missingFields`.
pub mod field {
    /// `Invoice::serial_number`.
    pub const SERIAL_NUMBER: &str = "serialNumber";
    /// `Invoice::customer_name`.
    pub const CUSTOMER_NAME: &str = "customerName";
    /// `Invoice::product_name`.
    pub const PRODUCT_NAME: &str = "productName";
    /// Quantity on invoices and products.
    pub const QUANTITY: &str = "quantity";
    /// Tax on invoices and products.
    pub const TAX: &str = "tax";
    /// `Invoice::total_amount`.
    pub const TOTAL_AMOUNT: &str = "totalAmount";
    /// `Invoice::date`.
    pub const DATE: &str = "date";
    /// Product and customer name.
    pub const NAME: &str = "name";
    /// `Product::unit_price`.
    pub const UNIT_PRICE: &str = "unitPrice";
    /// `Product::price_with_tax`.
    pub const PRICE_WITH_TAX: &str = "priceWithTax";
    /// `Customer::phone_number`.
    pub const PHONE_NUMBER: &str = "phoneNumber";
    /// `Customer::total_purchase_amount`.
    pub const TOTAL_PURCHASE_AMOUNT: &str = "totalPurchaseAmount";
}

// ============================================================================
// Entity kinds
// ============================================================================

/// The three record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Flat invoice line items.
    Invoice,
    /// Products.
    Product,
    /// Customers.
    Customer,
}

impl EntityKind {
    /// Plural collection name (`"invoices"`, `"products"`, `"customers"`).
    #[must_use]
    pub const fn collection_name(self) -> &'static str {
        match self {
            Self::Invoice => "invoices",
            Self::Product => "products",
            Self::Customer => "customers",
        }
    }

    /// Prefix used for freshly generated identities of this kind.
    #[must_use]
    pub const fn id_prefix(self) -> IdPrefix {
        match self {
            Self::Invoice => IdPrefix::Invoice,
            Self::Product => IdPrefix::Product,
            Self::Customer => IdPrefix::Customer,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection_name())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "invoice" | "invoices" => Ok(Self::Invoice),
            "product" | "products" => Ok(Self::Product),
            "customer" | "customers" => Ok(Self::Customer),
            other => Err(format!("unknown entity kind: {other}")),
        }
    }
}

// ============================================================================
// Missing-field marker
// ============================================================================

/// The set of required attributes currently absent on a record.
///
/// An empty set and an absent `missingFields` key are the same thing: empty sets are
/// never written out, and `null`/missing deserialize to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MissingFields(BTreeSet<String>);

impl MissingFields {
    /// No missing fields.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether every required field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of missing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether `field` is flagged as missing.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains(field)
    }

    /// Flag a field as missing.
    pub fn insert(&mut self, field: impl Into<String>) {
        self.0.insert(field.into());
    }

    /// Clear the flag for a field.
    pub fn remove(&mut self, field: &str) -> bool {
        self.0.remove(field)
    }

    /// Add every flag from `other`.
    pub fn extend_from(&mut self, other: &Self) {
        self.0.extend(other.0.iter().cloned());
    }

    /// Iterate over flagged field names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for MissingFields {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'de> Deserialize<'de> for MissingFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Option::<Vec<String>>::deserialize(deserializer)?;
        Ok(fields.into_iter().flatten().collect())
    }
}

// ============================================================================
// Record trait
// ============================================================================

/// Behaviour shared by the three stored record kinds.
pub trait Record: Clone {
    /// Which collection the record belongs to.
    const KIND: EntityKind;

    /// The record's identity.
    fn id(&self) -> &RecordId;

    /// Required attributes paired with whether each is currently present.
    fn required_fields(&self) -> Vec<(&'static str, bool)>;

    /// The stored missing-field marker.
    fn missing_fields(&self) -> &MissingFields;

    /// Replace the stored missing-field marker.
    fn set_missing_fields(&mut self, missing: MissingFields);

    /// Recompute the missing-field marker from current values.
    fn refresh_missing(&mut self) {
        let missing = compute_missing(self);
        self.set_missing_fields(missing);
    }
}

// ============================================================================
// Invoice
// ============================================================================

/// A flat invoice line item.
///
/// One logical invoice with several products is stored as several line items sharing
/// a `serial_number`; see [`crate::grouping`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Identity.
    pub id: RecordId,

    /// Invoice number; the grouping key.
    #[serde(default, deserialize_with = "lenient::text")]
    pub serial_number: String,

    /// Customer name (join key into customers).
    #[serde(default, deserialize_with = "lenient::text")]
    pub customer_name: String,

    /// Product name (join key into products).
    #[serde(default, deserialize_with = "lenient::text")]
    pub product_name: String,

    /// Units sold on this line.
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub quantity: Option<u32>,

    /// Tax amount.
    #[serde(default)]
    pub tax: Option<Money>,

    /// Line total including tax.
    #[serde(default)]
    pub total_amount: Option<Money>,

    /// Invoice date, as extracted (normally `YYYY-MM-DD`).
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,

    /// Informational back-reference to a customer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<RecordId>,

    /// Informational back-reference to a product.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<RecordId>,

    /// Required attributes currently absent.
    #[serde(default, skip_serializing_if = "MissingFields::is_empty")]
    pub missing_fields: MissingFields,
}

impl Record for Invoice {
    const KIND: EntityKind = EntityKind::Invoice;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn required_fields(&self) -> Vec<(&'static str, bool)> {
        vec![
            (field::SERIAL_NUMBER, self.serial_number.is_present()),
            (field::CUSTOMER_NAME, self.customer_name.is_present()),
            (field::PRODUCT_NAME, self.product_name.is_present()),
            (field::QUANTITY, self.quantity.is_present()),
            (field::TAX, self.tax.is_present()),
            (field::TOTAL_AMOUNT, self.total_amount.is_present()),
            (field::DATE, self.date.is_present()),
        ]
    }

    fn missing_fields(&self) -> &MissingFields {
        &self.missing_fields
    }

    fn set_missing_fields(&mut self, missing: MissingFields) {
        self.missing_fields = missing;
    }
}

// ============================================================================
// Product
// ============================================================================

/// A product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Identity.
    pub id: RecordId,

    /// Product name (join key).
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,

    /// Units.
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub quantity: Option<u32>,

    /// Unit price after any discount.
    #[serde(default)]
    pub unit_price: Option<Money>,

    /// Tax amount.
    #[serde(default)]
    pub tax: Option<Money>,

    /// Price including tax.
    #[serde(default)]
    pub price_with_tax: Option<Money>,

    /// Discount, if one was stated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Money>,

    /// Required attributes currently absent.
    #[serde(default, skip_serializing_if = "MissingFields::is_empty")]
    pub missing_fields: MissingFields,
}

impl Record for Product {
    const KIND: EntityKind = EntityKind::Product;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn required_fields(&self) -> Vec<(&'static str, bool)> {
        vec![
            (field::NAME, self.name.is_present()),
            (field::QUANTITY, self.quantity.is_present()),
            (field::UNIT_PRICE, self.unit_price.is_present()),
            (field::TAX, self.tax.is_present()),
            (field::PRICE_WITH_TAX, self.price_with_tax.is_present()),
        ]
    }

    fn missing_fields(&self) -> &MissingFields {
        &self.missing_fields
    }

    fn set_missing_fields(&mut self, missing: MissingFields) {
        self.missing_fields = missing;
    }
}

// ============================================================================
// Customer
// ============================================================================

/// A customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Identity.
    pub id: RecordId,

    /// Customer name (join key).
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,

    /// Phone number.
    #[serde(default, deserialize_with = "lenient::text")]
    pub phone_number: String,

    /// Sum of the customer's invoice totals. Maintained by propagation.
    #[serde(default)]
    pub total_purchase_amount: Option<Money>,

    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Postal address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Required attributes currently absent.
    #[serde(default, skip_serializing_if = "MissingFields::is_empty")]
    pub missing_fields: MissingFields,
}

impl Record for Customer {
    const KIND: EntityKind = EntityKind::Customer;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn required_fields(&self) -> Vec<(&'static str, bool)> {
        vec![
            (field::NAME, self.name.is_present()),
            (field::PHONE_NUMBER, self.phone_number.is_present()),
            (
                field::TOTAL_PURCHASE_AMOUNT,
                self.total_purchase_amount.is_present(),
            ),
        ]
    }

    fn missing_fields(&self) -> &MissingFields {
        &self.missing_fields
    }

    fn set_missing_fields(&mut self, missing: MissingFields) {
        self.missing_fields = missing;
    }
}

// ============================================================================
// Lenient field decoding
// ============================================================================

/// Decoders tolerant of what language models actually emit: `null` for unknown
/// strings, numbers where strings were asked for, `2.0` for a count.
pub(crate) mod lenient {
    use serde::de::Error;

    use super::{Deserialize, Deserializer, Money, Value};

    pub(crate) fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(s)) => Ok(s),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(Value::Bool(b)) => Ok(b.to_string()),
            Some(other) => Err(D::Error::custom(format!(
                "expected a string, found {other}"
            ))),
        }
    }

    /// Unusable counts (negative, fractional, non-numeric text) decode as absent so
    /// the validator flags them instead of the whole payload failing.
    pub(crate) fn quantity<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u32>, D::Error> {
        let number = match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(number.and_then(whole_count))
    }

    /// Amounts the model could not produce (`""`, `"N/A"`) decode as absent.
    pub(crate) fn money<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Money>, D::Error> {
        let Some(value) = Option::<Value>::deserialize(deserializer)? else {
            return Ok(None);
        };
        if value.is_null() {
            return Ok(None);
        }
        match Money::deserialize(value) {
            Ok(amount) => Ok(Some(amount)),
            Err(err) => {
                tracing::debug!(error = %err, "discarding unusable amount");
                Ok(None)
            }
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn whole_count(n: f64) -> Option<u32> {
        if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) {
            Some(n as u32)
        } else {
            tracing::debug!(value = n, "discarding unusable quantity");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invoice_decodes_camel_case_and_skips_empty_marker() {
        let invoice: Invoice = serde_json::from_value(json!({
            "id": "inv-1",
            "serialNumber": "S1",
            "customerName": "Bob",
            "productName": "Pen",
            "quantity": 2,
            "tax": 1,
            "totalAmount": 10,
            "date": "2024-01-01"
        }))
        .unwrap();
        assert_eq!(invoice.serial_number, "S1");
        assert_eq!(invoice.total_amount, Some(Money::from_cents(1000)));
        assert!(invoice.missing_fields.is_empty());

        let value = serde_json::to_value(&invoice).unwrap();
        assert!(value.get("missingFields").is_none());
        assert!(value.get("customerId").is_none());
    }

    #[test]
    fn null_strings_and_float_counts_are_tolerated() {
        let invoice: Invoice = serde_json::from_value(json!({
            "id": "inv-1",
            "serialNumber": 1042,
            "customerName": null,
            "quantity": 3.0,
            "missingFields": null
        }))
        .unwrap();
        assert_eq!(invoice.serial_number, "1042");
        assert_eq!(invoice.customer_name, "");
        assert_eq!(invoice.quantity, Some(3));
        assert!(invoice.missing_fields.is_empty());
    }

    #[test]
    fn unusable_quantity_decodes_as_absent() {
        let product: Product = serde_json::from_value(json!({
            "id": "prod-1",
            "name": "Rice",
            "quantity": 1.5
        }))
        .unwrap();
        assert_eq!(product.quantity, None);
    }

    #[test]
    fn missing_fields_round_trip_as_array() {
        let customer: Customer = serde_json::from_value(json!({
            "id": "cust-1",
            "name": "Acme",
            "missingFields": ["phoneNumber"]
        }))
        .unwrap();
        assert!(customer.missing_fields.contains(field::PHONE_NUMBER));
        let value = serde_json::to_value(&customer).unwrap();
        assert_eq!(value["missingFields"], json!(["phoneNumber"]));
    }

    #[test]
    fn entity_kind_parses_singular_and_plural() {
        assert_eq!("invoices".parse::<EntityKind>(), Ok(EntityKind::Invoice));
        assert_eq!("Customer".parse::<EntityKind>(), Ok(EntityKind::Customer));
        assert!("orders".parse::<EntityKind>().is_err());
    }
}
