//! Grouping flat invoice lines into logical invoices.
//!
//! Lines sharing a serial number (exact, case-sensitive string equality) form one
//! [`GroupedInvoice`]. Groups are derived on every read and never stored, so their
//! totals always equal the sum of their current members.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::RecordId;
use crate::money::Money;
use crate::record::{Invoice, MissingFields};

/// A logical invoice: every line item sharing one serial number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedInvoice {
    /// Identity of the first member line.
    pub id: RecordId,
    /// The shared serial number.
    pub serial_number: String,
    /// Customer name of the first member.
    pub customer_name: String,
    /// One product name per member, in collection order.
    pub product_names: Vec<String>,
    /// Member line identities, in collection order.
    pub invoice_ids: Vec<RecordId>,
    /// Sum of member quantities (absent counts as zero).
    pub quantity: u64,
    /// Sum of member tax.
    pub tax: Money,
    /// Sum of member totals.
    pub total_amount: Money,
    /// Date of the first member.
    pub date: String,
    /// Union of member missing fields.
    #[serde(default, skip_serializing_if = "MissingFields::is_empty")]
    pub missing_fields: MissingFields,
}

impl GroupedInvoice {
    fn seed(invoice: &Invoice) -> Self {
        Self {
            id: invoice.id.clone(),
            serial_number: invoice.serial_number.clone(),
            customer_name: invoice.customer_name.clone(),
            product_names: vec![invoice.product_name.clone()],
            invoice_ids: vec![invoice.id.clone()],
            quantity: u64::from(invoice.quantity.unwrap_or(0)),
            tax: invoice.tax.unwrap_or(Money::ZERO),
            total_amount: invoice.total_amount.unwrap_or(Money::ZERO),
            date: invoice.date.clone(),
            missing_fields: invoice.missing_fields.clone(),
        }
    }

    fn absorb(&mut self, invoice: &Invoice) {
        self.product_names.push(invoice.product_name.clone());
        self.invoice_ids.push(invoice.id.clone());
        self.quantity += u64::from(invoice.quantity.unwrap_or(0));
        self.tax += invoice.tax.unwrap_or(Money::ZERO);
        self.total_amount += invoice.total_amount.unwrap_or(Money::ZERO);
        self.missing_fields.extend_from(&invoice.missing_fields);
    }

    /// Number of member lines.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.invoice_ids.len()
    }

    /// Whether `id` is one of this group's member lines.
    #[must_use]
    pub fn contains(&self, id: &RecordId) -> bool {
        self.invoice_ids.contains(id)
    }
}

/// Group flat invoice lines by serial number.
///
/// Single left-to-right pass. Groups come out in order of first appearance of their
/// serial number; re-deriving from unchanged input gives an identical result.
#[must_use]
pub fn group_by_serial(invoices: &[Invoice]) -> Vec<GroupedInvoice> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<GroupedInvoice> = Vec::new();

    for invoice in invoices {
        if let Some(&slot) = index.get(invoice.serial_number.as_str()) {
            groups[slot].absorb(invoice);
        } else {
            index.insert(invoice.serial_number.as_str(), groups.len());
            groups.push(GroupedInvoice::seed(invoice));
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::field;

    fn line(id: &str, serial: &str, customer: &str, product: &str, qty: u32, tax: i64, total: i64) -> Invoice {
        Invoice {
            id: id.parse().unwrap(),
            serial_number: serial.into(),
            customer_name: customer.into(),
            product_name: product.into(),
            quantity: Some(qty),
            tax: Some(Money::from_cents(tax)),
            total_amount: Some(Money::from_cents(total)),
            date: "2024-01-01".into(),
            customer_id: None,
            product_id: None,
            missing_fields: MissingFields::none(),
        }
    }

    #[test]
    fn two_lines_with_one_serial_form_one_group() {
        let invoices = vec![
            line("i1", "S1", "Bob", "Pen", 2, 100, 1000),
            line("i2", "S1", "Bob", "Cup", 1, 50, 500),
        ];
        let groups = group_by_serial(&invoices);

        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.id.as_str(), "i1");
        assert_eq!(group.product_names, vec!["Pen", "Cup"]);
        assert_eq!(group.quantity, 3);
        assert_eq!(group.tax, Money::from_cents(150));
        assert_eq!(group.total_amount, Money::from_cents(1500));
    }

    #[test]
    fn groups_follow_first_appearance_order() {
        let invoices = vec![
            line("i1", "B", "x", "p", 1, 0, 0),
            line("i2", "A", "x", "p", 1, 0, 0),
            line("i3", "B", "x", "q", 1, 0, 0),
            line("i4", "C", "x", "p", 1, 0, 0),
        ];
        let serials: Vec<_> = group_by_serial(&invoices)
            .into_iter()
            .map(|g| g.serial_number)
            .collect();
        assert_eq!(serials, vec!["B", "A", "C"]);
    }

    #[test]
    fn serial_matching_is_case_sensitive() {
        let invoices = vec![
            line("i1", "inv-1", "x", "p", 1, 0, 0),
            line("i2", "INV-1", "x", "p", 1, 0, 0),
        ];
        assert_eq!(group_by_serial(&invoices).len(), 2);
    }

    #[test]
    fn absent_amounts_count_as_zero_and_missing_fields_union() {
        let mut first = line("i1", "S", "x", "p", 2, 100, 1000);
        first.missing_fields.insert(field::DATE);
        let mut second = line("i2", "S", "x", "q", 0, 0, 0);
        second.quantity = None;
        second.tax = None;
        second.total_amount = None;
        second.missing_fields = [field::QUANTITY, field::TAX].into_iter().collect();

        let group = &group_by_serial(&[first, second])[0];
        assert_eq!(group.quantity, 2);
        assert_eq!(group.tax, Money::from_cents(100));
        let missing: Vec<_> = group.missing_fields.iter().collect();
        assert_eq!(missing, vec![field::DATE, field::QUANTITY, field::TAX]);
    }

    #[test]
    fn derivation_is_idempotent() {
        let invoices = vec![
            line("i1", "S1", "Bob", "Pen", 2, 100, 1000),
            line("i2", "S2", "Ann", "Cup", 1, 50, 500),
            line("i3", "S1", "Bob", "Ink", 4, 10, 90),
        ];
        assert_eq!(group_by_serial(&invoices), group_by_serial(&invoices));
    }

    #[test]
    fn every_line_lands_in_exactly_one_group() {
        let invoices = vec![
            line("i1", "S1", "Bob", "Pen", 2, 100, 1000),
            line("i2", "S2", "Ann", "Cup", 1, 50, 500),
            line("i3", "S1", "Bob", "Ink", 4, 10, 90),
        ];
        let groups = group_by_serial(&invoices);
        let members: usize = groups.iter().map(GroupedInvoice::member_count).sum();
        assert_eq!(members, invoices.len());
        for invoice in &invoices {
            assert_eq!(groups.iter().filter(|g| g.contains(&invoice.id)).count(), 1);
        }
    }
}
