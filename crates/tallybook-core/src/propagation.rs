//! Cross-entity propagation.
//!
//! The collections join on names, never on identities: `Invoice::customer_name` matches
//! `Customer::name` and `Invoice::product_name` matches `Product::name`. Renames are
//! therefore fanned out here, synchronously, before the call returns. Every write goes
//! through [`Collection::update`](crate::collection::Collection::update), so missing
//! fields are recomputed on each touched record.
//!
//! Deletes never cascade. Invoices may keep naming a customer or product that no longer
//! exists; nothing here treats that as an error.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::grouping::GroupedInvoice;
use crate::ids::RecordId;
use crate::ledger::Ledger;
use crate::money::Money;
use crate::record::{Customer, Invoice, Product};

/// New values for the shared fields of a grouped invoice.
///
/// A field that is absent or blank keeps each member's current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupEdit {
    /// New serial number.
    #[serde(default)]
    pub serial_number: Option<String>,
    /// New customer name.
    #[serde(default)]
    pub customer_name: Option<String>,
    /// New date.
    #[serde(default)]
    pub date: Option<String>,
    /// New product name. Only honoured on single-member groups.
    #[serde(default)]
    pub product_name: Option<String>,
}

impl GroupEdit {
    /// Whether this edit asks to change the product name of a group with several
    /// members, which is not supported.
    #[must_use]
    pub fn renames_product_of(&self, group: &GroupedInvoice) -> bool {
        group.member_count() > 1 && non_blank(self.product_name.as_deref()).is_some()
    }
}

/// What a group edit touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupEditOutcome {
    /// Member lines rewritten.
    pub members_updated: usize,
    /// Member lines no longer present in the collection.
    pub members_skipped: usize,
    /// Invoices outside the group moved to the new customer name.
    pub invoices_renamed: usize,
    /// Customer records renamed.
    pub customers_renamed: usize,
    /// Whether a multi-member product rename was dropped.
    pub product_edit_ignored: bool,
}

/// What a customer or product edit touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameOutcome {
    /// Whether the record itself was found and replaced.
    pub updated: bool,
    /// Invoices moved to the new name.
    pub invoices_renamed: usize,
}

/// What a delete removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    /// Records removed.
    pub removed: usize,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl Ledger {
    /// Apply `edit` to every member of `group`.
    ///
    /// `group` is normally a fresh derivation, but members that have disappeared in the
    /// meantime are skipped. When the customer name changes and a customer record carries
    /// the old name, that record is renamed, every other invoice still naming the old
    /// customer follows, and purchase totals for the new name are recomputed.
    pub fn edit_group(&mut self, group: &GroupedInvoice, edit: &GroupEdit) -> GroupEditOutcome {
        let mut outcome = GroupEditOutcome {
            product_edit_ignored: edit.renames_product_of(group),
            ..GroupEditOutcome::default()
        };
        let new_customer = non_blank(edit.customer_name.as_deref());
        let new_product = if group.member_count() == 1 {
            non_blank(edit.product_name.as_deref())
        } else {
            None
        };

        let mut renamed_from: Vec<String> = Vec::new();

        for id in &group.invoice_ids {
            let Some(old) = self.invoices.get(id) else {
                debug!(%id, group = %group.id, "group member vanished before edit");
                outcome.members_skipped += 1;
                continue;
            };

            let mut updated = old.clone();
            if let Some(serial) = non_blank(edit.serial_number.as_deref()) {
                updated.serial_number = serial.to_owned();
            }
            if let Some(date) = non_blank(edit.date.as_deref()) {
                updated.date = date.to_owned();
            }
            if let Some(product) = new_product {
                updated.product_name = product.to_owned();
            }
            if let Some(customer) = new_customer {
                if old.customer_name != customer && !renamed_from.contains(&old.customer_name) {
                    renamed_from.push(old.customer_name.clone());
                }
                updated.customer_name = customer.to_owned();
            }

            if self.invoices.update(updated) {
                outcome.members_updated += 1;
            }
        }

        if let Some(new_name) = new_customer {
            for old_name in &renamed_from {
                let Some(mut customer) = self
                    .customers
                    .iter()
                    .find(|c| &c.name == old_name)
                    .cloned()
                else {
                    debug!(old = %old_name, "no customer record to rename");
                    continue;
                };

                outcome.invoices_renamed += self.rename_customer_on_invoices(old_name, new_name);
                customer.name = new_name.to_owned();
                if self.customers.update(customer) {
                    outcome.customers_renamed += 1;
                }
            }
            if outcome.customers_renamed > 0 {
                self.refresh_purchase_totals(new_name);
            }
        }

        info!(
            group = %group.id,
            members_updated = outcome.members_updated,
            members_skipped = outcome.members_skipped,
            invoices_renamed = outcome.invoices_renamed,
            customers_renamed = outcome.customers_renamed,
            "grouped invoice edited"
        );
        outcome
    }

    /// Replace a customer record, moving invoices along on a rename.
    ///
    /// The purchase total is recomputed from the invoices carrying the customer's
    /// post-edit name whenever there are any. A customer no invoice names keeps the
    /// submitted total instead of dropping to zero.
    pub fn edit_customer(&mut self, mut customer: Customer) -> RenameOutcome {
        let Some(old_name) = self.customers.get(&customer.id).map(|c| c.name.clone()) else {
            debug!(id = %customer.id, "edit of unknown customer ignored");
            return RenameOutcome::default();
        };

        let invoices_renamed = if old_name == customer.name {
            0
        } else {
            self.rename_customer_on_invoices(&old_name, &customer.name)
        };

        if let Some(total) = self.purchase_total(&customer.name) {
            customer.total_purchase_amount = Some(total);
        }

        let id = customer.id.clone();
        let updated = self.customers.update(customer);
        info!(%id, invoices_renamed, "customer edited");
        RenameOutcome {
            updated,
            invoices_renamed,
        }
    }

    /// Replace a product record, moving invoices along on a rename.
    pub fn edit_product(&mut self, product: Product) -> RenameOutcome {
        let Some(old_name) = self.products.get(&product.id).map(|p| p.name.clone()) else {
            debug!(id = %product.id, "edit of unknown product ignored");
            return RenameOutcome::default();
        };

        let invoices_renamed = if old_name == product.name {
            0
        } else {
            self.rename_on_invoices(
                |inv| inv.product_name == old_name,
                |inv| inv.product_name.clone_from(&product.name),
            )
        };

        let id = product.id.clone();
        let updated = self.products.update(product);
        info!(%id, invoices_renamed, "product edited");
        RenameOutcome {
            updated,
            invoices_renamed,
        }
    }

    /// Remove every member line of `group`. Nothing else is touched.
    pub fn delete_group(&mut self, group: &GroupedInvoice) -> DeleteOutcome {
        let removed = group
            .invoice_ids
            .iter()
            .filter(|id| self.invoices.delete(id))
            .count();
        info!(group = %group.id, removed, "grouped invoice deleted");
        DeleteOutcome { removed }
    }

    /// Remove a customer. Invoices naming it are left as they are.
    pub fn delete_customer(&mut self, id: &RecordId) -> DeleteOutcome {
        DeleteOutcome {
            removed: usize::from(self.customers.delete(id)),
        }
    }

    /// Remove a product. Invoices naming it are left as they are.
    pub fn delete_product(&mut self, id: &RecordId) -> DeleteOutcome {
        DeleteOutcome {
            removed: usize::from(self.products.delete(id)),
        }
    }

    /// Sum of `total_amount` over invoices naming `customer`, or `None` if there are none.
    #[must_use]
    pub fn purchase_total(&self, customer: &str) -> Option<Money> {
        let mut matching = self
            .invoices
            .iter()
            .filter(|inv| inv.customer_name == customer)
            .peekable();
        matching.peek()?;
        Some(matching.map(|inv| inv.total_amount.unwrap_or(Money::ZERO)).sum())
    }

    fn rename_customer_on_invoices(&mut self, from: &str, to: &str) -> usize {
        self.rename_on_invoices(
            |inv| inv.customer_name == from,
            |inv| inv.customer_name = to.to_owned(),
        )
    }

    fn rename_on_invoices(
        &mut self,
        matches: impl Fn(&Invoice) -> bool,
        rename: impl Fn(&mut Invoice),
    ) -> usize {
        let targets: Vec<Invoice> = self.invoices.iter().filter(|inv| matches(inv)).cloned().collect();
        let mut renamed = 0;
        for mut invoice in targets {
            rename(&mut invoice);
            if self.invoices.update(invoice) {
                renamed += 1;
            }
        }
        renamed
    }

    /// Duplicate-named customers are not merged; each gets the shared total.
    fn refresh_purchase_totals(&mut self, name: &str) {
        let total = self.purchase_total(name).unwrap_or(Money::ZERO);
        let targets: Vec<Customer> = self.customers.iter().filter(|c| c.name == name).cloned().collect();
        for mut customer in targets {
            customer.total_purchase_amount = Some(total);
            self.customers.update(customer);
        }
    }
}
