//! The ledger: the three collections behind one owner.
//!
//! A [`Ledger`] is the session's whole state. It starts empty, lives in memory, and is
//! passed by reference to whatever needs it; persistence, when wanted, serializes the
//! whole value. Hosts that share it across threads wrap the entire ledger in a single
//! lock so that grouping always reads a consistent snapshot of the flat invoices.
//!
//! Plain CRUD lives here. Edits that must fan out across collections are in
//! [`crate::propagation`]; bulk import is in [`crate::ingest`].

use serde::{Deserialize, Serialize};

use crate::collection::Collection;
use crate::grouping::{group_by_serial, GroupedInvoice};
use crate::ids::RecordId;
use crate::record::{Customer, Invoice, Product};

/// Invoices, products and customers for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub(crate) invoices: Collection<Invoice>,
    #[serde(default)]
    pub(crate) products: Collection<Product>,
    #[serde(default)]
    pub(crate) customers: Collection<Customer>,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat invoice line items.
    #[must_use]
    pub fn invoices(&self) -> &Collection<Invoice> {
        &self.invoices
    }

    /// Products.
    #[must_use]
    pub fn products(&self) -> &Collection<Product> {
        &self.products
    }

    /// Customers.
    #[must_use]
    pub fn customers(&self) -> &Collection<Customer> {
        &self.customers
    }

    /// Derive the grouped invoice view from the current flat invoices.
    #[must_use]
    pub fn grouped_invoices(&self) -> Vec<GroupedInvoice> {
        group_by_serial(self.invoices.as_slice())
    }

    /// Find the group whose identity is `id` in a fresh derivation.
    #[must_use]
    pub fn find_group(&self, id: &RecordId) -> Option<GroupedInvoice> {
        self.grouped_invoices().into_iter().find(|g| &g.id == id)
    }

    /// Append invoice line items.
    pub fn add_invoices(&mut self, invoices: impl IntoIterator<Item = Invoice>) {
        self.invoices.add_many(invoices);
    }

    /// Append products.
    pub fn add_products(&mut self, products: impl IntoIterator<Item = Product>) {
        self.products.add_many(products);
    }

    /// Append customers.
    pub fn add_customers(&mut self, customers: impl IntoIterator<Item = Customer>) {
        self.customers.add_many(customers);
    }

    /// Replace one invoice line item. No propagation.
    pub fn update_invoice(&mut self, invoice: Invoice) -> bool {
        self.invoices.update(invoice)
    }

    /// Remove one invoice line item.
    pub fn delete_invoice(&mut self, id: &RecordId) -> bool {
        self.invoices.delete(id)
    }

    /// Empty all three collections.
    pub fn clear(&mut self) {
        self.invoices.clear();
        self.products.clear();
        self.customers.clear();
    }

    /// Whether all three collections are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty() && self.products.is_empty() && self.customers.is_empty()
    }
}
