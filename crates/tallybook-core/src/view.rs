//! Search and sort over the table views.
//!
//! Views are always computed from a fresh derivation (the grouped invoices, or the
//! product/customer collections). Filtering happens first, then a stable sort, so rows
//! that compare equal keep their derivation order.

use serde::{Deserialize, Serialize};

use crate::grouping::GroupedInvoice;
use crate::money::Money;
use crate::record::{Customer, Product};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    /// The other direction.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// The active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState<C> {
    /// Column being sorted.
    pub column: C,
    /// Direction.
    pub direction: SortDirection,
}

impl<C: Copy + PartialEq> SortState<C> {
    /// Ascending sort on `column`.
    #[must_use]
    pub const fn ascending(column: C) -> Self {
        Self {
            column,
            direction: SortDirection::Asc,
        }
    }

    /// Descending sort on `column`.
    #[must_use]
    pub const fn descending(column: C) -> Self {
        Self {
            column,
            direction: SortDirection::Desc,
        }
    }

    /// Header click: flip on the same column, reset to ascending on a new one.
    pub fn toggle(&mut self, column: C) {
        if self.column == column {
            self.direction = self.direction.flipped();
        } else {
            *self = Self::ascending(column);
        }
    }
}

/// A comparable cell value.
///
/// Absent values order before every present value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    /// No value.
    Absent,
    /// Integer value (quantities, or money in cents).
    Number(i64),
    /// Text, compared case-insensitively.
    Text(String),
}

impl SortValue {
    fn text(s: &str) -> Self {
        if s.trim().is_empty() {
            Self::Absent
        } else {
            Self::Text(s.to_lowercase())
        }
    }

    fn money(m: Option<Money>) -> Self {
        m.map_or(Self::Absent, |m| Self::Number(m.cents()))
    }

    fn count(q: Option<u32>) -> Self {
        q.map_or(Self::Absent, |q| Self::Number(i64::from(q)))
    }
}

/// A row type that can be searched and sorted.
pub trait Tabular {
    /// Column identifiers.
    type Column: Copy + PartialEq;

    /// Sort applied when the caller asks for none.
    fn default_sort() -> SortState<Self::Column>;

    /// The value of `column` for ordering.
    fn sort_value(&self, column: Self::Column) -> SortValue;

    /// Every displayed value, as text.
    fn display_values(&self) -> Vec<String>;

    /// Case-insensitive substring match against any displayed value.
    fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.display_values()
            .iter()
            .any(|value| value.to_lowercase().contains(&needle))
    }
}

/// Search text plus an optional sort override.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableQuery<C> {
    /// Substring filter; blank matches everything.
    pub search: Option<String>,
    /// Sort column; the row type's default when absent.
    pub sort: Option<C>,
    /// Sort direction; ascending when a column is given without one.
    pub direction: Option<SortDirection>,
}

impl<C> Default for TableQuery<C> {
    fn default() -> Self {
        Self {
            search: None,
            sort: None,
            direction: None,
        }
    }
}

impl<C: Copy + PartialEq> TableQuery<C> {
    fn sort_state<T: Tabular<Column = C>>(&self) -> SortState<C> {
        match self.sort {
            Some(column) => SortState {
                column,
                direction: self.direction.unwrap_or_default(),
            },
            None => {
                let mut state = T::default_sort();
                if let Some(direction) = self.direction {
                    state.direction = direction;
                }
                state
            }
        }
    }
}

/// Filter `rows` by the query's search text, then stably sort them.
#[must_use]
pub fn filter_and_sort<T: Tabular>(mut rows: Vec<T>, query: &TableQuery<T::Column>) -> Vec<T> {
    if let Some(needle) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let needle = needle.trim();
        rows.retain(|row| row.matches(needle));
    }

    let state = query.sort_state::<T>();
    rows.sort_by(|a, b| {
        let ordering = a
            .sort_value(state.column)
            .cmp(&b.sort_value(state.column));
        match state.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    rows
}

fn opt_money(m: Option<Money>) -> String {
    m.map(|m| m.to_string()).unwrap_or_default()
}

fn opt_count(q: Option<u32>) -> String {
    q.map(|q| q.to_string()).unwrap_or_default()
}

// ============================================================================
// Grouped invoices
// ============================================================================

/// Columns of the grouped invoice table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvoiceColumn {
    /// Serial number.
    SerialNumber,
    /// Customer name.
    CustomerName,
    /// Product names, joined.
    ProductNames,
    /// Total quantity.
    Quantity,
    /// Total tax.
    Tax,
    /// Total amount.
    TotalAmount,
    /// Date.
    Date,
}

impl Tabular for GroupedInvoice {
    type Column = InvoiceColumn;

    fn default_sort() -> SortState<InvoiceColumn> {
        SortState::descending(InvoiceColumn::Date)
    }

    fn sort_value(&self, column: InvoiceColumn) -> SortValue {
        match column {
            InvoiceColumn::SerialNumber => SortValue::text(&self.serial_number),
            InvoiceColumn::CustomerName => SortValue::text(&self.customer_name),
            InvoiceColumn::ProductNames => SortValue::text(&self.product_names.join(", ")),
            InvoiceColumn::Quantity => {
                SortValue::Number(i64::try_from(self.quantity).unwrap_or(i64::MAX))
            }
            InvoiceColumn::Tax => SortValue::Number(self.tax.cents()),
            InvoiceColumn::TotalAmount => SortValue::Number(self.total_amount.cents()),
            InvoiceColumn::Date => SortValue::text(&self.date),
        }
    }

    fn display_values(&self) -> Vec<String> {
        let mut values = vec![
            self.serial_number.clone(),
            self.customer_name.clone(),
            self.quantity.to_string(),
            self.tax.to_string(),
            self.total_amount.to_string(),
            self.date.clone(),
        ];
        values.extend(self.product_names.iter().cloned());
        values
    }
}

// ============================================================================
// Products
// ============================================================================

/// Columns of the product table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductColumn {
    /// Name.
    Name,
    /// Quantity.
    Quantity,
    /// Unit price.
    UnitPrice,
    /// Tax.
    Tax,
    /// Price with tax.
    PriceWithTax,
    /// Discount.
    Discount,
}

impl Tabular for Product {
    type Column = ProductColumn;

    fn default_sort() -> SortState<ProductColumn> {
        SortState::ascending(ProductColumn::Name)
    }

    fn sort_value(&self, column: ProductColumn) -> SortValue {
        match column {
            ProductColumn::Name => SortValue::text(&self.name),
            ProductColumn::Quantity => SortValue::count(self.quantity),
            ProductColumn::UnitPrice => SortValue::money(self.unit_price),
            ProductColumn::Tax => SortValue::money(self.tax),
            ProductColumn::PriceWithTax => SortValue::money(self.price_with_tax),
            ProductColumn::Discount => SortValue::money(self.discount),
        }
    }

    fn display_values(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            opt_count(self.quantity),
            opt_money(self.unit_price),
            opt_money(self.tax),
            opt_money(self.price_with_tax),
            opt_money(self.discount),
        ]
    }
}

// ============================================================================
// Customers
// ============================================================================

/// Columns of the customer table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomerColumn {
    /// Name.
    Name,
    /// Phone number.
    PhoneNumber,
    /// Total purchase amount.
    TotalPurchaseAmount,
    /// Email.
    Email,
    /// Address.
    Address,
}

impl Tabular for Customer {
    type Column = CustomerColumn;

    fn default_sort() -> SortState<CustomerColumn> {
        SortState::ascending(CustomerColumn::Name)
    }

    fn sort_value(&self, column: CustomerColumn) -> SortValue {
        match column {
            CustomerColumn::Name => SortValue::text(&self.name),
            CustomerColumn::PhoneNumber => SortValue::text(&self.phone_number),
            CustomerColumn::TotalPurchaseAmount => SortValue::money(self.total_purchase_amount),
            CustomerColumn::Email => SortValue::text(self.email.as_deref().unwrap_or_default()),
            CustomerColumn::Address => {
                SortValue::text(self.address.as_deref().unwrap_or_default())
            }
        }
    }

    fn display_values(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.phone_number.clone(),
            opt_money(self.total_purchase_amount),
            self.email.clone().unwrap_or_default(),
            self.address.clone().unwrap_or_default(),
        ]
    }
}
