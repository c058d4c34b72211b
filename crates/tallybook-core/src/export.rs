//! Export projection and the delimited-text writer.
//!
//! Exported rows never carry identities, back-references or missing-field flags. Row
//! order is collection order. Spreadsheet writers plug in through [`ExportWriter`].

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::grouping::GroupedInvoice;
use crate::ids::RecordId;
use crate::ledger::Ledger;
use crate::money::Money;
use crate::record::{field, Customer, EntityKind, Invoice, Product};

/// One exported cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Free text.
    Text(String),
    /// A count.
    Count(u32),
    /// A monetary amount.
    Amount(Money),
    /// No value.
    Empty,
}

impl Cell {
    fn text(s: &str) -> Self {
        Self::Text(s.to_owned())
    }

    fn opt_text(s: Option<&str>) -> Self {
        s.map_or(Self::Empty, Self::text)
    }

    fn count(q: Option<u32>) -> Self {
        q.map_or(Self::Empty, Self::Count)
    }

    fn amount(m: Option<Money>) -> Self {
        m.map_or(Self::Empty, Self::Amount)
    }

    /// Render for delimited text. Amounts always carry two decimals.
    #[must_use]
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s),
            Self::Count(q) => Cow::Owned(q.to_string()),
            Self::Amount(m) => Cow::Owned(m.to_string()),
            Self::Empty => Cow::Borrowed(""),
        }
    }
}

/// Rows ready for a writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTable {
    /// Which collection the rows come from.
    pub kind: EntityKind,
    /// Column headers, camelCase.
    pub headers: Vec<String>,
    /// Rows, each as long as `headers`.
    pub rows: Vec<Vec<Cell>>,
}

trait Exportable {
    const HEADERS: &'static [&'static str];
    fn cells(&self) -> Vec<Cell>;
}

impl Exportable for Invoice {
    const HEADERS: &'static [&'static str] = &[
        field::SERIAL_NUMBER,
        field::CUSTOMER_NAME,
        field::PRODUCT_NAME,
        field::QUANTITY,
        field::TAX,
        field::TOTAL_AMOUNT,
        field::DATE,
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.serial_number),
            Cell::text(&self.customer_name),
            Cell::text(&self.product_name),
            Cell::count(self.quantity),
            Cell::amount(self.tax),
            Cell::amount(self.total_amount),
            Cell::text(&self.date),
        ]
    }
}

impl Exportable for Product {
    const HEADERS: &'static [&'static str] = &[
        field::NAME,
        field::QUANTITY,
        field::UNIT_PRICE,
        field::TAX,
        field::PRICE_WITH_TAX,
        "discount",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.name),
            Cell::count(self.quantity),
            Cell::amount(self.unit_price),
            Cell::amount(self.tax),
            Cell::amount(self.price_with_tax),
            Cell::amount(self.discount),
        ]
    }
}

impl Exportable for Customer {
    const HEADERS: &'static [&'static str] = &[
        field::NAME,
        field::PHONE_NUMBER,
        field::TOTAL_PURCHASE_AMOUNT,
        "email",
        "address",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.name),
            Cell::text(&self.phone_number),
            Cell::amount(self.total_purchase_amount),
            Cell::opt_text(self.email.as_deref()),
            Cell::opt_text(self.address.as_deref()),
        ]
    }
}

fn project<'a, T: Exportable + 'a>(
    kind: EntityKind,
    records: impl IntoIterator<Item = &'a T>,
) -> ExportTable {
    ExportTable {
        kind,
        headers: T::HEADERS.iter().map(|h| (*h).to_owned()).collect(),
        rows: records.into_iter().map(Exportable::cells).collect(),
    }
}

impl Ledger {
    /// Project a collection for export.
    ///
    /// An empty `selection` exports everything. For invoices the selection holds grouped
    /// invoice identities and every member line of each selected group is exported; for
    /// products and customers it holds record identities. Unknown identities select nothing.
    #[must_use]
    pub fn export(&self, kind: EntityKind, selection: &[RecordId]) -> ExportTable {
        let everything = selection.is_empty();
        match kind {
            EntityKind::Invoice => {
                let groups: Vec<GroupedInvoice> = self
                    .grouped_invoices()
                    .into_iter()
                    .filter(|g| selection.contains(&g.id))
                    .collect();
                project(
                    kind,
                    self.invoices
                        .iter()
                        .filter(|inv| everything || groups.iter().any(|g| g.contains(&inv.id))),
                )
            }
            EntityKind::Product => project(
                kind,
                self.products
                    .iter()
                    .filter(|p| everything || selection.contains(&p.id)),
            ),
            EntityKind::Customer => project(
                kind,
                self.customers
                    .iter()
                    .filter(|c| everything || selection.contains(&c.id)),
            ),
        }
    }
}

/// Turns an [`ExportTable`] into a file.
pub trait ExportWriter {
    /// MIME type of the produced file.
    fn content_type(&self) -> &'static str;

    /// File extension, without the dot.
    fn extension(&self) -> &'static str;

    /// Render the table.
    fn render(&self, table: &ExportTable) -> Vec<u8>;

    /// Suggested download name, e.g. `invoices.csv`.
    fn file_name(&self, kind: EntityKind) -> String {
        format!("{}.{}", kind.collection_name(), self.extension())
    }
}

/// Comma-separated values with a header row.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvWriter;

impl CsvWriter {
    fn push_field(out: &mut String, value: &str) {
        if value.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&value.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(value);
        }
    }

    fn push_row<'a>(out: &mut String, values: impl IntoIterator<Item = Cow<'a, str>>) {
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            Self::push_field(out, &value);
        }
        out.push('\n');
    }
}

impl ExportWriter for CsvWriter {
    fn content_type(&self) -> &'static str {
        "text/csv; charset=utf-8"
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn render(&self, table: &ExportTable) -> Vec<u8> {
        let mut out = String::new();
        Self::push_row(&mut out, table.headers.iter().map(|h| Cow::Borrowed(h.as_str())));
        for row in &table.rows {
            Self::push_row(&mut out, row.iter().map(Cell::render));
        }
        out.into_bytes()
    }
}
