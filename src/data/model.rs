use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Column names of the source table
// ---------------------------------------------------------------------------

pub const DATE: &str = "Date";
pub const CITY: &str = "City";
pub const PRODUCT_LINE: &str = "Product line";
pub const CUSTOMER_TYPE: &str = "Customer type";
pub const UNIT_PRICE: &str = "Unit price";
pub const QUANTITY: &str = "Quantity";
pub const TAX: &str = "Tax 5%";
pub const TOTAL: &str = "Total";
pub const COGS: &str = "cogs";
pub const GROSS_INCOME: &str = "gross income";
pub const RATING: &str = "Rating";

/// Every column the loader requires, in source order.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    DATE,
    CITY,
    PRODUCT_LINE,
    CUSTOMER_TYPE,
    UNIT_PRICE,
    QUANTITY,
    TAX,
    TOTAL,
    COGS,
    GROSS_INCOME,
    RATING,
];

/// Numeric columns fed into the correlation matrix.
pub const NUMERIC_COLUMNS: [&str; 7] = [
    UNIT_PRICE,
    QUANTITY,
    TAX,
    TOTAL,
    COGS,
    GROSS_INCOME,
    RATING,
];

// ---------------------------------------------------------------------------
// Category – the three filterable columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    City,
    ProductLine,
    CustomerType,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::City,
        Category::ProductLine,
        Category::CustomerType,
    ];

    /// Header name of the column backing this category.
    pub fn column(self) -> &'static str {
        match self {
            Category::City => CITY,
            Category::ProductLine => PRODUCT_LINE,
            Category::CustomerType => CUSTOMER_TYPE,
        }
    }

    pub fn value_of(self, record: &Record) -> &str {
        match self {
            Category::City => &record.city,
            Category::ProductLine => &record.product_line,
            Category::CustomerType => &record.customer_type,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the source table
// ---------------------------------------------------------------------------

/// A single sales transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub date: NaiveDate,
    pub city: String,
    pub product_line: String,
    pub customer_type: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub tax: f64,
    pub total: f64,
    pub cogs: f64,
    pub gross_income: f64,
    pub rating: f64,
}

impl Record {
    /// Value of one of [`NUMERIC_COLUMNS`]; `None` for any other name.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            UNIT_PRICE => Some(self.unit_price),
            QUANTITY => Some(f64::from(self.quantity)),
            TAX => Some(self.tax),
            TOTAL => Some(self.total),
            COGS => Some(self.cogs),
            GROSS_INCOME => Some(self.gross_income),
            RATING => Some(self.rating),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset, immutable once built.
#[derive(Debug, Clone)]
pub struct SalesDataset {
    /// All records, in file order.
    pub records: Vec<Record>,
    /// For each category the distinct values in order of first appearance.
    pub unique_values: BTreeMap<Category, Vec<String>>,
}

impl SalesDataset {
    /// Build the per-category value index from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut unique_values: BTreeMap<Category, Vec<String>> = BTreeMap::new();

        for record in &records {
            for category in Category::ALL {
                let values = unique_values.entry(category).or_default();
                let value = category.value_of(record);
                if !values.iter().any(|v| v == value) {
                    values.push(value.to_string());
                }
            }
        }

        SalesDataset {
            records,
            unique_values,
        }
    }

    /// Distinct values of a category, for populating selection controls.
    pub fn values(&self, category: Category) -> &[String] {
        self.unique_values
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn unique_values_keep_first_appearance_order() {
        let ds = sample_dataset();
        assert_eq!(ds.values(Category::City), ["Yangon", "Naypyitaw", "Mandalay"]);
        assert_eq!(ds.values(Category::CustomerType), ["Member", "Normal"]);
        assert_eq!(ds.values(Category::ProductLine).len(), 5);
    }

    #[test]
    fn numeric_lookup_covers_every_numeric_column() {
        let ds = sample_dataset();
        let first = &ds.records[0];
        for column in NUMERIC_COLUMNS {
            assert!(first.numeric(column).is_some(), "{column}");
        }
        assert_eq!(first.numeric(CITY), None);
        assert_eq!(first.numeric(QUANTITY), Some(1.0));
    }
}
