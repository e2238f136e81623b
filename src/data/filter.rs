use serde::Serialize;

use super::model::{Category, Record, SalesDataset};

// ---------------------------------------------------------------------------
// Filter selection: one choice per category
// ---------------------------------------------------------------------------

/// The choice made for a single category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    /// No constraint.
    #[default]
    All,
    /// Keep only records whose field equals this value.
    Only(String),
}

impl Choice {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => wanted == value,
        }
    }

    /// Build a choice from an optional value; `None` means no constraint.
    pub fn from_option(value: Option<String>) -> Self {
        value.map_or(Choice::All, Choice::Only)
    }
}

/// Per-session selection state. Every constraint is combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub city: Choice,
    pub product_line: Choice,
    pub customer_type: Choice,
}

impl FilterSelection {
    pub fn get(&self, category: Category) -> &Choice {
        match category {
            Category::City => &self.city,
            Category::ProductLine => &self.product_line,
            Category::CustomerType => &self.customer_type,
        }
    }

    pub fn set(&mut self, category: Category, choice: Choice) {
        match category {
            Category::City => self.city = choice,
            Category::ProductLine => self.product_line = choice,
            Category::CustomerType => self.customer_type = choice,
        }
    }

    /// Whether every category is set to [`Choice::All`].
    pub fn is_unfiltered(&self) -> bool {
        Category::ALL
            .iter()
            .all(|&c| matches!(self.get(c), Choice::All))
    }

    /// Whether a record satisfies every active constraint.
    pub fn accepts(&self, record: &Record) -> bool {
        Category::ALL
            .iter()
            .all(|&c| self.get(c).matches(c.value_of(record)))
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Records of a dataset passing a selection, in original order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a SalesDataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// A view over every record of the dataset.
    pub fn full(dataset: &'a SalesDataset) -> Self {
        FilteredView {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.records[i])
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return indices of records that pass all active constraints.
pub fn filtered_indices(dataset: &SalesDataset, selection: &FilterSelection) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| selection.accepts(record))
        .map(|(i, _)| i)
        .collect()
}

/// Apply a selection to a dataset. An empty view is a valid result.
pub fn apply_filters<'a>(dataset: &'a SalesDataset, selection: &FilterSelection) -> FilteredView<'a> {
    if selection.is_unfiltered() {
        return FilteredView::full(dataset);
    }
    FilteredView {
        dataset,
        indices: filtered_indices(dataset, selection),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::test_support::*;

    fn only(value: &str) -> Choice {
        Choice::Only(value.to_string())
    }

    #[test]
    fn all_sentinels_keep_the_whole_dataset() {
        let ds = sample_dataset();
        let view = apply_filters(&ds, &FilterSelection::default());
        assert_eq!(view.len(), ds.len());
        assert_eq!(view.indices(), (0..ds.len()).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn every_retained_row_satisfies_the_constraints() {
        let ds = sample_dataset();
        for city in ds.values(Category::City) {
            for customer_type in ds.values(Category::CustomerType) {
                let selection = FilterSelection {
                    city: only(city),
                    product_line: Choice::All,
                    customer_type: only(customer_type),
                };
                let view = apply_filters(&ds, &selection);
                assert!(view.len() <= ds.len());
                for r in view.iter() {
                    assert_eq!(&r.city, city);
                    assert_eq!(&r.customer_type, customer_type);
                }
                let expected = ds
                    .records
                    .iter()
                    .filter(|r| &r.city == city && &r.customer_type == customer_type)
                    .count();
                assert_eq!(view.len(), expected);
            }
        }
    }

    #[test]
    fn preserves_original_order() {
        let ds = sample_dataset();
        let selection = FilterSelection {
            city: only("Yangon"),
            ..Default::default()
        };
        let view = apply_filters(&ds, &selection);
        assert!(view.indices().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(view.len(), 7);
    }

    #[test]
    fn constraint_order_does_not_matter() {
        let ds = sample_dataset();
        let mut a = FilterSelection::default();
        a.set(Category::City, only("Yangon"));
        a.set(Category::ProductLine, only("Health and beauty"));
        let mut b = FilterSelection::default();
        b.set(Category::ProductLine, only("Health and beauty"));
        b.set(Category::City, only("Yangon"));
        assert_eq!(
            apply_filters(&ds, &a).indices(),
            apply_filters(&ds, &b).indices()
        );
    }

    #[test]
    fn filtering_is_idempotent() {
        let ds = sample_dataset();
        let selection = FilterSelection {
            customer_type: only("Member"),
            ..Default::default()
        };
        let first = apply_filters(&ds, &selection).indices().to_vec();
        let second = apply_filters(&ds, &selection).indices().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_value_yields_empty_view() {
        let ds = sample_dataset();
        let selection = FilterSelection {
            city: only("Atlantis"),
            ..Default::default()
        };
        let view = apply_filters(&ds, &selection);
        assert!(view.is_empty());
    }
}
