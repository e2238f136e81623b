//! Aggregations: pure reductions of a filtered view into chart-ready data.
//!
//! ```text
//!   SalesDataset + FilterSelection
//!        │
//!        ▼  apply_filters
//!   FilteredView ──┬── timeseries   → Vec<DailyTotal>
//!                  ├── revenue      → Vec<GroupTotal>
//!                  ├── rating       → RatingDistribution
//!                  ├── spend        → Vec<BoxSummary>
//!                  └── correlation  → CorrelationMatrix (scope-dependent)
//! ```
use serde::Serialize;

use crate::data::filter::{apply_filters, FilterSelection, FilteredView};
use crate::data::model::SalesDataset;

pub mod correlation;
pub mod rating;
pub mod revenue;
pub mod spend;
pub mod timeseries;

use correlation::CorrelationMatrix;
use rating::RatingDistribution;
use revenue::GroupTotal;
use spend::BoxSummary;
use timeseries::DailyTotal;

// ---------------------------------------------------------------------------
// Aggregation result
// ---------------------------------------------------------------------------

/// Output of one aggregation. An empty input is `NoData`, never an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Aggregation<T> {
    NoData,
    Ready(T),
}

impl<T> Aggregation<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Aggregation::Ready(v) => Some(v),
            Aggregation::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Aggregation::NoData)
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Which rows the correlation heatmap is computed over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationScope {
    /// Every loaded record, ignoring the selection.
    #[default]
    FullDataset,
    /// Only the records passing the selection.
    FilteredView,
}

impl CorrelationScope {
    pub fn label(self) -> &'static str {
        match self {
            CorrelationScope::FullDataset => "full dataset",
            CorrelationScope::FilteredView => "filtered view",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    pub correlation_scope: CorrelationScope,
    pub rating_bins: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            correlation_scope: CorrelationScope::default(),
            rating_bins: rating::DEFAULT_BINS,
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard: every chart for one selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub total_rows: usize,
    pub visible_rows: usize,
    pub selection: FilterSelection,
    pub correlation_scope: CorrelationScope,
    pub sales_over_time: Aggregation<Vec<DailyTotal>>,
    pub revenue_by_product_line: Aggregation<Vec<GroupTotal>>,
    pub rating_distribution: Aggregation<RatingDistribution>,
    pub spend_by_customer_type: Aggregation<Vec<BoxSummary>>,
    pub correlation: Aggregation<CorrelationMatrix>,
}

/// Run every aggregation over an already filtered view.
pub fn summarize(
    dataset: &SalesDataset,
    view: &FilteredView<'_>,
    selection: &FilterSelection,
    options: DashboardOptions,
) -> Dashboard {
    let correlation = match options.correlation_scope {
        CorrelationScope::FullDataset => correlation::correlation_matrix(&FilteredView::full(dataset)),
        CorrelationScope::FilteredView => correlation::correlation_matrix(view),
    };

    Dashboard {
        total_rows: dataset.len(),
        visible_rows: view.len(),
        selection: selection.clone(),
        correlation_scope: options.correlation_scope,
        sales_over_time: timeseries::sales_over_time(view),
        revenue_by_product_line: revenue::revenue_by_product_line(view),
        rating_distribution: rating::rating_distribution(view, options.rating_bins),
        spend_by_customer_type: spend::spend_by_customer_type(view),
        correlation,
    }
}

/// Filter the dataset and recompute every chart from scratch.
pub fn recompute(
    dataset: &SalesDataset,
    selection: &FilterSelection,
    options: DashboardOptions,
) -> Dashboard {
    let view = apply_filters(dataset, selection);
    summarize(dataset, &view, selection, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::Choice;
    use crate::data::model::test_support::*;

    #[test]
    fn unknown_value_gives_no_data_everywhere() {
        let ds = sample_dataset();
        let selection = FilterSelection {
            city: Choice::Only("Atlantis".to_string()),
            ..Default::default()
        };
        let options = DashboardOptions {
            correlation_scope: CorrelationScope::FilteredView,
            ..Default::default()
        };
        let dashboard = recompute(&ds, &selection, options);
        assert_eq!(dashboard.visible_rows, 0);
        assert!(dashboard.sales_over_time.is_no_data());
        assert!(dashboard.revenue_by_product_line.is_no_data());
        assert!(dashboard.rating_distribution.is_no_data());
        assert!(dashboard.spend_by_customer_type.is_no_data());
        assert!(dashboard.correlation.is_no_data());
    }

    #[test]
    fn default_correlation_ignores_the_selection() {
        let ds = sample_dataset();
        let selection = FilterSelection {
            city: Choice::Only("Atlantis".to_string()),
            ..Default::default()
        };
        let filtered = recompute(&ds, &selection, DashboardOptions::default());
        let unfiltered = recompute(&ds, &FilterSelection::default(), DashboardOptions::default());
        assert!(filtered.correlation.ready().is_some());
        assert_eq!(filtered.correlation, unfiltered.correlation);
    }

    #[test]
    fn recompute_is_deterministic() {
        let ds = sample_dataset();
        let selection = FilterSelection {
            customer_type: Choice::Only("Normal".to_string()),
            ..Default::default()
        };
        let a = recompute(&ds, &selection, DashboardOptions::default());
        let b = recompute(&ds, &selection, DashboardOptions::default());
        assert_eq!(a, b);
        assert_eq!(a.total_rows, ds.len());
        assert_eq!(a.visible_rows, 6);
    }

    #[test]
    fn no_data_serializes_with_status_tag() {
        let json = serde_json::to_value(Aggregation::<Vec<f64>>::NoData).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "no_data" }));
        let json = serde_json::to_value(Aggregation::Ready(vec![1.0])).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "ready", "data": [1.0] }));
    }
}
