use serde::Serialize;

use super::Aggregation;
use crate::data::filter::FilteredView;

/// Tukey fence multiplier.
const WHISKER_IQR: f64 = 1.5;

/// Box-plot statistics of `Total` for one customer type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub group: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Smallest value at or above `q1 - 1.5·IQR`.
    pub lower_whisker: f64,
    /// Largest value at or below `q3 + 1.5·IQR`.
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    /// Summarise a sample; `None` when it is empty.
    pub fn from_values(group: impl Into<String>, values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let low_fence = q1 - WHISKER_IQR * iqr;
        let high_fence = q3 + WHISKER_IQR * iqr;

        let lower_whisker = sorted.iter().copied().find(|v| *v >= low_fence).unwrap_or(q1);
        let upper_whisker = sorted.iter().rev().copied().find(|v| *v <= high_fence).unwrap_or(q3);

        Some(BoxSummary {
            group: group.into(),
            count: sorted.len(),
            min: sorted[0],
            q1,
            median: quantile(&sorted, 0.5),
            q3,
            max: sorted[sorted.len() - 1],
            lower_whisker,
            upper_whisker,
            outliers: sorted
                .iter()
                .copied()
                .filter(|v| !(low_fence..=high_fence).contains(v))
                .collect(),
        })
    }
}

/// Quantile of sorted data with linear interpolation between the order
/// statistics at position `p · (n - 1)`.
pub fn quantile(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let pos = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// One box per customer type, in order of first appearance in the view.
pub fn spend_by_customer_type(view: &FilteredView<'_>) -> Aggregation<Vec<BoxSummary>> {
    let mut groups: Vec<(&str, Vec<f64>)> = Vec::new();
    for record in view.iter() {
        let key = record.customer_type.as_str();
        match groups.iter_mut().find(|(g, _)| *g == key) {
            Some((_, values)) => values.push(record.total),
            None => groups.push((key, vec![record.total])),
        }
    }

    let boxes: Vec<BoxSummary> = groups
        .into_iter()
        .filter_map(|(group, values)| BoxSummary::from_values(group, &values))
        .collect();

    if boxes.is_empty() {
        Aggregation::NoData
    } else {
        Aggregation::Ready(boxes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply_filters, FilterSelection};
    use crate::data::model::test_support::*;
    use crate::data::model::SalesDataset;

    #[test]
    fn five_number_summary_for_members() {
        let day = date(2019, 1, 1);
        let ds = SalesDataset::from_records(
            [10.0, 20.0, 30.0, 40.0, 50.0]
                .into_iter()
                .map(|t| record(day, "Yangon", "Health and beauty", "Member", t))
                .collect(),
        );
        let view = apply_filters(&ds, &FilterSelection::default());
        let Aggregation::Ready(boxes) = spend_by_customer_type(&view) else {
            panic!("expected data");
        };
        assert_eq!(boxes.len(), 1);
        let member = &boxes[0];
        assert_eq!(member.group, "Member");
        assert_eq!(member.min, 10.0);
        assert_eq!(member.q1, 20.0);
        assert_eq!(member.median, 30.0);
        assert_eq!(member.q3, 40.0);
        assert_eq!(member.max, 50.0);
        assert_eq!(member.lower_whisker, 10.0);
        assert_eq!(member.upper_whisker, 50.0);
        assert!(member.outliers.is_empty());
    }

    #[test]
    fn quantile_interpolates_between_order_statistics() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&sorted, 0.25) - 1.75).abs() < 1e-12);
        assert!((quantile(&sorted, 0.5) - 2.5).abs() < 1e-12);
        assert!((quantile(&sorted, 0.75) - 3.25).abs() < 1e-12);
        assert_eq!(quantile(&[7.0], 0.3), 7.0);
    }

    #[test]
    fn values_beyond_fences_are_outliers() {
        let summary =
            BoxSummary::from_values("Normal", &[10.0, 12.0, 11.0, 13.0, 12.5, 100.0, -60.0])
                .unwrap();
        assert_eq!(summary.outliers, vec![-60.0, 100.0]);
        assert_eq!(summary.lower_whisker, 10.0);
        assert_eq!(summary.upper_whisker, 13.0);
        assert_eq!(summary.min, -60.0);
        assert_eq!(summary.max, 100.0);
    }

    #[test]
    fn groups_follow_first_appearance() {
        let ds = sample_dataset();
        let view = apply_filters(&ds, &FilterSelection::default());
        let Aggregation::Ready(boxes) = spend_by_customer_type(&view) else {
            panic!("expected data");
        };
        let groups: Vec<&str> = boxes.iter().map(|b| b.group.as_str()).collect();
        assert_eq!(groups, ["Member", "Normal"]);
        assert_eq!(boxes.iter().map(|b| b.count).sum::<usize>(), ds.len());
    }
}
