use std::collections::BTreeMap;

use serde::Serialize;

use super::Aggregation;
use crate::data::filter::FilteredView;

/// Summed `Total` of one product line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub group: String,
    pub total: f64,
    pub count: usize,
}

/// Revenue per product line, largest first.
///
/// Groups are formed in key order and then stably sorted, so equal sums
/// keep their key order.
pub fn revenue_by_product_line(view: &FilteredView<'_>) -> Aggregation<Vec<GroupTotal>> {
    if view.is_empty() {
        return Aggregation::NoData;
    }

    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for record in view.iter() {
        let entry = groups.entry(record.product_line.as_str()).or_default();
        entry.0 += record.total;
        entry.1 += 1;
    }

    let mut totals: Vec<GroupTotal> = groups
        .into_iter()
        .map(|(group, (total, count))| GroupTotal {
            group: group.to_string(),
            total,
            count,
        })
        .collect();
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));

    Aggregation::Ready(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply_filters, FilterSelection};
    use crate::data::model::test_support::*;
    use crate::data::model::SalesDataset;

    #[test]
    fn sorted_descending_by_revenue() {
        let ds = sample_dataset();
        let view = apply_filters(&ds, &FilterSelection::default());
        let Aggregation::Ready(totals) = revenue_by_product_line(&view) else {
            panic!("expected data");
        };
        assert_eq!(totals.len(), 5);
        assert!(totals.windows(2).all(|w| w[0].total >= w[1].total));
        assert_eq!(totals.iter().map(|g| g.count).sum::<usize>(), ds.len());

        let grand_total: f64 = ds.records.iter().map(|r| r.total).sum();
        let summed: f64 = totals.iter().map(|g| g.total).sum();
        assert!((grand_total - summed).abs() < 1e-6);
    }

    #[test]
    fn ties_keep_key_order() {
        let day = date(2019, 1, 1);
        let ds = SalesDataset::from_records(vec![
            record(day, "Yangon", "Sports and travel", "Member", 10.0),
            record(day, "Yangon", "Fashion accessories", "Member", 10.0),
            record(day, "Yangon", "Food and beverages", "Member", 30.0),
        ]);
        let view = apply_filters(&ds, &FilterSelection::default());
        let Aggregation::Ready(totals) = revenue_by_product_line(&view) else {
            panic!("expected data");
        };
        let order: Vec<&str> = totals.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(
            order,
            ["Food and beverages", "Fashion accessories", "Sports and travel"]
        );
    }
}
