use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::Aggregation;
use crate::data::filter::FilteredView;

/// Summed `Total` of one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: f64,
}

/// Group the view by date and sum `Total`, ascending by date.
pub fn sales_over_time(view: &FilteredView<'_>) -> Aggregation<Vec<DailyTotal>> {
    if view.is_empty() {
        return Aggregation::NoData;
    }

    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in view.iter() {
        *by_date.entry(record.date).or_default() += record.total;
    }

    Aggregation::Ready(
        by_date
            .into_iter()
            .map(|(date, total)| DailyTotal { date, total })
            .collect(),
    )
}
