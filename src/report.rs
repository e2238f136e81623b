use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::analysis::{self, Dashboard, DashboardOptions};
use crate::data::filter::FilterSelection;
use crate::data::model::{Category, SalesDataset};

/// Everything the presentation layer receives, as one JSON document.
#[derive(Debug, Serialize)]
struct Report<'a> {
    /// Distinct values offered by each selection control.
    filter_options: BTreeMap<Category, &'a [String]>,
    #[serde(flatten)]
    dashboard: Dashboard,
}

/// Recompute the dashboard for `selection` and write it as pretty JSON.
pub fn write_report<W: Write>(
    mut writer: W,
    dataset: &SalesDataset,
    selection: &FilterSelection,
    options: DashboardOptions,
) -> Result<()> {
    let report = Report {
        filter_options: Category::ALL
            .iter()
            .map(|&c| (c, dataset.values(c)))
            .collect(),
        dashboard: analysis::recompute(dataset, selection, options),
    };
    serde_json::to_writer_pretty(&mut writer, &report).context("serializing report")?;
    writeln!(writer).context("writing report")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::data::filter::Choice;
    use crate::data::model::test_support::sample_dataset;

    fn report_json(selection: &FilterSelection) -> Value {
        let mut out = Vec::new();
        write_report(&mut out, &sample_dataset(), selection, DashboardOptions::default()).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn report_lists_filter_options_and_charts() {
        let json = report_json(&FilterSelection::default());
        assert_eq!(
            json["filter_options"]["customer_type"],
            serde_json::json!(["Member", "Normal"])
        );
        assert_eq!(json["visible_rows"], 12);
        assert_eq!(json["selection"]["city"], "all");
        assert_eq!(json["sales_over_time"]["status"], "ready");
        assert_eq!(json["correlation"]["data"]["columns"][0], "Unit price");
        assert_eq!(json["sales_over_time"]["data"][0]["date"], "2019-01-05");
    }

    #[test]
    fn empty_selection_reports_no_data() {
        let json = report_json(&FilterSelection {
            city: Choice::Only("Atlantis".to_string()),
            ..Default::default()
        });
        assert_eq!(json["visible_rows"], 0);
        assert_eq!(json["selection"]["city"]["only"], "Atlantis");
        for key in [
            "sales_over_time",
            "revenue_by_product_line",
            "rating_distribution",
            "spend_by_customer_type",
        ] {
            assert_eq!(json[key]["status"], "no_data", "{key}");
        }
        // correlation follows the full dataset by default
        assert_eq!(json["correlation"]["status"], "ready");
        assert_eq!(json["correlation_scope"], "full_dataset");
    }
}
