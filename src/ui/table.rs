use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{
    Record, CITY, CUSTOMER_TYPE, DATE, PRODUCT_LINE, QUANTITY, RATING, TOTAL, UNIT_PRICE,
};
use crate::state::AppState;

/// Rows shown in the filtered-data preview.
const PREVIEW_ROWS: usize = 50;
const ROW_HEIGHT: f32 = 18.0;

const PREVIEW_COLUMNS: [&str; 8] = [
    DATE,
    CITY,
    PRODUCT_LINE,
    CUSTOMER_TYPE,
    UNIT_PRICE,
    QUANTITY,
    TOTAL,
    RATING,
];

fn cells(record: &Record) -> [String; 8] {
    [
        record.date.format("%Y-%m-%d").to_string(),
        record.city.clone(),
        record.product_line.clone(),
        record.customer_type.clone(),
        format!("{:.2}", record.unit_price),
        record.quantity.to_string(),
        format!("{:.2}", record.total),
        format!("{:.1}", record.rating),
    ]
}

/// Collapsible table with the first rows of the filtered view.
pub fn preview(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };
    let shown = state.visible_indices.len().min(PREVIEW_ROWS);
    let header = format!(
        "Filtered data (first {shown} of {})",
        state.visible_indices.len()
    );

    egui::CollapsingHeader::new(header)
        .id_salt("filtered_preview")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(Column::auto().at_least(60.0), PREVIEW_COLUMNS.len())
                .header(ROW_HEIGHT + 2.0, |mut header| {
                    for name in PREVIEW_COLUMNS {
                        header.col(|ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, shown, |mut row| {
                        let record = &dataset.records[state.visible_indices[row.index()]];
                        for text in cells(record) {
                            row.col(|ui| {
                                ui.label(text);
                            });
                        }
                    });
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::test_support::sample_dataset;

    #[test]
    fn cells_follow_column_order() {
        let ds = sample_dataset();
        let row = cells(&ds.records[0]);
        assert_eq!(row[0], "2019-01-05");
        assert_eq!(row[1], "Yangon");
        assert_eq!(row[6], "548.97");
        assert_eq!(row.len(), PREVIEW_COLUMNS.len());
    }
}
