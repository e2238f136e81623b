use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, RichText, ScrollArea, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, MarkerShape, Plot,
    PlotPoint, PlotPoints, Points, Polygon, Text,
};

use crate::analysis::correlation::CorrelationMatrix;
use crate::analysis::rating::RatingDistribution;
use crate::analysis::revenue::GroupTotal;
use crate::analysis::spend::BoxSummary;
use crate::analysis::timeseries::DailyTotal;
use crate::analysis::Aggregation;
use crate::color::{diverging, ColorMap};
use crate::state::AppState;
use crate::ui::table;

const CHART_HEIGHT: f32 = 260.0;
const HISTOGRAM_FILL: Color32 = Color32::from_rgb(135, 206, 235);
const KDE_COLOR: Color32 = Color32::from_rgb(31, 119, 180);

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render every chart of the current dashboard in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(dashboard) = &state.dashboard else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view the dashboard  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Convenience store sales");

            section(ui, "1. Total sales over time", |ui| {
                sales_over_time(ui, &dashboard.sales_over_time)
            });
            section(ui, "2. Revenue by product line", |ui| {
                revenue_by_product_line(
                    ui,
                    &dashboard.revenue_by_product_line,
                    state.product_colors.as_ref(),
                )
            });
            section(ui, "3. Customer rating distribution", |ui| {
                rating_distribution(ui, &dashboard.rating_distribution)
            });
            section(ui, "4. Spend by customer type", |ui| {
                spend_by_customer_type(
                    ui,
                    &dashboard.spend_by_customer_type,
                    state.customer_colors.as_ref(),
                )
            });
            let title = format!(
                "5. Correlation of numeric columns ({})",
                dashboard.correlation_scope.label()
            );
            section(ui, &title, |ui| correlation_heatmap(ui, &dashboard.correlation));

            ui.add_space(12.0);
            table::preview(ui, state);
        });
}

fn section(ui: &mut Ui, title: &str, body: impl FnOnce(&mut Ui)) {
    ui.add_space(12.0);
    ui.label(RichText::new(title).strong().size(16.0));
    body(ui);
}

fn no_data(ui: &mut Ui) {
    ui.label("No data for the selected filters.");
}

// -- axis helpers --

fn day_number(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

fn date_label(value: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(value.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Label for an integer tick on a categorical axis; blank between ticks.
fn category_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// 1. Line chart
// ---------------------------------------------------------------------------

fn sales_over_time(ui: &mut Ui, series: &Aggregation<Vec<DailyTotal>>) {
    let Some(series) = series.ready() else {
        return no_data(ui);
    };

    let points: PlotPoints = series
        .iter()
        .map(|d| [day_number(d.date), d.total])
        .collect();

    Plot::new("sales_over_time")
        .height(CHART_HEIGHT)
        .x_axis_label("Date")
        .y_axis_label("Total")
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| date_label(mark.value))
        .label_formatter(|_name, point| format!("{}\n{:.2}", date_label(point.x), point.y))
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).name("Total").width(2.0));
        });
}

// ---------------------------------------------------------------------------
// 2. Bar chart
// ---------------------------------------------------------------------------

fn revenue_by_product_line(
    ui: &mut Ui,
    totals: &Aggregation<Vec<GroupTotal>>,
    colors: Option<&ColorMap>,
) {
    let Some(totals) = totals.ready() else {
        return no_data(ui);
    };

    let bars: Vec<Bar> = totals
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let fill = colors.map_or(HISTOGRAM_FILL, |c| c.color_for(&g.group));
            Bar::new(i as f64, g.total)
                .width(0.7)
                .name(&g.group)
                .fill(fill)
        })
        .collect();
    let labels: Vec<String> = totals.iter().map(|g| g.group.clone()).collect();

    Plot::new("revenue_by_product_line")
        .height(CHART_HEIGHT)
        .x_axis_label("Product line")
        .y_axis_label("Total revenue")
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&labels, mark.value)
        })
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Revenue"));
        });
}

// ---------------------------------------------------------------------------
// 3. Histogram with density overlay
// ---------------------------------------------------------------------------

fn rating_distribution(ui: &mut Ui, dist: &Aggregation<RatingDistribution>) {
    let Some(dist) = dist.ready() else {
        return no_data(ui);
    };

    let width = dist.bin_width();
    let bars: Vec<Bar> = dist
        .bins
        .iter()
        .map(|b| {
            Bar::new((b.lower + b.upper) / 2.0, b.count as f64)
                .width(width)
                .fill(HISTOGRAM_FILL)
                .stroke(Stroke::new(0.5, Color32::WHITE))
        })
        .collect();

    Plot::new("rating_distribution")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Rating")
        .y_axis_label("Frequency")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Ratings"));
            if let Some(kde) = &dist.kde {
                let curve: PlotPoints = kde.iter().map(|p| [p.x, p.scaled]).collect();
                plot_ui.line(Line::new(curve).name("Density").color(KDE_COLOR).width(2.0));
            }
        });
}

// ---------------------------------------------------------------------------
// 4. Box plot
// ---------------------------------------------------------------------------

fn spend_by_customer_type(
    ui: &mut Ui,
    boxes: &Aggregation<Vec<BoxSummary>>,
    colors: Option<&ColorMap>,
) {
    let Some(boxes) = boxes.ready() else {
        return no_data(ui);
    };

    let labels: Vec<String> = boxes.iter().map(|b| b.group.clone()).collect();

    Plot::new("spend_by_customer_type")
        .height(CHART_HEIGHT)
        .x_axis_label("Customer type")
        .y_axis_label("Total spend")
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&labels, mark.value)
        })
        .show(ui, |plot_ui| {
            for (i, b) in boxes.iter().enumerate() {
                let color = colors.map_or(Color32::LIGHT_BLUE, |c| c.color_for(&b.group));
                let x = i as f64;
                let elem = BoxElem::new(
                    x,
                    BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker),
                )
                .name(&b.group)
                .box_width(0.5)
                .whisker_width(0.25)
                .fill(color.gamma_multiply(0.5))
                .stroke(Stroke::new(1.5, color));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&b.group));

                if !b.outliers.is_empty() {
                    let outliers: PlotPoints = b.outliers.iter().map(|&v| [x, v]).collect();
                    plot_ui.points(
                        Points::new(outliers)
                            .shape(MarkerShape::Diamond)
                            .radius(3.0)
                            .color(color),
                    );
                }
            }
        });
}

// ---------------------------------------------------------------------------
// 5. Correlation heatmap
// ---------------------------------------------------------------------------

fn correlation_heatmap(ui: &mut Ui, matrix: &Aggregation<CorrelationMatrix>) {
    let Some(matrix) = matrix.ready() else {
        return no_data(ui);
    };

    let k = matrix.len();
    let columns = matrix.columns.clone();
    // Row 0 is drawn at the top.
    let row_labels: Vec<String> = columns.iter().rev().cloned().collect();
    let hover_columns = columns.clone();

    Plot::new("correlation_heatmap")
        .height(CHART_HEIGHT * 1.6)
        .data_aspect(1.0)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&columns, mark.value)
        })
        .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&row_labels, mark.value)
        })
        .label_formatter(move |_name, point| {
            let col = category_label(&hover_columns, point.x.round());
            let row_idx = (k as f64 - 1.0 - point.y).round();
            let row = category_label(&hover_columns, row_idx);
            if col.is_empty() || row.is_empty() {
                String::new()
            } else {
                format!("{row} × {col}")
            }
        })
        .show(ui, |plot_ui| {
            for i in 0..k {
                let y = (k - 1 - i) as f64;
                for j in 0..k {
                    let x = j as f64;
                    let value = matrix.get(i, j);
                    let fill = value.map_or(Color32::DARK_GRAY, diverging);
                    let cell = PlotPoints::from(vec![
                        [x - 0.5, y - 0.5],
                        [x + 0.5, y - 0.5],
                        [x + 0.5, y + 0.5],
                        [x - 0.5, y + 0.5],
                    ]);
                    plot_ui.polygon(
                        Polygon::new(cell)
                            .fill_color(fill)
                            .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );

                    let text = value.map_or_else(|| "n/a".to_string(), |r| format!("{r:.2}"));
                    let text_color = if value.is_some_and(|r| r.abs() > 0.6) {
                        Color32::WHITE
                    } else {
                        Color32::BLACK
                    };
                    plot_ui.text(
                        Text::new(PlotPoint::new(x, y), RichText::new(text).size(11.0))
                            .color(text_color),
                    );
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_axis_round_trips_day_numbers() {
        let d = NaiveDate::from_ymd_opt(2019, 3, 8).unwrap();
        assert_eq!(date_label(day_number(d)), "2019-03-08");
        assert_eq!(date_label(day_number(d) + 0.3), "2019-03-08");
    }

    #[test]
    fn category_axis_only_labels_integer_ticks() {
        let labels = vec!["Member".to_string(), "Normal".to_string()];
        assert_eq!(category_label(&labels, 1.0), "Normal");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, -1.0), "");
        assert_eq!(category_label(&labels, 7.0), "");
    }
}
