use eframe::egui::{self, Color32, RichText, Ui};

use crate::analysis::CorrelationScope;
use crate::data::filter::Choice;
use crate::data::model::Category;
use crate::state::AppState;

const ALL_LABEL: &str = "All";

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Hold our own handle so we can mutate state inside the loop.
    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    for category in Category::ALL {
        ui.strong(category.column());

        let current = state.selection.get(category).clone();
        let selected_text = match &current {
            Choice::All => ALL_LABEL,
            Choice::Only(v) => v.as_str(),
        };

        let mut picked: Option<Choice> = None;
        egui::ComboBox::from_id_salt(category)
            .selected_text(selected_text)
            .width(ui.available_width())
            .show_ui(ui, |ui: &mut Ui| {
                if ui
                    .selectable_label(current == Choice::All, ALL_LABEL)
                    .clicked()
                {
                    picked = Some(Choice::All);
                }
                for value in dataset.values(category) {
                    let is_selected = matches!(&current, Choice::Only(v) if v == value);
                    if ui.selectable_label(is_selected, value.as_str()).clicked() {
                        picked = Some(Choice::Only(value.clone()));
                    }
                }
            });

        if let Some(choice) = picked {
            state.select(category, choice);
        }
        ui.add_space(6.0);
    }

    ui.separator();
    if ui
        .add_enabled(!state.selection.is_unfiltered(), egui::Button::new("Reset filters"))
        .clicked()
    {
        state.reset_filters();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let source = state
                .source
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{source}  {} records loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        ui.separator();

        let filtered = state.options.correlation_scope == CorrelationScope::FilteredView;
        if ui
            .selectable_label(filtered, "Correlate filtered view")
            .on_hover_text("Off: the heatmap uses every record, ignoring the filters.")
            .clicked()
        {
            state.set_correlation_scope(if filtered {
                CorrelationScope::FullDataset
            } else {
                CorrelationScope::FilteredView
            });
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
