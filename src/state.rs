use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::analysis::{self, CorrelationScope, Dashboard, DashboardOptions};
use crate::color::ColorMap;
use crate::data::filter::{apply_filters, Choice, FilterSelection};
use crate::data::loader::load_file;
use crate::data::model::{Category, SalesDataset};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The state of one dashboard session, independent of rendering.
///
/// The dataset is shared read-only; selection and derived charts belong to
/// this session alone.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Arc<SalesDataset>>,

    /// Where the dataset came from, for the status line.
    pub source: Option<PathBuf>,

    /// Current filter selection.
    pub selection: FilterSelection,

    /// Chart options, including the correlation scope.
    pub options: DashboardOptions,

    /// Indices of records passing the current selection.
    pub visible_indices: Vec<usize>,

    /// Every chart for the current selection.
    pub dashboard: Option<Dashboard>,

    /// Stable colours for product lines.
    pub product_colors: Option<ColorMap>,

    /// Stable colours for customer types.
    pub customer_colors: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(options: DashboardOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Ingest a newly loaded dataset, keep the selection where its values
    /// still exist, and recompute.
    pub fn set_dataset(&mut self, dataset: Arc<SalesDataset>, source: Option<PathBuf>) {
        for category in Category::ALL {
            if let Choice::Only(value) = self.selection.get(category) {
                if !dataset.values(category).contains(value) {
                    log::warn!("{category} value {value:?} not in new dataset, resetting");
                    self.selection.set(category, Choice::All);
                }
            }
        }

        self.product_colors = Some(ColorMap::new(dataset.values(Category::ProductLine)));
        self.customer_colors = Some(ColorMap::new(dataset.values(Category::CustomerType)));
        self.dataset = Some(dataset);
        self.source = source;
        self.status_message = None;
        self.recompute();
    }

    /// Load a file and make it the current dataset. On failure the previous
    /// dataset stays and the error goes to the status line.
    pub fn load_path(&mut self, path: &Path) {
        match load_file(path).with_context(|| format!("loading {}", path.display())) {
            Ok(dataset) => {
                log::info!("Loaded {} records from {}", dataset.len(), path.display());
                self.set_dataset(Arc::new(dataset), Some(path.to_path_buf()));
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Change one category's choice and recompute.
    pub fn select(&mut self, category: Category, choice: Choice) {
        if self.selection.get(category) == &choice {
            return;
        }
        self.selection.set(category, choice);
        self.recompute();
    }

    /// Put every category back to "All".
    pub fn reset_filters(&mut self) {
        if self.selection.is_unfiltered() {
            return;
        }
        self.selection = FilterSelection::default();
        self.recompute();
    }

    pub fn set_correlation_scope(&mut self, scope: CorrelationScope) {
        if self.options.correlation_scope == scope {
            return;
        }
        self.options.correlation_scope = scope;
        self.recompute();
    }

    /// Rebuild the view and every chart from scratch.
    pub fn recompute(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let view = apply_filters(dataset, &self.selection);
        let dashboard = analysis::summarize(dataset, &view, &self.selection, self.options);
        log::debug!(
            "recomputed dashboard: {} of {} records visible",
            view.len(),
            dataset.len()
        );
        self.visible_indices = view.indices().to_vec();
        self.dashboard = Some(dashboard);
    }
}
