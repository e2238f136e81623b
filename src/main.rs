mod analysis;
mod app;
mod color;
mod data;
mod report;
mod state;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use eframe::egui;

use analysis::{CorrelationScope, DashboardOptions};
use app::SalesDashboardApp;
use data::filter::{Choice, FilterSelection};
use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "sales-dashboard", about, version)]
struct Args {
    /// Sales data file (.csv, .json or .parquet).
    #[arg(env = "SALES_DASHBOARD_DATA", default_value = "data.csv")]
    data: PathBuf,

    /// Initial city filter.
    #[arg(long)]
    city: Option<String>,

    /// Initial product line filter.
    #[arg(long)]
    product_line: Option<String>,

    /// Initial customer type filter.
    #[arg(long)]
    customer_type: Option<String>,

    /// Rows used for the correlation heatmap.
    #[arg(long, value_enum, default_value_t = ScopeArg::Full)]
    correlation_scope: ScopeArg,

    /// Print the dashboard as JSON and exit instead of opening a window.
    #[arg(long)]
    report: bool,
}

/// Command-line spelling of [`CorrelationScope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScopeArg {
    /// Every loaded record.
    Full,
    /// Only the records passing the filters.
    Filtered,
}

impl From<ScopeArg> for CorrelationScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Full => CorrelationScope::FullDataset,
            ScopeArg::Filtered => CorrelationScope::FilteredView,
        }
    }
}

impl Args {
    fn selection(&self) -> FilterSelection {
        FilterSelection {
            city: Choice::from_option(self.city.clone()),
            product_line: Choice::from_option(self.product_line.clone()),
            customer_type: Choice::from_option(self.customer_type.clone()),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // Nothing else runs if the dataset cannot be loaded.
    let dataset = match data::loader::load_file(&args.data) {
        Ok(ds) => Arc::new(ds),
        Err(e) => {
            log::error!("{e}");
            return Err(e).with_context(|| format!("loading {}", args.data.display()));
        }
    };
    log::info!(
        "Loaded {} records from {}",
        dataset.len(),
        args.data.display()
    );

    let options = DashboardOptions {
        correlation_scope: args.correlation_scope.into(),
        ..Default::default()
    };
    let selection = args.selection();

    if args.report {
        let stdout = std::io::stdout();
        return report::write_report(stdout.lock(), &dataset, &selection, options);
    }

    let mut state = AppState::new(options);
    state.selection = selection;
    state.set_dataset(dataset, Some(args.data));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sales Dashboard",
        native_options,
        Box::new(|_cc| Ok(Box::new(SalesDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow!("UI error: {e}"))
}
