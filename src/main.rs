mod app;
mod cli;
mod color;
mod state;
mod ui;

use anyhow::anyhow;
use app::RustySlopeApp;
use clap::Parser;
use cli::Cli;
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.summary {
        return cli::run_summary(&cli);
    }

    let mut state = AppState::default();
    if let Some(path) = &cli.file {
        state.open_path(path);
        if let Some(graph) = cli.graph_value() {
            if state.categories.contains(&graph) {
                state.select_category(graph);
            } else {
                log::warn!("Graph_ID '{graph}' not found in {}", path.display());
            }
        }
        if let Some(view) = &state.view {
            if cli.from.is_some() || cli.to.is_some() {
                let start = cli.from.unwrap_or(view.bounds.start());
                let end = cli.to.unwrap_or(view.bounds.end());
                state.set_date_range(start, end);
            }
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Slope – Displacement & Precipitation",
        options,
        Box::new(move |_cc| Ok(Box::new(RustySlopeApp::new(state)))),
    )
    .map_err(|e| anyhow!("failed to start the viewer: {e}"))
}
