//! Hierarchy viewer - native stand-in host for the tree widget
//!
//! Loads a query result (dimensions, rows, options) from a JSON file and
//! mounts the visualization in a window. Label links are opened through
//! egui's url handling.
//!
//! Usage:
//!   cargo run --features viewer --bin hierarchy_viewer -- demos/org_chart.json

use anyhow::{Context, Result};
use eframe::egui;
use hierarchy_graph::graph::ClickOutcome;
use hierarchy_graph::{HierarchyVis, QueryResponse};
use tracing::{info, warn};

struct ViewerApp {
    vis: HierarchyVis,
    response: QueryResponse,
    mounted: bool,
}

impl ViewerApp {
    fn new(response: QueryResponse) -> Self {
        Self {
            vis: HierarchyVis::create(),
            response,
            mounted: false,
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if !self.mounted {
                self.mounted = true;
                match self.vis.update(&self.response, ui.available_size()) {
                    Ok(summary) => info!(nodes = summary.entering.len(), "mounted"),
                    Err(err) => warn!(error = %err, "update rejected"),
                }
            }
            match self.vis.ui(ui) {
                Some(ClickOutcome::Navigate { url, .. }) => {
                    info!(%url, "navigate");
                    ctx.open_url(egui::OpenUrl::same_tab(url));
                }
                Some(ClickOutcome::Toggled(id)) => info!(node = %id, "toggled"),
                _ => {}
            }
        });
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/org_chart.json".to_string());
    let source =
        std::fs::read_to_string(&path).with_context(|| format!("reading query result {path}"))?;
    let response =
        QueryResponse::from_json(&source).with_context(|| format!("parsing query result {path}"))?;
    info!(rows = response.rows.len(), dimensions = response.dimensions.len(), "loaded");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Hierarchy"),
        ..Default::default()
    };

    eframe::run_native(
        "Hierarchy",
        options,
        Box::new(|_cc| Ok(Box::new(ViewerApp::new(response)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))
}
