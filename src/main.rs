//! Docshelf - desktop viewer for a local library of markdown documents
//!
//! A sidebar of documents grouped by category, rendered inline in the
//! central panel.

mod app;
mod core;
mod ui;

use app::DocshelfApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    tracing::info!("Starting Docshelf...");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([420.0, 500.0])
            .with_title("Docshelf"),
        ..Default::default()
    };

    eframe::run_native(
        "Docshelf",
        native_options,
        Box::new(|cc| Ok(Box::new(DocshelfApp::new(cc)))),
    )
}
