//! Central viewer panel: welcome screen, loading spinner, rendered
//! document, and error placeholder

use eframe::egui;
use egui_commonmark::{CommonMarkCache, CommonMarkViewer};

use crate::app::Action;
use crate::core::config::ChromeConfig;
use crate::core::document::Document;
use crate::core::library;
use crate::core::viewer::{ViewerController, ViewerState};

/// Scroll bookkeeping for the rendered view
#[derive(Debug, Default)]
pub struct ViewerPanelState {
    /// Outline click target as a fraction of the document height
    scroll_to_fraction: Option<f32>,
    /// Content height measured on the previous frame
    last_content_height: f32,
}

impl ViewerPanelState {
    /// Scroll the rendered view back to the top on the next frame
    pub fn scroll_to_top(&mut self) {
        self.scroll_to_fraction = Some(0.0);
    }
}

/// The central document viewer panel
pub struct ViewerPanel;

impl ViewerPanel {
    pub fn show(
        ui: &mut egui::Ui,
        viewer: &ViewerController,
        chrome: &ChromeConfig,
        panel: &mut ViewerPanelState,
        cache: &mut CommonMarkCache,
        actions: &mut Vec<Action>,
    ) {
        match viewer.state() {
            ViewerState::Welcome => Self::show_welcome(ui, actions),
            ViewerState::Loading => Self::show_loading(ui, viewer),
            ViewerState::Showing => Self::show_document(ui, viewer, chrome, panel, cache, actions),
            ViewerState::Error => Self::show_error(ui, viewer),
        }
    }

    /// Welcome screen with category shortcuts
    fn show_welcome(ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.vertical_centered(|ui| {
            ui.add_space(80.0);

            ui.heading("Welcome to Docshelf");
            ui.add_space(16.0);
            ui.label("Select a document from the sidebar to start reading.");
            ui.add_space(24.0);

            ui.label("Browse by category:");
            ui.add_space(8.0);
            ui.horizontal_wrapped(|ui| {
                // center the button row roughly within the panel
                let total = library::CATEGORY_IDS.len() as f32 * 80.0;
                ui.add_space((ui.available_width() - total).max(0.0) / 2.0);
                for id in library::CATEGORY_IDS {
                    let label = library::category_heading(id).unwrap_or(id);
                    if ui.button(label).clicked() {
                        actions.push(Action::ScrollToCategory(id.to_string()));
                    }
                }
            });
        });
    }

    fn show_loading(ui: &mut egui::Ui, viewer: &ViewerController) {
        ui.vertical_centered(|ui| {
            ui.add_space(120.0);
            ui.add(egui::Spinner::new().size(32.0));
            ui.add_space(12.0);
            ui.label(format!("Loading {}...", viewer.title()));
        });
    }

    fn show_document(
        ui: &mut egui::Ui,
        viewer: &ViewerController,
        chrome: &ChromeConfig,
        panel: &mut ViewerPanelState,
        cache: &mut CommonMarkCache,
        actions: &mut Vec<Action>,
    ) {
        if chrome.toolbar {
            Self::show_toolbar(ui, viewer, actions);
            ui.separator();
        }

        let document = viewer.document();
        let show_outline = chrome.nav_pane
            && document.map(|d| !d.outline.is_empty()).unwrap_or(false);

        ui.horizontal_top(|ui| {
            if show_outline {
                if let Some(doc) = document {
                    ui.vertical(|ui| {
                        ui.set_width(200.0);
                        Self::show_outline(ui, doc, panel);
                    });
                    ui.separator();
                }
            }

            ui.vertical(|ui| {
                Self::show_body(ui, document, chrome, panel, cache);
            });
        });
    }

    /// Toolbar row: home button, title, open-externally
    fn show_toolbar(ui: &mut egui::Ui, viewer: &ViewerController, actions: &mut Vec<Action>) {
        ui.horizontal(|ui| {
            if ui.button("\u{2302} Home").on_hover_text("Back to the welcome screen").clicked() {
                actions.push(Action::GoHome);
            }
            ui.separator();
            ui.label(egui::RichText::new(viewer.title()).strong());

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(path) = viewer.active() {
                    if ui
                        .button("Open externally")
                        .on_hover_text("Open in the system viewer")
                        .clicked()
                    {
                        actions.push(Action::OpenExternal(path.to_path_buf()));
                    }
                }
            });
        });
    }

    /// Outline pane; clicking a heading scrolls the body approximately to
    /// its position.
    fn show_outline(ui: &mut egui::Ui, doc: &Document, panel: &mut ViewerPanelState) {
        ui.label(egui::RichText::new("Outline").strong());
        ui.add_space(4.0);

        egui::ScrollArea::vertical()
            .id_salt("outline_scroll")
            .show(ui, |ui| {
                for heading in &doc.outline {
                    let indent = f32::from(heading.level.saturating_sub(1)) * 12.0;
                    ui.horizontal(|ui| {
                        ui.add_space(indent);
                        if ui.link(&heading.text).clicked() {
                            let fraction = heading.line.saturating_sub(1) as f32
                                / doc.line_count.max(1) as f32;
                            panel.scroll_to_fraction = Some(fraction);
                        }
                    });
                }
            });
    }

    fn show_body(
        ui: &mut egui::Ui,
        document: Option<&Document>,
        chrome: &ChromeConfig,
        panel: &mut ViewerPanelState,
        cache: &mut CommonMarkCache,
    ) {
        let mut scroll = egui::ScrollArea::vertical().id_salt("viewer_scroll");
        if !chrome.scrollbar {
            scroll = scroll
                .scroll_bar_visibility(egui::scroll_area::ScrollBarVisibility::AlwaysHidden);
        }
        if let Some(fraction) = panel.scroll_to_fraction.take() {
            scroll = scroll.vertical_scroll_offset(fraction * panel.last_content_height);
        }

        let output = scroll.show(ui, |ui| match document {
            Some(doc) => {
                CommonMarkViewer::new().show(ui, cache, doc.body());
            }
            None => {
                // force-shown without content: nothing arrived in time
                ui.add_space(40.0);
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new("Nothing to display.").weak());
                });
            }
        });
        panel.last_content_height = output.content_size.y;
    }

    /// Error state keeps the rendered view hidden; the modal overlay
    /// carries the message, this is just the backdrop.
    fn show_error(ui: &mut egui::Ui, viewer: &ViewerController) {
        ui.vertical_centered(|ui| {
            ui.add_space(120.0);
            ui.label(egui::RichText::new("\u{26A0}").size(36.0));
            ui.add_space(8.0);
            if let Some(message) = viewer.error_message() {
                ui.label(egui::RichText::new(message).weak());
            }
        });
    }
}
