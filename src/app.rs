//! Main application state and UI coordination

use std::path::PathBuf;
use std::time::{Duration, Instant};

use eframe::egui;

use crate::core::config::AppConfig;
use crate::core::library::Library;
use crate::core::viewer::{LoadPolicy, ViewerController, ViewerEvent};
use crate::ui::overlay::ErrorNotifier;
use crate::ui::sidebar::{SidebarPanel, SidebarState};
use crate::ui::viewer::{ViewerPanel, ViewerPanelState};

/// Window width at or below which the sidebar becomes a toggleable overlay
pub const NARROW_WIDTH: f32 = 768.0;

/// User-facing message when the library folder cannot be read
pub const SCAN_FAILED_MESSAGE: &str = "Failed to read the library folder.";

/// State changes requested by input handlers. Panels only read state and
/// emit actions; the app applies them once per frame.
#[derive(Debug, Clone)]
pub enum Action {
    SelectEntry { path: PathBuf, title: String },
    GoHome,
    ToggleSidebar,
    CloseSidebar,
    ScrollToCategory(String),
    OpenExternal(PathBuf),
    RefreshLibrary,
    PickLibrary,
}

/// Main application state
pub struct DocshelfApp {
    config: AppConfig,
    library: Library,
    viewer: ViewerController,
    sidebar: SidebarState,
    panel: ViewerPanelState,
    errors: ErrorNotifier,
    commonmark_cache: egui_commonmark::CommonMarkCache,
}

impl DocshelfApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Image loaders so embedded pictures render in documents
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let config = AppConfig::load().unwrap_or_default();
        let policy = LoadPolicy {
            force_show_on_timeout: config.viewer.force_show_on_timeout,
            ..LoadPolicy::default()
        };

        let mut app = Self {
            library: Library::default(),
            viewer: ViewerController::new(policy),
            sidebar: SidebarState::default(),
            panel: ViewerPanelState::default(),
            errors: ErrorNotifier::default(),
            commonmark_cache: egui_commonmark::CommonMarkCache::default(),
            config,
        };

        if let Some(path) = app.config.last_library.clone() {
            match Library::scan(&path) {
                Ok(library) => app.library = library,
                Err(e) => {
                    tracing::error!("Failed to scan last library {}: {}", path.display(), e)
                }
            }
        }

        app
    }

    /// Open a library directory and remember it
    pub fn open_library(&mut self, path: PathBuf) {
        match Library::scan(&path) {
            Ok(library) => {
                self.library = library;
                self.config.last_library = Some(path);
                let _ = self.config.save();
                self.viewer.go_home();
            }
            Err(e) => {
                tracing::error!("Failed to scan library: {}", e);
                self.errors.push(SCAN_FAILED_MESSAGE);
            }
        }
    }

    /// Rescan the current library in place
    fn refresh_library(&mut self) {
        let Some(root) = self.library.root.clone() else {
            return;
        };
        match Library::scan(&root) {
            Ok(library) => self.library = library,
            Err(e) => {
                tracing::error!("Failed to refresh library: {}", e);
                self.errors.push(SCAN_FAILED_MESSAGE);
            }
        }
    }

    fn apply_action(&mut self, action: Action, narrow: bool, now: Instant) {
        match action {
            Action::SelectEntry { path, title } => {
                self.viewer.open(path, &title, now);
                self.panel.scroll_to_top();
                if narrow {
                    self.sidebar.close();
                }
            }
            Action::GoHome => self.viewer.go_home(),
            Action::ToggleSidebar => self.sidebar.toggle(),
            Action::CloseSidebar => self.sidebar.close(),
            Action::ScrollToCategory(id) => {
                self.sidebar
                    .scroll_to_category(&self.library, &id, narrow, now)
            }
            Action::OpenExternal(path) => {
                if let Err(e) = open::that(&path) {
                    tracing::error!("Failed to open {} externally: {}", path.display(), e);
                }
            }
            Action::RefreshLibrary => self.refresh_library(),
            Action::PickLibrary => {
                if let Some(path) = rfd::FileDialog::new().pick_folder() {
                    self.open_library(path);
                }
            }
        }
    }

    /// Render the top menu bar; returns its rect and the rect of the
    /// narrow-mode toggle button, used for outside-click detection.
    fn render_menu_bar(
        &mut self,
        ctx: &egui::Context,
        narrow: bool,
        actions: &mut Vec<Action>,
    ) -> (egui::Rect, Option<egui::Rect>) {
        let mut toggle_rect = None;

        let response = egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                if narrow {
                    let toggle = ui.button("\u{2630}").on_hover_text("Navigation");
                    if toggle.clicked() {
                        actions.push(Action::ToggleSidebar);
                    }
                    toggle_rect = Some(toggle.rect);
                }

                ui.menu_button("File", |ui| {
                    if ui.button("Open Library...").clicked() {
                        actions.push(Action::PickLibrary);
                        ui.close();
                    }
                    if ui.button("Refresh").clicked() {
                        actions.push(Action::RefreshLibrary);
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Home").clicked() {
                        actions.push(Action::GoHome);
                        ui.close();
                    }
                });

                ui.separator();
                ui.label(egui::RichText::new(self.viewer.title()).strong());
            });
        });

        (response.response.rect, toggle_rect)
    }
}

impl eframe::App for DocshelfApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let narrow = ctx.screen_rect().width() <= NARROW_WIDTH;
        let mut actions: Vec<Action> = Vec::new();

        // widening past the threshold closes the overlay
        if !narrow {
            self.sidebar.close();
        }

        // Escape closes the sidebar overlay on narrow windows
        if narrow {
            ctx.input(|i| {
                if i.key_pressed(egui::Key::Escape) {
                    actions.push(Action::CloseSidebar);
                }
            });
        }

        for event in self.viewer.tick(now) {
            if let ViewerEvent::LoadFailed(message) = event {
                self.errors.push(message);
            }
        }

        let (menu_rect, toggle_rect) = self.render_menu_bar(ctx, narrow, &mut actions);

        let mut sidebar_rect = None;
        if !narrow {
            egui::SidePanel::left("sidebar")
                .resizable(true)
                .default_width(self.config.ui.sidebar_width)
                .min_width(180.0)
                .show(ctx, |ui| {
                    SidebarPanel::show(
                        ui,
                        &self.library,
                        &self.viewer,
                        &mut self.sidebar,
                        now,
                        &mut actions,
                    );
                });
        } else if self.sidebar.open {
            let response = egui::Area::new(egui::Id::new("sidebar_overlay"))
                .order(egui::Order::Foreground)
                .fixed_pos(egui::pos2(0.0, menu_rect.bottom()))
                .show(ctx, |ui| {
                    egui::Frame::side_top_panel(&ctx.style()).show(ui, |ui| {
                        ui.set_width(self.config.ui.sidebar_width);
                        ui.set_min_height(ctx.screen_rect().height() - menu_rect.height());
                        SidebarPanel::show(
                            ui,
                            &self.library,
                            &self.viewer,
                            &mut self.sidebar,
                            now,
                            &mut actions,
                        );
                    });
                });
            sidebar_rect = Some(response.response.rect);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ViewerPanel::show(
                ui,
                &self.viewer,
                &self.config.viewer.chrome,
                &mut self.panel,
                &mut self.commonmark_cache,
                &mut actions,
            );
        });

        // clicking outside the open overlay closes it
        if narrow && self.sidebar.open {
            if let Some(rect) = sidebar_rect {
                let clicked_outside = ctx.input(|i| {
                    i.pointer.any_pressed()
                        && i.pointer.interact_pos().is_some_and(|pos| {
                            !rect.contains(pos)
                                && !toggle_rect.is_some_and(|t| t.contains(pos))
                        })
                });
                if clicked_outside {
                    actions.push(Action::CloseSidebar);
                }
            }
        }

        self.errors.show(ctx);

        for action in actions.drain(..) {
            self.apply_action(action, narrow, now);
        }

        // keep ticking while a load or a sidebar timer is pending
        if self.viewer.is_busy() || self.sidebar.has_pending_effects() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}
