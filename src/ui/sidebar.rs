//! Sidebar navigation panel and its narrow-window state

use std::time::{Duration, Instant};

use eframe::egui;

use crate::app::Action;
use crate::core::library::{self, Library};
use crate::core::viewer::ViewerController;

/// Delay before a scheduled category scroll is performed
pub const SCROLL_DELAY: Duration = Duration::from_millis(300);
/// How long a scrolled-to heading keeps its highlight
pub const HIGHLIGHT_DURATION: Duration = Duration::from_secs(2);

/// Sidebar open flag plus category scroll scheduling. The open flag only
/// matters on narrow windows; wide layouts always show the sidebar.
#[derive(Debug, Default)]
pub struct SidebarState {
    pub open: bool,
    pending_scroll: Option<PendingScroll>,
    highlight: Option<Highlight>,
}

#[derive(Debug)]
struct PendingScroll {
    category: String,
    due: Instant,
}

#[derive(Debug)]
struct Highlight {
    category: String,
    until: Instant,
}

impl SidebarState {
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Schedule a scroll to a category by identifier. Unknown identifiers
    /// and identifiers whose heading is absent from the library are
    /// silent no-ops.
    pub fn scroll_to_category(&mut self, library: &Library, id: &str, narrow: bool, now: Instant) {
        let Some(heading) = library::category_heading(id) else {
            return;
        };
        let Some(category) = library.find_category(heading) else {
            return;
        };
        if narrow {
            self.open = true;
        }
        let name = category.name.clone();
        self.pending_scroll = Some(PendingScroll {
            category: name.clone(),
            due: now + SCROLL_DELAY,
        });
        self.highlight = Some(Highlight {
            category: name,
            until: now + SCROLL_DELAY + HIGHLIGHT_DURATION,
        });
    }

    /// Category due to be scrolled into view this frame, if any
    fn take_due_scroll(&mut self, now: Instant) -> Option<String> {
        if self.pending_scroll.as_ref().is_some_and(|p| now >= p.due) {
            return self.pending_scroll.take().map(|p| p.category);
        }
        None
    }

    /// Whether a heading currently carries the transient highlight;
    /// expired highlights are cleared on query.
    fn is_highlighted(&mut self, name: &str, now: Instant) -> bool {
        match &self.highlight {
            Some(highlight) if highlight.category == name => {
                if now < highlight.until {
                    true
                } else {
                    self.highlight = None;
                    false
                }
            }
            _ => false,
        }
    }

    /// Whether a scroll or highlight timer is still pending
    pub fn has_pending_effects(&self) -> bool {
        self.pending_scroll.is_some() || self.highlight.is_some()
    }
}

/// Sidebar panel listing categories and their entries
pub struct SidebarPanel;

impl SidebarPanel {
    pub fn show(
        ui: &mut egui::Ui,
        library: &Library,
        viewer: &ViewerController,
        state: &mut SidebarState,
        now: Instant,
        actions: &mut Vec<Action>,
    ) {
        ui.vertical(|ui| {
            ui.horizontal(|ui| {
                ui.heading("Documents");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("\u{21BB}").on_hover_text("Refresh").clicked() {
                        actions.push(Action::RefreshLibrary);
                    }
                });
            });

            ui.separator();

            egui::ScrollArea::vertical()
                .id_salt("sidebar_scroll")
                .show(ui, |ui| {
                    if library.categories.is_empty() {
                        ui.label("No library open");
                        ui.add_space(10.0);
                        if ui.button("Open Library...").clicked() {
                            actions.push(Action::PickLibrary);
                        }
                        return;
                    }

                    ui.label(
                        egui::RichText::new(format!("{} documents", library.entry_count()))
                            .weak(),
                    );
                    ui.add_space(6.0);

                    let due_scroll = state.take_due_scroll(now);
                    for category in &library.categories {
                        Self::show_category(
                            ui,
                            category,
                            viewer,
                            state,
                            now,
                            due_scroll.as_deref(),
                            actions,
                        );
                    }
                });
        });
    }

    fn show_category(
        ui: &mut egui::Ui,
        category: &library::Category,
        viewer: &ViewerController,
        state: &mut SidebarState,
        now: Instant,
        due_scroll: Option<&str>,
        actions: &mut Vec<Action>,
    ) {
        let mut heading = egui::RichText::new(&category.name).strong();
        if state.is_highlighted(&category.name, now) {
            heading = heading
                .background_color(ui.visuals().selection.bg_fill.gamma_multiply(0.4));
        }

        let response = ui.label(heading);
        if due_scroll == Some(category.name.as_str()) {
            response.scroll_to_me(Some(egui::Align::Min));
        }

        for entry in &category.entries {
            let is_active = viewer.active() == Some(entry.path.as_path());
            ui.horizontal(|ui| {
                ui.add_space(12.0);
                if ui.selectable_label(is_active, &entry.title).clicked() {
                    actions.push(Action::SelectEntry {
                        path: entry.path.clone(),
                        title: entry.title.clone(),
                    });
                }
            });
        }

        ui.add_space(8.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::library::Category;

    fn library_with(names: &[&str]) -> Library {
        Library {
            root: None,
            categories: names
                .iter()
                .map(|name| Category {
                    name: name.to_string(),
                    entries: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_unknown_identifier_is_a_noop() {
        let library = library_with(&["Essays"]);
        let mut state = SidebarState::default();
        state.scroll_to_category(&library, "bogus", true, Instant::now());

        assert!(!state.open);
        assert!(!state.has_pending_effects());
    }

    #[test]
    fn test_missing_heading_is_a_noop() {
        // "papers" maps to "Papers", which this library does not contain
        let library = library_with(&["Essays"]);
        let mut state = SidebarState::default();
        state.scroll_to_category(&library, "papers", true, Instant::now());

        assert!(!state.open);
        assert!(!state.has_pending_effects());
    }

    #[test]
    fn test_scroll_to_category_schedules_scroll_and_highlight() {
        let library = library_with(&["Essays", "Papers"]);
        let mut state = SidebarState::default();
        let now = Instant::now();
        state.scroll_to_category(&library, "essays", false, now);

        assert!(!state.open, "wide windows never set the overlay flag");
        assert!(state.has_pending_effects());

        // not yet due
        assert_eq!(state.take_due_scroll(now), None);
        // due after the fixed delay
        assert_eq!(
            state.take_due_scroll(now + SCROLL_DELAY),
            Some("Essays".to_string())
        );
        // consumed
        assert_eq!(state.take_due_scroll(now + SCROLL_DELAY), None);
    }

    #[test]
    fn test_scroll_to_category_opens_sidebar_on_narrow() {
        let library = library_with(&["Essays"]);
        let mut state = SidebarState::default();
        state.scroll_to_category(&library, "essays", true, Instant::now());
        assert!(state.open);
    }

    #[test]
    fn test_highlight_expires_after_fixed_duration() {
        let library = library_with(&["Essays"]);
        let mut state = SidebarState::default();
        let now = Instant::now();
        state.scroll_to_category(&library, "essays", false, now);

        state.take_due_scroll(now + SCROLL_DELAY);
        assert!(state.is_highlighted("Essays", now + SCROLL_DELAY));
        assert!(!state.is_highlighted("Papers", now + SCROLL_DELAY));

        let after = now + SCROLL_DELAY + HIGHLIGHT_DURATION;
        assert!(!state.is_highlighted("Essays", after));
        // cleared on expiry
        assert!(!state.has_pending_effects());
    }

    #[test]
    fn test_toggle_and_close() {
        let mut state = SidebarState::default();
        state.toggle();
        assert!(state.open);
        state.toggle();
        assert!(!state.open);
        state.open = true;
        state.close();
        assert!(!state.open);
    }
}
