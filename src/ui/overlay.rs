//! Dismissible error overlays

use eframe::egui;

#[derive(Debug, Clone)]
struct ErrorOverlay {
    id: u64,
    message: String,
}

/// Stacked error windows, each dismissed independently by its own OK
/// button. Repeated messages are not deduplicated.
#[derive(Debug, Default)]
pub struct ErrorNotifier {
    overlays: Vec<ErrorOverlay>,
    next_id: u64,
}

impl ErrorNotifier {
    pub fn push(&mut self, message: impl Into<String>) {
        let id = self.next_id;
        self.next_id += 1;
        self.overlays.push(ErrorOverlay {
            id,
            message: message.into(),
        });
    }

    /// Render all overlays, removing the ones dismissed this frame
    pub fn show(&mut self, ctx: &egui::Context) {
        let mut dismissed = Vec::new();

        for (index, overlay) in self.overlays.iter().enumerate() {
            let offset = index as f32 * 16.0;
            egui::Window::new("Error")
                .id(egui::Id::new(("error_overlay", overlay.id)))
                .collapsible(false)
                .resizable(false)
                .order(egui::Order::Foreground)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(offset, offset))
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.label(egui::RichText::new("\u{26A0}").size(32.0));
                        ui.add_space(4.0);
                        ui.label(&overlay.message);
                        ui.add_space(8.0);
                        if ui.button("OK").clicked() {
                            dismissed.push(overlay.id);
                        }
                    });
                });
        }

        self.overlays.retain(|o| !dismissed.contains(&o.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlays_stack_without_deduplication() {
        let mut notifier = ErrorNotifier::default();
        assert!(notifier.overlays.is_empty());

        notifier.push("Failed once");
        notifier.push("Failed once");
        notifier.push("Failed differently");

        assert_eq!(notifier.overlays.len(), 3);
    }
}
