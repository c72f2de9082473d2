// --- TRANSCRIPT VIEW ---
// Scrollable conversation log. Newest turn on top; user turns hug the
// right edge, agent turns the left, like any messaging client.

use eframe::egui::{self, Align, Color32, CornerRadius, FontId, Layout, RichText};

use crate::session::ChatMessage;

const C_USER_BUBBLE: Color32 = Color32::from_rgb(37, 99, 235);
const C_AI_BUBBLE: Color32 = Color32::from_rgb(45, 45, 55);
const C_SENDER: Color32 = Color32::from_rgb(148, 163, 184);
const C_TIMESTAMP: Color32 = Color32::from_rgb(100, 110, 125);

pub fn show_transcript(ui: &mut egui::Ui, messages: &[ChatMessage], show_timestamps: bool) {
    if messages.is_empty() {
        ui.vertical_centered(|ui| {
            ui.add_space(12.0);
            ui.label(
                RichText::new("Your conversation will appear here")
                    .color(C_TIMESTAMP)
                    .italics(),
            );
        });
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for message in messages {
                show_message(ui, message, show_timestamps);
                ui.add_space(6.0);
            }
        });
}

fn show_message(ui: &mut egui::Ui, message: &ChatMessage, show_timestamps: bool) {
    let from_user = message.sender == "user";
    let layout = if from_user {
        Layout::top_down(Align::Max)
    } else {
        Layout::top_down(Align::Min)
    };
    let fill = if from_user { C_USER_BUBBLE } else { C_AI_BUBBLE };
    let sender_label = if from_user { "You" } else { "Assistant" };

    ui.with_layout(layout, |ui| {
        ui.label(
            RichText::new(sender_label)
                .color(C_SENDER)
                .font(FontId::new(11.0, crate::gui::bold_family())),
        );
        egui::Frame::new()
            .fill(fill)
            .corner_radius(CornerRadius::same(10))
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.set_max_width(ui.available_width() * 0.8);
                ui.label(RichText::new(&message.text).color(Color32::WHITE));
            });
        if show_timestamps {
            ui.label(
                RichText::new(format_timestamp(&message.timestamp))
                    .color(C_TIMESTAMP)
                    .size(10.0),
            );
        }
    });
}

/// Local wall-clock time of the turn, or the raw string when it does
/// not parse as RFC 3339.
fn format_timestamp(timestamp: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(timestamp) {
        Ok(t) => t
            .with_timezone(&chrono::Local)
            .format("%H:%M:%S")
            .to_string(),
        Err(_) => timestamp.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_render_as_wall_clock_time() {
        let out = format_timestamp("2026-08-30T12:34:56+00:00");
        assert_eq!(out.matches(':').count(), 2);
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn unparseable_timestamps_pass_through() {
        assert_eq!(format_timestamp("just now"), "just now");
    }
}
