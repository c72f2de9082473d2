// --- SOFT GLOW BUBBLE ---
// Light-theme variant: gentler drift, lower opacity, 3s pulse.

use super::float_offset;
use eframe::egui::{self, Color32, Sense, Stroke, Vec2};

const CANVAS: f32 = 300.0;

const C_HALO: Color32 = Color32::from_rgb(96, 165, 250);
const C_BODY: Color32 = Color32::from_rgb(147, 197, 253);
const C_BACKDROP: Color32 = Color32::from_rgb(219, 234, 254);

pub struct SoftGlowBubble {
    active: bool,
}

impl SoftGlowBubble {
    pub fn new() -> Self {
        Self { active: false }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, on: bool) {
        self.active = on;
    }

    pub fn show(&mut self, ui: &mut egui::Ui) -> egui::Response {
        let (rect, response) = ui.allocate_exact_size(Vec2::splat(CANVAS), Sense::click());
        if response.clicked() {
            self.active = !self.active;
        }
        if rect.width() < 1.0 || !ui.is_rect_visible(rect) {
            return response;
        }

        let painter = ui.painter();
        let time = ui.input(|i| i.time);

        // Blurred backdrop patches behind everything
        painter.circle_filled(
            rect.left_top() + Vec2::new(60.0, 50.0),
            70.0,
            C_BACKDROP.linear_multiply(0.4),
        );
        painter.circle_filled(
            rect.right_bottom() - Vec2::new(50.0, 60.0),
            55.0,
            C_BACKDROP.linear_multiply(0.3),
        );

        let bob = float_offset(time, 6.0, 8.0);
        let center = rect.center() + Vec2::new(0.0, bob);

        let drift = Vec2::new(
            ((time / 1.2).sin() * 4.0) as f32,
            ((time / 1.5).cos() * 4.0) as f32,
        );
        let halo_alpha = if self.active {
            (time.sin() as f32 + 1.0) / 2.0 * 0.15 + 0.6
        } else {
            0.6
        };
        painter.circle_filled(
            center + drift,
            95.0,
            C_HALO.linear_multiply(0.1 * halo_alpha),
        );
        painter.circle_filled(
            center + drift,
            75.0,
            C_HALO.linear_multiply(0.16 * halo_alpha),
        );

        painter.circle_filled(center, 85.0, C_BODY.linear_multiply(0.25));
        painter.circle_filled(center + Vec2::new(-20.0, -20.0), 40.0, Color32::WHITE.linear_multiply(0.5));
        painter.circle_stroke(
            center,
            85.0,
            Stroke::new(1.0, Color32::WHITE.linear_multiply(0.3)),
        );

        if self.active {
            let phase = ((time % 3.0) / 3.0) as f32;
            let pulse_alpha = 0.4 * (1.0 - phase);
            painter.circle_stroke(
                center,
                85.0 + phase * 15.0,
                Stroke::new(2.0, C_HALO.linear_multiply(pulse_alpha)),
            );
        }

        ui.ctx().request_repaint();
        response
    }
}
