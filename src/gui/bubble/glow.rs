// --- GLOW BUBBLE ---
// Dark-theme variant: a frosted bubble with a drifting halo and a 2s
// expanding pulse ring while active.

use super::float_offset;
use eframe::egui::{self, Color32, Sense, Stroke, Vec2};

const CANVAS: f32 = 300.0;

const C_HALO: Color32 = Color32::from_rgb(74, 222, 255);
const C_BODY: Color32 = Color32::from_rgb(56, 189, 248);
const C_DEEP: Color32 = Color32::from_rgb(29, 78, 216);
const C_PULSE: Color32 = Color32::from_rgb(66, 153, 225);

pub struct GlowBubble {
    active: bool,
}

impl GlowBubble {
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

        // 6s vertical float for the whole bubble
        let bob = float_offset(time, 6.0, 10.0);
        let center = rect.center() + Vec2::new(0.0, bob);

        // Halo drifts on two incommensurate sinusoids
        let drift = Vec2::new(
            (time.sin() * 5.0) as f32,
            ((time / 1.5).cos() * 5.0) as f32,
        );
        let halo_alpha = if self.active {
            ((time / 0.8).sin() as f32 + 1.0) / 2.0 * 0.2 + 0.8
        } else {
            0.8
        };
        painter.circle_filled(
            center + drift,
            100.0,
            C_HALO.linear_multiply(0.12 * halo_alpha),
        );
        painter.circle_filled(
            center + drift,
            80.0,
            C_HALO.linear_multiply(0.18 * halo_alpha),
        );

        // Frosted body, light falling from the upper left
        painter.circle_filled(center, 90.0, C_DEEP.linear_multiply(0.1));
        painter.circle_filled(center, 75.0, C_BODY.linear_multiply(0.2));
        painter.circle_filled(center + Vec2::new(-25.0, -25.0), 45.0, C_HALO.linear_multiply(0.4));
        painter.circle_stroke(
            center,
            90.0,
            Stroke::new(1.0, Color32::WHITE.linear_multiply(0.1)),
        );

        if self.active {
            // 2s pulse: ring grows out from the rim and fades
            let phase = ((time % 2.0) / 2.0) as f32;
            let pulse_alpha = 0.7 * (1.0 - phase);
            painter.circle_stroke(
                center,
                90.0 + phase * 20.0,
                Stroke::new(2.0, C_PULSE.linear_multiply(pulse_alpha)),
            );
        }

        ui.ctx().request_repaint();
        response
    }
}
