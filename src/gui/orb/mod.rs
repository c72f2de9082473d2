// --- PARTICLE ORB AVATAR ---
// Canvas-style avatar: 60 particles orbiting a glowing core, with a
// per-frame physics pass reacting to clicks and pointer proximity.

mod render;
mod scene;

pub use scene::{init_particles, Lcg, Particle, CANVAS_SIZE, PARTICLE_COUNT};

use eframe::egui::{self, Color32, Pos2, Sense, Vec2};

// --- PALETTE ---
// Particle colors, drawn at 0.7 base opacity scaled by the per-particle alpha.
pub(crate) const PALETTE: [Color32; 4] = [
    Color32::from_rgb(64, 156, 255),
    Color32::from_rgb(120, 87, 255),
    Color32::from_rgb(45, 211, 214),
    Color32::from_rgb(186, 85, 255),
];

pub(crate) const C_GLOW: Color32 = Color32::from_rgb(100, 180, 255);
pub(crate) const C_LINK: Color32 = Color32::from_rgb(120, 180, 255);

// Background disc (dark navy, center to edge)
pub(crate) const C_BG_CENTER: Color32 = Color32::from_rgb(20, 20, 40);
pub(crate) const C_BG_EDGE: Color32 = Color32::from_rgb(10, 10, 30);

// Core gradient stops, idle and active
pub(crate) const C_CORE_IDLE_IN: Color32 = Color32::from_rgb(180, 210, 255);
pub(crate) const C_CORE_IDLE_MID: Color32 = Color32::from_rgb(100, 160, 255);
pub(crate) const C_CORE_IDLE_OUT: Color32 = Color32::from_rgb(60, 100, 255);
pub(crate) const C_CORE_ACTIVE_IN: Color32 = Color32::from_rgb(220, 240, 255);
pub(crate) const C_CORE_ACTIVE_MID: Color32 = Color32::from_rgb(120, 200, 255);
pub(crate) const C_CORE_ACTIVE_OUT: Color32 = Color32::from_rgb(70, 130, 255);

pub struct OrbWidget {
    particles: Vec<Particle>,
    rng: Lcg,
    active: bool,
}

impl OrbWidget {
    pub fn new() -> Self {
        let mut rng = Lcg::from_clock();
        let particles = init_particles(&mut rng);
        Self {
            particles,
            rng,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, on: bool) {
        self.active = on;
    }

    /// Allocate the 300x300 canvas, advance the simulation one frame and
    /// paint it. A click toggles the active state; nothing else mutates it.
    pub fn show(&mut self, ui: &mut egui::Ui) -> egui::Response {
        let (rect, response) =
            ui.allocate_exact_size(Vec2::splat(CANVAS_SIZE), Sense::click());

        if response.clicked() {
            self.active = !self.active;
        }

        // Surface not yet usable: skip the whole frame pass, no error
        if rect.width() < 1.0 || !ui.is_rect_visible(rect) {
            return response;
        }

        let hover = if response.hovered() {
            response
                .hover_pos()
                .map(|p| Pos2::new(p.x - rect.min.x, p.y - rect.min.y))
        } else {
            None
        };

        render::step(&mut self.particles, hover, &mut self.rng);
        let time = ui.input(|i| i.time);
        render::paint(ui.painter(), rect, &self.particles, self.active, time);

        // Self-rescheduling frame loop; ends when the widget stops painting
        ui.ctx().request_repaint();

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_toggle_restores_state() {
        let mut orb = OrbWidget::new();
        assert!(!orb.is_active());
        orb.set_active(true);
        orb.set_active(false);
        assert!(!orb.is_active());
        orb.set_active(true);
        assert!(orb.is_active());
    }
}
