// --- APP SHELL ---
// Single-window shell: avatar picker, the avatar itself, a status line
// and the running transcript. Owns the voice session and the channel
// its reader thread delivers turns on.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

use eframe::egui::{self, Color32, CornerRadius, RichText, Vec2};

use crate::audio;
use crate::config::{save_config, AvatarVariant, Config};
use crate::session::{
    tools, ChatMessage, ConnectionStatus, SessionConfig, VoiceSession, WsSession,
};

use super::bubble::{GlowBubble, SoftGlowBubble};
use super::chat;
use super::orb::OrbWidget;

const FLASH_DURATION_SECS: f32 = 0.3;

pub struct OrbApp {
    config: Config,
    orb: OrbWidget,
    glow: GlowBubble,
    soft_glow: SoftGlowBubble,
    session: Option<WsSession>,
    tx: Sender<ChatMessage>,
    rx: Receiver<ChatMessage>,
    /// Newest turn first.
    messages: Vec<ChatMessage>,
    mic_denied: bool,
}

impl OrbApp {
    pub fn new(config: Config) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            config,
            orb: OrbWidget::new(),
            glow: GlowBubble::new(),
            soft_glow: SoftGlowBubble::new(),
            session: None,
            tx,
            rx,
            messages: Vec::new(),
            mic_denied: false,
        }
    }

    fn avatar_active(&self) -> bool {
        match self.config.avatar_variant {
            AvatarVariant::Orb => self.orb.is_active(),
            AvatarVariant::Glow => self.glow.is_active(),
            AvatarVariant::SoftGlow => self.soft_glow.is_active(),
        }
    }

    fn set_avatar_active(&mut self, on: bool) {
        match self.config.avatar_variant {
            AvatarVariant::Orb => self.orb.set_active(on),
            AvatarVariant::Glow => self.glow.set_active(on),
            AvatarVariant::SoftGlow => self.soft_glow.set_active(on),
        }
    }

    /// React to the avatar being clicked on or off.
    fn on_toggle(&mut self, activated: bool) {
        if activated {
            if !audio::microphone_available() {
                crate::log_info!("[App] No usable microphone, refusing to start session");
                self.mic_denied = true;
                self.set_avatar_active(false);
                return;
            }

            let session_config = SessionConfig {
                api_host: self.config.api_host.clone(),
                agent_id: self.config.agent_id.clone(),
                platform: std::env::consts::OS.to_string(),
            };
            let session =
                WsSession::new(session_config, tools::default_registry(), self.tx.clone());
            match session.start() {
                Ok(()) => {
                    crate::log_info!("[App] Session {}", session.status().label());
                    self.session = Some(session);
                }
                Err(e) => {
                    crate::log_info!("[App] Failed to start session: {:#}", e);
                    self.set_avatar_active(false);
                }
            }
        } else if let Some(session) = self.session.take() {
            if let Err(e) = session.stop() {
                crate::log_info!("[App] Session shutdown error: {:#}", e);
            }
        }
    }

    /// Pull the tool-adjusted brightness back into the shell's config copy.
    /// Returns true when it changed, so the caller persists it; without
    /// this, later saves would write the stale pre-tool value.
    fn sync_brightness(&mut self) -> bool {
        let shared = crate::APP.lock().unwrap().config.brightness;
        if (shared - self.config.brightness).abs() > f32::EPSILON {
            self.config.brightness = shared;
            return true;
        }
        false
    }

    fn select_variant(&mut self, variant: AvatarVariant) {
        if self.config.avatar_variant == variant {
            return;
        }
        let was_active = self.avatar_active();
        self.set_avatar_active(false);
        self.config.avatar_variant = variant;
        self.set_avatar_active(was_active);
        save_config(&self.config);
        crate::APP.lock().unwrap().config.avatar_variant = variant;
    }

    fn status_line(&self) -> (&'static str, Color32) {
        let connection = self
            .session
            .as_ref()
            .map(|s| s.status())
            .unwrap_or(ConnectionStatus::Disconnected);
        match connection {
            ConnectionStatus::Connecting => {
                ("Connecting...", Color32::from_rgb(250, 204, 21))
            }
            ConnectionStatus::Connected => {
                ("Listening. How can I help?", Color32::from_rgb(74, 222, 128))
            }
            ConnectionStatus::Disconnecting => {
                ("Wrapping up...", Color32::from_rgb(250, 204, 21))
            }
            ConnectionStatus::Disconnected => {
                ("Tap the orb to start a conversation", Color32::from_rgb(148, 163, 184))
            }
        }
    }

    fn show_variant_picker(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for (variant, label) in [
                (AvatarVariant::Orb, "Orb"),
                (AvatarVariant::Glow, "Glow"),
                (AvatarVariant::SoftGlow, "Soft glow"),
            ] {
                let selected = self.config.avatar_variant == variant;
                if ui.selectable_label(selected, label).clicked() {
                    self.select_variant(variant);
                }
            }
        });
    }

    /// Dim and flash layers painted over the whole viewport, driven by
    /// the change_brightness and flash_screen tools.
    fn show_overlays(&self, ctx: &egui::Context) {
        let (brightness, flash_at) = {
            let app = crate::APP.lock().unwrap();
            (app.brightness, app.flash_at)
        };

        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("tool_overlays"),
        ));
        let screen = ctx.screen_rect();

        if brightness < 1.0 {
            let dim = (1.0 - brightness) * 0.8;
            painter.rect_filled(screen, 0.0, Color32::BLACK.linear_multiply(dim));
        }

        if let Some(at) = flash_at {
            let elapsed = at.elapsed().as_secs_f32();
            if elapsed < FLASH_DURATION_SECS {
                let alpha = 1.0 - elapsed / FLASH_DURATION_SECS;
                painter.rect_filled(screen, 0.0, Color32::WHITE.linear_multiply(alpha));
                ctx.request_repaint();
            } else {
                crate::APP.lock().unwrap().flash_at = None;
            }
        }
    }

    fn show_mic_denied(&mut self, ctx: &egui::Context) {
        egui::Window::new("Microphone unavailable")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label("No usable microphone was found.");
                ui.label("Connect one and try again to talk to the assistant.");
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        self.mic_denied = false;
                    }
                });
            });
    }
}

impl eframe::App for OrbApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Turns delivered by the session reader thread
        while let Ok(message) = self.rx.try_recv() {
            self.messages.insert(0, message);
        }

        if self.sync_brightness() {
            save_config(&self.config);
        }

        // The worker drops to Disconnected on its own when the server or
        // network ends the session; pull the avatar back in sync.
        if self.avatar_active() {
            let gone = self
                .session
                .as_ref()
                .map(|s| s.status() == ConnectionStatus::Disconnected)
                .unwrap_or(true);
            if gone {
                self.set_avatar_active(false);
                self.session = None;
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(8.0);
                ui.label(
                    RichText::new("Voice Orb Assistant")
                        .font(egui::FontId::new(20.0, super::bold_family())),
                );
                ui.add_space(4.0);
                self.show_variant_picker(ui);
                ui.add_space(8.0);

                let was_active = self.avatar_active();
                match self.config.avatar_variant {
                    AvatarVariant::Orb => self.orb.show(ui),
                    AvatarVariant::Glow => self.glow.show(ui),
                    AvatarVariant::SoftGlow => self.soft_glow.show(ui),
                };
                let now_active = self.avatar_active();
                if now_active != was_active {
                    self.on_toggle(now_active);
                }

                let (status_text, status_color) = self.status_line();
                ui.add_space(4.0);
                ui.label(RichText::new(status_text).color(status_color));
            });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.label(RichText::new("Transcript").font(egui::FontId::new(
                    14.0,
                    super::bold_family(),
                )));
                if ui
                    .checkbox(&mut self.config.show_timestamps, "timestamps")
                    .changed()
                {
                    save_config(&self.config);
                    crate::APP.lock().unwrap().config.show_timestamps =
                        self.config.show_timestamps;
                }
            });
            ui.add_space(4.0);
            egui::Frame::new()
                .fill(Color32::from_rgb(18, 18, 26))
                .corner_radius(CornerRadius::same(8))
                .inner_margin(8.0)
                .show(ui, |ui| {
                    ui.set_min_height(ui.available_height());
                    chat::show_transcript(ui, &self.messages, self.config.show_timestamps);
                });
        });

        self.show_overlays(ctx);

        if self.mic_denied {
            self.show_mic_denied(ctx);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(session) = self.session.take() {
            if let Err(e) = session.stop() {
                crate::log_info!("[App] Session shutdown error on exit: {:#}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_adjusted_brightness_flows_into_shell_config() {
        let registry = tools::default_registry();
        registry
            .invoke("change_brightness", json!({ "brightness": 0.55 }))
            .unwrap();

        let mut app = OrbApp::new(Config::default());
        assert!(app.sync_brightness());
        let shared = crate::APP.lock().unwrap().config.brightness;
        assert!((app.config.brightness - shared).abs() < f32::EPSILON);

        // Already in sync, nothing to persist
        assert!(!app.sync_brightness());
    }
}
