mod audio;
mod config;
mod debug_log;
pub mod gui;
mod session;

use config::{load_config, Config};
use lazy_static::lazy_static;
use std::sync::{Arc, Mutex};
use std::time::Instant;

// Window dimensions
pub const WINDOW_WIDTH: f32 = 420.0;
pub const WINDOW_HEIGHT: f32 = 680.0;

pub struct AppState {
    pub config: Config,
    /// App-level dim factor in [0.2, 1.0], adjusted by the change_brightness tool.
    pub brightness: f32,
    /// Set by the flash_screen tool; the shell paints a decaying white overlay.
    pub flash_at: Option<Instant>,
}

lazy_static! {
    pub static ref APP: Arc<Mutex<AppState>> = Arc::new(Mutex::new({
        let config = load_config();
        let brightness = config.brightness;
        AppState {
            config,
            brightness,
            flash_at: None,
        }
    }));
}

fn main() -> eframe::Result<()> {
    crate::log_info!("========================================");
    crate::log_info!("Voice Orb Assistant v{} STARTUP", env!("CARGO_PKG_VERSION"));
    crate::log_info!("========================================");

    let initial_config = APP.lock().unwrap().config.clone();

    let viewport_builder = eframe::egui::ViewportBuilder::default()
        .with_inner_size([WINDOW_WIDTH, WINDOW_HEIGHT])
        .with_resizable(false)
        .with_title("Voice Orb Assistant");

    let options = eframe::NativeOptions {
        viewport: viewport_builder,
        ..Default::default()
    };

    eframe::run_native(
        "Voice Orb Assistant",
        options,
        Box::new(move |cc| {
            gui::configure_fonts(&cc.egui_ctx);

            // Store global context for background threads
            *gui::GUI_CONTEXT.lock().unwrap() = Some(cc.egui_ctx.clone());

            cc.egui_ctx.set_visuals(eframe::egui::Visuals::dark());

            Ok(Box::new(gui::OrbApp::new(initial_config)))
        }),
    )
}
