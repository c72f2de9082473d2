pub mod app;
pub mod bubble;
pub mod chat;
pub mod orb;

pub use app::OrbApp;

use eframe::egui;
use std::sync::Arc;

lazy_static::lazy_static! {
    pub static ref GUI_CONTEXT: std::sync::Mutex<Option<eframe::egui::Context>> = std::sync::Mutex::new(None);
}

// Two weights, tried in order; the UI renders with egui's bundled fonts
// until both are found.
const FONT_SOURCES: [(&str, &[&str]); 2] = [
    (
        "orb-regular",
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "C:\\Windows\\Fonts\\segoeui.ttf",
        ],
    ),
    (
        "orb-bold",
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
            "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
            "C:\\Windows\\Fonts\\segoeuib.ttf",
        ],
    ),
];

/// Font family carrying the bold weight, for headings and sender labels.
pub fn bold_family() -> egui::FontFamily {
    egui::FontFamily::Name("orb-bold".into())
}

/// Install the regular and bold UI fonts. The gate is all-or-nothing: unless
/// both weights load, egui's defaults stay in place and nothing is reported.
pub fn configure_fonts(ctx: &egui::Context) {
    let mut fonts = egui::FontDefinitions::default();
    let mut loaded = 0;

    for (name, paths) in FONT_SOURCES {
        if let Some(bytes) = paths.iter().find_map(|p| std::fs::read(p).ok()) {
            fonts
                .font_data
                .insert(name.to_string(), Arc::new(egui::FontData::from_owned(bytes)));
            loaded += 1;
        }
    }

    if loaded < 2 {
        crate::log_info!("UI fonts not found on this system, using built-in fonts");
        return;
    }

    fonts
        .families
        .entry(egui::FontFamily::Proportional)
        .or_default()
        .insert(0, "orb-regular".to_string());
    fonts
        .families
        .insert(bold_family(), vec!["orb-bold".to_string()]);

    ctx.set_fonts(fonts);
}
