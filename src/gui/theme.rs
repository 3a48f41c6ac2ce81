use egui::{self, Color32};

use crate::launcher::LauncherState;

// === Design Tokens ===

// Window background, same grey the renderer uses for its own chrome
pub const BACKGROUND: Color32 = Color32::from_rgb(46, 46, 46);
pub const PANEL_FILL: Color32 = Color32::from_rgb(56, 56, 56);
pub const ACCENT: Color32 = Color32::from_rgb(90, 160, 255);

// Status label
pub const STATUS_RUNNING: Color32 = Color32::from_rgb(110, 210, 120);
pub const STATUS_STOPPED: Color32 = Color32::from_rgb(200, 200, 200);
pub const ERROR_TEXT: Color32 = Color32::from_rgb(255, 120, 110);

// Metrics
pub const SECTION_SPACING: f32 = 8.0;
pub const LABEL_COLUMN_WIDTH: f32 = 140.0;
pub const SLIDER_WIDTH: f32 = 320.0;

/// Dark visuals on the shared grey background
pub fn apply(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();
    visuals.panel_fill = BACKGROUND;
    visuals.window_fill = PANEL_FILL;
    visuals.extreme_bg_color = Color32::from_rgb(30, 30, 30);
    visuals.selection.bg_fill = ACCENT.linear_multiply(0.6);
    visuals.hyperlink_color = ACCENT;
    ctx.set_visuals(visuals);

    ctx.style_mut(|style| {
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.slider_width = SLIDER_WIDTH;
    });
}

pub fn status_text(state: LauncherState) -> &'static str {
    match state {
        LauncherState::Running => "Status: Running",
        LauncherState::Stopped => "Status: Not Running",
    }
}

pub fn status_color(state: LauncherState) -> Color32 {
    match state {
        LauncherState::Running => STATUS_RUNNING,
        LauncherState::Stopped => STATUS_STOPPED,
    }
}
