mod config;
mod gui;
mod launcher;
mod logging;
mod osc;
mod panel;
mod params;

use anyhow::{Context, Result};
use eframe::egui;

use crate::config::AppConfig;
use crate::gui::LauncherApp;
use crate::launcher::Launcher;
use crate::osc::OscSender;
use crate::panel::ControlPanel;

const WINDOW_TITLE: &str = "Video Effects Suite";

fn main() -> Result<()> {
    let config = AppConfig::load();
    let _log_guard = logging::init("vfx-controller", &config.log_level);

    tracing::info!("=== {} v{} ===", WINDOW_TITLE, env!("CARGO_PKG_VERSION"));
    if let Some(dir) = logging::log_dir() {
        tracing::debug!("[Main] Logs in {}", dir.display());
    }

    let sender = OscSender::connect(&config.osc)
        .with_context(|| format!("opening OSC socket for {}", config.osc))?;
    let endpoint = sender.target().to_string();

    let panel = ControlPanel::new(Box::new(sender));
    let launcher = Launcher::new(config.renderer.clone());
    let app = LauncherApp::new(launcher, panel, endpoint);

    let viewport = egui::ViewportBuilder::default()
        .with_title(WINDOW_TITLE)
        .with_inner_size([1200.0, 900.0])
        .with_min_inner_size([1000.0, 800.0])
        .with_resizable(true);

    let options = eframe::NativeOptions {
        viewport,
        centered: true,
        ..Default::default()
    };

    tracing::info!("[Main] Starting GUI...");

    // Blocks until the window closes; dropping the app stops any running renderer
    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |cc| {
            gui::theme::apply(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("GUI failed: {}", e))?;

    tracing::info!("[Main] ✓ Shutdown complete");
    Ok(())
}
