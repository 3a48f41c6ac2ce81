// src/gui/mod.rs
pub mod panel_view;
pub mod theme;

use eframe::egui::{self, RichText};

use crate::launcher::Launcher;
use crate::panel::ControlPanel;

// Launcher window: status, Start/Stop, and the control panel while the renderer runs
pub struct LauncherApp {
    /// Renderer process (at most one)
    launcher: Launcher,

    /// Parameter state + outbound messages
    panel: ControlPanel,

    /// Panel is only shown between a successful start and the next stop
    controller_visible: bool,

    /// Pending error dialog text
    error: Option<String>,

    /// Where messages go, for the status line
    endpoint: String,
}

impl LauncherApp {
    pub fn new(launcher: Launcher, panel: ControlPanel, endpoint: String) -> Self {
        Self {
            launcher,
            panel,
            controller_visible: false,
            error: None,
            endpoint,
        }
    }

    /// Start the renderer and reveal the panel. On failure the panel stays
    /// hidden and the error is queued for the dialog.
    pub fn start_all(&mut self) {
        match self.launcher.start() {
            Ok(pid) => {
                tracing::info!("[GUI] Renderer up (pid {}), showing controls", pid);
                self.controller_visible = true;
            }
            Err(e) => {
                tracing::error!("[GUI] ❌ {}", e);
                self.controller_visible = false;
                self.error = Some(e.to_string());
            }
        }
    }

    pub fn stop_all(&mut self) {
        self.launcher.stop();
        self.controller_visible = false;
    }

    /// Window is closing: a running renderer goes down with it
    pub fn on_close_requested(&mut self) {
        if self.launcher.is_running() {
            tracing::info!("[GUI] Window closing, stopping renderer");
            self.stop_all();
        }
    }

    pub fn controller_visible(&self) -> bool {
        self.controller_visible
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn show_error_dialog(&mut self, ctx: &egui::Context) {
        let Some(message) = self.error.clone() else {
            return;
        };
        let mut dismissed = false;

        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(RichText::new(message).color(theme::ERROR_TEXT));
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            });

        if dismissed {
            self.error = None;
        }
    }
}

impl eframe::App for LauncherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            self.on_close_requested();
        }

        let state = self.launcher.state();
        let status = match self.launcher.pid() {
            Some(pid) => format!("{} (pid {})", theme::status_text(state), pid),
            None => theme::status_text(state).to_string(),
        };
        let blocked = self.error().is_some();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                // === STATUS ===
                ui.group(|ui| {
                    ui.set_width(ui.available_width());
                    ui.label(RichText::new("Status").strong());
                    ui.label(RichText::new(status).color(theme::status_color(state)));
                    ui.label(RichText::new(format!("Sending to {}", self.endpoint)).weak());
                });

                // === START / STOP ===
                ui.add_space(theme::SECTION_SPACING);
                ui.horizontal(|ui| {
                    if ui.add_enabled(!self.launcher.is_running(), egui::Button::new("▶ Start")).clicked() {
                        self.start_all();
                    }
                    if ui.add_enabled(self.launcher.is_running(), egui::Button::new("⏹ Stop")).clicked() {
                        self.stop_all();
                    }
                });
                ui.add_space(theme::SECTION_SPACING);

                // === EFFECTS CONTROLLER ===
                if self.controller_visible() {
                    ui.label(RichText::new("Effects Controller").strong().size(16.0));
                    ui.separator();
                    egui::ScrollArea::vertical()
                        .auto_shrink([false, false])
                        .show(ui, |ui| panel_view::show(ui, &mut self.panel));
                }
            });
        });

        self.show_error_dialog(ctx);
    }
}
