use eframe::egui::{self, RichText, Ui};

use crate::gui::theme;
use crate::panel::{ControlPanel, PanelError, VideoSource};
use crate::params::{self, ParamKind, ParamSpec, ParamValue, Section, VIDEO_EXTENSIONS};

// =======================================================================================
// CONTROL PANEL VIEW
// =======================================================================================
// Widgets are generated from the parameter table. Each widget edits a copy of
// the current value; a change goes through the panel, which stores and sends it.

pub fn show(ui: &mut Ui, panel: &mut ControlPanel) {
    for section in Section::ALL {
        ui.group(|ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(section.title()).strong().size(15.0));
            ui.add_space(4.0);

            if section == Section::Source {
                source_row(ui, panel);
            }

            egui::Grid::new(("param_grid", section.title()))
                .num_columns(2)
                .min_col_width(theme::LABEL_COLUMN_WIDTH)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    for (index, spec) in params::in_section(section) {
                        param_row(ui, panel, index, spec);
                    }
                });
        });
        ui.add_space(theme::SECTION_SPACING);
    }
}

fn source_row(ui: &mut Ui, panel: &mut ControlPanel) {
    ui.horizontal(|ui| {
        if ui.button("📂 Load Video").clicked() {
            let picked = rfd::FileDialog::new()
                .set_title("Select Video")
                .add_filter("Video files", VIDEO_EXTENSIONS)
                .pick_file();
            panel.load_video(picked);
        }
        if ui.button("📷 Use Camera").clicked() {
            panel.use_camera();
        }

        let current = match panel.source() {
            VideoSource::Camera => "Camera".to_string(),
            VideoSource::Video(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        };
        ui.label(RichText::new(current).weak());
    });
}

fn param_row(ui: &mut Ui, panel: &mut ControlPanel, index: usize, spec: &ParamSpec) {
    ui.label(spec.label);

    let result = match (spec.kind, panel.value_at(index).clone()) {
        (ParamKind::Float { min, max, .. }, ParamValue::Float(mut v)) => {
            let changed = ui.add(egui::Slider::new(&mut v, min..=max)).changed();
            changed.then(|| panel.set_numeric(spec.address, f64::from(v)))
        }
        (ParamKind::Int { min, max, .. }, ParamValue::Int(mut v)) => {
            let changed = ui.add(egui::Slider::new(&mut v, min..=max)).changed();
            changed.then(|| panel.set_numeric(spec.address, f64::from(v)))
        }
        (ParamKind::Toggle { .. }, ParamValue::Bool(mut on)) => {
            let changed = ui.checkbox(&mut on, "").changed();
            changed.then(|| panel.set_toggle(spec.address, on))
        }
        (ParamKind::Choice { options, .. }, ParamValue::Choice(mut selected)) => {
            let before = selected;
            egui::ComboBox::from_id_salt(spec.address)
                .width(200.0)
                .selected_text(options.get(selected).copied().unwrap_or(""))
                .show_ui(ui, |ui| {
                    for (i, name) in options.iter().enumerate() {
                        ui.selectable_value(&mut selected, i, *name);
                    }
                });
            (selected != before).then(|| panel.select(spec.address, options[selected]))
        }
        (ParamKind::Text { rows }, ParamValue::Text(mut text)) => {
            let edit = egui::TextEdit::multiline(&mut text)
                .desired_rows(rows)
                .desired_width(theme::SLIDER_WIDTH);
            let changed = ui.add(edit).changed();
            changed.then(|| panel.set_text(spec.address, &text))
        }
        _ => Some(Err(PanelError::WrongKind { address: spec.address.to_string() })),
    };

    ui.end_row();

    if let Some(Err(e)) = result {
        tracing::warn!("[GUI] {}", e);
    }
}
