use std::path::{Path, PathBuf};

use rosc::OscType;
use thiserror::Error;

use crate::osc::MessageSink;
use crate::params::{
    self, ParamKind, ParamValue, PARAMS, SOURCE_ADDRESS, SOURCE_CAMERA, SOURCE_VIDEO,
    VIDEO_PATH_ADDRESS,
};

#[derive(Error, Debug, PartialEq)]
pub enum PanelError {
    #[error("Unknown parameter address: {0}")]
    UnknownParam(String),
    #[error("'{name}' is not an option of {address}")]
    UnknownOption { address: String, name: String },
    #[error("{address} does not accept this kind of value")]
    WrongKind { address: String },
}

/// What the renderer is reading frames from
#[derive(Clone, Debug, PartialEq)]
pub enum VideoSource {
    Camera,
    Video(PathBuf),
}

/// Session state of the control panel.
///
/// Holds one value per row of the parameter table, reset to defaults on
/// construction and never persisted. Every setter stores the new value and
/// then sends exactly one message; delivery failures are logged and dropped.
pub struct ControlPanel {
    sink: Box<dyn MessageSink>,
    values: Vec<ParamValue>,
    source: VideoSource,
}

impl ControlPanel {
    pub fn new(sink: Box<dyn MessageSink>) -> Self {
        Self {
            sink,
            values: PARAMS.iter().map(|p| p.default_value()).collect(),
            source: VideoSource::Camera,
        }
    }

    pub fn value(&self, address: &str) -> Option<&ParamValue> {
        params::find(address).map(|(i, _)| &self.values[i])
    }

    pub fn value_at(&self, index: usize) -> &ParamValue {
        &self.values[index]
    }

    pub fn source(&self) -> &VideoSource {
        &self.source
    }

    // =======================================================================================
    // CHANGE HANDLERS
    // =======================================================================================

    /// Slider moved: coerce to the parameter's numeric type and send
    pub fn set_numeric(&mut self, address: &str, raw: f64) -> Result<(), PanelError> {
        let (index, spec) = lookup(address)?;
        let value = spec.from_raw(raw).ok_or_else(|| PanelError::WrongKind {
            address: address.to_string(),
        })?;
        self.store_and_send(index, address, value);
        Ok(())
    }

    /// Combo box changed: send the option's index, not its name
    pub fn select(&mut self, address: &str, name: &str) -> Result<(), PanelError> {
        let (index, spec) = lookup(address)?;
        if !matches!(spec.kind, ParamKind::Choice { .. }) {
            return Err(PanelError::WrongKind { address: address.to_string() });
        }
        let option = spec.option_index(name).ok_or_else(|| PanelError::UnknownOption {
            address: address.to_string(),
            name: name.to_string(),
        })?;
        self.store_and_send(index, address, ParamValue::Choice(option));
        Ok(())
    }

    /// Checkbox toggled: sent as 0/1
    pub fn set_toggle(&mut self, address: &str, on: bool) -> Result<(), PanelError> {
        let (index, spec) = lookup(address)?;
        if !matches!(spec.kind, ParamKind::Toggle { .. }) {
            return Err(PanelError::WrongKind { address: address.to_string() });
        }
        self.store_and_send(index, address, ParamValue::Bool(on));
        Ok(())
    }

    /// Text edited: the whole content goes out on every edit, empty included
    pub fn set_text(&mut self, address: &str, text: &str) -> Result<(), PanelError> {
        let (index, spec) = lookup(address)?;
        if !matches!(spec.kind, ParamKind::Text { .. }) {
            return Err(PanelError::WrongKind { address: address.to_string() });
        }
        self.store_and_send(index, address, ParamValue::Text(text.to_string()));
        Ok(())
    }

    /// Result of the "Load Video" dialog. A cancelled dialog sends nothing.
    pub fn load_video(&mut self, picked: Option<PathBuf>) {
        let Some(path) = picked else {
            tracing::debug!("[Panel] Video selection cancelled");
            return;
        };
        tracing::info!("[Panel] Video source: {}", path.display());
        self.emit(SOURCE_ADDRESS, OscType::Int(SOURCE_VIDEO));
        self.emit(VIDEO_PATH_ADDRESS, OscType::String(path_string(&path)));
        self.source = VideoSource::Video(path);
    }

    pub fn use_camera(&mut self) {
        tracing::info!("[Panel] Camera source");
        self.source = VideoSource::Camera;
        self.emit(SOURCE_ADDRESS, OscType::Int(SOURCE_CAMERA));
    }

    fn store_and_send(&mut self, index: usize, address: &str, value: ParamValue) {
        let wire = value.to_osc();
        self.values[index] = value;
        self.emit(address, wire);
    }

    fn emit(&self, address: &str, value: OscType) {
        if let Err(e) = self.sink.send(address, value) {
            tracing::warn!("[Panel] Dropped {}: {}", address, e);
        }
    }
}

fn lookup(address: &str) -> Result<(usize, &'static params::ParamSpec), PanelError> {
    params::find(address).ok_or_else(|| PanelError::UnknownParam(address.to_string()))
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// ========== Tests ============

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::osc::OscSendError;
    use crate::params::{Section, BACKGROUND_STAGES, COLOR_MODES, EFFECTS, TEXT_COLORS};
    use std::sync::{Arc, Mutex};

    /// Records every message instead of sending it
    #[derive(Clone, Default)]
    pub(crate) struct RecordingSink {
        pub sent: Arc<Mutex<Vec<(String, OscType)>>>,
    }

    impl RecordingSink {
        pub fn take(&self) -> Vec<(String, OscType)> {
            std::mem::take(&mut *self.sent.lock().unwrap())
        }
    }

    impl MessageSink for RecordingSink {
        fn send(&self, address: &str, value: OscType) -> Result<(), OscSendError> {
            self.sent.lock().unwrap().push((address.to_string(), value));
            Ok(())
        }
    }

    struct FailingSink;

    impl MessageSink for FailingSink {
        fn send(&self, _address: &str, _value: OscType) -> Result<(), OscSendError> {
            Err(OscSendError::Io(std::io::Error::other("network down")))
        }
    }

    fn panel() -> (ControlPanel, RecordingSink) {
        let sink = RecordingSink::default();
        (ControlPanel::new(Box::new(sink.clone())), sink)
    }

    fn sent(address: &str, value: OscType) -> (String, OscType) {
        (address.to_string(), value)
    }

    #[test]
    fn test_defaults_on_launch() {
        let (panel, sink) = panel();
        assert_eq!(panel.value("/rotation"), Some(&ParamValue::Float(0.5)));
        assert_eq!(panel.value("/polygon_sides"), Some(&ParamValue::Int(4)));
        assert_eq!(panel.value("/mouse_control"), Some(&ParamValue::Bool(true)));
        assert_eq!(panel.value("/effect"), Some(&ParamValue::Choice(0)));
        assert_eq!(panel.value("/text"), Some(&ParamValue::Text(String::new())));
        assert_eq!(panel.source(), &VideoSource::Camera);
        // Construction sends nothing
        assert!(sink.take().is_empty());
    }

    #[test]
    fn test_slider_bounds_are_sent_exactly() {
        let (mut panel, sink) = panel();
        for spec in PARAMS {
            match spec.kind {
                ParamKind::Float { min, max, .. } => {
                    panel.set_numeric(spec.address, min as f64).unwrap();
                    panel.set_numeric(spec.address, max as f64).unwrap();
                    assert_eq!(
                        sink.take(),
                        vec![
                            sent(spec.address, OscType::Float(min)),
                            sent(spec.address, OscType::Float(max)),
                        ]
                    );
                }
                ParamKind::Int { min, max, .. } => {
                    panel.set_numeric(spec.address, min as f64).unwrap();
                    panel.set_numeric(spec.address, max as f64).unwrap();
                    assert_eq!(
                        sink.take(),
                        vec![
                            sent(spec.address, OscType::Int(min)),
                            sent(spec.address, OscType::Int(max)),
                        ]
                    );
                }
                _ => {}
            }
        }
    }

    #[test]
    fn test_selection_sends_display_index() {
        let (mut panel, sink) = panel();
        let tables = [
            ("/effect", EFFECTS),
            ("/colormode", COLOR_MODES),
            ("/background_stage", BACKGROUND_STAGES),
            ("/text_color", TEXT_COLORS),
        ];
        for (address, options) in tables {
            for (i, name) in options.iter().enumerate() {
                panel.select(address, name).unwrap();
                assert_eq!(sink.take(), vec![sent(address, OscType::Int(i as i32))]);
                assert_eq!(panel.value(address), Some(&ParamValue::Choice(i)));
            }
        }
    }

    #[test]
    fn test_unknown_option_sends_nothing() {
        let (mut panel, sink) = panel();
        let err = panel.select("/effect", "Plasma").unwrap_err();
        assert_eq!(
            err,
            PanelError::UnknownOption { address: "/effect".into(), name: "Plasma".into() }
        );
        assert!(sink.take().is_empty());
        assert_eq!(panel.value("/effect"), Some(&ParamValue::Choice(0)));
    }

    #[test]
    fn test_toggle_twice_returns_to_original() {
        let (mut panel, sink) = panel();
        panel.set_toggle("/ghost", true).unwrap();
        panel.set_toggle("/ghost", false).unwrap();
        assert_eq!(
            sink.take(),
            vec![sent("/ghost", OscType::Int(1)), sent("/ghost", OscType::Int(0))]
        );
        assert_eq!(panel.value("/ghost"), Some(&ParamValue::Bool(false)));
    }

    #[test]
    fn test_text_sent_on_every_edit() {
        let (mut panel, sink) = panel();
        let mut typed = String::new();
        for c in "HELLO".chars() {
            typed.push(c);
            panel.set_text("/text", &typed).unwrap();
        }
        panel.set_text("/text", "").unwrap();

        let msgs = sink.take();
        assert_eq!(msgs.len(), 6);
        assert_eq!(msgs[4], sent("/text", OscType::String("HELLO".into())));
        assert_eq!(msgs[5], sent("/text", OscType::String(String::new())));
    }

    #[test]
    fn test_end_to_end_examples() {
        let (mut panel, sink) = panel();
        panel.select("/effect", "Kaleidoscope").unwrap();
        panel.set_numeric("/base_hue", 180.0).unwrap();
        panel.set_toggle("/recording", true).unwrap();
        assert_eq!(
            sink.take(),
            vec![
                sent("/effect", OscType::Int(5)),
                sent("/base_hue", OscType::Float(180.0)),
                sent("/recording", OscType::Int(1)),
            ]
        );
    }

    #[test]
    fn test_load_video_sends_source_then_path() {
        let (mut panel, sink) = panel();
        panel.load_video(Some(PathBuf::from("/clips/intro.mp4")));
        assert_eq!(
            sink.take(),
            vec![
                sent(SOURCE_ADDRESS, OscType::Int(1)),
                sent(VIDEO_PATH_ADDRESS, OscType::String("/clips/intro.mp4".into())),
            ]
        );
        assert_eq!(panel.source(), &VideoSource::Video(PathBuf::from("/clips/intro.mp4")));
    }

    #[test]
    fn test_cancelled_dialog_sends_nothing() {
        let (mut panel, sink) = panel();
        panel.load_video(None);
        assert!(sink.take().is_empty());
        assert_eq!(panel.source(), &VideoSource::Camera);
    }

    #[test]
    fn test_use_camera_always_sends() {
        let (mut panel, sink) = panel();
        panel.use_camera();
        panel.use_camera();
        assert_eq!(
            sink.take(),
            vec![sent(SOURCE_ADDRESS, OscType::Int(0)), sent(SOURCE_ADDRESS, OscType::Int(0))]
        );
    }

    #[test]
    fn test_wrong_kind_and_unknown_address() {
        let (mut panel, sink) = panel();
        assert!(matches!(panel.set_numeric("/ghost", 1.0), Err(PanelError::WrongKind { .. })));
        assert!(matches!(panel.set_toggle("/zoom", true), Err(PanelError::WrongKind { .. })));
        assert!(matches!(panel.set_text("/effect", "x"), Err(PanelError::WrongKind { .. })));
        assert!(matches!(panel.select("/zoom", "Tunnel"), Err(PanelError::WrongKind { .. })));
        assert_eq!(
            panel.set_numeric("/warp", 1.0),
            Err(PanelError::UnknownParam("/warp".into()))
        );
        assert!(sink.take().is_empty());
    }

    #[test]
    fn test_send_failure_still_updates_state() {
        let mut panel = ControlPanel::new(Box::new(FailingSink));
        panel.set_numeric("/zoom", -250.0).unwrap();
        assert_eq!(panel.value("/zoom"), Some(&ParamValue::Float(-250.0)));
    }

    #[test]
    fn test_value_at_follows_table_order() {
        let (panel, _) = panel();
        let (index, spec) = params::in_section(Section::Motion).next().unwrap();
        assert_eq!(panel.value_at(index), &spec.default_value());
    }
}
