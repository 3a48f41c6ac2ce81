//! Parameter table for the control panel.
//!
//! Every widget in the panel, and the message it sends, comes from
//! one row of [`PARAMS`]. Adding a parameter means adding a row here;
//! the view and the send path pick it up without further code.

use rosc::OscType;

// =======================================================================================
// OPTION TABLES (index == value on the wire)
// =======================================================================================

pub const EFFECTS: &[&str] = &[
    "Tunnel",
    "Spherical",
    "Particle",
    "Vortex",
    "Cube",
    "Kaleidoscope",
    "Wave Grid",
    "Spiral Tower",
    "Polygon",
];

pub const COLOR_MODES: &[&str] = &[
    "Rainbow",
    "Monochromatic",
    "Complementary",
    "Analogous",
    "Custom",
];

pub const BACKGROUND_STAGES: &[&str] = &[
    "Black",
    "Gradient",
    "Starfield",
    "Grid",
    "Camera Feed",
];

pub const TEXT_COLORS: &[&str] = &["White", "Red", "Green", "Blue"];

// === Fixed action addresses (not part of the table) ===
pub const SOURCE_ADDRESS: &str = "/source";
pub const VIDEO_PATH_ADDRESS: &str = "/video_path";
pub const SOURCE_CAMERA: i32 = 0;
pub const SOURCE_VIDEO: i32 = 1;

/// Extensions offered by the "Load Video" dialog
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv"];

/// Panel sections, in display order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Source,
    Effect,
    Color,
    Motion,
    Options,
    Text,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Source,
        Section::Effect,
        Section::Color,
        Section::Motion,
        Section::Options,
        Section::Text,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Source => "Source",
            Section::Effect => "Effect",
            Section::Color => "Color",
            Section::Motion => "Motion",
            Section::Options => "Options",
            Section::Text => "Text",
        }
    }
}

/// Widget type, range and default of a parameter
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamKind {
    Float { min: f32, max: f32, default: f32 },
    Int { min: i32, max: i32, default: i32 },
    Toggle { default: bool },
    Choice { options: &'static [&'static str], default: usize },
    /// Free text; `rows` is the height of the edit box
    Text { rows: usize },
}

#[derive(Clone, Copy, Debug)]
pub struct ParamSpec {
    pub label: &'static str,
    pub address: &'static str,
    pub section: Section,
    pub kind: ParamKind,
}

/// Current value of one parameter, as held by the panel
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Choice(usize),
    Text(String),
}

impl ParamValue {
    /// Wire form: booleans and choices travel as integers.
    pub fn to_osc(&self) -> OscType {
        match self {
            ParamValue::Float(v) => OscType::Float(*v),
            ParamValue::Int(v) => OscType::Int(*v),
            ParamValue::Bool(b) => OscType::Int(i32::from(*b)),
            ParamValue::Choice(i) => OscType::Int(*i as i32),
            ParamValue::Text(s) => OscType::String(s.clone()),
        }
    }
}

impl ParamSpec {
    pub fn default_value(&self) -> ParamValue {
        match self.kind {
            ParamKind::Float { default, .. } => ParamValue::Float(default),
            ParamKind::Int { default, .. } => ParamValue::Int(default),
            ParamKind::Toggle { default } => ParamValue::Bool(default),
            ParamKind::Choice { default, .. } => ParamValue::Choice(default),
            ParamKind::Text { .. } => ParamValue::Text(String::new()),
        }
    }

    /// Convert a raw slider value into this parameter's numeric type.
    /// Integers truncate toward zero. Nothing is clamped.
    pub fn from_raw(&self, raw: f64) -> Option<ParamValue> {
        match self.kind {
            ParamKind::Float { .. } => Some(ParamValue::Float(raw as f32)),
            ParamKind::Int { .. } => Some(ParamValue::Int(raw.trunc() as i32)),
            _ => None,
        }
    }

    /// Position of `name` in this parameter's option list
    pub fn option_index(&self, name: &str) -> Option<usize> {
        match self.kind {
            ParamKind::Choice { options, .. } => options.iter().position(|o| *o == name),
            _ => None,
        }
    }

    pub fn options(&self) -> &'static [&'static str] {
        match self.kind {
            ParamKind::Choice { options, .. } => options,
            _ => &[],
        }
    }
}

const fn float(
    label: &'static str,
    address: &'static str,
    section: Section,
    min: f32,
    max: f32,
    default: f32,
) -> ParamSpec {
    ParamSpec { label, address, section, kind: ParamKind::Float { min, max, default } }
}

const fn toggle(label: &'static str, address: &'static str, default: bool) -> ParamSpec {
    ParamSpec { label, address, section: Section::Options, kind: ParamKind::Toggle { default } }
}

const fn choice(
    label: &'static str,
    address: &'static str,
    section: Section,
    options: &'static [&'static str],
) -> ParamSpec {
    ParamSpec { label, address, section, kind: ParamKind::Choice { options, default: 0 } }
}

pub const PARAMS: &[ParamSpec] = &[
    // Effect
    choice("Effect", "/effect", Section::Effect, EFFECTS),
    ParamSpec {
        label: "Polygon Sides",
        address: "/polygon_sides",
        section: Section::Effect,
        kind: ParamKind::Int { min: 3, max: 12, default: 4 },
    },
    float("Effect Speed", "/effect_speed", Section::Effect, 0.1, 3.0, 1.0),
    // Color
    choice("Color Mode", "/colormode", Section::Color, COLOR_MODES),
    float("Base Hue", "/base_hue", Section::Color, 0.0, 360.0, 0.0),
    float("Brightness", "/brightness", Section::Color, 0.0, 2.0, 1.0),
    float("Saturation", "/saturation", Section::Color, 0.0, 2.0, 1.0),
    float("RGB Shift", "/rgbshift", Section::Color, 0.0, 1.0, 0.0),
    float("Noise", "/noise", Section::Color, 0.0, 1.0, 0.0),
    // Motion
    float("Rotation", "/rotation", Section::Motion, 0.0, 3.0, 0.5),
    float("Zoom", "/zoom", Section::Motion, -500.0, 500.0, 0.0),
    float("Size", "/size", Section::Motion, 0.1, 3.0, 1.0),
    // Options
    toggle("Ghost Effect", "/ghost", false),
    toggle("Mouse Control", "/mouse_control", true),
    toggle("Show Background", "/background", true),
    choice("Background Stage", "/background_stage", Section::Options, BACKGROUND_STAGES),
    toggle("Recording", "/recording", false),
    // Text
    ParamSpec {
        label: "Text",
        address: "/text",
        section: Section::Text,
        kind: ParamKind::Text { rows: 3 },
    },
    float("Text Size", "/text_size", Section::Text, 12.0, 72.0, 32.0),
    choice("Text Color", "/text_color", Section::Text, TEXT_COLORS),
    float("Text Glitch", "/text_glitch", Section::Text, 0.0, 1.0, 0.0),
    float("Text RGB", "/text_rgb", Section::Text, 0.0, 1.0, 0.0),
];

/// Look up a parameter by its outbound address
pub fn find(address: &str) -> Option<(usize, &'static ParamSpec)> {
    PARAMS.iter().enumerate().find(|(_, p)| p.address == address)
}

/// Parameters belonging to one section, in table order
pub fn in_section(section: Section) -> impl Iterator<Item = (usize, &'static ParamSpec)> {
    PARAMS.iter().enumerate().filter(move |(_, p)| p.section == section)
}
