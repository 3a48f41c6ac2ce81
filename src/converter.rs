//! Frame-sequence to MP4 conversion.
//!
//! Recording in the renderer drops numbered PNGs (`frame-000001.png`, ...)
//! into `output/` or `frames/`. This module finds the freshest sequence and
//! hands it to ffmpeg. Encoding itself is ffmpeg's job; we only build the
//! command line and collect size statistics.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::SystemTime;

use serde::Serialize;
use thiserror::Error;

/// Folders the renderer records into, checked in this order
pub const FRAME_DIRS: [&str; 2] = ["output", "frames"];
/// ffmpeg image2 pattern matching the renderer's six-digit numbering
pub const FRAME_PATTERN: &str = "frame-%06d.png";
pub const DEFAULT_OUTPUT: &str = "output.mp4";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("No frame sequences found")]
    NoFrames,
    #[error("FFmpeg binary not found. Please install FFmpeg and make sure it is on PATH")]
    EncoderNotFound,
    #[error("FFmpeg error:\nstdout: {stdout}\nstderr: {stderr}")]
    Encoder { stdout: String, stderr: String },
    #[error("Not a numbered frame pattern: {0}")]
    Pattern(String),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// A discovered run of numbered frames
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSequence {
    pub directory: PathBuf,
    /// `<directory>/frame-%06d.png`
    pub pattern: PathBuf,
    /// Matching files, sorted by name
    pub frames: Vec<PathBuf>,
}

impl FrameSequence {
    pub fn count(&self) -> usize {
        self.frames.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvertOptions {
    pub framerate: u32,
    pub delete_frames: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            framerate: 30,
            delete_frames: false,
        }
    }
}

/// Outcome of a successful conversion
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConversionReport {
    pub output_file: PathBuf,
    pub frame_count: usize,
    pub frames_size_mb: f64,
    pub video_size_mb: f64,
    /// frames_size_mb / video_size_mb, or 0 for an empty video
    pub compression_ratio: f64,
    pub frames_deleted: bool,
}

// =======================================================================================
// DISCOVERY
// =======================================================================================

/// File name template with one `%d` / `%0Nd` number field, e.g. `frame-%06d.png`.
/// Matches `<prefix><digits><suffix>`, any number of digits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramePattern {
    prefix: String,
    suffix: String,
}

impl FramePattern {
    pub fn parse(template: &str) -> Option<Self> {
        let start = template.find('%')?;
        let rest = &template[start + 1..];
        let width = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
        let suffix = rest[width..].strip_prefix('d')?;
        if suffix.contains('%') {
            return None;
        }
        Some(Self {
            prefix: template[..start].to_string(),
            suffix: suffix.to_string(),
        })
    }

    /// Pattern for the file-name part of `pattern`
    pub fn from_path(pattern: &Path) -> Result<Self, ConvertError> {
        pattern
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(Self::parse)
            .ok_or_else(|| ConvertError::Pattern(pattern.display().to_string()))
    }

    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let Some(number) = name
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_suffix(self.suffix.as_str()))
        else {
            return false;
        };
        !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit())
    }
}

impl Default for FramePattern {
    /// The renderer's `frame-%06d.png`
    fn default() -> Self {
        Self {
            prefix: "frame-".to_string(),
            suffix: ".png".to_string(),
        }
    }
}

/// Files directly inside `dir` matching `pattern`, sorted by name.
/// A missing folder is empty.
pub fn list_frames(dir: &Path, pattern: &FramePattern) -> std::io::Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut frames = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && pattern.matches(&path) {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}

/// Candidate folders under `root`
pub fn default_dirs(root: &Path) -> Vec<PathBuf> {
    FRAME_DIRS.iter().map(|d| root.join(d)).collect()
}

/// Pick the folder whose last frame was modified most recently.
/// On a tie the earlier folder wins. `None` when no folder has frames.
pub fn find_latest_frame_sequence(dirs: &[PathBuf]) -> Option<FrameSequence> {
    let pattern = FramePattern::default();
    let mut latest: Option<(SystemTime, FrameSequence)> = None;

    for dir in dirs {
        let frames = match list_frames(dir, &pattern) {
            Ok(frames) => frames,
            Err(e) => {
                tracing::warn!("[Convert] Skipping {}: {}", dir.display(), e);
                continue;
            }
        };
        let Some(last) = frames.last() else {
            continue;
        };
        let mtime = match fs::metadata(last).and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("[Convert] Cannot read mtime of {}: {}", last.display(), e);
                continue;
            }
        };
        tracing::debug!("[Convert] {}: {} frames", dir.display(), frames.len());

        if latest.as_ref().map_or(true, |(best, _)| mtime > *best) {
            latest = Some((
                mtime,
                FrameSequence {
                    directory: dir.clone(),
                    pattern: dir.join(FRAME_PATTERN),
                    frames,
                },
            ));
        }
    }

    latest.map(|(_, seq)| seq)
}

// =======================================================================================
// ENCODER
// =======================================================================================

/// Turns a numbered-frame pattern into a video file
pub trait Encoder {
    fn encode(&self, pattern: &Path, output: &Path, framerate: u32) -> Result<(), ConvertError>;
}

/// Shells out to the ffmpeg binary. The binary is looked up on each encode,
/// so a missing ffmpeg only matters once there is something to encode.
pub struct FfmpegEncoder;

impl FfmpegEncoder {
    /// PATH first, then the usual install folders
    fn find_ffmpeg() -> Option<PathBuf> {
        if let Ok(path) = which::which("ffmpeg") {
            return Some(path);
        }

        let common_paths: &[&str] = if cfg!(target_os = "macos") {
            &["/usr/local/bin/ffmpeg", "/opt/homebrew/bin/ffmpeg", "/opt/local/bin/ffmpeg"]
        } else if cfg!(target_os = "windows") {
            &["C:\\ffmpeg\\bin\\ffmpeg.exe", "C:\\Program Files\\ffmpeg\\bin\\ffmpeg.exe"]
        } else {
            &["/usr/bin/ffmpeg", "/usr/local/bin/ffmpeg"]
        };

        common_paths.iter().map(PathBuf::from).find(|p| p.exists())
    }

    /// H.264 / yuv420p / CRF 23, overwriting the output
    pub fn build_args(pattern: &Path, output: &Path, framerate: u32) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-framerate".to_string(),
            framerate.to_string(),
            "-pattern_type".to_string(),
            "sequence".to_string(),
            "-i".to_string(),
            pattern.to_string_lossy().into_owned(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-preset".to_string(),
            "medium".to_string(),
            "-crf".to_string(),
            "23".to_string(),
            output.to_string_lossy().into_owned(),
        ]
    }
}

impl Encoder for FfmpegEncoder {
    fn encode(&self, pattern: &Path, output: &Path, framerate: u32) -> Result<(), ConvertError> {
        let ffmpeg_path = Self::find_ffmpeg().ok_or(ConvertError::EncoderNotFound)?;
        let args = Self::build_args(pattern, output, framerate);
        tracing::debug!("[Convert] {} {}", ffmpeg_path.display(), args.join(" "));

        let result = Command::new(&ffmpeg_path).args(&args).output()?;
        if result.status.success() {
            Ok(())
        } else {
            Err(ConvertError::Encoder {
                stdout: String::from_utf8_lossy(&result.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
            })
        }
    }
}

// =======================================================================================
// CONVERTER
// =======================================================================================

pub struct FrameConverter {
    encoder: Box<dyn Encoder>,
}

impl FrameConverter {
    pub fn new(encoder: Box<dyn Encoder>) -> Self {
        Self { encoder }
    }

    /// Converter backed by the system ffmpeg
    pub fn with_ffmpeg() -> Self {
        Self::new(Box::new(FfmpegEncoder))
    }

    /// Encode the frames matching `pattern` into `output`.
    ///
    /// Frames are only deleted after the encoder succeeded. A failure halfway
    /// through deletion is reported as-is; already removed frames stay removed.
    pub fn convert(
        &self,
        pattern: &Path,
        output: &Path,
        options: ConvertOptions,
    ) -> Result<ConversionReport, ConvertError> {
        let frame_pattern = FramePattern::from_path(pattern)?;
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(
            "[Convert] Encoding {} -> {} @ {} fps",
            pattern.display(),
            output.display(),
            options.framerate
        );
        self.encoder.encode(pattern, output, options.framerate)?;

        let frames_dir = pattern
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let frames = list_frames(frames_dir, &frame_pattern)?;

        let mut frames_bytes = 0u64;
        for frame in &frames {
            frames_bytes += fs::metadata(frame)?.len();
        }
        let frames_size_mb = frames_bytes as f64 / BYTES_PER_MB;
        let video_size_mb = fs::metadata(output)?.len() as f64 / BYTES_PER_MB;

        if options.delete_frames {
            for frame in &frames {
                fs::remove_file(frame)?;
            }
            tracing::info!("[Convert] Deleted {} frames", frames.len());
        }

        let report = ConversionReport {
            output_file: output.to_path_buf(),
            frame_count: frames.len(),
            frames_size_mb,
            video_size_mb,
            compression_ratio: compression_ratio(frames_size_mb, video_size_mb),
            frames_deleted: options.delete_frames,
        };
        tracing::info!(
            "[Convert] ✓ {} frames, {:.2} MB -> {:.2} MB",
            report.frame_count,
            report.frames_size_mb,
            report.video_size_mb
        );
        Ok(report)
    }

    /// Find the newest sequence under `root` and write `<dir>/output.mp4` next to it
    pub fn auto_convert(
        &self,
        root: &Path,
        options: ConvertOptions,
    ) -> Result<ConversionReport, ConvertError> {
        let sequence =
            find_latest_frame_sequence(&default_dirs(root)).ok_or(ConvertError::NoFrames)?;
        tracing::info!(
            "[Convert] Latest sequence: {} ({} frames)",
            sequence.directory.display(),
            sequence.count()
        );
        let output = sequence.directory.join(DEFAULT_OUTPUT);
        self.convert(&sequence.pattern, &output, options)
    }
}

pub fn compression_ratio(frames_size_mb: f64, video_size_mb: f64) -> f64 {
    if video_size_mb > 0.0 {
        frames_size_mb / video_size_mb
    } else {
        0.0
    }
}
