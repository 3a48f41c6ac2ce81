//! Renderer process management.
//! Finds the Processing executable, starts the VideoEffects sketch and stops it again.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the sketch file inside the sketch folder
pub const SKETCH_FILE: &str = "VideoEffects.pde";

/// How to find and start the renderer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Explicit executable; replaces the per-OS candidate list when set
    pub path: Option<PathBuf>,

    /// Folder holding VideoEffects.pde
    pub sketch_dir: PathBuf,

    /// Replaces the per-OS argument list when set
    pub args: Option<Vec<String>>,

    /// Time the renderer gets to open its OSC port before the panel appears
    pub startup_delay_ms: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            path: None,
            sketch_dir: PathBuf::from("VideoEffects"),
            args: None,
            startup_delay_ms: 2000,
        }
    }
}

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Renderer is already running")]
    AlreadyRunning,
    #[error("Processing not found. Please install Processing and try again. (searched: {})", display_paths(.searched))]
    RendererNotFound { searched: Vec<PathBuf> },
    #[error("Failed to start Processing sketch: {0}")]
    Spawn(#[from] std::io::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LauncherState {
    Stopped,
    Running,
}

// =======================================================================================
// CANDIDATE PATHS & ARGUMENTS (per OS)
// =======================================================================================

fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

/// Where Processing usually lives on this OS
pub fn default_candidates() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if cfg!(target_os = "macos") {
        paths.push(PathBuf::from("/Applications/Processing.app/Contents/MacOS/Processing"));
        if let Some(home) = home_dir() {
            paths.push(home.join("Applications/Processing.app/Contents/MacOS/Processing"));
        }
    } else if cfg!(target_os = "windows") {
        paths.push(PathBuf::from("C:\\Program Files\\Processing\\processing-java.exe"));
        paths.push(PathBuf::from("C:\\Program Files (x86)\\Processing\\processing-java.exe"));
    } else {
        paths.push(PathBuf::from("/usr/local/bin/processing-java"));
        paths.push(PathBuf::from("/opt/processing/processing-java"));
        if let Some(home) = home_dir() {
            paths.push(home.join("processing/processing-java"));
        }
        if let Ok(found) = which::which("processing-java") {
            paths.push(found);
        }
    }

    paths
}

/// First candidate that exists on disk
pub fn find_renderer(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|p| p.exists()).cloned()
}

/// Command line for the sketch. Processing 4 on macOS takes the .pde path,
/// processing-java elsewhere wants the folder plus --run.
pub fn default_args(sketch_dir: &Path) -> Vec<OsString> {
    if cfg!(target_os = "macos") {
        vec![sketch_dir.join(SKETCH_FILE).into_os_string()]
    } else {
        let mut sketch = OsString::from("--sketch=");
        sketch.push(sketch_dir.as_os_str());
        vec![OsString::from("--force"), sketch, OsString::from("--run")]
    }
}

// =======================================================================================
// LAUNCHER
// =======================================================================================

/// Owns at most one renderer process
pub struct Launcher {
    config: RendererConfig,
    process: Option<Child>,
}

impl Launcher {
    pub fn new(config: RendererConfig) -> Self {
        Self { config, process: None }
    }

    pub fn state(&self) -> LauncherState {
        if self.process.is_some() {
            LauncherState::Running
        } else {
            LauncherState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == LauncherState::Running
    }

    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().map(|c| c.id())
    }

    fn candidates(&self) -> Vec<PathBuf> {
        match &self.config.path {
            Some(path) => vec![path.clone()],
            None => default_candidates(),
        }
    }

    /// Locate the renderer without starting it
    pub fn locate(&self) -> Result<PathBuf, LauncherError> {
        let searched = self.candidates();
        find_renderer(&searched).ok_or(LauncherError::RendererNotFound { searched })
    }

    fn args(&self) -> Vec<OsString> {
        match &self.config.args {
            Some(args) => args.iter().map(OsString::from).collect(),
            None => default_args(&absolute(&self.config.sketch_dir)),
        }
    }

    /// STOPPED -> RUNNING. Blocks for the configured startup delay.
    pub fn start(&mut self) -> Result<u32, LauncherError> {
        if self.is_running() {
            return Err(LauncherError::AlreadyRunning);
        }

        let renderer = self.locate()?;
        let args = self.args();

        tracing::info!("[Launcher] Renderer: {}", renderer.display());
        tracing::info!("[Launcher] Sketch dir: {}", self.config.sketch_dir.display());
        tracing::debug!("[Launcher] Command: {} {:?}", renderer.display(), args);

        let child = Command::new(&renderer).args(&args).spawn()?;
        let pid = child.id();
        self.process = Some(child);
        tracing::info!("[Launcher] ✓ Renderer started (pid {})", pid);

        // Give the sketch time to open its OSC port
        if self.config.startup_delay_ms > 0 {
            thread::sleep(Duration::from_millis(self.config.startup_delay_ms));
        }

        Ok(pid)
    }

    /// RUNNING -> STOPPED. No-op when already stopped.
    pub fn stop(&mut self) {
        let Some(mut child) = self.process.take() else {
            return;
        };
        let pid = child.id();
        tracing::info!("[Launcher] Stopping renderer (pid {})", pid);

        if let Err(e) = terminate(&mut child) {
            tracing::warn!("[Launcher] Failed to signal renderer: {}", e);
        }

        // Reap it now if it already went away, otherwise off the UI thread
        match child.try_wait() {
            Ok(Some(status)) => tracing::debug!("[Launcher] Renderer exited ({})", status),
            Ok(None) => reap_in_background(child),
            Err(e) => tracing::warn!("[Launcher] Could not query renderer: {}", e),
        }
    }
}

impl Drop for Launcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn reap_in_background(mut child: Child) {
    let pid = child.id();
    tracing::debug!("[Launcher] Renderer still shutting down (pid {})", pid);

    let spawned = thread::Builder::new()
        .name("renderer-reaper".to_string())
        .spawn(move || match child.wait() {
            Ok(status) => tracing::debug!("[Launcher] Renderer {} exited ({})", pid, status),
            Err(e) => tracing::warn!("[Launcher] Waiting for renderer {} failed: {}", pid, e),
        });
    if let Err(e) = spawned {
        tracing::warn!("[Launcher] Could not start reaper for pid {}: {}", pid, e);
    }
}

#[cfg(unix)]
fn terminate(child: &mut Child) -> std::io::Result<()> {
    let pid = child.id() as libc::pid_t;
    // SAFETY: plain kill(2) on a pid we spawned and have not reaped yet
    let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) -> std::io::Result<()> {
    child.kill()
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

// ========== Tests ============

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Poll until `pid` no longer exists (signalled and reaped), up to 5 s
    #[cfg(unix)]
    pub(crate) fn wait_until_gone(pid: u32) -> bool {
        for _ in 0..100 {
            // SAFETY: signal 0 only checks that the pid exists
            if unsafe { libc::kill(pid as libc::pid_t, 0) } != 0 {
                return true;
            }
            thread::sleep(Duration::from_millis(50));
        }
        false
    }

    /// Launcher running `/bin/sleep 30` as a stand-in renderer
    #[cfg(unix)]
    pub(crate) fn sleep_renderer() -> RendererConfig {
        RendererConfig {
            path: Some(PathBuf::from("/bin/sleep")),
            args: Some(vec!["30".to_string()]),
            startup_delay_ms: 0,
            ..Default::default()
        }
    }

    fn missing_renderer() -> RendererConfig {
        RendererConfig {
            path: Some(PathBuf::from("/definitely/not/here/processing-java")),
            startup_delay_ms: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_find_renderer_picks_first_existing() {
        let dir = tempfile::tempdir().unwrap();
        let second = dir.path().join("second");
        let third = dir.path().join("third");
        std::fs::write(&second, b"").unwrap();
        std::fs::write(&third, b"").unwrap();

        let candidates = vec![dir.path().join("first"), second.clone(), third];
        assert_eq!(find_renderer(&candidates), Some(second));
        assert_eq!(find_renderer(&[dir.path().join("nope")]), None);
    }

    #[test]
    fn test_missing_renderer_stays_stopped() {
        let mut launcher = Launcher::new(missing_renderer());
        match launcher.start() {
            Err(LauncherError::RendererNotFound { searched }) => {
                assert_eq!(searched, vec![PathBuf::from("/definitely/not/here/processing-java")]);
            }
            other => panic!("expected RendererNotFound, got {:?}", other),
        }
        assert_eq!(launcher.state(), LauncherState::Stopped);
        assert_eq!(launcher.pid(), None);
    }

    #[test]
    fn test_stop_when_stopped_is_noop() {
        let mut launcher = Launcher::new(missing_renderer());
        launcher.stop();
        assert_eq!(launcher.state(), LauncherState::Stopped);
    }

    #[test]
    fn test_default_args_shape() {
        let args = default_args(Path::new("/work/VideoEffects"));
        if cfg!(target_os = "macos") {
            assert_eq!(args, vec![OsString::from("/work/VideoEffects/VideoEffects.pde")]);
        } else {
            assert_eq!(args.len(), 3);
            assert_eq!(args[0], OsString::from("--force"));
            assert!(args[1].to_string_lossy().starts_with("--sketch="));
            assert!(args[1].to_string_lossy().ends_with("VideoEffects"));
            assert_eq!(args[2], OsString::from("--run"));
        }
    }

    #[test]
    fn test_error_message_mentions_processing() {
        let err = LauncherError::RendererNotFound { searched: vec![PathBuf::from("/a"), PathBuf::from("/b")] };
        let text = err.to_string();
        assert!(text.starts_with("Processing not found"));
        assert!(text.contains("/a, /b"));
    }

    #[cfg(unix)]
    #[test]
    fn test_start_stop_cycle() {
        let mut launcher = Launcher::new(sleep_renderer());
        if launcher.locate().is_err() {
            println!("Note: /bin/sleep not available, skipping");
            return;
        }

        let pid = launcher.start().unwrap();
        assert!(pid > 0);
        assert_eq!(launcher.state(), LauncherState::Running);
        assert_eq!(launcher.pid(), Some(pid));

        // Second start is refused and leaves the first process alone
        assert!(matches!(launcher.start(), Err(LauncherError::AlreadyRunning)));
        assert_eq!(launcher.pid(), Some(pid));

        launcher.stop();
        assert_eq!(launcher.state(), LauncherState::Stopped);
        assert_eq!(launcher.pid(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_stopped_renderer_is_reaped() {
        let mut launcher = Launcher::new(sleep_renderer());
        if launcher.locate().is_err() {
            println!("Note: /bin/sleep not available, skipping");
            return;
        }

        for _ in 0..3 {
            let pid = launcher.start().unwrap();
            launcher.stop();
            assert!(wait_until_gone(pid), "pid {} left behind after stop", pid);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_drop_stops_running_renderer() {
        let mut launcher = Launcher::new(sleep_renderer());
        if launcher.locate().is_err() {
            println!("Note: /bin/sleep not available, skipping");
            return;
        }

        let pid = launcher.start().unwrap();
        drop(launcher);
        assert!(wait_until_gone(pid), "pid {} still alive after drop", pid);
    }
}
