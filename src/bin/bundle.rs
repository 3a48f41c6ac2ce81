// Release packaging: builds the controller, assembles a per-OS folder under
// dist/ (executable, README, sketch) and zips it next to the folder.
// Run from the repository root: `cargo run --bin bundle`
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const APP_NAME: &str = "VideoEffectsController";
const BIN_NAME: &str = "vfx-controller";
const SKETCH_DIR: &str = "VideoEffects";
const README: &str = "README.md";

// ===== PATHS =====

struct Layout {
    root: PathBuf,
    dist: PathBuf,
    bundle: PathBuf,
    archive: PathBuf,
}

impl Layout {
    fn new(root: PathBuf) -> Self {
        let name = format!("{}-{}", APP_NAME, std::env::consts::OS);
        let dist = root.join("dist");
        Self {
            bundle: dist.join(&name),
            archive: dist.join(format!("{}.zip", name)),
            dist,
            root,
        }
    }

    fn built_exe(&self) -> PathBuf {
        self.root
            .join("target")
            .join("release")
            .join(format!("{}{}", BIN_NAME, std::env::consts::EXE_SUFFIX))
    }

    fn bundled_exe(&self) -> PathBuf {
        self.bundle
            .join(format!("{}{}", APP_NAME, std::env::consts::EXE_SUFFIX))
    }
}

// ===== STEPS =====

fn prepare(layout: &Layout) -> Result<()> {
    if layout.dist.exists() {
        println!("Cleaning {}", layout.dist.display());
        fs::remove_dir_all(&layout.dist)
            .with_context(|| format!("removing {}", layout.dist.display()))?;
    }

    let sketch = layout.root.join(SKETCH_DIR);
    if !sketch.exists() {
        println!("Creating missing {} folder", SKETCH_DIR);
        fs::create_dir_all(&sketch)?;
    }

    if !layout.root.join(README).is_file() {
        bail!("{} not found in {}", README, layout.root.display());
    }
    Ok(())
}

fn build_release(layout: &Layout) -> Result<()> {
    let cargo = std::env::var_os("CARGO").unwrap_or_else(|| "cargo".into());
    println!("Building {} (release)...", BIN_NAME);

    let status = Command::new(cargo)
        .current_dir(&layout.root)
        .args(["build", "--release", "--bin", BIN_NAME])
        .status()
        .context("running cargo")?;
    if !status.success() {
        bail!("cargo build failed ({})", status);
    }
    Ok(())
}

fn assemble(layout: &Layout) -> Result<()> {
    fs::create_dir_all(&layout.bundle)?;

    let exe = layout.built_exe();
    let target = layout.bundled_exe();
    fs::copy(&exe, &target).with_context(|| format!("copying {}", exe.display()))?;
    make_executable(&target)?;

    fs::copy(layout.root.join(README), layout.bundle.join(README))?;
    copy_dir(&layout.root.join(SKETCH_DIR), &layout.bundle.join(SKETCH_DIR))?;
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

fn copy_dir(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &dest)?;
        } else {
            fs::copy(entry.path(), dest)?;
        }
    }
    Ok(())
}

// ===== ARCHIVE =====

/// Zip `dir` so that the archive unpacks to a single `<dir name>/` folder
fn zip_dir(dir: &Path, archive: &Path) -> Result<usize> {
    let base = dir.parent().unwrap_or(dir);
    let mut zip = ZipWriter::new(File::create(archive)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut count = 0;
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        zip.add_directory(entry_name(base, &current)?, options)?;

        let mut entries = fs::read_dir(&current)?
            .map(|e| e.map(|e| e.path()))
            .collect::<io::Result<Vec<_>>>()?;
        entries.sort();

        for path in entries {
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            let file_options = if path.file_stem().map_or(false, |s| s == APP_NAME) {
                options.unix_permissions(0o755)
            } else {
                options
            };
            zip.start_file(entry_name(base, &path)?, file_options)?;
            zip.write_all(&fs::read(&path)?)?;
            count += 1;
        }
    }

    zip.finish()?;
    Ok(count)
}

/// Archive entry names always use forward slashes
fn entry_name(base: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(base)
        .with_context(|| format!("{} is outside {}", path.display(), base.display()))?;
    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

fn run() -> Result<()> {
    let layout = Layout::new(std::env::current_dir()?);

    println!("========================================");
    println!(
        "   Bundling {} v{} for {}",
        APP_NAME,
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    );
    println!("========================================");

    prepare(&layout)?;
    build_release(&layout)?;
    assemble(&layout)?;
    let files = zip_dir(&layout.bundle, &layout.archive)?;

    println!("----------------------------------------");
    println!("Bundle:  {}", layout.bundle.display());
    println!("Archive: {} ({} files)", layout.archive.display(), files);
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error during build: {:#}", e);
        std::process::exit(1);
    }
}
