// Embeds product metadata into the Windows executable.
fn main() {
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("windows") {
        let mut res = winres::WindowsResource::new();
        res.set("ProductName", "VideoEffectsController");
        res.set("FileDescription", "Video Effects Controller");
        res.set("LegalCopyright", "VideoEffects-Dev");
        if std::path::Path::new("assets/icon.ico").exists() {
            res.set_icon("assets/icon.ico");
        }
        if let Err(e) = res.compile() {
            println!("cargo:warning=winres failed: {}", e);
        }
    }
}
