use std::path::PathBuf;
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the directory containing the executable.
pub fn exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the mask dump directory: `<exe_dir>/masks/`
pub fn masks_dir() -> PathBuf {
    exe_dir().join("masks")
}

/// Returns the diagnostic captures directory: `<exe_dir>/captures/`
pub fn captures_dir() -> PathBuf {
    exe_dir().join("captures")
}
