use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 3000;
pub const LANDING_PAGE: &str = "index.html";

/// Directories the server and the build jobs work from.
#[derive(Debug, Clone)]
pub struct Config {
    pub scripts_dir: PathBuf,
    pub public_dir: PathBuf,
}

impl Config {
    pub fn new(scripts_dir: impl AsRef<Path>, public_dir: impl AsRef<Path>) -> Self {
        Self {
            scripts_dir: resolve(scripts_dir.as_ref()),
            public_dir: resolve(public_dir.as_ref()),
        }
    }

    pub fn landing_page(&self) -> PathBuf {
        self.public_dir.join(LANDING_PAGE)
    }

    /// Plain join, the name is not sanitized.
    pub fn script_path(&self, name: &str) -> PathBuf {
        self.scripts_dir.join(name)
    }
}

/// Current directory, or the executable's directory when that is unavailable.
pub fn base_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

pub fn resolve(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir().join(path)
    }
}
