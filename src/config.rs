use crate::apply::SignaturePolicy;
use crate::error::{FontSwapError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable overriding the backup root.
pub const BACKUP_DIR_ENV: &str = "FONTSWAP_BACKUP_DIR";

/// Runtime settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Use this bundle instead of searching for the application.
    pub app_path: Option<PathBuf>,
    pub backup_root: PathBuf,
    pub scale: f64,
    /// What to do with an existing code signature; `None` means ask.
    pub signature: Option<SignaturePolicy>,
    pub dry_run: bool,
}

impl Config {
    pub fn new(backup_root: impl Into<PathBuf>) -> Self {
        Config {
            app_path: None,
            backup_root: backup_root.into(),
            scale: 1.0,
            signature: None,
            dry_run: false,
        }
    }

    /// Settings with the backup root taken from the environment.
    pub fn from_env() -> Result<Self> {
        let root = default_backup_root(std::env::var_os(BACKUP_DIR_ENV), dirs::home_dir())?;
        Ok(Config::new(root))
    }
}

pub(crate) fn default_backup_root(
    from_env: Option<OsString>,
    home: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(dir) = from_env.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    home.map(|h| h.join(".fontswap").join("backups"))
        .ok_or_else(|| FontSwapError::Environment {
            msg: format!(
                "Cannot determine the home directory; set {} to choose a backup location",
                BACKUP_DIR_ENV
            ),
        })
}

/// Where a bundle keeps the fonts that get replaced.
pub fn fonts_dir(bundle: &Path) -> PathBuf {
    bundle.join("Contents").join("App-Resources").join("Fonts")
}
