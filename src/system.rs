//! Everything that touches the operating system outside plain file IO:
//! finding the application, privileged copies and code signatures.

use crate::error::{FontSwapError, Result};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub const BUNDLE_ID: &str = "com.ableton.live";
const APP_PREFIX: &str = "Ableton Live";
const QUARANTINE_ATTRIBUTE: &str = "com.apple.quarantine";

/// Operations on the host system that the install and revert flows need.
pub trait SystemFacade {
    /// Find an installed application bundle, if there is one.
    fn locate_application(&self) -> Result<Option<PathBuf>>;
    /// Copy a file as the current user.
    fn copy_plain(&self, src: &Path, dst: &Path) -> io::Result<()> {
        fs::copy(src, dst).map(|_| ())
    }
    /// Copy a file over a destination the current user cannot write.
    fn copy_privileged(&self, src: &Path, dst: &Path) -> Result<()>;
    fn has_signature(&self, bundle: &Path) -> Result<bool>;
    fn strip_signature(&self, bundle: &Path) -> Result<()>;
    fn ad_hoc_sign(&self, bundle: &Path) -> Result<()>;
    fn clear_quarantine(&self, bundle: &Path) -> Result<()>;
}

/// Copy `src` over `dst`, retrying with elevated privileges if the
/// destination is not writable.
pub fn copy_file(system: &dyn SystemFacade, src: &Path, dst: &Path) -> Result<()> {
    match system.copy_plain(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            log::info!(
                "{} is not writable, copying with elevated privileges",
                dst.display()
            );
            system.copy_privileged(src, dst)
        }
        Err(e) => Err(FontSwapError::Io {
            path: dst.to_path_buf(),
            source: e,
        }),
    }
}

/// The macOS implementation, driving the system command line tools.
#[derive(Debug, Clone)]
pub struct MacSystem {
    search_dirs: Vec<PathBuf>,
}

impl Default for MacSystem {
    fn default() -> Self {
        let mut search_dirs = vec![PathBuf::from("/Applications")];
        if let Some(home) = dirs::home_dir() {
            search_dirs.push(home.join("Applications"));
        }
        MacSystem { search_dirs }
    }
}

impl MacSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// The newest-named matching bundle in the well-known install
    /// directories.
    fn find_in_search_dirs(&self) -> Option<PathBuf> {
        let mut candidates: Vec<PathBuf> = self
            .search_dirs
            .iter()
            .filter_map(|dir| fs::read_dir(dir).ok())
            .flatten()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                let name = path.file_name().and_then(OsStr::to_str).unwrap_or("");
                name.starts_with(APP_PREFIX) && name.ends_with(".app") && path.is_dir()
            })
            .collect();
        candidates.sort_by_key(|path| path.file_name().map(|n| n.to_os_string()));
        candidates.pop()
    }

    fn find_with_spotlight(&self) -> Result<Option<PathBuf>> {
        let query = format!("kMDItemCFBundleIdentifier == '{}'", BUNDLE_ID);
        let output = match run("mdfind", &[OsStr::new(&query)]) {
            Ok(output) => output,
            Err(FontSwapError::Environment { msg }) => {
                log::debug!("{}", msg);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(PathBuf::from))
    }
}

fn run(program: &str, args: &[&OsStr]) -> Result<Output> {
    log::debug!("Running {} {:?}", program, args);
    Command::new(program).args(args).output().map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            FontSwapError::Environment {
                msg: format!("Required tool `{}` was not found", program),
            }
        } else {
            FontSwapError::Environment {
                msg: format!("Could not run `{}`: {}", program, e),
            }
        }
    })
}

fn run_checked(program: &str, args: &[&OsStr], target: &Path) -> Result<()> {
    let output = run(program, args)?;
    if output.status.success() {
        Ok(())
    } else {
        Err(FontSwapError::InstallPermission {
            path: target.to_path_buf(),
            msg: format!(
                "`{}` failed: {}",
                program,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        })
    }
}

impl SystemFacade for MacSystem {
    fn locate_application(&self) -> Result<Option<PathBuf>> {
        if let Some(found) = self.find_in_search_dirs() {
            return Ok(Some(found));
        }
        self.find_with_spotlight()
    }

    fn copy_privileged(&self, src: &Path, dst: &Path) -> Result<()> {
        run_checked(
            "sudo",
            &[OsStr::new("cp"), src.as_os_str(), dst.as_os_str()],
            dst,
        )
    }

    fn has_signature(&self, bundle: &Path) -> Result<bool> {
        let output = run(
            "codesign",
            &[OsStr::new("--display"), bundle.as_os_str()],
        )?;
        Ok(output.status.success())
    }

    fn strip_signature(&self, bundle: &Path) -> Result<()> {
        run_checked(
            "sudo",
            &[
                OsStr::new("codesign"),
                OsStr::new("--remove-signature"),
                bundle.as_os_str(),
            ],
            bundle,
        )
    }

    fn ad_hoc_sign(&self, bundle: &Path) -> Result<()> {
        run_checked(
            "sudo",
            &[
                OsStr::new("codesign"),
                OsStr::new("--force"),
                OsStr::new("--deep"),
                OsStr::new("--sign"),
                OsStr::new("-"),
                bundle.as_os_str(),
            ],
            bundle,
        )
    }

    fn clear_quarantine(&self, bundle: &Path) -> Result<()> {
        run_checked(
            "sudo",
            &[
                OsStr::new("xattr"),
                OsStr::new("-dr"),
                OsStr::new(QUARANTINE_ATTRIBUTE),
                bundle.as_os_str(),
            ],
            bundle,
        )
    }
}
