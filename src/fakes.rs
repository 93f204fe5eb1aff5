//! In-process stand-ins for the system facade and the downloader.

use crate::download::Downloader;
use crate::error::{FontSwapError, Result};
use crate::system::SystemFacade;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct FakeSystem {
    pub application: Option<PathBuf>,
    pub signed: bool,
    pub signing_fails: bool,
    pub refuse_privileges: bool,
    /// Destinations an unprivileged copy may not overwrite.
    pub read_only: Vec<PathBuf>,
    pub quarantine_unsupported: bool,
    pub calls: RefCell<Vec<String>>,
}

impl FakeSystem {
    pub fn with_application(bundle: &Path) -> Self {
        FakeSystem {
            application: Some(bundle.to_path_buf()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn signing_result(&self, bundle: &Path) -> Result<()> {
        if self.signing_fails {
            return Err(FontSwapError::InstallPermission {
                path: bundle.to_path_buf(),
                msg: "`codesign` failed: internal error".to_string(),
            });
        }
        Ok(())
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl SystemFacade for FakeSystem {
    fn locate_application(&self) -> Result<Option<PathBuf>> {
        Ok(self.application.clone())
    }

    fn copy_plain(&self, src: &Path, dst: &Path) -> io::Result<()> {
        if self.read_only.iter().any(|path| path == dst) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }
        fs::copy(src, dst).map(|_| ())
    }

    fn copy_privileged(&self, src: &Path, dst: &Path) -> Result<()> {
        self.record(format!("copy_privileged {}", dst.display()));
        if self.refuse_privileges {
            return Err(FontSwapError::InstallPermission {
                path: dst.to_path_buf(),
                msg: "authentication refused".to_string(),
            });
        }
        if let Ok(metadata) = fs::metadata(dst) {
            let mut permissions = metadata.permissions();
            permissions.set_readonly(false);
            fs::set_permissions(dst, permissions).map_err(FontSwapError::io(dst))?;
        }
        fs::copy(src, dst).map_err(FontSwapError::io(dst))?;
        Ok(())
    }

    fn has_signature(&self, bundle: &Path) -> Result<bool> {
        self.record(format!("has_signature {}", bundle.display()));
        Ok(self.signed)
    }

    fn strip_signature(&self, bundle: &Path) -> Result<()> {
        self.record(format!("strip_signature {}", bundle.display()));
        self.signing_result(bundle)
    }

    fn ad_hoc_sign(&self, bundle: &Path) -> Result<()> {
        self.record(format!("ad_hoc_sign {}", bundle.display()));
        self.signing_result(bundle)
    }

    fn clear_quarantine(&self, bundle: &Path) -> Result<()> {
        self.record(format!("clear_quarantine {}", bundle.display()));
        if self.quarantine_unsupported {
            return Err(FontSwapError::Environment {
                msg: "xattr is not available".to_string(),
            });
        }
        Ok(())
    }
}

/// Serves fixed bodies by URL; any other URL fails like a 404.
#[derive(Debug, Default)]
pub struct FakeDownloader {
    pub files: HashMap<String, Vec<u8>>,
    fetched: RefCell<Vec<String>>,
}

impl FakeDownloader {
    pub fn serving(files: impl IntoIterator<Item = (String, Vec<u8>)>) -> Self {
        FakeDownloader {
            files: files.into_iter().collect(),
            fetched: RefCell::new(vec![]),
        }
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.borrow().clone()
    }
}

impl Downloader for FakeDownloader {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        self.fetched.borrow_mut().push(url.to_string());
        let body = self.files.get(url).ok_or_else(|| FontSwapError::Download {
            url: url.to_string(),
            msg: "HTTP status client error (404 Not Found)".to_string(),
        })?;
        fs::write(dest, body).map_err(FontSwapError::io(dest))
    }
}
