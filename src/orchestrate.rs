//! The install, revert and list flows.

use crate::apply::{Applier, PreparedFile, SignaturePolicy};
use crate::backup::{BackupStore, RestoreReport, SnapshotRecord};
use crate::config::{self, Config};
use crate::download::Downloader;
use crate::error::{FontSwapError, Result};
use crate::font;
use crate::rewrite::{self, RewriteSpec};
use crate::slots::{self, Style, SLOTS};
use crate::system::SystemFacade;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Where the replacement glyphs come from.
#[derive(Debug, Clone, PartialEq)]
pub enum GlyphSource {
    /// Fetch the four upstream styles.
    Download,
    /// Use one local font for every style.
    Custom(PathBuf),
}

/// The scratch directory of the install in progress, if any.
pub type ScratchHandle = Arc<Mutex<Option<PathBuf>>>;

#[derive(Debug, Clone, PartialEq)]
pub struct InstallOutcome {
    pub app_path: PathBuf,
    /// `None` on a dry run.
    pub snapshot: Option<SnapshotRecord>,
    pub prepared: Vec<&'static str>,
    pub installed: Vec<&'static str>,
    /// The policy applied to an existing signature; `None` if unsigned.
    pub signature: Option<SignaturePolicy>,
}

pub struct Orchestrator<'a> {
    config: Config,
    system: &'a dyn SystemFacade,
    downloader: &'a dyn Downloader,
    store: BackupStore,
    prompt: Box<dyn Fn() -> SignaturePolicy + 'a>,
    scratch: ScratchHandle,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: Config, system: &'a dyn SystemFacade, downloader: &'a dyn Downloader) -> Self {
        let store = BackupStore::new(&config.backup_root);
        Orchestrator {
            config,
            system,
            downloader,
            store,
            prompt: Box::new(|| SignaturePolicy::AdHoc),
            scratch: Arc::new(Mutex::new(None)),
        }
    }

    /// Ask `prompt` for a signature policy when the configuration has none.
    pub fn with_prompt(mut self, prompt: impl Fn() -> SignaturePolicy + 'a) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &BackupStore {
        &self.store
    }

    /// A handle through which an interrupt handler can find, and remove,
    /// the scratch directory of a running install.
    pub fn scratch_handle(&self) -> ScratchHandle {
        Arc::clone(&self.scratch)
    }

    fn publish_scratch(&self, path: Option<&Path>) {
        if let Ok(mut current) = self.scratch.lock() {
            *current = path.map(Path::to_path_buf);
        }
    }

    fn signature_policy(&self) -> SignaturePolicy {
        match self.config.signature {
            Some(policy) => policy,
            None => (self.prompt)(),
        }
    }

    /// The application bundle and its fonts directory.
    pub fn locate(&self) -> Result<(PathBuf, PathBuf)> {
        let app = match &self.config.app_path {
            Some(path) => path.clone(),
            None => self
                .system
                .locate_application()?
                .ok_or_else(|| FontSwapError::Environment {
                    msg: "Ableton Live was not found; use --app to point at it".to_string(),
                })?,
        };
        if !app.is_dir() {
            return Err(FontSwapError::Environment {
                msg: format!("Application {} does not exist", app.display()),
            });
        }
        let fonts_dir = config::fonts_dir(&app);
        if !fonts_dir.is_dir() {
            return Err(FontSwapError::Environment {
                msg: format!(
                    "{} has no fonts directory at {}",
                    app.display(),
                    fonts_dir.display()
                ),
            });
        }
        log::info!("Using {}", app.display());
        Ok((app, fonts_dir))
    }

    /// Replace every slot font with a renamed copy of `source`.
    pub fn install(&self, source: &GlyphSource) -> Result<InstallOutcome> {
        rewrite::validate_scale(self.config.scale)?;
        let (app, fonts_dir) = self.locate()?;
        let scratch = tempfile::Builder::new()
            .prefix("fontswap-")
            .tempdir()
            .map_err(|e| FontSwapError::Environment {
                msg: format!("Could not create a scratch directory: {}", e),
            })?;
        self.publish_scratch(Some(scratch.path()));
        let outcome = self.install_using(source, &app, &fonts_dir, scratch.path());
        self.publish_scratch(None);
        outcome
    }

    fn install_using(
        &self,
        source: &GlyphSource,
        app: &Path,
        fonts_dir: &Path,
        scratch: &Path,
    ) -> Result<InstallOutcome> {
        let sources = self.acquire(source, scratch)?;
        let snapshot = if self.config.dry_run {
            None
        } else {
            let (record, _) = self.store.snapshot(app, &slots::slot_filenames())?;
            Some(record)
        };
        let prepared = self.prepare(&sources, scratch)?;
        let mut outcome = InstallOutcome {
            app_path: app.to_path_buf(),
            snapshot,
            prepared: prepared.iter().map(|p| p.slot).collect(),
            installed: vec![],
            signature: None,
        };
        if self.config.dry_run {
            for file in &prepared {
                log::info!("Would install {}", fonts_dir.join(file.slot).display());
            }
            return Ok(outcome);
        }

        let applier = Applier::new(self.system);
        let installed = applier.install(fonts_dir, &prepared);
        let signature = applier.repair_signature(app, &|| self.signature_policy());
        outcome.installed = installed?;
        outcome.signature = signature?;
        Ok(outcome)
    }

    /// Put one source font per style into `scratch`, checking each parses
    /// and can take the configured scale.
    fn acquire(&self, source: &GlyphSource, scratch: &Path) -> Result<BTreeMap<Style, PathBuf>> {
        let mut sources = BTreeMap::new();
        match source {
            GlyphSource::Download => {
                for style in Style::ALL.iter() {
                    let dest = scratch.join(style.file_name());
                    self.downloader.fetch(&style.url(), &dest)?;
                    sources.insert(*style, dest);
                }
            }
            GlyphSource::Custom(path) => {
                if !path.is_file() {
                    return Err(FontSwapError::InvalidArgument {
                        msg: format!("{} is not a font file", path.display()),
                    });
                }
                log::info!("Using {} for every style", path.display());
                for style in Style::ALL.iter() {
                    sources.insert(*style, path.clone());
                }
            }
        }
        let scaling = (self.config.scale - 1.0).abs() > f64::EPSILON;
        for path in sources.values() {
            let mut font = font::load(path)?;
            if scaling {
                rewrite::check_scalable(&mut font, self.config.scale).map_err(|e| match e {
                    FontSwapError::FontFormat { msg } => FontSwapError::FontFormat {
                        msg: format!("{}: {}", path.display(), msg),
                    },
                    other => other,
                })?;
            }
        }
        Ok(sources)
    }

    fn prepare(&self, sources: &BTreeMap<Style, PathBuf>, scratch: &Path) -> Result<Vec<PreparedFile>> {
        SLOTS
            .iter()
            .map(|slot| -> Result<PreparedFile> {
                let source = sources.get(&slot.style).ok_or_else(|| FontSwapError::InvalidArgument {
                    msg: format!("No {} font for {}", slot.style, slot.filename),
                })?;
                let spec = RewriteSpec::new(source, slot.family, slot.subfamily, self.config.scale);
                let dest = scratch.join(slot.filename);
                rewrite::rewrite(&spec, &dest)?;
                Ok(PreparedFile {
                    slot: slot.filename,
                    path: dest,
                })
            })
            .collect()
    }

    /// Put back the fonts from a snapshot (the latest if `id` is `None`) and
    /// repair the signature. A dry run only reports what would be restored.
    pub fn revert(&self, id: Option<&str>) -> Result<RestoreReport> {
        if self.config.dry_run {
            let report = self.store.preview_restore(id, &slots::slot_filenames())?;
            for slot in &report.restored {
                log::info!("Would restore {}", slot);
            }
            return Ok(report);
        }
        let report = self
            .store
            .restore(id, &slots::slot_filenames(), self.system)?;
        Applier::new(self.system).repair_signature(&report.app_path, &|| self.signature_policy())?;
        log::info!(
            "Restored {} font(s) from backup {}",
            report.restored.len(),
            report.id
        );
        Ok(report)
    }

    pub fn list(&self) -> Vec<SnapshotRecord> {
        self.store.list()
    }
}
