//! Timestamped snapshots of the installed fonts, and restoring them.
//!
//! Each snapshot is a directory under the backup root named after the time
//! it was taken (`%Y%m%d_%H%M%S`, with `_1`, `_2`, ... appended on a clash),
//! holding copies of the slot files plus three metadata files:
//!
//! * `app_path`: the bundle the files were copied from
//! * `timestamp`: when, in RFC 3339
//! * `manifest.json`: which slot files were captured and which were absent
//!
//! A snapshot is assembled in a `.incoming-<id>` directory and renamed into
//! place once complete. Only then is the `latest` file at the root rewritten
//! to name it, so an interrupted snapshot is never picked up.

use crate::config;
use crate::error::{FontSwapError, Result};
use crate::system::{self, SystemFacade};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const LATEST_FILE: &str = "latest";
const APP_PATH_FILE: &str = "app_path";
const TIMESTAMP_FILE: &str = "timestamp";
const MANIFEST_FILE: &str = "manifest.json";
const INCOMING_PREFIX: &str = ".incoming-";
const ID_FORMAT: &str = "%Y%m%d_%H%M%S";
const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub captured: Vec<String>,
    pub absent: Vec<String>,
}

/// One snapshot directory, with whatever metadata could be read from it.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRecord {
    pub id: String,
    pub dir: PathBuf,
    pub app_path: Option<PathBuf>,
    pub timestamp: Option<String>,
}

impl SnapshotRecord {
    fn read(dir: PathBuf, id: String) -> Self {
        let app_path = read_trimmed(&dir.join(APP_PATH_FILE)).map(PathBuf::from);
        let timestamp = read_trimmed(&dir.join(TIMESTAMP_FILE));
        SnapshotRecord {
            id,
            dir,
            app_path,
            timestamp,
        }
    }

    pub fn app_path_display(&self) -> String {
        self.app_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    pub fn timestamp_display(&self) -> &str {
        self.timestamp.as_deref().unwrap_or(&self.id)
    }

    pub fn manifest(&self) -> Option<Manifest> {
        let path = self.dir.join(MANIFEST_FILE);
        let text = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&text) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                log::warn!("Ignoring unreadable {}: {}", path.display(), e);
                None
            }
        }
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    let text = fs::read_to_string(path).ok()?;
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Snapshot ids sort by time, then by clash suffix numerically.
fn sort_key(id: &str) -> (&str, u32) {
    if let (Some(base), Some(suffix)) = (id.get(..15), id.get(15..)) {
        if let Some(n) = suffix.strip_prefix('_').and_then(|n| n.parse().ok()) {
            return (base, n);
        }
    }
    (id, 0)
}

/// The snapshots under a backup root, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    records: Vec<SnapshotRecord>,
    latest: Option<usize>,
}

impl Catalog {
    pub fn load(root: &Path) -> Result<Catalog> {
        if !root.is_dir() {
            return Ok(Catalog::default());
        }
        let mut records = vec![];
        for entry in fs::read_dir(root).map_err(FontSwapError::io(root))? {
            let entry = entry.map_err(FontSwapError::io(root))?;
            let id = match entry.file_name().into_string() {
                Ok(id) => id,
                Err(_) => continue,
            };
            if id.starts_with('.') || !entry.path().is_dir() {
                continue;
            }
            records.push(SnapshotRecord::read(entry.path(), id));
        }
        records.sort_by(|a, b| sort_key(&a.id).cmp(&sort_key(&b.id)));

        let pointer = read_trimmed(&root.join(LATEST_FILE));
        let latest = match pointer {
            Some(id) => match records.iter().position(|r| r.id == id) {
                Some(index) => Some(index),
                None => {
                    log::warn!("Latest backup {} does not exist, using the newest one", id);
                    records.len().checked_sub(1)
                }
            },
            None => records.len().checked_sub(1),
        };
        Ok(Catalog { records, latest })
    }

    pub fn records(&self) -> &[SnapshotRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest(&self) -> Option<&SnapshotRecord> {
        self.latest.and_then(|i| self.records.get(i))
    }

    pub fn find(&self, id: &str) -> Option<&SnapshotRecord> {
        self.records.iter().find(|r| r.id == id)
    }
}

/// What a restore did.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoreReport {
    pub id: String,
    pub app_path: PathBuf,
    pub restored: Vec<String>,
    /// Slot files the snapshot has no copy of; left as they are.
    pub missing: Vec<String>,
}

/// Copy the live slot files and the metadata into a snapshot under
/// construction.
fn fill_incoming(
    incoming: &Path,
    fonts_dir: &Path,
    app_path: &Path,
    slot_files: &[&str],
    now: &DateTime<Local>,
) -> Result<Manifest> {
    let mut manifest = Manifest::default();
    for &slot in slot_files {
        let live = fonts_dir.join(slot);
        if live.is_file() {
            let saved = incoming.join(slot);
            fs::copy(&live, &saved).map_err(FontSwapError::io(&live))?;
            manifest.captured.push(slot.to_string());
        } else {
            log::warn!("{} is not installed, nothing to back up", slot);
            manifest.absent.push(slot.to_string());
        }
    }
    let app_path_file = incoming.join(APP_PATH_FILE);
    fs::write(&app_path_file, app_path.display().to_string())
        .map_err(FontSwapError::io(&app_path_file))?;
    let timestamp_file = incoming.join(TIMESTAMP_FILE);
    fs::write(&timestamp_file, now.to_rfc3339()).map_err(FontSwapError::io(&timestamp_file))?;
    let manifest_file = incoming.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(&manifest).map_err(|e| FontSwapError::Io {
        path: manifest_file.clone(),
        source: e.into(),
    })?;
    fs::write(&manifest_file, json).map_err(FontSwapError::io(&manifest_file))?;
    Ok(manifest)
}

fn discard(incoming: &Path) {
    if let Err(e) = fs::remove_dir_all(incoming) {
        log::warn!("Could not remove {}: {}", incoming.display(), e);
    }
}

/// Write `contents` next to `path` and rename it into place.
fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, contents).map_err(FontSwapError::io(&temp_path))?;
    fs::rename(&temp_path, path).map_err(FontSwapError::io(path))?;
    log::debug!("Atomically wrote {}", path.display());
    Ok(())
}

#[derive(Debug, Clone)]
pub struct BackupStore {
    root: PathBuf,
}

impl BackupStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        BackupStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog(&self) -> Result<Catalog> {
        Catalog::load(&self.root)
    }

    /// All snapshots, oldest first. Never fails; an unreadable root lists
    /// as empty.
    pub fn list(&self) -> Vec<SnapshotRecord> {
        match self.catalog() {
            Ok(catalog) => catalog.records,
            Err(e) => {
                log::warn!("{}", e);
                vec![]
            }
        }
    }

    /// Copy the slot files currently installed in `app_path` into a new
    /// snapshot and make it the latest.
    pub fn snapshot(&self, app_path: &Path, slot_files: &[&str]) -> Result<(SnapshotRecord, Catalog)> {
        self.snapshot_at(app_path, slot_files, Local::now())
    }

    pub fn snapshot_at(
        &self,
        app_path: &Path,
        slot_files: &[&str],
        now: DateTime<Local>,
    ) -> Result<(SnapshotRecord, Catalog)> {
        let fonts_dir = config::fonts_dir(app_path);
        if !fonts_dir.is_dir() {
            return Err(FontSwapError::Environment {
                msg: format!("Fonts directory {} does not exist", fonts_dir.display()),
            });
        }
        fs::create_dir_all(&self.root).map_err(FontSwapError::io(&self.root))?;

        let id = self.unused_id(&now);
        let incoming = self.root.join(format!("{}{}", INCOMING_PREFIX, id));
        fs::create_dir(&incoming).map_err(FontSwapError::io(&incoming))?;

        let manifest = match fill_incoming(&incoming, &fonts_dir, app_path, slot_files, &now) {
            Ok(manifest) => manifest,
            Err(e) => {
                discard(&incoming);
                return Err(e);
            }
        };

        let dir = self.root.join(&id);
        if let Err(e) = fs::rename(&incoming, &dir) {
            discard(&incoming);
            return Err(FontSwapError::Io { path: dir, source: e });
        }
        atomic_write(&self.root.join(LATEST_FILE), id.as_bytes())?;
        log::info!(
            "Backed up {} font(s) to {}",
            manifest.captured.len(),
            dir.display()
        );

        let record = SnapshotRecord::read(dir, id);
        let catalog = self.catalog()?;
        Ok((record, catalog))
    }

    fn unused_id(&self, now: &DateTime<Local>) -> String {
        let base = now.format(ID_FORMAT).to_string();
        let taken = |id: &str| {
            self.root.join(id).exists()
                || self.root.join(format!("{}{}", INCOMING_PREFIX, id)).exists()
        };
        let mut id = base.clone();
        let mut n = 0;
        while taken(&id) {
            n += 1;
            id = format!("{}_{}", base, n);
        }
        id
    }

    /// The snapshot `id` names (the latest if `None`), the application it
    /// came from, and that application's fonts directory.
    fn resolve(&self, id: Option<&str>) -> Result<(SnapshotRecord, PathBuf, PathBuf)> {
        let catalog = self.catalog()?;
        let record = match id {
            Some(id) => catalog.find(id).ok_or_else(|| FontSwapError::NoBackup {
                id: Some(id.to_string()),
            })?,
            None => catalog.latest().ok_or(FontSwapError::NoBackup { id: None })?,
        };
        let app_path = record.app_path.clone().ok_or_else(|| FontSwapError::CorruptBackup {
            path: record.dir.clone(),
            msg: format!("{} is missing or unreadable", APP_PATH_FILE),
        })?;
        let fonts_dir = config::fonts_dir(&app_path);
        if !fonts_dir.is_dir() {
            return Err(FontSwapError::Environment {
                msg: format!("Fonts directory {} no longer exists", fonts_dir.display()),
            });
        }
        Ok((record.clone(), app_path, fonts_dir))
    }

    /// What `restore` would do, without touching the bundle.
    pub fn preview_restore(&self, id: Option<&str>, slot_files: &[&str]) -> Result<RestoreReport> {
        let (record, app_path, _) = self.resolve(id)?;
        let (restored, missing): (Vec<String>, Vec<String>) = slot_files
            .iter()
            .map(|slot| slot.to_string())
            .partition(|slot| record.dir.join(slot).is_file());
        Ok(RestoreReport {
            id: record.id,
            app_path,
            restored,
            missing,
        })
    }

    /// Copy a snapshot's files back over the bundle they came from. With no
    /// `id`, the latest snapshot is used.
    pub fn restore(
        &self,
        id: Option<&str>,
        slot_files: &[&str],
        system: &dyn SystemFacade,
    ) -> Result<RestoreReport> {
        let (record, app_path, fonts_dir) = self.resolve(id)?;
        log::info!("Restoring backup {} to {}", record.id, app_path.display());

        let absent_at_capture = record.manifest().map(|m| m.absent).unwrap_or_default();
        let mut report = RestoreReport {
            id: record.id.clone(),
            app_path,
            restored: vec![],
            missing: vec![],
        };
        let mut failures = vec![];
        for &slot in slot_files {
            let saved = record.dir.join(slot);
            if !saved.is_file() {
                if absent_at_capture.iter().any(|a| a == slot) {
                    log::warn!("{} was not installed when the backup was taken, skipping", slot);
                } else {
                    log::warn!("{} is missing from the backup, skipping", slot);
                }
                report.missing.push(slot.to_string());
                continue;
            }
            match system::copy_file(system, &saved, &fonts_dir.join(slot)) {
                Ok(()) => report.restored.push(slot.to_string()),
                Err(e) => {
                    log::warn!("Could not restore {}: {}", slot, e);
                    failures.push(slot);
                }
            }
        }
        if !failures.is_empty() {
            return Err(FontSwapError::InstallPermission {
                path: fonts_dir,
                msg: format!("could not restore {}", failures.join(", ")),
            });
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeSystem;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const SLOTS: [&str; 3] = ["A-Light.ttf", "A-Bold.ttf", "A-Italic.ttf"];

    fn at(minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 12, minute, 0).unwrap()
    }

    struct Fixture {
        _dir: TempDir,
        bundle: PathBuf,
        fonts: PathBuf,
        store: BackupStore,
    }

    fn fixture(installed: &[&str]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("Live.app");
        let fonts = config::fonts_dir(&bundle);
        fs::create_dir_all(&fonts).unwrap();
        for slot in installed {
            fs::write(fonts.join(slot), format!("original {}", slot)).unwrap();
        }
        let store = BackupStore::new(dir.path().join("backups"));
        Fixture {
            _dir: dir,
            bundle,
            fonts,
            store,
        }
    }

    fn live(f: &Fixture, slot: &str) -> String {
        fs::read_to_string(f.fonts.join(slot)).unwrap()
    }

    #[test]
    fn snapshot_captures_installed_files() {
        let f = fixture(&SLOTS[..2]);
        let (record, catalog) = f.store.snapshot_at(&f.bundle, &SLOTS, at(30)).unwrap();
        assert_eq!(record.id, "20240301_123000");
        assert_eq!(record.app_path.as_deref(), Some(f.bundle.as_path()));
        assert_eq!(record.timestamp.as_deref(), Some(at(30).to_rfc3339().as_str()));
        assert_eq!(
            fs::read_to_string(record.dir.join("A-Light.ttf")).unwrap(),
            "original A-Light.ttf"
        );
        assert!(!record.dir.join("A-Italic.ttf").exists());
        assert_eq!(
            record.manifest().unwrap(),
            Manifest {
                captured: vec!["A-Light.ttf".into(), "A-Bold.ttf".into()],
                absent: vec!["A-Italic.ttf".into()],
            }
        );
        assert_eq!(catalog.latest(), Some(&record));
        assert_eq!(
            fs::read_to_string(f.store.root().join(LATEST_FILE)).unwrap(),
            "20240301_123000"
        );
        let leftovers: Vec<_> = fs::read_dir(f.store.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .filter(|name| name.starts_with('.') || name.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "{:?}", leftovers);
    }

    #[test]
    fn clashing_ids_get_a_suffix() {
        let f = fixture(&SLOTS);
        let (first, _) = f.store.snapshot_at(&f.bundle, &SLOTS, at(30)).unwrap();
        let (second, _) = f.store.snapshot_at(&f.bundle, &SLOTS, at(30)).unwrap();
        let (third, catalog) = f.store.snapshot_at(&f.bundle, &SLOTS, at(30)).unwrap();
        assert_eq!(first.id, "20240301_123000");
        assert_eq!(second.id, "20240301_123000_1");
        assert_eq!(third.id, "20240301_123000_2");
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.latest().unwrap().id, third.id);
    }

    #[test]
    fn ids_sort_by_time_then_suffix() {
        let mut ids = vec![
            "20240301_123000_10",
            "20240301_123000_2",
            "20240301_123100",
            "20240301_123000",
        ];
        ids.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        assert_eq!(
            ids,
            vec![
                "20240301_123000",
                "20240301_123000_2",
                "20240301_123000_10",
                "20240301_123100",
            ]
        );
    }

    #[test]
    fn snapshot_needs_the_fonts_directory() {
        let f = fixture(&[]);
        fs::remove_dir_all(&f.fonts).unwrap();
        assert!(matches!(
            f.store.snapshot_at(&f.bundle, &SLOTS, at(30)),
            Err(FontSwapError::Environment { .. })
        ));
        assert!(!f.store.root().exists());
    }

    #[test]
    fn restore_latest_and_by_id() {
        let f = fixture(&SLOTS);
        let (older, _) = f.store.snapshot_at(&f.bundle, &SLOTS, at(30)).unwrap();
        fs::write(f.fonts.join("A-Bold.ttf"), "patched once").unwrap();
        f.store.snapshot_at(&f.bundle, &SLOTS, at(31)).unwrap();
        fs::write(f.fonts.join("A-Bold.ttf"), "patched twice").unwrap();

        let system = FakeSystem::default();
        let report = f.store.restore(None, &SLOTS, &system).unwrap();
        assert_eq!(report.id, "20240301_123100");
        assert_eq!(report.app_path, f.bundle);
        assert_eq!(report.restored.len(), 3);
        assert!(report.missing.is_empty());
        assert_eq!(live(&f, "A-Bold.ttf"), "patched once");

        f.store.restore(Some(&older.id), &SLOTS, &system).unwrap();
        assert_eq!(live(&f, "A-Bold.ttf"), "original A-Bold.ttf");
        assert!(system.calls().is_empty());
    }

    #[test]
    fn nothing_to_restore() {
        let f = fixture(&SLOTS);
        let system = FakeSystem::default();
        assert!(matches!(
            f.store.restore(None, &SLOTS, &system),
            Err(FontSwapError::NoBackup { id: None })
        ));
        f.store.snapshot_at(&f.bundle, &SLOTS, at(30)).unwrap();
        match f.store.restore(Some("19990101_000000"), &SLOTS, &system) {
            Err(FontSwapError::NoBackup { id }) => assert_eq!(id.as_deref(), Some("19990101_000000")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_provenance_is_corrupt() {
        let f = fixture(&SLOTS);
        let (record, _) = f.store.snapshot_at(&f.bundle, &SLOTS, at(30)).unwrap();
        fs::remove_file(record.dir.join(APP_PATH_FILE)).unwrap();
        fs::write(f.fonts.join("A-Bold.ttf"), "patched").unwrap();
        assert!(matches!(
            f.store.restore(None, &SLOTS, &FakeSystem::default()),
            Err(FontSwapError::CorruptBackup { .. })
        ));
        assert_eq!(live(&f, "A-Bold.ttf"), "patched");

        let listed = f.store.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].app_path_display(), "unknown");
    }

    #[test]
    fn vanished_bundle_is_an_environment_error() {
        let f = fixture(&SLOTS);
        f.store.snapshot_at(&f.bundle, &SLOTS, at(30)).unwrap();
        fs::remove_dir_all(&f.bundle).unwrap();
        assert!(matches!(
            f.store.restore(None, &SLOTS, &FakeSystem::default()),
            Err(FontSwapError::Environment { .. })
        ));
    }

    #[test]
    fn restore_skips_slots_absent_from_the_snapshot() {
        let f = fixture(&SLOTS[..2]);
        f.store.snapshot_at(&f.bundle, &SLOTS, at(30)).unwrap();
        for slot in &SLOTS {
            fs::write(f.fonts.join(slot), "patched").unwrap();
        }
        let report = f.store.restore(None, &SLOTS, &FakeSystem::default()).unwrap();
        assert_eq!(report.restored, vec!["A-Light.ttf", "A-Bold.ttf"]);
        assert_eq!(report.missing, vec!["A-Italic.ttf"]);
        assert_eq!(live(&f, "A-Light.ttf"), "original A-Light.ttf");
        assert_eq!(live(&f, "A-Italic.ttf"), "patched");
    }

    #[test]
    fn restoring_twice_gives_the_same_bytes() {
        let f = fixture(&SLOTS);
        f.store.snapshot_at(&f.bundle, &SLOTS, at(30)).unwrap();
        let system = FakeSystem::default();
        for slot in &SLOTS {
            fs::write(f.fonts.join(slot), "patched").unwrap();
        }
        f.store.restore(None, &SLOTS, &system).unwrap();
        let first: Vec<String> = SLOTS.iter().map(|s| live(&f, s)).collect();
        f.store.restore(None, &SLOTS, &system).unwrap();
        let second: Vec<String> = SLOTS.iter().map(|s| live(&f, s)).collect();
        assert_eq!(first, second);
        assert_eq!(f.store.catalog().unwrap().len(), 1);
    }

    #[test]
    fn unpublished_snapshots_are_ignored() {
        let f = fixture(&SLOTS);
        let (record, _) = f.store.snapshot_at(&f.bundle, &SLOTS, at(30)).unwrap();
        fs::create_dir(f.store.root().join(".incoming-20240301_130000")).unwrap();
        let catalog = f.store.catalog().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.latest(), Some(&record));
    }

    #[test]
    fn dangling_pointer_falls_back_to_newest() {
        let f = fixture(&SLOTS);
        f.store.snapshot_at(&f.bundle, &SLOTS, at(30)).unwrap();
        let (newest, _) = f.store.snapshot_at(&f.bundle, &SLOTS, at(31)).unwrap();
        fs::write(f.store.root().join(LATEST_FILE), "20200101_000000").unwrap();
        assert_eq!(f.store.catalog().unwrap().latest(), Some(&newest));
        fs::remove_file(f.store.root().join(LATEST_FILE)).unwrap();
        assert_eq!(f.store.catalog().unwrap().latest(), Some(&newest));
    }

    #[test]
    fn missing_root_lists_nothing() {
        let store = BackupStore::new("/nonexistent/fontswap/backups");
        assert!(store.list().is_empty());
        assert!(store.catalog().unwrap().latest().is_none());
    }

    #[test]
    fn refused_privileges_are_reported() {
        let f = fixture(&SLOTS);
        f.store.snapshot_at(&f.bundle, &SLOTS, at(30)).unwrap();
        for slot in &SLOTS {
            fs::write(f.fonts.join(slot), "patched").unwrap();
        }
        let locked = f.fonts.join("A-Bold.ttf");
        let system = FakeSystem {
            read_only: vec![locked.clone()],
            refuse_privileges: true,
            ..Default::default()
        };
        match f.store.restore(None, &SLOTS, &system) {
            Err(FontSwapError::InstallPermission { msg, .. }) => assert!(msg.contains("A-Bold.ttf")),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(system.calls(), vec![format!("copy_privileged {}", locked.display())]);
        assert_eq!(fs::read_to_string(&locked).unwrap(), "patched");
        assert_eq!(
            fs::read_to_string(f.fonts.join("A-Light.ttf")).unwrap(),
            "original A-Light.ttf"
        );
        assert_eq!(
            fs::read_to_string(f.fonts.join("A-Italic.ttf")).unwrap(),
            "original A-Italic.ttf"
        );
    }

    #[test]
    fn preview_changes_nothing() {
        let f = fixture(&["A-Light.ttf", "A-Bold.ttf"]);
        f.store.snapshot_at(&f.bundle, &SLOTS, at(30)).unwrap();
        fs::write(f.fonts.join("A-Light.ttf"), "patched").unwrap();
        let system = FakeSystem::default();
        let report = f.store.preview_restore(None, &SLOTS).unwrap();
        assert_eq!(report.restored, vec!["A-Light.ttf", "A-Bold.ttf"]);
        assert_eq!(report.missing, vec!["A-Italic.ttf"]);
        assert_eq!(report.app_path, f.bundle);
        assert_eq!(fs::read_to_string(f.fonts.join("A-Light.ttf")).unwrap(), "patched");
        assert!(system.calls().is_empty());
        assert!(matches!(
            f.store.preview_restore(Some("19990101_000000"), &SLOTS),
            Err(FontSwapError::NoBackup { .. })
        ));
    }

    #[test]
    fn failed_snapshot_leaves_nothing_behind() {
        let f = fixture(&SLOTS);
        fs::create_dir(f.fonts.join("nested")).unwrap();
        fs::write(f.fonts.join("nested").join("B.ttf"), "original").unwrap();
        assert!(matches!(
            f.store.snapshot_at(&f.bundle, &["A-Light.ttf", "nested/B.ttf"], at(30)),
            Err(FontSwapError::Io { .. })
        ));
        let leftovers: Vec<_> = fs::read_dir(f.store.root()).unwrap().collect();
        assert!(leftovers.is_empty());
        assert!(f.store.catalog().unwrap().is_empty());
    }
}
