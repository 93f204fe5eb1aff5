//! Installing prepared fonts into the bundle and repairing its signature.

use crate::error::{FontSwapError, Result};
use crate::system::{self, SystemFacade};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// What to do with a bundle's code signature once its contents changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignaturePolicy {
    /// Remove the signature entirely.
    Strip,
    /// Re-sign without an identity.
    AdHoc,
    /// Leave the (now invalid) signature alone.
    Skip,
}

impl SignaturePolicy {
    pub const ALL: [SignaturePolicy; 3] = [
        SignaturePolicy::Strip,
        SignaturePolicy::AdHoc,
        SignaturePolicy::Skip,
    ];
}

impl FromStr for SignaturePolicy {
    type Err = FontSwapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strip" => Ok(SignaturePolicy::Strip),
            "adhoc" | "ad-hoc" => Ok(SignaturePolicy::AdHoc),
            "skip" => Ok(SignaturePolicy::Skip),
            other => Err(FontSwapError::InvalidArgument {
                msg: format!(
                    "Unknown signature policy '{}' (expected strip, adhoc or skip)",
                    other
                ),
            }),
        }
    }
}

impl fmt::Display for SignaturePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignaturePolicy::Strip => "strip",
            SignaturePolicy::AdHoc => "adhoc",
            SignaturePolicy::Skip => "skip",
        })
    }
}

/// A rewritten font waiting to be copied over its slot.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedFile {
    pub slot: &'static str,
    pub path: PathBuf,
}

pub struct Applier<'a> {
    system: &'a dyn SystemFacade,
}

impl<'a> Applier<'a> {
    pub fn new(system: &'a dyn SystemFacade) -> Self {
        Applier { system }
    }

    /// Copy every prepared file into `fonts_dir`. A file that cannot be
    /// copied does not stop the others; the failures are reported together
    /// afterwards and nothing already copied is rolled back.
    pub fn install(&self, fonts_dir: &Path, prepared: &[PreparedFile]) -> Result<Vec<&'static str>> {
        let mut installed = vec![];
        let mut failures = vec![];
        for file in prepared {
            let dest = fonts_dir.join(file.slot);
            match system::copy_file(self.system, &file.path, &dest) {
                Ok(()) => {
                    log::info!("Installed {}", file.slot);
                    installed.push(file.slot);
                }
                Err(e) => {
                    log::warn!("Could not install {}: {}", file.slot, e);
                    failures.push(file.slot);
                }
            }
        }
        if failures.is_empty() {
            Ok(installed)
        } else {
            Err(FontSwapError::InstallPermission {
                path: fonts_dir.to_path_buf(),
                msg: format!(
                    "{} of {} fonts failed ({}); run with --revert to undo the rest",
                    failures.len(),
                    prepared.len(),
                    failures.join(", ")
                ),
            })
        }
    }

    /// Deal with the bundle's code signature, asking `choose` for a policy
    /// only if there is one. The quarantine flag is cleared afterwards even
    /// when signing failed; that error is returned once it has been tried.
    pub fn repair_signature(
        &self,
        bundle: &Path,
        choose: &dyn Fn() -> SignaturePolicy,
    ) -> Result<Option<SignaturePolicy>> {
        let signed = self.apply_policy(bundle, choose);
        if let Err(e) = self.system.clear_quarantine(bundle) {
            log::warn!("Could not clear quarantine flag: {}", e);
        }
        signed
    }

    fn apply_policy(
        &self,
        bundle: &Path,
        choose: &dyn Fn() -> SignaturePolicy,
    ) -> Result<Option<SignaturePolicy>> {
        if !self.system.has_signature(bundle)? {
            log::info!("{} is not signed", bundle.display());
            return Ok(None);
        }
        let policy = choose();
        match policy {
            SignaturePolicy::Strip => {
                log::info!("Removing code signature from {}", bundle.display());
                self.system.strip_signature(bundle)?;
            }
            SignaturePolicy::AdHoc => {
                log::info!("Re-signing {} ad-hoc", bundle.display());
                self.system.ad_hoc_sign(bundle)?;
            }
            SignaturePolicy::Skip => {
                log::warn!(
                    "Leaving the signature of {} as is; the application may refuse to start",
                    bundle.display()
                );
            }
        }
        Ok(Some(policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeSystem;
    use std::fs;

    fn prepared(dir: &Path, slots: &[&'static str]) -> Vec<PreparedFile> {
        slots
            .iter()
            .map(|&slot| {
                let path = dir.join(format!("prepared-{}", slot));
                fs::write(&path, format!("new {}", slot)).unwrap();
                PreparedFile { slot, path }
            })
            .collect()
    }

    #[test]
    fn policy_parsing() {
        assert_eq!("strip".parse::<SignaturePolicy>().unwrap(), SignaturePolicy::Strip);
        assert_eq!("AdHoc".parse::<SignaturePolicy>().unwrap(), SignaturePolicy::AdHoc);
        assert_eq!("ad-hoc".parse::<SignaturePolicy>().unwrap(), SignaturePolicy::AdHoc);
        assert_eq!(" skip\n".parse::<SignaturePolicy>().unwrap(), SignaturePolicy::Skip);
        assert!(matches!(
            "resign".parse::<SignaturePolicy>(),
            Err(FontSwapError::InvalidArgument { .. })
        ));
        for policy in SignaturePolicy::ALL.iter() {
            assert_eq!(policy.to_string().parse::<SignaturePolicy>().unwrap(), *policy);
        }
    }

    #[test]
    fn install_copies_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let fonts = dir.path().join("Fonts");
        fs::create_dir(&fonts).unwrap();
        fs::write(fonts.join("A.ttf"), "old").unwrap();
        let files = prepared(dir.path(), &["A.ttf", "B.ttf"]);
        let system = FakeSystem::default();
        let installed = Applier::new(&system).install(&fonts, &files).unwrap();
        assert_eq!(installed, vec!["A.ttf", "B.ttf"]);
        assert_eq!(fs::read_to_string(fonts.join("A.ttf")).unwrap(), "new A.ttf");
        assert_eq!(fs::read_to_string(fonts.join("B.ttf")).unwrap(), "new B.ttf");
    }

    #[test]
    fn failures_do_not_stop_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let fonts = dir.path().join("Fonts");
        fs::create_dir(&fonts).unwrap();
        let mut files = prepared(dir.path(), &["A.ttf", "C.ttf"]);
        files.insert(
            1,
            PreparedFile {
                slot: "B.ttf",
                path: dir.path().join("never-prepared.ttf"),
            },
        );
        let system = FakeSystem::default();
        match Applier::new(&system).install(&fonts, &files) {
            Err(FontSwapError::InstallPermission { msg, .. }) => {
                assert!(msg.contains("B.ttf"));
                assert!(msg.starts_with("1 of 3"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(fonts.join("A.ttf").exists());
        assert!(fonts.join("C.ttf").exists());
    }

    #[test]
    fn refused_escalation_does_not_stop_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let fonts = dir.path().join("Fonts");
        fs::create_dir(&fonts).unwrap();
        for slot in &["A.ttf", "B.ttf", "C.ttf"] {
            fs::write(fonts.join(slot), "old").unwrap();
        }
        let files = prepared(dir.path(), &["A.ttf", "B.ttf", "C.ttf"]);
        let system = FakeSystem {
            read_only: vec![fonts.join("B.ttf")],
            refuse_privileges: true,
            ..Default::default()
        };
        match Applier::new(&system).install(&fonts, &files) {
            Err(FontSwapError::InstallPermission { msg, .. }) => {
                assert!(msg.starts_with("1 of 3"));
                assert!(msg.contains("B.ttf"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            system.calls(),
            vec![format!("copy_privileged {}", fonts.join("B.ttf").display())]
        );
        assert_eq!(fs::read_to_string(fonts.join("A.ttf")).unwrap(), "new A.ttf");
        assert_eq!(fs::read_to_string(fonts.join("B.ttf")).unwrap(), "old");
        assert_eq!(fs::read_to_string(fonts.join("C.ttf")).unwrap(), "new C.ttf");
    }

    #[test]
    fn unsigned_bundle_is_not_asked_about() {
        let system = FakeSystem::default();
        let bundle = Path::new("/Applications/Live.app");
        let policy = Applier::new(&system)
            .repair_signature(bundle, &|| -> SignaturePolicy { panic!("should not ask") })
            .unwrap();
        assert_eq!(policy, None);
        assert_eq!(
            system.calls(),
            vec![
                "has_signature /Applications/Live.app",
                "clear_quarantine /Applications/Live.app",
            ]
        );
    }

    #[test]
    fn signed_bundle_follows_the_policy() {
        let bundle = Path::new("/Applications/Live.app");
        for (policy, call) in &[
            (SignaturePolicy::Strip, Some("strip_signature /Applications/Live.app")),
            (SignaturePolicy::AdHoc, Some("ad_hoc_sign /Applications/Live.app")),
            (SignaturePolicy::Skip, None),
        ] {
            let system = FakeSystem {
                signed: true,
                ..Default::default()
            };
            let chosen = Applier::new(&system)
                .repair_signature(bundle, &|| *policy)
                .unwrap();
            assert_eq!(chosen, Some(*policy));
            let calls = system.calls();
            assert_eq!(calls.len(), if call.is_some() { 3 } else { 2 });
            if let Some(call) = call {
                assert_eq!(calls[1], *call);
            }
            assert_eq!(calls.last().unwrap(), "clear_quarantine /Applications/Live.app");
        }
    }

    #[test]
    fn quarantine_failure_is_not_fatal() {
        let system = FakeSystem {
            quarantine_unsupported: true,
            ..Default::default()
        };
        assert!(Applier::new(&system)
            .repair_signature(Path::new("/Live.app"), &|| SignaturePolicy::AdHoc)
            .is_ok());
    }

    #[test]
    fn quarantine_is_cleared_when_signing_fails() {
        let bundle = Path::new("/Applications/Live.app");
        for policy in &[SignaturePolicy::Strip, SignaturePolicy::AdHoc] {
            let system = FakeSystem {
                signed: true,
                signing_fails: true,
                ..Default::default()
            };
            let result = Applier::new(&system).repair_signature(bundle, &|| *policy);
            assert!(matches!(result, Err(FontSwapError::InstallPermission { .. })));
            assert_eq!(
                system.calls().last().unwrap(),
                "clear_quarantine /Applications/Live.app"
            );
        }
    }
}
