//! Replace Ableton Live's interface fonts with Atkinson Hyperlegible, keeping
//! backups so the originals can be put back.
//!
//! The pieces, from the bottom up:
//!
//! * [`font`] and [`tables`] read and write the sfnt tables that need changing;
//! * [`rewrite`] renames a font and optionally rescales its em;
//! * [`backup`] takes and restores timestamped snapshots of the installed fonts;
//! * [`apply`] copies prepared fonts into the bundle and deals with its signature;
//! * [`orchestrate`] runs the install, revert and list flows.

pub mod apply;
pub mod backup;
pub mod config;
pub mod download;
mod error;
pub mod font;
pub mod orchestrate;
pub mod rewrite;
pub mod slots;
pub mod system;
pub mod table_store;
pub mod tables;
mod utils;

#[cfg(test)]
mod fakes;
#[cfg(test)]
mod testfont;

pub use crate::apply::SignaturePolicy;
pub use crate::backup::{BackupStore, Catalog, RestoreReport, SnapshotRecord};
pub use crate::config::Config;
pub use crate::download::{Downloader, HttpDownloader};
pub use crate::error::{FontSwapError, Result};
pub use crate::orchestrate::{GlyphSource, InstallOutcome, Orchestrator};
pub use crate::rewrite::{rewrite, RewriteSpec};
pub use crate::system::{MacSystem, SystemFacade};
