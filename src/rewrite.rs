//! Renaming a font's identity and uniformly rescaling its em.

use crate::error::{FontSwapError, Result};
use crate::font::{self, Font};
use crate::tables::name::NameRecordID;
use crate::utils::scale_i16;
use otspec::ot_round;
use otspec::types::Tag;
use std::path::{Path, PathBuf};

/// Device-metric caches that no longer describe the outlines after scaling.
const STALE_AFTER_SCALING: [Tag; 3] = [*b"hdmx", *b"LTSH", *b"VDMX"];

const MIN_UNITS_PER_EM: i32 = 16;
const MAX_UNITS_PER_EM: i32 = 16384;

/// One rewrite: which file to read and the identity and size to give it.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteSpec {
    pub source: PathBuf,
    pub target_family: String,
    pub target_subfamily: String,
    /// Values above 1.0 enlarge the rendered glyphs; 1.0 only renames.
    pub scale: f64,
}

impl RewriteSpec {
    pub fn new(
        source: impl Into<PathBuf>,
        target_family: &str,
        target_subfamily: &str,
        scale: f64,
    ) -> Self {
        RewriteSpec {
            source: source.into(),
            target_family: target_family.to_string(),
            target_subfamily: target_subfamily.to_string(),
            scale,
        }
    }

    /// Reject a spec that could never produce a sensible font.
    pub fn validate(&self) -> Result<()> {
        if self.target_family.trim().is_empty() {
            return Err(FontSwapError::InvalidArgument {
                msg: "target family is empty".to_string(),
            });
        }
        if self.target_subfamily.trim().is_empty() {
            return Err(FontSwapError::InvalidArgument {
                msg: "target subfamily is empty".to_string(),
            });
        }
        validate_scale(self.scale)
    }

    /// The full font name, nameID 4.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.target_family, self.target_subfamily)
            .trim()
            .to_string()
    }

    /// The PostScript name, nameID 6.
    pub fn postscript_name(&self) -> String {
        format!("{}-{}", self.target_family, self.target_subfamily).replace(' ', "")
    }
}

/// Scale factors must be positive and finite.
pub fn validate_scale(scale: f64) -> Result<()> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(FontSwapError::InvalidArgument {
            msg: format!("scale factor must be a positive number, not {}", scale),
        });
    }
    Ok(())
}

/// How many name records were changed, and how many had to be left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NameChanges {
    pub rewritten: usize,
    pub skipped: usize,
}

/// Read `spec.source`, rename and rescale it, and write the result to `dest`.
pub fn rewrite(spec: &RewriteSpec, dest: impl AsRef<Path>) -> Result<()> {
    spec.validate()?;
    let dest = dest.as_ref();
    let mut font = font::load(&spec.source)?;
    rewrite_font(&mut font, spec)?;
    font.save(dest)?;
    log::info!(
        "Wrote {} as '{}' to {}",
        spec.source.display(),
        spec.full_name(),
        dest.display()
    );
    Ok(())
}

/// Apply `spec` to a font that is already in memory.
pub fn rewrite_font(font: &mut Font, spec: &RewriteSpec) -> Result<NameChanges> {
    spec.validate()?;
    let changes = rename(font, spec)?;
    if (spec.scale - 1.0).abs() > f64::EPSILON {
        scale(font, spec.scale)?;
    }
    Ok(changes)
}

/// Point every identity record at the target family and subfamily.
///
/// Records whose encoding cannot carry the new string are left as they
/// were; one awkward record does not fail the font.
pub fn rename(font: &mut Font, spec: &RewriteSpec) -> Result<NameChanges> {
    let full_name = spec.full_name();
    let postscript_name = spec.postscript_name();
    let names = font
        .tables
        .name_mut()?
        .ok_or_else(|| FontSwapError::FontFormat {
            msg: "Font has no name table".to_string(),
        })?;

    let mut changes = NameChanges::default();
    for record in names.records.iter_mut() {
        let replacement = match record.nameID {
            x if x == NameRecordID::FontFamilyName as u16 => &spec.target_family,
            x if x == NameRecordID::FontSubfamilyName as u16 => &spec.target_subfamily,
            x if x == NameRecordID::FullFontName as u16 => &full_name,
            x if x == NameRecordID::PostscriptName as u16 => &postscript_name,
            x if x == NameRecordID::PreferredFamilyName as u16 => &spec.target_family,
            x if x == NameRecordID::PreferredSubfamilyName as u16 => &spec.target_subfamily,
            _ => continue,
        };
        match record.set_string(replacement) {
            Ok(()) => changes.rewritten += 1,
            Err(e) => {
                log::debug!(
                    "Leaving name {} (platform {}, encoding {}, language {:#x}) alone: {}",
                    record.nameID,
                    record.platformID,
                    record.encodingID,
                    record.languageID,
                    e
                );
                changes.skipped += 1;
            }
        }
    }
    log::debug!(
        "Renamed to '{}': {} records rewritten, {} skipped",
        full_name,
        changes.rewritten,
        changes.skipped
    );
    Ok(changes)
}

/// The units-per-em that renders a font `scale` times larger.
pub fn scaled_units_per_em(units_per_em: u16, scale: f64) -> Result<u16> {
    validate_scale(scale)?;
    let new_upm = ot_round(units_per_em as f64 / scale);
    if !(MIN_UNITS_PER_EM..=MAX_UNITS_PER_EM).contains(&new_upm) {
        return Err(FontSwapError::InvalidArgument {
            msg: format!(
                "scale factor {} would give unitsPerEm {}, outside {}..={}",
                scale, new_upm, MIN_UNITS_PER_EM, MAX_UNITS_PER_EM
            ),
        });
    }
    Ok(new_upm as u16)
}

/// Check that `font` can be scaled by `scale` without modifying it, and
/// return the units-per-em it would end up with.
pub fn check_scalable(font: &mut Font, scale: f64) -> Result<u16> {
    if !font.has_glyf_outlines() {
        return Err(FontSwapError::FontFormat {
            msg: "Only TrueType (glyf) outlines can be scaled".to_string(),
        });
    }
    let units_per_em = font
        .tables
        .head_mut()?
        .map(|head| head.unitsPerEm)
        .ok_or_else(|| FontSwapError::FontFormat {
            msg: "Font has no head table".to_string(),
        })?;
    scaled_units_per_em(units_per_em, scale)
}

/// Shrink or grow the em by `scale`, then bring every metric and outline
/// coordinate onto the new grid. Returns the new units-per-em.
pub fn scale(font: &mut Font, scale: f64) -> Result<u16> {
    let new_upm = check_scalable(font, scale)?;
    let head = font
        .tables
        .head_mut()?
        .ok_or_else(|| FontSwapError::FontFormat {
            msg: "Font has no head table".to_string(),
        })?;
    let old_upm = head.unitsPerEm;
    if new_upm == old_upm {
        log::info!(
            "Scale {} leaves unitsPerEm at {}; nothing to do",
            scale,
            old_upm
        );
        return Ok(old_upm);
    }
    let factor = new_upm as f64 / old_upm as f64;
    log::info!(
        "Scaling unitsPerEm {} -> {} (coordinates x{:.4})",
        old_upm,
        new_upm,
        factor
    );

    head.unitsPerEm = new_upm;
    head.xMin = scale_i16(head.xMin, factor);
    head.yMin = scale_i16(head.yMin, factor);
    head.xMax = scale_i16(head.xMax, factor);
    head.yMax = scale_i16(head.yMax, factor);

    font.tables
        .hhea_mut()?
        .ok_or_else(|| FontSwapError::FontFormat {
            msg: "Font has no hhea table".to_string(),
        })?
        .scale_metrics(factor);
    if let Some(os2) = font.tables.os2_mut()? {
        os2.scale_metrics(factor);
    }
    if let Some(post) = font.tables.post_mut()? {
        post.scale_metrics(factor);
    }
    font.tables
        .hmtx_mut()?
        .ok_or_else(|| FontSwapError::FontFormat {
            msg: "Font has no hmtx table".to_string(),
        })?
        .scale(factor);
    if let Some(glyf) = font.tables.glyf_mut()? {
        glyf.scale(factor);
    }

    for tag in STALE_AFTER_SCALING.iter() {
        if font.tables.remove(*tag) {
            log::debug!("Dropped stale '{}' table", otspec::types::tag_str(tag));
        }
    }
    Ok(new_upm)
}
