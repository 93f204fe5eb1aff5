use crate::error::{FontSwapError, Result};
use crate::table_store::TableSet;
use crate::tables;
use otspec::types::*;
use otspec::{checksum, DeserializationError, Deserializer, ReaderContext, Serializer};
use std::convert::TryInto;
use std::fs;
use std::path::Path;

/// The magic number stored in the sfnt header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SfntVersion {
    /// TrueType outlines, `0x00010000`
    TrueType = 0x00010000,
    /// Apple's `true` TrueType variant
    AppleTrueType = 0x74727565,
    /// CFF outlines, `OTTO`
    OpenType = 0x4F54544F,
}

impl SfntVersion {
    fn from_u32(version: u32) -> Option<SfntVersion> {
        match version {
            0x00010000 => Some(SfntVersion::TrueType),
            0x74727565 => Some(SfntVersion::AppleTrueType),
            0x4F54544F => Some(SfntVersion::OpenType),
            _ => None,
        }
    }
}

/// An OpenType font file.
#[derive(Debug, PartialEq)]
pub struct Font {
    /// The sfnt container flavour.
    pub sfnt_version: SfntVersion,
    /// The font's tables. See the [`TableSet`] documentation.
    pub tables: TableSet,
}

const CHECKSUM_MAGIC: u32 = 0xB1B0AFBA;

fn log_2(x: u16) -> u16 {
    (15 - x.leading_zeros()) as u16
}

impl Font {
    /// Create a new, empty font.
    pub fn new(sfnt_version: SfntVersion) -> Self {
        Self {
            sfnt_version,
            tables: TableSet::default(),
        }
    }

    /// Returns `true` if the outlines are TrueType (`glyf`) rather than CFF.
    pub fn has_glyf_outlines(&self) -> bool {
        self.tables.contains(&tables::glyf::TAG) && self.tables.contains(&tables::loca::TAG)
    }

    /// Serialize the font, compiling any loaded tables whose binary form
    /// depends on other tables.
    ///
    /// Tables are written in tag order, each padded to four bytes, followed
    /// by the whole-font checksum adjustment in `head`.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.tables.compile_glyf_loca_hmtx()?;
        let num_tables: u16 = self
            .tables
            .len()
            .try_into()
            .map_err(|_| FontSwapError::FontFormat {
                msg: "Too many tables".to_string(),
            })?;
        if num_tables == 0 {
            return Err(FontSwapError::FontFormat {
                msg: "Font has no tables".to_string(),
            });
        }
        let entry_selector = log_2(num_tables);
        let search_range: u16 = 16 * (1 << entry_selector);

        let mut header: Vec<u8> = vec![];
        header.put(self.sfnt_version as u32)?;
        header.put(num_tables)?;
        header.put(search_range)?;
        header.put(entry_selector)?;
        header.put(num_tables * 16 - search_range)?;

        let mut output: Vec<u8> = vec![];
        let mut pos = self.tables.directory_len()?;
        let mut head_offset: Option<usize> = None;
        for tag in self.tables.keys() {
            let mut bytes = vec![];
            self.tables.write_table(tag, &mut bytes)?;
            if tag == tables::head::TAG {
                let adjustment = tables::head::CHECKSUM_ADJUSTMENT_OFFSET;
                if bytes.len() < adjustment + 4 {
                    return Err(FontSwapError::FontFormat {
                        msg: "head table is truncated".to_string(),
                    });
                }
                bytes[adjustment..adjustment + 4].copy_from_slice(&[0; 4]);
                head_offset = Some(pos as usize);
            }
            let orig_len: u32 = bytes.len().try_into().map_err(|_| FontSwapError::FontFormat {
                msg: format!("Table '{}' is too large", tag_str(&tag)),
            })?;
            let orig_checksum = checksum(&bytes);
            while (bytes.len() % 4) != 0 {
                bytes.push(0);
            }
            header.put(tag)?;
            header.put(orig_checksum)?;
            header.put(pos)?;
            header.put(orig_len)?;
            pos += bytes.len() as u32;
            output.extend(bytes);
        }
        header.extend(output);

        if let Some(offset) = head_offset {
            let adjustment = CHECKSUM_MAGIC.wrapping_sub(checksum(&header));
            let at = offset + tables::head::CHECKSUM_ADJUSTMENT_OFFSET;
            header[at..at + 4].copy_from_slice(&adjustment.to_be_bytes());
        }
        Ok(header)
    }

    /// Write the font to a file.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        fs::write(path, bytes).map_err(FontSwapError::io(path))
    }
}

struct TableRecord {
    tag: Tag,
    offset: u32,
    length: u32,
}

/// Parse a font from its binary form.
///
/// Table data is kept unparsed until accessed, except for `head`, which is
/// checked up front so that garbage input is rejected early.
pub fn from_bytes(data: &[u8]) -> Result<Font> {
    let mut c = ReaderContext::new(data.to_vec());
    let version: u32 = c.de()?;
    if version == u32::from_be_bytes(*b"ttcf") {
        return Err(FontSwapError::FontFormat {
            msg: "Font collections are not supported".to_string(),
        });
    }
    let sfnt_version = SfntVersion::from_u32(version).ok_or_else(|| FontSwapError::FontFormat {
        msg: format!("Not an sfnt font (version {:#010x})", version),
    })?;
    let num_tables: u16 = c.de()?;
    c.skip(6);
    let mut records = Vec::with_capacity(num_tables.into());
    for _ in 0..num_tables {
        let tag: Tag = c.de()?;
        let _checksum: u32 = c.de()?;
        records.push(TableRecord {
            tag,
            offset: c.de()?,
            length: c.de()?,
        });
    }

    let mut font = Font::new(sfnt_version);
    for record in records {
        let start = record.offset as usize;
        let end = start + record.length as usize;
        let table_data = data.get(start..end).ok_or_else(|| {
            DeserializationError(format!(
                "Table '{}' at {}..{} lies outside the file",
                tag_str(&record.tag),
                start,
                end
            ))
        })?;
        font.tables.insert_raw(record.tag, table_data);
    }
    if font.tables.head_mut()?.is_none() {
        return Err(FontSwapError::FontFormat {
            msg: "Font has no head table".to_string(),
        });
    }
    Ok(font)
}

/// Read and parse a font file.
pub fn load(path: impl AsRef<Path>) -> Result<Font> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(FontSwapError::io(path))?;
    from_bytes(&data).map_err(|e| match e {
        FontSwapError::FontFormat { msg } => FontSwapError::FontFormat {
            msg: format!("{}: {}", path.display(), msg),
        },
        other => other,
    })
}
