#![allow(non_camel_case_types, non_snake_case)]

use encoding::all::{
    ASCII, BIG5_2003, GBK, ISO_8859_1, MAC_CYRILLIC, MAC_ROMAN, UTF_16BE, WINDOWS_31J,
    WINDOWS_949,
};
use encoding::{DecoderTrap, EncoderTrap, Encoding, EncodingRef};
use otspec::types::*;
use otspec::{
    DeserializationError, Deserialize, Deserializer, ReaderContext, SerializationError, Serialize,
    Serializer,
};
use std::convert::TryInto;

/// The 'name' OpenType tag.
pub const TAG: Tag = *b"name";

/// Pick the codec for a platform/encoding pair, if we know one.
fn get_encoding(platform_id: u16, encoding_id: u16) -> Option<EncodingRef> {
    match (platform_id, encoding_id) {
        (0, _) => Some(UTF_16BE),
        (1, 0) => Some(MAC_ROMAN),
        (1, 7) => Some(MAC_CYRILLIC),
        (2, 0) => Some(ASCII),
        (2, 1) => Some(UTF_16BE),
        (2, 2) => Some(ISO_8859_1),
        (3, 0) | (3, 1) | (3, 10) => Some(UTF_16BE),
        (3, 2) => Some(WINDOWS_31J),
        (3, 3) => Some(GBK),
        (3, 4) => Some(BIG5_2003),
        (3, 5) => Some(WINDOWS_949),
        _ => None,
    }
}

/// Descriptive names of the name table nameID entries this crate touches.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NameRecordID {
    /// Font Family name
    FontFamilyName = 1,
    /// Font Subfamily name
    FontSubfamilyName = 2,
    /// Unique font identifier
    UniqueID = 3,
    /// Full font name that reflects all family and relevant subfamily descriptors
    FullFontName = 4,
    /// PostScript name for the font
    PostscriptName = 6,
    /// Typographic Family name
    PreferredFamilyName = 16,
    /// Typographic Subfamily name
    PreferredSubfamilyName = 17,
}

impl From<NameRecordID> for u16 {
    fn from(namerecord: NameRecordID) -> u16 {
        namerecord as u16
    }
}

/// Why a string could not be stored in a record.
#[derive(Debug, Clone, PartialEq)]
pub enum NameEncodingError {
    /// No codec is known for this platform/encoding pair.
    UnknownEncoding { platformID: uint16, encodingID: uint16 },
    /// The codec cannot represent some character of the string.
    Unrepresentable(String),
}

impl std::fmt::Display for NameEncodingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameEncodingError::UnknownEncoding {
                platformID,
                encodingID,
            } => write!(f, "no codec for platform {} encoding {}", platformID, encodingID),
            NameEncodingError::Unrepresentable(why) => write!(f, "cannot encode: {}", why),
        }
    }
}

/// A single name record inside the name table.
///
/// The string is held in its encoded form so records nobody edits are
/// written back exactly as they were read.
#[derive(Debug, PartialEq, Clone)]
pub struct NameRecord {
    /// Platform ID (0=Unicode, 1=Macintosh, 3=Windows)
    pub platformID: uint16,
    /// Identifier for encoding of string content. Platform-specific.
    pub encodingID: uint16,
    /// Identifier for language of string content. Platform-specific.
    pub languageID: uint16,
    /// The numeric identifier representing the type of data. See NameRecordID.
    pub nameID: uint16,
    /// The encoded string
    pub data: Vec<u8>,
}

impl NameRecord {
    /// Create a new name record for the Windows platform in Unicode encoding
    /// (3,1,0x409)
    pub fn windows_unicode<T>(n: T, s: &str) -> NameRecord
    where
        T: Into<u16>,
    {
        let mut record = NameRecord {
            platformID: 3,
            encodingID: 1,
            languageID: 0x409,
            nameID: n.into(),
            data: vec![],
        };
        record.data = UTF_16BE
            .encode(s, EncoderTrap::Replace)
            .unwrap_or_default();
        record
    }

    /// Create a new name record for the Macintosh platform in Roman encoding
    /// (1,0,0)
    pub fn mac_roman<T>(n: T, s: &str) -> NameRecord
    where
        T: Into<u16>,
    {
        NameRecord {
            platformID: 1,
            encodingID: 0,
            languageID: 0,
            nameID: n.into(),
            data: MAC_ROMAN
                .encode(s, EncoderTrap::Replace)
                .unwrap_or_default(),
        }
    }

    /// Decode the record's string, if its encoding is known.
    pub fn string(&self) -> Option<String> {
        get_encoding(self.platformID, self.encodingID)
            .and_then(|enc| enc.decode(&self.data, DecoderTrap::Replace).ok())
    }

    /// Replace the record's string.
    ///
    /// Fails, leaving the record untouched, when the record's encoding is
    /// unknown or cannot represent every character of `s`.
    pub fn set_string(&mut self, s: &str) -> Result<(), NameEncodingError> {
        let encoder = get_encoding(self.platformID, self.encodingID).ok_or(
            NameEncodingError::UnknownEncoding {
                platformID: self.platformID,
                encodingID: self.encodingID,
            },
        )?;
        self.data = encoder
            .encode(s, EncoderTrap::Strict)
            .map_err(|e| NameEncodingError::Unrepresentable(e.into_owned()))?;
        Ok(())
    }
}

/// Represents a font's name (Naming) table
#[derive(Debug, PartialEq, Clone)]
pub struct name {
    pub format: uint16,
    pub records: Vec<NameRecord>,
    /// Format 1 language-tag strings, still encoded as UTF-16BE.
    pub lang_tags: Vec<Vec<u8>>,
}

impl name {
    /// The decoded string for the first record with this nameID, preferring
    /// Windows Unicode records.
    pub fn get<T: Into<u16>>(&self, n: T) -> Option<String> {
        let n = n.into();
        self.records
            .iter()
            .filter(|r| r.nameID == n)
            .min_by_key(|r| if r.platformID == 3 { 0 } else { 1 })
            .and_then(|r| r.string())
    }
}

fn slice_pool<'a>(
    pool: &'a [u8],
    offset: uint16,
    length: uint16,
) -> Result<&'a [u8], DeserializationError> {
    let start = offset as usize;
    let end = start + length as usize;
    pool.get(start..end).ok_or_else(|| {
        DeserializationError(format!(
            "name string at {}..{} lies outside the string pool",
            start, end
        ))
    })
}

impl Deserialize for name {
    fn from_bytes(c: &mut ReaderContext) -> Result<Self, DeserializationError> {
        let format: uint16 = c.de()?;
        if format > 1 {
            return Err(DeserializationError(format!(
                "Unknown name table format {}",
                format
            )));
        }
        let count: uint16 = c.de()?;
        let storage_offset: uint16 = c.de()?;
        let mut internal_records = Vec::with_capacity(count.into());
        for _ in 0..count {
            let record: [uint16; 6] = [c.de()?, c.de()?, c.de()?, c.de()?, c.de()?, c.de()?];
            internal_records.push(record);
        }
        let mut lang_tag_locations: Vec<(uint16, uint16)> = vec![];
        if format == 1 {
            let lang_tag_count: uint16 = c.de()?;
            for _ in 0..lang_tag_count {
                lang_tag_locations.push((c.de()?, c.de()?));
            }
        }
        c.seek(storage_offset as usize)?;
        let pool = c.rest();

        let mut records: Vec<NameRecord> = Vec::with_capacity(count.into());
        for [platformID, encodingID, languageID, nameID, length, offset] in internal_records {
            records.push(NameRecord {
                platformID,
                encodingID,
                languageID,
                nameID,
                data: slice_pool(&pool, offset, length)?.to_vec(),
            })
        }
        let lang_tags = lang_tag_locations
            .into_iter()
            .map(|(length, offset)| slice_pool(&pool, offset, length).map(|s| s.to_vec()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(name {
            format,
            records,
            lang_tags,
        })
    }
}

fn pool_offset(len: usize) -> Result<uint16, SerializationError> {
    len.try_into()
        .map_err(|_| SerializationError("name string pool exceeds 64K".to_string()))
}

impl Serialize for name {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        let mut string_pool: Vec<u8> = Vec::new();
        let format = if self.lang_tags.is_empty() { 0 } else { 1 };
        let mut header_len = 6 + 12 * self.records.len();
        if format == 1 {
            header_len += 2 + 4 * self.lang_tags.len();
        }
        data.put(format as uint16)?;
        data.put(pool_offset(self.records.len())?)?;
        data.put(pool_offset(header_len)?)?;
        for record in &self.records {
            data.put(record.platformID)?;
            data.put(record.encodingID)?;
            data.put(record.languageID)?;
            data.put(record.nameID)?;
            data.put(pool_offset(record.data.len())?)?;
            data.put(pool_offset(string_pool.len())?)?;
            string_pool.extend(&record.data);
        }
        if format == 1 {
            data.put(pool_offset(self.lang_tags.len())?)?;
            for tag in &self.lang_tags {
                data.put(pool_offset(tag.len())?)?;
                data.put(pool_offset(string_pool.len())?)?;
                string_pool.extend(tag);
            }
        }
        data.put(string_pool)
    }
}
