use otspec::types::*;
use otspec::{
    DeserializationError, Deserialize, Deserializer, ReaderContext, SerializationError, Serialize,
    Serializer,
};

/// The 'head' OpenType tag.
pub const TAG: Tag = *b"head";

/// Offset of `checksumAdjustment` within the table.
pub const CHECKSUM_ADJUSTMENT_OFFSET: usize = 8;

const MAGIC: u32 = 0x5F0F3CF5;

/// The font header table.
///
/// `fontRevision` and the two timestamps are kept in their packed forms so an
/// untouched header serializes back to identical bytes.
#[allow(non_snake_case, non_camel_case_types)]
#[derive(Debug, PartialEq, Clone)]
pub struct head {
    pub majorVersion: uint16,
    pub minorVersion: uint16,
    pub fontRevision: i32,
    pub checksumAdjustment: uint32,
    pub magicNumber: uint32,
    pub flags: uint16,
    pub unitsPerEm: uint16,
    pub created: i64,
    pub modified: i64,
    pub xMin: int16,
    pub yMin: int16,
    pub xMax: int16,
    pub yMax: int16,
    pub macStyle: uint16,
    pub lowestRecPPEM: uint16,
    pub fontDirectionHint: int16,
    pub indexToLocFormat: int16,
    pub glyphDataFormat: int16,
}

impl head {
    /// Whether the `loca` table uses 32-bit offsets.
    pub fn loca_is_32bit(&self) -> bool {
        self.indexToLocFormat == 1
    }
}

impl Deserialize for head {
    fn from_bytes(c: &mut ReaderContext) -> Result<Self, DeserializationError> {
        let table = head {
            majorVersion: c.de()?,
            minorVersion: c.de()?,
            fontRevision: c.de()?,
            checksumAdjustment: c.de()?,
            magicNumber: c.de()?,
            flags: c.de()?,
            unitsPerEm: c.de()?,
            created: c.de()?,
            modified: c.de()?,
            xMin: c.de()?,
            yMin: c.de()?,
            xMax: c.de()?,
            yMax: c.de()?,
            macStyle: c.de()?,
            lowestRecPPEM: c.de()?,
            fontDirectionHint: c.de()?,
            indexToLocFormat: c.de()?,
            glyphDataFormat: c.de()?,
        };
        if table.magicNumber != MAGIC {
            return Err(DeserializationError(format!(
                "Bad head magic number {:#x}",
                table.magicNumber
            )));
        }
        if table.unitsPerEm == 0 {
            return Err(DeserializationError("unitsPerEm is zero".to_string()));
        }
        Ok(table)
    }
}

impl Serialize for head {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        data.put(self.majorVersion)?;
        data.put(self.minorVersion)?;
        data.put(self.fontRevision)?;
        data.put(self.checksumAdjustment)?;
        data.put(self.magicNumber)?;
        data.put(self.flags)?;
        data.put(self.unitsPerEm)?;
        data.put(self.created)?;
        data.put(self.modified)?;
        data.put(self.xMin)?;
        data.put(self.yMin)?;
        data.put(self.xMax)?;
        data.put(self.yMax)?;
        data.put(self.macStyle)?;
        data.put(self.lowestRecPPEM)?;
        data.put(self.fontDirectionHint)?;
        data.put(self.indexToLocFormat)?;
        data.put(self.glyphDataFormat)
    }
}

/// Create a new `head` table, given a units-per-em value and the global
/// glyph coordinate maxima/minima.
#[allow(non_snake_case)]
pub fn new(upm: uint16, xMin: int16, yMin: int16, xMax: int16, yMax: int16) -> head {
    head {
        majorVersion: 1,
        minorVersion: 0,
        fontRevision: 0x0001_0000,
        checksumAdjustment: 0x0,
        magicNumber: MAGIC,
        flags: 3,
        unitsPerEm: upm,
        created: 0,
        modified: 0,
        xMin,
        yMin,
        xMax,
        yMax,
        macStyle: 0,
        lowestRecPPEM: 6,
        fontDirectionHint: 2,
        indexToLocFormat: 0,
        glyphDataFormat: 0,
    }
}
