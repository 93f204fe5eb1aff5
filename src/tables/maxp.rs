use otspec::types::*;
use otspec::{
    DeserializationError, Deserialize, Deserializer, ReaderContext, SerializationError, Serialize,
    Serializer,
};

/// The 'maxp' OpenType tag.
pub const TAG: Tag = *b"maxp";

/// A maxp table, regardless of version.
///
/// Only the glyph count is interpreted; the version 1.0 profile fields
/// (point and contour maxima) do not change under uniform scaling and are
/// carried through untouched.
#[allow(non_snake_case, non_camel_case_types)]
#[derive(Debug, PartialEq, Clone)]
pub struct maxp {
    pub version: uint32,
    pub numGlyphs: uint16,
    pub profile: Vec<u8>,
}

impl Deserialize for maxp {
    fn from_bytes(c: &mut ReaderContext) -> Result<Self, DeserializationError> {
        let version: uint32 = c.de()?;
        if version != 0x0000_5000 && version != 0x0001_0000 {
            return Err(DeserializationError(format!(
                "Unknown maxp version {:#x}",
                version
            )));
        }
        Ok(maxp {
            version,
            numGlyphs: c.de()?,
            profile: c.rest(),
        })
    }
}

impl Serialize for maxp {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        data.put(self.version)?;
        data.put(self.numGlyphs)?;
        data.extend_from_slice(&self.profile);
        Ok(())
    }
}
