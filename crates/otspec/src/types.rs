use crate::{ot_round, DeserializationError, Deserialize, Deserializer, ReaderContext};
use crate::{SerializationError, Serialize};
use std::convert::TryInto;

pub type uint16 = u16;
pub type uint32 = u32;
pub type int16 = i16;
pub type FWORD = i16;
pub type UFWORD = u16;

/// A four-byte OpenType table tag.
pub type Tag = [u8; 4];

/// Render a tag for messages, replacing non-printable bytes.
pub fn tag_str(tag: &Tag) -> String {
    tag.iter()
        .map(|&b| if (0x20..=0x7e).contains(&b) { b as char } else { '?' })
        .collect()
}

impl Serialize for Tag {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        data.extend_from_slice(self);
        Ok(())
    }
}

impl Deserialize for Tag {
    fn from_bytes(c: &mut ReaderContext) -> Result<Self, DeserializationError> {
        c.consume(4)?
            .try_into()
            .map_err(|_| DeserializationError("Slice with incorrect length".to_string()))
    }
}

/// A signed 2.14 fixed-point number, as used in composite glyph transforms.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct F2DOT14(pub f32);

impl Serialize for F2DOT14 {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        let packed: i16 = ot_round(self.0 as f64 * 16384.0)
            .try_into()
            .map_err(|_| SerializationError("Value didn't fit into a F2DOT14".to_string()))?;
        packed.to_bytes(data)
    }
}
impl Deserialize for F2DOT14 {
    fn from_bytes(c: &mut ReaderContext) -> Result<Self, DeserializationError> {
        let packed: i16 = c.de()?;
        Ok(F2DOT14(packed as f32 / 16384.0))
    }
}

impl From<f32> for F2DOT14 {
    fn from(num: f32) -> Self {
        Self(num)
    }
}
impl From<F2DOT14> for f32 {
    fn from(num: F2DOT14) -> Self {
        num.0
    }
}
