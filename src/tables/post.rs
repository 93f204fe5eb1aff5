#![allow(non_camel_case_types, non_snake_case)]

use crate::utils::scale_i16;
use otspec::types::*;
use otspec::{
    DeserializationError, Deserialize, Deserializer, ReaderContext, SerializationError, Serialize,
    Serializer,
};

/// The 'post' OpenType tag.
pub const TAG: Tag = *b"post";

/// The PostScript table.
///
/// Only the fixed header is interpreted. Whatever follows it (the version 2.0
/// glyph name index and Pascal strings) is kept as raw bytes, since glyph
/// names are unaffected by renaming or scaling.
#[derive(Debug, PartialEq, Clone)]
pub struct post {
    pub version: uint32,
    /// 16.16 fixed-point, stored packed
    pub italicAngle: i32,
    pub underlinePosition: FWORD,
    pub underlineThickness: FWORD,
    pub isFixedPitch: uint32,
    pub minMemType42: uint32,
    pub maxMemType42: uint32,
    pub minMemType1: uint32,
    pub maxMemType1: uint32,
    pub glyph_name_data: Vec<u8>,
}

impl post {
    pub fn scale_metrics(&mut self, factor: f64) {
        self.underlinePosition = scale_i16(self.underlinePosition, factor);
        self.underlineThickness = scale_i16(self.underlineThickness, factor);
    }
}

impl Deserialize for post {
    fn from_bytes(c: &mut ReaderContext) -> Result<Self, DeserializationError> {
        Ok(post {
            version: c.de()?,
            italicAngle: c.de()?,
            underlinePosition: c.de()?,
            underlineThickness: c.de()?,
            isFixedPitch: c.de()?,
            minMemType42: c.de()?,
            maxMemType42: c.de()?,
            minMemType1: c.de()?,
            maxMemType1: c.de()?,
            glyph_name_data: c.rest(),
        })
    }
}

impl Serialize for post {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        data.put(self.version)?;
        data.put(self.italicAngle)?;
        data.put(self.underlinePosition)?;
        data.put(self.underlineThickness)?;
        data.put(self.isFixedPitch)?;
        data.put(self.minMemType42)?;
        data.put(self.maxMemType42)?;
        data.put(self.minMemType1)?;
        data.put(self.maxMemType1)?;
        data.extend_from_slice(&self.glyph_name_data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn post_serde_v2() {
        let binary_post = vec![
            0x00, 0x02, 0x00, 0x00, 0xff, 0xf4, 0x00, 0x00, 0xff, 0x9c, 0x00, 0x32, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x01, 0x02, 0x04, 0x61, 0x62, 0x63,
            0x64,
        ];
        let fpost: post = otspec::de::from_bytes(&binary_post).unwrap();
        assert_eq!(fpost.version, 0x0002_0000);
        assert_eq!(fpost.italicAngle, -12 << 16);
        assert_eq!(fpost.underlinePosition, -100);
        assert_eq!(fpost.underlineThickness, 50);
        assert_eq!(fpost.glyph_name_data.len(), 11);
        assert_eq!(otspec::ser::to_bytes(&fpost).unwrap(), binary_post);
    }

    #[test]
    fn post_scale() {
        let mut fpost = post {
            version: 0x0003_0000,
            italicAngle: 0,
            underlinePosition: -75,
            underlineThickness: 50,
            isFixedPitch: 0,
            minMemType42: 0,
            maxMemType42: 0,
            minMemType1: 0,
            maxMemType1: 0,
            glyph_name_data: vec![],
        };
        fpost.scale_metrics(0.87);
        assert_eq!(fpost.underlinePosition, -65);
        assert_eq!(fpost.underlineThickness, 44);
    }
}
