use crate::utils::{scale_i16, scale_u16};
use otspec::types::*;
use otspec::{
    DeserializationError, Deserialize, Deserializer, ReaderContext, SerializationError, Serialize,
    Serializer,
};

/// The 'hhea' OpenType tag.
pub const TAG: Tag = *b"hhea";

/// The horizontal header table.
#[allow(non_snake_case, non_camel_case_types)]
#[derive(Debug, PartialEq, Clone)]
pub struct hhea {
    pub majorVersion: uint16,
    pub minorVersion: uint16,
    pub ascender: FWORD,
    pub descender: FWORD,
    pub lineGap: FWORD,
    pub advanceWidthMax: UFWORD,
    pub minLeftSideBearing: FWORD,
    pub minRightSideBearing: FWORD,
    pub xMaxExtent: FWORD,
    pub caretSlopeRise: int16,
    pub caretSlopeRun: int16,
    pub caretOffset: int16,
    pub reserved: [int16; 4],
    pub metricDataFormat: int16,
    pub numberOfHMetrics: uint16,
}

impl hhea {
    /// Scale the vertical metrics and the horizontal extrema summaries.
    pub fn scale_metrics(&mut self, factor: f64) {
        self.ascender = scale_i16(self.ascender, factor);
        self.descender = scale_i16(self.descender, factor);
        self.lineGap = scale_i16(self.lineGap, factor);
        self.advanceWidthMax = scale_u16(self.advanceWidthMax, factor);
        self.minLeftSideBearing = scale_i16(self.minLeftSideBearing, factor);
        self.minRightSideBearing = scale_i16(self.minRightSideBearing, factor);
        self.xMaxExtent = scale_i16(self.xMaxExtent, factor);
    }
}

impl Deserialize for hhea {
    fn from_bytes(c: &mut ReaderContext) -> Result<Self, DeserializationError> {
        Ok(hhea {
            majorVersion: c.de()?,
            minorVersion: c.de()?,
            ascender: c.de()?,
            descender: c.de()?,
            lineGap: c.de()?,
            advanceWidthMax: c.de()?,
            minLeftSideBearing: c.de()?,
            minRightSideBearing: c.de()?,
            xMaxExtent: c.de()?,
            caretSlopeRise: c.de()?,
            caretSlopeRun: c.de()?,
            caretOffset: c.de()?,
            reserved: [c.de()?, c.de()?, c.de()?, c.de()?],
            metricDataFormat: c.de()?,
            numberOfHMetrics: c.de()?,
        })
    }
}

impl Serialize for hhea {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        data.put(self.majorVersion)?;
        data.put(self.minorVersion)?;
        data.put(self.ascender)?;
        data.put(self.descender)?;
        data.put(self.lineGap)?;
        data.put(self.advanceWidthMax)?;
        data.put(self.minLeftSideBearing)?;
        data.put(self.minRightSideBearing)?;
        data.put(self.xMaxExtent)?;
        data.put(self.caretSlopeRise)?;
        data.put(self.caretSlopeRun)?;
        data.put(self.caretOffset)?;
        for r in &self.reserved {
            data.put(*r)?;
        }
        data.put(self.metricDataFormat)?;
        data.put(self.numberOfHMetrics)
    }
}
