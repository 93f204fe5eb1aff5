#![allow(non_camel_case_types, non_snake_case)]

use crate::utils::{scale_i16, scale_u16};
use otspec::types::*;
use otspec::{
    DeserializationError, Deserialize, Deserializer, ReaderContext, SerializationError, Serialize,
    Serializer,
};

/// The 'OS/2' OpenType tag.
pub const TAG: Tag = *b"OS/2";

/// The OS/2 and Windows metrics table.
///
/// Fields added in later versions are `Option`s; they are present exactly when
/// the table's `version` calls for them.
#[derive(Debug, PartialEq, Clone)]
pub struct os2 {
    pub version: uint16,
    pub xAvgCharWidth: int16,
    pub usWeightClass: uint16,
    pub usWidthClass: uint16,
    pub fsType: uint16,
    pub ySubscriptXSize: int16,
    pub ySubscriptYSize: int16,
    pub ySubscriptXOffset: int16,
    pub ySubscriptYOffset: int16,
    pub ySuperscriptXSize: int16,
    pub ySuperscriptYSize: int16,
    pub ySuperscriptXOffset: int16,
    pub ySuperscriptYOffset: int16,
    pub yStrikeoutSize: int16,
    pub yStrikeoutPosition: int16,
    pub sFamilyClass: int16,
    pub panose: [u8; 10],
    pub ulUnicodeRange1: uint32,
    pub ulUnicodeRange2: uint32,
    pub ulUnicodeRange3: uint32,
    pub ulUnicodeRange4: uint32,
    pub achVendID: Tag,
    pub fsSelection: uint16,
    pub usFirstCharIndex: uint16,
    pub usLastCharIndex: uint16,
    pub sTypoAscender: int16,
    pub sTypoDescender: int16,
    pub sTypoLineGap: int16,
    pub usWinAscent: uint16,
    pub usWinDescent: uint16,
    pub ulCodePageRange1: Option<uint32>,
    pub ulCodePageRange2: Option<uint32>,
    pub sxHeight: Option<int16>,
    pub sCapHeight: Option<int16>,
    pub usDefaultChar: Option<uint16>,
    pub usBreakChar: Option<uint16>,
    pub usMaxContext: Option<uint16>,
    pub usLowerOpticalPointSize: Option<uint16>,
    pub usUpperOpticalPointSize: Option<uint16>,
}

impl os2 {
    /// Scale the vertical metrics that describe the em.
    ///
    /// `usWinAscent` cannot go below zero, and `usWinDescent` is stored as
    /// the magnitude of the scaled value whatever sign convention the source
    /// used.
    pub fn scale_metrics(&mut self, factor: f64) {
        self.sTypoAscender = scale_i16(self.sTypoAscender, factor);
        self.sTypoDescender = scale_i16(self.sTypoDescender, factor);
        self.sTypoLineGap = scale_i16(self.sTypoLineGap, factor);
        self.usWinAscent = scale_u16(self.usWinAscent, factor);
        self.usWinDescent = scale_u16(self.win_descent_magnitude(), factor);
        if let Some(x_height) = self.sxHeight.as_mut() {
            *x_height = scale_i16(*x_height, factor);
        }
        if let Some(cap_height) = self.sCapHeight.as_mut() {
            *cap_height = scale_i16(*cap_height, factor);
        }
    }
}

impl os2 {
    /// The size of the Windows descent. Some producers store it as a
    /// negative `int16`; a value with the top bit set is read that way only
    /// when the result is no larger than the font's other vertical extents.
    fn win_descent_magnitude(&self) -> u16 {
        let stored = self.usWinDescent;
        let as_signed = stored as i16;
        if as_signed >= 0 {
            return stored;
        }
        let magnitude = as_signed.unsigned_abs();
        let extent = self
            .usWinAscent
            .max(self.sTypoAscender.unsigned_abs())
            .max(self.sTypoDescender.unsigned_abs());
        if magnitude <= extent {
            magnitude
        } else {
            stored
        }
    }
}

impl Deserialize for os2 {
    fn from_bytes(c: &mut ReaderContext) -> Result<Self, DeserializationError> {
        let version: uint16 = c.de()?;
        let mut table = os2 {
            version,
            xAvgCharWidth: c.de()?,
            usWeightClass: c.de()?,
            usWidthClass: c.de()?,
            fsType: c.de()?,
            ySubscriptXSize: c.de()?,
            ySubscriptYSize: c.de()?,
            ySubscriptXOffset: c.de()?,
            ySubscriptYOffset: c.de()?,
            ySuperscriptXSize: c.de()?,
            ySuperscriptYSize: c.de()?,
            ySuperscriptXOffset: c.de()?,
            ySuperscriptYOffset: c.de()?,
            yStrikeoutSize: c.de()?,
            yStrikeoutPosition: c.de()?,
            sFamilyClass: c.de()?,
            panose: {
                let bytes: Vec<u8> = c.de_counted(10)?;
                let mut panose = [0u8; 10];
                panose.copy_from_slice(&bytes);
                panose
            },
            ulUnicodeRange1: c.de()?,
            ulUnicodeRange2: c.de()?,
            ulUnicodeRange3: c.de()?,
            ulUnicodeRange4: c.de()?,
            achVendID: c.de()?,
            fsSelection: c.de()?,
            usFirstCharIndex: c.de()?,
            usLastCharIndex: c.de()?,
            sTypoAscender: c.de()?,
            sTypoDescender: c.de()?,
            sTypoLineGap: c.de()?,
            usWinAscent: c.de()?,
            usWinDescent: c.de()?,
            ulCodePageRange1: None,
            ulCodePageRange2: None,
            sxHeight: None,
            sCapHeight: None,
            usDefaultChar: None,
            usBreakChar: None,
            usMaxContext: None,
            usLowerOpticalPointSize: None,
            usUpperOpticalPointSize: None,
        };
        if version > 0 {
            table.ulCodePageRange1 = Some(c.de()?);
            table.ulCodePageRange2 = Some(c.de()?);
        }
        if version > 1 {
            table.sxHeight = Some(c.de()?);
            table.sCapHeight = Some(c.de()?);
            table.usDefaultChar = Some(c.de()?);
            table.usBreakChar = Some(c.de()?);
            table.usMaxContext = Some(c.de()?);
        }
        if version > 4 {
            table.usLowerOpticalPointSize = Some(c.de()?);
            table.usUpperOpticalPointSize = Some(c.de()?);
        }
        Ok(table)
    }
}

fn put_tail<T: Serialize + Copy>(
    data: &mut Vec<u8>,
    field: Option<T>,
    name: &str,
    version: uint16,
) -> Result<(), SerializationError> {
    let value = field.ok_or_else(|| {
        SerializationError(format!("OS/2 version {} needs a value for {}", version, name))
    })?;
    data.put(value)
}

impl Serialize for os2 {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        data.put(self.version)?;
        data.put(self.xAvgCharWidth)?;
        data.put(self.usWeightClass)?;
        data.put(self.usWidthClass)?;
        data.put(self.fsType)?;
        data.put(self.ySubscriptXSize)?;
        data.put(self.ySubscriptYSize)?;
        data.put(self.ySubscriptXOffset)?;
        data.put(self.ySubscriptYOffset)?;
        data.put(self.ySuperscriptXSize)?;
        data.put(self.ySuperscriptYSize)?;
        data.put(self.ySuperscriptXOffset)?;
        data.put(self.ySuperscriptYOffset)?;
        data.put(self.yStrikeoutSize)?;
        data.put(self.yStrikeoutPosition)?;
        data.put(self.sFamilyClass)?;
        data.extend_from_slice(&self.panose);
        data.put(self.ulUnicodeRange1)?;
        data.put(self.ulUnicodeRange2)?;
        data.put(self.ulUnicodeRange3)?;
        data.put(self.ulUnicodeRange4)?;
        data.put(self.achVendID)?;
        data.put(self.fsSelection)?;
        data.put(self.usFirstCharIndex)?;
        data.put(self.usLastCharIndex)?;
        data.put(self.sTypoAscender)?;
        data.put(self.sTypoDescender)?;
        data.put(self.sTypoLineGap)?;
        data.put(self.usWinAscent)?;
        data.put(self.usWinDescent)?;
        let v = self.version;
        if v > 0 {
            put_tail(data, self.ulCodePageRange1, "ulCodePageRange1", v)?;
            put_tail(data, self.ulCodePageRange2, "ulCodePageRange2", v)?;
        }
        if v > 1 {
            put_tail(data, self.sxHeight, "sxHeight", v)?;
            put_tail(data, self.sCapHeight, "sCapHeight", v)?;
            put_tail(data, self.usDefaultChar, "usDefaultChar", v)?;
            put_tail(data, self.usBreakChar, "usBreakChar", v)?;
            put_tail(data, self.usMaxContext, "usMaxContext", v)?;
        }
        if v > 4 {
            put_tail(data, self.usLowerOpticalPointSize, "usLowerOpticalPointSize", v)?;
            put_tail(data, self.usUpperOpticalPointSize, "usUpperOpticalPointSize", v)?;
        }
        Ok(())
    }
}
