use otspec::types::*;
use otspec::{DeserializationError, Deserializer, ReaderContext, SerializationError, Serializer};
use std::convert::TryInto;

/// The 'loca' OpenType tag.
pub const TAG: Tag = *b"loca";

#[allow(non_snake_case, non_camel_case_types)]
#[derive(Debug, PartialEq, Clone)]
pub struct loca {
    /// Byte offsets into `glyf`, one per glyph plus a final end offset.
    pub offsets: Vec<u32>,
}

impl loca {
    /// The byte range of each glyph within `glyf`; `None` for empty glyphs.
    pub fn ranges(&self) -> Vec<Option<(usize, usize)>> {
        self.offsets
            .windows(2)
            .map(|ab| {
                if ab[0] == ab[1] {
                    None
                } else {
                    Some((ab[0] as usize, ab[1] as usize))
                }
            })
            .collect()
    }

    /// Serialize, returning the bytes and whether the long format was needed.
    ///
    /// The short format stores offsets divided by two, so it is only usable
    /// when every offset is even and the last one fits in 17 bits.
    pub fn to_bytes(&self) -> Result<(Vec<u8>, bool), SerializationError> {
        let last = self.offsets.last().copied().unwrap_or(0);
        let use_long = last > 0x1FFFE || self.offsets.iter().any(|o| o % 2 != 0);
        let mut bytes = vec![];
        for offset in &self.offsets {
            if use_long {
                bytes.put(*offset)?;
            } else {
                let short: u16 = (offset / 2)
                    .try_into()
                    .map_err(|_| SerializationError("loca offset overflow".to_string()))?;
                bytes.put(short)?;
            }
        }
        Ok((bytes, use_long))
    }
}

pub fn from_bytes(
    s: &[u8],
    loca_is_32bit: bool,
    num_glyphs: uint16,
) -> Result<loca, DeserializationError> {
    let mut c = ReaderContext::new(s.to_vec());
    let count = num_glyphs as usize + 1;
    let offsets: Vec<u32> = if loca_is_32bit {
        c.de_counted(count)?
    } else {
        let shorts: Vec<u16> = c.de_counted(count)?;
        shorts.iter().map(|x| (*x as u32) * 2).collect()
    };
    if offsets.windows(2).any(|ab| ab[1] < ab[0]) {
        return Err(DeserializationError(
            "loca offsets are not monotonic".to_string(),
        ));
    }
    Ok(loca { offsets })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loca_de_16bit() {
        let binary_loca = vec![0x00, 0x00, 0x01, 0x30, 0x01, 0x30, 0x01, 0x4c];
        let floca = from_bytes(&binary_loca, false, 3).unwrap();
        assert_eq!(floca.ranges(), vec![Some((0, 608)), None, Some((608, 664))]);
        assert_eq!(floca.to_bytes().unwrap(), (binary_loca, false));
    }

    #[test]
    fn loca_goes_long_when_needed() {
        let floca = loca {
            offsets: vec![0, 3, 0x20000],
        };
        let (bytes, long) = floca.to_bytes().unwrap();
        assert!(long);
        assert_eq!(bytes.len(), 12);
        assert_eq!(from_bytes(&bytes, true, 2).unwrap(), floca);
    }

    #[test]
    fn loca_rejects_backwards_offsets() {
        assert!(from_bytes(&[0x00, 0x04, 0x00, 0x02], false, 1).is_err());
    }
}
