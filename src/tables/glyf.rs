use crate::tables::loca::loca;
use otspec::types::*;
use otspec::{DeserializationError, Deserializer, ReaderContext, SerializationError, Serializer};

/// Structures for handling components within a composite glyph
pub mod component;
/// A single TrueType outline glyph
pub mod glyph;
/// Points within a contour
pub mod point;

pub use component::{Component, ComponentFlags};
pub use glyph::Glyph;
pub use point::Point;

/// The 'glyf' OpenType tag.
pub const TAG: Tag = *b"glyf";

/// The glyf table
#[derive(Debug, PartialEq, Clone)]
#[allow(non_camel_case_types)]
pub struct glyf {
    /// A list of glyphs, in glyph ID order. Empty glyphs are `Glyph::default()`.
    pub glyphs: Vec<Glyph>,
}

impl glyf {
    /// Multiply every outline coordinate and component offset by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for glyph in self.glyphs.iter_mut() {
            glyph.scale(factor);
        }
    }

    /// Serialize the glyph data, returning it along with the matching `loca`.
    pub fn to_bytes(&self) -> Result<(Vec<u8>, loca), SerializationError> {
        let mut bytes: Vec<u8> = vec![];
        let mut offsets: Vec<u32> = Vec::with_capacity(self.glyphs.len() + 1);
        for glyph in &self.glyphs {
            offsets.push(bytes.len() as u32);
            bytes.put(glyph)?;
            while bytes.len() % 4 != 0 {
                bytes.push(0);
            }
        }
        offsets.push(bytes.len() as u32);
        Ok((bytes, loca { offsets }))
    }
}

/// Deserializes the glyph data given the byte ranges from a `loca` table.
pub fn from_bytes(data: &[u8], locations: &loca) -> Result<glyf, DeserializationError> {
    let mut glyphs = Vec::with_capacity(locations.offsets.len().saturating_sub(1));
    for (gid, range) in locations.ranges().into_iter().enumerate() {
        let glyph = match range {
            None => Glyph::default(),
            Some((start, end)) => {
                if end > data.len() {
                    return Err(DeserializationError(format!(
                        "Glyph {} extends past the end of glyf",
                        gid
                    )));
                }
                let mut c = ReaderContext::new(data[start..end].to_vec());
                c.de().map_err(|e: DeserializationError| {
                    DeserializationError(format!("Glyph {}: {}", gid, e.0))
                })?
            }
        };
        glyphs.push(glyph);
    }
    Ok(glyf { glyphs })
}
