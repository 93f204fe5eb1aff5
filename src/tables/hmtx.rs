use crate::utils::{scale_i16, scale_u16};
use otspec::types::*;
use otspec::{
    DeserializationError, Deserialize, Deserializer, ReaderContext, SerializationError, Serialize,
    Serializer,
};
use std::convert::TryInto;

/// The 'hmtx' OpenType tag.
pub const TAG: Tag = *b"hmtx";

/// A single horizontal metric
#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(non_snake_case)]
pub struct Metric {
    /// The full horizontal advance width of the glyph
    pub advanceWidth: u16,
    /// The left side bearing of the glyph
    pub lsb: int16,
}

impl Deserialize for Metric {
    fn from_bytes(c: &mut ReaderContext) -> Result<Self, DeserializationError> {
        Ok(Metric {
            advanceWidth: c.de()?,
            lsb: c.de()?,
        })
    }
}

impl Serialize for Metric {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        data.put(self.advanceWidth)?;
        data.put(self.lsb)
    }
}

/// The horizontal metrics table
#[derive(Clone, Debug, PartialEq)]
#[allow(non_camel_case_types)]
pub struct hmtx {
    /// The list of metrics, corresponding to the glyph order
    pub metrics: Vec<Metric>,
}

impl hmtx {
    /// Multiply every advance width and left side bearing by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for metric in self.metrics.iter_mut() {
            metric.advanceWidth = scale_u16(metric.advanceWidth, factor);
            metric.lsb = scale_i16(metric.lsb, factor);
        }
    }

    /// Serialize the horizontal metrics table to a binary vector and a corresponding
    /// number of horizontal metrics (to be stored in the `hhea` table)
    pub fn to_bytes(&self) -> Result<(Vec<u8>, uint16), SerializationError> {
        let number_of_hmetrics = self.number_of_hmetrics()?;
        let mut bytes: Vec<u8> = vec![];
        for (i, metric) in self.metrics.iter().enumerate() {
            if i < number_of_hmetrics as usize {
                bytes.put(metric)?;
            } else {
                bytes.put(metric.lsb)?;
            }
        }
        Ok((bytes, number_of_hmetrics))
    }

    /// The number of horizontal metrics (to be stored in the `hhea` table)
    pub fn number_of_hmetrics(&self) -> Result<uint16, SerializationError> {
        let last = match self.metrics.last() {
            Some(metric) => metric.advanceWidth,
            None => return Ok(0),
        };

        let dupe_widths = self
            .metrics
            .iter()
            .rev()
            .skip(1)
            .take_while(|m| m.advanceWidth == last)
            .count();
        (self.metrics.len() - dupe_widths)
            .try_into()
            .map_err(|_| SerializationError("Too many horizontal metrics".to_string()))
    }
}

/// Deserializes a Horizontal Metrics Table given a binary vector, the
/// `numberOfHMetrics` field of the `hhea` table and the glyph count from `maxp`.
pub fn from_bytes(
    c: &mut ReaderContext,
    number_of_h_metrics: uint16,
    num_glyphs: uint16,
) -> Result<hmtx, DeserializationError> {
    if number_of_h_metrics == 0 && num_glyphs > 0 {
        return Err(DeserializationError(
            "Must be one advance width in hmtx!".to_string(),
        ));
    }
    let mut res = hmtx {
        metrics: c.de_counted(number_of_h_metrics.min(num_glyphs).into())?,
    };
    let remaining = num_glyphs.saturating_sub(number_of_h_metrics);
    if remaining > 0 {
        let other_metrics: Vec<int16> = c.de_counted(remaining.into())?;
        let last = res.metrics.last().map(|m| m.advanceWidth).unwrap_or(0);
        res.metrics.extend(other_metrics.iter().map(|x| Metric {
            lsb: *x,
            advanceWidth: last,
        }))
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metric(advance_width: u16, lsb: i16) -> Metric {
        Metric {
            advanceWidth: advance_width,
            lsb,
        }
    }

    #[test]
    fn hmtx_de_16bit() {
        let mut binary_hmtx = otspec::ReaderContext::new(vec![
            0x02, 0xf4, 0x00, 0x05, 0x02, 0xf4, 0x00, 0x05, 0x02, 0x98, 0x00, 0x1e, 0x02, 0xf4,
            0x00, 0x05, 0x00, 0xc8, 0x00, 0x00, 0x02, 0x58, 0x00, 0x1d, 0x02, 0x58, 0x00, 0x1d,
            0x00, 0x0a, 0xff, 0x73,
        ]);
        let fhmtx = super::from_bytes(&mut binary_hmtx, 8, 8).unwrap();
        let metrics = [
            metric(756, 5),
            metric(756, 5),
            metric(664, 30),
            metric(756, 5),
            metric(200, 0),
            metric(600, 29),
            metric(600, 29),
            metric(10, -141),
        ];
        assert_eq!(fhmtx.metrics, metrics);
    }

    #[test]
    fn hmtx_trailing_lsbs_share_last_advance() {
        let mut binary_hmtx =
            otspec::ReaderContext::new(vec![0x01, 0xf4, 0x00, 0x0a, 0x00, 0x14, 0xff, 0xec]);
        let fhmtx = super::from_bytes(&mut binary_hmtx, 1, 3).unwrap();
        assert_eq!(
            fhmtx.metrics,
            vec![metric(500, 10), metric(500, 20), metric(500, -20)]
        );
        let (bytes, count) = fhmtx.to_bytes().unwrap();
        assert_eq!(count, 1);
        assert_eq!(bytes, binary_hmtx.input);
    }

    #[test]
    fn hmtx_truncated_is_an_error() {
        let mut binary_hmtx = otspec::ReaderContext::new(vec![0x01, 0xf4, 0x00]);
        assert!(super::from_bytes(&mut binary_hmtx, 1, 1).is_err());
    }

    #[test]
    fn hmtx_scale() {
        let mut table = hmtx {
            metrics: vec![metric(500, 10), metric(1000, -45)],
        };
        table.scale(0.87);
        assert_eq!(table.metrics, vec![metric(435, 9), metric(870, -39)]);
    }
}
