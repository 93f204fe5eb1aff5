use super::component::{Component, ComponentFlags};
use super::point::Point;
use crate::utils::scale_i16;
use bitflags::bitflags;
use itertools::izip;
use otspec::types::*;
use otspec::{
    DeserializationError, Deserialize, Deserializer, ReaderContext, SerializationError, Serialize,
    Serializer,
};

bitflags! {
    struct SimpleGlyphFlags: u8 {
        const ON_CURVE_POINT = 0x01;
        const X_SHORT_VECTOR = 0x02;
        const Y_SHORT_VECTOR = 0x04;
        const REPEAT_FLAG = 0x08;
        const X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR = 0x10;
        const Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR = 0x20;
        const OVERLAP_SIMPLE = 0x40;
        const RESERVED = 0x80;
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
#[allow(non_snake_case)]
/// A higher-level representation of a TrueType outline glyph.
pub struct Glyph {
    /// The minimum X coordinate of points (including transformed component points) within this glyph
    pub xMin: int16,
    /// The maximum X coordinate of points (including transformed component points) within this glyph
    pub xMax: int16,
    /// The minimum Y coordinate of points (including transformed component points) within this glyph
    pub yMin: int16,
    /// The maximum Y coordinate of points (including transformed component points) within this glyph
    pub yMax: int16,
    /// A list of contours, each contour represented as a list of `Point` objects.
    pub contours: Vec<Vec<Point>>,
    /// Truetype instructions (binary)
    pub instructions: Vec<u8>,
    /// A vector of components
    pub components: Vec<Component>,
    /// A flag used in the low-level glyph representation to determine if this
    /// glyph has overlaps.
    pub overlap: bool,
}

fn read_coordinates(
    c: &mut ReaderContext,
    flags: &[SimpleGlyphFlags],
    short: SimpleGlyphFlags,
    same_or_positive: SimpleGlyphFlags,
) -> Result<Vec<int16>, DeserializationError> {
    let mut coords = Vec::with_capacity(flags.len());
    let mut last = 0_i16;
    for flag in flags {
        if flag.contains(short) {
            let delta: u8 = c.de()?;
            if flag.contains(same_or_positive) {
                last = last.wrapping_add(delta as i16);
            } else {
                last = last.wrapping_sub(delta as i16);
            }
        } else if !flag.contains(same_or_positive) {
            let delta: i16 = c.de()?;
            last = last.wrapping_add(delta);
        }
        coords.push(last);
    }
    Ok(coords)
}

impl Deserialize for Glyph {
    fn from_bytes(c: &mut ReaderContext) -> Result<Self, DeserializationError> {
        let num_contours: i16 = c.de()?;
        let mut glyph = Glyph {
            xMin: c.de()?,
            yMin: c.de()?,
            xMax: c.de()?,
            yMax: c.de()?,
            ..Default::default()
        };
        if num_contours < 0 {
            let mut has_instructions = false;
            loop {
                let comp: Component = c.de()?;
                let has_more = comp.flags.contains(ComponentFlags::MORE_COMPONENTS);
                if comp.flags.contains(ComponentFlags::OVERLAP_COMPOUND) {
                    glyph.overlap = true;
                }
                if comp.flags.contains(ComponentFlags::WE_HAVE_INSTRUCTIONS) {
                    has_instructions = true;
                }
                glyph.components.push(comp);
                if !has_more {
                    break;
                }
            }
            if has_instructions {
                let instructions_count: u16 = c.de()?;
                glyph.instructions = c.de_counted(instructions_count as usize)?;
            }
            return Ok(glyph);
        }
        if num_contours == 0 {
            return Ok(glyph);
        }

        let end_pts_of_contours: Vec<uint16> = c.de_counted(num_contours as usize)?;
        if end_pts_of_contours.windows(2).any(|w| w[1] < w[0]) {
            return Err(DeserializationError(
                "Contour end points are not increasing".to_string(),
            ));
        }
        let instructions_count: u16 = c.de()?;
        glyph.instructions = c.de_counted(instructions_count as usize)?;
        let num_points = *end_pts_of_contours
            .last()
            .ok_or_else(|| DeserializationError("No points?".to_string()))?
            as usize
            + 1;

        let mut flags: Vec<SimpleGlyphFlags> = Vec::with_capacity(num_points);
        while flags.len() < num_points {
            let flag = SimpleGlyphFlags::from_bits_truncate(c.de()?);
            flags.push(flag);
            if flag.contains(SimpleGlyphFlags::REPEAT_FLAG) {
                let repeat_count: u8 = c.de()?;
                for _ in 0..repeat_count {
                    flags.push(flag);
                }
            }
        }
        if flags.len() > num_points {
            return Err(DeserializationError(
                "Glyph flags repeat past the last point".to_string(),
            ));
        }
        let x_coords = read_coordinates(
            c,
            &flags,
            SimpleGlyphFlags::X_SHORT_VECTOR,
            SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR,
        )?;
        let y_coords = read_coordinates(
            c,
            &flags,
            SimpleGlyphFlags::Y_SHORT_VECTOR,
            SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR,
        )?;
        glyph.overlap = flags
            .first()
            .map(|f| f.contains(SimpleGlyphFlags::OVERLAP_SIMPLE))
            .unwrap_or(false);

        // Divvy x/y coords into contours
        let points: Vec<Point> = izip!(&x_coords, &y_coords, &flags)
            .map(|(x, y, flag)| Point {
                x: *x,
                y: *y,
                on_curve: flag.contains(SimpleGlyphFlags::ON_CURVE_POINT),
            })
            .collect();
        let mut start = 0;
        for end in end_pts_of_contours {
            let end = end as usize + 1;
            glyph.contours.push(points[start..end].to_vec());
            start = end;
        }
        Ok(glyph)
    }
}

impl Glyph {
    /// Returns true if this glyph has any components
    pub fn has_components(&self) -> bool {
        !self.components.is_empty()
    }

    /// Returns true if this glyph has neither components nor contours
    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.contours.is_empty()
    }

    /// Returns a bounding box rectangle for this glyph as a `kurbo::Rect`.
    pub fn bounds_rect(&self) -> kurbo::Rect {
        kurbo::Rect::new(
            self.xMin.into(),
            self.yMin.into(),
            self.xMax.into(),
            self.yMax.into(),
        )
    }

    /// Sets the bounding box rectangle for this glyph from a `kurbo::Rect`.
    pub fn set_bounds_rect(&mut self, r: kurbo::Rect) {
        self.xMin = r.min_x() as i16;
        self.xMax = r.max_x() as i16;
        self.yMin = r.min_y() as i16;
        self.yMax = r.max_y() as i16;
    }

    /// Recompute the bounding box of a simple glyph from its points.
    ///
    /// Composite glyphs keep their stored box; it depends on other glyphs.
    pub fn recalc_bounds(&mut self) {
        if self.has_components() {
            return;
        }
        let mut points = self
            .contours
            .iter()
            .flatten()
            .map(|p| kurbo::Point::new(p.x as f64, p.y as f64));
        if let Some(first) = points.next() {
            let rect = points.fold(kurbo::Rect::from_points(first, first), |r, p| {
                r.union_pt(p)
            });
            self.set_bounds_rect(rect);
        }
    }

    /// Scale every outline coordinate and component offset by `factor`.
    ///
    /// Simple glyphs get their bounding box recomputed from the scaled
    /// points; composite glyphs have their stored box scaled.
    pub fn scale(&mut self, factor: f64) {
        for contour in self.contours.iter_mut() {
            for point in contour.iter_mut() {
                *point = point.scaled(factor);
            }
        }
        for component in self.components.iter_mut() {
            component.scale_offset(factor);
        }
        if self.has_components() {
            self.xMin = scale_i16(self.xMin, factor);
            self.yMin = scale_i16(self.yMin, factor);
            self.xMax = scale_i16(self.xMax, factor);
            self.yMax = scale_i16(self.yMax, factor);
        } else {
            self.recalc_bounds();
        }
    }

    /// Assuming that the contour list has been expanded into a flat list of
    /// points, returns an array of indices representing the final points of
    /// each contour.
    fn end_points(&self) -> Vec<u16> {
        let mut count: i32 = -1;
        let mut end_points = Vec::new();
        for contour in &self.contours {
            count += contour.len() as i32;
            end_points.push(count as u16);
        }
        end_points
    }

    fn compile_deltas_greedy(&self) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        let mut last_x = 0_i32;
        let mut last_y = 0_i32;
        let mut compressed_flags: Vec<u8> = vec![];
        let mut compressed_xs: Vec<u8> = vec![];
        let mut compressed_ys: Vec<u8> = vec![];
        for (i, point) in self.contours.iter().flatten().enumerate() {
            let x = point.x as i32 - last_x;
            let y = point.y as i32 - last_y;
            let mut flag = if point.on_curve {
                SimpleGlyphFlags::ON_CURVE_POINT
            } else {
                SimpleGlyphFlags::empty()
            };
            if i == 0 && self.overlap {
                flag |= SimpleGlyphFlags::OVERLAP_SIMPLE;
            }
            if x == 0 {
                flag |= SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR
            } else if (-255..=255).contains(&x) {
                flag |= SimpleGlyphFlags::X_SHORT_VECTOR;
                if x > 0 {
                    flag |= SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR
                }
                compressed_xs.push(x.unsigned_abs() as u8);
            } else {
                compressed_xs.extend(&(x as i16).to_be_bytes());
            }
            if y == 0 {
                flag |= SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR
            } else if (-255..=255).contains(&y) {
                flag |= SimpleGlyphFlags::Y_SHORT_VECTOR;
                if y > 0 {
                    flag |= SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR
                }
                compressed_ys.push(y.unsigned_abs() as u8);
            } else {
                compressed_ys.extend(&(y as i16).to_be_bytes());
            }
            /* Not gonna do repeating flags today */
            compressed_flags.push(flag.bits());

            last_x = point.x as i32;
            last_y = point.y as i32;
        }
        (compressed_flags, compressed_xs, compressed_ys)
    }
}

impl Serialize for Glyph {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        if self.is_empty() {
            return Ok(());
        }
        data.put(if self.has_components() {
            -1
        } else {
            self.contours.len() as i16
        })?;
        data.put(self.xMin)?;
        data.put(self.yMin)?;
        data.put(self.xMax)?;
        data.put(self.yMax)?;
        if self.has_components() {
            let has_instructions = !self.instructions.is_empty();
            for (i, comp) in self.components.iter().enumerate() {
                comp.write(data, i < self.components.len() - 1, has_instructions)?;
            }
            if has_instructions {
                data.put(self.instructions.len() as u16)?;
                data.put(&self.instructions)?;
            }
        } else {
            data.put(self.end_points())?;
            data.put(self.instructions.len() as u16)?;
            data.put(&self.instructions)?;
            let (compressed_flags, compressed_xs, compressed_ys) = self.compile_deltas_greedy();
            data.put(compressed_flags)?;
            data.put(compressed_xs)?;
            data.put(compressed_ys)?;
        }
        Ok(())
    }
}
