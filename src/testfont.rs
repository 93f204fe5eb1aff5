//! A small, valid TrueType font assembled in memory for tests.

use crate::font::{self, Font, SfntVersion};
use crate::tables::glyf::{glyf, Component, ComponentFlags, Glyph, Point};
use crate::tables::hhea::hhea;
use crate::tables::hmtx::{hmtx, Metric};
use crate::tables::maxp::maxp;
use crate::tables::name::{name, NameRecord, NameRecordID};
use crate::tables::os2::os2;
use crate::tables::post::post;
use crate::tables::head;
use kurbo::Affine;
use std::path::{Path, PathBuf};

pub const NUM_GLYPHS: u16 = 4;
pub const UNITS_PER_EM: u16 = 1000;
pub const FAMILY: &str = "Test Sans";
pub const SUBFAMILY: &str = "Regular";
pub const ADVANCES: [u16; 4] = [500, 600, 400, 1000];

fn contour(points: &[(i16, i16, bool)]) -> Vec<Point> {
    points
        .iter()
        .map(|&(x, y, on_curve)| Point { x, y, on_curve })
        .collect()
}

fn glyphs() -> glyf {
    let mut square = Glyph {
        contours: vec![contour(&[
            (100, 0, true),
            (500, 0, true),
            (500, 700, true),
            (100, 700, true),
        ])],
        ..Default::default()
    };
    square.recalc_bounds();
    let mut triangle = Glyph {
        contours: vec![contour(&[(10, 0, true), (310, 0, true), (160, 700, false)])],
        instructions: vec![0xb0, 0x00],
        ..Default::default()
    };
    triangle.recalc_bounds();
    let composite = Glyph {
        xMin: 150,
        yMin: 0,
        xMax: 910,
        yMax: 700,
        components: vec![
            Component {
                glyph_index: 1,
                transformation: Affine::translate((50.0, 0.0)),
                match_points: None,
                flags: ComponentFlags::USE_MY_METRICS,
            },
            Component {
                glyph_index: 2,
                transformation: Affine::translate((600.0, 0.0)),
                match_points: None,
                flags: ComponentFlags::empty(),
            },
        ],
        ..Default::default()
    };
    glyf {
        glyphs: vec![Glyph::default(), square, triangle, composite],
    }
}

fn names() -> name {
    let full = format!("{} {}", FAMILY, SUBFAMILY);
    let postscript = "TestSans-Regular";
    let mut records = vec![];
    let makers: [fn(u16, &str) -> NameRecord; 2] =
        [NameRecord::mac_roman, NameRecord::windows_unicode];
    for make in &makers {
        records.push(make(NameRecordID::FontFamilyName.into(), FAMILY));
        records.push(make(NameRecordID::FontSubfamilyName.into(), SUBFAMILY));
        records.push(make(NameRecordID::UniqueID.into(), "1.000;NONE;TestSans-Regular"));
        records.push(make(NameRecordID::FullFontName.into(), &full));
        records.push(make(5, "Version 1.000"));
        records.push(make(NameRecordID::PostscriptName.into(), postscript));
    }
    records.push(NameRecord::windows_unicode(
        NameRecordID::PreferredFamilyName,
        FAMILY,
    ));
    records.push(NameRecord::windows_unicode(
        NameRecordID::PreferredSubfamilyName,
        SUBFAMILY,
    ));
    name {
        format: 0,
        records,
        lang_tags: vec![],
    }
}

fn metrics() -> os2 {
    os2 {
        version: 4,
        xAvgCharWidth: 625,
        usWeightClass: 400,
        usWidthClass: 5,
        fsType: 0,
        ySubscriptXSize: 650,
        ySubscriptYSize: 600,
        ySubscriptXOffset: 0,
        ySubscriptYOffset: 75,
        ySuperscriptXSize: 650,
        ySuperscriptYSize: 600,
        ySuperscriptXOffset: 0,
        ySuperscriptYOffset: 350,
        yStrikeoutSize: 50,
        yStrikeoutPosition: 300,
        sFamilyClass: 0,
        panose: [2, 0, 5, 3, 0, 0, 0, 0, 0, 0],
        ulUnicodeRange1: 1,
        ulUnicodeRange2: 0,
        ulUnicodeRange3: 0,
        ulUnicodeRange4: 0,
        achVendID: *b"NONE",
        fsSelection: 0x40,
        usFirstCharIndex: 0x20,
        usLastCharIndex: 0x7e,
        sTypoAscender: 800,
        sTypoDescender: -200,
        sTypoLineGap: 200,
        usWinAscent: 950,
        usWinDescent: 250,
        ulCodePageRange1: Some(1),
        ulCodePageRange2: Some(0),
        sxHeight: Some(500),
        sCapHeight: Some(700),
        usDefaultChar: Some(0),
        usBreakChar: Some(32),
        usMaxContext: Some(1),
        usLowerOpticalPointSize: None,
        usUpperOpticalPointSize: None,
    }
}

/// The test font with every table loaded.
pub fn font() -> Font {
    let mut font = Font::new(SfntVersion::TrueType);
    font.tables.insert(head::new(UNITS_PER_EM, 10, 0, 910, 700));
    font.tables.insert(hhea {
        majorVersion: 1,
        minorVersion: 0,
        ascender: 800,
        descender: -200,
        lineGap: 0,
        advanceWidthMax: 1000,
        minLeftSideBearing: 0,
        minRightSideBearing: 90,
        xMaxExtent: 910,
        caretSlopeRise: 1,
        caretSlopeRun: 0,
        caretOffset: 0,
        reserved: [0; 4],
        metricDataFormat: 0,
        numberOfHMetrics: NUM_GLYPHS,
    });
    font.tables.insert(maxp {
        version: 0x0001_0000,
        numGlyphs: NUM_GLYPHS,
        profile: vec![0; 26],
    });
    font.tables.insert(hmtx {
        metrics: vec![
            Metric {
                advanceWidth: ADVANCES[0],
                lsb: 0,
            },
            Metric {
                advanceWidth: ADVANCES[1],
                lsb: 100,
            },
            Metric {
                advanceWidth: ADVANCES[2],
                lsb: 10,
            },
            Metric {
                advanceWidth: ADVANCES[3],
                lsb: 150,
            },
        ],
    });
    font.tables.insert(glyphs());
    font.tables.insert(names());
    font.tables.insert(metrics());
    font.tables.insert(post {
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
    });
    font
}

/// The test font as a binary.
pub fn bytes() -> Vec<u8> {
    font().to_bytes().expect("test font compiles")
}

/// The test font parsed back from its binary, with nothing but `head` loaded.
pub fn load() -> Font {
    font::from_bytes(&bytes()).expect("test font parses")
}

/// Write the test font into `dir`.
pub fn write(dir: &Path, filename: &str) -> PathBuf {
    let path = dir.join(filename);
    std::fs::write(&path, bytes()).expect("test font written");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::loca;

    #[test]
    fn test_font_is_complete() {
        let mut font = load();
        assert!(font.has_glyf_outlines());
        assert!(font.tables.contains(&loca::TAG));
        assert_eq!(font.tables.len(), 9);
        let names = font.tables.name_mut().unwrap().unwrap();
        assert_eq!(
            names.get(NameRecordID::FontFamilyName),
            Some(FAMILY.to_string())
        );
        let glyf = font.tables.glyf_mut().unwrap().unwrap();
        assert_eq!(glyf.glyphs[3].components.len(), 2);
        assert_eq!(glyf.glyphs[2].instructions, vec![0xb0, 0x00]);
    }
}
