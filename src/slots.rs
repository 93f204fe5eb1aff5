//! The fonts the host application loads, and which replacement style goes
//! into each.

use std::fmt;

/// The four styles of the replacement typeface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Style {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

const DOWNLOAD_BASE: &str =
    "https://github.com/googlefonts/atkinson-hyperlegible/raw/main/fonts/ttf";

impl Style {
    pub const ALL: [Style; 4] = [Style::Regular, Style::Bold, Style::Italic, Style::BoldItalic];

    /// File name of this style in the upstream release.
    pub fn file_name(&self) -> &'static str {
        match self {
            Style::Regular => "AtkinsonHyperlegible-Regular.ttf",
            Style::Bold => "AtkinsonHyperlegible-Bold.ttf",
            Style::Italic => "AtkinsonHyperlegible-Italic.ttf",
            Style::BoldItalic => "AtkinsonHyperlegible-BoldItalic.ttf",
        }
    }

    pub fn url(&self) -> String {
        format!("{}/{}", DOWNLOAD_BASE, self.file_name())
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Style::Regular => "Regular",
            Style::Bold => "Bold",
            Style::Italic => "Italic",
            Style::BoldItalic => "Bold Italic",
        };
        f.write_str(name)
    }
}

/// A font file the host application expects, by file name and identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSlot {
    pub filename: &'static str,
    pub family: &'static str,
    pub subfamily: &'static str,
    /// The replacement style that is rewritten into this slot.
    pub style: Style,
}

pub const SLOTS: [FontSlot; 4] = [
    FontSlot {
        filename: "AbletonSans-Light.ttf",
        family: "Ableton Sans",
        subfamily: "Light",
        style: Style::Regular,
    },
    FontSlot {
        filename: "AbletonSansSmall-Bold.ttf",
        family: "Ableton Sans Small",
        subfamily: "Bold",
        style: Style::Bold,
    },
    FontSlot {
        filename: "AbletonSansSmall-Regular.ttf",
        family: "Ableton Sans Small",
        subfamily: "Regular",
        style: Style::Regular,
    },
    FontSlot {
        filename: "AbletonSansSmall-RegularItalic.ttf",
        family: "Ableton Sans Small",
        subfamily: "Regular Italic",
        style: Style::Italic,
    },
];

pub fn slot_filenames() -> Vec<&'static str> {
    SLOTS.iter().map(|slot| slot.filename).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::RewriteSpec;
    use std::collections::HashSet;

    #[test]
    fn postscript_names_match_file_names() {
        for slot in SLOTS.iter() {
            let spec = RewriteSpec::new("x.ttf", slot.family, slot.subfamily, 1.0);
            assert_eq!(format!("{}.ttf", spec.postscript_name()), slot.filename);
        }
    }

    #[test]
    fn identities_are_distinct() {
        let pairs: HashSet<_> = SLOTS.iter().map(|s| (s.family, s.subfamily)).collect();
        assert_eq!(pairs.len(), SLOTS.len());
    }

    #[test]
    fn style_urls() {
        assert_eq!(
            Style::BoldItalic.url(),
            "https://github.com/googlefonts/atkinson-hyperlegible/raw/main/fonts/ttf/AtkinsonHyperlegible-BoldItalic.ttf"
        );
        assert!(Style::ALL.iter().all(|s| s.url().starts_with("https://")));
    }
}
