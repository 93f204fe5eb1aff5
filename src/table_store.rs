//! Lazy loading of font tables.
//!
//! The core of this module is the [`TableSet`], which represents the OpenType
//! tables in a font.
//!
//! [`TableSet`]: table_store::TableSet

use std::collections::BTreeMap;
use std::convert::TryInto;

use otspec::types::{tag_str, Tag};
use otspec::{DeserializationError, ReaderContext, SerializationError, Serialize};

use crate::tables;

/// A lazy loader for the set of OpenType tables in a font.
///
/// Tables are parsed into concrete types the first time they are accessed.
/// A table that is never accessed is written back exactly as it was read.
#[derive(Debug, Default, PartialEq)]
pub struct TableSet {
    tables: BTreeMap<Tag, LazyItem>,
}

/// A table in a font, which may or may not have been loaded yet.
#[derive(Debug, PartialEq)]
enum LazyItem {
    Unloaded(Vec<u8>),
    Loaded(LoadedTable),
}

/// A loaded OpenType table.
///
/// This represents all the known table types in their deserialized form.
#[derive(Clone, Debug, PartialEq)]
#[allow(non_camel_case_types)]
pub enum LoadedTable {
    /// Contains a glyph data table.
    glyf(tables::glyf::glyf),
    /// Contains a header table.
    head(tables::head::head),
    /// Contains a horizontal header table.
    hhea(tables::hhea::hhea),
    /// Contains a horizontal metrics table.
    hmtx(tables::hmtx::hmtx),
    /// Contains a maximum profile table.
    maxp(tables::maxp::maxp),
    /// Contains a naming table.
    name(tables::name::name),
    /// Contains an OS/2 and Windows metrics table.
    os2(tables::os2::os2),
    /// Contains a postscript table.
    post(tables::post::post),
}

impl TableSet {
    /// The number of tables in this set.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns `true` if the table store contains no tables.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the `Tag`s of the tables in this set, in
    /// sorted order.
    pub fn keys(&self) -> impl Iterator<Item = Tag> + '_ {
        self.tables.keys().cloned()
    }

    /// Returns `true` if the provided tag is a table in this `TableSet`.
    pub fn contains(&self, tag: &Tag) -> bool {
        self.tables.contains_key(tag)
    }

    /// Remove a table from this set. Returns `true` if it was present.
    pub fn remove(&mut self, tag: Tag) -> bool {
        self.tables.remove(&tag).is_some()
    }

    /// Insert a known table into this set, replacing any existing table.
    pub fn insert(&mut self, table: impl Into<LoadedTable>) {
        let table = table.into();
        self.tables.insert(table.tag(), LazyItem::Loaded(table));
    }

    /// Assign raw binary data to a table.
    ///
    /// If the table is typed and exists, it is replaced and will be reloaded
    /// on the next access.
    pub fn insert_raw(&mut self, tag: Tag, data: impl Into<Vec<u8>>) {
        self.tables.insert(tag, LazyItem::Unloaded(data.into()));
    }

    /// The unparsed bytes of a table, if it has not been loaded.
    pub fn raw(&self, tag: Tag) -> Option<&[u8]> {
        match self.tables.get(&tag) {
            Some(LazyItem::Unloaded(data)) => Some(data),
            _ => None,
        }
    }

    /// Returns `true` if the table is present and has been parsed.
    pub fn is_loaded(&self, tag: Tag) -> bool {
        matches!(self.tables.get(&tag), Some(LazyItem::Loaded(_)))
    }

    fn load_if_needed(&mut self, tag: Tag) -> Result<(), DeserializationError> {
        let to_load = match self.tables.get(&tag) {
            Some(LazyItem::Unloaded(data)) => data.clone(),
            _ => return Ok(()),
        };
        let loaded_table = self.deserialize_table(tag, to_load)?;
        self.tables.insert(tag, LazyItem::Loaded(loaded_table));
        Ok(())
    }

    fn num_glyphs(&mut self) -> Result<u16, DeserializationError> {
        self.maxp_mut()?
            .map(|maxp| maxp.numGlyphs)
            .ok_or_else(|| DeserializationError("font has no maxp table".into()))
    }

    fn deserialize_table(
        &mut self,
        tag: Tag,
        data: Vec<u8>,
    ) -> Result<LoadedTable, DeserializationError> {
        let typed_data: LoadedTable = match &tag {
            b"head" => otspec::de::from_bytes::<tables::head::head>(&data)?.into(),
            b"hhea" => otspec::de::from_bytes::<tables::hhea::hhea>(&data)?.into(),
            b"maxp" => otspec::de::from_bytes::<tables::maxp::maxp>(&data)?.into(),
            b"name" => otspec::de::from_bytes::<tables::name::name>(&data)?.into(),
            b"OS/2" => otspec::de::from_bytes::<tables::os2::os2>(&data)?.into(),
            b"post" => otspec::de::from_bytes::<tables::post::post>(&data)?.into(),
            b"hmtx" => {
                let number_of_hmetrics = self
                    .hhea_mut()?
                    .map(|hhea| hhea.numberOfHMetrics)
                    .ok_or_else(|| DeserializationError("font has no hhea table".into()))?;
                let num_glyphs = self.num_glyphs()?;
                tables::hmtx::from_bytes(
                    &mut ReaderContext::new(data),
                    number_of_hmetrics,
                    num_glyphs,
                )?
                .into()
            }
            b"glyf" => {
                let is_32bit = self
                    .head_mut()?
                    .map(|head| head.loca_is_32bit())
                    .ok_or_else(|| DeserializationError("font has no head table".into()))?;
                let num_glyphs = self.num_glyphs()?;
                let loca_data = self
                    .raw(tables::loca::TAG)
                    .ok_or_else(|| DeserializationError("font has no loca table".into()))?;
                let loca = tables::loca::from_bytes(loca_data, is_32bit, num_glyphs)?;
                tables::glyf::from_bytes(&data, &loca)?.into()
            }
            _ => {
                return Err(DeserializationError(format!(
                    "no parser for table '{}'",
                    tag_str(&tag)
                )))
            }
        };
        Ok(typed_data)
    }

    /// Write loaded outline and metric tables back to binary, updating the
    /// tables whose fields describe them.
    ///
    /// `loca` and `head.indexToLocFormat` follow from `glyf`;
    /// `hhea.numberOfHMetrics` follows from `hmtx`.
    pub(crate) fn compile_glyf_loca_hmtx(&mut self) -> Result<(), SerializationError> {
        if let Some(LazyItem::Loaded(LoadedTable::glyf(glyf))) = self.tables.get(&tables::glyf::TAG)
        {
            let (mut glyf_output, loca) = glyf.to_bytes()?;
            let (loca_data, loca_is_32bit) = loca.to_bytes()?;
            if glyf_output.is_empty() {
                // Sad special case
                glyf_output.push(0);
            }
            self.insert_raw(tables::glyf::TAG, glyf_output);
            self.insert_raw(tables::loca::TAG, loca_data);
            let head = self
                .head_mut()
                .map_err(|e| SerializationError(e.0))?
                .ok_or_else(|| SerializationError("font has no head table".into()))?;
            head.indexToLocFormat = if loca_is_32bit { 1 } else { 0 };
        }

        if let Some(LazyItem::Loaded(LoadedTable::hmtx(hmtx))) = self.tables.get(&tables::hmtx::TAG)
        {
            let (hmtx_output, number_of_hmetrics) = hmtx.to_bytes()?;
            self.insert_raw(tables::hmtx::TAG, hmtx_output);
            let hhea = self
                .hhea_mut()
                .map_err(|e| SerializationError(e.0))?
                .ok_or_else(|| SerializationError("font has no hhea table".into()))?;
            hhea.numberOfHMetrics = number_of_hmetrics;
        }
        Ok(())
    }

    pub(crate) fn write_table(
        &self,
        tag: Tag,
        buffer: &mut Vec<u8>,
    ) -> Result<(), SerializationError> {
        match self.tables.get(&tag) {
            None => Ok(()),
            Some(LazyItem::Unloaded(raw)) => {
                buffer.extend_from_slice(raw);
                Ok(())
            }
            Some(LazyItem::Loaded(table)) => table.to_bytes(buffer),
        }
    }

    /// Length of the table directory that precedes the table data.
    pub(crate) fn directory_len(&self) -> Result<u32, SerializationError> {
        (12 + 16 * self.tables.len())
            .try_into()
            .map_err(|_| SerializationError("too many tables".into()))
    }
}

/// A macro that impls conversions and the typed accessor for each known table.
macro_rules! table_boilerplate {
    ($table:ty, $enum: ident, $accessor: ident) => {
        impl From<$table> for LoadedTable {
            fn from(src: $table) -> LoadedTable {
                LoadedTable::$enum(src)
            }
        }

        impl TableSet {
            /// Get this table for modification, loading it if necessary.
            pub fn $accessor(&mut self) -> Result<Option<&mut $table>, DeserializationError> {
                self.load_if_needed(tables::$enum::TAG)?;
                Ok(match self.tables.get_mut(&tables::$enum::TAG) {
                    Some(LazyItem::Loaded(LoadedTable::$enum(table))) => Some(table),
                    _ => None,
                })
            }
        }
    };
}

table_boilerplate!(tables::glyf::glyf, glyf, glyf_mut);
table_boilerplate!(tables::head::head, head, head_mut);
table_boilerplate!(tables::hhea::hhea, hhea, hhea_mut);
table_boilerplate!(tables::hmtx::hmtx, hmtx, hmtx_mut);
table_boilerplate!(tables::maxp::maxp, maxp, maxp_mut);
table_boilerplate!(tables::name::name, name, name_mut);
table_boilerplate!(tables::os2::os2, os2, os2_mut);
table_boilerplate!(tables::post::post, post, post_mut);

impl LoadedTable {
    /// The tag this table is stored under.
    pub fn tag(&self) -> Tag {
        match self {
            LoadedTable::glyf(_) => tables::glyf::TAG,
            LoadedTable::head(_) => tables::head::TAG,
            LoadedTable::hhea(_) => tables::hhea::TAG,
            LoadedTable::hmtx(_) => tables::hmtx::TAG,
            LoadedTable::maxp(_) => tables::maxp::TAG,
            LoadedTable::name(_) => tables::name::TAG,
            LoadedTable::os2(_) => tables::os2::TAG,
            LoadedTable::post(_) => tables::post::TAG,
        }
    }
}

impl Serialize for LoadedTable {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        match self {
            LoadedTable::glyf(expr) => {
                let (bytes, _) = expr.to_bytes()?;
                data.extend(bytes);
                Ok(())
            }
            LoadedTable::hmtx(expr) => {
                let (bytes, _) = expr.to_bytes()?;
                data.extend(bytes);
                Ok(())
            }
            LoadedTable::head(expr) => expr.to_bytes(data),
            LoadedTable::hhea(expr) => expr.to_bytes(data),
            LoadedTable::maxp(expr) => expr.to_bytes(data),
            LoadedTable::name(expr) => expr.to_bytes(data),
            LoadedTable::os2(expr) => expr.to_bytes(data),
            LoadedTable::post(expr) => expr.to_bytes(data),
        }
    }
}
