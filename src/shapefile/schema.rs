//! Chooses ".dbf" columns for attribute maps that come without a schema.

use std::collections::{HashMap, HashSet};
use encoding::EncodingRef;
use crate::attribute::{AttributeKind, AttributeValue};
use crate::feature::Feature;
use super::dbf::{self, FieldDescriptor, MAX_DECIMAL_COUNT, MAX_FIELD_LENGTH, MAX_FIELD_NAME_LENGTH};

/// Columns, plus the attribute key each column is filled from.
///
/// Keys and column names differ when a key is longer than a ".dbf" column
/// name may be.
#[derive(Debug,Clone,PartialEq)]
pub struct Schema {
    pub fields: Vec<FieldDescriptor>,
    pub keys: Vec<String>,
}

#[derive(Debug)]
struct ColumnStats {
    key: String,
    kind: Option<AttributeKind>,
    /// Widest value, formatted for a Character column.
    max_width: usize,
    /// Widest integer part (with sign) of any number.
    max_int_width: usize,
    /// Most digits after the decimal point of any number.
    max_decimals: usize,
    /// Widest number in exponent form, e.g. "1.5e-20".
    max_exponent_width: usize,
    /// Most digits after the decimal point of any exponent-form mantissa.
    max_exponent_decimals: usize,
}

/// Number of digits after the '.' in `text`, before any exponent.
fn n_decimals(text: &str) -> usize {
    let mantissa = text.split('e').next().unwrap_or("");
    mantissa.splitn(2, '.').nth(1).map_or(0, |decimals| decimals.len())
}

impl ColumnStats {
    fn new(key: &str) -> ColumnStats {
        ColumnStats {
            key: key.to_string(),
            kind: None,
            max_width: 0,
            max_int_width: 0,
            max_decimals: 0,
            max_exponent_width: 0,
            max_exponent_decimals: 0,
        }
    }

    fn observe(&mut self, value: &AttributeValue, encoding: EncodingRef) {
        let kind = match value.kind() {
            None => return,
            Some(kind) => kind,
        };

        self.kind = Some(match self.kind {
            None => kind,
            Some(k) => k.promote(kind),
        });

        let text = value.to_string();
        self.max_width = self.max_width.max(dbf::encoded_len(&text, encoding));

        if kind.is_numeric() {
            let int_part = text.split('.').next().unwrap_or("");
            self.max_int_width = self.max_int_width.max(int_part.len());
            self.max_decimals = self.max_decimals.max(n_decimals(&text));

            if let Some(d) = value.as_f64() {
                let exponent = format!("{:e}", d);
                self.max_exponent_width = self.max_exponent_width.max(exponent.len());
                self.max_exponent_decimals = self.max_exponent_decimals.max(n_decimals(&exponent));
            }
        }
    }

    fn clamp(n: usize) -> u8 {
        n.max(1).min(MAX_FIELD_LENGTH as usize) as u8
    }

    fn descriptor(&self, name: &str) -> FieldDescriptor {
        match self.kind {
            None => FieldDescriptor::character(name, 1),
            Some(AttributeKind::String) => FieldDescriptor::character(name, ColumnStats::clamp(self.max_width)),
            Some(AttributeKind::Integer) => FieldDescriptor::numeric(name, ColumnStats::clamp(self.max_width), 0),
            Some(AttributeKind::Double) => {
                let decimals = self.max_decimals.max(1);
                let length = self.max_int_width.max(1) + 1 + decimals;
                if decimals <= MAX_DECIMAL_COUNT as usize && length <= MAX_FIELD_LENGTH as usize {
                    FieldDescriptor::numeric(name, length as u8, decimals as u8)
                } else {
                    // Fixed-point would round or overflow: store exponent form
                    let decimals = self.max_exponent_decimals.min(MAX_DECIMAL_COUNT as usize);
                    FieldDescriptor::float(name, ColumnStats::clamp(self.max_exponent_width), decimals as u8)
                }
            }
            Some(AttributeKind::Boolean) => FieldDescriptor::logical(name),
            Some(AttributeKind::Date) => FieldDescriptor::date(name),
        }
    }
}

/// Returns a column name for `key` that no other column has.
///
/// Long keys are truncated; if that collides, the tail becomes "_1", "_2"...
fn unique_name(key: &str, taken: &HashSet<String>) -> String {
    let name = dbf::truncate_at_char_boundary(key, MAX_FIELD_NAME_LENGTH);
    if !taken.contains(name) {
        return name.to_string();
    }

    (1..)
        .map(|n| {
            let suffix = format!("_{}", n);
            let stem = dbf::truncate_at_char_boundary(key, MAX_FIELD_NAME_LENGTH - suffix.len());
            format!("{}{}", stem, suffix)
        })
        .find(|name| !taken.contains(name))
        .unwrap_or_default()
}

impl Schema {
    /// Uses caller-chosen columns: each column is filled from the attribute
    /// of the same name.
    pub fn from_descriptors(fields: &[FieldDescriptor]) -> Schema {
        Schema {
            fields: fields.to_vec(),
            keys: fields.iter().map(|f| f.name.clone()).collect(),
        }
    }

    /// Picks one column per attribute key, in the order keys first appear.
    ///
    /// A column's type comes from its first non-null value; Integer and
    /// Double mix to Double, and any other mix becomes Character. Widths fit
    /// the widest value.
    pub fn infer(features: &[Feature], encoding: EncodingRef) -> Schema {
        let mut columns = Vec::<ColumnStats>::new();
        let mut column_by_key = HashMap::<&str, usize>::new();

        for feature in features.iter() {
            for (key, value) in feature.attributes.iter() {
                let i = match column_by_key.get(key.as_str()) {
                    Some(&i) => i,
                    None => {
                        columns.push(ColumnStats::new(key));
                        column_by_key.insert(key.as_str(), columns.len() - 1);
                        columns.len() - 1
                    }
                };
                columns[i].observe(value, encoding);
            }
        }

        let mut taken = HashSet::<String>::new();
        let mut fields = Vec::<FieldDescriptor>::with_capacity(columns.len());
        for column in columns.iter() {
            let name = unique_name(&column.key, &taken);
            if name != column.key {
                debug!("Attribute '{}' is stored in column '{}'", column.key, name);
            }
            fields.push(column.descriptor(&name));
            taken.insert(name);
        }

        Schema {
            fields: fields,
            keys: columns.into_iter().map(|c| c.key).collect(),
        }
    }

    /// Returns `feature`'s values in column order, Null where missing.
    pub fn row<'a>(&self, feature: &'a Feature) -> Vec<&'a AttributeValue> {
        self.keys.iter().map(|key| feature.attribute(key)).collect()
    }
}
