//! Reads and writes xBase ".dbf" files, as per
//! https://www.clicketyclick.dk/databases/xbase/format/dbf.html

use std::fmt;
use std::fs;
use std::io;
use std::io::Read;
use std::path::Path;
use byteorder::{ByteOrder, LittleEndian};
use chrono::{Datelike, NaiveDate};
use encoding::{DecoderTrap, EncoderTrap, EncodingRef};
use crate::attribute::{self, AttributeValue};
use crate::feature::Attributes;
use super::error::DbfError;

const DBF_HEADER_LENGTH: usize = 32;
const DBF_FIELD_DESCRIPTOR_LENGTH: usize = 32;
const DBF_VERSION: u8 = 0x03;
const DBF_HEADER_TERMINATOR: u8 = 0x0D;
const DBF_EOF_MARKER: u8 = 0x1A;
const DBF_RECORD_ACTIVE: u8 = 0x20;
const DBF_RECORD_DELETED: u8 = 0x2A;

pub const MAX_FIELD_NAME_LENGTH: usize = 11;
pub const MAX_FIELD_LENGTH: u8 = 254;
pub const MAX_DECIMAL_COUNT: u8 = 15;

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum FieldType {
    Character,
    Numeric,
    Float,
    Logical,
    Date,
}

impl FieldType {
    pub fn from_code(code: u8) -> Option<FieldType> {
        match code {
            b'C' => Some(FieldType::Character),
            b'N' => Some(FieldType::Numeric),
            b'F' => Some(FieldType::Float),
            b'L' => Some(FieldType::Logical),
            b'D' => Some(FieldType::Date),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            FieldType::Character => b'C',
            FieldType::Numeric => b'N',
            FieldType::Float => b'F',
            FieldType::Logical => b'L',
            FieldType::Date => b'D',
        }
    }

    pub fn is_numeric(self) -> bool {
        self == FieldType::Numeric || self == FieldType::Float
    }
}

/// Returns the longest prefix of `s` no longer than `max_len` bytes that ends
/// on a character boundary.
pub(crate) fn truncate_at_char_boundary(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Encodes as much of `s` as fits in `width` bytes, never splitting a
/// character.
fn encode_fitted(s: &str, width: usize, encoding: EncodingRef) -> Vec<u8> {
    // every character takes at least one byte
    let mut end = s.char_indices().nth(width).map(|(i, _)| i).unwrap_or(s.len());
    loop {
        let bytes = encoding.encode(&s[..end], EncoderTrap::Replace).unwrap_or_default();
        if bytes.len() <= width {
            return bytes;
        }
        end = s[..end].char_indices().last().map(|(i, _)| i).unwrap_or(0);
    }
}

/// Returns the number of bytes `s` occupies in `encoding`.
pub fn encoded_len(s: &str, encoding: EncodingRef) -> usize {
    encoding.encode(s, EncoderTrap::Replace).map(|b| b.len()).unwrap_or(s.len())
}

/// A column: name, type and fixed width.
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    /// In bytes.
    pub length: u8,
    pub decimal_count: u8,
}

impl FieldDescriptor {
    /// Builds a descriptor whose length and decimal count suit its type.
    ///
    /// Names longer than 11 bytes are truncated. Logical is always 1 byte
    /// and Date always 8; only Numeric and Float keep decimals.
    pub fn new(name: &str, field_type: FieldType, length: u8, decimal_count: u8) -> FieldDescriptor {
        let (length, decimal_count) = match field_type {
            FieldType::Logical => (1, 0),
            FieldType::Date => (8, 0),
            FieldType::Character => (length.max(1).min(MAX_FIELD_LENGTH), 0),
            FieldType::Numeric | FieldType::Float => {
                let decimal_count = decimal_count.min(MAX_DECIMAL_COUNT);
                let min_length = if decimal_count > 0 { decimal_count + 2 } else { 1 };
                (length.max(min_length).min(MAX_FIELD_LENGTH), decimal_count)
            }
        };

        FieldDescriptor {
            name: truncate_at_char_boundary(name, MAX_FIELD_NAME_LENGTH).to_string(),
            field_type: field_type,
            length: length,
            decimal_count: decimal_count,
        }
    }

    pub fn character(name: &str, length: u8) -> FieldDescriptor {
        FieldDescriptor::new(name, FieldType::Character, length, 0)
    }

    pub fn numeric(name: &str, length: u8, decimal_count: u8) -> FieldDescriptor {
        FieldDescriptor::new(name, FieldType::Numeric, length, decimal_count)
    }

    pub fn float(name: &str, length: u8, decimal_count: u8) -> FieldDescriptor {
        FieldDescriptor::new(name, FieldType::Float, length, decimal_count)
    }

    pub fn logical(name: &str) -> FieldDescriptor {
        FieldDescriptor::new(name, FieldType::Logical, 1, 0)
    }

    pub fn date(name: &str) -> FieldDescriptor {
        FieldDescriptor::new(name, FieldType::Date, 8, 0)
    }

    /// True when values read from this column are Double rather than
    /// Integer.
    pub fn holds_doubles(&self) -> bool {
        self.field_type == FieldType::Float || self.decimal_count > 0
    }

    /// Parses this column's bytes from one record.
    ///
    /// Blank values are Null. So are unparseable Logical and Date values.
    /// Unparseable numbers are an error.
    pub fn read_value(&self, bytes: &[u8], encoding: EncodingRef) -> Result<AttributeValue, DbfError> {
        let text = encoding.decode(bytes, DecoderTrap::Strict)
            .map_err(|err| DbfError::EncodingError(format!("field '{}': {}", self.name, err)))?;
        let s = text.trim_matches(|c: char| c == ' ' || c == '\0');

        if s.is_empty() {
            return Ok(AttributeValue::Null);
        }

        match self.field_type {
            FieldType::Character => Ok(AttributeValue::String(s.to_string())),
            FieldType::Numeric | FieldType::Float => {
                if s.chars().all(|c| c == '*') {
                    // dBase writes asterisks when a number overflows its column
                    Ok(AttributeValue::Null)
                } else if self.holds_doubles() {
                    s.parse::<f64>()
                        .map(AttributeValue::Double)
                        .map_err(|_| DbfError::ParseError(format!("field '{}' holds '{}', which is not a number", self.name, s)))
                } else {
                    match s.parse::<i64>() {
                        Ok(i) => Ok(AttributeValue::Integer(i)),
                        Err(_) => match s.parse::<f64>() {
                            Ok(d) if d.is_finite() => Ok(AttributeValue::Double(d.trunc())),
                            _ => Err(DbfError::ParseError(format!("field '{}' holds '{}', which is not a number", self.name, s))),
                        }
                    }
                }
            }
            FieldType::Logical => Ok(match s.chars().next() {
                Some('T') | Some('t') | Some('Y') | Some('y') | Some('1') => AttributeValue::Boolean(true),
                Some('F') | Some('f') | Some('N') | Some('n') | Some('0') => AttributeValue::Boolean(false),
                _ => AttributeValue::Null,
            }),
            FieldType::Date => Ok(attribute::parse_date(s).map_or(AttributeValue::Null, AttributeValue::Date)),
        }
    }

    /// Formats a number for this column, or None if `value` isn't one.
    fn format_number(&self, value: &AttributeValue) -> Option<String> {
        let decimals = self.decimal_count as usize;
        let d = match value {
            &AttributeValue::Integer(i) if decimals == 0 => return Some(i.to_string()),
            &AttributeValue::Integer(i) => i as f64,
            &AttributeValue::Double(d) if d.is_finite() => d,
            &AttributeValue::String(ref s) => s.trim().parse::<f64>().ok().filter(|d| d.is_finite())?,
            _ => return None,
        };

        match self.field_type {
            FieldType::Float => Some(self.format_float(d)),
            _ => Some(format!("{:.*}", decimals, d)),
        }
    }

    /// Formats `d` for a Float column: fixed-point if that fits and reads
    /// back as `d`, otherwise the shortest exponent form that reads back as
    /// `d`.
    fn format_float(&self, d: f64) -> String {
        let width = self.length as usize;
        let fixed = format!("{:.*}", self.decimal_count as usize, d);
        if fixed.len() <= width && fixed.parse::<f64>() == Ok(d) {
            return fixed;
        }

        let exponent = format!("{:e}", d);
        if exponent.len() <= width {
            return exponent;
        }

        if fixed.len() <= width {
            warn!("Column '{}' is {} bytes wide, too narrow to hold {} exactly; writing {}", self.name, width, d, fixed);
        }
        fixed
    }

    /// Returns exactly `self.length` bytes holding `value`.
    ///
    /// Numbers are right-aligned; everything else is left-aligned. A number
    /// too wide for the column becomes asterisks. A value this column can't
    /// hold becomes blanks.
    pub fn write_value(&self, value: &AttributeValue, encoding: EncodingRef) -> Vec<u8> {
        let width = self.length as usize;
        let mut buf = vec![ b' '; width ];

        if value.is_null() {
            return buf;
        }

        let text: Option<String> = match self.field_type {
            FieldType::Character => Some(value.to_string()),
            FieldType::Numeric | FieldType::Float => self.format_number(value),
            FieldType::Logical => value.as_bool().map(|b| (if b { "T" } else { "F" }).to_string()),
            FieldType::Date => match value {
                &AttributeValue::Date(ref d) => Some(attribute::format_date(d)),
                &AttributeValue::String(ref s) => attribute::parse_date(s.trim()).map(|d| attribute::format_date(&d)),
                _ => None,
            },
        };

        let text = match text {
            Some(text) => text,
            None => {
                warn!("Column '{}' ({:?}) cannot hold {:?}; writing blanks", self.name, self.field_type, value);
                return buf;
            }
        };

        if self.field_type.is_numeric() {
            if text.len() > width {
                warn!("Column '{}' is {} bytes wide, too narrow for {}; writing asterisks", self.name, width, text);
                return vec![ b'*'; width ];
            }
            buf[width - text.len() ..].copy_from_slice(text.as_bytes());
        } else {
            let bytes = encode_fitted(&text, width, encoding);
            buf[.. bytes.len()].copy_from_slice(&bytes);
        }
        buf
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}({},{})", self.name, self.field_type.code() as char, self.length, self.decimal_count)
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct DbfHeader {
    pub version: u8,
    /// (years since 1900, month, day)
    pub last_update: (u8, u8, u8),
    pub n_records: usize,
    pub n_header_bytes: usize,
    pub n_bytes_per_record: usize,
}

/// Parses the first 32 bytes of the file.
fn parse_dbf_header(buf: &[u8; DBF_HEADER_LENGTH]) -> Result<DbfHeader, DbfError> {
    // It's hard to come up with a ParseError, because virtually any
    // combination of 32 bytes is a valid .dbf header.
    //
    // The one exception: invalid dates. bytes 1-3 (base 0) are "YMD"
    // in hex. All years are valid; there are 12 valid months and 31
    // valid days.
    if buf[2] > 12 || buf[3] > 31 {
        return Err(DbfError::ParseError(String::from("The first four bytes of the file mention an invalid creation date. This is not a valid .dbf file.")));
    }

    let header = DbfHeader {
        version: buf[0],
        last_update: (buf[1], buf[2], buf[3]),
        n_records: LittleEndian::read_u32(&buf[4..8]) as usize,
        n_header_bytes: LittleEndian::read_u16(&buf[8..10]) as usize,
        n_bytes_per_record: LittleEndian::read_u16(&buf[10..12]) as usize,
    };

    if header.n_header_bytes < DBF_HEADER_LENGTH + 1 {
        return Err(DbfError::ParseError(format!("Header length {} is too short", header.n_header_bytes)));
    }
    if header.n_bytes_per_record < 1 {
        return Err(DbfError::ParseError(String::from("Record length is 0")));
    }

    Ok(header)
}

/// Parses one 32-byte field descriptor. Unknown field types come back as
/// None, alongside a Character descriptor of the same width.
fn parse_field_descriptor(buf: &[u8; DBF_FIELD_DESCRIPTOR_LENGTH], encoding: EncodingRef) -> (FieldDescriptor, Option<u8>) {
    let name_len = buf[0..MAX_FIELD_NAME_LENGTH].iter().position(|&b| b == 0).unwrap_or(MAX_FIELD_NAME_LENGTH);
    let name = encoding.decode(&buf[0..name_len], DecoderTrap::Replace).unwrap_or_default();
    let name = name.trim();

    let (field_type, unknown) = match FieldType::from_code(buf[11]) {
        Some(field_type) => (field_type, None),
        None => (FieldType::Character, Some(buf[11])),
    };

    // Read lengths as stored: new() would "fix" them and misalign the record
    let descriptor = FieldDescriptor {
        name: name.to_string(),
        field_type: field_type,
        length: buf[16],
        decimal_count: buf[17],
    };
    (descriptor, unknown)
}

pub struct DbfMeta {
    pub header: DbfHeader,
    pub fields: Box<[FieldDescriptor]>,
    /// Byte offset of each field within a record.
    offsets: Box<[usize]>,
    encoding: EncodingRef,
    /// Problems with the header that did not stop us reading it.
    pub warnings: Vec<String>,
}

// encoding::EncodingRef does not implement std::fmt::Debug
impl fmt::Debug for DbfMeta {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("DbfMeta")
            .field("header", &self.header)
            .field("fields", &self.fields)
            .field("encoding", &self.encoding.name())
            .field("warnings", &self.warnings)
            .finish()
    }
}

/// Reads the header, including field definitions, from a .dbf file.
///
/// Assumes the cursor is at the start of the file.
///
/// Side-effect: advances the file cursor to the first data record.
fn read_dbf_meta<R: io::Read>(file: &mut R, encoding: EncodingRef) -> Result<DbfMeta, DbfError> {
    let mut buf = [ 0u8; DBF_HEADER_LENGTH ];
    file.read_exact(&mut buf)?;
    let header = parse_dbf_header(&buf)?;

    let mut fields = Vec::<FieldDescriptor>::new();
    let mut warnings = Vec::<String>::new();
    let mut n_bytes_read = DBF_HEADER_LENGTH;

    // Field descriptors run until 0x0D, or until the header ends
    while n_bytes_read < header.n_header_bytes {
        let mut descriptor_buf = [ 0u8; DBF_FIELD_DESCRIPTOR_LENGTH ];
        file.read_exact(&mut descriptor_buf[0..1])?;
        n_bytes_read += 1;
        if descriptor_buf[0] == DBF_HEADER_TERMINATOR {
            break;
        }

        if n_bytes_read + DBF_FIELD_DESCRIPTOR_LENGTH - 1 > header.n_header_bytes {
            return Err(DbfError::ParseError(format!("Field descriptor {} runs past the end of the {}-byte header", fields.len() + 1, header.n_header_bytes)));
        }
        file.read_exact(&mut descriptor_buf[1..])?;
        n_bytes_read += DBF_FIELD_DESCRIPTOR_LENGTH - 1;

        let (field, unknown) = parse_field_descriptor(&descriptor_buf, encoding);
        if let Some(code) = unknown {
            warnings.push(format!("Field '{}' has unsupported type '{}'; reading it as text", field.name, code as char));
        }
        fields.push(field);
    }

    // Some writers put more after the terminator (e.g., a database container path)
    if n_bytes_read < header.n_header_bytes {
        let extra = (header.n_header_bytes - n_bytes_read) as u64;
        io::copy(&mut file.by_ref().take(extra), &mut io::sink())?;
    }

    let mut offsets = Vec::<usize>::with_capacity(fields.len());
    let mut offset = 1; // after the deletion flag
    for field in fields.iter() {
        offsets.push(offset);
        offset += field.length as usize;
    }
    if offset > header.n_bytes_per_record {
        return Err(DbfError::ParseError(format!("Fields need {} bytes per record, but the header says records are {} bytes", offset, header.n_bytes_per_record)));
    }

    Ok(DbfMeta {
        header: header,
        fields: fields.into_boxed_slice(),
        offsets: offsets.into_boxed_slice(),
        encoding: encoding,
        warnings: warnings,
    })
}

/// One row: every column's value, or nothing if the row is deleted.
#[derive(Debug,Clone,PartialEq)]
pub struct DbfRecord {
    /// 0-based position in the file.
    pub index: usize,
    pub deleted: bool,
    pub attributes: Attributes,
}

/// Parses a single record's bytes.
///
/// A deleted record comes back with `deleted: true` and no attributes.
fn parse_dbf_record(buf: &[u8], index: usize, meta: &DbfMeta) -> Result<DbfRecord, DbfError> {
    if buf[0] == DBF_RECORD_DELETED {
        return Ok(DbfRecord {
            index: index,
            deleted: true,
            attributes: Attributes::new(),
        });
    }

    let mut attributes = Attributes::new();
    for (field, &offset) in meta.fields.iter().zip(meta.offsets.iter()) {
        let bytes = &buf[offset .. offset + field.length as usize];
        let value = field.read_value(bytes, meta.encoding)?;
        attributes.insert(field.name.clone(), value);
    }

    Ok(DbfRecord {
        index: index,
        deleted: false,
        attributes: attributes,
    })
}

/// Reads an xBase ".dbf" file, following instructions at
/// https://www.clicketyclick.dk/databases/xbase/format/dbf.html
///
/// Each record is read whole before it is parsed, so a record that fails to
/// parse leaves the cursor at the start of the next record: the iterator
/// yields `Some(Err(...))` and carries on. It stops after the header's record
/// count, or at the first I/O error (such as a truncated file).
///
/// # Example
///
/// ```
/// # extern crate encoding;
/// # extern crate chrono;
/// # extern crate shpio;
///
/// # fn main() {
/// use std::io;
/// use chrono::NaiveDate;
/// use shpio::attribute::AttributeValue;
/// use shpio::shapefile::dbf::{DbfReader, DbfWriter, FieldDescriptor};
///
/// let fields = vec![ FieldDescriptor::character("name", 10) ];
/// let today = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
/// let mut bytes: Vec<u8> = vec![];
/// {
///     let mut writer = DbfWriter::new(&mut bytes, fields, 1, today, encoding::all::UTF_8).unwrap();
///     writer.write_record(&[ &AttributeValue::from("bar") ]).unwrap();
///     writer.finish().unwrap();
/// }
///
/// let dbf_reader = DbfReader::new(io::Cursor::new(bytes), encoding::all::UTF_8).unwrap();
/// for record in dbf_reader {
///     let record = record.unwrap();
///     assert_eq!(Some("bar"), record.attributes["name"].as_str());
/// }
/// # }
/// ```
pub struct DbfReader<R: io::Read> {
    file: R,
    n_records_already_iterated: usize,
    done: bool,
    pub meta: DbfMeta,
}

impl<R: io::Read> fmt::Debug for DbfReader<R> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("DbfReader")
            .field("n_records_already_iterated", &self.n_records_already_iterated)
            .field("meta", &self.meta)
            .finish()
    }
}

impl<R: io::Read> DbfReader<R> {
    pub fn new(mut file: R, encoding: EncodingRef) -> Result<DbfReader<R>, DbfError> {
        let meta = read_dbf_meta(&mut file, encoding)?;
        Ok(DbfReader {
            file: file,
            n_records_already_iterated: 0,
            done: false,
            meta: meta,
        })
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.meta.fields
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.meta.fields.iter().find(|f| f.name == name)
    }
}

impl<R: io::Read> Iterator for DbfReader<R> {
    type Item = Result<DbfRecord, DbfError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.n_records_already_iterated >= self.meta.header.n_records {
            return None;
        }

        let index = self.n_records_already_iterated;
        self.n_records_already_iterated += 1;

        let mut buf = vec![ 0u8; self.meta.header.n_bytes_per_record ];
        if let Err(err) = self.file.read_exact(&mut buf) {
            self.done = true;
            return Some(Err(DbfError::IOError(err)));
        }

        Some(parse_dbf_record(&buf, index, &self.meta))
    }
}

/// Opens an xBase ".dbf" file from the filesystem.
pub fn open(path: &Path, encoding: EncodingRef) -> Result<DbfReader<io::BufReader<fs::File>>, DbfError> {
    let f = fs::File::open(path)?;
    DbfReader::new(io::BufReader::new(f), encoding)
}

/// Returns (header length, record length) in bytes for a file holding
/// `fields` and `n_records`, or a message saying why no ".dbf" file can.
pub fn dbf_layout(fields: &[FieldDescriptor], n_records: usize) -> Result<(usize, usize), String> {
    let n_header_bytes = DBF_HEADER_LENGTH + DBF_FIELD_DESCRIPTOR_LENGTH * fields.len() + 1;
    let n_bytes_per_record = 1 + fields.iter().map(|f| f.length as usize).sum::<usize>();
    if n_header_bytes > u16::max_value() as usize || n_bytes_per_record > u16::max_value() as usize {
        return Err(format!("{} fields ({} bytes per record) is too many for a .dbf file", fields.len(), n_bytes_per_record));
    }
    if n_records > u32::max_value() as usize {
        return Err(format!("{} records is too many for a .dbf file", n_records));
    }
    Ok((n_header_bytes, n_bytes_per_record))
}

/// Writes an xBase ".dbf" file: header and field descriptors on creation,
/// then one `write_record()` per row, then `finish()`.
pub struct DbfWriter<W: io::Write> {
    file: W,
    fields: Vec<FieldDescriptor>,
    encoding: EncodingRef,
}

impl<W: io::Write> DbfWriter<W> {
    /// Writes the header. `n_records` must match the number of
    /// `write_record()` calls that follow.
    pub fn new(mut file: W, fields: Vec<FieldDescriptor>, n_records: usize, last_update: NaiveDate, encoding: EncodingRef) -> io::Result<DbfWriter<W>> {
        let (n_header_bytes, n_bytes_per_record) = dbf_layout(&fields, n_records)
            .map_err(|message| io::Error::new(io::ErrorKind::InvalidInput, message))?;

        let mut buf = [ 0u8; DBF_HEADER_LENGTH ];
        buf[0] = DBF_VERSION;
        buf[1] = (last_update.year() - 1900).max(0).min(255) as u8;
        buf[2] = last_update.month() as u8;
        buf[3] = last_update.day() as u8;
        LittleEndian::write_u32(&mut buf[4..8], n_records as u32);
        LittleEndian::write_u16(&mut buf[8..10], n_header_bytes as u16);
        LittleEndian::write_u16(&mut buf[10..12], n_bytes_per_record as u16);
        // bytes 12..32 are reserved
        file.write_all(&buf)?;

        for field in fields.iter() {
            let mut descriptor_buf = [ 0u8; DBF_FIELD_DESCRIPTOR_LENGTH ];
            let name = encode_fitted(&field.name, MAX_FIELD_NAME_LENGTH, encoding);
            descriptor_buf[.. name.len()].copy_from_slice(&name);
            descriptor_buf[11] = field.field_type.code();
            descriptor_buf[16] = field.length;
            descriptor_buf[17] = field.decimal_count;
            file.write_all(&descriptor_buf)?;
        }
        file.write_all(&[ DBF_HEADER_TERMINATOR ])?;

        Ok(DbfWriter {
            file: file,
            fields: fields,
            encoding: encoding,
        })
    }

    /// Writes one active record. `values` are in field order.
    pub fn write_record(&mut self, values: &[&AttributeValue]) -> io::Result<()> {
        if values.len() != self.fields.len() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("Record has {} values, but there are {} fields", values.len(), self.fields.len())));
        }

        let mut buf = Vec::<u8>::with_capacity(1 + self.fields.iter().map(|f| f.length as usize).sum::<usize>());
        buf.push(DBF_RECORD_ACTIVE);
        for (field, value) in self.fields.iter().zip(values.iter()) {
            buf.extend_from_slice(&field.write_value(value, self.encoding));
        }
        self.file.write_all(&buf)
    }

    /// Writes the end-of-file marker and returns the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.file.write_all(&[ DBF_EOF_MARKER ])?;
        self.file.flush()?;
        Ok(self.file)
    }
}
