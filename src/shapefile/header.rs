//! The 100-byte header shared by ".shp" and ".shx" files, and the 8-byte
//! header before each ".shp" record, as per
//! https://www.esri.com/library/whitepapers/pdfs/shapefile.pdf
//!
//! Byte order is mixed: file code, file length and record headers are
//! big-endian; everything else is little-endian.

use std::fmt;
use std::io;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use crate::geo::{BoundingBox, Geometry};
use super::error::ShpError;

pub const SHP_HEADER_LENGTH: usize = 100;
pub const SHP_RECORD_HEADER_LENGTH: usize = 8;
pub const SHP_MAGIC_NUMBER: i32 = 9994;
pub const SHP_VERSION: i32 = 1000;

#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum ShapeType {
    Null,
    Point,
    PolyLine,
    Polygon,
    MultiPoint,
    PointZ,
    PolyLineZ,
    PolygonZ,
    MultiPointZ,
    PointM,
    PolyLineM,
    PolygonM,
    MultiPointM,
}

impl ShapeType {
    /// Returns None for unknown codes and for MultiPatch (31).
    pub fn from_code(code: i32) -> Option<ShapeType> {
        match code {
            0  => Some(ShapeType::Null),
            1  => Some(ShapeType::Point),
            3  => Some(ShapeType::PolyLine),
            5  => Some(ShapeType::Polygon),
            8  => Some(ShapeType::MultiPoint),
            11 => Some(ShapeType::PointZ),
            13 => Some(ShapeType::PolyLineZ),
            15 => Some(ShapeType::PolygonZ),
            18 => Some(ShapeType::MultiPointZ),
            21 => Some(ShapeType::PointM),
            23 => Some(ShapeType::PolyLineM),
            25 => Some(ShapeType::PolygonM),
            28 => Some(ShapeType::MultiPointM),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            ShapeType::Null => 0,
            ShapeType::Point => 1,
            ShapeType::PolyLine => 3,
            ShapeType::Polygon => 5,
            ShapeType::MultiPoint => 8,
            ShapeType::PointZ => 11,
            ShapeType::PolyLineZ => 13,
            ShapeType::PolygonZ => 15,
            ShapeType::MultiPointZ => 18,
            ShapeType::PointM => 21,
            ShapeType::PolyLineM => 23,
            ShapeType::PolygonM => 25,
            ShapeType::MultiPointM => 28,
        }
    }

    /// Strips the M/Z suffix: PolygonZ becomes Polygon.
    pub fn base(self) -> ShapeType {
        match self {
            ShapeType::Null => ShapeType::Null,
            ShapeType::Point | ShapeType::PointZ | ShapeType::PointM => ShapeType::Point,
            ShapeType::PolyLine | ShapeType::PolyLineZ | ShapeType::PolyLineM => ShapeType::PolyLine,
            ShapeType::Polygon | ShapeType::PolygonZ | ShapeType::PolygonM => ShapeType::Polygon,
            ShapeType::MultiPoint | ShapeType::MultiPointZ | ShapeType::MultiPointM => ShapeType::MultiPoint,
        }
    }

    pub fn has_z(self) -> bool {
        match self {
            ShapeType::PointZ | ShapeType::PolyLineZ | ShapeType::PolygonZ | ShapeType::MultiPointZ => true,
            _ => false,
        }
    }

    pub fn has_m(self) -> bool {
        match self {
            ShapeType::PointM | ShapeType::PolyLineM | ShapeType::PolygonM | ShapeType::MultiPointM => true,
            _ => false,
        }
    }

    /// True if a record of type `self` may appear in a file of type `other`.
    ///
    /// Null records may appear in any file.
    pub fn is_compatible_with(self, other: ShapeType) -> bool {
        self == ShapeType::Null || self.base() == other.base()
    }

    /// The 2D shape type that holds `geometry`.
    pub fn of_geometry(geometry: &Geometry) -> ShapeType {
        match geometry {
            &Geometry::Point(_) => ShapeType::Point,
            &Geometry::MultiPoint(_) => ShapeType::MultiPoint,
            &Geometry::MultiLineString(_) => ShapeType::PolyLine,
            &Geometry::MultiPolygon(_) => ShapeType::Polygon,
        }
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug,Copy,Clone,PartialEq)]
pub struct ShpHeader {
    /// In bytes: the file stores 16-bit words.
    pub file_n_bytes: usize,
    pub version: i32,
    pub shape_type: ShapeType,
    pub bounding_box: BoundingBox,
    pub z_range: (f64, f64),
    pub m_range: (f64, f64),
}

impl ShpHeader {
    pub fn new(file_n_bytes: usize, shape_type: ShapeType, bounding_box: BoundingBox) -> ShpHeader {
        ShpHeader {
            file_n_bytes: file_n_bytes,
            version: SHP_VERSION,
            shape_type: shape_type,
            bounding_box: bounding_box,
            z_range: (0., 0.),
            m_range: (0., 0.),
        }
    }
}

/// Parses the first 100 bytes of a ".shp" or ".shx" file.
///
/// Returns Err if the file code is not 9994 or the shape type is not one we
/// can read. A version other than 1000 is left for the caller to judge.
pub fn parse_shp_header(buf: &[u8; SHP_HEADER_LENGTH]) -> Result<ShpHeader, ShpError> {
    let magic_number = BigEndian::read_i32(&buf[0..4]);
    if magic_number != SHP_MAGIC_NUMBER {
        return Err(ShpError::ParseError(format!("File has wrong file code: found {}, expected {}", magic_number, SHP_MAGIC_NUMBER)));
    }

    let file_len = BigEndian::read_i32(&buf[24..28]);
    if file_len < 0 {
        return Err(ShpError::ParseError(format!("File has negative length {}", file_len)));
    }

    let shape_type_code = LittleEndian::read_i32(&buf[32..36]);
    let shape_type = match ShapeType::from_code(shape_type_code) {
        Some(shape_type) => shape_type,
        None => {
            return Err(ShpError::ParseError(format!("File has unsupported shape type {}", shape_type_code)));
        }
    };

    Ok(ShpHeader {
        file_n_bytes: file_len as usize * 2,
        version: LittleEndian::read_i32(&buf[28..32]),
        shape_type: shape_type,
        bounding_box: BoundingBox::new(
            LittleEndian::read_f64(&buf[36..44]),
            LittleEndian::read_f64(&buf[44..52]),
            LittleEndian::read_f64(&buf[52..60]),
            LittleEndian::read_f64(&buf[60..68]),
        ),
        z_range: (LittleEndian::read_f64(&buf[68..76]), LittleEndian::read_f64(&buf[76..84])),
        m_range: (LittleEndian::read_f64(&buf[84..92]), LittleEndian::read_f64(&buf[92..100])),
    })
}

/// Reads the first 100 bytes of the file.
///
/// Side-effect: advances the file cursor 100 bytes.
pub fn read_shp_header<R: io::Read>(file: &mut R) -> Result<ShpHeader, ShpError> {
    let mut buf = [ 0u8; SHP_HEADER_LENGTH ];
    file.read_exact(&mut buf)?;
    parse_shp_header(&buf)
}

pub fn encode_shp_header(header: &ShpHeader) -> [u8; SHP_HEADER_LENGTH] {
    let mut buf = [ 0u8; SHP_HEADER_LENGTH ];

    BigEndian::write_i32(&mut buf[0..4], SHP_MAGIC_NUMBER);
    // bytes 4..24 are unused
    BigEndian::write_i32(&mut buf[24..28], (header.file_n_bytes / 2) as i32);
    LittleEndian::write_i32(&mut buf[28..32], header.version);
    LittleEndian::write_i32(&mut buf[32..36], header.shape_type.code());
    LittleEndian::write_f64(&mut buf[36..44], header.bounding_box.min_lon);
    LittleEndian::write_f64(&mut buf[44..52], header.bounding_box.min_lat);
    LittleEndian::write_f64(&mut buf[52..60], header.bounding_box.max_lon);
    LittleEndian::write_f64(&mut buf[60..68], header.bounding_box.max_lat);
    LittleEndian::write_f64(&mut buf[68..76], header.z_range.0);
    LittleEndian::write_f64(&mut buf[76..84], header.z_range.1);
    LittleEndian::write_f64(&mut buf[84..92], header.m_range.0);
    LittleEndian::write_f64(&mut buf[92..100], header.m_range.1);

    buf
}

/// The 8 bytes before each ".shp" record. Also the layout of each ".shx"
/// entry, where the first number is an offset instead of a record number.
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct RecordHeader {
    pub record_number: u32,
    /// In bytes: the file stores 16-bit words.
    pub content_n_bytes: usize,
}

pub fn parse_record_header(buf: &[u8; SHP_RECORD_HEADER_LENGTH]) -> RecordHeader {
    RecordHeader {
        record_number: BigEndian::read_u32(&buf[0..4]),
        content_n_bytes: BigEndian::read_u32(&buf[4..8]) as usize * 2,
    }
}

pub fn encode_record_header(header: &RecordHeader) -> [u8; SHP_RECORD_HEADER_LENGTH] {
    let mut buf = [ 0u8; SHP_RECORD_HEADER_LENGTH ];
    BigEndian::write_u32(&mut buf[0..4], header.record_number);
    BigEndian::write_u32(&mut buf[4..8], (header.content_n_bytes / 2) as u32);
    buf
}
