//! Reads and writes ESRI ".shp" and ".shx" files, as per
//! https://www.esri.com/library/whitepapers/pdfs/shapefile.pdf

use std::fs;
use std::io;
use std::io::{Read, Write};
use std::path::Path;
use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use itertools::Itertools;
use crate::geo::{BoundingBox, Geometry, LineString, Point};
use super::error::ShpError;
use super::header::{self, RecordHeader, ShapeType, ShpHeader, SHP_HEADER_LENGTH, SHP_RECORD_HEADER_LENGTH};

const SHP_POINT_LENGTH: usize = 16;
const SHX_ENTRY_LENGTH: usize = 8;

/// A record's geometry as the file stores it: polygon rings are not yet
/// sorted into outer rings and holes.
#[derive(Debug,Clone,PartialEq)]
pub enum ShpShape {
    Null,
    Point(Point),
    MultiPoint(Vec<Point>),
    PolyLine(Vec<LineString>),
    Polygon(Vec<LineString>),
}

#[derive(Debug,Clone,PartialEq)]
pub struct ShpRecord {
    pub record_number: u32,
    pub shape_type: ShapeType,
    pub shape: ShpShape,
}

fn remaining(r: &io::Cursor<&[u8]>) -> usize {
    r.get_ref().len().saturating_sub(r.position() as usize)
}

/// Advances past `n_bytes` we don't keep (bounding boxes, M and Z data).
fn skip(r: &mut io::Cursor<&[u8]>, n_bytes: usize, what: &str) -> Result<(), ShpError> {
    if remaining(r) < n_bytes {
        return Err(ShpError::ParseError(format!("{} needs {} bytes, but only {} remain", what, n_bytes, remaining(r))));
    }
    let pos = r.position();
    r.set_position(pos + n_bytes as u64);
    Ok(())
}

/// Skips an optional range-plus-array block (M data, or Z data's M suffix).
fn skip_optional(r: &mut io::Cursor<&[u8]>, n_bytes: usize) {
    if remaining(r) >= n_bytes {
        let pos = r.position();
        r.set_position(pos + n_bytes as u64);
    }
}

fn read_count(r: &mut io::Cursor<&[u8]>, what: &str) -> Result<usize, ShpError> {
    let n = r.read_i32::<LittleEndian>()?;
    if n < 0 {
        return Err(ShpError::ParseError(format!("Negative {}: {}", what, n)));
    }
    Ok(n as usize)
}

fn read_point(r: &mut io::Cursor<&[u8]>) -> Result<Point, ShpError> {
    let x = r.read_f64::<LittleEndian>()?;
    let y = r.read_f64::<LittleEndian>()?;
    Ok(Point(x, y))
}

fn read_points(r: &mut io::Cursor<&[u8]>, n_points: usize) -> Result<Vec<Point>, ShpError> {
    if remaining(r) < n_points * SHP_POINT_LENGTH {
        return Err(ShpError::ParseError(format!("Record claims {} points, but only {} bytes remain", n_points, remaining(r))));
    }
    (0..n_points).map(|_| read_point(r)).collect()
}

/// Skips the Z and/or M blocks after a MultiPoint, PolyLine or Polygon.
///
/// Z data is mandatory in Z records; M data is optional everywhere.
fn skip_measures(r: &mut io::Cursor<&[u8]>, shape_type: ShapeType, n_points: usize) -> Result<(), ShpError> {
    let block_len = 16 + 8 * n_points;
    if shape_type.has_z() {
        skip(r, block_len, "Z data")?;
        skip_optional(r, block_len);
    } else if shape_type.has_m() {
        skip_optional(r, block_len);
    }
    Ok(())
}

fn parse_point(r: &mut io::Cursor<&[u8]>, shape_type: ShapeType) -> Result<ShpShape, ShpError> {
    let point = read_point(r)?;
    if shape_type.has_z() {
        skip(r, 8, "Z value")?;
        skip_optional(r, 8);
    } else if shape_type.has_m() {
        skip_optional(r, 8);
    }
    Ok(ShpShape::Point(point))
}

fn parse_multi_point(r: &mut io::Cursor<&[u8]>, shape_type: ShapeType) -> Result<ShpShape, ShpError> {
    skip(r, 32, "Bounding box")?;
    let n_points = read_count(r, "number of points")?;
    let points = read_points(r, n_points)?;
    skip_measures(r, shape_type, n_points)?;
    Ok(ShpShape::MultiPoint(points))
}

/// Reads the parts-and-points layout shared by PolyLine and Polygon.
fn parse_parts(r: &mut io::Cursor<&[u8]>, shape_type: ShapeType) -> Result<Vec<LineString>, ShpError> {
    skip(r, 32, "Bounding box")?;
    let n_parts = read_count(r, "number of parts")?;
    let n_points = read_count(r, "number of points")?;

    let needed_len = 4 * n_parts + SHP_POINT_LENGTH * n_points;
    if needed_len > remaining(r) {
        return Err(ShpError::ParseError(format!("Record needs {} bytes (it has {} parts and {} points), but only {} remain", needed_len, n_parts, n_points, remaining(r))));
    }

    let mut parts = Vec::<usize>::with_capacity(n_parts + 1);
    for _ in 0..n_parts {
        parts.push(read_count(r, "part index")?);
    }
    parts.push(n_points);

    let points = read_points(r, n_points)?;
    skip_measures(r, shape_type, n_points)?;

    let mut lines = Vec::<LineString>::with_capacity(n_parts);
    for (&part_start, &part_end) in parts.iter().tuple_windows() {
        if part_start >= part_end || part_end > n_points {
            return Err(ShpError::ParseError(format!("Record has a part with points {}-{}, but that's an invalid range for {} points", part_start, part_end, n_points)));
        }
        lines.push(LineString(points[part_start .. part_end].to_vec()));
    }

    Ok(lines)
}

/// Parses a record's content: everything after its 8-byte header.
///
/// Record types must be Null or compatible with `file_shape_type`.
pub fn parse_record(buf: &[u8], record_number: u32, file_shape_type: ShapeType) -> Result<ShpRecord, ShpError> {
    let mut r = io::Cursor::new(buf);

    let shape_type_code = r.read_i32::<LittleEndian>()?;
    let shape_type = match ShapeType::from_code(shape_type_code) {
        Some(shape_type) => shape_type,
        None => {
            return Err(ShpError::ParseError(format!("Record number {} has unsupported shape type {}", record_number, shape_type_code)));
        }
    };

    if !shape_type.is_compatible_with(file_shape_type) {
        return Err(ShpError::ParseError(format!("Record number {} has shape type {}, but the file holds {}", record_number, shape_type, file_shape_type)));
    }

    let shape = match shape_type.base() {
        ShapeType::Null => ShpShape::Null,
        ShapeType::Point => parse_point(&mut r, shape_type)?,
        ShapeType::MultiPoint => parse_multi_point(&mut r, shape_type)?,
        ShapeType::PolyLine => ShpShape::PolyLine(parse_parts(&mut r, shape_type)?),
        _ => ShpShape::Polygon(parse_parts(&mut r, shape_type)?),
    };

    Ok(ShpRecord {
        record_number: record_number,
        shape_type: shape_type,
        shape: shape,
    })
}

/// Reads an ESRI ".shp" Shapefile, one record at a time.
///
/// Each record's content is read whole before it is parsed, so a record that
/// fails to parse leaves the cursor at the start of the next record: the
/// iterator yields `Some(Err(...))` and carries on. Iteration stops at the
/// header's file length, at end of file, or after a truncated record.
///
/// # Example
///
/// ```
/// use std::io;
/// use shpio::geo::{BoundingBox, Geometry, Point};
/// use shpio::shapefile::header::ShapeType;
/// use shpio::shapefile::shp::{ShpReader, ShpShape, ShpWriter};
///
/// let mut writer = ShpWriter::new(ShapeType::Point, BoundingBox::new(1., 2., 1., 2.));
/// writer.add_record(Some(&Geometry::Point(Point(1., 2.)))).unwrap();
/// let mut bytes: Vec<u8> = vec![];
/// writer.write_shp(&mut bytes).unwrap();
///
/// // builder returns Result<ShpReader, ShpError>
/// let mut shp_reader = ShpReader::new(io::Cursor::new(bytes)).unwrap();
/// assert_eq!(128, shp_reader.header.file_n_bytes);
///
/// // shp_reader.next(), an Iterator method, returns
/// // Option<Result<ShpRecord, ShpError>>
/// let record = shp_reader.next().unwrap().unwrap();
/// assert_eq!(1, record.record_number);
/// assert_eq!(ShpShape::Point(Point(1., 2.)), record.shape);
/// assert!(shp_reader.next().is_none());
/// ```
#[derive(Debug)]
pub struct ShpReader<R: io::Read> {
    file: R,
    pub n_bytes_already_read: usize,
    pub header: ShpHeader,
    done: bool,
}

impl<R: io::Read> ShpReader<R> {
    pub fn new(mut file: R) -> Result<ShpReader<R>, ShpError> {
        let header = header::read_shp_header(&mut file)?;
        Ok(ShpReader {
            file: file,
            n_bytes_already_read: SHP_HEADER_LENGTH,
            header: header,
            done: false,
        })
    }

    /// Reads the next record and returns its header and content bytes.
    fn read_record_bytes(&mut self) -> Option<Result<(RecordHeader, Vec<u8>), ShpError>> {
        let mut header_buf = [ 0u8; SHP_RECORD_HEADER_LENGTH ];
        match self.file.read_exact(&mut header_buf) {
            Err(ref err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                return None;
            }
            Err(err) => {
                return Some(Err(ShpError::IOError(err)));
            }
            Ok(_) => {}
        }
        let record_header = header::parse_record_header(&header_buf);

        // take() means a corrupt length can't make us allocate gigabytes
        let mut buf = vec![];
        if let Err(err) = (&mut self.file).take(record_header.content_n_bytes as u64).read_to_end(&mut buf) {
            return Some(Err(ShpError::IOError(err)));
        }
        self.n_bytes_already_read += SHP_RECORD_HEADER_LENGTH + buf.len();

        if buf.len() < record_header.content_n_bytes {
            return Some(Err(ShpError::ParseError(format!("Record number {} is truncated: its header says {} bytes, but the file ends after {}", record_header.record_number, record_header.content_n_bytes, buf.len()))));
        }

        Some(Ok((record_header, buf)))
    }
}

impl<R: io::Read> Iterator for ShpReader<R> {
    type Item = Result<ShpRecord, ShpError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.n_bytes_already_read >= self.header.file_n_bytes {
            return None;
        }

        match self.read_record_bytes() {
            None => {
                self.done = true;
                None
            }
            Some(Err(err)) => {
                // We can't find the next record boundary
                self.done = true;
                Some(Err(err))
            }
            Some(Ok((record_header, buf))) => {
                Some(parse_record(&buf, record_header.record_number, self.header.shape_type))
            }
        }
    }
}

/// Opens an ESRI ".shp" Shapefile from the filesystem.
pub fn open(path: &Path) -> Result<ShpReader<io::BufReader<fs::File>>, ShpError> {
    let f = fs::File::open(path)?;
    ShpReader::new(io::BufReader::new(f))
}

fn write_bounding_box(w: &mut Vec<u8>, bbox: &BoundingBox) -> io::Result<()> {
    w.write_f64::<LittleEndian>(bbox.min_lon)?;
    w.write_f64::<LittleEndian>(bbox.min_lat)?;
    w.write_f64::<LittleEndian>(bbox.max_lon)?;
    w.write_f64::<LittleEndian>(bbox.max_lat)?;
    Ok(())
}

fn write_point(w: &mut Vec<u8>, point: &Point) -> io::Result<()> {
    w.write_f64::<LittleEndian>(point.0)?;
    w.write_f64::<LittleEndian>(point.1)?;
    Ok(())
}

/// Writes the parts-and-points layout shared by PolyLine and Polygon.
fn write_parts<'a, T: IntoIterator<Item=&'a LineString>>(w: &mut Vec<u8>, shape_type: ShapeType, parts: T) -> io::Result<()> {
    let parts: Vec<&LineString> = parts.into_iter().collect();
    let n_points: usize = parts.iter().map(|p| p.len()).sum();

    w.write_i32::<LittleEndian>(shape_type.code())?;
    write_bounding_box(w, &BoundingBox::of_points(parts.iter().flat_map(|p| p.points())))?;
    w.write_i32::<LittleEndian>(parts.len() as i32)?;
    w.write_i32::<LittleEndian>(n_points as i32)?;

    let mut start = 0;
    for part in parts.iter() {
        w.write_i32::<LittleEndian>(start as i32)?;
        start += part.len();
    }

    for point in parts.iter().flat_map(|p| p.points()) {
        write_point(w, point)?;
    }
    Ok(())
}

/// Serializes a record's content (no record header).
///
/// Polygon rings are written in order, as given: callers must wind them.
pub fn encode_record_content(geometry: Option<&Geometry>) -> io::Result<Vec<u8>> {
    let mut w = Vec::<u8>::new();

    match geometry {
        None => {
            w.write_i32::<LittleEndian>(ShapeType::Null.code())?;
        }
        Some(&Geometry::Point(ref point)) => {
            w.write_i32::<LittleEndian>(ShapeType::Point.code())?;
            write_point(&mut w, point)?;
        }
        Some(&Geometry::MultiPoint(ref points)) => {
            w.write_i32::<LittleEndian>(ShapeType::MultiPoint.code())?;
            write_bounding_box(&mut w, &BoundingBox::of_points(points.iter()))?;
            w.write_i32::<LittleEndian>(points.len() as i32)?;
            for point in points.iter() {
                write_point(&mut w, point)?;
            }
        }
        Some(&Geometry::MultiLineString(ref lines)) => {
            write_parts(&mut w, ShapeType::PolyLine, lines.iter())?;
        }
        Some(&Geometry::MultiPolygon(ref polygons)) => {
            write_parts(&mut w, ShapeType::Polygon, polygons.iter().flat_map(|p| p.rings()))?;
        }
    }

    Ok(w)
}

/// Buffers ".shp" records so the file header and each record header can
/// hold lengths that are only known after the content is serialized.
///
/// Also remembers where each record went, for the ".shx" index.
#[derive(Debug)]
pub struct ShpWriter {
    shape_type: ShapeType,
    bounding_box: BoundingBox,
    records: Vec<u8>,
    index: Vec<(usize, usize)>,
}

impl ShpWriter {
    pub fn new(shape_type: ShapeType, bounding_box: BoundingBox) -> ShpWriter {
        ShpWriter {
            shape_type: shape_type,
            bounding_box: bounding_box,
            records: vec![],
            index: vec![],
        }
    }

    pub fn n_records(&self) -> usize {
        self.index.len()
    }

    /// Appends a record, numbered 1 more than the last, and returns its
    /// record number.
    pub fn add_record(&mut self, geometry: Option<&Geometry>) -> io::Result<u32> {
        let content = encode_record_content(geometry)?;
        let record_number = self.index.len() as u32 + 1;
        let offset = SHP_HEADER_LENGTH + self.records.len();

        let record_header = RecordHeader {
            record_number: record_number,
            content_n_bytes: content.len(),
        };
        self.records.extend_from_slice(&header::encode_record_header(&record_header));
        self.records.extend_from_slice(&content);
        self.index.push((offset, content.len()));

        Ok(record_number)
    }

    fn header(&self, file_n_bytes: usize) -> ShpHeader {
        ShpHeader::new(file_n_bytes, self.shape_type, self.bounding_box)
    }

    pub fn write_shp<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let header = self.header(SHP_HEADER_LENGTH + self.records.len());
        w.write_all(&header::encode_shp_header(&header))?;
        w.write_all(&self.records)?;
        Ok(())
    }

    /// Writes the ".shx" index: one big-endian (offset, length) pair per
    /// record, both in 16-bit words.
    pub fn write_shx<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let header = self.header(SHP_HEADER_LENGTH + SHX_ENTRY_LENGTH * self.index.len());
        w.write_all(&header::encode_shp_header(&header))?;

        let mut buf = [ 0u8; SHX_ENTRY_LENGTH ];
        for &(offset, content_n_bytes) in self.index.iter() {
            BigEndian::write_u32(&mut buf[0..4], (offset / 2) as u32);
            BigEndian::write_u32(&mut buf[4..8], (content_n_bytes / 2) as u32);
            w.write_all(&buf)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geo::Polygon;

    fn ring(coords: &[(f64, f64)]) -> LineString {
        LineString(coords.iter().map(|&(x, y)| Point(x, y)).collect())
    }

    fn read_all(writer: &ShpWriter) -> Vec<Result<ShpRecord, ShpError>> {
        let mut bytes = vec![];
        writer.write_shp(&mut bytes).unwrap();
        ShpReader::new(io::Cursor::new(bytes)).unwrap().collect()
    }

    #[test]
    fn point_record_layout() {
        let content = encode_record_content(Some(&Geometry::Point(Point(1.5, -2.)))).unwrap();
        assert_eq!(20, content.len());
        assert_eq!(1, LittleEndian::read_i32(&content[0..4]));
        assert_eq!(1.5, LittleEndian::read_f64(&content[4..12]));
        assert_eq!(-2., LittleEndian::read_f64(&content[12..20]));
    }

    #[test]
    fn null_record_layout() {
        let content = encode_record_content(None).unwrap();
        assert_eq!(vec![ 0, 0, 0, 0 ], content);
    }

    #[test]
    fn polygon_record_layout() {
        let polygon = Polygon::new(
            ring(&[ (0., 0.), (0., 4.), (4., 4.), (4., 0.), (0., 0.) ]),
            vec![ ring(&[ (1., 1.), (2., 1.), (2., 2.), (1., 2.), (1., 1.) ]) ],
        );
        let content = encode_record_content(Some(&Geometry::polygon(polygon))).unwrap();

        assert_eq!(44 + 4 * 2 + 16 * 10, content.len());
        assert_eq!(5, LittleEndian::read_i32(&content[0..4]));
        assert_eq!(4., LittleEndian::read_f64(&content[20..28])); // xmax
        assert_eq!(2, LittleEndian::read_i32(&content[36..40]));
        assert_eq!(10, LittleEndian::read_i32(&content[40..44]));
        assert_eq!(0, LittleEndian::read_i32(&content[44..48]));
        assert_eq!(5, LittleEndian::read_i32(&content[48..52]));
    }

    #[test]
    fn writer_index_points_at_records() {
        let mut writer = ShpWriter::new(ShapeType::Point, BoundingBox::default());
        writer.add_record(Some(&Geometry::Point(Point(1., 1.)))).unwrap();
        writer.add_record(None).unwrap();
        writer.add_record(Some(&Geometry::Point(Point(2., 2.)))).unwrap();

        let mut shp = vec![];
        writer.write_shp(&mut shp).unwrap();
        let mut shx = vec![];
        writer.write_shx(&mut shx).unwrap();

        assert_eq!(100 + 28 + 12 + 28, shp.len());
        assert_eq!((shp.len() / 2) as i32, BigEndian::read_i32(&shp[24..28]));
        assert_eq!(100 + 3 * 8, shx.len());
        assert_eq!(62, BigEndian::read_i32(&shx[24..28]));

        let offsets: Vec<(u32, u32)> = shx[100..].chunks(8)
            .map(|c| (BigEndian::read_u32(&c[0..4]), BigEndian::read_u32(&c[4..8])))
            .collect();
        assert_eq!(vec![ (50, 10), (64, 2), (70, 10) ], offsets);

        // each offset lands on the matching record header
        for (i, &(offset, _)) in offsets.iter().enumerate() {
            let at = offset as usize * 2;
            assert_eq!(i as u32 + 1, BigEndian::read_u32(&shp[at .. at + 4]));
        }
    }

    #[test]
    fn read_round_trip_all_kinds() {
        let mut writer = ShpWriter::new(ShapeType::PolyLine, BoundingBox::default());
        let lines = vec![
            ring(&[ (0., 0.), (1., 1.) ]),
            ring(&[ (5., 5.), (6., 5.), (6., 7.) ]),
        ];
        writer.add_record(Some(&Geometry::MultiLineString(lines.clone()))).unwrap();
        writer.add_record(None).unwrap();

        let records: Vec<ShpRecord> = read_all(&writer).into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(2, records.len());
        assert_eq!(ShpShape::PolyLine(lines), records[0].shape);
        assert_eq!(ShapeType::Null, records[1].shape_type);
        assert_eq!(ShpShape::Null, records[1].shape);
    }

    #[test]
    fn bad_record_does_not_stop_iteration() {
        let mut writer = ShpWriter::new(ShapeType::MultiPoint, BoundingBox::default());
        writer.add_record(Some(&Geometry::MultiPoint(vec![ Point(1., 1.) ]))).unwrap();
        writer.add_record(Some(&Geometry::MultiPoint(vec![ Point(2., 2.) ]))).unwrap();

        let mut bytes = vec![];
        writer.write_shp(&mut bytes).unwrap();
        // first record: claim a huge number of points
        LittleEndian::write_i32(&mut bytes[100 + 8 + 36 .. 100 + 8 + 40], 1000);

        let results: Vec<_> = ShpReader::new(io::Cursor::new(bytes)).unwrap().collect();
        assert_eq!(2, results.len());
        assert!(results[0].is_err());
        assert_eq!(ShpShape::MultiPoint(vec![ Point(2., 2.) ]), results[1].as_ref().unwrap().shape);
    }

    #[test]
    fn incompatible_record_type_is_an_error() {
        let mut writer = ShpWriter::new(ShapeType::Polygon, BoundingBox::default());
        writer.add_record(Some(&Geometry::Point(Point(1., 1.)))).unwrap();
        let results = read_all(&writer);
        assert_eq!(1, results.len());
        assert!(results[0].is_err());
    }

    #[test]
    fn truncated_file_ends_iteration() {
        let mut writer = ShpWriter::new(ShapeType::Point, BoundingBox::default());
        writer.add_record(Some(&Geometry::Point(Point(1., 1.)))).unwrap();
        writer.add_record(Some(&Geometry::Point(Point(2., 2.)))).unwrap();

        let mut bytes = vec![];
        writer.write_shp(&mut bytes).unwrap();
        bytes.truncate(100 + 28 + 8 + 10);

        let results: Vec<_> = ShpReader::new(io::Cursor::new(bytes)).unwrap().collect();
        assert_eq!(2, results.len());
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn clean_eof_ends_iteration() {
        let mut writer = ShpWriter::new(ShapeType::Point, BoundingBox::default());
        writer.add_record(Some(&Geometry::Point(Point(1., 1.)))).unwrap();

        let mut bytes = vec![];
        writer.write_shp(&mut bytes).unwrap();
        // header claims more bytes than there are
        BigEndian::write_i32(&mut bytes[24..28], 1000);

        let results: Vec<_> = ShpReader::new(io::Cursor::new(bytes)).unwrap().collect();
        assert_eq!(1, results.len());
        assert!(results[0].is_ok());
    }

    fn z_record(shape_type: ShapeType, with_m: bool) -> Vec<u8> {
        // PolyLineZ/PolygonZ with one part of two points
        let mut w = vec![];
        w.write_i32::<LittleEndian>(shape_type.code()).unwrap();
        write_bounding_box(&mut w, &BoundingBox::new(0., 0., 1., 1.)).unwrap();
        w.write_i32::<LittleEndian>(1).unwrap();
        w.write_i32::<LittleEndian>(2).unwrap();
        w.write_i32::<LittleEndian>(0).unwrap();
        write_point(&mut w, &Point(0., 0.)).unwrap();
        write_point(&mut w, &Point(1., 1.)).unwrap();
        for _ in 0..4 {
            w.write_f64::<LittleEndian>(9.).unwrap(); // z range + z array
        }
        if with_m {
            for _ in 0..4 {
                w.write_f64::<LittleEndian>(7.).unwrap(); // m range + m array
            }
        }
        w
    }

    #[test]
    fn parse_z_with_and_without_m() {
        let expected = ShpShape::PolyLine(vec![ ring(&[ (0., 0.), (1., 1.) ]) ]);

        let with_m = parse_record(&z_record(ShapeType::PolyLineZ, true), 1, ShapeType::PolyLineZ).unwrap();
        assert_eq!(expected, with_m.shape);
        assert_eq!(ShapeType::PolyLineZ, with_m.shape_type);

        let without_m = parse_record(&z_record(ShapeType::PolyLineZ, false), 1, ShapeType::PolyLineZ).unwrap();
        assert_eq!(expected, without_m.shape);

        let measured = parse_record(&z_record(ShapeType::PolyLineM, false), 1, ShapeType::PolyLineM).unwrap();
        assert_eq!(expected, measured.shape);
    }

    #[test]
    fn parse_z_without_z_data_is_an_error() {
        let mut buf = z_record(ShapeType::PolyLineZ, false);
        buf.truncate(buf.len() - 8);
        assert!(parse_record(&buf, 1, ShapeType::PolyLineZ).is_err());
    }

    #[test]
    fn parse_point_m_and_z() {
        let mut buf = vec![];
        buf.write_i32::<LittleEndian>(11).unwrap();
        write_point(&mut buf, &Point(3., 4.)).unwrap();
        buf.write_f64::<LittleEndian>(100.).unwrap();
        buf.write_f64::<LittleEndian>(5.).unwrap();
        assert_eq!(ShpShape::Point(Point(3., 4.)), parse_record(&buf, 1, ShapeType::PointZ).unwrap().shape);

        let mut buf = vec![];
        buf.write_i32::<LittleEndian>(21).unwrap();
        write_point(&mut buf, &Point(3., 4.)).unwrap();
        buf.write_f64::<LittleEndian>(5.).unwrap();
        assert_eq!(ShpShape::Point(Point(3., 4.)), parse_record(&buf, 1, ShapeType::PointM).unwrap().shape);
    }

    #[test]
    fn parts_out_of_order_are_an_error() {
        let mut buf = vec![];
        buf.write_i32::<LittleEndian>(3).unwrap();
        write_bounding_box(&mut buf, &BoundingBox::default()).unwrap();
        buf.write_i32::<LittleEndian>(2).unwrap();
        buf.write_i32::<LittleEndian>(3).unwrap();
        buf.write_i32::<LittleEndian>(2).unwrap();
        buf.write_i32::<LittleEndian>(1).unwrap();
        for i in 0..3 {
            write_point(&mut buf, &Point(i as f64, 0.)).unwrap();
        }
        assert!(parse_record(&buf, 1, ShapeType::PolyLine).is_err());
    }
}
