use std::fs;
use std::mem;
use std::path::{Path, PathBuf};
use encoding::EncodingRef;
use itertools::{Either, Itertools};
use crate::feature::{Attributes, Feature, FeatureCollection};
use crate::geo::{Geometry, LineString, Polygon, WindingOrder};
use super::dbf::{self, FieldDescriptor};
use super::error::{DbfError, ShapefileError};
use super::header::SHP_VERSION;
use super::prj;
use super::shp::{self, ShpRecord, ShpShape};

fn push_warning(warnings: &mut Vec<String>, warning: String) {
    warn!("{}", warning);
    warnings.push(warning);
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|e| e.to_str()).map_or(false, |e| e.eq_ignore_ascii_case(extension))
}

/// Strips a trailing ".shp" (in any case). Other dots belong to the name:
/// "my.data" stays "my.data".
fn base_path(path: &Path) -> PathBuf {
    if has_extension(path, "shp") {
        path.with_extension("")
    } else {
        path.to_path_buf()
    }
}

/// Returns `path`'s sibling with the given extension: "roads.shp" and
/// "roads" both give "roads.dbf".
pub fn sibling_path(path: &Path, extension: &str) -> PathBuf {
    let mut name = base_path(path).into_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Finds `path`'s sibling with the given extension, ignoring the
/// extension's case.
pub fn find_file(path: &Path, extension: &str) -> Option<PathBuf> {
    let exact = sibling_path(path, extension);
    if exact.is_file() {
        return Some(exact);
    }

    let base = base_path(path);
    let stem = base.file_name()?;
    let dir = match base.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    fs::read_dir(dir).ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|p| p.is_file() && p.file_stem() == Some(stem) && has_extension(p, extension))
}

/// Sorts a Polygon record's rings into Polygons.
///
/// A clockwise ring starts a new Polygon. A counter-clockwise ring is a hole
/// in the most recent Polygon, or, if there isn't one yet, a Polygon of its
/// own.
pub fn assemble_polygons(rings: Vec<LineString>) -> Vec<Polygon> {
    let mut polygons = Vec::<Polygon>::new();

    for ring in rings.into_iter() {
        match (ring.winding_order(), polygons.last_mut()) {
            (WindingOrder::CounterClockwise, Some(polygon)) => polygon.interiors.push(ring),
            _ => polygons.push(Polygon::new(ring, vec![])),
        }
    }

    polygons
}

fn record_to_feature(record: ShpRecord, attributes: Attributes) -> Feature {
    let geometry = match record.shape {
        ShpShape::Null => None,
        ShpShape::Point(point) => Some(Geometry::Point(point)),
        ShpShape::MultiPoint(points) => Some(Geometry::MultiPoint(points)),
        ShpShape::PolyLine(lines) => Some(Geometry::MultiLineString(lines)),
        ShpShape::Polygon(rings) => Some(Geometry::MultiPolygon(assemble_polygons(rings))),
    };
    let bounding_box = geometry.as_ref().and_then(|g| g.bounding_box());

    Feature {
        record_number: record.record_number,
        shape_type: record.shape_type,
        geometry: geometry,
        attributes: attributes,
        bounding_box: bounding_box,
    }
}

/// Reads the ".prj" text, if there is any.
fn read_projection(shp_path: &Path, warnings: &mut Vec<String>) -> Option<String> {
    let path = find_file(shp_path, "prj")?;

    match fs::read(&path) {
        Err(err) => {
            push_warning(warnings, format!("Could not read projection file {}: {}", path.display(), err));
            None
        }
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            if !prj::looks_like_wgs84(&text) {
                push_warning(warnings, format!("Projection does not look like WGS84; coordinates are returned as stored, without reprojection: {}", text.trim()));
            }
            Some(text)
        }
    }
}

/// Reads every ".dbf" row that isn't deleted. Rows that fail to parse come
/// back empty, so later rows keep their positions.
///
/// Returns None if there is no ".dbf" to read.
fn read_attributes(shp_path: &Path, encoding: EncodingRef, warnings: &mut Vec<String>) -> Option<(Vec<FieldDescriptor>, Vec<Attributes>)> {
    let path = match find_file(shp_path, "dbf") {
        Some(path) => path,
        None => {
            push_warning(warnings, format!("No attribute file found beside {}; features have no attributes", shp_path.display()));
            return None;
        }
    };

    let reader = match dbf::open(&path, encoding) {
        Ok(reader) => reader,
        Err(err) => {
            push_warning(warnings, format!("Could not read attribute file {}: {}; features have no attributes", path.display(), err));
            return None;
        }
    };

    debug!("Reading {}: {:?}", path.display(), reader.meta.header);
    for warning in reader.meta.warnings.iter() {
        push_warning(warnings, warning.clone());
    }

    let fields = reader.fields().to_vec();
    let n_records = reader.meta.header.n_records;
    let mut rows = Vec::<Attributes>::with_capacity(n_records);

    for (index, result) in reader.enumerate() {
        match result {
            Ok(ref record) if record.deleted => {
                push_warning(warnings, format!("Attribute record {} is marked deleted; skipped", index + 1));
            }
            Ok(record) => {
                rows.push(record.attributes);
            }
            Err(DbfError::IOError(err)) => {
                push_warning(warnings, format!("Attribute file ended after {} of {} records: {}", index, n_records, err));
            }
            Err(err) => {
                push_warning(warnings, format!("Attribute record {}: {}; using empty attributes", index + 1, err));
                rows.push(Attributes::new());
            }
        }
    }

    Some((fields, rows))
}

/// Reads a Shapefile: ".shp" plus whichever of ".dbf" and ".prj" exist.
///
/// Fails only if the ".shp" file is missing or its header is invalid. Any
/// other fault is described in the returned collection's `warnings`.
pub fn read(path: &Path, encoding: EncodingRef) -> Result<FeatureCollection, ShapefileError> {
    let shp_path = if has_extension(path, "shp") && path.is_file() {
        path.to_path_buf()
    } else {
        match find_file(path, "shp") {
            Some(shp_path) => shp_path,
            None => return Err(ShapefileError::MissingFile(sibling_path(path, "shp"))),
        }
    };
    debug!("Reading {}", shp_path.display());

    let mut warnings = Vec::<String>::new();

    let projection_text = read_projection(&shp_path, &mut warnings);

    let (field_descriptors, mut rows, has_dbf) = match read_attributes(&shp_path, encoding, &mut warnings) {
        Some((fields, rows)) => (fields, rows, true),
        None => (vec![], vec![], false),
    };

    let shp_reader = shp::open(&shp_path)?;
    let header = shp_reader.header;
    debug!("Read header of {}: {:?}", shp_path.display(), header);
    if header.version != SHP_VERSION {
        push_warning(&mut warnings, format!("Geometry file has version {}, expected {}", header.version, SHP_VERSION));
    }

    let mut n_records = 0;
    let (features, record_warnings): (Vec<Feature>, Vec<String>) = shp_reader
        .enumerate()
        .map(|(index, result)| {
            n_records += 1;
            match result {
                Ok(record) => {
                    let attributes = rows.get_mut(index).map(mem::take).unwrap_or_default();
                    Ok(record_to_feature(record, attributes))
                }
                Err(err) => Err(format!("Geometry record {}: {}; skipped", index + 1, err)),
            }
        })
        .partition_map(|result| match result {
            Ok(feature) => Either::Left(feature),
            Err(warning) => Either::Right(warning),
        });

    for warning in record_warnings.into_iter() {
        push_warning(&mut warnings, warning);
    }
    if has_dbf && n_records != rows.len() {
        push_warning(&mut warnings, format!("Geometry file has {} records, but attribute file has {} rows", n_records, rows.len()));
    }

    info!("Read {} features from {} ({} warnings)", features.len(), shp_path.display(), warnings.len());

    Ok(FeatureCollection {
        shape_type: header.shape_type,
        features: features,
        bounding_box: Some(header.bounding_box),
        projection_text: projection_text,
        field_descriptors: field_descriptors,
        warnings: warnings,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geo::Point;

    fn ring(coords: &[(f64, f64)]) -> LineString {
        LineString(coords.iter().map(|&(x, y)| Point(x, y)).collect())
    }

    fn cw(x: f64, y: f64, size: f64) -> LineString {
        ring(&[ (x, y), (x, y + size), (x + size, y + size), (x + size, y), (x, y) ])
    }

    fn ccw(x: f64, y: f64, size: f64) -> LineString {
        ring(&[ (x, y), (x + size, y), (x + size, y + size), (x, y + size), (x, y) ])
    }

    #[test]
    fn one_outer_ring() {
        let polygons = assemble_polygons(vec![ cw(0., 0., 10.) ]);
        assert_eq!(vec![ Polygon::new(cw(0., 0., 10.), vec![]) ], polygons);
    }

    #[test]
    fn holes_follow_their_outer_ring() {
        let polygons = assemble_polygons(vec![
            cw(0., 0., 10.),
            ccw(1., 1., 2.),
            ccw(5., 5., 2.),
            cw(20., 20., 10.),
            ccw(21., 21., 1.),
        ]);
        assert_eq!(2, polygons.len());
        assert_eq!(vec![ ccw(1., 1., 2.), ccw(5., 5., 2.) ], polygons[0].interiors);
        assert_eq!(cw(20., 20., 10.), polygons[1].exterior);
        assert_eq!(vec![ ccw(21., 21., 1.) ], polygons[1].interiors);
    }

    #[test]
    fn orphan_hole_becomes_outer_ring() {
        let polygons = assemble_polygons(vec![ ccw(1., 1., 2.), cw(0., 0., 10.) ]);
        assert_eq!(2, polygons.len());
        assert_eq!(ccw(1., 1., 2.), polygons[0].exterior);
        assert!(polygons[0].interiors.is_empty());
        assert_eq!(cw(0., 0., 10.), polygons[1].exterior);
    }

    #[test]
    fn find_file_ignores_extension_case() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("roads.SHP"), b"").unwrap();
        fs::write(dir.path().join("roads.Dbf"), b"").unwrap();

        let shp = find_file(&dir.path().join("roads"), "shp").unwrap();
        assert_eq!(dir.path().join("roads.SHP"), shp);
        assert_eq!(Some(dir.path().join("roads.Dbf")), find_file(&shp, "dbf"));
        assert_eq!(None, find_file(&shp, "prj"));
    }

    #[test]
    fn sibling_path_keeps_dots_in_name() {
        assert_eq!(PathBuf::from("dir/my.data.dbf"), sibling_path(Path::new("dir/my.data"), "dbf"));
        assert_eq!(PathBuf::from("dir/my.data.dbf"), sibling_path(Path::new("dir/my.data.shp"), "dbf"));
        assert_eq!(PathBuf::from("roads.prj"), sibling_path(Path::new("roads.SHP"), "prj"));
        assert_eq!(PathBuf::from("roads.shx"), sibling_path(Path::new("roads"), "shx"));
    }

    #[test]
    fn find_file_with_dotted_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("my.data.shp"), b"").unwrap();
        fs::write(dir.path().join("my.data.DBF"), b"").unwrap();
        fs::write(dir.path().join("my.shp"), b"").unwrap();

        let base = dir.path().join("my.data");
        assert_eq!(Some(dir.path().join("my.data.shp")), find_file(&base, "shp"));
        assert_eq!(Some(dir.path().join("my.data.DBF")), find_file(&base, "dbf"));
        assert_eq!(None, find_file(&dir.path().join("my"), "dbf"));
    }
}
