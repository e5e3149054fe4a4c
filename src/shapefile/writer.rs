use std::collections::HashSet;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use chrono::Local;
use encoding::EncodingRef;
use crate::feature::{Feature, FeatureCollection};
use crate::geo::{BoundingBox, Geometry, LineString, Polygon, WindingOrder};
use super::dbf::{self, DbfWriter, FieldDescriptor};
use super::error::ShapefileError;
use super::header::ShapeType;
use super::prj;
use super::reader::sibling_path;
use super::schema::Schema;
use super::shp::ShpWriter;

fn invalid(message: String) -> ShapefileError {
    ShapefileError::InvalidArgument(message)
}

/// Makes sure `collection` can be written, before we touch the filesystem.
fn validate(path: &Path, collection: &FeatureCollection) -> Result<(), ShapefileError> {
    if path.as_os_str().is_empty() {
        return Err(invalid(String::from("path is empty")));
    }

    let shape_type = collection.shape_type.base();
    for (i, feature) in collection.features.iter().enumerate() {
        if let Some(ref geometry) = feature.geometry {
            let geometry_type = ShapeType::of_geometry(geometry);
            if geometry_type != shape_type {
                return Err(invalid(format!("feature {} has {} geometry, but the collection's shape type is {}", i, geometry_type, collection.shape_type)));
            }
        }
    }

    let mut names = HashSet::<&str>::new();
    for field in collection.field_descriptors.iter() {
        if !names.insert(field.name.as_str()) {
            return Err(invalid(format!("field '{}' is described twice", field.name)));
        }
    }

    Ok(())
}

fn schema(collection: &FeatureCollection, encoding: EncodingRef) -> Result<Schema, ShapefileError> {
    if collection.field_descriptors.is_empty() {
        return Ok(Schema::infer(&collection.features, encoding));
    }

    // Normalize, then check names still differ after truncation
    let fields: Vec<FieldDescriptor> = collection.field_descriptors.iter()
        .map(|f| FieldDescriptor::new(&f.name, f.field_type, f.length, f.decimal_count))
        .collect();
    let mut names = HashSet::<&str>::new();
    for field in fields.iter() {
        if !names.insert(field.name.as_str()) {
            return Err(invalid(format!("two fields share the column name '{}'", field.name)));
        }
    }

    Ok(Schema {
        fields: fields,
        keys: collection.field_descriptors.iter().map(|f| f.name.clone()).collect(),
    })
}

/// Folds every coordinate of every geometry. All zeros if there are none.
pub fn features_bounding_box(features: &[Feature]) -> BoundingBox {
    features.iter()
        .filter_map(|f| f.geometry.as_ref().and_then(|g| g.bounding_box()))
        .fold(None, |acc: Option<BoundingBox>, bbox| Some(match acc {
            None => bbox,
            Some(acc) => acc.union(&bbox),
        }))
        .unwrap_or_default()
}

fn closed(ring: &LineString) -> LineString {
    let mut ring = ring.clone();
    if !ring.is_closed() {
        if let Some(&first) = ring.points().first() {
            ring.points_mut().push(first);
        }
    }
    ring
}

/// Returns a copy of `geometry` ready to encode: empty parts dropped, rings
/// closed and wound the way readers expect (outer rings clockwise, holes
/// counter-clockwise).
///
/// A zero-length part cannot be stored, so each dropped part is logged. A
/// line or polygon geometry left with no parts becomes None, a Null record.
pub fn normalize_geometry(geometry: &Geometry) -> Option<Geometry> {
    match geometry {
        &Geometry::MultiLineString(ref lines) => {
            let kept: Vec<LineString> = lines.iter().filter(|line| !line.is_empty()).cloned().collect();
            if kept.len() < lines.len() {
                warn!("Dropping {} empty line(s) of {}", lines.len() - kept.len(), lines.len());
            }
            if kept.is_empty() {
                None
            } else {
                Some(Geometry::MultiLineString(kept))
            }
        }
        &Geometry::MultiPolygon(ref polygons) => {
            let mut kept = Vec::<Polygon>::with_capacity(polygons.len());
            for polygon in polygons.iter() {
                if polygon.exterior.is_empty() {
                    warn!("Dropping a polygon with an empty outer ring");
                    continue;
                }
                let holes: Vec<LineString> = polygon.interiors.iter()
                    .filter(|hole| !hole.is_empty())
                    .map(|hole| closed(hole).wound(WindingOrder::CounterClockwise))
                    .collect();
                if holes.len() < polygon.interiors.len() {
                    warn!("Dropping {} empty hole(s) of {}", polygon.interiors.len() - holes.len(), polygon.interiors.len());
                }
                kept.push(Polygon::new(closed(&polygon.exterior).wound(WindingOrder::Clockwise), holes));
            }
            if kept.is_empty() {
                None
            } else {
                Some(Geometry::MultiPolygon(kept))
            }
        }
        other => Some(other.clone()),
    }
}

/// Writes `collection` as ".shp", ".shx", ".dbf" and ".prj" files named
/// after `path`. Creates missing parent directories.
///
/// Fails with InvalidArgument, before writing anything, if a feature's
/// geometry does not suit the collection's shape type or the columns don't
/// fit in a ".dbf".
pub fn write(path: &Path, collection: &FeatureCollection, encoding: EncodingRef) -> Result<(), ShapefileError> {
    validate(path, collection)?;

    let schema = schema(collection, encoding)?;
    dbf::dbf_layout(&schema.fields, collection.features.len()).map_err(invalid)?;
    let bounding_box = collection.bounding_box.unwrap_or_else(|| features_bounding_box(&collection.features));

    let mut shp_writer = ShpWriter::new(collection.shape_type.base(), bounding_box);
    for feature in collection.features.iter() {
        let geometry = feature.geometry.as_ref().and_then(normalize_geometry);
        shp_writer.add_record(geometry.as_ref())?;
    }

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    let shp_path = sibling_path(path, "shp");
    debug!("Writing {} records to {}", shp_writer.n_records(), shp_path.display());
    let mut shp_file = BufWriter::new(fs::File::create(&shp_path)?);
    shp_writer.write_shp(&mut shp_file)?;
    shp_file.flush()?;

    let mut shx_file = BufWriter::new(fs::File::create(sibling_path(path, "shx"))?);
    shp_writer.write_shx(&mut shx_file)?;
    shx_file.flush()?;

    let dbf_file = BufWriter::new(fs::File::create(sibling_path(path, "dbf"))?);
    let mut dbf_writer = DbfWriter::new(dbf_file, schema.fields.clone(), collection.features.len(), Local::now().date_naive(), encoding)?;
    for feature in collection.features.iter() {
        dbf_writer.write_record(&schema.row(feature))?;
    }
    dbf_writer.finish()?;

    if let Some(ref text) = collection.projection_text {
        if !prj::looks_like_wgs84(text) {
            warn!("Writing WGS84 projection, though coordinates were described as: {}", text.trim());
        }
    }
    fs::write(sibling_path(path, "prj"), prj::WGS84_WKT)?;

    info!("Wrote {} features ({} columns) to {}", collection.features.len(), schema.fields.len(), shp_path.display());
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use encoding::all::UTF_8;
    use crate::geo::Point;

    fn ring(coords: &[(f64, f64)]) -> LineString {
        LineString(coords.iter().map(|&(x, y)| Point(x, y)).collect())
    }

    #[test]
    fn normalize_geometry_closes_and_winds() {
        let geometry = Geometry::polygon(Polygon::new(
            ring(&[ (0., 0.), (10., 0.), (10., 10.), (0., 10.) ]), // ccw, unclosed
            vec![ ring(&[ (1., 1.), (1., 2.), (2., 2.), (2., 1.), (1., 1.) ]) ], // cw
        ));

        match normalize_geometry(&geometry) {
            Some(Geometry::MultiPolygon(polygons)) => {
                let polygon = &polygons[0];
                assert!(polygon.exterior.is_closed());
                assert_eq!(5, polygon.exterior.len());
                assert_eq!(WindingOrder::Clockwise, polygon.exterior.winding_order());
                assert_eq!(WindingOrder::CounterClockwise, polygon.interiors[0].winding_order());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn normalize_geometry_leaves_lines_alone() {
        let geometry = Geometry::line_string(vec![ Point(0., 0.), Point(1., 1.) ]);
        assert_eq!(Some(geometry.clone()), normalize_geometry(&geometry));
    }

    #[test]
    fn empty_parts_are_dropped() {
        let lines = Geometry::MultiLineString(vec![ LineString::default(), ring(&[ (0., 0.), (1., 1.) ]) ]);
        assert_eq!(Some(Geometry::line_string(vec![ Point(0., 0.), Point(1., 1.) ])), normalize_geometry(&lines));

        let outer = ring(&[ (0., 0.), (0., 10.), (10., 10.), (10., 0.), (0., 0.) ]);
        let polygons = Geometry::MultiPolygon(vec![
            Polygon::new(LineString::default(), vec![]),
            Polygon::new(outer.clone(), vec![ LineString::default() ]),
        ]);
        assert_eq!(Some(Geometry::polygon(Polygon::new(outer, vec![]))), normalize_geometry(&polygons));
    }

    #[test]
    fn nothing_left_is_null() {
        assert_eq!(None, normalize_geometry(&Geometry::MultiLineString(vec![ LineString::default() ])));
        assert_eq!(None, normalize_geometry(&Geometry::polygon(Polygon::default())));
        assert_eq!(Some(Geometry::MultiPoint(vec![])), normalize_geometry(&Geometry::MultiPoint(vec![])));
    }

    #[test]
    fn bounding_box_of_nothing_is_zero() {
        assert_eq!(BoundingBox::default(), features_bounding_box(&[ Feature::new(None) ]));
    }

    #[test]
    fn bounding_box_folds_features() {
        let features = vec![
            Feature::new(Some(Geometry::Point(Point(-0.1278, 51.5074)))),
            Feature::new(None),
            Feature::new(Some(Geometry::Point(Point(2.3522, 48.8566)))),
        ];
        assert_eq!(BoundingBox::new(-0.1278, 48.8566, 2.3522, 51.5074), features_bounding_box(&features));
    }

    #[test]
    fn mismatched_geometry_is_rejected_before_io() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("points.shp");
        let collection = FeatureCollection::with_features(ShapeType::Point, vec![
            Feature::new(Some(Geometry::line_string(vec![ Point(0., 0.), Point(1., 1.) ]))),
        ]);

        match write(&path, &collection, UTF_8) {
            Err(ShapefileError::InvalidArgument(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert!(!dir.path().join("sub").exists());
    }

    #[test]
    fn empty_path_is_rejected() {
        let collection = FeatureCollection::new(ShapeType::Point);
        match write(Path::new(""), &collection, UTF_8) {
            Err(ShapefileError::InvalidArgument(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn duplicate_column_names_are_rejected() {
        let mut collection = FeatureCollection::new(ShapeType::Point);
        collection.field_descriptors = vec![
            FieldDescriptor::character("population_1990", 10),
            FieldDescriptor::character("population_2000", 10),
        ];
        match schema(&collection, UTF_8) {
            Err(ShapefileError::InvalidArgument(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn oversized_columns_are_rejected_before_io() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide");
        let mut collection = FeatureCollection::with_features(ShapeType::Point, vec![
            Feature::new(Some(Geometry::Point(Point(0., 0.)))),
        ]);
        collection.field_descriptors = (0..300).map(|i| FieldDescriptor::character(&format!("f{}", i), 254)).collect();

        match write(&path, &collection, UTF_8) {
            Err(ShapefileError::InvalidArgument(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert!(!dir.path().join("wide.shp").exists());
        assert!(!dir.path().join("wide.dbf").exists());
    }
}
