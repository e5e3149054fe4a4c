//! Reads and writes ESRI Shapefiles: ".shp" geometry, ".shx" index, ".dbf"
//! attributes and ".prj" projection.
//!
//! There are a few things this module does _not_ do:
//!
//! * It never reprojects. Coordinates are returned as stored. We write a
//!   WGS84 ".prj" file no matter what, so write longitude/latitude.
//! * Z and M values are read past and thrown away. We write 2D types only.
//! * MultiPatch files are rejected.
//!
//! Reading is forgiving: only a missing ".shp" or a broken ".shp" header is
//! an error. A bad record, a missing ".dbf" or a strange ".prj" shows up in
//! `FeatureCollection::warnings`.
//!
//! # Examples
//!
//! Write, then read back:
//!
//! ```
//! # extern crate shpio;
//! # extern crate tempfile;
//! # fn main() {
//! use shpio::{Feature, FeatureCollection, ShapeType};
//! use shpio::geo::{Geometry, Point};
//! use shpio::shapefile;
//!
//! # let dir = tempfile::tempdir().unwrap();
//! # let path = dir.path().join("cities.shp");
//! let collection = FeatureCollection::with_features(ShapeType::Point, vec![
//!     Feature::new(Some(Geometry::Point(Point(-0.1278, 51.5074))))
//!         .with_attribute("name", "London")
//!         .with_attribute("population", 8982000),
//! ]);
//! shapefile::write(&path, &collection).unwrap();
//!
//! let collection = shapefile::read(&path).unwrap();
//! assert!(collection.warnings.is_empty());
//! assert_eq!(Some("London"), collection.features[0].attribute("name").as_str());
//! assert_eq!(Some(8982000), collection.features[0].attribute("population").as_i64());
//! # }
//! ```
//!
//! Stream records without building a collection:
//!
//! ```
//! # extern crate shpio;
//! # extern crate tempfile;
//! # fn main() {
//! # use shpio::{Feature, FeatureCollection, ShapeType};
//! # use shpio::geo::{Geometry, Point};
//! use shpio::shapefile::shp;
//!
//! # let dir = tempfile::tempdir().unwrap();
//! # let path = dir.path().join("cities.shp");
//! # let collection = FeatureCollection::with_features(ShapeType::Point, vec![
//! #     Feature::new(Some(Geometry::Point(Point(2.3522, 48.8566)))),
//! # ]);
//! # shpio::shapefile::write(&path, &collection).unwrap();
//! for record in shp::open(&path).unwrap() {
//!     // record is a Result<ShpRecord, ShpError>
//!     println!("{:?}", record.unwrap());
//! }
//! # }
//! ```

use std::path::Path;
use encoding;
use encoding::EncodingRef;
use crate::feature::FeatureCollection;

pub mod error;
pub mod header;
pub mod shp;
pub mod dbf;
pub mod schema;
pub mod prj;
pub mod reader;
pub mod writer;

pub use self::error::{DbfError, ShapefileError, ShpError};
pub use self::header::{ShapeType, ShpHeader};
pub use self::dbf::{DbfReader, DbfRecord, DbfWriter, FieldDescriptor, FieldType};
pub use self::shp::{ShpReader, ShpRecord, ShpShape, ShpWriter};

/// Reads the Shapefile at `path`, decoding ".dbf" text as UTF-8.
pub fn read(path: &Path) -> Result<FeatureCollection, ShapefileError> {
    reader::read(path, encoding::all::UTF_8)
}

/// Reads the Shapefile at `path`, decoding ".dbf" text with `encoding`.
pub fn read_with_encoding(path: &Path, encoding: EncodingRef) -> Result<FeatureCollection, ShapefileError> {
    reader::read(path, encoding)
}

/// Writes `collection` beside `path`, encoding ".dbf" text as UTF-8.
pub fn write(path: &Path, collection: &FeatureCollection) -> Result<(), ShapefileError> {
    writer::write(path, collection, encoding::all::UTF_8)
}

/// Writes `collection` beside `path`, encoding ".dbf" text with `encoding`.
pub fn write_with_encoding(path: &Path, collection: &FeatureCollection, encoding: EncodingRef) -> Result<(), ShapefileError> {
    writer::write(path, collection, encoding)
}
