extern crate byteorder;
extern crate chrono;
extern crate encoding;
extern crate itertools;
#[macro_use] extern crate lazy_static;
#[macro_use] extern crate log;
extern crate regex;
extern crate thiserror;

pub mod geo;
pub mod attribute;
pub mod feature;
pub mod shapefile;

pub use attribute::{AttributeKind, AttributeValue};
pub use feature::{Attributes, Feature, FeatureCollection};
pub use shapefile::{FieldDescriptor, FieldType, ShapeType, ShapefileError};
pub use shapefile::{read, read_with_encoding, write, write_with_encoding};
