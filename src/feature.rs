use std::collections::BTreeMap;
use crate::attribute::AttributeValue;
use crate::geo::{BoundingBox, Geometry};
use crate::shapefile::dbf::FieldDescriptor;
use crate::shapefile::header::ShapeType;

pub type Attributes = BTreeMap<String, AttributeValue>;

static NULL: AttributeValue = AttributeValue::Null;

/// One Shapefile record: geometry plus its ".dbf" row.
#[derive(Clone,Debug,PartialEq)]
pub struct Feature {
    /// 1-based.
    pub record_number: u32,
    pub shape_type: ShapeType,
    /// None for Null records.
    pub geometry: Option<Geometry>,
    pub attributes: Attributes,
    pub bounding_box: Option<BoundingBox>,
}

impl Feature {
    /// Builds a Feature whose shape type and bounding box derive from
    /// `geometry`.
    pub fn new(geometry: Option<Geometry>) -> Feature {
        let shape_type = match geometry {
            None => ShapeType::Null,
            Some(ref g) => ShapeType::of_geometry(g),
        };
        let bounding_box = geometry.as_ref().and_then(|g| g.bounding_box());

        Feature {
            record_number: 0,
            shape_type: shape_type,
            geometry: geometry,
            attributes: Attributes::new(),
            bounding_box: bounding_box,
        }
    }

    pub fn with_attribute<K: Into<String>, V: Into<AttributeValue>>(mut self, key: K, value: V) -> Feature {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Returns Null for missing keys.
    pub fn attribute(&self, key: &str) -> &AttributeValue {
        self.attributes.get(key).unwrap_or(&NULL)
    }
}

/// Everything in a Shapefile's four files.
///
/// Shapefiles are homogeneous: every Feature's shape type must match
/// `shape_type`, ignoring M/Z (and Null records are allowed anywhere).
#[derive(Clone,Debug,PartialEq)]
pub struct FeatureCollection {
    pub shape_type: ShapeType,
    pub features: Vec<Feature>,
    pub bounding_box: Option<BoundingBox>,
    /// Raw ".prj" WKT.
    pub projection_text: Option<String>,
    /// Column schema. When empty, the writer infers one.
    pub field_descriptors: Vec<FieldDescriptor>,
    /// Human-readable descriptions of data the reader could not recover.
    pub warnings: Vec<String>,
}

impl FeatureCollection {
    pub fn new(shape_type: ShapeType) -> FeatureCollection {
        FeatureCollection {
            shape_type: shape_type,
            features: vec![],
            bounding_box: None,
            projection_text: None,
            field_descriptors: vec![],
            warnings: vec![],
        }
    }

    pub fn with_features(shape_type: ShapeType, features: Vec<Feature>) -> FeatureCollection {
        FeatureCollection {
            features: features,
            ..FeatureCollection::new(shape_type)
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.field_descriptors.iter().find(|f| f.name == name)
    }
}
