use std::fmt;
use itertools::Itertools;

/// A longitude/latitude pair, in that order (x, y).
#[derive(Clone,Copy,Debug,PartialEq,PartialOrd)]
pub struct Point(pub f64, pub f64);

impl Point {
    pub fn lon(&self) -> f64 { self.0 }
    pub fn lat(&self) -> f64 { self.1 }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.0, self.1)
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum WindingOrder {
    Clockwise,
    CounterClockwise,
}

/// Returns the signed area of a ring, via the shoelace formula.
///
/// Assumes north is positive (WGS84, not SVG/canvas coordinates): the area is
/// negative iff the ring is clockwise.
///
/// Works whether or not the first and last Points are identical.
pub fn signed_area(points: &[Point]) -> f64 {
    // https://en.wikipedia.org/wiki/Shoelace_formula
    let mut a: f64 = 0.;

    for (p1, p2) in points.iter().tuple_windows() {
        a += p1.0 * p2.1 - p2.0 * p1.1;
    }

    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        if first != last {
            a += last.0 * first.1 - first.0 * last.1;
        }
    }

    a / 2.
}

/// Returns winding order.
///
/// A zero-area ring is considered to be CounterClockwise.
pub fn winding_order(points: &[Point]) -> WindingOrder {
    if signed_area(points) < 0. {
        WindingOrder::Clockwise
    } else {
        WindingOrder::CounterClockwise
    }
}

/// A sequence of Points. Polygon rings are LineStrings whose first and last
/// Points are identical.
#[derive(Clone,Debug,Default,PartialEq)]
pub struct LineString(pub Vec<Point>);

impl LineString {
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    pub fn points_mut(&mut self) -> &mut Vec<Point> {
        &mut self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.0.first() == self.0.last()
    }

    pub fn signed_area(&self) -> f64 {
        signed_area(&self.0)
    }

    pub fn winding_order(&self) -> WindingOrder {
        winding_order(&self.0)
    }

    /// Returns a copy wound in `order`. Zero-area rings are returned as-is.
    pub fn wound(&self, order: WindingOrder) -> LineString {
        let a = self.signed_area();
        let reverse = match order {
            WindingOrder::Clockwise => a > 0.,
            WindingOrder::CounterClockwise => a < 0.,
        };

        let mut points = self.0.clone();
        if reverse {
            points.reverse();
        }
        LineString(points)
    }
}

impl fmt::Display for LineString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().join(","))
    }
}

/// An outer ring plus any number of holes.
#[derive(Clone,Debug,Default,PartialEq)]
pub struct Polygon {
    pub exterior: LineString,
    pub interiors: Vec<LineString>,
}

impl Polygon {
    pub fn new(exterior: LineString, interiors: Vec<LineString>) -> Polygon {
        Polygon {
            exterior: exterior,
            interiors: interiors,
        }
    }

    pub fn rings(&self) -> impl Iterator<Item=&LineString> {
        Some(&self.exterior).into_iter().chain(self.interiors.iter())
    }

    pub fn interiors_mut(&mut self) -> &mut Vec<LineString> {
        &mut self.interiors
    }
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Polygon(outer:{}, inner:[{}])", self.exterior, self.interiors.iter().join(", "))
    }
}

/// Every geometry a Shapefile record can hold (other than Null, which is the
/// absence of a Geometry).
#[derive(Clone,Debug,PartialEq)]
pub enum Geometry {
    Point(Point),
    MultiPoint(Vec<Point>),
    MultiLineString(Vec<LineString>),
    MultiPolygon(Vec<Polygon>),
}

impl Geometry {
    pub fn line_string(points: Vec<Point>) -> Geometry {
        Geometry::MultiLineString(vec![ LineString(points) ])
    }

    pub fn polygon(polygon: Polygon) -> Geometry {
        Geometry::MultiPolygon(vec![ polygon ])
    }

    /// Calls `f` on every coordinate, recursing through parts and rings.
    pub fn for_each_point<F: FnMut(&Point)>(&self, mut f: F) {
        match self {
            &Geometry::Point(ref p) => f(p),
            &Geometry::MultiPoint(ref points) => points.iter().for_each(f),
            &Geometry::MultiLineString(ref lines) => {
                for line in lines.iter() {
                    line.0.iter().for_each(&mut f);
                }
            }
            &Geometry::MultiPolygon(ref polygons) => {
                for ring in polygons.iter().flat_map(|p| p.rings()) {
                    ring.0.iter().for_each(&mut f);
                }
            }
        }
    }

    /// Returns None iff the Geometry has no Points.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut ret: Option<BoundingBox> = None;
        self.for_each_point(|p| {
            ret = Some(match ret {
                None => BoundingBox::of_point(p),
                Some(bbox) => bbox.expand(p),
            });
        });
        ret
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            &Geometry::Point(ref p) => write!(f, "Point{}", p),
            &Geometry::MultiPoint(ref points) => write!(f, "MultiPoint[{}]", points.iter().join(",")),
            &Geometry::MultiLineString(ref lines) => write!(f, "MultiLineString[{}]", lines.iter().join(", ")),
            &Geometry::MultiPolygon(ref polygons) => write!(f, "MultiPolygon[{}]", polygons.iter().join(", ")),
        }
    }
}

#[derive(Clone,Copy,Debug,Default,PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> BoundingBox {
        BoundingBox {
            min_lon: min_lon,
            min_lat: min_lat,
            max_lon: max_lon,
            max_lat: max_lat,
        }
    }

    pub fn of_point(p: &Point) -> BoundingBox {
        BoundingBox::new(p.0, p.1, p.0, p.1)
    }

    pub fn expand(&self, p: &Point) -> BoundingBox {
        BoundingBox::new(
            self.min_lon.min(p.0),
            self.min_lat.min(p.1),
            self.max_lon.max(p.0),
            self.max_lat.max(p.1),
        )
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.min_lon.min(other.min_lon),
            self.min_lat.min(other.min_lat),
            self.max_lon.max(other.max_lon),
            self.max_lat.max(other.max_lat),
        )
    }

    /// Returns the smallest box holding every Point. An empty iterator
    /// yields the all-zero box.
    pub fn of_points<'a, T: IntoIterator<Item=&'a Point>>(points: T) -> BoundingBox {
        points.into_iter()
            .fold(None, |acc: Option<BoundingBox>, p| Some(match acc {
                None => BoundingBox::of_point(p),
                Some(bbox) => bbox.expand(p),
            }))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn square_cw() -> Vec<Point> {
        vec![ Point(0., 0.), Point(0., 1.), Point(1., 1.), Point(1., 0.), Point(0., 0.) ]
    }

    #[test]
    fn signed_area_clockwise_is_negative() {
        assert_eq!(-1., signed_area(&square_cw()));
        assert_eq!(WindingOrder::Clockwise, winding_order(&square_cw()));
    }

    #[test]
    fn signed_area_counter_clockwise_is_positive() {
        let mut points = square_cw();
        points.reverse();
        assert_eq!(1., signed_area(&points));
        assert_eq!(WindingOrder::CounterClockwise, winding_order(&points));
    }

    #[test]
    fn signed_area_of_open_ring() {
        let points = vec![ Point(0., 0.), Point(0., 1.), Point(1., 1.), Point(1., 0.) ];
        assert_eq!(-1., signed_area(&points));
    }

    #[test]
    fn wound_reverses_only_when_needed() {
        let ring = LineString(square_cw());
        assert_eq!(ring, ring.wound(WindingOrder::Clockwise));

        let ccw = ring.wound(WindingOrder::CounterClockwise);
        assert_eq!(WindingOrder::CounterClockwise, ccw.winding_order());
        assert_eq!(Point(0., 0.), ccw.0[0]);
        assert_eq!(Point(1., 0.), ccw.0[1]);
    }

    #[test]
    fn bounding_box_recurses_through_rings() {
        let polygon = Polygon::new(
            LineString(square_cw()),
            vec![ LineString(vec![ Point(-2., 0.5), Point(0.5, 3.), Point(0.5, 0.5), Point(-2., 0.5) ]) ],
        );
        let bbox = Geometry::polygon(polygon).bounding_box().unwrap();
        assert_eq!(BoundingBox::new(-2., 0., 1., 3.), bbox);
    }

    #[test]
    fn bounding_box_of_nothing() {
        assert_eq!(None, Geometry::MultiPoint(vec![]).bounding_box());
        assert_eq!(BoundingBox::new(0., 0., 0., 0.), BoundingBox::of_points(Vec::<Point>::new().iter()));
    }
}
