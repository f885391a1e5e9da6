use crate::result::{Error, Result};
use crate::types::*;
use geo_types::{Coord, Geometry, LineString, MultiLineString, MultiPoint, Point, Polygon};

// geo-types geometries are planar, measures and elevations are dropped
fn line_string(part: &Part) -> LineString<f64> {
    LineString::new(part.0.iter().map(|c| Coord { x: c.x, y: c.y }).collect())
}

fn coordinates(ls: &LineString<f64>) -> impl Iterator<Item = Coordinate> + '_ {
    ls.0.iter().map(|c| Coordinate::xy(c.x, c.y))
}

impl TryFrom<&Shape> for Geometry<f64> {
    type Error = Error;

    /// Polyline parts become the lines of a multilinestring. Polygon parts become
    /// one polygon with the first part as exterior and the rest as interiors; ring
    /// orientation is not looked at.
    fn try_from(shape: &Shape) -> Result<Self> {
        match shape.shape_type().family() {
            Family::Null => Err(Error::NullShape),
            Family::Point => {
                let c = shape.point().copied().unwrap_or_default();
                Ok(Geometry::Point(Point::new(c.x, c.y)))
            }
            Family::MultiPoint => Ok(Geometry::MultiPoint(MultiPoint::new(
                shape.points().iter().map(|c| Point::new(c.x, c.y)).collect(),
            ))),
            Family::PolyLine => Ok(Geometry::MultiLineString(MultiLineString::new(
                shape.parts().iter().map(line_string).collect(),
            ))),
            Family::Polygon => match shape.parts().split_first() {
                Some((exterior, interiors)) => Ok(Geometry::Polygon(Polygon::new(
                    line_string(exterior),
                    interiors.iter().map(line_string).collect(),
                ))),
                None => Ok(Geometry::Polygon(Polygon::new(
                    LineString::new(Vec::new()),
                    Vec::new(),
                ))),
            },
        }
    }
}

impl Shape {
    /// Build a planar shape from a geo-types geometry.
    ///
    /// Lines and linestrings become polylines; polygons, rects and triangles
    /// become polygons with one part per ring. Geometry collections are not supported.
    pub fn from_geometry(geom: &Geometry<f64>) -> Result<Shape> {
        let shape = match geom {
            Geometry::Point(p) => {
                let mut shape = Shape::new(ShapeType::Point);
                shape.add_point(Coordinate::xy(p.x(), p.y()), 0);
                shape
            }
            Geometry::MultiPoint(mp) => {
                let mut shape = Shape::new(ShapeType::MultiPoint);
                for p in &mp.0 {
                    shape.add_point(Coordinate::xy(p.x(), p.y()), 0);
                }
                shape
            }
            Geometry::Line(l) => {
                let mut shape = Shape::new(ShapeType::PolyLine);
                shape.add_part(vec![
                    Coordinate::xy(l.start.x, l.start.y),
                    Coordinate::xy(l.end.x, l.end.y),
                ]);
                shape
            }
            Geometry::LineString(ls) => {
                let mut shape = Shape::new(ShapeType::PolyLine);
                shape.add_part(coordinates(ls));
                shape
            }
            Geometry::MultiLineString(mls) => {
                let mut shape = Shape::new(ShapeType::PolyLine);
                for ls in &mls.0 {
                    shape.add_part(coordinates(ls));
                }
                shape
            }
            Geometry::Polygon(poly) => {
                let mut shape = Shape::new(ShapeType::Polygon);
                add_rings(&mut shape, poly);
                shape
            }
            Geometry::MultiPolygon(mp) => {
                let mut shape = Shape::new(ShapeType::Polygon);
                for poly in &mp.0 {
                    add_rings(&mut shape, poly);
                }
                shape
            }
            Geometry::Rect(r) => {
                let mut shape = Shape::new(ShapeType::Polygon);
                add_rings(&mut shape, &r.to_polygon());
                shape
            }
            Geometry::Triangle(t) => {
                let mut shape = Shape::new(ShapeType::Polygon);
                add_rings(&mut shape, &t.to_polygon());
                shape
            }
            Geometry::GeometryCollection(_) => return Err(Error::UnsupportedGeometryType),
        };
        Ok(shape)
    }
}

fn add_rings(shape: &mut Shape, poly: &Polygon<f64>) {
    shape.add_part(coordinates(poly.exterior()));
    for ring in poly.interiors() {
        shape.add_part(coordinates(ring));
    }
}
