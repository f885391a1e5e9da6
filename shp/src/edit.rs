use crate::types::*;

fn grow(extent: &mut Option<Extent>, c: &Coordinate) {
    match extent {
        Some(e) => e.expand(c),
        None => *extent = Some(Extent::from_coordinate(c)),
    }
}

impl Shape {
    /// Add a point to the shape.
    ///
    /// Point shapes have their single coordinate replaced. Multipoints append
    /// to their point list. Polylines and polygons append to part `part_index`,
    /// creating it (and any empty parts before it) when it does not exist yet.
    /// Elevation and measure values the shape type needs but `point` lacks are
    /// stored as 0.0.
    ///
    /// The extent is grown to cover the new point without rescanning the shape.
    /// Null shapes ignore the call.
    pub fn add_point(&mut self, point: Coordinate, part_index: usize) {
        let point = point.conform(self.shape_type.dimension());
        match &mut self.body {
            Body::Null => {}
            Body::Point(c) => *c = point,
            Body::MultiPoint { extent, points } => {
                grow(extent, &point);
                points.push(point);
            }
            Body::Poly { extent, parts } => {
                if part_index >= parts.len() {
                    parts.resize_with(part_index + 1, Part::default);
                }
                grow(extent, &point);
                parts[part_index].0.push(point);
            }
        }
    }

    /// Append a new part made of `points`. For shapes without parts the points
    /// are added as if by [Shape::add_point].
    pub fn add_part<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = Coordinate>,
    {
        let part_index = match &mut self.body {
            Body::Poly { parts, .. } => {
                parts.push(Part::default());
                parts.len() - 1
            }
            _ => 0,
        };
        for p in points {
            self.add_point(p, part_index);
        }
    }

    /// Remove a point from the shape.
    ///
    /// Point shapes keep their coordinate slot and have it zeroed. Multipoints
    /// and polylines/polygons drop the point and shift the following points
    /// down; indexes that do not exist are ignored.
    ///
    /// The extent is left as it was, so it may be larger than the remaining
    /// points. Call [Shape::recompute_extent] to tighten it. A shape left with
    /// no points has no extent.
    pub fn delete_point(&mut self, point_index: usize, part_index: usize) {
        let dim = self.shape_type.dimension();
        match &mut self.body {
            Body::Null => {}
            Body::Point(c) => *c = Coordinate::origin(dim),
            Body::MultiPoint { extent, points } => {
                if point_index < points.len() {
                    points.remove(point_index);
                }
                if points.is_empty() {
                    *extent = None;
                }
            }
            Body::Poly { extent, parts } => {
                if let Some(part) = parts.get_mut(part_index) {
                    if point_index < part.len() {
                        part.0.remove(point_index);
                    }
                }
                if parts.iter().all(Part::is_empty) {
                    *extent = None;
                }
            }
        }
    }

    /// Rebuild the extent from the current points. An empty shape ends up with no extent.
    pub fn recompute_extent(&mut self) {
        match &mut self.body {
            Body::MultiPoint { extent, points } => *extent = Extent::from_coordinates(points.iter()),
            Body::Poly { extent, parts } => {
                *extent = Extent::from_coordinates(parts.iter().flat_map(|p| p.0.iter()))
            }
            Body::Null | Body::Point(_) => {}
        }
    }
}
