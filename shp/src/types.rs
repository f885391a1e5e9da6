use crate::result::{Error, Result};

/// The shape types a record can hold, with the tag each one carries on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
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

/// Which values each coordinate of a shape type carries.
///
/// The Z variants always carry a measure as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    XY,
    XYM,
    XYZM,
}

/// Shape types grouped by how their body is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Null,
    Point,
    MultiPoint,
    PolyLine,
    Polygon,
}

impl ShapeType {
    pub const ALL: [ShapeType; 13] = [
        ShapeType::Null,
        ShapeType::Point,
        ShapeType::PolyLine,
        ShapeType::Polygon,
        ShapeType::MultiPoint,
        ShapeType::PointZ,
        ShapeType::PolyLineZ,
        ShapeType::PolygonZ,
        ShapeType::MultiPointZ,
        ShapeType::PointM,
        ShapeType::PolyLineM,
        ShapeType::PolygonM,
        ShapeType::MultiPointM,
    ];

    pub fn code(self) -> u32 {
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

    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(ShapeType::Null),
            1 => Ok(ShapeType::Point),
            3 => Ok(ShapeType::PolyLine),
            5 => Ok(ShapeType::Polygon),
            8 => Ok(ShapeType::MultiPoint),
            11 => Ok(ShapeType::PointZ),
            13 => Ok(ShapeType::PolyLineZ),
            15 => Ok(ShapeType::PolygonZ),
            18 => Ok(ShapeType::MultiPointZ),
            21 => Ok(ShapeType::PointM),
            23 => Ok(ShapeType::PolyLineM),
            25 => Ok(ShapeType::PolygonM),
            28 => Ok(ShapeType::MultiPointM),
            _ => Err(Error::UnsupportedShapeType(code)),
        }
    }

    pub fn dimension(self) -> Dimension {
        match self {
            ShapeType::Null
            | ShapeType::Point
            | ShapeType::PolyLine
            | ShapeType::Polygon
            | ShapeType::MultiPoint => Dimension::XY,
            ShapeType::PointM
            | ShapeType::PolyLineM
            | ShapeType::PolygonM
            | ShapeType::MultiPointM => Dimension::XYM,
            ShapeType::PointZ
            | ShapeType::PolyLineZ
            | ShapeType::PolygonZ
            | ShapeType::MultiPointZ => Dimension::XYZM,
        }
    }

    pub fn family(self) -> Family {
        match self {
            ShapeType::Null => Family::Null,
            ShapeType::Point | ShapeType::PointM | ShapeType::PointZ => Family::Point,
            ShapeType::MultiPoint | ShapeType::MultiPointM | ShapeType::MultiPointZ => {
                Family::MultiPoint
            }
            ShapeType::PolyLine | ShapeType::PolyLineM | ShapeType::PolyLineZ => Family::PolyLine,
            ShapeType::Polygon | ShapeType::PolygonM | ShapeType::PolygonZ => Family::Polygon,
        }
    }
}

impl TryFrom<u32> for ShapeType {
    type Error = Error;

    fn try_from(code: u32) -> Result<Self> {
        ShapeType::from_code(code)
    }
}

impl Dimension {
    pub fn has_m(self) -> bool {
        !matches!(self, Dimension::XY)
    }

    pub fn has_z(self) -> bool {
        matches!(self, Dimension::XYZM)
    }
}

/// A single position. `z` and `m` are only kept for the shape types that store them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
    pub m: Option<f64>,
}

impl Coordinate {
    pub fn xy(x: f64, y: f64) -> Self {
        Coordinate {
            x,
            y,
            z: None,
            m: None,
        }
    }

    pub fn xym(x: f64, y: f64, m: f64) -> Self {
        Coordinate {
            x,
            y,
            z: None,
            m: Some(m),
        }
    }

    pub fn xyzm(x: f64, y: f64, z: f64, m: f64) -> Self {
        Coordinate {
            x,
            y,
            z: Some(z),
            m: Some(m),
        }
    }

    /// Shape the coordinate to a dimension: values the dimension needs but are
    /// missing become 0.0, values it does not store are dropped.
    pub fn conform(self, dimension: Dimension) -> Self {
        Coordinate {
            x: self.x,
            y: self.y,
            z: if dimension.has_z() {
                Some(self.z.unwrap_or(0.0))
            } else {
                None
            },
            m: if dimension.has_m() {
                Some(self.m.unwrap_or(0.0))
            } else {
                None
            },
        }
    }

    pub(crate) fn origin(dimension: Dimension) -> Self {
        Coordinate::xy(0.0, 0.0).conform(dimension)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Coordinate::xy(x, y)
    }
}

/// A closed interval of measure or elevation values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    fn at(v: f64) -> Self {
        Range { min: v, max: v }
    }

    fn include(&mut self, v: f64) {
        if v < self.min {
            self.min = v;
        }
        if v > self.max {
            self.max = v;
        }
    }
}

/// The bounding box of a shape, plus its elevation and measure ranges when the
/// shape type stores them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub z: Option<Range>,
    pub m: Option<Range>,
}

impl Extent {
    pub fn from_coordinate(c: &Coordinate) -> Self {
        Extent {
            xmin: c.x,
            ymin: c.y,
            xmax: c.x,
            ymax: c.y,
            z: c.z.map(Range::at),
            m: c.m.map(Range::at),
        }
    }

    pub fn from_coordinates<'a, I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Coordinate>,
    {
        let mut iter = coords.into_iter();
        let mut extent = Extent::from_coordinate(iter.next()?);
        for c in iter {
            extent.expand(c);
        }
        Some(extent)
    }

    /// Grow the extent so it covers `c`
    pub fn expand(&mut self, c: &Coordinate) {
        if c.x < self.xmin {
            self.xmin = c.x;
        }
        if c.y < self.ymin {
            self.ymin = c.y;
        }
        if c.x > self.xmax {
            self.xmax = c.x;
        }
        if c.y > self.ymax {
            self.ymax = c.y;
        }
        if let Some(z) = c.z {
            match &mut self.z {
                Some(range) => range.include(z),
                None => self.z = Some(Range::at(z)),
            }
        }
        if let Some(m) = c.m {
            match &mut self.m {
                Some(range) => range.include(m),
                None => self.m = Some(Range::at(m)),
            }
        }
    }
}

/// One ring of a polygon or one path of a polyline
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Part(pub Vec<Coordinate>);

impl Part {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Body {
    Null,
    Point(Coordinate),
    MultiPoint {
        extent: Option<Extent>,
        points: Vec<Coordinate>,
    },
    Poly {
        extent: Option<Extent>,
        parts: Vec<Part>,
    },
}

/// The geometry held by a record.
///
/// The shape type is fixed when the shape is created. Point counts, part counts
/// and the extent are kept consistent by [Shape::add_point]; see
/// [Shape::delete_point] for the one exception.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub(crate) shape_type: ShapeType,
    pub(crate) body: Body,
}

impl Shape {
    /// An empty shape. Point types start out at the origin, since they always hold one coordinate.
    pub fn new(shape_type: ShapeType) -> Self {
        let body = match shape_type.family() {
            Family::Null => Body::Null,
            Family::Point => Body::Point(Coordinate::origin(shape_type.dimension())),
            Family::MultiPoint => Body::MultiPoint {
                extent: None,
                points: Vec::new(),
            },
            Family::PolyLine | Family::Polygon => Body::Poly {
                extent: None,
                parts: Vec::new(),
            },
        };
        Shape { shape_type, body }
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    /// The coordinate of a point shape
    pub fn point(&self) -> Option<&Coordinate> {
        match &self.body {
            Body::Point(c) => Some(c),
            _ => None,
        }
    }

    /// The coordinates of a multipoint shape
    pub fn points(&self) -> &[Coordinate] {
        match &self.body {
            Body::MultiPoint { points, .. } => points,
            _ => &[],
        }
    }

    /// The parts of a polyline or polygon shape
    pub fn parts(&self) -> &[Part] {
        match &self.body {
            Body::Poly { parts, .. } => parts,
            _ => &[],
        }
    }

    pub fn extent(&self) -> Option<&Extent> {
        match &self.body {
            Body::MultiPoint { extent, .. } | Body::Poly { extent, .. } => extent.as_ref(),
            _ => None,
        }
    }

    pub fn num_parts(&self) -> usize {
        self.parts().len()
    }

    /// Total number of coordinates across the whole shape
    pub fn num_points(&self) -> usize {
        match &self.body {
            Body::Null => 0,
            Body::Point(_) => 1,
            Body::MultiPoint { points, .. } => points.len(),
            Body::Poly { parts, .. } => parts.iter().map(Part::len).sum(),
        }
    }

    /// Every coordinate of the shape in storage order
    pub fn coordinates(&self) -> Box<dyn Iterator<Item = &Coordinate> + '_> {
        match &self.body {
            Body::Null => Box::new(std::iter::empty()),
            Body::Point(c) => Box::new(std::iter::once(c)),
            Body::MultiPoint { points, .. } => Box::new(points.iter()),
            Body::Poly { parts, .. } => Box::new(parts.iter().flat_map(|p| p.0.iter())),
        }
    }
}
